pub(super) const UPSERT_DOCUMENT: &str = r#"
    INSERT INTO documents (path, collection, data, updated_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(path) DO UPDATE SET
        collection = excluded.collection,
        data = excluded.data,
        updated_at = excluded.updated_at
"#;

pub(super) const SET_DOCUMENT_FIELD: &str = r#"
    UPDATE documents
    SET data = json_set(data, ?1, json(?2)),
        updated_at = ?3
    WHERE path = ?4
"#;

// Non-integer or missing fields restart from the increment itself.
pub(super) const INCREMENT_DOCUMENT_FIELD: &str = r#"
    UPDATE documents
    SET data = json_set(
            data,
            ?1,
            CASE WHEN json_type(data, ?1) = 'integer' THEN json_extract(data, ?1) ELSE 0 END + ?2
        ),
        updated_at = ?3
    WHERE path = ?4
"#;

pub(super) const DELETE_DOCUMENT: &str = r#"
    DELETE FROM documents
    WHERE path = ?1
"#;

pub(super) const SELECT_DOCUMENT: &str = r#"
    SELECT data
    FROM documents
    WHERE path = ?1
"#;

pub(super) const SELECT_COLLECTION: &str = r#"
    SELECT data
    FROM documents
    WHERE collection = ?
"#;

pub(super) const FILTER_FIELD_EQUALS: &str = " AND json_extract(data, ?) = json_extract(?, '$')";

pub(super) const ORDER_BY_FIELD: &str = " ORDER BY json_extract(data, ?)";
