use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use community_sync::application::ports::IdentityProvider;
use community_sync::domain::entities::{Community, Post};
use community_sync::domain::value_objects::{DocumentPath, UserId};
use community_sync::{init_logging, ActionOutcome, AppConfig, AppState, MembershipChange};
use tracing::info;

#[derive(Parser)]
#[command(name = "community-sync")]
#[command(about = "Community membership and post voting against a local document store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Signed-in user id
    #[arg(short, long, env = "COMMUNITY_SYNC_USER")]
    user: Option<String>,

    /// Overrides the configured database url
    #[arg(long)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or replace a community document
    SeedCommunity {
        id: String,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long, default_value_t = 0)]
        members: i64,
    },
    /// Create or replace a post document
    SeedPost {
        id: String,
        #[arg(long)]
        community: String,
        #[arg(long)]
        creator: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value_t = 0)]
        votes: i64,
    },
    /// Join a community
    Join { community: String },
    /// Leave a community
    Leave { community: String },
    /// Vote on a post (1 or -1); repeating a vote retracts it
    Vote {
        post: String,
        #[arg(allow_hyphen_values = true)]
        value: i64,
    },
    /// List posts of a community, newest first
    Posts { community: String },
    /// Delete a post you created
    DeletePost { post: String },
    /// Show the signed-in user's joined communities
    Snippets,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    init_logging(&config.logging.filter);

    info!("Starting community-sync v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    if let Some(user) = cli.user {
        let user = UserId::new(user).map_err(anyhow::Error::msg)?;
        state.identity.sign_in(user.clone());
        state.session_service.on_identity_changed(Some(user)).await?;
    }

    match cli.command {
        Commands::SeedCommunity {
            id,
            image_url,
            members,
        } => {
            let mut community = Community::new(id, cli_creator(&state)).with_members(members);
            community.image_url = image_url;
            let mut batch = state.store.begin_batch();
            batch.create(
                DocumentPath::community(&community.id).map_err(anyhow::Error::msg)?,
                serde_json::to_value(&community)?,
            );
            state.store.commit(batch).await?;
            println!("community {} seeded", community.id);
        }
        Commands::SeedPost {
            id,
            community,
            creator,
            title,
            votes,
        } => {
            let post = Post::new(community, creator, title)
                .with_id(id)
                .with_vote_status(votes);
            let mut batch = state.store.begin_batch();
            batch.create(
                DocumentPath::post(&post.id).map_err(anyhow::Error::msg)?,
                serde_json::to_value(&post)?,
            );
            state.store.commit(batch).await?;
            println!("post {} seeded", post.id);
        }
        Commands::Join { community } => set_membership(&state, &community, true).await?,
        Commands::Leave { community } => set_membership(&state, &community, false).await?,
        Commands::Vote { post, value } => {
            let post = state.post_service.fetch_post(&post).await?;
            let community_id = post.community_id.clone();
            match state
                .vote_service
                .apply_vote(&post, value, &community_id)
                .await?
            {
                ActionOutcome::Completed(applied) => {
                    let status = state
                        .cache_reader()
                        .post(&applied.post_id)
                        .await
                        .map(|post| post.vote_status)
                        .unwrap_or(post.vote_status + applied.delta);
                    println!("{:?} on {}: voteStatus {}", applied.kind, applied.post_id, status);
                }
                ActionOutcome::AuthenticationRequired => print_login_required(),
            }
        }
        Commands::Posts { community } => {
            for post in state.post_service.load_community_posts(&community).await? {
                let vote = state
                    .post_service
                    .user_vote_value(&post.id)
                    .await
                    .map(|value| value.to_string())
                    .unwrap_or_default();
                println!("{}\t{}\t{}\t{}", post.id, post.vote_status, vote, post.title);
            }
        }
        Commands::DeletePost { post } => {
            let post = state.post_service.fetch_post(&post).await?;
            match state.post_service.delete_post(&post).await? {
                ActionOutcome::Completed(()) => println!("post {} deleted", post.id),
                ActionOutcome::AuthenticationRequired => print_login_required(),
            }
        }
        Commands::Snippets => {
            for snippet in state.cache_reader().joined_snippets().await {
                println!("{}\t{}", snippet.community_id, snippet.image_url);
            }
        }
    }

    info!(metrics = ?state.sync_metrics_snapshot(), "done");
    Ok(())
}

async fn set_membership(state: &AppState, community_id: &str, join: bool) -> Result<()> {
    let path = DocumentPath::community(community_id).map_err(anyhow::Error::msg)?;
    let Some(document) = state.store.get(&path).await? else {
        bail!("community {community_id} does not exist");
    };
    let community: Community = serde_json::from_value(document)?;

    let is_member = state.cache_reader().is_member(community_id).await;
    if is_member == join {
        println!("membership of {community_id} already up to date");
        return Ok(());
    }

    match state
        .membership_service
        .toggle_membership(&community, is_member)
        .await?
    {
        ActionOutcome::Completed(MembershipChange::Joined(snippet)) => {
            println!("joined {}", snippet.community_id)
        }
        ActionOutcome::Completed(MembershipChange::Left { community_id }) => {
            println!("left {community_id}")
        }
        ActionOutcome::Completed(MembershipChange::Unchanged) => {
            println!("membership of {community_id} already up to date")
        }
        ActionOutcome::AuthenticationRequired => print_login_required(),
    }
    Ok(())
}

fn cli_creator(state: &AppState) -> String {
    state
        .identity
        .current_user()
        .map(|user| user.to_string())
        .unwrap_or_else(|| "system".to_string())
}

fn print_login_required() {
    eprintln!("login required: pass --user or set COMMUNITY_SYNC_USER");
}
