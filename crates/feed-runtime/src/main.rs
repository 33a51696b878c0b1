//! # Feed Runtime
//!
//! Command-line client for the feed.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load `FeedClientConfig` from the environment, apply flag overrides
//! 3. Read the credential from `FEED_TOKEN`
//! 4. Wire gateway, asset sink and navigator into the coordinator
//! 5. Load the feed and run the subcommand

mod render;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use feed_sync::{
    FeedClientConfig, FeedCoordinator, FsAssetSink, HttpApiGateway, InMemoryCredentials,
    IntentOutcome, LikeFailurePolicy, LogNavigator, PostComposer, PostEditor, PostId, Session,
    StoreDeps,
};
use feed_telemetry::{init_telemetry, TelemetryConfig};

/// Feed client
#[derive(Parser, Debug)]
#[command(name = "feed")]
#[command(about = "Read the feed, like and comment on posts, download images")]
struct Args {
    /// API base URL (overrides FEED_API_BASE_URL)
    #[arg(long)]
    api_base_url: Option<String>,

    /// What to do with a like the server rejects: revert or keep
    #[arg(long)]
    like_failure_policy: Option<LikeFailurePolicy>,

    /// Skip the per-post "did I like this" queries
    #[arg(long)]
    no_hydrate: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the feed
    Feed,
    /// Like a post
    Like {
        /// Post id
        post_id: String,
    },
    /// Comment on a post
    Comment {
        /// Post id
        post_id: String,
        /// Comment text
        text: String,
    },
    /// Download a post's image
    Download {
        /// Post id
        post_id: String,
    },
    /// Publish a text post
    Post {
        /// Post text
        content: String,
    },
    /// Replace the text of a post
    Edit {
        /// Post id
        post_id: String,
        /// New text
        content: String,
    },
    /// Forget the credential
    Logout,
}

struct Runtime {
    config: FeedClientConfig,
    gateway: Arc<HttpApiGateway>,
    credentials: Arc<InMemoryCredentials>,
    navigator: Arc<LogNavigator>,
    feed: Arc<FeedCoordinator>,
}

impl Runtime {
    fn new(config: FeedClientConfig, token: Option<String>) -> Result<Self> {
        let gateway = Arc::new(HttpApiGateway::new(&config).context("Invalid client configuration")?);
        let credentials = Arc::new(match token {
            Some(token) => InMemoryCredentials::signed_in(token),
            None => InMemoryCredentials::anonymous(),
        });
        let navigator = Arc::new(LogNavigator);
        let deps = StoreDeps {
            gateway: gateway.clone(),
            credentials: credentials.clone(),
            assets: Arc::new(FsAssetSink::new(config.download_dir.clone())),
        };
        let feed = Arc::new(FeedCoordinator::new(&config, deps, navigator.clone()));

        Ok(Self {
            config,
            gateway,
            credentials,
            navigator,
            feed,
        })
    }

    async fn load(&self) -> Result<()> {
        self.feed
            .load()
            .await
            .context("Could not load the feed (set FEED_TOKEN to sign in)")?;
        Ok(())
    }

    async fn store(&self, post_id: &str) -> Result<Arc<feed_sync::InteractionStore>> {
        self.load().await?;
        self.feed
            .store(&PostId::new(post_id))
            .with_context(|| format!("Post {post_id} is not in the feed"))
    }

    async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Feed => {
                let result = self.feed.load().await;
                let views: Vec<_> = self.feed.stores().iter().map(|s| s.view()).collect();
                print!("{}", render::render_feed(&self.feed.phase(), &views));
                result.context("Could not load the feed")?;
            }
            Command::Like { post_id } => {
                let store = self.store(&post_id).await?;
                let outcome = store.like().await;
                println!("{}", render::render_outcome("like", &outcome));
                print!("{}", render::render_post(&store.view()));
                fail_on_error(outcome)?;
            }
            Command::Comment { post_id, text } => {
                let store = self.store(&post_id).await?;
                store.set_draft(&text);
                let outcome = store.submit_draft().await;
                println!("{}", render::render_outcome("comment", &outcome));
                print!("{}", render::render_post(&store.view()));
                fail_on_error(outcome)?;
            }
            Command::Download { post_id } => {
                let store = self.store(&post_id).await?;
                let Some(affordance) = store.download_affordance() else {
                    bail!("Post {post_id} has no image");
                };
                match affordance.download().await {
                    IntentOutcome::Applied(result) => println!("{}", render::render_download(&result)),
                    other => {
                        println!("{}", render::render_outcome("download", &other));
                        fail_on_error(other)?;
                    }
                }
            }
            Command::Post { content } => {
                let composer = PostComposer::new(
                    self.gateway.clone(),
                    self.credentials.clone(),
                    self.navigator.clone(),
                    self.config.media_base_url.clone(),
                );
                let post = composer.create(&content).await.context("Failed to create post")?;
                println!("created post #{}", post.id);
            }
            Command::Edit { post_id, content } => {
                let editor = PostEditor::new(
                    self.gateway.clone(),
                    self.credentials.clone(),
                    self.navigator.clone(),
                    self.config.media_base_url.clone(),
                );
                editor
                    .open(PostId::new(post_id))
                    .await
                    .context(feed_sync::application::FAILED_TO_LOAD_POST)?;
                editor.set_content(&content);
                let post = editor
                    .save()
                    .await
                    .context(feed_sync::application::FAILED_TO_UPDATE_POST)?;
                println!("updated post #{}", post.id);
            }
            Command::Logout => {
                let session = Session::new(
                    self.credentials.clone(),
                    self.navigator.clone(),
                    self.feed.clone(),
                );
                session.logout();
                println!("Logged out. Unset FEED_TOKEN to stay signed out.");
            }
        }
        Ok(())
    }
}

/// Skips succeed quietly; failures become the exit status.
fn fail_on_error<T>(outcome: IntentOutcome<T>) -> Result<()> {
    if let IntentOutcome::Failed(err) = outcome {
        return Err(err.into());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::for_component("runtime");
    if args.verbose {
        telemetry = telemetry.verbose();
    }
    let _telemetry = init_telemetry(telemetry).context("Failed to initialize telemetry")?;

    let mut config = FeedClientConfig::from_env();
    if let Some(url) = args.api_base_url {
        config.api_base_url = url;
    }
    if let Some(policy) = args.like_failure_policy {
        config.like_failure_policy = policy;
    }
    if args.no_hydrate {
        config.hydrate_likes = false;
    }
    config.validate().context("Invalid configuration")?;

    let token = std::env::var("FEED_TOKEN").ok().filter(|t| !t.trim().is_empty());
    info!(
        api = %config.api_base_url,
        signed_in = token.is_some(),
        "[feed-runtime] Starting"
    );

    let runtime = Runtime::new(config, token)?;
    runtime.run(args.command).await
}
