mod client;
mod config;
mod models;
mod providers;
mod server;
mod services;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use client::{AppAtoms, GitHubState, HeaderController, HttpAppApi, PushState, SessionState};
use config::{ServerConfig, APP_NAME};
use models::AuthProvider;
use providers::V0Provider;

const DEFAULT_APP_URL: &str = "http://localhost:3000";

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(about = "v0 chat proxy and GitHub push tooling for the commerce data generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the v0 chat proxy
    Serve {
        /// Address to bind (overrides SHOPGEN_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides SHOPGEN_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Allow cross-origin requests from any origin
        #[arg(long)]
        cors: bool,
    },
    /// Show the signed-in session and GitHub connection of a running app
    Status {
        #[arg(long, env = "SHOPGEN_APP_URL", default_value = DEFAULT_APP_URL)]
        base_url: String,
    },
    /// Push the files generated in a chat to a GitHub repository
    Push {
        #[arg(long, env = "SHOPGEN_APP_URL", default_value = DEFAULT_APP_URL)]
        base_url: String,

        #[arg(long)]
        owner: String,

        #[arg(long)]
        repo: String,

        /// Target branch, `main` when omitted
        #[arg(long, default_value = "")]
        branch: String,

        #[arg(long)]
        chat_id: Option<String>,

        /// Commit message
        #[arg(long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, cors } => run_server(host, port, cors).await,
        Commands::Status { base_url } => show_status(&base_url).await,
        Commands::Push {
            base_url,
            owner,
            repo,
            branch,
            chat_id,
            message,
        } => {
            push(
                &base_url,
                &owner,
                &repo,
                &branch,
                chat_id.as_deref(),
                message.as_deref(),
            )
            .await
        }
    }
}

async fn run_server(host: Option<String>, port: Option<u16>, cors: bool) -> Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    config.cors_permissive |= cors;

    if config.v0_api_key.is_none() {
        tracing::warn!("V0_API_KEY is not set; chat requests will fail until it is configured");
    }
    tracing::debug!("Server configuration: {:?}", config);

    let provider = V0Provider::new(config.v0_api_key.clone(), Some(&config.v0_api_url))
        .context("Failed to create v0 client")?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        tracing::info!("Shutdown requested");
        signal_token.cancel();
    });

    server::serve(&config, Arc::new(provider), shutdown).await
}

async fn mounted_header(base_url: &str) -> Result<HeaderController> {
    let api = HttpAppApi::new(base_url).context("Invalid app URL")?;
    let mut header = HeaderController::new(Arc::new(api), AppAtoms::default());
    header.mount().await;
    Ok(header)
}

async fn show_status(base_url: &str) -> Result<()> {
    let header = mounted_header(base_url).await?;

    match header.session() {
        SessionState::Authenticated { user, provider } => {
            let via = provider.map(|p| p.display_name()).unwrap_or("unknown provider");
            println!("Signed in as {} ({}) via {}", user.display_name(), user.username, via);
        }
        SessionState::Anonymous | SessionState::Loading => {
            println!("Not signed in");
            for provider in [AuthProvider::Vercel, AuthProvider::Github] {
                println!(
                    "  Sign in with {}: {}",
                    provider.display_name(),
                    header.sign_in_url(provider, None)
                );
            }
            return Ok(());
        }
    }

    match header.github() {
        GitHubState::Connected {
            username,
            connected_at,
        } => {
            let name = username.unwrap_or_else(|| "unknown".to_string());
            match connected_at {
                Some(at) => println!("GitHub: connected as {} since {}", name, at.to_rfc3339()),
                None => println!("GitHub: connected as {}", name),
            }
        }
        GitHubState::Disconnected | GitHubState::Loading => {
            println!("GitHub: not connected");
            println!(
                "  Connect: {}",
                header.sign_in_url(AuthProvider::Github, None)
            );
        }
    }

    Ok(())
}

async fn push(
    base_url: &str,
    owner: &str,
    repo: &str,
    branch: &str,
    chat_id: Option<&str>,
    message: Option<&str>,
) -> Result<()> {
    let mut header = mounted_header(base_url).await?;

    header.set_owner(owner);
    header.set_repo(repo);
    header.set_branch(branch);

    let target = header.selection();
    match header.push(chat_id, message).await {
        PushState::Success { commit_url } => {
            match commit_url {
                Some(url) => println!("Pushed to {}/{}: {}", target.owner, target.repo, url),
                None => println!("Pushed to {}/{}", target.owner, target.repo),
            }
            Ok(())
        }
        PushState::Error(message) => bail!("Push failed: {}", message),
        PushState::Idle | PushState::Loading => bail!("Push did not complete"),
    }
}
