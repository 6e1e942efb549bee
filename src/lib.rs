pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod validation;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{AdminCommands, Cli, Commands};
pub use config::Config;
use db::Store;
use state::AppState;

pub async fn run() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    config.validate()?;

    if let Ok(db_url) = std::env::var("VOLARR_DATABASE_URL") {
        config.general.database_path = db_url;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Serve) => serve(config).await,

        Some(Commands::Init) => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        Some(Commands::Admin { command }) => match command {
            AdminCommands::ResetPassword { username } => {
                cmd_reset_password(&config, &username).await
            }
        },
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!(
        "Volarr v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if !config.server.enabled {
        anyhow::bail!("Server is disabled in config.toml");
    }

    let port = config.server.port;
    let state = AppState::new(config).await?;

    let app = api::router(state).await;
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}

async fn cmd_reset_password(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let Some(user) = store.get_user_by_username(username).await? else {
        println!("User '{username}' not found.");
        return Ok(());
    };

    println!("Enter new password for '{username}':");

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let password = input.trim();

    if !validation::is_valid_password(password) {
        println!(
            "Password must be at least 8 characters with uppercase, lowercase, and number."
        );
        return Ok(());
    }

    store
        .update_user_password(user.id, password, &config.security)
        .await?;

    println!("✓ Password updated for '{username}'.");
    Ok(())
}
