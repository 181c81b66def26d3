use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use relay_config::load as load_config;
use relay_gateway::{create_router, GatewayState};
use relay_runtime::{shutdown_signal, telemetry, RelayServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "relay-server")]
#[command(about = "Real-time chat relay (serves by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server
    Serve,
    /// Create a demo chat with members and print their ids
    Seed {
        /// Name of the chat to create
        #[arg(long, default_value = "general")]
        chat: String,
        /// Display names of the members to create
        #[arg(long = "member", default_values_t = ["alice".to_string(), "bob".to_string()])]
        members: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Seed { chat, members } => seed_data(&chat, &members).await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting chat relay");

    let config = load_config().context("failed to load configuration")?;

    let services = RelayServices::initialise(&config)
        .await
        .context("failed to initialise relay services")?;

    let state = GatewayState::new(
        Arc::new(services.users.clone()),
        Arc::new(services.members.clone()),
        Arc::new(services.messages.clone()),
        &config.relay,
    );
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    services.db_pool.close().await;
    info!("relay shut down");
    Ok(())
}

async fn seed_data(chat_name: &str, members: &[String]) -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    let services = RelayServices::initialise(&config)
        .await
        .context("failed to initialise relay services")?;

    let chat_id = services
        .members
        .create_chat(chat_name)
        .await
        .context("failed to create chat")?;
    println!("chat    {chat_id}  {chat_name}");

    for name in members {
        let user_id = services
            .users
            .create_user(name)
            .await
            .with_context(|| format!("failed to create user {name}"))?;
        services
            .members
            .add_member(chat_id, user_id)
            .await
            .with_context(|| format!("failed to add {name} to {chat_name}"))?;
        println!("member  {user_id}  {name}");
    }

    services.db_pool.close().await;
    Ok(())
}
