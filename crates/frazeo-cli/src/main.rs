mod bootstrap;
mod config;

use clap::{Parser, Subcommand};
use config::FrazeoConfig;
use frazeo_channels::{BotTransport, TelegramClient, UpdatePoller};
use frazeo_core::IdiomId;
use frazeo_gateway::{run_polling, Dispatcher, GatewayServer, WebhookConfig};
use frazeo_memory::Hit;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Updates buffered between the long-poll loop and the dispatcher.
const POLL_BUFFER: usize = 64;

#[derive(Parser)]
#[command(name = "frazeo", about = "Frazeo — semantic idiom search bot")]
struct Cli {
    /// Path to config file (defaults to ./frazeo.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the Telegram webhook
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Receive updates by long polling instead of a webhook
    Poll,
    /// Print the idioms closest to a free-text query
    Search {
        /// Query text
        query: String,
        /// Number of results
        #[arg(short)]
        k: Option<usize>,
    },
    /// Print the idioms closest to a corpus item, the item itself first
    Neighbors {
        /// Corpus id (0-based line number)
        id: IdiomId,
        /// Number of results, including the item
        #[arg(short)]
        k: Option<usize>,
    },
}

fn print_hits(hits: &[Hit]) {
    if hits.is_empty() {
        println!("No results.");
        return;
    }
    for hit in hits {
        println!(
            "{:>5}  {:.4}  {} — {}",
            hit.id, hit.distance, hit.record.phrase, hit.record.definition
        );
    }
}

fn telegram_client(config: &FrazeoConfig) -> anyhow::Result<Arc<TelegramClient>> {
    let token = config.telegram.require_token()?;
    Ok(Arc::new(
        TelegramClient::new(token).with_base_url(config.telegram.api_base_url.as_str()),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = FrazeoConfig::load(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok())?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let client = telegram_client(&config)?;
            let navigator = bootstrap::build_navigator(&config)?;
            let transport: Arc<dyn BotTransport> = client.clone();
            let dispatcher = Arc::new(Dispatcher::new(navigator, transport));

            let webhook = WebhookConfig {
                path: config.telegram.require_token()?.to_string(),
                public_url: config.telegram.app_url.clone(),
                secret: config.telegram.webhook_secret.clone(),
            };
            if webhook.public_url.is_none() {
                info!("APP_URL not set; GET / will not register a webhook");
            }
            let app = GatewayServer::build(dispatcher, webhook, Some(client));

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!(%addr, "Frazeo gateway listening");
            axum::serve(listener, app).await?;
        }
        Commands::Poll => {
            let client = telegram_client(&config)?;
            let navigator = bootstrap::build_navigator(&config)?;
            let transport: Arc<dyn BotTransport> = client.clone();
            let dispatcher = Arc::new(Dispatcher::new(navigator, transport));
            let poller = UpdatePoller::new(client).with_timeout(config.telegram.poll_timeout_secs);

            info!("Frazeo polling for updates");
            run_polling(dispatcher, poller, POLL_BUFFER).await?;
        }
        Commands::Search { query, k } => {
            let retriever = bootstrap::load_retriever(&config.data, &config.search)?;
            let hits = retriever.search_by_text(&query, k.unwrap_or(config.search.results))?;
            print_hits(&hits);
        }
        Commands::Neighbors { id, k } => {
            let retriever = bootstrap::load_retriever(&config.data, &config.search)?;
            let hits =
                retriever.search_by_id(id, k.unwrap_or(config.search.neighbors.saturating_add(1)))?;
            print_hits(&hits);
        }
    }

    Ok(())
}
