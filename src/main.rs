use anyhow::Result;
use bluetti_exporter::{bus::EventBus, config::Config, ingest, server};
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Port to listen on for metrics
    #[arg(short, long, env = "EXPORTER_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,

    /// Read JSON events from stdin, one per line
    #[arg(long)]
    stdin: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Bluetti Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if args.stdin {
        config.ingest.stdin = true;
    }
    config.validate()?;

    info!("Configuration loaded successfully");
    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    let bus = EventBus::new(config.bus.capacity);

    // Bind and register the exporter before any input is published
    let exporter = match server::start(&config.server, &bus).await {
        Ok(exporter) => exporter,
        Err(e) => {
            error!("Server error: {}", e);
            std::process::exit(1);
        }
    };

    if config.ingest.stdin {
        let ingest_bus = bus.clone();
        tokio::spawn(async move {
            let reader = BufReader::new(tokio::io::stdin());
            if let Err(e) = ingest::publish_lines(reader, &ingest_bus).await {
                error!("Failed to read events from stdin: {}", e);
            }
        });
    }

    // Serve metrics until the server or the event listener stops
    if let Err(e) = exporter.run().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
