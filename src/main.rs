use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// QR code generator page.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting qrpage {}", env!("CARGO_PKG_VERSION"));
    qrpage::server::start_server(&cli.host, cli.port).await
}
