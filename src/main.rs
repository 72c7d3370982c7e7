mod ingest;

use clap::{Parser, Subcommand};
use jarima_core::config;
use jarima_modem::{detect_port, ModemSession};
use jarima_store::Store;

#[derive(Parser)]
#[command(
    name = "jarima",
    version,
    about = "GSM modem SMS collector for fine notices and payment reminders"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Drain the modem's stored messages once and persist them.
    Run,
    /// Check modem detection and store health.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Run => {
            let cfg = config::load(&cli.config)?;
            let store = Store::new(&cfg.store).await?;
            let session = ModemSession::open(&cfg.modem)?;

            let report = ingest::Ingestor::new(session, store).run().await?;
            println!(
                "{} message(s) processed: {} saved, {} removed from phone",
                report.processed, report.saved, report.removed
            );
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("jarima — Status Check\n");
            println!("Config: {}", cli.config);

            if cfg.modem.port.is_empty() {
                match detect_port() {
                    Some(port) => println!("  modem: {port} (auto-detected)"),
                    None => println!("  modem: no USB serial adapter found"),
                }
            } else {
                println!("  modem: {} (configured)", cfg.modem.port);
            }

            match Store::new(&cfg.store).await {
                Ok(_) => println!("  store: ok ({})", cfg.store.db_path),
                Err(e) => println!("  store: unavailable ({e})"),
            }
        }
    }

    Ok(())
}
