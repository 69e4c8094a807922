use anyhow::Context;
use clap::{Parser, Subcommand};

use library_kernel::settings::Settings;

/// Library book management service
#[derive(Debug, Parser)]
#[command(name = "library", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Replace the persisted books with the sample catalogue
    Seed,
    /// Print the resolved settings
    Settings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load library settings")?;
    library_telemetry::init(&settings.telemetry)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => library_app::serve(settings).await,
        Command::Seed => {
            let records = library_app::seed::seed(&settings).await?;
            println!("Seeded {} books", records.len());
            Ok(())
        }
        Command::Settings => {
            println!("{settings:#?}");
            Ok(())
        }
    }
}
