// zoomdocs entry point.
// Parses arguments, sets up logging, and runs a single request against the store.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use zoomdocs::Config;
use zoomdocs::app::{App, Request};

/// Browse documentation sections at shallow, medium or deep zoom.
#[derive(Debug, Parser)]
#[command(name = "zoomdocs", version, about)]
struct Cli {
    /// Category title (exact match).
    #[arg(requires = "section")]
    category: Option<String>,

    /// Section title within the category (exact match).
    section: Option<String>,

    /// Zoom level to show.
    #[arg(short, long)]
    level: Option<String>,

    /// Clear the cache and fetch again after the initial load.
    #[arg(long)]
    refresh: bool,
}

impl Cli {
    fn request(self) -> Request {
        Request {
            section: self.category.zip(self.section),
            zoom_level: self.level,
            refresh: self.refresh,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "zoomdocs=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::new(&config);
    match app.run(&cli.request()).await {
        Ok(state) => {
            print!("{}", app.report(&state));
            if state.error.is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(error = %e, "Request failed");
            ExitCode::FAILURE
        }
    }
}
