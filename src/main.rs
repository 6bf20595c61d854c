use crate::browser::ChromeDriver;
use crate::config::AppConfig;
use crate::router::{handle, AppState};
use crate::scraper::ForeclosureScraper;
use crate::store::ArtifactStore;
use astra::Server;
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::process::ExitCode;
use tracing::{error, info};

mod browser;
mod config;
mod diagnostics;
mod domain;
mod errors;
mod mailer;
mod responses;
mod router;
mod scraper;
mod spreadsheets;
mod store;
mod templates;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(
    name = "foreclosure_scraper",
    about = "Collects foreclosure auction listings into CSV files and serves them over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default).
    Serve,

    /// Run one scrape and print the summary.
    Scrape {
        /// Stop after this many pages.
        #[arg(long)]
        max_pages: Option<NonZeroUsize>,

        /// Listing page to start from.
        #[arg(long)]
        url: Option<String>,
    },

    /// Run the environment self-checks.
    Diagnose,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config),
        Commands::Scrape { max_pages, url } => scrape_once(config, max_pages, url),
        Commands::Diagnose => {
            let driver = ChromeDriver::new(config.browser.clone());
            let report = diagnostics::run_diagnostics(&config, &driver);
            print!("{}", report.render_table());
            if report.passed == report.total {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn serve(config: AppConfig) -> ExitCode {
    let addr = config.bind;
    let state = AppState::from_config(config);
    info!("Starting server at http://{addr}");
    info!("💾 CSV files in {}", state.store.dir().display());

    let server = Server::bind(&addr).max_workers(8);

    let result = server.serve(move |req, _info| match handle(req, &state) {
        Ok(resp) => resp,
        Err(err) => responses::html_error_response(&err),
    });

    if let Err(e) = result {
        error!("Server ended with error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Server shut down cleanly.");
    ExitCode::SUCCESS
}

fn scrape_once(config: AppConfig, max_pages: Option<NonZeroUsize>, url: Option<String>) -> ExitCode {
    let driver = ChromeDriver::new(config.browser.clone());
    let scraper = ForeclosureScraper::new(driver, ArtifactStore::new(&config.output_dir));
    let url = url.unwrap_or(config.target_url);

    match scraper.run(&url, max_pages.unwrap_or(config.max_pages)) {
        Ok(summary) => {
            println!("CSV:        {}", summary.artifact.display());
            println!("Pages:      {}", summary.pages_visited);
            println!("Extracted:  {}", summary.total_extracted);
            println!("Unique:     {}", summary.unique_listings);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ Scrape failed: {e}");
            ExitCode::FAILURE
        }
    }
}
