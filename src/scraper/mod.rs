mod extract;
mod fields;
mod scraper;
mod scraper_error;

pub use scraper::{ForeclosureScraper, NavigationTimings, RunSummary};
pub use scraper_error::ScrapeError;
