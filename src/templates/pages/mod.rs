pub mod home;
pub mod results;

pub use home::{home_page, HomeVm};
pub use results::{filter_results, scrape_results, FilterOutcome};
