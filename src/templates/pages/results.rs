use crate::domain::{Listing, ListingFilter};
use crate::scraper::RunSummary;
use crate::templates::components::{alert, listings_table};
use maud::{html, Markup};

/// Rows shown inline; the full set is in the CSV and XLSX exports.
const MAX_ROWS: usize = 200;

pub fn scrape_results(summary: &RunSummary, cities: &[String]) -> Markup {
    let file = summary
        .artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    html! {
        (alert("success", &format!(
            "Scraped {} pages: {} listings found, {} unique.",
            summary.pages_visited, summary.total_extracted, summary.unique_listings
        )))
        p { "Saved to " code { (file) } }
        @if !cities.is_empty() {
            p { (cities.len()) " cities: " (cities.iter().take(10).cloned().collect::<Vec<_>>().join(", ")) }
        }
    }
}

pub struct FilterOutcome<'a> {
    pub filter: &'a ListingFilter,
    pub results: Vec<&'a Listing>,
    pub total_available: usize,
    pub email_sent: bool,
    pub email_message: Option<String>,
}

pub fn filter_results(outcome: &FilterOutcome) -> Markup {
    let f = outcome.filter;

    html! {
        p {
            strong { (outcome.results.len()) } " of " (outcome.total_available)
            " listings in " (f.city_label())
            " between " (f.start) " and " (f.end) "."
        }
        @if let Some(message) = &outcome.email_message {
            (alert(if outcome.email_sent { "success" } else { "info" }, message))
        }
        @if outcome.results.is_empty() {
            (alert("info", "No listings match this filter."))
        } @else {
            (listings_table(&outcome.results[..outcome.results.len().min(MAX_ROWS)]))
            @if outcome.results.len() > MAX_ROWS {
                p { "Showing the first " (MAX_ROWS) " rows." }
            }
        }
    }
}
