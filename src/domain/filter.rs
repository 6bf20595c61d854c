// src/domain/filter.rs

use crate::domain::listing::{title_case, Listing};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Sale date layouts seen on the site, tried in order.
const DATE_FORMATS: [&str; 4] = ["%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y", "%d/%m/%Y"];

#[derive(Debug, Clone)]
pub struct ListingFilter {
    /// `None` means every city.
    pub city: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ListingFilter {
    pub fn new(city: &str, start: NaiveDate, end: NaiveDate) -> Self {
        let city = city.trim();
        let city = if city.is_empty() || city.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(city.to_string())
        };

        Self { city, start, end }
    }

    pub fn city_label(&self) -> &str {
        self.city.as_deref().unwrap_or("All Cities")
    }

    /// A listing with no city is only kept when no city is requested.
    /// A listing whose date cannot be read is kept regardless of the range.
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(wanted) = &self.city {
            let row_city = listing.city.trim();
            if row_city.is_empty() {
                return false;
            }

            let exact = title_case(wanted) == title_case(row_city);
            let partial = row_city.to_lowercase().contains(&wanted.to_lowercase());
            if !exact && !partial {
                return false;
            }
        }

        match parse_sale_date(&listing.date) {
            Some(date) => date >= self.start && date <= self.end,
            None => true,
        }
    }

    pub fn apply<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        listings.iter().filter(|l| self.matches(l)).collect()
    }
}

pub fn parse_sale_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Unique cities, display-cased and sorted.
pub fn distinct_cities(listings: &[Listing]) -> Vec<String> {
    listings
        .iter()
        .map(|l| l.city.trim())
        .filter(|c| !c.is_empty())
        .map(|c| title_case(&c.to_lowercase()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
