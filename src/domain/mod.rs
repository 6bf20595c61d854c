pub mod filter;
pub mod listing;

pub use filter::{distinct_cities, ListingFilter};
pub use listing::Listing;
