use astra::Response;
// errors.rs
use crate::scraper::ScrapeError;
use crate::store::StoreError;
use std::fmt;

/// Errors originating from either the server logic
/// (routing, bad input, etc.) or downstream layers (scraper, store).
#[derive(Debug)]
pub enum ServerError {
    NotFound,
    Missing(String),
    BadRequest(String),
    Scrape(String),
    Store(String),
    XlsxError(String),
    InternalError,
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound | ServerError::Missing(_) => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Scrape(_)
            | ServerError::Store(_)
            | ServerError::XlsxError(_)
            | ServerError::InternalError => 500,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound => write!(f, "Not Found"),
            ServerError::Missing(msg) => write!(f, "{msg}"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::Scrape(msg) => write!(f, "Scraping failed: {msg}"),
            ServerError::Store(msg) => write!(f, "Storage Error: {msg}"),
            ServerError::XlsxError(msg) => write!(f, "Spreadsheet Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<ScrapeError> for ServerError {
    fn from(e: ScrapeError) -> Self {
        ServerError::Scrape(e.to_string())
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NoArtifact => ServerError::Missing(e.to_string()),
            StoreError::UnknownArtifact(_) => ServerError::BadRequest(e.to_string()),
            other => ServerError::Store(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        ServerError::Store(e.to_string())
    }
}
