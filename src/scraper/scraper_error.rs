use thiserror::Error;

/// Failures of one extraction run. Only `SessionStart`, `PageLoad` on the
/// first navigation, and `Write` end a run; the rest are absorbed per page
/// or per control.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Browser session failed to start: {0}")]
    SessionStart(String),

    #[error("Page load failed for {url}: {reason}")]
    PageLoad { url: String, reason: String },

    #[error("Control {selector} could not be activated after {attempts} attempts")]
    ControlNotActivated { selector: String, attempts: usize },

    #[error("Extraction failed on page {page}: {reason}")]
    Extraction { page: u32, reason: String },

    #[error("Could not write listings to {path}: {reason}")]
    Write { path: String, reason: String },
}
