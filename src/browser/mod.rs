//! Headless browser capability surface used by the listing scraper.
//!
//! The scraper only talks to [`BrowserSession`]; `chrome` provides the real
//! implementation on top of `headless_chrome`.

mod chrome;
mod config;

pub use chrome::ChromeDriver;
pub use config::BrowserConfig;

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Interaction failed: {0}")]
    Interaction(String),

    #[error("JavaScript execution error: {0}")]
    JavaScript(String),

    #[error("HTML extraction error: {0}")]
    HtmlExtraction(String),
}

/// A control on the current page, addressed by the XPath that found it and
/// its position among that XPath's matches. Resolved again on every use, so
/// it never outlives the page it was found on in any meaningful way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub xpath: String,
    pub index: usize,
}

impl Control {
    pub fn new(xpath: impl Into<String>, index: usize) -> Self {
        Self {
            xpath: xpath.into(),
            index,
        }
    }
}

/// Ways to click a control, tried in this order until one works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Native click on the element.
    Direct,
    /// `element.click()` from page script.
    Script,
    /// Mouse moved to the element's midpoint, then pressed there.
    Pointer,
}

pub const ACTIVATION_ORDER: [Activation; 3] =
    [Activation::Direct, Activation::Script, Activation::Pointer];

/// Starts browser sessions. One session per extraction run.
pub trait BrowserDriver {
    type Session: BrowserSession;

    fn launch(&self) -> Result<Self::Session, BrowserError>;
}

impl<T: BrowserDriver + ?Sized> BrowserDriver for &T {
    type Session = T::Session;

    fn launch(&self) -> Result<Self::Session, BrowserError> {
        (**self).launch()
    }
}

pub trait BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Markup of the page as currently rendered.
    fn page_html(&mut self) -> Result<String, BrowserError>;

    /// Wait up to `timeout` for the first match of `xpath`.
    fn wait_for_control(&mut self, xpath: &str, timeout: Duration)
        -> Result<Control, BrowserError>;

    /// Every current match of `xpath`, in document order.
    fn find_controls(&mut self, xpath: &str) -> Result<Vec<Control>, BrowserError>;

    /// Displayed and not disabled.
    fn is_interactable(&mut self, control: &Control) -> Result<bool, BrowserError>;

    fn scroll_into_view(&mut self, control: &Control) -> Result<(), BrowserError>;

    fn activate(&mut self, control: &Control, how: Activation) -> Result<(), BrowserError>;

    fn scroll_to_bottom(&mut self) -> Result<(), BrowserError>;

    fn wait_for_body(&mut self, timeout: Duration) -> Result<(), BrowserError>;

    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }

    /// Release the browser. Called exactly once, on every exit path.
    fn close(self);
}
