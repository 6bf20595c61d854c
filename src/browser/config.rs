use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the browser a run launches
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,

    /// Chrome's sandbox does not work inside most containers
    pub sandbox: bool,

    pub window_size: (u32, u32),

    pub user_agent: String,

    /// Explicit Chrome binary; `None` lets headless_chrome find one
    pub chrome_path: Option<PathBuf>,

    /// Upper bound on any single navigation
    pub page_load_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            window_size: (1920, 1080),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chrome_path: None,
            page_load_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.window_size, (1920, 1080));
        assert_eq!(config.page_load_timeout, Duration::from_secs(30));
    }
}
