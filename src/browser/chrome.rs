use super::{Activation, BrowserConfig, BrowserDriver, BrowserError, BrowserSession, Control};
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Mirrors what a user can actually click: laid out, not hidden, not disabled.
const INTERACTABLE_JS: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    const shown = rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
    const enabled = !this.disabled && this.getAttribute('aria-disabled') !== 'true';
    return shown && enabled;
}"#;

const SCRIPT_CLICK_JS: &str = "function() { this.click(); }";

const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Launches Chrome through headless_chrome.
#[derive(Debug, Clone)]
pub struct ChromeDriver {
    config: BrowserConfig,
}

impl ChromeDriver {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn launch_options(&self) -> Result<LaunchOptions<'static>, BrowserError> {
        LaunchOptions::default_builder()
            .headless(self.config.headless)
            .sandbox(self.config.sandbox)
            .window_size(Some(self.config.window_size))
            .path(self.config.chrome_path.clone())
            .idle_browser_timeout(self.config.page_load_timeout * 4)
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))
    }
}

impl BrowserDriver for ChromeDriver {
    type Session = ChromeSession;

    fn launch(&self) -> Result<ChromeSession, BrowserError> {
        let options = self.launch_options()?;

        let browser = Browser::new(options).map_err(|e| BrowserError::Launch(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::Launch(format!("Tab creation failed: {e}")))?;

        tab.set_default_timeout(self.config.page_load_timeout);
        tab.set_user_agent(&self.config.user_agent, None, None)
            .map_err(|e| BrowserError::Launch(format!("Setting user agent failed: {e}")))?;

        debug!("🌐 Chrome session started");
        Ok(ChromeSession { browser, tab })
    }
}

/// One Chrome process with the single tab a run drives. Dropping the
/// `Browser` kills the process, so a panicking run does not leak it either.
pub struct ChromeSession {
    browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    fn element(&self, control: &Control) -> Result<Element<'_>, BrowserError> {
        self.tab
            .find_elements_by_xpath(&control.xpath)
            .map_err(|e| BrowserError::ElementNotFound(format!("{}: {e}", control.xpath)))?
            .into_iter()
            .nth(control.index)
            .ok_or_else(|| {
                BrowserError::ElementNotFound(format!("{}[{}]", control.xpath, control.index))
            })
    }
}

impl BrowserSession for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::Navigation(format!("Failed to navigate to {url}: {e}")))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::Timeout(format!("Navigation to {url}: {e}")))?;

        Ok(())
    }

    fn page_html(&mut self) -> Result<String, BrowserError> {
        self.tab
            .get_content()
            .map_err(|e| BrowserError::HtmlExtraction(e.to_string()))
    }

    fn wait_for_control(
        &mut self,
        xpath: &str,
        timeout: Duration,
    ) -> Result<Control, BrowserError> {
        self.tab
            .wait_for_xpath_with_custom_timeout(xpath, timeout)
            .map_err(|e| BrowserError::Timeout(format!("{xpath}: {e}")))?;

        Ok(Control::new(xpath, 0))
    }

    fn find_controls(&mut self, xpath: &str) -> Result<Vec<Control>, BrowserError> {
        let found = self
            .tab
            .find_elements_by_xpath(xpath)
            .map_err(|e| BrowserError::ElementNotFound(format!("{xpath}: {e}")))?;

        Ok((0..found.len()).map(|i| Control::new(xpath, i)).collect())
    }

    fn is_interactable(&mut self, control: &Control) -> Result<bool, BrowserError> {
        let result = self
            .element(control)?
            .call_js_fn(INTERACTABLE_JS, vec![], false)
            .map_err(|e| BrowserError::JavaScript(e.to_string()))?;

        Ok(result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    fn scroll_into_view(&mut self, control: &Control) -> Result<(), BrowserError> {
        self.element(control)?
            .scroll_into_view()
            .map_err(|e| BrowserError::Interaction(format!("Scroll into view failed: {e}")))?;
        Ok(())
    }

    fn activate(&mut self, control: &Control, how: Activation) -> Result<(), BrowserError> {
        let element = self.element(control)?;

        match how {
            Activation::Direct => {
                element
                    .click()
                    .map_err(|e| BrowserError::Interaction(format!("Click failed: {e}")))?;
            }
            Activation::Script => {
                element
                    .call_js_fn(SCRIPT_CLICK_JS, vec![], false)
                    .map_err(|e| BrowserError::JavaScript(format!("Script click failed: {e}")))?;
            }
            Activation::Pointer => {
                let point = element
                    .get_midpoint()
                    .map_err(|e| BrowserError::Interaction(format!("No midpoint: {e}")))?;
                self.tab
                    .move_mouse_to_point(point)
                    .and_then(|tab| tab.click_point(point))
                    .map_err(|e| BrowserError::Interaction(format!("Pointer click failed: {e}")))?;
            }
        }

        Ok(())
    }

    fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        self.tab
            .evaluate(SCROLL_TO_BOTTOM_JS, false)
            .map_err(|e| BrowserError::JavaScript(format!("Scroll failed: {e}")))?;
        Ok(())
    }

    fn wait_for_body(&mut self, timeout: Duration) -> Result<(), BrowserError> {
        self.tab
            .wait_for_element_with_custom_timeout("body", timeout)
            .map_err(|e| BrowserError::Timeout(format!("body: {e}")))?;
        Ok(())
    }

    fn close(self) {
        if let Err(e) = self.tab.close(true) {
            warn!("⚠️ Closing tab failed: {e}");
        }
        drop(self.browser);
        debug!("🌐 Chrome session closed");
    }
}
