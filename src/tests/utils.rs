use crate::browser::{Activation, BrowserDriver, BrowserError, BrowserSession, Control};
use crate::config::AppConfig;
use crate::domain::Listing;
use crate::router::AppState;
use crate::scraper::NavigationTimings;
use crate::store::ArtifactStore;
use astra::Response;
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CONSENT_XPATH: &str = "//button[contains(text(), 'Agree')]";
pub const NEXT_XPATH: &str = "//a[contains(text(), 'Next')]";
/// Consent link offered ahead of `CONSENT_XPATH` when the site has stuck controls.
pub const STUCK_CONSENT_XPATH: &str = "//a[contains(text(), 'Agree')]";

/// A listing table page with one row per TS number.
pub fn table_page(rows: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body><table><tr><th>TS#</th><th>Property</th></tr>");
    for (ts, city) in rows {
        html.push_str(&format!(
            "<tr><td>{ts}</td><td>123 Oak St, {city}, CA 93701</td></tr>"
        ));
    }
    html.push_str("</table><a class=\"next\">Next</a></body></html>");
    html
}

/// Scripted site behaviour for the fake browser.
#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pub pages: Vec<String>,
    pub consent: bool,
    /// Next control stays enabled even on the last page.
    pub next_always: bool,
    pub fail_launch: bool,
    pub fail_navigate: bool,
    /// Strategies that fail on every control.
    pub failing_activations: Vec<Activation>,
    /// The first consent and next candidates ignore every activation.
    pub stuck_first_candidate: bool,
    /// Page index whose markup cannot be read.
    pub unreadable_page: Option<usize>,
}

#[derive(Debug, Default)]
pub struct FakeLog {
    pub launched: usize,
    pub closed: usize,
    pub pages_read: Vec<usize>,
    pub activations: Vec<(String, Activation)>,
    pub failed_activations: usize,
}

#[derive(Clone)]
pub struct FakeDriver {
    pub site: FakeSite,
    pub log: Arc<Mutex<FakeLog>>,
}

impl FakeDriver {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            log: Arc::new(Mutex::new(FakeLog::default())),
        }
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, FakeLog> {
        self.log.lock().unwrap()
    }
}

impl BrowserDriver for FakeDriver {
    type Session = FakeSession;

    fn launch(&self) -> Result<FakeSession, BrowserError> {
        if self.site.fail_launch {
            return Err(BrowserError::Launch("no chrome in test".into()));
        }
        self.log().launched += 1;

        Ok(FakeSession {
            site: self.site.clone(),
            current: 0,
            consent_pending: false,
            log: Arc::clone(&self.log),
        })
    }
}

pub struct FakeSession {
    site: FakeSite,
    current: usize,
    consent_pending: bool,
    log: Arc<Mutex<FakeLog>>,
}

impl FakeSession {
    fn has_next(&self) -> bool {
        self.site.next_always || self.current + 1 < self.site.pages.len()
    }

    fn is_stuck(&self, control: &Control) -> bool {
        self.site.stuck_first_candidate
            && (control.xpath == STUCK_CONSENT_XPATH
                || (control.xpath == NEXT_XPATH && control.index == 1))
    }
}

impl BrowserSession for FakeSession {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        if self.site.fail_navigate {
            return Err(BrowserError::Navigation(format!("{url} timed out")));
        }
        self.current = 0;
        self.consent_pending = self.site.consent;
        Ok(())
    }

    fn page_html(&mut self) -> Result<String, BrowserError> {
        self.log.lock().unwrap().pages_read.push(self.current);
        if self.site.unreadable_page == Some(self.current) {
            return Err(BrowserError::HtmlExtraction("target crashed".into()));
        }
        Ok(self.site.pages.get(self.current).cloned().unwrap_or_default())
    }

    fn wait_for_control(&mut self, xpath: &str, _timeout: Duration) -> Result<Control, BrowserError> {
        let offered = xpath == CONSENT_XPATH
            || (self.site.stuck_first_candidate && xpath == STUCK_CONSENT_XPATH);
        if self.consent_pending && offered {
            Ok(Control::new(xpath, 0))
        } else {
            Err(BrowserError::Timeout(xpath.into()))
        }
    }

    fn find_controls(&mut self, xpath: &str) -> Result<Vec<Control>, BrowserError> {
        if xpath == NEXT_XPATH && self.has_next() {
            // A hidden duplicate comes first, as in a mobile-only pager.
            let count = if self.site.stuck_first_candidate { 3 } else { 2 };
            Ok((0..count).map(|i| Control::new(xpath, i)).collect())
        } else {
            Ok(Vec::new())
        }
    }

    fn is_interactable(&mut self, control: &Control) -> Result<bool, BrowserError> {
        Ok(control.index >= 1)
    }

    fn scroll_into_view(&mut self, _control: &Control) -> Result<(), BrowserError> {
        Ok(())
    }

    fn activate(&mut self, control: &Control, how: Activation) -> Result<(), BrowserError> {
        if self.is_stuck(control) || self.site.failing_activations.contains(&how) {
            self.log.lock().unwrap().failed_activations += 1;
            return Err(BrowserError::Interaction("element click intercepted".into()));
        }
        self.log
            .lock()
            .unwrap()
            .activations
            .push((control.xpath.clone(), how));

        if control.xpath == CONSENT_XPATH {
            self.consent_pending = false;
        } else if self.current + 1 < self.site.pages.len() {
            self.current += 1;
        }
        Ok(())
    }

    fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }

    fn wait_for_body(&mut self, _timeout: Duration) -> Result<(), BrowserError> {
        Ok(())
    }

    fn close(self) {
        self.log.lock().unwrap().closed += 1;
    }
}

pub fn test_state(dir: &Path, site: FakeSite) -> AppState<FakeDriver> {
    let mut config = AppConfig::from_lookup(|_| None).unwrap();
    config.output_dir = dir.to_path_buf();
    config.max_pages = NonZeroUsize::new(10).unwrap();

    AppState {
        store: ArtifactStore::new(dir),
        driver: FakeDriver::new(site),
        timings: NavigationTimings::immediate(),
        mailer: None,
        config,
    }
}

/// Write an artifact into the state's store and return its file name.
pub fn seed_listings(state: &AppState<FakeDriver>, listings: Vec<Listing>) -> String {
    let artifact = state.store.finalize(listings).unwrap();
    artifact
        .path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

pub fn listing(ts: &str, city: &str, date: &str) -> Listing {
    Listing {
        ts_number: ts.into(),
        city: city.into(),
        date: date.into(),
        raw_data: format!("{ts} {city} {date}"),
        ..Default::default()
    }
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp)).unwrap()
}
