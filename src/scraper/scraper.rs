// scraper.rs
use crate::browser::{BrowserDriver, BrowserSession, Control, ACTIVATION_ORDER};
use crate::domain::listing::Listing;
use crate::scraper::extract::extract_page;
use crate::scraper::ScrapeError;
use crate::store::ArtifactStore;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Candidate "agree/accept" controls for the disclaimer interstitial, in
/// priority order.
pub const CONSENT_SELECTORS: [&str; 6] = [
    "//a[contains(text(), 'Agree')]",
    "//button[contains(text(), 'Agree')]",
    "//input[@value='Agree']",
    "//a[contains(text(), 'Accept')]",
    "//button[contains(text(), 'Accept')]",
    "//input[@value='Accept']",
];

/// Candidate "next page" controls, in priority order.
pub const NEXT_SELECTORS: [&str; 8] = [
    "//a[contains(text(), 'Next')]",
    "//button[contains(text(), 'Next')]",
    "//a[contains(@class, 'next')]",
    "//button[contains(@class, 'next')]",
    "//a[contains(text(), '>')]",
    "//button[contains(text(), '>')]",
    "//a[contains(@title, 'Next')]",
    "//button[contains(@title, 'Next')]",
];

/// Fixed waits between browser steps.
#[derive(Debug, Clone, Copy)]
pub struct NavigationTimings {
    /// How long each consent candidate gets to appear.
    pub consent_wait: Duration,
    /// Settle time after accepting consent; the site reloads.
    pub consent_reload: Duration,
    pub body_wait: Duration,
    /// Before reading a freshly loaded page.
    pub render: Duration,
    /// After scrolling to the bottom so lazy content can arrive.
    pub scroll_settle: Duration,
    pub scroll_into_view: Duration,
    /// After a next control was activated.
    pub next_settle: Duration,
}

impl Default for NavigationTimings {
    fn default() -> Self {
        Self {
            consent_wait: Duration::from_secs(5),
            consent_reload: Duration::from_secs(5),
            body_wait: Duration::from_secs(15),
            render: Duration::from_secs(3),
            scroll_settle: Duration::from_secs(2),
            scroll_into_view: Duration::from_secs(1),
            next_settle: Duration::from_secs(5),
        }
    }
}

impl NavigationTimings {
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            consent_wait: Duration::ZERO,
            consent_reload: Duration::ZERO,
            body_wait: Duration::ZERO,
            render: Duration::ZERO,
            scroll_settle: Duration::ZERO,
            scroll_into_view: Duration::ZERO,
            next_settle: Duration::ZERO,
        }
    }
}

/// What one completed traversal run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub artifact: PathBuf,
    pub total_extracted: usize,
    pub unique_listings: usize,
    pub pages_visited: usize,
    pub consent_accepted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    ConsentCheck,
    PageLoad { page: usize },
    NextPageCheck { page: usize },
    Done { pages: usize },
}

struct Traversal {
    listings: Vec<Listing>,
    pages: usize,
    consent_accepted: bool,
}

pub struct ForeclosureScraper<D: BrowserDriver> {
    driver: D,
    store: ArtifactStore,
    timings: NavigationTimings,
}

impl<D: BrowserDriver> ForeclosureScraper<D> {
    pub fn new(driver: D, store: ArtifactStore) -> Self {
        Self {
            driver,
            store,
            timings: NavigationTimings::default(),
        }
    }

    pub fn with_timings(mut self, timings: NavigationTimings) -> Self {
        self.timings = timings;
        self
    }

    /// One traversal run: consent, every page up to `max_pages`, then a single
    /// deduplicated artifact. Startup and initial load failures produce no
    /// artifact. The browser session is closed before this returns.
    pub fn run(&self, target_url: &str, max_pages: NonZeroUsize) -> Result<RunSummary, ScrapeError> {
        info!("🧵 Scrape started for {target_url} (max {max_pages} pages)");

        let mut session = self
            .driver
            .launch()
            .map_err(|e| ScrapeError::SessionStart(e.to_string()))?;

        let traversal = self.traverse(&mut session, target_url, max_pages);
        session.close();

        let traversal = traversal?;
        let total_extracted = traversal.listings.len();
        info!(
            "📄 Extracted {total_extracted} listings from {} pages",
            traversal.pages
        );

        let artifact = self.store.finalize(traversal.listings)?;

        info!("✅ Scrape complete: {}", artifact.path.display());
        Ok(RunSummary {
            artifact: artifact.path,
            total_extracted,
            unique_listings: artifact.unique_listings,
            pages_visited: traversal.pages,
            consent_accepted: traversal.consent_accepted,
        })
    }

    fn traverse(
        &self,
        session: &mut D::Session,
        target_url: &str,
        max_pages: NonZeroUsize,
    ) -> Result<Traversal, ScrapeError> {
        let mut listings = Vec::new();
        let mut consent_accepted = false;
        let mut phase = Phase::Init;

        loop {
            debug!("Phase {phase:?}");

            phase = match phase {
                Phase::Init => {
                    session
                        .navigate(target_url)
                        .map_err(|e| ScrapeError::PageLoad {
                            url: target_url.to_string(),
                            reason: e.to_string(),
                        })?;
                    Phase::ConsentCheck
                }

                Phase::ConsentCheck => {
                    consent_accepted = self.accept_consent(session);
                    if !consent_accepted {
                        info!("No disclaimer found or already accepted");
                    }
                    Phase::PageLoad { page: 1 }
                }

                Phase::PageLoad { page } => {
                    let found = self.extract_current_page(session, page);
                    info!("📋 Page {page}: found {} listings", found.len());
                    listings.extend(found);
                    Phase::NextPageCheck { page }
                }

                Phase::NextPageCheck { page } => {
                    if page >= max_pages.get() {
                        info!("🛑 Reached page limit ({max_pages}), stopping");
                        Phase::Done { pages: page }
                    } else if self.advance(session) {
                        info!("➡️ Navigated to page {}", page + 1);
                        session.pause(self.timings.next_settle);
                        Phase::PageLoad { page: page + 1 }
                    } else {
                        info!("🏁 No more pages found after page {page}");
                        Phase::Done { pages: page }
                    }
                }

                Phase::Done { pages } => {
                    return Ok(Traversal {
                        listings,
                        pages,
                        consent_accepted,
                    });
                }
            };
        }
    }

    /// Try each consent candidate in order. Missing consent is not an error.
    fn accept_consent(&self, session: &mut D::Session) -> bool {
        for xpath in CONSENT_SELECTORS {
            let control = match session.wait_for_control(xpath, self.timings.consent_wait) {
                Ok(control) => control,
                Err(e) => {
                    debug!("Consent candidate {xpath} not present: {e}");
                    continue;
                }
            };

            info!("Found disclaimer control: {xpath}");
            self.bring_into_view(session, &control);

            if let Err(e) = self.activate(session, &control) {
                warn!("⚠️ {e}");
                continue;
            }

            info!("✅ Disclaimer accepted");
            session.pause(self.timings.consent_reload);
            if let Err(e) = session.wait_for_body(self.timings.body_wait) {
                warn!("⚠️ Page body did not return after consent: {e}");
            }
            return true;
        }

        false
    }

    /// Find and activate the first visible, enabled next control.
    fn advance(&self, session: &mut D::Session) -> bool {
        for xpath in NEXT_SELECTORS {
            let controls = match session.find_controls(xpath) {
                Ok(controls) => controls,
                Err(e) => {
                    debug!("Next candidate {xpath} failed: {e}");
                    continue;
                }
            };

            for control in controls {
                match session.is_interactable(&control) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        debug!("Could not inspect {xpath}[{}]: {e}", control.index);
                        continue;
                    }
                }

                info!("Found next page control: {xpath}");
                self.bring_into_view(session, &control);

                match self.activate(session, &control) {
                    Ok(()) => return true,
                    Err(e) => warn!("⚠️ {e}"),
                }
            }
        }

        false
    }

    /// Activation strategies in order until one succeeds.
    fn activate(&self, session: &mut D::Session, control: &Control) -> Result<(), ScrapeError> {
        for (attempt, how) in ACTIVATION_ORDER.into_iter().enumerate() {
            match session.activate(control, how) {
                Ok(()) => {
                    debug!("Activated {} via {how:?}", control.xpath);
                    return Ok(());
                }
                Err(e) => debug!("Activation {} via {how:?} failed: {e}", attempt + 1),
            }
        }

        Err(ScrapeError::ControlNotActivated {
            selector: control.xpath.clone(),
            attempts: ACTIVATION_ORDER.len(),
        })
    }

    fn bring_into_view(&self, session: &mut D::Session, control: &Control) {
        if let Err(e) = session.scroll_into_view(control) {
            debug!("Scroll into view failed for {}: {e}", control.xpath);
        }
        session.pause(self.timings.scroll_into_view);
    }

    /// A page that cannot be read counts as a page with no listings.
    fn extract_current_page(&self, session: &mut D::Session, page: usize) -> Vec<Listing> {
        session.pause(self.timings.render);

        if let Err(e) = session.scroll_to_bottom() {
            debug!("Scroll to bottom failed on page {page}: {e}");
        }
        session.pause(self.timings.scroll_settle);

        match session.page_html() {
            Ok(html) => extract_page(&html, page as u32),
            Err(e) => {
                let e = ScrapeError::Extraction {
                    page: page as u32,
                    reason: e.to_string(),
                };
                warn!("⚠️ {e}");
                Vec::new()
            }
        }
    }
}
