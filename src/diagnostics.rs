//! Self-checks for the deployment environment: can we write files, start a
//! browser, reach the auction site, and round-trip a CSV artifact.

use crate::browser::{BrowserDriver, BrowserSession};
use crate::config::AppConfig;
use crate::domain::Listing;
use crate::store::ArtifactStore;
use reqwest::blocking::Client;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    fn pass(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            message: message.into(),
        }
    }

    fn fail(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    pub checks: Vec<CheckResult>,
    pub passed: usize,
    pub total: usize,
    pub success_rate: f64,
    pub recommendation: String,
}

impl DiagnosticsReport {
    pub fn from_checks(checks: Vec<CheckResult>) -> Self {
        let total = checks.len();
        let passed = checks.iter().filter(|c| c.passed).count();
        let success_rate = if total == 0 {
            0.0
        } else {
            passed as f64 * 100.0 / total as f64
        };

        let recommendation = match checks.iter().find(|c| !c.passed) {
            None => "All checks passed. The scraper should run normally.".to_string(),
            Some(c) if c.name == "browser_launch" => {
                "Chrome could not start. Install Chrome/Chromium or set CHROME_PATH.".to_string()
            }
            Some(c) if c.name == "target_reachable" => {
                "The auction site is unreachable. Check outbound network access.".to_string()
            }
            Some(c) => format!("Fix the failing check first: {}", c.name),
        };

        Self {
            checks,
            passed,
            total,
            success_rate,
            recommendation,
        }
    }

    /// Plain text table for the CLI.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        for c in &self.checks {
            let mark = if c.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!("{mark:<5} {:<20} {}\n", c.name, c.message));
        }
        out.push_str(&format!(
            "\n{}/{} passed ({:.0}%)\n{}\n",
            self.passed, self.total, self.success_rate, self.recommendation
        ));
        out
    }
}

pub fn run_diagnostics<D: BrowserDriver>(config: &AppConfig, driver: &D) -> DiagnosticsReport {
    info!("🩺 Running diagnostics");

    let checks = vec![
        environment_info(config),
        dir_writable("output_dir_writable", &config.output_dir),
        dir_writable("temp_dir_writable", &std::env::temp_dir()),
        browser_launch(driver),
        target_reachable(&config.target_url, config.browser.page_load_timeout),
        csv_round_trip(),
    ];

    for c in checks.iter().filter(|c| !c.passed) {
        warn!("⚠️ Diagnostic {} failed: {}", c.name, c.message);
    }

    DiagnosticsReport::from_checks(checks)
}

fn environment_info(config: &AppConfig) -> CheckResult {
    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "<unknown>".into());

    CheckResult::pass(
        "environment",
        format!(
            "{} {} | cwd {cwd} | output {} | headless {}",
            std::env::consts::OS,
            std::env::consts::ARCH,
            config.output_dir.display(),
            config.browser.headless,
        ),
    )
}

pub fn dir_writable(name: &'static str, dir: &Path) -> CheckResult {
    let probe = dir.join(format!(".write_probe_{}", std::process::id()));

    let result = fs::create_dir_all(dir)
        .and_then(|_| fs::write(&probe, b"ok"))
        .and_then(|_| fs::remove_file(&probe));

    match result {
        Ok(()) => CheckResult::pass(name, format!("{} is writable", dir.display())),
        Err(e) => CheckResult::fail(name, format!("{}: {e}", dir.display())),
    }
}

fn browser_launch<D: BrowserDriver>(driver: &D) -> CheckResult {
    match driver.launch() {
        Ok(session) => {
            session.close();
            CheckResult::pass("browser_launch", "Headless browser started and closed")
        }
        Err(e) => CheckResult::fail("browser_launch", e.to_string()),
    }
}

fn target_reachable(url: &str, timeout: Duration) -> CheckResult {
    let client = match Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => return CheckResult::fail("target_reachable", e.to_string()),
    };

    match client.get(url).send() {
        Ok(resp) => {
            let status = resp.status();
            let message = format!("{url} answered {status}");
            if status.is_success() || status.is_redirection() {
                CheckResult::pass("target_reachable", message)
            } else {
                CheckResult::fail("target_reachable", message)
            }
        }
        Err(e) => CheckResult::fail("target_reachable", format!("{url}: {e}")),
    }
}

/// Write sample listings through the real store and read them back.
pub fn csv_round_trip() -> CheckResult {
    let dir = std::env::temp_dir().join(format!("foreclosure_diag_{}", std::process::id()));
    let result = csv_round_trip_in(&dir);
    let _ = fs::remove_dir_all(&dir);
    result
}

fn csv_round_trip_in(dir: &Path) -> CheckResult {
    let sample = vec![
        Listing {
            ts_number: "12345-CA".into(),
            address: "100 Main St".into(),
            city: "Fresno".into(),
            date: "01/15/2025".into(),
            raw_data: "12345-CA 100 Main St Fresno".into(),
            page_number: 1,
            ..Default::default()
        },
        Listing {
            ts_number: "67890-CA".into(),
            city: "Clovis".into(),
            details: "quoted \"value\", with comma".into(),
            raw_data: "67890-CA Clovis".into(),
            page_number: 1,
            ..Default::default()
        },
    ];

    let store = ArtifactStore::new(dir);
    let artifact = match store.finalize(sample.clone()) {
        Ok(a) => a,
        Err(e) => return CheckResult::fail("csv_round_trip", e.to_string()),
    };

    match store.load(&artifact.path) {
        Ok(loaded) if loaded == sample => {
            CheckResult::pass("csv_round_trip", format!("{} rows written and read back", loaded.len()))
        }
        Ok(loaded) => CheckResult::fail(
            "csv_round_trip",
            format!("read back {} rows that differ from the {} written", loaded.len(), sample.len()),
        ),
        Err(e) => CheckResult::fail("csv_round_trip", e.to_string()),
    }
}
