use crate::browser::{BrowserDriver, ChromeDriver};
use crate::config::AppConfig;
use crate::diagnostics::run_diagnostics;
use crate::domain::{distinct_cities, Listing, ListingFilter};
use crate::errors::ServerError;
use crate::mailer::BrevoMailer;
use crate::responses::{
    csv_download_response, html_fragment_error, html_response, json_error_response,
    json_response, text_response, ResultResp,
};
use crate::scraper::{ForeclosureScraper, NavigationTimings};
use crate::spreadsheets::export_listings_xlsx;
use crate::store::{write_listings, ArtifactStore};
use crate::templates;
use crate::templates::pages::{FilterOutcome, HomeVm};
use astra::Request;
use chrono::{Duration, Local, NaiveDate};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Everything a request handler needs. Shared by all server workers.
pub struct AppState<D: BrowserDriver = ChromeDriver> {
    pub config: AppConfig,
    pub store: ArtifactStore,
    pub driver: D,
    pub timings: NavigationTimings,
    pub mailer: Option<BrevoMailer>,
}

impl AppState<ChromeDriver> {
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            store: ArtifactStore::new(&config.output_dir),
            driver: ChromeDriver::new(config.browser.clone()),
            timings: NavigationTimings::default(),
            mailer: config.email.clone().map(BrevoMailer::new),
            config,
        }
    }
}

/// Routes answering in JSON rather than HTML pages.
const API_PATHS: [&str; 5] = ["/scrape_all", "/filter", "/cities", "/health", "/diagnostics"];

pub fn handle<D: BrowserDriver>(req: Request, state: &AppState<D>) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let htmx = req.headers().contains_key("HX-Request");

    match route(&method, &path, req, htmx, state) {
        Err(ServerError::NotFound) => Err(ServerError::NotFound),
        Err(e) if htmx => {
            warn!("⚠️ {method} {path}: {e}");
            html_fragment_error(&e)
        }
        Err(e) if API_PATHS.contains(&path.as_str()) => {
            warn!("⚠️ {method} {path}: {e}");
            Ok(json_error_response(&e))
        }
        other => other,
    }
}

fn route<D: BrowserDriver>(
    method: &str,
    path: &str,
    req: Request,
    htmx: bool,
    state: &AppState<D>,
) -> ResultResp {
    match (method, path) {
        ("GET", "/") => home(state),
        ("POST", "/scrape_all") => scrape_all(state, htmx),
        ("POST", "/filter") => {
            let params = parse_form_body(req)?;
            filter(state, &params, htmx)
        }
        ("GET", "/csv") => {
            let path = state.store.select(parse_query(&req).get("csv_path").map(String::as_str))?;
            text_response(fs::read(path)?)
        }
        ("GET", "/csvdata") => {
            let path = state.store.select(parse_query(&req).get("csv_path").map(String::as_str))?;
            let filename = format!("foreclosure_listings_{}.csv", Local::now().format("%Y%m%d"));
            csv_download_response(fs::read(path)?, &filename)
        }
        ("GET", "/export.xlsx") => export_xlsx(state, &parse_query(&req)),
        ("GET", "/cities") => cities(state),
        ("GET", "/health") => health(state),
        ("GET", "/diagnostics") => {
            let report = run_diagnostics(&state.config, &state.driver);
            json_response(200, &report)
        }
        _ => Err(ServerError::NotFound),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Listings from the latest artifact, or none when nothing was scraped yet.
fn latest_listings<D: BrowserDriver>(state: &AppState<D>) -> Result<Vec<Listing>, ServerError> {
    match state.store.latest()? {
        Some(path) => Ok(state.store.load(&path)?),
        None => Ok(Vec::new()),
    }
}

fn home<D: BrowserDriver>(state: &AppState<D>) -> ResultResp {
    let today = Local::now().date_naive();
    let latest = state.store.latest()?;

    let cities = match &latest {
        Some(path) => distinct_cities(&state.store.load(path)?),
        None => Vec::new(),
    };

    let vm = HomeVm {
        cities,
        latest_csv: latest.as_deref().map(file_name),
        start_date: today,
        end_date: today + Duration::days(30),
        email_enabled: state.mailer.is_some(),
    };

    html_response(templates::pages::home_page(&vm))
}

fn scrape_all<D: BrowserDriver>(state: &AppState<D>, htmx: bool) -> ResultResp {
    let scraper = ForeclosureScraper::new(&state.driver, state.store.clone())
        .with_timings(state.timings);

    let summary = scraper.run(&state.config.target_url, state.config.max_pages)?;
    let cities = distinct_cities(&state.store.load(&summary.artifact)?);

    if htmx {
        return html_response(templates::pages::scrape_results(&summary, &cities));
    }

    json_response(
        200,
        &json!({
            "success": true,
            "message": format!(
                "Scraped {} pages, {} unique listings",
                summary.pages_visited, summary.unique_listings
            ),
            "csv_path": file_name(&summary.artifact),
            "total_extracted": summary.total_extracted,
            "unique_listings": summary.unique_listings,
            "pages_visited": summary.pages_visited,
            "consent_accepted": summary.consent_accepted,
            "cities_found": cities.len(),
            "cities": cities.iter().take(10).collect::<Vec<_>>(),
        }),
    )
}

struct FilterRequest {
    filter: ListingFilter,
    email: Option<String>,
    csv_path: Option<String>,
}

fn parse_date(params: &HashMap<String, String>, name: &str) -> Result<NaiveDate, ServerError> {
    let raw = params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Start date and end date are required".into()))?;

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ServerError::BadRequest(format!("{name} must be YYYY-MM-DD, got {raw}")))
}

fn parse_filter_request(params: &HashMap<String, String>) -> Result<FilterRequest, ServerError> {
    let start = parse_date(params, "start_date")?;
    let end = parse_date(params, "end_date")?;
    if start > end {
        return Err(ServerError::BadRequest(
            "Start date must not be after end date".into(),
        ));
    }

    let city = params.get("city").map(String::as_str).unwrap_or("all");
    let non_empty = |name: &str| {
        params
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(FilterRequest {
        filter: ListingFilter::new(city, start, end),
        email: non_empty("email"),
        csv_path: non_empty("csv_path"),
    })
}

fn filter<D: BrowserDriver>(
    state: &AppState<D>,
    params: &HashMap<String, String>,
    htmx: bool,
) -> ResultResp {
    let request = parse_filter_request(params)?;
    let path = state.store.select(request.csv_path.as_deref())?;
    let listings = state.store.load(&path)?;
    let results = request.filter.apply(&listings);

    info!(
        "🔎 Filter {} {}..{}: {} of {} listings",
        request.filter.city_label(),
        request.filter.start,
        request.filter.end,
        results.len(),
        listings.len()
    );

    let (email_sent, email_message) = match &request.email {
        Some(to) => send_results_email(state, to, &request.filter, &results),
        None => (false, None),
    };

    let outcome = FilterOutcome {
        filter: &request.filter,
        results,
        total_available: listings.len(),
        email_sent,
        email_message,
    };

    if htmx {
        return html_response(templates::pages::filter_results(&outcome));
    }

    json_response(
        200,
        &json!({
            "success": true,
            "results": outcome.results,
            "count": outcome.results.len(),
            "total_available": outcome.total_available,
            "email_sent": outcome.email_sent,
            "email_message": outcome.email_message,
        }),
    )
}

fn send_results_email<D: BrowserDriver>(
    state: &AppState<D>,
    to: &str,
    filter: &ListingFilter,
    results: &[&Listing],
) -> (bool, Option<String>) {
    let Some(mailer) = &state.mailer else {
        return (false, Some("Email not sent - check configuration".into()));
    };

    let owned: Vec<Listing> = results.iter().map(|l| (*l).clone()).collect();
    let mut csv = Vec::new();
    if let Err(e) = write_listings(&mut csv, &owned) {
        return (false, Some(format!("Email not sent - {e}")));
    }

    match mailer.send_results(to, filter, results.len(), &csv) {
        Ok(()) => {
            info!("📧 Sent {} results to {to}", results.len());
            (true, Some(format!("Email sent to {to}")))
        }
        Err(e) => {
            warn!("⚠️ Email to {to} failed: {e}");
            (false, Some(format!("Email not sent - {e}")))
        }
    }
}

fn export_xlsx<D: BrowserDriver>(state: &AppState<D>, params: &HashMap<String, String>) -> ResultResp {
    let request = parse_filter_request(params)?;
    let path = state.store.select(request.csv_path.as_deref())?;
    let listings = state.store.load(&path)?;
    let results = request.filter.apply(&listings);

    export_listings_xlsx(&results, request.filter.city_label())
}

fn cities<D: BrowserDriver>(state: &AppState<D>) -> ResultResp {
    let cities = distinct_cities(&latest_listings(state)?);
    json_response(200, &json!({ "cities": cities }))
}

fn health<D: BrowserDriver>(state: &AppState<D>) -> ResultResp {
    let files = state.store.list()?;
    let latest = state.store.latest()?;

    json_response(
        200,
        &json!({
            "status": "healthy",
            "scraper_type": "headless_chrome",
            "csv_files": files.len(),
            "latest_csv": latest.as_deref().map(file_name),
        }),
    )
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn parse_form_body(req: Request) -> Result<HashMap<String, String>, ServerError> {
    let mut body = Vec::new();
    req.into_body()
        .reader()
        .read_to_end(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("Unreadable form body: {e}")))?;

    Ok(url::form_urlencoded::parse(&body).into_owned().collect())
}
