use crate::router::handle;
use crate::tests::utils::{
    body_json, body_string, listing, seed_listings, table_page, test_state, FakeSite,
};
use astra::Body;
use http::{Method, Request};

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, form: &str, htmx: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if htmx {
        builder = builder.header("HX-Request", "true");
    }
    builder.body(Body::from(form.as_bytes().to_vec())).unwrap()
}

fn seeded_state(dir: &std::path::Path) -> crate::router::AppState<crate::tests::utils::FakeDriver> {
    let state = test_state(dir, FakeSite::default());
    seed_listings(
        &state,
        vec![
            listing("11111-CA", "Fresno", "01/15/2025"),
            listing("22222-CA", "Clovis", "02/20/2025"),
            listing("33333-CA", "", "01/10/2025"),
            listing("44444-CA", "West Fresno", "not scheduled"),
        ],
    );
    state
}

#[test]
fn health_reports_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path(), FakeSite::default());

    let json = body_json(handle(get("/health"), &state).unwrap());
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["scraper_type"], "headless_chrome");
    assert_eq!(json["csv_files"], 0);
    assert!(json["latest_csv"].is_null());

    let name = seed_listings(&state, vec![listing("11111-CA", "Fresno", "")]);
    let json = body_json(handle(get("/health"), &state).unwrap());
    assert_eq!(json["csv_files"], 1);
    assert_eq!(json["latest_csv"], name.as_str());
}

#[test]
fn cities_are_empty_before_first_scrape() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path(), FakeSite::default());

    let json = body_json(handle(get("/cities"), &state).unwrap());
    assert_eq!(json["cities"], serde_json::json!([]));
}

#[test]
fn cities_come_from_latest_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let state = seeded_state(tmp.path());

    let json = body_json(handle(get("/cities"), &state).unwrap());
    assert_eq!(json["cities"], serde_json::json!(["Clovis", "Fresno", "West Fresno"]));
}

#[test]
fn filter_by_city_and_dates() {
    let tmp = tempfile::tempdir().unwrap();
    let state = seeded_state(tmp.path());

    let resp = handle(
        post_form("/filter", "city=fresno&start_date=2025-01-01&end_date=2025-01-31", false),
        &state,
    )
    .unwrap();
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert_eq!(json["success"], true);
    assert_eq!(json["total_available"], 4);
    assert_eq!(json["count"], 2);
    assert_eq!(json["results"][0]["ts_number"], "11111-CA");
    assert_eq!(json["results"][1]["ts_number"], "44444-CA");
    assert_eq!(json["email_sent"], false);
    assert!(json["email_message"].is_null());
}

#[test]
fn filter_all_cities_keeps_rows_without_city() {
    let tmp = tempfile::tempdir().unwrap();
    let state = seeded_state(tmp.path());

    let json = body_json(
        handle(
            post_form("/filter", "city=all&start_date=2025-01-01&end_date=2025-01-31", false),
            &state,
        )
        .unwrap(),
    );
    assert_eq!(json["count"], 3);
}

#[test]
fn filter_rejects_reversed_range() {
    let tmp = tempfile::tempdir().unwrap();
    let state = seeded_state(tmp.path());

    let resp = handle(
        post_form("/filter", "start_date=2025-02-01&end_date=2025-01-01", false),
        &state,
    )
    .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(body_json(resp)["success"], false);
}

#[test]
fn filter_requires_both_dates() {
    let tmp = tempfile::tempdir().unwrap();
    let state = seeded_state(tmp.path());

    let resp = handle(post_form("/filter", "city=all&start_date=2025-02-01", false), &state).unwrap();
    assert_eq!(resp.status(), 400);
    assert!(body_json(resp)["error"]
        .as_str()
        .unwrap()
        .contains("Start date and end date are required"));
}

#[test]
fn filter_email_without_configuration_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let state = seeded_state(tmp.path());

    let json = body_json(
        handle(
            post_form(
                "/filter",
                "start_date=2025-01-01&end_date=2025-12-31&email=someone%40example.com",
                false,
            ),
            &state,
        )
        .unwrap(),
    );
    assert_eq!(json["email_sent"], false);
    assert_eq!(json["email_message"], "Email not sent - check configuration");
}

#[test]
fn filter_for_htmx_returns_a_fragment() {
    let tmp = tempfile::tempdir().unwrap();
    let state = seeded_state(tmp.path());

    let resp = handle(
        post_form("/filter", "city=Clovis&start_date=2025-01-01&end_date=2025-12-31", true),
        &state,
    )
    .unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(!body.contains("<html"));
    assert!(body.contains("22222-CA"));
    assert!(!body.contains("11111-CA"));
}

#[test]
fn filter_errors_for_htmx_stay_swappable() {
    let tmp = tempfile::tempdir().unwrap();
    let state = seeded_state(tmp.path());

    let resp = handle(post_form("/filter", "city=all", true), &state).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("alert-error"));
}

#[test]
fn scrape_all_runs_and_reports() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(
        tmp.path(),
        FakeSite {
            pages: vec![
                table_page(&[("11111-CA", "Fresno"), ("22222-CA", "Clovis")]),
                table_page(&[("22222-CA", "Madera")]),
            ],
            consent: true,
            ..Default::default()
        },
    );

    let json = body_json(handle(post_form("/scrape_all", "", false), &state).unwrap());

    assert_eq!(json["success"], true);
    assert_eq!(json["pages_visited"], 2);
    assert_eq!(json["total_extracted"], 3);
    assert_eq!(json["unique_listings"], 2);
    assert_eq!(json["cities_found"], 2);
    assert_eq!(json["cities"], serde_json::json!(["Fresno", "Madera"]));

    let latest = state.store.latest().unwrap().unwrap();
    assert!(latest.ends_with(json["csv_path"].as_str().unwrap()));
    assert_eq!(state.driver.log().closed, 1);
}

#[test]
fn scrape_all_failure_is_a_json_error() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(
        tmp.path(),
        FakeSite {
            fail_launch: true,
            ..Default::default()
        },
    );

    let resp = handle(post_form("/scrape_all", "", false), &state).unwrap();
    assert_eq!(resp.status(), 500);

    let json = body_json(resp);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("Browser session failed to start"));
}
