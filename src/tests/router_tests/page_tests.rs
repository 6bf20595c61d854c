use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_string, listing, seed_listings, test_state, FakeSite};
use astra::Body;
use http::{Method, Request};

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[test]
fn home_page_loads_without_any_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path(), FakeSite::default());

    let resp = handle(get("/"), &state).expect("Failed to handle request");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Foreclosure Auction Listings"));
    assert!(body.contains("No listings collected yet."));
    assert!(body.contains("hx-post=\"/scrape_all\""));
}

#[test]
fn home_page_lists_cities_from_latest_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path(), FakeSite::default());
    let name = seed_listings(
        &state,
        vec![
            listing("11111-CA", "fresno", "01/15/2025"),
            listing("22222-CA", "Clovis", "01/20/2025"),
        ],
    );

    let body = body_string(handle(get("/"), &state).unwrap());

    assert!(body.contains(&name));
    assert!(body.contains("<option value=\"Clovis\">"));
    assert!(body.contains("<option value=\"Fresno\">"));
}

#[test]
fn csv_serves_latest_artifact_as_text() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path(), FakeSite::default());
    seed_listings(&state, vec![listing("11111-CA", "Fresno", "01/15/2025")]);

    let resp = handle(get("/csv"), &state).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap().to_str().unwrap(),
        "text/plain; charset=utf-8"
    );

    let body = body_string(resp);
    assert!(body.starts_with("\"ts_number\",\"address\",\"city\""));
    assert!(body.contains("\"11111-CA\""));
}

#[test]
fn csv_without_artifact_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path(), FakeSite::default());

    let err = handle(get("/csv"), &state).unwrap_err();
    assert!(matches!(err, ServerError::Missing(_)));
    assert_eq!(err.status(), 404);
}

#[test]
fn csvdata_is_a_dated_download() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path(), FakeSite::default());
    seed_listings(&state, vec![listing("11111-CA", "Fresno", "01/15/2025")]);

    let resp = handle(get("/csvdata"), &state).unwrap();
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    assert!(disposition.starts_with("attachment; filename=\"foreclosure_listings_"));
    assert!(disposition.ends_with(".csv\""));
}

#[test]
fn csv_path_outside_store_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let store_dir = tmp.path().join("csv_data");
    let state = test_state(&store_dir, FakeSite::default());
    seed_listings(&state, vec![listing("11111-CA", "Fresno", "01/15/2025")]);
    std::fs::write(tmp.path().join("other.csv"), "secret").unwrap();

    let err = handle(get("/csv?csv_path=..%2Fother.csv"), &state).unwrap_err();
    assert!(matches!(err, ServerError::BadRequest(_)));
}

#[test]
fn xlsx_export_applies_the_filter() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path(), FakeSite::default());
    seed_listings(&state, vec![listing("11111-CA", "Fresno", "01/15/2025")]);

    let resp = handle(
        get("/export.xlsx?city=Fresno&start_date=2025-01-01&end_date=2025-01-31"),
        &state,
    )
    .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Disposition").unwrap().to_str().unwrap(),
        "attachment; filename=\"listings_fresno.xlsx\""
    );
}

#[test]
fn unknown_route_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path(), FakeSite::default());

    let err = handle(get("/nope"), &state).unwrap_err();
    assert!(matches!(err, ServerError::NotFound));
}
