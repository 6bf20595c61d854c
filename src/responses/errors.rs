use crate::errors::ServerError;
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;

fn fallback() -> Response {
    Response::new(Body::from("Internal Server Error"))
}

/// Convert a ServerError into a proper HTML response page
pub fn html_error_response(err: &ServerError) -> Response {
    let status = err.status();
    let message = match err {
        ServerError::NotFound => "Not Found".to_string(),
        ServerError::InternalError => "Internal Server Error".to_string(),
        other => other.to_string(),
    };

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::TEXT_HTML_UTF_8.as_ref())
        .body(Body::from(error_page(status, &message).into_string()))
        .unwrap_or_else(|_| fallback())
}

/// `{success: false, error}` for API callers.
pub fn json_error_response(err: &ServerError) -> Response {
    let body = json!({ "success": false, "error": err.to_string() }).to_string();

    ResponseBuilder::new()
        .status(err.status())
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(Body::from(body))
        .unwrap_or_else(|_| fallback())
}
