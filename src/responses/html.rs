use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};
use maud::Markup;

pub fn html_response(markup: Markup) -> ResultResp {
    let body = markup.into_string();

    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", mime::TEXT_HTML_UTF_8.as_ref())
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)
}

/// htmx only swaps 2xx responses, so failures inside a fragment are still 200.
pub fn html_fragment_error(err: &ServerError) -> ResultResp {
    html_response(crate::templates::components::alert("error", &err.to_string()))
}
