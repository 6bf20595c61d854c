pub mod errors;
pub mod files;
pub mod html;
pub mod json;

pub use crate::errors::ResultResp;

pub use errors::{html_error_response, json_error_response};
pub use files::{csv_download_response, text_response, xlsx_response};
pub use html::{html_fragment_error, html_response};
pub use json::json_response;
