// responses/files.rs
use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Raw artifact contents shown inline.
pub fn text_response(body: Vec<u8>) -> ResultResp {
    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", mime::TEXT_PLAIN_UTF_8.as_ref())
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)
}

pub fn csv_download_response(body: Vec<u8>, filename: &str) -> ResultResp {
    attachment(body, mime::TEXT_CSV_UTF_8.as_ref(), filename)
}

pub fn xlsx_response(workbook: Vec<u8>, filename: &str) -> ResultResp {
    attachment(workbook, XLSX, filename)
}

/// Quotes in `filename` would end the header value early.
fn attachment(body: Vec<u8>, content_type: &str, filename: &str) -> ResultResp {
    let filename = filename.replace('"', "");

    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", content_type)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)
}
