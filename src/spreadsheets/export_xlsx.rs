use crate::domain::Listing;
use crate::errors::ServerError;
use crate::responses::xlsx_response;
use crate::responses::ResultResp;
use rust_xlsxwriter::{Format, Workbook};

const HEADERS: [&str; 9] = [
    "TS Number",
    "Address",
    "City",
    "County",
    "Sale Date",
    "Price",
    "Status",
    "Page",
    "Details",
];

fn xlsx_err(what: &str, e: rust_xlsxwriter::XlsxError) -> ServerError {
    ServerError::XlsxError(format!("Failed to write {what}: {e}"))
}

/// One sheet, one row per listing, header row in bold.
pub fn listings_workbook(listings: &[&Listing]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(|e| xlsx_err(&format!("header '{header}'"), e))?;
    }

    for (i, listing) in listings.iter().enumerate() {
        let r = (i + 1) as u32;

        let text_cells = [
            &listing.ts_number,
            &listing.address,
            &listing.city,
            &listing.county,
            &listing.date,
            &listing.price,
            &listing.status,
        ];
        for (col, value) in text_cells.into_iter().enumerate() {
            worksheet
                .write_string(r, col as u16, value.as_str())
                .map_err(|e| xlsx_err(HEADERS[col], e))?;
        }

        worksheet
            .write_number(r, 7, listing.page_number as f64)
            .map_err(|e| xlsx_err("page", e))?;

        worksheet
            .write_string(r, 8, listing.details.as_str())
            .map_err(|e| xlsx_err("details", e))?;
    }

    worksheet.autofit();

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}

pub fn export_listings_xlsx(listings: &[&Listing], label: &str) -> ResultResp {
    let buffer = listings_workbook(listings)?;
    let slug: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();

    xlsx_response(buffer, &format!("listings_{slug}.xlsx"))
}
