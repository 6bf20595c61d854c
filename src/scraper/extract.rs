// extract.rs
use crate::domain::listing::{ExtractionSource, Listing};
use crate::scraper::fields::parse_listing;
use crate::scraper::ScrapeError;
use regex::Regex;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

/// Blocks with this much text or less are navigation and layout, not listings.
pub const MIN_BLOCK_TEXT_CHARS: usize = 50;

static BLOCK_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"listing|property|auction|item").expect("block class regex"));

/// Pull every listing out of one rendered page. Tables are tried first; the
/// loose div scan only runs when no table produced anything. Never fails:
/// a page that cannot be processed yields no listings.
pub fn extract_page(html: &str, page_number: u32) -> Vec<Listing> {
    match try_extract_page(html, page_number) {
        Ok(listings) => listings,
        Err(e) => {
            warn!("⚠️ {e}");
            Vec::new()
        }
    }
}

fn try_extract_page(html: &str, page_number: u32) -> Result<Vec<Listing>, ScrapeError> {
    let document = Html::parse_document(html);

    let mut listings = extract_tables(&document, page_number)?;

    if listings.is_empty() {
        debug!("No table data on page {page_number}, trying listing blocks");
        listings = extract_blocks(&document, page_number)?;
    }

    info!("📋 Page {page_number}: extracted {} listings", listings.len());
    Ok(listings)
}

fn selector(css: &str, page: u32) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Extraction {
        page,
        reason: format!("bad selector {css}: {e}"),
    })
}

/// Trimmed text nodes joined by single spaces.
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_tables(document: &Html, page: u32) -> Result<Vec<Listing>, ScrapeError> {
    let table_sel = selector("table", page)?;
    let row_sel = selector("tr", page)?;
    let cell_sel = selector("th, td", page)?;

    let mut listings = Vec::new();

    for (table_index, table) in document.select(&table_sel).enumerate() {
        let rows: Vec<ElementRef> = table.select(&row_sel).collect();
        if rows.len() < 2 {
            continue;
        }

        let headers: Vec<String> = rows[0].select(&cell_sel).map(|c| element_text(&c)).collect();
        debug!(
            "Table {}: {} rows, headers {:?}",
            table_index + 1,
            rows.len(),
            headers
        );

        for (row_index, row) in rows.iter().enumerate().skip(1) {
            let cells: Vec<String> = row.select(&cell_sel).map(|c| element_text(&c)).collect();
            if cells.iter().all(|c| c.is_empty()) {
                continue;
            }

            let mut listing = parse_listing(&cells);
            listing.row_index = row_index as u32;
            listing.table_index = (table_index + 1) as u32;
            listing.page_number = page;
            listing.source = ExtractionSource::Table;
            listings.push(listing);
        }
    }

    Ok(listings)
}

fn extract_blocks(document: &Html, page: u32) -> Result<Vec<Listing>, ScrapeError> {
    let div_sel = selector("div[class]", page)?;

    let blocks = document.select(&div_sel).filter(|div| {
        div.value()
            .classes()
            .any(|class| BLOCK_CLASS.is_match(class))
    });

    let mut listings = Vec::new();

    for (block_index, block) in blocks.enumerate() {
        let text = element_text(&block);
        if text.chars().count() <= MIN_BLOCK_TEXT_CHARS {
            continue;
        }

        let mut listing = parse_listing(&[text]);
        listing.row_index = (block_index + 1) as u32;
        listing.table_index = 0;
        listing.page_number = page;
        listing.source = ExtractionSource::Block;
        listings.push(listing);
    }

    Ok(listings)
}
