use serde::{Deserialize, Serialize};

/// Columns that always lead the artifact, in this order.
pub const PREFERRED_FIELDS: [&str; 8] = [
    "ts_number", "address", "city", "county", "date", "price", "details", "status",
];

/// Every column a `Listing` carries.
pub const ALL_FIELDS: [&str; 13] = [
    "ts_number",
    "address",
    "city",
    "county",
    "date",
    "price",
    "details",
    "status",
    "raw_data",
    "row_index",
    "table_index",
    "page_number",
    "source",
];

/// Where a listing was found on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    #[default]
    Table,
    Block,
}

impl ExtractionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionSource::Table => "table",
            ExtractionSource::Block => "block",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "block" => ExtractionSource::Block,
            _ => ExtractionSource::Table,
        }
    }
}

/// One foreclosure auction record.
///
/// Text fields are never absent: a field the parser could not find is an
/// empty string, so every row written has the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Listing {
    pub ts_number: String,
    pub address: String,
    pub city: String,
    pub county: String,
    pub date: String,
    pub price: String,
    pub details: String,
    pub status: String,
    pub raw_data: String,

    // Provenance
    pub row_index: u32,
    pub table_index: u32,
    pub page_number: u32,
    pub source: ExtractionSource,
}

impl Listing {
    /// Dedup key: uppercase, only `[A-Z0-9-]` kept. `None` when nothing survives.
    pub fn identity(&self) -> Option<String> {
        identity_key(&self.ts_number)
    }

    /// Value of a column by name, as it is written to the artifact.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "ts_number" => self.ts_number.clone(),
            "address" => self.address.clone(),
            "city" => self.city.clone(),
            "county" => self.county.clone(),
            "date" => self.date.clone(),
            "price" => self.price.clone(),
            "details" => self.details.clone(),
            "status" => self.status.clone(),
            "raw_data" => self.raw_data.clone(),
            "row_index" => self.row_index.to_string(),
            "table_index" => self.table_index.to_string(),
            "page_number" => self.page_number.to_string(),
            "source" => self.source.as_str().to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a column from its artifact text. Unknown columns are ignored and
    /// unparseable provenance numbers read as 0.
    pub fn set_field(&mut self, name: &str, value: &str) {
        let value = value.trim();
        match name {
            "ts_number" => self.ts_number = value.to_string(),
            "address" => self.address = value.to_string(),
            "city" => self.city = value.to_string(),
            "county" => self.county = value.to_string(),
            "date" => self.date = value.to_string(),
            "price" => self.price = value.to_string(),
            "details" => self.details = value.to_string(),
            "status" => self.status = value.to_string(),
            "raw_data" => self.raw_data = value.to_string(),
            "row_index" => self.row_index = value.parse().unwrap_or(0),
            "table_index" => self.table_index = value.parse().unwrap_or(0),
            "page_number" => self.page_number = value.parse().unwrap_or(0),
            "source" => self.source = ExtractionSource::parse(value),
            _ => {}
        }
    }
}

pub fn identity_key(ts_number: &str) -> Option<String> {
    let key: String = ts_number
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Column order for an artifact: the preferred columns that are present,
/// then everything else sorted.
pub fn header_fields<'a>(present: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut rest: Vec<String> = Vec::new();
    let mut seen_preferred = [false; PREFERRED_FIELDS.len()];

    for name in present {
        match PREFERRED_FIELDS.iter().position(|p| *p == name) {
            Some(i) => seen_preferred[i] = true,
            None => {
                if !rest.iter().any(|r| r == name) {
                    rest.push(name.to_string());
                }
            }
        }
    }
    rest.sort();

    PREFERRED_FIELDS
        .iter()
        .zip(seen_preferred)
        .filter(|(_, seen)| *seen)
        .map(|(name, _)| name.to_string())
        .chain(rest)
        .collect()
}

/// Title case the way listing cities are displayed: first letter of each
/// alphabetic run upper, the rest lower.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}
