// fields.rs
//
// Pattern rules that turn the text of one table row (or listing block) into a
// `Listing`. Every field has its own ordered rule list; the first rule that
// matches wins and later rules are never consulted.

use crate::domain::listing::{identity_key, title_case, ExtractionSource, Listing};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

pub const DETAILS_MAX_CHARS: usize = 1000;

/// Shortest token accepted as a trustee sale number.
const TS_NUMBER_MIN_LEN: usize = 5;

const KNOWN_CITIES: &[&str] = &[
    "Los Angeles", "San Francisco", "San Diego", "Sacramento", "Oakland", "Fresno",
    "Long Beach", "Bakersfield", "Anaheim", "Riverside", "Santa Ana", "Stockton", "Irvine",
    "Chula Vista", "Fremont", "San Bernardino", "Modesto", "Fontana", "Oxnard",
    "Moreno Valley", "Huntington Beach", "Glendale", "Santa Clarita", "Garden Grove",
    "Oceanside", "Rancho Cucamonga", "Santa Rosa", "Ontario", "Lancaster", "Elk Grove",
    "Corona", "Palmdale", "Salinas", "Pomona", "Hayward", "Escondido", "Torrance",
    "Sunnyvale", "Orange", "Fullerton", "Pasadena", "Thousand Oaks", "Visalia",
    "Simi Valley", "Concord", "Roseville", "Rocklin", "Victorville", "Santa Clara",
    "Vallejo", "Berkeley", "El Monte", "Downey", "Costa Mesa", "Inglewood", "Carlsbad",
    "San Buenaventura", "Fairfield", "West Covina", "Murrieta", "Richmond", "Norwalk",
    "Antioch", "Temecula", "Burbank", "Daly City", "Rialto", "Santa Maria", "El Cajon",
    "San Mateo", "Clovis", "Compton", "Jurupa Valley", "Vista", "South Gate",
    "Mission Viejo", "Vacaville", "Carson", "Hesperia", "Santa Monica", "Westminster",
    "Redding", "Santa Barbara", "Chico", "Newport Beach", "San Leandro", "San Marcos",
    "Whittier", "Hawthorne", "Citrus Heights", "Tracy", "Alhambra", "Livermore",
    "Buena Park", "Lakewood", "Merced", "Hemet", "Chino", "Menifee", "Lake Forest", "Napa",
    "Redwood City", "Bellflower", "Indio", "Tustin", "Baldwin Park", "Chino Hills",
    "Mountain View", "Alameda", "Upland", "Folsom", "San Ramon", "Pleasanton", "Union City",
    "Perris", "Manteca", "Lynwood", "Apple Valley", "Redlands", "Turlock", "Milpitas",
    "Redondo Beach", "Rancho Cordova", "Yorba Linda", "Palo Alto", "Davis", "Camarillo",
    "Walnut Creek", "Pittsburg", "South San Francisco", "Yuba City", "San Clemente",
    "Laguna Niguel", "Pico Rivera", "Montebello", "Lodi", "Madera", "Santa Cruz",
    "La Habra", "Encinitas", "Monterey Park", "Tulare", "Cupertino", "Gardena",
    "National City", "Petaluma", "Huntington Park", "San Rafael", "Porterville", "Hanford",
    "Waterford", "Delano", "Diamond Bar", "Glendora", "Cerritos", "Azusa",
    "Rancho Palos Verdes", "Fountain Valley", "Placentia", "Monrovia", "Santee", "Eastvale",
    "Rosemead", "San Gabriel", "Gilroy", "Stanton", "Paramount", "Brea", "Covina",
    "San Bruno", "Arcadia", "Culver City", "Benicia", "Colton", "Beaumont", "Morgan Hill",
    "San Luis Obispo", "Los Altos", "Brentwood", "Aliso Viejo", "La Mesa", "West Sacramento",
    "Agoura Hills", "La Mirada", "Rowland Heights", "Cypress", "Newark",
    "Desert Hot Springs", "Duarte", "Lomita", "Barstow", "Adelanto", "Twentynine Palms",
    "Yucca Valley", "Joshua Tree", "Ridgecrest", "California City", "Tehachapi", "Mojave",
];

/// Capitalized or all-caps word run, e.g. "Rancho Cucamonga" or "LEMOORE".
const PLACE: &str = r"(?:[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*|[A-Z]{2,}(?:\s+[A-Z]{2,})*)";

const STREET_SUFFIX: &str =
    "Street|St|Avenue|Ave|Road|Rd|Drive|Dr|Boulevard|Blvd|Way|Lane|Ln|Circle|Cir|Court|Ct|Place|Pl";

/// One pattern in a field's cascade. `group` selects the capture that holds
/// the value (0 for the whole match).
pub struct FieldRule {
    pub name: &'static str,
    pattern: Regex,
    group: usize,
}

impl FieldRule {
    fn new(name: &'static str, pattern: &str, group: usize) -> Self {
        let pattern = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("field rule {name} does not compile: {e}"));
        Self {
            name,
            pattern,
            group,
        }
    }

    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)?
            .get(self.group)
            .map(|m| m.as_str())
    }
}

pub static CITY_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::new(
            "known_city",
            &format!(r"(?i)\b({})\b", KNOWN_CITIES.join("|")),
            1,
        ),
        FieldRule::new("city_ca", &format!(r"\b({PLACE}),?\s+(?i:CA)\b"), 1),
        FieldRule::new(
            "city_california",
            &format!(r"\b({PLACE}),?\s+(?i:California)\b"),
            1,
        ),
        FieldRule::new(
            "in_city",
            &format!(r"\b(?i:located in|in|at)\s+({PLACE})"),
            1,
        ),
        FieldRule::new("city_zip", &format!(r"\b({PLACE})\s+\d{{5}}(?:-\d{{4}})?\b"), 1),
    ]
});

pub static ADDRESS_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::new(
            "street_suffix_bounded",
            &format!(r"(?i)\d+\s+[A-Za-z\s]+(?:{STREET_SUFFIX})\b"),
            0,
        ),
        FieldRule::new(
            "street_suffix",
            &format!(r"(?i)\d+\s+[A-Za-z\s]+(?:{STREET_SUFFIX})"),
            0,
        ),
        FieldRule::new(
            "before_city",
            r"(?i)(\d+\s+[A-Za-z0-9\s\-]+)(?:,|\s+[A-Z][a-z]+,?\s+CA)",
            1,
        ),
    ]
});

pub static PRICE_RULES: Lazy<Vec<FieldRule>> =
    Lazy::new(|| vec![FieldRule::new("dollar_amount", r"\$[\d,]+(?:\.\d{2})?", 0)]);

pub static DATE_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::new("mm/dd/yyyy", r"\b\d{1,2}/\d{1,2}/\d{4}\b", 0),
        FieldRule::new("yyyy-mm-dd", r"\b\d{4}-\d{1,2}-\d{1,2}\b", 0),
        FieldRule::new("mm-dd-yyyy", r"\b\d{1,2}-\d{1,2}-\d{4}\b", 0),
    ]
});

/// First match wins. The last rule accepts any 5+ digit number and can pick
/// up a zip code or loan amount.
pub static TS_NUMBER_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::new("leading_number_state", r"(?i)^\s*(\d{5,}-[A-Z]{2})\b", 1),
        FieldRule::new("ts_prefix", r"(?i)\bTS\s*#?\s*([0-9][A-Z0-9-]{4,})", 1),
        FieldRule::new(
            "trustee_sale_prefix",
            r"(?i)\bTRUSTEE['S]*\s*SALE[\s-]*#?[\s-]*([0-9][A-Z0-9-]{4,})",
            1,
        ),
        FieldRule::new("sale_prefix", r"(?i)\bSale[\s-]*#?[\s-]*([0-9][A-Z0-9-]{4,})", 1),
        FieldRule::new("number_state", r"(?i)\b(\d{5,}-[A-Z]{2})\b", 1),
        FieldRule::new("bare_number", r"\b(\d{5,})\b", 1),
    ]
});

pub static COUNTY_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![FieldRule::new(
        "named_county",
        &format!(r"\b({PLACE})\s+(?i:County)\b"),
        1,
    )]
});

pub static STATUS_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![FieldRule::new(
        "sale_status",
        r"(?i)\b(postponed|cancell?ed|rescheduled|on hold)\b",
        1,
    )]
});

/// Build a listing from the text fragments of one record (table cells or a
/// single block of text). Never fails; fields that match nothing are empty.
pub fn parse_listing<S: AsRef<str>>(fragments: &[S]) -> Listing {
    let combined = fragments
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let listing = Listing {
        ts_number: extract_ts_number(&combined).unwrap_or_default(),
        address: extract_address(&combined).unwrap_or_default(),
        city: extract_city(&combined).unwrap_or_default(),
        county: extract_county(&combined).unwrap_or_default(),
        date: extract_date(&combined).unwrap_or_default(),
        price: extract_price(&combined).unwrap_or_default(),
        details: combined.chars().take(DETAILS_MAX_CHARS).collect(),
        status: extract_status(&combined).unwrap_or_default(),
        raw_data: combined,
        row_index: 0,
        table_index: 0,
        page_number: 0,
        source: ExtractionSource::Table,
    };

    if !listing.ts_number.is_empty() {
        debug!("🔖 Extracted TS number {}", listing.ts_number);
    }

    listing
}

fn first_match<'t>(rules: &[FieldRule], text: &'t str) -> Option<&'t str> {
    rules.iter().find_map(|rule| {
        let value = rule.capture(text)?;
        trace!("rule {} matched {value:?}", rule.name);
        Some(value)
    })
}

pub fn extract_city(text: &str) -> Option<String> {
    let raw = first_match(&CITY_RULES, text)?.trim();
    let raw = raw
        .strip_suffix(',')
        .or_else(|| raw.strip_suffix('.'))
        .unwrap_or(raw);
    Some(title_case(raw))
}

pub fn extract_address(text: &str) -> Option<String> {
    first_match(&ADDRESS_RULES, text).map(|s| s.trim().to_string())
}

pub fn extract_price(text: &str) -> Option<String> {
    first_match(&PRICE_RULES, text).map(str::to_string)
}

pub fn extract_date(text: &str) -> Option<String> {
    first_match(&DATE_RULES, text).map(str::to_string)
}

pub fn extract_county(text: &str) -> Option<String> {
    first_match(&COUNTY_RULES, text).map(title_case)
}

pub fn extract_status(text: &str) -> Option<String> {
    let raw = first_match(&STATUS_RULES, text)?.to_lowercase();
    let status = match raw.as_str() {
        "canceled" => "Cancelled".to_string(),
        other => title_case(other),
    };
    Some(status)
}

/// Unlike the other fields, a sale number candidate that normalizes to
/// fewer than five characters is rejected and the next rule gets a turn.
pub fn extract_ts_number(text: &str) -> Option<String> {
    TS_NUMBER_RULES
        .iter()
        .filter_map(|rule| rule.capture(text))
        .find_map(normalize_ts_number)
}

/// Uppercase, keep only `[A-Z0-9-]`, require five characters, and give a
/// bare number the `-CA` state suffix. Applying it twice changes nothing.
pub fn normalize_ts_number(raw: &str) -> Option<String> {
    let cleaned = identity_key(raw)?;
    if cleaned.len() < TS_NUMBER_MIN_LEN {
        return None;
    }

    if cleaned.bytes().all(|b| b.is_ascii_digit()) {
        Some(format!("{cleaned}-CA"))
    } else {
        Some(cleaned)
    }
}
