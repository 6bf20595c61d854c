use crate::domain::listing::{header_fields, Listing, ALL_FIELDS};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use std::collections::HashMap;
use std::io::{Read, Write};

/// Collapse listings that share a sale number. Later listings replace
/// earlier ones, keeping the position where the number first appeared.
/// Listings without a sale number cannot be looked up again and are dropped.
pub fn deduplicate(listings: Vec<Listing>) -> Vec<Listing> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<Listing> = Vec::new();

    for listing in listings {
        let Some(key) = listing.identity() else {
            continue;
        };

        match positions.get(&key) {
            Some(&i) => unique[i] = listing,
            None => {
                positions.insert(key, unique.len());
                unique.push(listing);
            }
        }
    }

    unique
}

/// Header-first CSV, every value quoted, every row the same columns.
pub fn write_listings<W: Write>(writer: W, listings: &[Listing]) -> Result<(), csv::Error> {
    let header = header_fields(ALL_FIELDS);

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    wtr.write_record(&header)?;

    for listing in listings {
        let row: Vec<String> = header
            .iter()
            .map(|name| listing.field(name).unwrap_or_default().trim().to_string())
            .collect();
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read an artifact back. Columns are matched by header name, so files
/// with extra or missing columns still load.
pub fn read_listings<R: Read>(reader: R) -> Result<Vec<Listing>, csv::Error> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut listings = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut listing = Listing::default();
        for (name, value) in headers.iter().zip(record.iter()) {
            listing.set_field(name, value);
        }
        listings.push(listing);
    }

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::ExtractionSource;

    fn listing(ts: &str, city: &str, page: u32) -> Listing {
        Listing {
            ts_number: ts.into(),
            city: city.into(),
            raw_data: format!("{ts} {city}"),
            page_number: page,
            ..Default::default()
        }
    }

    #[test]
    fn later_listing_wins() {
        let unique = deduplicate(vec![
            listing("11111-CA", "Fresno", 1),
            listing("22222-CA", "Clovis", 1),
            listing("11111-ca", "Madera", 2),
        ]);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].city, "Madera");
        assert_eq!(unique[0].page_number, 2);
        assert_eq!(unique[1].city, "Clovis");
    }

    #[test]
    fn listings_without_identifier_are_dropped() {
        let input = vec![
            listing("", "Fresno", 1),
            listing("  ", "Fresno", 1),
            listing("33333-CA", "Fresno", 1),
        ];
        let count = input.len();

        let unique = deduplicate(input);
        assert!(unique.len() <= count);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].ts_number, "33333-CA");
    }

    #[test]
    fn written_file_has_stable_header_and_quotes_everything() {
        let mut buf = Vec::new();
        write_listings(&mut buf, &[listing("11111-CA", "Fresno", 1)]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"ts_number\",\"address\",\"city\",\"county\",\"date\",\"price\",\"details\",\"status\",\
             \"page_number\",\"raw_data\",\"row_index\",\"source\",\"table_index\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"11111-CA\",\"\",\"Fresno\",\"\",\"\",\"\",\"\",\"\",\"1\",\"11111-CA Fresno\",\"0\",\"table\",\"0\""
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn header_is_identical_for_different_field_subsets() {
        let sparse = listing("11111-CA", "", 1);
        let full = Listing {
            address: "1 Elm St".into(),
            county: "Kings".into(),
            date: "01/01/2025".into(),
            price: "$1".into(),
            status: "Postponed".into(),
            source: ExtractionSource::Block,
            ..listing("22222-CA", "Hanford", 2)
        };

        let header_of = |l: &Listing| {
            let mut buf = Vec::new();
            write_listings(&mut buf, std::slice::from_ref(l)).unwrap();
            String::from_utf8(buf).unwrap().lines().next().unwrap().to_string()
        };

        assert_eq!(header_of(&sparse), header_of(&full));
    }

    #[test]
    fn read_back_matches_written() {
        let original = vec![
            Listing {
                details: "line one, \"quoted\"\nline two".into(),
                source: ExtractionSource::Block,
                row_index: 4,
                ..listing("11111-CA", "Fresno", 3)
            },
            listing("22222-CA", "Clovis", 3),
        ];

        let mut buf = Vec::new();
        write_listings(&mut buf, &original).unwrap();
        let loaded = read_listings(buf.as_slice()).unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn read_tolerates_foreign_columns() {
        let text = "\"city\",\"ts_number\",\"notes\"\n\"Fresno\",\"11111-CA\",\"x\"\n";
        let loaded = read_listings(text.as_bytes()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].city, "Fresno");
        assert_eq!(loaded[0].ts_number, "11111-CA");
        assert_eq!(loaded[0].address, "");
    }
}
