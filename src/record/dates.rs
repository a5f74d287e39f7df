use serde_json::Value;

use super::RecordKind;

/// Crossref date sections, in lookup priority order.
const DATE_SECTIONS: [&str; 5] = [
    "published",
    "published-print",
    "published-online",
    "posted",
    "created",
];

/// Preprint servers that publish Crossref records without container metadata.
const PREPRINT_PREFIXES: [(&str, &str); 4] = [
    ("10.1101", "bioRxiv"),
    ("10.21203", "Research Square"),
    ("10.31219", "OSF Preprints"),
    ("10.48550", "arXiv"),
];

/// Canonical `YYYY-MM-DD` publication date, or None when no section holds a
/// complete date. Crossref sections are scanned in fixed priority order and
/// only a full 3-part date array qualifies; DataCite uses the date half of
/// the `registered` timestamp.
pub fn publishing_date(record: &Value, kind: RecordKind) -> Option<String> {
    match kind {
        RecordKind::Crossref => {
            for section in DATE_SECTIONS {
                let parts = match record
                    .pointer(&format!("/{section}/date-parts/0"))
                    .and_then(Value::as_array)
                {
                    Some(parts) if parts.len() == 3 => parts,
                    _ => continue,
                };
                let (year, month, day) =
                    match (parts[0].as_i64(), parts[1].as_i64(), parts[2].as_i64()) {
                        (Some(year), Some(month), Some(day)) => (year, month, day),
                        _ => continue,
                    };
                return Some(format!("{year}-{month:02}-{day:02}"));
            }
            None
        }
        RecordKind::DataCite => record
            .get("registered")
            .and_then(Value::as_str)
            .map(|registered| {
                registered
                    .split('T')
                    .next()
                    .unwrap_or(registered)
                    .to_string()
            }),
    }
}

fn crossref_venue(record: &Value) -> Option<String> {
    for key in ["short-container-title", "container-title"] {
        if let Some(venue) = record
            .get(key)
            .and_then(Value::as_array)
            .and_then(|titles| titles.first())
            .and_then(Value::as_str)
            .filter(|venue| !venue.is_empty())
        {
            return Some(venue.to_string());
        }
    }
    if let Some(institution) = record.get("institution") {
        let name = match institution {
            Value::Array(arr) => arr.first().and_then(|inst| inst.get("name")),
            Value::Object(_) => institution.get("name"),
            _ => None,
        };
        if let Some(name) = name.and_then(Value::as_str) {
            return Some(name.to_string());
        }
    }
    let doi = record.get("DOI").and_then(Value::as_str)?;
    let prefix = doi.split('/').next().unwrap_or(doi);
    PREPRINT_PREFIXES
        .iter()
        .find(|(known, _)| *known == prefix)
        .map(|(_, server)| server.to_string())
}

/// Formatted venue string: `"Journal. YYYY"` plus, when `full`, `"; volume"`
/// and `": page"` (the DOI's trailing segment stands in for a missing page).
/// None when the publishing date is unknown or no venue is determinable.
pub fn journal(record: &Value, kind: RecordKind, full: bool) -> Option<String> {
    let date = publishing_date(record, kind)?;
    let year = date.split('-').next().unwrap_or(&date);

    match kind {
        RecordKind::Crossref => {
            let venue = crossref_venue(record)?;
            let mut journal = format!("{venue}. {year}");
            if full {
                if let Some(volume) = record.get("volume").and_then(Value::as_str) {
                    journal.push_str("; ");
                    journal.push_str(volume);
                }
                if let Some(page) = record.get("page").and_then(Value::as_str) {
                    journal.push_str(": ");
                    journal.push_str(page);
                } else if let Some(doi) = record.get("DOI").and_then(Value::as_str) {
                    let locator = doi.rsplit('/').next().unwrap_or(doi);
                    journal.push_str(": ");
                    journal.push_str(locator);
                }
            }
            Some(journal)
        }
        RecordKind::DataCite => {
            let publisher = match record.get("publisher") {
                Some(Value::String(publisher)) => Some(publisher.clone()),
                Some(Value::Object(_)) => record
                    .pointer("/publisher/name")
                    .and_then(Value::as_str)
                    .map(String::from),
                _ => None,
            };
            publisher
                .filter(|publisher| !publisher.is_empty())
                .map(|publisher| format!("{publisher}. {year}"))
        }
    }
}
