use serde_json::Value;

use crate::ResolvedAuthor;

mod dates;
pub use dates::{journal, publishing_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Crossref,
    DataCite,
}

impl RecordKind {
    /// Crossref records carry a top-level `DOI` field; DataCite records do not.
    pub fn of(record: &Value) -> Self {
        if record.get("DOI").is_some() {
            RecordKind::Crossref
        } else {
            RecordKind::DataCite
        }
    }

    pub fn given_key(self) -> &'static str {
        match self {
            RecordKind::Crossref => "given",
            RecordKind::DataCite => "givenName",
        }
    }

    pub fn family_key(self) -> &'static str {
        match self {
            RecordKind::Crossref => "family",
            RecordKind::DataCite => "familyName",
        }
    }
}

/// A bibliographic record tagged once at ingestion with its source schema.
pub struct BiblioRecord {
    kind: RecordKind,
    value: Value,
}

impl BiblioRecord {
    pub fn new(value: Value) -> Self {
        let kind = RecordKind::of(&value);
        Self { kind, value }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn doi(&self) -> Option<&str> {
        let key = match self.kind {
            RecordKind::Crossref => "DOI",
            RecordKind::DataCite => "doi",
        };
        self.value.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<String> {
        title(&self.value, self.kind)
    }

    pub fn abstract_text(&self) -> Option<String> {
        abstract_text(&self.value, self.kind)
    }

    pub fn publishing_date(&self) -> Option<String> {
        publishing_date(&self.value, self.kind)
    }

    pub fn journal(&self, full: bool) -> Option<String> {
        journal(&self.value, self.kind, full)
    }

    pub fn author_values(&self) -> Option<Vec<Value>> {
        author_values(&self.value, self.kind)
    }

    pub fn author_entries(&self) -> Option<Vec<ResolvedAuthor>> {
        let values = self.author_values()?;
        if values.is_empty() {
            return None;
        }
        let last = values.len() - 1;
        Some(
            values
                .iter()
                .enumerate()
                .map(|(idx, value)| author_entry(value, self.kind, idx, last))
                .collect(),
        )
    }
}

fn clean_name(name: &str) -> String {
    name.replace('\u{a0}', " ")
}

/// Reduce a possibly URL-prefixed identifier to its trailing path segment.
fn id_suffix(id: &str) -> String {
    let trimmed = id.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

/// Handles both object format {"name": "..."} and plain string format
pub fn affiliation_name(affiliation: &Value) -> Option<String> {
    match affiliation {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => affiliation
            .get("name")
            .and_then(Value::as_str)
            .map(String::from),
        _ => None,
    }
}

/// ORCID asserted on the author entry itself, reduced to the bare identifier.
pub fn author_orcid(auth: &Value, kind: RecordKind) -> Option<String> {
    match kind {
        RecordKind::Crossref => auth.get("ORCID").and_then(Value::as_str).map(id_suffix),
        RecordKind::DataCite => auth
            .get("nameIdentifiers")
            .and_then(Value::as_array)
            .and_then(|ids| {
                ids.iter().find(|id| {
                    id.get("nameIdentifierScheme")
                        .and_then(Value::as_str)
                        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("ORCID"))
                })
            })
            .and_then(|id| id.get("nameIdentifier"))
            .and_then(Value::as_str)
            .map(id_suffix),
    }
}

/// The record's author entries: `author` (falling back to `editor`) for
/// Crossref, `creators` for DataCite. Records with neither list sometimes
/// carry a single top-level display name, which becomes a one-entry list.
pub fn author_values(record: &Value, kind: RecordKind) -> Option<Vec<Value>> {
    let field = match kind {
        RecordKind::Crossref => record.get("author").or_else(|| record.get("editor")),
        RecordKind::DataCite => record.get("creators"),
    };
    if let Some(Value::Array(arr)) = field {
        return Some(arr.clone());
    }
    record
        .get("name")
        .and_then(Value::as_str)
        .map(|name| vec![serde_json::json!({ "name": name })])
}

/// Extract one author entry into a payload with resolution fields defaulted.
pub fn author_entry(auth: &Value, kind: RecordKind, idx: usize, last: usize) -> ResolvedAuthor {
    let mut payload = ResolvedAuthor::default();

    if let Some(family) = auth.get(kind.family_key()).and_then(Value::as_str) {
        payload.family = Some(clean_name(family));
    } else if let Some(name) = auth.get("name").and_then(Value::as_str) {
        let name = clean_name(name);
        // Best-effort split of an unstructured display name: first token as
        // given, last token as family. A guess, never authoritative.
        if kind == RecordKind::DataCite && name.contains(' ') {
            let mut tokens = name.split_whitespace();
            if let (Some(first), Some(last_token)) = (tokens.next(), tokens.last()) {
                payload.given = first.to_string();
                payload.family = Some(last_token.to_string());
            }
        }
        payload.name = Some(name);
    }

    if let Some(given) = auth.get(kind.given_key()).and_then(Value::as_str) {
        payload.given = clean_name(given);
    }

    payload.paper_orcid = author_orcid(auth, kind);

    if let Some(affiliations) = auth.get("affiliation").and_then(Value::as_array) {
        for aff in affiliations {
            if let Some(name) = affiliation_name(aff) {
                if !name.is_empty() {
                    payload.affiliations.push(name);
                }
            }
        }
    }

    payload.is_first = idx == 0
        || auth
            .get("sequence")
            .and_then(Value::as_str)
            .is_some_and(|seq| seq == "first");
    payload.is_last = idx == last;

    payload
}

pub fn title(record: &Value, kind: RecordKind) -> Option<String> {
    match kind {
        RecordKind::Crossref => record
            .get("title")
            .and_then(Value::as_array)
            .and_then(|titles| titles.first())
            .and_then(Value::as_str)
            .filter(|title| !title.is_empty())
            .map(String::from),
        RecordKind::DataCite => record
            .pointer("/titles/0/title")
            .and_then(Value::as_str)
            .map(String::from),
    }
}

pub fn abstract_text(record: &Value, kind: RecordKind) -> Option<String> {
    match kind {
        RecordKind::Crossref => record
            .get("abstract")
            .and_then(Value::as_str)
            .map(String::from),
        RecordKind::DataCite => record
            .get("descriptions")
            .and_then(Value::as_array)
            .and_then(|descriptions| {
                descriptions.iter().find(|desc| {
                    desc.get("descriptionType")
                        .and_then(Value::as_str)
                        .is_some_and(|dtype| dtype == "Abstract")
                })
            })
            .and_then(|desc| desc.get("description"))
            .and_then(Value::as_str)
            .map(String::from),
    }
}
