use serde_json::Value;

use crate::record::{BiblioRecord, RecordKind};
use crate::remote::{PubMed, Registries};
use crate::{Org, Result};

/// DOI prefixes and publisher path markers registered with DataCite rather
/// than Crossref.
const DATACITE_MARKERS: [&str; 5] = ["/janelia", "/arxiv", "/d1.", "/micropub.biology", "/zenodo"];

pub fn is_datacite(doi: &str) -> bool {
    let doi = doi.to_lowercase();
    DATACITE_MARKERS.iter().any(|marker| doi.contains(marker))
}

pub fn is_preprint(record: &BiblioRecord) -> bool {
    match record.kind() {
        RecordKind::Crossref => {
            let value = record.value();
            value
                .get("subtype")
                .and_then(Value::as_str)
                .is_some_and(|subtype| subtype == "preprint")
                || value
                    .get("type")
                    .and_then(Value::as_str)
                    .is_some_and(|rtype| rtype == "posted-content")
        }
        RecordKind::DataCite => record
            .value()
            .pointer("/types/resourceTypeGeneral")
            .and_then(Value::as_str)
            .is_some_and(|rtype| rtype == "Preprint"),
    }
}

fn first_author_family(record: &BiblioRecord, values: &[Value]) -> Option<String> {
    match record.kind() {
        // Crossref marks the lead author explicitly; without that marker and
        // a family name there is nothing to cite.
        RecordKind::Crossref => values
            .iter()
            .find(|auth| {
                auth.get("sequence")
                    .and_then(Value::as_str)
                    .is_some_and(|seq| seq == "first")
            })
            .and_then(|auth| auth.get("family"))
            .and_then(Value::as_str)
            .map(String::from),
        RecordKind::DataCite => values.first().map(|auth| {
            auth.get("familyName")
                .or_else(|| auth.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("Unknown author")
                .to_string()
        }),
    }
}

/// Compose a short citation for a DOI, fetching the record from whichever
/// registry owns it. `expanded` swaps the bare year for title and journal.
/// A successful PubMed id conversion appends a link fragment.
pub async fn short_citation(
    doi: &str,
    expanded: bool,
    registries: &Registries,
    pubmed: &PubMed,
    org: &Org,
) -> Result<Option<String>> {
    let fetched = if is_datacite(doi) {
        registries.fetch_datacite(doi).await?
    } else {
        registries.fetch_crossref(doi).await?
    };
    let Some(value) = fetched else {
        return Ok(None);
    };
    let record = BiblioRecord::new(value);

    let Some(date) = record.publishing_date() else {
        return Ok(None);
    };
    let year = date.split('-').next().unwrap_or(&date);

    let Some(values) = record.author_values() else {
        return Ok(None);
    };
    let Some(family) = first_author_family(&record, &values) else {
        return Ok(None);
    };

    let mut citation = if values.len() > 1 {
        format!("{family} et al.")
    } else {
        format!("{family}.")
    };

    let expansion = if expanded {
        match (record.title(), record.journal(true)) {
            (Some(title), Some(journal)) => Some(format!(" {title}. {journal}.")),
            _ => None,
        }
    } else {
        None
    };
    match expansion {
        Some(expansion) => citation.push_str(&expansion),
        None => {
            citation.push(' ');
            citation.push_str(year);
        }
    }

    if let Some(pmid) = pubmed.pmid_for_doi(doi).await? {
        citation.push_str(&format!(
            " <a href='{}{pmid}' target='_blank'>PMID: {pmid}</a>",
            org.pubmed_url
        ));
    }

    Ok(Some(citation))
}
