use serde_json::Value;

use crate::identity::{resolve, IdentityStore};
use crate::record::{self, BiblioRecord, RecordKind};
use crate::{Org, ProjectMap, ResolvedAuthor, Result};

/// Generate the structured author list for a record, resolving each author
/// against the identity registry when a store is supplied. None when the
/// record carries no author signal at all.
pub fn build_author_details(
    record: &BiblioRecord,
    store: Option<&dyn IdentityStore>,
    org: &Org,
) -> Result<Option<Vec<ResolvedAuthor>>> {
    let Some(values) = record.author_values() else {
        return Ok(None);
    };
    if values.is_empty() {
        return Ok(None);
    }

    let last = values.len() - 1;
    let mut authors = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        let mut payload = record::author_entry(value, record.kind(), idx, last);
        if let Some(store) = store {
            resolve(&mut payload, store, org)?;
        }
        authors.push(payload);
    }
    Ok(Some(authors))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ListStyle {
    /// "Family, GW" with bare concatenated initials.
    #[default]
    Dis,
    /// "Family, G. W." with spaced, period-terminated initials.
    Flylight,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions<'a> {
    pub style: ListStyle,
    pub orcid_links: bool,
    pub projects: Option<&'a ProjectMap>,
}

fn display_entry(
    auth: &Value,
    kind: RecordKind,
    opts: &ListOptions,
    org: &Org,
) -> Option<String> {
    let given = auth.get(kind.given_key()).and_then(Value::as_str);
    let family = auth.get(kind.family_key()).and_then(Value::as_str);

    let mut full = match (family, given) {
        (Some(family), Some(given)) if !given.is_empty() => {
            let initials: Vec<char> = given
                .split_whitespace()
                .filter_map(|part| part.chars().next())
                .collect();
            match opts.style {
                ListStyle::Dis => {
                    format!("{family}, {}", initials.iter().collect::<String>())
                }
                ListStyle::Flylight => {
                    let spaced: Vec<String> =
                        initials.iter().map(|initial| format!("{initial}.")).collect();
                    format!("{family}, {}", spaced.join(" "))
                }
            }
        }
        (Some(family), _) => family.to_string(),
        (None, _) => auth.get("name").and_then(Value::as_str)?.to_string(),
    };

    if let (Some(projects), Some(given), Some(family)) = (opts.projects, given, family) {
        if let Some(project) = projects.get(&format!("{given} {family}")) {
            full = project.clone();
        }
    }

    if opts.orcid_links {
        if let Some(orcid) = record::author_orcid(auth, kind) {
            full = format!(
                "<a href='{}{orcid}' target='_blank'>{full}<img alt='ORCID logo' \
                 src='{}' width='16' height='16' /></a>",
                org.orcid_url, org.orcid_logo
            );
        }
    }

    Some(full)
}

/// One display string per author, in record order. None when no author has a
/// displayable name.
pub fn author_list(record: &BiblioRecord, opts: &ListOptions, org: &Org) -> Option<Vec<String>> {
    let values = record.author_values()?;
    let entries: Vec<String> = values
        .iter()
        .filter_map(|value| display_entry(value, record.kind(), opts, org))
        .collect();
    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

/// The citation author string: entries joined with ", ", the final author
/// attached with "; " (dis) or " & " (flylight) and period-terminated.
pub fn author_list_text(record: &BiblioRecord, opts: &ListOptions, org: &Org) -> Option<String> {
    let mut entries = author_list(record, opts, org)?;
    let mut last = entries.pop()?;
    if !last.ends_with('.') {
        last.push('.');
    }
    if entries.is_empty() {
        return Some(last);
    }
    let joiner = match opts.style {
        ListStyle::Dis => "; ",
        ListStyle::Flylight => " & ",
    };
    Some(format!("{}{joiner}{last}", entries.join(", ")))
}
