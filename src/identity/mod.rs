use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Mutex;

use crate::error::Error;
use crate::record::{self, RecordKind};
use crate::{IdentityRecord, MatchSource, Org, ProjectMap, ResolvedAuthor, Result};

pub mod enroll;
pub mod names;

/// Equality predicates the identity registry understands. Name filters match
/// by membership in the record's candidate lists, not string equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityFilter {
    Orcid(String),
    EmployeeId(String),
    Name { given: String, family: String },
}

impl IdentityFilter {
    pub fn matches(&self, record: &IdentityRecord) -> bool {
        match self {
            IdentityFilter::Orcid(orcid) => record.orcid.as_deref() == Some(orcid.as_str()),
            IdentityFilter::EmployeeId(id) => record.employee_id.as_deref() == Some(id.as_str()),
            IdentityFilter::Name { given, family } => {
                record.given.iter().any(|candidate| candidate == given)
                    && record.family.iter().any(|candidate| candidate == family)
            }
        }
    }
}

/// The opaque identity registry. Query errors propagate unchanged; the
/// resolver never retries or swallows them.
pub trait IdentityStore {
    fn find_one(&self, filter: &IdentityFilter) -> Result<Option<IdentityRecord>>;
    fn count(&self, filter: &IdentityFilter) -> Result<usize>;
    fn insert_one(&self, record: &IdentityRecord) -> Result<String>;
    fn update_one(&self, filter: &IdentityFilter, patch: &IdentityPatch) -> Result<u64>;
}

/// Field-replacement patch for `update_one`. Fields left as None are kept.
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
    pub orcid: Option<String>,
    pub given: Option<Vec<String>>,
    pub family: Option<Vec<String>>,
    pub affiliations: Option<Vec<String>>,
}

impl IdentityPatch {
    pub fn is_empty(&self) -> bool {
        self.orcid.is_none()
            && self.given.is_none()
            && self.family.is_none()
            && self.affiliations.is_none()
    }

    fn apply(&self, record: &mut IdentityRecord) {
        if let Some(orcid) = &self.orcid {
            record.orcid = Some(orcid.clone());
        }
        if let Some(given) = &self.given {
            record.given = given.clone();
        }
        if let Some(family) = &self.family {
            record.family = family.clone();
        }
        if let Some(affiliations) = &self.affiliations {
            record.affiliations = affiliations.clone();
        }
    }
}

/// In-memory identity registry over a snapshot. Backs the batch and sync
/// pipelines and the test suite.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<IdentityRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<IdentityRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Load a snapshot from a JSONL file, one identity record per line.
    pub fn load_jsonl<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("identity store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> Vec<IdentityRecord> {
        self.records
            .lock()
            .expect("identity store poisoned")
            .clone()
    }
}

impl IdentityStore for MemoryStore {
    fn find_one(&self, filter: &IdentityFilter) -> Result<Option<IdentityRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|err| Error::Store(err.to_string()))?;
        Ok(records.iter().find(|record| filter.matches(record)).cloned())
    }

    fn count(&self, filter: &IdentityFilter) -> Result<usize> {
        let records = self
            .records
            .lock()
            .map_err(|err| Error::Store(err.to_string()))?;
        Ok(records.iter().filter(|record| filter.matches(record)).count())
    }

    fn insert_one(&self, record: &IdentityRecord) -> Result<String> {
        let mut records = self
            .records
            .lock()
            .map_err(|err| Error::Store(err.to_string()))?;
        records.push(record.clone());
        Ok(format!("{:024x}", records.len()))
    }

    fn update_one(&self, filter: &IdentityFilter, patch: &IdentityPatch) -> Result<u64> {
        let mut records = self
            .records
            .lock()
            .map_err(|err| Error::Store(err.to_string()))?;
        match records.iter_mut().find(|record| filter.matches(record)) {
            Some(record) => {
                patch.apply(record);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LookupBy {
    Orcid,
    EmployeeId,
}

/// Look up a single identity record by unique identifier.
pub fn single_lookup(
    val: &str,
    by: LookupBy,
    store: &dyn IdentityStore,
) -> Result<Option<IdentityRecord>> {
    let filter = match by {
        LookupBy::Orcid => IdentityFilter::Orcid(val.to_string()),
        LookupBy::EmployeeId => IdentityFilter::EmployeeId(val.to_string()),
    };
    store.find_one(&filter)
}

fn adjust(payload: &mut ResolvedAuthor, row: &IdentityRecord) {
    payload.orcid = row.orcid.clone();
    payload.in_database = true;
    if row.employee_id.is_some() {
        payload.validated = true;
    }
    payload.janelian = !row.alumni;
    if row.alumni {
        payload.alumni = true;
    }
    if payload.janelian {
        if let Some(group) = &row.group {
            payload.group = Some(group.clone());
        }
        if let Some(code) = &row.group_code {
            payload.group_code = Some(code.clone());
        }
        if !row.affiliations.is_empty() {
            payload.tags = row.affiliations.clone();
        }
    }
    if let Some(id) = row.employee_id.as_deref().filter(|id| !id.is_empty()) {
        payload.employee_id = Some(id.to_string());
    }
    if let Some(user_id) = row.user_id.as_deref().filter(|id| !id.is_empty()) {
        payload.user_id = Some(user_id.to_string());
    }
    if let Some(worker_type) = row.worker_type.as_deref().filter(|wt| !wt.is_empty()) {
        payload.worker_type = Some(worker_type.to_string());
    }
}

fn mark_duplicate_name(payload: &mut ResolvedAuthor, store: &dyn IdentityStore) -> Result<()> {
    if let Some(family) = &payload.family {
        let shared = store.count(&IdentityFilter::Name {
            given: payload.given.clone(),
            family: family.clone(),
        })?;
        if shared > 1 {
            payload.duplicate_name = true;
        }
    }
    Ok(())
}

/// Resolve one author against the identity registry. Signals are tried in
/// fixed priority order: unique identifier, then exact name pair, then the
/// affiliation asserted on the paper itself. Idempotent for an unchanged
/// registry.
pub fn resolve(payload: &mut ResolvedAuthor, store: &dyn IdentityStore, org: &Org) -> Result<()> {
    payload.in_database = false;
    payload.janelian = false;
    payload.asserted = false;
    payload.alumni = false;
    payload.validated = false;
    payload.match_source = None;

    let mut row: Option<IdentityRecord> = None;
    if let Some(orcid) = payload.paper_orcid.clone() {
        row = store.find_one(&IdentityFilter::Orcid(orcid))?;
        if let Some(found) = &row {
            payload.match_source = Some(MatchSource::Orcid);
            mark_duplicate_name(payload, store)?;
            adjust(payload, found);
        }
    } else if let Some(family) = payload.family.clone() {
        row = store.find_one(&IdentityFilter::Name {
            given: payload.given.clone(),
            family,
        })?;
        if let Some(found) = &row {
            payload.match_source = Some(MatchSource::Name);
            mark_duplicate_name(payload, store)?;
            adjust(payload, found);
        }
    }

    // An affiliation asserted on the paper itself is authoritative for the
    // affiliation flag, whatever the registry says.
    if payload
        .affiliations
        .iter()
        .any(|affiliation| affiliation.contains(&org.name))
    {
        if let Some(found) = &row {
            adjust(payload, found);
        }
        payload.janelian = true;
        payload.asserted = true;
        if payload.match_source != Some(MatchSource::Orcid) {
            payload.match_source = Some(MatchSource::Asserted);
        }
    }

    Ok(())
}

/// Record-level affiliation determination for one raw author entry. Checks
/// the asserted affiliation list first (organization name literal, then the
/// organizational registry identifier by suffix), then the project map keyed
/// on the bare display name, then falls back to full registry resolution.
/// Lookup misses return None for both schemas; only an entry with no name
/// at all is an error.
pub fn is_affiliated(
    auth: &Value,
    kind: RecordKind,
    store: &dyn IdentityStore,
    projects: &ProjectMap,
    org: &Org,
) -> Result<Option<String>> {
    if let Some(affiliations) = auth.get("affiliation").and_then(Value::as_array) {
        for affiliation in affiliations {
            if let Some(name) = record::affiliation_name(affiliation) {
                if name.contains(&org.name) {
                    return Ok(Some(name));
                }
            }
            if let Some(id) = affiliation
                .get("affiliationIdentifier")
                .and_then(Value::as_str)
            {
                if id.trim_end_matches('/').ends_with(&org.ror_suffix) {
                    return Ok(Some(org.name.clone()));
                }
            }
        }
    }

    if let Some(name) = auth.get("name").and_then(Value::as_str) {
        if let Some(project) = projects.get(name) {
            return Ok(Some(project.clone()));
        }
    }

    if auth.get(kind.family_key()).is_none() && auth.get("name").is_none() {
        return Err(Error::Malformed {
            reason: "author entry has no name".to_string(),
            record: Box::new(auth.clone()),
        });
    }

    let mut payload = record::author_entry(auth, kind, 0, 0);
    resolve(&mut payload, store, org)?;
    if payload.in_database && !payload.alumni {
        return Ok(Some(org.name.clone()));
    }
    Ok(None)
}
