use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use xxhash_rust::xxh3::xxh3_64;

pub mod authors;
pub mod batch;
pub mod cite;
pub mod error;
pub mod identity;
pub mod record;
pub mod remote;
pub mod sync;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Maps literal "Given Family" strings to project/team display names.
pub type ProjectMap = HashMap<String, String>;

pub fn hash_key(text: &str) -> String {
    format!("{:016x}", xxh3_64(text.as_bytes()))
}

/// Organization identity injected into resolution and presentation code.
#[derive(Debug, Clone)]
pub struct Org {
    /// Literal matched against asserted affiliation strings.
    pub name: String,
    /// Trailing segment of the organization's ROR identifier.
    pub ror_suffix: String,
    pub orcid_url: String,
    pub orcid_logo: String,
    pub pubmed_url: String,
}

impl Default for Org {
    fn default() -> Self {
        Self {
            name: "Janelia".to_string(),
            ror_suffix: "013sv6x84".to_string(),
            orcid_url: "https://orcid.org/".to_string(),
            orcid_logo: "https://info.orcid.org/wp-content/uploads/2019/11/orcid_16x16.png"
                .to_string(),
            pubmed_url: "https://pubmed.ncbi.nlm.nih.gov/".to_string(),
        }
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Orcid,
    Name,
    Asserted,
}

/// Per-author payload produced by extraction and filled in by resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedAuthor {
    pub given: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_orcid: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affiliations: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_first: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_last: bool,
    pub in_database: bool,
    pub janelian: bool,
    pub asserted: bool,
    pub alumni: bool,
    pub validated: bool,
    pub duplicate_name: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_source: Option<MatchSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_code: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(rename = "employeeId", skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(rename = "userIdO365", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "workerType", skip_serializing_if = "Option::is_none")]
    pub worker_type: Option<String>,
}

/// A known individual in the identity registry. Given and family names are
/// ordered candidate lists, not single strings: matching checks membership so
/// that every recorded spelling of a person stays matchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityRecord {
    pub given: Vec<String>,
    pub family: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(rename = "employeeId", skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affiliations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_code: Option<String>,
    /// Marker for people no longer affiliated with the organization.
    #[serde(skip_serializing_if = "is_false")]
    pub alumni: bool,
    #[serde(rename = "userIdO365", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "workerType", skip_serializing_if = "Option::is_none")]
    pub worker_type: Option<String>,
}

/// A personnel directory record, as returned by the People service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    #[serde(rename = "employeeId", skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(rename = "nameFirst", skip_serializing_if = "Option::is_none")]
    pub name_first: Option<String>,
    #[serde(rename = "nameFirstPreferred", skip_serializing_if = "Option::is_none")]
    pub name_first_preferred: Option<String>,
    #[serde(rename = "nameMiddle", skip_serializing_if = "Option::is_none")]
    pub name_middle: Option<String>,
    #[serde(rename = "nameMiddlePreferred", skip_serializing_if = "Option::is_none")]
    pub name_middle_preferred: Option<String>,
    #[serde(rename = "nameLast", skip_serializing_if = "Option::is_none")]
    pub name_last: Option<String>,
    #[serde(rename = "nameLastPreferred", skip_serializing_if = "Option::is_none")]
    pub name_last_preferred: Option<String>,
    #[serde(rename = "userIdO365", skip_serializing_if = "Option::is_none")]
    pub user_id_o365: Option<String>,
    #[serde(rename = "workerType", skip_serializing_if = "Option::is_none")]
    pub worker_type: Option<String>,
    #[serde(rename = "ccDescr", skip_serializing_if = "Option::is_none")]
    pub cc_descr: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affiliations: Vec<SupOrg>,
    #[serde(rename = "managedTeams", skip_serializing_if = "Vec::is_empty")]
    pub managed_teams: Vec<SupOrg>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupOrg {
    #[serde(rename = "supOrgName", skip_serializing_if = "Option::is_none")]
    pub sup_org_name: Option<String>,
}

/// One resolved author tied back to its source record, as written by the
/// batch and sync pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAuthorRecord {
    pub doi: String,
    pub author_idx: usize,
    #[serde(flatten)]
    pub author: ResolvedAuthor,
}
