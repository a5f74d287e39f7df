use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use urlencoding::encode;

use crate::error::Error;
use crate::{Org, Person, Result};

pub const CROSSREF_URL: &str = "https://api.crossref.org/works";
pub const DATACITE_URL: &str = "https://api.datacite.org/dois";
pub const PUBMED_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0";
pub const PEOPLE_URL: &str = "https://services.hhmi.org/IT/People";
pub const ORGS_URL: &str = "https://services.hhmi.org/IT/WD-hcm/supervisoryorgs";

fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("Failed to build HTTP client")
}

/// Citation registry clients. Lookups return Ok(None) when the registry has
/// no record for the DOI; other non-success statuses are upstream failures
/// and are never retried here.
pub struct Registries {
    client: Client,
    crossref_url: String,
    datacite_url: String,
    semaphore: Arc<Semaphore>,
}

impl Registries {
    pub fn new(
        crossref_url: String,
        datacite_url: String,
        concurrency: usize,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: build_client(timeout_secs),
            crossref_url,
            datacite_url,
            semaphore: Arc::new(Semaphore::new(concurrency)),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Option<Value>> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|err| Error::Upstream(err.to_string()))?;
        let response = self.client.get(url).send().await?;
        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(Error::Upstream(format!("HTTP {status}"))),
        }
    }

    pub async fn fetch_crossref(&self, doi: &str) -> Result<Option<Value>> {
        let url = format!("{}/{}", self.crossref_url, doi);
        Ok(self
            .fetch(&url)
            .await?
            .and_then(|body| body.get("message").cloned()))
    }

    pub async fn fetch_datacite(&self, doi: &str) -> Result<Option<Value>> {
        let url = format!("{}/{}", self.datacite_url, doi);
        Ok(self
            .fetch(&url)
            .await?
            .and_then(|body| body.pointer("/data/attributes").cloned()))
    }
}

#[derive(Debug, Deserialize)]
struct PmidResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    records: Vec<PmidRecord>,
}

#[derive(Debug, Deserialize)]
struct PmidRecord {
    #[serde(default)]
    pmid: Option<String>,
}

/// PubMed id conversion service client.
pub struct PubMed {
    client: Client,
    base_url: String,
}

impl PubMed {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            base_url,
        }
    }

    /// Returns Ok(Some(pmid)) when the service knows the DOI, Ok(None) when
    /// it does not.
    pub async fn pmid_for_doi(&self, doi: &str) -> Result<Option<String>> {
        let url = format!("{}/?ids={}&format=json", self.base_url, encode(doi));
        let response = self.client.get(&url).send().await?;
        match response.status() {
            status if status.is_success() => {
                let body: PmidResponse = response.json().await?;
                if body.status != "ok" {
                    return Ok(None);
                }
                Ok(body.records.into_iter().next().and_then(|record| record.pmid))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(Error::Upstream(format!("HTTP {status}"))),
        }
    }
}

/// Personnel directory client.
pub struct People {
    client: Client,
    base_url: String,
}

impl People {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            base_url,
        }
    }

    pub async fn person_by_employee_id(&self, employee_id: &str) -> Result<Option<Person>> {
        let url = format!("{}/{}", self.base_url, encode(employee_id));
        let response = self.client.get(&url).send().await?;
        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(Error::Upstream(format!("HTTP {status}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrgsResponse {
    #[serde(default)]
    result: Vec<OrgEntry>,
}

#[derive(Debug, Deserialize)]
struct OrgEntry {
    #[serde(rename = "SUPORGNAME", default)]
    name: Option<String>,
    #[serde(rename = "SUPORGCODE", default)]
    code: Option<String>,
    #[serde(rename = "LOCATIONCODE", default)]
    location: Option<String>,
}

/// Supervisory organization registry client.
pub struct Orgs {
    client: Client,
    base_url: String,
}

impl Orgs {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            base_url,
        }
    }

    /// Fetch the supervisory org name-to-code map, scoped to entries whose
    /// location names the organization.
    pub async fn fetch_all(&self, org: &Org) -> Result<HashMap<String, String>> {
        let response = self.client.get(&self.base_url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Upstream(format!("HTTP {}", response.status())));
        }
        let body: OrgsResponse = response.json().await?;
        let mut orgs = HashMap::new();
        for entry in body.result {
            let (Some(location), Some(name), Some(code)) = (entry.location, entry.name, entry.code)
            else {
                continue;
            };
            if location.contains(&org.name) {
                orgs.insert(name, code);
            }
        }
        Ok(orgs)
    }
}
