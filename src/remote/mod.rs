mod client;

pub use client::{
    Orgs, People, PubMed, Registries, CROSSREF_URL, DATACITE_URL, ORGS_URL, PEOPLE_URL, PUBMED_URL,
};
