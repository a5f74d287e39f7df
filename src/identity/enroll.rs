use crate::error::Error;
use crate::identity::{names, IdentityFilter, IdentityPatch, IdentityStore};
use crate::{IdentityRecord, Person, Result};

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// Affiliation names known to the personnel directory for one person:
/// supervisory orgs, then the cost-center description when no group is
/// already known, then managed teams. Deduplicated and sorted.
pub fn directory_affiliations(person: &Person, group: Option<&str>) -> Vec<String> {
    let mut affiliations: Vec<String> = Vec::new();
    for org in &person.affiliations {
        if let Some(name) = non_empty(&org.sup_org_name) {
            if !affiliations.iter().any(|existing| existing == name) {
                affiliations.push(name.to_string());
            }
        }
    }
    if group.is_none() {
        if let Some(cc_descr) = non_empty(&person.cc_descr) {
            if !affiliations.iter().any(|existing| existing == cc_descr) {
                affiliations.push(cc_descr.to_string());
            }
        }
    }
    for team in &person.managed_teams {
        if let Some(name) = non_empty(&team.sup_org_name) {
            if !affiliations.iter().any(|existing| existing == name) {
                affiliations.push(name.to_string());
            }
        }
    }
    affiliations.sort();
    affiliations
}

/// Create an identity record for a directory person. Fails if the personnel
/// identifier or the ORCID is already registered.
pub fn enroll(
    person: &Person,
    orcid: Option<&str>,
    store: &dyn IdentityStore,
) -> Result<IdentityRecord> {
    let employee_id = non_empty(&person.employee_id)
        .ok_or_else(|| Error::Invalid("person record has no employee id".into()))?;
    if store
        .find_one(&IdentityFilter::EmployeeId(employee_id.to_string()))?
        .is_some()
    {
        return Err(Error::AlreadyRegistered(employee_id.to_string()));
    }
    if let Some(orcid) = orcid {
        if store
            .find_one(&IdentityFilter::Orcid(orcid.to_string()))?
            .is_some()
        {
            return Err(Error::AlreadyRegistered(orcid.to_string()));
        }
    }

    let (given, family) = names::name_combinations(Some(person), &[], &[]);
    if family.is_empty() {
        return Err(Error::Invalid("person record has no family name".into()));
    }

    let record = IdentityRecord {
        given,
        family,
        orcid: orcid.map(String::from),
        employee_id: Some(employee_id.to_string()),
        affiliations: directory_affiliations(person, None),
        user_id: person.user_id_o365.clone(),
        worker_type: person.worker_type.clone(),
        ..Default::default()
    };
    store.insert_one(&record)?;
    Ok(record)
}

/// Fold newly observed name variants and a late-arriving ORCID into an
/// existing identity record. Returns the matched-record count from the
/// store; 0 when nothing needed updating.
pub fn merge_person(
    record: &IdentityRecord,
    person: Option<&Person>,
    orcid: Option<&str>,
    store: &dyn IdentityStore,
) -> Result<u64> {
    let (given, family) = names::name_combinations(person, &record.given, &record.family);
    let mut patch = IdentityPatch::default();
    if given != record.given {
        patch.given = Some(given);
    }
    if family != record.family {
        patch.family = Some(family);
    }
    if record.orcid.is_none() {
        if let Some(orcid) = orcid {
            patch.orcid = Some(orcid.to_string());
        }
    }
    if patch.is_empty() {
        return Ok(0);
    }

    let filter = if let Some(id) = non_empty(&record.employee_id) {
        IdentityFilter::EmployeeId(id.to_string())
    } else if let Some(orcid) = non_empty(&record.orcid) {
        IdentityFilter::Orcid(orcid.to_string())
    } else {
        return Err(Error::Invalid(
            "identity record has no unique identifier to update by".into(),
        ));
    };
    store.update_one(&filter, &patch)
}
