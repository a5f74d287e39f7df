use doi_identity::record::{self, BiblioRecord, RecordKind};
use serde_json::json;

#[test]
fn test_record_kind_detection() {
    let crossref = json!({"DOI": "10.7554/elife.98405"});
    let datacite = json!({"doi": "10.25378/janelia.23816295.v1", "creators": []});

    assert_eq!(RecordKind::of(&crossref), RecordKind::Crossref);
    assert_eq!(RecordKind::of(&datacite), RecordKind::DataCite);
}

#[test]
fn test_author_entry_extracts_crossref_fields() {
    let record_json = json!({
        "DOI": "10.7554/elife.98405",
        "author": [
            {
                "given": "Geoffrey W",
                "family": "Meissner",
                "sequence": "first",
                "ORCID": "http://orcid.org/0000-0003-0369-9788",
                "affiliation": [
                    {"name": "Janelia Research Campus, Howard Hughes Medical Institute"}
                ]
            },
            {
                "given": "Yoshinori",
                "family": "Aso",
                "sequence": "additional",
                "affiliation": []
            }
        ]
    });

    let record = BiblioRecord::new(record_json);
    let authors = record.author_entries().unwrap();

    assert_eq!(authors.len(), 2);
    assert!(authors[0].is_first);
    assert!(!authors[0].is_last);
    assert_eq!(authors[0].family.as_deref(), Some("Meissner"));
    assert_eq!(authors[0].given, "Geoffrey W");
    assert_eq!(authors[0].paper_orcid.as_deref(), Some("0000-0003-0369-9788"));
    assert_eq!(
        authors[0].affiliations,
        vec!["Janelia Research Campus, Howard Hughes Medical Institute"]
    );
    assert!(!authors[1].is_first);
    assert!(authors[1].is_last);
}

#[test]
fn test_author_entry_normalizes_nonbreaking_spaces() {
    let auth = json!({"given": "Jane\u{a0}Q", "family": "Van\u{a0}Doe"});

    let payload = record::author_entry(&auth, RecordKind::Crossref, 0, 0);

    assert_eq!(payload.given, "Jane Q");
    assert_eq!(payload.family.as_deref(), Some("Van Doe"));
}

#[test]
fn test_author_values_falls_back_to_editor() {
    let record_json = json!({
        "DOI": "10.1234/edited",
        "editor": [{"given": "Jane", "family": "Doe"}]
    });

    let record = BiblioRecord::new(record_json);
    let authors = record.author_entries().unwrap();

    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].family.as_deref(), Some("Doe"));
}

#[test]
fn test_author_values_falls_back_to_record_level_name() {
    let record_json = json!({
        "DOI": "10.1234/consortium",
        "name": "FlyEM Project Team"
    });

    let record = BiblioRecord::new(record_json);
    let authors = record.author_entries().unwrap();

    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].name.as_deref(), Some("FlyEM Project Team"));
}

#[test]
fn test_author_values_none_when_no_author_signal() {
    let record = BiblioRecord::new(json!({"DOI": "10.1234/empty"}));
    assert!(record.author_entries().is_none());
}

#[test]
fn test_datacite_display_name_split_is_best_effort() {
    let auth = json!({"name": "Jane Q Doe"});

    let payload = record::author_entry(&auth, RecordKind::DataCite, 0, 0);

    assert_eq!(payload.name.as_deref(), Some("Jane Q Doe"));
    assert_eq!(payload.given, "Jane");
    assert_eq!(payload.family.as_deref(), Some("Doe"));
}

#[test]
fn test_datacite_structured_names_beat_the_split() {
    let auth = json!({
        "name": "Doe, Jane",
        "givenName": "Jane",
        "familyName": "Doe"
    });

    let payload = record::author_entry(&auth, RecordKind::DataCite, 0, 0);

    assert_eq!(payload.given, "Jane");
    assert_eq!(payload.family.as_deref(), Some("Doe"));
    assert!(payload.name.is_none());
}

#[test]
fn test_datacite_orcid_from_name_identifiers() {
    let auth = json!({
        "givenName": "Rob",
        "familyName": "Svirskas",
        "nameIdentifiers": [
            {
                "nameIdentifier": "https://orcid.org/0000-0001-8374-6008",
                "nameIdentifierScheme": "ORCID"
            }
        ]
    });

    let payload = record::author_entry(&auth, RecordKind::DataCite, 0, 0);

    assert_eq!(payload.paper_orcid.as_deref(), Some("0000-0001-8374-6008"));
}

#[test]
fn test_affiliations_accept_strings_and_objects() {
    let auth = json!({
        "givenName": "Jane",
        "familyName": "Doe",
        "affiliation": ["Janelia Research Campus", {"name": "MIT"}, {"id": "no name"}]
    });

    let payload = record::author_entry(&auth, RecordKind::DataCite, 0, 0);

    assert_eq!(payload.affiliations, vec!["Janelia Research Campus", "MIT"]);
}

#[test]
fn test_title_extraction_per_schema() {
    let crossref = BiblioRecord::new(json!({
        "DOI": "10.7554/elife.98405",
        "title": ["A split-GAL4 driver line resource for Drosophila CNS cell types"]
    }));
    let datacite = BiblioRecord::new(json!({
        "doi": "10.25378/janelia.1",
        "titles": [{"title": "A dataset"}]
    }));
    let empty = BiblioRecord::new(json!({"DOI": "10.1234/x", "title": [""]}));

    assert_eq!(
        crossref.title().as_deref(),
        Some("A split-GAL4 driver line resource for Drosophila CNS cell types")
    );
    assert_eq!(datacite.title().as_deref(), Some("A dataset"));
    assert!(empty.title().is_none());
}

#[test]
fn test_abstract_extraction_per_schema() {
    let crossref = BiblioRecord::new(json!({
        "DOI": "10.1234/x",
        "abstract": "<jats:p>Summary text</jats:p>"
    }));
    let datacite = BiblioRecord::new(json!({
        "doi": "10.25378/janelia.1",
        "descriptions": [
            {"description": "Methods text", "descriptionType": "Methods"},
            {"description": "Abstract text", "descriptionType": "Abstract"}
        ]
    }));
    let none = BiblioRecord::new(json!({"doi": "10.25378/janelia.2"}));

    assert_eq!(
        crossref.abstract_text().as_deref(),
        Some("<jats:p>Summary text</jats:p>")
    );
    assert_eq!(datacite.abstract_text().as_deref(), Some("Abstract text"));
    assert!(none.abstract_text().is_none());
}

#[test]
fn test_publishing_date_formats_with_zero_padding() {
    let record = BiblioRecord::new(json!({
        "DOI": "10.1234/x",
        "published": {"date-parts": [[2011, 9, 1]]}
    }));

    assert_eq!(record.publishing_date().as_deref(), Some("2011-09-01"));
}

#[test]
fn test_publishing_date_section_priority() {
    let record = BiblioRecord::new(json!({
        "DOI": "10.1234/x",
        "created": {"date-parts": [[2020, 1, 1]]},
        "published": {"date-parts": [[2024, 7, 30]]}
    }));

    assert_eq!(record.publishing_date().as_deref(), Some("2024-07-30"));
}

#[test]
fn test_publishing_date_skips_incomplete_sections() {
    let record = BiblioRecord::new(json!({
        "DOI": "10.1234/x",
        "published": {"date-parts": [[2024, 7]]},
        "created": {"date-parts": [[2023, 12, 25]]}
    }));

    assert_eq!(record.publishing_date().as_deref(), Some("2023-12-25"));
}

#[test]
fn test_publishing_date_none_when_no_section_qualifies() {
    let crossref = BiblioRecord::new(json!({
        "DOI": "10.1234/x",
        "published": {"date-parts": [[2024]]}
    }));
    let datacite = BiblioRecord::new(json!({"doi": "10.25378/janelia.1"}));

    assert!(crossref.publishing_date().is_none());
    assert!(datacite.publishing_date().is_none());
}

#[test]
fn test_publishing_date_from_datacite_registered_timestamp() {
    let record = BiblioRecord::new(json!({
        "doi": "10.25378/janelia.1",
        "registered": "2023-05-17T12:34:56Z"
    }));

    assert_eq!(record.publishing_date().as_deref(), Some("2023-05-17"));
}

#[test]
fn test_journal_full_format() {
    let record = BiblioRecord::new(json!({
        "DOI": "10.1002/cne.22542",
        "container-title": ["J of Comparative Neurology"],
        "published": {"date-parts": [[2011, 9, 1]]},
        "volume": "519",
        "page": "661-689"
    }));

    assert_eq!(
        record.journal(true).as_deref(),
        Some("J of Comparative Neurology. 2011; 519: 661-689")
    );
}

#[test]
fn test_journal_prefers_short_container_title() {
    let record = BiblioRecord::new(json!({
        "DOI": "10.1234/x",
        "short-container-title": ["J Comp Neurol"],
        "container-title": ["J of Comparative Neurology"],
        "published": {"date-parts": [[2011, 9, 1]]}
    }));

    assert_eq!(record.journal(false).as_deref(), Some("J Comp Neurol. 2011"));
}

#[test]
fn test_journal_doi_segment_stands_in_for_missing_page() {
    let record = BiblioRecord::new(json!({
        "DOI": "10.7554/elife.98405",
        "short-container-title": ["eLife"],
        "published": {"date-parts": [[2024, 7, 30]]},
        "volume": "13"
    }));

    assert_eq!(
        record.journal(true).as_deref(),
        Some("eLife. 2024; 13: elife.98405")
    );
}

#[test]
fn test_journal_institution_fallback() {
    let record = BiblioRecord::new(json!({
        "DOI": "10.1234/x",
        "institution": [{"name": "Research Square"}],
        "published": {"date-parts": [[2022, 3, 4]]}
    }));

    assert_eq!(record.journal(false).as_deref(), Some("Research Square. 2022"));
}

#[test]
fn test_journal_preprint_server_from_doi_prefix() {
    let record = BiblioRecord::new(json!({
        "DOI": "10.1101/2022.07.20.500311",
        "posted": {"date-parts": [[2022, 7, 20]]}
    }));

    assert_eq!(record.journal(false).as_deref(), Some("bioRxiv. 2022"));
}

#[test]
fn test_journal_from_datacite_publisher() {
    let record = BiblioRecord::new(json!({
        "doi": "10.25378/janelia.1",
        "publisher": "Janelia Research Campus",
        "registered": "2023-05-17T12:34:56Z"
    }));

    assert_eq!(
        record.journal(true).as_deref(),
        Some("Janelia Research Campus. 2023")
    );
}

#[test]
fn test_journal_none_when_date_unknown() {
    let record = BiblioRecord::new(json!({
        "DOI": "10.1234/x",
        "container-title": ["J of Comparative Neurology"]
    }));

    assert!(record.journal(true).is_none());
}

#[test]
fn test_journal_none_when_no_venue() {
    let record = BiblioRecord::new(json!({
        "DOI": "10.9999/unknown-prefix",
        "published": {"date-parts": [[2020, 1, 1]]}
    }));

    assert!(record.journal(true).is_none());
}
