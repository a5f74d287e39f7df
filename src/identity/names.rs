use regex::Regex;
use std::sync::LazyLock;

use crate::Person;

static TWO_INITIALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]\. [A-Za-z]\.$").expect("two-initials pattern"));
static DOTTED_INITIALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]\.[A-Za-z]\.$").expect("dotted-initials pattern"));
static TRAILING_INITIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" [A-Za-z]\.$").expect("trailing-initial pattern"));

fn push_unique(list: &mut Vec<String>, candidate: String) {
    if !candidate.is_empty() && !list.contains(&candidate) {
        list.push(candidate);
    }
}

/// Expand given names in the forms "F.M." or "First M." into their
/// period-stripped equivalents. Names already in the canonical "F. M." form
/// are left alone. Returns a new insertion-ordered, duplicate-free list;
/// running it twice yields the same list.
pub fn expand_given_names(given: &[String]) -> Vec<String> {
    let mut expanded = given.to_vec();
    for first in given {
        if TWO_INITIALS.is_match(first) {
            continue;
        }
        if DOTTED_INITIALS.is_match(first) {
            push_unique(&mut expanded, first.replace('.', " ").trim_end().to_string());
        } else if TRAILING_INITIAL.is_match(first) {
            push_unique(&mut expanded, first.trim_end_matches('.').to_string());
        }
    }
    expanded
}

/// Fold directory-sourced name fields into candidate lists, then derive the
/// middle-initial combinations downstream name matching needs. Citation
/// registries record the same person under many orthographic forms; the
/// candidate lists have to hold all of them.
pub fn name_combinations(
    person: Option<&Person>,
    given: &[String],
    family: &[String],
) -> (Vec<String>, Vec<String>) {
    let mut given_out = given.to_vec();
    let mut family_out = family.to_vec();

    if let Some(person) = person {
        for source in [&person.name_first, &person.name_first_preferred] {
            if let Some(name) = source {
                push_unique(&mut given_out, name.clone());
            }
        }
        for source in [&person.name_last, &person.name_last_preferred] {
            if let Some(name) = source {
                push_unique(&mut family_out, name.clone());
            }
        }
        for source in [&person.name_middle, &person.name_middle_preferred] {
            let Some(middle) = source.as_deref().filter(|middle| !middle.is_empty()) else {
                continue;
            };
            let Some(initial) = middle.chars().next() else {
                continue;
            };
            let bases: Vec<String> = given_out
                .iter()
                .filter(|first| !first.contains(' '))
                .cloned()
                .collect();
            for first in bases {
                let combined = format!("{first} {initial}");
                push_unique(&mut given_out, combined.clone());
                push_unique(&mut given_out, format!("{combined}."));
            }
        }
    }

    (expand_given_names(&given_out), family_out)
}
