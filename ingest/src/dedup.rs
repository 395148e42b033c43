use std::collections::HashSet;

use crate::record::CanonicalWork;

/// Keep one work per DOI, preserving the input order of first occurrences.
///
/// First occurrence wins: the feed is sorted by publication date descending,
/// so a DOI showing up again on a later page is a staler copy.
pub fn dedup_works(works: Vec<CanonicalWork>) -> Vec<CanonicalWork> {
    let mut seen = HashSet::with_capacity(works.len());
    let mut unique = Vec::with_capacity(works.len());

    for work in works {
        if seen.insert(work.doi.clone()) {
            unique.push(work);
        }
    }

    unique
}
