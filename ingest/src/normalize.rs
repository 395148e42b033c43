use chrono::{Datelike, NaiveDate, Utc};

use crate::error::NormalizeError;
use crate::record::{Author, CanonicalWork, RawDate, RawIssn, RawWork};

/// Reduce one raw Crossref item to its flat canonical shape.
///
/// The only rejection is a missing or empty DOI; every other gap is filled
/// with a documented default and a warning. Pure apart from the warnings, so
/// normalizing the same item twice yields identical output.
pub fn normalize(raw: &RawWork) -> Result<CanonicalWork, NormalizeError> {
    let doi = raw
        .doi
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if doi.is_empty() {
        return Err(NormalizeError::MissingDoi);
    }

    let mut authors: Vec<Author> = raw
        .authors
        .iter()
        .filter_map(|a| {
            let given = a.given.as_deref().unwrap_or_default().trim();
            let family = a.family.as_deref().unwrap_or_default().trim();
            if given.is_empty() && family.is_empty() {
                None
            } else {
                Some(Author { given: given.to_owned(), family: family.to_owned() })
            }
        })
        .collect();
    if authors.is_empty() {
        tracing::warn!(doi = %doi, "no authors, defaulting to Unknown");
        authors.push(Author { given: String::new(), family: "Unknown".to_owned() });
    }

    let title = match raw.title.first().map(|t| t.trim()) {
        Some(t) if !t.is_empty() => t.to_owned(),
        _ => {
            tracing::warn!(doi = %doi, "empty title, defaulting to Unknown");
            "Unknown".to_owned()
        }
    };

    let journal = first_non_empty(&raw.container_title)
        .or_else(|| first_non_empty(&raw.short_container_title))
        .unwrap_or_default();

    Ok(CanonicalWork {
        published_date: published_date(&raw.issued, &raw.created, &doi),
        doi,
        work_type: raw.work_type.clone().unwrap_or_else(|| "unknown".to_owned()),
        title,
        authors,
        journal,
        publisher: raw.publisher.as_deref().unwrap_or_default().trim().to_owned(),
        volume: raw.volume.clone(),
        issue: raw.issue.clone(),
        page: raw.page.clone(),
        print_issn: issn_of(&raw.issn_type, "print"),
        electronic_issn: issn_of(&raw.issn_type, "electronic"),
        abstract_text: raw.abstract_text.as_deref().unwrap_or_default().trim().to_owned(),
        license_url: raw
            .license
            .first()
            .and_then(|l| l.url.clone())
            .unwrap_or_default(),
        reference_count: raw.reference_count.unwrap_or(0),
        is_referenced_by_count: raw.is_referenced_by_count.unwrap_or(0),
    })
}

fn first_non_empty(list: &[String]) -> Option<String> {
    list.iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

fn issn_of(list: &[RawIssn], kind: &str) -> Option<String> {
    list.iter()
        .find(|issn| issn.kind.as_deref() == Some(kind))
        .and_then(|issn| issn.value.clone())
}

/// Derive the publication date from the issued date-parts. A missing year
/// means no date at all; out-of-range month/day components fall back to 1.
fn published_date(issued: &RawDate, created: &RawDate, doi: &str) -> Option<NaiveDate> {
    let parts: &[Option<i32>] = issued
        .date_parts
        .first()
        .map(Vec::as_slice)
        .unwrap_or_default();

    let Some(year) = parts.first().copied().flatten() else {
        tracing::warn!(doi = %doi, "missing issued date");
        return None;
    };

    // Fallback year for implausible issued years, from the created date.
    // TODO: substitute this when the issued year is in the far future; it is
    // computed here but not yet applied anywhere.
    let _created_year = created
        .date_parts
        .first()
        .and_then(|p| p.first())
        .copied()
        .flatten()
        .unwrap_or_else(|| Utc::now().year());

    let month = parts.get(1).copied().flatten().unwrap_or(1);
    let day = parts.get(2).copied().flatten().unwrap_or(1);

    let month = if (1..=12).contains(&month) { month as u32 } else { 1 };
    let day = if (1..=31).contains(&day) { day as u32 } else { 1 };

    NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
        tracing::warn!(doi = %doi, year, month, day, "day not valid for month, falling back to 1");
        NaiveDate::from_ymd_opt(year, month, 1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawWork {
        serde_json::from_value(value).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_doi_is_rejected() {
        assert_eq!(normalize(&raw(json!({}))), Err(NormalizeError::MissingDoi));
        assert_eq!(
            normalize(&raw(json!({"DOI": "   "}))),
            Err(NormalizeError::MissingDoi)
        );
    }

    #[test]
    fn doi_is_trimmed_and_lowercased() {
        let work = normalize(&raw(json!({"DOI": "  10.1000/ABC.Def "}))).unwrap();

        assert_eq!(work.doi, "10.1000/abc.def");
    }

    #[test]
    fn authors_are_never_empty() {
        let work = normalize(&raw(json!({"DOI": "10.1/x"}))).unwrap();

        assert_eq!(
            work.authors,
            vec![Author { given: String::new(), family: "Unknown".into() }]
        );
    }

    #[test]
    fn blank_author_entries_are_dropped() {
        let work = normalize(&raw(json!({
            "DOI": "10.1/x",
            "author": [
                {"given": " Ada ", "family": " Lovelace "},
                {"given": "  ", "family": ""},
                {"family": "Turing"}
            ]
        })))
        .unwrap();

        assert_eq!(
            work.authors,
            vec![
                Author { given: "Ada".into(), family: "Lovelace".into() },
                Author { given: String::new(), family: "Turing".into() },
            ]
        );
    }

    #[test]
    fn empty_title_defaults_to_unknown() {
        let absent = normalize(&raw(json!({"DOI": "10.1/x"}))).unwrap();
        let blank = normalize(&raw(json!({"DOI": "10.1/x", "title": ["  "]}))).unwrap();

        assert_eq!(absent.title, "Unknown");
        assert_eq!(blank.title, "Unknown");
    }

    #[test]
    fn out_of_range_date_parts_fall_back_to_january_first() {
        let work = normalize(&raw(json!({
            "DOI": "10.1/x",
            "issued": {"date-parts": [[2023, 13, 40]]}
        })))
        .unwrap();

        assert_eq!(work.published_date, Some(date(2023, 1, 1)));
    }

    #[test]
    fn year_only_date_parts_default_month_and_day() {
        let work = normalize(&raw(json!({
            "DOI": "10.1/x",
            "issued": {"date-parts": [[2023]]}
        })))
        .unwrap();

        assert_eq!(work.published_date, Some(date(2023, 1, 1)));
    }

    #[test]
    fn absent_date_parts_yield_no_published_date() {
        let absent = normalize(&raw(json!({"DOI": "10.1/x"}))).unwrap();
        let null_year = normalize(&raw(json!({
            "DOI": "10.1/x",
            "issued": {"date-parts": [[null]]}
        })))
        .unwrap();

        assert_eq!(absent.published_date, None);
        assert_eq!(null_year.published_date, None);
    }

    #[test]
    fn impossible_calendar_day_falls_back_to_first_of_month() {
        let work = normalize(&raw(json!({
            "DOI": "10.1/x",
            "issued": {"date-parts": [[2023, 2, 30]]}
        })))
        .unwrap();

        assert_eq!(work.published_date, Some(date(2023, 2, 1)));
    }

    // Pins a known latent defect: an implausible future issued year passes
    // through unchanged even though a fallback year is derived from the
    // created date.
    #[test]
    fn future_issued_year_is_not_replaced_by_created_year() {
        let work = normalize(&raw(json!({
            "DOI": "10.1/x",
            "issued": {"date-parts": [[3000]]},
            "created": {"date-parts": [[2020, 6, 15]]}
        })))
        .unwrap();

        assert_eq!(work.published_date, Some(date(3000, 1, 1)));
    }

    #[test]
    fn issns_are_extracted_by_type() {
        let work = normalize(&raw(json!({
            "DOI": "10.1/x",
            "issn-type": [
                {"type": "print", "value": "1234-5678"},
                {"type": "electronic", "value": "9876-5432"}
            ]
        })))
        .unwrap();

        assert_eq!(work.print_issn.as_deref(), Some("1234-5678"));
        assert_eq!(work.electronic_issn.as_deref(), Some("9876-5432"));
    }

    #[test]
    fn absent_issns_are_none() {
        let work = normalize(&raw(json!({"DOI": "10.1/x", "issn-type": []}))).unwrap();

        assert_eq!(work.print_issn, None);
        assert_eq!(work.electronic_issn, None);
    }

    #[test]
    fn journal_falls_back_through_short_container_title() {
        let long = normalize(&raw(json!({
            "DOI": "10.1/x",
            "container-title": ["", "Journal of Examples"],
            "short-container-title": ["J. Ex."]
        })))
        .unwrap();
        let short = normalize(&raw(json!({
            "DOI": "10.1/x",
            "short-container-title": ["J. Ex."]
        })))
        .unwrap();
        let neither = normalize(&raw(json!({"DOI": "10.1/x"}))).unwrap();

        assert_eq!(long.journal, "Journal of Examples");
        assert_eq!(short.journal, "J. Ex.");
        assert_eq!(neither.journal, "");
    }

    #[test]
    fn license_url_takes_first_entry() {
        let with = normalize(&raw(json!({
            "DOI": "10.1/x",
            "license": [
                {"URL": "https://example.org/a"},
                {"URL": "https://example.org/b"}
            ]
        })))
        .unwrap();
        let without = normalize(&raw(json!({"DOI": "10.1/x"}))).unwrap();

        assert_eq!(with.license_url, "https://example.org/a");
        assert_eq!(without.license_url, "");
    }

    #[test]
    fn counts_default_to_zero() {
        let work = normalize(&raw(json!({"DOI": "10.1/x"}))).unwrap();

        assert_eq!(work.reference_count, 0);
        assert_eq!(work.is_referenced_by_count, 0);
    }

    #[test]
    fn normalization_is_idempotent() {
        let item = json!({
            "DOI": "10.1000/Example.1 ",
            "type": "journal-article",
            "title": [" An Example "],
            "author": [{"given": "Ada", "family": "Lovelace"}],
            "issued": {"date-parts": [[2023, 5, 17]]},
            "publisher": " Example House ",
            "abstract": " Some abstract. "
        });

        let first = normalize(&raw(item.clone())).unwrap();
        let second = normalize(&raw(item)).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.publisher, "Example House");
        assert_eq!(first.abstract_text, "Some abstract.");
    }
}
