use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A Crossref work item as it arrives from the API. Every field is optional
/// or defaulted so that heterogeneous items decode; an item whose shape is
/// wrong beyond that fails to decode and is skipped at the source boundary.
#[derive(Debug, Default, Deserialize)]
pub struct RawWork {
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,

    #[serde(rename = "type", default)]
    pub work_type: Option<String>,

    #[serde(default)]
    pub title: Vec<String>,

    #[serde(rename = "author", default)]
    pub authors: Vec<RawAuthor>,

    #[serde(default)]
    pub issued: RawDate,

    #[serde(default)]
    pub created: RawDate,

    #[serde(rename = "container-title", default)]
    pub container_title: Vec<String>,

    #[serde(rename = "short-container-title", default)]
    pub short_container_title: Vec<String>,

    #[serde(default)]
    pub publisher: Option<String>,

    #[serde(default)]
    pub volume: Option<String>,

    #[serde(default)]
    pub issue: Option<String>,

    #[serde(default)]
    pub page: Option<String>,

    #[serde(rename = "issn-type", default)]
    pub issn_type: Vec<RawIssn>,

    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,

    #[serde(default)]
    pub license: Vec<RawLicense>,

    #[serde(rename = "reference-count", default)]
    pub reference_count: Option<i32>,

    #[serde(rename = "is-referenced-by-count", default)]
    pub is_referenced_by_count: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAuthor {
    #[serde(default)]
    pub given: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
}

/// Crossref encodes dates as `{"date-parts": [[year, month, day]]}`, where
/// any component may be absent or null.
#[derive(Debug, Default, Deserialize)]
pub struct RawDate {
    #[serde(rename = "date-parts", default)]
    pub date_parts: Vec<Vec<Option<i32>>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawIssn {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawLicense {
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub given: String,
    pub family: String,
}

/// The flat, validated shape a raw work is reduced to. Created once per
/// successfully normalized item and never mutated afterwards; `doi` is the
/// uniqueness key through dedup and the destination table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalWork {
    pub doi: String,
    #[serde(rename = "type")]
    pub work_type: String,
    pub title: String,
    pub authors: Vec<Author>,
    pub published_date: Option<NaiveDate>,
    pub journal: String,
    pub publisher: String,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub page: Option<String>,
    pub print_issn: Option<String>,
    pub electronic_issn: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub license_url: String,
    pub reference_count: i32,
    pub is_referenced_by_count: i32,
}
