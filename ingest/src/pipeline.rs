use std::path::Path;

use chrono::Local;

use crate::config::Config;
use crate::dedup::dedup_works;
use crate::error::LoaderError;
use crate::loader::PgLoader;
use crate::normalize::normalize;
use crate::record::{CanonicalWork, RawWork};
use crate::source::{read_saved_pages, CrossrefFetcher};

/// Counts from one pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    pub raw: usize,
    pub normalized: usize,
    pub unique: usize,
    pub inserted: u64,
}

/// Run one batch end to end: fetch, read saved pages, normalize with
/// per-item failure isolation, dedup, dump the processed batch to disk,
/// then load it in a single transaction.
///
/// Normalization failures drop only the offending record; schema and load
/// errors abort the run.
pub async fn run(config: &Config) -> Result<PipelineReport, LoaderError> {
    if config.target_items > 0 {
        let fetcher = CrossrefFetcher::new(config);
        let fetched = fetcher.fetch_and_save(config.target_items).await;
        tracing::info!(fetched, "fetch complete");
    }

    let raw = read_saved_pages(Path::new(&config.raw_data_dir));
    tracing::info!(raw = raw.len(), "read raw works from saved pages");

    let normalized = normalize_batch(&raw);
    tracing::info!(normalized = normalized.len(), "normalized works");

    let normalized_count = normalized.len();
    let unique = dedup_works(normalized);
    tracing::info!(unique = unique.len(), "deduplicated works");

    dump_processed(Path::new(&config.processed_data_dir), &unique);

    let loader = PgLoader::connect(config)?;
    loader.ensure_schema().await?;
    let inserted = loader.load_batch(&unique).await?;

    Ok(PipelineReport {
        raw: raw.len(),
        normalized: normalized_count,
        unique: unique.len(),
        inserted,
    })
}

/// Normalize every raw work, logging and dropping the ones that fail. One
/// bad record never aborts the batch.
pub fn normalize_batch(raw: &[RawWork]) -> Vec<CanonicalWork> {
    let mut normalized = Vec::with_capacity(raw.len());

    for work in raw {
        match normalize(work) {
            Ok(canonical) => normalized.push(canonical),
            Err(error) => {
                tracing::warn!(%error, doi = ?work.doi, "dropping record");
            }
        }
    }

    normalized
}

/// Best-effort snapshot of the deduplicated batch; a write failure is
/// logged but does not block loading.
fn dump_processed(dir: &Path, works: &[CanonicalWork]) {
    if let Err(error) = std::fs::create_dir_all(dir) {
        tracing::warn!(%error, dir = %dir.display(), "could not create processed data directory");
        return;
    }

    let path = dir.join(format!("{}_data.json", Local::now().format("%Y%m%d_%H%M%S")));
    match serde_json::to_string_pretty(works) {
        Ok(body) => {
            if let Err(error) = std::fs::write(&path, body) {
                tracing::warn!(%error, path = %path.display(), "could not write processed batch");
            } else {
                tracing::info!(path = %path.display(), works = works.len(), "wrote processed batch");
            }
        }
        Err(error) => {
            tracing::warn!(%error, "could not encode processed batch");
        }
    }
}
