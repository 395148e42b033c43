use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use serde_json::Value;

use crate::config::Config;
use crate::error::FetchError;
use crate::record::RawWork;

/// Pulls pages from the Crossref works API cursor by cursor, saving each raw
/// page body to a timestamped JSON file. A failed request stops pagination
/// but never fails the run; already-saved pages still get processed.
pub struct CrossrefFetcher {
    client: reqwest::Client,
    endpoint: String,
    raw_dir: PathBuf,
    page_delay: Duration,
}

impl CrossrefFetcher {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.api_endpoint.clone(),
            raw_dir: PathBuf::from(&config.raw_data_dir),
            page_delay: config.page_delay.0,
        }
    }

    /// Fetch pages until `target_items` items have been saved or the feed
    /// runs out. Returns the number of items actually fetched.
    pub async fn fetch_and_save(&self, target_items: usize) -> usize {
        if let Err(error) = std::fs::create_dir_all(&self.raw_dir) {
            tracing::error!(%error, dir = %self.raw_dir.display(), "could not create raw data directory");
            return 0;
        }

        let mut cursor = "*".to_owned();
        let mut total = 0usize;
        let mut page = 1u32;

        while total < target_items {
            let body = match self.fetch_page(&cursor).await {
                Ok(body) => body,
                Err(error) => {
                    tracing::error!(%error, page, "fetch failed, stopping pagination");
                    break;
                }
            };

            let items = body
                .pointer("/message/items")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            total += items;
            tracing::info!(page, items, total, "fetched page");

            if let Err(error) = self.save_page(page, &body) {
                tracing::error!(%error, page, "could not save raw page");
            }

            if total >= target_items {
                tracing::info!(total, target_items, "reached target item count");
                break;
            }

            match body.pointer("/message/next-cursor").and_then(Value::as_str) {
                Some(next) => cursor = next.to_owned(),
                None => {
                    tracing::info!("no more pages available");
                    break;
                }
            }

            page += 1;
            tokio::time::sleep(self.page_delay).await;
        }

        total
    }

    async fn fetch_page(&self, cursor: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("cursor", cursor)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    fn save_page(&self, page: u32, body: &Value) -> Result<(), FetchError> {
        let filename = format!("{}_page_{}.json", Local::now().format("%Y%m%d_%H%M%S"), page);
        let path = self.raw_dir.join(filename);
        std::fs::write(&path, serde_json::to_string_pretty(body)?)?;

        tracing::info!(path = %path.display(), "saved raw page");
        Ok(())
    }
}

/// Read every saved page file back into raw works, oldest page first.
/// Unreadable files and malformed items are skipped with a warning each;
/// they never abort the batch.
pub fn read_saved_pages(dir: &Path) -> Vec<RawWork> {
    let mut works = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!(%error, dir = %dir.display(), "could not read raw data directory");
            return works;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    // timestamped filenames, so lexicographic order is chronological
    paths.sort();

    for path in paths {
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) => {
                tracing::warn!(%error, path = %path.display(), "skipping unreadable page file");
                continue;
            }
        };

        let body: Value = match serde_json::from_str(&contents) {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(%error, path = %path.display(), "skipping unparseable page file");
                continue;
            }
        };

        let Some(items) = body.pointer("/message/items").and_then(Value::as_array) else {
            tracing::warn!(path = %path.display(), "page file has no message.items");
            continue;
        };

        for item in items {
            match serde_json::from_value::<RawWork>(item.clone()) {
                Ok(work) => works.push(work),
                Err(error) => {
                    tracing::warn!(%error, path = %path.display(), "skipping malformed item")
                }
            }
        }
    }

    works
}
