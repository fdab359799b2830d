pub mod fetch;

pub use fetch::HttpPreviewer;

use crate::errors::{Error, FetchError, Result};
use crate::records::{Preview, PreviewOutput, UrlRecord};
use crate::utils::{read_json_file, write_json_file};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Capability that turns a URL into preview metadata.
///
/// The generator only ever sees this trait, so tests substitute a scripted
/// implementation without touching its control flow.
#[allow(async_fn_in_trait)]
pub trait LinkPreviewer {
    async fn parse(&mut self, url: &str) -> std::result::Result<Preview, FetchError>;
}

/// Loads the prior output file as a URL -> preview cache.
///
/// An absent file becomes an empty cache (an empty placeholder file is
/// created so later runs can overwrite it in place); an empty file is an
/// empty cache. Non-empty content is decoded in explicit branches: first
/// as a mapping, then as the output array shape rehydrated into a mapping,
/// then the literal `[]`; anything else is a corrupt cache.
pub fn load_cache(path: &Path) -> Result<BTreeMap<String, Value>> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| Error::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        fs::write(path, "").map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(BTreeMap::new());
    }

    let data = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if data.is_empty() {
        return Ok(BTreeMap::new());
    }

    if let Ok(cache) = serde_json::from_str::<BTreeMap<String, Value>>(&data) {
        return Ok(cache);
    }
    if let Ok(entries) = serde_json::from_str::<Vec<PreviewOutput>>(&data) {
        return Ok(entries
            .into_iter()
            .map(|entry| (entry.url, entry.preview))
            .collect());
    }
    if data.trim() == "[]" {
        return Ok(BTreeMap::new());
    }
    Err(Error::CacheCorrupt {
        path: path.to_path_buf(),
    })
}

/// Generates previews for every record in the input list, reusing the
/// prior output file as a cache and rewriting the output after each
/// emitted item.
///
/// Fetching is strictly sequential, one URL at a time in input order, with
/// a synchronous write after each success - a deliberate trade-off of
/// throughput for crash safety, since an interrupted run leaves a valid,
/// loadable prefix on disk. A failed or empty fetch skips that URL and the
/// run continues; a run that emits nothing at all fails with
/// `NoValidPreviews`.
pub async fn generate_link_previews<P: LinkPreviewer>(
    input_path: &Path,
    output_path: &Path,
    previewer: &mut P,
) -> Result<Vec<PreviewOutput>> {
    let records: Vec<UrlRecord> = read_json_file(input_path)?;
    let mut cache = load_cache(output_path)?;

    let total = records.len();
    let cached = records
        .iter()
        .filter(|record| cache.contains_key(&record.url))
        .count();
    ::log::info!(
        "Total URLs: {}, Cached: {}, To Process: {}",
        total,
        cached,
        total - cached
    );

    let mut output: Vec<PreviewOutput> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        ::log::info!("Processing URL {}/{}: {}", index + 1, total, record.url);

        let preview = match cache.get(&record.url) {
            Some(value) => value.clone(),
            None => {
                let fetched = match previewer.parse(&record.url).await {
                    Ok(preview) => preview,
                    Err(e) => {
                        ::log::warn!("Failed to generate preview for {}: {}", record.url, e);
                        continue;
                    }
                };
                if fetched.is_empty() {
                    ::log::warn!("Skipping empty preview for {}", record.url);
                    continue;
                }
                let value =
                    serde_json::to_value(&fetched).expect("preview serializes to JSON");
                cache.insert(record.url.clone(), value.clone());
                value
            }
        };

        output.push(PreviewOutput {
            id: record.id,
            date: record.date.clone(),
            url: record.url.clone(),
            preview,
        });
        write_json_file(output_path, &output)?;
    }

    if output.is_empty() {
        return Err(Error::NoValidPreviews);
    }

    ::log::info!(
        "Link previews successfully generated and saved to {}",
        output_path.display()
    );
    Ok(output)
}
