use crate::config::PipelineConfig;
use crate::dedup::{ensure_unique_urls, filter_records};
use crate::errors::Result;
use crate::normalize::{strip_session_set, warn_if_session_remains};
use crate::records::UrlRecord;
use crate::utils::{read_json_file, write_json_file};
use crate::validate::{HeadProbe, validate_urls_concurrently};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Chat export document, as produced by the messenger's JSON export.
/// Only the fields the pipeline needs are modeled; everything else in the
/// document is ignored.
#[derive(Debug, Deserialize)]
pub struct ChatExport {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub text_entities: Vec<TextEntity>,
}

#[derive(Debug, Deserialize)]
pub struct TextEntity {
    /// Absent on some entity kinds; an empty type never matches "link"
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub text: String,
}

/// Flattens a chat export into URL records.
///
/// Only entities of type "link" produce records; ids are 1-based and
/// assigned in document order, and each record carries the date of the
/// message it was found in.
pub fn extract_url_records(export: &ChatExport) -> Vec<UrlRecord> {
    let mut records = Vec::new();
    let mut id = 1;
    for message in &export.messages {
        for entity in &message.text_entities {
            ::log::trace!("Processing entity: {:?}", entity);
            if entity.kind == "link" {
                records.push(UrlRecord::new(id, message.date.clone(), entity.text.clone()));
                id += 1;
            }
        }
    }
    records
}

/// Runs the import pipeline: parse the chat export, validate and normalize
/// the extracted URLs concurrently, deduplicate them order-preservingly,
/// and write the filtered record list.
///
/// Returns the filtered records on success. A malformed export or ignore
/// pattern aborts the run; individual bad URLs are dropped silently.
pub async fn process_import(
    input_path: &Path,
    output_path: &Path,
    config: &PipelineConfig,
) -> Result<Vec<UrlRecord>> {
    let export: ChatExport = read_json_file(input_path)?;
    let records = extract_url_records(&export);

    let ignore_regex = config.ignore_regex()?;
    let probe = config.validate_head.then(|| {
        HeadProbe::new(
            Duration::from_secs(config.probe_timeout_secs),
            config.probe_rate_per_sec,
        )
    });

    let urls: Vec<String> = records.iter().map(|record| record.url.clone()).collect();
    let result =
        validate_urls_concurrently(&urls, ignore_regex, config.max_concurrency, probe).await;

    let valid_urls = strip_session_set(result.valid_urls);
    warn_if_session_remains(&valid_urls);
    let valid_urls = ensure_unique_urls(&valid_urls, &records);

    let total = records.len();
    let invalid = total - valid_urls.len() - result.ignored_count;
    ::log::info!("Total URLs read: {}", total);
    ::log::info!("Valid URLs: {}", valid_urls.len());
    ::log::info!("Invalid URLs: {}", invalid);
    ::log::info!("Ignored URLs: {}", result.ignored_count);

    let filtered = filter_records(&valid_urls, &records);
    write_json_file(output_path, &filtered)?;

    ::log::info!(
        "URLs successfully processed and saved to {}",
        output_path.display()
    );
    Ok(filtered)
}
