//! Sheet retrieval boundary: URL normalization and HTTP download.
//!
//! Everything network-facing lives here so the synchronous pipeline stages
//! stay pure. A frontend runs these calls off its interactive thread (the
//! CLI simply blocks) and replaces its record set wholesale on success.

use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

use crate::normalize::CaseRecord;
use crate::pipeline::{parse_report, IngestError};

/// Marker present in links that are already in published-CSV form.
const PUBLISHED_MARKER: &str = "pub?";

/// Rewrite a share-style Google Sheets link into its published-CSV form.
///
/// The rewrite is a pure function of the document id in the `/d/<id>` path
/// segment. Links already carrying the publish marker, and URLs from
/// anywhere else, pass through unchanged apart from trimming.
pub fn published_csv_url(url: &str) -> String {
    lazy_static! {
        static ref DOC_ID: Regex = Regex::new(r"/d/([a-zA-Z0-9-_]+)").unwrap();
    }

    let url = url.trim();
    if url.contains("docs.google.com/spreadsheets/d/") && !url.contains(PUBLISHED_MARKER) {
        if let Some(caps) = DOC_ID.captures(url) {
            return format!(
                "https://docs.google.com/spreadsheets/d/e/{}/pub?output=csv",
                &caps[1]
            );
        }
    }
    url.to_string()
}

/// Reject payloads that are an HTML page rather than CSV.
///
/// Checked before any tokenization: an unpublished or expired link serves a
/// login/error page that would otherwise tokenize into nonsense rows.
pub fn ensure_csv_payload(text: &str) -> Result<(), IngestError> {
    if text.contains("<!DOCTYPE html>") {
        return Err(IngestError::NotCsv);
    }
    Ok(())
}

/// Download the CSV payload behind an already-normalized URL.
pub fn fetch_csv_text(url: &str) -> Result<String, IngestError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        log::warn!("sheet fetch returned HTTP {} for {}", status, url);
        return Err(IngestError::HttpStatus(status.as_u16()));
    }

    let text = response.text()?;
    ensure_csv_payload(&text)?;
    Ok(text)
}

/// Fetch and parse in one step.
///
/// Returns the full normalized record set or the first fatal error, never a
/// partial set; a caller holding a previous generation keeps it on failure.
pub fn fetch_report(url: &str) -> Result<Vec<CaseRecord>, IngestError> {
    let final_url = published_csv_url(url);
    log::info!("fetching QC sheet from {}", final_url);
    let text = fetch_csv_text(&final_url)?;
    parse_report(&text)
}
