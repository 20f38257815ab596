//! Ingestion orchestration: raw CSV text in, normalized records out.
//!
//! These are library functions shared by the CLI and any other frontend,
//! returning structured data instead of printing. The synchronous stages
//! (tokenize, locate, resolve, normalize) are pure, so they are callable
//! and testable without a network layer in the way.

use anyhow::{Context, Result};
use std::path::Path;
use thiserror::Error;

use crate::columns::{self, ColumnMap};
use crate::normalize::{normalize_rows, CaseRecord};
use crate::tokenize::tokenize;

/// Everything that can abort an ingestion attempt.
///
/// Row-level issues (missing agent name, unrecognized result text) are
/// handled inside normalization and are deliberately absent here: they drop
/// or degrade a single row, never the attempt. Any variant below means the
/// attempt produced nothing and the caller's previous record set stands.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Network-level failure before any payload arrived.
    #[error("could not reach the sheet: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("could not access the file (HTTP {0} — expired or unpublished link?)")]
    HttpStatus(u16),

    /// The payload is an HTML page, not CSV. Usually a login or error page
    /// behind a link that was never published as CSV.
    #[error("the link did not return CSV; use File > Share > Publish to web and choose CSV")]
    NotCsv,

    /// Fewer than two rows survived tokenization.
    #[error("the sheet has no data rows")]
    NoData,

    /// No row matched the header keyword probe.
    #[error("could not find the header row; check the sheet's column names")]
    HeaderNotFound,

    /// A required column is missing from the header row.
    #[error("missing required column(s): {0}")]
    MissingColumns(String),
}

/// Parse a CSV payload into normalized records.
///
/// All-or-nothing: on any error no records are produced. Record ids are
/// assigned from zero per parse.
pub fn parse_report(text: &str) -> Result<Vec<CaseRecord>, IngestError> {
    let rows = tokenize(text);
    if rows.len() < 2 {
        return Err(IngestError::NoData);
    }

    let header_idx = columns::locate_header(&rows).ok_or(IngestError::HeaderNotFound)?;
    let map = ColumnMap::resolve(&rows[header_idx]);

    let missing = map.missing_required();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|f| f.needle()).collect();
        return Err(IngestError::MissingColumns(names.join(", ")));
    }

    Ok(normalize_rows(&rows[header_idx + 1..], &map, 0))
}

/// Write normalized records to a CSV file.
///
/// The header uses the canonical column names, so an exported file can be
/// re-ingested with [`parse_report`].
pub fn export_records(records: &[CaseRecord], output: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    writer.write_record([
        "id",
        "Year",
        "เดือน",
        "วันที่สัมภาษณ์",
        "TOUCH_POINT",
        "AC / BC",
        "Supervisor",
        "Interviewer",
        "ไฟล์เสียง",
        "สรุปผลการสัมภาษณ์",
        "Comment",
    ])?;

    for rec in records {
        writer.write_record([
            rec.id.to_string().as_str(),
            &rec.year,
            &rec.month,
            &rec.date,
            &rec.touchpoint,
            &rec.case_type,
            &rec.supervisor,
            &rec.agent,
            rec.audio.as_deref().unwrap_or(""),
            rec.result.label(),
            rec.comment.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush().context("Failed to flush output CSV")?;
    Ok(())
}
