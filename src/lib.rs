//! CATI QC Analytics Toolkit
//!
//! Ingests a published CSV export of a call-center (CATI) quality-control
//! spreadsheet and reshapes it into per-agent and per-outcome aggregates.
//!
//! This library provides:
//! - `tokenize`: CSV tokenizer tolerant of quoting and line-ending variants
//! - `columns`: header-row detection and logical-column resolution
//! - `normalize`: row-to-record normalization and outcome canonicalization
//! - `summary`: per-agent aggregation and headline KPIs
//! - `filter`: record selection for presentation frontends
//! - `pipeline`: all-or-nothing ingestion orchestration and CSV export
//! - `fetch`: sheet-URL normalization and HTTP retrieval
//!
//! Binaries:
//! - `qc-csv`: command-line frontend (fetch, report, cases, export)

pub mod columns;
pub mod fetch;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod summary;
pub mod tokenize;

// Re-export the types most callers need.
pub use filter::FilterState;
pub use normalize::{CaseRecord, Outcome};
pub use pipeline::{parse_report, IngestError};
pub use summary::{AgentSummary, KpiSummary};
