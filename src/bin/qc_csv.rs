//! QC CSV Tool - fetch and analyze call-center QC results
//!
//! Command-line frontend for the ingestion pipeline: fetches the published
//! QC sheet (or reads a local CSV export), applies filters, and prints
//! headline KPIs, the per-agent outcome matrix, and individual case logs.
//!
//! The last successfully fetched URL is remembered in `~/.qc-toolkit.conf`,
//! so after one `fetch --url <link>` the other subcommands work bare.

use anyhow::{Context, Result};
use cati_qc_toolkit::fetch::{ensure_csv_payload, fetch_report, published_csv_url};
use cati_qc_toolkit::filter::{self, FilterState};
use cati_qc_toolkit::normalize::{CaseRecord, Outcome};
use cati_qc_toolkit::pipeline::{export_records, parse_report};
use cati_qc_toolkit::summary::{kpis, summarize, AgentSummary, KpiSummary};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "qc-csv")]
#[command(about = "Analyze call-center QC results from a published spreadsheet CSV")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Filter flags shared by the reporting subcommands.
#[derive(Args, Default)]
struct FilterArgs {
    /// Free-text search over agent names and comments
    #[arg(long)]
    search: Option<String>,

    /// Outcome: excellent, pass, improve, error, fail, na (or the sheet label)
    #[arg(long)]
    result: Option<String>,

    /// Case type, e.g. AC or BC
    #[arg(long)]
    case_type: Option<String>,

    /// Supervisor name (exact match)
    #[arg(long)]
    supervisor: Option<String>,

    /// Year (exact match)
    #[arg(long)]
    year: Option<String>,

    /// Month as written in the sheet (exact match)
    #[arg(long)]
    month: Option<String>,
}

impl FilterArgs {
    fn to_state(&self) -> Result<FilterState> {
        let result = match &self.result {
            Some(token) => Some(
                Outcome::parse_token(token)
                    .ok_or_else(|| anyhow::anyhow!("Unknown outcome '{}'", token))?,
            ),
            None => None,
        };
        Ok(FilterState {
            search: self.search.clone(),
            result,
            case_type: self.case_type.clone(),
            supervisor: self.supervisor.clone(),
            year: self.year.clone(),
            month: self.month.clone(),
            drill: None,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the QC sheet, print headline KPIs, and remember the URL
    Fetch {
        /// Share or published-CSV link (defaults to the saved one)
        #[arg(short, long, env = "QC_SHEET_URL")]
        url: Option<String>,

        /// Also write the normalized records to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print KPIs and the per-agent outcome matrix
    Report {
        /// Local CSV export to read instead of fetching
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Share or published-CSV link (defaults to the saved one)
        #[arg(short, long, env = "QC_SHEET_URL")]
        url: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Emit JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// List individual audited cases
    Cases {
        /// Local CSV export to read instead of fetching
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Share or published-CSV link (defaults to the saved one)
        #[arg(short, long, env = "QC_SHEET_URL")]
        url: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Drill down to one agent's matrix cell (requires --result)
        #[arg(long)]
        agent: Option<String>,

        /// Maximum cases to print
        #[arg(long, default_value = "200")]
        limit: usize,

        /// Emit JSON instead of a case log
        #[arg(long)]
        json: bool,
    },

    /// Write normalized records to a CSV file
    Export {
        /// Local CSV export to read instead of fetching
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Share or published-CSV link (defaults to the saved one)
        #[arg(short, long, env = "QC_SHEET_URL")]
        url: Option<String>,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Forget the saved sheet URL
    Forget,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch { url, output } => fetch_sheet(url.as_deref(), output.as_deref())?,
        Commands::Report {
            input,
            url,
            filters,
            json,
        } => report(input.as_deref(), url.as_deref(), &filters, json)?,
        Commands::Cases {
            input,
            url,
            filters,
            agent,
            limit,
            json,
        } => cases(input.as_deref(), url.as_deref(), &filters, agent, limit, json)?,
        Commands::Export { input, url, output } => export(input.as_deref(), url.as_deref(), &output)?,
        Commands::Forget => {
            forget_sheet_url();
            println!("Saved sheet URL cleared.");
        }
    }

    Ok(())
}

fn fetch_sheet(url: Option<&str>, output: Option<&Path>) -> Result<()> {
    let url = resolve_url(url)?;
    let final_url = published_csv_url(&url);
    let records = fetch_report(&final_url)?;

    // Remember the normalized link only after the whole ingestion succeeded.
    save_sheet_url(&final_url);
    println!("Connected: {} cases", records.len());

    let selected: Vec<&CaseRecord> = records.iter().collect();
    print!("{}", render_kpis(&kpis(&selected))?);

    if let Some(path) = output {
        export_records(&records, path)?;
        println!("Wrote {} records to {}", records.len(), path.display());
    }
    Ok(())
}

fn report(input: Option<&Path>, url: Option<&str>, filters: &FilterArgs, json: bool) -> Result<()> {
    let records = load_records(input, url)?;
    let state = filters.to_state()?;
    let selected = state.select(&records);
    let headline = kpis(&selected);
    let summaries = summarize(&selected);

    if json {
        let doc = json!({
            "kpis": headline,
            "agents": summaries,
            "months": filter::months(&records),
            "supervisors": filter::supervisors(&records),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    print!("{}", render_kpis(&headline)?);
    print!("{}", render_matrix(&summaries)?);
    Ok(())
}

fn cases(
    input: Option<&Path>,
    url: Option<&str>,
    filters: &FilterArgs,
    agent: Option<String>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let records = load_records(input, url)?;
    let mut state = filters.to_state()?;
    if let Some(agent) = agent {
        let outcome = state
            .result
            .ok_or_else(|| anyhow::anyhow!("--agent pins one matrix cell and requires --result"))?;
        state.drill = Some((agent, outcome));
    }

    let details = state.select_details(&records);
    let shown = &details[..details.len().min(limit)];

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    let mut out = String::new();
    writeln!(out, "{:=^72}", " CASE LOG ")?;
    for rec in shown {
        writeln!(
            out,
            "{:<6} {:<12} {:<4} {:<22} {}",
            format!("#{}", rec.id),
            rec.date,
            rec.case_type,
            rec.agent,
            rec.result
        )?;
        if let Some(comment) = &rec.comment {
            writeln!(out, "       comment: {}", comment)?;
        }
        if let Some(audio) = &rec.audio {
            writeln!(out, "       audio:   {}", audio)?;
        }
    }
    if details.len() > shown.len() {
        writeln!(
            out,
            "... and {} more (raise --limit to see them)",
            details.len() - shown.len()
        )?;
    }
    if shown.is_empty() {
        writeln!(out, "(no records for current filters)")?;
    }
    print!("{}", out);
    Ok(())
}

fn export(input: Option<&Path>, url: Option<&str>, output: &Path) -> Result<()> {
    let records = load_records(input, url)?;
    export_records(&records, output)?;
    println!("Wrote {} records to {}", records.len(), output.display());
    Ok(())
}

/// Resolve the record source: explicit file, explicit URL, or the saved URL.
fn load_records(input: Option<&Path>, url: Option<&str>) -> Result<Vec<CaseRecord>> {
    if let Some(path) = input {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        ensure_csv_payload(&text)?;
        return Ok(parse_report(&text)?);
    }
    let url = resolve_url(url)?;
    Ok(fetch_report(&url)?)
}

/// Explicit URL if given, else the saved one.
fn resolve_url(url: Option<&str>) -> Result<String> {
    match url {
        Some(u) => Ok(u.to_string()),
        None => load_saved_url()
            .context("No URL given and none saved; run `qc-csv fetch --url <link>` first"),
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render_kpis(headline: &KpiSummary) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{:=^72}", " QC RESULTS ")?;
    writeln!(
        out,
        "Total audited: {}    Pass rate: {:.1}%",
        headline.total, headline.pass_rate
    )?;
    writeln!(
        out,
        "Needs improvement: {}    Fatal errors: {}",
        headline.needs_improvement, headline.fatal
    )?;
    let tiers: Vec<String> = headline
        .by_outcome
        .iter()
        .map(|c| format!("{}={}", c.outcome, c.count))
        .collect();
    writeln!(out, "By outcome: {}", tiers.join("  "))?;
    Ok(out)
}

fn render_matrix(summaries: &[AgentSummary]) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "\n{:=^72}", " AGENT MATRIX ")?;

    let mut header = format!("{:<24}", "Interviewer");
    for outcome in Outcome::DISPLAY_ORDER {
        header.push_str(&format!(" {:>12}", outcome.label()));
    }
    header.push_str(&format!(" {:>8}", "Total"));
    writeln!(out, "{}", header)?;
    writeln!(out, "{:-<72}", "")?;

    for summary in summaries {
        let mut line = format!("{:<24}", summary.agent);
        for outcome in Outcome::DISPLAY_ORDER {
            let count = summary.count(outcome);
            if count > 0 {
                line.push_str(&format!(" {:>12}", count));
            } else {
                line.push_str(&format!(" {:>12}", "-"));
            }
        }
        line.push_str(&format!(" {:>8}", summary.total));
        writeln!(out, "{}", line)?;
    }

    if summaries.is_empty() {
        writeln!(out, "(no records for current filters)")?;
    }
    Ok(out)
}

// ============================================================================
// Config persistence
// ============================================================================

/// Get the config file path: ~/.qc-toolkit.conf
fn config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".qc-toolkit.conf"))
}

/// Load the saved sheet URL, if any.
fn load_saved_url() -> Option<String> {
    read_saved_url(&config_path()?)
}

fn read_saved_url(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    for line in content.lines() {
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "sheet_url" && !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

/// Save the sheet URL after a successful fetch.
fn save_sheet_url(url: &str) {
    if let Some(path) = config_path() {
        write_saved_url(&path, url);
    }
}

fn write_saved_url(path: &Path, url: &str) {
    let _ = fs::write(path, format!("sheet_url={}\n", url));
}

/// Remove the saved URL so the next run requires an explicit link.
fn forget_sheet_url() {
    if let Some(path) = config_path() {
        let _ = fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_url_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".qc-toolkit.conf");

        assert_eq!(read_saved_url(&path), None);

        write_saved_url(&path, "https://example.com/pub?output=csv");
        assert_eq!(
            read_saved_url(&path).as_deref(),
            Some("https://example.com/pub?output=csv")
        );

        fs::remove_file(&path).unwrap();
        assert_eq!(read_saved_url(&path), None);
    }

    #[test]
    fn filter_args_parse_outcome_tokens() {
        let args = FilterArgs {
            result: Some("pass".to_string()),
            ..Default::default()
        };
        let state = args.to_state().unwrap();
        assert_eq!(state.result, Some(Outcome::MeetsStandard));

        let bad = FilterArgs {
            result: Some("great".to_string()),
            ..Default::default()
        };
        assert!(bad.to_state().is_err());
    }
}
