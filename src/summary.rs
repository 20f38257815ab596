//! Per-agent aggregation and headline KPIs.
//!
//! Summaries are derived views over an already-filtered record set and are
//! recomputed from scratch whenever the selection changes; nothing here is
//! persisted or updated incrementally.

use serde::Serialize;
use std::collections::HashMap;

use crate::normalize::{CaseRecord, Outcome};

/// Outcome counts for one agent within the current selection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentSummary {
    pub agent: String,
    pub excellent: u64,
    pub meets_standard: u64,
    pub needs_improvement: u64,
    pub error_found: u64,
    pub fails_standard: u64,
    /// All records for this agent, unrecognized outcomes included.
    pub total: u64,
}

impl AgentSummary {
    fn new(agent: &str) -> Self {
        AgentSummary {
            agent: agent.to_string(),
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Excellent => self.excellent += 1,
            Outcome::MeetsStandard => self.meets_standard += 1,
            Outcome::NeedsImprovement => self.needs_improvement += 1,
            Outcome::ErrorFound => self.error_found += 1,
            Outcome::FailsStandard => self.fails_standard += 1,
            Outcome::Unrecognized => {}
        }
        self.total += 1;
    }

    /// Count for one matrix column. `Unrecognized` has no column.
    pub fn count(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Excellent => self.excellent,
            Outcome::MeetsStandard => self.meets_standard,
            Outcome::NeedsImprovement => self.needs_improvement,
            Outcome::ErrorFound => self.error_found,
            Outcome::FailsStandard => self.fails_standard,
            Outcome::Unrecognized => 0,
        }
    }
}

/// Group records by agent and count outcomes per tier.
///
/// Agents with no records in the selection do not appear. Sorted descending
/// by total; agents with equal totals keep whatever order grouping
/// produced.
pub fn summarize(records: &[&CaseRecord]) -> Vec<AgentSummary> {
    let mut by_agent: HashMap<&str, AgentSummary> = HashMap::new();
    for rec in records {
        by_agent
            .entry(rec.agent.as_str())
            .or_insert_with(|| AgentSummary::new(&rec.agent))
            .record(rec.result);
    }

    let mut summaries: Vec<AgentSummary> = by_agent.into_values().collect();
    summaries.sort_by(|a, b| b.total.cmp(&a.total));
    summaries
}

/// Share of passing outcomes in the selection, as a percentage rounded to
/// one decimal place. An empty selection reports 0.0 rather than dividing
/// by zero.
pub fn pass_rate(records: &[&CaseRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let passed = records.iter().filter(|r| r.result.is_passing()).count();
    let rate = passed as f64 / records.len() as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

/// Count of one outcome within the selection.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeCount {
    pub outcome: Outcome,
    pub count: u64,
}

/// Headline numbers for the current selection.
#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub total: u64,
    pub pass_rate: f64,
    pub needs_improvement: u64,
    /// Error-found plus fails-standard records.
    pub fatal: u64,
    /// Per-tier counts in display order.
    pub by_outcome: Vec<OutcomeCount>,
}

pub fn kpis(records: &[&CaseRecord]) -> KpiSummary {
    let count_of =
        |outcome: Outcome| records.iter().filter(|r| r.result == outcome).count() as u64;

    KpiSummary {
        total: records.len() as u64,
        pass_rate: pass_rate(records),
        needs_improvement: count_of(Outcome::NeedsImprovement),
        fatal: count_of(Outcome::ErrorFound) + count_of(Outcome::FailsStandard),
        by_outcome: Outcome::DISPLAY_ORDER
            .into_iter()
            .map(|outcome| OutcomeCount {
                outcome,
                count: count_of(outcome),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: usize, agent: &str, result: Outcome) -> CaseRecord {
        CaseRecord {
            id,
            year: "2026".to_string(),
            month: "ม.ค.".to_string(),
            date: "5/1/2026".to_string(),
            touchpoint: "W1".to_string(),
            case_type: "AC".to_string(),
            supervisor: "Sup".to_string(),
            agent: agent.to_string(),
            audio: None,
            result,
            comment: None,
        }
    }

    fn refs(records: &[CaseRecord]) -> Vec<&CaseRecord> {
        records.iter().collect()
    }

    #[test]
    fn counts_group_by_agent() {
        let records = vec![
            rec(0, "Alice", Outcome::Excellent),
            rec(1, "Alice", Outcome::ErrorFound),
            rec(2, "Bob", Outcome::MeetsStandard),
        ];
        let summaries = summarize(&refs(&records));
        assert_eq!(summaries.len(), 2);

        let alice = summaries.iter().find(|s| s.agent == "Alice").unwrap();
        assert_eq!(alice.excellent, 1);
        assert_eq!(alice.error_found, 1);
        assert_eq!(alice.total, 2);
    }

    #[test]
    fn unrecognized_counts_toward_total_only() {
        let records = vec![rec(0, "Alice", Outcome::Unrecognized)];
        let summaries = summarize(&refs(&records));
        assert_eq!(summaries[0].total, 1);
        for outcome in Outcome::DISPLAY_ORDER {
            assert_eq!(summaries[0].count(outcome), 0);
        }
    }

    #[test]
    fn summaries_sorted_by_total_descending() {
        let records = vec![
            rec(0, "Low", Outcome::Excellent),
            rec(1, "High", Outcome::Excellent),
            rec(2, "High", Outcome::MeetsStandard),
            rec(3, "High", Outcome::ErrorFound),
            rec(4, "Mid", Outcome::Excellent),
            rec(5, "Mid", Outcome::Excellent),
        ];
        let summaries = summarize(&refs(&records));
        let names: Vec<&str> = summaries.iter().map(|s| s.agent.as_str()).collect();
        assert_eq!(names, vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn pass_rate_counts_both_passing_tiers() {
        let records = vec![
            rec(0, "A", Outcome::Excellent),
            rec(1, "B", Outcome::MeetsStandard),
            rec(2, "C", Outcome::ErrorFound),
            rec(3, "D", Outcome::NeedsImprovement),
        ];
        assert_eq!(pass_rate(&refs(&records)), 50.0);
    }

    #[test]
    fn pass_rate_rounds_to_one_decimal() {
        let records = vec![
            rec(0, "A", Outcome::Excellent),
            rec(1, "B", Outcome::ErrorFound),
            rec(2, "C", Outcome::ErrorFound),
        ];
        // 1/3 = 33.333…% rounds to 33.3
        assert_eq!(pass_rate(&refs(&records)), 33.3);
    }

    #[test]
    fn empty_selection_has_zero_pass_rate() {
        let rate = pass_rate(&[]);
        assert_eq!(rate, 0.0);
        assert_eq!(format!("{:.1}", rate), "0.0");
    }

    #[test]
    fn kpis_fold_fatal_tiers_together() {
        let records = vec![
            rec(0, "A", Outcome::Excellent),
            rec(1, "B", Outcome::NeedsImprovement),
            rec(2, "C", Outcome::ErrorFound),
            rec(3, "D", Outcome::Unrecognized),
        ];
        let k = kpis(&refs(&records));
        assert_eq!(k.total, 4);
        assert_eq!(k.needs_improvement, 1);
        assert_eq!(k.fatal, 1);
        assert_eq!(k.by_outcome.len(), 5);
        assert_eq!(k.by_outcome[0].outcome, Outcome::Excellent);
        assert_eq!(k.by_outcome[0].count, 1);
    }
}
