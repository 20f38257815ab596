//! Record selection for presentation frontends.
//!
//! The core owns no UI state: a frontend builds a [`FilterState`] from its
//! controls and passes it into selection. Search is case-insensitive
//! containment over agent names and comments; every other filter is an
//! exact match against the stored field text.

use crate::normalize::{CaseRecord, Outcome, PLACEHOLDER};

/// Active filter predicates. `None` means "All".
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub search: Option<String>,
    pub result: Option<Outcome>,
    pub case_type: Option<String>,
    pub supervisor: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
    /// Drill-down to one (agent, outcome) matrix cell; applied only by
    /// [`FilterState::select_details`], on top of the main predicates.
    pub drill: Option<(String, Outcome)>,
}

impl FilterState {
    fn matches(&self, rec: &CaseRecord) -> bool {
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let in_agent = rec.agent.to_lowercase().contains(&term);
            let in_comment = rec
                .comment
                .as_deref()
                .unwrap_or("")
                .to_lowercase()
                .contains(&term);
            if !in_agent && !in_comment {
                return false;
            }
        }
        if let Some(result) = self.result {
            if rec.result != result {
                return false;
            }
        }
        if let Some(case_type) = &self.case_type {
            if &rec.case_type != case_type {
                return false;
            }
        }
        if let Some(supervisor) = &self.supervisor {
            if &rec.supervisor != supervisor {
                return false;
            }
        }
        if let Some(year) = &self.year {
            if &rec.year != year {
                return false;
            }
        }
        if let Some(month) = &self.month {
            if &rec.month != month {
                return false;
            }
        }
        true
    }

    /// Records passing the main predicates, in source order.
    pub fn select<'a>(&self, records: &'a [CaseRecord]) -> Vec<&'a CaseRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Like [`FilterState::select`], with the drill-down cell applied on
    /// top. This feeds the detail list; aggregates stay on `select`.
    pub fn select_details<'a>(&self, records: &'a [CaseRecord]) -> Vec<&'a CaseRecord> {
        let selected = self.select(records);
        match &self.drill {
            Some((agent, outcome)) => selected
                .into_iter()
                .filter(|r| &r.agent == agent && r.result == *outcome)
                .collect(),
            None => selected,
        }
    }
}

/// Distinct months present in the data, in source order, placeholder and
/// empties excluded. Feeds the month dropdown.
pub fn months(records: &[CaseRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for rec in records {
        if rec.month.is_empty() || rec.month == PLACEHOLDER {
            continue;
        }
        if !seen.contains(&rec.month) {
            seen.push(rec.month.clone());
        }
    }
    seen
}

/// Distinct supervisors, sorted. Feeds the supervisor dropdown.
pub fn supervisors(records: &[CaseRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for rec in records {
        if rec.supervisor.is_empty() || rec.supervisor == PLACEHOLDER {
            continue;
        }
        if !seen.contains(&rec.supervisor) {
            seen.push(rec.supervisor.clone());
        }
    }
    seen.sort();
    seen
}
