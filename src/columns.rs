//! Header detection and column resolution.
//!
//! QC sheets often carry title/banner rows above the real header, and the
//! header text mixes English and Thai with extra annotations (units, second
//! languages). So instead of assuming row 0 and exact names, a keyword probe
//! finds the header row and each logical field is matched by
//! case-insensitive substring containment, first match wins.

/// Substrings that identify the header row. A row qualifies as the header
/// when any of its cells' lowercased text contains one of these.
pub const HEADER_SIGNALS: [&str; 3] = ["interviewer", "สรุปผล", "วันที่สัมภาษณ์"];

/// Logical columns of a QC sheet.
///
/// `Agent` and `Result` are required; everything else falls back to a
/// placeholder per record when the column is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Year,
    Month,
    Date,
    Touchpoint,
    CaseType,
    Supervisor,
    Agent,
    Audio,
    Result,
    Comment,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Year,
        Field::Month,
        Field::Date,
        Field::Touchpoint,
        Field::CaseType,
        Field::Supervisor,
        Field::Agent,
        Field::Audio,
        Field::Result,
        Field::Comment,
    ];

    /// Columns that must resolve for ingestion to proceed.
    pub const REQUIRED: [Field; 2] = [Field::Agent, Field::Result];

    /// Header substring that identifies this column, matched
    /// case-insensitively against each trimmed header cell.
    pub fn needle(self) -> &'static str {
        match self {
            Field::Year => "Year",
            Field::Month => "เดือน",
            Field::Date => "วันที่สัมภาษณ์",
            Field::Touchpoint => "TOUCH_POINT",
            Field::CaseType => "AC / BC",
            Field::Supervisor => "Supervisor",
            Field::Agent => "Interviewer",
            Field::Audio => "ไฟล์เสียง",
            Field::Result => "สรุปผลการสัมภาษณ์",
            Field::Comment => "Comment",
        }
    }
}

/// Find the first row that looks like the header.
pub fn locate_header(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter().position(|row| {
        row.iter().any(|c| {
            let lower = c.to_lowercase();
            HEADER_SIGNALS.iter().any(|signal| lower.contains(signal))
        })
    })
}

/// Resolved column positions for each logical field.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    cols: [Option<usize>; Field::ALL.len()],
}

impl ColumnMap {
    /// Map every logical field onto the header row.
    ///
    /// Header cells are trimmed first; a field resolves to the first cell
    /// whose lowercased text contains the field's lowercased needle.
    pub fn resolve(header: &[String]) -> ColumnMap {
        let trimmed: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        let mut cols = [None; Field::ALL.len()];
        for field in Field::ALL {
            let needle = field.needle().to_lowercase();
            cols[field as usize] = trimmed.iter().position(|h| h.contains(&needle));
        }
        ColumnMap { cols }
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.cols[field as usize]
    }

    /// Required fields that failed to resolve; non-empty means the sheet is
    /// unusable and ingestion must stop before normalization.
    pub fn missing_required(&self) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }
}
