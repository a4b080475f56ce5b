use serde::{Deserialize, Serialize};

/// Canonical month column labels, in calendar order. The position of a label
/// (plus one) is its month number, so this table doubles as the
/// name-to-number bijection.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Month number (1-12) for a canonical month label, `None` for anything else.
pub fn month_number(name: &str) -> Option<u32> {
    MONTHS.iter().position(|m| *m == name).map(|i| i as u32 + 1)
}

/// One discovered input file: its filename and raw bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// A parsed wide table: one header row plus data rows. Every data row has
/// exactly `headers.len()` cells; missing cells are empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of the column with the given header name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// One normalized output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LongRecord {
    pub year: i32,
    pub month: u32,
    pub crop: String,
    pub price: f64,
}

/// Result of the transform phase: the merged, sorted dataset plus counters
/// for the run summary.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<LongRecord>,
    pub sources_processed: usize,
    pub sources_skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_number_bijection() {
        for (i, name) in MONTHS.iter().enumerate() {
            assert_eq!(month_number(name), Some(i as u32 + 1));
        }
        assert_eq!(month_number("January"), None);
        assert_eq!(month_number("jan"), None);
        assert_eq!(month_number(""), None);
    }

    #[test]
    fn test_column_index() {
        let table = RawTable {
            headers: vec!["Crop".to_string(), "Jan".to_string()],
            rows: vec![],
        };
        assert_eq!(table.column_index("Jan"), Some(1));
        assert_eq!(table.column_index("Feb"), None);
    }
}
