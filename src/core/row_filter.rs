use crate::core::{Frequency, RawTable};
use regex::Regex;
use std::sync::LazyLock;

static ANNUAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("annual pattern is valid"));
static QUARTERLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4} Q[1-4]$").expect("quarterly pattern is valid"));
static MONTHLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4} [A-Z]{3}$").expect("monthly pattern is valid"));

/// Outcome of filtering a table to one frequency.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSelection {
    Matched(RawTable),
    /// No row label matched; not an error, but there is nothing to build.
    NoData,
}

pub fn label_pattern(frequency: Frequency) -> &'static Regex {
    match frequency {
        Frequency::Annual => &ANNUAL,
        Frequency::Quarterly => &QUARTERLY,
        Frequency::Monthly => &MONTHLY,
    }
}

pub fn matches_frequency(label: &str, frequency: Frequency) -> bool {
    label_pattern(frequency).is_match(label.trim())
}

/// 只保留列標籤符合頻率格式的列，維持原始順序
pub fn filter_rows(table: &RawTable, frequency: Frequency) -> RowSelection {
    let rows: Vec<_> = table
        .rows()
        .iter()
        .zip(table.labels())
        .filter(|(_, label)| {
            label
                .as_deref()
                .is_some_and(|l| matches_frequency(l, frequency))
        })
        .map(|(row, _)| row.clone())
        .collect();

    tracing::debug!(
        "Row filter kept {} of {} rows for {} frequency",
        rows.len(),
        table.len(),
        frequency
    );

    if rows.is_empty() {
        RowSelection::NoData
    } else {
        RowSelection::Matched(RawTable::new(table.columns().to_vec(), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Cell;

    fn table(labels: &[&str]) -> RawTable {
        RawTable::new(
            vec!["".to_string(), "ABMI".to_string()],
            labels
                .iter()
                .enumerate()
                .map(|(i, l)| vec![Cell::Text(l.to_string()), Cell::Number(i as f64)])
                .collect(),
        )
    }

    #[test]
    fn test_patterns() {
        assert!(matches_frequency("2013", Frequency::Annual));
        assert!(!matches_frequency("2013 Q1", Frequency::Annual));
        assert!(matches_frequency("2002 Q2", Frequency::Quarterly));
        assert!(!matches_frequency("2002 Q5", Frequency::Quarterly));
        assert!(matches_frequency("2002 JAN", Frequency::Monthly));
        assert!(!matches_frequency("2002 Q1", Frequency::Monthly));
        assert!(!matches_frequency("Title 2013", Frequency::Annual));
    }

    #[test]
    fn test_filter_keeps_order() {
        let raw = table(&["Title", "2001", "2001 Q1", "2002", "2001 JAN", "2003"]);
        let RowSelection::Matched(filtered) = filter_rows(&raw, Frequency::Annual) else {
            panic!("expected rows");
        };
        let labels: Vec<_> = filtered.labels().into_iter().flatten().collect();
        assert_eq!(labels, vec!["2001", "2002", "2003"]);
        assert_eq!(filtered.columns(), raw.columns());
    }

    #[test]
    fn test_annual_on_quarterly_only_is_no_data() {
        let raw = table(&["2002 Q2", "2002 Q3", "2002 Q4"]);
        assert_eq!(filter_rows(&raw, Frequency::Annual), RowSelection::NoData);
    }

    #[test]
    fn test_empty_labels_are_skipped() {
        let raw = RawTable::new(
            vec!["".to_string(), "X".to_string()],
            vec![
                vec![Cell::Empty, Cell::Number(1.0)],
                vec![Cell::Text("2002 FEB".to_string()), Cell::Number(2.0)],
            ],
        );
        let RowSelection::Matched(filtered) = filter_rows(&raw, Frequency::Monthly) else {
            panic!("expected rows");
        };
        assert_eq!(filtered.len(), 1);
    }
}
