use crate::core::coerce::{coerce_cell, count_unconvertible};
use crate::core::date_index::reconstruct_index;
use crate::core::row_filter::{filter_rows, RowSelection};
use crate::core::{Frequency, NumericCell, RawTable, Result, Series, SeriesOutcome};
use crate::domain::model::SeriesColumn;
use crate::utils::error::ScrapeError;
use chrono::NaiveDate;

/// Resolves the requested codes to column positions. An empty request means
/// every column after the label column.
fn resolve_columns(table: &RawTable, requested_codes: &[String]) -> Result<Vec<(String, usize)>> {
    if requested_codes.is_empty() {
        return Ok(table
            .columns()
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, name)| (name.clone(), i))
            .collect());
    }

    requested_codes
        .iter()
        .map(|code| {
            let idx = table
                .columns()
                .iter()
                .position(|c| c.trim().eq_ignore_ascii_case(code.trim()))
                .ok_or_else(|| ScrapeError::MissingColumn {
                    column: code.clone(),
                })?;
            Ok((table.columns()[idx].clone(), idx))
        })
        .collect()
}

fn coerce_columns(table: &RawTable, columns: &[(String, usize)]) -> Vec<SeriesColumn> {
    columns
        .iter()
        .map(|(code, idx)| {
            let values: Vec<NumericCell> = table
                .rows()
                .iter()
                .map(|row| {
                    row.get(*idx)
                        .map(coerce_cell)
                        .unwrap_or(NumericCell::Numeric(f64::NAN))
                })
                .collect();
            let bad = count_unconvertible(&values);
            if bad > 0 {
                tracing::warn!("⚠️ {} cells in column {} could not be converted", bad, code);
            }
            SeriesColumn {
                code: code.clone(),
                values,
            }
        })
        .collect()
}

/// 建立指定頻率的時間序列
///
/// Filters the table to `frequency`, rebuilds the date index from the row
/// labels and coerces every requested column. Returns
/// [`SeriesOutcome::NoData`] when no row matches the frequency.
pub fn build_series(
    raw: &RawTable,
    frequency: Frequency,
    requested_codes: &[String],
) -> Result<SeriesOutcome> {
    let columns = resolve_columns(raw, requested_codes)?;

    let filtered = match filter_rows(raw, frequency) {
        RowSelection::Matched(table) => table,
        RowSelection::NoData => {
            tracing::warn!("That frequency is unavailable for your series.");
            return Ok(SeriesOutcome::NoData(frequency));
        }
    };

    let labels: Vec<String> = filtered.labels().into_iter().flatten().collect();
    let index = reconstruct_index(&labels, frequency)?;
    let columns = coerce_columns(&filtered, &columns);

    tracing::debug!(
        "Built {} series with {} periods and {} columns",
        frequency,
        index.len(),
        columns.len()
    );
    Ok(SeriesOutcome::Series(Series::new(index, columns)))
}

/// Builds a series from a table whose first column already holds calendar
/// dates. Rows with an empty date are skipped; any other unparseable date
/// is a `MalformedDate` error.
pub fn build_dated_series(
    raw: &RawTable,
    date_formats: &[&str],
    requested_codes: &[String],
) -> Result<Series> {
    let columns = resolve_columns(raw, requested_codes)?;

    let mut index = Vec::with_capacity(raw.len());
    let mut rows = Vec::with_capacity(raw.len());
    for (row, label) in raw.rows().iter().zip(raw.labels()) {
        let Some(label) = label else {
            continue;
        };
        let date = date_formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&label, fmt).ok())
            .ok_or_else(|| ScrapeError::MalformedDate {
                label: label.clone(),
            })?;
        index.push(date);
        rows.push(row.clone());
    }

    let table = RawTable::new(raw.columns().to_vec(), rows);
    Ok(Series::new(index, coerce_columns(&table, &columns)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Cell;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn ons_table() -> RawTable {
        RawTable::new(
            vec!["".to_string(), "YBHA".to_string(), "ABMI".to_string()],
            vec![
                vec![text("Title"), text("Gross Domestic Product"), text("GDP CVM")],
                vec![text("CDID"), text("YBHA"), text("ABMI")],
                vec![text("2002"), text("1,100,000"), text("1,300,000")],
                vec![text("2003"), text("1,150,000"), text("1,340,000")],
                vec![text("2002 Q2"), text("275,000"), text("325,000")],
                vec![text("2002 Q3"), text("276,500"), text("x")],
                vec![text("2002 Q4"), text("280,100"), text("330,000")],
                vec![text("2003 Q1"), text("281,000"), text("331,000")],
            ],
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_quarterly_series() {
        let outcome =
            build_series(&ons_table(), Frequency::Quarterly, &["YBHA".to_string()]).unwrap();
        let SeriesOutcome::Series(series) = outcome else {
            panic!("expected series");
        };
        assert_eq!(series.len(), 4);
        assert_eq!(series.index()[0], date(2002, 6, 30));
        assert_eq!(series.index()[3], date(2003, 3, 31));
        assert_eq!(series.columns().len(), 1);
        assert_eq!(
            series.value("YBHA", date(2002, 9, 30)),
            Some(&NumericCell::Numeric(276_500.0))
        );
    }

    #[test]
    fn test_all_columns_when_no_codes_requested() {
        let SeriesOutcome::Series(series) =
            build_series(&ons_table(), Frequency::Annual, &[]).unwrap()
        else {
            panic!("expected series");
        };
        assert_eq!(series.columns().len(), 2);
        assert_eq!(series.index(), &[date(2002, 12, 31), date(2003, 12, 31)]);
        assert_eq!(
            series.column("ABMI").unwrap().values[1],
            NumericCell::Numeric(1_340_000.0)
        );
    }

    #[test]
    fn test_bad_cell_does_not_abort() {
        let SeriesOutcome::Series(series) =
            build_series(&ons_table(), Frequency::Quarterly, &["abmi".to_string()]).unwrap()
        else {
            panic!("expected series");
        };
        let values = &series.column("ABMI").unwrap().values;
        assert!(matches!(values[1], NumericCell::Unconvertible { .. }));
        assert_eq!(values[2], NumericCell::Numeric(330_000.0));
    }

    #[test]
    fn test_no_data_for_missing_frequency() {
        let outcome = build_series(&ons_table(), Frequency::Monthly, &[]).unwrap();
        assert_eq!(outcome, SeriesOutcome::NoData(Frequency::Monthly));
    }

    #[test]
    fn test_missing_column() {
        let result = build_series(&ons_table(), Frequency::Annual, &["ZZZZ".to_string()]);
        assert!(matches!(result, Err(ScrapeError::MissingColumn { .. })));
    }

    #[test]
    fn test_dated_series() {
        let raw = RawTable::new(
            vec!["DATE".to_string(), "LPMAUZI".to_string()],
            vec![
                vec![text("01 Aug 2007"), text("1,234.5")],
                vec![text("02 Aug 2007"), Cell::Number(1240.0)],
                vec![Cell::Empty, Cell::Empty],
            ],
        );
        let series = build_dated_series(&raw, &["%d %b %Y"], &[]).unwrap();
        assert_eq!(series.index(), &[date(2007, 8, 1), date(2007, 8, 2)]);
        assert_eq!(
            series.column("LPMAUZI").unwrap().values,
            vec![NumericCell::Numeric(1234.5), NumericCell::Numeric(1240.0)]
        );
    }
}
