use crate::core::row_filter::matches_frequency;
use crate::core::{Frequency, Result};
use crate::utils::error::ScrapeError;
use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

fn malformed(label: &str, frequency: Frequency) -> ScrapeError {
    ScrapeError::MalformedPeriodLabel {
        label: label.to_string(),
        frequency,
    }
}

/// Last calendar day of the given month.
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn parse_year(text: &str) -> Option<i32> {
    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

/// `"2013"` → 2013-12-31
pub fn parse_annual(label: &str) -> Result<NaiveDate> {
    let label = label.trim();
    parse_year(label)
        .and_then(|year| NaiveDate::from_ymd_opt(year, 12, 31))
        .ok_or_else(|| malformed(label, Frequency::Annual))
}

/// `"2002 JAN"` → 2002-01-31
pub fn parse_monthly(label: &str) -> Result<NaiveDate> {
    let label = label.trim();
    let (year, month) = label
        .split_once(' ')
        .ok_or_else(|| malformed(label, Frequency::Monthly))?;
    let year = parse_year(year).ok_or_else(|| malformed(label, Frequency::Monthly))?;
    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(month))
        .ok_or_else(|| malformed(label, Frequency::Monthly))?;
    month_end(year, month as u32 + 1).ok_or_else(|| malformed(label, Frequency::Monthly))
}

/// `"2002 Q2"` → (2002, 2)
pub fn parse_quarter(label: &str) -> Result<(i32, u32)> {
    let label = label.trim();
    if !matches_frequency(label, Frequency::Quarterly) {
        return Err(malformed(label, Frequency::Quarterly));
    }
    let (year, quarter) = label
        .split_once(" Q")
        .ok_or_else(|| malformed(label, Frequency::Quarterly))?;
    let year = parse_year(year).ok_or_else(|| malformed(label, Frequency::Quarterly))?;
    let quarter = quarter
        .parse::<u32>()
        .map_err(|_| malformed(label, Frequency::Quarterly))?;
    Ok((year, quarter))
}

/// `periods` consecutive quarter-end dates, the first ending in `start_month`
/// of `start_year`.
pub fn quarter_ends(start_year: i32, start_month: u32, periods: usize) -> Vec<NaiveDate> {
    let first = (start_year * 12) + start_month as i32 - 1;
    (0..periods)
        .filter_map(|i| {
            let months = first + 3 * i as i32;
            month_end(months.div_euclid(12), months.rem_euclid(12) as u32 + 1)
        })
        .collect()
}

/// 由期間標籤重建日期索引
///
/// Annual and monthly labels are parsed one by one. For quarterly data only
/// the first label is parsed; the rest of the index is generated as
/// consecutive quarter ends. A later label that disagrees with its generated
/// quarter is logged but does not change the result.
pub fn reconstruct_index(labels: &[String], frequency: Frequency) -> Result<Vec<NaiveDate>> {
    match frequency {
        Frequency::Annual => labels.iter().map(|l| parse_annual(l)).collect(),
        Frequency::Monthly => labels.iter().map(|l| parse_monthly(l)).collect(),
        Frequency::Quarterly => {
            let Some(first) = labels.first() else {
                return Ok(Vec::new());
            };
            let (year, quarter) = parse_quarter(first)?;
            let index = quarter_ends(year, 3 * quarter, labels.len());
            warn_on_quarter_gap(labels, &index);
            Ok(index)
        }
    }
}

fn warn_on_quarter_gap(labels: &[String], index: &[NaiveDate]) {
    let mismatch = labels.iter().zip(index).find(|(label, date)| {
        parse_quarter(label)
            .map(|(year, quarter)| year != date.year() || 3 * quarter != date.month())
            .unwrap_or(true)
    });
    if let Some((label, date)) = mismatch {
        tracing::warn!(
            "⚠️ Quarterly labels are not contiguous: '{}' was assigned {}",
            label,
            date
        );
    }
}
