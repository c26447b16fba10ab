use crate::config::OutputFormat;
use crate::core::{NumericCell, Panel, ScrapeOutput, Series};
use crate::utils::error::{Result, ScrapeError};
use serde::Serialize;

#[derive(Serialize)]
struct PanelRecord<'a> {
    variable: &'a str,
    entity: &'a str,
    year: i32,
    value: &'a NumericCell,
}

fn csv_value(cell: &NumericCell) -> String {
    match cell {
        NumericCell::Numeric(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| ScrapeError::IoError(e.into_error()))
}

fn series_to_csv(series: &Series) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["date".to_string()];
    header.extend(series.columns().iter().map(|c| c.code.clone()));
    writer.write_record(&header)?;

    for (row, date) in series.index().iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        record.extend(series.columns().iter().map(|c| csv_value(&c.values[row])));
        writer.write_record(&record)?;
    }
    finish(writer)
}

fn panel_to_csv(panel: &Panel) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["variable", "entity", "year", "value"])?;
    for (key, value) in panel.iter() {
        let year = key.period.to_string();
        let value = csv_value(value);
        writer.write_record([
            key.variable.as_str(),
            key.entity.as_str(),
            year.as_str(),
            value.as_str(),
        ])?;
    }
    finish(writer)
}

fn panel_to_json(panel: &Panel) -> Result<Vec<u8>> {
    let records: Vec<PanelRecord<'_>> = panel
        .iter()
        .map(|(key, value)| PanelRecord {
            variable: &key.variable,
            entity: &key.entity,
            year: key.period,
            value,
        })
        .collect();
    Ok(serde_json::to_vec_pretty(&records)?)
}

/// 將結果序列化為輸出格式。`NoData` 不產生內容。
pub fn render(output: &ScrapeOutput, format: OutputFormat) -> Result<Vec<u8>> {
    match (output, format) {
        (ScrapeOutput::Series(series), OutputFormat::Csv) => series_to_csv(series),
        (ScrapeOutput::Series(series), OutputFormat::Json) => {
            Ok(serde_json::to_vec_pretty(series)?)
        }
        (ScrapeOutput::Panel(panel), OutputFormat::Csv) => panel_to_csv(panel),
        (ScrapeOutput::Panel(panel), OutputFormat::Json) => panel_to_json(panel),
        (ScrapeOutput::NoData(_), _) => Ok(Vec::new()),
    }
}
