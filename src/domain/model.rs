use crate::utils::error::{Result, ScrapeError};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// 原始表格中的單一儲存格
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Text(_) => "str",
            Cell::Number(_) => "float",
            Cell::Bool(_) => "bool",
            Cell::Empty => "empty",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Renders the cell as a row label or key. Empty cells have no label.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            // f64 Display already omits the fraction of whole numbers
            Cell::Number(n) => Some(n.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Empty => None,
        }
    }
}

/// 下載後尚未正規化的表格。第一欄為列標籤。
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Builds a table whose rows all share the header's column set; short rows
    /// are padded with `Cell::Empty` and long rows truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ScrapeError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Row labels taken from the first column.
    pub fn labels(&self) -> Vec<Option<String>> {
        self.rows
            .iter()
            .map(|row| row.first().and_then(Cell::as_label))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Frequency {
    Annual,
    Quarterly,
    Monthly,
}

impl Frequency {
    pub fn code(&self) -> char {
        match self {
            Frequency::Annual => 'A',
            Frequency::Quarterly => 'Q',
            Frequency::Monthly => 'M',
        }
    }
}

impl FromStr for Frequency {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Frequency::Annual),
            "Q" => Ok(Frequency::Quarterly),
            "M" => Ok(Frequency::Monthly),
            _ => Err(ScrapeError::UnknownFrequency {
                code: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Annual => "annual",
            Frequency::Quarterly => "quarterly",
            Frequency::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

/// Result of numeric coercion for a single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericCell {
    Numeric(f64),
    Unconvertible {
        type_name: &'static str,
        original: String,
    },
}

impl NumericCell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericCell::Numeric(v) => Some(*v),
            NumericCell::Unconvertible { .. } => None,
        }
    }
}

impl Serialize for NumericCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            NumericCell::Numeric(v) if v.is_finite() => serializer.serialize_f64(*v),
            _ => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesColumn {
    pub code: String,
    pub values: Vec<NumericCell>,
}

/// 以日期為索引的時間序列，每個序列代碼一欄
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    index: Vec<NaiveDate>,
    columns: Vec<SeriesColumn>,
}

impl Series {
    pub(crate) fn new(index: Vec<NaiveDate>, columns: Vec<SeriesColumn>) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == index.len()));
        Self { index, columns }
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn columns(&self) -> &[SeriesColumn] {
        &self.columns
    }

    pub fn column(&self, code: &str) -> Option<&SeriesColumn> {
        self.columns.iter().find(|c| c.code == code)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn value(&self, code: &str, date: NaiveDate) -> Option<&NumericCell> {
        let row = self.index.iter().position(|d| *d == date)?;
        self.column(code)?.values.get(row)
    }
}

/// `NoData` is a normal outcome: nothing matched the requested frequency.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesOutcome {
    Series(Series),
    NoData(Frequency),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PanelKey {
    pub variable: String,
    pub entity: String,
    pub period: i32,
}

impl PanelKey {
    pub fn new(variable: impl Into<String>, entity: impl Into<String>, period: i32) -> Self {
        Self {
            variable: variable.into(),
            entity: entity.into(),
            period,
        }
    }
}

/// 三軸面板資料：變數 × 實體 × 年份
#[derive(Debug, Clone, PartialEq)]
pub struct Panel<T = NumericCell> {
    variables: BTreeSet<String>,
    entities: BTreeSet<String>,
    periods: BTreeSet<i32>,
    values: BTreeMap<PanelKey, T>,
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Self {
            variables: BTreeSet::new(),
            entities: BTreeSet::new(),
            periods: BTreeSet::new(),
            values: BTreeMap::new(),
        }
    }
}

impl<T> Panel<T> {
    pub(crate) fn from_parts(
        variables: BTreeSet<String>,
        entities: BTreeSet<String>,
        periods: BTreeSet<i32>,
        values: BTreeMap<PanelKey, T>,
    ) -> Self {
        Self {
            variables,
            entities,
            periods,
            values,
        }
    }

    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    pub fn entities(&self) -> &BTreeSet<String> {
        &self.entities
    }

    pub fn periods(&self) -> &BTreeSet<i32> {
        &self.periods
    }

    pub fn get(&self, variable: &str, entity: &str, period: i32) -> Option<&T> {
        self.values.get(&PanelKey::new(variable, entity, period))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PanelKey, &T)> {
        self.values.iter()
    }

    /// Values for one (variable, entity) pair, ordered by period.
    pub fn entity_series<'a>(
        &'a self,
        variable: &'a str,
        entity: &'a str,
    ) -> impl Iterator<Item = (i32, &'a T)> + 'a {
        self.values
            .iter()
            .filter(move |(k, _)| k.variable == variable && k.entity == entity)
            .map(|(k, v)| (k.period, v))
    }

    pub fn map<U>(self, mut f: impl FnMut(&PanelKey, T) -> U) -> Panel<U> {
        let values = self
            .values
            .into_iter()
            .map(|(k, v)| {
                let mapped = f(&k, v);
                (k, mapped)
            })
            .collect();
        Panel {
            variables: self.variables,
            entities: self.entities,
            periods: self.periods,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Spreadsheet { sheet: String },
}

/// 各資料來源管線的最終產出
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutput {
    Series(Series),
    Panel(Panel),
    NoData(Frequency),
}

impl From<SeriesOutcome> for ScrapeOutput {
    fn from(outcome: SeriesOutcome) -> Self {
        match outcome {
            SeriesOutcome::Series(series) => ScrapeOutput::Series(series),
            SeriesOutcome::NoData(freq) => ScrapeOutput::NoData(freq),
        }
    }
}
