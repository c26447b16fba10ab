use crate::core::coerce::{coerce_cell, count_unconvertible};
use crate::core::{Cell, Panel, PanelKey, RawTable, Result};
use crate::utils::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What to do when the same (entity, variable, period) appears twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    KeepLast,
}

/// 累積面板資料，套用重複鍵策略
struct PanelBuilder {
    policy: DuplicatePolicy,
    variables: BTreeSet<String>,
    entities: BTreeSet<String>,
    periods: BTreeSet<i32>,
    values: BTreeMap<PanelKey, Cell>,
}

impl PanelBuilder {
    fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            variables: BTreeSet::new(),
            entities: BTreeSet::new(),
            periods: BTreeSet::new(),
            values: BTreeMap::new(),
        }
    }

    fn insert(&mut self, key: PanelKey, cell: Cell) -> Result<()> {
        if self.policy == DuplicatePolicy::Reject && self.values.contains_key(&key) {
            return Err(ScrapeError::DuplicateKey {
                entity: key.entity,
                variable: key.variable,
                period: key.period,
            });
        }
        self.variables.insert(key.variable.clone());
        self.entities.insert(key.entity.clone());
        self.periods.insert(key.period);
        self.values.insert(key, cell);
        Ok(())
    }

    fn finish(self) -> Panel<Cell> {
        Panel::from_parts(self.variables, self.entities, self.periods, self.values)
    }
}

fn is_year_column(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

fn parse_period(cell: &Cell) -> Result<i32> {
    let malformed = || ScrapeError::MalformedPeriodLabel {
        label: cell.as_label().unwrap_or_default(),
        frequency: crate::core::Frequency::Annual,
    };
    match cell {
        Cell::Number(n) if n.is_finite() && n.fract() == 0.0 => {
            i32::try_from(*n as i64).map_err(|_| malformed())
        }
        Cell::Text(s) => s.trim().parse().map_err(|_| malformed()),
        _ => Err(malformed()),
    }
}

/// 將 (實體, 類別代碼, 年份欄位) 的寬表轉為面板
///
/// Keeps the entity column, the category column and every purely numeric
/// (year) column. Each (entity, code) row is flattened into one value per
/// year; empty cells are dropped. Rows without an entity or code are
/// skipped.
pub fn reshape_panel(
    raw: &RawTable,
    entity_column: &str,
    category_column: &str,
    policy: DuplicatePolicy,
) -> Result<Panel<Cell>> {
    let entity_idx = raw.require_column(entity_column)?;
    let category_idx = raw.require_column(category_column)?;

    let year_columns: Vec<(usize, i32)> = raw
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| is_year_column(name))
        .filter_map(|(i, name)| name.trim().parse().ok().map(|year| (i, year)))
        .collect();

    tracing::debug!(
        "Reshaping panel from {} rows with {} year columns",
        raw.len(),
        year_columns.len()
    );

    let mut builder = PanelBuilder::new(policy);
    for row in raw.rows() {
        let (Some(entity), Some(code)) = (row[entity_idx].as_label(), row[category_idx].as_label())
        else {
            continue;
        };
        for &(col, year) in &year_columns {
            let cell = &row[col];
            if cell.is_empty() {
                continue;
            }
            builder.insert(PanelKey::new(code.clone(), entity.clone(), year), cell.clone())?;
        }
    }
    Ok(builder.finish())
}

/// Builds a panel from a long table keyed by (entity, period) with one
/// column per variable.
pub fn reshape_long_panel(
    raw: &RawTable,
    entity_column: &str,
    time_column: &str,
    policy: DuplicatePolicy,
) -> Result<Panel<Cell>> {
    let entity_idx = raw.require_column(entity_column)?;
    let time_idx = raw.require_column(time_column)?;

    let variable_columns: Vec<(usize, &String)> = raw
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, name)| *i != entity_idx && *i != time_idx && !name.trim().is_empty())
        .collect();

    let mut builder = PanelBuilder::new(policy);
    for row in raw.rows() {
        let Some(entity) = row[entity_idx].as_label() else {
            continue;
        };
        let period = parse_period(&row[time_idx])?;
        for &(col, variable) in &variable_columns {
            let cell = &row[col];
            if cell.is_empty() {
                continue;
            }
            builder.insert(PanelKey::new(variable.as_str(), entity.clone(), period), cell.clone())?;
        }
    }
    Ok(builder.finish())
}

/// Coerces every cell of a reshaped panel.
pub fn coerce_panel(panel: Panel<Cell>) -> Panel {
    let coerced = panel.map(|_, cell| coerce_cell(&cell));
    let bad = count_unconvertible(coerced.iter().map(|(_, v)| v));
    if bad > 0 {
        tracing::warn!("⚠️ {} panel cells could not be converted", bad);
    }
    coerced
}

pub fn build_panel(
    raw: &RawTable,
    entity_column: &str,
    category_column: &str,
    policy: DuplicatePolicy,
) -> Result<Panel> {
    let panel = reshape_panel(raw, entity_column, category_column, policy)?;
    Ok(coerce_panel(panel))
}

pub fn build_long_panel(
    raw: &RawTable,
    entity_column: &str,
    time_column: &str,
    policy: DuplicatePolicy,
) -> Result<Panel> {
    let panel = reshape_long_panel(raw, entity_column, time_column, policy)?;
    Ok(coerce_panel(panel))
}

/// 依變數代碼及/或實體名稱篩選面板
///
/// `None` leaves an axis untouched. Unknown codes or entities simply select
/// nothing on that axis.
pub fn select_panel<T: Clone>(
    panel: &Panel<T>,
    codes: Option<&[String]>,
    entities: Option<&[String]>,
) -> Panel<T> {
    if codes.is_none() && entities.is_none() {
        return panel.clone();
    }

    let narrow = |axis: &BTreeSet<String>, wanted: Option<&[String]>| -> BTreeSet<String> {
        match wanted {
            Some(wanted) => axis
                .iter()
                .filter(|label| wanted.contains(*label))
                .cloned()
                .collect(),
            None => axis.clone(),
        }
    };
    let variables = narrow(panel.variables(), codes);
    let entities = narrow(panel.entities(), entities);

    let values = panel
        .iter()
        .filter(|(k, _)| variables.contains(&k.variable) && entities.contains(&k.entity))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Panel::from_parts(variables, entities, panel.periods().clone(), values)
}
