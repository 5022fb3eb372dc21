use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::model::ModelColumn;
use super::reference::ReferenceDataset;
use super::ScoringUnavailable;

/// Value type of a model input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Datetime,
}

impl ColumnKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Datetime => "datetime",
        }
    }

    /// Policy used when the artifact does not name one.
    pub const fn default_policy(self) -> DefaultPolicy {
        match self {
            Self::Numeric | Self::Datetime => DefaultPolicy::Median,
            Self::Categorical => DefaultPolicy::Mode,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a missing column is filled, resolved once against the reference dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    Median,
    Mode,
    Fixed(String),
}

impl fmt::Display for DefaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Median => f.write_str("median"),
            Self::Mode => f.write_str("mode"),
            Self::Fixed(value) => write!(f, "fixed '{value}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
    Timestamp(NaiveDateTime),
}

impl FeatureValue {
    /// Convert into the representation a column of `kind` expects, if possible.
    pub fn coerce(&self, kind: ColumnKind) -> Option<FeatureValue> {
        match (kind, self) {
            (ColumnKind::Numeric, FeatureValue::Numeric(value)) => {
                value.is_finite().then_some(FeatureValue::Numeric(*value))
            }
            (ColumnKind::Numeric, FeatureValue::Categorical(text)) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(FeatureValue::Numeric),
            (ColumnKind::Categorical, FeatureValue::Categorical(text)) => {
                Some(FeatureValue::Categorical(text.clone()))
            }
            (ColumnKind::Categorical, FeatureValue::Numeric(value)) => {
                Some(FeatureValue::Categorical(format_number(*value)))
            }
            (ColumnKind::Categorical, FeatureValue::Timestamp(at)) => Some(
                FeatureValue::Categorical(at.format("%Y-%m-%d %H:%M:%S").to_string()),
            ),
            (ColumnKind::Datetime, FeatureValue::Timestamp(at)) => {
                Some(FeatureValue::Timestamp(*at))
            }
            (ColumnKind::Datetime, FeatureValue::Categorical(text)) => {
                parse_timestamp(text).map(FeatureValue::Timestamp)
            }
            (ColumnKind::Numeric, FeatureValue::Timestamp(_))
            | (ColumnKind::Datetime, FeatureValue::Numeric(_)) => None,
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(at);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

/// Named feature values for one application, before alignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow(BTreeMap<String, FeatureValue>);

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: FeatureValue) {
        self.0.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.0.get(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaColumn {
    pub name: String,
    pub kind: ColumnKind,
    pub default: FeatureValue,
}

/// Ordered, typed model inputs with their defaults already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<SchemaColumn>,
}

impl FeatureSchema {
    pub fn resolve(
        columns: &[ModelColumn],
        reference: &ReferenceDataset,
    ) -> Result<Self, ScoringUnavailable> {
        let columns = columns
            .iter()
            .map(|column| {
                let kind = column.kind();
                let policy = column
                    .default
                    .clone()
                    .unwrap_or_else(|| kind.default_policy());
                let default = resolve_default(&column.name, kind, &policy, reference)?;
                Ok(SchemaColumn {
                    name: column.name.clone(),
                    kind,
                    default,
                })
            })
            .collect::<Result<Vec<_>, ScoringUnavailable>>()?;

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reorder a row to the schema: unknown columns are dropped, missing or
    /// unconvertible ones take the resolved default.
    pub fn align(&self, row: &FeatureRow) -> AlignedRow {
        let mut values = Vec::with_capacity(self.columns.len());
        let mut defaulted = Vec::new();

        for column in &self.columns {
            match row.get(&column.name).and_then(|value| value.coerce(column.kind)) {
                Some(value) => values.push(value),
                None => {
                    defaulted.push(column.name.clone());
                    values.push(column.default.clone());
                }
            }
        }

        AlignedRow { values, defaulted }
    }
}

fn resolve_default(
    column: &str,
    kind: ColumnKind,
    policy: &DefaultPolicy,
    reference: &ReferenceDataset,
) -> Result<FeatureValue, ScoringUnavailable> {
    let missing = || ScoringUnavailable::MissingReference {
        column: column.to_string(),
    };

    match (policy, kind) {
        (DefaultPolicy::Median, ColumnKind::Numeric) => reference
            .numeric_median(column)
            .map(FeatureValue::Numeric)
            .ok_or_else(missing),
        (DefaultPolicy::Median, ColumnKind::Datetime) => reference
            .datetime_median(column)
            .map(FeatureValue::Timestamp)
            .ok_or_else(missing),
        (DefaultPolicy::Median, ColumnKind::Categorical) => {
            Err(ScoringUnavailable::UnsupportedDefault {
                column: column.to_string(),
                kind,
                policy: policy.clone(),
            })
        }
        (DefaultPolicy::Mode, _) => {
            let mode = reference.mode(column).ok_or_else(missing)?;
            FeatureValue::Categorical(mode.clone())
                .coerce(kind)
                .ok_or_else(|| ScoringUnavailable::InvalidDefault {
                    column: column.to_string(),
                    kind,
                    value: mode,
                })
        }
        (DefaultPolicy::Fixed(value), _) => FeatureValue::Categorical(value.clone())
            .coerce(kind)
            .ok_or_else(|| ScoringUnavailable::InvalidDefault {
                column: column.to_string(),
                kind,
                value: value.clone(),
            }),
    }
}

/// A row in schema order, ready for the model.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    values: Vec<FeatureValue>,
    defaulted: Vec<String>,
}

impl AlignedRow {
    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    /// Columns that were filled from defaults, in schema order.
    pub fn defaulted(&self) -> &[String] {
        &self.defaulted
    }
}
