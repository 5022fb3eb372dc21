use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::schema::{AlignedRow, ColumnKind, DefaultPolicy, FeatureValue};
use super::{Artifact, ScoringUnavailable};

const SECONDS_PER_DAY: f64 = 86_400.0;

fn unit_scale() -> f64 {
    1.0
}

/// Encoding parameters for one input column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnEncoding {
    Numeric {
        weight: f64,
        #[serde(default)]
        offset: f64,
        #[serde(default = "unit_scale")]
        scale: f64,
    },
    Categorical {
        #[serde(default)]
        levels: BTreeMap<String, f64>,
        #[serde(default)]
        unknown: f64,
    },
    /// Timestamps enter the model as fractional days since the Unix epoch.
    Datetime {
        weight: f64,
        #[serde(default)]
        offset: f64,
        #[serde(default = "unit_scale")]
        scale: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelColumn {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultPolicy>,
    #[serde(flatten)]
    pub encoding: ColumnEncoding,
}

impl ModelColumn {
    pub fn kind(&self) -> ColumnKind {
        match self.encoding {
            ColumnEncoding::Numeric { .. } => ColumnKind::Numeric,
            ColumnEncoding::Categorical { .. } => ColumnKind::Categorical,
            ColumnEncoding::Datetime { .. } => ColumnKind::Datetime,
        }
    }

    fn contribution(&self, value: &FeatureValue) -> f64 {
        match (&self.encoding, value) {
            (
                ColumnEncoding::Numeric {
                    weight,
                    offset,
                    scale,
                },
                FeatureValue::Numeric(x),
            ) => weight * (x - offset) / scale,
            (
                ColumnEncoding::Datetime {
                    weight,
                    offset,
                    scale,
                },
                FeatureValue::Timestamp(at),
            ) => {
                let days = at.and_utc().timestamp() as f64 / SECONDS_PER_DAY;
                weight * (days - offset) / scale
            }
            (ColumnEncoding::Categorical { levels, unknown }, FeatureValue::Categorical(level)) => {
                levels.get(level).copied().unwrap_or(*unknown)
            }
            _ => 0.0,
        }
    }
}

/// Pre-trained logistic fraud classifier, read-only once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub name: String,
    pub intercept: f64,
    pub columns: Vec<ModelColumn>,
}

impl LogisticModel {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoringUnavailable> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ScoringUnavailable::Read {
            artifact: Artifact::Model,
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScoringUnavailable> {
        let model: LogisticModel = serde_json::from_reader(reader)?;
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> Result<(), ScoringUnavailable> {
        if self.columns.is_empty() {
            return Err(ScoringUnavailable::InvalidModel(
                "model declares no input columns".to_string(),
            ));
        }
        if !self.intercept.is_finite() {
            return Err(ScoringUnavailable::InvalidModel(
                "intercept must be finite".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ScoringUnavailable::InvalidModel(format!(
                    "column '{}' declared more than once",
                    column.name
                )));
            }

            let finite = match &column.encoding {
                ColumnEncoding::Numeric {
                    weight,
                    offset,
                    scale,
                }
                | ColumnEncoding::Datetime {
                    weight,
                    offset,
                    scale,
                } => weight.is_finite() && offset.is_finite() && scale.is_finite() && *scale != 0.0,
                ColumnEncoding::Categorical { levels, unknown } => {
                    unknown.is_finite() && levels.values().all(|weight| weight.is_finite())
                }
            };
            if !finite {
                return Err(ScoringUnavailable::InvalidModel(format!(
                    "column '{}' has non-finite or zero-scale parameters",
                    column.name
                )));
            }
        }

        Ok(())
    }

    pub fn columns(&self) -> &[ModelColumn] {
        &self.columns
    }

    /// Probability of the positive (fraud) class for a schema-aligned row.
    pub fn predict_proba(&self, row: &AlignedRow) -> Result<f64, ScoringUnavailable> {
        if row.values().len() != self.columns.len() {
            return Err(ScoringUnavailable::InvalidModel(format!(
                "row has {} values but model expects {}",
                row.values().len(),
                self.columns.len()
            )));
        }

        let logit = self
            .columns
            .iter()
            .zip(row.values())
            .fold(self.intercept, |acc, (column, value)| {
                acc + column.contribution(value)
            });

        let probability = 1.0 / (1.0 + (-logit).exp());
        if probability.is_finite() {
            Ok(probability)
        } else {
            Err(ScoringUnavailable::InvalidProbability(probability))
        }
    }
}
