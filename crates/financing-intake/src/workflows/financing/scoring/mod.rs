//! Optional fraud-classifier path.
//!
//! The classifier artifact and its reference dataset are loaded once, the
//! input schema is resolved against the dataset at that point, and the result
//! is shared read-only. Any failure here leaves decisions on the parity rule.

mod features;
mod model;
mod reference;
mod schema;

pub use features::{feature_row, PRODUCT_TYPE};
pub use model::{ColumnEncoding, LogisticModel, ModelColumn};
pub use reference::ReferenceDataset;
pub use schema::{
    AlignedRow, ColumnKind, DefaultPolicy, FeatureRow, FeatureSchema, FeatureValue, SchemaColumn,
};

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::domain::ApplicationRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Model,
    ReferenceDataset,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Model => f.write_str("model artifact"),
            Artifact::ReferenceDataset => f.write_str("reference dataset"),
        }
    }
}

/// The classifier or its reference data cannot be used. Never fatal.
#[derive(Debug, thiserror::Error)]
pub enum ScoringUnavailable {
    #[error("failed to read {artifact} at {}: {source}", .path.display())]
    Read {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is malformed: {0}")]
    ModelFormat(#[from] serde_json::Error),
    #[error("reference dataset is malformed: {0}")]
    ReferenceFormat(#[from] csv::Error),
    #[error("model artifact is invalid: {0}")]
    InvalidModel(String),
    #[error("reference dataset has no usable values for column '{column}'")]
    MissingReference { column: String },
    #[error("{policy} default cannot fill {kind} column '{column}'")]
    UnsupportedDefault {
        column: String,
        kind: ColumnKind,
        policy: DefaultPolicy,
    },
    #[error("default '{value}' does not fit {kind} column '{column}'")]
    InvalidDefault {
        column: String,
        kind: ColumnKind,
        value: String,
    },
    #[error("scorer produced an unusable probability: {0}")]
    InvalidProbability(f64),
}

/// Seam for anything that can turn a validated request into a fraud probability.
pub trait RiskScorer: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, request: &ApplicationRequest) -> Result<f64, ScoringUnavailable>;
}

/// Logistic model bound to a schema resolved against its reference dataset.
#[derive(Debug, Clone)]
pub struct FraudClassifier {
    model: LogisticModel,
    schema: FeatureSchema,
}

impl FraudClassifier {
    pub fn new(
        model: LogisticModel,
        reference: &ReferenceDataset,
    ) -> Result<Self, ScoringUnavailable> {
        let schema = FeatureSchema::resolve(model.columns(), reference)?;
        Ok(Self { model, schema })
    }

    pub fn load<M, R>(model_path: M, reference_path: R) -> Result<Self, ScoringUnavailable>
    where
        M: AsRef<Path>,
        R: AsRef<Path>,
    {
        let model = LogisticModel::from_path(model_path)?;
        let reference = ReferenceDataset::from_path(reference_path)?;
        debug!(
            model = %model.name,
            reference_rows = reference.rows(),
            "resolving classifier defaults from reference dataset"
        );
        Self::new(model, &reference)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn model(&self) -> &LogisticModel {
        &self.model
    }
}

impl RiskScorer for FraudClassifier {
    fn name(&self) -> &str {
        &self.model.name
    }

    fn score(&self, request: &ApplicationRequest) -> Result<f64, ScoringUnavailable> {
        let row = feature_row(request);
        let aligned = self.schema.align(&row);
        if !aligned.defaulted().is_empty() {
            debug!(
                model = %self.model.name,
                defaulted = aligned.defaulted().len(),
                "filled model columns from reference defaults"
            );
        }
        self.model.predict_proba(&aligned)
    }
}
