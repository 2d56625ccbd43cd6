//! Pre-trained fare model loading and inference.
//!
//! The model artifact is a JSON document produced by the training pipeline
//! (out of scope here). It carries the ordered feature schema the model was
//! trained with plus linear regression coefficients:
//!
//! ```json
//! {
//!   "name": "flight-fare-linear",
//!   "version": "1",
//!   "feature_names": ["journey_day", "journey_month", "duration_mins"],
//!   "weights": [12.5, -3.1, 4.4],
//!   "intercept": 2750.0
//! }
//! ```
//!
//! The artifact is loaded once at startup and read-only for the process
//! lifetime; there is no reload path.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TarifaError};
use crate::features::FeatureTable;
use crate::preprocess::preprocess;
use crate::table::RawTable;

/// Persisted artifact layout.
#[derive(Debug, Deserialize)]
struct FareArtifact {
    name: String,
    #[serde(default)]
    version: Option<String>,
    feature_names: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
}

/// A loaded fare regression model: ordered feature schema plus coefficients.
#[derive(Debug, Clone)]
pub struct FareModel {
    name: String,
    version: String,
    feature_names: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
}

impl FareModel {
    /// Load and validate an artifact from disk.
    ///
    /// # Errors
    ///
    /// Returns [`TarifaError::Io`] when the file cannot be read and
    /// [`TarifaError::InvalidArtifact`] when its contents fail validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_json(&bytes)
    }

    /// Parse and validate an artifact held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`TarifaError::InvalidArtifact`] on malformed JSON, an empty
    /// schema, duplicate feature names, a weight count that does not match
    /// the schema, or non-finite coefficients.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let artifact: FareArtifact =
            serde_json::from_slice(bytes).map_err(|e| TarifaError::InvalidArtifact {
                reason: format!("malformed artifact JSON: {e}"),
            })?;

        if artifact.feature_names.is_empty() {
            return Err(TarifaError::InvalidArtifact {
                reason: "feature schema is empty".to_string(),
            });
        }
        if artifact.weights.len() != artifact.feature_names.len() {
            return Err(TarifaError::InvalidArtifact {
                reason: format!(
                    "weight count ({}) does not match feature count ({})",
                    artifact.weights.len(),
                    artifact.feature_names.len()
                ),
            });
        }
        for (i, name) in artifact.feature_names.iter().enumerate() {
            if artifact.feature_names[..i].contains(name) {
                return Err(TarifaError::InvalidArtifact {
                    reason: format!("duplicate feature name: {name}"),
                });
            }
        }
        if !artifact.intercept.is_finite() || artifact.weights.iter().any(|w| !w.is_finite()) {
            return Err(TarifaError::InvalidArtifact {
                reason: "coefficients must be finite".to_string(),
            });
        }

        Ok(Self {
            name: artifact.name,
            version: artifact.version.unwrap_or_else(|| "unversioned".to_string()),
            feature_names: artifact.feature_names,
            weights: artifact.weights,
            intercept: artifact.intercept,
        })
    }

    /// Model name from the artifact.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model version from the artifact.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Ordered feature schema fixed at training time.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Row-wise inference over an aligned feature table.
    ///
    /// The table must already be aligned to [`Self::feature_names`]; the
    /// service does this via [`FeatureTable::align_to`] before calling in.
    ///
    /// # Errors
    ///
    /// Returns [`TarifaError::Inference`] when the table shape does not
    /// match the schema or a prediction comes out non-finite.
    pub fn predict(&self, aligned: &FeatureTable) -> Result<Vec<f64>> {
        if aligned.names() != self.feature_names {
            return Err(TarifaError::Inference {
                reason: format!(
                    "feature table is not aligned to the model schema \
                     (got {} columns, expected {})",
                    aligned.column_count(),
                    self.feature_names.len()
                ),
            });
        }

        let mut predictions = Vec::with_capacity(aligned.row_count());
        for i in 0..aligned.row_count() {
            let row = aligned.row(i);
            let value: f64 = self.intercept
                + row
                    .iter()
                    .zip(self.weights.iter())
                    .map(|(x, w)| x * w)
                    .sum::<f64>();
            if !value.is_finite() {
                return Err(TarifaError::Inference {
                    reason: format!("non-finite prediction at row {i}"),
                });
            }
            predictions.push(value);
        }
        Ok(predictions)
    }
}

/// Full prediction pipeline for an uploaded table: preprocess, align to the
/// model schema (zero-filling schema columns the table lacks), run inference.
/// The result has exactly one value per input row, in input order.
///
/// # Errors
///
/// Propagates [`TarifaError::Inference`] from the model call.
pub fn predict_fares(model: &FareModel, table: &RawTable) -> Result<Vec<f64>> {
    let features = preprocess(table);
    let aligned = features.align_to(model.feature_names());
    model.predict(&aligned)
}
