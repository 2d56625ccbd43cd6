//! # Tarifa
//!
//! Flight fare prediction service: upload a spreadsheet of flight-search
//! records, get back a zip archive with the predicted fares.
//!
//! Tarifa (Spanish: "fare") is a thin serving layer around a pre-trained
//! regression artifact. The pipeline for every request is the same four
//! steps: decode the uploaded workbook, derive model features, align them to
//! the schema the model was trained with, run inference, and package the
//! results.
//!
//! ## Example
//!
//! ```rust
//! use tarifa::model::FareModel;
//! use tarifa::table::{Cell, RawTable};
//!
//! let model = FareModel::from_json(
//!     br#"{
//!         "name": "demo",
//!         "feature_names": ["duration_mins"],
//!         "weights": [10.0],
//!         "intercept": 1000.0
//!     }"#,
//! )
//! .unwrap();
//!
//! let table = RawTable::new(
//!     vec!["Duration".to_string()],
//!     vec![vec![Cell::Text("2h 50m".to_string())]],
//! );
//!
//! let fares = tarifa::model::predict_fares(&model, &table).unwrap();
//! assert_eq!(fares, vec![2700.0]);
//! ```
//!
//! ## Architecture
//!
//! - [`table`] - raw spreadsheet decode/encode
//! - [`preprocess`] - feature derivation (pure)
//! - [`features`] - feature tables and schema alignment
//! - [`model`] - artifact loading and row-wise inference
//! - [`archive`] - zip packaging of the response
//! - [`api`] - axum router and handlers
//! - [`metrics`] - request counters for `/metrics`
//!
//! The model is loaded once at startup and held read-only behind the
//! application state; there is no reload or retraining path.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
// Clippy allows (MUST come after deny/warn to override them)
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // usize -> f64 for metrics is safe
#![allow(clippy::cast_possible_truncation)] // row/col indices fit sheet limits
#![allow(clippy::must_use_candidate)] // Not all methods need #[must_use]
#![allow(clippy::missing_errors_doc)] // Error sections where they add signal
#![allow(clippy::doc_markdown)] // Allow technical terms without backticks
#![allow(clippy::uninlined_format_args)] // Prefer explicit format args

pub mod api;
/// Zip packaging of the prediction response
pub mod archive;
pub mod error;
/// Feature tables and schema alignment
pub mod features;
pub mod metrics;
/// Model artifact loading and inference
pub mod model;
/// Feature derivation from raw flight records
pub mod preprocess;
pub mod table;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
