//! Citeline Backfill
//!
//! Fills missing MasterFormat classification codes on product records.
//!
//! # Overview
//!
//! A record is sent to the classifier when its classification field is
//! empty or "N/A" and it has a name or description to classify from.
//! Calls run concurrently and fail independently: a failed call leaves
//! its record untouched and is counted, never fatal.
//!
//! A filled code has no citations, so review marks it "AI generated".
//!
//! # Usage
//!
//! ```no_run
//! use citeline_backfill::{Backfiller, BackfillConfig};
//! use citeline_backend::MockClassifier;
//! use citeline_store::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new("citeline.db")?;
//! let backfiller = Backfiller::new(MockClassifier::new("09 51 00"), BackfillConfig::default());
//!
//! let run = backfiller.backfill_and_persist(&mut store).await?;
//! println!("{}", run.metrics.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! allowed_sections = ["Division 09 - Finishes", "Division 12 - Furnishings"]
//! max_in_flight = 8
//! dry_run = false
//! ```

#![warn(missing_docs)]

mod backfill;
mod config;
mod error;
mod metrics;

pub use backfill::{BackfillRun, Backfiller};
pub use config::{BackfillConfig, DEFAULT_ALLOWED_SECTIONS};
pub use error::BackfillError;
pub use metrics::BackfillMetrics;
