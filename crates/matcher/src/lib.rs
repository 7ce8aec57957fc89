//! `zmatcher-engine`: daily/historical table matching engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns matched rows.
//! No CLI or file IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod policy;
pub mod record;
pub mod scheduler;
pub mod schema;

pub use config::{MatchConfig, PolicyConfig, PolicyKind};
pub use engine::{MatchEngine, MatchRun, NoopObserver, RunObserver};
pub use error::MatchError;
pub use model::{FileReport, Row, RunOutcome, Table};
pub use schema::{ColumnMap, SchemaConfig};
