//! # Assignment-Core
//!
//! Least-connections agent assignment for contact-center support cases.
//!
//! This crate provides:
//! - Agent and case storage in SQLite via sqlx
//! - A pure least-connections selection policy with lowest-id tie-break
//! - Atomic "select agent + create case" with write-lock serialization
//! - Validation of case creation payloads before any store access
//! - A typed error taxonomy separating validation, no-capacity and internal
//!   failures
//!
//! ## Architecture
//!
//! ```text
//! case-creation request
//!        │
//!        ▼
//! ┌──────────────┐  validate  ┌──────────────┐  BEGIN, lock, load, pick,
//! │ CaseAssigner │───────────▶│  CaseStore   │  INSERT, COMMIT
//! └──────────────┘  timeout   └──────────────┘
//!                                    │
//!                                    ▼
//!                             LeastConnections::pick
//! ```
//!
//! Agent load is recomputed from open cases on every decision; there is no
//! cached counter to drift.

pub mod assigner;
pub mod config;
pub mod error;
pub mod logging;
pub mod policy;
pub mod store;
pub mod types;
pub mod validation;

use std::sync::Arc;

pub use assigner::CaseAssigner;
pub use config::{ApiConfig, AssignmentConfig, DatabaseConfig, LoggingConfig};
pub use error::{AssignmentError, ErrorKind, Result};
pub use policy::LeastConnections;
pub use store::{CaseStore, SqliteCaseStore};
pub use types::{Agent, AgentId, AgentLoad, Case, CaseId, CaseStatus, NewAgent, NewCase};

/// Open the configured store and build the assignment service
pub async fn init(config: &AssignmentConfig) -> Result<CaseAssigner> {
    config.validate()?;
    let store = SqliteCaseStore::with_config(&config.database).await?;
    Ok(CaseAssigner::new(Arc::new(store), &config.database))
}

/// Common imports
pub mod prelude {
    pub use crate::assigner::CaseAssigner;
    pub use crate::config::{AssignmentConfig, DatabaseConfig};
    pub use crate::error::{AssignmentError, ErrorKind, Result};
    pub use crate::policy::LeastConnections;
    pub use crate::store::{CaseStore, SqliteCaseStore};
    pub use crate::types::{
        Agent, AgentId, AgentLoad, Case, CaseId, CaseStatus, NewAgent, NewCase,
    };
}
