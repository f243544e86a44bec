//! # Agent and Case Storage
//!
//! The [`CaseStore`] trait is the only way the assignment service touches
//! agent and case records. [`SqliteCaseStore`] is the sqlx-backed
//! implementation.
//!
//! Agent load is never stored. Every read that needs it runs an aggregate
//! over the `cases` table, so there is a single source of truth and a case
//! closed by a collaborator is reflected on the next selection.

pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Agent, AgentId, AgentLoad, Case, CaseId, CaseStatus, NewAgent, NewCase};

pub use sqlite::SqliteCaseStore;

/// Storage operations required by case assignment
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Every agent with its online flag and current number of open cases,
    /// ordered by agent id, read from one consistent snapshot.
    async fn agent_loads(&self) -> Result<Vec<AgentLoad>>;

    /// Least-loaded online agent, without writing anything
    async fn select_agent_for_new_case(&self) -> Result<Option<AgentId>>;

    /// Select an agent and insert a `waiting` case bound to it as one
    /// atomic unit. Fails with `NoCapacity` and writes nothing when no agent
    /// is online.
    async fn create_case_with_assignment(&self, new_case: NewCase) -> Result<Case>;

    async fn register_agent(&self, new_agent: NewAgent) -> Result<Agent>;
    async fn set_agent_online(&self, agent_id: AgentId, online: bool) -> Result<Agent>;
    async fn get_agent(&self, agent_id: AgentId) -> Result<Option<Agent>>;
    async fn list_agents(&self) -> Result<Vec<Agent>>;

    async fn get_case(&self, case_id: CaseId) -> Result<Option<Case>>;
    async fn list_cases_for_agent(&self, agent_id: AgentId) -> Result<Vec<Case>>;

    /// Move a case to another status. The assigned agent never changes.
    async fn update_case_status(&self, case_id: CaseId, status: CaseStatus) -> Result<Case>;

    async fn count_cases(&self) -> Result<i64>;
}
