//! # Case Assignment Service
//!
//! [`CaseAssigner`] is the entry point used by the case-creation boundary.
//! It owns the ordering guarantees that the store alone cannot give:
//!
//! - payloads are validated before any store access, so a bad request never
//!   opens a transaction;
//! - every store call is bounded by `database.query_timeout_secs`, and an
//!   elapsed timeout is reported as an internal failure;
//! - outcomes are returned as a typed [`AssignmentError`] whose
//!   [`kind`](AssignmentError::kind) separates validation, no-capacity and
//!   internal failures.
//!
//! ## Example
//!
//! ```rust,no_run
//! use assignment_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let store = Arc::new(SqliteCaseStore::new("sqlite::memory:").await?);
//! let assigner = CaseAssigner::new(store, &DatabaseConfig::in_memory());
//!
//! assigner.register_agent(NewAgent { name: "Alice".to_string(), online: true }).await?;
//!
//! let case = assigner
//!     .create_case_with_assignment(NewCase {
//!         customer_id: 17,
//!         title: "Damaged item".to_string(),
//!         category: "returns".to_string(),
//!         content: "Box arrived crushed".to_string(),
//!         order_id: Some(3301),
//!     })
//!     .await?;
//!
//! println!("Case {} assigned to agent {}", case.case_id, case.agent_id);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::DatabaseConfig;
use crate::error::{AssignmentError, ErrorKind, Result};
use crate::store::CaseStore;
use crate::types::{Agent, AgentId, AgentLoad, Case, CaseId, CaseStatus, NewAgent, NewCase};
use crate::validation::{validate_new_agent, validate_new_case};

/// Least-connections case assignment over a [`CaseStore`]
#[derive(Clone)]
pub struct CaseAssigner {
    store: Arc<dyn CaseStore>,
    query_timeout: Duration,
}

impl CaseAssigner {
    pub fn new(store: Arc<dyn CaseStore>, config: &DatabaseConfig) -> Self {
        Self {
            store,
            query_timeout: config.query_timeout(),
        }
    }

    /// Override the per-call store timeout
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn CaseStore> {
        &self.store
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.query_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AssignmentError::timeout(format!(
                "{} exceeded {:?}",
                operation, self.query_timeout
            ))),
        }
    }

    /// Agent that would receive a case created right now.
    ///
    /// Read-only; repeated calls against unchanged state return the same
    /// agent. `None` means no agent is online.
    pub async fn select_agent_for_new_case(&self) -> Result<Option<AgentId>> {
        self.bounded("select_agent_for_new_case", self.store.select_agent_for_new_case())
            .await
    }

    /// Validate, select the least-loaded online agent and create a
    /// `waiting` case bound to it.
    ///
    /// # Errors
    ///
    /// - `Validation` when a required field is missing or empty; the store
    ///   is not touched.
    /// - `NoCapacity` when no agent is online; nothing is written.
    /// - `Database` or `Timeout` on store failure; the transaction is rolled
    ///   back.
    pub async fn create_case_with_assignment(&self, new_case: NewCase) -> Result<Case> {
        validate_new_case(&new_case)?;

        let customer_id = new_case.customer_id;
        let result = self
            .bounded(
                "create_case_with_assignment",
                self.store.create_case_with_assignment(new_case),
            )
            .await;

        match &result {
            Ok(case) => info!(
                "Created case {} for customer {} assigned to agent {}",
                case.case_id, customer_id, case.agent_id
            ),
            Err(e) => match e.kind() {
                ErrorKind::NoCapacity => {
                    warn!("Rejected case for customer {}: no agent online", customer_id)
                }
                _ => error!("Failed to create case for customer {}: {}", customer_id, e),
            },
        }

        result
    }

    pub async fn agent_loads(&self) -> Result<Vec<AgentLoad>> {
        self.bounded("agent_loads", self.store.agent_loads()).await
    }

    pub async fn register_agent(&self, new_agent: NewAgent) -> Result<Agent> {
        validate_new_agent(&new_agent)?;
        let agent = self.bounded("register_agent", self.store.register_agent(new_agent)).await?;
        info!("Registered agent {} ({})", agent.agent_id, agent.name);
        Ok(agent)
    }

    pub async fn set_agent_online(&self, agent_id: AgentId, online: bool) -> Result<Agent> {
        self.bounded("set_agent_online", self.store.set_agent_online(agent_id, online))
            .await
    }

    pub async fn list_agents(&self) -> Result<Vec<Agent>> {
        self.bounded("list_agents", self.store.list_agents()).await
    }

    pub async fn get_case(&self, case_id: CaseId) -> Result<Case> {
        self.bounded("get_case", self.store.get_case(case_id))
            .await?
            .ok_or_else(|| AssignmentError::not_found(format!("case {}", case_id)))
    }

    pub async fn list_cases_for_agent(&self, agent_id: AgentId) -> Result<Vec<Case>> {
        self.bounded("list_cases_for_agent", self.store.list_cases_for_agent(agent_id))
            .await
    }

    pub async fn update_case_status(&self, case_id: CaseId, status: CaseStatus) -> Result<Case> {
        let case = self
            .bounded("update_case_status", self.store.update_case_status(case_id, status))
            .await?;
        debug!("Case {} is now {}", case.case_id, case.status);
        Ok(case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteCaseStore;
    use async_trait::async_trait;

    async fn assigner() -> CaseAssigner {
        let store = Arc::new(SqliteCaseStore::new("sqlite::memory:").await.unwrap());
        CaseAssigner::new(store, &DatabaseConfig::in_memory())
    }

    fn new_case() -> NewCase {
        NewCase {
            customer_id: 3,
            title: "Wrong size".to_string(),
            category: "returns".to_string(),
            content: "Need a medium instead".to_string(),
            order_id: None,
        }
    }

    #[tokio::test]
    async fn test_missing_title_never_reaches_store() {
        let assigner = assigner().await;
        assigner
            .register_agent(NewAgent { name: "A".to_string(), online: true })
            .await
            .unwrap();

        let err = assigner
            .create_case_with_assignment(NewCase { title: String::new(), ..new_case() })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(assigner.store().count_cases().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_case_is_not_found() {
        let assigner = assigner().await;
        let err = assigner.get_case(CaseId(12)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_blank_agent_name_rejected() {
        let assigner = assigner().await;
        let err = assigner
            .register_agent(NewAgent { name: String::new(), online: true })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(assigner.list_agents().await.unwrap().is_empty());
    }

    /// Store whose calls never complete
    struct StalledStore;

    #[async_trait]
    impl CaseStore for StalledStore {
        async fn agent_loads(&self) -> Result<Vec<AgentLoad>> {
            std::future::pending().await
        }
        async fn select_agent_for_new_case(&self) -> Result<Option<AgentId>> {
            std::future::pending().await
        }
        async fn create_case_with_assignment(&self, _new_case: NewCase) -> Result<Case> {
            std::future::pending().await
        }
        async fn register_agent(&self, _new_agent: NewAgent) -> Result<Agent> {
            std::future::pending().await
        }
        async fn set_agent_online(&self, _agent_id: AgentId, _online: bool) -> Result<Agent> {
            std::future::pending().await
        }
        async fn get_agent(&self, _agent_id: AgentId) -> Result<Option<Agent>> {
            std::future::pending().await
        }
        async fn list_agents(&self) -> Result<Vec<Agent>> {
            std::future::pending().await
        }
        async fn get_case(&self, _case_id: CaseId) -> Result<Option<Case>> {
            std::future::pending().await
        }
        async fn list_cases_for_agent(&self, _agent_id: AgentId) -> Result<Vec<Case>> {
            std::future::pending().await
        }
        async fn update_case_status(&self, _case_id: CaseId, _status: CaseStatus) -> Result<Case> {
            std::future::pending().await
        }
        async fn count_cases(&self) -> Result<i64> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_stalled_store_times_out_as_internal() {
        let assigner = CaseAssigner::new(Arc::new(StalledStore), &DatabaseConfig::in_memory())
            .with_query_timeout(Duration::from_millis(20));

        let err = assigner.create_case_with_assignment(new_case()).await.unwrap_err();
        assert!(matches!(err, AssignmentError::Timeout(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);

        let err = assigner.select_agent_for_new_case().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_stalled_store_is_not_consulted_for_invalid_input() {
        let assigner = CaseAssigner::new(Arc::new(StalledStore), &DatabaseConfig::in_memory())
            .with_query_timeout(Duration::from_millis(20));

        let err = assigner
            .create_case_with_assignment(NewCase { content: " ".to_string(), ..new_case() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
