//! SQLite-backed case store using sqlx
//!
//! Case creation runs inside a transaction whose first statement writes to
//! the candidate agent rows. SQLite grants the write lock at that point, so
//! concurrent assignments queue on `busy_timeout` and each one computes
//! loads from a snapshot that already includes every previously committed
//! case. Selection plus insert therefore behaves as if serialized, and the
//! chosen agent is the global minimum at commit time.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::error::{AssignmentError, Result};
use crate::policy::LeastConnections;
use crate::store::CaseStore;
use crate::types::{
    Agent, AgentId, AgentLoad, Case, CaseId, CaseRow, CaseStatus, NewAgent, NewCase,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS agents (
        agent_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        online BOOLEAN NOT NULL DEFAULT 0,
        created_at DATETIME NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS cases (
        case_id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL,
        agent_id INTEGER NOT NULL REFERENCES agents(agent_id),
        title TEXT NOT NULL,
        category TEXT NOT NULL,
        content TEXT NOT NULL,
        order_id INTEGER,
        status TEXT NOT NULL,
        created_at DATETIME NOT NULL,
        closed_at DATETIME
    )",
    "CREATE INDEX IF NOT EXISTS idx_cases_agent_status ON cases (agent_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_agents_online ON agents (online)",
];

const AGENT_LOADS_SQL: &str = "
    SELECT a.agent_id AS agent_id,
           a.online AS online,
           COUNT(c.case_id) AS active_cases
    FROM agents a
    LEFT JOIN cases c
        ON c.agent_id = a.agent_id AND LOWER(TRIM(c.status)) <> ?
    GROUP BY a.agent_id, a.online
    ORDER BY a.agent_id";

/// Writing the online rows takes SQLite's write lock before the load read
const LOCK_CANDIDATES_SQL: &str = "UPDATE agents SET online = online WHERE online = 1";

const SELECT_AGENT_SQL: &str = "
    SELECT agent_id, name, online, created_at FROM agents WHERE agent_id = ?";

const SELECT_CASE_SQL: &str = "
    SELECT case_id, customer_id, agent_id, title, category, content, order_id,
           status, created_at, closed_at
    FROM cases WHERE case_id = ?";

/// sqlx SQLite implementation of [`CaseStore`]
#[derive(Clone)]
pub struct SqliteCaseStore {
    pool: SqlitePool,
}

impl SqliteCaseStore {
    /// Open a store at `database_url` with default pool settings
    pub async fn new(database_url: &str) -> Result<Self> {
        let config = DatabaseConfig {
            url: database_url.to_string(),
            ..Default::default()
        };
        Self::with_config(&config).await
    }

    /// Open a store and create its tables if they do not exist yet
    pub async fn with_config(config: &DatabaseConfig) -> Result<Self> {
        let in_memory = config.is_in_memory();

        let mut options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout());
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Each connection to `:memory:` is its own database, so keep exactly
        // one alive for the lifetime of the pool.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options
            .acquire_timeout(config.query_timeout())
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.create_schema().await?;

        info!(
            "Case store ready at {} ({} connection(s))",
            config.url,
            if in_memory { 1 } else { config.max_connections }
        );
        Ok(store)
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn create_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Case store schema verified");
        Ok(())
    }
}

async fn fetch_agent_loads<'e, E>(executor: E) -> std::result::Result<Vec<AgentLoad>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, AgentLoad>(AGENT_LOADS_SQL)
        .bind(CaseStatus::Closed.as_str())
        .fetch_all(executor)
        .await
}

async fn fetch_case<'e, E>(executor: E, case_id: CaseId) -> Result<Option<Case>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, CaseRow>(SELECT_CASE_SQL)
        .bind(case_id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Case::from))
}

#[async_trait]
impl CaseStore for SqliteCaseStore {
    async fn agent_loads(&self) -> Result<Vec<AgentLoad>> {
        Ok(fetch_agent_loads(&self.pool).await?)
    }

    async fn select_agent_for_new_case(&self) -> Result<Option<AgentId>> {
        // One statement, one snapshot
        let loads = fetch_agent_loads(&self.pool).await?;
        let selected = LeastConnections::pick(&loads);
        debug!("Selected agent {:?} from {} agent(s)", selected, loads.len());
        Ok(selected)
    }

    async fn create_case_with_assignment(&self, new_case: NewCase) -> Result<Case> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(LOCK_CANDIDATES_SQL).execute(&mut *tx).await?;

        let loads = fetch_agent_loads(&mut *tx).await?;
        let Some(agent_id) = LeastConnections::pick(&loads) else {
            tx.rollback().await?;
            warn!("No online agent among {} registered agent(s)", loads.len());
            return Err(AssignmentError::NoCapacity);
        };

        let result = sqlx::query(
            "INSERT INTO cases
                (customer_id, agent_id, title, category, content, order_id, status, created_at, closed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL)",
        )
        .bind(new_case.customer_id)
        .bind(agent_id)
        .bind(&new_case.title)
        .bind(&new_case.category)
        .bind(&new_case.content)
        .bind(new_case.order_id)
        .bind(CaseStatus::Waiting.as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let case_id = CaseId(result.last_insert_rowid());
        let case = fetch_case(&mut *tx, case_id).await?.ok_or_else(|| {
            AssignmentError::internal(format!("case {} vanished inside its own transaction", case_id))
        })?;

        tx.commit().await?;

        debug!("Case {} bound to agent {}", case.case_id, case.agent_id);
        Ok(case)
    }

    async fn register_agent(&self, new_agent: NewAgent) -> Result<Agent> {
        let result = sqlx::query("INSERT INTO agents (name, online, created_at) VALUES (?, ?, ?)")
            .bind(new_agent.name.trim())
            .bind(new_agent.online)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        let agent_id = AgentId(result.last_insert_rowid());
        self.get_agent(agent_id)
            .await?
            .ok_or_else(|| AssignmentError::internal(format!("agent {} missing after insert", agent_id)))
    }

    async fn set_agent_online(&self, agent_id: AgentId, online: bool) -> Result<Agent> {
        let result = sqlx::query("UPDATE agents SET online = ? WHERE agent_id = ?")
            .bind(online)
            .bind(agent_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AssignmentError::not_found(format!("agent {}", agent_id)));
        }

        debug!("Agent {} online={}", agent_id, online);
        self.get_agent(agent_id)
            .await?
            .ok_or_else(|| AssignmentError::not_found(format!("agent {}", agent_id)))
    }

    async fn get_agent(&self, agent_id: AgentId) -> Result<Option<Agent>> {
        let agent = sqlx::query_as::<_, Agent>(SELECT_AGENT_SQL)
            .bind(agent_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(agent)
    }

    async fn list_agents(&self) -> Result<Vec<Agent>> {
        let agents = sqlx::query_as::<_, Agent>(
            "SELECT agent_id, name, online, created_at FROM agents ORDER BY agent_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(agents)
    }

    async fn get_case(&self, case_id: CaseId) -> Result<Option<Case>> {
        fetch_case(&self.pool, case_id).await
    }

    async fn list_cases_for_agent(&self, agent_id: AgentId) -> Result<Vec<Case>> {
        let rows = sqlx::query_as::<_, CaseRow>(
            "SELECT case_id, customer_id, agent_id, title, category, content, order_id,
                    status, created_at, closed_at
             FROM cases WHERE agent_id = ? ORDER BY case_id",
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Case::from).collect())
    }

    async fn update_case_status(&self, case_id: CaseId, status: CaseStatus) -> Result<Case> {
        // Closing keeps the first closure time; reopening clears it
        let result = sqlx::query(
            "UPDATE cases
             SET status = ?,
                 closed_at = CASE WHEN ? THEN COALESCE(closed_at, ?) ELSE NULL END
             WHERE case_id = ?",
        )
        .bind(status.as_str())
        .bind(!status.is_active())
        .bind(Utc::now())
        .bind(case_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AssignmentError::not_found(format!("case {}", case_id)));
        }

        debug!("Case {} moved to {}", case_id, status);
        self.get_case(case_id)
            .await?
            .ok_or_else(|| AssignmentError::not_found(format!("case {}", case_id)))
    }

    async fn count_cases(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cases")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
