//! Core types for case assignment

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AssignmentError;

/// Agent identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct AgentId(pub i64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Case identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct CaseId(pub i64);

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Support agent that can receive cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Agent {
    pub agent_id: AgentId,
    pub name: String,
    pub online: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to register a new agent
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NewAgent {
    #[validate(custom(function = "crate::validation::not_blank"), length(max = 100))]
    pub name: String,
    pub online: bool,
}

/// Lifecycle status of a case.
///
/// Only [`CaseStatus::Closed`] is terminal; every other status counts
/// towards the assigned agent's load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Assigned but not yet picked up
    Waiting,
    /// Agent is working the case
    InProgress,
    /// Resolved
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Waiting => "waiting",
            CaseStatus::InProgress => "in_progress",
            CaseStatus::Closed => "closed",
        }
    }

    /// Whether a case in this status counts as open load
    pub fn is_active(&self) -> bool {
        !matches!(self, CaseStatus::Closed)
    }

    /// Read a status column that other writers may fill with their own words.
    ///
    /// Uses the same rule as the load query: `closed` after trimming spaces
    /// and ASCII case folding is closed. Waiting tokens keep their variant and
    /// every other word is open work.
    pub fn from_stored(raw: &str) -> CaseStatus {
        match raw.trim_matches(' ').to_ascii_lowercase().as_str() {
            "closed" => CaseStatus::Closed,
            "waiting" | "pending" => CaseStatus::Waiting,
            _ => CaseStatus::InProgress,
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = AssignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "waiting" | "pending" => Ok(CaseStatus::Waiting),
            "in_progress" | "in-progress" | "open" => Ok(CaseStatus::InProgress),
            "closed" => Ok(CaseStatus::Closed),
            other => Err(AssignmentError::validation(format!("unknown case status: {}", other))),
        }
    }
}

/// Support case bound to exactly one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: CaseId,
    pub customer_id: i64,
    pub agent_id: AgentId,
    pub title: String,
    pub category: String,
    pub content: String,
    pub order_id: Option<i64>,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Raw `cases` row; status is kept as text until converted into a [`Case`]
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CaseRow {
    pub case_id: CaseId,
    pub customer_id: i64,
    pub agent_id: AgentId,
    pub title: String,
    pub category: String,
    pub content: String,
    pub order_id: Option<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<CaseRow> for Case {
    fn from(row: CaseRow) -> Self {
        Case {
            case_id: row.case_id,
            customer_id: row.customer_id,
            agent_id: row.agent_id,
            title: row.title,
            category: row.category,
            content: row.content,
            order_id: row.order_id,
            status: CaseStatus::from_stored(&row.status),
            created_at: row.created_at,
            closed_at: row.closed_at,
        }
    }
}

/// Case creation payload.
///
/// Missing fields deserialize to empty values so that they are reported as
/// validation failures rather than decode errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NewCase {
    #[validate(range(min = 1))]
    pub customer_id: i64,

    #[validate(custom(function = "crate::validation::not_blank"), length(max = 200))]
    pub title: String,

    #[validate(custom(function = "crate::validation::not_blank"), length(max = 100))]
    pub category: String,

    #[validate(custom(function = "crate::validation::not_blank"), length(max = 10000))]
    pub content: String,

    #[validate(range(min = 1))]
    pub order_id: Option<i64>,
}

/// Live load of a single agent, computed from open cases at read time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AgentLoad {
    pub agent_id: AgentId,
    pub online: bool,
    pub active_cases: i64,
}
