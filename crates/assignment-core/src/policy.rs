//! # Least-Connections Selection
//!
//! Decides which agent receives a new case given a snapshot of agent loads.
//!
//! Only online agents are eligible. Among them the agent with the fewest
//! active (non-closed) cases wins, and ties go to the lowest agent id so that
//! the same snapshot always yields the same agent. An empty eligible set
//! yields `None`, which callers surface as a no-capacity outcome.
//!
//! The policy is a pure function over the snapshot. Consistency of the
//! snapshot itself is the store's job.

use crate::types::{AgentId, AgentLoad};

/// Least-connections policy with lowest-id tie-break
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastConnections;

impl LeastConnections {
    /// Pick the agent for the next case, or `None` when nobody is online
    pub fn pick(loads: &[AgentLoad]) -> Option<AgentId> {
        loads
            .iter()
            .filter(|load| load.online)
            .min_by_key(|load| (load.active_cases, load.agent_id))
            .map(|load| load.agent_id)
    }
}
