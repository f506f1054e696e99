//! Plain data rows written by output backends.

use abm_agent::Agent;
use abm_core::Tick;

/// One agent as published at a given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshotRow {
    pub tick:     u64,
    pub agent_id: u32,
    pub kind:     String,
    pub x:        i32,
    pub y:        i32,
    /// The agent's attribute bag as `key=value` pairs joined by `;`, in key
    /// order.  Empty for agents without attributes.
    pub state:    String,
}

impl AgentSnapshotRow {
    pub fn from_agent(tick: Tick, agent: &Agent) -> Self {
        let state = agent
            .state
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";");
        Self {
            tick:     tick.0,
            agent_id: agent.id().0,
            kind:     agent.kind.clone(),
            x:        agent.position.x,
            y:        agent.position.y,
            state,
        }
    }
}

/// Per-tick counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:   u64,
    pub agents: u64,
    /// Agent and cell updates that ran to produce this tick.
    pub units:  u64,
}

/// One model statistic at one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticRow {
    pub tick:  u64,
    pub name:  String,
    pub value: f64,
}
