//! The `Agent` record.

use abm_core::{AgentId, Position};

use crate::AgentState;

/// One simulated entity.
///
/// `id` is fixed at creation.  `kind` is a model-defined label (e.g. `"prey"`,
/// `"tree"`, `"red"`) used for grouping, export, and termination checks.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub(crate) id: AgentId,
    pub kind:      String,
    pub position:  Position,
    pub state:     AgentState,
}

impl Agent {
    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// `true` when the agent's kind label equals `kind`.
    #[inline]
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}
