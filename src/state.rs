//! Per-session agent state.
//!
//! One instance per session, shared with the internal shell so that `cd`
//! changes the directory seen by subsequent `ls`/`pwd`/`tree` calls.

/// Mutable cursor into the virtual filesystem for one agent session.
///
/// Never share an `AgentState` across sessions; each session owns its own
/// cursor (and its own [`crate::TraceMemory`]).
#[derive(Debug, Clone)]
pub struct AgentState {
    current_directory: String,
}

impl AgentState {
    /// A fresh session starts at the filesystem root.
    pub fn new() -> Self {
        Self {
            current_directory: "/".to_string(),
        }
    }

    pub fn current_directory(&self) -> &str {
        &self.current_directory
    }

    pub fn set_current_directory(&mut self, path: impl Into<String>) {
        self.current_directory = path.into();
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new()
    }
}
