//! Trace memory and a whitelisted internal shell for LLM-driven agents.
//!
//! Two mechanisms make up the crate:
//! - **Trace memory** ([`TraceMemory`]): the ordered history of what the agent
//!   has done, plus its current objective and note, rendered into a
//!   token-budgeted context string with a structural recency bias (the newest
//!   actions are always the last to be dropped).
//! - **Internal shell** ([`InternalShell`]): a validated execution channel for
//!   the filesystem-navigation commands the model proposes. Only seven verbs
//!   are recognized (`cd`, `ls`, `mkdir`, `mv`, `pwd`, `rm`, `tree`) and any
//!   line containing piping, redirection or command chaining is rejected
//!   before it reaches a handler.
//!
//! Everything is synchronous and single-threaded; one agent session owns one
//! [`TraceMemory`], one [`VirtualFs`] and one [`AgentState`]. The crate is
//! meant to be driven by an outer agent control loop and ships no binary.

pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod shell;
pub mod state;

pub use config::MemoryConfig;
pub use error::{MemoryError, ShellError};
pub use fs::VirtualFs;
pub use memory::store::{SessionStore, SqliteSessionStore};
pub use memory::TraceMemory;
pub use shell::InternalShell;
pub use state::AgentState;
