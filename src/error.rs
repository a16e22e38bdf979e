//! Typed errors for the two preventive failure classes.
//!
//! Validation and dispatch failures happen *before* anything executes; the
//! caller can safely surface their messages to the model as an observation.
//! Handler runtime failures are a different class entirely — they are caught
//! at the shell boundary and turned into observation text, never into an
//! `Err` (see [`crate::shell::InternalShell::run`]).

use thiserror::Error;

/// Errors raised by [`crate::TraceMemory`] mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    /// `revert(n)` asked for more entries than the trace holds. The trace is
    /// left untouched; the request is never clamped.
    #[error("cannot revert {requested} steps: the trace only holds {available} entries")]
    HistoryUnderflow { requested: usize, available: usize },
}

/// Preventive errors raised by [`crate::InternalShell`] before execution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    /// The command line contained a shell operator. Nothing was executed.
    #[error(
        "'{token}' is not supported: piping, redirection and multiple commands \
         are unavailable, use exactly one command at a time, without semicolon"
    )]
    Forbidden { token: String },

    /// The verb is not one of the seven whitelisted commands.
    #[error("unknown command '{verb}': available commands are cd, ls, mkdir, mv, pwd, rm, tree")]
    UnknownCommand { verb: String },
}
