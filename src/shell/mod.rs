//! The internal shell: validation and dispatch of model-proposed commands.
//!
//! A command line goes through three stages:
//! 1. **Lexing** — backtick stripping and quote-aware tokenization
//!    ([`lexer`]).
//! 2. **Validation** — any token from the forbidden-operator set fails the
//!    line before anything executes ([`validate_command_line`]).
//! 3. **Dispatch** — the first token selects one of the seven whitelisted
//!    handlers; anything else is rejected.
//!
//! Handler runtime failures (missing path, not a directory, …) are caught at
//! this boundary and returned as observation text so the agent loop can feed
//! them back to the model instead of crashing.

pub mod commands;
pub mod lexer;

use crate::error::ShellError;
use crate::fs::VirtualFs;
use crate::state::AgentState;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use commands::{
    ChangeDirectory, ListDirectory, MakeDirectory, Move, PrintWorkingDirectory, Remove, Tree,
};

/// Shell operators that are never executed. A line containing any of these
/// as a token fails validation outright.
pub const FORBIDDEN_OPERATORS: [&str; 9] = ["|", "||", "&", "&&", ">", ">>", "<", "<<", ";"];

/// One whitelisted command handler.
///
/// Handlers are stateless; the shared filesystem and session cursor are
/// passed in at execution time by the shell that owns them. Runtime failures
/// come back as `Err` and are converted to observation text by the caller.
pub trait Command {
    /// The verb this handler binds to (`cd`, `ls`, ...).
    fn name(&self) -> &'static str;

    /// Run with the arguments that followed the verb.
    fn execute(
        &self,
        args: &[String],
        fs: &mut VirtualFs,
        state: &mut AgentState,
    ) -> anyhow::Result<String>;
}

/// Lex and validate a raw command line.
///
/// Backticks are stripped, the line is tokenized, and the token sequence is
/// checked against [`FORBIDDEN_OPERATORS`]. On success the tokens come back
/// unchanged, ready for dispatch. Stateless; safe to call from anywhere.
pub fn validate_command_line(raw: &str) -> Result<Vec<String>, ShellError> {
    let tokens = lexer::tokenize(lexer::strip_backticks(raw));
    if let Some(operator) = tokens
        .iter()
        .find(|token| FORBIDDEN_OPERATORS.contains(&token.as_str()))
    {
        tracing::debug!(%operator, "rejected command line");
        return Err(ShellError::Forbidden {
            token: operator.clone(),
        });
    }
    Ok(tokens)
}

/// Validated execution channel for the seven filesystem-navigation verbs.
///
/// The shell binds one [`VirtualFs`] and one [`AgentState`] at construction;
/// every handler sees the same pair, so `cd` changes what a later `ls` or
/// `pwd` observes. Cloning a shell is shallow — the clone shares the same
/// filesystem and cursor and merely rebuilds its (stateless) handler table.
pub struct InternalShell {
    filesystem: Rc<RefCell<VirtualFs>>,
    state: Rc<RefCell<AgentState>>,
    commands: HashMap<&'static str, Box<dyn Command>>,
}

impl InternalShell {
    pub fn new(filesystem: Rc<RefCell<VirtualFs>>, state: Rc<RefCell<AgentState>>) -> Self {
        let handlers: [Box<dyn Command>; 7] = [
            Box::new(ChangeDirectory),
            Box::new(ListDirectory),
            Box::new(MakeDirectory),
            Box::new(Move),
            Box::new(PrintWorkingDirectory),
            Box::new(Remove),
            Box::new(Tree),
        ];
        let commands = handlers
            .into_iter()
            .map(|handler| (handler.name(), handler))
            .collect();
        Self {
            filesystem,
            state,
            commands,
        }
    }

    /// Fresh shell over a brand-new filesystem and session cursor.
    pub fn with_fresh_resources() -> Self {
        Self::new(
            Rc::new(RefCell::new(VirtualFs::new())),
            Rc::new(RefCell::new(AgentState::new())),
        )
    }

    /// The filesystem this shell is bound to.
    pub fn filesystem(&self) -> Rc<RefCell<VirtualFs>> {
        Rc::clone(&self.filesystem)
    }

    /// The session cursor this shell is bound to.
    pub fn state(&self) -> Rc<RefCell<AgentState>> {
        Rc::clone(&self.state)
    }

    /// Validate and execute one command line.
    ///
    /// `Err` is reserved for the two preventive classes (forbidden operator,
    /// unknown verb), which never execute anything. A handler that runs and
    /// fails yields `Ok` with the failure rendered as observation text.
    pub fn run(&self, raw: &str) -> Result<String, ShellError> {
        let tokens = validate_command_line(raw)?;
        let Some(verb) = tokens.first() else {
            return Err(ShellError::UnknownCommand {
                verb: String::new(),
            });
        };
        let Some(command) = self.commands.get(verb.as_str()) else {
            return Err(ShellError::UnknownCommand { verb: verb.clone() });
        };
        tracing::debug!(%verb, args = tokens.len() - 1, "dispatching command");
        let mut fs = self.filesystem.borrow_mut();
        let mut state = self.state.borrow_mut();
        match command.execute(&tokens[1..], &mut fs, &mut state) {
            Ok(observation) => Ok(observation),
            // Executed, then failed: degrade to feedback the model can react
            // to rather than a hard fault.
            Err(err) => Ok(err.to_string()),
        }
    }
}

impl Clone for InternalShell {
    fn clone(&self) -> Self {
        Self::new(Rc::clone(&self.filesystem), Rc::clone(&self.state))
    }
}
