//! The seven whitelisted command handlers.
//!
//! Each handler resolves its path arguments against the session cursor and
//! operates on the shared [`VirtualFs`]. Observation text is written for the
//! model: short confirmations on success, unix-flavored messages on failure.

use anyhow::{bail, Result};

use super::Command;
use crate::fs::VirtualFs;
use crate::state::AgentState;

// ============================================================================
// cd
// ============================================================================

pub struct ChangeDirectory;

impl Command for ChangeDirectory {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(
        &self,
        args: &[String],
        fs: &mut VirtualFs,
        state: &mut AgentState,
    ) -> Result<String> {
        let target = match args.first() {
            Some(path) => VirtualFs::resolve(state.current_directory(), path),
            None => "/".to_string(),
        };
        if !fs.exists(&target) {
            bail!("cd: {}: No such file or directory", target);
        }
        if !fs.is_dir(&target) {
            bail!("cd: {}: Not a directory", target);
        }
        state.set_current_directory(target.clone());
        Ok(format!("Successfully changed working directory to {target}"))
    }
}

// ============================================================================
// ls
// ============================================================================

pub struct ListDirectory;

impl Command for ListDirectory {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn execute(
        &self,
        args: &[String],
        fs: &mut VirtualFs,
        state: &mut AgentState,
    ) -> Result<String> {
        // Flags like -la are accepted and ignored; the listing always shows
        // every entry.
        let paths: Vec<&String> = args.iter().filter(|a| !a.starts_with('-')).collect();
        let target = match paths.first() {
            Some(path) => VirtualFs::resolve(state.current_directory(), path),
            None => state.current_directory().to_string(),
        };
        let entries = fs
            .list(&target)
            .map_err(|e| anyhow::anyhow!("ls: {e}"))?;
        if entries.is_empty() {
            return Ok(format!("{target} is empty"));
        }
        Ok(entries
            .iter()
            .map(|entry| {
                if entry.is_dir {
                    format!("{}/", entry.name)
                } else {
                    entry.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

// ============================================================================
// mkdir
// ============================================================================

pub struct MakeDirectory;

impl Command for MakeDirectory {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn execute(
        &self,
        args: &[String],
        fs: &mut VirtualFs,
        state: &mut AgentState,
    ) -> Result<String> {
        if args.is_empty() {
            bail!("mkdir: missing operand");
        }
        let mut created = Vec::new();
        for arg in args {
            let target = VirtualFs::resolve(state.current_directory(), arg);
            fs.mkdir(&target).map_err(|e| anyhow::anyhow!("mkdir: {e}"))?;
            created.push(target);
        }
        Ok(format!(
            "Successfully created directory {}",
            created.join(", ")
        ))
    }
}

// ============================================================================
// mv
// ============================================================================

pub struct Move;

impl Command for Move {
    fn name(&self) -> &'static str {
        "mv"
    }

    fn execute(
        &self,
        args: &[String],
        fs: &mut VirtualFs,
        state: &mut AgentState,
    ) -> Result<String> {
        let [src, dst] = args else {
            bail!("mv: expected exactly two operands: mv <source> <destination>");
        };
        let src = VirtualFs::resolve(state.current_directory(), src);
        let dst = VirtualFs::resolve(state.current_directory(), dst);
        fs.rename(&src, &dst).map_err(|e| anyhow::anyhow!("mv: {e}"))?;
        Ok(format!("Successfully moved {src} to {dst}"))
    }
}

// ============================================================================
// pwd
// ============================================================================

pub struct PrintWorkingDirectory;

impl Command for PrintWorkingDirectory {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn execute(
        &self,
        _args: &[String],
        _fs: &mut VirtualFs,
        state: &mut AgentState,
    ) -> Result<String> {
        Ok(state.current_directory().to_string())
    }
}

// ============================================================================
// rm
// ============================================================================

pub struct Remove;

impl Command for Remove {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn execute(
        &self,
        args: &[String],
        fs: &mut VirtualFs,
        state: &mut AgentState,
    ) -> Result<String> {
        let recursive = args
            .iter()
            .any(|a| matches!(a.as_str(), "-r" | "-R" | "-rf" | "-fr"));
        let paths: Vec<&String> = args.iter().filter(|a| !a.starts_with('-')).collect();
        if paths.is_empty() {
            bail!("rm: missing operand");
        }
        let mut removed = Vec::new();
        for path in paths {
            let target = VirtualFs::resolve(state.current_directory(), path);
            fs.remove(&target, recursive)
                .map_err(|e| anyhow::anyhow!("rm: {e}"))?;
            removed.push(target);
        }
        Ok(format!("Successfully removed {}", removed.join(", ")))
    }
}

// ============================================================================
// tree
// ============================================================================

pub struct Tree;

impl Command for Tree {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn execute(
        &self,
        args: &[String],
        fs: &mut VirtualFs,
        state: &mut AgentState,
    ) -> Result<String> {
        let target = match args.first() {
            Some(path) => VirtualFs::resolve(state.current_directory(), path),
            None => state.current_directory().to_string(),
        };
        if !fs.is_dir(&target) {
            bail!("tree: {}: No such directory", target);
        }
        let mut lines = vec![target.clone()];
        let mut dirs = 0usize;
        let mut files = 0usize;
        walk(fs, &target, 1, &mut lines, &mut dirs, &mut files)?;
        lines.push(format!("\n{dirs} directories, {files} files"));
        Ok(lines.join("\n"))
    }
}

fn walk(
    fs: &VirtualFs,
    path: &str,
    depth: usize,
    lines: &mut Vec<String>,
    dirs: &mut usize,
    files: &mut usize,
) -> Result<()> {
    for entry in fs.list(path)? {
        let indent = "  ".repeat(depth);
        let child = VirtualFs::resolve(path, &entry.name);
        if entry.is_dir {
            *dirs += 1;
            lines.push(format!("{indent}{}/", entry.name));
            walk(fs, &child, depth + 1, lines, dirs, files)?;
        } else {
            *files += 1;
            lines.push(format!("{indent}{}", entry.name));
        }
    }
    Ok(())
}
