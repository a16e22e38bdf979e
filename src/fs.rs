//! In-memory virtual filesystem shared by the shell command handlers.
//!
//! The tree is deliberately small: directories and text files, addressed by
//! normalized absolute paths. Handlers resolve model-proposed paths against
//! the session cursor with [`VirtualFs::resolve`] before touching the tree.

use anyhow::{bail, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    File { content: String },
    Directory { children: BTreeMap<String, Node> },
}

impl Node {
    fn empty_dir() -> Self {
        Node::Directory {
            children: BTreeMap::new(),
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }
}

/// One directory entry as reported by [`VirtualFs::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// An in-memory directory tree rooted at `/`.
#[derive(Debug, Clone)]
pub struct VirtualFs {
    root: Node,
}

impl VirtualFs {
    pub fn new() -> Self {
        Self {
            root: Node::empty_dir(),
        }
    }

    /// Resolve `path` against `base`, normalizing `.` and `..` components.
    /// `base` must be absolute; the result always is. Pure path math, no tree
    /// lookup — a resolved path may well not exist.
    pub fn resolve(base: &str, path: &str) -> String {
        let mut components: Vec<&str> = if path.starts_with('/') {
            Vec::new()
        } else {
            base.split('/').filter(|c| !c.is_empty()).collect()
        };
        for component in path.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    components.pop();
                }
                name => components.push(name),
            }
        }
        if components.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", components.join("/"))
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.node(path).map(Node::is_dir).unwrap_or(false)
    }

    /// Entries of a directory, sorted by name.
    pub fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        match self.node(path) {
            Some(Node::Directory { children }) => Ok(children
                .iter()
                .map(|(name, node)| DirEntry {
                    name: name.clone(),
                    is_dir: node.is_dir(),
                })
                .collect()),
            Some(Node::File { .. }) => bail!("{}: Not a directory", path),
            None => bail!("{}: No such file or directory", path),
        }
    }

    /// Create a directory. The parent must already exist and the target must
    /// not.
    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        if self.exists(path) {
            bail!("{}: File exists", path);
        }
        let (parent, name) = split_parent(path)?;
        match self.node_mut(&parent) {
            Some(Node::Directory { children }) => {
                children.insert(name, Node::empty_dir());
                Ok(())
            }
            Some(Node::File { .. }) => bail!("{}: Not a directory", parent),
            None => bail!("{}: No such file or directory", parent),
        }
    }

    /// Create or overwrite a file. The parent directory must exist.
    pub fn write_file(&mut self, path: &str, content: &str) -> Result<()> {
        if self.is_dir(path) {
            bail!("{}: Is a directory", path);
        }
        let (parent, name) = split_parent(path)?;
        match self.node_mut(&parent) {
            Some(Node::Directory { children }) => {
                children.insert(
                    name,
                    Node::File {
                        content: content.to_string(),
                    },
                );
                Ok(())
            }
            Some(Node::File { .. }) => bail!("{}: Not a directory", parent),
            None => bail!("{}: No such file or directory", parent),
        }
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        match self.node(path) {
            Some(Node::File { content }) => Ok(content.clone()),
            Some(Node::Directory { .. }) => bail!("{}: Is a directory", path),
            None => bail!("{}: No such file or directory", path),
        }
    }

    /// Remove a file, or a directory when `recursive` is set.
    pub fn remove(&mut self, path: &str, recursive: bool) -> Result<()> {
        match self.node(path) {
            None => bail!("{}: No such file or directory", path),
            Some(Node::Directory { .. }) if !recursive => {
                bail!("{}: Is a directory", path)
            }
            Some(_) => {}
        }
        let (parent, name) = split_parent(path)?;
        if let Some(Node::Directory { children }) = self.node_mut(&parent) {
            children.remove(&name);
        }
        Ok(())
    }

    /// Move `src` to `dst`. When `dst` is an existing directory, `src` is
    /// moved into it under its own name.
    pub fn rename(&mut self, src: &str, dst: &str) -> Result<()> {
        if !self.exists(src) {
            bail!("{}: No such file or directory", src);
        }
        let dst = if self.is_dir(dst) {
            let (_, name) = split_parent(src)?;
            Self::resolve(dst, &name)
        } else {
            dst.to_string()
        };
        if src == dst {
            return Ok(());
        }
        if dst.starts_with(&format!("{}/", src)) {
            bail!("cannot move '{}' into itself", src);
        }
        if self.exists(&dst) {
            bail!("{}: File exists", dst);
        }
        let (dst_parent, dst_name) = split_parent(&dst)?;
        if !self.is_dir(&dst_parent) {
            bail!("{}: No such file or directory", dst_parent);
        }
        let (src_parent, src_name) = split_parent(src)?;
        let node = match self.node_mut(&src_parent) {
            Some(Node::Directory { children }) => children.remove(&src_name),
            _ => None,
        };
        let Some(node) = node else {
            bail!("{}: No such file or directory", src);
        };
        if let Some(Node::Directory { children }) = self.node_mut(&dst_parent) {
            children.insert(dst_name, node);
        }
        Ok(())
    }

    fn node(&self, path: &str) -> Option<&Node> {
        let mut node = &self.root;
        for component in path.split('/').filter(|c| !c.is_empty()) {
            match node {
                Node::Directory { children } => node = children.get(component)?,
                Node::File { .. } => return None,
            }
        }
        Some(node)
    }

    fn node_mut(&mut self, path: &str) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for component in path.split('/').filter(|c| !c.is_empty()) {
            match node {
                Node::Directory { children } => node = children.get_mut(component)?,
                Node::File { .. } => return None,
            }
        }
        Some(node)
    }
}

impl Default for VirtualFs {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a normalized absolute path into its parent path and final name.
/// The root has no parent.
fn split_parent(path: &str) -> Result<(String, String)> {
    let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    let Some((name, parents)) = components.split_last() else {
        bail!("cannot operate on the filesystem root");
    };
    let parent = if parents.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parents.join("/"))
    };
    Ok((parent, name.to_string()))
}
