//! Directory catalog.
//!
//! While scanning, directories are kept flat, keyed by the file offset of
//! their key record (the root directory by `fBEGIN`). Each node knows its
//! parent offset and the `(name, key offset)` pairs filed under it. Once the
//! scan is done the flat form is turned into a [`Directory`] tree holding
//! only the branches that lead to content.

use std::collections::{BTreeMap, HashMap, HashSet};

/// One directory level in scan order.
#[derive(Debug, Clone, Default)]
pub struct DirNode {
    /// Directory name (empty for the file's top level).
    pub name: String,
    /// Offset of the parent directory; `None` for the top level.
    pub parent: Option<u64>,
    /// Objects filed here, as `(name, key offset)`.
    pub content: Vec<(String, u64)>,
}

/// Flat directory index built during the scan.
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    root: u64,
    nodes: BTreeMap<u64, DirNode>,
}

/// A directory with its content-bearing subdirectories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    /// Directory name (empty for the top level).
    pub name: String,
    /// Subdirectories that contain objects somewhere below them.
    pub children: Vec<Directory>,
    /// Objects in this directory, as `(name, key offset)`.
    pub content: Vec<(String, u64)>,
}

impl DirectoryIndex {
    /// Index with only the top-level directory at `root`.
    pub fn new(root: u64) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(root, DirNode::default());
        Self { root, nodes }
    }

    /// The directory at `seek` if known, the top level otherwise.
    pub fn resolve(&self, seek: u64) -> u64 {
        if self.nodes.contains_key(&seek) {
            seek
        } else {
            self.root
        }
    }

    /// Register a directory key found at `offset` inside `parent_seek`.
    pub fn add_directory(&mut self, offset: u64, name: &str, parent_seek: u64) {
        if offset == self.root {
            return;
        }
        let parent = self.resolve(parent_seek);
        self.nodes.insert(
            offset,
            DirNode { name: name.to_string(), parent: Some(parent), content: Vec::new() },
        );
    }

    /// Content list of the directory at `dir` (which must come from [`resolve`](Self::resolve)).
    pub fn content_mut(&mut self, dir: u64) -> &mut Vec<(String, u64)> {
        &mut self.nodes.entry(dir).or_default().content
    }

    /// Build the directory tree, keeping only directories that hold content
    /// themselves or have a descendant that does.
    pub fn build(&self) -> Directory {
        let mut live: HashSet<u64> = HashSet::new();
        for (&offset, node) in &self.nodes {
            if node.content.is_empty() {
                continue;
            }
            let mut cur = Some(offset);
            while let Some(o) = cur {
                if !live.insert(o) {
                    break;
                }
                cur = self.nodes.get(&o).and_then(|n| n.parent);
            }
        }

        let mut children: HashMap<u64, Vec<u64>> = HashMap::new();
        for (&offset, node) in &self.nodes {
            if let (true, Some(parent)) = (live.contains(&offset), node.parent) {
                children.entry(parent).or_default().push(offset);
            }
        }
        self.materialize(self.root, &children)
    }

    fn materialize(&self, offset: u64, children: &HashMap<u64, Vec<u64>>) -> Directory {
        let node = self.nodes.get(&offset).cloned().unwrap_or_default();
        Directory {
            name: node.name,
            content: node.content,
            children: children
                .get(&offset)
                .map(|c| c.iter().map(|&o| self.materialize(o, children)).collect())
                .unwrap_or_default(),
        }
    }
}

impl Directory {
    /// Whether there is nothing in this tree.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.children.is_empty()
    }

    /// Every object in the tree as `("dir/sub/name", key offset)`, depth first.
    pub fn flatten(&self) -> Vec<(String, u64)> {
        let mut out = Vec::new();
        self.collect("", &mut out);
        out
    }

    fn collect(&self, prefix: &str, out: &mut Vec<(String, u64)>) {
        for (name, offset) in &self.content {
            out.push((format!("{}{}", prefix, name), *offset));
        }
        for child in &self.children {
            child.collect(&format!("{}{}/", prefix, child.name), out);
        }
    }

    /// Key offset of the object at `path` (`"dir/sub/name"`).
    pub fn find(&self, path: &str) -> Option<u64> {
        let path = path.trim_start_matches('/');
        match path.split_once('/') {
            Some((dir, rest)) => {
                self.children.iter().find(|c| c.name == dir).and_then(|c| c.find(rest))
            }
            None => self.content.iter().find(|(name, _)| name == path).map(|(_, o)| *o),
        }
    }
}
