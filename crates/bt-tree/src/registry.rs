use std::collections::BTreeMap;

use crate::catalog::{NodeKind, RuntimeNode};

/// A declaration with its kind resolved and its children referenced by slug.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredNode {
    pub slug: String,
    pub kind: NodeKind,
    pub children: Vec<String>,
    pub weight: Option<f64>,
    pub limit: Option<f64>,
    pub selector_handler: Option<String>,
    pub action_handler: Option<String>,
    pub condition_handler: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub(crate) declaration: DeclaredNode,
    pub(crate) node: RuntimeNode,
    /// Registry indices of `declaration.children`, same order.
    pub(crate) children: Vec<usize>,
}

impl TreeEntry {
    pub fn declaration(&self) -> &DeclaredNode {
        &self.declaration
    }

    pub fn node(&self) -> &RuntimeNode {
        &self.node
    }

    pub fn slug(&self) -> &str {
        &self.declaration.slug
    }

    pub(crate) fn children(&self) -> &[usize] {
        &self.children
    }
}

/// Slug-indexed (declaration, runtime node) pairs. Built once by the assembler; never resized.
///
/// Entries are stored in depth-first pre-order, so the root is always at index 0.
#[derive(Debug, Clone)]
pub struct TreeRegistry {
    entries: Vec<TreeEntry>,
    index: BTreeMap<String, usize>,
}

impl TreeRegistry {
    pub(crate) fn from_parts(entries: Vec<TreeEntry>, index: BTreeMap<String, usize>) -> Self {
        Self { entries, index }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.index.contains_key(slug)
    }

    pub fn get(&self, slug: &str) -> Option<&TreeEntry> {
        self.index.get(slug).map(|&i| &self.entries[i])
    }

    pub fn declaration(&self, slug: &str) -> Option<&DeclaredNode> {
        self.get(slug).map(TreeEntry::declaration)
    }

    pub fn node(&self, slug: &str) -> Option<&RuntimeNode> {
        self.get(slug).map(TreeEntry::node)
    }

    pub fn root(&self) -> &TreeEntry {
        &self.entries[0]
    }

    /// Entries in depth-first declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(TreeEntry::slug)
    }

    pub(crate) fn index_of(&self, slug: &str) -> Option<usize> {
        self.index.get(slug).copied()
    }

    pub(crate) fn entry(&self, idx: usize) -> &TreeEntry {
        &self.entries[idx]
    }

    pub(crate) fn entry_mut(&mut self, idx: usize) -> &mut TreeEntry {
        &mut self.entries[idx]
    }
}
