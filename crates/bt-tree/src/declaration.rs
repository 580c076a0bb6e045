//! The declarative description of a tree, as loaded from JSON.

use serde::{Deserialize, Serialize};

use crate::error::TreeResult;

/// One declared node and, recursively, its children.
///
/// Records may carry extra descriptive fields (`goal`, `parameters`, `parentNodeSlug`, ...); they
/// are ignored. `null` handler keys are treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDeclaration {
    pub slug: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub children: Vec<NodeDeclaration>,

    /// Read by a parent `ProbabilitySelector`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// Try count for `LimitTries`, seconds for `LimitTime`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector_handler: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_handler: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_handler: Option<String>,

    #[serde(default, rename = "nodeName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NodeDeclaration {
    pub fn new(slug: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            kind: kind.into(),
            children: Vec::new(),
            weight: None,
            limit: None,
            selector_handler: None,
            action_handler: None,
            condition_handler: None,
            name: None,
            description: None,
        }
    }

    pub fn action(slug: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new(slug, "Action").with_action_handler(handler)
    }

    pub fn condition(slug: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new(slug, "Condition").with_condition_handler(handler)
    }

    pub fn from_json(json: &str) -> TreeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> TreeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_child(mut self, child: NodeDeclaration) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeDeclaration>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_limit(mut self, limit: f64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_selector_handler(mut self, key: impl Into<String>) -> Self {
        self.selector_handler = Some(key.into());
        self
    }

    pub fn with_action_handler(mut self, key: impl Into<String>) -> Self {
        self.action_handler = Some(key.into());
        self
    }

    pub fn with_condition_handler(mut self, key: impl Into<String>) -> Self {
        self.condition_handler = Some(key.into());
        self
    }

    /// Number of declarations in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NodeDeclaration::count).sum::<usize>()
    }
}
