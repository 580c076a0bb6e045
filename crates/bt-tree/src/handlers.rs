//! Externally supplied callbacks that leaves and `Selector` nodes dispatch to.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bt_core::Blackboard;

use crate::registry::TreeRegistry;

pub type ActionHandler = Arc<dyn Fn(&mut Blackboard) -> bool + Send + Sync>;
pub type ConditionHandler = Arc<dyn Fn(&Blackboard) -> bool + Send + Sync>;
/// Receives the candidate child slugs in declared order and returns the one to run.
pub type SelectorHandler =
    Arc<dyn Fn(&[String], &Blackboard, &TreeRegistry) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Action,
    Condition,
    Selector,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Action => "action",
            Self::Condition => "condition",
            Self::Selector => "selector",
        })
    }
}

/// Three independently keyed handler tables.
///
/// Populate it before the first tick, then share it (behind an `Arc`) with any number of trees.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    actions: BTreeMap<String, ActionHandler>,
    conditions: BTreeMap<String, ConditionHandler>,
    selectors: BTreeMap<String, SelectorHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_action(
        &mut self,
        key: impl Into<String>,
        handler: impl Fn(&mut Blackboard) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.actions.insert(key.into(), Arc::new(handler));
        self
    }

    pub fn register_condition(
        &mut self,
        key: impl Into<String>,
        handler: impl Fn(&Blackboard) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.conditions.insert(key.into(), Arc::new(handler));
        self
    }

    pub fn register_selector(
        &mut self,
        key: impl Into<String>,
        handler: impl Fn(&[String], &Blackboard, &TreeRegistry) -> String + Send + Sync + 'static,
    ) -> &mut Self {
        self.selectors.insert(key.into(), Arc::new(handler));
        self
    }

    pub fn action(&self, key: &str) -> Option<&ActionHandler> {
        self.actions.get(key)
    }

    pub fn condition(&self, key: &str) -> Option<&ConditionHandler> {
        self.conditions.get(key)
    }

    pub fn selector(&self, key: &str) -> Option<&SelectorHandler> {
        self.selectors.get(key)
    }

    pub fn contains(&self, kind: HandlerKind, key: &str) -> bool {
        match kind {
            HandlerKind::Action => self.actions.contains_key(key),
            HandlerKind::Condition => self.conditions.contains_key(key),
            HandlerKind::Selector => self.selectors.contains_key(key),
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("conditions", &self.conditions.keys().collect::<Vec<_>>())
            .field("selectors", &self.selectors.keys().collect::<Vec<_>>())
            .finish()
    }
}
