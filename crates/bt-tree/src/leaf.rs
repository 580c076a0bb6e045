//! Leaves dispatch to registered handlers. Handler panics are not caught.

use crate::catalog::LeafKind;
use crate::error::{TreeError, TreeResult};
use crate::handlers::HandlerKind;
use crate::tree::BehaviorTree;

impl BehaviorTree {
    pub(crate) fn evaluate_leaf(&mut self, idx: usize, kind: LeafKind) -> TreeResult<bool> {
        let declaration = self.registry.entry(idx).declaration();

        match kind {
            LeafKind::Action => {
                let key = declaration.action_handler.as_deref().unwrap_or_default();
                let handler = self.handlers.action(key).cloned().ok_or_else(|| {
                    TreeError::HandlerNotFound {
                        kind: HandlerKind::Action,
                        key: key.to_string(),
                    }
                })?;
                Ok(handler(&mut self.blackboard))
            }
            LeafKind::Condition => {
                let key = declaration.condition_handler.as_deref().unwrap_or_default();
                let handler = self.handlers.condition(key).cloned().ok_or_else(|| {
                    TreeError::HandlerNotFound {
                        kind: HandlerKind::Condition,
                        key: key.to_string(),
                    }
                })?;
                Ok(handler(&self.blackboard))
            }
        }
    }
}
