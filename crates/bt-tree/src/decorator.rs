//! Single-child lifecycle control. Decorators are the only nodes that may stop the tree.

use std::time::Duration;

use crate::catalog::{DecoratorKind, DecoratorState, NodeKind};
use crate::error::{TreeError, TreeResult};
use crate::tree::BehaviorTree;

impl BehaviorTree {
    pub(crate) fn evaluate_decorator(&mut self, idx: usize, kind: DecoratorKind) -> TreeResult<bool> {
        let entry = self.registry.entry(idx);
        let Some(&child) = entry.children().first() else {
            return Err(TreeError::malformed(entry.slug(), "decorator has no child"));
        };

        match kind {
            DecoratorKind::RepeatAlways | DecoratorKind::RepeatUntilFail => {
                let success = self.evaluate_index(child)?;
                if !success {
                    self.stop_tree(idx);
                }
                Ok(success)
            }
            DecoratorKind::RepeatUntilSuccess => {
                let success = self.evaluate_index(child)?;
                if success {
                    self.stop_tree(idx);
                }
                Ok(success)
            }
            DecoratorKind::Inverter => Ok(!self.evaluate_index(child)?),
            DecoratorKind::LimitTries => {
                if self.take_try(idx) {
                    self.evaluate_index(child)
                } else {
                    self.stop_tree(idx);
                    Ok(false)
                }
            }
            DecoratorKind::LimitTime => {
                if self.within_time(idx) {
                    self.evaluate_index(child)
                } else {
                    self.stop_tree(idx);
                    Ok(false)
                }
            }
            DecoratorKind::LimitSemaphore => Err(TreeError::Unsupported {
                slug: self.registry.entry(idx).slug().to_string(),
                kind: NodeKind::Decorator(kind),
            }),
        }
    }

    /// Consume one try if any remain.
    fn take_try(&mut self, idx: usize) -> bool {
        let entry = self.registry.entry_mut(idx);
        let limit = entry.declaration.limit.unwrap_or(0.0);
        match &mut entry.node.state {
            DecoratorState::Tries { tries, tries_limit } => {
                let tries_limit = *tries_limit.get_or_insert(limit);
                if f64::from(*tries) >= tries_limit {
                    false
                } else {
                    *tries += 1;
                    true
                }
            }
            _ => true,
        }
    }

    /// Start the timer on first use; report whether the limit has not yet elapsed.
    fn within_time(&mut self, idx: usize) -> bool {
        let now = self.clock.now();
        let entry = self.registry.entry_mut(idx);
        let limit = time_limit(entry.declaration.limit.unwrap_or(0.0));
        match &mut entry.node.state {
            DecoratorState::Time {
                started_at,
                time_limit,
            } => {
                let time_limit = *time_limit.get_or_insert(limit);
                let started_at = *started_at.get_or_insert(now);
                now.saturating_sub(started_at) < time_limit
            }
            _ => true,
        }
    }
}

/// Limits past what a `Duration` can hold never expire.
fn time_limit(secs: f64) -> Duration {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
