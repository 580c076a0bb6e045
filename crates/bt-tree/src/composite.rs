//! Child-selection strategies for composite nodes.

use bt_core::DeterministicRng;

use crate::catalog::CompositeKind;
use crate::error::{TreeError, TreeResult};
use crate::handlers::HandlerKind;
use crate::tree::BehaviorTree;

impl BehaviorTree {
    pub(crate) fn evaluate_composite(&mut self, idx: usize, kind: CompositeKind) -> TreeResult<bool> {
        let children = self.registry.entry(idx).children().to_vec();

        match kind {
            CompositeKind::Sequence => self.run_in_order(&children),
            CompositeKind::Parallel => {
                // Every child runs, even after a failure.
                let mut success = true;
                for &child in &children {
                    success &= self.evaluate_index(child)?;
                }
                Ok(success)
            }
            CompositeKind::Selector => {
                let chosen = self.select_with_handler(idx)?;
                self.evaluate_index(chosen)
            }
            CompositeKind::RandomSelector => {
                let chosen = children[self.rng.next_below(children.len())];
                self.evaluate_index(chosen)
            }
            CompositeKind::ProbabilitySelector => {
                let weights: Vec<f64> = children
                    .iter()
                    .map(|&c| self.registry.entry(c).declaration().weight.unwrap_or(0.0))
                    .collect();
                let pos = weighted_choice(&weights, self.rng.next_f64_unit()).ok_or_else(|| {
                    TreeError::InvalidWeights {
                        slug: self.registry.entry(idx).slug().to_string(),
                        total: weights.iter().sum(),
                    }
                })?;
                self.evaluate_index(children[pos])
            }
            CompositeKind::RandomSequence => {
                let mut order = children;
                self.rng.shuffle(&mut order);
                self.run_in_order(&order)
            }
        }
    }

    fn run_in_order(&mut self, children: &[usize]) -> TreeResult<bool> {
        for &child in children {
            if !self.evaluate_index(child)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn select_with_handler(&self, idx: usize) -> TreeResult<usize> {
        let entry = self.registry.entry(idx);
        let key = entry
            .declaration()
            .selector_handler
            .as_deref()
            .unwrap_or_default();
        let handler = self
            .handlers
            .selector(key)
            .cloned()
            .ok_or_else(|| TreeError::HandlerNotFound {
                kind: HandlerKind::Selector,
                key: key.to_string(),
            })?;

        let candidates = entry.declaration().children.as_slice();
        let chosen = handler(candidates, &self.blackboard, &self.registry);

        candidates
            .iter()
            .position(|slug| *slug == chosen)
            .map(|pos| entry.children()[pos])
            .ok_or_else(|| TreeError::InvalidSelection {
                slug: entry.slug().to_string(),
                chosen,
            })
    }
}

/// Pick an index with probability proportional to its weight.
///
/// `unit` is a uniform draw from `[0, 1)`, scaled onto `[0, total)`. The first candidate whose
/// cumulative upper bound reaches the draw wins, so ties go to the earlier candidate. Zero-weight
/// candidates are never chosen. Returns `None` when the total weight is not positive.
pub fn weighted_choice(weights: &[f64], unit: f64) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return None;
    }

    let r = unit * total;
    let mut upto = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        if upto + w >= r {
            return Some(i);
        }
        upto += w;
    }

    // Rounding can leave `r` a hair above the final sum.
    weights.iter().rposition(|&w| w > 0.0)
}
