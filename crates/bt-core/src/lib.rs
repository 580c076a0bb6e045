//! Engine-agnostic behavior tree kernel primitives.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod clock;
pub mod rng;

pub use blackboard::Blackboard;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use rng::{entropy_seed, DeterministicRng, SplitMix64};
