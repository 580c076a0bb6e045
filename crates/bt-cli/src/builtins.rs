//! Handlers available to trees run from the command line.

use bt_core::{entropy_seed, Blackboard, DeterministicRng, SplitMix64};
use bt_tree::HandlerRegistry;
use tracing::info;

/// Blackboard path of the generator behind the `coin` action.
pub const COIN_RNG: &str = "treely.coin.rng";

pub fn registry() -> HandlerRegistry {
    let mut handlers = HandlerRegistry::new();
    handlers
        .register_action("succeed", |_| true)
        .register_action("fail", |_| false)
        .register_action("coin", flip_coin)
        .register_action("do a test action", |_| {
            info!("running an action");
            true
        })
        .register_condition("always", |_| true)
        .register_condition("never", |_| false)
        .register_condition("do a test condition", |_| {
            info!("running a condition");
            true
        })
        .register_selector("first", |choices, _, _| first(choices))
        .register_selector("last", |choices, _, _| {
            choices.last().cloned().unwrap_or_default()
        })
        .register_selector("do a test selector", |choices, _, _| first(choices));
    handlers
}

/// Seed the `coin` action so runs with the same seed flip the same way.
pub fn seed_coin(blackboard: &mut Blackboard, seed: u64) {
    blackboard.store(COIN_RNG, SplitMix64::new(seed));
}

fn flip_coin(blackboard: &mut Blackboard) -> bool {
    if !blackboard.contains(COIN_RNG) {
        seed_coin(blackboard, entropy_seed());
    }
    blackboard
        .fetch_mut::<SplitMix64>(COIN_RNG)
        .is_some_and(|rng| rng.next_bool())
}

fn first(choices: &[String]) -> String {
    choices.first().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_demo_handler_is_registered() {
        use bt_tree::HandlerKind;

        let handlers = registry();
        for key in ["succeed", "fail", "coin", "do a test action"] {
            assert!(handlers.contains(HandlerKind::Action, key), "{key}");
        }
        for key in ["always", "never", "do a test condition"] {
            assert!(handlers.contains(HandlerKind::Condition, key), "{key}");
        }
        for key in ["first", "last", "do a test selector"] {
            assert!(handlers.contains(HandlerKind::Selector, key), "{key}");
        }
    }

    #[test]
    fn seeded_coin_repeats() {
        let flips = |seed| {
            let mut bb = Blackboard::new();
            seed_coin(&mut bb, seed);
            (0..32).map(|_| flip_coin(&mut bb)).collect::<Vec<_>>()
        };
        assert_eq!(flips(9), flips(9));
        assert!(flips(9).iter().any(|&f| f));
        assert!(flips(9).iter().any(|&f| !f));
    }
}
