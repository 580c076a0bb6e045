use std::sync::Arc;

use bt_core::Blackboard;
use bt_tools::{TraceLog, TRACE_LOG};
use bt_tree::{
    BehaviorTree, HandlerKind, HandlerRegistry, NodeDeclaration, TickOutcome, TreeConfig,
    TreeError,
};

const GO: &str = "test/go";
const HITS: &str = "test/hits";

fn handlers() -> HandlerRegistry {
    let mut handlers = HandlerRegistry::new();
    handlers
        .register_action("ok", |_| true)
        .register_action("fail", |_| false)
        .register_action("hit", |bb: &mut Blackboard| {
            let hits = bb.fetch::<u32>(HITS).copied().unwrap_or(0);
            bb.store(HITS, hits + 1);
            true
        })
        .register_condition("go", |bb: &Blackboard| {
            bb.fetch::<bool>(GO).copied().unwrap_or(false)
        });
    handlers
}

fn patrol() -> NodeDeclaration {
    NodeDeclaration::new("root", "RepeatAlways").with_child(
        NodeDeclaration::new("main", "Sequence").with_children([
            NodeDeclaration::condition("ready", "go"),
            NodeDeclaration::action("strike", "hit"),
        ]),
    )
}

#[test]
fn each_tick_stamps_the_pass_on_every_node_it_reaches() {
    let mut tree = BehaviorTree::new(&patrol(), Arc::new(handlers())).unwrap();
    tree.blackboard_mut().store(GO, true);

    for _ in 0..3 {
        assert_eq!(tree.tick().unwrap(), TickOutcome::Ticked(true));
    }

    assert_eq!(tree.root_evaluation_count(), 3);
    for slug in ["root", "main", "ready", "strike"] {
        let node = tree.node(slug).unwrap();
        assert_eq!(node.run_count(), 3, "{slug}");
        assert_eq!(node.run_path_count(), 3, "{slug}");
    }
    assert_eq!(tree.blackboard().fetch::<u32>(HITS).copied(), Some(3));
}

#[test]
fn nodes_skipped_in_a_pass_keep_their_last_stamp() {
    let decl = NodeDeclaration::new("root", "Inverter").with_child(
        NodeDeclaration::new("main", "Sequence").with_children([
            NodeDeclaration::condition("ready", "go"),
            NodeDeclaration::action("strike", "hit"),
        ]),
    );
    let mut tree = BehaviorTree::new(&decl, Arc::new(handlers())).unwrap();

    tree.blackboard_mut().store(GO, true);
    tree.tick().unwrap();
    tree.blackboard_mut().store(GO, false);
    tree.tick().unwrap();
    tree.tick().unwrap();

    assert_eq!(tree.node("ready").unwrap().run_path_count(), 3);
    assert_eq!(tree.node("strike").unwrap().run_path_count(), 1);
    assert_eq!(tree.node("strike").unwrap().run_count(), 1);
}

#[test]
fn evaluating_a_subtree_does_not_start_a_pass() {
    let mut tree = BehaviorTree::new(&patrol(), Arc::new(handlers())).unwrap();
    tree.blackboard_mut().store(GO, true);

    assert!(tree.evaluate("main").unwrap());
    assert_eq!(tree.root_evaluation_count(), 0);
    assert_eq!(tree.node("main").unwrap().run_count(), 1);
    assert_eq!(tree.node("main").unwrap().run_path_count(), 0);
    assert_eq!(tree.node("root").unwrap().run_count(), 0);
}

#[test]
fn evaluate_runs_even_when_stopped() {
    let mut tree = BehaviorTree::new(&patrol(), Arc::new(handlers())).unwrap();

    assert_eq!(tree.tick().unwrap(), TickOutcome::Ticked(false));
    assert!(tree.is_stopped());

    tree.blackboard_mut().store(GO, true);
    assert!(tree.evaluate("root").unwrap());
    assert!(tree.is_stopped());
    assert_eq!(tree.root_evaluation_count(), 2);
}

#[test]
fn stop_is_permanent_for_tick() {
    let mut tree = BehaviorTree::new(&patrol(), Arc::new(handlers())).unwrap();

    assert_eq!(tree.tick().unwrap(), TickOutcome::Ticked(false));
    assert!(tree.is_stopped());
    assert!(!tree.state().is_shut_down());

    // The tree would succeed now, but it is never evaluated again.
    tree.blackboard_mut().store(GO, true);
    for _ in 0..5 {
        assert_eq!(tree.tick().unwrap(), TickOutcome::Stopped);
    }
    assert!(tree.state().is_shut_down());
    assert_eq!(tree.node("root").unwrap().run_count(), 1);
    assert_eq!(tree.root_evaluation_count(), 1);
    assert_eq!(tree.blackboard().fetch::<u32>(HITS), None);
}

#[test]
fn run_ticks_ends_when_the_tree_stops() {
    let decl = NodeDeclaration::new("root", "LimitTries")
        .with_limit(4.0)
        .with_child(NodeDeclaration::action("strike", "hit"));
    let mut tree = BehaviorTree::new(&decl, Arc::new(handlers())).unwrap();

    assert_eq!(tree.run_ticks(100).unwrap(), 5);
    assert!(tree.is_stopped());
    assert_eq!(tree.blackboard().fetch::<u32>(HITS).copied(), Some(4));
    assert_eq!(tree.run_ticks(100).unwrap(), 0);
}

#[test]
fn run_ticks_respects_the_cap() {
    let mut tree = BehaviorTree::new(&patrol(), Arc::new(handlers())).unwrap();
    tree.blackboard_mut().store(GO, true);

    assert_eq!(tree.run_ticks(7).unwrap(), 7);
    assert!(!tree.is_stopped());
}

#[test]
fn missing_handler_aborts_the_pass_but_keeps_counters() {
    let decl = NodeDeclaration::new("root", "RepeatAlways").with_child(
        NodeDeclaration::new("main", "Sequence").with_children([
            NodeDeclaration::action("first", "ok"),
            NodeDeclaration::action("second", "unregistered"),
            NodeDeclaration::action("third", "ok"),
        ]),
    );
    let mut tree = BehaviorTree::new(&decl, Arc::new(handlers())).unwrap();

    match tree.tick() {
        Err(TreeError::HandlerNotFound { kind, key }) => {
            assert_eq!(kind, HandlerKind::Action);
            assert_eq!(key, "unregistered");
        }
        other => panic!("expected HandlerNotFound, got {other:?}"),
    }

    assert_eq!(tree.root_evaluation_count(), 1);
    assert_eq!(tree.node("first").unwrap().run_count(), 1);
    assert_eq!(tree.node("second").unwrap().run_count(), 1);
    assert_eq!(tree.node("third").unwrap().run_count(), 0);
    assert!(!tree.is_stopped());
}

#[test]
fn missing_condition_handler_is_reported_as_condition() {
    let decl = NodeDeclaration::new("root", "Inverter")
        .with_child(NodeDeclaration::condition("check", "nope"));
    let mut tree = BehaviorTree::new(&decl, Arc::new(handlers())).unwrap();

    assert!(matches!(
        tree.tick(),
        Err(TreeError::HandlerNotFound { kind: HandlerKind::Condition, .. })
    ));
}

#[test]
fn unknown_slug_is_an_error() {
    let mut tree = BehaviorTree::new(&patrol(), Arc::new(handlers())).unwrap();
    assert!(matches!(
        tree.evaluate("nowhere"),
        Err(TreeError::UnknownSlug(s)) if s == "nowhere"
    ));
}

#[test]
#[should_panic(expected = "actuator jammed")]
fn handler_panics_propagate() {
    let mut handlers = handlers();
    handlers.register_action("jam", |_| panic!("actuator jammed"));
    let decl = NodeDeclaration::new("root", "Inverter")
        .with_child(NodeDeclaration::action("arm", "jam"));
    let mut tree = BehaviorTree::new(&decl, Arc::new(handlers)).unwrap();
    let _ = tree.tick();
}

#[test]
fn trees_sharing_handlers_keep_separate_blackboards() {
    let handlers = Arc::new(handlers());
    let mut a = BehaviorTree::new(&patrol(), handlers.clone()).unwrap();
    let mut b = BehaviorTree::new(&patrol(), handlers).unwrap();
    a.blackboard_mut().store(GO, true);

    assert_eq!(a.tick().unwrap(), TickOutcome::Ticked(true));
    assert_eq!(b.tick().unwrap(), TickOutcome::Ticked(false));
    assert!(!a.is_stopped());
    assert!(b.is_stopped());
    assert_eq!(b.blackboard().fetch::<u32>(HITS), None);
}

#[test]
fn same_seed_gives_same_random_choices() {
    let decl = NodeDeclaration::new("root", "Inverter").with_child(
        NodeDeclaration::new("pick", "RandomSelector").with_children([
            NodeDeclaration::action("a", "ok"),
            NodeDeclaration::action("b", "ok"),
            NodeDeclaration::action("c", "ok"),
        ]),
    );
    let config = TreeConfig {
        seed: Some(1234),
        ..TreeConfig::default()
    };
    let handlers = Arc::new(handlers());

    let picks = |tree: &mut BehaviorTree| {
        let counts = |tree: &BehaviorTree| -> Vec<u64> {
            ["a", "b", "c"]
                .iter()
                .map(|s| tree.node(s).unwrap().run_count())
                .collect()
        };
        (0..20)
            .map(|_| {
                let before = counts(&*tree);
                tree.tick().unwrap();
                let after = counts(&*tree);
                (0..3).find(|&i| after[i] > before[i]).unwrap()
            })
            .collect::<Vec<_>>()
    };

    let mut first = BehaviorTree::new(&decl, handlers.clone()).unwrap().with_config(&config);
    let mut second = BehaviorTree::new(&decl, handlers).unwrap().with_config(&config);
    assert_eq!(picks(&mut first), picks(&mut second));
}

#[test]
fn trace_log_records_each_evaluation_after_its_children() {
    let config = TreeConfig {
        trace: true,
        ..TreeConfig::default()
    };
    let mut tree = BehaviorTree::new(&patrol(), Arc::new(handlers()))
        .unwrap()
        .with_config(&config);

    tree.blackboard_mut().store(GO, true);
    tree.tick().unwrap();
    tree.blackboard_mut().store(GO, false);
    tree.tick().unwrap();

    let log = tree.blackboard().fetch::<TraceLog>(TRACE_LOG).unwrap();
    let lines: Vec<(u64, &str, &str)> = log
        .events
        .iter()
        .map(|e| (e.pass, e.slug.as_deref().unwrap_or(""), e.tag.as_ref()))
        .collect();
    assert_eq!(
        lines,
        vec![
            (1, "ready", "bt.node.success"),
            (1, "strike", "bt.node.success"),
            (1, "main", "bt.node.success"),
            (1, "root", "bt.node.success"),
            (2, "ready", "bt.node.failure"),
            (2, "main", "bt.node.failure"),
            (2, "root", "bt.tree.stopped"),
            (2, "root", "bt.node.failure"),
        ]
    );
    assert_eq!(log.for_slug("root").last().unwrap().a, 2);
}

#[test]
fn trace_log_is_capped_under_long_runs() {
    let config = TreeConfig {
        trace: true,
        trace_capacity: Some(10),
        ..TreeConfig::default()
    };
    let mut tree = BehaviorTree::new(&patrol(), Arc::new(handlers()))
        .unwrap()
        .with_config(&config);
    tree.blackboard_mut().store(GO, true);

    assert_eq!(tree.run_ticks(50).unwrap(), 50);

    let log = tree.blackboard().fetch::<TraceLog>(TRACE_LOG).unwrap();
    assert_eq!(log.len(), 10);
    assert_eq!(log.events.back().unwrap().pass, 50);
    assert_eq!(log.events.back().unwrap().slug.as_deref(), Some("root"));
}
