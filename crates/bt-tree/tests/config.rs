use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use bt_tree::{BehaviorTree, HandlerRegistry, NodeDeclaration, TreeConfig};
use tempfile::NamedTempFile;

#[test]
fn loads_yaml_with_defaults_for_missing_keys() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "seed: 42\ntrace: true").unwrap();

    let config = TreeConfig::load(file.path()).unwrap();
    assert_eq!(config.seed, Some(42));
    assert!(config.trace);
    assert_eq!(config.max_ticks, None);
    assert_eq!(config.tick_interval(), Duration::from_secs(1));
}

#[test]
fn loads_every_key() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "seed: 7\ntick_interval_secs: 0.25\nmax_ticks: 12\ntrace: false"
    )
    .unwrap();

    let config = TreeConfig::load(file.path()).unwrap();
    assert_eq!(
        config,
        TreeConfig {
            seed: Some(7),
            tick_interval_secs: 0.25,
            max_ticks: Some(12),
            trace: false,
            trace_capacity: Some(10_000),
        }
    );
    assert_eq!(config.tick_interval(), Duration::from_millis(250));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("treely.yaml");

    assert_eq!(TreeConfig::load_or_default(&path).unwrap(), TreeConfig::default());
    assert!(TreeConfig::load(&path).is_err());
}

#[test]
fn malformed_yaml_names_the_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "seed: [not, a, number]").unwrap();

    let err = TreeConfig::load(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains(&file.path().display().to_string()));
}

#[test]
fn unusable_intervals_fall_back_to_one_second() {
    for secs in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let config = TreeConfig {
            tick_interval_secs: secs,
            ..TreeConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_secs(1), "{secs}");
    }
}

#[test]
fn trace_flag_installs_a_trace_log() {
    let decl = NodeDeclaration::new("root", "Inverter")
        .with_child(NodeDeclaration::action("leaf", "ok"));
    let mut handlers = HandlerRegistry::new();
    handlers.register_action("ok", |_| true);
    let handlers = Arc::new(handlers);

    let quiet = BehaviorTree::new(&decl, handlers.clone()).unwrap();
    assert!(!quiet.blackboard().contains(bt_tools::TRACE_LOG));

    let traced = BehaviorTree::new(&decl, handlers)
        .unwrap()
        .with_config(&TreeConfig {
            trace: true,
            ..TreeConfig::default()
        });
    assert!(traced.blackboard().contains(bt_tools::TRACE_LOG));
}

#[test]
fn trace_capacity_defaults_to_a_bound_and_can_be_lifted() {
    assert_eq!(TreeConfig::default().trace_capacity, Some(10_000));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "trace: true\ntrace_capacity: null").unwrap();
    assert_eq!(TreeConfig::load(file.path()).unwrap().trace_capacity, None);

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "trace_capacity: 64").unwrap();
    assert_eq!(TreeConfig::load(file.path()).unwrap().trace_capacity, Some(64));
}
