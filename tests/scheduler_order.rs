use std::collections::HashMap;
use std::error::Error;

use proptest::prelude::*;

use pipewright::dag::{plan, run, TaskGraph};
use pipewright::errors::PipewrightError;
use pipewright::registry::Registry;
use pipewright_test_utils::builders::{failing_action, recording_action, RunLog};
use pipewright_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn target_runs_after_its_independent_dependencies() -> TestResult {
    init_tracing();
    let log = RunLog::new();
    let mut registry = Registry::new();

    registry.register("A", vec![], recording_action(&log, "A"))?;
    registry.register("B", vec![], recording_action(&log, "B"))?;
    registry.register("C", vec!["A".into(), "B".into()], recording_action(&log, "C"))?;

    let report = run(&registry, "C").await?;

    let entries = log.snapshot();
    assert_eq!(entries.len(), 3);
    assert_eq!(report.executed.len(), 3);

    // Order is A,B,C or B,A,C -- never C before either dependency.
    let pos_c = log.position("C").expect("C must run");
    assert!(log.position("A").expect("A must run") < pos_c);
    assert!(log.position("B").expect("B must run") < pos_c);
    Ok(())
}

#[tokio::test]
async fn diamond_dependencies_run_each_action_exactly_once() -> TestResult {
    init_tracing();
    let log = RunLog::new();
    let mut registry = Registry::new();

    registry.register("base", vec![], recording_action(&log, "base"))?;
    registry.register("left", vec!["base".into()], recording_action(&log, "left"))?;
    registry.register("right", vec!["base".into()], recording_action(&log, "right"))?;
    registry.register(
        "top",
        vec!["left".into(), "right".into()],
        recording_action(&log, "top"),
    )?;

    run(&registry, "top").await?;

    for name in ["base", "left", "right", "top"] {
        assert_eq!(log.count(name), 1, "{name} must run exactly once");
    }

    let pos = |name: &str| log.position(name).expect("task must run");
    assert!(pos("base") < pos("left"));
    assert!(pos("base") < pos("right"));
    assert!(pos("left") < pos("top"));
    assert!(pos("right") < pos("top"));
    Ok(())
}

#[tokio::test]
async fn only_the_transitive_closure_of_the_target_runs() -> TestResult {
    init_tracing();
    let log = RunLog::new();
    let mut registry = Registry::new();

    registry.register("styles", vec![], recording_action(&log, "styles"))?;
    registry.register("scripts", vec![], recording_action(&log, "scripts"))?;

    run(&registry, "styles").await?;

    assert_eq!(log.snapshot(), vec!["styles".to_string()]);
    Ok(())
}

#[tokio::test]
async fn dependency_failure_aborts_dependents() -> TestResult {
    init_tracing();
    let log = RunLog::new();
    let mut registry = Registry::new();

    registry.register("lint", vec![], failing_action(&log, "lint", "2 problems"))?;
    registry.register("scripts", vec!["lint".into()], recording_action(&log, "scripts"))?;

    let err = run(&registry, "scripts").await.unwrap_err();

    assert!(matches!(
        &err,
        PipewrightError::TaskFailed { task, .. } if task == "lint"
    ));
    assert_eq!(log.count("lint"), 1);
    assert_eq!(log.count("scripts"), 0, "dependent must not run after failure");
    Ok(())
}

#[tokio::test]
async fn running_an_unknown_task_fails_with_not_found() {
    let registry = Registry::new();
    let err = run(&registry, "deploy").await.unwrap_err();
    assert!(matches!(err, PipewrightError::TaskNotFound(name) if name == "deploy"));
}

#[test]
fn two_task_cycle_is_detected_and_named() {
    // The registry's no-forward-references rule makes cycles unconstructible
    // through `register`, so this exercises the graph built from raw edges
    // (the same path config validation and tests use).
    let graph = TaskGraph::from_edges([("D", vec!["E"]), ("E", vec!["D"])]);

    let err = plan(&graph, "D").unwrap_err();
    match err {
        PipewrightError::CycleDetected(members) => {
            assert!(members.contains(&"D".to_string()));
            assert!(members.contains(&"E".to_string()));
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn self_cycle_is_detected() {
    let graph = TaskGraph::from_edges([("A", vec!["A"])]);
    let err = plan(&graph, "A").unwrap_err();
    assert!(matches!(
        err,
        PipewrightError::CycleDetected(members) if members == vec!["A".to_string()]
    ));
}

#[test]
fn plan_is_stable_with_ties_broken_by_insertion_order() -> TestResult {
    let graph = TaskGraph::from_edges([
        ("images", Vec::<&str>::new()),
        ("svgs", Vec::new()),
        ("static", Vec::new()),
        ("bundle", vec!["static", "svgs", "images"]),
    ]);

    let order = plan(&graph, "bundle")?;
    assert_eq!(order, vec!["images", "svgs", "static", "bundle"]);

    // Replanning yields the identical order.
    assert_eq!(plan(&graph, "bundle")?, order);
    Ok(())
}

proptest! {
    /// For all acyclic graphs, every planned task appears after all of its
    /// dependencies, the plan contains the target, and nothing is planned
    /// twice.
    #[test]
    fn plan_respects_dependency_edges(
        raw_deps in prop::collection::vec(prop::collection::vec(any::<usize>(), 0..3), 1..15)
    ) {
        // Node i may only depend on nodes < i, which guarantees acyclicity.
        let mut edges: Vec<(String, Vec<String>)> = Vec::new();
        for (i, deps) in raw_deps.iter().enumerate() {
            let mut dep_names: Vec<String> = if i == 0 {
                Vec::new()
            } else {
                deps.iter().map(|d| format!("t{}", d % i)).collect()
            };
            dep_names.sort();
            dep_names.dedup();
            edges.push((format!("t{i}"), dep_names));
        }

        let graph = TaskGraph::from_edges(edges);
        let target = format!("t{}", raw_deps.len() - 1);

        let order = plan(&graph, &target).expect("acyclic graph must plan");

        let pos: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        prop_assert_eq!(pos.len(), order.len(), "no task planned twice");
        prop_assert!(pos.contains_key(target.as_str()));

        for name in &order {
            for dep in graph.dependencies_of(name) {
                let dep_pos = pos.get(dep.as_str());
                prop_assert!(dep_pos.is_some(), "closure must include {}", dep);
                prop_assert!(dep_pos < pos.get(name.as_str()));
            }
        }
    }
}
