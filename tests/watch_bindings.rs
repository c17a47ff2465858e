use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use pipewright::registry::Registry;
use pipewright::watch::{compile_bindings, BindingWorker, WatchBinding};
use pipewright_test_utils::builders::{failing_action, sleeping_action, RunLog};
use pipewright_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// Poll the log until it holds `expected` entries or the deadline passes.
async fn wait_for_entries(log: &RunLog, expected: usize) {
    with_timeout(async {
        loop {
            if log.snapshot().len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
}

#[test]
fn bindings_match_root_relative_paths() -> TestResult {
    let bindings = vec![
        WatchBinding {
            label: "styles".into(),
            patterns: vec!["src/styles/**/*.scss".into()],
            tasks: vec!["styles".into()],
        },
        WatchBinding {
            label: "scripts".into(),
            patterns: vec!["src/js/**/*.js".into(), "src/js/**/*.mjs".into()],
            tasks: vec!["scripts".into()],
        },
    ];

    let compiled = compile_bindings(&bindings)?;

    assert!(compiled[0].matches("src/styles/site.scss"));
    assert!(compiled[0].matches("src/styles/nested/deep.scss"));
    assert!(!compiled[0].matches("src/js/app.js"));

    assert!(compiled[1].matches("src/js/app.js"));
    assert!(compiled[1].matches("src/js/lib/util.mjs"));
    assert!(!compiled[1].matches("src/js/app.ts"));
    Ok(())
}

#[tokio::test]
async fn triggers_during_a_run_queue_a_single_follow_up() -> TestResult {
    init_tracing();
    let log = RunLog::new();
    let mut registry = Registry::new();
    registry.register(
        "styles",
        vec![],
        sleeping_action(&log, "styles", Duration::from_millis(50)),
    )?;

    let worker = BindingWorker::spawn(
        Arc::new(registry),
        "styles".into(),
        vec!["styles".into()],
    );

    worker.trigger();
    tokio::time::sleep(Duration::from_millis(10)).await;
    worker.trigger();

    wait_for_entries(&log, 4).await;
    // Give a spurious third run a chance to show up before asserting.
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(
        log.snapshot(),
        vec!["styles:start", "styles:end", "styles:start", "styles:end"]
    );
    Ok(())
}

#[tokio::test]
async fn a_burst_of_triggers_coalesces_into_one_queued_rerun() -> TestResult {
    init_tracing();
    let log = RunLog::new();
    let mut registry = Registry::new();
    registry.register(
        "scripts",
        vec![],
        sleeping_action(&log, "scripts", Duration::from_millis(50)),
    )?;

    let worker = BindingWorker::spawn(
        Arc::new(registry),
        "scripts".into(),
        vec!["scripts".into()],
    );

    worker.trigger();
    tokio::time::sleep(Duration::from_millis(10)).await;
    for _ in 0..5 {
        worker.trigger();
    }

    wait_for_entries(&log, 4).await;
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(log.count("scripts:start"), 2, "burst collapses to one re-run");
    Ok(())
}

#[tokio::test]
async fn a_failed_rerun_keeps_the_worker_alive() -> TestResult {
    init_tracing();
    let log = RunLog::new();
    let mut registry = Registry::new();
    registry.register("lint", vec![], failing_action(&log, "lint", "2 problems"))?;

    let worker =
        BindingWorker::spawn(Arc::new(registry), "lint".into(), vec!["lint".into()]);

    worker.trigger();
    wait_for_entries(&log, 1).await;

    with_timeout(async {
        while worker.last_error().is_none() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    let message = worker.last_error().ok_or("expected a recorded error")?;
    assert!(message.contains("lint"), "error names the task: {message}");

    // The worker still accepts and executes triggers after the failure.
    worker.trigger();
    wait_for_entries(&log, 2).await;
    assert_eq!(log.count("lint"), 2);
    Ok(())
}
