use std::error::Error;

use pipewright::errors::PipewrightError;
use pipewright::registry::Registry;
use pipewright_test_utils::builders::{recording_action, RunLog};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn duplicate_task_name_is_rejected() -> TestResult {
    let log = RunLog::new();
    let mut registry = Registry::new();

    registry.register("lint", vec![], recording_action(&log, "lint"))?;
    let err = registry
        .register("lint", vec![], recording_action(&log, "lint"))
        .unwrap_err();

    assert!(matches!(err, PipewrightError::DuplicateTask(name) if name == "lint"));
    assert_eq!(registry.len(), 1);
    Ok(())
}

#[test]
fn unknown_dependency_is_rejected_and_registry_unchanged() -> TestResult {
    let log = RunLog::new();
    let mut registry = Registry::new();

    registry.register("lint", vec![], recording_action(&log, "lint"))?;

    let err = registry
        .register(
            "scripts",
            vec!["lint".into(), "missing".into()],
            recording_action(&log, "scripts"),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        PipewrightError::UnknownDependency { task, dependency }
            if task == "scripts" && dependency == "missing"
    ));
    assert!(!registry.contains("scripts"));
    assert_eq!(registry.len(), 1);
    Ok(())
}

#[test]
fn self_reference_is_an_unknown_dependency() {
    let log = RunLog::new();
    let mut registry = Registry::new();

    // A task cannot exist before its own registration, so self-reference is
    // a forward reference.
    let err = registry
        .register("styles", vec!["styles".into()], recording_action(&log, "styles"))
        .unwrap_err();

    assert!(matches!(
        err,
        PipewrightError::UnknownDependency { task, dependency }
            if task == "styles" && dependency == "styles"
    ));
    assert!(registry.is_empty());
}

#[test]
fn duplicate_dependency_entry_is_rejected() -> TestResult {
    let log = RunLog::new();
    let mut registry = Registry::new();

    registry.register("lint", vec![], recording_action(&log, "lint"))?;

    let err = registry
        .register(
            "scripts",
            vec!["lint".into(), "lint".into()],
            recording_action(&log, "scripts"),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        PipewrightError::DuplicateDependency { task, dependency }
            if task == "scripts" && dependency == "lint"
    ));
    assert!(!registry.contains("scripts"));
    Ok(())
}

#[test]
fn get_missing_task_fails_with_not_found() {
    let registry = Registry::new();
    let err = registry.get("build").unwrap_err();
    assert!(matches!(err, PipewrightError::TaskNotFound(name) if name == "build"));
}

#[test]
fn names_are_kept_in_registration_order() -> TestResult {
    let log = RunLog::new();
    let mut registry = Registry::new();

    registry.register("clean", vec![], recording_action(&log, "clean"))?;
    registry.register("lint", vec![], recording_action(&log, "lint"))?;
    registry.register("scripts", vec!["lint".into()], recording_action(&log, "scripts"))?;

    let names: Vec<&str> = registry.names().collect();
    assert_eq!(names, vec!["clean", "lint", "scripts"]);
    assert_eq!(registry.get("scripts")?.order(), 2);
    Ok(())
}
