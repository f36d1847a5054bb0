use std::path::PathBuf;

use navsuite_e2e::scripted::Call;
use navsuite_e2e::spec::build_tree;
use navsuite_e2e::{ExecutionPlan, ScriptedDriver, SpecFile, SuiteError, SuiteRunner};

fn specs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("crates/e2e sits two levels below the workspace root")
        .join("tests")
        .join("specs")
}

#[test]
fn first_test_spec_plans_like_the_builder() {
    let specs = SpecFile::load_all(&specs_dir()).unwrap();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].test_count(), 5);

    let tree = build_tree(&specs).unwrap();
    let plan = ExecutionPlan::new(&tree, None);

    let runnable: Vec<_> = plan.runnable().map(|c| c.title()).collect();
    assert_eq!(
        runnable,
        vec![
            "first-test > suite1 > the first test",
            "first-test > suite1 > the first test2",
            "first-test > suite1 > navigate to datepicker page",
            "first-test > navigate to date picker page1",
        ]
    );
    let skipped: Vec<_> = plan.skipped().map(|c| c.title()).collect();
    assert_eq!(skipped, vec!["first-test > suite1 > the first test1"]);

    let first = &plan.cases()[0];
    assert_eq!(first.before_each.len(), 2);
    assert_eq!(first.before_each[0].title.as_deref(), Some("open app on Forms"));
}

#[tokio::test]
async fn first_test_spec_runs_against_scripted_driver() {
    let specs = SpecFile::load_all(&specs_dir()).unwrap();
    let tree = build_tree(&specs).unwrap();

    let driver = ScriptedDriver::new();
    let report = SuiteRunner::new(driver.clone()).run_all(&tree).await;

    assert_eq!((report.passed, report.failed, report.skipped), (4, 0, 1));
    assert_eq!(
        driver.calls_for_page(1),
        vec![
            Call::Open("http://localhost:4200/".into()),
            Call::FindByText {
                text: "Forms".into(),
                exact: true
            },
            Call::Click("Forms".into()),
            Call::FindByText {
                text: "Charts".into(),
                exact: true
            },
            Call::Click("Charts".into()),
            Call::FindByText {
                text: "Form Layouts".into(),
                exact: false
            },
            Call::Click("Form Layouts".into()),
            Call::Close,
        ]
    );
}

#[test]
fn duplicate_test_names_in_a_file_are_rejected() {
    let spec = SpecFile::from_yaml(
        r#"
items:
  - describe: menu
    items:
      - test: same
        steps: []
      - test: same
        steps: []
"#,
    )
    .unwrap();

    let err = build_tree(&[spec]).unwrap_err();
    assert!(matches!(err, SuiteError::DuplicateTest { .. }));
}

#[test]
fn missing_specs_dir_is_reported() {
    let err = SpecFile::load_all(&specs_dir().join("does-not-exist")).unwrap_err();
    assert!(matches!(err, SuiteError::SpecParse(_)));
}
