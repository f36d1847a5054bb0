use std::process::Command;

use navsuite_e2e::playwright::{PlaywrightConfig, PlaywrightDriver};
use navsuite_e2e::{ActionSequence, BrowserDriver, BrowserPage, DriverError, SuiteRunner, SuiteTree};

fn in_path(bin: &str) -> bool {
    Command::new("sh")
        .arg("-lc")
        .arg(format!("command -v {bin} >/dev/null 2>&1"))
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Playwright Driver Smoke Test
///
/// Opens a data: URL in a real browser, clicks a button found by text and
/// checks that a missing text surfaces as a not-found error.
///
/// Marked ignored because it requires Node and an installed Playwright.
#[tokio::test]
#[ignore]
async fn playwright_driver_finds_and_clicks_by_text() {
    if !in_path("node") || !in_path("npx") {
        eprintln!("Skipping: node/npx not available in PATH");
        return;
    }

    let config = PlaywrightConfig {
        action_timeout_ms: 1000,
        ..Default::default()
    };
    let driver = PlaywrightDriver::new(config).expect("playwright installed");

    let url = "data:text/html,<button onclick=\"this.textContent='Done'\">Datepicker</button>";
    let mut page = driver.new_page().await.expect("agent starts");
    page.open(url).await.expect("open data url");

    let button = page.find_by_text("Datepicker", true).await.expect("button found");
    page.click(&button).await.expect("button clicked");

    let err = page.find_by_text("Charts", true).await.unwrap_err();
    assert!(matches!(err, DriverError::NotFound { .. }), "got {err}");
    page.close().await.expect("page closes");

    let tree = SuiteTree::build(|root| {
        root.before_each(ActionSequence::new().navigate(url));
        root.test("click", ActionSequence::new().click_exact("Datepicker"));
    })
    .unwrap();
    let report = SuiteRunner::new(driver).run_all(&tree).await;
    assert!(report.success(), "{:?}", report.results);
}
