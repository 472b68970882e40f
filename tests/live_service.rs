//! The default suite against the real advertisement service.
//!
//! This hits the network and is ignored by default:
//!
//! ```bash
//! cargo test --test live_service -- --ignored
//! ```
//!
//! `ADCHECK_BASE_URL` and `ADCHECK_SELLER_ID` point it elsewhere. The cases
//! share one seller on a shared service, so they run one after another in a
//! single test.

use adcheck::ads::AdsApi;
use adcheck::environment::{Overrides, Settings};
use adcheck::suite::Case;
use adcheck::testing::{CaseOutcome, Runner};

fn runner_from_env() -> Runner {
    let overrides = Overrides {
        base_url: std::env::var("ADCHECK_BASE_URL").ok(),
        seller_id: std::env::var("ADCHECK_SELLER_ID")
            .ok()
            .and_then(|raw| raw.parse().ok()),
        timeout_secs: Some(30),
    };
    let settings = Settings::resolve(None, &overrides).expect("valid settings");
    Runner::new(AdsApi::from_settings(&settings).expect("valid base URL"))
}

#[tokio::test]
#[ignore = "requires network access to the live service"]
async fn live_default_suite_passes_in_order() {
    let report = runner_from_env().run(&Case::selection(false)).await;

    let names: Vec<_> = report.cases.iter().map(|case| case.name.as_str()).collect();
    let expected: Vec<_> = Case::selection(false).into_iter().map(Case::name).collect();
    assert_eq!(names, expected);

    let not_passed: Vec<_> = report
        .cases
        .iter()
        .filter(|case| case.outcome != CaseOutcome::Passed)
        .map(|case| format!("{}: failures={:?} error={:?}", case.name, case.failures, case.error))
        .collect();
    assert!(not_passed.is_empty(), "{not_passed:#?}");
}
