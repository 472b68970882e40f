//! # Testing & Assertions
//!
//! Assertion model for HTTP responses, the per-case context that records
//! assertion results and cleanups, and the sequential runner that drives a
//! list of cases and produces a [`RunReport`].
//!
//! Assertions come in two strengths. `check_*` records a failure and lets the
//! case continue. `require_*` records a failure and returns
//! [`CaseError::Fatal`] so the case stops at the `?`.

use std::fmt::{self, Display};

use serde::Serialize;
use thiserror::Error;

use crate::ads::AdsApi;
use crate::error::Error;
use crate::http::HttpResponse;

pub mod report;
pub mod runner;

pub use report::{CaseOutcome, CaseReport, RunReport};
pub use runner::{RunOptions, Runner};

/// Target of an assertion within the HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum AssertionTarget {
    StatusCode,
    JsonField(String),
}

impl AssertionTarget {
    pub fn field(path: impl Into<String>) -> Self {
        AssertionTarget::JsonField(path.into())
    }
}

impl Display for AssertionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionTarget::StatusCode => write!(f, "status"),
            AssertionTarget::JsonField(path) => write!(f, "$.{path}"),
        }
    }
}

/// Comparison operator for an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionOperator {
    Equals,
    Contains,
    Exists,
}

/// A single assertion evaluated against a response.
#[derive(Debug, Clone, Serialize)]
pub struct Assertion {
    pub target: AssertionTarget,
    pub operator: AssertionOperator,
    pub expected: String,
}

/// Result of evaluating an assertion.
#[derive(Debug, Clone, Serialize)]
pub struct AssertionResult {
    pub assertion: Assertion,
    pub passed: bool,
    pub actual: String,
    pub message: String,
}

/// Work to run once the case body has finished, whatever its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    DeleteAdvertisement(String),
}

/// Why a case body stopped early.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error(transparent)]
    Harness(#[from] Error),

    #[error("{0}")]
    Fatal(String),
}

pub type CaseResult<T = ()> = std::result::Result<T, CaseError>;

/// State handed to a case body.
pub struct CaseContext<'a> {
    api: &'a AdsApi,
    results: Vec<AssertionResult>,
    cleanups: Vec<Cleanup>,
}

impl<'a> CaseContext<'a> {
    pub fn new(api: &'a AdsApi) -> Self {
        Self {
            api,
            results: Vec::new(),
            cleanups: Vec::new(),
        }
    }

    pub fn api(&self) -> &'a AdsApi {
        self.api
    }

    pub fn seller_id(&self) -> i64 {
        self.api.seller_id()
    }

    pub fn register_cleanup(&mut self, cleanup: Cleanup) {
        self.cleanups.push(cleanup);
    }

    pub fn results(&self) -> &[AssertionResult] {
        &self.results
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|result| !result.passed)
    }

    pub(crate) fn into_parts(self) -> (Vec<AssertionResult>, Vec<Cleanup>) {
        (self.results, self.cleanups)
    }

    pub fn check_status(&mut self, response: &HttpResponse, expected: u16) -> bool {
        let passed = response.status == expected;
        self.record(
            Assertion {
                target: AssertionTarget::StatusCode,
                operator: AssertionOperator::Equals,
                expected: expected.to_string(),
            },
            response.status.to_string(),
            passed,
            format!("Expected status {expected}, got {}", response.status),
        )
    }

    pub fn require_status(&mut self, response: &HttpResponse, expected: u16) -> CaseResult {
        if self.check_status(response, expected) {
            Ok(())
        } else {
            Err(CaseError::Fatal(format!(
                "Expected status {expected}, got {}",
                response.status
            )))
        }
    }

    pub fn check_equals<T>(&mut self, target: AssertionTarget, expected: T, actual: T) -> bool
    where
        T: PartialEq + Display,
    {
        let passed = expected == actual;
        let message = format!("Expected {target} to equal `{expected}`, got `{actual}`");
        self.record(
            Assertion {
                target,
                operator: AssertionOperator::Equals,
                expected: expected.to_string(),
            },
            actual.to_string(),
            passed,
            message,
        )
    }

    pub fn check_exists(&mut self, target: AssertionTarget, present: bool) -> bool {
        let message = format!("Expected {target} to be present");
        self.record(
            Assertion {
                target,
                operator: AssertionOperator::Exists,
                expected: "present".to_string(),
            },
            if present { "present" } else { "missing" }.to_string(),
            present,
            message,
        )
    }

    /// Unwrap a value the rest of the case depends on.
    pub fn require<T>(
        &mut self,
        target: AssertionTarget,
        value: Option<T>,
        message: &str,
    ) -> CaseResult<T> {
        let present = value.is_some();
        self.record(
            Assertion {
                target,
                operator: AssertionOperator::Exists,
                expected: "present".to_string(),
            },
            if present { "present" } else { "missing" }.to_string(),
            present,
            message.to_string(),
        );
        value.ok_or_else(|| CaseError::Fatal(message.to_string()))
    }

    pub fn check_contains(
        &mut self,
        target: AssertionTarget,
        needle: &str,
        found: bool,
        message: &str,
    ) -> bool {
        self.record(
            Assertion {
                target,
                operator: AssertionOperator::Contains,
                expected: needle.to_string(),
            },
            if found { needle.to_string() } else { "not found".to_string() },
            found,
            message.to_string(),
        )
    }

    fn record(
        &mut self,
        assertion: Assertion,
        actual: String,
        passed: bool,
        message: String,
    ) -> bool {
        let message = if passed { String::new() } else { message };
        self.results.push(AssertionResult {
            assertion,
            passed,
            actual,
            message,
        });
        passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Settings;

    fn api() -> AdsApi {
        AdsApi::from_settings(&Settings {
            base_url: "http://127.0.0.1:9".into(),
            seller_id: 5,
            timeout_secs: None,
        })
        .unwrap()
    }

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            status_text: String::new(),
            duration_ms: 0,
            size_bytes: 0,
            content_type: "application/json".into(),
            body: String::new(),
        }
    }

    #[test]
    fn check_status_records_pass_and_failure() {
        let api = api();
        let mut ctx = CaseContext::new(&api);

        assert!(ctx.check_status(&response(200), 200));
        assert!(!ctx.has_failures());

        assert!(!ctx.check_status(&response(404), 200));
        assert!(ctx.has_failures());

        let failed = &ctx.results()[1];
        assert_eq!(failed.actual, "404");
        assert_eq!(failed.message, "Expected status 200, got 404");
        assert!(ctx.results()[0].message.is_empty());
    }

    #[test]
    fn require_status_is_fatal() {
        let api = api();
        let mut ctx = CaseContext::new(&api);

        let err = ctx.require_status(&response(500), 200).unwrap_err();
        assert!(matches!(err, CaseError::Fatal(ref msg) if msg == "Expected status 200, got 500"));
        assert!(ctx.has_failures());
    }

    #[test]
    fn require_unwraps_or_fails() {
        let api = api();
        let mut ctx = CaseContext::new(&api);

        let value = ctx.require(AssertionTarget::field("id"), Some("abc"), "no id").unwrap();
        assert_eq!(value, "abc");
        assert!(!ctx.has_failures());

        let err = ctx
            .require::<&str>(AssertionTarget::field("id"), None, "no id")
            .unwrap_err();
        assert_eq!(err.to_string(), "no id");
        assert!(ctx.has_failures());
    }

    #[test]
    fn check_equals_formats_target() {
        let api = api();
        let mut ctx = CaseContext::new(&api);

        assert!(!ctx.check_equals(AssertionTarget::field("[0].id"), "a", "b"));
        assert_eq!(
            ctx.results()[0].message,
            "Expected $.[0].id to equal `a`, got `b`"
        );
    }

    #[test]
    fn cleanups_are_kept_in_registration_order() {
        let api = api();
        let mut ctx = CaseContext::new(&api);
        ctx.register_cleanup(Cleanup::DeleteAdvertisement("a".into()));
        ctx.register_cleanup(Cleanup::DeleteAdvertisement("b".into()));

        let (_, cleanups) = ctx.into_parts();
        assert_eq!(
            cleanups,
            vec![
                Cleanup::DeleteAdvertisement("a".into()),
                Cleanup::DeleteAdvertisement("b".into()),
            ]
        );
    }

    #[test]
    fn harness_errors_convert_into_case_errors() {
        let err: CaseError = Error::Config("bad".into()).into();
        assert!(matches!(err, CaseError::Harness(Error::Config(_))));
    }
}
