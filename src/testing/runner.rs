use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tracing::{debug, info, warn};

use crate::ads::AdsApi;
use crate::error::{Error, Result};
use crate::suite::Case;

use super::report::{CaseOutcome, CaseReport, RunReport};
use super::{CaseContext, CaseError, CaseResult, Cleanup};

/// Which cases a run should execute.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Include cases outside the default set.
    pub extended: bool,
    /// Restrict the run to these case names, in suite order.
    pub only: Vec<String>,
}

impl RunOptions {
    pub fn select(&self) -> Result<Vec<Case>> {
        let available = Case::selection(self.extended);

        for name in &self.only {
            if Case::from_name(name).is_none() {
                return Err(Error::Config(format!("Unknown case `{name}`")));
            }
        }

        if self.only.is_empty() {
            return Ok(available);
        }

        // Naming a case explicitly selects it even if it is extended-only.
        Ok(Case::ALL
            .into_iter()
            .filter(|case| self.only.iter().any(|name| name == case.name()))
            .collect())
    }
}

/// Runs cases one after another, draining each case's cleanups before the
/// next case starts.
#[derive(Debug, Clone)]
pub struct Runner {
    api: AdsApi,
}

impl Runner {
    pub fn new(api: AdsApi) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &AdsApi {
        &self.api
    }

    pub async fn run(&self, cases: &[Case]) -> RunReport {
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or(0);
        let started = Instant::now();
        let mut report = RunReport::new(self.api.base_url(), started_at);

        info!(base_url = self.api.base_url(), cases = cases.len(), "starting run");
        for case in cases {
            report.push(self.run_case(*case).await);
        }
        report.duration_ms = started.elapsed().as_millis();

        info!(
            passed = report.passed,
            failed = report.failed,
            aborted = report.aborted,
            duration_ms = report.duration_ms as u64,
            "run finished"
        );
        report
    }

    pub async fn run_case(&self, case: Case) -> CaseReport {
        self.run_body(case.name(), move |ctx| case.execute(ctx).boxed_local()).await
    }

    /// Run one case body and drain its cleanups, even if the body panicked.
    pub async fn run_body<'s, F>(&'s self, name: &str, body: F) -> CaseReport
    where
        F: for<'c> FnOnce(&'c mut CaseContext<'s>) -> LocalBoxFuture<'c, CaseResult>,
    {
        info!(case = name, "running case");
        let started = Instant::now();
        let mut ctx = CaseContext::new(&self.api);

        let result = AssertUnwindSafe(body(&mut ctx)).catch_unwind().await;

        let has_failures = ctx.has_failures();
        let (assertions, cleanups) = ctx.into_parts();
        self.run_cleanups(cleanups).await;

        let (outcome, error) = match result {
            Ok(Ok(())) if !has_failures => (CaseOutcome::Passed, None),
            Ok(Ok(())) | Ok(Err(CaseError::Fatal(_))) => (CaseOutcome::Failed, None),
            Ok(Err(CaseError::Harness(err))) => (CaseOutcome::Aborted, Some(err.to_string())),
            Err(payload) => (
                CaseOutcome::Aborted,
                Some(format!("Case panicked: {}", panic_message(payload.as_ref()))),
            ),
        };

        let failures = assertions
            .iter()
            .filter(|result| !result.passed)
            .map(|result| result.message.clone())
            .collect();
        let duration_ms = started.elapsed().as_millis();

        match outcome {
            CaseOutcome::Passed => {
                info!(case = name, duration_ms = duration_ms as u64, "case passed")
            }
            _ => warn!(
                case = name,
                outcome = outcome.label(),
                error = error.as_deref().unwrap_or(""),
                "case did not pass"
            ),
        }

        CaseReport {
            name: name.to_string(),
            outcome,
            duration_ms,
            failures,
            error,
            assertions,
        }
    }

    /// Best-effort teardown, most recently registered first. Errors are logged
    /// and never change the case outcome.
    async fn run_cleanups(&self, cleanups: Vec<Cleanup>) {
        for cleanup in cleanups.into_iter().rev() {
            match cleanup {
                Cleanup::DeleteAdvertisement(id) => match self.api.delete(&id).await {
                    Ok(response) if response.status == 200 => {
                        debug!(id = %id, "cleanup deleted advertisement");
                    }
                    Ok(response) => {
                        debug!(id = %id, status = response.status, "cleanup delete not applied");
                    }
                    Err(err) => {
                        warn!(id = %id, error = %err, "cleanup delete failed");
                    }
                },
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
