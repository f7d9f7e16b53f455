//! Step drivers: one asynchronous backend call per wizard transition

pub mod step1;
pub mod step2;
pub mod view;

use serde::Serialize;
use crate::error::WizardError;
use crate::state::{WizardStep, WizardStore};

pub use step1::run_step1;
pub use step2::run_step2;
pub use view::{ViewScope, ViewToken};

/// How a driver invocation ended, when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriverOutcome {
    /// Results stored and the wizard moved to this step
    Advanced(WizardStep),
    /// The view was torn down while the call was in flight; nothing was applied
    Abandoned,
}

pub type DriverResult = Result<DriverOutcome, WizardError>;

/// Warn when a driver starts outside the view that normally owns it.
/// Ordering is left to the caller; this only makes violations visible.
fn check_entry_step(store: &WizardStore, expected: WizardStep, driver: &'static str) {
    let current = store.current_step();
    if current != expected {
        tracing::warn!(driver = driver, expected = %expected, current = %current, "Driver started out of order");
    }
}

/// Record a driver failure as observable state
fn record_failure(store: &WizardStore, driver: &'static str, error: WizardError) -> DriverResult {
    log_failure(driver, &error);
    store.set_error(error.clone());
    Err(error)
}

/// Store a failed call's error and end processing in one commit, unless the view is gone
fn commit_failure(store: &WizardStore, token: &ViewToken, driver: &'static str, error: WizardError) -> DriverResult {
    let applied = store.commit_if_live(token, |s| {
        s.is_processing = false;
        s.last_error = Some(error.clone());
    });
    if !applied {
        return Ok(abandon(driver));
    }

    log_failure(driver, &error);
    Err(error)
}

fn abandon(driver: &'static str) -> DriverOutcome {
    tracing::debug!(driver = driver, "View gone, dropping result");
    DriverOutcome::Abandoned
}

fn log_failure(driver: &'static str, error: &WizardError) {
    tracing::error!(driver = driver, stage = error.stage(), status = ?error.status(), error = %error, "Driver failed");
}
