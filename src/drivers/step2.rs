use crate::api::AnalysisApi;
use crate::drivers::{abandon, check_entry_step, commit_failure, record_failure, DriverOutcome, DriverResult, ViewToken};
use crate::error::WizardError;
use crate::state::{WizardStep, WizardStore};

const DRIVER: &str = "step2";

/// Run the energy analysis for the stored analysis id.
/// Same shape as `run_step1`, keyed on the id instead of the files.
pub async fn run_step2<A: AnalysisApi>(api: &A, store: &WizardStore, token: &ViewToken) -> DriverResult {
    check_entry_step(store, WizardStep::Step2Processing, DRIVER);

    let Some(analysis_id) = store.analysis_id().filter(|id| !id.trim().is_empty()) else {
        return record_failure(
            store,
            DRIVER,
            WizardError::precondition("No analysis ID available. Please complete step 1 first."),
        );
    };

    store.clear_error();
    store.set_processing(true);

    let response = match api.submit_step2(Some(&analysis_id)).await {
        Ok(response) => response,
        Err(e) => return commit_failure(store, token, DRIVER, e),
    };

    let data = response.to_result();
    let applied = store.commit_if_live(token, |s| {
        s.step2_data = Some(data);
        s.step2_completed = true;
        s.current_step = WizardStep::Step2;
        s.is_processing = false;
    });
    if !applied {
        return Ok(abandon(DRIVER));
    }

    tracing::info!(
        analysis_id = %analysis_id,
        energy_consumption = response.step2.energy_consumption,
        annual_savings = response.step2.annual_savings,
        "Step2 complete"
    );
    store.log();
    Ok(DriverOutcome::Advanced(WizardStep::Step2))
}
