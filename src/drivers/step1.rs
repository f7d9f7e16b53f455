use crate::api::AnalysisApi;
use crate::drivers::{abandon, check_entry_step, commit_failure, record_failure, DriverOutcome, DriverResult, ViewToken};
use crate::error::WizardError;
use crate::state::{ProcessedFile, WizardStep, WizardStore};

const DRIVER: &str = "step1";

/// Upload both files and store the room optimization results.
///
/// Runs when the wizard enters `processing`. On success the analysis id,
/// the optional processed spreadsheet and the step 1 result are stored,
/// step 1 is marked complete and the wizard moves to `step1`.
/// On failure the error is stored in `last_error` and returned; the step stays put.
/// The outcome is applied in a single commit; if `token` is cancelled by then, nothing is touched.
pub async fn run_step1<A: AnalysisApi>(api: &A, store: &WizardStore, token: &ViewToken) -> DriverResult {
    check_entry_step(store, WizardStep::Processing, DRIVER);

    let files = store.read(|s| {
        s.uploaded_files
            .pair()
            .map(|(a, b)| (a.clone(), b.clone()))
    });
    let Some((heating, ventilation)) = files else {
        return record_failure(
            store,
            DRIVER,
            WizardError::precondition("both spreadsheets must be uploaded before step 1"),
        );
    };

    store.clear_error();
    store.set_processing(true);

    let response = match api.submit_step1(&heating, &ventilation).await {
        Ok(response) => response,
        Err(e) => return commit_failure(store, token, DRIVER, e),
    };

    let data = response.to_result();
    let processed = response.processed_file().map(|(base64, filename)| ProcessedFile {
        base64: base64.to_string(),
        filename: filename.to_string(),
    });

    let applied = store.commit_if_live(token, |s| {
        s.analysis_id = Some(response.analysis_id.clone());
        if processed.is_some() {
            s.processed_file = processed;
        }
        s.step1_data = Some(data);
        s.step1_completed = true;
        s.current_step = WizardStep::Step1;
        s.is_processing = false;
    });
    if !applied {
        return Ok(abandon(DRIVER));
    }

    tracing::info!(
        analysis_id = %response.analysis_id,
        optimized_rooms = response.step1.optimized_rooms,
        total_rooms = response.step1.total_rooms,
        "Step1 complete"
    );
    store.log();
    Ok(DriverOutcome::Advanced(WizardStep::Step1))
}
