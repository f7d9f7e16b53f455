use energy_wizard_lib::api::types::{
    RoomTypeChange, Step1Details, Step1Metrics, Step1Response, Step1Result, Step2Metrics,
    Step2Response, Step2Result,
};
use energy_wizard_lib::drivers::{run_step1, run_step2, DriverOutcome, ViewScope, ViewToken};
use energy_wizard_lib::state::{WizardStep, WizardStore};
use energy_wizard_lib::{AnalysisApi, UploadedFile, WizardError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::oneshot;

/// Backend fake answering from a script and recording every call
#[derive(Default)]
struct ScriptedApi {
    step1_replies: Mutex<VecDeque<Result<Step1Response, WizardError>>>,
    step2_replies: Mutex<VecDeque<Result<Step2Response, WizardError>>>,
    step1_calls: Mutex<Vec<(UploadedFile, UploadedFile)>>,
    step2_calls: Mutex<Vec<Option<String>>>,
    /// Holds the next call until the sender fires
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl ScriptedApi {
    fn with_step1(reply: Result<Step1Response, WizardError>) -> Self {
        let api = ScriptedApi::default();
        api.step1_replies.lock().push_back(reply);
        api
    }

    fn with_step2(reply: Result<Step2Response, WizardError>) -> Self {
        let api = ScriptedApi::default();
        api.step2_replies.lock().push_back(reply);
        api
    }

    fn gated(self) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock() = Some(rx);
        (self, tx)
    }

    async fn wait_gate(&self) {
        let gate = self.gate.lock().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
    }
}

impl AnalysisApi for ScriptedApi {
    async fn submit_step1(
        &self,
        heating: &UploadedFile,
        ventilation: &UploadedFile,
    ) -> Result<Step1Response, WizardError> {
        self.step1_calls
            .lock()
            .push((heating.clone(), ventilation.clone()));
        self.wait_gate().await;
        self.step1_replies
            .lock()
            .pop_front()
            .expect("unscripted step1 call")
    }

    async fn submit_step2(&self, analysis_id: Option<&str>) -> Result<Step2Response, WizardError> {
        self.step2_calls.lock().push(analysis_id.map(str::to_string));
        self.wait_gate().await;
        self.step2_replies
            .lock()
            .pop_front()
            .expect("unscripted step2 call")
    }
}

fn heating() -> UploadedFile {
    UploadedFile::new("Leistungsermittlung_KLT_HZG.xlsx", vec![1u8, 2, 3, 4])
}

fn ventilation() -> UploadedFile {
    UploadedFile::new("Leistungsermittlung_RLT.xlsx", vec![9u8, 8, 7])
}

fn step1_response() -> Step1Response {
    Step1Response {
        analysis_id: "abc123".to_string(),
        processed_excel_base64: None,
        processed_excel_filename: None,
        step1: Step1Metrics {
            optimized_rooms: 8,
            total_rooms: 12,
            improvement_rate: 0.33,
            confidence: 0.91,
        },
        details: None,
    }
}

fn step2_response() -> Step2Response {
    Step2Response {
        step2: Step2Metrics {
            energy_consumption: 15000.0,
            reduction_percentage: 0.18,
            annual_savings: 2400.0,
        },
        details: None,
    }
}

/// Store with both files uploaded and the processing view showing
fn store_at_processing() -> WizardStore {
    let store = WizardStore::new();
    store.set_uploaded_files(heating(), ventilation());
    store.set_current_step(WizardStep::Processing);
    store
}

fn store_at_step2_processing(analysis_id: Option<&str>) -> WizardStore {
    let store = WizardStore::new();
    if let Some(id) = analysis_id {
        store.set_analysis_id(id);
    }
    store.mark_step1_complete();
    store.set_current_step(WizardStep::Step2Processing);
    store
}

#[tokio::test]
async fn test_step1_success_updates_state() {
    let api = ScriptedApi::with_step1(Ok(step1_response()));
    let store = store_at_processing();

    let outcome = run_step1(&api, &store, &ViewToken::detached()).await;

    assert_eq!(outcome.unwrap(), DriverOutcome::Advanced(WizardStep::Step1));
    let state = store.snapshot();
    assert_eq!(state.analysis_id.as_deref(), Some("abc123"));
    assert_eq!(
        state.step1_data,
        Some(Step1Result {
            optimized_rooms: 8,
            total_rooms: 12,
            improvement_rate: 0.33,
            confidence: 0.91,
            details: None,
        })
    );
    assert!(state.step1_completed);
    assert_eq!(state.current_step, WizardStep::Step1);
    assert!(!state.is_processing);
    assert!(state.processed_file.is_none());
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn test_step1_sends_both_files_once() {
    let api = ScriptedApi::with_step1(Ok(step1_response()));
    let store = store_at_processing();

    run_step1(&api, &store, &ViewToken::detached()).await.unwrap();

    let calls = api.step1_calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], (heating(), ventilation()));
}

#[tokio::test]
async fn test_step1_without_files_makes_no_call() {
    let api = ScriptedApi::default();
    let store = WizardStore::new();
    store.set_current_step(WizardStep::Processing);

    let result = run_step1(&api, &store, &ViewToken::detached()).await;

    assert!(matches!(result, Err(WizardError::PreconditionFailed { .. })));
    assert!(api.step1_calls.lock().is_empty());
    let state = store.snapshot();
    assert!(!state.is_processing);
    assert_eq!(state.current_step, WizardStep::Processing);
    assert!(matches!(state.last_error, Some(WizardError::PreconditionFailed { .. })));
}

#[tokio::test]
async fn test_step1_after_reset_makes_no_call() {
    let api = ScriptedApi::default();
    let store = WizardStore::new();
    store.set_uploaded_files(heating(), ventilation());
    store.reset_analysis();
    store.set_current_step(WizardStep::Processing);

    assert!(run_step1(&api, &store, &ViewToken::detached()).await.is_err());
    assert!(api.step1_calls.lock().is_empty());
}

#[tokio::test]
async fn test_step1_stores_processed_file_and_details() {
    let mut response = step1_response();
    response.processed_excel_base64 = Some("AAEC".to_string());
    response.processed_excel_filename = Some("merged_analysis.xlsx".to_string());
    response.details = Some(Step1Details {
        original_room_types_count: Some(40),
        optimized_room_types_count: Some(12),
        avg_room_size_m2: Some(24.5),
        total_area_m2: Some(2940.0),
        key_changes: Some(vec![RoomTypeChange {
            from: "Buero".to_string(),
            to: "Office".to_string(),
            count: 5,
        }]),
    });
    let api = ScriptedApi::with_step1(Ok(response.clone()));
    let store = store_at_processing();

    run_step1(&api, &store, &ViewToken::detached()).await.unwrap();

    let state = store.snapshot();
    assert!(state.has_download());
    let file = state.processed_file.unwrap();
    assert_eq!(file.base64, "AAEC");
    assert_eq!(file.filename, "merged_analysis.xlsx");
    assert_eq!(state.step1_data.unwrap().details, response.details);
}

#[tokio::test]
async fn test_step1_ignores_payload_without_filename() {
    let mut response = step1_response();
    response.processed_excel_base64 = Some("AAEC".to_string());
    let api = ScriptedApi::with_step1(Ok(response));
    let store = store_at_processing();

    run_step1(&api, &store, &ViewToken::detached()).await.unwrap();

    assert!(store.snapshot().processed_file.is_none());
}

#[tokio::test]
async fn test_step1_ignores_empty_payload() {
    let mut response = step1_response();
    response.processed_excel_base64 = Some(String::new());
    response.processed_excel_filename = Some("merged_analysis.xlsx".to_string());
    assert!(response.processed_file().is_none());

    let api = ScriptedApi::with_step1(Ok(response));
    let store = store_at_processing();

    run_step1(&api, &store, &ViewToken::detached()).await.unwrap();

    let state = store.snapshot();
    assert!(state.processed_file.is_none());
    assert!(!state.has_download());
    assert!(state.step1_completed);
}

#[tokio::test]
async fn test_step1_failure_keeps_step() {
    let api = ScriptedApi::with_step1(Err(WizardError::request_failed(500, "file unreadable")));
    let store = store_at_processing();

    let result = run_step1(&api, &store, &ViewToken::detached()).await;

    assert_eq!(
        result.unwrap_err(),
        WizardError::request_failed(500, "file unreadable")
    );
    let state = store.snapshot();
    assert!(!state.is_processing);
    assert_eq!(state.current_step, WizardStep::Processing);
    assert!(!state.step1_completed);
    assert_eq!(
        state.last_error,
        Some(WizardError::request_failed(500, "file unreadable"))
    );
}

#[tokio::test]
async fn test_retry_clears_previous_error() {
    let api = ScriptedApi::with_step1(Err(WizardError::request_failed(503, "busy")));
    api.step1_replies.lock().push_back(Ok(step1_response()));
    let store = store_at_processing();

    assert!(run_step1(&api, &store, &ViewToken::detached()).await.is_err());
    assert!(store.last_error().is_some());

    run_step1(&api, &store, &ViewToken::detached()).await.unwrap();
    assert!(store.last_error().is_none());
    assert_eq!(api.step1_calls.lock().len(), 2);
}

#[tokio::test]
async fn test_repeated_success_keeps_completion() {
    let api = ScriptedApi::with_step1(Ok(step1_response()));
    api.step1_replies.lock().push_back(Ok(step1_response()));
    let store = store_at_processing();

    run_step1(&api, &store, &ViewToken::detached()).await.unwrap();
    store.mark_step1_visited();
    store.set_current_step(WizardStep::Processing);
    run_step1(&api, &store, &ViewToken::detached()).await.unwrap();

    let state = store.snapshot();
    assert!(state.step1_completed);
    assert!(state.step1_visited);
    assert_eq!(state.current_step, WizardStep::Step1);
}

#[tokio::test]
async fn test_step1_teardown_drops_result() {
    let (api, release) = ScriptedApi::with_step1(Ok(step1_response())).gated();
    let store = store_at_processing();
    let view = ViewScope::enter("processing");
    let token = view.token();

    let driver = run_step1(&api, &store, &token);
    let teardown = {
        let store = store.clone();
        async move {
            tokio::task::yield_now().await;
            let at_teardown = store.snapshot();
            drop(view);
            release.send(()).unwrap();
            at_teardown
        }
    };

    let (outcome, at_teardown) = tokio::join!(driver, teardown);

    assert_eq!(outcome.unwrap(), DriverOutcome::Abandoned);
    assert!(at_teardown.is_processing);
    assert_eq!(store.snapshot(), at_teardown);
    assert!(store.analysis_id().is_none());
}

#[tokio::test]
async fn test_step1_teardown_drops_failure() {
    let (api, release) =
        ScriptedApi::with_step1(Err(WizardError::request_failed(500, "file unreadable"))).gated();
    let store = store_at_processing();
    let view = ViewScope::enter("processing");
    let token = view.token();

    let driver = run_step1(&api, &store, &token);
    let teardown = {
        let store = store.clone();
        async move {
            tokio::task::yield_now().await;
            let at_teardown = store.snapshot();
            drop(view);
            release.send(()).unwrap();
            at_teardown
        }
    };

    let (outcome, at_teardown) = tokio::join!(driver, teardown);

    assert_eq!(outcome.unwrap(), DriverOutcome::Abandoned);
    assert_eq!(store.snapshot(), at_teardown);
    assert!(store.last_error().is_none());
    assert!(store.is_processing());
}

#[tokio::test]
async fn test_step2_success_updates_state() {
    let api = ScriptedApi::with_step2(Ok(step2_response()));
    let store = store_at_step2_processing(Some("abc123"));

    let outcome = run_step2(&api, &store, &ViewToken::detached()).await;

    assert_eq!(outcome.unwrap(), DriverOutcome::Advanced(WizardStep::Step2));
    assert_eq!(*api.step2_calls.lock(), vec![Some("abc123".to_string())]);
    let state = store.snapshot();
    assert_eq!(
        state.step2_data,
        Some(Step2Result {
            energy_consumption: 15000.0,
            reduction_percentage: 0.18,
            annual_savings: 2400.0,
            details: None,
        })
    );
    assert!(state.step2_completed);
    assert_eq!(state.current_step, WizardStep::Step2);
    assert!(!state.is_processing);
}

#[tokio::test]
async fn test_step2_without_analysis_id_fails_fast() {
    let api = ScriptedApi::default();
    let store = store_at_step2_processing(None);

    let result = run_step2(&api, &store, &ViewToken::detached()).await;

    assert!(matches!(result, Err(WizardError::PreconditionFailed { .. })));
    assert!(api.step2_calls.lock().is_empty());
    let state = store.snapshot();
    assert!(!state.is_processing);
    assert!(!state.step2_completed);
    assert_eq!(state.current_step, WizardStep::Step2Processing);
}

#[tokio::test]
async fn test_step2_teardown_drops_result() {
    let (api, release) = ScriptedApi::with_step2(Ok(step2_response())).gated();
    let store = store_at_step2_processing(Some("abc123"));
    let view = ViewScope::enter("step2-processing");
    let token = view.token();

    let driver = run_step2(&api, &store, &token);
    let teardown = {
        let store = store.clone();
        async move {
            let at_teardown = store.snapshot();
            view.cancel();
            release.send(()).unwrap();
            at_teardown
        }
    };

    let (outcome, at_teardown) = tokio::join!(driver, teardown);

    assert_eq!(outcome.unwrap(), DriverOutcome::Abandoned);
    assert_eq!(store.snapshot(), at_teardown);
    assert!(store.snapshot().step2_data.is_none());
}

#[tokio::test]
async fn test_full_wizard_then_reset() {
    let api = ScriptedApi::with_step1(Ok(step1_response()));
    api.step2_replies.lock().push_back(Ok(step2_response()));
    let store = store_at_processing();

    run_step1(&api, &store, &ViewToken::detached()).await.unwrap();
    store.mark_step1_visited();
    store.set_current_step(WizardStep::Step2Processing);
    run_step2(&api, &store, &ViewToken::detached()).await.unwrap();
    store.mark_step2_visited();
    store.set_current_step(WizardStep::Report);
    store.mark_report_complete();

    let state = store.snapshot();
    assert!(state.step1_completed && state.step2_completed && state.report_completed);
    assert!(state.can_revisit(WizardStep::Step1));
    assert!(state.can_revisit(WizardStep::Report));

    store.reset_analysis();
    let state = store.snapshot();
    assert_eq!(state.current_step, WizardStep::Home);
    assert!(state.analysis_id.is_none());
    assert!(state.uploaded_files.pair().is_none());
    assert!(state.step1_data.is_none() && state.step2_data.is_none());
}
