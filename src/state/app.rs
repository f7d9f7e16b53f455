use std::sync::Arc;
use parking_lot::RwLock;
use crate::api::types::{Step1Result, Step2Result};
use crate::api::upload::UploadedFile;
use crate::drivers::ViewToken;
use crate::error::WizardError;
use crate::state::session::{log_state, ProcessedFile, UploadedFiles, WizardState, WizardStep};

/// Session-scoped wizard state container.
/// Constructed once per wizard session and passed explicitly to every driver and view.
/// Every setter takes the write lock and changes one field of the latest state;
/// `commit_if_live` applies several fields under one lock.
/// The lock is never held across an await.
#[derive(Clone, Default)]
pub struct WizardStore {
    state: Arc<RwLock<WizardState>>,
}

impl WizardStore {
    /// Create a store at the initial `home` state
    pub fn new() -> Self {
        WizardStore {
            state: Arc::new(RwLock::new(WizardState::default())),
        }
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> WizardState {
        self.state.read().clone()
    }

    /// Read a value out of the current state without cloning all of it
    pub fn read<T>(&self, f: impl FnOnce(&WizardState) -> T) -> T {
        f(&self.state.read())
    }

    fn update(&self, f: impl FnOnce(&mut WizardState)) {
        let mut guard = self.state.write();
        f(&mut guard);
    }

    /// Apply `f` under one write lock, but only while `token` is live.
    /// Returns false, leaving the state untouched, once the view is gone.
    pub fn commit_if_live(&self, token: &ViewToken, f: impl FnOnce(&mut WizardState)) -> bool {
        let mut guard = self.state.write();
        if token.is_cancelled() {
            return false;
        }
        f(&mut guard);
        true
    }

    pub fn current_step(&self) -> WizardStep {
        self.read(|s| s.current_step)
    }

    pub fn analysis_id(&self) -> Option<String> {
        self.read(|s| s.analysis_id.clone())
    }

    pub fn is_processing(&self) -> bool {
        self.read(|s| s.is_processing)
    }

    pub fn last_error(&self) -> Option<WizardError> {
        self.read(|s| s.last_error.clone())
    }

    pub fn set_current_step(&self, step: WizardStep) {
        let previous = self.current_step();
        self.update(|s| s.current_step = step);
        tracing::debug!(from = %previous, to = %step, "Wizard step changed");
    }

    pub fn set_uploaded_files(&self, file1: UploadedFile, file2: UploadedFile) {
        self.update(|s| {
            s.uploaded_files = UploadedFiles {
                file1: Some(file1),
                file2: Some(file2),
            }
        });
    }

    pub fn set_analysis_id<S: Into<String>>(&self, analysis_id: S) {
        let analysis_id = analysis_id.into();
        self.update(|s| s.analysis_id = Some(analysis_id));
    }

    pub fn set_processed_file<B: Into<String>, N: Into<String>>(&self, base64: B, filename: N) {
        let file = ProcessedFile {
            base64: base64.into(),
            filename: filename.into(),
        };
        self.update(|s| s.processed_file = Some(file));
    }

    pub fn mark_step1_complete(&self) {
        self.update(|s| s.step1_completed = true);
    }

    pub fn mark_step2_complete(&self) {
        self.update(|s| s.step2_completed = true);
    }

    pub fn mark_report_complete(&self) {
        self.update(|s| s.report_completed = true);
    }

    pub fn mark_step1_visited(&self) {
        self.update(|s| s.step1_visited = true);
    }

    pub fn mark_step2_visited(&self) {
        self.update(|s| s.step2_visited = true);
    }

    pub fn set_processing(&self, is_processing: bool) {
        self.update(|s| s.is_processing = is_processing);
    }

    pub fn set_step1_data(&self, data: Step1Result) {
        self.update(|s| s.step1_data = Some(data));
    }

    pub fn set_step2_data(&self, data: Step2Result) {
        self.update(|s| s.step2_data = Some(data));
    }

    pub fn set_error(&self, error: WizardError) {
        self.update(|s| s.last_error = Some(error));
    }

    pub fn clear_error(&self) {
        self.update(|s| s.last_error = None);
    }

    /// Discard files, identifiers and results and go back to `home`
    pub fn reset_analysis(&self) {
        self.update(|s| *s = WizardState::default());
        tracing::info!("Wizard reset");
    }

    /// Log the current state (for debugging)
    pub fn log(&self) {
        log_state(&self.state.read());
    }
}
