use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::api::types::{Step1Result, Step2Result};
use crate::api::upload::UploadedFile;
use crate::error::WizardError;

/// Which view of the wizard is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    /// Upload form
    #[default]
    Home,
    /// Step 1 request in flight
    Processing,
    /// Room optimization results
    Step1,
    /// Step 2 request in flight
    Step2Processing,
    /// Energy consumption results
    Step2,
    Report,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Home,
        WizardStep::Processing,
        WizardStep::Step1,
        WizardStep::Step2Processing,
        WizardStep::Step2,
        WizardStep::Report,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Home => "home",
            WizardStep::Processing => "processing",
            WizardStep::Step1 => "step1",
            WizardStep::Step2Processing => "step2-processing",
            WizardStep::Step2 => "step2",
            WizardStep::Report => "report",
        }
    }

    /// The step that normally follows this one in the linear flow
    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Home => Some(WizardStep::Processing),
            WizardStep::Processing => Some(WizardStep::Step1),
            WizardStep::Step1 => Some(WizardStep::Step2Processing),
            WizardStep::Step2Processing => Some(WizardStep::Step2),
            WizardStep::Step2 => Some(WizardStep::Report),
            WizardStep::Report => None,
        }
    }

    /// True while a driver owns the view
    pub fn is_processing_view(&self) -> bool {
        matches!(self, WizardStep::Processing | WizardStep::Step2Processing)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WizardStep {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WizardStep::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| WizardError::precondition(format!("unknown wizard step '{}'", s)))
    }
}

/// The two spreadsheets the wizard uploads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFiles {
    /// Heating load spreadsheet
    pub file1: Option<UploadedFile>,
    /// Ventilation load spreadsheet
    pub file2: Option<UploadedFile>,
}

impl UploadedFiles {
    /// Both files, when both are present
    pub fn pair(&self) -> Option<(&UploadedFile, &UploadedFile)> {
        match (&self.file1, &self.file2) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}

/// Spreadsheet returned by the backend alongside the step 1 results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFile {
    pub base64: String,
    pub filename: String,
}

/// Everything the presentation layer needs to render the wizard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub current_step: WizardStep,
    pub uploaded_files: UploadedFiles,
    pub analysis_id: Option<String>,
    pub processed_file: Option<ProcessedFile>,
    pub step1_completed: bool,
    pub step2_completed: bool,
    pub report_completed: bool,
    pub step1_visited: bool,
    pub step2_visited: bool,
    pub is_processing: bool,
    pub step1_data: Option<Step1Result>,
    pub step2_data: Option<Step2Result>,
    /// Failure of the most recent driver run
    pub last_error: Option<WizardError>,
}

impl WizardState {
    /// Whether the progress stepper may jump back to `step`
    pub fn can_revisit(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Home => true,
            WizardStep::Processing | WizardStep::Step2Processing => false,
            WizardStep::Step1 => self.step1_completed,
            WizardStep::Step2 => self.step2_completed,
            WizardStep::Report => self.report_completed,
        }
    }

    /// A processed spreadsheet is ready to save
    pub fn has_download(&self) -> bool {
        self.processed_file
            .as_ref()
            .map(|f| !f.base64.is_empty() && !f.filename.is_empty())
            .unwrap_or(false)
    }
}

/// Log the current state (for debugging)
pub fn log_state(state: &WizardState) {
    tracing::debug!(
        step = %state.current_step,
        processing = state.is_processing,
        analysis_id = state.analysis_id.as_deref().unwrap_or("-"),
        step1_completed = state.step1_completed,
        step2_completed = state.step2_completed,
        report_completed = state.report_completed,
        has_error = state.last_error.is_some(),
        "[Wizard] state"
    );
}
