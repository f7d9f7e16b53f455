pub mod client;
pub mod download;
pub mod types;
pub mod upload;

use crate::error::WizardError;
use self::types::{Step1Response, Step2Response};

pub use client::HttpAnalysisClient;
pub use download::{decode_and_download, decode_excel, decode_payload, ExcelDownload, DEFAULT_DOWNLOAD_NAME, EXCEL_MIME};
pub use types::{Step1Details, Step1Result, Step2Details, Step2Result};
pub use upload::UploadedFile;

/// The remote analysis backend as seen by the step drivers
#[allow(async_fn_in_trait)]
pub trait AnalysisApi {
    /// Upload both spreadsheets and run the room optimization
    async fn submit_step1(
        &self,
        heating: &UploadedFile,
        ventilation: &UploadedFile,
    ) -> Result<Step1Response, WizardError>;

    /// Run the energy analysis for a previous upload.
    /// A missing id fails with `PreconditionFailed` without touching the network.
    async fn submit_step2(&self, analysis_id: Option<&str>) -> Result<Step2Response, WizardError>;
}
