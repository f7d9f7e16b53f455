use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tokio::time::Duration;
use crate::api::download::EXCEL_MIME;
use crate::api::types::{Step1Response, Step2Request, Step2Response};
use crate::api::upload::UploadedFile;
use crate::api::AnalysisApi;
use crate::config::ApiConfig;
use crate::error::WizardError;
use crate::logging::RequestTimer;

pub const STEP1_PATH: &str = "/api/analyze/step1";
pub const STEP2_PATH: &str = "/api/analyze/step2";

/// Multipart field carrying the heating load spreadsheet
pub const HEATING_PART: &str = "file_heating";
/// Multipart field carrying the ventilation load spreadsheet
pub const VENTILATION_PART: &str = "file_ventilation";

/// HTTP implementation of the analysis backend.
/// The inner client is reused for all requests.
#[derive(Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    config: ApiConfig,
}

impl HttpAnalysisClient {
    pub fn new(config: ApiConfig) -> Result<Self, WizardError> {
        let mut builder = Client::builder()
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(4);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| WizardError::Config {
            message: format!("failed to create HTTP client: {}", e),
        })?;

        Ok(HttpAnalysisClient { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn file_part(file: &UploadedFile) -> Result<Part, WizardError> {
        Part::bytes(file.contents.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(EXCEL_MIME)
            .map_err(WizardError::from)
    }
}

impl AnalysisApi for HttpAnalysisClient {
    async fn submit_step1(
        &self,
        heating: &UploadedFile,
        ventilation: &UploadedFile,
    ) -> Result<Step1Response, WizardError> {
        let timer = RequestTimer::new("step1");
        let url = self.config.endpoint(STEP1_PATH);

        let form = Form::new()
            .part(HEATING_PART, Self::file_part(heating)?)
            .part(VENTILATION_PART, Self::file_part(ventilation)?);

        tracing::info!(
            url = %url,
            heating = %heating.file_name,
            ventilation = %ventilation.file_name,
            "Submitting step1 upload"
        );

        let response = self.client.post(&url).multipart(form).send().await?;
        let parsed = read_json::<Step1Response>(response, "Upload").await;

        tracing::info!(success = parsed.is_ok(), latency_ms = timer.elapsed_ms(), "Step1 request done");
        parsed
    }

    async fn submit_step2(&self, analysis_id: Option<&str>) -> Result<Step2Response, WizardError> {
        let analysis_id = analysis_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                WizardError::precondition("No analysis ID available. Please complete step 1 first.")
            })?;

        let timer = RequestTimer::new("step2");
        let url = self.config.endpoint(STEP2_PATH);
        tracing::info!(url = %url, analysis_id = analysis_id, "Submitting step2 analysis");

        let response = self
            .client
            .post(&url)
            .json(&Step2Request { analysis_id })
            .send()
            .await?;
        let parsed = read_json::<Step2Response>(response, "Analysis").await;

        tracing::info!(success = parsed.is_ok(), latency_ms = timer.elapsed_ms(), "Step2 request done");
        parsed
    }
}

/// Decode a success body, or turn a failure status into `RequestFailed`
async fn read_json<T: DeserializeOwned>(response: Response, action: &str) -> Result<T, WizardError> {
    let status = response.status();

    if !status.is_success() {
        // an unreadable failure body still reports the status
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status.as_u16(), &body, action);
        tracing::warn!(status = status.as_u16(), message = %message, "Backend rejected request");
        return Err(WizardError::request_failed(status.as_u16(), message));
    }

    let body = response.text().await?;
    serde_json::from_str::<T>(&body).map_err(WizardError::from)
}

/// Pick the error text out of a failure body.
/// Uses `detail`, then `message`, then a generic text with the status code.
pub fn error_message(status: u16, body: &str, action: &str) -> String {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "message"].iter().find_map(|key| {
                value
                    .get(*key)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
        });

    from_body.unwrap_or_else(|| format!("{} failed with status {}", action, status))
}
