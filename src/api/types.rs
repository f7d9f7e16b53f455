use serde::{Deserialize, Serialize};

// Step 1 structures

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTypeChange {
    pub from: String,
    pub to: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step1Details {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_room_types_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_room_types_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_room_size_m2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_area_m2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_changes: Option<Vec<RoomTypeChange>>,
}

/// Room optimization metrics as stored in the wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step1Result {
    pub optimized_rooms: u32,
    pub total_rooms: u32,
    pub improvement_rate: f64,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Step1Details>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step1Metrics {
    pub optimized_rooms: u32,
    pub total_rooms: u32,
    pub improvement_rate: f64,
    pub confidence: f64,
}

/// Body of a successful `POST /api/analyze/step1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step1Response {
    pub analysis_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_excel_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_excel_filename: Option<String>,
    pub step1: Step1Metrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Step1Details>,
}

impl Step1Response {
    /// Fold the top-level details into the stored result
    pub fn to_result(&self) -> Step1Result {
        Step1Result {
            optimized_rooms: self.step1.optimized_rooms,
            total_rooms: self.step1.total_rooms,
            improvement_rate: self.step1.improvement_rate,
            confidence: self.step1.confidence,
            details: self.details.clone(),
        }
    }

    /// Processed spreadsheet, only when both payload and name came back non-empty
    pub fn processed_file(&self) -> Option<(&str, &str)> {
        let data = self.processed_excel_base64.as_deref().filter(|d| !d.is_empty())?;
        let name = self.processed_excel_filename.as_deref().filter(|n| !n.is_empty())?;
        Some((data, name))
    }
}

// Step 2 structures

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTypeLoad {
    pub room_type: String,
    #[serde(rename = "wPerM2")]
    pub w_per_m2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step2Details {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating_power_kw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_consumption_kwh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_kwh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_by_room_type: Option<Vec<RoomTypeLoad>>,
}

/// Energy consumption metrics as stored in the wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step2Result {
    pub energy_consumption: f64,
    pub reduction_percentage: f64,
    pub annual_savings: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Step2Details>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step2Metrics {
    pub energy_consumption: f64,
    pub reduction_percentage: f64,
    pub annual_savings: f64,
}

/// Body of a successful `POST /api/analyze/step2`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step2Response {
    pub step2: Step2Metrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Step2Details>,
}

impl Step2Response {
    pub fn to_result(&self) -> Step2Result {
        Step2Result {
            energy_consumption: self.step2.energy_consumption,
            reduction_percentage: self.step2.reduction_percentage,
            annual_savings: self.step2.annual_savings,
            details: self.details.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Step2Request<'a> {
    pub analysis_id: &'a str,
}
