//! Backend endpoints and wire-format DTOs.
//!
//! The backend speaks camelCase JSON; everything crossing the wire is
//! declared here so the rest of the core can stay in snake_case domain
//! types.

use serde::{Deserialize, Serialize};

use crate::analysis::RawAnalysisResult;
use crate::model::Role;
use crate::API_BASE_URL;

// --- Endpoints ---

#[must_use]
pub fn auth_me() -> String {
    format!("{API_BASE_URL}/auth/me")
}

#[must_use]
pub fn evidence() -> String {
    format!("{API_BASE_URL}/evidence")
}

#[must_use]
pub fn vehicles() -> String {
    format!("{API_BASE_URL}/vehicles")
}

#[must_use]
pub fn persons() -> String {
    format!("{API_BASE_URL}/persons")
}

#[must_use]
pub fn incidents() -> String {
    format!("{API_BASE_URL}/incidents")
}

#[must_use]
pub fn reports() -> String {
    format!("{API_BASE_URL}/reports")
}

#[must_use]
pub fn analyze_report() -> String {
    format!("{API_BASE_URL}/ai/analyze-report")
}

#[must_use]
pub fn report_results(report_id: &str) -> String {
    format!("{API_BASE_URL}/ai/reports/{report_id}/results")
}

#[must_use]
pub fn enhance_report(report_id: &str) -> String {
    format!("{API_BASE_URL}/ai/reports/{report_id}/enhance")
}

#[must_use]
pub fn casualty_report(report_id: &str) -> String {
    format!("{API_BASE_URL}/ai/reports/{report_id}/casualty-report")
}

#[must_use]
pub fn conversations() -> String {
    format!("{API_BASE_URL}/ai/conversations")
}

#[must_use]
pub fn conversation_messages(conversation_id: &str) -> String {
    format!("{API_BASE_URL}/ai/conversations/{conversation_id}/messages")
}

#[must_use]
pub fn report_review(report_id: &str) -> String {
    format!("{API_BASE_URL}/reports/{report_id}/review")
}

// --- Responses ---

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// Every create endpoint answers with the id of the new record.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    #[serde(default)]
    pub results: Vec<RawAnalysisResult>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CasualtyReportResponse {
    pub content: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStartedResponse {
    pub conversation_id: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatReplyResponse {
    pub reply: String,
}

// --- Requests ---

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvidenceRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    pub uploaded_by: String,
    pub tags: Vec<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub occupant_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_description: Option<String>,
    pub damage_severity: String,
    pub damage_areas: Vec<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    pub gender: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentRequest {
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub occurred_at: String,
    pub casualties_count: u32,
    pub description: String,
    pub weather_conditions: Vec<String>,
    pub road_conditions: Vec<String>,
    pub evidence_ids: Vec<String>,
    pub vehicle_ids: Vec<String>,
    pub person_ids: Vec<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub incident_id: String,
    pub title: String,
    pub priority: String,
    pub status: String,
    pub content: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeReportRequest {
    pub report_id: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub prompt: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationRequest {
    pub report_id: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub decision: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evidence_request_serializes_camel_case() {
        let request = CreateEvidenceRequest {
            title: "Dashcam footage".into(),
            description: None,
            kind: "video".into(),
            file_url: Some("https://media.example.com/v/1".into()),
            file_format: Some("video/mp4".into()),
            file_size: Some(1_048_576),
            uploaded_by: "user-1".into(),
            tags: vec!["dashcam".into()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["fileUrl"], "https://media.example.com/v/1");
        assert_eq!(json["uploadedBy"], "user-1");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn incident_request_carries_created_ids() {
        let request = CreateIncidentRequest {
            location: "Main St".into(),
            kind: "collision".into(),
            severity: "severe".into(),
            occurred_at: "2026-08-24T10:30".into(),
            casualties_count: 2,
            description: "Two vehicles".into(),
            weather_conditions: vec!["rain".into()],
            road_conditions: vec![],
            evidence_ids: vec!["ev-1".into(), "ev-2".into()],
            vehicle_ids: vec!["vh-1".into()],
            person_ids: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["evidenceIds"].as_array().unwrap().len(), 2);
        assert_eq!(json["casualtiesCount"], 2);
    }

    #[test]
    fn endpoints_are_absolute() {
        assert!(auth_me().starts_with("https://"));
        assert!(report_results("rep-1").ends_with("/ai/reports/rep-1/results"));
        assert!(conversation_messages("c-1").ends_with("/ai/conversations/c-1/messages"));
    }
}
