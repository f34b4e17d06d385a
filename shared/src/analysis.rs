//! AI analysis results as closed, validated types.
//!
//! The backend payload is tolerant JSON with many optional fields; it is
//! decoded into [`RawAnalysisResult`] at the API boundary and validated
//! into [`AnalysisResult`] exactly once, so rendering code can match on
//! concrete variants instead of defensively chaining optional access.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{EvidenceId, IncidentId, ReportId};
use crate::formatter;

#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum AnalysisError {
    #[error("missing field: {0}")]
    MissingField(String),

    #[error("confidence out of range: {0}")]
    InvalidConfidence(f64),

    #[error("unknown analysis type: {0}")]
    UnknownKind(String),

    #[error("unknown analysis status: {0}")]
    UnknownStatus(String),
}

/// Confidence score validated into `[0, 1]`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Result<Self, AnalysisError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(AnalysisError::InvalidConfidence(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Display form, e.g. `94.5%`.
    #[must_use]
    pub fn percent_label(self) -> String {
        formatter::format_confidence(self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Image,
    Video,
    Audio,
}

impl AnalysisKind {
    fn parse(raw: &str) -> Result<Self, AnalysisError> {
        match raw {
            "image" | "image_analysis" => Ok(Self::Image),
            "video" | "video_analysis" => Ok(Self::Video),
            "audio" | "audio_analysis" => Ok(Self::Audio),
            other => Err(AnalysisError::UnknownKind(other.to_string())),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Image => "Image Analysis",
            Self::Video => "Video Analysis",
            Self::Audio => "Audio Analysis",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Completed,
    Processing,
    Failed,
}

impl AnalysisStatus {
    fn parse(raw: &str) -> Result<Self, AnalysisError> {
        match raw {
            "completed" => Ok(Self::Completed),
            "processing" => Ok(Self::Processing),
            "failed" => Ok(Self::Failed),
            other => Err(AnalysisError::UnknownStatus(other.to_string())),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Processing => "Processing",
            Self::Failed => "Failed",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

impl RecommendationPriority {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH PRIORITY",
            Self::Medium => "MEDIUM PRIORITY",
            Self::Low => "LOW PRIORITY",
        }
    }
}

// --- Detections ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DetectedVehicle {
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub plate: Option<String>,
    pub confidence: Confidence,
}

impl DetectedVehicle {
    /// One-line description composed from whichever attributes the model
    /// produced, e.g. `Toyota Corolla, blue, plate ABC-123`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        let make_model = [self.make.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !make_model.is_empty() {
            parts.push(make_model);
        }
        if let Some(color) = &self.color {
            parts.push(color.clone());
        }
        if let Some(plate) = &self.plate {
            parts.push(format!("plate {plate}"));
        }
        if parts.is_empty() {
            "Unidentified vehicle".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DetectedPerson {
    pub description: Option<String>,
    pub role_hint: Option<String>,
    pub confidence: Confidence,
}

impl DetectedPerson {
    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.description, &self.role_hint) {
            (Some(description), Some(role)) => format!("{description} ({role})"),
            (Some(description), None) => description.clone(),
            (None, Some(role)) => role.clone(),
            (None, None) => "Unidentified person".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DetectedRoadSign {
    pub sign_type: Option<String>,
    pub text: Option<String>,
    pub confidence: Confidence,
}

impl DetectedRoadSign {
    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.sign_type, &self.text) {
            (Some(kind), Some(text)) => format!("{kind}: {text}"),
            (Some(kind), None) => kind.clone(),
            (None, Some(text)) => text.clone(),
            (None, None) => "Unrecognized sign".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SceneEntry {
    pub label: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Recommendations {
    pub priority: RecommendationPriority,
    pub summary: Option<String>,
    pub additional_evidence: Vec<String>,
    pub expert_consultation: Vec<String>,
}

/// A validated AI analysis result, read-only from this layer's
/// perspective.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    pub id: String,
    pub evidence_id: EvidenceId,
    pub report_id: ReportId,
    pub incident_id: Option<IncidentId>,
    pub kind: AnalysisKind,
    pub status: AnalysisStatus,
    pub confidence: Confidence,
    pub processing_time_ms: u64,
    pub token_count: u32,
    pub analysis_text: String,
    pub vehicles: Vec<DetectedVehicle>,
    pub persons: Vec<DetectedPerson>,
    pub road_signs: Vec<DetectedRoadSign>,
    pub scene: Vec<SceneEntry>,
    pub recommendations: Option<Recommendations>,
}

// --- Wire types ---

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDetection {
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub plate: Option<String>,
    pub description: Option<String>,
    pub role: Option<String>,
    pub sign_type: Option<String>,
    pub text: Option<String>,
    pub confidence: Option<f64>,
}

impl RawDetection {
    fn confidence(&self) -> Result<Confidence, AnalysisError> {
        Confidence::new(self.confidence.unwrap_or(0.0))
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecommendations {
    pub priority: Option<String>,
    pub summary: Option<String>,
    pub additional_evidence: Vec<String>,
    pub expert_consultation: Vec<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAnalysisResult {
    pub id: Option<String>,
    pub evidence_id: Option<String>,
    pub report_id: Option<String>,
    pub incident_id: Option<String>,
    pub analysis_type: Option<String>,
    pub status: Option<String>,
    pub confidence: Option<f64>,
    pub processing_time_ms: Option<u64>,
    pub token_count: Option<u32>,
    pub analysis: Option<String>,
    pub vehicles: Vec<RawDetection>,
    pub persons: Vec<RawDetection>,
    pub road_signs: Vec<RawDetection>,
    pub scene_analysis: Option<serde_json::Map<String, serde_json::Value>>,
    pub recommendations: Option<RawRecommendations>,
}

/// `snake_case` wire keys become display labels: `road_surface` turns
/// into `Road Surface`.
fn humanize(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn scene_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl RawAnalysisResult {
    fn required(field: &'static str, value: Option<String>) -> Result<String, AnalysisError> {
        value.ok_or_else(|| AnalysisError::MissingField(field.to_string()))
    }

    pub fn validate(self) -> Result<AnalysisResult, AnalysisError> {
        let id = Self::required("id", self.id)?;
        let evidence_id = EvidenceId::new(Self::required("evidenceId", self.evidence_id)?);
        let report_id = ReportId::new(Self::required("reportId", self.report_id)?);
        let kind = AnalysisKind::parse(&Self::required("analysisType", self.analysis_type)?)?;
        let status = AnalysisStatus::parse(&Self::required("status", self.status)?)?;
        let confidence = Confidence::new(self.confidence.unwrap_or(0.0))?;

        let vehicles = self
            .vehicles
            .into_iter()
            .map(|raw| {
                Ok(DetectedVehicle {
                    confidence: raw.confidence()?,
                    make: raw.make,
                    model: raw.model,
                    color: raw.color,
                    plate: raw.plate,
                })
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;

        let persons = self
            .persons
            .into_iter()
            .map(|raw| {
                Ok(DetectedPerson {
                    confidence: raw.confidence()?,
                    description: raw.description,
                    role_hint: raw.role,
                })
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;

        let road_signs = self
            .road_signs
            .into_iter()
            .map(|raw| {
                Ok(DetectedRoadSign {
                    confidence: raw.confidence()?,
                    sign_type: raw.sign_type,
                    text: raw.text,
                })
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;

        let scene = self
            .scene_analysis
            .map(|map| {
                map.iter()
                    .map(|(key, value)| SceneEntry {
                        label: humanize(key),
                        value: scene_value(value),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let recommendations = self.recommendations.map(|raw| Recommendations {
            priority: match raw.priority.as_deref() {
                Some("high") => RecommendationPriority::High,
                Some("low") => RecommendationPriority::Low,
                _ => RecommendationPriority::Medium,
            },
            summary: raw.summary,
            additional_evidence: raw.additional_evidence,
            expert_consultation: raw.expert_consultation,
        });

        Ok(AnalysisResult {
            id,
            evidence_id,
            report_id,
            incident_id: self.incident_id.map(IncidentId::new),
            kind,
            status,
            confidence,
            processing_time_ms: self.processing_time_ms.unwrap_or(0),
            token_count: self.token_count.unwrap_or(0),
            analysis_text: self.analysis.unwrap_or_default(),
            vehicles,
            persons,
            road_signs,
            scene,
            recommendations,
        })
    }
}

/// Counts and average confidence for one result set; shown in the panel
/// header and on the PDF summary card.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct ProcessingSummary {
    pub total: usize,
    pub completed: usize,
    pub processing: usize,
    pub failed: usize,
    pub average_confidence: f64,
}

impl ProcessingSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_results(results: &[AnalysisResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.status {
                AnalysisStatus::Completed => summary.completed += 1,
                AnalysisStatus::Processing => summary.processing += 1,
                AnalysisStatus::Failed => summary.failed += 1,
            }
        }
        if !results.is_empty() {
            let sum: f64 = results.iter().map(|r| r.confidence.value()).sum();
            summary.average_confidence = sum / results.len() as f64;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_completed(confidence: f64) -> RawAnalysisResult {
        RawAnalysisResult {
            id: Some("an-1".into()),
            evidence_id: Some("ev-1".into()),
            report_id: Some("rep-1".into()),
            analysis_type: Some("image_analysis".into()),
            status: Some("completed".into()),
            confidence: Some(confidence),
            processing_time_ms: Some(4230),
            token_count: Some(812),
            analysis: Some("Findings:\n• dented bumper".into()),
            ..RawAnalysisResult::default()
        }
    }

    #[test]
    fn validation_accepts_complete_payload() {
        let result = raw_completed(0.945).validate().unwrap();
        assert_eq!(result.kind, AnalysisKind::Image);
        assert_eq!(result.status, AnalysisStatus::Completed);
        assert_eq!(result.confidence.percent_label(), "94.5%");
        assert_eq!(result.processing_time_ms, 4230);
    }

    #[test]
    fn validation_rejects_missing_ids() {
        let mut raw = raw_completed(0.5);
        raw.evidence_id = None;
        assert_eq!(
            raw.validate(),
            Err(AnalysisError::MissingField("evidenceId".into()))
        );
    }

    #[test]
    fn validation_rejects_out_of_range_confidence() {
        assert!(matches!(
            raw_completed(1.2).validate(),
            Err(AnalysisError::InvalidConfidence(_))
        ));
        assert!(matches!(
            raw_completed(f64::NAN).validate(),
            Err(AnalysisError::InvalidConfidence(_))
        ));
    }

    #[test]
    fn validation_rejects_unknown_kind() {
        let mut raw = raw_completed(0.5);
        raw.analysis_type = Some("thermal".into());
        assert_eq!(
            raw.validate(),
            Err(AnalysisError::UnknownKind("thermal".into()))
        );
    }

    #[test]
    fn scene_keys_are_humanized() {
        let mut raw = raw_completed(0.5);
        let mut map = serde_json::Map::new();
        map.insert("road_surface".into(), serde_json::Value::String("wet".into()));
        map.insert("vehicle_count".into(), serde_json::json!(2));
        raw.scene_analysis = Some(map);

        let result = raw.validate().unwrap();
        assert!(result
            .scene
            .iter()
            .any(|e| e.label == "Road Surface" && e.value == "wet"));
        assert!(result
            .scene
            .iter()
            .any(|e| e.label == "Vehicle Count" && e.value == "2"));
    }

    #[test]
    fn vehicle_summary_composes_known_attributes() {
        let vehicle = DetectedVehicle {
            make: Some("Toyota".into()),
            model: Some("Corolla".into()),
            color: Some("blue".into()),
            plate: Some("ABC-123".into()),
            confidence: Confidence::new(0.9).unwrap(),
        };
        assert_eq!(vehicle.summary(), "Toyota Corolla, blue, plate ABC-123");

        let unknown = DetectedVehicle {
            make: None,
            model: None,
            color: None,
            plate: None,
            confidence: Confidence::new(0.2).unwrap(),
        };
        assert_eq!(unknown.summary(), "Unidentified vehicle");
    }

    #[test]
    fn summary_counts_statuses_and_averages_confidence() {
        let mut completed = raw_completed(0.9).validate().unwrap();
        completed.id = "an-1".into();
        let mut failed = raw_completed(0.5).validate().unwrap();
        failed.status = AnalysisStatus::Failed;

        let summary = ProcessingSummary::from_results(&[completed, failed]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.failed, 1);
        assert!((summary.average_confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn wire_payload_decodes_camel_case() {
        let json = r#"{
            "id": "an-9",
            "evidenceId": "ev-9",
            "reportId": "rep-9",
            "analysisType": "video",
            "status": "processing",
            "confidence": 0.31,
            "processingTimeMs": 120,
            "tokenCount": 40,
            "vehicles": [{"make": "Ford", "confidence": 0.8}]
        }"#;
        let raw: RawAnalysisResult = serde_json::from_str(json).unwrap();
        let result = raw.validate().unwrap();
        assert_eq!(result.kind, AnalysisKind::Video);
        assert_eq!(result.status, AnalysisStatus::Processing);
        assert_eq!(result.vehicles.len(), 1);
        assert_eq!(result.vehicles[0].make.as_deref(), Some("Ford"));
    }
}
