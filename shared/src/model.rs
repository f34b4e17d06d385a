use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::analysis::AnalysisResult;
use crate::event::{ConversationId, IncidentId, LocalId, ReportId, UserId};
use crate::pipeline::Submission;
use crate::staging::EvidenceStaging;
use crate::{AppError, ToastMessage};

// --- Domain enums ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    #[default]
    Collision,
    HitAndRun,
    PedestrianAccident,
    Rollover,
    Dui,
    Speeding,
    Other,
}

impl IncidentType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Collision => "Collision",
            Self::HitAndRun => "Hit and Run",
            Self::PedestrianAccident => "Pedestrian Accident",
            Self::Rollover => "Rollover",
            Self::Dui => "DUI",
            Self::Speeding => "Speeding",
            Self::Other => "Other",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Low,
    #[default]
    Moderate,
    Severe,
    Critical,
    /// Legacy records carry severity values outside the current scale.
    #[serde(other)]
    Unspecified,
}

impl Severity {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Minor => "Minor",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::Critical => "Critical",
            Self::Unspecified => "Unspecified",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportPriority {
    High,
    Medium,
    Low,
}

impl ReportPriority {
    /// Severity-to-priority mapping used when deriving the report from a
    /// submitted incident. Unscaled severities default to Medium.
    #[must_use]
    pub const fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical | Severity::Severe => Self::High,
            Severity::Moderate | Severity::Unspecified => Self::Medium,
            Severity::Minor | Severity::Low => Self::Low,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High Priority",
            Self::Medium => "Medium Priority",
            Self::Low => "Low Priority",
        }
    }
}

impl fmt::Display for ReportPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    #[default]
    Car,
    Truck,
    Motorcycle,
    Bus,
    Bicycle,
    Other,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DamageSeverity {
    #[default]
    Minor,
    Moderate,
    Severe,
    Totaled,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PersonRole {
    #[default]
    Driver,
    Passenger,
    Pedestrian,
    Witness,
    Other,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    Undisclosed,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Traffic,
    Investigator,
    Chief,
    Admin,
}

// --- Wizard records ---

/// The incident being assembled client-side. Mutated only through
/// events; an immutable snapshot is taken at submit time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct IncidentDraft {
    pub location: String,
    pub kind: IncidentType,
    pub severity: Severity,
    pub occurred_at: String,
    pub casualty_count: u32,
    pub description: String,
    pub weather_conditions: BTreeSet<String>,
    pub road_conditions: BTreeSet<String>,
}

impl IncidentDraft {
    /// Names of required fields that are still empty, for inline
    /// validation display.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.location.trim().is_empty() {
            missing.push("location");
        }
        if self.occurred_at.trim().is_empty() {
            missing.push("date and time");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        missing
    }

    pub fn toggle_weather_tag(&mut self, tag: String) {
        if !self.weather_conditions.remove(&tag) {
            self.weather_conditions.insert(tag);
        }
    }

    pub fn toggle_road_tag(&mut self, tag: String) {
        if !self.road_conditions.remove(&tag) {
            self.road_conditions.insert(tag);
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Vehicle {
    pub local_id: LocalId,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<u16>,
    pub color: Option<String>,
    pub plate: Option<String>,
    pub vin: Option<String>,
    pub kind: VehicleKind,
    pub occupant_count: u32,
    pub damage_description: Option<String>,
    pub damage_severity: DamageSeverity,
    pub damage_areas: Vec<String>,
}

impl Vehicle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            local_id: LocalId::generate(),
            make: None,
            model: None,
            year: None,
            color: None,
            plate: None,
            vin: None,
            kind: VehicleKind::default(),
            occupant_count: 1,
            damage_description: None,
            damage_severity: DamageSeverity::default(),
            damage_areas: Vec::new(),
        }
    }
}

impl Default for Vehicle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub local_id: LocalId,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u8>,
    pub gender: Gender,
    pub role: PersonRole,
    pub contact: Option<String>,
    pub statement: Option<String>,
}

impl Person {
    #[must_use]
    pub fn new() -> Self {
        Self {
            local_id: LocalId::generate(),
            first_name: String::new(),
            last_name: String::new(),
            age: None,
            gender: Gender::default(),
            role: PersonRole::default(),
            contact: None,
            statement: None,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        full.trim().to_string()
    }
}

impl Default for Person {
    fn default() -> Self {
        Self::new()
    }
}

// --- Session ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
}

// --- Read-side state ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub incident_id: IncidentId,
    pub report_id: ReportId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct AnalysisPanel {
    pub report_id: Option<ReportId>,
    pub results: Vec<AnalysisResult>,
    pub loading: bool,
    /// The backend is still producing at least one result.
    pub processing: bool,
    pub error: Option<AppError>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatAuthor {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: ChatAuthor,
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Conversation {
    pub id: Option<ConversationId>,
    pub report_id: ReportId,
    pub messages: Vec<ChatMessage>,
    pub awaiting_reply: bool,
}

// --- Model ---

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Model {
    pub session: Option<Session>,
    pub session_loading: bool,

    // Incident wizard
    pub incident: IncidentDraft,
    pub vehicles: Vec<Vehicle>,
    pub persons: Vec<Person>,
    pub staging: EvidenceStaging,

    // Submission pipeline
    pub submission: Option<Submission>,
    pub receipt: Option<SubmissionReceipt>,

    // AI read side
    pub analysis: AnalysisPanel,
    pub conversation: Option<Conversation>,
    pub casualty_report: Option<String>,

    // Generic UI state
    pub active_toast: Option<ToastMessage>,
    pub active_error: Option<AppError>,
}

impl Model {
    /// Clears the wizard after a successful submission. Read-side state
    /// (analysis panel, conversation) is left alone.
    pub fn reset_wizard(&mut self) {
        self.incident = IncidentDraft::default();
        self.vehicles.clear();
        self.persons.clear();
        self.staging.clear();
    }

    /// Evidence titles are required before submission; untitled items
    /// keep the submit action disabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.submission.is_none()
            && self.incident.missing_fields().is_empty()
            && self.staging.all_titled()
    }
}
