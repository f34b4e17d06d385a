use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::{BlobHandle, MediaOutput};
use crate::model::{IncidentType, Person, ReviewDecision, Severity, Vehicle};
use crate::staging::EvidenceKind;

/// Raw body of a backend response; payloads are decoded in the update
/// loop so every endpoint shares one error path.
pub type ApiResult = crux_http::Result<crux_http::Response<Vec<u8>>>;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(LocalId);
typed_id!(OpId);
typed_id!(UserId);
typed_id!(IncidentId);
typed_id!(ReportId);
typed_id!(EvidenceId);
typed_id!(VehicleId);
typed_id!(PersonId);
typed_id!(ConversationId);

impl LocalId {
    /// Throwaway client-side key; records gain real identity only once
    /// the backend creates them.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl OpId {
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

// --- Event payloads ---

/// Metadata of a file the shell has staged locally. The bytes themselves
/// never enter the core; they stay behind the [`BlobHandle`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub mime: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DroppedFile {
    pub info: FileInfo,
    pub handle: BlobHandle,
}

/// Field-level edit of a staged evidence item. Deliberately has no file
/// variant: the attached file can only move through
/// [`Event::FileAttached`] and [`Event::EvidenceRemoved`], so an
/// unrelated field edit can never drop it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum EvidenceField {
    Title(String),
    Description(Option<String>),
    Kind(EvidenceKind),
    TagAdded(String),
    TagRemoved(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum IncidentField {
    Location(String),
    Kind(IncidentType),
    Severity(Severity),
    OccurredAt(String),
    CasualtyCount(u32),
    Description(String),
    WeatherTagToggled(String),
    RoadTagToggled(String),
}

// --- Event enum ---

#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    // Session
    SessionRequested,
    #[serde(skip)]
    SessionReceived(Box<ApiResult>),

    // Incident wizard
    IncidentFieldChanged(IncidentField),
    VehicleAdded,
    VehicleUpdated(Box<Vehicle>),
    VehicleRemoved { id: LocalId },
    PersonAdded,
    PersonUpdated(Box<Person>),
    PersonRemoved { id: LocalId },

    // Evidence staging
    EvidenceAdded { kind: EvidenceKind },
    EvidenceFieldChanged { id: LocalId, field: EvidenceField },
    EvidenceRemoved { id: LocalId },
    FileAttached { id: LocalId, info: FileInfo, handle: BlobHandle },
    FilesDropped(Vec<DroppedFile>),
    UploadTicked { id: LocalId, seq: u32 },

    // Submission pipeline
    SubmitRequested,
    MediaUploaded { op: OpId, id: LocalId, output: Box<MediaOutput> },
    #[serde(skip)]
    EvidenceCreated { op: OpId, result: Box<ApiResult> },
    #[serde(skip)]
    VehicleCreated { op: OpId, result: Box<ApiResult> },
    #[serde(skip)]
    PersonCreated { op: OpId, result: Box<ApiResult> },
    #[serde(skip)]
    IncidentCreated { op: OpId, result: Box<ApiResult> },
    #[serde(skip)]
    ReportCreated { op: OpId, result: Box<ApiResult> },

    // AI analysis
    AnalyzeRequested { report_id: ReportId },
    #[serde(skip)]
    AnalyzeAccepted(Box<ApiResult>),
    ResultsRequested { report_id: ReportId },
    #[serde(skip)]
    ResultsReceived(Box<ApiResult>),
    EnhanceRequested { report_id: ReportId, prompt: String },
    #[serde(skip)]
    EnhanceCompleted { report_id: ReportId, result: Box<ApiResult> },
    CasualtyReportRequested { report_id: ReportId },
    #[serde(skip)]
    CasualtyReportReceived(Box<ApiResult>),

    // Conversation
    ConversationStartRequested { report_id: ReportId },
    #[serde(skip)]
    ConversationStarted(Box<ApiResult>),
    ChatMessageSubmitted { text: String },
    #[serde(skip)]
    ChatReplyReceived(Box<ApiResult>),

    // Report review (chief role)
    ReportReviewRequested { report_id: ReportId, decision: ReviewDecision },
    #[serde(skip)]
    ReportReviewed { decision: ReviewDecision, result: Box<ApiResult> },

    // Export
    ExportPdfRequested { filename: Option<String> },
    DocumentSaved { output: Box<MediaOutput> },

    // UI
    ToastDismissed,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SessionRequested => "session_requested",
            Self::SessionReceived(_) => "session_received",
            Self::IncidentFieldChanged(_) => "incident_field_changed",
            Self::VehicleAdded => "vehicle_added",
            Self::VehicleUpdated(_) => "vehicle_updated",
            Self::VehicleRemoved { .. } => "vehicle_removed",
            Self::PersonAdded => "person_added",
            Self::PersonUpdated(_) => "person_updated",
            Self::PersonRemoved { .. } => "person_removed",
            Self::EvidenceAdded { .. } => "evidence_added",
            Self::EvidenceFieldChanged { .. } => "evidence_field_changed",
            Self::EvidenceRemoved { .. } => "evidence_removed",
            Self::FileAttached { .. } => "file_attached",
            Self::FilesDropped(_) => "files_dropped",
            Self::UploadTicked { .. } => "upload_ticked",
            Self::SubmitRequested => "submit_requested",
            Self::MediaUploaded { .. } => "media_uploaded",
            Self::EvidenceCreated { .. } => "evidence_created",
            Self::VehicleCreated { .. } => "vehicle_created",
            Self::PersonCreated { .. } => "person_created",
            Self::IncidentCreated { .. } => "incident_created",
            Self::ReportCreated { .. } => "report_created",
            Self::AnalyzeRequested { .. } => "analyze_requested",
            Self::AnalyzeAccepted(_) => "analyze_accepted",
            Self::ResultsRequested { .. } => "results_requested",
            Self::ResultsReceived(_) => "results_received",
            Self::EnhanceRequested { .. } => "enhance_requested",
            Self::EnhanceCompleted { .. } => "enhance_completed",
            Self::CasualtyReportRequested { .. } => "casualty_report_requested",
            Self::CasualtyReportReceived(_) => "casualty_report_received",
            Self::ConversationStartRequested { .. } => "conversation_start_requested",
            Self::ConversationStarted(_) => "conversation_started",
            Self::ChatMessageSubmitted { .. } => "chat_message_submitted",
            Self::ChatReplyReceived(_) => "chat_reply_received",
            Self::ReportReviewRequested { .. } => "report_review_requested",
            Self::ReportReviewed { .. } => "report_reviewed",
            Self::ExportPdfRequested { .. } => "export_pdf_requested",
            Self::DocumentSaved { .. } => "document_saved",
            Self::ToastDismissed => "toast_dismissed",
        }
    }
}
