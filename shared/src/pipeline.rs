//! Sequential incident submission pipeline.
//!
//! Submission works on an immutable snapshot of the wizard taken at
//! submit time, so edits made while the pipeline runs cannot change what
//! is sent. Media uploads fan out first; every backend record is then
//! created one request at a time, in dependency order, because each step
//! needs the ids the previous one returned. The whole run is tagged with
//! an [`OpId`] and responses carrying a different tag are dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::api::{
    CreateEvidenceRequest, CreateIncidentRequest, CreatePersonRequest, CreateReportRequest,
    CreateVehicleRequest,
};
use crate::capabilities::{BlobHandle, MediaUpload};
use crate::event::{EvidenceId, IncidentId, LocalId, OpId, PersonId, UserId, VehicleId};
use crate::model::{IncidentDraft, Person, ReportPriority, Vehicle};
use crate::staging::{EvidenceKind, StagedEvidence};

/// Evidence snapshot carried through the pipeline. The upload result is
/// filled in as [`MediaUpload`]s arrive.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SubmissionEvidence {
    pub local_id: LocalId,
    pub title: String,
    pub description: Option<String>,
    pub kind: EvidenceKind,
    pub handle: Option<BlobHandle>,
    pub file_url: Option<String>,
    pub file_format: Option<String>,
    pub file_size: Option<u64>,
    pub tags: Vec<String>,
}

impl SubmissionEvidence {
    fn snapshot(item: &StagedEvidence) -> Self {
        Self {
            local_id: item.local_id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            kind: item.kind,
            handle: item.file.as_ref().map(|f| f.handle.clone()),
            file_url: None,
            file_format: None,
            file_size: item.file.as_ref().map(|f| f.size),
            tags: item.tags.iter().cloned().collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// Waiting for the shell to upload the blobs named in `pending`.
    UploadingMedia { pending: BTreeSet<LocalId> },
    CreatingEvidence { next: usize },
    CreatingVehicles { next: usize },
    CreatingPersons { next: usize },
    CreatingIncident,
    CreatingReport,
}

/// The next shell request the pipeline wants dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prepared {
    CreateEvidence(CreateEvidenceRequest),
    CreateVehicle(CreateVehicleRequest),
    CreatePerson(CreatePersonRequest),
    CreateIncident(CreateIncidentRequest),
    CreateReport(CreateReportRequest),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Submission {
    pub op: OpId,
    pub uploaded_by: UserId,
    pub incident: IncidentDraft,
    pub vehicles: Vec<Vehicle>,
    pub persons: Vec<Person>,
    pub evidence: Vec<SubmissionEvidence>,
    pub phase: SubmissionPhase,
    pub evidence_ids: Vec<EvidenceId>,
    pub vehicle_ids: Vec<VehicleId>,
    pub person_ids: Vec<PersonId>,
    pub incident_id: Option<IncidentId>,
}

impl Submission {
    /// Snapshots the wizard and starts in the upload phase. Call
    /// [`Submission::roll_phase`] afterwards; with no files attached the
    /// upload phase is empty and rolls straight into record creation.
    #[must_use]
    pub fn start(
        uploaded_by: UserId,
        incident: IncidentDraft,
        vehicles: Vec<Vehicle>,
        persons: Vec<Person>,
        staged: &[StagedEvidence],
    ) -> Self {
        let evidence: Vec<_> = staged.iter().map(SubmissionEvidence::snapshot).collect();
        let pending = evidence
            .iter()
            .filter(|item| item.handle.is_some())
            .map(|item| item.local_id.clone())
            .collect();
        Self {
            op: OpId::generate(),
            uploaded_by,
            incident,
            vehicles,
            persons,
            evidence,
            phase: SubmissionPhase::UploadingMedia { pending },
            evidence_ids: Vec::new(),
            vehicle_ids: Vec::new(),
            person_ids: Vec::new(),
            incident_id: None,
        }
    }

    /// Blobs the shell still has to upload, dispatched once at submit.
    #[must_use]
    pub fn pending_uploads(&self) -> Vec<(LocalId, BlobHandle)> {
        self.evidence
            .iter()
            .filter_map(|item| {
                item.handle
                    .as_ref()
                    .map(|handle| (item.local_id.clone(), handle.clone()))
            })
            .collect()
    }

    /// Records one completed upload. Returns `false` if the id does not
    /// belong to this submission.
    pub fn record_upload(&mut self, id: &LocalId, upload: &MediaUpload) -> bool {
        let Some(item) = self.evidence.iter_mut().find(|item| &item.local_id == id) else {
            return false;
        };
        item.file_url = Some(upload.url.clone());
        item.file_format = Some(upload.format.clone());
        item.file_size = Some(upload.size);
        if let SubmissionPhase::UploadingMedia { pending } = &mut self.phase {
            pending.remove(id);
        }
        true
    }

    pub fn record_evidence_created(&mut self, id: EvidenceId) {
        self.evidence_ids.push(id);
        if let SubmissionPhase::CreatingEvidence { next } = &mut self.phase {
            *next += 1;
        }
    }

    pub fn record_vehicle_created(&mut self, id: VehicleId) {
        self.vehicle_ids.push(id);
        if let SubmissionPhase::CreatingVehicles { next } = &mut self.phase {
            *next += 1;
        }
    }

    pub fn record_person_created(&mut self, id: PersonId) {
        self.person_ids.push(id);
        if let SubmissionPhase::CreatingPersons { next } = &mut self.phase {
            *next += 1;
        }
    }

    pub fn record_incident_created(&mut self, id: IncidentId) {
        self.incident_id = Some(id);
        if matches!(self.phase, SubmissionPhase::CreatingIncident) {
            self.phase = SubmissionPhase::CreatingReport;
        }
    }

    /// Advances past exhausted phases so [`Submission::prepare_next_request`]
    /// always points at real work. Skips the vehicle phase when no
    /// vehicles were entered, and so on.
    pub fn roll_phase(&mut self) {
        loop {
            match &self.phase {
                SubmissionPhase::UploadingMedia { pending } if pending.is_empty() => {
                    self.phase = SubmissionPhase::CreatingEvidence { next: 0 };
                }
                SubmissionPhase::CreatingEvidence { next } if *next >= self.evidence.len() => {
                    self.phase = SubmissionPhase::CreatingVehicles { next: 0 };
                }
                SubmissionPhase::CreatingVehicles { next } if *next >= self.vehicles.len() => {
                    self.phase = SubmissionPhase::CreatingPersons { next: 0 };
                }
                SubmissionPhase::CreatingPersons { next } if *next >= self.persons.len() => {
                    self.phase = SubmissionPhase::CreatingIncident;
                }
                _ => return,
            }
        }
    }

    /// Builds the request for the current phase, or `None` while uploads
    /// are still outstanding.
    #[must_use]
    pub fn prepare_next_request(&self) -> Option<Prepared> {
        match &self.phase {
            SubmissionPhase::UploadingMedia { .. } => None,
            SubmissionPhase::CreatingEvidence { next } => {
                let item = self.evidence.get(*next)?;
                Some(Prepared::CreateEvidence(CreateEvidenceRequest {
                    title: item.title.clone(),
                    description: item.description.clone(),
                    kind: kind_wire(item.kind),
                    file_url: item.file_url.clone(),
                    file_format: item.file_format.clone(),
                    file_size: item.file_size,
                    uploaded_by: self.uploaded_by.to_string(),
                    tags: item.tags.clone(),
                }))
            }
            SubmissionPhase::CreatingVehicles { next } => {
                let vehicle = self.vehicles.get(*next)?;
                Some(Prepared::CreateVehicle(CreateVehicleRequest {
                    make: vehicle.make.clone(),
                    model: vehicle.model.clone(),
                    year: vehicle.year,
                    color: vehicle.color.clone(),
                    license_plate: vehicle.plate.clone(),
                    vin: vehicle.vin.clone(),
                    kind: snake_wire(&vehicle.kind),
                    occupant_count: vehicle.occupant_count,
                    damage_description: vehicle.damage_description.clone(),
                    damage_severity: snake_wire(&vehicle.damage_severity),
                    damage_areas: vehicle.damage_areas.clone(),
                }))
            }
            SubmissionPhase::CreatingPersons { next } => {
                let person = self.persons.get(*next)?;
                Some(Prepared::CreatePerson(CreatePersonRequest {
                    first_name: person.first_name.clone(),
                    last_name: person.last_name.clone(),
                    age: person.age,
                    gender: snake_wire(&person.gender),
                    role: snake_wire(&person.role),
                    contact: person.contact.clone(),
                    statement: person.statement.clone(),
                }))
            }
            SubmissionPhase::CreatingIncident => {
                Some(Prepared::CreateIncident(CreateIncidentRequest {
                    location: self.incident.location.clone(),
                    kind: snake_wire(&self.incident.kind),
                    severity: snake_wire(&self.incident.severity),
                    occurred_at: self.incident.occurred_at.clone(),
                    casualties_count: self.incident.casualty_count,
                    description: self.incident.description.clone(),
                    weather_conditions: self.incident.weather_conditions.iter().cloned().collect(),
                    road_conditions: self.incident.road_conditions.iter().cloned().collect(),
                    evidence_ids: self.evidence_ids.iter().map(ToString::to_string).collect(),
                    vehicle_ids: self.vehicle_ids.iter().map(ToString::to_string).collect(),
                    person_ids: self.person_ids.iter().map(ToString::to_string).collect(),
                }))
            }
            SubmissionPhase::CreatingReport => {
                let incident_id = self.incident_id.as_ref()?;
                Some(Prepared::CreateReport(CreateReportRequest {
                    incident_id: incident_id.to_string(),
                    title: self.derived_title(),
                    priority: ReportPriority::from_severity(self.incident.severity)
                        .label()
                        .to_string(),
                    status: "Submitted".to_string(),
                    content: self.summary(),
                }))
            }
        }
    }

    /// Report title derived from the incident, e.g.
    /// `Collision at Main St & 5th Ave`.
    #[must_use]
    pub fn derived_title(&self) -> String {
        format!("{} at {}", self.incident.kind.label(), self.incident.location)
    }

    fn summary(&self) -> String {
        format!(
            "{} reported at {} on {}. Records: {} evidence item(s), {} vehicle(s), {} person(s). {}",
            self.incident.kind.label(),
            self.incident.location,
            self.incident.occurred_at,
            self.evidence.len(),
            self.vehicles.len(),
            self.persons.len(),
            self.incident.description,
        )
    }

    /// Progress label shown while the pipeline runs.
    #[must_use]
    pub fn phase_label(&self) -> String {
        match &self.phase {
            SubmissionPhase::UploadingMedia { pending } => {
                format!("Uploading media ({} remaining)", pending.len())
            }
            SubmissionPhase::CreatingEvidence { next } => {
                format!("Creating evidence records ({}/{})", next + 1, self.evidence.len())
            }
            SubmissionPhase::CreatingVehicles { next } => {
                format!("Creating vehicle records ({}/{})", next + 1, self.vehicles.len())
            }
            SubmissionPhase::CreatingPersons { next } => {
                format!("Creating person records ({}/{})", next + 1, self.persons.len())
            }
            SubmissionPhase::CreatingIncident => "Creating incident".to_string(),
            SubmissionPhase::CreatingReport => "Creating report".to_string(),
        }
    }
}

fn kind_wire(kind: EvidenceKind) -> String {
    snake_wire(&kind)
}

/// Wire form of a `snake_case`-tagged enum, without the JSON quotes.
fn snake_wire<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(ToString::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FileInfo;
    use crate::model::Severity;
    use crate::staging::EvidenceStaging;

    fn draft() -> IncidentDraft {
        IncidentDraft {
            location: "Main St & 5th Ave".into(),
            occurred_at: "2026-08-24T10:30".into(),
            description: "Two-vehicle collision".into(),
            severity: Severity::Severe,
            ..IncidentDraft::default()
        }
    }

    fn staged_with_file() -> EvidenceStaging {
        let mut staging = EvidenceStaging::default();
        let id = staging.add(EvidenceKind::Photo).unwrap();
        staging.apply(&id, crate::event::EvidenceField::Title("Scene".into()));
        staging.attach_file(
            &id,
            FileInfo {
                name: "scene.jpg".into(),
                size: 2048,
                mime: "image/jpeg".into(),
            },
            BlobHandle {
                local_id: LocalId::generate(),
                size_bytes: 2048,
            },
        );
        staging
    }

    fn upload() -> MediaUpload {
        MediaUpload {
            url: "https://media.example.com/u/1".into(),
            public_id: "u/1".into(),
            resource_type: "image".into(),
            format: "jpg".into(),
            size: 2048,
            width: Some(800),
            height: Some(600),
        }
    }

    #[test]
    fn starts_in_upload_phase_when_files_present() {
        let staging = staged_with_file();
        let mut submission = Submission::start(
            UserId::new("user-1"),
            draft(),
            vec![],
            vec![],
            staging.items(),
        );
        submission.roll_phase();
        assert!(matches!(
            submission.phase,
            SubmissionPhase::UploadingMedia { .. }
        ));
        assert_eq!(submission.pending_uploads().len(), 1);
        assert_eq!(submission.prepare_next_request(), None);
    }

    #[test]
    fn upload_completion_unblocks_evidence_phase() {
        let staging = staged_with_file();
        let id = staging.items()[0].local_id.clone();
        let mut submission = Submission::start(
            UserId::new("user-1"),
            draft(),
            vec![],
            vec![],
            staging.items(),
        );
        submission.roll_phase();

        assert!(submission.record_upload(&id, &upload()));
        submission.roll_phase();

        match submission.prepare_next_request() {
            Some(Prepared::CreateEvidence(request)) => {
                assert_eq!(request.title, "Scene");
                assert_eq!(request.file_url.as_deref(), Some("https://media.example.com/u/1"));
                assert_eq!(request.uploaded_by, "user-1");
            }
            other => panic!("expected evidence request, got {other:?}"),
        }
    }

    #[test]
    fn empty_phases_are_skipped() {
        // No files, no vehicles, no persons: first request is the lone
        // evidence record, then straight to the incident.
        let mut staging = EvidenceStaging::default();
        let id = staging.add(EvidenceKind::Document).unwrap();
        staging.apply(&id, crate::event::EvidenceField::Title("Report".into()));

        let mut submission = Submission::start(
            UserId::new("user-1"),
            draft(),
            vec![],
            vec![],
            staging.items(),
        );
        submission.roll_phase();
        assert!(matches!(
            submission.phase,
            SubmissionPhase::CreatingEvidence { next: 0 }
        ));

        submission.record_evidence_created(EvidenceId::new("ev-1"));
        submission.roll_phase();
        assert!(matches!(submission.phase, SubmissionPhase::CreatingIncident));

        match submission.prepare_next_request() {
            Some(Prepared::CreateIncident(request)) => {
                assert_eq!(request.evidence_ids, vec!["ev-1".to_string()]);
                assert_eq!(request.severity, "severe");
                assert_eq!(request.kind, "collision");
            }
            other => panic!("expected incident request, got {other:?}"),
        }
    }

    #[test]
    fn report_derives_title_priority_and_status() {
        let mut submission =
            Submission::start(UserId::new("user-1"), draft(), vec![], vec![], &[]);
        submission.roll_phase();
        assert!(matches!(submission.phase, SubmissionPhase::CreatingIncident));

        submission.record_incident_created(IncidentId::new("inc-1"));
        match submission.prepare_next_request() {
            Some(Prepared::CreateReport(request)) => {
                assert_eq!(request.incident_id, "inc-1");
                assert_eq!(request.title, "Collision at Main St & 5th Ave");
                assert_eq!(request.priority, "High Priority");
                assert_eq!(request.status, "Submitted");
                assert!(request.content.contains("Main St & 5th Ave"));
            }
            other => panic!("expected report request, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_is_isolated_from_later_edits() {
        let staging = staged_with_file();
        let submission = Submission::start(
            UserId::new("user-1"),
            draft(),
            vec![],
            vec![],
            staging.items(),
        );

        let mut live = staging;
        let id = live.items()[0].local_id.clone();
        live.apply(&id, crate::event::EvidenceField::Title("Edited later".into()));

        assert_eq!(submission.evidence[0].title, "Scene");
    }

    #[test]
    fn vehicles_and_persons_are_created_in_order() {
        let vehicles = vec![Vehicle::new(), Vehicle::new()];
        let mut submission = Submission::start(
            UserId::new("user-1"),
            draft(),
            vehicles,
            vec![Person::new()],
            &[],
        );
        submission.roll_phase();
        assert!(matches!(
            submission.phase,
            SubmissionPhase::CreatingVehicles { next: 0 }
        ));

        submission.record_vehicle_created(VehicleId::new("vh-1"));
        submission.roll_phase();
        assert!(matches!(
            submission.phase,
            SubmissionPhase::CreatingVehicles { next: 1 }
        ));

        submission.record_vehicle_created(VehicleId::new("vh-2"));
        submission.roll_phase();
        assert!(matches!(
            submission.phase,
            SubmissionPhase::CreatingPersons { next: 0 }
        ));

        submission.record_person_created(PersonId::new("pr-1"));
        submission.roll_phase();
        assert!(matches!(submission.phase, SubmissionPhase::CreatingIncident));
        assert_eq!(submission.vehicle_ids.len(), 2);
    }
}
