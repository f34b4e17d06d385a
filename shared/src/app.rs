//! The ISAAC application core: event handling and the view model.

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::api;
use crate::capabilities::{Capabilities, MediaOutput};
use crate::event::{ApiResult, Event, LocalId, OpId, ReportId, UserId};
use crate::formatter::{self, Section};
use crate::model::{
    ChatAuthor, ChatMessage, Conversation, Model, ReviewDecision, Session, SubmissionReceipt,
};
use crate::pipeline::{Prepared, Submission};
use crate::staging::{EvidenceKind, TickOutcome};
use crate::{
    AppError, ErrorKind, ToastKind, ToastMessage, ANALYSIS_HEADER_THRESHOLD,
    CHAT_HEADER_THRESHOLD, MAX_PERSONS, MAX_VEHICLES, UPLOAD_TICK_BASE_MS, UPLOAD_TICK_JITTER_MS,
};

#[derive(Default)]
pub struct App;

/// Decodes a backend response, mapping transport, status and body
/// failures onto the error taxonomy.
fn parse_response<T: DeserializeOwned>(result: ApiResult) -> Result<T, AppError> {
    let mut response = result.map_err(|e| AppError::network(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        let kind = if u16::from(status) == 404 {
            ErrorKind::NotFound
        } else {
            ErrorKind::Server
        };
        return Err(AppError::new(kind, format!("unexpected status {status}")));
    }
    let body = response
        .take_body()
        .ok_or_else(|| AppError::deserialization("empty response body"))?;
    serde_json::from_slice(&body).map_err(|e| AppError::deserialization(e.to_string()))
}

/// Like [`parse_response`] for endpoints whose body we do not read.
fn ensure_success(result: ApiResult) -> Result<(), AppError> {
    let response = result.map_err(|e| AppError::network(e.to_string()))?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let kind = if u16::from(status) == 404 {
            ErrorKind::NotFound
        } else {
            ErrorKind::Server
        };
        Err(AppError::new(kind, format!("unexpected status {status}")))
    }
}

fn post_json<B, F>(caps: &Capabilities, url: &str, body: &B, make_event: F) -> Result<(), AppError>
where
    B: Serialize,
    F: FnOnce(ApiResult) -> Event + Send + 'static,
{
    caps.http
        .post(url)
        .body_json(body)
        .map_err(|e| AppError::serialization(e.to_string()))?
        .send(make_event);
    Ok(())
}

fn schedule_tick(caps: &Capabilities, id: LocalId, seq: u32) {
    let jitter = rand::thread_rng().gen_range(0..UPLOAD_TICK_JITTER_MS);
    caps.timer
        .after(UPLOAD_TICK_BASE_MS + jitter, Event::UploadTicked { id, seq });
}

impl App {
    fn toast(model: &mut Model, toast: ToastMessage) {
        model.active_toast = Some(toast);
    }

    fn report_error(model: &mut Model, error: &AppError) {
        tracing::error!(code = error.code(), context = %error.context, "operation failed");
        Self::toast(model, ToastMessage::destructive(error.user_facing_message()));
        model.active_error = Some(error.clone());
    }

    /// Aborts the running submission. Records already created on the
    /// backend stay; the pipeline is not transactional and a retry
    /// starts a fresh run under a new operation id.
    fn fail_submission(model: &mut Model, error: &AppError) {
        tracing::error!(code = error.code(), context = %error.context, "submission failed");
        model.submission = None;
        model.active_error = Some(error.clone());
        Self::toast(
            model,
            ToastMessage::destructive("Failed to submit incident report"),
        );
    }

    fn submission_op_matches(model: &Model, op: &OpId) -> bool {
        model
            .submission
            .as_ref()
            .is_some_and(|submission| &submission.op == op)
    }

    /// Rolls the pipeline forward and dispatches the next request, if
    /// any. Called after every recorded response.
    fn advance_submission(&self, model: &mut Model, caps: &Capabilities) {
        let (op, prepared) = {
            let Some(submission) = model.submission.as_mut() else {
                return;
            };
            submission.roll_phase();
            (submission.op.clone(), submission.prepare_next_request())
        };
        let Some(prepared) = prepared else {
            // Still waiting on media uploads.
            return;
        };

        let dispatched = match prepared {
            Prepared::CreateEvidence(request) => {
                post_json(caps, &api::evidence(), &request, move |result| {
                    Event::EvidenceCreated {
                        op,
                        result: Box::new(result),
                    }
                })
            }
            Prepared::CreateVehicle(request) => {
                post_json(caps, &api::vehicles(), &request, move |result| {
                    Event::VehicleCreated {
                        op,
                        result: Box::new(result),
                    }
                })
            }
            Prepared::CreatePerson(request) => {
                post_json(caps, &api::persons(), &request, move |result| {
                    Event::PersonCreated {
                        op,
                        result: Box::new(result),
                    }
                })
            }
            Prepared::CreateIncident(request) => {
                post_json(caps, &api::incidents(), &request, move |result| {
                    Event::IncidentCreated {
                        op,
                        result: Box::new(result),
                    }
                })
            }
            Prepared::CreateReport(request) => {
                post_json(caps, &api::reports(), &request, move |result| {
                    Event::ReportCreated {
                        op,
                        result: Box::new(result),
                    }
                })
            }
        };
        if let Err(error) = dispatched {
            Self::fail_submission(model, &error);
        }
    }

    fn handle_submit(&self, model: &mut Model, caps: &Capabilities) {
        let Some(session) = model.session.as_ref() else {
            let error = AppError::user_resolution("submit without a session");
            Self::report_error(model, &error);
            return;
        };
        let missing = model.incident.missing_fields();
        if !missing.is_empty() {
            let error =
                AppError::validation(format!("Missing required fields: {}", missing.join(", ")));
            Self::report_error(model, &error);
            return;
        }
        if !model.staging.all_titled() {
            let error = AppError::validation("Every evidence item needs a title");
            Self::report_error(model, &error);
            return;
        }
        if model.submission.is_some() {
            tracing::warn!("submission already in progress, ignoring");
            return;
        }

        let submission = Submission::start(
            UserId::new(session.user_id.as_str()),
            model.incident.clone(),
            model.vehicles.clone(),
            model.persons.clone(),
            model.staging.items(),
        );
        tracing::info!(
            op = %submission.op,
            evidence = submission.evidence.len(),
            vehicles = submission.vehicles.len(),
            persons = submission.persons.len(),
            "starting submission"
        );

        for (id, handle) in submission.pending_uploads() {
            let op = submission.op.clone();
            caps.media.upload(handle, move |output| Event::MediaUploaded {
                op,
                id,
                output: Box::new(output),
            });
        }
        model.submission = Some(submission);
        model.receipt = None;
        self.advance_submission(model, caps);
    }

    /// Shared handler for the four intermediate create responses; the
    /// caller records the created id on the submission.
    fn handle_pipeline_response(
        &self,
        model: &mut Model,
        caps: &Capabilities,
        op: &OpId,
        result: ApiResult,
        record: impl FnOnce(&mut Submission, String),
    ) {
        if !Self::submission_op_matches(model, op) {
            tracing::warn!(op = %op, "dropping response from a superseded submission");
            return;
        }
        match parse_response::<api::CreatedResponse>(result) {
            Ok(created) => {
                if let Some(submission) = model.submission.as_mut() {
                    record(submission, created.id);
                }
                self.advance_submission(model, caps);
            }
            Err(error) => Self::fail_submission(model, &error),
        }
    }

    fn fetch_results(model: &mut Model, caps: &Capabilities, report_id: &ReportId) {
        model.analysis.report_id = Some(report_id.clone());
        model.analysis.loading = true;
        model.analysis.error = None;
        caps.http
            .get(api::report_results(report_id.as_str()))
            .send(|result| Event::ResultsReceived(Box::new(result)));
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        tracing::debug!(event = event.name(), "update");
        match event {
            // --- Session ---
            Event::SessionRequested => {
                model.session_loading = true;
                caps.http
                    .get(api::auth_me())
                    .send(|result| Event::SessionReceived(Box::new(result)));
            }
            Event::SessionReceived(result) => {
                model.session_loading = false;
                match parse_response::<api::SessionResponse>(*result) {
                    Ok(session) => {
                        model.session = Some(Session {
                            user_id: UserId::new(session.id),
                            name: session.name,
                            role: session.role,
                        });
                    }
                    Err(error) => {
                        let error = AppError::new(ErrorKind::UserResolution, error.context);
                        Self::report_error(model, &error);
                    }
                }
            }

            // --- Incident wizard ---
            Event::IncidentFieldChanged(field) => {
                use crate::event::IncidentField;
                match field {
                    IncidentField::Location(value) => model.incident.location = value,
                    IncidentField::Kind(value) => model.incident.kind = value,
                    IncidentField::Severity(value) => model.incident.severity = value,
                    IncidentField::OccurredAt(value) => model.incident.occurred_at = value,
                    IncidentField::CasualtyCount(value) => model.incident.casualty_count = value,
                    IncidentField::Description(value) => model.incident.description = value,
                    IncidentField::WeatherTagToggled(tag) => model.incident.toggle_weather_tag(tag),
                    IncidentField::RoadTagToggled(tag) => model.incident.toggle_road_tag(tag),
                }
            }
            Event::VehicleAdded => {
                if model.vehicles.len() < MAX_VEHICLES {
                    model.vehicles.push(crate::model::Vehicle::new());
                } else {
                    Self::toast(model, ToastMessage::destructive("Vehicle limit reached"));
                }
            }
            Event::VehicleUpdated(vehicle) => {
                if let Some(existing) = model
                    .vehicles
                    .iter_mut()
                    .find(|v| v.local_id == vehicle.local_id)
                {
                    *existing = *vehicle;
                }
            }
            Event::VehicleRemoved { id } => {
                model.vehicles.retain(|v| v.local_id != id);
            }
            Event::PersonAdded => {
                if model.persons.len() < MAX_PERSONS {
                    model.persons.push(crate::model::Person::new());
                } else {
                    Self::toast(model, ToastMessage::destructive("Person limit reached"));
                }
            }
            Event::PersonUpdated(person) => {
                if let Some(existing) = model
                    .persons
                    .iter_mut()
                    .find(|p| p.local_id == person.local_id)
                {
                    *existing = *person;
                }
            }
            Event::PersonRemoved { id } => {
                model.persons.retain(|p| p.local_id != id);
            }

            // --- Evidence staging ---
            Event::EvidenceAdded { kind } => {
                if model.staging.add(kind).is_none() {
                    Self::toast(model, ToastMessage::destructive("Evidence limit reached"));
                }
            }
            Event::EvidenceFieldChanged { id, field } => {
                if !model.staging.apply(&id, field) {
                    tracing::warn!(%id, "edit for an evidence item that no longer exists");
                }
            }
            Event::EvidenceRemoved { id } => {
                model.staging.remove(&id);
            }
            Event::FileAttached { id, info, handle } => {
                if let Some(seq) = model.staging.attach_file(&id, info, handle) {
                    schedule_tick(caps, id, seq);
                } else {
                    tracing::warn!(%id, "file attached to an evidence item that no longer exists");
                }
            }
            Event::FilesDropped(files) => {
                for file in files {
                    let kind = EvidenceKind::from_mime(&file.info.mime);
                    let Some(id) = model.staging.add(kind) else {
                        Self::toast(model, ToastMessage::destructive("Evidence limit reached"));
                        break;
                    };
                    model.staging.apply(
                        &id,
                        crate::event::EvidenceField::Title(file.info.name.clone()),
                    );
                    if let Some(seq) = model.staging.attach_file(&id, file.info, file.handle) {
                        schedule_tick(caps, id, seq);
                    }
                }
            }
            Event::UploadTicked { id, seq } => match model.staging.tick(&id, seq) {
                TickOutcome::Advanced { .. } => schedule_tick(caps, id, seq),
                TickOutcome::Completed => {}
                TickOutcome::Stale => {
                    tracing::debug!(%id, seq, "dropping stale upload tick");
                }
            },

            // --- Submission pipeline ---
            Event::SubmitRequested => self.handle_submit(model, caps),
            Event::MediaUploaded { op, id, output } => {
                if !Self::submission_op_matches(model, &op) {
                    tracing::warn!(op = %op, "dropping upload result from a superseded submission");
                } else {
                    match *output {
                        MediaOutput::Uploaded(upload) => {
                            if let Some(submission) = model.submission.as_mut() {
                                submission.record_upload(&id, &upload);
                            }
                            self.advance_submission(model, caps);
                        }
                        MediaOutput::Failed { message } => {
                            Self::fail_submission(model, &AppError::media(message));
                        }
                        MediaOutput::Saved => {
                            tracing::warn!("unexpected save acknowledgement during upload");
                        }
                    }
                }
            }
            Event::EvidenceCreated { op, result } => {
                self.handle_pipeline_response(model, caps, &op, *result, |submission, id| {
                    submission.record_evidence_created(crate::event::EvidenceId::new(id));
                });
            }
            Event::VehicleCreated { op, result } => {
                self.handle_pipeline_response(model, caps, &op, *result, |submission, id| {
                    submission.record_vehicle_created(crate::event::VehicleId::new(id));
                });
            }
            Event::PersonCreated { op, result } => {
                self.handle_pipeline_response(model, caps, &op, *result, |submission, id| {
                    submission.record_person_created(crate::event::PersonId::new(id));
                });
            }
            Event::IncidentCreated { op, result } => {
                self.handle_pipeline_response(model, caps, &op, *result, |submission, id| {
                    submission.record_incident_created(crate::event::IncidentId::new(id));
                });
            }
            Event::ReportCreated { op, result } => {
                if !Self::submission_op_matches(model, &op) {
                    tracing::warn!(op = %op, "dropping response from a superseded submission");
                } else {
                    match parse_response::<api::CreatedResponse>(*result) {
                        Ok(created) => {
                            let report_id = ReportId::new(created.id);
                            let incident_id = model
                                .submission
                                .as_ref()
                                .and_then(|s| s.incident_id.clone());
                            if let Some(incident_id) = incident_id {
                                model.receipt = Some(SubmissionReceipt {
                                    incident_id,
                                    report_id: report_id.clone(),
                                });
                            }
                            model.submission = None;
                            model.analysis.report_id = Some(report_id);
                            model.reset_wizard();
                            Self::toast(
                                model,
                                ToastMessage::success("Incident report submitted successfully"),
                            );
                            tracing::info!("submission completed");
                        }
                        Err(error) => Self::fail_submission(model, &error),
                    }
                }
            }

            // --- AI analysis ---
            Event::AnalyzeRequested { report_id } => {
                model.analysis.report_id = Some(report_id.clone());
                model.analysis.loading = true;
                model.analysis.error = None;
                let request = api::AnalyzeReportRequest {
                    report_id: report_id.to_string(),
                };
                if let Err(error) =
                    post_json(caps, &api::analyze_report(), &request, |result| {
                        Event::AnalyzeAccepted(Box::new(result))
                    })
                {
                    model.analysis.loading = false;
                    Self::report_error(model, &error);
                }
            }
            Event::AnalyzeAccepted(result) => match ensure_success(*result) {
                Ok(()) => {
                    if let Some(report_id) = model.analysis.report_id.clone() {
                        Self::fetch_results(model, caps, &report_id);
                    }
                }
                Err(error) => {
                    model.analysis.loading = false;
                    model.analysis.error = Some(error.clone());
                    tracing::error!(code = error.code(), "analysis request rejected");
                }
            },
            Event::ResultsRequested { report_id } => {
                Self::fetch_results(model, caps, &report_id);
            }
            Event::ResultsReceived(result) => {
                model.analysis.loading = false;
                match parse_response::<api::ResultsResponse>(*result) {
                    Ok(response) => {
                        let mut results: Vec<AnalysisResult> = Vec::new();
                        for raw in response.results {
                            match raw.validate() {
                                Ok(valid) => results.push(valid),
                                Err(error) => {
                                    tracing::warn!(%error, "skipping malformed analysis result");
                                }
                            }
                        }
                        model.analysis.processing = results
                            .iter()
                            .any(|r| r.status == crate::analysis::AnalysisStatus::Processing);
                        model.analysis.results = results;
                        model.analysis.error = None;
                    }
                    Err(error) => {
                        model.analysis.error = Some(error.clone());
                        tracing::error!(code = error.code(), "failed to load analysis results");
                    }
                }
            }
            Event::EnhanceRequested { report_id, prompt } => {
                let request = api::EnhanceRequest { prompt };
                let callback_id = report_id.clone();
                if let Err(error) = post_json(
                    caps,
                    &api::enhance_report(report_id.as_str()),
                    &request,
                    move |result| Event::EnhanceCompleted {
                        report_id: callback_id,
                        result: Box::new(result),
                    },
                ) {
                    Self::report_error(model, &error);
                }
            }
            Event::EnhanceCompleted { report_id, result } => match ensure_success(*result) {
                Ok(()) => {
                    Self::toast(model, ToastMessage::success("Report enhanced"));
                    // The enhanced text lives server-side; re-fetch.
                    self.update(Event::ResultsRequested { report_id }, model, caps);
                }
                Err(error) => Self::report_error(model, &error),
            },
            Event::CasualtyReportRequested { report_id } => {
                caps.http
                    .get(api::casualty_report(report_id.as_str()))
                    .send(|result| Event::CasualtyReportReceived(Box::new(result)));
            }
            Event::CasualtyReportReceived(result) => {
                match parse_response::<api::CasualtyReportResponse>(*result) {
                    Ok(response) => model.casualty_report = Some(response.content),
                    Err(error) => Self::report_error(model, &error),
                }
            }

            // --- Conversation ---
            Event::ConversationStartRequested { report_id } => {
                model.conversation = Some(Conversation {
                    id: None,
                    report_id: report_id.clone(),
                    messages: Vec::new(),
                    awaiting_reply: true,
                });
                let request = api::StartConversationRequest {
                    report_id: report_id.to_string(),
                };
                if let Err(error) = post_json(caps, &api::conversations(), &request, |result| {
                    Event::ConversationStarted(Box::new(result))
                }) {
                    model.conversation = None;
                    Self::report_error(model, &error);
                }
            }
            Event::ConversationStarted(result) => {
                match parse_response::<api::ConversationStartedResponse>(*result) {
                    Ok(response) => {
                        if let Some(conversation) = model.conversation.as_mut() {
                            conversation.id = Some(crate::event::ConversationId::new(
                                response.conversation_id,
                            ));
                            conversation.awaiting_reply = false;
                        }
                    }
                    Err(error) => {
                        model.conversation = None;
                        Self::report_error(model, &error);
                    }
                }
            }
            Event::ChatMessageSubmitted { text } => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return;
                }
                let conversation_id = model
                    .conversation
                    .as_ref()
                    .filter(|c| !c.awaiting_reply)
                    .and_then(|c| c.id.clone());
                let Some(conversation_id) = conversation_id else {
                    tracing::warn!("chat message without an open conversation");
                    return;
                };
                if let Some(conversation) = model.conversation.as_mut() {
                    conversation.messages.push(ChatMessage {
                        author: ChatAuthor::User,
                        text: text.clone(),
                    });
                    conversation.awaiting_reply = true;
                }
                let request = api::SendMessageRequest { message: text };
                if let Err(error) = post_json(
                    caps,
                    &api::conversation_messages(conversation_id.as_str()),
                    &request,
                    |result| Event::ChatReplyReceived(Box::new(result)),
                ) {
                    if let Some(conversation) = model.conversation.as_mut() {
                        conversation.awaiting_reply = false;
                    }
                    Self::report_error(model, &error);
                }
            }
            Event::ChatReplyReceived(result) => {
                match parse_response::<api::ChatReplyResponse>(*result) {
                    Ok(response) => {
                        if let Some(conversation) = model.conversation.as_mut() {
                            conversation.messages.push(ChatMessage {
                                author: ChatAuthor::Assistant,
                                text: response.reply,
                            });
                            conversation.awaiting_reply = false;
                        }
                    }
                    Err(error) => {
                        if let Some(conversation) = model.conversation.as_mut() {
                            conversation.awaiting_reply = false;
                        }
                        Self::report_error(model, &error);
                    }
                }
            }

            // --- Report review ---
            Event::ReportReviewRequested { report_id, decision } => {
                let request = api::ReviewRequest {
                    decision: match decision {
                        ReviewDecision::Approve => "approve".to_string(),
                        ReviewDecision::Reject => "reject".to_string(),
                    },
                };
                if let Err(error) = post_json(
                    caps,
                    &api::report_review(report_id.as_str()),
                    &request,
                    move |result| Event::ReportReviewed {
                        decision,
                        result: Box::new(result),
                    },
                ) {
                    Self::report_error(model, &error);
                }
            }
            Event::ReportReviewed { decision, result } => match ensure_success(*result) {
                Ok(()) => {
                    let message = match decision {
                        ReviewDecision::Approve => "Report approved",
                        ReviewDecision::Reject => "Report rejected",
                    };
                    Self::toast(model, ToastMessage::success(message));
                }
                Err(error) => Self::report_error(model, &error),
            },

            // --- PDF export ---
            #[cfg(feature = "pdf")]
            Event::ExportPdfRequested { filename } => {
                let Some(report_id) = model.analysis.report_id.clone() else {
                    Self::toast(model, ToastMessage::destructive("No analysis results to export"));
                    caps.render.render();
                    return;
                };
                if model.analysis.results.is_empty() {
                    Self::toast(model, ToastMessage::destructive("No analysis results to export"));
                    caps.render.render();
                    return;
                }
                let data = crate::pdf::PdfReportData::new(
                    report_id,
                    model.analysis.results.clone(),
                    crate::now_ms(),
                );
                match data.render_pdf() {
                    Ok(bytes) => {
                        let filename = filename.unwrap_or_else(|| data.suggested_filename());
                        caps.media.save_document(filename, bytes, |output| {
                            Event::DocumentSaved {
                                output: Box::new(output),
                            }
                        });
                    }
                    Err(error) => {
                        Self::report_error(model, &AppError::export(error.to_string()));
                    }
                }
            }
            #[cfg(not(feature = "pdf"))]
            Event::ExportPdfRequested { .. } => {
                Self::toast(
                    model,
                    ToastMessage::destructive("PDF export is not available in this build"),
                );
            }
            Event::DocumentSaved { output } => match *output {
                MediaOutput::Saved => {
                    Self::toast(model, ToastMessage::success("Report downloaded"));
                }
                MediaOutput::Failed { message } => {
                    Self::report_error(model, &AppError::export(message));
                }
                MediaOutput::Uploaded(_) => {
                    tracing::warn!("unexpected upload acknowledgement during save");
                }
            },

            // --- UI ---
            Event::ToastDismissed => model.active_toast = None,
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> Self::ViewModel {
        ViewModel::from_model(model)
    }
}

// --- View model ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionView {
    pub name: String,
    pub role: crate::model::Role,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EvidenceFileView {
    pub name: String,
    pub size_label: String,
    pub progress: u8,
    pub uploaded: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EvidenceItemView {
    pub id: LocalId,
    pub title: String,
    pub kind_label: String,
    pub file: Option<EvidenceFileView>,
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct WizardView {
    pub missing_fields: Vec<String>,
    pub can_submit: bool,
    pub evidence: Vec<EvidenceItemView>,
    pub vehicle_count: usize,
    pub person_count: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SubmissionView {
    pub phase_label: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DetectionView {
    pub summary: String,
    pub confidence_label: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RecommendationsView {
    pub priority_label: String,
    pub summary: Option<String>,
    pub additional_evidence: Vec<String>,
    pub expert_consultation: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AnalysisResultView {
    pub id: String,
    pub kind_label: String,
    pub status_label: String,
    pub confidence_label: String,
    pub processing_time_label: String,
    pub token_count: u32,
    pub sections: Vec<Section>,
    pub vehicles: Vec<DetectionView>,
    pub persons: Vec<DetectionView>,
    pub road_signs: Vec<DetectionView>,
    pub scene: Vec<crate::analysis::SceneEntry>,
    pub recommendations: Option<RecommendationsView>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AnalysisErrorView {
    pub title: String,
    pub message: String,
    pub can_retry: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct AnalysisPanelView {
    pub loading: bool,
    pub processing: bool,
    pub average_confidence_label: Option<String>,
    pub results: Vec<AnalysisResultView>,
    pub error: Option<AnalysisErrorView>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessageView {
    pub from_user: bool,
    pub sections: Vec<Section>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConversationView {
    pub open: bool,
    pub awaiting_reply: bool,
    pub messages: Vec<ChatMessageView>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ToastView {
    pub kind: ToastKind,
    pub message: String,
    pub duration_ms: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ViewModel {
    pub session: Option<SessionView>,
    pub session_loading: bool,
    pub wizard: WizardView,
    pub submission: Option<SubmissionView>,
    pub receipt: Option<SubmissionReceipt>,
    pub analysis: AnalysisPanelView,
    pub conversation: Option<ConversationView>,
    pub casualty_report: Option<String>,
    pub toast: Option<ToastView>,
}

impl ViewModel {
    fn from_model(model: &Model) -> Self {
        let wizard = WizardView {
            missing_fields: model
                .incident
                .missing_fields()
                .iter()
                .map(ToString::to_string)
                .collect(),
            can_submit: model.can_submit(),
            evidence: model
                .staging
                .items()
                .iter()
                .map(|item| EvidenceItemView {
                    id: item.local_id.clone(),
                    title: item.title.clone(),
                    kind_label: item.kind.label().to_string(),
                    file: item.file.as_ref().map(|file| EvidenceFileView {
                        name: file.name.clone(),
                        size_label: formatter::format_file_size(file.size),
                        progress: file.progress,
                        uploaded: file.uploaded,
                    }),
                    tags: item.tags.iter().cloned().collect(),
                })
                .collect(),
            vehicle_count: model.vehicles.len(),
            person_count: model.persons.len(),
        };

        let analysis = AnalysisPanelView {
            loading: model.analysis.loading,
            processing: model.analysis.processing,
            average_confidence_label: (!model.analysis.results.is_empty()).then(|| {
                let summary =
                    crate::analysis::ProcessingSummary::from_results(&model.analysis.results);
                formatter::format_confidence(summary.average_confidence)
            }),
            results: model
                .analysis
                .results
                .iter()
                .map(|result| AnalysisResultView {
                    id: result.id.clone(),
                    kind_label: result.kind.label().to_string(),
                    status_label: result.status.label().to_string(),
                    confidence_label: result.confidence.percent_label(),
                    processing_time_label: formatter::format_processing_time(
                        result.processing_time_ms,
                    ),
                    token_count: result.token_count,
                    sections: formatter::parse_formatted_text(
                        &result.analysis_text,
                        ANALYSIS_HEADER_THRESHOLD,
                    ),
                    vehicles: result
                        .vehicles
                        .iter()
                        .map(|v| DetectionView {
                            summary: v.summary(),
                            confidence_label: v.confidence.percent_label(),
                        })
                        .collect(),
                    persons: result
                        .persons
                        .iter()
                        .map(|p| DetectionView {
                            summary: p.summary(),
                            confidence_label: p.confidence.percent_label(),
                        })
                        .collect(),
                    road_signs: result
                        .road_signs
                        .iter()
                        .map(|s| DetectionView {
                            summary: s.summary(),
                            confidence_label: s.confidence.percent_label(),
                        })
                        .collect(),
                    scene: result.scene.clone(),
                    recommendations: result.recommendations.as_ref().map(|r| {
                        RecommendationsView {
                            priority_label: r.priority.label().to_string(),
                            summary: r.summary.clone(),
                            additional_evidence: r.additional_evidence.clone(),
                            expert_consultation: r.expert_consultation.clone(),
                        }
                    }),
                })
                .collect(),
            error: model.analysis.error.as_ref().map(|error| AnalysisErrorView {
                title: "Error Loading Analysis Results".to_string(),
                message: error.user_facing_message(),
                can_retry: error.is_retryable(),
            }),
        };

        Self {
            session: model.session.as_ref().map(|session| SessionView {
                name: session.name.clone(),
                role: session.role,
            }),
            session_loading: model.session_loading,
            wizard,
            submission: model.submission.as_ref().map(|submission| SubmissionView {
                phase_label: submission.phase_label(),
            }),
            receipt: model.receipt.clone(),
            analysis,
            conversation: model.conversation.as_ref().map(|conversation| {
                ConversationView {
                    open: conversation.id.is_some(),
                    awaiting_reply: conversation.awaiting_reply,
                    messages: conversation
                        .messages
                        .iter()
                        .map(|message| ChatMessageView {
                            from_user: message.author == ChatAuthor::User,
                            sections: formatter::parse_formatted_text(
                                &message.text,
                                CHAT_HEADER_THRESHOLD,
                            ),
                        })
                        .collect(),
                }
            }),
            casualty_report: model.casualty_report.clone(),
            toast: model.active_toast.as_ref().map(|toast| ToastView {
                kind: toast.kind,
                message: toast.message.clone(),
                duration_ms: toast.duration_ms,
            }),
        }
    }
}
