//! End-to-end submission pipeline tests driven through the app core.

use crux_core::testing::AppTester;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use serde_json::Value;

use isaac_core::capabilities::{BlobHandle, MediaOperation, MediaOutput, MediaUpload};
use isaac_core::event::{EvidenceField, FileInfo, IncidentField, LocalId, OpId};
use isaac_core::model::Severity;
use isaac_core::staging::EvidenceKind;
use isaac_core::{App, Effect, Event, Model, ToastKind};

fn http_effects(effects: Vec<Effect>) -> Vec<crux_core::Request<HttpRequest>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .collect()
}

fn media_effects(effects: Vec<Effect>) -> Vec<crux_core::Request<MediaOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Media(request) => Some(request),
            _ => None,
        })
        .collect()
}

fn ok_json(body: &str) -> HttpResult {
    HttpResult::Ok(HttpResponse::ok().body(body).build())
}

fn sign_in(app: &AppTester<App, Effect>, model: &mut Model) {
    let update = app.update(Event::SessionRequested, model);
    let mut requests = http_effects(update.effects);
    assert_eq!(requests.len(), 1);
    assert!(requests[0].operation.url.ends_with("/auth/me"));

    let update = app
        .resolve(
            &mut requests[0],
            ok_json(r#"{"id":"user-1","name":"Dana","role":"investigator"}"#),
        )
        .unwrap();
    for event in update.events {
        app.update(event, model);
    }
    assert!(model.session.is_some());
}

fn fill_wizard(app: &AppTester<App, Effect>, model: &mut Model) {
    for field in [
        IncidentField::Location("Main St & 5th Ave".into()),
        IncidentField::OccurredAt("2026-08-24T10:30".into()),
        IncidentField::Description("Two-vehicle collision".into()),
        IncidentField::Severity(Severity::Severe),
    ] {
        app.update(Event::IncidentFieldChanged(field), model);
    }
}

/// Adds one titled evidence item, optionally with an attached file, and
/// returns its id.
fn add_evidence(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    title: &str,
    with_file: bool,
) -> LocalId {
    app.update(
        Event::EvidenceAdded {
            kind: EvidenceKind::Photo,
        },
        model,
    );
    let id = model.staging.items().last().unwrap().local_id.clone();
    app.update(
        Event::EvidenceFieldChanged {
            id: id.clone(),
            field: EvidenceField::Title(title.into()),
        },
        model,
    );
    if with_file {
        app.update(
            Event::FileAttached {
                id: id.clone(),
                info: FileInfo {
                    name: format!("{title}.jpg"),
                    size: 2048,
                    mime: "image/jpeg".into(),
                },
                handle: BlobHandle {
                    local_id: LocalId::generate(),
                    size_bytes: 2048,
                },
            },
            model,
        );
    }
    id
}

fn upload_result(size: u64) -> MediaOutput {
    MediaOutput::Uploaded(MediaUpload {
        url: format!("https://media.example.com/u/{size}"),
        public_id: format!("u/{size}"),
        resource_type: "image".into(),
        format: "jpg".into(),
        size,
        width: Some(800),
        height: Some(600),
    })
}

/// Resolves the single pending HTTP request with `body` and pumps the
/// resulting events back into the core, returning the next effects.
fn resolve_and_pump(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    mut request: crux_core::Request<HttpRequest>,
    body: &str,
) -> Vec<Effect> {
    let update = app.resolve(&mut request, ok_json(body)).unwrap();
    let mut effects = Vec::new();
    for event in update.events {
        effects.extend(app.update(event, model).effects);
    }
    effects
}

#[test]
fn full_submission_runs_sequentially_in_dependency_order() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);
    fill_wizard(&app, &mut model);

    add_evidence(&app, &mut model, "Scene overview", true);
    add_evidence(&app, &mut model, "Dashcam still", true);
    add_evidence(&app, &mut model, "Witness statement", false);
    app.update(Event::VehicleAdded, &mut model);
    app.update(Event::PersonAdded, &mut model);

    // Submit: both uploads fan out, no HTTP until they complete.
    let update = app.update(Event::SubmitRequested, &mut model);
    let mut uploads = media_effects(update.effects);
    assert_eq!(uploads.len(), 2);
    assert!(model.submission.is_some());

    let mut effects = Vec::new();
    for upload in &mut uploads {
        let update = app.resolve(upload, upload_result(2048)).unwrap();
        for event in update.events {
            effects.extend(app.update(event, &mut model).effects);
        }
    }

    // Three evidence records, one at a time.
    for n in 1..=3 {
        let mut requests = http_effects(effects);
        assert_eq!(requests.len(), 1, "pipeline must be sequential");
        assert!(requests[0].operation.url.ends_with("/evidence"));
        assert_eq!(requests[0].operation.method, "POST");
        effects = resolve_and_pump(
            &app,
            &mut model,
            requests.remove(0),
            &format!(r#"{{"id":"ev-{n}"}}"#),
        );
    }

    // One vehicle, one person.
    let mut requests = http_effects(effects);
    assert!(requests[0].operation.url.ends_with("/vehicles"));
    effects = resolve_and_pump(&app, &mut model, requests.remove(0), r#"{"id":"vh-1"}"#);

    let mut requests = http_effects(effects);
    assert!(requests[0].operation.url.ends_with("/persons"));
    effects = resolve_and_pump(&app, &mut model, requests.remove(0), r#"{"id":"pr-1"}"#);

    // Incident carries every created id.
    let mut requests = http_effects(effects);
    assert!(requests[0].operation.url.ends_with("/incidents"));
    let body: Value = serde_json::from_slice(&requests[0].operation.body).unwrap();
    assert_eq!(body["evidenceIds"].as_array().unwrap().len(), 3);
    assert_eq!(body["vehicleIds"].as_array().unwrap().len(), 1);
    assert_eq!(body["personIds"].as_array().unwrap().len(), 1);
    assert_eq!(body["severity"], "severe");
    effects = resolve_and_pump(&app, &mut model, requests.remove(0), r#"{"id":"inc-1"}"#);

    // Report is derived from the incident.
    let mut requests = http_effects(effects);
    assert!(requests[0].operation.url.ends_with("/reports"));
    let body: Value = serde_json::from_slice(&requests[0].operation.body).unwrap();
    assert_eq!(body["incidentId"], "inc-1");
    assert_eq!(body["title"], "Collision at Main St & 5th Ave");
    assert_eq!(body["priority"], "High Priority");
    assert_eq!(body["status"], "Submitted");
    resolve_and_pump(&app, &mut model, requests.remove(0), r#"{"id":"rep-1"}"#);

    assert!(model.submission.is_none());
    let receipt = model.receipt.as_ref().unwrap();
    assert_eq!(receipt.incident_id.as_str(), "inc-1");
    assert_eq!(receipt.report_id.as_str(), "rep-1");
    assert_eq!(model.active_toast.as_ref().unwrap().kind, ToastKind::Success);
    // Wizard is reset for the next incident.
    assert!(model.staging.is_empty());
    assert!(model.vehicles.is_empty());
}

#[test]
fn server_failure_aborts_the_pipeline() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);
    fill_wizard(&app, &mut model);
    add_evidence(&app, &mut model, "Scene overview", false);

    let update = app.update(Event::SubmitRequested, &mut model);
    let mut requests = http_effects(update.effects);
    assert_eq!(requests.len(), 1);

    let update = app
        .resolve(&mut requests[0], HttpResult::Ok(HttpResponse::status(500).build()))
        .unwrap();
    let mut effects = Vec::new();
    for event in update.events {
        effects.extend(app.update(event, &mut model).effects);
    }

    assert!(model.submission.is_none(), "submission must be aborted");
    assert_eq!(
        model.active_toast.as_ref().unwrap().kind,
        ToastKind::Destructive
    );
    assert!(
        http_effects(effects).is_empty(),
        "no further requests after a failure"
    );
    // Wizard data survives for a retry.
    assert_eq!(model.staging.len(), 1);
}

#[test]
fn upload_results_from_a_superseded_run_are_dropped() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);
    fill_wizard(&app, &mut model);
    let id = add_evidence(&app, &mut model, "Scene overview", true);

    let update = app.update(Event::SubmitRequested, &mut model);
    let mut uploads = media_effects(update.effects);
    assert_eq!(uploads.len(), 1);

    // A result tagged with a different operation id must not advance the
    // pipeline.
    let update = app.update(
        Event::MediaUploaded {
            op: OpId::generate(),
            id: id.clone(),
            output: Box::new(upload_result(2048)),
        },
        &mut model,
    );
    assert!(http_effects(update.effects).is_empty());
    assert!(model.submission.is_some());

    // The genuine result does.
    let update = app.resolve(&mut uploads[0], upload_result(2048)).unwrap();
    let mut effects = Vec::new();
    for event in update.events {
        effects.extend(app.update(event, &mut model).effects);
    }
    let requests = http_effects(effects);
    assert_eq!(requests.len(), 1);
    assert!(requests[0].operation.url.ends_with("/evidence"));
}

#[test]
fn submit_without_session_is_rejected() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();
    fill_wizard(&app, &mut model);

    let update = app.update(Event::SubmitRequested, &mut model);
    assert!(http_effects(update.effects).is_empty());
    assert!(model.submission.is_none());
    assert_eq!(
        model.active_toast.as_ref().unwrap().kind,
        ToastKind::Destructive
    );
}

#[test]
fn submit_with_incomplete_draft_reports_missing_fields() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);
    app.update(
        Event::IncidentFieldChanged(IncidentField::Location("Main St".into())),
        &mut model,
    );

    let update = app.update(Event::SubmitRequested, &mut model);
    assert!(http_effects(update.effects).is_empty());
    let toast = model.active_toast.as_ref().unwrap();
    assert_eq!(toast.kind, ToastKind::Destructive);
    assert!(toast.message.contains("date and time"));
    assert!(toast.message.contains("description"));
}
