//! Staged-upload progress driven through the timer capability.

use crux_core::testing::AppTester;

use isaac_core::capabilities::{BlobHandle, TimerElapsed, TimerOperation};
use isaac_core::event::{FileInfo, LocalId};
use isaac_core::staging::EvidenceKind;
use isaac_core::{App, Effect, Event, Model};

fn timer_effects(effects: Vec<Effect>) -> Vec<crux_core::Request<TimerOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Timer(request) => Some(request),
            _ => None,
        })
        .collect()
}

fn attach(app: &AppTester<App, Effect>, model: &mut Model, name: &str) -> (LocalId, Vec<Effect>) {
    app.update(
        Event::EvidenceAdded {
            kind: EvidenceKind::Photo,
        },
        model,
    );
    let id = model.staging.items().last().unwrap().local_id.clone();
    let update = app.update(
        Event::FileAttached {
            id: id.clone(),
            info: FileInfo {
                name: name.into(),
                size: 1536,
                mime: "image/jpeg".into(),
            },
            handle: BlobHandle {
                local_id: LocalId::generate(),
                size_bytes: 1536,
            },
        },
        model,
    );
    (id, update.effects)
}

#[test]
fn simulated_upload_progresses_to_completion() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();
    let (id, effects) = attach(&app, &mut model, "scene.jpg");

    let mut timers = timer_effects(effects);
    assert_eq!(timers.len(), 1, "attaching schedules the first tick");

    let mut ticks = 0;
    let mut last_progress = 0;
    while let Some(mut timer) = timers.pop() {
        ticks += 1;
        assert!(ticks < 30, "progress must converge");

        let update = app.resolve(&mut timer, TimerElapsed).unwrap();
        let mut effects = Vec::new();
        for event in update.events {
            effects.extend(app.update(event, &mut model).effects);
        }
        timers = timer_effects(effects);

        let file = model.staging.get(&id).unwrap().file.as_ref().unwrap();
        assert!(file.progress > last_progress, "progress is monotonic");
        last_progress = file.progress;
    }

    let file = model.staging.get(&id).unwrap().file.as_ref().unwrap();
    assert_eq!(file.progress, 100);
    assert!(file.uploaded);
}

#[test]
fn removing_the_item_stops_its_ticks() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();
    let (id, effects) = attach(&app, &mut model, "scene.jpg");
    let mut timers = timer_effects(effects);

    app.update(Event::EvidenceRemoved { id }, &mut model);

    let update = app.resolve(&mut timers[0], TimerElapsed).unwrap();
    let mut effects = Vec::new();
    for event in update.events {
        effects.extend(app.update(event, &mut model).effects);
    }
    assert!(
        timer_effects(effects).is_empty(),
        "stale ticks must not reschedule"
    );
}

#[test]
fn reattaching_supersedes_the_previous_upload() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();
    let (id, effects) = attach(&app, &mut model, "first.jpg");
    let mut old_timers = timer_effects(effects);

    let update = app.update(
        Event::FileAttached {
            id: id.clone(),
            info: FileInfo {
                name: "second.jpg".into(),
                size: 4096,
                mime: "image/jpeg".into(),
            },
            handle: BlobHandle {
                local_id: LocalId::generate(),
                size_bytes: 4096,
            },
        },
        &mut model,
    );
    let new_timers = timer_effects(update.effects);
    assert_eq!(new_timers.len(), 1);

    // The old generation's tick lands after the swap and is ignored.
    let update = app.resolve(&mut old_timers[0], TimerElapsed).unwrap();
    let mut effects = Vec::new();
    for event in update.events {
        effects.extend(app.update(event, &mut model).effects);
    }
    assert!(timer_effects(effects).is_empty());

    let file = model.staging.get(&id).unwrap().file.as_ref().unwrap();
    assert_eq!(file.name, "second.jpg");
    assert_eq!(file.progress, 0, "swap resets progress");
}

#[test]
fn dropped_files_become_titled_items_with_inferred_kinds() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    let dropped = vec![
        isaac_core::event::DroppedFile {
            info: FileInfo {
                name: "dashcam.mp4".into(),
                size: 1_048_576,
                mime: "video/mp4".into(),
            },
            handle: BlobHandle {
                local_id: LocalId::generate(),
                size_bytes: 1_048_576,
            },
        },
        isaac_core::event::DroppedFile {
            info: FileInfo {
                name: "statement.pdf".into(),
                size: 2048,
                mime: "application/pdf".into(),
            },
            handle: BlobHandle {
                local_id: LocalId::generate(),
                size_bytes: 2048,
            },
        },
    ];
    let update = app.update(Event::FilesDropped(dropped), &mut model);
    assert_eq!(timer_effects(update.effects).len(), 2);

    let items = model.staging.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "dashcam.mp4");
    assert_eq!(items[0].kind, EvidenceKind::Video);
    assert_eq!(items[1].kind, EvidenceKind::Document);

    let view = app.view(&model);
    assert_eq!(view.wizard.evidence[0].file.as_ref().unwrap().size_label, "1 MB");
    assert_eq!(view.wizard.evidence[1].file.as_ref().unwrap().size_label, "2 KB");
}
