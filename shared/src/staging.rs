//! Evidence staging area for the incident wizard.
//!
//! Items are addressed by a stable [`LocalId`], never by array index, so
//! concurrent add/remove cannot redirect an in-flight operation to the
//! wrong item. The attached file is represented by a [`BlobHandle`]; the
//! shell owns the bytes and the handle is the single source of truth, so
//! no auxiliary file cache can drift out of sync with the item.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::capabilities::BlobHandle;
use crate::event::{EvidenceField, FileInfo, LocalId};
use crate::{MAX_EVIDENCE_ITEMS, MAX_TAGS_PER_EVIDENCE, UPLOAD_PROGRESS_FLOOR};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    #[default]
    Photo,
    Video,
    Document,
    Audio,
    WitnessStatement,
    PhysicalEvidence,
    Other,
}

impl EvidenceKind {
    /// Kind inferred for drag-and-dropped files.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            Self::Photo
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime.starts_with("audio/") {
            Self::Audio
        } else {
            Self::Document
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Photo => "Photo",
            Self::Video => "Video",
            Self::Document => "Document",
            Self::Audio => "Audio",
            Self::WitnessStatement => "Witness Statement",
            Self::PhysicalEvidence => "Physical Evidence",
            Self::Other => "Other",
        }
    }
}

/// A locally attached file and its simulated upload state.
///
/// Invariant: `uploaded` implies `progress == 100`, and the handle is
/// present for as long as the file is attached at all.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StagedFile {
    pub handle: BlobHandle,
    pub name: String,
    pub size: u64,
    pub mime: String,
    pub progress: u8,
    pub uploaded: bool,
    /// Upload generation. Re-attaching bumps it, so progress ticks from
    /// an earlier attachment are recognized as stale and dropped.
    pub seq: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StagedEvidence {
    pub local_id: LocalId,
    pub title: String,
    pub description: Option<String>,
    pub kind: EvidenceKind,
    pub file: Option<StagedFile>,
    pub tags: BTreeSet<String>,
}

impl StagedEvidence {
    fn new(kind: EvidenceKind) -> Self {
        Self {
            local_id: LocalId::generate(),
            title: String::new(),
            description: None,
            kind,
            file: None,
            tags: BTreeSet::new(),
        }
    }
}

/// Outcome of one progress tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Progress moved forward; another tick should be scheduled.
    Advanced { progress: u8 },
    /// Progress reached 100 and the item is now marked uploaded.
    Completed,
    /// The item is gone or the tick belongs to an older attachment.
    Stale,
}

/// Next value of the asymptotic progress curve: large early jumps that
/// shrink as the bar approaches 100.
#[must_use]
pub fn next_progress(progress: u8) -> u8 {
    let remaining = 100u8.saturating_sub(progress);
    let step = (remaining / 3).max(UPLOAD_PROGRESS_FLOOR);
    progress.saturating_add(step).min(100)
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct EvidenceStaging {
    items: Vec<StagedEvidence>,
}

impl EvidenceStaging {
    /// Appends a new item with default values. Returns `None` once the
    /// staging area is full.
    pub fn add(&mut self, kind: EvidenceKind) -> Option<LocalId> {
        if self.items.len() >= MAX_EVIDENCE_ITEMS {
            return None;
        }
        let item = StagedEvidence::new(kind);
        let id = item.local_id.clone();
        self.items.push(item);
        Some(id)
    }

    #[must_use]
    pub fn get(&self, id: &LocalId) -> Option<&StagedEvidence> {
        self.items.iter().find(|item| &item.local_id == id)
    }

    fn get_mut(&mut self, id: &LocalId) -> Option<&mut StagedEvidence> {
        self.items.iter_mut().find(|item| &item.local_id == id)
    }

    /// Applies a single field edit. The field enum has no file variant,
    /// so an attached file survives every edit by construction.
    pub fn apply(&mut self, id: &LocalId, field: EvidenceField) -> bool {
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        match field {
            EvidenceField::Title(title) => item.title = title,
            EvidenceField::Description(description) => item.description = description,
            EvidenceField::Kind(kind) => item.kind = kind,
            EvidenceField::TagAdded(tag) => {
                let tag = tag.trim().to_string();
                if !tag.is_empty() && item.tags.len() < MAX_TAGS_PER_EVIDENCE {
                    item.tags.insert(tag);
                }
            }
            EvidenceField::TagRemoved(tag) => {
                item.tags.remove(&tag);
            }
        }
        true
    }

    /// Removes an item. A pending progress tick for it will come back as
    /// [`TickOutcome::Stale`] and is dropped by the caller.
    pub fn remove(&mut self, id: &LocalId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.local_id != id);
        self.items.len() != before
    }

    /// Attaches a file handle plus derived metadata and resets the
    /// simulated upload. Returns the new upload sequence so the caller
    /// can schedule the first progress tick.
    pub fn attach_file(&mut self, id: &LocalId, info: FileInfo, handle: BlobHandle) -> Option<u32> {
        let item = self.get_mut(id)?;
        let seq = item.file.as_ref().map_or(0, |f| f.seq.wrapping_add(1));
        item.file = Some(StagedFile {
            handle,
            name: info.name,
            size: info.size,
            mime: info.mime,
            progress: 0,
            uploaded: false,
            seq,
        });
        Some(seq)
    }

    /// Advances the simulated upload of one item by one tick.
    pub fn tick(&mut self, id: &LocalId, seq: u32) -> TickOutcome {
        let Some(file) = self.get_mut(id).and_then(|item| item.file.as_mut()) else {
            return TickOutcome::Stale;
        };
        if file.seq != seq || file.uploaded {
            return TickOutcome::Stale;
        }
        file.progress = next_progress(file.progress);
        if file.progress >= 100 {
            file.progress = 100;
            file.uploaded = true;
            TickOutcome::Completed
        } else {
            TickOutcome::Advanced {
                progress: file.progress,
            }
        }
    }

    #[must_use]
    pub fn items(&self) -> &[StagedEvidence] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn all_titled(&self) -> bool {
        self.items.iter().all(|item| !item.title.trim().is_empty())
    }

    #[must_use]
    pub fn with_files(&self) -> usize {
        self.items.iter().filter(|item| item.file.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_info(name: &str, size: u64, mime: &str) -> FileInfo {
        FileInfo {
            name: name.into(),
            size,
            mime: mime.into(),
        }
    }

    fn handle(size: u64) -> BlobHandle {
        BlobHandle {
            local_id: LocalId::generate(),
            size_bytes: size,
        }
    }

    #[test]
    fn add_uses_defaults() {
        let mut staging = EvidenceStaging::default();
        let id = staging.add(EvidenceKind::Photo).unwrap();
        let item = staging.get(&id).unwrap();
        assert_eq!(item.kind, EvidenceKind::Photo);
        assert!(item.file.is_none());
        assert!(item.tags.is_empty());
        assert!(item.title.is_empty());
    }

    #[test]
    fn field_edit_preserves_attached_file() {
        let mut staging = EvidenceStaging::default();
        let id = staging.add(EvidenceKind::Photo).unwrap();
        staging
            .attach_file(&id, file_info("crash.jpg", 2048, "image/jpeg"), handle(2048))
            .unwrap();

        assert!(staging.apply(&id, EvidenceField::Title("Skid marks".into())));
        assert!(staging.apply(&id, EvidenceField::Kind(EvidenceKind::Document)));
        assert!(staging.apply(&id, EvidenceField::TagAdded("intersection".into())));

        let item = staging.get(&id).unwrap();
        let file = item.file.as_ref().expect("file must survive field edits");
        assert_eq!(file.name, "crash.jpg");
        assert_eq!(file.size, 2048);
        assert_eq!(item.title, "Skid marks");
    }

    #[test]
    fn attach_records_exact_metadata() {
        let mut staging = EvidenceStaging::default();
        let id = staging.add(EvidenceKind::Video).unwrap();
        staging
            .attach_file(&id, file_info("dashcam.mp4", 1_048_576, "video/mp4"), handle(1_048_576))
            .unwrap();
        let file = staging.get(&id).unwrap().file.as_ref().unwrap();
        assert_eq!(file.name, "dashcam.mp4");
        assert_eq!(file.size, 1_048_576);
        assert_eq!(file.mime, "video/mp4");
        assert_eq!(file.progress, 0);
        assert!(!file.uploaded);
    }

    #[test]
    fn ticks_reach_completion_and_set_uploaded() {
        let mut staging = EvidenceStaging::default();
        let id = staging.add(EvidenceKind::Photo).unwrap();
        let seq = staging
            .attach_file(&id, file_info("a.jpg", 10, "image/jpeg"), handle(10))
            .unwrap();

        let mut ticks = 0;
        loop {
            ticks += 1;
            assert!(ticks < 100, "progress must converge");
            match staging.tick(&id, seq) {
                TickOutcome::Advanced { progress } => assert!(progress < 100),
                TickOutcome::Completed => break,
                TickOutcome::Stale => panic!("tick went stale unexpectedly"),
            }
        }

        let file = staging.get(&id).unwrap().file.as_ref().unwrap();
        assert_eq!(file.progress, 100);
        assert!(file.uploaded);
        // Further ticks from a duplicate timer are ignored.
        assert_eq!(staging.tick(&id, seq), TickOutcome::Stale);
    }

    #[test]
    fn reattach_invalidates_old_ticks() {
        let mut staging = EvidenceStaging::default();
        let id = staging.add(EvidenceKind::Photo).unwrap();
        let old_seq = staging
            .attach_file(&id, file_info("a.jpg", 10, "image/jpeg"), handle(10))
            .unwrap();
        let new_seq = staging
            .attach_file(&id, file_info("b.jpg", 20, "image/jpeg"), handle(20))
            .unwrap();
        assert_ne!(old_seq, new_seq);
        assert_eq!(staging.tick(&id, old_seq), TickOutcome::Stale);
        assert!(matches!(
            staging.tick(&id, new_seq),
            TickOutcome::Advanced { .. }
        ));
    }

    #[test]
    fn remove_makes_pending_ticks_stale() {
        let mut staging = EvidenceStaging::default();
        let id = staging.add(EvidenceKind::Photo).unwrap();
        let seq = staging
            .attach_file(&id, file_info("a.jpg", 10, "image/jpeg"), handle(10))
            .unwrap();
        assert!(staging.remove(&id));
        assert_eq!(staging.tick(&id, seq), TickOutcome::Stale);
    }

    #[test]
    fn progress_is_monotonic_and_bounded() {
        let mut p = 0u8;
        while p < 100 {
            let next = next_progress(p);
            assert!(next > p);
            assert!(next <= 100);
            p = next;
        }
    }

    #[test]
    fn kind_inferred_from_mime_prefix() {
        assert_eq!(EvidenceKind::from_mime("image/png"), EvidenceKind::Photo);
        assert_eq!(EvidenceKind::from_mime("video/mp4"), EvidenceKind::Video);
        assert_eq!(EvidenceKind::from_mime("audio/wav"), EvidenceKind::Audio);
        assert_eq!(
            EvidenceKind::from_mime("application/pdf"),
            EvidenceKind::Document
        );
        assert_eq!(EvidenceKind::from_mime("text/plain"), EvidenceKind::Document);
    }

    #[test]
    fn staging_area_is_bounded() {
        let mut staging = EvidenceStaging::default();
        for _ in 0..MAX_EVIDENCE_ITEMS {
            assert!(staging.add(EvidenceKind::Other).is_some());
        }
        assert!(staging.add(EvidenceKind::Other).is_none());
    }

    #[test]
    fn untitled_items_block_submission() {
        let mut staging = EvidenceStaging::default();
        assert!(staging.all_titled());
        let id = staging.add(EvidenceKind::Photo).unwrap();
        assert!(!staging.all_titled());
        staging.apply(&id, EvidenceField::Title("Scene overview".into()));
        assert!(staging.all_titled());
    }
}
