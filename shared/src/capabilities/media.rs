//! Media capability: blob upload and document save.
//!
//! File bytes never cross into the core. The shell stages a dropped file,
//! hands the core a [`BlobHandle`], and the core later asks the shell to
//! upload whatever the handle refers to. The same capability delivers
//! rendered PDF bytes back to the shell for saving.

use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::event::LocalId;

/// Opaque reference to file bytes held by the shell. The handle is the
/// single source of truth for an attachment; there is no second cache of
/// file state in the model to fall out of sync with it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BlobHandle {
    pub local_id: LocalId,
    pub size_bytes: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum MediaOperation {
    /// Upload the blob behind `handle` to media storage.
    Upload { handle: BlobHandle },
    /// Persist `bytes` as a downloadable document named `filename`.
    SaveDocument { filename: String, bytes: Vec<u8> },
}

/// Result of a completed media upload, echoing what the storage service
/// reports back.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MediaUpload {
    pub url: String,
    pub public_id: String,
    pub resource_type: String,
    pub format: String,
    pub size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum MediaOutput {
    Uploaded(MediaUpload),
    Saved,
    Failed { message: String },
}

impl Operation for MediaOperation {
    type Output = MediaOutput;
}

pub struct MediaStore<Ev> {
    context: CapabilityContext<MediaOperation, Ev>,
}

impl<Ev> MediaStore<Ev>
where
    Ev: 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<MediaOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn upload<F>(&self, handle: BlobHandle, make_event: F)
    where
        F: FnOnce(MediaOutput) -> Ev + Send + 'static,
        Ev: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx.request_from_shell(MediaOperation::Upload { handle }).await;
            ctx.update_app(make_event(output));
        });
    }

    pub fn save_document<F>(&self, filename: String, bytes: Vec<u8>, make_event: F)
    where
        F: FnOnce(MediaOutput) -> Ev + Send + 'static,
        Ev: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx
                .request_from_shell(MediaOperation::SaveDocument { filename, bytes })
                .await;
            ctx.update_app(make_event(output));
        });
    }
}

impl<Ev> crux_core::Capability<Ev> for MediaStore<Ev> {
    type Operation = MediaOperation;
    type MappedSelf<MappedEv> = MediaStore<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        MediaStore::new(self.context.map_event(f))
    }
}
