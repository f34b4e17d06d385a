//! Capabilities the core asks of its shell, plus the generated effect
//! enum the shells execute.

pub mod media;
pub mod timer;

pub use media::{BlobHandle, MediaOperation, MediaOutput, MediaStore, MediaUpload};
pub use timer::{Timer, TimerElapsed, TimerOperation};

use crux_core::render::Render;
use crux_http::Http;

use crate::app::App;
use crate::event::Event;

// The Effect derive names variants after the capability type's last path
// segment; alias so the variant is `Effect::Media`.
use media::MediaStore as Media;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
    pub media: Media<Event>,
    pub timer: Timer<Event>,
}
