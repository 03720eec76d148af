//! Frame acquisition: normalized image samples and the sources that
//! produce them.
//!
//! Live camera plumbing is out of scope; sources here are file-backed
//! (a single still image, or a directory replay of a short frame burst).

mod sample;
mod source;

use thiserror::Error;

pub use sample::ImageSample;
pub use source::{FrameDirSource, FrameSource, StillImageSource};

/// Errors that can occur while producing a frame
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No frame source available: {0}")]
    SourceUnavailable(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),
}
