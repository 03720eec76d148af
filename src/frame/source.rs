use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{CaptureError, ImageSample};

/// Supplies one normalized image sample per call.
///
/// `capture` is expected to be cheap relative to classification; the
/// sampling driver calls it once per sample with a delay in between.
pub trait FrameSource {
    fn capture(&mut self) -> Result<ImageSample, CaptureError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn capture(&mut self) -> Result<ImageSample, CaptureError> {
        (**self).capture()
    }
}

/// A single uploaded/decoded image, re-served on every capture.
pub struct StillImageSource {
    sample: ImageSample,
}

impl StillImageSource {
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let image = image::open(path).map_err(|e| {
            CaptureError::SourceUnavailable(format!("Failed to open {:?}: {}", path, e))
        })?;
        info!("Loaded still image from {:?}", path);
        Ok(Self {
            sample: ImageSample::from_image(&image),
        })
    }

    pub fn from_sample(sample: ImageSample) -> Self {
        Self { sample }
    }
}

impl FrameSource for StillImageSource {
    fn capture(&mut self) -> Result<ImageSample, CaptureError> {
        Ok(self.sample.clone())
    }
}

/// Replays a directory of frame images in filename order.
///
/// Stands in for a short camera burst: each capture serves the next frame,
/// and an exhausted directory reports `SourceUnavailable`.
pub struct FrameDirSource {
    frames: Vec<PathBuf>,
    next: usize,
}

impl FrameDirSource {
    pub fn open(dir: &Path) -> Result<Self, CaptureError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            CaptureError::SourceUnavailable(format!("Failed to read {:?}: {}", dir, e))
        })?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("png") | Some("jpg") | Some("jpeg")
                )
            })
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(CaptureError::SourceUnavailable(format!(
                "No frame images (png/jpg) found in {:?}",
                dir
            )));
        }

        info!("Frame directory {:?}: {} frames", dir, frames.len());
        Ok(Self { frames, next: 0 })
    }

    /// Frames not yet served.
    pub fn remaining(&self) -> usize {
        self.frames.len() - self.next
    }
}

impl FrameSource for FrameDirSource {
    fn capture(&mut self) -> Result<ImageSample, CaptureError> {
        let path = self.frames.get(self.next).ok_or_else(|| {
            CaptureError::SourceUnavailable("Frame directory exhausted".to_string())
        })?;
        self.next += 1;

        debug!("Serving frame {:?}", path);
        let image = image::open(path).map_err(|e| {
            CaptureError::InvalidImage(format!("Failed to decode {:?}: {}", path, e))
        })?;
        Ok(ImageSample::from_image(&image))
    }
}
