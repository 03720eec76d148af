use image::imageops::FilterType;
use image::DynamicImage;

use super::CaptureError;

/// One normalized model input: a 48x48 single-channel crop with pixel
/// values in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSample {
    pixels: Vec<f32>,
}

impl ImageSample {
    /// Edge length of the model input in pixels.
    pub const SIDE: usize = 48;

    /// Total pixel count per sample.
    pub const PIXEL_COUNT: usize = Self::SIDE * Self::SIDE;

    /// Build a sample from pre-normalized grayscale pixels.
    ///
    /// The buffer must hold exactly 48x48 values, each in [0, 1].
    pub fn from_pixels(pixels: Vec<f32>) -> Result<Self, CaptureError> {
        if pixels.len() != Self::PIXEL_COUNT {
            return Err(CaptureError::InvalidImage(format!(
                "Expected {} pixels, got {}",
                Self::PIXEL_COUNT,
                pixels.len()
            )));
        }
        if let Some(&bad) = pixels.iter().find(|p| !(0.0..=1.0).contains(*p) || p.is_nan()) {
            return Err(CaptureError::InvalidImage(format!(
                "Pixel value {} outside [0, 1]",
                bad
            )));
        }
        Ok(Self { pixels })
    }

    /// Convert any decoded image: grayscale, resize to 48x48, scale to [0, 1].
    pub fn from_image(image: &DynamicImage) -> Self {
        let gray = image
            .resize_exact(Self::SIDE as u32, Self::SIDE as u32, FilterType::Triangle)
            .to_luma8();
        let pixels = gray.pixels().map(|p| f32::from(p.0[0]) / 255.0).collect();
        Self { pixels }
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn test_from_pixels_valid() {
        let sample = ImageSample::from_pixels(vec![0.5; ImageSample::PIXEL_COUNT]).unwrap();
        assert_eq!(sample.pixels().len(), 2304);
    }

    #[test]
    fn test_from_pixels_wrong_length() {
        let result = ImageSample::from_pixels(vec![0.5; 100]);
        assert!(matches!(result, Err(CaptureError::InvalidImage(_))));
    }

    #[test]
    fn test_from_pixels_out_of_range() {
        let mut pixels = vec![0.5; ImageSample::PIXEL_COUNT];
        pixels[17] = 1.5;
        let result = ImageSample::from_pixels(pixels);
        assert!(matches!(result, Err(CaptureError::InvalidImage(_))));
    }

    #[test]
    fn test_from_image_resizes_and_normalizes() {
        // 100x80 mid-gray image scales down to a 48x48 sample of ~0.5
        let gray = GrayImage::from_pixel(100, 80, image::Luma([128]));
        let sample = ImageSample::from_image(&DynamicImage::ImageLuma8(gray));

        assert_eq!(sample.pixels().len(), ImageSample::PIXEL_COUNT);
        for &p in sample.pixels() {
            assert!((p - 128.0 / 255.0).abs() < 0.01);
        }
    }
}
