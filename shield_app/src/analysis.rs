use image::RgbaImage;

/// Basic validation of a captured frame
#[derive(Debug)]
pub struct CaptureAnalysis {
    pub width: u32,
    pub height: u32,
    pub lit_ratio: f32,
    pub blue_ratio: f32,
    pub avg_brightness: u8,
    pub likely_content: ContentClassification,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ContentClassification {
    RenderedScene,      // Shield and particles visible
    ParticlesOnly,      // Sparse points, no shield in view
    BlankOrEmpty,       // Nothing but the clear color
}

/// Classify a frame by how much of it differs from the clear color
pub fn analyze_capture(image: &RgbaImage) -> CaptureAnalysis {
    let (width, height) = image.dimensions();
    let total_pixels = (width as usize * height as usize).max(1);

    let mut lit_pixels = 0usize;
    let mut blue_pixels = 0usize;
    let mut total_brightness = 0u64;

    for pixel in image.pixels() {
        let [r, g, b, _a] = pixel.0;
        let brightness = (u32::from(r) + u32::from(g) + u32::from(b)) / 3;
        total_brightness += u64::from(brightness);

        if r > 8 || g > 8 || b > 8 {
            lit_pixels += 1;
            if b > r && b >= g {
                blue_pixels += 1;
            }
        }
    }

    let lit_ratio = lit_pixels as f32 / total_pixels as f32;
    let blue_ratio = blue_pixels as f32 / total_pixels as f32;
    let avg_brightness = (total_brightness / total_pixels as u64) as u8;

    CaptureAnalysis {
        width,
        height,
        lit_ratio,
        blue_ratio,
        avg_brightness,
        likely_content: classify_content(lit_ratio, blue_ratio),
    }
}

fn classify_content(lit_ratio: f32, blue_ratio: f32) -> ContentClassification {
    if lit_ratio < 0.001 {
        ContentClassification::BlankOrEmpty
    } else if blue_ratio > 0.02 {
        ContentClassification::RenderedScene
    } else {
        ContentClassification::ParticlesOnly
    }
}

impl std::fmt::Display for CaptureAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{}: {:.1}% lit, {:.1}% blue, brightness {}/255, {:?}",
            self.width,
            self.height,
            self.lit_ratio * 100.0,
            self.blue_ratio * 100.0,
            self.avg_brightness,
            self.likely_content
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_clear_frame_is_blank() {
        let image = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 26]));
        let analysis = analyze_capture(&image);
        assert_eq!(analysis.likely_content, ContentClassification::BlankOrEmpty);
        assert_eq!(analysis.avg_brightness, 0);
    }

    #[test]
    fn test_blue_disc_is_rendered_scene() {
        let mut image = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 26]));
        for x in 3..7 {
            for y in 3..7 {
                image.put_pixel(x, y, Rgba([12, 90, 160, 210]));
            }
        }
        let analysis = analyze_capture(&image);
        assert_eq!(analysis.likely_content, ContentClassification::RenderedScene);
        assert!((analysis.lit_ratio - 0.16).abs() < 1e-6);
    }
}
