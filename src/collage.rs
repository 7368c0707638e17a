use image::{imageops, DynamicImage, GenericImageView, RgbaImage};
use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{CollageConfig, CollagePlan, Error, Landmarks, Rectangle, Result};

/// Settings handed to the landmark detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    pub max_faces: usize,
    /// Ask for the iris-refined mesh (478 points instead of 468).
    pub refine_landmarks: bool,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            max_faces: 1,
            refine_landmarks: true,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5
        }
    }
}

/// A face mesh detector. Returns one set of normalised landmarks per face found.
pub trait LandmarkDetector {
    fn detect(&mut self, frame: &RgbaImage, options: &DetectorOptions) -> Result<Vec<Landmarks>>;
}

/// Cuts facial regions out of a frame and layers them back on top of it.
#[derive(Debug, Clone, Default)]
pub struct Collage {
    config: CollageConfig
}

impl Collage {
    pub fn new(config: CollageConfig) -> Self {
        Self {
            config
        }
    }

    pub fn config(&self) -> &CollageConfig {
        &self.config
    }

    /// Plan tiles for the first face. Fails with [`Error::NoFaceDetected`] if there are no faces.
    pub fn plan<R: Rng + ?Sized>(&self, width: u32, height: u32, faces: &[Landmarks], rng: &mut R) -> Result<CollagePlan> {
        let landmarks = match faces.first() {
            Some(landmarks) => landmarks,
            None => {
                warn!("no face detected");
                return Err(Error::NoFaceDetected);
            }
        };

        if faces.len() > 1 {
            debug!(faces = faces.len(), "using the first face only");
        }

        CollagePlan::generate(landmarks, width, height, &self.config, rng)
    }

    pub fn compose<R: Rng + ?Sized>(&self, frame: &RgbaImage, faces: &[Landmarks], rng: &mut R) -> Result<RgbaImage> {
        let plan = self.plan(frame.width(), frame.height(), faces, rng)?;
        let canvas = Self::render(frame, &plan)?;

        info!(tiles = plan.tiles.len(), width = frame.width(), height = frame.height(), "collage composed");
        Ok(canvas)
    }

    pub fn compose_image<R: Rng + ?Sized>(&self, frame: &DynamicImage, faces: &[Landmarks], rng: &mut R) -> Result<RgbaImage> {
        self.compose(&frame.to_rgba8(), faces, rng)
    }

    /// Run `detector` on the frame, then compose from whatever it found.
    pub fn compose_with_detector<D, R>(&self, detector: &mut D, frame: &RgbaImage, rng: &mut R) -> Result<RgbaImage>
    where
        D: LandmarkDetector + ?Sized,
        R: Rng + ?Sized,
    {
        let mut faces = detector.detect(frame, &self.config.detector)?;
        faces.truncate(self.config.detector.max_faces);
        self.compose(frame, &faces, rng)
    }

    /// Draw a plan onto a copy of `frame`.
    ///
    /// Every tile is cut before any is drawn, so tiles only ever carry pixels of the original frame.
    /// Drawing overwrites (no blending) in plan order, so the smallest tiles end up on top.
    /// Zero-size tiles are skipped; the rest of the plan is still drawn.
    pub fn render(frame: &RgbaImage, plan: &CollagePlan) -> Result<RgbaImage> {
        if (frame.width(), frame.height()) != (plan.width, plan.height) {
            return Err(Error::FrameSizeMismatch {
                expected_width: plan.width,
                expected_height: plan.height,
                width: frame.width(),
                height: frame.height()
            });
        }

        let mut canvas = frame.clone();
        let area = Rectangle::from_image(&canvas);

        let patches: Vec<_> = plan.tiles.iter()
            .filter_map(|tile| {
                // Source and destination are pinned the same way, so the visible part of a tile
                // always starts at its top-left corner.
                let source = tile.source().intersection(&area);
                if source.is_empty() {
                    return None;
                }

                let patch = canvas.view(source.x, source.y, source.width, source.height).to_image();
                Some((patch, tile.destination()))
            })
            .collect();

        for (patch, destination) in &patches {
            imageops::replace(&mut canvas, patch, i64::from(destination.x), i64::from(destination.y));
        }

        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tile, Vector2};
    use image::Rgba;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    fn tile(src: (u32, u32), dst: (u32, u32), size: (u32, u32)) -> Tile {
        Tile {
            region: "test".to_owned(),
            src_x: src.0,
            src_y: src.1,
            dst_x: dst.0,
            dst_y: dst.1,
            width: size.0,
            height: size.1
        }
    }

    struct FixedDetector(Vec<Landmarks>);

    impl LandmarkDetector for FixedDetector {
        fn detect(&mut self, _frame: &RgbaImage, options: &DetectorOptions) -> Result<Vec<Landmarks>> {
            assert_eq!(options.max_faces, 1);
            Ok(self.0.clone())
        }
    }

    #[test]
    fn no_faces() {
        let collage = Collage::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(collage.compose(&gradient(16, 16), &[], &mut rng), Err(Error::NoFaceDetected)));
        assert!(matches!(
            collage.compose_with_detector(&mut FixedDetector(vec![]), &gradient(16, 16), &mut rng),
            Err(Error::NoFaceDetected)
        ));
    }

    #[test]
    fn tiles_carry_original_pixels() {
        let frame = gradient(20, 10);
        let plan = CollagePlan {
            width: 20,
            height: 10,
            tiles: vec![
                tile((0, 0), (10, 0), (4, 4)),
                tile((10, 0), (11, 1), (2, 2))
            ]
        };

        let canvas = Collage::render(&frame, &plan).unwrap();

        assert_eq!(canvas.get_pixel(10, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(13, 3), &Rgba([3, 3, 0, 255]));
        // The small tile was cut before the big one covered its source.
        assert_eq!(canvas.get_pixel(11, 1), &Rgba([10, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(12, 2), &Rgba([11, 1, 0, 255]));
        // Untouched
        assert_eq!(canvas.get_pixel(5, 5), &Rgba([5, 5, 0, 255]));
        assert_eq!(canvas.get_pixel(19, 9), &Rgba([19, 9, 0, 255]));
    }

    #[test]
    fn oversized_tile_is_clipped() {
        let frame = gradient(10, 10);
        let plan = CollagePlan {
            width: 10,
            height: 10,
            tiles: vec![tile((0, 0), (0, 0), (12, 12)), tile((0, 0), (5, 5), (0, 3))]
        };

        assert_eq!(Collage::render(&frame, &plan).unwrap(), frame);
    }

    #[test]
    fn zero_size_tile_does_not_stop_the_rest() {
        let frame = gradient(10, 10);
        let plan = CollagePlan {
            width: 10,
            height: 10,
            tiles: vec![tile((0, 0), (6, 6), (2, 2)), tile((3, 3), (1, 1), (0, 0))]
        };

        let canvas = Collage::render(&frame, &plan).unwrap();
        assert_eq!(canvas.get_pixel(7, 7), &Rgba([1, 1, 0, 255]));
        assert_eq!(canvas.get_pixel(1, 1), &Rgba([1, 1, 0, 255]));
    }

    #[test]
    fn plan_for_another_size() {
        let plan = CollagePlan {
            width: 8,
            height: 8,
            tiles: vec![]
        };

        assert!(matches!(
            Collage::render(&gradient(8, 9), &plan),
            Err(Error::FrameSizeMismatch { expected_height: 8, height: 9, .. })
        ));
    }

    #[test]
    fn detector_faces_are_used() {
        let face = Landmarks::new(vec![Vector2::new(0.5, 0.5); 478]);
        let mut detector = FixedDetector(vec![face]);

        let canvas = Collage::default()
            .compose_with_detector(&mut detector, &gradient(32, 24), &mut StdRng::seed_from_u64(9))
            .unwrap();

        // Every region collapses to a point, so nothing moves.
        assert_eq!(canvas, gradient(32, 24));
    }
}
