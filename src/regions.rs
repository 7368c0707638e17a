use tracing::trace;

use crate::{clamp, Error, Landmarks, Result};

/// A named cluster of face mesh landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub indices: &'static [usize],
    /// Larger, flatter areas get more tiles.
    pub emphasized: bool
}

impl Region {
    const fn new(name: &'static str, indices: &'static [usize], emphasized: bool) -> Self {
        Self {
            name, indices, emphasized
        }
    }

    /// How many tiles to cut from this region.
    pub fn tile_count(&self, default_tiles: usize, emphasized_tiles: usize) -> usize {
        if self.emphasized {
            emphasized_tiles
        } else {
            default_tiles
        }
    }

    pub fn bounds(&self, landmarks: &Landmarks, width: u32, height: u32) -> Result<RegionBounds> {
        region_bounds(landmarks, self.indices, width, height)
    }
}

// Indices follow the MediaPipe face mesh topology.
// https://github.com/google/mediapipe/blob/master/mediapipe/modules/face_geometry/data/canonical_face_model_uv_visualization.png
pub const REGIONS: [Region; 11] = [
    Region::new("left_eye", &[33, 133, 160, 159, 158, 157, 173], false),
    Region::new("right_eye", &[362, 263, 387, 386, 385, 384, 398], false),
    Region::new("nose", &[2, 98, 327, 195, 5, 4, 1], false),
    Region::new("mouth", &[13, 14, 87, 178, 317, 402, 318], false),
    Region::new("forehead", &[10, 338, 297, 68, 104], true),
    Region::new("chin", &[152, 200, 427, 425, 199, 400, 379], true),
    Region::new("left_cheek", &[50, 101, 234, 93, 205, 117], false),
    Region::new("right_cheek", &[280, 347, 454, 330, 425, 356], false),
    Region::new("jawline_left", &[234, 127, 93, 132], true),
    Region::new("jawline_right", &[454, 356, 330, 323], true),
    Region::new("temples", &[67, 69, 109, 108, 151, 45, 276, 283, 282, 423], true)
];

/// Bounding box of a region in pixels, clamped to the frame. `x2`/`y2` may equal the frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64
}

impl RegionBounds {
    pub fn width(&self) -> i64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i64 {
        self.y2 - self.y1
    }
}

/// Bounding box of the given landmarks in a `width` x `height` frame.
pub fn region_bounds(landmarks: &Landmarks, indices: &[usize], width: u32, height: u32) -> Result<RegionBounds> {
    if indices.is_empty() {
        return Err(Error::EmptyRegion);
    }

    let (w, h) = (i64::from(width), i64::from(height));

    let mut min_x = i64::MAX;
    let mut min_y = i64::MAX;
    let mut max_x = i64::MIN;
    let mut max_y = i64::MIN;

    for &idx in indices {
        let (x, y) = landmarks.to_pixel(idx, width, height)?;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    let bounds = RegionBounds {
        x1: clamp(min_x, 0, w),
        y1: clamp(min_y, 0, h),
        x2: clamp(max_x, 0, w),
        y2: clamp(max_y, 0, h)
    };

    trace!(?bounds, "region bounds");
    Ok(bounds)
}
