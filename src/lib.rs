//! Glitch-art collages cut from facial regions.
//!
//! Landmarks come from an external face-mesh detector (see [`LandmarkDetector`]). Tiles are cut
//! from the bounding boxes of facial regions and redrawn, jittered and rescaled, largest first.

use thiserror::Error;

pub type Vector2 = nalgebra::Vector2<f32>;

use image::GenericImageView;

mod collage;
mod landmark_parser;
mod landmarks;
pub mod logging;
mod regions;
pub mod settings;
mod tiles;
mod transformations;

pub use collage::{Collage, DetectorOptions, LandmarkDetector};
pub use landmarks::Landmarks;
pub use regions::{region_bounds, Region, RegionBounds, REGIONS};
pub use settings::CollageConfig;
pub use tiles::{CollagePlan, Tile};
pub use transformations::PointTransformationAffine;

use std::io;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no face detected")]
    NoFaceDetected,
    #[error("landmark {index} requested but only {len} landmarks are available")]
    LandmarkOutOfRange { index: usize, len: usize },
    #[error("landmark {0} has a non-finite coordinate")]
    NonFiniteLandmark(usize),
    #[error("region has no landmark indices")]
    EmptyRegion,
    #[error("plan was made for a {expected_width}x{expected_height} frame, got {width}x{height}")]
    FrameSizeMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32
    },
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("detector error: {0}")]
    Detector(String),
    #[error("logging error: {0}")]
    Logging(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] bincode::Error),
    #[error(transparent)]
    Config(#[from] config::ConfigError)
}

pub type Result<T> = std::result::Result<T, Error>;

/// `max(min, min(val, max))`. Falls back to `min` when the range is empty.
pub fn clamp(val: i64, min: i64, max: i64) -> i64 {
    min.max(val.min(max))
}

/// A rectangle in the image, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32
}

impl Rectangle {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x, y, width, height
        }
    }

    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= i64::from(self.x) && y >= i64::from(self.y) &&
        (x as i128) < self.right() as i128 && (y as i128) < self.bottom() as i128
    }

    /// The part of this rectangle that lies inside `other`.
    pub fn intersection(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= u64::from(x) || bottom <= u64::from(y) {
            return Rectangle::new(x, y, 0, 0);
        }

        Rectangle::new(x, y, (right - u64::from(x)) as u32, (bottom - u64::from(y)) as u32)
    }

    /// Create a rectangle the same size as an image.
    pub fn from_image<I: GenericImageView>(image: &I) -> Self {
        Self {
            x: 0,
            y: 0,
            width: image.width(),
            height: image.height()
        }
    }
}
