use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use num_traits::cast::NumCast;
use serde_derive::{Deserialize, Serialize};

use crate::landmark_parser;
use crate::transformations::PointTransformationAffine;
use crate::{Error, Result, Vector2};

/// The landmarks of one face, normalised to [0, 1] image coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Landmarks {
    points: Vec<Vector2>
}

impl Landmarks {
    pub fn new(points: Vec<Vector2>) -> Self {
        Self {
            points
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vector2] {
        &self.points
    }

    pub fn get(&self, idx: usize) -> Result<Vector2> {
        self.points.get(idx).cloned().ok_or(Error::LandmarkOutOfRange {
            index: idx,
            len: self.points.len()
        })
    }

    /// Pixel position of a landmark in a `width` x `height` frame, rounded towards negative
    /// infinity.
    pub fn to_pixel(&self, idx: usize, width: u32, height: u32) -> Result<(i64, i64)> {
        let tform = PointTransformationAffine::unnormalising(width, height);
        let point = tform.mul(self.get(idx)?);

        let x: Option<i64> = NumCast::from(point.x.floor());
        let y: Option<i64> = NumCast::from(point.y.floor());

        match (x, y) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(Error::NonFiniteLandmark(idx))
        }
    }

    /// Parse landmarks from text, one `x y [z]` point per line.
    pub fn parse(text: &str) -> Result<Self> {
        landmark_parser::parse_landmarks(text)
    }

    /// Read landmarks from a text file. See [`Landmarks::parse`].
    pub fn read_text<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut text = String::new();
        File::open(path)?.read_to_string(&mut text)?;
        Self::parse(&text)
    }

    /// Serialize the landmarks to a file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        bincode::serialize_into(writer, &LandmarksSerialize::from(self))?;
        Ok(())
    }

    /// Deserialize landmarks from a file written by [`Landmarks::write`].
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Self::read_from(reader)
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let deserialize: LandmarksSerialize = bincode::deserialize_from(reader)?;
        Ok(deserialize.to())
    }
}

impl From<Vec<Vector2>> for Landmarks {
    fn from(points: Vec<Vector2>) -> Self {
        Self::new(points)
    }
}

#[derive(Serialize, Deserialize)]
struct LandmarksSerialize {
    points: Vec<Vector2Serialize>
}

impl LandmarksSerialize {
    fn from(landmarks: &Landmarks) -> Self {
        Self {
            points: landmarks.points.iter().map(Vector2Serialize::from).collect()
        }
    }

    fn to(&self) -> Landmarks {
        Landmarks::new(self.points.iter().map(Vector2Serialize::to).collect())
    }
}

#[derive(Serialize, Deserialize)]
struct Vector2Serialize {
    x: f32,
    y: f32
}

impl Vector2Serialize {
    fn from(vector2: &Vector2) -> Self {
        Self {
            x: vector2.x,
            y: vector2.y
        }
    }

    fn to(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }
}
