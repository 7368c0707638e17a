use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::regions::{RegionBounds, REGIONS};
use crate::{clamp, CollageConfig, Landmarks, Rectangle, Result};

/// A crop of the frame and the place it gets pasted back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub region: String,
    pub src_x: u32,
    pub src_y: u32,
    pub dst_x: u32,
    pub dst_y: u32,
    pub width: u32,
    pub height: u32
}

impl Tile {
    fn cut<R: Rng + ?Sized>(region: &str, bounds: &RegionBounds, frame_width: u32, frame_height: u32, config: &CollageConfig, rng: &mut R) -> Self {
        let (w, h) = (i64::from(frame_width), i64::from(frame_height));

        // Float to int casts saturate; sizes are capped again so they fit a u32.
        let scale = config.scale_min + rng.gen::<f64>() * config.scale_span;
        let tile_w = ((bounds.width() as f64 * scale).floor() as i64).min(i64::from(u32::MAX));
        let tile_h = ((bounds.height() as f64 * scale).floor() as i64).min(i64::from(u32::MAX));

        let dx = ((rng.gen::<f64>() - 0.5) * config.jitter).floor() as i64;
        let dy = ((rng.gen::<f64>() - 0.5) * config.jitter).floor() as i64;

        // Both corners are kept inside the frame; a tile larger than the frame is pinned to 0.
        Self {
            region: region.to_owned(),
            src_x: clamp(bounds.x1, 0, w - tile_w) as u32,
            src_y: clamp(bounds.y1, 0, h - tile_h) as u32,
            dst_x: clamp(bounds.x1.saturating_add(dx), 0, w - tile_w) as u32,
            dst_y: clamp(bounds.y1.saturating_add(dy), 0, h - tile_h) as u32,
            width: tile_w as u32,
            height: tile_h as u32
        }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn source(&self) -> Rectangle {
        Rectangle::new(self.src_x, self.src_y, self.width, self.height)
    }

    pub fn destination(&self) -> Rectangle {
        Rectangle::new(self.dst_x, self.dst_y, self.width, self.height)
    }
}

/// Every tile for one frame, in drawing order: largest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollagePlan {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Tile>
}

impl CollagePlan {
    /// Cut tiles from every region of one face in a `width` x `height` frame.
    pub fn generate<R: Rng + ?Sized>(landmarks: &Landmarks, width: u32, height: u32, config: &CollageConfig, rng: &mut R) -> Result<Self> {
        let mut tiles = Vec::new();

        for region in REGIONS.iter() {
            let bounds = region.bounds(landmarks, width, height)?;
            let count = region.tile_count(config.default_tiles, config.emphasized_tiles);

            debug!(region = region.name, ?bounds, count, "cutting tiles");

            for _ in 0 .. count {
                tiles.push(Tile::cut(region.name, &bounds, width, height, config, rng));
            }
        }

        // Stable, so equal areas keep the order they were cut in.
        tiles.sort_by(|a, b| b.area().cmp(&a.area()));

        debug!(tiles = tiles.len(), "collage plan ready");

        Ok(Self {
            width, height, tiles
        })
    }

    /// Serialize the plan to a file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Deserialize a plan from a file written by [`CollagePlan::write`].
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_from(BufReader::new(File::open(path)?))
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        Ok(bincode::deserialize_from(reader)?)
    }
}
