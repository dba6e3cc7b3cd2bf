use std::str::FromStr;

use anyhow::Context;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::{CellKind, Flag, Grid, Tile};

/// How pixels are told apart into walls and paths
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classifier {
    /// A pixel is a wall iff its color is exactly the palette wall color
    #[default]
    Exact,
    /// A pixel is a wall iff its red channel is below 128
    Threshold,
}

impl FromStr for Classifier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Classifier::Exact),
            "threshold" => Ok(Classifier::Threshold),
            _ => Err(anyhow::anyhow!("Invalid classifier: {}", s)),
        }
    }
}

/// Colors used to read a maze bitmap and to draw the solved maze
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub wall: [u8; 3],
    pub path: [u8; 3],
    pub entrance: [u8; 3],
    pub exit: [u8; 3],
    pub route: [u8; 3],
    pub visited: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            wall: [0, 0, 0],
            path: [255, 255, 255],
            entrance: [0, 160, 0],
            exit: [0, 90, 220],
            route: [220, 40, 40],
            visited: [215, 215, 215],
        }
    }
}

impl Palette {
    fn color_of(&self, kind: CellKind, has: impl Fn(Flag) -> bool) -> [u8; 3] {
        if has(Flag::Entrance) {
            self.entrance
        } else if has(Flag::Exit) {
            self.exit
        } else if has(Flag::Route) {
            self.route
        } else if has(Flag::Visited) {
            self.visited
        } else if kind == CellKind::Wall {
            self.wall
        } else {
            self.path
        }
    }
}

/// Turn a decoded bitmap into rows of tiles. Every `ratio` x `ratio` block of
/// pixels is one tile, sampled at its top left pixel.
pub fn classify_image(
    img: &DynamicImage,
    classifier: Classifier,
    wall: [u8; 3],
    ratio: u32,
) -> Result<Vec<Vec<Tile>>, anyhow::Error> {
    anyhow::ensure!(ratio > 0, "the pixel ratio must be at least 1");

    let width = (img.width() / ratio) as usize;
    let height = (img.height() / ratio) as usize;

    let mut tiles = vec![vec![Tile::Wall; width]; height];

    for (row, line) in tiles.iter_mut().enumerate() {
        for (col, tile) in line.iter_mut().enumerate() {
            let p = img.get_pixel(col as u32 * ratio, row as u32 * ratio);

            let is_wall = match classifier {
                Classifier::Exact => p.0[..3] == wall,
                Classifier::Threshold => p.0[0] < 128,
            };
            *tile = if is_wall { Tile::Wall } else { Tile::Path };
        }
    }

    Ok(tiles)
}

/// Decode a bitmap straight into a [`Grid`]
pub fn parse_img(
    img: &DynamicImage,
    classifier: Classifier,
    palette: &Palette,
    ratio: u32,
) -> Result<Grid, anyhow::Error> {
    let tiles = classify_image(img, classifier, palette.wall, ratio)?;
    Ok(Grid::from_tiles(&tiles)?)
}

/// Draw the grid with every cell as a `ratio` x `ratio` block of pixels
pub fn draw_image(grid: &Grid, palette: &Palette, ratio: u32) -> Result<RgbImage, anyhow::Error> {
    anyhow::ensure!(ratio > 0, "the pixel ratio must be at least 1");

    let colors: Vec<Vec<[u8; 3]>> = grid
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| palette.color_of(cell.kind(), |flag| cell.has(flag)))
                .collect()
        })
        .collect();

    let width = u32::try_from(grid.width())
        .ok()
        .and_then(|w| w.checked_mul(ratio))
        .with_context(|| format!("{} columns at ratio {} overflow the image width", grid.width(), ratio))?;
    let height = u32::try_from(grid.height())
        .ok()
        .and_then(|h| h.checked_mul(ratio))
        .with_context(|| format!("{} rows at ratio {} overflow the image height", grid.height(), ratio))?;

    Ok(ImageBuffer::from_fn(width, height, |x, y| {
        Rgb(colors[(y / ratio) as usize][(x / ratio) as usize])
    }))
}
