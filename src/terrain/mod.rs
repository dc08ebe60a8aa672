//! Procedural ASCII terrain used as page background decoration.
//!
//! A map is built in two passes:
//! - a deterministic base: hash noise summed over octaves (fBm), multiplied by a
//!   radial island mask and bucketed into six terrain bands;
//! - a cosmetic decoration pass drawing a few city markers and one tactical
//!   label with caller-provided randomness.
//!
//! Only the base pass is reproducible for a given seed.

use rand::Rng;
use rand::seq::SliceRandom;

pub mod labels;
pub mod render;

pub use labels::LABEL_CATEGORIES;
pub use render::{GridMetrics, MapOptions, ObserverRegistry};

/// Marker drawn for a city.
pub const CITY: char = '#';

// Margin (in cells) kept free of cities and labels along the left/top edges.
const EDGE_MARGIN: usize = 5;

// --- Terrain bands -----------------------------------------------------------

/// Terrain classification for a single cell, ordered from lowest to highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerrainCell {
    DeepWater,
    Shore,
    Plains,
    Forest,
    Hills,
    Mountains,
}

// Upper bound (exclusive) of each band; anything above the last is mountains.
const BANDS: [(f64, TerrainCell); 5] = [
    (0.3, TerrainCell::DeepWater),
    (0.4, TerrainCell::Shore),
    (0.5, TerrainCell::Plains),
    (0.65, TerrainCell::Forest),
    (0.8, TerrainCell::Hills),
];

impl TerrainCell {
    pub const ALL: [TerrainCell; 6] = [
        TerrainCell::DeepWater,
        TerrainCell::Shore,
        TerrainCell::Plains,
        TerrainCell::Forest,
        TerrainCell::Hills,
        TerrainCell::Mountains,
    ];

    /// Bucket a height value into its band.
    pub fn classify(height: f64) -> Self {
        BANDS
            .iter()
            .find(|(limit, _)| height < *limit)
            .map(|&(_, cell)| cell)
            .unwrap_or(TerrainCell::Mountains)
    }

    pub fn symbol(self) -> char {
        match self {
            TerrainCell::DeepWater => '~',
            TerrainCell::Shore => '.',
            TerrainCell::Plains => ',',
            TerrainCell::Forest => '+',
            TerrainCell::Hills => '^',
            TerrainCell::Mountains => 'A',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|cell| cell.symbol() == c)
    }

    /// Cities are never founded on water or shore.
    pub fn is_settleable(self) -> bool {
        !matches!(self, TerrainCell::DeepWater | TerrainCell::Shore)
    }
}

// --- Noise -------------------------------------------------------------------

/// Parameters for the fractal height field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseParams {
    /// Cell-to-noise coordinate scale (lower = larger features)
    pub scale: f64,
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            scale: 0.1,
            octaves: 4,
            persistence: 0.5,
        }
    }
}

/// Hash-like value noise in `[0, 1)`. Pure function of its inputs.
pub fn hash_noise(x: f64, y: f64, seed: f64) -> f64 {
    let n = (x * 12.9898 + y * 78.233 + seed).sin() * 43758.5453;
    n - n.floor()
}

/// Fractal sum of [`hash_noise`], normalized by total amplitude so the result
/// stays in `[0, 1)`. Octave `i` samples at frequency `2^i` with seed `seed + i`.
pub fn fbm(x: f64, y: f64, params: &NoiseParams, seed: f64) -> f64 {
    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut max_value = 0.0;
    for i in 0..params.octaves {
        total += hash_noise(x * frequency, y * frequency, seed + i as f64) * amplitude;
        max_value += amplitude;
        amplitude *= params.persistence;
        frequency *= 2.0;
    }
    if max_value > 0.0 { total / max_value } else { 0.0 }
}

/// Radial falloff: 1 at the grid center, 0 at (and beyond) the edge midpoints.
pub fn island_mask(x: f64, y: f64, width: f64, height: f64) -> f64 {
    let half_w = width / 2.0;
    let half_h = height / 2.0;
    let dx = (x - half_w) / half_w;
    let dy = (y - half_h) / half_h;
    (1.0 - (dx * dx + dy * dy).sqrt()).max(0.0)
}

// --- Grid --------------------------------------------------------------------

/// Character grid, row-major. Every row has exactly `width` cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TerrainGrid {
    width: usize,
    height: usize,
    rows: Vec<Vec<char>>,
}

impl TerrainGrid {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Overwrite one cell; out-of-range writes are dropped.
    pub fn set(&mut self, x: usize, y: usize, c: char) -> bool {
        match self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            Some(cell) => {
                *cell = c;
                true
            }
            None => false,
        }
    }

    pub fn row_text(&self, y: usize) -> Option<String> {
        self.rows.get(y).map(|row| row.iter().collect())
    }

    /// Rows joined with `\n`, no trailing newline.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(row.iter());
        }
        out
    }
}

/// Deterministic part of the map: height field, island mask and banding.
pub fn base_terrain(width: usize, height: usize, seed: f64) -> TerrainGrid {
    base_terrain_with(width, height, seed, &NoiseParams::default())
}

pub fn base_terrain_with(
    width: usize,
    height: usize,
    seed: f64,
    params: &NoiseParams,
) -> TerrainGrid {
    if width == 0 || height == 0 {
        return TerrainGrid::empty();
    }
    let (w, h) = (width as f64, height as f64);
    let rows = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    let (fx, fy) = (x as f64, y as f64);
                    let noise = fbm(fx * params.scale, fy * params.scale, params, seed);
                    let value = noise * island_mask(fx, fy, w, h);
                    TerrainCell::classify(value).symbol()
                })
                .collect()
        })
        .collect();
    TerrainGrid { width, height, rows }
}

// --- Decoration --------------------------------------------------------------

/// A tactical label written into the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedLabel {
    pub text: &'static str,
    pub x: usize,
    pub y: usize,
}

/// What the decoration pass actually drew.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decorations {
    /// City attempts (2-4 per map)
    pub attempted_cities: usize,
    /// Cities committed, as `(x, y)`
    pub cities: Vec<(usize, usize)>,
    pub label: Option<PlacedLabel>,
}

/// Full map: deterministic base plus random cities and one label.
pub fn generate<R: Rng + ?Sized>(width: usize, height: usize, seed: f64, rng: &mut R) -> TerrainGrid {
    let mut grid = base_terrain(width, height, seed);
    decorate(&mut grid, rng);
    grid
}

/// Places cities then the label. A city attempt that lands on water or
/// shore is dropped, and the label may cover an earlier city.
pub fn decorate<R: Rng + ?Sized>(grid: &mut TerrainGrid, rng: &mut R) -> Decorations {
    let mut out = Decorations::default();
    if grid.is_empty() {
        return out;
    }
    out.attempted_cities = rng.gen_range(2..=4);
    for _ in 0..out.attempted_cities {
        if let Some((x, y)) = place_city(grid, rng) {
            out.cities.push((x, y));
        }
    }
    out.label = place_label(grid, rng);
    out
}

fn place_city<R: Rng + ?Sized>(grid: &mut TerrainGrid, rng: &mut R) -> Option<(usize, usize)> {
    let x = pick_in_margin(grid.width(), rng)?;
    let y = pick_in_margin(grid.height(), rng)?;
    let settleable = grid
        .get(x, y)
        .map(|c| TerrainCell::from_symbol(c).is_none_or(TerrainCell::is_settleable))
        .unwrap_or(false);
    if settleable && grid.set(x, y, CITY) {
        Some((x, y))
    } else {
        None
    }
}

// Uniform in [EDGE_MARGIN, extent - EDGE_MARGIN), or None when that is empty.
fn pick_in_margin<R: Rng + ?Sized>(extent: usize, rng: &mut R) -> Option<usize> {
    let span = extent.checked_sub(2 * EDGE_MARGIN).filter(|s| *s > 0)?;
    Some(EDGE_MARGIN + rng.gen_range(0..span))
}

fn place_label<R: Rng + ?Sized>(grid: &mut TerrainGrid, rng: &mut R) -> Option<PlacedLabel> {
    let category = LABEL_CATEGORIES.choose(rng)?;
    let text = *category.choose(rng)?;
    let y = if grid.height() > 2 {
        rng.gen_range(1..grid.height() - 1)
    } else {
        grid.height() - 1
    };
    let x = match grid.width().checked_sub(text.len() + 2 * EDGE_MARGIN) {
        Some(span) if span > 0 => EDGE_MARGIN + rng.gen_range(0..span),
        _ => 0,
    };
    for (i, c) in text.chars().enumerate() {
        if !grid.set(x + i, y, c) {
            break;
        }
    }
    Some(PlacedLabel { text, x, y })
}
