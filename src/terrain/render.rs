//! Surface-facing helpers for drawing a map: how many cells fit in a box of
//! pixels, the caller's draw options, and bookkeeping for resize observers.

use serde::Deserialize;

pub const DEFAULT_MAP_COLOR: &str = "#e6e6e6";

/// Draw options accepted from the host page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// CSS color of the map text
    pub color: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            color: DEFAULT_MAP_COLOR.to_string(),
        }
    }
}

impl MapOptions {
    /// Parse options JSON; anything unreadable falls back to defaults.
    pub fn from_json_or_default(json: Option<&str>) -> Self {
        match json.map(serde_json::from_str::<MapOptions>) {
            Some(Ok(opts)) => opts,
            Some(Err(e)) => {
                log::warn!("ignoring malformed map options: {e}");
                Self::default()
            }
            None => Self::default(),
        }
    }
}

/// Approximate monospace font metrics used to turn pixels into cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMetrics {
    pub font_size: f64,
    pub line_height: f64,
    /// Glyph advance as a fraction of the font size
    pub char_width_ratio: f64,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            line_height: 12.0,
            char_width_ratio: 0.6,
        }
    }
}

impl GridMetrics {
    pub fn char_width(&self) -> f64 {
        self.font_size * self.char_width_ratio
    }

    /// `(cols, rows)` that fit in the given pixel box, or `None` when either
    /// would be zero (collapsed, hidden or unmeasurable surfaces).
    pub fn grid_size(&self, width_px: f64, height_px: f64) -> Option<(usize, usize)> {
        let cols = (width_px / self.char_width()).floor();
        let rows = (height_px / self.line_height).floor();
        if !(cols >= 1.0 && rows >= 1.0) {
            return None;
        }
        Some((cols as usize, rows as usize))
    }
}

/// At most one observer per surface. Registering again hands back the
/// previous observer so the caller can disconnect it.
#[derive(Debug)]
pub struct ObserverRegistry<K, O> {
    entries: Vec<(K, O)>,
}

impl<K, O> Default for ObserverRegistry<K, O> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<K: PartialEq, O> ObserverRegistry<K, O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, key: K, observer: O) -> Option<O> {
        let previous = self.remove(&key);
        self.entries.push((key, observer));
        previous
    }

    pub fn remove(&mut self, key: &K) -> Option<O> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.swap_remove(idx).1)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
