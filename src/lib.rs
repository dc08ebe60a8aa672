//! ZDG WarWord core crate.
//!
//! Two independent pieces: an ASCII terrain generator drawn as page backdrop
//! (`terrain`) and a pointer-driven word guessing animation (`puzzle`). Both
//! are pure Rust and testable on the host; the `web` module (wasm32 only) binds
//! them to the DOM.

use wasm_bindgen::prelude::*;

pub mod logging;
pub mod puzzle;
pub mod terrain;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use puzzle::{Dictionary, DictionaryEntry, PuzzleConfig, PuzzleEngine, FALLBACK_WORD};
pub use terrain::{TerrainCell, TerrainGrid, base_terrain, generate};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}
