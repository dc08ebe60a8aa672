//! Flicker effect for text while the pointer moves.

use rand::Rng;

const LOWER: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub fn random_lowercase<R: Rng + ?Sized>(rng: &mut R) -> char {
    LOWER[rng.gen_range(0..LOWER.len())] as char
}

pub fn random_uppercase<R: Rng + ?Sized>(rng: &mut R) -> char {
    UPPER[rng.gen_range(0..UPPER.len())] as char
}

/// Same shape as `text`: spaces kept, every other char a random lowercase letter.
pub fn scramble<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    text.chars()
        .map(|c| if c == ' ' { ' ' } else { random_lowercase(rng) })
        .collect()
}

/// Holds the true text of a flickering element and whether it is flickering.
///
/// The animator only tracks state; the caller owns the tick timer and writes
/// what `tick`/`stop` return to the surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChaosText {
    text: String,
    running: bool,
}

impl ChaosText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            running: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Returns `true` only on the transition into the running state.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.running, true)
    }

    /// Next frame while running.
    pub fn tick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        self.running.then(|| scramble(&self.text, rng))
    }

    /// Halt and hand back the true text for display.
    pub fn stop(&mut self) -> &str {
        self.running = false;
        &self.text
    }
}
