//! What the puzzle engine draws on.

/// Visual state of one placeholder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotStyle {
    /// Pinned slot
    pub fixed: bool,
    /// Outside the placed word (drawn as an underscore)
    pub empty: bool,
    pub chaos: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotView {
    /// `None` renders blank
    pub letter: Option<char>,
    pub style: SlotStyle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextTarget {
    Definition,
    Context,
}

pub trait PuzzleSurface {
    fn render_slots(&mut self, slots: &[SlotView]);
    fn set_text(&mut self, target: TextTarget, text: &str);
    /// Cosmetic redraw of whatever sits behind the puzzle.
    fn refresh_background(&mut self) {}
}

/// Keeps the last frame in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemorySurface {
    pub slots: Vec<SlotView>,
    pub definition: String,
    pub context: String,
    pub frames: usize,
    pub background_refreshes: usize,
}

impl MemorySurface {
    /// Slots as a string, blanks as `' '`.
    pub fn letters(&self) -> String {
        self.slots.iter().map(|s| s.letter.unwrap_or(' ')).collect()
    }
}

impl PuzzleSurface for MemorySurface {
    fn render_slots(&mut self, slots: &[SlotView]) {
        self.slots = slots.to_vec();
        self.frames += 1;
    }

    fn set_text(&mut self, target: TextTarget, text: &str) {
        let slot = match target {
            TextTarget::Definition => &mut self.definition,
            TextTarget::Context => &mut self.context,
        };
        slot.clear();
        slot.push_str(text);
    }

    fn refresh_background(&mut self) {
        self.background_refreshes += 1;
    }
}
