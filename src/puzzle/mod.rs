//! Word puzzle: a row of letter placeholders showing a word at some offset,
//! plus its definition and context.
//!
//! Moving the pointer throws the row into "chaos": one slot is pinned, every
//! other slot flickers through random letters and the texts scramble. Once
//! the pointer has been still for the quiet period, a new word is drawn that
//! has the same letter in the pinned slot.
//!
//! ```text
//!            pointer move (restart quiet timer)
//!   Idle  ─────────────────────────────────────▶  Chaos
//!    ▲                                             │
//!    └──────────── quiet timer fires ◀─────────────┘
//!                  (reselect, restore texts)
//! ```

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub mod chaos;
pub mod dictionary;
pub mod surface;
pub mod timer;

pub use chaos::ChaosText;
pub use dictionary::{Dictionary, DictionaryEntry, DictionaryError, TextChoice};
pub use surface::{MemorySurface, PuzzleSurface, SlotStyle, SlotView, TextTarget};
pub use timer::{ManualScheduler, PuzzleConfig, Scheduler, TimerKind, TimerSet};

/// Shown when the dictionary has nothing usable.
pub const FALLBACK_WORD: &str = "WARWORD";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Chaos,
}

/// A word that can be placed so it keeps the pinned letter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Index into `Dictionary::entries`
    pub entry: usize,
    pub letters: Vec<char>,
    pub offset: usize,
}

/// Every `(word, offset)` placement that covers `pinned` with `target`
/// (any letter when `target` is `None`) and fits inside `letter_count` slots.
pub fn find_candidates(
    dictionary: &Dictionary,
    letter_count: usize,
    pinned: usize,
    target: Option<char>,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    for (entry, letters) in dictionary.usable() {
        let Some(last_offset) = letter_count.checked_sub(letters.len()) else { continue };
        for offset in 0..=last_offset {
            let Some(idx) = pinned.checked_sub(offset) else { break };
            let Some(&c) = letters.get(idx) else { continue };
            if target.is_none_or(|t| t == c) {
                out.push(Candidate {
                    entry,
                    letters: letters.clone(),
                    offset,
                });
            }
        }
    }
    out
}

/// Everything the engine mutates between events.
#[derive(Clone, Debug)]
pub struct PuzzleState {
    word: Vec<char>,
    offset: usize,
    fixed_index: Option<usize>,
    definition: ChaosText,
    context: ChaosText,
    mouse_moving: bool,
    phase: Phase,
}

impl Default for PuzzleState {
    fn default() -> Self {
        Self {
            word: Vec::new(),
            offset: 0,
            fixed_index: None,
            definition: ChaosText::default(),
            context: ChaosText::default(),
            mouse_moving: false,
            phase: Phase::Idle,
        }
    }
}

impl PuzzleState {
    pub fn word(&self) -> String {
        self.word.iter().collect()
    }

    pub fn letters(&self) -> &[char] {
        &self.word
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn fixed_index(&self) -> Option<usize> {
        self.fixed_index
    }

    pub fn definition(&self) -> &str {
        self.definition.text()
    }

    pub fn context(&self) -> &str {
        self.context.text()
    }

    pub fn mouse_moving(&self) -> bool {
        self.mouse_moving
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Letter the current word puts in `slot`, if it covers it.
    pub fn letter_at(&self, slot: usize) -> Option<char> {
        let idx = slot.checked_sub(self.offset)?;
        self.word.get(idx).copied()
    }

    fn text_mut(&mut self, target: TextTarget) -> &mut ChaosText {
        match target {
            TextTarget::Definition => &mut self.definition,
            TextTarget::Context => &mut self.context,
        }
    }
}

fn text_timer(target: TextTarget) -> TimerKind {
    match target {
        TextTarget::Definition => TimerKind::Definition,
        TextTarget::Context => TimerKind::Context,
    }
}

// Spaces inside words show as underscores.
fn display_char(c: char) -> char {
    if c == ' ' { '_' } else { c }
}

/// Owns the puzzle state and reacts to pointer and timer events.
pub struct PuzzleEngine<S: PuzzleSurface, T: Scheduler, R: Rng = StdRng> {
    config: PuzzleConfig,
    dictionary: Dictionary,
    state: PuzzleState,
    timers: TimerSet,
    rng: R,
    surface: S,
    scheduler: T,
}

impl<S: PuzzleSurface, T: Scheduler, R: Rng> PuzzleEngine<S, T, R> {
    /// A row needs at least one slot; `letter_count` of zero is raised to one.
    pub fn new(mut config: PuzzleConfig, dictionary: Dictionary, surface: S, scheduler: T, rng: R) -> Self {
        if config.letter_count == 0 {
            log::warn!("letter_count must be positive; using a single slot");
            config.letter_count = 1;
        }
        Self {
            config,
            dictionary,
            state: PuzzleState::default(),
            timers: TimerSet::default(),
            rng,
            surface,
            scheduler,
        }
    }

    pub fn state(&self) -> &PuzzleState {
        &self.state
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    /// Pick the first word and draw it.
    pub fn start(&mut self) {
        self.pick_random_word();
        self.render_word();
    }

    /// Pointer moved: enter (or stay in) chaos and push the quiet deadline back.
    pub fn on_pointer_move(&mut self) {
        self.state.mouse_moving = true;
        self.state.phase = Phase::Chaos;
        if self.state.fixed_index.is_none() {
            let pin = if self.state.word.is_empty() {
                self.rng.gen_range(0..self.config.letter_count)
            } else {
                self.state.offset + self.rng.gen_range(0..self.state.word.len())
            };
            self.state.fixed_index = Some(pin);
        }
        self.timers.start(
            TimerKind::Letters,
            self.config.period_ms(TimerKind::Letters),
            &mut self.scheduler,
        );
        self.start_text_chaos(TextTarget::Definition);
        self.start_text_chaos(TextTarget::Context);
        self.timers.restart(
            TimerKind::Quiet,
            self.config.period_ms(TimerKind::Quiet),
            &mut self.scheduler,
        );
    }

    /// Host callback for a timer armed through the scheduler. Ticks for a
    /// timer that has since been cancelled are ignored.
    pub fn on_timer(&mut self, kind: TimerKind) {
        if !self.timers.is_active(kind) {
            log::debug!("stale {kind:?} tick ignored");
            return;
        }
        self.timers.mark_fired(kind);
        match kind {
            TimerKind::Letters => {
                let slots = self.chaos_slots();
                self.surface.render_slots(&slots);
            }
            TimerKind::Definition => self.tick_text(TextTarget::Definition),
            TimerKind::Context => self.tick_text(TextTarget::Context),
            TimerKind::Quiet => self.settle(),
        }
    }

    /// Cancel every timer and show true texts. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.stop_text_chaos(TextTarget::Definition);
        self.stop_text_chaos(TextTarget::Context);
        self.timers.stop_all(&mut self.scheduler);
        self.state.mouse_moving = false;
        self.state.phase = Phase::Idle;
    }

    /// Slots showing the current word, no flicker.
    pub fn word_slots(&self) -> Vec<SlotView> {
        (0..self.config.letter_count)
            .map(|i| {
                let letter = self.state.letter_at(i).map(display_char);
                SlotView {
                    letter,
                    style: SlotStyle {
                        fixed: self.state.fixed_index == Some(i),
                        empty: letter.is_none(),
                        chaos: false,
                    },
                }
            })
            .collect()
    }

    fn chaos_slots(&mut self) -> Vec<SlotView> {
        let flicker = SlotStyle {
            chaos: true,
            ..SlotStyle::default()
        };
        (0..self.config.letter_count)
            .map(|i| {
                if self.state.fixed_index == Some(i) {
                    SlotView {
                        letter: self.state.letter_at(i).map(display_char),
                        style: SlotStyle { fixed: true, ..flicker },
                    }
                } else {
                    SlotView {
                        letter: Some(chaos::random_uppercase(&mut self.rng)),
                        style: flicker,
                    }
                }
            })
            .collect()
    }

    fn render_word(&mut self) {
        let slots = self.word_slots();
        self.surface.render_slots(&slots);
    }

    fn pick_random_word(&mut self) {
        let letter_count = self.config.letter_count;
        let usable: Vec<(usize, Vec<char>)> = self
            .dictionary
            .usable()
            .filter(|(_, letters)| letters.len() <= letter_count)
            .collect();
        let Some((entry, letters)) = usable.choose(&mut self.rng).cloned() else {
            log::info!("no usable dictionary words; showing {FALLBACK_WORD}");
            self.state.word = FALLBACK_WORD.chars().take(letter_count).collect();
            self.state.offset = 0;
            self.show_text(TextTarget::Definition, String::new());
            self.show_text(TextTarget::Context, String::new());
            self.surface.refresh_background();
            return;
        };
        let offset = self.rng.gen_range(0..=letter_count - letters.len());
        self.apply_word(entry, letters, offset);
    }

    fn apply_word(&mut self, entry: usize, letters: Vec<char>, offset: usize) {
        let (definition, context) = match self.dictionary.entries().get(entry) {
            Some(e) => (
                e.definition.as_ref().map(|d| d.pick(&mut self.rng)).unwrap_or_default(),
                e.context.as_ref().map(|c| c.pick(&mut self.rng)).unwrap_or_default(),
            ),
            None => Default::default(),
        };
        self.state.word = letters;
        self.state.offset = offset;
        self.show_text(TextTarget::Definition, definition);
        self.show_text(TextTarget::Context, context);
        self.surface.refresh_background();
    }

    // Quiet period elapsed: back to idle and reselect around the pinned slot.
    fn settle(&mut self) {
        self.state.mouse_moving = false;
        self.state.phase = Phase::Idle;
        self.timers.stop(TimerKind::Letters, &mut self.scheduler);
        self.stop_text_chaos(TextTarget::Definition);
        self.stop_text_chaos(TextTarget::Context);

        let Some(pin) = self.state.fixed_index else {
            self.render_word();
            return;
        };
        let target = self.state.letter_at(pin);
        let candidates = find_candidates(&self.dictionary, self.config.letter_count, pin, target);
        match candidates.choose(&mut self.rng).cloned() {
            Some(choice) => {
                log::debug!("pinned slot {pin}: {} placements qualify", candidates.len());
                self.apply_word(choice.entry, choice.letters, choice.offset);
            }
            None => log::debug!("pinned slot {pin}: no placement qualifies, keeping word"),
        }
        self.render_word();
        self.state.fixed_index = None;
    }

    // Words only change while idle, so new texts go straight to the surface.
    fn show_text(&mut self, target: TextTarget, text: String) {
        self.state.text_mut(target).set_text(text);
        self.stop_text_chaos(target);
    }

    fn start_text_chaos(&mut self, target: TextTarget) {
        self.state.text_mut(target).start();
        let kind = text_timer(target);
        self.timers
            .start(kind, self.config.period_ms(kind), &mut self.scheduler);
    }

    fn stop_text_chaos(&mut self, target: TextTarget) {
        self.timers.stop(text_timer(target), &mut self.scheduler);
        let text = self.state.text_mut(target).stop();
        self.surface.set_text(target, text);
    }

    fn tick_text(&mut self, target: TextTarget) {
        let frame = match target {
            TextTarget::Definition => self.state.definition.tick(&mut self.rng),
            TextTarget::Context => self.state.context.tick(&mut self.rng),
        };
        if let Some(frame) = frame {
            self.surface.set_text(target, &frame);
        }
    }
}

impl<S: PuzzleSurface, T: Scheduler, R: Rng> Drop for PuzzleEngine<S, T, R> {
    fn drop(&mut self) {
        self.timers.stop_all(&mut self.scheduler);
    }
}
