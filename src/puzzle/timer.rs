//! Scheduled tasks behind the puzzle animation.
//!
//! The engine never touches real timers. It asks a [`Scheduler`] to arm or
//! cancel one of a fixed set of [`TimerKind`]s, and the host calls back into
//! the engine when one fires. [`TimerSet`] guarantees at most one live timer
//! per kind.

use serde::Deserialize;

/// Timer periods and slot count.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    /// Number of letter placeholders
    pub letter_count: usize,
    pub letter_tick_ms: u32,
    pub text_tick_ms: u32,
    /// Inactivity after the last pointer move before chaos ends
    pub quiet_period_ms: u32,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            letter_count: 7,
            letter_tick_ms: 60,
            text_tick_ms: 40,
            quiet_period_ms: 200,
        }
    }
}

impl PuzzleConfig {
    pub fn from_json_or_default(json: Option<&str>) -> Self {
        match json.map(serde_json::from_str::<PuzzleConfig>) {
            Some(Ok(cfg)) if cfg.letter_count > 0 => cfg,
            Some(Ok(_)) => {
                log::warn!("letter_count must be positive; using defaults");
                Self::default()
            }
            Some(Err(e)) => {
                log::warn!("ignoring malformed puzzle config: {e}");
                Self::default()
            }
            None => Self::default(),
        }
    }

    pub fn period_ms(&self, kind: TimerKind) -> u32 {
        match kind {
            TimerKind::Letters => self.letter_tick_ms,
            TimerKind::Definition | TimerKind::Context => self.text_tick_ms,
            TimerKind::Quiet => self.quiet_period_ms,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Letter slots flicker
    Letters,
    Definition,
    Context,
    /// One-shot: pointer has gone quiet
    Quiet,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [
        TimerKind::Letters,
        TimerKind::Definition,
        TimerKind::Context,
        TimerKind::Quiet,
    ];

    pub fn repeats(self) -> bool {
        !matches!(self, TimerKind::Quiet)
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Host timer facility.
pub trait Scheduler {
    /// Arm a timer of `kind`. Repeating kinds fire every `period_ms` until
    /// cancelled; `Quiet` fires once.
    fn schedule(&mut self, kind: TimerKind, period_ms: u32);
    fn cancel(&mut self, kind: TimerKind);
}

/// Which timers are live. All arming and cancelling goes through here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerSet {
    active: u8,
}

impl TimerSet {
    pub fn is_active(&self, kind: TimerKind) -> bool {
        self.active & kind.bit() != 0
    }

    pub fn any_active(&self) -> bool {
        self.active != 0
    }

    /// Arm `kind` unless it is already live. Returns whether it was armed.
    pub fn start<S: Scheduler + ?Sized>(&mut self, kind: TimerKind, period_ms: u32, scheduler: &mut S) -> bool {
        if self.is_active(kind) {
            return false;
        }
        scheduler.schedule(kind, period_ms);
        self.active |= kind.bit();
        true
    }

    /// Cancel then arm again; used for debouncing.
    pub fn restart<S: Scheduler + ?Sized>(&mut self, kind: TimerKind, period_ms: u32, scheduler: &mut S) {
        self.stop(kind, scheduler);
        self.start(kind, period_ms, scheduler);
    }

    /// Returns whether a live timer was cancelled.
    pub fn stop<S: Scheduler + ?Sized>(&mut self, kind: TimerKind, scheduler: &mut S) -> bool {
        if !self.is_active(kind) {
            return false;
        }
        scheduler.cancel(kind);
        self.active &= !kind.bit();
        true
    }

    /// A one-shot timer that fired is no longer live.
    pub fn mark_fired(&mut self, kind: TimerKind) {
        if !kind.repeats() {
            self.active &= !kind.bit();
        }
    }

    pub fn stop_all<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        for kind in TimerKind::ALL {
            self.stop(kind, scheduler);
        }
    }
}

/// Scheduler that only records calls. Drives the engine by hand in tests and
/// in headless hosts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManualScheduler {
    live: Vec<(TimerKind, u32)>,
    pub scheduled: Vec<TimerKind>,
    pub cancelled: Vec<TimerKind>,
}

impl ManualScheduler {
    pub fn is_live(&self, kind: TimerKind) -> bool {
        self.live.iter().any(|(k, _)| *k == kind)
    }

    pub fn live_count(&self, kind: TimerKind) -> usize {
        self.live.iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn period_of(&self, kind: TimerKind) -> Option<u32> {
        self.live.iter().find(|(k, _)| *k == kind).map(|&(_, p)| p)
    }

    /// Host side of a one-shot timer firing.
    pub fn fire_once(&mut self, kind: TimerKind) {
        if !kind.repeats() {
            self.live.retain(|(k, _)| *k != kind);
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, kind: TimerKind, period_ms: u32) {
        self.live.push((kind, period_ms));
        self.scheduled.push(kind);
    }

    fn cancel(&mut self, kind: TimerKind) {
        self.live.retain(|(k, _)| *k != kind);
        self.cancelled.push(kind);
    }
}
