// Tactical map labels
// One category is picked uniformly, then one word from it.

pub static HOSTILE_LABELS: [&str; 5] = ["ENEMY", "FOE", "HOSTILE", "OPFOR", "ADVERSARY"];
pub static FRIENDLY_LABELS: [&str; 5] = ["ALLY", "FRIEND", "FRIENDLY", "PARTNER", "COHORT"];
pub static UNKNOWN_LABELS: [&str; 5] = ["SUSPECT", "UNKNOWN", "MYSTERY", "QUERY", "SHADOW"];
pub static OBJECTIVE_LABELS: [&str; 5] = ["TARGET", "OBJECTIVE", "MARK", "GOAL", "AIM"];

pub static LABEL_CATEGORIES: [&[&str]; 4] = [
    &HOSTILE_LABELS,
    &FRIENDLY_LABELS,
    &UNKNOWN_LABELS,
    &OBJECTIVE_LABELS,
];

/// Every character a label can put on the map.
pub fn is_label_char(c: char) -> bool {
    c.is_ascii_uppercase()
}
