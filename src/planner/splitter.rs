use once_cell::sync::Lazy;
use regex::Regex;

/// Fragments this short or shorter are dropped as noise.
pub const MIN_INSTRUCTION_LEN: usize = 3;

static INSTRUCTION_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:and|then)\b|\r\n|[\r\n.;,]|\|\||\|\s")
        .expect("valid instruction separator regex")
});

static ACTION_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:and|then)\b|;").expect("valid action separator regex"));

/// Split a goal into atomic instructions.
///
/// Fragments are trimmed and anything of three characters or fewer is
/// dropped. When fewer than two fragments survive the trimmed goal is
/// returned whole, so a single directive that merely contains "and" is not
/// broken apart. A goal that is itself too short yields nothing.
pub fn split_instructions(goal: &str) -> Vec<String> {
    let goal = goal.trim();
    if goal.chars().count() <= MIN_INSTRUCTION_LEN {
        return Vec::new();
    }

    let fragments: Vec<String> = INSTRUCTION_SEPARATORS
        .split(goal)
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() > MIN_INSTRUCTION_LEN)
        .map(str::to_string)
        .collect();

    if fragments.len() < 2 {
        return vec![goal.to_string()];
    }
    fragments
}

/// Split one instruction into related sub-actions ("optimize and add logging").
///
/// Only conjunctions and semicolons separate actions; commas and periods
/// belong to instruction boundaries. Returns the trimmed instruction itself
/// when nothing splits off.
pub fn split_actions(instruction: &str) -> Vec<String> {
    let actions: Vec<String> = ACTION_SEPARATORS
        .split(instruction)
        .map(str::trim)
        .filter(|action| !action.is_empty())
        .map(str::to_string)
        .collect();

    if actions.is_empty() {
        let trimmed = instruction.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        return vec![trimmed.to_string()];
    }
    actions
}
