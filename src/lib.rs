pub mod config;
pub mod error;
pub mod orchestrator;
pub mod provider;

#[cfg(feature = "web")]
pub mod web;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use config::AppConfig;
pub use error::GenerateError;
pub use orchestrator::{Generation, IdeaClient, IdeaRenderer};

/// Matches a numbered list marker: optional leading whitespace, digits, then
/// one or more of `.`, `)`, or whitespace, then the idea body.
static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)[.)\s]+(.*)$").expect("valid numbered-line pattern"));

/// One parsed content suggestion. Always non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Idea(String);

impl Idea {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Idea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Segments a raw completion into discrete idea strings.
///
/// Single pass over the lines: a numbered marker starts a new idea, plain
/// non-meta lines continue the current one (joined with a single space), and
/// everything before the first marker is dropped. Never fails; fully
/// unparsable input yields an empty list.
pub fn parse_ideas(raw: &str) -> Vec<Idea> {
    let mut ideas = Vec::new();
    let mut current: Option<String> = None;

    for line in raw.lines() {
        if let Some(caps) = NUMBERED_LINE.captures(line) {
            if let Some(text) = current.take() {
                push_idea(&mut ideas, &text);
            }
            // The body may be empty ("3." alone); the item still opens so
            // that continuation lines can attach to it.
            current = Some(caps[2].to_string());
        } else {
            let trimmed = line.trim();
            if trimmed.is_empty() || is_meta_line(trimmed) {
                continue;
            }
            // Continuation text before any marker has nowhere to attach.
            if let Some(text) = current.as_mut() {
                let base = text.trim_end();
                *text = if base.is_empty() {
                    trimmed.to_string()
                } else {
                    format!("{base} {trimmed}")
                };
            }
        }
    }
    if let Some(text) = current {
        push_idea(&mut ideas, &text);
    }
    ideas
}

/// Heuristic for instructional meta-text the model sometimes wraps around the
/// list ("Here are the generated ideas..."). Substring-based and coarse on
/// purpose; swap this predicate out without touching the segmentation above.
pub fn is_meta_line(line: &str) -> bool {
    let lowered = line.to_lowercase();
    lowered.contains("generate") || lowered.contains("requirement")
}

fn push_idea(ideas: &mut Vec<Idea>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        ideas.push(Idea(trimmed.to_string()));
    }
}
