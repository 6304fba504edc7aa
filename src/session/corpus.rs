use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::session::target::{SessionError, TargetText};

const PASSAGES: &[&str] = &[
    // Calm
    "Breathe slowly and let your hands settle on the keys. There is nowhere else to be right now, only this line of text and the quiet rhythm of your fingers.",
    "Rain taps softly against the window while the kettle begins to hum. Each word you type is a small stone placed carefully along a garden path.",
    "Let the letters arrive one at a time, without hurry. A steady pace carries you further than a rushed one, and the page will wait for you.",
    "Morning light spreads across the desk and the room is still. Notice the weight of each key and the small click that follows every press.",
    // Focus
    "Attention is a muscle that grows with patient use. Keep your eyes on the next word, trust your hands, and let the rest of the world fade.",
    "Accuracy first, speed later. A clean line typed with care builds habits that last far longer than a fast line full of corrections.",
    "When the mind wanders, bring it back gently to the text in front of you. Each return is a repetition, and repetition is how focus is trained.",
    "Sharp focus turns practice into craft. Look ahead by a word or two, keep your shoulders loose, and let your fingers find the familiar paths.",
    // Practice
    "Skill grows quietly in the background of daily practice. Today's session rests on yesterday's, and tomorrow will rest on the one you finish now.",
    "The keyboard becomes an extension of thought once the hands stop asking where the letters live. That ease is earned a few minutes at a time.",
    "Between two keystrokes there is a tiny pause. Learn to enjoy it, because a relaxed rhythm is faster than a tense one over any real distance.",
    "Finish the line, take a breath, and begin again. Progress is rarely dramatic, but it is always there for anyone who keeps showing up.",
];

/// How many words a round asks for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthMode {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthMode {
    pub const ALL: [LengthMode; 3] = [LengthMode::Short, LengthMode::Medium, LengthMode::Long];

    pub fn word_count(self) -> usize {
        match self {
            LengthMode::Short => 25,
            LengthMode::Medium => 50,
            LengthMode::Long => 75,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LengthMode::Short => "short",
            LengthMode::Medium => "medium",
            LengthMode::Long => "long",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for LengthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct PassageCorpus {
    passages: Vec<String>,
    rng: SmallRng,
}

impl PassageCorpus {
    pub fn new(rng: SmallRng) -> Self {
        Self::with_passages(PASSAGES.iter().map(|p| p.to_string()).collect(), rng)
    }

    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }

    /// Blank passages are dropped so a round can never be built from nothing.
    pub fn with_passages(passages: Vec<String>, rng: SmallRng) -> Self {
        let passages = passages
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();
        Self { passages, rng }
    }

    fn random_passage(&mut self) -> &str {
        let idx = self.rng.gen_range(0..self.passages.len());
        &self.passages[idx]
    }

    /// Pick a passage, keep appending random passages until the word budget
    /// is covered, then cut to exactly `mode.word_count()` words.
    pub fn generate(&mut self, mode: LengthMode) -> Result<TargetText, SessionError> {
        if self.passages.is_empty() {
            return Err(SessionError::EmptyTarget);
        }
        let limit = mode.word_count();
        let mut words: Vec<String> = Vec::with_capacity(limit);
        while words.len() < limit {
            let passage = self.random_passage().to_string();
            words.extend(passage.split_whitespace().map(str::to_string));
        }
        words.truncate(limit);
        TargetText::new(words.join(" "))
    }
}
