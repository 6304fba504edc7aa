use thiserror::Error;

/// Characters of the target kept in a record's preview.
pub const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("target text must contain at least one word")]
    EmptyTarget,
}

/// The text a round asks the user to reproduce. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetText {
    content: String,
    chars: Vec<char>,
}

impl TargetText {
    pub fn new(content: impl Into<String>) -> Result<Self, SessionError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(SessionError::EmptyTarget);
        }
        let chars = content.chars().collect();
        Ok(Self { content, chars })
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Length in characters, not bytes.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    pub fn preview(&self) -> String {
        let head: String = self.chars.iter().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    }
}
