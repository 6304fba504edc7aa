use std::sync::Arc;

use chrono::{DateTime, Local, Utc};

use crate::clock::Clock;
use crate::session::corpus::LengthMode;
use crate::session::metrics::{self, LiveMetrics};
use crate::session::record::SessionRecord;
use crate::session::target::TargetText;
use crate::store::session_log::new_entry_id;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    /// No target assigned yet.
    Idle,
    /// Target assigned, nothing typed, clock not running.
    Ready,
    Active,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    /// Tab, function keys, arrows. Never reaches the buffer.
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    Ignored,
    Accepted { correct: bool },
    Erased,
    Completed(SessionRecord),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeystrokeCounters {
    pub keystrokes: u32,
    /// Keystrokes that did not match the expected character when typed,
    /// whether or not they were later corrected.
    pub mistakes: u32,
    pub backspaces: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharStatus {
    Correct,
    Incorrect(char),
    Pending,
}

/// One typing round at a time: a fixed target, the characters typed so far,
/// and the counters needed to score the round when the last character lands.
pub struct TypingSession {
    clock: Arc<dyn Clock>,
    state: RoundState,
    target: Option<TargetText>,
    mode: LengthMode,
    input: Vec<char>,
    counters: KeystrokeCounters,
    started_at: Option<DateTime<Local>>,
    finished_at: Option<DateTime<Local>>,
    enabled: bool,
    record: Option<SessionRecord>,
}

impl TypingSession {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: RoundState::Idle,
            target: None,
            mode: LengthMode::default(),
            input: Vec::new(),
            counters: KeystrokeCounters::default(),
            started_at: None,
            finished_at: None,
            enabled: true,
            record: None,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn target(&self) -> Option<&TargetText> {
        self.target.as_ref()
    }

    pub fn mode(&self) -> LengthMode {
        self.mode
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn counters(&self) -> KeystrokeCounters {
        self.counters
    }

    /// The record produced by the current round, once it has completed.
    pub fn record(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Focus gate owned by the front end. A disabled session ignores keys
    /// but keeps its clock running.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Start a fresh round on `target`.
    pub fn assign_target(&mut self, target: TargetText, mode: LengthMode) {
        tracing::debug!(mode = %mode, chars = target.len(), "round ready");
        self.target = Some(target);
        self.mode = mode;
        self.clear_round();
    }

    /// Abandon the round but keep its target. Nothing is recorded.
    pub fn reset(&mut self) {
        if self.target.is_some() {
            self.clear_round();
        }
    }

    fn clear_round(&mut self) {
        self.input.clear();
        self.counters = KeystrokeCounters::default();
        self.started_at = None;
        self.finished_at = None;
        self.record = None;
        self.state = RoundState::Ready;
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        if !self.enabled || !matches!(self.state, RoundState::Ready | RoundState::Active) {
            return KeyOutcome::Ignored;
        }
        match key {
            Key::Backspace => self.backspace(),
            Key::Char(ch) if !ch.is_control() => self.type_char(ch),
            _ => KeyOutcome::Ignored,
        }
    }

    fn backspace(&mut self) -> KeyOutcome {
        if self.input.pop().is_none() {
            return KeyOutcome::Ignored;
        }
        self.counters.backspaces += 1;
        KeyOutcome::Erased
    }

    fn type_char(&mut self, ch: char) -> KeyOutcome {
        let (expected, target_len) = match &self.target {
            Some(target) => (target.char_at(self.input.len()), target.len()),
            None => return KeyOutcome::Ignored,
        };

        if self.state == RoundState::Ready {
            self.started_at = Some(self.clock.now());
            self.state = RoundState::Active;
        }

        let correct = expected == Some(ch);
        self.counters.keystrokes += 1;
        if !correct {
            self.counters.mistakes += 1;
        }
        self.input.push(ch);

        if self.input.len() == target_len {
            return KeyOutcome::Completed(self.finish());
        }
        KeyOutcome::Accepted { correct }
    }

    fn finish(&mut self) -> SessionRecord {
        let now = self.clock.now();
        self.finished_at = Some(now);
        self.state = RoundState::Completed;

        let (target_chars, preview) = match &self.target {
            Some(t) => (t.chars(), t.preview()),
            None => (&[][..], String::new()),
        };
        let m = metrics::finalize(&self.input, target_chars, self.elapsed_secs());

        let record = SessionRecord {
            id: new_entry_id(now),
            completed_at: now.with_timezone(&Utc),
            duration_seconds: m.duration_seconds,
            mode: self.mode,
            text_preview: preview,
            gross_wpm: m.gross_wpm,
            net_wpm: m.net_wpm,
            wpm: m.net_wpm,
            accuracy_percent: m.accuracy_percent,
            keystrokes: self.counters.keystrokes,
            mistakes: self.counters.mistakes,
            backspaces: self.counters.backspaces,
            uncorrected_errors: m.uncorrected_errors as u32,
        };
        tracing::info!(
            wpm = record.wpm,
            accuracy = record.accuracy_percent,
            seconds = record.duration_seconds,
            "round completed"
        );
        self.record = Some(record.clone());
        record
    }

    /// Whole seconds since the first keystroke, recomputed from timestamps
    /// so missed UI ticks never skew it.
    pub fn elapsed_secs(&self) -> u64 {
        let Some(start) = self.started_at else {
            return 0;
        };
        let end = self.finished_at.unwrap_or_else(|| self.clock.now());
        (end - start).num_seconds().max(0) as u64
    }

    pub fn live_metrics(&self) -> LiveMetrics {
        let target = self.target.as_ref().map(|t| t.chars()).unwrap_or(&[]);
        metrics::live(&self.input, target, self.elapsed_secs())
    }

    pub fn progress(&self) -> f64 {
        match &self.target {
            Some(t) if !t.is_empty() => self.input.len() as f64 / t.len() as f64,
            _ => 0.0,
        }
    }

    pub fn char_status(&self, idx: usize) -> CharStatus {
        match (self.input.get(idx), self.target.as_ref().and_then(|t| t.char_at(idx))) {
            (Some(&typed), Some(expected)) if typed == expected => CharStatus::Correct,
            (Some(&typed), _) => CharStatus::Incorrect(typed),
            (None, _) => CharStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::clock::ManualClock;

    fn session_with(text: &str) -> (Arc<ManualClock>, TypingSession) {
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).unwrap(),
        ));
        let mut session = TypingSession::new(clock.clone());
        session.assign_target(TargetText::new(text).unwrap(), LengthMode::Short);
        (clock, session)
    }

    fn type_str(session: &mut TypingSession, s: &str) -> Vec<KeyOutcome> {
        s.chars().map(|c| session.handle_key(Key::Char(c))).collect()
    }

    #[test]
    fn test_new_session_is_idle() {
        let clock = Arc::new(ManualClock::new(Local::now()));
        let mut session = TypingSession::new(clock);
        assert_eq!(session.state(), RoundState::Idle);
        assert_eq!(session.handle_key(Key::Char('a')), KeyOutcome::Ignored);
        session.reset();
        assert_eq!(session.state(), RoundState::Idle);
    }

    #[test]
    fn test_first_char_starts_clock() {
        let (clock, mut session) = session_with("abc");
        assert_eq!(session.state(), RoundState::Ready);
        clock.advance(TimeDelta::seconds(30));
        assert_eq!(session.elapsed_secs(), 0);

        session.handle_key(Key::Char('a'));
        assert_eq!(session.state(), RoundState::Active);
        clock.advance(TimeDelta::seconds(3));
        assert_eq!(session.elapsed_secs(), 3);

        // Backspacing to empty and typing again does not restart the clock.
        session.handle_key(Key::Backspace);
        session.handle_key(Key::Char('a'));
        clock.advance(TimeDelta::seconds(1));
        assert_eq!(session.elapsed_secs(), 4);
    }

    #[test]
    fn test_clean_round_scenario() {
        let (clock, mut session) = session_with("cat dog");
        session.handle_key(Key::Char('c'));
        clock.advance(TimeDelta::seconds(7));
        let outcomes = type_str(&mut session, "at dog");

        let Some(KeyOutcome::Completed(record)) = outcomes.last() else {
            panic!("expected completion, got {outcomes:?}");
        };
        assert_eq!(record.accuracy_percent, 100);
        assert_eq!(record.uncorrected_errors, 0);
        assert_eq!(record.gross_wpm, 12);
        assert_eq!(record.net_wpm, 12);
        assert_eq!(record.wpm, 12);
        assert_eq!(record.duration_seconds, 7);
        assert_eq!(record.keystrokes, 7);
        assert_eq!(record.mistakes, 0);
        assert_eq!(record.text_preview, "cat dog...");
        assert_eq!(record.mode, LengthMode::Short);
        assert_eq!(session.state(), RoundState::Completed);
    }

    #[test]
    fn test_mistake_scenario() {
        let (clock, mut session) = session_with("cats");
        session.handle_key(Key::Char('c'));
        clock.advance(TimeDelta::seconds(4));
        let outcomes = type_str(&mut session, "bts");

        assert_eq!(outcomes[0], KeyOutcome::Accepted { correct: false });
        let KeyOutcome::Completed(record) = &outcomes[2] else {
            panic!("expected completion");
        };
        assert_eq!(record.accuracy_percent, 75);
        assert_eq!(record.uncorrected_errors, 1);
        assert_eq!(record.gross_wpm, 12);
        assert_eq!(record.net_wpm, 0);
        assert_eq!(record.mistakes, 1);
        assert_eq!(record.backspaces, 0);
    }

    #[test]
    fn test_instant_completion_uses_one_second_floor() {
        let (_clock, mut session) = session_with("hi");
        let outcomes = type_str(&mut session, "hi");
        let KeyOutcome::Completed(record) = &outcomes[1] else {
            panic!("expected completion");
        };
        assert_eq!(record.duration_seconds, 1);
        assert_eq!(record.gross_wpm, 24);
    }

    #[test]
    fn test_reset_scenario() {
        let (clock, mut session) = session_with("abcdefghij");
        type_str(&mut session, "abx");
        clock.advance(TimeDelta::seconds(5));
        session.reset();

        assert_eq!(session.state(), RoundState::Ready);
        assert!(session.input().is_empty());
        assert_eq!(session.counters(), KeystrokeCounters::default());
        assert_eq!(session.elapsed_secs(), 0);
        assert!(session.record().is_none());
        assert_eq!(session.target().unwrap().as_str(), "abcdefghij");
    }

    #[test]
    fn test_backspace_on_empty_changes_nothing() {
        let (_clock, mut session) = session_with("abc");
        assert_eq!(session.handle_key(Key::Backspace), KeyOutcome::Ignored);
        assert_eq!(session.counters(), KeystrokeCounters::default());
        assert_eq!(session.state(), RoundState::Ready);
    }

    #[test]
    fn test_corrected_mistake_still_counts() {
        let (_clock, mut session) = session_with("abc");
        session.handle_key(Key::Char('x'));
        assert_eq!(session.handle_key(Key::Backspace), KeyOutcome::Erased);
        let outcomes = type_str(&mut session, "abc");
        let KeyOutcome::Completed(record) = &outcomes[2] else {
            panic!("expected completion");
        };
        assert_eq!(record.mistakes, 1);
        assert_eq!(record.backspaces, 1);
        assert_eq!(record.keystrokes, 4);
        assert_eq!(record.uncorrected_errors, 0);
        assert_eq!(record.accuracy_percent, 100);
    }

    #[test]
    fn test_non_character_keys_ignored() {
        let (_clock, mut session) = session_with("abc");
        assert_eq!(session.handle_key(Key::Other), KeyOutcome::Ignored);
        assert_eq!(session.handle_key(Key::Char('\t')), KeyOutcome::Ignored);
        assert_eq!(session.handle_key(Key::Char('\u{1b}')), KeyOutcome::Ignored);
        assert_eq!(session.counters(), KeystrokeCounters::default());
        assert_eq!(session.state(), RoundState::Ready);
    }

    #[test]
    fn test_disabled_session_ignores_input() {
        let (_clock, mut session) = session_with("abc");
        session.set_enabled(false);
        assert_eq!(session.handle_key(Key::Char('a')), KeyOutcome::Ignored);
        session.set_enabled(true);
        assert_eq!(
            session.handle_key(Key::Char('a')),
            KeyOutcome::Accepted { correct: true }
        );
    }

    #[test]
    fn test_completed_round_rejects_further_input() {
        let (_clock, mut session) = session_with("ab");
        type_str(&mut session, "ab");
        assert_eq!(session.handle_key(Key::Char('c')), KeyOutcome::Ignored);
        assert_eq!(session.handle_key(Key::Backspace), KeyOutcome::Ignored);
        assert_eq!(session.input().len(), 2);
        assert_eq!(session.counters().keystrokes, 2);
    }

    #[test]
    fn test_record_ids_differ_within_one_millisecond() {
        let (clock, mut first) = session_with("ab");
        let mut second = TypingSession::new(clock.clone());
        second.assign_target(TargetText::new("ab").unwrap(), LengthMode::Short);

        type_str(&mut first, "ab");
        type_str(&mut second, "ab");
        let a = first.record().unwrap().id.clone();
        let b = second.record().unwrap().id.clone();

        let millis = clock.now().timestamp_millis().to_string();
        assert!(a.starts_with(&millis) && b.starts_with(&millis));
        assert_eq!(a.len(), millis.len() + 5);
        assert_ne!(a, b);
    }

    #[test]
    fn test_char_status() {
        let (_clock, mut session) = session_with("abc");
        type_str(&mut session, "ax");
        assert_eq!(session.char_status(0), CharStatus::Correct);
        assert_eq!(session.char_status(1), CharStatus::Incorrect('x'));
        assert_eq!(session.char_status(2), CharStatus::Pending);
        assert!((session.progress() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_random_key_streams_respect_bounds() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let (clock, mut session) = session_with("the quick fox");
            let target_len = session.target().unwrap().len();
            let mut completions = 0;
            for _ in 0..60 {
                let key = match rng.gen_range(0..10) {
                    0..=2 => Key::Backspace,
                    3 => Key::Other,
                    _ => Key::Char(['t', 'h', 'e', ' ', 'q', 'z'][rng.gen_range(0..6)]),
                };
                clock.advance(TimeDelta::milliseconds(rng.gen_range(0..400)));
                let before = session.input().len();
                let outcome = session.handle_key(key);

                let len = session.input().len();
                assert!(len <= target_len);
                if let KeyOutcome::Completed(record) = outcome {
                    completions += 1;
                    assert_eq!(len, target_len);
                    assert!(record.accuracy_percent <= 100);
                    assert!(record.duration_seconds >= 1);
                } else {
                    assert_eq!(session.state() == RoundState::Completed, before == target_len);
                }
            }
            assert!(completions <= 1);
            assert_eq!(session.state() == RoundState::Completed, session.input().len() == target_len);
        }
    }
}
