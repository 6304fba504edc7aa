use std::sync::Arc;
use std::sync::mpsc;

use shine::bus::{EventBus, StoreEvent};
use shine::clock::Clock;
use shine::config::Config;
use shine::session::SessionError;
use shine::session::corpus::{LengthMode, PassageCorpus};
use shine::session::practice::Practice;
use shine::session::record::SessionRecord;
use shine::session::settings::{SESSION_DURATIONS, TYPING_NAMESPACE, TypingSettings};
use shine::session::typing::{Key, KeyOutcome, RoundState};
use shine::store::KvStore;
use shine::store::schema::SessionLogEntry;

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Typing,
    Result,
    Today,
    Settings,
}

pub const SETTINGS_FIELDS: usize = 3;

pub struct App {
    pub screen: AppScreen,
    pub practice: Practice,
    pub theme: &'static Theme,
    pub today: Vec<SessionLogEntry<SessionRecord>>,
    pub last_record: Option<SessionRecord>,
    pub settings_draft: TypingSettings,
    pub settings_selected: usize,
    pub status: Option<String>,
    pub should_quit: bool,
    store_events: mpsc::Receiver<StoreEvent>,
}

impl App {
    pub fn new(
        config: Config,
        theme: &'static Theme,
        kv: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        corpus: PassageCorpus,
    ) -> Result<Self, SessionError> {
        let bus = EventBus::new();
        let store_events = bus.subscribe();
        let mut practice = Practice::new(kv, clock, bus, corpus, config.default_mode);
        practice.start()?;

        let today = practice.today();
        let settings_draft = practice.settings();

        Ok(Self {
            screen: AppScreen::Typing,
            practice,
            theme,
            today,
            last_record: None,
            settings_draft,
            settings_selected: 0,
            status: None,
            should_quit: false,
            store_events,
        })
    }

    pub fn type_key(&mut self, key: Key) {
        if self.screen != AppScreen::Typing {
            return;
        }
        if let KeyOutcome::Completed(record) = self.practice.handle_key(key) {
            self.last_record = Some(record);
            self.screen = AppScreen::Result;
        }
        self.drain_store_events();
    }

    pub fn reset_round(&mut self) {
        self.practice.reset();
        self.status = None;
    }

    pub fn next_round(&mut self) {
        self.run(Practice::next);
        self.screen = AppScreen::Typing;
    }

    pub fn set_mode(&mut self, mode: LengthMode) {
        if mode == self.practice.mode() && self.practice.session().state() == RoundState::Ready {
            return;
        }
        self.run(|p| p.set_mode(mode));
        self.screen = AppScreen::Typing;
    }

    fn run(&mut self, op: impl FnOnce(&mut Practice) -> Result<(), SessionError>) {
        match op(&mut self.practice) {
            Ok(()) => self.status = None,
            Err(e) => {
                tracing::warn!(error = %e, "could not start round");
                self.status = Some(e.to_string());
            }
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.practice.set_focused(focused);
    }

    /// Pick up log changes published by the store.
    pub fn drain_store_events(&mut self) {
        let mut refresh = false;
        while let Ok(event) = self.store_events.try_recv() {
            if let StoreEvent::SessionLogUpdated { namespace } = &event {
                refresh |= namespace == TYPING_NAMESPACE;
            }
        }
        if refresh {
            self.today = self.practice.today();
        }
    }

    pub fn go_to_typing(&mut self) {
        if self.practice.session().state() == RoundState::Completed {
            self.next_round();
        } else {
            self.screen = AppScreen::Typing;
        }
    }

    pub fn go_to_today(&mut self) {
        self.today = self.practice.today();
        self.screen = AppScreen::Today;
    }

    pub fn go_to_settings(&mut self) {
        self.settings_draft = self.practice.settings();
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    pub fn settings_cycle_forward(&mut self) {
        self.settings_step(true);
    }

    pub fn settings_cycle_backward(&mut self) {
        self.settings_step(false);
    }

    fn settings_step(&mut self, forward: bool) {
        let draft = &mut self.settings_draft;
        match self.settings_selected {
            0 => {
                draft.sessions_per_day = if forward {
                    (draft.sessions_per_day + 1).min(50)
                } else {
                    draft.sessions_per_day.saturating_sub(1).max(1)
                };
            }
            1 => {
                draft.target_wpm = if forward {
                    (draft.target_wpm + 5).min(250)
                } else {
                    draft.target_wpm.saturating_sub(5).max(10)
                };
            }
            2 => {
                let idx = SESSION_DURATIONS
                    .iter()
                    .position(|d| *d == draft.session_duration_min)
                    .unwrap_or(1);
                let len = SESSION_DURATIONS.len();
                let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
                draft.session_duration_min = SESSION_DURATIONS[next];
            }
            _ => {}
        }
    }

    pub fn save_settings(&mut self) {
        let draft = self.settings_draft.clone();
        let saved = self.practice.update_settings(|s| *s = draft);
        self.practice.set_daily_target(saved.sessions_per_day);
        self.settings_draft = saved;
        self.drain_store_events();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeDelta, TimeZone};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use shine::clock::ManualClock;
    use shine::store::MemoryKvStore;

    fn test_app() -> (App, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap(),
        ));
        let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let corpus = PassageCorpus::with_passages(vec!["calm".to_string()], SmallRng::seed_from_u64(7));
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let config = Config {
            default_mode: LengthMode::Short,
            ..Config::default()
        };
        let app = App::new(config, theme, kv, clock.clone(), corpus).unwrap();
        (app, clock)
    }

    fn type_round(app: &mut App, clock: &ManualClock) {
        let text: Vec<char> = app.practice.session().target().unwrap().chars().to_vec();
        for ch in text {
            clock.advance(TimeDelta::milliseconds(200));
            app.type_key(Key::Char(ch));
        }
    }

    #[test]
    fn test_completed_round_shows_result_and_refreshes_today() {
        let (mut app, clock) = test_app();
        assert!(app.today.is_empty());

        type_round(&mut app, &clock);

        assert_eq!(app.screen, AppScreen::Result);
        let record = app.last_record.as_ref().unwrap();
        assert_eq!(record.accuracy_percent, 100);
        assert_eq!(app.today.len(), 1);
        assert_eq!(app.today[0].index, 1);
    }

    #[test]
    fn test_keys_ignored_off_typing_screen() {
        let (mut app, _clock) = test_app();
        app.go_to_today();
        app.type_key(Key::Char('c'));
        assert!(app.practice.session().input().is_empty());
    }

    #[test]
    fn test_next_round_returns_to_typing() {
        let (mut app, clock) = test_app();
        type_round(&mut app, &clock);
        app.next_round();
        assert_eq!(app.screen, AppScreen::Typing);
        assert_eq!(app.practice.session().state(), RoundState::Ready);
    }

    #[test]
    fn test_settings_cycle_and_save() {
        let (mut app, _clock) = test_app();
        app.go_to_settings();
        app.settings_cycle_forward();
        app.settings_selected = 2;
        app.settings_cycle_forward();
        app.save_settings();

        let prefs = app.practice.settings();
        assert_eq!(prefs.sessions_per_day, 4);
        assert_eq!(prefs.session_duration_min, 30);
        assert_eq!(app.practice.daily_target().target, 4);
    }

    #[test]
    fn test_settings_lower_bounds() {
        let (mut app, _clock) = test_app();
        app.go_to_settings();
        for _ in 0..10 {
            app.settings_cycle_backward();
        }
        assert_eq!(app.settings_draft.sessions_per_day, 1);
        app.settings_selected = 2;
        app.settings_cycle_backward();
        assert_eq!(app.settings_draft.session_duration_min, 5);
    }

    #[test]
    fn test_focus_loss_pauses_input() {
        let (mut app, _clock) = test_app();
        app.set_focused(false);
        app.type_key(Key::Char('c'));
        assert!(app.practice.session().input().is_empty());
        app.set_focused(true);
        app.type_key(Key::Char('c'));
        assert_eq!(app.practice.session().input(), &['c']);
    }
}
