use std::sync::Arc;

use crate::bus::EventBus;
use crate::clock::{Clock, day_id};
use crate::session::corpus::{LengthMode, PassageCorpus};
use crate::session::daily_target::DailyTarget;
use crate::session::history;
use crate::session::record::SessionRecord;
use crate::session::settings::{TYPING_NAMESPACE, TypingSettings};
use crate::session::stats::TypingStats;
use crate::session::target::SessionError;
use crate::session::typing::{Key, KeyOutcome, TypingSession};
use crate::store::daily_counter::DailyDecayingCounter;
use crate::store::kv::KvStore;
use crate::store::schema::SessionLogEntry;
use crate::store::session_log::SessionLog;
use crate::store::settings::SettingsService;

pub const MOMENTUM_NAMESPACE: &str = "user_learning";

/// Wires the typing engine to everything that consumes its records: the
/// day-bucketed log, lifetime aggregates, the daily quota and the momentum
/// counter.
pub struct Practice {
    session: TypingSession,
    corpus: PassageCorpus,
    mode: LengthMode,
    kv: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    log: SessionLog<SessionRecord>,
    settings: SettingsService<TypingSettings>,
    momentum: DailyDecayingCounter,
    stats: TypingStats,
    daily: DailyTarget,
}

impl Practice {
    pub fn new(
        kv: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        bus: EventBus,
        corpus: PassageCorpus,
        mode: LengthMode,
    ) -> Self {
        let settings: SettingsService<TypingSettings> =
            SettingsService::new(TYPING_NAMESPACE, kv.clone(), bus.clone());
        let mut prefs = settings.read();
        prefs.normalize();

        let log = SessionLog::new(TYPING_NAMESPACE, kv.clone(), clock.clone(), bus.clone());
        let momentum = DailyDecayingCounter::new(MOMENTUM_NAMESPACE, kv.clone(), clock.clone(), bus);
        momentum.tick();

        let stats = TypingStats::load(kv.as_ref());
        let daily = DailyTarget::load(kv.as_ref(), clock.today(), prefs.sessions_per_day);

        Self {
            session: TypingSession::new(clock.clone()),
            corpus,
            mode,
            kv,
            clock,
            log,
            settings,
            momentum,
            stats,
            daily,
        }
    }

    pub fn session(&self) -> &TypingSession {
        &self.session
    }

    pub fn mode(&self) -> LengthMode {
        self.mode
    }

    pub fn stats(&self) -> &TypingStats {
        &self.stats
    }

    pub fn daily_target(&self) -> &DailyTarget {
        &self.daily
    }

    pub fn momentum(&self) -> u32 {
        self.momentum.get()
    }

    pub fn today(&self) -> Vec<SessionLogEntry<SessionRecord>> {
        self.log.read_today()
    }

    pub fn settings(&self) -> TypingSettings {
        let mut prefs = self.settings.read();
        prefs.normalize();
        prefs
    }

    pub fn update_settings(&mut self, patch: impl FnOnce(&mut TypingSettings)) -> TypingSettings {
        let mut prefs = self.settings.update(patch);
        prefs.normalize();
        prefs
    }

    /// Begin a round with freshly generated text.
    pub fn start(&mut self) -> Result<(), SessionError> {
        let target = self.corpus.generate(self.mode)?;
        self.session.assign_target(target, self.mode);
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), SessionError> {
        self.start()
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Switching length discards the current round.
    pub fn set_mode(&mut self, mode: LengthMode) -> Result<(), SessionError> {
        self.mode = mode;
        self.start()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.session.set_enabled(focused);
    }

    pub fn set_daily_target(&mut self, target: u32) -> bool {
        let changed = self.daily.set_target(target, self.clock.today());
        if changed {
            self.daily.save(self.kv.as_ref());
        }
        changed
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let outcome = self.session.handle_key(key);
        if let KeyOutcome::Completed(record) = &outcome {
            self.on_completed(record);
        }
        outcome
    }

    fn on_completed(&mut self, record: &SessionRecord) {
        let today = self.clock.today();
        let words = self.session.target().map(|t| t.word_count()).unwrap_or(0);

        self.log.append(record.clone());
        history::push_recent(self.kv.as_ref(), record);

        self.stats.record(record, words, today);
        self.stats.save(self.kv.as_ref());

        let was_met = self.daily.date == day_id(today) && self.daily.is_met();
        self.daily.record_completion(today);
        self.daily.save(self.kv.as_ref());

        if !was_met && self.daily.is_met() {
            self.momentum.set(self.momentum.tick() as i64 + 1);
        }
    }
}
