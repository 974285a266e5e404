//! Breath session state machine.
//!
//! [`BreathMachine`] owns every piece of session state. Each operation
//! takes a [`ClockReading`] and returns the [`Effect`]s the host must carry
//! out (start or stop the frame loop, persist the finished session) along
//! with notifications the presentation layer may react to. The machine never
//! reads a clock, draws anything, or touches storage itself.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::clock::{ClockReading, MonoTime};
use super::record::{BreathingRecord, CycleRecord, HoldRecord, SessionRecord};
use super::settings::BreathSettings;
use crate::error::BreathError;

/// Machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathState {
    /// No session running
    Idle,
    /// Paced inhale/exhale breathing
    BreathingActive,
    /// Holding after the final exhale of a cycle
    ExhaleHoldActive,
    /// Holding after the recovery inhale
    InhaleHoldActive,
    /// Session paused from one of the active states
    Paused,
    /// Session finished or ended early
    SessionComplete,
}

impl BreathState {
    /// Whether the frame loop should run in this state.
    #[must_use]
    pub const fn is_ticking(&self) -> bool {
        matches!(
            self,
            Self::BreathingActive | Self::ExhaleHoldActive | Self::InhaleHoldActive
        )
    }

    /// Whether a session is in progress (ticking or paused).
    #[must_use]
    pub const fn is_in_session(&self) -> bool {
        self.is_ticking() || matches!(self, Self::Paused)
    }

    /// Whether this is one of the two hold states.
    #[must_use]
    pub const fn is_hold(&self) -> bool {
        matches!(self, Self::ExhaleHoldActive | Self::InhaleHoldActive)
    }

    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::BreathingActive => "breathing_active",
            Self::ExhaleHoldActive => "exhale_hold_active",
            Self::InhaleHoldActive => "inhale_hold_active",
            Self::Paused => "paused",
            Self::SessionComplete => "session_complete",
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::BreathingActive => "Breathing",
            Self::ExhaleHoldActive => "Exhale Hold",
            Self::InhaleHoldActive => "Inhale Hold",
            Self::Paused => "Paused",
            Self::SessionComplete => "Complete",
        }
    }
}

impl std::fmt::Display for BreathState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Breathing phase within paced breathing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Breathing in
    Inhale,
    /// Breathing out
    Exhale,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inhale => write!(f, "Inhale"),
            Self::Exhale => write!(f, "Exhale"),
        }
    }
}

/// User or host signal other than `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// End the current hold
    Advance,
    /// End the session now, keeping completed cycles
    EndSession,
    /// The host lost visibility (backgrounded, focus lost)
    VisibilityLost,
}

/// Result of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The machine moved between states.
    StateChanged {
        /// Previous state
        from: BreathState,
        /// New state
        to: BreathState,
    },
    /// Paced breathing switched phase.
    PhaseChanged(Phase),
    /// A full inhale/exhale pair finished.
    BreathCompleted {
        /// Breaths taken so far in this cycle
        count: u32,
    },
    /// A cycle finished and was appended to the session.
    CycleCompleted(CycleRecord),
    /// The host must start delivering frames.
    AcquireTicks,
    /// The host must stop delivering frames.
    ReleaseTicks,
    /// The host must hand this record to the session store.
    Persist(SessionRecord),
}

/// Read-only view of the machine for presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// Current state
    pub state: BreathState,
    /// Current phase flag
    pub phase: Phase,
    /// Progress through the current phase, 0.0 to 1.0
    pub phase_progress: f64,
    /// Length of the hold in progress
    pub current_hold: Duration,
    /// Longest exhale hold this session
    pub best_exhale_hold: Duration,
    /// Longest inhale hold this session
    pub best_inhale_hold: Duration,
    /// 1-based cycle in progress
    pub current_cycle: u32,
    /// Cycles the session aims for
    pub cycles_target: u32,
    /// Breaths taken in this cycle
    pub breath_count: u32,
    /// Breaths per cycle
    pub breaths_per_cycle: u32,
    /// Cycles appended so far
    pub cycles_completed: u32,
}

impl Snapshot {
    const IDLE: Self = Self {
        state: BreathState::Idle,
        phase: Phase::Inhale,
        phase_progress: 0.0,
        current_hold: Duration::ZERO,
        best_exhale_hold: Duration::ZERO,
        best_inhale_hold: Duration::ZERO,
        current_cycle: 0,
        cycles_target: 0,
        breath_count: 0,
        breaths_per_cycle: 0,
        cycles_completed: 0,
    };

    /// Fraction of the cycle's breaths already taken.
    #[must_use]
    pub fn cycle_progress(&self) -> f64 {
        if self.breaths_per_cycle == 0 {
            return 0.0;
        }
        (f64::from(self.breath_count) / f64::from(self.breaths_per_cycle)).min(1.0)
    }
}

/// A timestamp on both clocks.
#[derive(Debug, Clone, Copy)]
struct Mark {
    mono: MonoTime,
    wall: DateTime<Utc>,
}

impl From<ClockReading> for Mark {
    fn from(reading: ClockReading) -> Self {
        Self {
            mono: reading.mono,
            wall: reading.wall,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PauseMark {
    at: MonoTime,
    resume_to: BreathState,
}

#[derive(Debug, Clone)]
struct Session {
    id: String,
    settings: BreathSettings,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    cycles: Vec<CycleRecord>,
    current_cycle: u32,
    breath_count: u32,
    phase: Phase,
    phase_start: MonoTime,
    cycle_breathing_start: Mark,
    exhale_hold_start: Option<Mark>,
    inhale_hold_start: Option<Mark>,
    exhale_hold: Duration,
    best_exhale_hold: Duration,
    best_inhale_hold: Duration,
    pause: Option<PauseMark>,
    observed: MonoTime,
}

impl Session {
    fn new(settings: BreathSettings, at: ClockReading) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            settings,
            started_at: at.wall,
            ended_at: None,
            cycles: Vec::new(),
            current_cycle: 1,
            breath_count: 0,
            phase: Phase::Inhale,
            phase_start: at.mono,
            cycle_breathing_start: at.into(),
            exhale_hold_start: None,
            inhale_hold_start: None,
            exhale_hold: Duration::ZERO,
            best_exhale_hold: Duration::ZERO,
            best_inhale_hold: Duration::ZERO,
            pause: None,
            observed: at.mono,
        }
    }

    fn phase_duration(&self) -> Duration {
        let ms = match self.phase {
            Phase::Inhale => self.settings.inhale_ms(),
            Phase::Exhale => self.settings.exhale_ms(),
        };
        Duration::from_millis(u64::from(ms))
    }

    fn observe(&mut self, at: MonoTime) {
        self.observed = self.observed.max(at);
    }

    /// Instant that elapsed-time readouts are measured against.
    fn reference(&self) -> MonoTime {
        self.pause.map_or(self.observed, |p| p.at)
    }

    fn shift_starts(&mut self, by: Duration) {
        self.phase_start = self.phase_start.shifted(by);
        self.cycle_breathing_start.mono = self.cycle_breathing_start.mono.shifted(by);
        if let Some(mark) = self.exhale_hold_start.as_mut() {
            mark.mono = mark.mono.shifted(by);
        }
        if let Some(mark) = self.inhale_hold_start.as_mut() {
            mark.mono = mark.mono.shifted(by);
        }
    }

    fn cycles_completed(&self) -> u32 {
        u32::try_from(self.cycles.len()).unwrap_or(u32::MAX)
    }

    fn to_record(&self, ended_at: DateTime<Utc>) -> SessionRecord {
        SessionRecord {
            session_id: self.id.clone(),
            started_at: self.started_at,
            ended_at,
            settings: self.settings,
            cycles: self.cycles.clone(),
            cycles_completed: self.cycles_completed(),
        }
    }
}

/// The breath session state machine.
#[derive(Debug, Clone)]
pub struct BreathMachine {
    state: BreathState,
    session: Option<Session>,
}

impl Default for BreathMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathMachine {
    /// Create an idle machine.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: BreathState::Idle,
            session: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> BreathState {
        self.state
    }

    /// Identifier of the current or most recent session.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id.as_str())
    }

    /// Settings of the current or most recent session.
    #[must_use]
    pub fn settings(&self) -> Option<&BreathSettings> {
        self.session.as_ref().map(|s| &s.settings)
    }

    /// Cycles completed in the current or most recent session.
    #[must_use]
    pub fn cycles(&self) -> &[CycleRecord] {
        self.session.as_ref().map_or(&[], |s| s.cycles.as_slice())
    }

    /// Record of the finished session, once the machine is complete.
    #[must_use]
    pub fn finished_record(&self) -> Option<SessionRecord> {
        if self.state != BreathState::SessionComplete {
            return None;
        }
        let session = self.session.as_ref()?;
        session.ended_at.map(|ended_at| session.to_record(ended_at))
    }

    /// Start a new session.
    ///
    /// Accepted from `idle` and `session_complete`; ignored elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `BreathError::InvalidSettings` if any duration or count is
    /// zero. The machine keeps its previous state.
    pub fn start(
        &mut self,
        settings: BreathSettings,
        at: ClockReading,
    ) -> Result<Vec<Effect>, BreathError> {
        if !matches!(self.state, BreathState::Idle | BreathState::SessionComplete) {
            debug!(state = %self.state, "start ignored");
            return Ok(Vec::new());
        }

        if let Err(e) = settings.validate() {
            warn!(error = %e, "session settings rejected");
            return Err(e);
        }

        let session = Session::new(settings, at);
        info!(
            session_id = %session.id,
            breaths_per_cycle = settings.breaths_per_cycle,
            cycles_target = settings.cycles_target,
            "session started"
        );
        self.session = Some(session);

        let mut effects = self.enter(BreathState::BreathingActive);
        effects.push(Effect::AcquireTicks);
        Ok(effects)
    }

    /// Return a finished machine to `idle`, discarding the old session.
    pub fn reset(&mut self) -> Vec<Effect> {
        if self.state != BreathState::SessionComplete {
            debug!(state = %self.state, "reset ignored");
            return Vec::new();
        }
        self.session = None;
        self.enter(BreathState::Idle)
    }

    /// Apply a user or host signal.
    ///
    /// Signals that make no sense in the current state are ignored.
    pub fn handle(&mut self, signal: Signal, at: ClockReading) -> Vec<Effect> {
        if let Some(session) = self.session.as_mut() {
            if self.state.is_ticking() {
                session.observe(at.mono);
            }
        }

        match (signal, self.state) {
            (Signal::Pause | Signal::VisibilityLost, state) if state.is_ticking() => {
                self.pause(at)
            }
            (Signal::Resume, BreathState::Paused) => self.resume(at),
            (Signal::Advance, BreathState::ExhaleHoldActive) => self.end_exhale_hold(at),
            (Signal::Advance, BreathState::InhaleHoldActive) => self.end_inhale_hold(at),
            (Signal::EndSession, state) if state.is_in_session() => {
                info!("session ended early");
                self.complete(at)
            }
            (signal, state) => {
                debug!(?signal, %state, "signal ignored");
                Vec::new()
            }
        }
    }

    /// Advance timing for one frame.
    ///
    /// Does nothing unless the machine is in a ticking state.
    pub fn tick(&mut self, at: ClockReading) -> Vec<Effect> {
        if !self.state.is_ticking() {
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.observe(at.mono);

        if self.state != BreathState::BreathingActive {
            // Hold readouts are derived from the observed instant.
            return Vec::new();
        }

        let elapsed = at.mono.saturating_since(session.phase_start);
        if elapsed < session.phase_duration() {
            return Vec::new();
        }

        session.phase_start = at.mono;
        match session.phase {
            Phase::Inhale => {
                session.phase = Phase::Exhale;
                vec![Effect::PhaseChanged(Phase::Exhale)]
            }
            Phase::Exhale => {
                session.breath_count += 1;
                session.phase = Phase::Inhale;
                let count = session.breath_count;
                let mut effects = vec![Effect::BreathCompleted { count }];

                if count >= session.settings.breaths_per_cycle {
                    session.exhale_hold_start = Some(at.into());
                    effects.extend(self.enter(BreathState::ExhaleHoldActive));
                } else {
                    effects.push(Effect::PhaseChanged(Phase::Inhale));
                }
                effects
            }
        }
    }

    /// Presentation snapshot as of the latest tick or signal.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let Some(session) = self.session.as_ref() else {
            return Snapshot::IDLE;
        };

        let reference = session.reference();
        let hold_state = match self.state {
            BreathState::Paused => session.pause.map(|p| p.resume_to),
            state => Some(state),
        };

        let phase_progress = if hold_state == Some(BreathState::BreathingActive) {
            let elapsed = reference.saturating_since(session.phase_start);
            let total = session.phase_duration();
            if total.is_zero() {
                0.0
            } else {
                (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
            }
        } else {
            0.0
        };

        let hold_start = match hold_state {
            Some(BreathState::ExhaleHoldActive) => session.exhale_hold_start,
            Some(BreathState::InhaleHoldActive) => session.inhale_hold_start,
            _ => None,
        };
        let current_hold =
            hold_start.map_or(Duration::ZERO, |mark| reference.saturating_since(mark.mono));

        Snapshot {
            state: self.state,
            phase: session.phase,
            phase_progress,
            current_hold,
            best_exhale_hold: session.best_exhale_hold,
            best_inhale_hold: session.best_inhale_hold,
            current_cycle: session.current_cycle,
            cycles_target: session.settings.cycles_target,
            breath_count: session.breath_count,
            breaths_per_cycle: session.settings.breaths_per_cycle,
            cycles_completed: session.cycles_completed(),
        }
    }

    fn enter(&mut self, to: BreathState) -> Vec<Effect> {
        let from = self.state;
        self.state = to;
        vec![Effect::StateChanged { from, to }]
    }

    fn pause(&mut self, at: ClockReading) -> Vec<Effect> {
        let resume_to = self.state;
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.pause = Some(PauseMark {
            at: at.mono,
            resume_to,
        });
        debug!(from = %resume_to, "session paused");

        let mut effects = self.enter(BreathState::Paused);
        effects.push(Effect::ReleaseTicks);
        effects
    }

    fn resume(&mut self, at: ClockReading) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let Some(pause) = session.pause.take() else {
            return Vec::new();
        };

        let paused_for = at.mono.saturating_since(pause.at);
        session.shift_starts(paused_for);
        session.observe(at.mono);
        debug!(paused_ms = paused_for.as_millis(), to = %pause.resume_to, "session resumed");

        let mut effects = self.enter(pause.resume_to);
        effects.push(Effect::AcquireTicks);
        effects
    }

    fn end_exhale_hold(&mut self, at: ClockReading) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let Some(start) = session.exhale_hold_start else {
            return Vec::new();
        };

        let held = at.mono.saturating_since(start.mono);
        session.exhale_hold = held;
        session.best_exhale_hold = session.best_exhale_hold.max(held);
        session.inhale_hold_start = Some(at.into());

        self.enter(BreathState::InhaleHoldActive)
    }

    fn end_inhale_hold(&mut self, at: ClockReading) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let (Some(exhale_start), Some(inhale_start)) =
            (session.exhale_hold_start, session.inhale_hold_start)
        else {
            return Vec::new();
        };

        let inhale_held = at.mono.saturating_since(inhale_start.mono);
        session.best_inhale_hold = session.best_inhale_hold.max(inhale_held);

        let breathing_time = exhale_start
            .mono
            .saturating_since(session.cycle_breathing_start.mono);
        let record = CycleRecord {
            cycle_index: session.current_cycle,
            breathing: BreathingRecord {
                target_breaths: session.settings.breaths_per_cycle,
                actual_breaths: session.breath_count,
                start_at: session.cycle_breathing_start.wall,
                end_at: exhale_start.wall,
                actual_duration_ms: millis(breathing_time),
            },
            exhale_hold: HoldRecord {
                start_at: exhale_start.wall,
                duration_ms: millis(session.exhale_hold),
            },
            inhale_hold: HoldRecord {
                start_at: inhale_start.wall,
                duration_ms: millis(inhale_held),
            },
        };
        info!(
            cycle = record.cycle_index,
            exhale_hold_ms = record.exhale_hold.duration_ms,
            inhale_hold_ms = record.inhale_hold.duration_ms,
            "cycle completed"
        );
        session.cycles.push(record.clone());

        let mut effects = vec![Effect::CycleCompleted(record)];

        if session.current_cycle < session.settings.cycles_target {
            session.current_cycle += 1;
            session.breath_count = 0;
            session.phase = Phase::Inhale;
            session.phase_start = at.mono;
            session.cycle_breathing_start = at.into();
            session.exhale_hold_start = None;
            session.inhale_hold_start = None;
            session.exhale_hold = Duration::ZERO;
            effects.extend(self.enter(BreathState::BreathingActive));
        } else {
            effects.extend(self.complete(at));
        }
        effects
    }

    fn complete(&mut self, at: ClockReading) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.pause = None;
        session.ended_at = Some(at.wall);
        let record = session.to_record(at.wall);
        info!(
            session_id = %record.session_id,
            cycles_completed = record.cycles_completed,
            cycles_target = record.settings.cycles_target,
            "session complete"
        );

        let mut effects = self.enter(BreathState::SessionComplete);
        effects.push(Effect::ReleaseTicks);
        effects.push(Effect::Persist(record));
        effects
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::breath::clock::{Clock, ManualClock};
    use crate::breath::settings::Pace;

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap())
    }

    fn settings(inhale: u32, exhale: u32, breaths: u32, cycles: u32) -> BreathSettings {
        BreathSettings {
            pace: Pace::custom(inhale, exhale),
            breaths_per_cycle: breaths,
            cycles_target: cycles,
            motion_reduced: false,
        }
    }

    fn started(clock: &ManualClock, s: BreathSettings) -> BreathMachine {
        let mut machine = BreathMachine::new();
        machine.start(s, clock.now()).unwrap();
        machine
    }

    /// Advance and tick once, returning the effects.
    fn step(machine: &mut BreathMachine, clock: &ManualClock, ms: u64) -> Vec<Effect> {
        clock.advance_ms(ms);
        machine.tick(clock.now())
    }

    fn persisted(effects: &[Effect]) -> Option<&SessionRecord> {
        effects.iter().find_map(|e| match e {
            Effect::Persist(record) => Some(record),
            _ => None,
        })
    }

    /// Run paced breathing for a whole cycle, ticking exactly on boundaries.
    fn breathe_cycle(machine: &mut BreathMachine, clock: &ManualClock, s: &BreathSettings) {
        for _ in 0..s.breaths_per_cycle {
            step(machine, clock, u64::from(s.inhale_ms()));
            step(machine, clock, u64::from(s.exhale_ms()));
        }
    }

    #[test]
    fn test_start_from_idle() {
        let clock = clock();
        let mut machine = BreathMachine::new();
        let effects = machine.start(settings(4000, 4000, 2, 1), clock.now()).unwrap();

        assert_eq!(machine.state(), BreathState::BreathingActive);
        assert!(effects.contains(&Effect::AcquireTicks));
        assert!(machine.session_id().is_some());

        let snap = machine.snapshot();
        assert_eq!(snap.current_cycle, 1);
        assert_eq!(snap.breath_count, 0);
        assert_eq!(snap.phase, Phase::Inhale);
    }

    #[test]
    fn test_start_rejects_invalid_settings() {
        let clock = clock();
        let mut machine = BreathMachine::new();

        let result = machine.start(settings(0, 4000, 2, 1), clock.now());
        assert!(matches!(result, Err(BreathError::InvalidSettings(_))));
        assert_eq!(machine.state(), BreathState::Idle);
        assert!(machine.session_id().is_none());

        let result = machine.start(settings(4000, 4000, 2, 0), clock.now());
        assert!(result.is_err());
        assert_eq!(machine.state(), BreathState::Idle);
    }

    #[test]
    fn test_start_ignored_while_active() {
        let clock = clock();
        let mut machine = started(&clock, settings(1000, 1000, 3, 1));
        let id = machine.session_id().map(str::to_string);

        let effects = machine.start(settings(2000, 2000, 5, 2), clock.now()).unwrap();
        assert!(effects.is_empty());
        assert_eq!(machine.session_id().map(str::to_string), id);
        assert_eq!(machine.snapshot().breaths_per_cycle, 3);
    }

    #[test]
    fn test_reference_scenario() {
        let clock = clock();
        let mut machine = started(&clock, settings(4000, 4000, 2, 1));

        // Just short of the boundary nothing happens.
        assert!(step(&mut machine, &clock, 3999).is_empty());

        let effects = step(&mut machine, &clock, 1);
        assert_eq!(effects, vec![Effect::PhaseChanged(Phase::Exhale)]);
        assert_eq!(machine.snapshot().phase, Phase::Exhale);

        step(&mut machine, &clock, 4000);
        let snap = machine.snapshot();
        assert_eq!(snap.breath_count, 1);
        assert_eq!(snap.phase, Phase::Inhale);

        step(&mut machine, &clock, 4000);
        assert_eq!(machine.snapshot().phase, Phase::Exhale);

        step(&mut machine, &clock, 4000);
        assert_eq!(machine.state(), BreathState::ExhaleHoldActive);
        assert_eq!(machine.snapshot().breath_count, 2);
        assert_eq!(machine.snapshot().current_hold, Duration::ZERO);

        clock.advance_ms(30_000);
        machine.tick(clock.now());
        assert_eq!(machine.snapshot().current_hold, Duration::from_secs(30));

        machine.handle(Signal::Advance, clock.now());
        assert_eq!(machine.state(), BreathState::InhaleHoldActive);
        assert_eq!(machine.snapshot().current_hold, Duration::ZERO);
        assert_eq!(machine.snapshot().best_exhale_hold, Duration::from_secs(30));

        clock.advance_ms(15_000);
        let effects = machine.handle(Signal::Advance, clock.now());
        assert_eq!(machine.state(), BreathState::SessionComplete);

        let cycles: Vec<_> = effects
            .iter()
            .filter(|e| matches!(e, Effect::CycleCompleted(_)))
            .collect();
        assert_eq!(cycles.len(), 1);
        assert!(effects.contains(&Effect::ReleaseTicks));

        let record = persisted(&effects).unwrap();
        assert_eq!(record.cycles_completed, 1);
        let cycle = &record.cycles[0];
        assert_eq!(cycle.cycle_index, 1);
        assert_eq!(cycle.breathing.actual_breaths, 2);
        assert_eq!(cycle.breathing.target_breaths, 2);
        assert_eq!(cycle.breathing.actual_duration_ms, 16_000);
        assert_eq!(cycle.exhale_hold.duration_ms, 30_000);
        assert_eq!(cycle.inhale_hold.duration_ms, 15_000);
        assert_eq!(
            cycle.exhale_hold.start_at,
            record.started_at + chrono::Duration::seconds(16)
        );
    }

    #[test]
    fn test_breath_count_reaches_target_before_hold() {
        let clock = clock();
        let s = settings(1000, 1500, 5, 1);
        let mut machine = started(&clock, s);

        for expected in 1..=5 {
            assert_eq!(machine.state(), BreathState::BreathingActive);
            step(&mut machine, &clock, 1000);
            step(&mut machine, &clock, 1500);
            assert_eq!(machine.snapshot().breath_count, expected);
        }
        assert_eq!(machine.state(), BreathState::ExhaleHoldActive);
    }

    #[test]
    fn test_one_transition_per_tick() {
        let clock = clock();
        let mut machine = started(&clock, settings(1000, 1000, 3, 1));

        // A long stall still only flips the phase once; the new phase starts at `now`.
        let effects = step(&mut machine, &clock, 10_000);
        assert_eq!(effects, vec![Effect::PhaseChanged(Phase::Exhale)]);
        assert!(step(&mut machine, &clock, 999).is_empty());
        assert_eq!(machine.snapshot().breath_count, 0);
    }

    #[test]
    fn test_multi_cycle_session() {
        let clock = clock();
        let s = settings(500, 500, 2, 3);
        let mut machine = started(&clock, s);
        let mut all_effects = Vec::new();

        for cycle in 1..=3u32 {
            assert_eq!(machine.snapshot().current_cycle, cycle);
            breathe_cycle(&mut machine, &clock, &s);
            assert_eq!(machine.state(), BreathState::ExhaleHoldActive);
            clock.advance_ms(u64::from(cycle) * 10_000);
            all_effects.extend(machine.handle(Signal::Advance, clock.now()));
            clock.advance_ms(5_000);
            all_effects.extend(machine.handle(Signal::Advance, clock.now()));
            assert!(machine.snapshot().current_cycle <= s.cycles_target);
            if cycle < 3 {
                assert_eq!(machine.state(), BreathState::BreathingActive);
                assert_eq!(machine.snapshot().breath_count, 0);
            }
        }

        assert_eq!(machine.state(), BreathState::SessionComplete);
        let record = persisted(&all_effects).unwrap();
        assert_eq!(record.cycles_completed, 3);
        let indexes: Vec<_> = record.cycles.iter().map(|c| c.cycle_index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
        assert_eq!(record.cycles[2].exhale_hold.duration_ms, 30_000);
        assert_eq!(machine.finished_record().as_ref(), Some(record));
    }

    #[test]
    fn test_invalid_signals_are_ignored() {
        let clock = clock();
        let mut machine = BreathMachine::new();

        assert!(machine.handle(Signal::Advance, clock.now()).is_empty());
        assert!(machine.handle(Signal::Pause, clock.now()).is_empty());
        assert!(machine.handle(Signal::Resume, clock.now()).is_empty());
        assert!(machine.handle(Signal::EndSession, clock.now()).is_empty());
        assert_eq!(machine.state(), BreathState::Idle);

        machine.start(settings(1000, 1000, 2, 1), clock.now()).unwrap();
        assert!(machine.handle(Signal::Advance, clock.now()).is_empty());
        assert!(machine.handle(Signal::Resume, clock.now()).is_empty());
        assert_eq!(machine.state(), BreathState::BreathingActive);
    }

    #[test]
    fn test_tick_does_nothing_when_not_ticking() {
        let clock = clock();
        let mut machine = BreathMachine::new();
        assert!(step(&mut machine, &clock, 10_000).is_empty());

        machine.start(settings(1000, 1000, 2, 1), clock.now()).unwrap();
        machine.handle(Signal::Pause, clock.now());
        assert!(step(&mut machine, &clock, 10_000).is_empty());
        assert_eq!(machine.snapshot().phase, Phase::Inhale);
    }

    #[test]
    fn test_pause_preserves_phase_boundaries() {
        let clock = clock();
        let s = settings(4000, 4000, 2, 1);
        let mut machine = started(&clock, s);

        step(&mut machine, &clock, 2500);
        let effects = machine.handle(Signal::Pause, clock.now());
        assert!(effects.contains(&Effect::ReleaseTicks));
        assert_eq!(machine.state(), BreathState::Paused);

        clock.advance_ms(60_000);
        let effects = machine.handle(Signal::Resume, clock.now());
        assert!(effects.contains(&Effect::AcquireTicks));
        assert_eq!(machine.state(), BreathState::BreathingActive);

        // 1500ms of the inhale remained when paused.
        assert!(step(&mut machine, &clock, 1499).is_empty());
        assert_eq!(
            step(&mut machine, &clock, 1),
            vec![Effect::PhaseChanged(Phase::Exhale)]
        );
    }

    #[test]
    fn test_pause_resume_matches_uninterrupted_run() {
        let s = settings(700, 900, 3, 2);

        let run = |pause_at: Option<(usize, u64)>| {
            let clock = clock();
            let mut machine = started(&clock, s);
            let mut boundaries = Vec::new();
            let mut active = Duration::ZERO;
            for i in 0..400 {
                if pause_at.is_some_and(|(at, _)| at == i) {
                    machine.handle(Signal::Pause, clock.now());
                    clock.advance_ms(pause_at.map_or(0, |(_, len)| len));
                    machine.handle(Signal::Resume, clock.now());
                }
                clock.advance_ms(50);
                active += Duration::from_millis(50);
                let effects = machine.tick(clock.now());
                if !effects.is_empty() {
                    boundaries.push((active, effects));
                }
                if machine.state() == BreathState::ExhaleHoldActive {
                    break;
                }
            }
            (boundaries, machine.snapshot().breath_count)
        };

        let baseline = run(None);
        assert_eq!(baseline.1, 3);
        for (tick, pause_ms) in [(3, 10_000), (17, 1), (40, 123_456)] {
            assert_eq!(run(Some((tick, pause_ms))), baseline);
        }
    }

    #[test]
    fn test_pause_during_hold_does_not_count_paused_time() {
        let clock = clock();
        let s = settings(1000, 1000, 1, 1);
        let mut machine = started(&clock, s);
        breathe_cycle(&mut machine, &clock, &s);
        assert_eq!(machine.state(), BreathState::ExhaleHoldActive);

        clock.advance_ms(10_000);
        machine.handle(Signal::VisibilityLost, clock.now());
        assert_eq!(machine.state(), BreathState::Paused);
        assert_eq!(machine.snapshot().current_hold, Duration::from_secs(10));

        clock.advance_ms(300_000);
        assert_eq!(machine.snapshot().current_hold, Duration::from_secs(10));
        machine.handle(Signal::Resume, clock.now());
        assert_eq!(machine.state(), BreathState::ExhaleHoldActive);
        assert_eq!(machine.snapshot().current_hold, Duration::from_secs(10));

        clock.advance_ms(5_000);
        machine.handle(Signal::Advance, clock.now());
        assert_eq!(machine.snapshot().best_exhale_hold, Duration::from_secs(15));

        clock.advance_ms(4_000);
        machine.handle(Signal::Pause, clock.now());
        clock.advance_ms(9_999);
        machine.handle(Signal::Resume, clock.now());
        clock.advance_ms(1_000);
        let effects = machine.handle(Signal::Advance, clock.now());
        let record = persisted(&effects).unwrap();
        assert_eq!(record.cycles[0].exhale_hold.duration_ms, 15_000);
        assert_eq!(record.cycles[0].inhale_hold.duration_ms, 5_000);
    }

    #[test]
    fn test_resume_into_exhale_hold() {
        let clock = clock();
        let mut machine = started(&clock, settings(1000, 1000, 1, 1));
        clock.advance_ms(1000);
        machine.tick(clock.now());
        clock.advance_ms(1000);
        machine.tick(clock.now());
        assert_eq!(machine.state(), BreathState::ExhaleHoldActive);

        machine.handle(Signal::Pause, clock.now());
        clock.advance_ms(7_000);
        machine.handle(Signal::Resume, clock.now());
        clock.advance_ms(2_000);
        machine.handle(Signal::Advance, clock.now());
        assert_eq!(machine.snapshot().best_exhale_hold, Duration::from_secs(2));
    }

    #[test]
    fn test_hold_readout_is_monotonic() {
        let clock = clock();
        let s = settings(100, 100, 1, 1);
        let mut machine = started(&clock, s);
        breathe_cycle(&mut machine, &clock, &s);

        let mut last = Duration::ZERO;
        for _ in 0..20 {
            step(&mut machine, &clock, 16);
            let hold = machine.snapshot().current_hold;
            assert!(hold >= last);
            last = hold;
        }
        assert_eq!(last, Duration::from_millis(320));
    }

    #[test]
    fn test_best_holds_never_decrease() {
        let clock = clock();
        let s = settings(100, 100, 1, 4);
        let mut machine = started(&clock, s);
        let exhale_holds = [20_000u64, 5_000, 35_000, 1_000];
        let inhale_holds = [9_000u64, 12_000, 3_000, 12_500];
        let mut best_exhale = Duration::ZERO;
        let mut best_inhale = Duration::ZERO;

        for (exhale, inhale) in exhale_holds.iter().zip(inhale_holds.iter()) {
            breathe_cycle(&mut machine, &clock, &s);
            clock.advance_ms(*exhale);
            machine.handle(Signal::Advance, clock.now());
            clock.advance_ms(*inhale);
            machine.handle(Signal::Advance, clock.now());

            let snap = machine.snapshot();
            assert!(snap.best_exhale_hold >= best_exhale);
            assert!(snap.best_inhale_hold >= best_inhale);
            best_exhale = snap.best_exhale_hold;
            best_inhale = snap.best_inhale_hold;
        }
        assert_eq!(best_exhale, Duration::from_secs(35));
        assert_eq!(best_inhale, Duration::from_millis(12_500));
    }

    #[test]
    fn test_end_session_early_keeps_only_completed_cycles() {
        let clock = clock();
        let s = settings(200, 200, 2, 5);
        let mut machine = started(&clock, s);

        breathe_cycle(&mut machine, &clock, &s);
        clock.advance_ms(10_000);
        machine.handle(Signal::Advance, clock.now());
        clock.advance_ms(10_000);
        machine.handle(Signal::Advance, clock.now());

        // Half of the second cycle, then an exhale hold in progress.
        breathe_cycle(&mut machine, &clock, &s);
        clock.advance_ms(3_000);
        let effects = machine.handle(Signal::EndSession, clock.now());

        assert_eq!(machine.state(), BreathState::SessionComplete);
        let record = persisted(&effects).unwrap();
        assert_eq!(record.cycles_completed, 1);
        assert_eq!(record.cycles.len(), 1);
        assert!(!record.is_complete());
        assert_eq!(record.settings.cycles_target, 5);
    }

    #[test]
    fn test_end_session_from_paused() {
        let clock = clock();
        let mut machine = started(&clock, settings(1000, 1000, 2, 1));
        machine.handle(Signal::Pause, clock.now());

        let effects = machine.handle(Signal::EndSession, clock.now());
        assert_eq!(machine.state(), BreathState::SessionComplete);
        let record = persisted(&effects).unwrap();
        assert!(record.cycles.is_empty());
        assert_eq!(record.cycles_completed, 0);
    }

    #[test]
    fn test_visibility_lost_only_pauses_active_states() {
        let clock = clock();
        let mut machine = started(&clock, settings(1000, 1000, 2, 1));
        machine.handle(Signal::VisibilityLost, clock.now());
        assert_eq!(machine.state(), BreathState::Paused);

        assert!(machine.handle(Signal::VisibilityLost, clock.now()).is_empty());
        assert_eq!(machine.state(), BreathState::Paused);
    }

    #[test]
    fn test_complete_is_terminal_until_restart() {
        let clock = clock();
        let mut machine = started(&clock, settings(1000, 1000, 2, 1));
        machine.handle(Signal::EndSession, clock.now());
        let first_id = machine.session_id().map(str::to_string);

        assert!(machine.handle(Signal::Pause, clock.now()).is_empty());
        assert!(machine.handle(Signal::EndSession, clock.now()).is_empty());
        assert!(step(&mut machine, &clock, 5_000).is_empty());
        assert_eq!(machine.state(), BreathState::SessionComplete);

        machine.start(settings(1000, 1000, 2, 1), clock.now()).unwrap();
        assert_eq!(machine.state(), BreathState::BreathingActive);
        assert_ne!(machine.session_id().map(str::to_string), first_id);
        assert!(machine.cycles().is_empty());
        assert_eq!(machine.snapshot().best_exhale_hold, Duration::ZERO);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let clock = clock();
        let mut machine = started(&clock, settings(1000, 1000, 2, 1));
        assert!(machine.reset().is_empty());

        machine.handle(Signal::EndSession, clock.now());
        let effects = machine.reset();
        assert_eq!(
            effects,
            vec![Effect::StateChanged {
                from: BreathState::SessionComplete,
                to: BreathState::Idle
            }]
        );
        assert_eq!(machine.snapshot(), Snapshot::IDLE);
    }

    #[test]
    fn test_phase_progress() {
        let clock = clock();
        let mut machine = started(&clock, settings(4000, 2000, 2, 1));

        step(&mut machine, &clock, 1000);
        assert!((machine.snapshot().phase_progress - 0.25).abs() < 1e-9);

        step(&mut machine, &clock, 3000);
        step(&mut machine, &clock, 1000);
        assert!((machine.snapshot().phase_progress - 0.5).abs() < 1e-9);

        machine.handle(Signal::Pause, clock.now());
        clock.advance_ms(50_000);
        assert!((machine.snapshot().phase_progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(BreathState::ExhaleHoldActive.to_string(), "exhale_hold_active");
        assert_eq!(
            serde_json::to_string(&BreathState::SessionComplete).unwrap(),
            "\"session_complete\""
        );
        assert!(BreathState::InhaleHoldActive.is_hold());
        assert!(BreathState::Paused.is_in_session());
        assert!(!BreathState::Paused.is_ticking());
    }
}
