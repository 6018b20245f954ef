//! Simulation driver
//!
//! `Simulation` owns the state plus its roster and seeded RNG. Time only
//! moves through `tick`, and player intent only enters through `submit`.
//! Both funnel into one transition function over the closed `Phase` set.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::at_bat;
use super::play_mode::{PlayMode, Rotation};
use super::profile::{PitchProfile, ProfileSet};
use super::random;
use super::snapshot::Snapshot;
use super::state::{
    AimLock, Cursor, GameEvent, GameMode, GameResult, GameState, Outcome, Phase, PitchInstance,
    SwingAttempt,
};
use super::swing::{self, Matchup};
use super::trajectory;
use crate::consts::*;
use crate::error::SimError;
use crate::roster::{Opponent, RosterProvider};
use crate::settings::Settings;
use crate::{clamp_to_aim_bounds, polar_to_cartesian};

/// Player intent
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Choose a pitch type and start aiming (manual)
    SelectPitch(String),
    /// Move the aim reticle (manual); clamped to the aim bounds
    AimAt { lateral: f64, vertical: f64 },
    /// Lock the aim, or fire early while locked (manual)
    TriggerAim,
    /// Swing at the pitch in flight (automatic)
    Swing,
    /// Queue up the next pitch (automatic)
    NextPitch,
    /// Drop the current pitch and go back to idle (manual)
    Reset,
    TogglePause,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SelectPitch(_) => "select pitch",
            Command::AimAt { .. } => "aim",
            Command::TriggerAim => "trigger aim",
            Command::Swing => "swing",
            Command::NextPitch => "next pitch",
            Command::Reset => "reset",
            Command::TogglePause => "pause",
        }
    }
}

/// How a session starts
#[derive(Debug, Clone, PartialEq)]
pub enum SessionSetup {
    Pitching(Opponent),
    Hitting(Opponent),
    /// Face a random lineup drawn from the roster
    Play,
}

enum Trigger {
    Tick { dt_us: u64 },
    Command(Command),
}

pub struct Simulation<P: RosterProvider, R: Rng = Pcg32> {
    state: GameState,
    settings: Settings,
    roster: P,
    rng: R,
    events: Vec<GameEvent>,
}

impl<P: RosterProvider> Simulation<P, Pcg32> {
    /// Start a session with a PCG32 stream seeded from `seed`
    pub fn with_seed(
        setup: SessionSetup,
        roster: P,
        settings: Settings,
        seed: u64,
    ) -> Result<Self, SimError> {
        Self::new(setup, roster, settings, Pcg32::seed_from_u64(seed))
    }
}

impl<P: RosterProvider, R: Rng> Simulation<P, R> {
    pub fn new(
        setup: SessionSetup,
        roster: P,
        settings: Settings,
        mut rng: R,
    ) -> Result<Self, SimError> {
        settings.validate()?;

        let state = match setup {
            SessionSetup::Pitching(opponent) => {
                let profiles = ProfileSet::new(roster.profiles(opponent.id));
                GameState::new(GameMode::Pitching, Some(opponent), profiles)
            }
            SessionSetup::Hitting(opponent) => {
                let profiles = ProfileSet::new(roster.profiles(opponent.id));
                GameState::new(GameMode::Hitting, Some(opponent), profiles)
            }
            SessionSetup::Play => {
                let play = PlayMode::start(roster.opponents(), &mut rng)?;
                let opponent = play.current().cloned();
                let profiles = opponent
                    .as_ref()
                    .map(|o| ProfileSet::new(roster.profiles(o.id)))
                    .unwrap_or_default();
                let mut state = GameState::new(GameMode::Play, opponent, profiles);
                state.play = Some(play);
                state
            }
        };

        log::info!(
            "{} started against {}",
            state.mode.as_str(),
            state.opponent.as_ref().map_or("nobody", |o| o.name.as_str())
        );

        Ok(Self {
            state,
            settings,
            roster,
            rng,
            events: Vec::new(),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the simulation by `dt` seconds (capped at `MAX_FRAME_DT`)
    pub fn tick(&mut self, dt: f64) {
        if self.state.paused || self.state.is_over() {
            return;
        }

        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        let dt_us = (dt * 1e6).round() as u64;
        self.state.time_us += dt_us;
        self.state.time_ticks += 1;

        let phase = std::mem::replace(&mut self.state.phase, Phase::Idle);
        self.state.phase = self.transition(phase, Trigger::Tick { dt_us });
    }

    /// Apply a command. Rejected commands leave the state untouched.
    pub fn submit(&mut self, command: Command) -> Result<(), SimError> {
        if command == Command::TogglePause {
            return self.toggle_pause();
        }
        self.accepts(&command)?;

        let phase = std::mem::replace(&mut self.state.phase, Phase::Idle);
        self.state.phase = self.transition(phase, Trigger::Command(command));
        Ok(())
    }

    fn toggle_pause(&mut self) -> Result<(), SimError> {
        if self.state.is_over() {
            return Err(self.reject(&Command::TogglePause));
        }
        self.state.paused = !self.state.paused;
        log::info!("{}", if self.state.paused { "Paused" } else { "Resumed" });
        self.events.push(GameEvent::Paused(self.state.paused));
        Ok(())
    }

    fn reject(&self, command: &Command) -> SimError {
        let phase = if self.state.paused {
            "paused"
        } else {
            self.state.phase.name()
        };
        log::debug!("Ignoring {} while {}", command.name(), phase);
        SimError::CommandNotAccepted {
            command: command.name(),
            phase,
        }
    }

    fn accepts(&self, command: &Command) -> Result<(), SimError> {
        if self.state.paused {
            return Err(self.reject(command));
        }

        let automatic = self.state.mode.is_automatic();
        let phase = &self.state.phase;
        let between_pitches = matches!(
            phase,
            Phase::Idle | Phase::Aiming { .. } | Phase::Arrived(_)
        );

        let accepted = match command {
            Command::SelectPitch(_) | Command::AimAt { .. } => !automatic && between_pitches,
            Command::TriggerAim => {
                !automatic && matches!(phase, Phase::Aiming { .. } | Phase::AimLocked { .. })
            }
            Command::Swing => {
                automatic && matches!(phase, Phase::InFlight(pitch) if pitch.swing.is_none())
            }
            Command::NextPitch => {
                automatic
                    && match phase {
                        Phase::Arrived(_) => true,
                        Phase::InFlight(pitch) => pitch.swing.is_some(),
                        _ => false,
                    }
            }
            Command::Reset => !automatic && !self.state.is_over(),
            Command::TogglePause => !self.state.is_over(),
        };
        if !accepted {
            return Err(self.reject(command));
        }

        if let Command::SelectPitch(name) = command {
            if !self.state.profiles.contains(name) {
                log::warn!("Unknown pitch type {}", name);
                return Err(SimError::UnknownPitchType(name.clone()));
            }
        }
        Ok(())
    }

    fn transition(&mut self, phase: Phase, trigger: Trigger) -> Phase {
        match trigger {
            Trigger::Tick { dt_us } => self.advance(phase, dt_us),
            Trigger::Command(command) => self.apply(phase, command),
        }
    }

    fn apply(&mut self, phase: Phase, command: Command) -> Phase {
        match (phase, command) {
            (_, Command::SelectPitch(pitch_type)) => {
                log::debug!("Selected {}", pitch_type);
                Phase::Aiming { pitch_type }
            }
            (phase, Command::AimAt { lateral, vertical }) => {
                self.state.aim = clamp_to_aim_bounds(DVec2::new(lateral, vertical));
                phase
            }
            (Phase::Aiming { pitch_type }, Command::TriggerAim) => {
                let lock = AimLock::new(self.state.aim, self.state.time_us);
                log::debug!("Aim locked at ({:.2}, {:.2})", lock.center.x, lock.center.y);
                Phase::AimLocked { pitch_type, lock }
            }
            (Phase::AimLocked { pitch_type, lock }, Command::TriggerAim) => {
                self.fire_manual(pitch_type, lock)
            }
            (Phase::InFlight(pitch), Command::Swing) => self.swing(pitch),
            (_, Command::NextPitch) => {
                self.state.last_outcome = None;
                Phase::Countdown {
                    ticks_left: COUNTDOWN_TICKS,
                }
            }
            (_, Command::Reset) => {
                self.state.last_outcome = None;
                Phase::Idle
            }
            // Filtered out by `accepts`
            (phase, _) => phase,
        }
    }

    fn advance(&mut self, phase: Phase, dt_us: u64) -> Phase {
        match phase {
            Phase::AimLocked {
                pitch_type,
                mut lock,
            } => {
                if lock.update(self.state.time_us) {
                    match self.fire_manual(pitch_type, lock) {
                        Phase::InFlight(pitch) => self.fly(pitch, dt_us),
                        other => other,
                    }
                } else {
                    Phase::AimLocked { pitch_type, lock }
                }
            }
            Phase::Countdown { ticks_left } => match ticks_left.saturating_sub(1) {
                0 => Phase::Tell { ticks: 0 },
                left => Phase::Countdown { ticks_left: left },
            },
            Phase::Tell { ticks } => {
                let ticks = ticks + 1;
                if ticks < TELL_TICKS {
                    return Phase::Tell { ticks };
                }
                match self.launch_auto() {
                    Some(pitch) => self.fly(pitch, dt_us),
                    None => Phase::Countdown {
                        ticks_left: COUNTDOWN_TICKS,
                    },
                }
            }
            Phase::InFlight(pitch) => self.fly(pitch, dt_us),
            other => other,
        }
    }

    fn fly(&mut self, mut pitch: PitchInstance, dt_us: u64) -> Phase {
        pitch.advance(dt_us);
        if pitch.at_plate() {
            self.arrive(pitch)
        } else {
            Phase::InFlight(pitch)
        }
    }

    fn arrive(&mut self, pitch: PitchInstance) -> Phase {
        log::debug!(
            "{} arrived: {}",
            pitch.pitch_type(),
            pitch.classification.as_str()
        );
        self.events.push(GameEvent::PitchArrived {
            classification: pitch.classification,
        });

        if self.state.mode.is_automatic() && pitch.swing.is_none() {
            let outcome = at_bat::call_pitch(
                &mut self.state.counters,
                &mut self.state.scoreboard,
                pitch.classification,
            );
            self.events.push(GameEvent::PitchCalled { outcome });
            if let Some(result) = self.record_outcome(outcome) {
                return Phase::GameOver { result };
            }
        }
        Phase::Arrived(pitch)
    }

    fn swing(&mut self, mut pitch: PitchInstance) -> Phase {
        let ratio = swing::timing_ratio(pitch.trajectory.start().z, pitch.position().z);
        let matchup = self.matchup(&pitch.profile);
        let judgement = swing::judge(&mut self.rng, ratio, pitch.classification, &matchup);
        let outcome = at_bat::apply_swing(
            &mut self.state.counters,
            &mut self.state.scoreboard,
            &judgement,
        );
        log::debug!(
            "Swing at ratio {:.3} ({}), p={:?}",
            ratio,
            judgement.band.as_str(),
            judgement.probability
        );

        pitch.swing = Some(SwingAttempt {
            at_us: pitch.cursor.elapsed_us,
            ratio,
            band: judgement.band,
            outcome,
        });
        self.events.push(GameEvent::SwingResolved {
            outcome,
            hit: outcome.is_hit(),
            out: outcome.is_out(),
        });

        match self.record_outcome(outcome) {
            Some(result) => Phase::GameOver { result },
            None => Phase::InFlight(pitch),
        }
    }

    fn matchup(&self, profile: &PitchProfile) -> Matchup {
        let opponent = self.state.opponent.as_ref();
        let pitch_speed_mph = if self.state.profiles.is_default_substitute() {
            opponent.map_or(DEFAULT_PITCHER_VELOCITY, |o| o.velocity)
        } else {
            profile.speed_mph
        };
        Matchup {
            batter: self.settings.batter,
            pitcher_stuff: opponent.map_or(DEFAULT_PITCHER_STUFF, |o| o.stuff),
            pitch_speed_mph,
        }
    }

    /// Note the outcome and settle play-mode progress. Returns the final
    /// result if the session just ended.
    fn record_outcome(&mut self, outcome: Outcome) -> Option<GameResult> {
        self.state.last_outcome = Some(outcome);
        log::info!(
            "{} (count {}-{}, hits {}, outs {})",
            outcome.label(),
            self.state.counters.balls,
            self.state.counters.strikes,
            self.state.scoreboard.hits,
            self.state.scoreboard.outs
        );
        if !outcome.is_terminal() {
            return None;
        }
        self.events.push(GameEvent::AtBatReset);

        let play = self.state.play.as_mut()?;
        if outcome.is_out() {
            let result = play.check_defeat(&self.state.scoreboard)?;
            return Some(self.end_game(result));
        }
        match play.record_hit() {
            Rotation::Next(opponent) => {
                self.change_opponent(opponent);
                None
            }
            Rotation::Victory => Some(self.end_game(GameResult::Victory)),
        }
    }

    fn change_opponent(&mut self, opponent: Opponent) {
        let profiles = ProfileSet::new(self.roster.profiles(opponent.id));
        log::info!(
            "Now facing {} ({} pitches)",
            opponent.name,
            profiles.len()
        );
        self.state.counters.reset();
        self.state.profiles = profiles.clone();
        self.state.opponent = Some(opponent.clone());
        self.events
            .push(GameEvent::OpponentChanged { opponent, profiles });
    }

    fn end_game(&mut self, result: GameResult) -> GameResult {
        let scoreboard = self.state.scoreboard;
        log::info!(
            "{} {} hits, {} outs",
            result.as_str(),
            scoreboard.hits,
            scoreboard.outs
        );
        self.events.push(GameEvent::GameEnded {
            result,
            outs: scoreboard.outs,
            hits: scoreboard.hits,
        });
        result
    }

    /// Automatic pitch: random type, then random target
    fn launch_auto(&mut self) -> Option<PitchInstance> {
        let profile = self.state.profiles.random_pitch(&mut self.rng).clone();
        let target = trajectory::sample_auto_target(&mut self.rng);
        match self.launch(profile, target, None) {
            Ok(pitch) => Some(pitch),
            Err(e) => {
                log::error!("Failed to launch pitch: {}", e);
                None
            }
        }
    }

    /// Manual pitch: target drawn uniformly from the aim circle
    fn fire_manual(&mut self, pitch_type: String, lock: AimLock) -> Phase {
        let angle = random::unit(&mut self.rng) * TAU;
        let r = random::unit(&mut self.rng).sqrt() * lock.radius;
        let target = lock.center + polar_to_cartesian(r, angle);

        let profile = self.state.profiles.resolve(&pitch_type).clone();
        match self.launch(profile, target, Some(lock.radius)) {
            Ok(pitch) => Phase::InFlight(pitch),
            Err(e) => {
                log::error!("Failed to throw {}: {}", pitch_type, e);
                Phase::Aiming { pitch_type }
            }
        }
    }

    fn launch(
        &mut self,
        profile: PitchProfile,
        target: DVec2,
        aim_radius: Option<f64>,
    ) -> Result<PitchInstance, SimError> {
        let solution = trajectory::solve(&profile, target)?;
        log::info!(
            "{} at {:.1} mph toward ({:.2}, {:.2})",
            profile.pitch_type,
            profile.speed_mph,
            target.x,
            target.y
        );
        log::debug!(
            "Flight {:.3}s, {} samples",
            solution.flight_time,
            solution.trajectory.len()
        );
        self.events.push(GameEvent::PitchThrown {
            pitch_type: profile.pitch_type.clone(),
            speed_mph: profile.speed_mph,
        });
        Ok(PitchInstance {
            profile,
            target,
            aim_radius,
            trajectory: solution.trajectory,
            classification: solution.classification,
            cursor: Cursor::default(),
            swing: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{InMemoryRoster, RosterEntry};
    use crate::sim::random::ScriptedRng;
    use crate::sim::swing::TimingBand;
    use crate::sim::trajectory::Classification;

    const DT: f64 = 0.005;
    /// Sample index where a 90 mph pitch is in the Perfect band
    const PERFECT_INDEX: usize = 84;

    fn fastball() -> PitchProfile {
        PitchProfile {
            pitch_type: "FF".to_string(),
            release: DVec2::new(-2.0, 6.0),
            speed_mph: 90.0,
            horizontal_movement_in: 0.0,
            vertical_movement_in: 0.0,
        }
    }

    fn opponent(id: u32) -> Opponent {
        Opponent {
            id,
            name: format!("Pitcher {}", id),
            stuff: 50.0,
            velocity: 90.0,
        }
    }

    fn roster(count: u32) -> InMemoryRoster {
        InMemoryRoster::new(
            (1..=count)
                .map(|id| RosterEntry {
                    opponent: opponent(id),
                    pitches: vec![fastball()],
                })
                .collect(),
        )
    }

    fn sim(setup: SessionSetup, draws: &[f64]) -> Simulation<InMemoryRoster, ScriptedRng> {
        Simulation::new(setup, roster(3), Settings::default(), ScriptedRng::new(draws)).unwrap()
    }

    fn tick_until<P: RosterProvider, R: Rng>(
        sim: &mut Simulation<P, R>,
        dt: f64,
        done: impl Fn(&GameState) -> bool,
    ) {
        for _ in 0..10_000 {
            if done(sim.state()) {
                return;
            }
            sim.tick(dt);
        }
        panic!("condition never reached, phase {}", sim.state().phase.name());
    }

    fn in_flight(state: &GameState) -> bool {
        matches!(state.phase, Phase::InFlight(_))
    }

    fn at_index(index: usize) -> impl Fn(&GameState) -> bool {
        move |state| state.pitch().is_some_and(|p| p.cursor.index >= index)
    }

    fn count_events(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn test_countdown_then_tell_then_pitch() {
        let mut sim = sim(SessionSetup::Hitting(opponent(1)), &[0.5]);
        for _ in 0..COUNTDOWN_TICKS - 1 {
            sim.tick(DT);
        }
        assert_eq!(sim.state().phase, Phase::Countdown { ticks_left: 1 });
        sim.tick(DT);
        assert_eq!(sim.state().phase, Phase::Tell { ticks: 0 });
        assert!(sim.snapshot().tell_visible);

        for _ in 0..TELL_TICKS - 1 {
            sim.tick(DT);
        }
        assert_eq!(sim.state().phase, Phase::Tell { ticks: TELL_TICKS - 1 });
        assert!(!sim.snapshot().tell_visible);

        sim.tick(DT);
        let pitch = sim.state().pitch().unwrap();
        assert_eq!(pitch.cursor.index, 1);
        assert_eq!(pitch.classification, Classification::Strike);
        assert!(pitch.target.abs_diff_eq(DVec2::new(0.0, 2.2), 1e-12));

        let events = sim.drain_events();
        assert_eq!(
            events,
            vec![GameEvent::PitchThrown {
                pitch_type: "FF".to_string(),
                speed_mph: 90.0
            }]
        );
    }

    #[test]
    fn test_perfect_swing_is_a_hit() {
        let mut sim = sim(SessionSetup::Hitting(opponent(1)), &[0.5]);
        tick_until(&mut sim, DT, at_index(PERFECT_INDEX));
        sim.submit(Command::Swing).unwrap();

        let pitch = sim.state().pitch().unwrap();
        let attempt = pitch.swing.unwrap();
        assert_eq!(attempt.band, TimingBand::Perfect);
        assert_eq!(attempt.outcome, Outcome::Hit { band: TimingBand::Perfect });
        assert_eq!(sim.state().scoreboard.hits, 1);
        assert!(sim.state().counters.is_fresh());

        let events = sim.drain_events();
        assert!(events.contains(&GameEvent::SwingResolved {
            outcome: Outcome::Hit { band: TimingBand::Perfect },
            hit: true,
            out: false,
        }));
        assert_eq!(events.last(), Some(&GameEvent::AtBatReset));

        // One swing per pitch
        assert!(matches!(
            sim.submit(Command::Swing),
            Err(SimError::CommandNotAccepted { command: "swing", .. })
        ));
    }

    #[test]
    fn test_swung_pitch_keeps_flying_without_a_call() {
        let mut sim = sim(SessionSetup::Hitting(opponent(1)), &[0.5]);
        tick_until(&mut sim, DT, at_index(10));
        sim.submit(Command::Swing).unwrap();
        assert_eq!(sim.state().counters.strikes, 1);
        sim.drain_events();

        tick_until(&mut sim, DT, |s| matches!(s.phase, Phase::Arrived(_)));
        let events = sim.drain_events();
        assert_eq!(
            count_events(&events, |e| matches!(e, GameEvent::PitchCalled { .. })),
            0
        );
        assert_eq!(sim.state().counters.strikes, 1);
    }

    #[test]
    fn test_swing_outside_flight_is_ignored() {
        let mut sim = sim(SessionSetup::Hitting(opponent(1)), &[0.5]);
        let before = sim.snapshot();
        assert!(matches!(
            sim.submit(Command::Swing),
            Err(SimError::CommandNotAccepted { phase: "counting down", .. })
        ));
        assert_eq!(sim.snapshot(), before);
        assert!(sim.drain_events().is_empty());

        let mut manual = sim_pitching(&[0.5]);
        assert!(manual.submit(Command::Swing).is_err());
        assert_eq!(manual.state().phase, Phase::Idle);
    }

    #[test]
    fn test_three_called_strikes() {
        let mut sim = sim(SessionSetup::Hitting(opponent(1)), &[0.5]);
        for strike in 1..=3u8 {
            tick_until(&mut sim, DT, |s| matches!(s.phase, Phase::Arrived(_)));
            if strike < 3 {
                assert_eq!(sim.state().counters.strikes, strike);
                assert_eq!(sim.state().last_outcome, Some(Outcome::CalledStrike));
            }
            sim.submit(Command::NextPitch).unwrap();
        }
        assert_eq!(sim.state().scoreboard.outs, 1);
        assert!(sim.state().counters.is_fresh());

        let events = sim.drain_events();
        assert!(events.contains(&GameEvent::PitchCalled {
            outcome: Outcome::Strikeout { band: None }
        }));
        assert_eq!(count_events(&events, |e| *e == GameEvent::AtBatReset), 1);
    }

    #[test]
    fn test_four_balls_walk() {
        // type, ball branch, side, x, y
        let mut sim = sim(SessionSetup::Hitting(opponent(1)), &[0.5, 0.7, 0.5, 0.5, 0.5]);
        for _ in 0..4 {
            tick_until(&mut sim, DT, |s| matches!(s.phase, Phase::Arrived(_)));
            assert_eq!(
                sim.state().pitch().unwrap().classification,
                Classification::Ball
            );
            sim.submit(Command::NextPitch).unwrap();
        }
        assert_eq!(sim.state().scoreboard.hits, 1);
        assert!(sim.state().counters.is_fresh());
        assert!(sim
            .drain_events()
            .contains(&GameEvent::PitchCalled { outcome: Outcome::Walk }));
    }

    #[test]
    fn test_next_pitch_needs_a_resolved_pitch() {
        let mut sim = sim(SessionSetup::Hitting(opponent(1)), &[0.5]);
        tick_until(&mut sim, DT, in_flight);
        assert!(sim.submit(Command::NextPitch).is_err());
        sim.submit(Command::Swing).unwrap();
        sim.submit(Command::NextPitch).unwrap();
        assert_eq!(
            sim.state().phase,
            Phase::Countdown {
                ticks_left: COUNTDOWN_TICKS
            }
        );
    }

    #[test]
    fn test_pause_withholds_ticks() {
        let mut sim = sim(SessionSetup::Hitting(opponent(1)), &[0.5]);
        sim.tick(DT);
        sim.submit(Command::TogglePause).unwrap();
        let frozen = sim.snapshot();
        for _ in 0..100 {
            sim.tick(DT);
        }
        assert_eq!(sim.snapshot(), frozen);
        assert!(sim.submit(Command::NextPitch).is_err());

        sim.submit(Command::TogglePause).unwrap();
        sim.tick(DT);
        assert_eq!(sim.state().time_ticks, 2);
        assert_eq!(
            sim.drain_events(),
            vec![GameEvent::Paused(true), GameEvent::Paused(false)]
        );
    }

    #[test]
    fn test_frame_delta_is_capped() {
        let mut sim = sim(SessionSetup::Hitting(opponent(1)), &[0.5]);
        sim.tick(3.0);
        assert_eq!(sim.state().time_us, 50_000);
        sim.tick(f64::NAN);
        sim.tick(-1.0);
        assert_eq!(sim.state().time_us, 50_000);
        assert_eq!(sim.state().time_ticks, 3);
    }

    fn sim_pitching(draws: &[f64]) -> Simulation<InMemoryRoster, ScriptedRng> {
        sim(SessionSetup::Pitching(opponent(1)), draws)
    }

    #[test]
    fn test_unknown_pitch_rejected() {
        let mut sim = sim_pitching(&[0.5]);
        assert!(matches!(
            sim.submit(Command::SelectPitch("KNUCKLE".to_string())),
            Err(SimError::UnknownPitchType(name)) if name == "KNUCKLE"
        ));
        assert_eq!(sim.state().phase, Phase::Idle);
    }

    #[test]
    fn test_aim_lock_fires_at_minimum_radius() {
        let mut sim = sim_pitching(&[0.5]);
        sim.submit(Command::SelectPitch("FF".to_string())).unwrap();
        sim.submit(Command::AimAt {
            lateral: 0.1,
            vertical: 2.2,
        })
        .unwrap();
        sim.submit(Command::TriggerAim).unwrap();
        assert_eq!(sim.snapshot().aim_radius, Some(MAX_AIM_RADIUS_FT));

        for _ in 0..13 {
            sim.tick(MAX_FRAME_DT);
        }
        let Phase::AimLocked { lock, .. } = &sim.state().phase else {
            panic!("expected a lock, got {}", sim.state().phase.name());
        };
        assert!(lock.radius > MIN_AIM_RADIUS_FT);

        sim.tick(MAX_FRAME_DT);
        let pitch = sim.state().pitch().unwrap();
        assert_eq!(pitch.aim_radius, Some(MIN_AIM_RADIUS_FT));
        assert!(pitch.target.distance(DVec2::new(0.1, 2.2)) <= MIN_AIM_RADIUS_FT + 1e-12);
        assert_eq!(pitch.cursor.index, 10);
    }

    #[test]
    fn test_early_trigger_uses_current_radius() {
        let mut sim = sim_pitching(&[0.5]);
        sim.submit(Command::SelectPitch("FF".to_string())).unwrap();
        sim.submit(Command::TriggerAim).unwrap();
        for _ in 0..7 {
            sim.tick(MAX_FRAME_DT);
        }
        sim.submit(Command::TriggerAim).unwrap();
        let pitch = sim.state().pitch().unwrap();
        assert!((pitch.aim_radius.unwrap() - 0.85).abs() < 1e-12);
        assert_eq!(pitch.cursor.index, 0);
        assert!(sim
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::PitchThrown { .. })));
    }

    #[test]
    fn test_aim_is_clamped() {
        let mut sim = sim_pitching(&[0.5]);
        sim.submit(Command::AimAt {
            lateral: -10.0,
            vertical: 9.0,
        })
        .unwrap();
        assert_eq!(
            sim.state().aim,
            DVec2::new(AIM_MIN_LATERAL_FT, AIM_MAX_VERTICAL_FT)
        );
    }

    #[test]
    fn test_manual_pitch_is_not_counted() {
        let mut sim = sim_pitching(&[0.5]);
        sim.submit(Command::SelectPitch("FF".to_string())).unwrap();
        sim.submit(Command::TriggerAim).unwrap();
        sim.submit(Command::TriggerAim).unwrap();
        tick_until(&mut sim, DT, |s| matches!(s.phase, Phase::Arrived(_)));
        assert!(sim.state().counters.is_fresh());
        assert!(sim.state().last_outcome.is_none());

        sim.submit(Command::Reset).unwrap();
        assert_eq!(sim.state().phase, Phase::Idle);
    }

    #[test]
    fn test_play_mode_needs_three_pitchers() {
        let result = Simulation::new(
            SessionSetup::Play,
            roster(2),
            Settings::default(),
            ScriptedRng::new(&[0.5]),
        );
        assert!(matches!(
            result,
            Err(SimError::InsufficientRoster { needed: 3, available: 2 })
        ));
    }

    #[test]
    fn test_play_mode_victory_after_three_hits() {
        let mut sim = sim(SessionSetup::Play, &[0.5]);
        let lineup: Vec<u32> = sim
            .state()
            .play
            .as_ref()
            .unwrap()
            .opponents()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(sim.state().opponent.as_ref().unwrap().id, lineup[0]);

        for at_bat in 0..3 {
            if at_bat > 0 {
                sim.submit(Command::NextPitch).unwrap();
            }
            tick_until(&mut sim, DT, at_index(PERFECT_INDEX));
            sim.submit(Command::Swing).unwrap();
        }

        assert_eq!(
            sim.state().phase,
            Phase::GameOver {
                result: GameResult::Victory
            }
        );
        let events = sim.drain_events();
        let changed: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::OpponentChanged { opponent, .. } => Some(opponent.id),
                _ => None,
            })
            .collect();
        assert_eq!(changed, lineup[1..].to_vec());
        assert_eq!(
            count_events(&events, |e| matches!(e, GameEvent::GameEnded { .. })),
            1
        );
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameEnded {
                result: GameResult::Victory,
                outs: 0,
                hits: 3
            })
        );

        // Terminal: nothing moves any more
        let ticks = sim.state().time_ticks;
        sim.tick(DT);
        assert_eq!(sim.state().time_ticks, ticks);
        assert!(sim.submit(Command::NextPitch).is_err());
        assert!(sim.submit(Command::TogglePause).is_err());
    }

    #[test]
    fn test_play_mode_defeat_at_five_outs() {
        let mut sim = sim(SessionSetup::Play, &[0.5]);
        let first = sim.state().opponent.clone();
        let mut pitches = 0;
        while !sim.state().is_over() {
            tick_until(&mut sim, DT, |s| {
                matches!(s.phase, Phase::Arrived(_) | Phase::GameOver { .. })
            });
            pitches += 1;
            if !sim.state().is_over() {
                sim.submit(Command::NextPitch).unwrap();
            }
        }

        assert_eq!(pitches, 15);
        assert_eq!(
            sim.state().phase,
            Phase::GameOver {
                result: GameResult::Defeat
            }
        );
        assert_eq!(sim.state().scoreboard.outs, MAX_OUTS);
        // Outs never rotate the pitcher
        assert_eq!(sim.state().opponent, first);

        let events = sim.drain_events();
        assert_eq!(
            count_events(&events, |e| matches!(e, GameEvent::GameEnded { .. })),
            1
        );
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameEnded {
                result: GameResult::Defeat,
                outs: 5,
                hits: 0
            })
        );
    }

    #[test]
    fn test_missing_pitch_data_uses_default_fastball() {
        let roster = InMemoryRoster::new(vec![RosterEntry {
            opponent: Opponent {
                velocity: 84.0,
                ..opponent(7)
            },
            pitches: Vec::new(),
        }]);
        let mut sim = Simulation::new(
            SessionSetup::Hitting(opponent(7)),
            roster,
            Settings::default(),
            ScriptedRng::new(&[0.5]),
        )
        .unwrap();
        assert!(sim.state().profiles.is_default_substitute());
        tick_until(&mut sim, DT, in_flight);
        assert_eq!(sim.state().pitch().unwrap().pitch_type(), "4SEAMFAST");
    }

    #[test]
    fn test_same_seed_same_session() {
        fn run(seed: u64) -> (Snapshot, Vec<GameEvent>) {
            let mut sim = Simulation::with_seed(
                SessionSetup::Play,
                InMemoryRoster::sample(),
                Settings::default(),
                seed,
            )
            .unwrap();
            let mut events = Vec::new();
            for i in 0..3_000 {
                if sim.state().pitch().is_some_and(|p| p.cursor.index >= 60) {
                    let _ = sim.submit(Command::Swing);
                }
                if matches!(sim.state().phase, Phase::Arrived(_)) || i % 500 == 0 {
                    let _ = sim.submit(Command::NextPitch);
                }
                sim.tick(1.0 / 60.0);
                events.extend(sim.drain_events());
            }
            (sim.snapshot(), events)
        }

        let (snap_a, events_a) = run(42);
        let (snap_b, events_b) = run(42);
        assert_eq!(snap_a, snap_b);
        assert_eq!(events_a, events_b);
        assert!(!events_a.is_empty());
    }
}
