//! Strike Zone headless driver
//!
//! Runs a session against the simulation with a simple autoplayer standing in
//! for the player, logging events as they happen and printing the final
//! snapshot as JSON.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use strike_zone::consts::{
    STRIKE_ZONE_BOTTOM_FT, STRIKE_ZONE_LEFT_FT, STRIKE_ZONE_RIGHT_FT, STRIKE_ZONE_TOP_FT,
};
use strike_zone::sim::{Command, GameEvent, GameState, Phase, SessionSetup, Simulation};
use strike_zone::{GameClock, InMemoryRoster, RosterProvider, Settings, SimError};

/// Safety net for fixed-step runs
const MAX_TICKS_PER_PITCH: u64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Pitching,
    Hitting,
    Play,
}

/// Real-time pitch simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game mode
    #[arg(short, long, value_enum, default_value_t = Mode::Hitting)]
    mode: Mode,

    /// RNG seed (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Settings JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Roster JSON (defaults to the built-in roster)
    #[arg(short, long)]
    roster: Option<PathBuf>,

    /// Pitcher to face in pitching/hitting mode (defaults to the first on the roster)
    #[arg(short, long)]
    opponent: Option<u32>,

    /// Pace ticks against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Stop after this many pitches have reached the plate
    #[arg(long, default_value_t = 20)]
    max_pitches: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Stand-in player
struct Autoplayer {
    rng: Pcg32,
    /// Fraction of the flight at which to swing; None = take the pitch
    swing_plan: Option<Option<f64>>,
    pitches_selected: usize,
}

impl Autoplayer {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed_ba11),
            swing_plan: None,
            pitches_selected: 0,
        }
    }

    fn act<P: RosterProvider, R: Rng>(&mut self, sim: &mut Simulation<P, R>) {
        let commands = self.plan(sim.state());
        for command in commands {
            match sim.submit(command) {
                Ok(()) => {}
                Err(e) if e.is_rejection() => log::debug!("Autoplayer: {}", e),
                Err(e) => log::warn!("Autoplayer: {}", e),
            }
        }
    }

    fn plan(&mut self, state: &GameState) -> Vec<Command> {
        let automatic = state.mode.is_automatic();

        match &state.phase {
            Phase::InFlight(pitch) if automatic && pitch.swing.is_none() => {
                let rng = &mut self.rng;
                let plan = *self.swing_plan.get_or_insert_with(|| {
                    (rng.random::<f64>() >= 0.25).then(|| rng.random_range(0.8..1.02))
                });
                let progress =
                    pitch.cursor.index as f64 / pitch.trajectory.last_index().max(1) as f64;
                match plan {
                    Some(at) if progress >= at => vec![Command::Swing],
                    _ => Vec::new(),
                }
            }
            Phase::Arrived(_) if automatic => {
                self.swing_plan = None;
                vec![Command::NextPitch]
            }
            Phase::Idle | Phase::Arrived(_) => {
                let n = self.pitches_selected % state.profiles.len().max(1) + 1;
                self.pitches_selected += 1;
                state
                    .profiles
                    .name_at(n)
                    .map(|name| vec![Command::SelectPitch(name.to_string())])
                    .unwrap_or_default()
            }
            Phase::Aiming { .. } => {
                let lateral = self.rng.random_range(STRIKE_ZONE_LEFT_FT..STRIKE_ZONE_RIGHT_FT);
                let vertical = self.rng.random_range(STRIKE_ZONE_BOTTOM_FT..STRIKE_ZONE_TOP_FT);
                vec![Command::AimAt { lateral, vertical }, Command::TriggerAim]
            }
            // Sometimes fire early instead of waiting for the circle to close
            Phase::AimLocked { lock, .. } if lock.radius < 0.6 && self.rng.random::<f64>() < 0.05 => {
                vec![Command::TriggerAim]
            }
            _ => Vec::new(),
        }
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::PitchThrown {
            pitch_type,
            speed_mph,
        } => log::info!("Pitch: {} {:.1} mph", pitch_type, speed_mph),
        GameEvent::PitchArrived { classification } => {
            log::info!("Arrived: {}", classification.as_str())
        }
        GameEvent::PitchCalled { outcome } | GameEvent::SwingResolved { outcome, .. } => {
            log::info!("Result: {}", outcome.label())
        }
        GameEvent::AtBatReset => log::info!("New at-bat"),
        GameEvent::OpponentChanged { opponent, profiles } => log::info!(
            "Next pitcher: {} ({})",
            opponent.name,
            profiles.names().collect::<Vec<_>>().join(", ")
        ),
        GameEvent::GameEnded { result, outs, hits } => {
            log::info!("{} hits: {}, outs: {}", result.as_str(), hits, outs)
        }
        GameEvent::Paused(paused) => log::info!("Paused: {}", paused),
    }
}

fn run(args: Args) -> Result<(), SimError> {
    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let roster = match &args.roster {
        Some(path) => InMemoryRoster::load(path)?,
        None => InMemoryRoster::sample(),
    };

    let seed = args.seed.or(settings.seed).unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    });
    log::info!("Seed: {}", seed);

    let setup = match args.mode {
        Mode::Play => SessionSetup::Play,
        mode => {
            let opponents = roster.opponents();
            let opponent = match args.opponent {
                Some(id) => opponents.into_iter().find(|o| o.id == id),
                None => opponents.into_iter().next(),
            }
            .ok_or(SimError::InsufficientRoster {
                needed: 1,
                available: 0,
            })?;
            if mode == Mode::Pitching {
                SessionSetup::Pitching(opponent)
            } else {
                SessionSetup::Hitting(opponent)
            }
        }
    };

    let fixed_dt = settings.tick_dt();
    let mut clock = GameClock::new(settings.tick_rate_hz);
    let mut sim = Simulation::with_seed(setup, roster, settings, seed)?;
    let mut player = Autoplayer::new(seed);

    let tick_budget = u64::from(args.max_pitches.max(1)) * MAX_TICKS_PER_PITCH;
    let mut arrived = 0;
    clock.start(Instant::now());

    while !sim.state().is_over() && arrived < args.max_pitches {
        if sim.state().time_ticks >= tick_budget {
            log::warn!("Tick budget exhausted after {} pitches", arrived);
            break;
        }

        player.act(&mut sim);

        let dt = if args.realtime {
            std::thread::sleep(clock.tick_interval());
            let now = Instant::now();
            clock.sync_paused(sim.state().paused, now);
            clock.next_delta(now).unwrap_or(0.0)
        } else {
            fixed_dt
        };
        sim.tick(dt);

        for event in sim.drain_events() {
            if matches!(event, GameEvent::PitchArrived { .. }) {
                arrived += 1;
            }
            log_event(&event);
        }
    }

    println!("{}", serde_json::to_string_pretty(&sim.snapshot())?);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::info!("Strike Zone starting...");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
