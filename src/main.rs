//! # Onslaught Simulator
//!
//! Runs the progression engine headless: levels are generated, started and ticked at a
//! fixed rate while a simulated player destroys whatever spawns.

use clap::Parser;
use onslaught::{
    config, Collaborators, GamePhase, GameplaySignal, LevelStep, LevelTypeTag, OnslaughtError,
    OnslaughtResult, ProgressionConfig, ProgressionController, ProgressionStatistics,
    ProgressionTier, SequenceScheduler, UnitRole,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Command line arguments for the simulator.
#[derive(Parser, Debug)]
#[command(name = "onslaught")]
#[command(about = "Simulates wave-based level progression headless")]
#[command(version)]
struct Args {
    /// Random seed for level selection and jitter
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of levels to play
    #[arg(short, long, default_value_t = 5)]
    levels: u32,

    /// Tier to start at
    #[arg(long)]
    start_tier: Option<i64>,

    /// Generate only this level type (e.g. horde, invasion, shooter-boss, comet)
    #[arg(long)]
    force_type: Option<String>,

    /// JSON progression config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulated frame length in milliseconds
    #[arg(long, default_value_t = 1000 / config::TARGET_FPS)]
    tick_ms: u64,

    /// Simulated seconds after which a level is abandoned
    #[arg(long, default_value_t = 900)]
    max_level_seconds: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

/// Outcome of one simulated level.
#[derive(Debug, Serialize)]
struct LevelSummary {
    tier: u32,
    level_type: LevelTypeTag,
    seconds: f32,
    spawned: u32,
    destroyed: u32,
    currency: f32,
    degraded: bool,
    completed: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    levels: Vec<LevelSummary>,
    statistics: ProgressionStatistics,
}

/// Kill scheduled by the simulated player.
struct PendingKill {
    remaining: Duration,
    signal: GameplaySignal,
}

fn main() -> OnslaughtResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;
    log::info!("Starting Onslaught simulator v{}", onslaught::VERSION);

    let config = build_config(&args)?;
    let mut controller =
        ProgressionController::new(config, SequenceScheduler::new(), Collaborators::headless())?;
    controller.generate_next_level()?;

    let tick = Duration::from_millis(args.tick_ms.max(1));
    let budget = Duration::from_secs(args.max_level_seconds);
    let mut levels = Vec::new();

    for _ in 0..args.levels {
        let summary = play_level(&mut controller, tick, budget)?;
        if !args.json {
            print_summary(&summary);
        }
        let completed = summary.completed;
        levels.push(summary);
        if !completed {
            log::warn!("Stopping: level did not complete within {budget:?}");
            break;
        }
    }

    let run = RunSummary {
        levels,
        statistics: controller.statistics().clone(),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        println!(
            "\n{} levels completed, {} bosses defeated, {:.0} currency awarded, {} degraded",
            run.statistics.levels_completed,
            run.statistics.bosses_defeated,
            run.statistics.currency_awarded,
            run.statistics.degraded_levels
        );
    }
    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> OnslaughtResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        let level = match log_level.to_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "info" => tracing::Level::INFO,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        let filter = log_level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info);
        env_logger::Builder::new()
            .filter_level(filter)
            .format_target(false)
            .try_init()
            .map_err(|err| OnslaughtError::Configuration(format!("logging: {err}")))?;
    }

    Ok(())
}

/// Merges the config file with command line overrides.
fn build_config(args: &Args) -> OnslaughtResult<ProgressionConfig> {
    let mut config = match &args.config {
        Some(path) => ProgressionConfig::load_from_json(path)?,
        None => ProgressionConfig::default(),
    };

    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(tier) = args.start_tier {
        config.starting_tier = ProgressionTier::try_new(tier)?;
    }
    if let Some(name) = &args.force_type {
        config = config.with_forced_level_type(name.parse()?);
    }

    config.validate()?;
    Ok(config)
}

/// Plays the current level until it completes or the time budget runs out.
fn play_level(
    controller: &mut ProgressionController<SequenceScheduler>,
    tick: Duration,
    budget: Duration,
) -> OnslaughtResult<LevelSummary> {
    let tier = controller.progression_tier();
    controller.game_state_mut().change_state(GamePhase::LevelIn);
    controller.start_level()?;

    let mut kills: Vec<PendingKill> = Vec::new();
    let mut clock = Duration::ZERO;
    let mut completed = false;

    'frames: while clock < budget {
        clock += tick;
        if controller.update(tick)? == LevelStep::Complete {
            completed = true;
            break;
        }

        for record in controller.spawner_mut().drain_spawned() {
            if let Some(kill) = plan_kill(record.role) {
                kills.push(kill);
            }
        }

        let mut due = Vec::new();
        kills.retain_mut(|kill| {
            kill.remaining = kill.remaining.saturating_sub(tick);
            if kill.remaining.is_zero() {
                due.push(kill.signal);
                false
            } else {
                true
            }
        });
        for signal in due {
            if controller.notify(signal)? == LevelStep::Complete {
                completed = true;
                break 'frames;
            }
        }
    }

    controller.spawner_mut().drain_spawned();
    let level = controller
        .level_registry()
        .get(tier.index())
        .ok_or_else(|| OnslaughtError::InvalidState(format!("tier {tier} vanished")))?;

    Ok(LevelSummary {
        tier: tier.get(),
        level_type: level.tag(),
        seconds: level.elapsed().as_secs_f32(),
        spawned: level.spawned_units(),
        destroyed: level.destroyed_units(),
        currency: if completed { level.params().currency_drop() } else { 0.0 },
        degraded: level.degraded_reason().is_some(),
        completed,
    })
}

/// How long the simulated player takes to destroy each kind of unit.
fn plan_kill(role: UnitRole) -> Option<PendingKill> {
    let (millis, signal) = match role {
        UnitRole::Enemy => (1_200, GameplaySignal::EnemyDestroyed),
        UnitRole::Invader => (2_000, GameplaySignal::InvaderDestroyed),
        UnitRole::Boss => (12_000, GameplaySignal::BossDefeated),
        UnitRole::Comet => (3_000, GameplaySignal::CometDestroyed),
        UnitRole::Defender | UnitRole::Minion | UnitRole::Escort => return None,
    };
    Some(PendingKill {
        remaining: Duration::from_millis(millis),
        signal,
    })
}

fn print_summary(summary: &LevelSummary) {
    println!(
        "tier {:>3}  {:<16} {:>7.1}s  spawned {:>4}  destroyed {:>4}  currency {:>9.0}{}{}",
        summary.tier,
        summary.level_type.to_string(),
        summary.seconds,
        summary.spawned,
        summary.destroyed,
        summary.currency,
        if summary.degraded { "  [degraded]" } else { "" },
        if summary.completed { "" } else { "  [abandoned]" },
    );
}
