/*!
 * memtrim - Main Entry Point
 *
 * - `stats`: print the memory cards once
 * - `clean`: run one clean and print its summary
 * - `watch`: sample every second, auto-clean above a threshold, Enter cleans
 */

use clap::{Args, Parser, Subcommand, ValueEnum};
use memtrim::core::errors::CleanerResult;
use memtrim::monitoring::{
    cards_from, ActivityLog, ConsoleDisplay, ConsoleLogSink, Monitor,
};
use memtrim::reclaim::{summary_lines, CleanDispatcher, CleanStep, FallbackPolicy, ReclaimError};
use memtrim::{
    init_tracing, platform, CleanOptions, CleanerConfig, ReclaimController, StatsProvider,
    SystemStats, TrimPlatform,
};
use std::io::BufRead;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "memtrim", version, about = "Live memory statistics and working-set trimming")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print current memory usage
    Stats {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run one clean and report its effect
    Clean {
        #[command(flatten)]
        selection: Selection,
        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Monitor memory every second; press Enter to clean
    Watch {
        #[command(flatten)]
        selection: Selection,
        /// Clean automatically above the threshold
        #[arg(long)]
        auto: bool,
        /// Auto-clean threshold in percent (50-95)
        #[arg(long)]
        threshold: Option<u8>,
    },
}

#[derive(Args, Debug)]
struct Selection {
    /// Steps to run (default: working-set, system-working-set, standby-list)
    #[arg(long, value_enum, value_delimiter = ',')]
    steps: Option<Vec<StepArg>>,
    /// Steps to leave out
    #[arg(long, value_enum, value_delimiter = ',')]
    skip: Vec<StepArg>,
    /// Count a failed system working-set call as failed
    #[arg(long)]
    strict_fallback: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StepArg {
    WorkingSet,
    SystemWorkingSet,
    StandbyList,
    VirtualMemory,
}

impl From<StepArg> for CleanStep {
    fn from(arg: StepArg) -> Self {
        match arg {
            StepArg::WorkingSet => CleanStep::WorkingSet,
            StepArg::SystemWorkingSet => CleanStep::SystemWorkingSet,
            StepArg::StandbyList => CleanStep::StandbyList,
            StepArg::VirtualMemory => CleanStep::VirtualMemory,
        }
    }
}

impl Selection {
    fn apply(&self, config: &mut CleanerConfig) {
        let mut options = match &self.steps {
            Some(steps) => steps.iter().map(|s| CleanStep::from(*s)).collect(),
            None => config.options,
        };
        for step in &self.skip {
            options.set(CleanStep::from(*step), false);
        }
        config.options = options;
        if self.strict_fallback {
            config.fallback = FallbackPolicy::Strict;
        }
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = CleanerConfig::from_env()?;

    let stats: Arc<dyn StatsProvider> = Arc::new(SystemStats::new());
    let platform = platform::native();

    match cli.command {
        Command::Stats { json } => print_stats(stats.as_ref(), json)?,
        Command::Clean { selection, json } => {
            selection.apply(&mut config);
            run_clean(config, stats, platform, json).await?;
        }
        Command::Watch {
            selection,
            auto,
            threshold,
        } => {
            selection.apply(&mut config);
            if auto {
                config.auto_clean.enabled = true;
            }
            if let Some(threshold) = threshold {
                config.auto_clean.threshold_percent = threshold;
            }
            config.validate()?;
            run_watch(config, stats, platform).await;
        }
    }

    Ok(())
}

fn print_stats(stats: &dyn StatsProvider, json: bool) -> CleanerResult<()> {
    let snapshot = stats.snapshot()?;
    let cards = cards_from(&snapshot);
    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
    } else {
        for card in &cards {
            println!("{} [{:?}]", card, card.level());
        }
        println!("Pressure: {}", snapshot.pressure());
    }
    Ok(())
}

/// Log the elevation state once at startup
fn check_elevation(platform: &dyn TrimPlatform, log: &ActivityLog) -> bool {
    log.log("Checking administrator privileges...");
    let elevated = platform.is_elevated();
    if elevated {
        log.log("✓ Running with administrator privileges - full clean available");
    } else {
        warn!("not elevated, clean effect may be limited");
        log.log("⚠ Not running with administrator privileges - clean effect may be limited");
    }
    elevated
}

fn controller(
    config: &CleanerConfig,
    stats: Arc<dyn StatsProvider>,
    platform: Arc<dyn TrimPlatform>,
    log: ActivityLog,
) -> ReclaimController {
    ReclaimController::new(stats, platform, log)
        .with_pacing(config.pacing)
        .with_fallback(config.fallback)
}

async fn run_clean(
    config: CleanerConfig,
    stats: Arc<dyn StatsProvider>,
    platform: Arc<dyn TrimPlatform>,
    json: bool,
) -> CleanerResult<()> {
    let log = if json {
        ActivityLog::discard()
    } else {
        ActivityLog::new(Arc::new(ConsoleLogSink))
    };
    let elevated = check_elevation(platform.as_ref(), &log);
    let controller = controller(&config, stats, platform, log.clone());

    let options: CleanOptions = config.options;
    let result = tokio::task::spawn_blocking(move || controller.clean(options))
        .await
        .map_err(|e| ReclaimError::Worker(e.to_string()))??;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        log.log_all(summary_lines(&result, elevated));
    }
    Ok(())
}

async fn run_watch(
    config: CleanerConfig,
    stats: Arc<dyn StatsProvider>,
    platform: Arc<dyn TrimPlatform>,
) {
    let log = ActivityLog::new(Arc::new(ConsoleLogSink));
    log.log("Starting memory monitor...");
    let elevated = check_elevation(platform.as_ref(), &log);

    let controller = Arc::new(controller(&config, Arc::clone(&stats), platform, log.clone()));
    let (dispatcher, events) = CleanDispatcher::new(controller);

    let monitor = Monitor::new(
        stats,
        Arc::new(dispatcher),
        Box::new(ConsoleDisplay),
        log.clone(),
        elevated,
    )
    .with_options(config.options)
    .with_auto_clean(config.auto_clean);

    let handle = monitor.handle();
    let stdin_spawn = std::thread::Builder::new()
        .name("memtrim-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if line.is_err() {
                    break;
                }
                handle.request_clean();
            }
        });
    if let Err(e) = stdin_spawn {
        warn!(error = %e, "manual clean input unavailable");
    }

    log.log("Monitor ready - press Enter to clean, Ctrl+C to exit");
    info!(
        auto = config.auto_clean.enabled,
        threshold = config.auto_clean.threshold_percent,
        "watching memory"
    );

    monitor
        .run(events, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
}
