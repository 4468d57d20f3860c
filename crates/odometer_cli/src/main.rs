//! Odometer CLI
//!
//! Count a number from one value to another on the terminal, or print the
//! tick sequence an animation would publish.

use anyhow::Result;
use clap::{Parser, Subcommand};
use odometer_animation::{plan, AnimationPlan, StepAnimator, TickScheduler, WriterSink};
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::OdometerConfig;

/// How often the main thread checks whether the animation finished
const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Parser)]
#[command(name = "odometer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Animate a number counting toward a target", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./odometer.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate from one value to another on stdout
    Count {
        /// Starting value
        #[arg(allow_negative_numbers = true)]
        from: i64,

        /// Target value
        #[arg(allow_negative_numbers = true)]
        to: i64,

        /// Number of ticks to spread the animation over
        #[arg(short, long, allow_negative_numbers = true)]
        steps: Option<i64>,

        /// Milliseconds between ticks
        #[arg(short, long)]
        interval: Option<u64>,

        /// Thousands separator
        #[arg(long)]
        separator: Option<String>,

        /// Switch to a new target while the first animation runs
        #[arg(long, allow_negative_numbers = true)]
        retarget: Option<i64>,

        /// Milliseconds to wait before retargeting
        #[arg(long, default_value = "100")]
        after: u64,

        /// Treat the field as focused (snap instead of animating)
        #[arg(long)]
        focused: bool,
    },

    /// Print the values an animation would publish
    Plan {
        /// Starting value
        #[arg(allow_negative_numbers = true)]
        from: i64,

        /// Target value
        #[arg(allow_negative_numbers = true)]
        to: i64,

        /// Number of ticks to spread the animation over
        #[arg(short, long, allow_negative_numbers = true)]
        steps: Option<i64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout carries the counter line, keep logs off it
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let mut config = OdometerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Count {
            from,
            to,
            steps,
            interval,
            separator,
            retarget,
            after,
            focused,
        } => {
            if let Some(steps) = steps {
                config.animation.steps = steps;
            }
            if let Some(interval) = interval {
                config.animation.tick_interval_ms = interval;
            }
            if separator.is_some() {
                config.display.separator = separator;
            }
            let retarget = retarget.map(|value| (value, Duration::from_millis(after)));
            cmd_count(&config, from, to, retarget, focused)
        }

        Commands::Plan { from, to, steps } => {
            if let Some(steps) = steps {
                config.animation.steps = steps;
            }
            cmd_plan(&config, from, to)
        }
    }
}

fn cmd_count(
    config: &OdometerConfig,
    from: i64,
    to: i64,
    retarget: Option<(i64, Duration)>,
    focused: bool,
) -> Result<()> {
    if let Err(err) = config.animation.validate() {
        warn!("{}; the value will jump straight to its target", err);
    }

    let mut scheduler = TickScheduler::new();
    scheduler.start_background();

    let mut animator = StepAnimator::new(
        scheduler.handle(),
        from,
        config.animation,
        WriterSink::new(io::stdout()),
    )
    .with_formatter(config.display.formatter());

    // Initial frame
    animator.snap_to(from);

    debug!("Counting {} -> {}", from, to);
    animator.notify_target_changed(to, focused);

    if let Some((target, delay)) = retarget {
        thread::sleep(delay);
        info!("Retargeting to {} at {}", target, animator.current_value());
        animator.notify_target_changed(target, focused);
    }

    while animator.is_animating() {
        thread::sleep(POLL_INTERVAL);
    }
    println!();

    animator.dispose();
    scheduler.stop_background();
    Ok(())
}

fn cmd_plan(config: &OdometerConfig, from: i64, to: i64) -> Result<()> {
    let formatter = config.display.formatter();
    let steps = config.animation.steps;

    match plan(from, to, steps) {
        AnimationPlan::Settled(value) => {
            println!("Already at {}; no ticks needed", formatter(value));
        }
        AnimationPlan::Jump(target) => {
            println!(
                "steps = {} cannot animate; jumps straight to {}",
                steps,
                formatter(target)
            );
        }
        AnimationPlan::Step(step_plan) => {
            let ticks = step_plan.tick_count(from);
            let duration = config
                .animation
                .tick_interval()
                .saturating_mul(u32::try_from(ticks).unwrap_or(u32::MAX));

            println!("Step size: {}", step_plan.step_size());
            println!("Ticks:     {}", ticks);
            println!("Duration:  {:?}", duration);
            println!();
            for (i, value) in step_plan.ticks(from).enumerate() {
                println!("{:>6}  {}", i + 1, formatter(value));
            }
        }
    }

    Ok(())
}
