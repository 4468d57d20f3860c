//! Odometer Animation
//!
//! Stepwise integer animation: a displayed number counts smoothly from its
//! previous value to each new target.
//!
//! # Features
//!
//! - **Step Planning**: fixed per-tick increments with floor division and a
//!   saturating clamp, so every animation lands exactly on its target
//! - **Tick Scheduler**: repeating timers with synchronous cancellation,
//!   driven manually, by wall clock, or from a background thread
//! - **Preemption**: a new target cancels the running animation before the
//!   replacement starts
//! - **Focused Snap**: fields being edited by a user jump straight to the
//!   target instead of animating
//! - **Imperative Sinks**: intermediate values go straight to the display,
//!   bypassing any host redraw cycle

pub mod animator;
pub mod config;
pub mod error;
pub mod format;
pub mod plan;
pub mod scheduler;
pub mod sink;

pub use animator::{AnimatorState, StepAnimator};
pub use config::{AnimatorConfig, DEFAULT_STEPS, DEFAULT_TICK_INTERVAL_MS};
pub use error::{ConfigError, SinkError};
pub use format::Formatter;
pub use plan::{plan, AnimationPlan, Direction, StepPlan, Ticks};
pub use scheduler::{SchedulerHandle, TickCallback, TickControl, TickScheduler, TimerId};
pub use sink::{DisplaySink, FnSink, TextBuffer, WriterSink};
