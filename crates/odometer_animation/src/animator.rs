//! Stepwise number animator
//!
//! [`StepAnimator`] counts a displayed integer from its current value toward
//! each new target, publishing every intermediate value straight to a
//! [`DisplaySink`]. It holds at most one repeating timer at a time; a new
//! target cancels the running timer before the replacement is armed.
//!
//! # Example
//!
//! ```ignore
//! use odometer_animation::{AnimatorConfig, StepAnimator, TextBuffer, TickScheduler};
//!
//! let scheduler = TickScheduler::new();
//! let field = TextBuffer::new();
//! let mut counter = StepAnimator::new(scheduler.handle(), 0, AnimatorConfig::default(), field.clone());
//!
//! counter.notify_target_changed(100, false);
//! scheduler.advance(std::time::Duration::from_millis(17 * 17));
//! assert_eq!(field.text(), "100");
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::AnimatorConfig;
use crate::error::SinkError;
use crate::format::{self, Formatter};
use crate::plan::{plan, AnimationPlan, StepPlan};
use crate::scheduler::{SchedulerHandle, TickControl, TimerId};
use crate::sink::DisplaySink;

/// Lifecycle state of a [`StepAnimator`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorState {
    /// No timer armed; the display shows the current value
    Idle,
    /// A timer is counting toward the target
    Animating,
    /// Torn down; no timer will ever be armed again
    Disposed,
}

/// State shared between the animator and its running timer
struct Counter {
    current: i64,
    sink: Box<dyn DisplaySink>,
}

impl Counter {
    fn publish(&mut self, text: &str) -> Result<(), SinkError> {
        self.sink.set_display_text(text)
    }
}

fn lock(counter: &Mutex<Counter>) -> MutexGuard<'_, Counter> {
    counter.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Animates a displayed integer toward externally supplied targets
pub struct StepAnimator {
    handle: SchedulerHandle,
    config: AnimatorConfig,
    formatter: Formatter,
    counter: Arc<Mutex<Counter>>,
    target: i64,
    timer: Option<TimerId>,
    disposed: bool,
}

impl StepAnimator {
    /// Create an animator showing `initial`
    ///
    /// Nothing is published until the first target change; hosts render
    /// [`display_text`](Self::display_text) for the initial frame.
    pub fn new<S>(handle: SchedulerHandle, initial: i64, config: AnimatorConfig, sink: S) -> Self
    where
        S: DisplaySink + 'static,
    {
        Self {
            handle,
            config,
            formatter: format::plain(),
            counter: Arc::new(Mutex::new(Counter {
                current: initial,
                sink: Box::new(sink),
            })),
            target: initial,
            timer: None,
            disposed: false,
        }
    }

    /// Replace the default formatter
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Change the formatter used from the next update on
    ///
    /// A running animation keeps formatting with the formatter it started with.
    pub fn set_formatter(&mut self, formatter: Formatter) {
        self.formatter = formatter;
    }

    /// Change steps and tick interval for subsequent animations
    pub fn set_config(&mut self, config: AnimatorConfig) {
        self.config = config;
    }

    pub fn config(&self) -> AnimatorConfig {
        self.config
    }

    /// The last value published (or the initial value)
    pub fn current_value(&self) -> i64 {
        lock(&self.counter).current
    }

    /// The most recently requested target
    pub fn target(&self) -> i64 {
        self.target
    }

    /// The formatted current value
    pub fn display_text(&self) -> String {
        (self.formatter)(self.current_value())
    }

    pub fn state(&self) -> AnimatorState {
        if self.disposed {
            AnimatorState::Disposed
        } else if self.is_animating() {
            AnimatorState::Animating
        } else {
            AnimatorState::Idle
        }
    }

    /// Check if a timer is currently counting toward the target
    pub fn is_animating(&self) -> bool {
        self.timer
            .map(|id| self.handle.is_timer_active(id))
            .unwrap_or(false)
    }

    /// React to a new target value
    ///
    /// Any running animation is cancelled first. When `focused` is set (a
    /// user is editing the field) the value snaps instead of animating.
    pub fn notify_target_changed(&mut self, new_target: i64, focused: bool) {
        if self.disposed {
            tracing::warn!(
                "StepAnimator: target change to {} after dispose ignored",
                new_target
            );
            return;
        }

        self.cancel_timer();
        self.target = new_target;

        if focused {
            tracing::debug!("StepAnimator: field focused, snapping to {}", new_target);
            self.snap_to(new_target);
            return;
        }

        let current = self.current_value();
        match plan(current, new_target, self.config.steps) {
            AnimationPlan::Settled(value) => {
                // Nothing to animate; refresh the field so it matches
                self.publish(value);
            }
            AnimationPlan::Jump(target) => {
                tracing::warn!(
                    "StepAnimator: steps = {} cannot animate, snapping to {}",
                    self.config.steps,
                    target
                );
                self.snap_to(target);
            }
            AnimationPlan::Step(step_plan) => self.start(current, step_plan),
        }
    }

    /// Cancel any animation and display `target` immediately
    pub fn snap_to(&mut self, target: i64) {
        if self.disposed {
            return;
        }
        self.cancel_timer();
        self.target = target;
        self.publish(target);
    }

    /// Release the active timer
    ///
    /// Safe to call more than once; also runs on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel_timer();
        self.disposed = true;
        tracing::debug!("StepAnimator: disposed at {}", self.current_value());
    }

    fn start(&mut self, from: i64, step_plan: StepPlan) {
        let interval = self.config.tick_interval();
        let counter = Arc::clone(&self.counter);
        let formatter = Arc::clone(&self.formatter);

        let id = self.handle.register_timer(interval, move || {
            let mut counter = lock(&counter);
            let value = step_plan.advance(counter.current);
            counter.current = value;
            tracing::trace!("StepAnimator: tick {}", value);

            match counter.publish(&formatter(value)) {
                Ok(()) => {}
                Err(SinkError::Unavailable) => {
                    tracing::debug!("StepAnimator: display sink gone, stopping at {}", value);
                    return TickControl::Stop;
                }
                Err(err) => {
                    tracing::warn!("StepAnimator: skipped display update: {}", err);
                }
            }

            if step_plan.is_complete(value) {
                tracing::debug!("StepAnimator: reached {}", value);
                TickControl::Stop
            } else {
                TickControl::Continue
            }
        });

        match id {
            Some(id) => {
                tracing::debug!(
                    "StepAnimator: animating {} -> {} by {} every {:?} ({} ticks)",
                    from,
                    step_plan.target(),
                    step_plan.step_size(),
                    interval,
                    step_plan.tick_count(from)
                );
                self.timer = Some(id);
            }
            None => {
                tracing::warn!("StepAnimator: scheduler gone, snapping to {}", step_plan.target());
                self.publish(step_plan.target());
            }
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(id) = self.timer.take() {
            if self.handle.cancel_timer(id) {
                tracing::debug!("StepAnimator: cancelled running animation");
            }
        }
    }

    fn publish(&mut self, value: i64) {
        let text = (self.formatter)(value);
        let mut counter = lock(&self.counter);
        counter.current = value;
        if let Err(err) = counter.publish(&text) {
            tracing::debug!("StepAnimator: display update for {} dropped: {}", value, err);
        }
    }
}

impl Drop for StepAnimator {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TickScheduler;
    use crate::sink::TextBuffer;
    use std::time::Duration;

    const TICK: Duration = Duration::from_millis(17);

    fn setup(initial: i64) -> (TickScheduler, TextBuffer, StepAnimator) {
        let scheduler = TickScheduler::new();
        let buffer = TextBuffer::new();
        let animator = StepAnimator::new(
            scheduler.handle(),
            initial,
            AnimatorConfig::default(),
            buffer.clone(),
        );
        (scheduler, buffer, animator)
    }

    fn history_values(buffer: &TextBuffer) -> Vec<i64> {
        buffer
            .history()
            .iter()
            .map(|text| text.parse().unwrap())
            .collect()
    }

    #[test]
    fn test_initial_display() {
        let (_scheduler, buffer, animator) = setup(42);
        assert_eq!(animator.display_text(), "42");
        assert_eq!(animator.current_value(), 42);
        assert_eq!(animator.state(), AnimatorState::Idle);
        assert_eq!(buffer.update_count(), 0);
    }

    #[test]
    fn test_counts_up_to_target() {
        let (scheduler, buffer, mut animator) = setup(0);

        animator.notify_target_changed(100, false);
        assert_eq!(animator.state(), AnimatorState::Animating);
        assert_eq!(buffer.update_count(), 0);

        scheduler.advance(TICK * 16);
        assert_eq!(buffer.update_count(), 16);
        assert_eq!(animator.current_value(), 96);
        assert!(animator.is_animating());

        scheduler.advance(TICK);
        let mut expected: Vec<i64> = (1..=16).map(|i| i * 6).collect();
        expected.push(100);
        assert_eq!(history_values(&buffer), expected);
        assert_eq!(animator.state(), AnimatorState::Idle);
        assert_eq!(scheduler.timer_count(), 0);

        // Nothing more fires once complete
        scheduler.advance(TICK * 10);
        assert_eq!(buffer.update_count(), 17);
    }

    #[test]
    fn test_counts_down_to_target() {
        let (scheduler, buffer, mut animator) = setup(50);

        animator.notify_target_changed(0, false);
        scheduler.advance(TICK * 100);

        let values = history_values(&buffer);
        assert_eq!(values.first(), Some(&46));
        assert_eq!(values.last(), Some(&0));
        assert!(values.windows(2).all(|w| w[1] - w[0] == -4 || w[1] == 0));
        assert!(values.iter().all(|v| *v >= 0));
        assert_eq!(buffer.text(), "0");
    }

    #[test]
    fn test_preemption_before_first_tick() {
        let (scheduler, buffer, mut animator) = setup(0);

        animator.notify_target_changed(100, false);
        animator.notify_target_changed(50, false);
        assert_eq!(scheduler.timer_count(), 1);

        scheduler.advance(TICK * 100);

        let values = history_values(&buffer);
        assert_eq!(values.last(), Some(&50));
        assert!(values.iter().all(|v| *v <= 50));
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(animator.target(), 50);
    }

    #[test]
    fn test_preemption_mid_flight_reverses() {
        let (scheduler, buffer, mut animator) = setup(0);

        animator.notify_target_changed(100, false);
        scheduler.advance(TICK * 5);
        assert_eq!(animator.current_value(), 30);

        animator.notify_target_changed(10, false);
        buffer.clear_history();
        scheduler.advance(TICK * 100);

        let values = history_values(&buffer);
        // floor(-20 / 15) = -2
        assert_eq!(values.first(), Some(&28));
        assert_eq!(values.last(), Some(&10));
        assert!(values.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(scheduler.timer_count(), 0);
    }

    #[test]
    fn test_focused_snap() {
        let (scheduler, buffer, mut animator) = setup(0);

        animator.notify_target_changed(100, false);
        scheduler.advance(TICK * 3);
        buffer.clear_history();

        animator.notify_target_changed(77, true);
        assert_eq!(buffer.history(), vec!["77"]);
        assert_eq!(animator.current_value(), 77);
        assert_eq!(animator.state(), AnimatorState::Idle);
        assert_eq!(scheduler.timer_count(), 0);

        scheduler.advance(TICK * 20);
        assert_eq!(buffer.history(), vec!["77"]);
    }

    #[test]
    fn test_focused_snap_when_already_at_target() {
        let (_scheduler, buffer, mut animator) = setup(77);
        animator.notify_target_changed(77, true);
        assert_eq!(buffer.history(), vec!["77"]);
    }

    #[test]
    fn test_same_target_is_noop() {
        let (scheduler, buffer, mut animator) = setup(12);

        animator.notify_target_changed(12, false);
        assert_eq!(scheduler.timer_count(), 0);
        assert_eq!(animator.state(), AnimatorState::Idle);
        assert_eq!(animator.current_value(), 12);
        // Refreshed once, never ticked
        assert_eq!(buffer.history(), vec!["12"]);
    }

    #[test]
    fn test_degenerate_steps_snap() {
        let (scheduler, buffer, mut animator) = setup(0);
        animator.set_config(AnimatorConfig::default().with_steps(0));

        animator.notify_target_changed(500, false);
        assert_eq!(buffer.history(), vec!["500"]);
        assert_eq!(scheduler.timer_count(), 0);
        assert_eq!(animator.current_value(), 500);
    }

    #[test]
    fn test_dispose_stops_updates() {
        let (scheduler, buffer, mut animator) = setup(0);

        animator.notify_target_changed(100, false);
        scheduler.advance(TICK * 2);
        animator.dispose();

        assert_eq!(animator.state(), AnimatorState::Disposed);
        assert_eq!(scheduler.timer_count(), 0);

        let count = buffer.update_count();
        scheduler.advance(TICK * 50);
        assert_eq!(buffer.update_count(), count);

        // Later notifications are ignored
        animator.notify_target_changed(5, false);
        animator.notify_target_changed(5, true);
        assert_eq!(buffer.update_count(), count);

        // Idempotent
        animator.dispose();
        assert_eq!(animator.state(), AnimatorState::Disposed);
    }

    #[test]
    fn test_drop_cancels_timer() {
        let scheduler = TickScheduler::new();
        let buffer = TextBuffer::new();
        {
            let mut animator = StepAnimator::new(
                scheduler.handle(),
                0,
                AnimatorConfig::default(),
                buffer.clone(),
            );
            animator.notify_target_changed(1000, false);
            assert_eq!(scheduler.timer_count(), 1);
        }
        assert_eq!(scheduler.timer_count(), 0);
        scheduler.advance(TICK * 10);
        assert_eq!(buffer.update_count(), 0);
    }

    #[test]
    fn test_unavailable_sink_stops_animation() {
        let (scheduler, buffer, mut animator) = setup(0);

        animator.notify_target_changed(100, false);
        scheduler.advance(TICK * 2);
        buffer.detach();

        scheduler.advance(TICK);
        assert_eq!(scheduler.timer_count(), 0);
        assert_eq!(animator.state(), AnimatorState::Idle);
        assert_eq!(buffer.update_count(), 2);
    }

    #[test]
    fn test_failing_sink_keeps_counting() {
        struct Flaky {
            calls: usize,
            shown: Arc<Mutex<Vec<String>>>,
        }

        impl DisplaySink for Flaky {
            fn set_display_text(&mut self, text: &str) -> Result<(), SinkError> {
                self.calls += 1;
                if self.calls % 2 == 0 {
                    return Err(SinkError::Io("busy".into()));
                }
                self.shown.lock().unwrap().push(text.to_string());
                Ok(())
            }
        }

        let scheduler = TickScheduler::new();
        let shown = Arc::new(Mutex::new(Vec::new()));
        let mut animator = StepAnimator::new(
            scheduler.handle(),
            0,
            AnimatorConfig::default().with_steps(5),
            Flaky {
                calls: 0,
                shown: Arc::clone(&shown),
            },
        );

        animator.notify_target_changed(5, false);
        scheduler.advance(TICK * 10);

        assert_eq!(animator.current_value(), 5);
        assert_eq!(*shown.lock().unwrap(), vec!["1", "3", "5"]);
    }

    #[test]
    fn test_custom_formatter() {
        let scheduler = TickScheduler::new();
        let buffer = TextBuffer::new();
        let mut animator = StepAnimator::new(
            scheduler.handle(),
            0,
            AnimatorConfig::default().with_steps(1),
            buffer.clone(),
        )
        .with_formatter(format::grouped(","));

        animator.notify_target_changed(1_500_000, false);
        scheduler.advance(TICK);
        assert_eq!(buffer.text(), "1,500,000");
        assert_eq!(animator.display_text(), "1,500,000");
    }

    #[test]
    fn test_config_applies_to_next_plan() {
        let (scheduler, buffer, mut animator) = setup(0);

        animator.set_config(AnimatorConfig::new(2, Duration::from_millis(50)));
        animator.notify_target_changed(10, false);

        scheduler.advance(Duration::from_millis(49));
        assert_eq!(buffer.update_count(), 0);
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(buffer.text(), "5");
        scheduler.advance(Duration::from_millis(50));
        assert_eq!(buffer.text(), "10");
        assert_eq!(animator.state(), AnimatorState::Idle);
    }

    #[test]
    fn test_dead_scheduler_snaps() {
        let buffer = TextBuffer::new();
        let handle = TickScheduler::new().handle();
        let mut animator =
            StepAnimator::new(handle, 0, AnimatorConfig::default(), buffer.clone());

        animator.notify_target_changed(30, false);
        assert_eq!(buffer.history(), vec!["30"]);
        assert_eq!(animator.state(), AnimatorState::Idle);
    }

    #[test]
    fn test_snap_to() {
        let (scheduler, buffer, mut animator) = setup(0);
        animator.notify_target_changed(100, false);
        scheduler.advance(TICK);

        animator.snap_to(100);
        assert_eq!(scheduler.timer_count(), 0);
        assert_eq!(buffer.history(), vec!["6", "100"]);
        assert_eq!(animator.target(), 100);
    }
}
