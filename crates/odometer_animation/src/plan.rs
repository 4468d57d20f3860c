//! Step planning
//!
//! Turns a `(current, target, steps)` triple into a fixed per-tick increment
//! plus a saturating clamp bound to the target. Plans are immutable; a new one
//! is derived every time the target changes.
//!
//! Division uses floor semantics (toward negative infinity), so a descending
//! gap that does not divide evenly still rounds *away* from zero and every
//! tick moves at least one unit in the direction of travel.

/// Direction of travel from the current value toward the target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Counting up (`target > current`)
    Up,
    /// Counting down (`target < current`)
    Down,
}

impl Direction {
    /// `+1` for [`Direction::Up`], `-1` for [`Direction::Down`]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

/// Outcome of planning a move from one value to another
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationPlan {
    /// Already at the target; zero ticks are needed
    Settled(i64),
    /// Degenerate configuration (`steps <= 0`); display the target at once
    Jump(i64),
    /// A stepwise animation toward the target
    Step(StepPlan),
}

impl AnimationPlan {
    /// The value this plan ends on
    pub fn target(&self) -> i64 {
        match self {
            AnimationPlan::Settled(value) | AnimationPlan::Jump(value) => *value,
            AnimationPlan::Step(plan) => plan.target,
        }
    }

    /// Number of timer ticks this plan needs when started from `from`
    pub fn tick_count(&self, from: i64) -> u64 {
        match self {
            AnimationPlan::Settled(_) | AnimationPlan::Jump(_) => 0,
            AnimationPlan::Step(plan) => plan.tick_count(from),
        }
    }
}

/// Per-tick increment and clamp rule for one animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepPlan {
    direction: Direction,
    step_size: i64,
    target: i64,
}

impl StepPlan {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Signed change applied per tick; never zero
    pub fn step_size(&self) -> i64 {
        self.step_size
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    /// Saturate `value` at the target in the direction of travel
    pub fn clamp(&self, value: i64) -> i64 {
        match self.direction {
            Direction::Up => value.min(self.target),
            Direction::Down => value.max(self.target),
        }
    }

    /// Compute the value published by the next tick
    pub fn advance(&self, value: i64) -> i64 {
        self.clamp(value.saturating_add(self.step_size))
    }

    /// Whether `value` has reached (or passed) the target
    pub fn is_complete(&self, value: i64) -> bool {
        match self.direction {
            Direction::Up => value >= self.target,
            Direction::Down => value <= self.target,
        }
    }

    /// Number of ticks needed to converge when starting from `from`
    pub fn tick_count(&self, from: i64) -> u64 {
        if self.is_complete(from) {
            return 0;
        }

        let gap = (self.target as i128 - from as i128).unsigned_abs();
        let step = (self.step_size as i128).unsigned_abs();
        let count = gap.div_ceil(step);
        u64::try_from(count).unwrap_or(u64::MAX)
    }

    /// Iterate over every value the animation publishes, starting after `from`
    pub fn ticks(&self, from: i64) -> Ticks {
        Ticks {
            plan: *self,
            value: from,
        }
    }
}

/// Iterator over the values published by a [`StepPlan`]
#[derive(Clone, Debug)]
pub struct Ticks {
    plan: StepPlan,
    value: i64,
}

impl Iterator for Ticks {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.plan.is_complete(self.value) {
            return None;
        }
        self.value = self.plan.advance(self.value);
        Some(self.value)
    }
}

/// Plan a move from `current` to `target` spread over roughly `steps` ticks
///
/// Gaps smaller than `steps` fall back to unit steps (one tick per unit of
/// distance). The clamp guarantees the final tick lands exactly on `target`.
pub fn plan(current: i64, target: i64, steps: i64) -> AnimationPlan {
    if current == target {
        return AnimationPlan::Settled(current);
    }
    if steps <= 0 {
        return AnimationPlan::Jump(target);
    }

    let direction = if target > current {
        Direction::Up
    } else {
        Direction::Down
    };

    // i128 keeps the gap exact even between i64::MIN and i64::MAX
    let gap = target as i128 - current as i128;
    let raw_step = gap.div_euclid(steps as i128);
    let step = match direction {
        Direction::Up => raw_step.max(1),
        Direction::Down => raw_step.min(-1),
    };
    let step_size = step.clamp(i64::MIN as i128, i64::MAX as i128) as i64;

    AnimationPlan::Step(StepPlan {
        direction,
        step_size,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_plan(current: i64, target: i64, steps: i64) -> StepPlan {
        match plan(current, target, steps) {
            AnimationPlan::Step(plan) => plan,
            other => panic!("expected a step plan, got {:?}", other),
        }
    }

    #[test]
    fn test_ascending_sequence() {
        let plan = step_plan(0, 100, 15);
        assert_eq!(plan.direction(), Direction::Up);
        assert_eq!(plan.step_size(), 6);

        let values: Vec<i64> = plan.ticks(0).collect();
        let mut expected: Vec<i64> = (1..=16).map(|i| i * 6).collect();
        expected.push(100);

        assert_eq!(values, expected);
        assert_eq!(values.len(), 17);
        assert_eq!(plan.tick_count(0), 17);
    }

    #[test]
    fn test_descending_uses_floor_division() {
        let plan = step_plan(50, 0, 15);
        assert_eq!(plan.direction(), Direction::Down);
        // floor(-50 / 15) = -4, truncation would give -3
        assert_eq!(plan.step_size(), -4);

        let values: Vec<i64> = plan.ticks(50).collect();
        assert_eq!(values.first(), Some(&46));
        assert_eq!(values.last(), Some(&0));
        assert!(values.iter().all(|v| *v >= 0));
        assert_eq!(values.len() as u64, plan.tick_count(50));
        assert_eq!(values.len(), 13);
    }

    #[test]
    fn test_small_gap_uses_unit_steps() {
        let plan = step_plan(10, 13, 15);
        assert_eq!(plan.step_size(), 1);
        assert_eq!(plan.ticks(10).collect::<Vec<_>>(), vec![11, 12, 13]);

        let plan = step_plan(13, 10, 15);
        assert_eq!(plan.step_size(), -1);
        assert_eq!(plan.ticks(13).collect::<Vec<_>>(), vec![12, 11, 10]);
    }

    #[test]
    fn test_noop_plan() {
        let plan = plan(42, 42, 15);
        assert_eq!(plan, AnimationPlan::Settled(42));
        assert_eq!(plan.tick_count(42), 0);
        assert_eq!(plan.target(), 42);
    }

    #[test]
    fn test_degenerate_steps_jump() {
        assert_eq!(plan(0, 100, 0), AnimationPlan::Jump(100));
        assert_eq!(plan(0, 100, -3), AnimationPlan::Jump(100));
        // Equal values still settle regardless of steps
        assert_eq!(plan(7, 7, 0), AnimationPlan::Settled(7));
    }

    #[test]
    fn test_clamp_saturates_at_target() {
        let up = step_plan(0, 100, 15);
        assert_eq!(up.clamp(102), 100);
        assert_eq!(up.clamp(96), 96);

        let down = step_plan(50, 0, 15);
        assert_eq!(down.clamp(-2), 0);
        assert_eq!(down.clamp(2), 2);
    }

    #[test]
    fn test_converges_without_overshoot() {
        let values = [-1000, -37, -15, -1, 0, 1, 14, 15, 16, 99, 1000];
        for &current in &values {
            for &target in &values {
                for steps in [1, 2, 3, 7, 15, 60, 5000] {
                    let plan = match plan(current, target, steps) {
                        AnimationPlan::Step(plan) => plan,
                        AnimationPlan::Settled(v) => {
                            assert_eq!(v, target);
                            continue;
                        }
                        AnimationPlan::Jump(_) => unreachable!("steps >= 1"),
                    };

                    let mut previous = current;
                    let mut count = 0u64;
                    for value in plan.ticks(current) {
                        match plan.direction() {
                            Direction::Up => {
                                assert!(value > previous);
                                assert!(value <= target);
                            }
                            Direction::Down => {
                                assert!(value < previous);
                                assert!(value >= target);
                            }
                        }
                        previous = value;
                        count += 1;
                    }

                    assert_eq!(previous, target, "{} -> {} in {}", current, target, steps);
                    assert_eq!(count, plan.tick_count(current));
                    assert!(count <= (target as i128 - current as i128).unsigned_abs() as u64);
                }
            }
        }
    }

    #[test]
    fn test_extreme_range_does_not_overflow() {
        let plan = step_plan(i64::MIN, i64::MAX, 1);
        assert_eq!(plan.step_size(), i64::MAX);
        let values: Vec<i64> = plan.ticks(i64::MIN).collect();
        assert_eq!(values.last(), Some(&i64::MAX));
        assert_eq!(values.len() as u64, plan.tick_count(i64::MIN));

        let plan = step_plan(i64::MAX, i64::MIN, 2);
        let values: Vec<i64> = plan.ticks(i64::MAX).collect();
        assert_eq!(values.last(), Some(&i64::MIN));
    }

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::Up.sign(), 1);
        assert_eq!(Direction::Down.sign(), -1);
    }
}
