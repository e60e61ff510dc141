//! # Discrete event finder
//!
//! Locates the instants where a **step function of time** changes value: sunrise (the Sun goes
//! from below to above the horizon), moonset, and so on.
//!
//! ## Algorithm
//!
//! 1. Sample the function on `n = ceil((end − start) / step)` equal intervals covering
//!    `[start, end]`, both ends included. The effective step is at most `step_days`, and `n` is
//!    capped by [`MAX_INTERVALS`]. Samples are evaluated one at a time, never stored.
//! 2. For every pair of adjacent samples with different values, bisect the bracket until it is
//!    shorter than the tolerance (1 second by default) or 64 halvings were done.
//! 3. Report the right end of the final bracket (the first instant carrying the new value)
//!    together with the new value. Only events inside `[start, end)` are kept, in time order.
//!
//! ## Limitation
//!
//! At most one transition is resolved per sampling interval. If the function changes value
//! twice between two samples (and ends up with the same value) the pair is invisible; if it
//! changes three times, only one of them is reported. The step must therefore be shorter than
//! the shortest interval between two transitions (0.04 day is comfortably below half a day
//! for rise/set predicates). This is not checked.
//!
//! ## See also
//! ------------
//! * [`rise_set`] – Rise/set predicates for the Sun, the Moon and the other bodies.
use itertools::Itertools;
use tracing::debug;

use crate::{constants::SECONDS_PER_DAY, skywatch_errors::SkywatchError, time::TimePoint};

pub mod rise_set;

/// Default width of the final bisection bracket, in seconds.
pub const DEFAULT_TOLERANCE_SECONDS: f64 = 1.0;

/// Maximum number of halvings of a bracket.
const MAX_BISECTIONS: usize = 64;

/// Largest number of sampling intervals of one search; a finer grid is rejected as an invalid step.
pub const MAX_INTERVALS: usize = 10_000_000;

/// A function of time taking a finite number of values.
pub trait StepFunction {
    type Value: Copy + PartialEq;

    fn value_at(&self, t: &TimePoint) -> Result<Self::Value, SkywatchError>;

    /// Sampling step (days) short enough to see every transition of this function.
    fn step_days(&self) -> f64;
}

/// A transition of a step function: from `time` on, the function takes `value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscreteEvent<V> {
    pub time: TimePoint,
    pub value: V,
}

fn midpoint(lo: &TimePoint, hi: &TimePoint) -> TimePoint {
    TimePoint::from_offset(*lo, hi.days_since(lo) / 2.0)
}

/// Find the transitions of `f` inside `[start, end)` with the default 1 s tolerance.
///
/// Arguments
/// -----------------
/// * `f`: the step function, as a closure returning its value at a given instant.
/// * `start`, `end`: search window.
/// * `step_days`: maximum sampling step, in days.
///
/// Return
/// ----------
/// * The events in ascending time order (empty when `start >= end` or `f` is constant), the first
///   error returned by `f`, or [`SkywatchError::InvalidStep`] for a non-positive or non-finite step,
///   or one splitting the window into more than [`MAX_INTERVALS`] intervals.
///
/// See also
/// ------------
/// * [`find_events_with_tolerance`] – Same with an explicit bracket width.
/// * [`find_discrete`] – Same for a [`StepFunction`].
pub fn find_events<V, F>(
    f: F,
    start: &TimePoint,
    end: &TimePoint,
    step_days: f64,
) -> Result<Vec<DiscreteEvent<V>>, SkywatchError>
where
    V: Copy + PartialEq,
    F: Fn(&TimePoint) -> Result<V, SkywatchError>,
{
    find_events_with_tolerance(f, start, end, step_days, DEFAULT_TOLERANCE_SECONDS)
}

/// [`find_events`] with an explicit final bracket width, in seconds.
pub fn find_events_with_tolerance<V, F>(
    f: F,
    start: &TimePoint,
    end: &TimePoint,
    step_days: f64,
    tolerance_seconds: f64,
) -> Result<Vec<DiscreteEvent<V>>, SkywatchError>
where
    V: Copy + PartialEq,
    F: Fn(&TimePoint) -> Result<V, SkywatchError>,
{
    if !step_days.is_finite() || step_days <= 0.0 {
        return Err(SkywatchError::InvalidStep(step_days));
    }
    if start >= end {
        return Ok(Vec::new());
    }

    let span = end.days_since(start);
    let intervals = (span / step_days).ceil().max(1.0);
    if intervals > MAX_INTERVALS as f64 {
        return Err(SkywatchError::InvalidStep(step_days));
    }
    let intervals = intervals as usize;

    let grid = (0..=intervals).map(|i| {
        if i == intervals {
            *end
        } else {
            TimePoint::from_offset(*start, span * i as f64 / intervals as f64)
        }
    });

    let mut events = Vec::new();
    let mut v0 = f(start)?;
    for (t0, t1) in grid.tuple_windows() {
        let v1 = f(&t1)?;
        if v0 == v1 {
            continue;
        }

        let (mut lo, mut hi, mut value) = (t0, t1, v1);
        for _ in 0..MAX_BISECTIONS {
            if hi.days_since(&lo) * SECONDS_PER_DAY <= tolerance_seconds {
                break;
            }
            let mid = midpoint(&lo, &hi);
            let v_mid = f(&mid)?;
            if v_mid == v0 {
                lo = mid;
            } else {
                hi = mid;
                value = v_mid;
            }
        }

        if hi < *end {
            debug!(time = %hi, "found discrete event");
            events.push(DiscreteEvent { time: hi, value });
        }
        v0 = v1;
    }

    Ok(events)
}

/// Find the transitions of a [`StepFunction`] inside `[start, end)`, sampling at its own step.
pub fn find_discrete<S: StepFunction + ?Sized>(
    f: &S,
    start: &TimePoint,
    end: &TimePoint,
) -> Result<Vec<DiscreteEvent<S::Value>>, SkywatchError> {
    find_events(|t| f.value_at(t), start, end, f.step_days())
}

/// [`find_discrete`] with an explicit final bracket width, in seconds.
pub fn find_discrete_with_tolerance<S: StepFunction + ?Sized>(
    f: &S,
    start: &TimePoint,
    end: &TimePoint,
    tolerance_seconds: f64,
) -> Result<Vec<DiscreteEvent<S::Value>>, SkywatchError> {
    find_events_with_tolerance(
        |t| f.value_at(t),
        start,
        end,
        f.step_days(),
        tolerance_seconds,
    )
}
