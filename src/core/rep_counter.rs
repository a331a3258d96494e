//! Rep State Machine: UNSET → UP ⇄ DOWN with a minimum-interval guard
//!
//! State transitions (range strategy):
//! - any → UP: angle > up
//! - UP → DOWN: angle < down AND guard elapsed (counts a rep)
//! - UP, angle < down, guard not elapsed: suppressed, no change
//! - UNSET, angle < down: no change (a rep must start from UP)
//!
//! Baseline strategy uses the same machine with the conditions expressed as
//! signed deviation from the baseline: DOWN when the deviation exceeds the
//! contraction offset, UP when it drops under the extension offset.

use tracing::{debug, info};

use crate::core::profile::{CalibrationStrategy, Direction};
use crate::types::{RepState, Thresholds};

/// What happened on one update
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RepUpdate {
    /// New total when this update counted a rep
    pub rep_completed: Option<u32>,
    /// Down condition met inside the guard interval
    pub blocked: bool,
    /// Deepest angle of the DOWN phase that ended on this update
    pub phase_deepest: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RepStateMachine {
    strategy: CalibrationStrategy,
    guard_ms: u64,
    state: RepState,
    rep_count: u32,
    /// Time of the last counted rep; the first sample after a reset seeds it
    last_rep_ms: Option<u64>,
    /// Deepest angle seen while DOWN
    deepest: Option<f64>,
}

impl RepStateMachine {
    pub fn new(strategy: CalibrationStrategy, guard_ms: u64) -> Self {
        Self {
            strategy,
            guard_ms,
            state: RepState::Unset,
            rep_count: 0,
            last_rep_ms: None,
            deepest: None,
        }
    }

    /// Advance with a smoothed angle against frozen thresholds
    pub fn update(&mut self, angle: f64, thresholds: &Thresholds, now_ms: u64) -> RepUpdate {
        let mut update = RepUpdate::default();
        let last_rep = *self.last_rep_ms.get_or_insert(now_ms);

        if self.is_up(angle, thresholds) {
            if self.state == RepState::Down {
                update.phase_deepest = self.deepest.take();
            }
            if self.state != RepState::Up {
                debug!(angle, up = thresholds.up, "UP position");
            }
            self.state = RepState::Up;
        } else if self.is_down(angle, thresholds) {
            match self.state {
                RepState::Up => {
                    let elapsed = now_ms.saturating_sub(last_rep);
                    if elapsed > self.guard_ms {
                        self.rep_count += 1;
                        self.state = RepState::Down;
                        self.last_rep_ms = Some(now_ms);
                        self.deepest = Some(angle);
                        update.rep_completed = Some(self.rep_count);
                        info!(rep = self.rep_count, angle, at_ms = now_ms, gap_ms = elapsed, "rep counted");
                    } else {
                        update.blocked = true;
                        debug!(elapsed_ms = elapsed, guard_ms = self.guard_ms, "rep blocked, too soon");
                    }
                }
                RepState::Unset => {
                    debug!(angle, "DOWN position without UP first");
                }
                RepState::Down => {}
            }
        }

        if self.state == RepState::Down {
            let direction = self.direction();
            self.deepest = match self.deepest {
                Some(current) if !direction.is_deeper(angle, current) => Some(current),
                _ => Some(angle),
            };
        }

        update
    }

    fn direction(&self) -> Direction {
        self.strategy.contraction()
    }

    fn is_up(&self, angle: f64, thresholds: &Thresholds) -> bool {
        match self.strategy {
            CalibrationStrategy::Range => angle > thresholds.up,
            CalibrationStrategy::Baseline { contraction, extension_offset, .. } => {
                contraction.signed_deviation(thresholds.up, angle) < extension_offset
            }
        }
    }

    fn is_down(&self, angle: f64, thresholds: &Thresholds) -> bool {
        match self.strategy {
            CalibrationStrategy::Range => angle < thresholds.down,
            CalibrationStrategy::Baseline { contraction, contraction_offset, .. } => {
                contraction.signed_deviation(thresholds.down, angle) > contraction_offset
            }
        }
    }

    pub fn state(&self) -> RepState {
        self.state
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn last_rep_ms(&self) -> Option<u64> {
        self.last_rep_ms
    }

    /// Back to UNSET with zero reps
    pub fn reset(&mut self) {
        self.state = RepState::Unset;
        self.rep_count = 0;
        self.last_rep_ms = None;
        self.deepest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_machine() -> RepStateMachine {
        RepStateMachine::new(CalibrationStrategy::Range, 500)
    }

    fn thresholds() -> Thresholds {
        Thresholds::new(100.0, 140.0)
    }

    #[test]
    fn test_initial_state_is_unset() {
        let machine = range_machine();
        assert_eq!(machine.state(), RepState::Unset);
        assert_eq!(machine.rep_count(), 0);
    }

    #[test]
    fn test_down_without_up_does_not_count() {
        let mut machine = range_machine();
        let update = machine.update(80.0, &thresholds(), 1000);
        assert_eq!(update.rep_completed, None);
        assert_eq!(machine.state(), RepState::Unset);
    }

    #[test]
    fn test_guard_blocks_early_down() {
        let mut machine = range_machine();
        machine.update(150.0, &thresholds(), 0);
        assert_eq!(machine.state(), RepState::Up);

        let early = machine.update(90.0, &thresholds(), 200);
        assert!(early.blocked);
        assert_eq!(machine.state(), RepState::Up);
        assert_eq!(machine.rep_count(), 0);

        let counted = machine.update(90.0, &thresholds(), 900);
        assert_eq!(counted.rep_completed, Some(1));
        assert_eq!(machine.state(), RepState::Down);
        assert_eq!(machine.last_rep_ms(), Some(900));
    }

    #[test]
    fn test_guard_is_strict() {
        let mut machine = range_machine();
        machine.update(150.0, &thresholds(), 0);
        assert!(machine.update(90.0, &thresholds(), 500).blocked);
        assert_eq!(machine.update(90.0, &thresholds(), 501).rep_completed, Some(1));
    }

    #[test]
    fn test_hysteresis_band_holds_state() {
        let mut machine = range_machine();
        machine.update(150.0, &thresholds(), 0);
        machine.update(120.0, &thresholds(), 600);
        assert_eq!(machine.state(), RepState::Up);
        machine.update(90.0, &thresholds(), 700);
        machine.update(120.0, &thresholds(), 800);
        assert_eq!(machine.state(), RepState::Down);
        assert_eq!(machine.rep_count(), 1);
    }

    #[test]
    fn test_deepest_reported_on_leaving_down() {
        let mut machine = range_machine();
        machine.update(150.0, &thresholds(), 0);
        machine.update(95.0, &thresholds(), 600);
        machine.update(80.0, &thresholds(), 700);
        machine.update(85.0, &thresholds(), 800);
        let update = machine.update(150.0, &thresholds(), 900);
        assert_eq!(update.phase_deepest, Some(80.0));
    }

    #[test]
    fn test_baseline_decreasing() {
        let strategy = CalibrationStrategy::Baseline {
            contraction: Direction::Decreasing,
            contraction_offset: 30.0,
            extension_offset: 10.0,
        };
        let mut machine = RepStateMachine::new(strategy, 500);
        let baseline = Thresholds::baseline(160.0);

        machine.update(158.0, &baseline, 0);
        assert_eq!(machine.state(), RepState::Up);
        // 25° of flexion is not a contraction yet
        machine.update(135.0, &baseline, 600);
        assert_eq!(machine.rep_count(), 0);
        let update = machine.update(60.0, &baseline, 800);
        assert_eq!(update.rep_completed, Some(1));
        // Must come back within 10° of baseline before the next rep
        machine.update(145.0, &baseline, 1400);
        assert_eq!(machine.state(), RepState::Down);
        machine.update(155.0, &baseline, 1600);
        assert_eq!(machine.state(), RepState::Up);
    }

    #[test]
    fn test_baseline_increasing_tracks_max() {
        let strategy = CalibrationStrategy::Baseline {
            contraction: Direction::Increasing,
            contraction_offset: 30.0,
            extension_offset: 10.0,
        };
        let mut machine = RepStateMachine::new(strategy, 500);
        let baseline = Thresholds::baseline(15.0);

        machine.update(15.0, &baseline, 0);
        machine.update(60.0, &baseline, 700);
        machine.update(88.0, &baseline, 800);
        machine.update(70.0, &baseline, 900);
        let update = machine.update(18.0, &baseline, 1200);
        assert_eq!(update.phase_deepest, Some(88.0));
        assert_eq!(machine.rep_count(), 1);
    }

    #[test]
    fn test_reset() {
        let mut machine = range_machine();
        machine.update(150.0, &thresholds(), 0);
        machine.update(90.0, &thresholds(), 900);
        machine.reset();
        assert_eq!(machine.state(), RepState::Unset);
        assert_eq!(machine.rep_count(), 0);
        assert_eq!(machine.last_rep_ms(), None);
    }
}
