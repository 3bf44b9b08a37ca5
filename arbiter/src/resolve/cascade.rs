//! Delay cascade protocol: a delayed train fouls the junction block, and
//! every later train must be dispatched around it in arrival order.
//!
//! The run is a two-phase state machine. While the delayed train occupies
//! the block, lower- and equal-priority traffic queues on the loop line
//! and only strictly higher-priority trains pass. Once the block is
//! reported clear the constraint relaxes, irreversibly, to ordinary
//! main-line contention.

use log::debug;
use smallvec::SmallVec;

use super::{reduced_speed, Decision, DispatchError, Reason, Resolver, Track};
use crate::classify::Classifier;
use crate::input::timetable::{Timetable, TrainId, TrainRecord};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CascadePhase {
    AwaitingClearance,
    Cleared,
}

/// External signals supplied per step: whether the delayed train has now
/// vacated the block, and whether the main line is free for the train
/// under evaluation. The second is only consulted after clearance.
#[derive(Debug, Copy, Clone)]
pub struct ClearanceReport {
    pub delayed_cleared: bool,
    pub main_line_free: bool,
}

/// One cascade run: an exclusive cursor over the upcoming trains, advanced
/// one train per step. The run owns its phase; clearance is applied at
/// most once and never reverts. Not shareable across callers -- one run
/// per dispatcher session. Dropping the run abandons it without side
/// effects.
pub struct CascadeRun<'a> {
    delayed: &'a TrainRecord,
    candidates: SmallVec<[&'a TrainRecord; 8]>,
    cursor: usize,
    phase: CascadePhase,
}

impl<'a> CascadeRun<'a> {
    /// Orders every train scheduled strictly after the delayed train's
    /// arrival (ties by ascending id, unscheduled trains excluded). The
    /// delayed train must exist and must itself be scheduled, otherwise
    /// nothing can be time-ordered against it.
    pub fn new(timetable: &'a Timetable,
               delayed_id: TrainId,
               cleared: bool)
               -> Result<CascadeRun<'a>, DispatchError> {
        let delayed = timetable.get(delayed_id).ok_or(DispatchError::UnknownTrain(delayed_id))?;
        let anchor = delayed.arrival.ok_or(DispatchError::UnscheduledTrain(delayed_id))?;
        let candidates: SmallVec<[&TrainRecord; 8]> =
            timetable.upcoming_after(anchor).into_iter().collect();
        debug!("cascade for delayed train {} (arrival {}): {} upcoming trains",
               delayed.id, anchor, candidates.len());
        Ok(CascadeRun {
            delayed: delayed,
            candidates: candidates,
            cursor: 0,
            phase: if cleared { CascadePhase::Cleared } else { CascadePhase::AwaitingClearance },
        })
    }

    pub fn delayed(&self) -> &TrainRecord {
        self.delayed
    }

    pub fn phase(&self) -> CascadePhase {
        self.phase
    }

    /// The next train to be evaluated, without advancing the cursor.
    pub fn peek(&self) -> Option<&'a TrainRecord> {
        self.candidates.get(self.cursor).map(|t| *t)
    }

    pub fn remaining(&self) -> usize {
        self.candidates.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    /// Marks the delayed train as having vacated the block. Idempotent;
    /// the transition happens at most once per run and never reverts.
    pub fn mark_cleared(&mut self) {
        if let CascadePhase::AwaitingClearance = self.phase {
            debug!("delayed train {} cleared the junction", self.delayed.id);
            self.phase = CascadePhase::Cleared;
        }
    }

    /// Evaluates the next upcoming train under the current phase and
    /// advances the cursor. A clearance signal in the report transitions
    /// the phase before the evaluation; once cleared, the signal is
    /// ignored.
    pub fn step(&mut self, report: ClearanceReport) -> Result<Decision, DispatchError> {
        let train = match self.candidates.get(self.cursor) {
            Some(t) => *t,
            None => return Err(DispatchError::RunExhausted),
        };
        self.cursor += 1;

        if report.delayed_cleared {
            self.mark_cleared();
        }

        let decision = match self.phase {
            CascadePhase::AwaitingClearance => {
                // Lower priority value = higher precedence. Equal priority
                // holds.
                if train.priority < self.delayed.priority {
                    Decision {
                        train: train.id,
                        track: Track::MainLine,
                        speed_limit_kmh: None,
                        reason: Reason::HigherPriorityThanDelayed,
                    }
                } else {
                    Decision {
                        train: train.id,
                        track: Track::LoopLine,
                        speed_limit_kmh: Some(reduced_speed(train.max_speed_kmh)),
                        reason: Reason::WaitingForDelayedTrain,
                    }
                }
            }
            CascadePhase::Cleared => {
                if report.main_line_free {
                    Decision {
                        train: train.id,
                        track: Track::MainLine,
                        speed_limit_kmh: None,
                        reason: Reason::DelayedTrainCleared,
                    }
                } else {
                    Decision {
                        train: train.id,
                        track: Track::LoopLine,
                        speed_limit_kmh: Some(reduced_speed(train.max_speed_kmh)),
                        reason: Reason::MainLineOccupied,
                    }
                }
            }
        };
        debug!("train {} -> {} ({})", decision.train,
               decision.track.wire_name(), decision.reason.text());
        Ok(decision)
    }
}

impl<'a, C: Classifier> Resolver<'a, C> {
    /// Starts an interactive cascade run for step-by-step dispatch.
    pub fn cascade_run(&self, delayed: TrainId, cleared: bool) -> Result<CascadeRun<'a>, DispatchError> {
        CascadeRun::new(self.timetable, delayed, cleared)
    }

    /// Batch variant: resolves the whole cascade in one call. With the
    /// block still fouled the priority rule applies to every upcoming
    /// train; with it cleared, the main line is taken as available and
    /// every train is released.
    pub fn delay_cascade(&self, delayed: TrainId, cleared: bool) -> Result<Vec<Decision>, DispatchError> {
        let mut run = self.cascade_run(delayed, cleared)?;
        let report = ClearanceReport { delayed_cleared: cleared, main_line_free: true };
        let mut decisions = Vec::new();
        while !run.is_exhausted() {
            decisions.push(run.step(report)?);
        }
        Ok(decisions)
    }
}
