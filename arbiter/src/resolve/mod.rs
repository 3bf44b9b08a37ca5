//! Conflict resolution protocols.

pub mod sametrack;
pub mod cascade;

use crate::classify::{Classifier, ClassifierError};
use crate::input::timetable::{Timetable, TrainId, TrainRecord};

/// Fixed reduction applied to a train sent onto the loop line.
pub const SPEED_REDUCTION: f64 = 0.6;

/// Loop-line speed cap in km/h: floor(max_speed * 0.6). Never negotiable
/// per call.
pub fn reduced_speed(max_speed_kmh: f64) -> u32 {
    (max_speed_kmh * SPEED_REDUCTION) as u32
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Track {
    MainLine,
    LoopLine,
}

impl Track {
    pub fn wire_name(&self) -> &'static str {
        match *self {
            Track::MainLine => "MAIN_LINE",
            Track::LoopLine => "LOOP_LINE",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Reason {
    WaitingForDelayedTrain,
    HigherPriorityThanDelayed,
    DelayedTrainCleared,
    MainLineOccupied,
    HoldsRightOfWay,
    YieldsRightOfWay,
}

impl Reason {
    pub fn text(&self) -> &'static str {
        match *self {
            Reason::WaitingForDelayedTrain => "waiting for delayed train to clear junction",
            Reason::HigherPriorityThanDelayed => "higher priority than delayed train",
            Reason::DelayedTrainCleared => "delayed train cleared junction",
            Reason::MainLineOccupied => "main line occupied",
            Reason::HoldsRightOfWay => "holds right of way at junction",
            Reason::YieldsRightOfWay => "yields right of way at junction",
        }
    }
}

/// One per-train disposition. Produced fresh per resolution call, never
/// persisted. A loop-line decision always carries the speed cap; a
/// main-line decision never does.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub train: TrainId,
    pub track: Track,
    pub speed_limit_kmh: Option<u32>,
    pub reason: Reason,
}

#[derive(Debug, Fail)]
pub enum DispatchError {
    #[fail(display = "train {} not found in timetable", _0)]
    UnknownTrain(TrainId),
    #[fail(display = "delayed train {} has no scheduled arrival time", _0)]
    UnscheduledTrain(TrainId),
    #[fail(display = "train {} cannot conflict with itself", _0)]
    SelfConflict(TrainId),
    #[fail(display = "classifier failed to arbitrate")]
    Classifier(#[cause] ClassifierError),
    #[fail(display = "cascade run already exhausted")]
    RunExhausted,
}

/// The conflict resolver: a timetable snapshot and a classifier handle,
/// injected at construction. Stateless between calls; independent
/// resolutions may share one resolver.
pub struct Resolver<'a, C: Classifier> {
    timetable: &'a Timetable,
    classifier: &'a C,
}

impl<'a, C: Classifier> Resolver<'a, C> {
    pub fn new(timetable: &'a Timetable, classifier: &'a C) -> Self {
        Resolver { timetable: timetable, classifier: classifier }
    }

    fn train(&self, id: TrainId) -> Result<&'a TrainRecord, DispatchError> {
        self.timetable.get(id).ok_or(DispatchError::UnknownTrain(id))
    }
}

#[derive(Debug)]
pub enum Resolution {
    SameTrack(sametrack::SameTrackResolution),
    Cascade(Vec<Decision>),
}
