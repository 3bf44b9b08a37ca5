//! Same-track conflict protocol: two trains converging on one block
//! section, a single pairwise arbitration.

use log::debug;

use super::{reduced_speed, Decision, DispatchError, Reason, Resolver, Track};
use crate::classify::{Classifier, Features, Outcome};
use crate::input::request::Checkpoint;
use crate::input::timetable::TrainId;

/// Winner/loser decision pair. The priority train proceeds on the main
/// line uncapped; the reduced train takes the loop-line disposition with
/// the fixed speed cap.
#[derive(Debug)]
pub struct SameTrackResolution {
    pub priority_train: Decision,
    pub reduced_train: Decision,
    pub confidence: Option<f64>,
}

impl<'a, C: Classifier> Resolver<'a, C> {
    pub fn same_track(&self,
                      train_a: TrainId,
                      train_b: TrainId,
                      checkpoint_a: Checkpoint,
                      checkpoint_b: Checkpoint)
                      -> Result<SameTrackResolution, DispatchError> {
        if train_a == train_b {
            return Err(DispatchError::SelfConflict(train_a));
        }
        let a = self.train(train_a)?;
        let b = self.train(train_b)?;

        let features = Features {
            priority_a: a.priority,
            priority_b: b.priority,
            checkpoint_a: checkpoint_a,
            checkpoint_b: checkpoint_b,
        };
        let classification = self.classifier
            .classify(&features)
            .map_err(DispatchError::Classifier)?;

        let (winner, loser) = match classification.outcome {
            Outcome::AWins => (a, b),
            Outcome::BWins => (b, a),
        };
        debug!("same-track arbitration: train {} holds, train {} yields (confidence {:?})",
               winner.id, loser.id, classification.confidence);

        Ok(SameTrackResolution {
            priority_train: Decision {
                train: winner.id,
                track: Track::MainLine,
                speed_limit_kmh: None,
                reason: Reason::HoldsRightOfWay,
            },
            reduced_train: Decision {
                train: loser.id,
                track: Track::LoopLine,
                speed_limit_kmh: Some(reduced_speed(loser.max_speed_kmh)),
                reason: Reason::YieldsRightOfWay,
            },
            confidence: classification.confidence,
        })
    }
}
