//! Right-of-way classifier port.
//!
//! Same-track arbitration delegates its tie-break policy to a pluggable
//! classifier so the policy can change (static rule, decision tree, remote
//! inference) without touching the protocol shape. The resolver treats an
//! implementation as a black box returning exactly one of two outcomes.

use crate::input::request::Checkpoint;

/// Feature vector describing a pairwise same-track conflict.
#[derive(Debug, Copy, Clone)]
pub struct Features {
    pub priority_a: u8,
    pub priority_b: u8,
    pub checkpoint_a: Checkpoint,
    pub checkpoint_b: Checkpoint,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    AWins,
    BWins,
}

#[derive(Debug, Copy, Clone)]
pub struct Classification {
    pub outcome: Outcome,
    /// Model confidence in [0,1], when the backing implementation has one.
    /// Used for logging only; it never changes the decision.
    pub confidence: Option<f64>,
}

#[derive(Debug, Fail)]
pub enum ClassifierError {
    #[fail(display = "classifier unavailable: {}", _0)]
    Unavailable(String),
}

/// A classifier must be deterministic for identical inputs. Failure must
/// surface as an error; defaulting to one side would silently hand out
/// right of way.
pub trait Classifier {
    fn classify(&self, features: &Features) -> Result<Classification, ClassifierError>;
}

/// Built-in deterministic rule: the strictly more important train (lower
/// priority value) wins; between equal priorities the train further along
/// its checkpoints wins; equal on both counts, B wins.
pub struct PrecedenceRule;

impl Classifier for PrecedenceRule {
    fn classify(&self, features: &Features) -> Result<Classification, ClassifierError> {
        let outcome = if features.priority_a < features.priority_b {
            Outcome::AWins
        } else if features.priority_b < features.priority_a {
            Outcome::BWins
        } else if features.checkpoint_a.level() > features.checkpoint_b.level() {
            Outcome::AWins
        } else {
            Outcome::BWins
        };
        Ok(Classification { outcome: outcome, confidence: Some(1.0) })
    }
}

#[test]
fn test_precedence_rule() {
    let cp = |l| Checkpoint::new(l).unwrap();
    let classify = |pa, pb, ca, cb| {
        PrecedenceRule.classify(&Features {
            priority_a: pa,
            priority_b: pb,
            checkpoint_a: cp(ca),
            checkpoint_b: cp(cb),
        }).unwrap().outcome
    };
    assert_eq!(classify(1, 3, 1, 5), Outcome::AWins); // priority beats progress
    assert_eq!(classify(4, 2, 5, 1), Outcome::BWins);
    assert_eq!(classify(2, 2, 4, 1), Outcome::AWins); // equal priority: checkpoint decides
    assert_eq!(classify(2, 2, 1, 4), Outcome::BWins);
    assert_eq!(classify(2, 2, 3, 3), Outcome::BWins); // full tie falls through to B
}
