use crate::input::timetable::TrainId;
use regex::Regex;

/// Checkpoint progress level, ordinal 1-5, higher = further along the
/// approach to the junction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Checkpoint(u8);

pub const CHECKPOINT_MIN: u8 = 1;
pub const CHECKPOINT_MAX: u8 = 5;

impl Checkpoint {
    pub fn new(level: u8) -> Result<Checkpoint, ParseError> {
        if level < CHECKPOINT_MIN || level > CHECKPOINT_MAX {
            return Err(ParseError::CheckpointRange(level));
        }
        Ok(Checkpoint(level))
    }

    pub fn level(&self) -> u8 {
        self.0
    }
}

#[derive(Debug, Copy, Clone)]
pub enum Disruption {
    /// A named train is behind schedule; `cleared` tells whether it has
    /// already vacated the contested block.
    Delay { train: TrainId, cleared: bool },
    /// Two trains approaching the same block section.
    SameTrack {
        train_a: TrainId,
        train_b: TrainId,
        checkpoint_a: Checkpoint,
        checkpoint_b: Checkpoint,
    },
}

#[derive(Debug, Fail)]
pub enum ParseError {
    #[fail(display = "error in regular expression: {}", _0)]
    RegexError(String),
    #[fail(display = "error converting number")]
    NumberError,
    #[fail(display = "checkpoint level {} outside 1-5", _0)]
    CheckpointRange(u8),
    #[fail(display = "unrecognized disruption request: {}", _0)]
    Unrecognized(String),
}

/// Parses disruption request format, one request per line:
///
/// * `delay 104`
/// * `delay 104 cleared`
/// * `conflict 104 205 a=3 b=5`
///
/// Malformed requests are rejected here, before any timetable lookup.
pub fn parse_requests(input: &str) -> Result<Vec<Disruption>, ParseError> {
    let delay_re = Regex::new(r"^\s*delay\s+(?P<id>\d+)(?:\s+(?P<cleared>cleared))?\s*$")
        .map_err(|e| ParseError::RegexError(format!("{:?}", e)))?;
    let conflict_re = Regex::new(r"(?x) ^ \s* conflict \s+ (?P<a>\d+) \s+ (?P<b>\d+) \s+
            a \s* = \s* (?P<cpa>\d+) \s+
            b \s* = \s* (?P<cpb>\d+) \s*
            $").map_err(|e| ParseError::RegexError(format!("{:?}", e)))?;

    let mut requests = Vec::new();
    for line in input.lines() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        if let Some(groups) = delay_re.captures(line) {
            requests.push(Disruption::Delay {
                train: groups["id"].parse::<TrainId>().map_err(|_e| ParseError::NumberError)?,
                cleared: groups.name("cleared").is_some(),
            });
            continue;
        }
        if let Some(groups) = conflict_re.captures(line) {
            requests.push(Disruption::SameTrack {
                train_a: groups["a"].parse::<TrainId>().map_err(|_e| ParseError::NumberError)?,
                train_b: groups["b"].parse::<TrainId>().map_err(|_e| ParseError::NumberError)?,
                checkpoint_a: Checkpoint::new(groups["cpa"].parse::<u8>()
                    .map_err(|_e| ParseError::NumberError)?)?,
                checkpoint_b: Checkpoint::new(groups["cpb"].parse::<u8>()
                    .map_err(|_e| ParseError::NumberError)?)?,
            });
            continue;
        }
        return Err(ParseError::Unrecognized(line.to_string()));
    }
    Ok(requests)
}
