#[macro_use] extern crate failure_derive;

pub mod input;
pub mod classify;
pub mod resolve;
pub mod output;

#[cfg(test)]
mod tests;

use crate::classify::Classifier;
use crate::input::request::Disruption;
use crate::input::timetable::Timetable;
use crate::resolve::{DispatchError, Resolution, Resolver};

/// Resolves a single disruption against a timetable snapshot.
///
/// This is the library-level entry point shared by the batch binary and the
/// interactive console: it routes the request to the matching protocol and
/// returns the full ordered result. Each call is independent; no state is
/// carried between invocations.
pub fn resolve_disruption<C: Classifier>(timetable: &Timetable,
                                         classifier: &C,
                                         disruption: &Disruption)
                                         -> Result<Resolution, DispatchError> {
    let resolver = Resolver::new(timetable, classifier);
    match *disruption {
        Disruption::SameTrack { train_a, train_b, checkpoint_a, checkpoint_b } => {
            let r = resolver.same_track(train_a, train_b, checkpoint_a, checkpoint_b)?;
            Ok(Resolution::SameTrack(r))
        }
        Disruption::Delay { train, cleared } => {
            let decisions = resolver.delay_cascade(train, cleared)?;
            Ok(Resolution::Cascade(decisions))
        }
    }
}

use std::path::Path;
pub type AppResult<T> = Result<T, failure::Error>;

pub fn read_file(f :&Path) -> AppResult<String> {
  use std::fs::File;
  use std::io::prelude::*;
  use std::io::BufReader;

  let file = File::open(f)?;
  let mut file = BufReader::new(&file);
  let mut contents = String::new();
  file.read_to_string(&mut contents)?;
  Ok(contents)
}

pub fn get_timetable(s :&Path) -> AppResult<Timetable> {
    let contents = read_file(s)?;
    get_timetable_string(&contents)
}

pub fn get_timetable_string(s :&str) -> AppResult<Timetable> {
    use crate::input::timetable::parse_timetable;
    let records = parse_timetable(s)?;
    let timetable = Timetable::new(records)?;
    Ok(timetable)
}

pub fn get_requests(s :&Path) -> AppResult<Vec<Disruption>> {
    let contents = read_file(s)?;
    let rs = input::request::parse_requests(&contents)?;
    Ok(rs)
}
