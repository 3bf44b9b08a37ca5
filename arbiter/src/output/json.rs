//! JSON decision rendering for the process-boundary response shapes.

use failure::Error;
use std::io;

use crate::resolve::sametrack::SameTrackResolution;
use crate::resolve::{Decision, Resolution};

pub fn same_track<W: io::Write>(r: &SameTrackResolution, f: &mut W) -> Result<(), Error> {
    write!(f, "{{ \"priority_train\": {}, \"reduced_train\": {}",
           r.priority_train.train, r.reduced_train.train)?;
    if let Some(v) = r.reduced_train.speed_limit_kmh {
        write!(f, ", \"suggested_speed_kmh\": {}", v)?;
    }
    if let Some(c) = r.confidence {
        write!(f, ", \"confidence\": {}", c)?;
    }
    write!(f, ", \"reason\": \"{}\" }}", r.reduced_train.reason.text())?;
    Ok(())
}

pub fn cascade<W: io::Write>(decisions: &[Decision], f: &mut W) -> Result<(), Error> {
    write!(f, "[")?;
    let mut first = true;
    for d in decisions {
        if first { first = false; } else { write!(f, ", ")?; }
        write!(f, "{{ \"train_id\": {}, \"decision\": \"{}\"", d.train, d.track.wire_name())?;
        if let Some(v) = d.speed_limit_kmh {
            write!(f, ", \"speed_limit_kmh\": {}", v)?;
        }
        write!(f, ", \"reason\": \"{}\" }}", d.reason.text())?;
    }
    write!(f, "]")?;
    Ok(())
}

pub fn resolution<W: io::Write>(r: &Resolution, f: &mut W) -> Result<(), Error> {
    match *r {
        Resolution::SameTrack(ref st) => same_track(st, f),
        Resolution::Cascade(ref decisions) => cascade(decisions, f),
    }
}

/// One JSON array with the response for each resolved request, in request
/// order.
pub fn resolutions<W: io::Write>(rs: &[Resolution], f: &mut W) -> Result<(), Error> {
    write!(f, "[")?;
    let mut first = true;
    for r in rs {
        if first { first = false; } else { write!(f, ", ")?; }
        resolution(r, f)?;
    }
    write!(f, "]")?;
    Ok(())
}
