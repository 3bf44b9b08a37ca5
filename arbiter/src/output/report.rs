//! Plain-text decision rendering. No logic, only formatting.

use crate::resolve::{Decision, Resolution};

/// Print one decision per line on the following format:
/// `> train <id> <track> [| speed <v> km/h] (<reason>)`.
pub fn resolution(r: &Resolution) -> Result<String, failure::Error> {
    use std::fmt::Write;
    let mut s = String::new();
    match *r {
        Resolution::SameTrack(ref st) => {
            write!(s, "# Same-track conflict: train {} holds right of way\n",
                   st.priority_train.train)?;
            decision_line(&mut s, &st.priority_train)?;
            decision_line(&mut s, &st.reduced_train)?;
        }
        Resolution::Cascade(ref decisions) => {
            write!(s, "# Delay cascade: {} upcoming trains\n", decisions.len())?;
            for d in decisions {
                decision_line(&mut s, d)?;
            }
        }
    }
    Ok(s)
}

fn decision_line(s: &mut String, d: &Decision) -> Result<(), failure::Error> {
    use std::fmt::Write;
    match d.speed_limit_kmh {
        Some(v) => write!(s, "> train {} {} | speed {} km/h ({})\n",
                          d.train, d.track.wire_name(), v, d.reason.text())?,
        None => write!(s, "> train {} {} ({})\n",
                       d.train, d.track.wire_name(), d.reason.text())?,
    }
    Ok(())
}
