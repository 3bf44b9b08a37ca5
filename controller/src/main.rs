//! Interactive dispatcher console: a thin prompt loop over the conflict
//! resolver. All arbitration happens in the arbiter crate; this binary
//! only translates answers typed at the terminal into resolver calls and
//! cascade steps.

use arbiter::classify::PrecedenceRule;
use arbiter::input::request::Checkpoint;
use arbiter::input::timetable::{Timetable, TrainId, TrainRecord};
use arbiter::output::report;
use arbiter::resolve::cascade::{CascadePhase, ClearanceReport};
use arbiter::resolve::{DispatchError, Resolution, Resolver};
use arbiter::AppResult;

use std::io::{self, Write};
use std::path::PathBuf;
use structopt::StructOpt;

/// Controller -- interactive junction dispatch console
#[derive(StructOpt, Debug)]
#[structopt(name="controller")]
struct Opt {
    /// Daily timetable file
    #[structopt(parse(from_os_str))]
    timetable: PathBuf,
}

/// Prints a prompt and reads one trimmed line. None on end of input.
fn prompt(msg: &str) -> AppResult<Option<String>> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_yes_no(msg: &str) -> AppResult<Option<bool>> {
    loop {
        match prompt(msg)? {
            None => return Ok(None),
            Some(answer) => match answer.as_str() {
                "yes" | "y" => return Ok(Some(true)),
                "no" | "n" => return Ok(Some(false)),
                _ => println!("Please answer yes or no."),
            },
        }
    }
}

fn prompt_number(msg: &str) -> AppResult<Option<usize>> {
    loop {
        match prompt(msg)? {
            None => return Ok(None),
            Some(answer) => match answer.parse::<usize>() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => println!("Please enter a number."),
            },
        }
    }
}

fn train_label(t: &TrainRecord) -> String {
    match t.name {
        Some(ref name) => format!("{} \"{}\"", t.id, name),
        None => format!("{}", t.id),
    }
}

/// Presents resolver errors as rejected requests; the console keeps
/// running.
fn rejected(e: &DispatchError) {
    println!("Request rejected: {}", e);
}

fn same_track_conflict(timetable: &Timetable) -> AppResult<()> {
    println!("");
    println!("-- Same-track conflict --");
    let train_a = match prompt_number("Train A id: ")? { Some(n) => n, None => return Ok(()) };
    let train_b = match prompt_number("Train B id: ")? { Some(n) => n, None => return Ok(()) };
    let cp = |msg: &str| -> AppResult<Option<Checkpoint>> {
        loop {
            match prompt_number(msg)? {
                None => return Ok(None),
                Some(n) if n <= 255 => match Checkpoint::new(n as u8) {
                    Ok(cp) => return Ok(Some(cp)),
                    Err(e) => println!("{}", e),
                },
                Some(_) => println!("Checkpoint level must be 1-5."),
            }
        }
    };
    let checkpoint_a = match cp("Checkpoint level for train A (1-5): ")? { Some(c) => c, None => return Ok(()) };
    let checkpoint_b = match cp("Checkpoint level for train B (1-5): ")? { Some(c) => c, None => return Ok(()) };

    let classifier = PrecedenceRule;
    let resolver = Resolver::new(timetable, &classifier);
    match resolver.same_track(train_a, train_b, checkpoint_a, checkpoint_b) {
        Ok(r) => print!("{}", report::resolution(&Resolution::SameTrack(r))?),
        Err(e) => rejected(&e),
    }
    Ok(())
}

fn delay_conflict(timetable: &Timetable) -> AppResult<()> {
    println!("");
    println!("-- Delay conflict --");
    let delayed: TrainId = match prompt_number("Delayed train id: ")? { Some(n) => n, None => return Ok(()) };

    let classifier = PrecedenceRule;
    let resolver = Resolver::new(timetable, &classifier);
    let mut run = match resolver.cascade_run(delayed, false) {
        Ok(run) => run,
        Err(e) => { rejected(&e); return Ok(()); }
    };

    println!("Delayed train {} holds the junction block; {} upcoming trains.",
             train_label(run.delayed()), run.remaining());

    while let Some(next) = run.peek() {
        let arrival = next.arrival.map(|t| t.to_string()).unwrap_or_default();
        println!("");
        println!("Upcoming train {} (arrival {})", train_label(next), arrival);

        let delayed_cleared = match run.phase() {
            CascadePhase::AwaitingClearance => {
                match prompt_yes_no("Has the delayed train cleared the junction? (yes/no): ")? {
                    Some(answer) => answer,
                    None => return Ok(()), // abandoned run, no side effects
                }
            }
            CascadePhase::Cleared => true,
        };
        let main_line_free = if delayed_cleared {
            match prompt_yes_no("Is the main line free for this train? (yes/no): ")? {
                Some(answer) => answer,
                None => return Ok(()),
            }
        } else {
            false
        };

        let signals = ClearanceReport {
            delayed_cleared: delayed_cleared,
            main_line_free: main_line_free,
        };
        match run.step(signals) {
            Ok(decision) => match decision.speed_limit_kmh {
                Some(v) => println!("  -> train {} {} | speed {} km/h ({})",
                                    decision.train, decision.track.wire_name(),
                                    v, decision.reason.text()),
                None => println!("  -> train {} {} ({})",
                                 decision.train, decision.track.wire_name(),
                                 decision.reason.text()),
            },
            Err(e) => { rejected(&e); return Ok(()); }
        }
    }
    println!("");
    println!("All upcoming trains dispatched.");
    Ok(())
}

fn run(opt :&Opt) -> AppResult<()> {
    let timetable = arbiter::get_timetable(&opt.timetable)?;
    println!("Loaded timetable with {} trains.", timetable.trains().len());

    loop {
        println!("");
        println!("=== Junction dispatch console ===");
        println!(" 1. same-track conflict");
        println!(" 2. delay conflict");
        println!(" 3. exit");
        match prompt("select> ")? {
            None => break,
            Some(choice) => match choice.as_str() {
                "1" => same_track_conflict(&timetable)?,
                "2" => delay_conflict(&timetable)?,
                "3" => break,
                _ => println!("Invalid option."),
            },
        }
    }
    Ok(())
}

pub fn main() {
    let opt = Opt::from_args();
    match run(&opt) {
        Ok(()) => {},
        Err(e) => {
            println!("Error:\n{}", e.as_fail());
            std::process::exit(1);
        },
    }
}
