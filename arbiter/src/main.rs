use arbiter::*;
use std::path::PathBuf;
use structopt::StructOpt;

/// Arbiter -- junction conflict arbitration for single-track corridors
#[derive(StructOpt, Debug)]
#[structopt(name="arbiter")]
struct Opt {
    /// Verbose mode (-v, -vv)
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: u8,

    /// Daily timetable file
    #[structopt(parse(from_os_str))]
    timetable: PathBuf,

    /// Disruption request file, one request per line
    #[structopt(parse(from_os_str))]
    disruptions: PathBuf,

    /// Output JSON responses file
    #[structopt(short = "j", long = "json", parse(from_os_str))]
    json: Option<PathBuf>,
}

fn run(opt :&Opt) -> AppResult<()> {
    // Timetable
    let timetable = get_timetable(&opt.timetable)?;
    if opt.verbose >= 2 {
        println!("Timetable:");
        for x in timetable.trains() {
            println!("  * {:?}", x);
        }
    }

    // Disruption requests
    let requests = get_requests(&opt.disruptions)?;
    if opt.verbose >= 1 {
        println!("Disruptions:");
        for x in &requests { println!("  - {:?}", x); }
        println!("");
    }

    // Resolve -> decisions
    let classifier = classify::PrecedenceRule;
    let mut resolutions = Vec::new();
    for disruption in &requests {
        let resolution = resolve_disruption(&timetable, &classifier, disruption)?;
        print!("{}", output::report::resolution(&resolution)?);
        resolutions.push(resolution);
    }

    if let Some(ref json) = opt.json {
        use std::fs::File;
        use std::io::BufWriter;
        let file = File::create(json)?;
        let mut writer = BufWriter::new(&file);
        output::json::resolutions(&resolutions, &mut writer)?;
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
