use crate::*;

use crate::classify::*;
use crate::input::request::{parse_requests, Checkpoint, Disruption};
use crate::input::timetable::{parse_timetable, ParseError, TimeOfDay, Timetable, TrainRecord};
use crate::resolve::cascade::{CascadePhase, CascadeRun, ClearanceReport};
use crate::resolve::*;

fn train(id: usize, arrival: Option<&str>, priority: u8, max_speed: f64) -> TrainRecord {
    TrainRecord {
        id: id,
        name: None,
        arrival: arrival.map(|s| TimeOfDay::parse(s).unwrap()),
        priority: priority,
        max_speed_kmh: max_speed,
    }
}

/// Delayed train 100 (priority 2, 10:00) with a mix of earlier, later,
/// tied, unscheduled and higher/lower priority traffic around it.
fn corridor() -> Timetable {
    Timetable::new(vec![
        train(100, Some("10:00"), 2, 100.0),
        train(205, Some("10:30"), 5, 80.0),   // later, lower precedence
        train(101, Some("10:15"), 1, 130.0),  // later, higher precedence
        train(307, Some("10:15"), 2, 110.0),  // same arrival as 101, equal priority to delayed
        train(401, Some("09:30"), 1, 120.0),  // earlier -- not part of the cascade
        train(555, None, 1, 160.0),           // unscheduled -- cannot be ordered
        train(208, Some("10:00"), 3, 90.0),   // same arrival as delayed -- not strictly later
    ]).unwrap()
}

fn cp(level: u8) -> Checkpoint {
    Checkpoint::new(level).unwrap()
}

struct OfflineClassifier;

impl Classifier for OfflineClassifier {
    fn classify(&self, _features: &Features) -> Result<Classification, ClassifierError> {
        Err(ClassifierError::Unavailable("inference backend down".to_string()))
    }
}

// Delay cascade

#[test]
fn cascade_orders_by_arrival_then_id() {
    let timetable = corridor();
    let mut run = CascadeRun::new(&timetable, 100, false).unwrap();
    let mut order = Vec::new();
    while let Some(t) = run.peek() {
        order.push(t.id);
        run.step(ClearanceReport { delayed_cleared: false, main_line_free: true }).unwrap();
    }
    // 10:15 before 10:30; the 10:15 tie by ascending id; 09:30, the 10:00
    // tie and the unscheduled train never appear.
    assert_eq!(order, vec![101, 307, 205]);
}

#[test]
fn cascade_holds_not_higher_priority() {
    // Delayed priority 2; upcoming priority 5 holds while the block is
    // fouled.
    let timetable = corridor();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    let decisions = resolver.delay_cascade(100, false).unwrap();

    let d205 = decisions.iter().find(|d| d.train == 205).unwrap();
    assert_eq!(d205.track, Track::LoopLine);
    assert_eq!(d205.reason.text(), "waiting for delayed train to clear junction");
    assert_eq!(d205.speed_limit_kmh, Some(48)); // floor(80 * 0.6)

    // Equal priority is "not higher" -- holds too.
    let d307 = decisions.iter().find(|d| d.train == 307).unwrap();
    assert_eq!(d307.track, Track::LoopLine);
    assert_eq!(d307.speed_limit_kmh, Some(66)); // floor(110 * 0.6)
}

#[test]
fn cascade_releases_strictly_higher_priority() {
    let timetable = corridor();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    let decisions = resolver.delay_cascade(100, false).unwrap();

    let d101 = decisions.iter().find(|d| d.train == 101).unwrap();
    assert_eq!(d101.track, Track::MainLine);
    assert_eq!(d101.reason.text(), "higher priority than delayed train");
    assert_eq!(d101.speed_limit_kmh, None);
}

#[test]
fn cascade_cleared_releases_everyone() {
    let timetable = corridor();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    let decisions = resolver.delay_cascade(100, true).unwrap();

    assert_eq!(decisions.len(), 3);
    for d in &decisions {
        assert_eq!(d.track, Track::MainLine);
        assert_eq!(d.reason.text(), "delayed train cleared junction");
        assert_eq!(d.speed_limit_kmh, None);
    }
}

#[test]
fn cascade_hold_and_release_partition() {
    use maplit::hashset;
    use std::collections::HashSet;

    let timetable = corridor();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    let decisions = resolver.delay_cascade(100, false).unwrap();

    let held: HashSet<usize> = decisions.iter()
        .filter(|d| d.track == Track::LoopLine)
        .map(|d| d.train)
        .collect();
    let released: HashSet<usize> = decisions.iter()
        .filter(|d| d.track == Track::MainLine)
        .map(|d| d.train)
        .collect();
    assert_eq!(held, hashset!{205, 307});
    assert_eq!(released, hashset!{101});
}

#[test]
fn cascade_clearance_is_monotonic() {
    let timetable = corridor();
    let mut run = CascadeRun::new(&timetable, 100, false).unwrap();
    assert_eq!(run.phase(), CascadePhase::AwaitingClearance);

    // First train evaluated while the block is still fouled.
    let first = run.step(ClearanceReport { delayed_cleared: false, main_line_free: true }).unwrap();
    assert_eq!(first.reason, Reason::HigherPriorityThanDelayed); // train 101

    // Clearance arrives with the second step; the same step is already
    // evaluated under the cleared rules.
    let second = run.step(ClearanceReport { delayed_cleared: true, main_line_free: true }).unwrap();
    assert_eq!(run.phase(), CascadePhase::Cleared);
    assert_eq!(second.reason, Reason::DelayedTrainCleared);

    // A later report cannot re-foul the block.
    let third = run.step(ClearanceReport { delayed_cleared: false, main_line_free: true }).unwrap();
    assert_eq!(run.phase(), CascadePhase::Cleared);
    assert_eq!(third.reason, Reason::DelayedTrainCleared);
}

#[test]
fn cascade_cleared_but_main_line_occupied() {
    let timetable = corridor();
    let mut run = CascadeRun::new(&timetable, 100, true).unwrap();

    let d = run.step(ClearanceReport { delayed_cleared: true, main_line_free: false }).unwrap();
    assert_eq!(d.train, 101);
    assert_eq!(d.track, Track::LoopLine);
    assert_eq!(d.reason.text(), "main line occupied");
    assert_eq!(d.speed_limit_kmh, Some(78)); // floor(130 * 0.6)
}

#[test]
fn cascade_mark_cleared_between_steps() {
    let timetable = corridor();
    let mut run = CascadeRun::new(&timetable, 100, false).unwrap();
    run.mark_cleared();
    run.mark_cleared(); // idempotent
    assert_eq!(run.phase(), CascadePhase::Cleared);

    let d = run.step(ClearanceReport { delayed_cleared: false, main_line_free: true }).unwrap();
    assert_eq!(d.reason, Reason::DelayedTrainCleared);
}

#[test]
fn cascade_step_after_exhaustion_is_state_misuse() {
    let timetable = corridor();
    let mut run = CascadeRun::new(&timetable, 100, true).unwrap();
    let report = ClearanceReport { delayed_cleared: true, main_line_free: true };
    while !run.is_exhausted() {
        run.step(report).unwrap();
    }
    match run.step(report) {
        Err(DispatchError::RunExhausted) => {}
        other => panic!("expected RunExhausted, got {:?}", other),
    }
}

#[test]
fn cascade_unknown_delayed_train() {
    let timetable = corridor();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    match resolver.delay_cascade(999, false) {
        Err(DispatchError::UnknownTrain(999)) => {}
        other => panic!("expected UnknownTrain, got {:?}", other),
    }
}

#[test]
fn cascade_unscheduled_delayed_train() {
    let timetable = corridor();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    match resolver.delay_cascade(555, false) {
        Err(DispatchError::UnscheduledTrain(555)) => {}
        other => panic!("expected UnscheduledTrain, got {:?}", other),
    }
}

// Same-track conflict

#[test]
fn same_track_equal_priority_checkpoint_decides() {
    // Two priority-1 trains, checkpoints 3 vs 5: the train further along
    // holds right of way, the other yields with the capped speed.
    let timetable = Timetable::new(vec![
        train(104, Some("09:45"), 1, 130.0),
        train(205, Some("09:50"), 1, 110.0),
    ]).unwrap();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);

    let r = resolver.same_track(104, 205, cp(3), cp(5)).unwrap();
    assert_eq!(r.priority_train.train, 205);
    assert_eq!(r.priority_train.track, Track::MainLine);
    assert_eq!(r.priority_train.speed_limit_kmh, None);
    assert_eq!(r.reduced_train.train, 104);
    assert_eq!(r.reduced_train.track, Track::LoopLine);
    assert_eq!(r.reduced_train.speed_limit_kmh, Some(78)); // floor(130 * 0.6)
}

#[test]
fn same_track_is_deterministic() {
    let timetable = corridor();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    let first = resolver.same_track(205, 307, cp(2), cp(4)).unwrap();
    for _ in 0..10 {
        let again = resolver.same_track(205, 307, cp(2), cp(4)).unwrap();
        assert_eq!(again.priority_train, first.priority_train);
        assert_eq!(again.reduced_train, first.reduced_train);
    }
}

#[test]
fn same_track_unknown_train_yields_no_decisions() {
    let timetable = corridor();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    match resolver.same_track(100, 999, cp(1), cp(1)) {
        Err(DispatchError::UnknownTrain(999)) => {}
        other => panic!("expected UnknownTrain, got {:?}", other),
    }
}

#[test]
fn same_track_self_conflict_rejected() {
    let timetable = corridor();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    match resolver.same_track(100, 100, cp(1), cp(2)) {
        Err(DispatchError::SelfConflict(100)) => {}
        other => panic!("expected SelfConflict, got {:?}", other),
    }
}

#[test]
fn same_track_classifier_failure_propagates() {
    // An unavailable classifier must never be resolved by a default
    // winner.
    let timetable = corridor();
    let classifier = OfflineClassifier;
    let resolver = Resolver::new(&timetable, &classifier);
    match resolver.same_track(100, 205, cp(1), cp(2)) {
        Err(DispatchError::Classifier(ClassifierError::Unavailable(_))) => {}
        other => panic!("expected Classifier error, got {:?}", other),
    }
}

#[test]
fn speed_cap_law() {
    // Every loop-line decision carries exactly floor(max_speed * 0.6);
    // main-line decisions never carry a cap.
    let timetable = Timetable::new(vec![
        train(1, Some("08:00"), 2, 100.0),
        train(2, Some("08:10"), 3, 82.5),  // floor(49.5) = 49
        train(3, Some("08:20"), 4, 67.0),  // floor(40.2) = 40
        train(4, Some("08:30"), 1, 160.0),
    ]).unwrap();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    let decisions = resolver.delay_cascade(1, false).unwrap();

    for d in &decisions {
        let record = timetable.get(d.train).unwrap();
        match d.track {
            Track::LoopLine => {
                assert_eq!(d.speed_limit_kmh,
                           Some((record.max_speed_kmh * 0.6).floor() as u32));
            }
            Track::MainLine => assert_eq!(d.speed_limit_kmh, None),
        }
    }
    assert_eq!(decisions.iter().find(|d| d.train == 2).unwrap().speed_limit_kmh, Some(49));
    assert_eq!(decisions.iter().find(|d| d.train == 3).unwrap().speed_limit_kmh, Some(40));
}

// Library entry point

#[test]
fn resolve_disruption_routes_both_protocols() {
    let timetable = corridor();
    let classifier = PrecedenceRule;

    let cascade = resolve_disruption(&timetable, &classifier,
        &Disruption::Delay { train: 100, cleared: false }).unwrap();
    match cascade {
        Resolution::Cascade(ref decisions) => assert_eq!(decisions.len(), 3),
        ref other => panic!("expected cascade resolution, got {:?}", other),
    }

    let pair = resolve_disruption(&timetable, &classifier,
        &Disruption::SameTrack {
            train_a: 101, train_b: 205,
            checkpoint_a: cp(1), checkpoint_b: cp(5),
        }).unwrap();
    match pair {
        Resolution::SameTrack(ref st) => {
            // Priority 1 beats priority 5 regardless of checkpoints.
            assert_eq!(st.priority_train.train, 101);
            assert_eq!(st.reduced_train.train, 205);
        }
        ref other => panic!("expected same-track resolution, got {:?}", other),
    }
}

// Input parsing

#[test]
fn parse_timetable_records() {
    let input = "# daily corridor schedule\n\
                 104, Coastal Express, 09:45, 2, 110\n\
                 \n\
                 205, , 10:30, 5, 80.5\n\
                 301, Yard Shunter, , 4, 60\n";
    let records = parse_timetable(input).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].id, 104);
    assert_eq!(records[0].name.as_ref().unwrap(), "Coastal Express");
    assert_eq!(records[0].arrival, Some(TimeOfDay::parse("09:45").unwrap()));
    assert_eq!(records[0].priority, 2);
    assert_eq!(records[1].name, None);
    assert_eq!(records[1].max_speed_kmh, 80.5);
    assert_eq!(records[2].arrival, None);
}

#[test]
fn parse_timetable_rejects_garbage() {
    assert!(parse_timetable("104, Express, 9:45").is_err());
    assert!(parse_timetable("104, Express, 25:00, 2, 110").is_err());
    assert!(parse_timetable("not a record").is_err());
}

#[test]
fn timetable_rejects_duplicates_and_bad_speeds() {
    match Timetable::new(vec![train(7, None, 1, 100.0), train(7, None, 2, 90.0)]) {
        Err(ParseError::DuplicateTrain(7)) => {}
        other => panic!("expected DuplicateTrain, got {:?}", other),
    }
    match Timetable::new(vec![train(8, None, 1, 0.0)]) {
        Err(ParseError::NonPositiveSpeed(8)) => {}
        other => panic!("expected NonPositiveSpeed, got {:?}", other),
    }
}

#[test]
fn parse_disruption_requests() {
    let input = "# morning incidents\n\
                 delay 104\n\
                 delay 205 cleared\n\
                 conflict 104 205 a=3 b=5\n";
    let requests = parse_requests(input).unwrap();
    assert_eq!(requests.len(), 3);
    match requests[0] {
        Disruption::Delay { train: 104, cleared: false } => {}
        ref other => panic!("unexpected request {:?}", other),
    }
    match requests[1] {
        Disruption::Delay { train: 205, cleared: true } => {}
        ref other => panic!("unexpected request {:?}", other),
    }
    match requests[2] {
        Disruption::SameTrack { train_a: 104, train_b: 205, checkpoint_a, checkpoint_b } => {
            assert_eq!(checkpoint_a.level(), 3);
            assert_eq!(checkpoint_b.level(), 5);
        }
        ref other => panic!("unexpected request {:?}", other),
    }
}

#[test]
fn parse_requests_rejects_bad_checkpoints() {
    use crate::input::request::ParseError;
    match parse_requests("conflict 104 205 a=0 b=5") {
        Err(ParseError::CheckpointRange(0)) => {}
        other => panic!("expected CheckpointRange, got {:?}", other),
    }
    match parse_requests("conflict 104 205 a=3 b=6") {
        Err(ParseError::CheckpointRange(6)) => {}
        other => panic!("expected CheckpointRange, got {:?}", other),
    }
    assert!(parse_requests("hold all trains").is_err());
}

// Presenters

#[test]
fn json_same_track_response_shape() {
    let timetable = Timetable::new(vec![
        train(104, Some("09:45"), 1, 130.0),
        train(205, Some("09:50"), 1, 110.0),
    ]).unwrap();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    let r = resolver.same_track(104, 205, cp(3), cp(5)).unwrap();

    let mut out = Vec::new();
    output::json::same_track(&r, &mut out).unwrap();
    let json = String::from_utf8(out).unwrap();
    assert_eq!(json,
        "{ \"priority_train\": 205, \"reduced_train\": 104, \
         \"suggested_speed_kmh\": 78, \"confidence\": 1, \
         \"reason\": \"yields right of way at junction\" }");
}

#[test]
fn json_cascade_response_shape() {
    let timetable = corridor();
    let classifier = PrecedenceRule;
    let resolver = Resolver::new(&timetable, &classifier);
    let decisions = resolver.delay_cascade(100, false).unwrap();

    let mut out = Vec::new();
    output::json::cascade(&decisions, &mut out).unwrap();
    let json = String::from_utf8(out).unwrap();
    assert!(json.starts_with("[{ \"train_id\": 101, \"decision\": \"MAIN_LINE\", \
                              \"reason\": \"higher priority than delayed train\" }"));
    assert!(json.contains("\"train_id\": 205, \"decision\": \"LOOP_LINE\", \
                           \"speed_limit_kmh\": 48"));
}

#[test]
fn report_lists_every_decision() {
    let timetable = corridor();
    let classifier = PrecedenceRule;
    let r = resolve_disruption(&timetable, &classifier,
        &Disruption::Delay { train: 100, cleared: false }).unwrap();
    let text = output::report::resolution(&r).unwrap();
    assert!(text.starts_with("# Delay cascade: 3 upcoming trains\n"));
    assert_eq!(text.lines().count(), 4);
    assert!(text.contains("> train 205 LOOP_LINE | speed 48 km/h"));
}
