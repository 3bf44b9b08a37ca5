use regex::Regex;
use std::collections::HashMap;
use std::fmt;

pub type TrainId = usize;

/// Time of day as minutes since midnight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(pub u16);

impl TimeOfDay {
    /// Parses "HH:MM" clock time. Out-of-range fields are rejected here,
    /// before the record can enter any ordering.
    pub fn parse(s: &str) -> Result<TimeOfDay, ParseError> {
        let re = Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*$")
            .map_err(|e| ParseError::RegexError(format!("{:?}", e)))?;
        let groups = re.captures(s).ok_or_else(|| ParseError::TimeFormat(s.to_string()))?;
        let h = groups[1].parse::<u16>().map_err(|_e| ParseError::NumberError)?;
        let m = groups[2].parse::<u16>().map_err(|_e| ParseError::NumberError)?;
        if h >= 24 || m >= 60 {
            return Err(ParseError::TimeFormat(s.to_string()));
        }
        Ok(TimeOfDay(h * 60 + m))
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

#[derive(Debug, Clone)]
pub struct TrainRecord {
    pub id: TrainId,
    pub name: Option<String>,
    pub arrival: Option<TimeOfDay>, // absent = unscheduled
    pub priority: u8,               // lower value = higher precedence
    pub max_speed_kmh: f64,
}

#[derive(Debug, Fail)]
pub enum ParseError {
    #[fail(display = "error in regular expression: {}", _0)]
    RegexError(String),
    #[fail(display = "error converting number")]
    NumberError,
    #[fail(display = "unparsable clock time: {}", _0)]
    TimeFormat(String),
    #[fail(display = "unrecognized timetable record: {}", _0)]
    Unrecognized(String),
    #[fail(display = "duplicate train id {}", _0)]
    DuplicateTrain(TrainId),
    #[fail(display = "train {} has non-positive maximum speed", _0)]
    NonPositiveSpeed(TrainId),
}

/// Read-only daily timetable snapshot. Built once, then only queried;
/// resolution calls never mutate it.
#[derive(Debug)]
pub struct Timetable {
    trains: Vec<TrainRecord>,
    index: HashMap<TrainId, usize>,
}

impl Timetable {
    pub fn new(trains: Vec<TrainRecord>) -> Result<Timetable, ParseError> {
        let mut index = HashMap::new();
        for (i, train) in trains.iter().enumerate() {
            if !(train.max_speed_kmh > 0.0) {
                return Err(ParseError::NonPositiveSpeed(train.id));
            }
            if index.insert(train.id, i).is_some() {
                return Err(ParseError::DuplicateTrain(train.id));
            }
        }
        Ok(Timetable { trains: trains, index: index })
    }

    pub fn get(&self, id: TrainId) -> Option<&TrainRecord> {
        self.index.get(&id).map(|&i| &self.trains[i])
    }

    pub fn trains(&self) -> &[TrainRecord] {
        &self.trains
    }

    /// Trains scheduled strictly later than the given time, ordered by
    /// arrival time, ties by ascending train id. Unscheduled trains are
    /// excluded -- they cannot be time-ordered.
    pub fn upcoming_after(&self, t: TimeOfDay) -> Vec<&TrainRecord> {
        let mut upcoming: Vec<&TrainRecord> = self.trains
            .iter()
            .filter(|r| match r.arrival {
                Some(a) => a > t,
                None => false,
            })
            .collect();
        upcoming.sort_by_key(|r| (r.arrival, r.id));
        upcoming
    }
}

/// Parses the daily schedule format, one record per line:
///
/// * `104, Coastal Express, 09:45, 2, 110`
/// * `301, , , 4, 80`            (unscheduled train)
/// * `# comment`
///
/// Fields: train id, name (may be empty), arrival time "HH:MM" (may be
/// empty), priority, maximum speed in km/h.
pub fn parse_timetable(input: &str) -> Result<Vec<TrainRecord>, ParseError> {
    let record_re = Regex::new(r"(?x) ^ \s* (?P<id>\d+) \s* ,
            \s* (?P<name>[^,]*?) \s* ,
            \s* (?P<arr>(?:\d{1,2}:\d{2})?) \s* ,
            \s* (?P<pri>\d+) \s* ,
            \s* (?P<speed>[\d\.]+) \s*
            $").map_err(|e| ParseError::RegexError(format!("{:?}", e)))?;

    let mut records = Vec::new();
    for line in input.lines() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        match record_re.captures(line) {
            Some(groups) => {
                let arrival = if groups["arr"].is_empty() {
                    None
                } else {
                    Some(TimeOfDay::parse(&groups["arr"])?)
                };
                let name = if groups["name"].is_empty() {
                    None
                } else {
                    Some(groups["name"].to_string())
                };
                records.push(TrainRecord {
                    id: groups["id"].parse::<TrainId>().map_err(|_e| ParseError::NumberError)?,
                    name: name,
                    arrival: arrival,
                    priority: groups["pri"].parse::<u8>().map_err(|_e| ParseError::NumberError)?,
                    max_speed_kmh: groups["speed"].parse::<f64>().map_err(|_e| ParseError::NumberError)?,
                });
            }
            None => return Err(ParseError::Unrecognized(line.to_string())),
        }
    }
    Ok(records)
}

#[test]
fn test_clock_time() {
    assert_eq!(TimeOfDay::parse("09:45").unwrap(), TimeOfDay(9 * 60 + 45));
    assert_eq!(TimeOfDay::parse("00:00").unwrap(), TimeOfDay(0));
    assert_eq!(TimeOfDay::parse("23:59").unwrap().to_string(), "23:59");
    assert!(TimeOfDay::parse("24:00").is_err());
    assert!(TimeOfDay::parse("12:60").is_err());
    assert!(TimeOfDay::parse("945").is_err());
}
