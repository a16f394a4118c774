use std::fmt;
use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
    Read,
    Seek,
    SeekFrom,
};
use std::path::Path;

use anyhow::{
    bail,
    Context,
};
use chrono::{
    Duration,
    NaiveDateTime,
};
use log::warn;
use memchr::memrchr;
use regex::Regex;

use crate::types::Result;


const STARTED_MARKER: &str = "Started mdrun on";
const STARTED_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// How far back each read reaches while reconstructing lines from the end of
/// the log. GROMACS energy lines are well under this.
const TAIL_CHUNK: u64 = 8192;


/// The five quantities a progress projection needs, pulled from a GROMACS
/// md.log. The forward scan stops at the first Step/Time table header it
/// meets; later occurrences of any marker are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct MdLog {
    /// Integration time step in ps.
    pub dt: f64,

    /// Total step count of the run.
    pub nsteps: i64,

    /// Wall-clock time mdrun started.
    pub started: NaiveDateTime,

    /// First (step, time) sample of the run.
    pub first_step: f64,
    pub first_time: f64,

    /// Most recent (step, time) sample, taken from the end of the file.
    pub last_step: f64,
    pub last_time: f64,
}


impl MdLog {
    pub fn from_file(path: &(impl AsRef<Path> + ?Sized)) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("Log file {:?} not found.", path);
        }

        let head = scan_head(path)?;
        let tail = scan_tail(path)?;

        match (head.dt, head.nsteps, head.started, head.first_pair, tail) {
            (Some(dt), Some(nsteps), Some(started), Some((first_step, first_time)),
             Some((last_step, last_time))) => {
                Ok(Self {
                    dt,
                    nsteps,
                    started,
                    first_step,
                    first_time,
                    last_step,
                    last_time,
                })
            },
            _ => bail!("Required data not found in the log file {:?}.", path),
        }
    }

    /// Projects throughput and completion relative to `now`. Taking `now` as
    /// an argument keeps the arithmetic deterministic under test.
    pub fn report_at(&self, now: NaiveDateTime) -> ProgressReport {
        let total_ns = self.dt * self.nsteps as f64 / 1000.0;
        let current_ns = self.last_step * self.dt / 1000.0;

        let elapsed_days = (now - self.started).num_seconds() as f64 / 86400.0;
        let ns_per_day = if elapsed_days > 0.0 {
            current_ns / elapsed_days
        } else {
            0.0
        };

        let remaining_ns = total_ns - current_ns;
        let remaining_days = if ns_per_day > 0.0 {
            remaining_ns / ns_per_day
        } else {
            f64::INFINITY
        };

        let eta = if remaining_days.is_finite() {
            Some(now + Duration::seconds((remaining_days * 86400.0) as i64))
        } else {
            None
        };

        ProgressReport {
            started: self.started,
            eta,
            remaining_days,
            ns_per_day,
            current_ns,
            total_ns,
        }
    }
}


#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub started: NaiveDateTime,

    /// None when the throughput is zero and no projection is possible.
    pub eta: Option<NaiveDateTime>,

    pub remaining_days: f64,
    pub ns_per_day: f64,
    pub current_ns: f64,
    pub total_ns: f64,
}


impl ProgressReport {
    /// Remaining wall-clock time split into whole (days, hours, minutes).
    pub fn remaining_dhm(&self) -> Option<(i64, i64, i64)> {
        if !self.remaining_days.is_finite() {
            return None;
        }
        let secs = (self.remaining_days * 86400.0) as i64;
        Some((secs / 86400, secs % 86400 / 3600, secs % 3600 / 60))
    }
}


impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10} {}", "Start:", self.started.format("%m.%d %H:%M"))?;

        match self.eta {
            Some(eta) => writeln!(f, "{:<10} {}", "End:", eta.format("%m.%d %H:%M"))?,
            None => writeln!(f, "{:<10} unknown", "End:")?,
        }

        match self.remaining_dhm() {
            Some((d, h, m)) =>
                writeln!(f, "{:<10} {} days {} hours {} minutes", "Duration:", d, h, m)?,
            None => writeln!(f, "{:<10} unknown", "Duration:")?,
        }

        writeln!(f, "{:<10} {:.0}", "ns/day:", self.ns_per_day)?;
        writeln!(f, "{:<10} {:.0}/{:.0}", "Elapse:", self.current_ns, self.total_ns)?;
        Ok(())
    }
}


#[derive(Debug, Default)]
struct HeadScan {
    dt: Option<f64>,
    nsteps: Option<i64>,
    started: Option<NaiveDateTime>,
    first_pair: Option<(f64, f64)>,
}


/// Single pass from the top of the file. Captures the first occurrence of
/// each marker and stops as soon as the first Step/Time sample is read.
fn scan_head(path: &Path) -> Result<HeadScan> {
    let file = File::open(path)
        .context(format!("Failed to open log file {:?}.", path))?;
    let mut lines = BufReader::new(file).lines();
    let mut scan = HeadScan::default();

    while let Some(line) = lines.next() {
        let line = line?;
        let trimmed = line.trim();

        if scan.dt.is_none() && trimmed.starts_with("dt") {
            scan.dt = parse_keyed_value(trimmed);
        } else if scan.nsteps.is_none() && trimmed.starts_with("nsteps") {
            scan.nsteps = parse_keyed_value::<i64>(trimmed);
        } else if scan.started.is_none() && line.contains(STARTED_MARKER) {
            scan.started = parse_started(&line);
            if scan.started.is_none() {
                warn!("Unparsable mdrun start timestamp: {}", line.trim());
            }
        } else if line.contains("Step") && line.contains("Time") {
            let sample = lines.next()
                .transpose()?
                .unwrap_or_default();
            scan.first_pair = parse_pair(&sample);
            if scan.first_pair.is_none() {
                warn!("Unparsable first Step/Time sample: {}", sample.trim());
            }
            break;
        }
    }

    Ok(scan)
}


/// `key = value` lines from the input-parameter dump.
fn parse_keyed_value<T: std::str::FromStr>(line: &str) -> Option<T> {
    line.split('=')
        .nth(1)?
        .trim()
        .parse::<T>()
        .ok()
}


/// The start timestamp sits in the last five tokens of the marker line,
/// e.g. "Started mdrun on rank 0 node42 Fri Oct 27 10:45:30 2023".
fn parse_started(line: &str) -> Option<NaiveDateTime> {
    let caps = Regex::new(r"(\w{3})\s+(\w{3})\s+(\d{1,2})\s+(\d{1,2}:\d{2}:\d{2})\s+(\d{4})\s*$")
        .unwrap()
        .captures(line)?;
    let stamp = format!("{} {} {} {} {}", &caps[1], &caps[2], &caps[3], &caps[4], &caps[5]);
    NaiveDateTime::parse_from_str(&stamp, STARTED_FORMAT).ok()
}


fn parse_pair(line: &str) -> Option<(f64, f64)> {
    let mut tokens = line.split_whitespace();
    let step = tokens.next()?.parse::<f64>().ok()?;
    let time = tokens.next()?.parse::<f64>().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some((step, time))
}


/// Reads the file backwards in chunks, reconstructing lines in reverse, and
/// returns the last (step, time) sample. Energy-table headers are rejected
/// by requiring the first token to be purely numeric; lines passing that
/// check but not parsing as exactly two numbers are skipped.
fn scan_tail(path: &Path) -> Result<Option<(f64, f64)>> {
    let mut file = File::open(path)
        .context(format!("Failed to open log file {:?}.", path))?;
    let mut pos = file.seek(SeekFrom::End(0))?;

    // Bytes of the (yet incomplete) line spanning a chunk boundary.
    let mut pending: Vec<u8> = Vec::new();

    while pos > 0 {
        let size = TAIL_CHUNK.min(pos);
        pos -= size;
        file.seek(SeekFrom::Start(pos))?;

        let mut buf = vec![0u8; size as usize];
        file.read_exact(&mut buf)?;
        buf.extend_from_slice(&pending);

        while let Some(nl) = memrchr(b'\n', &buf) {
            if let Some(pair) = last_pair_from_line(&buf[nl + 1 ..]) {
                return Ok(Some(pair));
            }
            buf.truncate(nl);
        }
        pending = buf;
    }

    Ok(last_pair_from_line(&pending))
}


fn last_pair_from_line(bytes: &[u8]) -> Option<(f64, f64)> {
    let line = String::from_utf8_lossy(bytes);
    let first = line.split_whitespace().next()?;
    if first.is_empty() || !first.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    parse_pair(&line)
}
