//! Trial log parsing.
//!
//! The trial log is an append-only plain-text file. A job-start marker line
//! begins a new job and the following line is the job title; a section
//! marker line begins a new section and the following line is the section
//! title (which is also the first body line). Everything before the first
//! job marker is ignored, and a job that accumulated no sections is dropped.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Literal line that begins a new job in the trial log.
pub const JOB_START_MARKER: &str = "==================== NEW JOB ====================";

/// Literal line that begins a new section within a job.
pub const SECTION_MARKER: &str = "-------------------- SECTION --------------------";

/// Platform line separator used when joining section bodies.
#[cfg(windows)]
const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
const LINE_SEPARATOR: &str = "\n";

pub type TrialLogResult<T> = std::result::Result<T, TrialLogError>;

#[derive(Debug, Error)]
pub enum TrialLogError {
    /// The log contained no job with at least one section.
    #[error("trial log had no valid jobs in it")]
    NoValidJobs,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Job flavor, derived from the title prefix. Display hint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Search,
    CrossValidate,
    Other,
}

impl JobKind {
    fn classify(title: &str) -> Self {
        if title.starts_with("Search ") {
            Self::Search
        } else if title.starts_with("Cross-Validate ") {
            Self::CrossValidate
        } else {
            Self::Other
        }
    }
}

/// Section flavor, derived from the title prefix. Display hint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Result,
}

impl SectionKind {
    fn classify(title: &str) -> Self {
        if title.starts_with("Summary ") {
            Self::Summary
        } else {
            Self::Result
        }
    }
}

/// One section of a job: a title plus its accumulated body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub kind: SectionKind,
    /// Body lines (title line included) joined with the platform separator.
    pub body: String,
}

/// One job: a title plus its ordered sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub kind: JobKind,
    pub sections: Vec<Section>,
}

/// A parsed trial log. Read-only after construction; a new load replaces
/// the previous log wholly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialLog {
    pub jobs: Vec<Job>,
}

/// What ended a job while reading it.
enum JobEnd {
    Eof,
    NextJob,
}

impl TrialLog {
    /// Parses a snapshot of the trial log text.
    ///
    /// Malformed middle content is skipped silently; only the total absence
    /// of any valid job is an error.
    pub fn parse(text: &str) -> TrialLogResult<Self> {
        let mut lines = text.lines();

        // Find the first job. Everything before it is ignored.
        if !lines.any(|line| line == JOB_START_MARKER) {
            return Err(TrialLogError::NoValidJobs);
        }

        // We are now positioned immediately after a job-start marker.
        let mut jobs = Vec::new();
        while let Some(title) = lines.next() {
            let (job, end) = read_job(title, &mut lines);
            if let Some(job) = job {
                jobs.push(job);
            }
            if matches!(end, JobEnd::Eof) {
                break;
            }
        }

        if jobs.is_empty() {
            return Err(TrialLogError::NoValidJobs);
        }
        debug!(jobs = jobs.len(), "Trial log parsed");
        Ok(Self { jobs })
    }

    /// Reads and parses the trial log file at `path`.
    pub fn load(path: impl AsRef<Path>) -> TrialLogResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

/// Reads one job whose title line has already been consumed. Returns the
/// job (or `None` when it accumulated no sections) and what ended it.
fn read_job<'a>(title: &str, lines: &mut impl Iterator<Item = &'a str>) -> (Option<Job>, JobEnd) {
    let mut job = Job {
        title: title.to_string(),
        kind: JobKind::classify(title),
        sections: Vec::new(),
    };
    let mut current: Option<(String, Vec<String>)> = None;
    let mut end = JobEnd::Eof;

    while let Some(line) = lines.next() {
        match line {
            JOB_START_MARKER => {
                end = JobEnd::NextJob;
                break;
            }
            SECTION_MARKER => {
                if let Some((section_title, body)) = current.take() {
                    job.sections.push(close_section(section_title, &body));
                }
                // The section title is on the next line; a marker at
                // end-of-input opens nothing.
                if let Some(section_title) = lines.next() {
                    current =
                        Some((section_title.to_string(), vec![section_title.to_string()]));
                }
            }
            _ => {
                // A data line. Lines outside any section are dropped when
                // the job ends without one.
                if let Some((_, body)) = current.as_mut() {
                    body.push(line.to_string());
                }
            }
        }
    }

    // Save the residual section.
    if let Some((section_title, body)) = current.take() {
        job.sections.push(close_section(section_title, &body));
    }

    if job.sections.is_empty() {
        (None, end)
    } else {
        (Some(job), end)
    }
}

fn close_section(title: String, body: &[String]) -> Section {
    Section {
        kind: SectionKind::classify(&title),
        body: body.join(LINE_SEPARATOR),
        title,
    }
}
