//! Kiln Trials
//!
//! Parsing of the append-only trial log written by training runs into a
//! read-only tree of jobs and sections.

pub mod parser;

pub use parser::{
    Job, JobKind, Section, SectionKind, TrialLog, TrialLogError, TrialLogResult,
    JOB_START_MARKER, SECTION_MARKER,
};
