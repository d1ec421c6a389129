// used for the instants that moments carry
use chrono::{DateTime, Utc};

// used to compile pattern sources into matchers
use regex::{Regex, RegexBuilder};

// used to print out readable forms of a data type
use std::fmt;
// used to indicate that data types need to be hashable
use std::hash::{Hash, Hasher};

use crate::error::Result;

// ------------- Moment -------------
/// An instant in time with millisecond precision.
///
/// A moment is an immutable leaf in a value graph. It has identity when held
/// through a [`crate::construct::Value::Moment`] handle, so two moments may
/// carry the same instant yet be distinct moments.
#[derive(Eq, PartialEq, PartialOrd, Ord, Debug, Hash, Clone)]
pub struct Moment {
    millis: i64,
}

impl Moment {
    pub fn now() -> Moment {
        Moment { millis: Utc::now().timestamp_millis() }
    }
    pub fn from_millis(millis: i64) -> Moment {
        Moment { millis }
    }
    /// Parses an RFC 3339 timestamp, truncated to millisecond precision.
    pub fn parse(s: &str) -> Option<Moment> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Moment { millis: dt.timestamp_millis() })
    }
    pub fn millis(&self) -> i64 {
        self.millis
    }
    /// The instant as a chrono datetime, if it is within chrono's range.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.millis)
    }
}
impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "@{}ms", self.millis),
        }
    }
}

// ------------- Pattern -------------
/// Matching-mode flags for a pattern.
#[derive(Eq, PartialEq, PartialOrd, Ord, Debug, Hash, Clone, Copy, Default)]
pub struct PatternFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_newline: bool,
}

impl PatternFlags {
    /// Parses the usual single-letter mode string, e.g. "i", "im", "s".
    /// Unknown letters yield None.
    pub fn parse(modes: &str) -> Option<PatternFlags> {
        let mut flags = PatternFlags::default();
        for c in modes.chars() {
            match c {
                'i' => flags.case_insensitive = true,
                'm' => flags.multi_line = true,
                's' => flags.dot_matches_newline = true,
                _ => return None,
            }
        }
        Some(flags)
    }
}
impl fmt::Display for PatternFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.case_insensitive {
            write!(f, "i")?;
        }
        if self.multi_line {
            write!(f, "m")?;
        }
        if self.dot_matches_newline {
            write!(f, "s")?;
        }
        Ok(())
    }
}

/// A textual pattern together with its matching-mode flags and the compiled
/// matcher for them.
///
/// Patterns are immutable after creation. Equality and hashing go by source
/// text and flags only, since the compiled matcher is fully determined by
/// those two.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    flags: PatternFlags,
    matcher: Regex,
}

impl Pattern {
    pub fn new(source: &str, flags: PatternFlags) -> Result<Pattern> {
        let matcher = RegexBuilder::new(source)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_matches_newline)
            .build()?;
        Ok(Pattern {
            source: source.to_owned(),
            flags,
            matcher,
        })
    }
    pub fn source(&self) -> &str {
        &self.source
    }
    pub fn flags(&self) -> PatternFlags {
        self.flags
    }
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}
impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}
impl Eq for Pattern {}
impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.flags.hash(state);
    }
}
impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}
