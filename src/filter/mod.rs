//! Regex filter engine.
//!
//! A filter is an ordered list of case-insensitive patterns. Pattern `i` is
//! run against line `i` of a window of recent lines; the filter matches when
//! every pattern does, and the named variables of all patterns are bound to
//! their capture groups. Broken patterns never match.

mod history;

pub use history::LineHistory;

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{FilterEntry, RegexEntry};

/// Variable name to captured text.
pub type Bindings = BTreeMap<String, String>;

/// Why a pattern can never match.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("regex `{pattern}` does not compile: {source}")]
    Compile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("regex `{pattern}` declares {declared} variables but has {groups} capture groups")]
    Arity {
        pattern: String,
        declared: usize,
        groups: usize,
    },
}

/// Compile a pattern case-insensitively and check that it declares one
/// variable per capture group.
pub fn compile(entry: &RegexEntry) -> Result<Regex, PatternError> {
    let regex = RegexBuilder::new(&entry.regex)
        .case_insensitive(true)
        .build()
        .map_err(|source| PatternError::Compile {
            pattern: entry.regex.clone(),
            source,
        })?;

    let groups = regex.captures_len() - 1;
    if groups != entry.vars.len() {
        return Err(PatternError::Arity {
            pattern: entry.regex.clone(),
            declared: entry.vars.len(),
            groups,
        });
    }

    Ok(regex)
}

/// Match `filter` against `lines`, surfacing pattern errors.
///
/// Fewer lines than patterns is no match; lines past the last pattern are
/// ignored. Patterns are tried in order and the first failure stops the
/// scan, so a broken pattern after a non-matching one is not reported.
/// Groups that did not participate are left unbound, and a variable bound
/// by a later pattern replaces one of the same name bound earlier.
pub fn try_match_filter(
    lines: &[&str],
    filter: &FilterEntry,
) -> Result<Option<Bindings>, PatternError> {
    if lines.len() < filter.regexes.len() {
        return Ok(None);
    }

    let mut bindings = Bindings::new();
    for (entry, line) in filter.regexes.iter().zip(lines) {
        let regex = compile(entry)?;
        let Some(caps) = regex.captures(line) else {
            debug!(filter = %filter.name, regex = %entry.regex, line = %line, "No match");
            return Ok(None);
        };

        for (var, group) in entry.vars.iter().zip(caps.iter().skip(1)) {
            if let Some(m) = group {
                bindings.insert(var.clone(), m.as_str().to_owned());
            }
        }
    }

    Ok(Some(bindings))
}

/// Fail-closed [`try_match_filter`]: pattern errors are logged and reported
/// as no match.
pub fn match_filter(lines: &[&str], filter: &FilterEntry) -> Option<Bindings> {
    match try_match_filter(lines, filter) {
        Ok(result) => result,
        Err(e) => {
            warn!(filter = %filter.name, error = %e, "Filter disabled by broken regex");
            None
        }
    }
}
