//! Greedy, single-pass removal of redundant directives from one file.
//!
//! Candidates are tried strictly top to bottom. Each trial blanks one line,
//! writes the whole file (earlier removals included) and asks the oracle.
//! A passing build makes the removal permanent for every later trial; a
//! failing build puts the exact original line back. There is no
//! backtracking: when two directives are interchangeable, whichever comes
//! first is removed and the other is kept.
//!
//! Blanked lines keep their terminator during trials so compiler
//! diagnostics keep pointing at the original line numbers. The commit step
//! drops them entirely.

use std::ops::Range;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::directive::DirectiveMatcher;
use crate::error::PassError;
use crate::files::write_atomic;
use crate::oracle::BuildOracle;

const MINIMIZER_TARGET: &str = "sweeper_engine::minimizer";

/// Decision taken for one candidate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDecision {
    /// Not tried yet.
    Untested,
    /// The build failed without the line; it stays.
    Kept,
    /// The build passed without the line; it is gone.
    Removed,
}

/// A candidate directive and the decision reached for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLine {
    line_number: usize,
    text: String,
    decision: LineDecision,
}

impl CandidateLine {
    /// One-based line number in the original file.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    /// Line content without its terminator, lossily decoded for display.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Decision reached for the line.
    #[must_use]
    pub const fn decision(&self) -> LineDecision {
        self.decision
    }
}

/// Immutable record of a committed pass over one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    path: Utf8PathBuf,
    candidates: Box<[CandidateLine]>,
}

impl PassReport {
    /// The minimised file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Every candidate line in file order.
    #[must_use]
    pub fn candidates(&self) -> &[CandidateLine] {
        &self.candidates
    }

    /// Candidate lines that were removed.
    pub fn removed(&self) -> impl Iterator<Item = &CandidateLine> {
        self.candidates
            .iter()
            .filter(|candidate| candidate.decision == LineDecision::Removed)
    }

    /// Number of removed lines.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.removed().count()
    }
}

/// Runs the greedy pass for one file at a time.
pub struct LineMinimizer<'a, O: ?Sized> {
    oracle: &'a O,
    project: &'a Utf8Path,
    configuration: &'a str,
    matcher: &'a DirectiveMatcher,
}

impl<'a, O: BuildOracle + ?Sized> LineMinimizer<'a, O> {
    /// Creates a minimiser that builds `project` in `configuration` for
    /// every trial.
    #[must_use]
    pub const fn new(
        oracle: &'a O,
        project: &'a Utf8Path,
        configuration: &'a str,
        matcher: &'a DirectiveMatcher,
    ) -> Self {
        Self {
            oracle,
            project,
            configuration,
            matcher,
        }
    }

    /// Minimises `path` in place and commits the result.
    ///
    /// On error the file may hold trial content; the caller restores it
    /// from its backup.
    ///
    /// # Errors
    ///
    /// Returns [`PassError`] when the file cannot be read or a trial or the
    /// final content cannot be written.
    pub fn minimize(&self, path: &Utf8Path) -> Result<PassReport, PassError> {
        let content = std::fs::read(path).map_err(|err| PassError::Read {
            path: path.to_path_buf(),
            source: Arc::new(err),
        })?;
        let source = SourceLines::new(content);
        let mut states = vec![LineState::Present; source.len()];
        let mut candidates = self.find_candidates(&source);

        debug!(
            target: MINIMIZER_TARGET,
            file = %path,
            candidates = candidates.len(),
            "starting pass"
        );

        for (line_index, candidate) in &mut candidates {
            let index = *line_index;
            set_state(&mut states, index, LineState::Blanked);
            write_content(path, &source.render(&states))?;

            if self.oracle.verify(self.project, self.configuration).passed() {
                candidate.decision = LineDecision::Removed;
                info!(
                    target: MINIMIZER_TARGET,
                    file = %path,
                    line = candidate.line_number,
                    text = %candidate.text,
                    "redundant directive removed"
                );
            } else {
                candidate.decision = LineDecision::Kept;
                set_state(&mut states, index, LineState::Present);
                debug!(
                    target: MINIMIZER_TARGET,
                    file = %path,
                    line = candidate.line_number,
                    "directive required"
                );
            }
        }

        if !candidates.is_empty() {
            for state in &mut states {
                if *state == LineState::Blanked {
                    *state = LineState::Dropped;
                }
            }
            write_content(path, &source.render(&states))?;
        }

        Ok(PassReport {
            path: path.to_path_buf(),
            candidates: candidates
                .into_iter()
                .map(|(_, candidate)| candidate)
                .collect(),
        })
    }

    fn find_candidates(&self, source: &SourceLines) -> Vec<(usize, CandidateLine)> {
        (0..source.len())
            .filter_map(|index| {
                let body = source.body(index);
                self.matcher.is_candidate(body).then(|| {
                    (
                        index,
                        CandidateLine {
                            line_number: index + 1,
                            text: String::from_utf8_lossy(body).trim_end().to_owned(),
                            decision: LineDecision::Untested,
                        },
                    )
                })
            })
            .collect()
    }
}

fn write_content(path: &Utf8Path, content: &[u8]) -> Result<(), PassError> {
    write_atomic(path, content).map_err(|err| PassError::Write {
        path: path.to_path_buf(),
        source: Arc::new(err),
    })
}

fn set_state(states: &mut [LineState], index: usize, state: LineState) {
    if let Some(slot) = states.get_mut(index) {
        *slot = state;
    }
}

/// How a line is rendered when the file is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    /// Original bytes, terminator included.
    Present,
    /// Terminator only.
    Blanked,
    /// Nothing at all.
    Dropped,
}

/// A file's bytes split into lines that keep their own terminators.
struct SourceLines {
    content: Vec<u8>,
    lines: Vec<Range<usize>>,
}

impl SourceLines {
    fn new(content: Vec<u8>) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for line in content.split_inclusive(|byte| *byte == b'\n') {
            lines.push(start..start + line.len());
            start += line.len();
        }
        Self { content, lines }
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    /// The full line, terminator included.
    fn line(&self, index: usize) -> &[u8] {
        self.lines
            .get(index)
            .and_then(|range| self.content.get(range.clone()))
            .unwrap_or_default()
    }

    /// The line without its terminator.
    fn body(&self, index: usize) -> &[u8] {
        let line = self.line(index);
        let terminator_len = terminator(line).len();
        line.get(..line.len() - terminator_len).unwrap_or_default()
    }

    fn render(&self, states: &[LineState]) -> Vec<u8> {
        let mut output = Vec::with_capacity(self.content.len());
        for (index, state) in states.iter().enumerate() {
            let line = self.line(index);
            match state {
                LineState::Present => output.extend_from_slice(line),
                LineState::Blanked => output.extend_from_slice(terminator(line)),
                LineState::Dropped => {}
            }
        }
        output
    }
}

fn terminator(line: &[u8]) -> &[u8] {
    let length = if line.ends_with(b"\r\n") {
        2
    } else if line.ends_with(b"\n") {
        1
    } else {
        0
    };
    line.get(line.len() - length..).unwrap_or_default()
}

#[cfg(test)]
mod tests;
