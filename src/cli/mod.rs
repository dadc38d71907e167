//! Command line interface.

pub mod command;

use std::{
    io::{self, BufRead, Write},
    time::Duration,
};

use clap::{Parser, Subcommand};
use indicatif::ProgressBar;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a logger CSV to a coarser interval
    Resample {},
    /// Report the sampling interval of a logger CSV
    Interval {},
    /// Convert a raw logger export to .csv or .dat
    Format(command::format::FormatArgs),
    /// Print the data column names of a logger file
    Columns {
        /// File in the current directory
        file: String,
    },
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Picks one entry from a list. `None` means nothing was chosen.
pub trait Selector {
    fn select(&mut self, title: &str, options: &[String]) -> io::Result<Option<usize>>;
}

/// Numbered menu on stderr, answered on stdin. An empty or invalid answer, or
/// end of input, selects nothing.
pub struct TerminalSelector;

impl Selector for TerminalSelector {
    fn select(&mut self, title: &str, options: &[String]) -> io::Result<Option<usize>> {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{}", title)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(stderr, "  [{}] {}", i + 1, option)?;
        }
        write!(stderr, "> ")?;
        stderr.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;

        Ok(parse_choice(&answer, options.len()))
    }
}

fn parse_choice(answer: &str, len: usize) -> Option<usize> {
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}

/// Replays a fixed list of answers.
#[cfg(test)]
pub struct ScriptedSelector {
    pub answers: std::collections::VecDeque<Option<usize>>,
    pub seen: Vec<(String, Vec<String>)>,
}

#[cfg(test)]
impl ScriptedSelector {
    pub fn new(answers: &[Option<usize>]) -> Self {
        ScriptedSelector {
            answers: answers.iter().copied().collect(),
            seen: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Selector for ScriptedSelector {
    fn select(&mut self, title: &str, options: &[String]) -> io::Result<Option<usize>> {
        self.seen.push((title.to_string(), options.to_vec()));
        Ok(self.answers.pop_front().flatten())
    }
}

// -- Tests -------------------------------------------------------------------
