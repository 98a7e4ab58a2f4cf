#![allow(dead_code)]

use std::path::Path;

pub use swell_test_utils::init_tracing;

/// Lines of a log file written by the tracked-subprocess primitive.
pub fn read_log_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("reading log {:?}: {e}", path))
        .lines()
        .map(str::to_string)
        .collect()
}
