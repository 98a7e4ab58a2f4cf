// src/rc/process_grid.rs

use crate::errors::{Result, SwellError};

use super::RunControlDocument;

/// Two-axis process decomposition (`NX` x `NY`) read from a run-control
/// document.
///
/// Only constructible through [`ProcessGrid::new`] or
/// [`ProcessGrid::from_document`], so both dimensions are positive and their
/// product fits in a `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessGrid {
    nx: u32,
    ny: u32,
}

impl ProcessGrid {
    pub fn new(nx: u32, ny: u32) -> Result<Self> {
        let grid = Self { nx, ny };
        grid.validate()?;
        Ok(grid)
    }

    pub fn nx(&self) -> u32 {
        self.nx
    }

    pub fn ny(&self) -> u32 {
        self.ny
    }

    /// Read `NX` and `NY` from `doc`.
    ///
    /// Each value may be wrapped in single or double quotes (a rewritten
    /// `AGCM.rc` often carries `NX: '4'`). Both must be positive integers.
    pub fn from_document(doc: &RunControlDocument) -> Result<Self> {
        let nx = parse_dimension(doc, "NX")?;
        let ny = parse_dimension(doc, "NY")?;
        Self::new(nx, ny)
    }

    /// Total process count, `NX * NY`.
    pub fn process_count(&self) -> u32 {
        // Every constructor runs `validate`, which rejects overflow.
        self.nx * self.ny
    }

    fn validate(&self) -> Result<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(SwellError::ConfigError(format!(
                "process grid must be positive (NX={}, NY={})",
                self.nx, self.ny
            )));
        }
        if self.nx.checked_mul(self.ny).is_none() {
            return Err(SwellError::ConfigError(format!(
                "process count NX*NY overflows (NX={}, NY={})",
                self.nx, self.ny
            )));
        }
        Ok(())
    }
}

fn parse_dimension(doc: &RunControlDocument, key: &str) -> Result<u32> {
    let raw = doc.require(key)?;
    let value = strip_quotes(raw);
    value.parse::<u32>().map_err(|e| {
        SwellError::ConfigError(format!(
            "run-control entry {key}={raw:?} in {} is not a non-negative integer: {e}",
            doc.describe_source()
        ))
    })
}

/// Strip surrounding whitespace and quote characters.
pub fn strip_quotes(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '\'' || c == '"').trim()
}
