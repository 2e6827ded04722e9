// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! The numbered-parameter table and its persistence.
//!
//! Parameters live in a dense table indexed 1..5399.  A designated subset
//! is *required*: those indices must appear in any parameter file read with
//! [`ParamTable::restore`] and are always written by [`ParamTable::save`],
//! whether or not the previous file contained them.

use std::ffi::OsString;
use std::fmt::{self, Write as _};
use std::fs;
use std::ops::{Index, IndexMut};
use std::path::{Path, PathBuf};

use fixedbitset::FixedBitSet;

use crate::error::{Error, Result};

/// Number of entries in the parameter table.
pub const MAX_PARAMETERS: usize = 5400;

/// Parameter file used when the backend does not name one.
pub const DEFAULT_PARAMETER_FILE: &str = "rs274ngc.var";

/// First of the seven probe-result parameters (X Y Z A B C, then the probe
/// value), written after every probe move.
pub const PROBE_RESULT: usize = 5061;
/// First of the six G28 home-position parameters.
pub const G28_HOME: usize = 5161;
/// First of the six G30 home-position parameters.
pub const G30_HOME: usize = 5181;
/// First of the six G92 axis-offset parameters.
pub const G92_OFFSETS: usize = 5211;
/// The active work-coordinate-system selector, 1..=9.
pub const COORD_SELECT: usize = 5220;

/// Base index for the origin parameters of work coordinate system
/// `system` (1..=9); X..C live at offsets 1..=6 from it.
pub fn coord_base(system: usize) -> usize {
    5200 + 20 * system
}

fn required_bits() -> FixedBitSet {
    let mut bits = FixedBitSet::with_capacity(MAX_PARAMETERS);
    for base in [G28_HOME, G30_HOME, G92_OFFSETS] {
        for axis in 0..6 {
            bits.insert(base + axis);
        }
    }
    bits.insert(COORD_SELECT);
    for system in 1..=9 {
        for axis in 1..=6 {
            bits.insert(coord_base(system) + axis);
        }
    }
    bits
}

/// The system parameter table.
#[derive(Clone)]
pub struct ParamTable {
    values: Vec<f64>,
}

impl Default for ParamTable {
    fn default() -> Self {
        ParamTable { values: vec![0.0; MAX_PARAMETERS] }
    }
}

impl ParamTable {
    pub fn new() -> ParamTable {
        ParamTable::default()
    }

    /// Read a parameter, checking the index range.
    pub fn get(&self, index: usize) -> Result<f64> {
        if index < 1 || index >= MAX_PARAMETERS {
            return Err(Error::ParameterNumberOutOfRange);
        }
        Ok(self.values[index])
    }

    /// Write a parameter, checking the index range.
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        if index < 1 || index >= MAX_PARAMETERS {
            return Err(Error::ParameterNumberOutOfRange);
        }
        self.values[index] = value;
        Ok(())
    }

    /// Replace the table contents from a parameter file.
    ///
    /// Each data line is `<index> <value>`; lines that do not match are
    /// ignored.  Indices must be strictly increasing, every required index
    /// must be present, and indices the file omits are reset to zero.  The
    /// table is only modified if the whole file reads cleanly.
    pub fn restore(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).map_err(|_| Error::UnableToOpenFile)?;
        let required = required_bits();
        let mut fresh = vec![0.0; MAX_PARAMETERS];
        let mut next = 1;
        for line in text.lines() {
            let Some((index, value)) = parse_data_line(line) else { continue };
            if index < 1 || index >= MAX_PARAMETERS {
                return Err(Error::ParameterNumberOutOfRange);
            }
            if index < next {
                return Err(Error::ParameterFileOutOfOrder);
            }
            for skipped in next..index {
                if required.contains(skipped) {
                    return Err(Error::RequiredParameterMissing);
                }
            }
            fresh[index] = value;
            next = index + 1;
        }
        for skipped in next..MAX_PARAMETERS {
            if required.contains(skipped) {
                return Err(Error::RequiredParameterMissing);
            }
        }
        self.values = fresh;
        Ok(())
    }

    /// Write the table to a parameter file, first renaming the old file to
    /// a `.bak` backup which then drives the output: every index present in
    /// the old file is rewritten with its current value, and every required
    /// index is written whether or not the old file had it.
    pub fn save(&self, path: &Path) -> Result<()> {
        let backup = backup_name(path);
        fs::rename(path, &backup).map_err(|_| Error::CannotCreateBackupFile)?;
        let old = fs::read_to_string(&backup).map_err(|_| Error::CannotOpenBackupFile)?;

        let required = required_bits();
        let mut out = String::new();
        let mut next = 1;
        for line in old.lines() {
            let Some((index, _)) = parse_data_line(line) else { continue };
            if index < 1 || index >= MAX_PARAMETERS {
                return Err(Error::ParameterNumberOutOfRange);
            }
            if index < next {
                return Err(Error::ParameterFileOutOfOrder);
            }
            for skipped in next..index {
                if required.contains(skipped) {
                    let _ = writeln!(out, "{}\t{}", skipped, self.values[skipped]);
                }
            }
            let _ = writeln!(out, "{}\t{}", index, self.values[index]);
            next = index + 1;
        }
        for index in next..MAX_PARAMETERS {
            if required.contains(index) {
                let _ = writeln!(out, "{}\t{}", index, self.values[index]);
            }
        }
        fs::write(path, out).map_err(|_| Error::CannotOpenVariableFile)
    }
}

impl fmt::Debug for ParamTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let set = self.values.iter().filter(|&&value| value != 0.0).count();
        write!(f, "ParamTable({} of {} set)", set, MAX_PARAMETERS)
    }
}

/// Unchecked access for interpreter-internal, known-valid indices.
impl Index<usize> for ParamTable {
    type Output = f64;
    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

impl IndexMut<usize> for ParamTable {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.values[index]
    }
}

fn parse_data_line(line: &str) -> Option<(usize, f64)> {
    let mut fields = line.split_whitespace();
    let index = fields.next()?.parse().ok()?;
    let value = fields.next()?.parse().ok()?;
    Some((index, value))
}

fn backup_name(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_bounds() {
        let mut table = ParamTable::new();
        assert_eq!(table.get(0), Err(Error::ParameterNumberOutOfRange));
        assert_eq!(table.get(MAX_PARAMETERS), Err(Error::ParameterNumberOutOfRange));
        assert_eq!(table.set(0, 1.0), Err(Error::ParameterNumberOutOfRange));
        table.set(5220, 3.0).unwrap();
        assert_eq!(table.get(5220), Ok(3.0));
    }

    #[test]
    fn required_set_contents() {
        let bits = required_bits();
        // 3 six-axis groups, the selector, and nine origin triples of six
        assert_eq!(bits.count_ones(..), 3 * 6 + 1 + 9 * 6);
        assert!(bits.contains(COORD_SELECT));
        assert!(bits.contains(coord_base(9) + 6));
        assert!(!bits.contains(PROBE_RESULT));
    }
}
