// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! The interpreter kernel: session lifecycle and per-block execution.
//!
//! The usual round trip is `open` (or `read_line` for MDI input), then
//! alternating `read` and `execute` until `execute` reports
//! [`Status::Exit`] or `read` reports [`Status::EndFile`], then `close`.
//! [`Status::ExecuteFinish`] from `read` marks a block-delete line whose
//! execution is up to the caller; from `execute` it marks a probe, after
//! which the downstream queue must drain before the next `read`.
//!
//! Execution of one block is strictly ordered: comment, feed mode, feed
//! rate (unless in inverse-time mode), spindle speed, tool selection, M
//! codes by group, G codes by group, stopping codes.

mod arc;
mod cycle;
mod modal;
mod motion;
pub mod state;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::block::{Block, MiscMode, Motion};
use crate::canon::{Canon, ToolEntry, TOOL_MAX};
use crate::error::{Error, Result, Status};
use crate::param::{coord_base, DEFAULT_PARAMETER_FILE, COORD_SELECT, G92_OFFSETS, PROBE_RESULT};
use crate::parse;
use crate::types::{FeedMode, FeedReference, DistanceMode, Position};

pub use self::state::Setup;

/// The RS274/NGC interpreter.  Generic over the canonical backend; the
/// machine model is owned exclusively by the session.
pub struct Interpreter<C: Canon> {
    pub(crate) setup: Setup,
    pub(crate) canon: C,
    lines: Vec<String>,
    cursor: usize,
    file_open: bool,
    end_of_file: bool,
    block: Option<Block>,
}

impl<C: Canon> Interpreter<C> {
    /// Create an interpreter over the given backend, with default state.
    /// Call [`Interpreter::init`] to adopt external state and restore
    /// parameters.
    pub fn new(canon: C) -> Interpreter<C> {
        Interpreter {
            setup: Setup::default(),
            canon,
            lines: Vec::new(),
            cursor: 0,
            file_open: false,
            end_of_file: false,
            block: None,
        }
    }

    /// The machine model, for inspection.
    pub fn setup(&self) -> &Setup {
        &self.setup
    }

    pub fn canon(&self) -> &C {
        &self.canon
    }

    pub fn canon_mut(&mut self) -> &mut C {
        &mut self.canon
    }

    pub fn into_canon(self) -> C {
        self.canon
    }

    /// Get ready to run: initialize the backend, restore the parameter
    /// file it names (or the default one), adopt the work coordinate
    /// system selected by parameter 5220, and synchronize with external
    /// state.
    pub fn init(&mut self) -> Result<()> {
        self.canon.init_canon();
        self.setup.length_units = self.canon.length_unit_type();
        let units = self.setup.length_units;
        self.canon.use_length_units(units);

        let filename = self.parameter_file();
        self.setup.params.restore(&filename)?;
        info!(file = %filename.display(), "parameters restored");

        let origin = (self.setup.params[COORD_SELECT] + 0.0001) as usize;
        if !(1..=9).contains(&origin) {
            return Err(Error::CoordinateSystemIndexParameter5220OutOfRange);
        }
        self.setup.origin_index = origin;

        let base = coord_base(origin);
        let params = &self.setup.params;
        self.canon.set_origin_offsets(
            params[base + 1] + params[G92_OFFSETS],
            params[base + 2] + params[G92_OFFSETS + 1],
            params[base + 3] + params[G92_OFFSETS + 2],
            params[base + 4] + params[G92_OFFSETS + 3],
            params[base + 5] + params[G92_OFFSETS + 4],
            params[base + 6] + params[G92_OFFSETS + 5],
        );
        self.canon.set_feed_reference(FeedReference::Xyz);

        let params = &self.setup.params;
        self.setup.axis_offset = Position {
            x: params[G92_OFFSETS],
            y: params[G92_OFFSETS + 1],
            z: params[G92_OFFSETS + 2],
            a: params[G92_OFFSETS + 3],
            b: params[G92_OFFSETS + 4],
            c: params[G92_OFFSETS + 5],
        };
        self.setup.origin_offset = Position {
            x: params[base + 1],
            y: params[base + 2],
            z: params[base + 3],
            a: params[base + 4],
            b: params[base + 5],
            c: params[base + 6],
        };

        self.setup.comp.side = None;
        self.setup.comp.program = None;
        self.setup.comp.tool_index = 1;
        self.setup.distance_mode = DistanceMode::Absolute;
        self.setup.feed_mode = FeedMode::UnitsPerMinute;
        self.setup.feed_override = true;
        self.setup.speed_override = true;
        self.setup.motion_mode = Motion::CancelCycle;
        self.setup.probe_flag = false;
        self.setup.sequence_number = 0;
        self.setup.tool_length_offset = 0.0;
        self.setup.length_offset_index = 1;
        self.setup.line_text.clear();
        self.setup.block_text.clear();

        self.setup.write_g_codes(None);
        self.setup.write_m_codes(None);
        self.setup.write_settings();

        self.synch()
    }

    /// Bring the model in line with the rest of the controller by querying
    /// the backend, and reload the tool table.
    pub fn synch(&mut self) -> Result<()> {
        self.setup.control_mode = self.canon.motion_control_mode();
        self.setup.current = self.canon.position();
        self.setup.current_slot = self.canon.tool_slot();
        self.setup.feed_rate = self.canon.feed_rate();
        self.setup.coolant.flood = self.canon.flood();
        self.setup.length_units = self.canon.length_unit_type();
        self.setup.coolant.mist = self.canon.mist();
        self.setup.plane = self.canon.plane();
        self.setup.selected_slot = self.canon.tool_slot();
        self.setup.speed = self.canon.speed();
        self.setup.spindle_turning = self.canon.spindle_turning();
        self.setup.tool_max = self.canon.tool_max();
        self.setup.traverse_rate = self.canon.traverse_rate();
        self.load_tool_table()
    }

    /// Load the whole tool table from the backend.
    pub fn load_tool_table(&mut self) -> Result<()> {
        if self.setup.tool_max > TOOL_MAX {
            return Err(Error::ToolMaxTooLarge);
        }
        for slot in 0..=self.setup.tool_max {
            self.setup.tool_table[slot] = self.canon.tool_entry(slot);
        }
        for slot in self.setup.tool_max + 1..=TOOL_MAX {
            self.setup.tool_table[slot] = ToolEntry::default();
        }
        Ok(())
    }

    /// Open an NC program file.
    ///
    /// If the first non-blank line is a lone `%` the program is
    /// percent-framed: it must end with a second `%`, and M2/M30 is
    /// optional.  Otherwise reading starts from the beginning and the
    /// program must end with M2 or M30.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if self.file_open {
            return Err(Error::FileAlreadyOpen);
        }
        let text = fs::read_to_string(path).map_err(|_| Error::UnableToOpenFile)?;
        self.lines = text.lines().map(String::from).collect();
        self.setup.percent_flag = false;
        self.cursor = 0;

        // skip leading blank lines to find out whether percents are used
        let mut start = None;
        for (index, line) in self.lines.iter().enumerate() {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                if trimmed.starts_with('%') {
                    self.setup.percent_flag = true;
                    start = Some(index + 1);
                } else {
                    start = Some(0);
                }
                break;
            }
        }
        let Some(start) = start else {
            return Err(Error::FileEndedWithNoPercentSign);
        };
        self.cursor = start;
        self.file_open = true;
        self.end_of_file = false;
        self.setup.sequence_number = 0;
        self.reset();
        info!(file = %path.display(), percent = self.setup.percent_flag, "program opened");
        Ok(())
    }

    /// Close the NC program file and reset the line state.
    pub fn close(&mut self) {
        self.lines.clear();
        self.cursor = 0;
        self.file_open = false;
        self.end_of_file = false;
        self.reset();
    }

    /// Read and parse the next line of the open program.
    ///
    /// Returns `Status::ExecuteFinish` for a block-delete line (the caller
    /// decides whether to execute it) and `Status::EndFile` at the closing
    /// percent line.
    pub fn read(&mut self) -> Result<Status> {
        self.sync_after_probe()?;
        if !self.file_open {
            return Err(Error::FileNotOpen);
        }
        if self.end_of_file {
            return Ok(Status::EndFile);
        }
        let Some(raw) = self.lines.get(self.cursor).cloned() else {
            return Err(if self.setup.percent_flag {
                Error::FileEndedWithNoPercentSign
            } else {
                Error::FileEndedWithNoPercentSignOrProgramEnd
            });
        };
        self.cursor += 1;

        let cleaned = close_and_downcase(raw.trim())?;
        if self.setup.percent_flag && cleaned.starts_with('%') {
            self.block = None;
            self.end_of_file = true;
            return Ok(Status::EndFile);
        }
        self.accept_line(raw, cleaned)
    }

    /// Read and parse one line of code given directly (manual data input).
    pub fn read_line(&mut self, command: &str) -> Result<Status> {
        self.sync_after_probe()?;
        let cleaned = close_and_downcase(command.trim())?;
        self.accept_line(command.trim_end().to_string(), cleaned)
    }

    fn accept_line(&mut self, raw: String, cleaned: String) -> Result<Status> {
        self.setup.sequence_number += 1;
        self.block = None;
        self.setup.line_text = raw;

        let blockdel = cleaned.starts_with('/');
        let status = if blockdel { Status::ExecuteFinish } else { Status::Ok };

        // a blank line, or a lone slash, parses to nothing
        if cleaned.is_empty() || (blockdel && cleaned.len() == 1) {
            self.setup.block_text.clear();
            return Ok(status);
        }
        self.setup.block_text = cleaned;

        let parsed = parse::parse_line(self.setup.sequence_number, &self.setup.block_text)?;
        let mut block = Block::from_ast(&parsed, &self.setup.params, self.setup.tool_max)?;
        block.enhance(self.setup.motion_mode)?;
        block.check_items(self.setup.distance_mode)?;
        debug!(line = self.setup.sequence_number, text = %self.setup.block_text, "block read");
        self.block = Some(block);
        Ok(status)
    }

    /// After a probe, the downstream queue must have drained; then the
    /// model position and the probe parameters are reloaded from the
    /// backend.
    fn sync_after_probe(&mut self) -> Result<()> {
        if self.setup.probe_flag {
            if !self.canon.queue_empty() {
                return Err(Error::QueueIsNotEmptyAfterProbing);
            }
            self.set_probe_data();
            self.setup.probe_flag = false;
        }
        Ok(())
    }

    fn set_probe_data(&mut self) {
        self.setup.current = self.canon.position();
        let probe = self.canon.probe_position();
        self.setup.params[PROBE_RESULT] = probe.x;
        self.setup.params[PROBE_RESULT + 1] = probe.y;
        self.setup.params[PROBE_RESULT + 2] = probe.z;
        self.setup.params[PROBE_RESULT + 3] = probe.a;
        self.setup.params[PROBE_RESULT + 4] = probe.b;
        self.setup.params[PROBE_RESULT + 5] = probe.c;
        self.setup.params[PROBE_RESULT + 6] = self.canon.probe_value();
    }

    /// Execute the block read by the last `read`/`read_line` call.
    ///
    /// Buffered parameter assignments take effect first; canonical
    /// commands are emitted in the prescribed order; the active-code
    /// mirrors are refreshed afterwards, error or not.
    pub fn execute(&mut self) -> Result<Status> {
        let Some(block) = self.block.clone() else {
            return Ok(Status::Ok); // blank line is OK
        };
        for &(index, value) in &block.assignments {
            self.setup.params[index] = value;
        }
        let status = self.execute_block(&block);
        self.setup.write_g_codes(Some(&block));
        self.setup.write_m_codes(Some(&block));
        self.setup.write_settings();
        status
    }

    fn execute_block(&mut self, block: &Block) -> Result<Status> {
        if let Some(comment) = &block.comment {
            self.convert_comment(comment);
        }
        if let Some(mode) = block.g.feed_mode {
            self.convert_feed_mode(mode);
        }
        if let Some(rate) = block.f {
            // in inverse-time mode the F word is handled per motion
            if self.setup.feed_mode != FeedMode::InverseTime {
                self.convert_feed_rate(rate);
            }
        }
        if let Some(speed) = block.s {
            self.convert_speed(speed);
        }
        if let Some(slot) = block.t {
            self.convert_tool_select(slot)?;
        }
        self.convert_m(block);
        self.convert_g(block)?;
        if block.m.stopping.is_some() {
            let status = self.convert_stop(block)?;
            if status == Status::Exit {
                return Ok(Status::Exit);
            }
        }
        Ok(if self.setup.probe_flag { Status::ExecuteFinish } else { Status::Ok })
    }

    /// G codes in their prescribed order.  G93/G94 were handled before the
    /// feed word; G4 and G53 belong to group 0 but act here and in the
    /// motion stage respectively.
    fn convert_g(&mut self, block: &Block) -> Result<()> {
        if block.g.misc == Some(MiscMode::Dwell) {
            self.convert_dwell(block.p.unwrap_or(0.0));
        }
        if let Some(plane) = block.g.plane {
            self.convert_set_plane(plane)?;
        }
        if let Some(units) = block.g.units {
            self.convert_length_units(units)?;
        }
        if let Some(mode) = block.g.cutter_comp {
            self.convert_cutter_compensation(mode, block)?;
        }
        if let Some(mode) = block.g.tool_length {
            self.convert_tool_length_offset(mode, block)?;
        }
        if let Some(system) = block.g.coord_system {
            self.convert_coordinate_system(system);
        }
        if let Some(mode) = block.g.control {
            self.convert_control_mode(mode);
        }
        if let Some(mode) = block.g.distance {
            self.convert_distance_mode(mode);
        }
        if let Some(mode) = block.g.retract {
            self.convert_retract_mode(mode);
        }
        if let Some(misc) = block.g.misc {
            self.convert_modal_0(misc, block)?;
        }
        if let Some(motion) = block.motion_to_be {
            self.convert_motion(motion, block)?;
        }
        Ok(())
    }

    /// Save the parameters and reset.  The backup copy of the parameter
    /// file doubles as the write driver, so it is made first.
    pub fn exit(&mut self) -> Result<()> {
        let filename = self.parameter_file();
        self.setup.params.save(&filename)?;
        info!(file = %filename.display(), "parameters saved");
        self.reset();
        Ok(())
    }

    fn parameter_file(&mut self) -> PathBuf {
        self.canon
            .parameter_file_name()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PARAMETER_FILE))
    }

    fn reset(&mut self) {
        self.setup.line_text.clear();
        self.setup.block_text.clear();
        self.block = None;
    }

    /// Text of the most recently read line.
    pub fn line_text(&self) -> &str {
        &self.setup.line_text
    }

    /// Sequence number of the most recently read line.
    pub fn sequence_number(&self) -> usize {
        self.setup.sequence_number
    }

    /// The active G codes, one slot per modal group, as integers ten times
    /// the code value.
    pub fn active_g_codes(&self) -> [i32; state::ACTIVE_G_CODES] {
        self.setup.active_g
    }

    /// The active M codes.
    pub fn active_m_codes(&self) -> [i32; state::ACTIVE_M_CODES] {
        self.setup.active_m
    }

    /// The active settings: sequence number, feed rate, spindle speed.
    pub fn active_settings(&self) -> [f64; state::ACTIVE_SETTINGS] {
        self.setup.active_settings
    }
}

/// Downcase a line and strip whitespace outside comments; comments pass
/// through untouched.  Nested and unclosed comments are rejected here so
/// the grammar never sees them.
fn close_and_downcase(line: &str) -> Result<String> {
    let mut out = String::with_capacity(line.len());
    let mut in_comment = false;
    for ch in line.chars() {
        if in_comment {
            if ch == '(' {
                return Err(Error::NestedCommentFound);
            }
            out.push(ch);
            if ch == ')' {
                in_comment = false;
            }
        } else if ch == '(' {
            in_comment = true;
            out.push(ch);
        } else if ch == ' ' || ch == '\t' {
            // spaces and tabs have no meaning outside comments
        } else {
            out.push(ch.to_ascii_lowercase());
        }
    }
    if in_comment {
        return Err(Error::UnclosedCommentFound);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::close_and_downcase;
    use crate::error::Error;

    #[test]
    fn downcase_strips_outside_comments_only() {
        assert_eq!(close_and_downcase("G0 X1 Y 2").unwrap(), "g0x1y2");
        assert_eq!(
            close_and_downcase("G1 (Keep Me As Is) X2").unwrap(),
            "g1(Keep Me As Is)x2"
        );
        // idempotent outside comments
        let once = close_and_downcase("N10 G0 X+1.5").unwrap();
        assert_eq!(close_and_downcase(&once).unwrap(), once);
    }

    #[test]
    fn comment_nesting_rejected() {
        assert_eq!(close_and_downcase("(a(b))"), Err(Error::NestedCommentFound));
        assert_eq!(close_and_downcase("(abc"), Err(Error::UnclosedCommentFound));
    }
}
