// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! The machine model: everything the interpreter remembers between blocks.

use crate::block::{Block, Motion, Stopping};
use crate::canon::{ToolEntry, TOOL_MAX};
use crate::param::ParamTable;
use crate::types::{Direction, DistanceMode, FeedMode, MotionCtrl, Plane, Position, RetractMode,
                   Side, SpeedFeedMode, Units};
use crate::block::MiscMode;

/// Number of slots in the active-G-code mirror.
pub const ACTIVE_G_CODES: usize = 12;
/// Number of slots in the active-M-code mirror.
pub const ACTIVE_M_CODES: usize = 7;
/// Number of slots in the active-settings mirror.
pub const ACTIVE_SETTINGS: usize = 3;

/// Cutter-radius-compensation state.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompState {
    /// Which side of the programmed path the cutter is on; `None` = off.
    pub side: Option<Side>,
    /// Radius used for compensation; always non-negative.
    pub radius: f64,
    /// Tool-table slot whose diameter is in use.
    pub tool_index: usize,
    /// The last uncompensated programmed XY point.  `None` right after
    /// compensation turns on, until the first compensated move sets it.
    pub program: Option<(f64, f64)>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Coolant {
    pub mist: bool,
    pub flood: bool,
}

/// Sticky canned-cycle values, inherited by consecutive cycle blocks that
/// leave the corresponding word out.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleMemo {
    /// Bottom-of-hole coordinate on the axis normal to the plane.
    pub cc: f64,
    pub i: f64,
    pub j: f64,
    pub k: f64,
    pub l: i32,
    pub p: f64,
    pub q: f64,
    pub r: f64,
}

/// The full interpreter state.
///
/// `current` is the position in the active coordinate system: machine
/// position minus origin offset, axis offset, and the tool length offset on
/// the Z axis.
#[derive(Clone, Debug)]
pub struct Setup {
    pub current: Position,
    pub origin_offset: Position,
    pub axis_offset: Position,
    /// Active work coordinate system, 1 (G54) to 9 (G59.3); parameter 5220
    /// mirrors it.
    pub origin_index: usize,

    pub params: ParamTable,
    pub tool_table: Vec<ToolEntry>,
    pub tool_max: usize,

    pub plane: Plane,
    pub length_units: Units,
    pub distance_mode: DistanceMode,
    pub feed_mode: FeedMode,
    pub retract_mode: RetractMode,
    pub control_mode: MotionCtrl,
    pub speed_feed_mode: SpeedFeedMode,
    pub motion_mode: Motion,

    pub feed_rate: f64,
    pub traverse_rate: f64,
    pub speed: f64,
    pub spindle_turning: Direction,
    pub feed_override: bool,
    pub speed_override: bool,
    pub coolant: Coolant,

    pub comp: CompState,
    pub tool_length_offset: f64,
    pub length_offset_index: usize,
    pub current_slot: usize,
    pub selected_slot: usize,

    pub cycle: CycleMemo,

    pub probe_flag: bool,
    pub percent_flag: bool,
    pub sequence_number: usize,
    /// Raw text of the last line read.
    pub line_text: String,
    /// The same line downcased and stripped of whitespace outside comments.
    pub block_text: String,

    pub active_g: [i32; ACTIVE_G_CODES],
    pub active_m: [i32; ACTIVE_M_CODES],
    pub active_settings: [f64; ACTIVE_SETTINGS],
}

impl Default for Setup {
    fn default() -> Setup {
        Setup {
            current: Position::default(),
            origin_offset: Position::default(),
            axis_offset: Position::default(),
            origin_index: 1,
            params: ParamTable::new(),
            tool_table: vec![ToolEntry::default(); TOOL_MAX + 1],
            tool_max: TOOL_MAX,
            plane: Plane::Xy,
            length_units: Units::Mm,
            distance_mode: DistanceMode::Absolute,
            feed_mode: FeedMode::UnitsPerMinute,
            retract_mode: RetractMode::default(),
            control_mode: MotionCtrl::ExactPath,
            speed_feed_mode: SpeedFeedMode::Independent,
            motion_mode: Motion::CancelCycle,
            feed_rate: 0.0,
            traverse_rate: 0.0,
            speed: 0.0,
            spindle_turning: Direction::Stopped,
            feed_override: true,
            speed_override: true,
            coolant: Coolant::default(),
            comp: CompState::default(),
            tool_length_offset: 0.0,
            length_offset_index: 1,
            current_slot: 0,
            selected_slot: 0,
            cycle: CycleMemo::default(),
            probe_flag: false,
            percent_flag: false,
            sequence_number: 0,
            line_text: String::new(),
            block_text: String::new(),
            active_g: [0; ACTIVE_G_CODES],
            active_m: [0; ACTIVE_M_CODES],
            active_settings: [0.0; ACTIVE_SETTINGS],
        }
    }
}

impl Setup {
    /// The arc radius tolerance for the active length units.
    pub fn tolerance(&self) -> f64 {
        self.length_units.tolerance()
    }

    /// Find the coordinates of the end point of the motion in this block,
    /// in the active coordinate system.
    ///
    /// Axes without a word keep their current value.  With G53, word values
    /// are machine coordinates and the two offsets are backed out.  In
    /// incremental mode, in-plane words add to the programmed point while
    /// cutter compensation is in progress, otherwise to the current point.
    pub fn find_ends(&self, block: &Block) -> Position {
        let comp = self.comp.side.is_some();
        let middle = self.comp.program.is_some();
        let (program_x, program_y) = self.comp.program.unwrap_or((0.0, 0.0));

        if block.g.misc == Some(MiscMode::MachineCoords) {
            // distance mode is absolute in this case
            Position {
                x: block.x.map_or(self.current.x,
                    |x| x - (self.origin_offset.x + self.axis_offset.x)),
                y: block.y.map_or(self.current.y,
                    |y| y - (self.origin_offset.y + self.axis_offset.y)),
                z: block.z.map_or(self.current.z,
                    |z| z - (self.tool_length_offset + self.origin_offset.z + self.axis_offset.z)),
                a: block.a.map_or(self.current.a,
                    |a| a - (self.origin_offset.a + self.axis_offset.a)),
                b: block.b.map_or(self.current.b,
                    |b| b - (self.origin_offset.b + self.axis_offset.b)),
                c: block.c.map_or(self.current.c,
                    |c| c - (self.origin_offset.c + self.axis_offset.c)),
            }
        } else if self.distance_mode == DistanceMode::Absolute {
            Position {
                x: block.x.unwrap_or(if comp && middle { program_x } else { self.current.x }),
                y: block.y.unwrap_or(if comp && middle { program_y } else { self.current.y }),
                z: block.z.unwrap_or(self.current.z),
                a: block.a.unwrap_or(self.current.a),
                b: block.b.unwrap_or(self.current.b),
                c: block.c.unwrap_or(self.current.c),
            }
        } else {
            let base_x = if comp && middle { program_x } else { self.current.x };
            let base_y = if comp && middle { program_y } else { self.current.y };
            Position {
                x: base_x + block.x.unwrap_or(0.0),
                y: base_y + block.y.unwrap_or(0.0),
                z: self.current.z + block.z.unwrap_or(0.0),
                a: self.current.a + block.a.unwrap_or(0.0),
                b: self.current.b + block.b.unwrap_or(0.0),
                c: self.current.c + block.c.unwrap_or(0.0),
            }
        }
    }

    /// Express a point with known absolute coordinates in the active
    /// coordinate system under the current tool length offset.
    pub fn find_relative(&self, abs: Position) -> Position {
        Position {
            x: abs.x - (self.origin_offset.x + self.axis_offset.x),
            y: abs.y - (self.origin_offset.y + self.axis_offset.y),
            z: abs.z - (self.tool_length_offset + self.origin_offset.z + self.axis_offset.z),
            a: abs.a - (self.origin_offset.a + self.axis_offset.a),
            b: abs.b - (self.origin_offset.b + self.axis_offset.b),
            c: abs.c - (self.origin_offset.c + self.axis_offset.c),
        }
    }

    /// Refresh the active-G-code mirror.  All codes are reported as
    /// integers ten times the actual value (59.1 becomes 591).  Group 0 is
    /// taken from the block since its codes are not modal.
    pub fn write_g_codes(&mut self, block: Option<&Block>) {
        let gez = &mut self.active_g;
        gez[0] = self.sequence_number as i32;
        gez[1] = self.motion_mode.code();
        gez[2] = block
            .and_then(|b| b.g.misc)
            .map_or(-1, |misc| misc.code());
        gez[3] = match self.plane {
            Plane::Xy => 170,
            Plane::Xz => 180,
            Plane::Yz => 190,
        };
        gez[4] = match self.comp.side {
            Some(Side::Right) => 420,
            Some(Side::Left) => 410,
            None => 400,
        };
        gez[5] = if self.length_units == Units::Inches { 200 } else { 210 };
        gez[6] = if self.distance_mode == DistanceMode::Absolute { 900 } else { 910 };
        gez[7] = if self.feed_mode == FeedMode::InverseTime { 930 } else { 940 };
        gez[8] = if self.origin_index < 7 {
            530 + 10 * self.origin_index as i32
        } else {
            584 + self.origin_index as i32
        };
        gez[9] = if self.tool_length_offset == 0.0 { 490 } else { 430 };
        gez[10] = if self.retract_mode == RetractMode::OldZ { 980 } else { 990 };
        gez[11] = match self.control_mode {
            MotionCtrl::Continuous => 640,
            MotionCtrl::ExactPath => 610,
            MotionCtrl::ExactStop => 611,
        };
    }

    /// Refresh the active-M-code mirror.
    pub fn write_m_codes(&mut self, block: Option<&Block>) {
        let emz = &mut self.active_m;
        emz[0] = self.sequence_number as i32;
        emz[1] = block
            .and_then(|b| b.m.stopping)
            .map_or(-1, Stopping::code);
        emz[2] = match self.spindle_turning {
            Direction::Stopped => 5,
            Direction::Clockwise => 3,
            Direction::CounterClockwise => 4,
        };
        emz[3] = match block {
            Some(b) if b.m.tool_change => 6,
            Some(_) => -1,
            None => -1,
        };
        emz[4] = if self.coolant.mist { 7 } else if self.coolant.flood { -1 } else { 9 };
        emz[5] = if self.coolant.flood { 8 } else { -1 };
        emz[6] = if self.feed_override { 48 } else { 49 };
    }

    /// Refresh the active-settings mirror (sequence number, feed, speed).
    pub fn write_settings(&mut self) {
        self.active_settings[0] = self.sequence_number as f64;
        self.active_settings[1] = self.feed_rate;
        self.active_settings[2] = self.speed;
    }
}
