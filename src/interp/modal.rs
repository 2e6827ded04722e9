// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Conversion of everything on a block that is not a motion: comments and
//! messages, feed and speed words, tool selection and change, M-code
//! groups, and the non-motion G-code groups.

use crate::block::{Block, CompMode, CoolantCtl, MiscMode, Motion, OverrideCtl, SpindleTurn,
                   Stopping, ToolLengthMode};
use crate::canon::Canon;
use crate::error::{Error, Result, Status};
use crate::param::{coord_base, COORD_SELECT, G28_HOME, G30_HOME, G92_OFFSETS};
use crate::types::{Direction, DistanceMode, FeedMode, MotionCtrl, Plane, Position, RetractMode,
                   Side, Units, INCH_PER_MM, MM_PER_INCH};

use super::Interpreter;

impl<C: Canon> Interpreter<C> {
    /// A comment whose content starts with `MSG,` (case and whitespace
    /// insensitive up to the comma) is surfaced as a message; anything else
    /// goes out as a comment.
    pub(super) fn convert_comment(&mut self, comment: &str) {
        let mut rest = comment;
        for expected in ['m', 's', 'g'] {
            rest = rest.trim_start();
            match rest.chars().next() {
                Some(ch) if ch.to_ascii_lowercase() == expected => rest = &rest[1..],
                _ => {
                    self.canon.comment(comment);
                    return;
                }
            }
        }
        rest = rest.trim_start();
        if let Some(message) = rest.strip_prefix(',') {
            self.canon.message(message);
        } else {
            self.canon.comment(comment);
        }
    }

    /// The canonical machine has no feed mode, so this only switches the
    /// model, with an explanatory comment.
    pub(super) fn convert_feed_mode(&mut self, mode: FeedMode) {
        match mode {
            FeedMode::InverseTime => {
                self.canon.comment("interpreter: feed mode set to inverse time");
            }
            FeedMode::UnitsPerMinute => {
                self.canon.comment("interpreter: feed mode set to units per minute");
            }
        }
        self.setup.feed_mode = mode;
    }

    pub(super) fn convert_feed_rate(&mut self, rate: f64) {
        self.canon.set_feed_rate(rate);
        self.setup.feed_rate = rate;
    }

    pub(super) fn convert_speed(&mut self, speed: f64) {
        self.canon.set_spindle_speed(speed);
        self.setup.speed = speed;
    }

    /// A T word moves the carousel so the slot is ready for a tool change.
    /// Slot zero means no tool should be selected.
    pub(super) fn convert_tool_select(&mut self, slot: usize) -> Result<()> {
        if slot > self.setup.tool_max {
            return Err(Error::SelectedToolSlotNumberTooLarge);
        }
        self.canon.select_tool(slot);
        self.setup.selected_slot = slot;
        Ok(())
    }

    /// M codes other than the stopping group, in their prescribed order:
    /// tool change, spindle, coolant, override switches.
    pub(super) fn convert_m(&mut self, block: &Block) {
        if block.m.tool_change {
            self.convert_tool_change();
        }
        match block.m.spindle {
            Some(SpindleTurn::Clockwise) => {
                self.canon.start_spindle_clockwise();
                self.setup.spindle_turning = Direction::Clockwise;
            }
            Some(SpindleTurn::CounterClockwise) => {
                self.canon.start_spindle_counterclockwise();
                self.setup.spindle_turning = Direction::CounterClockwise;
            }
            Some(SpindleTurn::Stop) => {
                self.canon.stop_spindle_turning();
                self.setup.spindle_turning = Direction::Stopped;
            }
            None => (),
        }
        match block.m.coolant {
            Some(CoolantCtl::Mist) => {
                self.canon.mist_on();
                self.setup.coolant.mist = true;
            }
            Some(CoolantCtl::Flood) => {
                self.canon.flood_on();
                self.setup.coolant.flood = true;
            }
            Some(CoolantCtl::Off) => {
                self.canon.mist_off();
                self.setup.coolant.mist = false;
                self.canon.flood_off();
                self.setup.coolant.flood = false;
            }
            None => (),
        }
        match block.m.overrides {
            Some(OverrideCtl::Enable) => {
                self.canon.enable_feed_override();
                self.canon.enable_speed_override();
                self.setup.feed_override = true;
                self.setup.speed_override = true;
            }
            Some(OverrideCtl::Disable) => {
                self.canon.disable_feed_override();
                self.canon.disable_speed_override();
                self.setup.feed_override = false;
                self.setup.speed_override = false;
            }
            None => (),
        }
    }

    /// M6.  When the change is complete the selected tool is in the
    /// spindle, the spindle is stopped, and the position is unchanged.
    fn convert_tool_change(&mut self) {
        self.canon.change_tool(self.setup.selected_slot);
        self.setup.current_slot = self.setup.selected_slot;
        self.setup.spindle_turning = Direction::Stopped;
    }

    pub(super) fn convert_dwell(&mut self, seconds: f64) {
        self.canon.dwell(seconds);
    }

    pub(super) fn convert_set_plane(&mut self, plane: Plane) -> Result<()> {
        if self.setup.comp.side.is_some() {
            match plane {
                Plane::Xz => return Err(Error::CannotUseXzPlaneWithCutterRadiusComp),
                Plane::Yz => return Err(Error::CannotUseYzPlaneWithCutterRadiusComp),
                Plane::Xy => (),
            }
        }
        self.canon.select_plane(plane);
        self.setup.plane = plane;
        Ok(())
    }

    /// Changing length units rescales the current position and both offset
    /// vectors; the tool table and the coordinate-system parameters stay in
    /// their own units.
    pub(super) fn convert_length_units(&mut self, units: Units) -> Result<()> {
        if self.setup.comp.side.is_some() {
            return Err(Error::CannotChangeUnitsWithCutterRadiusComp);
        }
        self.canon.use_length_units(units);
        if self.setup.length_units != units {
            let factor = match units {
                Units::Inches => INCH_PER_MM,
                Units::Mm => MM_PER_INCH,
            };
            self.setup.length_units = units;
            for point in [
                &mut self.setup.current,
                &mut self.setup.axis_offset,
                &mut self.setup.origin_offset,
            ] {
                point.x *= factor;
                point.y *= factor;
                point.z *= factor;
            }
        }
        Ok(())
    }

    pub(super) fn convert_cutter_compensation(&mut self, mode: CompMode,
                                              block: &Block) -> Result<()> {
        match mode {
            CompMode::Off => {
                self.canon.comment("interpreter: cutter radius compensation off");
                self.setup.comp.side = None;
                self.setup.comp.program = None;
                Ok(())
            }
            CompMode::Left => self.convert_cutter_compensation_on(Side::Left, block),
            CompMode::Right => self.convert_cutter_compensation_on(Side::Right, block),
        }
    }

    /// The D word is optional; without it the slot of the tool in the
    /// spindle is used.  A negative diameter in the table switches the side
    /// and uses the positive radius.
    fn convert_cutter_compensation_on(&mut self, side: Side, block: &Block) -> Result<()> {
        if self.setup.plane != Plane::Xy {
            return Err(Error::CannotTurnCutterRadiusCompOnOutOfXyPlane);
        }
        if self.setup.comp.side.is_some() {
            return Err(Error::CannotTurnCutterRadiusCompOnWhenOn);
        }
        let index = block.d.unwrap_or(self.setup.current_slot);
        let mut radius = self.setup.tool_table[index].diameter / 2.0;
        let mut side = side;
        if radius < 0.0 {
            radius = -radius;
            side = side.opposite();
        }
        match side {
            Side::Right => self.canon.comment("interpreter: cutter radius compensation on right"),
            Side::Left => self.canon.comment("interpreter: cutter radius compensation on left"),
        }
        self.setup.comp.radius = radius;
        self.setup.comp.tool_index = index;
        self.setup.comp.side = Some(side);
        Ok(())
    }

    pub(super) fn convert_tool_length_offset(&mut self, mode: ToolLengthMode,
                                             block: &Block) -> Result<()> {
        match mode {
            ToolLengthMode::Cancel => {
                self.canon.use_tool_length_offset(0.0);
                self.setup.current.z += self.setup.tool_length_offset;
                self.setup.tool_length_offset = 0.0;
                self.setup.length_offset_index = 0;
            }
            ToolLengthMode::Use => {
                let index = block.h.ok_or(Error::OffsetIndexMissing)?;
                let offset = self.setup.tool_table[index].length;
                self.canon.use_tool_length_offset(offset);
                self.setup.current.z += self.setup.tool_length_offset - offset;
                self.setup.tool_length_offset = offset;
                self.setup.length_offset_index = index;
            }
        }
        Ok(())
    }

    /// Switch the active work coordinate system.  The physical position is
    /// invariant: `current` is recomputed so that machine position does not
    /// move when the frame changes.
    pub(super) fn convert_coordinate_system(&mut self, system: u8) {
        let system = system as usize;
        if system == self.setup.origin_index {
            self.canon.comment("interpreter: continuing to use same coordinate system");
            return;
        }
        self.setup.origin_index = system;
        self.setup.params[COORD_SELECT] = system as f64;

        // axis offsets cancel out of the frame change and stay untouched
        add_offset(&mut self.setup.current, &self.setup.origin_offset);
        let base = coord_base(system);
        let origin = Position {
            x: self.setup.params[base + 1],
            y: self.setup.params[base + 2],
            z: self.setup.params[base + 3],
            a: self.setup.params[base + 4],
            b: self.setup.params[base + 5],
            c: self.setup.params[base + 6],
        };
        self.setup.origin_offset = origin;
        sub_offset(&mut self.setup.current, &origin);

        let axis = self.setup.axis_offset;
        self.canon.set_origin_offsets(
            origin.x + axis.x, origin.y + axis.y, origin.z + axis.z,
            origin.a + axis.a, origin.b + axis.b, origin.c + axis.c,
        );
    }

    pub(super) fn convert_control_mode(&mut self, mode: MotionCtrl) {
        self.canon.set_motion_control_mode(mode);
        self.setup.control_mode = mode;
    }

    /// The canonical machine has no distance mode; only the model changes.
    pub(super) fn convert_distance_mode(&mut self, mode: DistanceMode) {
        if self.setup.distance_mode != mode {
            match mode {
                DistanceMode::Absolute => {
                    self.canon.comment("interpreter: distance mode changed to absolute");
                }
                DistanceMode::Incremental => {
                    self.canon.comment("interpreter: distance mode changed to incremental");
                }
            }
            self.setup.distance_mode = mode;
        }
    }

    pub(super) fn convert_retract_mode(&mut self, mode: RetractMode) {
        match mode {
            RetractMode::OldZ => self.canon.comment("interpreter: retract mode set to old_z"),
            RetractMode::RPlane => self.canon.comment("interpreter: retract mode set to r_plane"),
        }
        self.setup.retract_mode = mode;
    }

    /// The group 0 codes that set data or move home; G4 and G53 are handled
    /// elsewhere.
    pub(super) fn convert_modal_0(&mut self, code: MiscMode, block: &Block) -> Result<()> {
        match code {
            MiscMode::SetCoordinateData => {
                self.convert_setup(block);
                Ok(())
            }
            MiscMode::GoHome | MiscMode::GoSecondaryHome => self.convert_home(code, block),
            MiscMode::SetAxisOffsets
            | MiscMode::ResetAxisOffsets
            | MiscMode::ClearAxisOffsets
            | MiscMode::RestoreAxisOffsets => self.convert_axis_offsets(code, block),
            MiscMode::Dwell | MiscMode::MachineCoords => Ok(()),
        }
    }

    /// G10 L2 Pn: set the origin of work coordinate system n.  Axis words
    /// are absolute coordinates of the new origin; absent axes keep their
    /// stored value.  Incremental distance mode has no effect here.
    fn convert_setup(&mut self, block: &Block) {
        let system = (block.p.unwrap_or(0.0) + 0.0001).trunc() as usize;
        let base = coord_base(system);

        let mut origin = Position {
            x: self.setup.params[base + 1],
            y: self.setup.params[base + 2],
            z: self.setup.params[base + 3],
            a: self.setup.params[base + 4],
            b: self.setup.params[base + 5],
            c: self.setup.params[base + 6],
        };
        if let Some(x) = block.x { origin.x = x; self.setup.params[base + 1] = x; }
        if let Some(y) = block.y { origin.y = y; self.setup.params[base + 2] = y; }
        if let Some(z) = block.z { origin.z = z; self.setup.params[base + 3] = z; }
        if let Some(a) = block.a { origin.a = a; self.setup.params[base + 4] = a; }
        if let Some(b) = block.b { origin.b = b; self.setup.params[base + 5] = b; }
        if let Some(c) = block.c { origin.c = c; self.setup.params[base + 6] = c; }

        if system == self.setup.origin_index {
            // the system being set is in use; shift the current point
            add_offset(&mut self.setup.current, &self.setup.origin_offset);
            self.setup.origin_offset = origin;
            sub_offset(&mut self.setup.current, &origin);

            let axis = self.setup.axis_offset;
            self.canon.set_origin_offsets(
                origin.x + axis.x, origin.y + axis.y, origin.z + axis.z,
                origin.a + axis.a, origin.b + axis.b, origin.c + axis.c,
            );
        } else {
            self.canon.comment("interpreter: setting coordinate system origin");
        }
    }

    /// G28/G30: traverse to the programmed point, then traverse to the
    /// stored home position.
    fn convert_home(&mut self, code: MiscMode, block: &Block) -> Result<()> {
        let end = self.setup.find_ends(block);
        if self.setup.comp.side.is_some() {
            return Err(Error::CannotUseG28OrG30WithCutterRadiusComp);
        }
        self.canon.straight_traverse(end.x, end.y, end.z, end.a, end.b, end.c);

        let base = if code == MiscMode::GoHome { G28_HOME } else { G30_HOME };
        let home = Position {
            x: self.setup.params[base],
            y: self.setup.params[base + 1],
            z: self.setup.params[base + 2],
            a: self.setup.params[base + 3],
            b: self.setup.params[base + 4],
            c: self.setup.params[base + 5],
        };
        let home = self.setup.find_relative(home);
        self.canon.straight_traverse(home.x, home.y, home.z, home.a, home.b, home.c);
        self.setup.current = home;
        Ok(())
    }

    /// The G92 series.  G92 computes axis offsets so the current point
    /// reads as given; G92.1 clears the offsets and zeroes parameters
    /// 5211-5216; G92.2 clears the offsets but keeps the parameters; G92.3
    /// restores the offsets from the parameters.
    fn convert_axis_offsets(&mut self, code: MiscMode, block: &Block) -> Result<()> {
        if self.setup.comp.side.is_some() {
            return Err(Error::CannotChangeAxisOffsetsWithCutterRadiusComp);
        }
        match code {
            MiscMode::SetAxisOffsets => {
                let setup = &mut self.setup;
                if let Some(x) = block.x {
                    setup.axis_offset.x += setup.current.x - x;
                    setup.current.x = x;
                }
                if let Some(y) = block.y {
                    setup.axis_offset.y += setup.current.y - y;
                    setup.current.y = y;
                }
                if let Some(z) = block.z {
                    setup.axis_offset.z += setup.current.z - z;
                    setup.current.z = z;
                }
                if let Some(a) = block.a {
                    setup.axis_offset.a += setup.current.a - a;
                    setup.current.a = a;
                }
                if let Some(b) = block.b {
                    setup.axis_offset.b += setup.current.b - b;
                    setup.current.b = b;
                }
                if let Some(c) = block.c {
                    setup.axis_offset.c += setup.current.c - c;
                    setup.current.c = c;
                }
                let total = sum(&setup.origin_offset, &setup.axis_offset);
                self.canon.set_origin_offsets(
                    total.x, total.y, total.z, total.a, total.b, total.c,
                );
                let axis = self.setup.axis_offset;
                self.setup.params[G92_OFFSETS] = axis.x;
                self.setup.params[G92_OFFSETS + 1] = axis.y;
                self.setup.params[G92_OFFSETS + 2] = axis.z;
                self.setup.params[G92_OFFSETS + 3] = axis.a;
                self.setup.params[G92_OFFSETS + 4] = axis.b;
                self.setup.params[G92_OFFSETS + 5] = axis.c;
            }
            MiscMode::ResetAxisOffsets | MiscMode::ClearAxisOffsets => {
                let setup = &mut self.setup;
                add_offset(&mut setup.current, &setup.axis_offset);
                setup.axis_offset = Position::default();
                let origin = setup.origin_offset;
                self.canon.set_origin_offsets(
                    origin.x, origin.y, origin.z, origin.a, origin.b, origin.c,
                );
                if code == MiscMode::ResetAxisOffsets {
                    for n in 0..6 {
                        self.setup.params[G92_OFFSETS + n] = 0.0;
                    }
                }
            }
            MiscMode::RestoreAxisOffsets => {
                let setup = &mut self.setup;
                let restored = Position {
                    x: setup.params[G92_OFFSETS],
                    y: setup.params[G92_OFFSETS + 1],
                    z: setup.params[G92_OFFSETS + 2],
                    a: setup.params[G92_OFFSETS + 3],
                    b: setup.params[G92_OFFSETS + 4],
                    c: setup.params[G92_OFFSETS + 5],
                };
                // shift current by the change in offset
                add_offset(&mut setup.current, &setup.axis_offset);
                sub_offset(&mut setup.current, &restored);
                setup.axis_offset = restored;
                let total = sum(&setup.origin_offset, &restored);
                self.canon.set_origin_offsets(
                    total.x, total.y, total.z, total.a, total.b, total.c,
                );
            }
            _ => unreachable!("not a g92-series code"),
        }
        Ok(())
    }

    /// The stopping group.  M2/M30 end the program and reset the model to
    /// its defaults; M30 and M60 shuttle pallets.
    pub(super) fn convert_stop(&mut self, block: &Block) -> Result<Status> {
        match block.m.stopping {
            Some(Stopping::Pause) => {
                self.canon.program_stop();
                Ok(Status::Ok)
            }
            Some(Stopping::PalletPause) => {
                self.canon.pallet_shuttle();
                self.canon.program_stop();
                Ok(Status::Ok)
            }
            Some(Stopping::OptionalPause) => {
                self.canon.optional_program_stop();
                Ok(Status::Ok)
            }
            Some(stopping @ (Stopping::End | Stopping::EndPallet)) => {
                let setup = &mut self.setup;
                // back to coordinate system 1, no axis offsets
                add_offset(&mut setup.current, &setup.origin_offset);
                add_offset(&mut setup.current, &setup.axis_offset);
                setup.origin_index = 1;
                setup.params[COORD_SELECT] = 1.0;
                let base = coord_base(1);
                setup.origin_offset = Position {
                    x: setup.params[base + 1],
                    y: setup.params[base + 2],
                    z: setup.params[base + 3],
                    a: setup.params[base + 4],
                    b: setup.params[base + 5],
                    c: setup.params[base + 6],
                };
                setup.axis_offset = Position::default();
                sub_offset(&mut setup.current, &setup.origin_offset);
                let origin = setup.origin_offset;
                self.canon.set_origin_offsets(
                    origin.x, origin.y, origin.z, origin.a, origin.b, origin.c,
                );

                if self.setup.plane != Plane::Xy {
                    self.canon.select_plane(Plane::Xy);
                    self.setup.plane = Plane::Xy;
                }
                self.setup.distance_mode = DistanceMode::Absolute;
                self.setup.feed_mode = FeedMode::UnitsPerMinute;
                if !self.setup.feed_override {
                    self.canon.enable_feed_override();
                    self.setup.feed_override = true;
                }
                if !self.setup.speed_override {
                    self.canon.enable_speed_override();
                    self.setup.speed_override = true;
                }
                self.setup.comp.side = None;
                self.setup.comp.program = None;
                self.canon.stop_spindle_turning();
                self.setup.spindle_turning = Direction::Stopped;
                self.setup.motion_mode = Motion::Linear;
                if self.setup.coolant.mist {
                    self.canon.mist_off();
                    self.setup.coolant.mist = false;
                }
                if self.setup.coolant.flood {
                    self.canon.flood_off();
                    self.setup.coolant.flood = false;
                }
                if stopping == Stopping::EndPallet {
                    self.canon.pallet_shuttle();
                }
                self.canon.program_end();
                Ok(Status::Exit)
            }
            None => Ok(Status::Ok),
        }
    }
}

fn add_offset(point: &mut Position, offset: &Position) {
    point.x += offset.x;
    point.y += offset.y;
    point.z += offset.z;
    point.a += offset.a;
    point.b += offset.b;
    point.c += offset.c;
}

fn sub_offset(point: &mut Position, offset: &Position) {
    point.x -= offset.x;
    point.y -= offset.y;
    point.z -= offset.z;
    point.a -= offset.a;
    point.b -= offset.b;
    point.c -= offset.c;
}

fn sum(left: &Position, right: &Position) -> Position {
    Position {
        x: left.x + right.x,
        y: left.y + right.y,
        z: left.z + right.z,
        a: left.a + right.a,
        b: left.b + right.b,
        c: left.c + right.c,
    }
}
