// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! The runtime block: one line of code with every expression evaluated and
//! every word sorted into its slot or modal group.
//!
//! G and M codes are keyed by modal group, one record field per group, so
//! that "at most one code per group per line" is enforced by construction.
//! Mirror values for the active-code arrays use the integer code times ten
//! (G59.1 is 591).

use crate::ast;
use crate::error::{Error, Result};
use crate::eval::{eval_expr, eval_integer, eval_par_index};
use crate::param::ParamTable;
use crate::types::{DistanceMode, FeedMode, Plane, RetractMode, MotionCtrl, Units};

/// Non-modal codes (group 0).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MiscMode {
    /// G4
    Dwell,
    /// G10: set the origin of a work coordinate system
    SetCoordinateData,
    /// G28
    GoHome,
    /// G30
    GoSecondaryHome,
    /// G53: machine coordinates for this block only
    MachineCoords,
    /// G92: set axis offsets so the current point reads as given
    SetAxisOffsets,
    /// G92.1: clear axis offsets and zero their parameters
    ResetAxisOffsets,
    /// G92.2: clear axis offsets, keep the parameters
    ClearAxisOffsets,
    /// G92.3: restore axis offsets from the parameters
    RestoreAxisOffsets,
}

impl MiscMode {
    pub fn code(self) -> i32 {
        match self {
            MiscMode::Dwell => 40,
            MiscMode::SetCoordinateData => 100,
            MiscMode::GoHome => 280,
            MiscMode::GoSecondaryHome => 300,
            MiscMode::MachineCoords => 530,
            MiscMode::SetAxisOffsets => 920,
            MiscMode::ResetAxisOffsets => 921,
            MiscMode::ClearAxisOffsets => 922,
            MiscMode::RestoreAxisOffsets => 923,
        }
    }
}

/// Motion codes (group 1).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Motion {
    /// G0
    Rapid,
    /// G1
    Linear,
    /// G2
    ArcCw,
    /// G3
    ArcCcw,
    /// G38.2
    Probe,
    /// G80
    CancelCycle,
    /// G81..G89
    Cycle(CannedCycle),
}

impl Motion {
    pub fn code(self) -> i32 {
        match self {
            Motion::Rapid => 0,
            Motion::Linear => 10,
            Motion::ArcCw => 20,
            Motion::ArcCcw => 30,
            Motion::Probe => 382,
            Motion::CancelCycle => 800,
            Motion::Cycle(cycle) => cycle.code(),
        }
    }
}

/// The canned cycles, G81..G89.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CannedCycle {
    /// G81: drill
    Drill,
    /// G82: drill with dwell
    DrillDwell,
    /// G83: peck drill
    PeckDrill,
    /// G84: right-hand tap
    Tap,
    /// G85: bore, feed out
    Bore,
    /// G86: bore, spindle stop, rapid out
    BoreStopRapid,
    /// G87: back bore
    BackBore,
    /// G88: bore, spindle stop, manual out
    BoreManual,
    /// G89: bore, dwell, feed out
    BoreDwellFeed,
}

impl CannedCycle {
    pub fn code(self) -> i32 {
        match self {
            CannedCycle::Drill => 810,
            CannedCycle::DrillDwell => 820,
            CannedCycle::PeckDrill => 830,
            CannedCycle::Tap => 840,
            CannedCycle::Bore => 850,
            CannedCycle::BoreStopRapid => 860,
            CannedCycle::BackBore => 870,
            CannedCycle::BoreManual => 880,
            CannedCycle::BoreDwellFeed => 890,
        }
    }
}

/// Cutter-radius-compensation codes (group 7).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompMode {
    /// G40
    Off,
    /// G41
    Left,
    /// G42
    Right,
}

/// Tool-length-offset codes (group 8).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ToolLengthMode {
    /// G43
    Use,
    /// G49
    Cancel,
}

/// One G code per modal group; `None` when the group is absent from the
/// line.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct GModes {
    pub misc: Option<MiscMode>,
    pub motion: Option<Motion>,
    pub plane: Option<Plane>,
    pub distance: Option<DistanceMode>,
    pub feed_mode: Option<FeedMode>,
    pub units: Option<Units>,
    pub cutter_comp: Option<CompMode>,
    pub tool_length: Option<ToolLengthMode>,
    pub retract: Option<RetractMode>,
    pub coord_system: Option<u8>,
    pub control: Option<MotionCtrl>,
}

impl GModes {
    /// File a G code (times ten) into its modal group.
    fn set(&mut self, code: i32) -> Result<()> {
        match code {
            40 => set_group(&mut self.misc, MiscMode::Dwell),
            100 => set_group(&mut self.misc, MiscMode::SetCoordinateData),
            280 => set_group(&mut self.misc, MiscMode::GoHome),
            300 => set_group(&mut self.misc, MiscMode::GoSecondaryHome),
            530 => set_group(&mut self.misc, MiscMode::MachineCoords),
            920 => set_group(&mut self.misc, MiscMode::SetAxisOffsets),
            921 => set_group(&mut self.misc, MiscMode::ResetAxisOffsets),
            922 => set_group(&mut self.misc, MiscMode::ClearAxisOffsets),
            923 => set_group(&mut self.misc, MiscMode::RestoreAxisOffsets),
            0 => set_group(&mut self.motion, Motion::Rapid),
            10 => set_group(&mut self.motion, Motion::Linear),
            20 => set_group(&mut self.motion, Motion::ArcCw),
            30 => set_group(&mut self.motion, Motion::ArcCcw),
            382 => set_group(&mut self.motion, Motion::Probe),
            800 => set_group(&mut self.motion, Motion::CancelCycle),
            810 => set_group(&mut self.motion, Motion::Cycle(CannedCycle::Drill)),
            820 => set_group(&mut self.motion, Motion::Cycle(CannedCycle::DrillDwell)),
            830 => set_group(&mut self.motion, Motion::Cycle(CannedCycle::PeckDrill)),
            840 => set_group(&mut self.motion, Motion::Cycle(CannedCycle::Tap)),
            850 => set_group(&mut self.motion, Motion::Cycle(CannedCycle::Bore)),
            860 => set_group(&mut self.motion, Motion::Cycle(CannedCycle::BoreStopRapid)),
            870 => set_group(&mut self.motion, Motion::Cycle(CannedCycle::BackBore)),
            880 => set_group(&mut self.motion, Motion::Cycle(CannedCycle::BoreManual)),
            890 => set_group(&mut self.motion, Motion::Cycle(CannedCycle::BoreDwellFeed)),
            170 => set_group(&mut self.plane, Plane::Xy),
            180 => set_group(&mut self.plane, Plane::Xz),
            190 => set_group(&mut self.plane, Plane::Yz),
            900 => set_group(&mut self.distance, DistanceMode::Absolute),
            910 => set_group(&mut self.distance, DistanceMode::Incremental),
            930 => set_group(&mut self.feed_mode, FeedMode::InverseTime),
            940 => set_group(&mut self.feed_mode, FeedMode::UnitsPerMinute),
            200 => set_group(&mut self.units, Units::Inches),
            210 => set_group(&mut self.units, Units::Mm),
            400 => set_group(&mut self.cutter_comp, CompMode::Off),
            410 => set_group(&mut self.cutter_comp, CompMode::Left),
            420 => set_group(&mut self.cutter_comp, CompMode::Right),
            430 => set_group(&mut self.tool_length, ToolLengthMode::Use),
            490 => set_group(&mut self.tool_length, ToolLengthMode::Cancel),
            980 => set_group(&mut self.retract, RetractMode::OldZ),
            990 => set_group(&mut self.retract, RetractMode::RPlane),
            540 | 550 | 560 | 570 | 580 | 590 => {
                set_group(&mut self.coord_system, ((code - 530) / 10) as u8)
            }
            591 | 592 | 593 => set_group(&mut self.coord_system, (code - 584) as u8),
            610 => set_group(&mut self.control, MotionCtrl::ExactPath),
            611 => set_group(&mut self.control, MotionCtrl::ExactStop),
            640 => set_group(&mut self.control, MotionCtrl::Continuous),
            _ => Err(Error::UnknownGCodeUsed),
        }
    }
}

fn set_group<T>(slot: &mut Option<T>, value: T) -> Result<()> {
    if slot.is_some() {
        return Err(Error::TwoGCodesUsedFromSameModalGroup);
    }
    *slot = Some(value);
    Ok(())
}

/// Stopping codes (M group 4).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stopping {
    /// M0
    Pause,
    /// M1
    OptionalPause,
    /// M2
    End,
    /// M30: end with pallet shuttle
    EndPallet,
    /// M60: pallet shuttle and pause
    PalletPause,
}

impl Stopping {
    pub fn code(self) -> i32 {
        match self {
            Stopping::Pause => 0,
            Stopping::OptionalPause => 1,
            Stopping::End => 2,
            Stopping::EndPallet => 30,
            Stopping::PalletPause => 60,
        }
    }
}

/// Spindle-turning codes (M group 7).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpindleTurn {
    /// M3
    Clockwise,
    /// M4
    CounterClockwise,
    /// M5
    Stop,
}

/// Coolant codes (M group 8).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CoolantCtl {
    /// M7
    Mist,
    /// M8
    Flood,
    /// M9
    Off,
}

/// Override-switch codes (M group 9).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OverrideCtl {
    /// M48
    Enable,
    /// M49
    Disable,
}

/// One M code per modal group, plus the per-line count (at most four M
/// codes are allowed on a line).
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct MModes {
    pub stopping: Option<Stopping>,
    pub tool_change: bool,
    pub spindle: Option<SpindleTurn>,
    pub coolant: Option<CoolantCtl>,
    pub overrides: Option<OverrideCtl>,
    pub count: usize,
}

impl MModes {
    fn set(&mut self, code: i32) -> Result<()> {
        match code {
            0 => set_m_group(&mut self.stopping, Stopping::Pause),
            1 => set_m_group(&mut self.stopping, Stopping::OptionalPause),
            2 => set_m_group(&mut self.stopping, Stopping::End),
            30 => set_m_group(&mut self.stopping, Stopping::EndPallet),
            60 => set_m_group(&mut self.stopping, Stopping::PalletPause),
            6 => {
                if self.tool_change {
                    return Err(Error::TwoMCodesUsedFromSameModalGroup);
                }
                self.tool_change = true;
                Ok(())
            }
            3 => set_m_group(&mut self.spindle, SpindleTurn::Clockwise),
            4 => set_m_group(&mut self.spindle, SpindleTurn::CounterClockwise),
            5 => set_m_group(&mut self.spindle, SpindleTurn::Stop),
            7 => set_m_group(&mut self.coolant, CoolantCtl::Mist),
            8 => set_m_group(&mut self.coolant, CoolantCtl::Flood),
            9 => set_m_group(&mut self.coolant, CoolantCtl::Off),
            48 => set_m_group(&mut self.overrides, OverrideCtl::Enable),
            49 => set_m_group(&mut self.overrides, OverrideCtl::Disable),
            _ => return Err(Error::UnknownMCodeUsed),
        }?;
        self.count += 1;
        Ok(())
    }
}

fn set_m_group<T>(slot: &mut Option<T>, value: T) -> Result<()> {
    if slot.is_some() {
        return Err(Error::TwoMCodesUsedFromSameModalGroup);
    }
    *slot = Some(value);
    Ok(())
}

/// One fully evaluated line of code.
#[derive(Clone, Debug, Default)]
pub struct Block {
    pub line_number: Option<u32>,
    pub comment: Option<String>,

    pub a: Option<f64>,
    pub b: Option<f64>,
    pub c: Option<f64>,
    pub d: Option<usize>,
    pub f: Option<f64>,
    pub h: Option<usize>,
    pub i: Option<f64>,
    pub j: Option<f64>,
    pub k: Option<f64>,
    pub l: Option<i32>,
    pub p: Option<f64>,
    pub q: Option<f64>,
    pub r: Option<f64>,
    pub s: Option<f64>,
    pub t: Option<usize>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,

    pub g: GModes,
    pub m: MModes,

    /// The motion that will actually run, explicit or inherited; set by
    /// [`Block::enhance`].
    pub motion_to_be: Option<Motion>,

    /// Buffered parameter assignments, applied only when the block
    /// executes.  Setting is parallel within a line: none of these values
    /// were visible to expressions on the same line.
    pub assignments: Vec<(usize, f64)>,
}

impl Block {
    /// Build a runtime block from a parsed one, evaluating all expressions
    /// against the parameter table.
    pub fn from_ast(parsed: &ast::Block, params: &ParamTable, tool_max: usize) -> Result<Block> {
        let mut block = Block::default();
        for (n, item) in parsed.items.iter().enumerate() {
            match item {
                ast::Item::Word(word) => block.take_word(word, n == 0, params, tool_max)?,
                ast::Item::ParAssign(assign) => {
                    let index = eval_par_index(&assign.id, params)?;
                    let value = eval_expr(&assign.value, params)?;
                    block.assignments.push((index, value));
                }
                ast::Item::Comment(text) => {
                    // keep the content only, without the parentheses
                    block.comment = Some(text[1..text.len() - 1].to_string());
                }
                ast::Item::BareParam(_) => {
                    return Err(Error::EqualSignMissingInParameterSetting)
                }
            }
        }
        Ok(block)
    }

    fn take_word(&mut self, word: &ast::Word, first: bool, params: &ParamTable,
                 tool_max: usize) -> Result<()> {
        match word {
            ast::Word::LineNumber(value) => {
                // a line number is only recognized at the front of the line
                if !first {
                    return Err(Error::BadCharacterUsed);
                }
                let ast::Expr::Num(number) = value else {
                    return Err(Error::BadFormatUnsignedInteger);
                };
                if *number < 0.0 || number.fract() != 0.0 {
                    return Err(Error::BadFormatUnsignedInteger);
                }
                if *number > 99999.0 {
                    return Err(Error::LineNumberGreaterThan99999);
                }
                self.line_number = Some(*number as u32);
            }
            ast::Word::Gcode(value) => {
                // G codes have one decimal digit; scale by ten and round
                // only if within 0.001 of an integer
                let value_read = 10.0 * eval_expr(value, params)?;
                let mut code = value_read.floor();
                let diff = value_read - code;
                if diff > 0.999 {
                    code = value_read.ceil();
                } else if diff > 0.001 {
                    return Err(Error::GCodeOutOfRange);
                }
                if code > 999.0 {
                    return Err(Error::GCodeOutOfRange);
                }
                if code < 0.0 {
                    return Err(Error::NegativeGCodeUsed);
                }
                self.g.set(code as i32)?;
            }
            ast::Word::Mcode(value) => {
                let code = eval_integer(value, params)?;
                if code < 0 {
                    return Err(Error::NegativeMCodeUsed);
                }
                if code > 99 {
                    return Err(Error::MCodeGreaterThan99);
                }
                self.m.set(code)?;
            }
            ast::Word::Feed(value) => {
                if self.f.is_some() {
                    return Err(Error::MultipleFWordsOnOneLine);
                }
                let feed = eval_expr(value, params)?;
                if feed < 0.0 {
                    return Err(Error::NegativeFWordUsed);
                }
                self.f = Some(feed);
            }
            ast::Word::Spindle(value) => {
                if self.s.is_some() {
                    return Err(Error::MultipleSWordsOnOneLine);
                }
                let speed = eval_expr(value, params)?;
                if speed < 0.0 {
                    return Err(Error::NegativeSpindleSpeedUsed);
                }
                self.s = Some(speed);
            }
            ast::Word::Tool(value) => {
                if self.t.is_some() {
                    return Err(Error::MultipleTWordsOnOneLine);
                }
                let slot = eval_integer(value, params)?;
                if slot < 0 {
                    return Err(Error::NegativeToolIdUsed);
                }
                self.t = Some(slot as usize);
            }
            ast::Word::Arg(arg, value) => self.take_arg(*arg, value, params, tool_max)?,
        }
        Ok(())
    }

    fn take_arg(&mut self, arg: ast::Arg, value: &ast::Expr, params: &ParamTable,
                tool_max: usize) -> Result<()> {
        use ast::Arg::*;
        match arg {
            AxisA => set_real(&mut self.a, value, params, Error::MultipleAWordsOnOneLine)?,
            AxisB => set_real(&mut self.b, value, params, Error::MultipleBWordsOnOneLine)?,
            AxisC => set_real(&mut self.c, value, params, Error::MultipleCWordsOnOneLine)?,
            AxisX => set_real(&mut self.x, value, params, Error::MultipleXWordsOnOneLine)?,
            AxisY => set_real(&mut self.y, value, params, Error::MultipleYWordsOnOneLine)?,
            AxisZ => set_real(&mut self.z, value, params, Error::MultipleZWordsOnOneLine)?,
            ArcI => set_real(&mut self.i, value, params, Error::MultipleIWordsOnOneLine)?,
            ArcJ => set_real(&mut self.j, value, params, Error::MultipleJWordsOnOneLine)?,
            ArcK => set_real(&mut self.k, value, params, Error::MultipleKWordsOnOneLine)?,
            ParamR => set_real(&mut self.r, value, params, Error::MultipleRWordsOnOneLine)?,
            ParamD => {
                if self.d.is_some() {
                    return Err(Error::MultipleDWordsOnOneLine);
                }
                let index = eval_integer(value, params)?;
                if index < 0 {
                    return Err(Error::NegativeDWordToolRadiusIndexUsed);
                }
                if index as usize > tool_max {
                    return Err(Error::ToolRadiusIndexTooBig);
                }
                self.d = Some(index as usize);
            }
            ParamH => {
                if self.h.is_some() {
                    return Err(Error::MultipleHWordsOnOneLine);
                }
                let index = eval_integer(value, params)?;
                if index < 0 {
                    return Err(Error::NegativeHWordToolLengthOffsetIndexUsed);
                }
                if index as usize > tool_max {
                    return Err(Error::ToolLengthOffsetIndexTooBig);
                }
                self.h = Some(index as usize);
            }
            ParamL => {
                if self.l.is_some() {
                    return Err(Error::MultipleLWordsOnOneLine);
                }
                let repeats = eval_integer(value, params)?;
                if repeats < 0 {
                    return Err(Error::NegativeLWordUsed);
                }
                self.l = Some(repeats);
            }
            ParamP => {
                if self.p.is_some() {
                    return Err(Error::MultiplePWordsOnOneLine);
                }
                let dwell = eval_expr(value, params)?;
                if dwell < 0.0 {
                    return Err(Error::NegativePWordUsed);
                }
                self.p = Some(dwell);
            }
            ParamQ => {
                if self.q.is_some() {
                    return Err(Error::MultipleQWordsOnOneLine);
                }
                let delta = eval_expr(value, params)?;
                if delta <= 0.0 {
                    return Err(Error::NegativeOrZeroQValueUsed);
                }
                self.q = Some(delta);
            }
        }
        Ok(())
    }

    /// True if any axis word is present.
    pub fn has_axis_words(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
            || self.a.is_some() || self.b.is_some() || self.c.is_some()
    }

    /// Work out which motion, if any, this block performs, inheriting the
    /// sticky motion mode when axis words appear without a motion code.
    pub fn enhance(&mut self, sticky_motion: Motion) -> Result<()> {
        let axis_flag = self.has_axis_words();
        let mode_zero_covets_axes = matches!(
            self.g.misc,
            Some(MiscMode::SetCoordinateData | MiscMode::GoHome | MiscMode::GoSecondaryHome
                 | MiscMode::SetAxisOffsets)
        );

        if let Some(motion) = self.g.motion {
            if motion == Motion::CancelCycle {
                if axis_flag && !mode_zero_covets_axes {
                    return Err(Error::CannotUseAxisValuesWithG80);
                }
                if !axis_flag && self.g.misc == Some(MiscMode::SetAxisOffsets) {
                    return Err(Error::AllAxesMissingWithG92);
                }
            } else {
                if mode_zero_covets_axes {
                    return Err(Error::CannotUseTwoGCodesThatBothUseAxisValues);
                }
                if !axis_flag {
                    return Err(Error::AllAxesMissingWithMotionCode);
                }
            }
            self.motion_to_be = Some(motion);
        } else if mode_zero_covets_axes {
            // the other three can get by without axes, but not G92
            if !axis_flag && self.g.misc == Some(MiscMode::SetAxisOffsets) {
                return Err(Error::AllAxesMissingWithG92);
            }
        } else if axis_flag {
            if sticky_motion == Motion::CancelCycle {
                return Err(Error::CannotUseAxisValuesWithoutAGCodeThatUsesThem);
            }
            self.motion_to_be = Some(sticky_motion);
        }
        Ok(())
    }

    /// Cross-word validation, run after `enhance`.
    pub fn check_items(&self, distance_mode: DistanceMode) -> Result<()> {
        self.check_g_codes(distance_mode)?;
        self.check_m_codes()?;
        self.check_other_codes()
    }

    fn check_g_codes(&self, distance_mode: DistanceMode) -> Result<()> {
        match self.g.misc {
            None
            | Some(MiscMode::GoHome)
            | Some(MiscMode::GoSecondaryHome)
            | Some(MiscMode::SetAxisOffsets)
            | Some(MiscMode::ResetAxisOffsets)
            | Some(MiscMode::ClearAxisOffsets)
            | Some(MiscMode::RestoreAxisOffsets) => Ok(()),
            Some(MiscMode::Dwell) => {
                if self.p.is_none() {
                    return Err(Error::DwellTimeMissingWithG4);
                }
                Ok(())
            }
            Some(MiscMode::SetCoordinateData) => {
                if self.l != Some(2) {
                    return Err(Error::LineWithG10DoesNotHaveL2);
                }
                let p = self.p.unwrap_or(-1.0);
                let p_int = (p + 0.0001).trunc();
                if (p + 0.0001) - p_int > 0.0002 {
                    return Err(Error::PValueNotAnIntegerWithG10L2);
                }
                if !(1.0..=9.0).contains(&p_int) {
                    return Err(Error::PValueOutOfRangeWithG10L2);
                }
                Ok(())
            }
            Some(MiscMode::MachineCoords) => {
                if !matches!(self.motion_to_be, Some(Motion::Rapid) | Some(Motion::Linear)) {
                    return Err(Error::MustUseG0OrG1WithG53);
                }
                if self.g.distance == Some(DistanceMode::Incremental)
                    || (self.g.distance != Some(DistanceMode::Absolute)
                        && distance_mode == DistanceMode::Incremental)
                {
                    return Err(Error::CannotUseG53Incremental);
                }
                Ok(())
            }
        }
    }

    fn check_m_codes(&self) -> Result<()> {
        // max number of m codes on one line
        const MAX_EMS: usize = 4;
        if self.m.count > MAX_EMS {
            return Err(Error::TooManyMCodesOnLine);
        }
        Ok(())
    }

    fn check_other_codes(&self) -> Result<()> {
        let in_cycle = matches!(self.g.motion, Some(Motion::Cycle(_)));
        if self.a.is_some() && in_cycle {
            return Err(Error::CannotPutAnAInCannedCycle);
        }
        if self.b.is_some() && in_cycle {
            return Err(Error::CannotPutABInCannedCycle);
        }
        if self.c.is_some() && in_cycle {
            return Err(Error::CannotPutACInCannedCycle);
        }
        if self.d.is_some()
            && !matches!(self.g.cutter_comp, Some(CompMode::Left) | Some(CompMode::Right))
        {
            return Err(Error::DWordWithNoG41OrG42);
        }
        if self.h.is_some() && self.g.tool_length != Some(ToolLengthMode::Use) {
            return Err(Error::HWordWithNoG43);
        }
        // I/J/K could still be useless depending on the plane; the arc
        // converter checks that
        let arc_or_back_bore = matches!(
            self.motion_to_be,
            Some(Motion::ArcCw) | Some(Motion::ArcCcw)
                | Some(Motion::Cycle(CannedCycle::BackBore))
        );
        if self.i.is_some() && !arc_or_back_bore {
            return Err(Error::IWordWithNoG2OrG3OrG87ToUseIt);
        }
        if self.j.is_some() && !arc_or_back_bore {
            return Err(Error::JWordWithNoG2OrG3OrG87ToUseIt);
        }
        if self.k.is_some() && !arc_or_back_bore {
            return Err(Error::KWordWithNoG2OrG3OrG87ToUseIt);
        }
        let motion_is_cycle = matches!(self.motion_to_be, Some(Motion::Cycle(_)));
        if self.l.is_some() && !motion_is_cycle
            && self.g.misc != Some(MiscMode::SetCoordinateData)
        {
            return Err(Error::LWordWithNoCannedCycleOrG10);
        }
        if self.p.is_some()
            && !matches!(self.g.misc, Some(MiscMode::Dwell) | Some(MiscMode::SetCoordinateData))
            && !matches!(
                self.motion_to_be,
                Some(Motion::Cycle(CannedCycle::DrillDwell))
                    | Some(Motion::Cycle(CannedCycle::BoreStopRapid))
                    | Some(Motion::Cycle(CannedCycle::BoreManual))
                    | Some(Motion::Cycle(CannedCycle::BoreDwellFeed))
            )
        {
            return Err(Error::PWordWithNoG4G10G82G86G88G89);
        }
        if self.q.is_some()
            && self.motion_to_be != Some(Motion::Cycle(CannedCycle::PeckDrill))
        {
            return Err(Error::QWordWithNoG83);
        }
        if self.r.is_some()
            && !matches!(self.motion_to_be, Some(Motion::ArcCw) | Some(Motion::ArcCcw))
            && !motion_is_cycle
        {
            return Err(Error::RWordWithNoGCodeThatUsesIt);
        }
        Ok(())
    }
}

fn set_real(slot: &mut Option<f64>, value: &ast::Expr, params: &ParamTable,
            duplicate: Error) -> Result<()> {
    if slot.is_some() {
        return Err(duplicate);
    }
    *slot = Some(eval_expr(value, params)?);
    Ok(())
}
