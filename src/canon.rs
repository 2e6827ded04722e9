// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! The canonical machining interface.
//!
//! [`Canon`] is the one polymorphic boundary of the interpreter: the
//! converter emits canonical machining commands into it and queries it for
//! external machine state during `init`/`synch` and after probing.  Two
//! sinks ship with the crate: [`Printer`], which writes one line per
//! command, and [`Recorder`], which accumulates [`Call`] values and answers
//! queries from configurable fields.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use crate::types::{Direction, FeedReference, MotionCtrl, Plane, Position, Units};

/// Highest tool slot number any carousel may have.
pub const TOOL_MAX: usize = 128;

/// One slot of the tool table.  Slot 0 means "no tool".
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct ToolEntry {
    pub id: i32,
    pub length: f64,
    pub diameter: f64,
}

/// The canonical command sink and external-state source.
///
/// Command methods are fire-and-forget; the interpreter observes no return
/// values from them.  Query methods have neutral defaults so that simple
/// sinks only implement what they care about.
pub trait Canon {
    // miscellaneous
    fn comment(&mut self, text: &str);
    fn message(&mut self, text: &str);
    fn init_canon(&mut self);
    fn pallet_shuttle(&mut self);
    fn program_stop(&mut self);
    fn optional_program_stop(&mut self);
    fn program_end(&mut self);
    fn mist_on(&mut self);
    fn mist_off(&mut self);
    fn flood_on(&mut self);
    fn flood_off(&mut self);
    fn enable_feed_override(&mut self);
    fn disable_feed_override(&mut self);
    fn enable_speed_override(&mut self);
    fn disable_speed_override(&mut self);
    fn turn_probe_on(&mut self);
    fn turn_probe_off(&mut self);

    // machining attributes
    fn select_plane(&mut self, plane: Plane);
    fn set_feed_rate(&mut self, rate: f64);
    fn set_feed_reference(&mut self, reference: FeedReference);
    fn set_motion_control_mode(&mut self, mode: MotionCtrl);
    fn start_speed_feed_synch(&mut self);
    fn stop_speed_feed_synch(&mut self);
    fn use_length_units(&mut self, units: Units);
    fn set_origin_offsets(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64);

    // spindle
    fn orient_spindle(&mut self, orientation: f64, direction: Direction);
    fn set_spindle_speed(&mut self, rpm: f64);
    fn start_spindle_clockwise(&mut self);
    fn start_spindle_counterclockwise(&mut self);
    fn stop_spindle_turning(&mut self);

    // tooling
    fn change_tool(&mut self, slot: usize);
    fn select_tool(&mut self, slot: usize);
    fn use_tool_length_offset(&mut self, offset: f64);

    // motion
    fn straight_traverse(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64);
    fn straight_feed(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64);
    #[allow(clippy::too_many_arguments)]
    fn arc_feed(&mut self, end1: f64, end2: f64, center1: f64, center2: f64,
                rotation: i32, axis_end: f64, a: f64, b: f64, c: f64);
    fn straight_probe(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64);
    fn dwell(&mut self, seconds: f64);

    // world-give-information queries
    fn position(&mut self) -> Position { Position::default() }
    fn probe_position(&mut self) -> Position { Position::default() }
    fn probe_value(&mut self) -> f64 { 0.0 }
    fn feed_rate(&mut self) -> f64 { 0.0 }
    fn flood(&mut self) -> bool { false }
    fn mist(&mut self) -> bool { false }
    fn length_unit_type(&mut self) -> Units { Units::Mm }
    /// System length unit factor in units per millimeter.  Carried for
    /// interface completeness; the interpreter does not consult it.
    fn length_unit_factor(&mut self) -> f64 { 1.0 }
    fn motion_control_mode(&mut self) -> MotionCtrl { MotionCtrl::Continuous }
    fn plane(&mut self) -> Plane { Plane::Xy }
    fn speed(&mut self) -> f64 { 0.0 }
    fn spindle_turning(&mut self) -> Direction { Direction::Stopped }
    fn tool_slot(&mut self) -> usize { 0 }
    fn tool_max(&mut self) -> usize { TOOL_MAX }
    fn tool_entry(&mut self, _slot: usize) -> ToolEntry { ToolEntry::default() }
    fn traverse_rate(&mut self) -> f64 { 0.0 }
    fn queue_empty(&mut self) -> bool { true }
    fn parameter_file_name(&mut self) -> Option<PathBuf> { None }
}

/// One recorded canonical command.
#[derive(Clone, PartialEq, Debug)]
pub enum Call {
    Comment(String),
    Message(String),
    InitCanon,
    PalletShuttle,
    ProgramStop,
    OptionalProgramStop,
    ProgramEnd,
    MistOn,
    MistOff,
    FloodOn,
    FloodOff,
    EnableFeedOverride,
    DisableFeedOverride,
    EnableSpeedOverride,
    DisableSpeedOverride,
    TurnProbeOn,
    TurnProbeOff,
    SelectPlane(Plane),
    SetFeedRate(f64),
    SetFeedReference(FeedReference),
    SetMotionControlMode(MotionCtrl),
    StartSpeedFeedSynch,
    StopSpeedFeedSynch,
    UseLengthUnits(Units),
    SetOriginOffsets(Position),
    OrientSpindle(f64, Direction),
    SetSpindleSpeed(f64),
    StartSpindleClockwise,
    StartSpindleCounterclockwise,
    StopSpindleTurning,
    ChangeTool(usize),
    SelectTool(usize),
    UseToolLengthOffset(f64),
    StraightTraverse(Position),
    StraightFeed(Position),
    ArcFeed {
        end1: f64,
        end2: f64,
        center1: f64,
        center2: f64,
        rotation: i32,
        axis_end: f64,
        a: f64,
        b: f64,
        c: f64,
    },
    StraightProbe(Position),
    Dwell(f64),
}

impl Display for Call {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        use Call::*;
        match self {
            Comment(text) => write!(f, "COMMENT({:?})", text),
            Message(text) => write!(f, "MESSAGE({:?})", text),
            InitCanon => f.write_str("INIT_CANON()"),
            PalletShuttle => f.write_str("PALLET_SHUTTLE()"),
            ProgramStop => f.write_str("PROGRAM_STOP()"),
            OptionalProgramStop => f.write_str("OPTIONAL_PROGRAM_STOP()"),
            ProgramEnd => f.write_str("PROGRAM_END()"),
            MistOn => f.write_str("MIST_ON()"),
            MistOff => f.write_str("MIST_OFF()"),
            FloodOn => f.write_str("FLOOD_ON()"),
            FloodOff => f.write_str("FLOOD_OFF()"),
            EnableFeedOverride => f.write_str("ENABLE_FEED_OVERRIDE()"),
            DisableFeedOverride => f.write_str("DISABLE_FEED_OVERRIDE()"),
            EnableSpeedOverride => f.write_str("ENABLE_SPEED_OVERRIDE()"),
            DisableSpeedOverride => f.write_str("DISABLE_SPEED_OVERRIDE()"),
            TurnProbeOn => f.write_str("TURN_PROBE_ON()"),
            TurnProbeOff => f.write_str("TURN_PROBE_OFF()"),
            SelectPlane(plane) => write!(f, "SELECT_PLANE({})", plane),
            SetFeedRate(rate) => write!(f, "SET_FEED_RATE({:.4})", rate),
            SetFeedReference(reference) => write!(f, "SET_FEED_REFERENCE({:?})", reference),
            SetMotionControlMode(mode) => write!(f, "SET_MOTION_CONTROL_MODE({:?})", mode),
            StartSpeedFeedSynch => f.write_str("START_SPEED_FEED_SYNCH()"),
            StopSpeedFeedSynch => f.write_str("STOP_SPEED_FEED_SYNCH()"),
            UseLengthUnits(units) => write!(f, "USE_LENGTH_UNITS({})", units),
            SetOriginOffsets(p) => write!(
                f, "SET_ORIGIN_OFFSETS({:.4}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4})",
                p.x, p.y, p.z, p.a, p.b, p.c),
            OrientSpindle(angle, dir) => write!(f, "ORIENT_SPINDLE({:.4}, {:?})", angle, dir),
            SetSpindleSpeed(rpm) => write!(f, "SET_SPINDLE_SPEED({:.4})", rpm),
            StartSpindleClockwise => f.write_str("START_SPINDLE_CLOCKWISE()"),
            StartSpindleCounterclockwise => f.write_str("START_SPINDLE_COUNTERCLOCKWISE()"),
            StopSpindleTurning => f.write_str("STOP_SPINDLE_TURNING()"),
            ChangeTool(slot) => write!(f, "CHANGE_TOOL({})", slot),
            SelectTool(slot) => write!(f, "SELECT_TOOL({})", slot),
            UseToolLengthOffset(offset) => write!(f, "USE_TOOL_LENGTH_OFFSET({:.4})", offset),
            StraightTraverse(p) => write!(
                f, "STRAIGHT_TRAVERSE({:.4}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4})",
                p.x, p.y, p.z, p.a, p.b, p.c),
            StraightFeed(p) => write!(
                f, "STRAIGHT_FEED({:.4}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4})",
                p.x, p.y, p.z, p.a, p.b, p.c),
            ArcFeed { end1, end2, center1, center2, rotation, axis_end, a, b, c } => write!(
                f, "ARC_FEED({:.4}, {:.4}, {:.4}, {:.4}, {}, {:.4}, {:.4}, {:.4}, {:.4})",
                end1, end2, center1, center2, rotation, axis_end, a, b, c),
            StraightProbe(p) => write!(
                f, "STRAIGHT_PROBE({:.4}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4})",
                p.x, p.y, p.z, p.a, p.b, p.c),
            Dwell(seconds) => write!(f, "DWELL({:.4})", seconds),
        }
    }
}

/// A sink that records every command and answers queries from its fields.
#[derive(Clone, Debug)]
pub struct Recorder {
    pub calls: Vec<Call>,
    pub position: Position,
    pub probe_position: Position,
    pub probe_value: f64,
    pub feed_rate: f64,
    pub flood: bool,
    pub mist: bool,
    pub units: Units,
    pub motion_control_mode: MotionCtrl,
    pub plane: Plane,
    pub speed: f64,
    pub spindle_turning: Direction,
    pub tool_slot: usize,
    pub tool_max: usize,
    pub tools: Vec<ToolEntry>,
    pub traverse_rate: f64,
    pub queue_empty: bool,
    pub parameter_file: Option<PathBuf>,
}

impl Default for Recorder {
    fn default() -> Recorder {
        Recorder {
            calls: Vec::new(),
            position: Position::default(),
            probe_position: Position::default(),
            probe_value: 0.0,
            feed_rate: 0.0,
            flood: false,
            mist: false,
            units: Units::Mm,
            motion_control_mode: MotionCtrl::Continuous,
            plane: Plane::Xy,
            speed: 0.0,
            spindle_turning: Direction::Stopped,
            tool_slot: 0,
            tool_max: TOOL_MAX,
            tools: Vec::new(),
            traverse_rate: 0.0,
            queue_empty: true,
            parameter_file: None,
        }
    }
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder::default()
    }

    /// Drain the recorded calls.
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl Canon for Recorder {
    fn comment(&mut self, text: &str) { self.calls.push(Call::Comment(text.into())) }
    fn message(&mut self, text: &str) { self.calls.push(Call::Message(text.into())) }
    fn init_canon(&mut self) { self.calls.push(Call::InitCanon) }
    fn pallet_shuttle(&mut self) { self.calls.push(Call::PalletShuttle) }
    fn program_stop(&mut self) { self.calls.push(Call::ProgramStop) }
    fn optional_program_stop(&mut self) { self.calls.push(Call::OptionalProgramStop) }
    fn program_end(&mut self) { self.calls.push(Call::ProgramEnd) }
    fn mist_on(&mut self) { self.calls.push(Call::MistOn) }
    fn mist_off(&mut self) { self.calls.push(Call::MistOff) }
    fn flood_on(&mut self) { self.calls.push(Call::FloodOn) }
    fn flood_off(&mut self) { self.calls.push(Call::FloodOff) }
    fn enable_feed_override(&mut self) { self.calls.push(Call::EnableFeedOverride) }
    fn disable_feed_override(&mut self) { self.calls.push(Call::DisableFeedOverride) }
    fn enable_speed_override(&mut self) { self.calls.push(Call::EnableSpeedOverride) }
    fn disable_speed_override(&mut self) { self.calls.push(Call::DisableSpeedOverride) }
    fn turn_probe_on(&mut self) { self.calls.push(Call::TurnProbeOn) }
    fn turn_probe_off(&mut self) { self.calls.push(Call::TurnProbeOff) }

    fn select_plane(&mut self, plane: Plane) { self.calls.push(Call::SelectPlane(plane)) }
    fn set_feed_rate(&mut self, rate: f64) { self.calls.push(Call::SetFeedRate(rate)) }
    fn set_feed_reference(&mut self, reference: FeedReference) {
        self.calls.push(Call::SetFeedReference(reference))
    }
    fn set_motion_control_mode(&mut self, mode: MotionCtrl) {
        self.calls.push(Call::SetMotionControlMode(mode))
    }
    fn start_speed_feed_synch(&mut self) { self.calls.push(Call::StartSpeedFeedSynch) }
    fn stop_speed_feed_synch(&mut self) { self.calls.push(Call::StopSpeedFeedSynch) }
    fn use_length_units(&mut self, units: Units) { self.calls.push(Call::UseLengthUnits(units)) }
    fn set_origin_offsets(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64) {
        self.calls.push(Call::SetOriginOffsets(Position::new(x, y, z, a, b, c)))
    }

    fn orient_spindle(&mut self, orientation: f64, direction: Direction) {
        self.calls.push(Call::OrientSpindle(orientation, direction))
    }
    fn set_spindle_speed(&mut self, rpm: f64) { self.calls.push(Call::SetSpindleSpeed(rpm)) }
    fn start_spindle_clockwise(&mut self) { self.calls.push(Call::StartSpindleClockwise) }
    fn start_spindle_counterclockwise(&mut self) {
        self.calls.push(Call::StartSpindleCounterclockwise)
    }
    fn stop_spindle_turning(&mut self) { self.calls.push(Call::StopSpindleTurning) }

    fn change_tool(&mut self, slot: usize) { self.calls.push(Call::ChangeTool(slot)) }
    fn select_tool(&mut self, slot: usize) { self.calls.push(Call::SelectTool(slot)) }
    fn use_tool_length_offset(&mut self, offset: f64) {
        self.calls.push(Call::UseToolLengthOffset(offset))
    }

    fn straight_traverse(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64) {
        self.calls.push(Call::StraightTraverse(Position::new(x, y, z, a, b, c)))
    }
    fn straight_feed(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64) {
        self.calls.push(Call::StraightFeed(Position::new(x, y, z, a, b, c)))
    }
    fn arc_feed(&mut self, end1: f64, end2: f64, center1: f64, center2: f64,
                rotation: i32, axis_end: f64, a: f64, b: f64, c: f64) {
        self.calls.push(Call::ArcFeed { end1, end2, center1, center2, rotation, axis_end, a, b, c })
    }
    fn straight_probe(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64) {
        self.calls.push(Call::StraightProbe(Position::new(x, y, z, a, b, c)))
    }
    fn dwell(&mut self, seconds: f64) { self.calls.push(Call::Dwell(seconds)) }

    fn position(&mut self) -> Position { self.position }
    fn probe_position(&mut self) -> Position { self.probe_position }
    fn probe_value(&mut self) -> f64 { self.probe_value }
    fn feed_rate(&mut self) -> f64 { self.feed_rate }
    fn flood(&mut self) -> bool { self.flood }
    fn mist(&mut self) -> bool { self.mist }
    fn length_unit_type(&mut self) -> Units { self.units }
    fn motion_control_mode(&mut self) -> MotionCtrl { self.motion_control_mode }
    fn plane(&mut self) -> Plane { self.plane }
    fn speed(&mut self) -> f64 { self.speed }
    fn spindle_turning(&mut self) -> Direction { self.spindle_turning }
    fn tool_slot(&mut self) -> usize { self.tool_slot }
    fn tool_max(&mut self) -> usize { self.tool_max }
    fn tool_entry(&mut self, slot: usize) -> ToolEntry {
        self.tools.get(slot).copied().unwrap_or_default()
    }
    fn traverse_rate(&mut self) -> f64 { self.traverse_rate }
    fn queue_empty(&mut self) -> bool { self.queue_empty }
    fn parameter_file_name(&mut self) -> Option<PathBuf> { self.parameter_file.clone() }
}

/// A sink that prints one line per canonical command to stdout.  Queries
/// all answer with the trait defaults.
#[derive(Default)]
pub struct Printer;

impl Printer {
    pub fn new() -> Printer {
        Printer
    }
}

impl Canon for Printer {
    fn comment(&mut self, text: &str) { println!("{}", Call::Comment(text.into())) }
    fn message(&mut self, text: &str) { println!("{}", Call::Message(text.into())) }
    fn init_canon(&mut self) { println!("{}", Call::InitCanon) }
    fn pallet_shuttle(&mut self) { println!("{}", Call::PalletShuttle) }
    fn program_stop(&mut self) { println!("{}", Call::ProgramStop) }
    fn optional_program_stop(&mut self) { println!("{}", Call::OptionalProgramStop) }
    fn program_end(&mut self) { println!("{}", Call::ProgramEnd) }
    fn mist_on(&mut self) { println!("{}", Call::MistOn) }
    fn mist_off(&mut self) { println!("{}", Call::MistOff) }
    fn flood_on(&mut self) { println!("{}", Call::FloodOn) }
    fn flood_off(&mut self) { println!("{}", Call::FloodOff) }
    fn enable_feed_override(&mut self) { println!("{}", Call::EnableFeedOverride) }
    fn disable_feed_override(&mut self) { println!("{}", Call::DisableFeedOverride) }
    fn enable_speed_override(&mut self) { println!("{}", Call::EnableSpeedOverride) }
    fn disable_speed_override(&mut self) { println!("{}", Call::DisableSpeedOverride) }
    fn turn_probe_on(&mut self) { println!("{}", Call::TurnProbeOn) }
    fn turn_probe_off(&mut self) { println!("{}", Call::TurnProbeOff) }

    fn select_plane(&mut self, plane: Plane) { println!("{}", Call::SelectPlane(plane)) }
    fn set_feed_rate(&mut self, rate: f64) { println!("{}", Call::SetFeedRate(rate)) }
    fn set_feed_reference(&mut self, reference: FeedReference) {
        println!("{}", Call::SetFeedReference(reference))
    }
    fn set_motion_control_mode(&mut self, mode: MotionCtrl) {
        println!("{}", Call::SetMotionControlMode(mode))
    }
    fn start_speed_feed_synch(&mut self) { println!("{}", Call::StartSpeedFeedSynch) }
    fn stop_speed_feed_synch(&mut self) { println!("{}", Call::StopSpeedFeedSynch) }
    fn use_length_units(&mut self, units: Units) { println!("{}", Call::UseLengthUnits(units)) }
    fn set_origin_offsets(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64) {
        println!("{}", Call::SetOriginOffsets(Position::new(x, y, z, a, b, c)))
    }

    fn orient_spindle(&mut self, orientation: f64, direction: Direction) {
        println!("{}", Call::OrientSpindle(orientation, direction))
    }
    fn set_spindle_speed(&mut self, rpm: f64) { println!("{}", Call::SetSpindleSpeed(rpm)) }
    fn start_spindle_clockwise(&mut self) { println!("{}", Call::StartSpindleClockwise) }
    fn start_spindle_counterclockwise(&mut self) {
        println!("{}", Call::StartSpindleCounterclockwise)
    }
    fn stop_spindle_turning(&mut self) { println!("{}", Call::StopSpindleTurning) }

    fn change_tool(&mut self, slot: usize) { println!("{}", Call::ChangeTool(slot)) }
    fn select_tool(&mut self, slot: usize) { println!("{}", Call::SelectTool(slot)) }
    fn use_tool_length_offset(&mut self, offset: f64) {
        println!("{}", Call::UseToolLengthOffset(offset))
    }

    fn straight_traverse(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64) {
        println!("{}", Call::StraightTraverse(Position::new(x, y, z, a, b, c)))
    }
    fn straight_feed(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64) {
        println!("{}", Call::StraightFeed(Position::new(x, y, z, a, b, c)))
    }
    fn arc_feed(&mut self, end1: f64, end2: f64, center1: f64, center2: f64,
                rotation: i32, axis_end: f64, a: f64, b: f64, c: f64) {
        println!("{}", Call::ArcFeed { end1, end2, center1, center2, rotation, axis_end, a, b, c })
    }
    fn straight_probe(&mut self, x: f64, y: f64, z: f64, a: f64, b: f64, c: f64) {
        println!("{}", Call::StraightProbe(Position::new(x, y, z, a, b, c)))
    }
    fn dwell(&mut self, seconds: f64) { println!("{}", Call::Dwell(seconds)) }
}
