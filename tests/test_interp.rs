// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Converter and session behavior, driven through a recording backend.
//!
//! The fixture machine starts at the origin in inch units, XY plane,
//! absolute distance mode, feed 10, spindle stopped.

use std::fs;

use ngci::canon::{Call, Recorder, ToolEntry};
use ngci::error::{Error, Status};
use ngci::interp::Interpreter;
use ngci::types::{DistanceMode, Plane, Position, Units};

fn recorder() -> Recorder {
    let mut recorder = Recorder::new();
    recorder.units = Units::Inches;
    recorder.feed_rate = 10.0;
    recorder.traverse_rate = 100.0;
    recorder.tool_max = 68;
    let mut tools = vec![ToolEntry::default(); 69];
    tools[1] = ToolEntry { id: 1, length: 2.0, diameter: 0.5 };
    tools[2] = ToolEntry { id: 2, length: 1.5, diameter: 0.25 };
    recorder.tools = tools;
    recorder
}

fn interp() -> Interpreter<Recorder> {
    let mut interp = Interpreter::new(recorder());
    interp.synch().unwrap();
    interp.canon_mut().take_calls();
    interp
}

fn run(interp: &mut Interpreter<Recorder>, lines: &[&str]) {
    for line in lines {
        interp.read_line(line).unwrap();
        interp.execute().unwrap();
    }
}

fn run_err(interp: &mut Interpreter<Recorder>, line: &str) -> Error {
    match interp.read_line(line) {
        Err(e) => e,
        Ok(_) => match interp.execute() {
            Err(e) => e,
            Ok(status) => panic!("expected an error for {:?}, got {:?}", line, status),
        },
    }
}

fn calls(interp: &mut Interpreter<Recorder>) -> Vec<Call> {
    interp.canon_mut().take_calls()
}

fn moves(interp: &mut Interpreter<Recorder>) -> Vec<Call> {
    calls(interp)
        .into_iter()
        .filter(|call| !matches!(call, Call::Comment(_)))
        .collect()
}

fn assert_pos(actual: Position, x: f64, y: f64, z: f64) {
    assert!(
        (actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9
            && (actual.z - z).abs() < 1e-9,
        "position was {:?}, expected ({}, {}, {})", actual, x, y, z
    );
}

#[test]
fn rapid_move() {
    let mut interp = interp();
    run(&mut interp, &["G0 X1 Y2 Z3"]);
    assert_eq!(
        calls(&mut interp),
        vec![Call::StraightTraverse(Position::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0))]
    );
    assert_pos(interp.setup().current, 1.0, 2.0, 3.0);
}

#[test]
fn feed_then_quarter_arc() {
    let mut interp = interp();
    run(&mut interp, &["G1 X1 Y0 F5", "G2 X0 Y1 I-1 J0"]);
    assert_eq!(
        calls(&mut interp),
        vec![
            Call::SetFeedRate(5.0),
            Call::StraightFeed(Position::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0)),
            Call::ArcFeed {
                end1: 0.0,
                end2: 1.0,
                center1: 0.0,
                center2: 0.0,
                rotation: -1,
                axis_end: 0.0,
                a: 0.0,
                b: 0.0,
                c: 0.0,
            },
        ]
    );
    assert_pos(interp.setup().current, 0.0, 1.0, 0.0);
}

#[test]
fn helical_arc_carries_the_axis_leg() {
    let mut interp = interp();
    run(&mut interp, &["G1 X1 Y0 F5", "G2 X0 Y1 Z-0.5 I-1"]);
    let last = calls(&mut interp).pop().unwrap();
    assert_eq!(
        last,
        Call::ArcFeed {
            end1: 0.0,
            end2: 1.0,
            center1: 0.0,
            center2: 0.0,
            rotation: -1,
            axis_end: -0.5,
            a: 0.0,
            b: 0.0,
            c: 0.0,
        }
    );
}

#[test]
fn arc_in_xz_plane() {
    let mut interp = interp();
    run(&mut interp, &["G18", "G2 X2 Z0 I1 F10"]);
    let last = calls(&mut interp).pop().unwrap();
    // in the XZ plane the plane coordinates are (Z, X) and Y is the axis
    assert_eq!(
        last,
        Call::ArcFeed {
            end1: 0.0,
            end2: 2.0,
            center1: 0.0,
            center2: 1.0,
            rotation: -1,
            axis_end: 0.0,
            a: 0.0,
            b: 0.0,
            c: 0.0,
        }
    );
    assert_pos(interp.setup().current, 2.0, 0.0, 0.0);
}

#[test]
fn arc_radius_must_agree() {
    let mut interp = interp();
    run(&mut interp, &["G1 X1 Y0 F5"]);
    assert_eq!(
        run_err(&mut interp, "G2 X0 Y5 I-1 J0"),
        Error::RadiusToEndOfArcDiffersFromRadiusToStart
    );
}

#[test]
fn arc_format_errors() {
    let mut interp = interp();
    run(&mut interp, &["G1 X1 Y0 F5"]);
    assert_eq!(run_err(&mut interp, "G2 X0 Y1"), Error::RIJKWordsAllMissingForArc);
    assert_eq!(
        run_err(&mut interp, "G2 X0 Y1 R1 I-1"),
        Error::MixedRadiusIjkFormatForArc
    );
    assert_eq!(run_err(&mut interp, "G2 X0 Y1 K1"), Error::KWordGivenForArcInXyPlane);
}

#[test]
fn parallel_assignment_reaches_fixpoint() {
    let mut interp = interp();
    run(&mut interp, &["G1 X0 F10"]);
    calls(&mut interp);

    // parameter setting is parallel: neither #2 nor the X word sees a
    // value assigned on the same line
    run(&mut interp, &["#1=3 #2=[#1+2] X#2"]);
    assert_eq!(interp.setup().params.get(1).unwrap(), 3.0);
    assert_eq!(interp.setup().params.get(2).unwrap(), 2.0);
    assert_pos(interp.setup().current, 0.0, 0.0, 0.0);

    // a second execution of the same line settles the published values
    run(&mut interp, &["#1=3 #2=[#1+2] X#2"]);
    assert_eq!(interp.setup().params.get(1).unwrap(), 3.0);
    assert_eq!(interp.setup().params.get(2).unwrap(), 5.0);
    assert_pos(interp.setup().current, 2.0, 0.0, 0.0);

    run(&mut interp, &["#1=3 #2=[#1+2] X#2"]);
    assert_pos(interp.setup().current, 5.0, 0.0, 0.0);
}

#[test]
fn failed_line_discards_buffered_assignments() {
    let mut interp = interp();
    // the line errors during checking; its assignment must not apply
    assert_eq!(
        run_err(&mut interp, "#7=42 G4"),
        Error::DwellTimeMissingWithG4
    );
    assert_eq!(interp.setup().params.get(7).unwrap(), 0.0);
}

#[test]
fn incremental_mode_compounds() {
    let mut interp = interp();
    run(&mut interp, &["G91 G1 X1 F10", "G1 X1"]);
    let feeds = moves(&mut interp);
    assert_eq!(
        feeds,
        vec![
            Call::StraightFeed(Position::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0)),
            Call::StraightFeed(Position::new(2.0, 0.0, 0.0, 0.0, 0.0, 0.0)),
        ]
    );
    assert_pos(interp.setup().current, 2.0, 0.0, 0.0);
}

#[test]
fn units_toggle_keeps_position() {
    let mut interp = interp();
    run(&mut interp, &["G0 X1 Y1 Z1"]);
    run(&mut interp, &["G21"]);
    assert_pos(interp.setup().current, 25.4, 25.4, 25.4);
    run(&mut interp, &["G20"]);
    let current = interp.setup().current;
    assert!((current.x - 1.0).abs() < 1e-12);
    assert!((current.y - 1.0).abs() < 1e-12);
    assert!((current.z - 1.0).abs() < 1e-12);
    let emitted = calls(&mut interp);
    assert!(emitted.contains(&Call::UseLengthUnits(Units::Mm)));
    assert!(emitted.contains(&Call::UseLengthUnits(Units::Inches)));
}

#[test]
fn g92_offsets_and_their_laws() {
    let mut interp = interp();
    run(&mut interp, &["G0 X1 Y2 Z3", "G92 X0 Y0 Z0"]);
    let setup = interp.setup();
    assert_pos(setup.current, 0.0, 0.0, 0.0);
    assert_pos(setup.axis_offset, 1.0, 2.0, 3.0);
    assert_eq!(setup.params.get(5211).unwrap(), 1.0);
    assert_eq!(setup.params.get(5213).unwrap(), 3.0);
    assert!(calls(&mut interp)
        .contains(&Call::SetOriginOffsets(Position::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0))));

    // G92.1 restores zero offsets, leaves the machine position alone, and
    // zeroes the parameters
    run(&mut interp, &["G92.1"]);
    let setup = interp.setup();
    assert_pos(setup.current, 1.0, 2.0, 3.0);
    assert_pos(setup.axis_offset, 0.0, 0.0, 0.0);
    assert_eq!(setup.params.get(5211).unwrap(), 0.0);

    // G92.2 clears the offsets but keeps the parameters
    run(&mut interp, &["G92 X0 Y0 Z0", "G92.2"]);
    let setup = interp.setup();
    assert_pos(setup.axis_offset, 0.0, 0.0, 0.0);
    assert_eq!(setup.params.get(5211).unwrap(), 1.0);

    // G92.3 brings them back from the parameters
    run(&mut interp, &["G92.3"]);
    let setup = interp.setup();
    assert_pos(setup.axis_offset, 1.0, 2.0, 3.0);
    assert_pos(setup.current, 0.0, 0.0, 0.0);
}

#[test]
fn coordinate_system_switch_is_physically_invariant() {
    let mut interp = interp();
    run(&mut interp, &["G0 X1 Y2 Z3", "G10 L2 P2 X1 Y1 Z1"]);
    // setting a system not in use only records parameters
    assert_pos(interp.setup().current, 1.0, 2.0, 3.0);
    assert_eq!(interp.setup().params.get(5241).unwrap(), 1.0);

    run(&mut interp, &["G55"]);
    let setup = interp.setup();
    assert_eq!(setup.origin_index, 2);
    assert_eq!(setup.params.get(5220).unwrap(), 2.0);
    assert_pos(setup.current, 0.0, 1.0, 2.0);
    assert_pos(setup.origin_offset, 1.0, 1.0, 1.0);

    run(&mut interp, &["G54"]);
    assert_pos(interp.setup().current, 1.0, 2.0, 3.0);
    assert_eq!(interp.setup().origin_index, 1);
}

#[test]
fn g53_suspends_offsets_for_one_block() {
    let mut interp = interp();
    run(&mut interp, &["G0 X1", "G92 X0"]);
    calls(&mut interp);
    run(&mut interp, &["G53 G0 X5"]);
    let emitted = moves(&mut interp);
    // machine coordinate 5 is work coordinate 4 under the offset of 1
    assert_eq!(
        emitted,
        vec![Call::StraightTraverse(Position::new(4.0, 0.0, 0.0, 0.0, 0.0, 0.0))]
    );
    // the offset comes right back for the next block
    run(&mut interp, &["G0 X0"]);
    assert_pos(interp.setup().current, 0.0, 0.0, 0.0);
}

#[test]
fn g28_moves_through_the_intermediate_point() {
    let mut interp = interp();
    run(&mut interp, &["#5161=1"]);
    calls(&mut interp);
    run(&mut interp, &["G28 X2"]);
    assert_eq!(
        moves(&mut interp),
        vec![
            Call::StraightTraverse(Position::new(2.0, 0.0, 0.0, 0.0, 0.0, 0.0)),
            Call::StraightTraverse(Position::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0)),
        ]
    );
    assert_pos(interp.setup().current, 1.0, 0.0, 0.0);
}

#[test]
fn tool_selection_and_change() {
    let mut interp = interp();
    run(&mut interp, &["T5", "M6"]);
    assert_eq!(calls(&mut interp), vec![Call::SelectTool(5), Call::ChangeTool(5)]);
    assert_eq!(interp.setup().current_slot, 5);
    assert_eq!(run_err(&mut interp, "T100"), Error::SelectedToolSlotNumberTooLarge);
}

#[test]
fn tool_length_offset_shifts_z() {
    let mut interp = interp();
    run(&mut interp, &["G43 H2"]);
    assert_eq!(calls(&mut interp), vec![Call::UseToolLengthOffset(1.5)]);
    assert_pos(interp.setup().current, 0.0, 0.0, -1.5);
    run(&mut interp, &["G0 Z0", "G49"]);
    assert_pos(interp.setup().current, 0.0, 0.0, 1.5);
    assert_eq!(run_err(&mut interp, "G43"), Error::OffsetIndexMissing);
}

#[test]
fn spindle_coolant_overrides() {
    let mut interp = interp();
    run(&mut interp, &["M3 S100"]);
    assert_eq!(
        calls(&mut interp),
        vec![Call::SetSpindleSpeed(100.0), Call::StartSpindleClockwise]
    );
    run(&mut interp, &["M7", "M8", "M9"]);
    assert_eq!(
        calls(&mut interp),
        vec![Call::MistOn, Call::FloodOn, Call::MistOff, Call::FloodOff]
    );
    run(&mut interp, &["M49", "M48"]);
    assert_eq!(
        calls(&mut interp),
        vec![
            Call::DisableFeedOverride,
            Call::DisableSpeedOverride,
            Call::EnableFeedOverride,
            Call::EnableSpeedOverride,
        ]
    );
    run(&mut interp, &["M5", "M0", "M60"]);
    let emitted = calls(&mut interp);
    assert_eq!(emitted[0], Call::StopSpindleTurning);
    assert_eq!(emitted[1], Call::ProgramStop);
    assert_eq!(emitted[2], Call::PalletShuttle);
    assert_eq!(emitted[3], Call::ProgramStop);
}

#[test]
fn program_end_resets_the_model() {
    let mut interp = interp();
    run(&mut interp, &["G91", "G18", "M8", "M3 S100"]);
    calls(&mut interp);
    interp.read_line("M2").unwrap();
    assert_eq!(interp.execute().unwrap(), Status::Exit);
    let setup = interp.setup();
    assert_eq!(setup.distance_mode, DistanceMode::Absolute);
    assert_eq!(setup.plane, Plane::Xy);
    assert_eq!(setup.origin_index, 1);
    let emitted = calls(&mut interp);
    assert!(emitted.contains(&Call::SelectPlane(Plane::Xy)));
    assert!(emitted.contains(&Call::StopSpindleTurning));
    assert!(emitted.contains(&Call::FloodOff));
    assert_eq!(emitted.last(), Some(&Call::ProgramEnd));
}

#[test]
fn messages_and_comments() {
    let mut interp = interp();
    run(&mut interp, &["(MSG, tool change next)", "(plain note)"]);
    assert_eq!(
        calls(&mut interp),
        vec![
            Call::Message(" tool change next".into()),
            Call::Comment("plain note".into()),
        ]
    );
}

#[test]
fn dwell() {
    let mut interp = interp();
    run(&mut interp, &["G4 P0.5"]);
    assert_eq!(calls(&mut interp), vec![Call::Dwell(0.5)]);
    assert_eq!(run_err(&mut interp, "G4"), Error::DwellTimeMissingWithG4);
}

#[test]
fn inverse_time_feed() {
    let mut interp = interp();
    run(&mut interp, &["G93", "G1 X3 Y4 F2"]);
    // length 5 at 1/F = half a minute: rate 10
    assert_eq!(
        moves(&mut interp),
        vec![
            Call::SetFeedRate(10.0),
            Call::StraightFeed(Position::new(3.0, 4.0, 0.0, 0.0, 0.0, 0.0)),
        ]
    );
    // a zero-length move floors the rate at 0.1
    run(&mut interp, &["G1 X3 Y4 F2"]);
    assert_eq!(
        moves(&mut interp),
        vec![
            Call::SetFeedRate(0.1),
            Call::StraightFeed(Position::new(3.0, 4.0, 0.0, 0.0, 0.0, 0.0)),
        ]
    );
    // G0 does not set a feed rate in inverse time mode
    run(&mut interp, &["G0 X0 Y0"]);
    assert_eq!(
        moves(&mut interp),
        vec![Call::StraightTraverse(Position::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0))]
    );
    // G1 without F is rejected
    assert_eq!(run_err(&mut interp, "G1 X1"), Error::FWordMissingWithInverseTimeG1Move);
    // back to units per minute: the F word acts directly again
    run(&mut interp, &["G94", "F7.5"]);
    assert!(calls(&mut interp).contains(&Call::SetFeedRate(7.5)));
}

#[test]
fn probing_round_trip() {
    let mut interp = interp();
    interp.canon_mut().position = Position::new(0.5, 0.0, 0.0, 0.0, 0.0, 0.0);
    interp.canon_mut().probe_position = Position::new(0.5, 0.0, 0.0, 0.0, 0.0, 0.0);
    interp.canon_mut().probe_value = 1.0;

    interp.read_line("G38.2 X1").unwrap();
    assert_eq!(interp.execute().unwrap(), Status::ExecuteFinish);
    assert_eq!(
        calls(&mut interp),
        vec![
            Call::TurnProbeOn,
            Call::StraightProbe(Position::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0)),
            Call::TurnProbeOff,
        ]
    );

    // the next read pulls the trip position into the parameters and
    // resynchronizes the model position
    run(&mut interp, &["G4 P0"]);
    assert_pos(interp.setup().current, 0.5, 0.0, 0.0);
    assert_eq!(interp.setup().params.get(5061).unwrap(), 0.5);
    assert_eq!(interp.setup().params.get(5067).unwrap(), 1.0);
}

#[test]
fn probing_preconditions() {
    let mut interp = interp();
    assert_eq!(
        run_err(&mut interp, "G38.2 X0.005"),
        Error::StartPointTooCloseToProbePoint
    );
    assert_eq!(
        run_err(&mut interp, "G38.2 X1 A5"),
        Error::CannotMoveRotaryAxesDuringProbing
    );
    // a rotary word alone satisfies the axis check but not the probe
    assert_eq!(
        run_err(&mut interp, "G38.2 A5"),
        Error::XYAndZWordsAllMissingWithG382
    );
    run(&mut interp, &["G93"]);
    assert_eq!(
        run_err(&mut interp, "G38.2 X1 F2"),
        Error::CannotProbeInInverseTimeFeedMode
    );
}

#[test]
fn queue_must_drain_after_probing() {
    let mut interp = interp();
    interp.canon_mut().queue_empty = false;
    run(&mut interp, &["F10"]);
    interp.read_line("G38.2 X1").unwrap();
    interp.execute().unwrap();
    assert_eq!(
        interp.read_line("G4 P0").unwrap_err(),
        Error::QueueIsNotEmptyAfterProbing
    );
}

#[test]
fn active_code_mirrors() {
    let mut interp = interp();
    run(&mut interp, &["N5 G1 X1 F10 M3 S100"]);
    let active_g = interp.active_g_codes();
    assert_eq!(active_g[1], 10); // motion
    assert_eq!(active_g[2], -1); // no group 0 code on the line
    assert_eq!(active_g[3], 170); // XY plane
    assert_eq!(active_g[4], 400); // comp off
    assert_eq!(active_g[5], 200); // inches
    assert_eq!(active_g[6], 900); // absolute
    assert_eq!(active_g[7], 940); // units per minute
    assert_eq!(active_g[8], 540); // system 1
    assert_eq!(active_g[9], 490); // no length offset
    let active_m = interp.active_m_codes();
    assert_eq!(active_m[1], -1); // no stopping code
    assert_eq!(active_m[2], 3); // spindle clockwise
    assert_eq!(active_m[4], 9); // no coolant
    assert_eq!(active_m[6], 48); // overrides enabled
    let settings = interp.active_settings();
    assert_eq!(settings[1], 10.0);
    assert_eq!(settings[2], 100.0);

    run(&mut interp, &["G59.1"]);
    assert_eq!(interp.active_g_codes()[8], 591);
}

#[test]
fn word_and_modal_errors() {
    let mut interp = interp();
    assert_eq!(run_err(&mut interp, "G0 G1 X1"), Error::TwoGCodesUsedFromSameModalGroup);
    assert_eq!(run_err(&mut interp, "M3 M4"), Error::TwoMCodesUsedFromSameModalGroup);
    assert_eq!(run_err(&mut interp, "G1"), Error::AllAxesMissingWithMotionCode);
    assert_eq!(run_err(&mut interp, "X1"), Error::CannotUseAxisValuesWithoutAGCodeThatUsesThem);
    assert_eq!(run_err(&mut interp, "G80 X1"), Error::CannotUseAxisValuesWithG80);
    assert_eq!(run_err(&mut interp, "G92"), Error::AllAxesMissingWithG92);
    assert_eq!(run_err(&mut interp, "G1 G28 X1"), Error::CannotUseTwoGCodesThatBothUseAxisValues);
    assert_eq!(run_err(&mut interp, "G1 X1 X2 F10"), Error::MultipleXWordsOnOneLine);
    assert_eq!(run_err(&mut interp, "G1 X1 F1 F2"), Error::MultipleFWordsOnOneLine);
    assert_eq!(run_err(&mut interp, "D1"), Error::DWordWithNoG41OrG42);
    assert_eq!(run_err(&mut interp, "H1"), Error::HWordWithNoG43);
    assert_eq!(run_err(&mut interp, "Q1"), Error::QWordWithNoG83);
    assert_eq!(run_err(&mut interp, "R1"), Error::RWordWithNoGCodeThatUsesIt);
    assert_eq!(run_err(&mut interp, "L2"), Error::LWordWithNoCannedCycleOrG10);
    assert_eq!(run_err(&mut interp, "G1 X1 I1 F10"), Error::IWordWithNoG2OrG3OrG87ToUseIt);
    assert_eq!(run_err(&mut interp, "G10 L3 P1 X0"), Error::LineWithG10DoesNotHaveL2);
    assert_eq!(run_err(&mut interp, "G10 L2 P12 X0"), Error::PValueOutOfRangeWithG10L2);
    assert_eq!(run_err(&mut interp, "G91 G53 G0 X1"), Error::CannotUseG53Incremental);
    assert_eq!(run_err(&mut interp, "G53 G2 X1 Y1 R1 F10"), Error::MustUseG0OrG1WithG53);
    assert_eq!(run_err(&mut interp, "N123456 G0 X1"), Error::LineNumberGreaterThan99999);
    assert_eq!(run_err(&mut interp, "M45"), Error::UnknownMCodeUsed);
    assert_eq!(run_err(&mut interp, "M123"), Error::MCodeGreaterThan99);
    assert_eq!(run_err(&mut interp, "G5 X1"), Error::UnknownGCodeUsed);
    assert_eq!(run_err(&mut interp, "F-1"), Error::NegativeFWordUsed);
    assert_eq!(run_err(&mut interp, "S-1"), Error::NegativeSpindleSpeedUsed);
    assert_eq!(run_err(&mut interp, "G1 X1 Q-1 F10"), Error::NegativeOrZeroQValueUsed);
    assert_eq!(run_err(&mut interp, "#1"), Error::EqualSignMissingInParameterSetting);
    assert_eq!(run_err(&mut interp, "#0=1"), Error::ParameterNumberOutOfRange);
    assert_eq!(run_err(&mut interp, "M2 M6 M3 M7 M48"), Error::TooManyMCodesOnLine);
}

#[test]
fn zero_feed_rate_is_rejected() {
    let mut recorder = recorder();
    recorder.feed_rate = 0.0;
    let mut interp = Interpreter::new(recorder);
    interp.synch().unwrap();
    assert_eq!(run_err(&mut interp, "G1 X1"), Error::CannotDoG1WithZeroFeedRate);
    assert_eq!(run_err(&mut interp, "G2 X1 Y1 R1"), Error::CannotMakeArcWithZeroFeedRate);
}

// ---- session lifecycle over real files ----

fn open_program(content: &str) -> (Interpreter<Recorder>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.ngc");
    fs::write(&path, content).unwrap();
    let mut interp = Interpreter::new(recorder());
    interp.synch().unwrap();
    interp.canon_mut().take_calls();
    interp.open(&path).unwrap();
    (interp, dir)
}

#[test]
fn percent_framed_program() {
    let (mut interp, _dir) = open_program("\n\n%\nG0 X1\n%\nthis is never read\n");
    assert_eq!(interp.read().unwrap(), Status::Ok);
    assert_eq!(interp.execute().unwrap(), Status::Ok);
    assert_eq!(interp.read().unwrap(), Status::EndFile);
    // reads past the closing percent stay at end of file
    assert_eq!(interp.read().unwrap(), Status::EndFile);
}

#[test]
fn missing_closing_percent() {
    let (mut interp, _dir) = open_program("%\nG0 X1\n");
    interp.read().unwrap();
    interp.execute().unwrap();
    assert_eq!(interp.read().unwrap_err(), Error::FileEndedWithNoPercentSign);
}

#[test]
fn missing_program_end() {
    let (mut interp, _dir) = open_program("G0 X1\n");
    interp.read().unwrap();
    interp.execute().unwrap();
    assert_eq!(
        interp.read().unwrap_err(),
        Error::FileEndedWithNoPercentSignOrProgramEnd
    );
}

#[test]
fn program_end_with_m2() {
    let (mut interp, _dir) = open_program("G0 X1\nM2\n");
    interp.read().unwrap();
    interp.execute().unwrap();
    interp.read().unwrap();
    assert_eq!(interp.execute().unwrap(), Status::Exit);
}

#[test]
fn empty_program() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.ngc");
    fs::write(&path, "").unwrap();
    let mut interp = Interpreter::new(recorder());
    assert_eq!(interp.open(&path).unwrap_err(), Error::FileEndedWithNoPercentSign);

    fs::write(&path, "\n   \n\t\n").unwrap();
    assert_eq!(interp.open(&path).unwrap_err(), Error::FileEndedWithNoPercentSign);
}

#[test]
fn block_delete_lines_are_flagged_not_skipped() {
    let (mut interp, _dir) = open_program("/G0 X1\nM2\n");
    // the caller decides; executing the line is allowed
    assert_eq!(interp.read().unwrap(), Status::ExecuteFinish);
    interp.execute().unwrap();
    assert_pos(interp.setup().current, 1.0, 0.0, 0.0);
}

#[test]
fn open_twice_and_read_unopened() {
    let (mut interp, dir) = open_program("M2\n");
    let other = dir.path().join("prog.ngc");
    assert_eq!(interp.open(&other).unwrap_err(), Error::FileAlreadyOpen);

    let mut fresh = Interpreter::new(recorder());
    assert_eq!(fresh.read().unwrap_err(), Error::FileNotOpen);
}

// ---- init/exit against a parameter file ----

fn full_parameter_file(selector: f64) -> String {
    let mut indices: Vec<usize> = Vec::new();
    for base in [5161, 5181, 5211] {
        indices.extend(base..base + 6);
    }
    indices.push(5220);
    for system in 1..=9 {
        let base = 5200 + 20 * system;
        indices.extend(base + 1..base + 7);
    }
    indices.sort_unstable();
    indices
        .iter()
        .map(|&index| {
            let value = if index == 5220 {
                selector
            } else if index == 5241 {
                1.5 // X origin of system 2
            } else {
                0.0
            };
            format!("{} {}\n", index, value)
        })
        .collect()
}

#[test]
fn init_adopts_parameter_file_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rs274ngc.var");
    fs::write(&path, full_parameter_file(2.0)).unwrap();

    let mut recorder = recorder();
    recorder.parameter_file = Some(path);
    let mut interp = Interpreter::new(recorder);
    interp.init().unwrap();
    assert_eq!(interp.setup().origin_index, 2);
    assert!((interp.setup().origin_offset.x - 1.5).abs() < 1e-12);
    let emitted = calls(&mut interp);
    assert_eq!(emitted[0], Call::InitCanon);
    assert!(emitted
        .contains(&Call::SetOriginOffsets(Position::new(1.5, 0.0, 0.0, 0.0, 0.0, 0.0))));
}

#[test]
fn init_rejects_bad_system_selector() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rs274ngc.var");
    fs::write(&path, full_parameter_file(0.0)).unwrap();

    let mut recorder = recorder();
    recorder.parameter_file = Some(path);
    let mut interp = Interpreter::new(recorder);
    assert_eq!(
        interp.init().unwrap_err(),
        Error::CoordinateSystemIndexParameter5220OutOfRange
    );
}

#[test]
fn exit_saves_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rs274ngc.var");
    fs::write(&path, full_parameter_file(1.0)).unwrap();

    let mut recorder = recorder();
    recorder.parameter_file = Some(path.clone());
    let mut interp = Interpreter::new(recorder);
    interp.init().unwrap();
    run(&mut interp, &["#5211=2.5"]);
    interp.exit().unwrap();

    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.lines().any(|line| line == "5211\t2.5"));
}
