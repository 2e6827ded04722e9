// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Cutter-radius compensation: the entry move, continuing moves with and
//! without corner arcs, and the state-machine restrictions.
//!
//! The fixture tool in slot 1 has diameter 0.5, so the compensation radius
//! is 0.25 throughout.

use ngci::canon::{Call, Recorder, ToolEntry};
use ngci::error::Error;
use ngci::interp::Interpreter;
use ngci::types::{Position, Units};

const RADIUS: f64 = 0.25;

fn interp() -> Interpreter<Recorder> {
    let mut recorder = Recorder::new();
    recorder.units = Units::Inches;
    recorder.feed_rate = 10.0;
    recorder.tool_max = 68;
    let mut tools = vec![ToolEntry::default(); 69];
    tools[1] = ToolEntry { id: 1, length: 2.0, diameter: 0.5 };
    tools[3] = ToolEntry { id: 3, length: 0.0, diameter: -0.5 };
    recorder.tools = tools;
    let mut interp = Interpreter::new(recorder);
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
        Ok(_) => interp.execute().expect_err("expected an error"),
    }
}

fn feeds(interp: &mut Interpreter<Recorder>) -> Vec<Call> {
    interp
        .canon_mut()
        .take_calls()
        .into_iter()
        .filter(|call| !matches!(call, Call::Comment(_) | Call::SetFeedRate(_)))
        .collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "got {}, expected {}", actual, expected);
}

#[test]
fn entry_move_lands_one_radius_off_the_programmed_point() {
    let mut interp = interp();
    run(&mut interp, &["G41 D1", "G1 X5 Y0 F10"]);
    let emitted = feeds(&mut interp);
    let Call::StraightFeed(end) = emitted[0].clone() else {
        panic!("expected a straight feed, got {:?}", emitted[0]);
    };
    // the tool stops exactly one radius from the programmed end point,
    // on the left of the programmed direction
    assert_close((end.x - 5.0).hypot(end.y), RADIUS);
    assert!(end.y > 0.0);
    // and the model keeps the uncompensated programmed point
    assert_eq!(interp.setup().comp.program, Some((5.0, 0.0)));
    assert_eq!(interp.setup().comp.radius, RADIUS);
}

#[test]
fn continuing_move_inserts_an_arc_at_a_convex_corner() {
    let mut interp = interp();
    run(&mut interp, &["G41 D1", "G1 X2 Y0 F10", "G1 X2 Y-2"]);
    let emitted = feeds(&mut interp);
    let n = emitted.len();
    // a right turn under left compensation rounds the outside corner:
    // an arc of one tool radius about the programmed corner point,
    // then the straight move
    let Call::ArcFeed { end1, end2, center1, center2, rotation, .. } = emitted[n - 2].clone()
    else {
        panic!("expected the corner arc, got {:?}", emitted[n - 2]);
    };
    assert_close(end1, 2.0 + RADIUS);
    assert_close(end2, 0.0);
    assert_close(center1, 2.0);
    assert_close(center2, 0.0);
    assert_eq!(rotation, -1);
    let Call::StraightFeed(end) = emitted[n - 1].clone() else {
        panic!("expected the straight move, got {:?}", emitted[n - 1]);
    };
    assert_close(end.x, 2.0 + RADIUS);
    assert_close(end.y, -2.0);
    assert_eq!(interp.setup().comp.program, Some((2.0, -2.0)));
}

#[test]
fn concave_corner_is_rejected() {
    let mut interp = interp();
    run(&mut interp, &["G41 D1", "G1 X2 Y0 F10"]);
    assert_eq!(
        run_err(&mut interp, "G1 X2 Y2"),
        Error::ConcaveCornerWithCutterRadiusComp
    );
}

#[test]
fn entry_move_gouging_is_rejected() {
    let mut interp = interp();
    run(&mut interp, &["G41 D1"]);
    assert_eq!(
        run_err(&mut interp, "G1 X0.1 Y0 F10"),
        Error::CutterGougingWithCutterRadiusComp
    );
}

#[test]
fn continuing_arc_with_tangent_entry() {
    let mut interp = interp();
    run(&mut interp, &["G41 D1", "G1 X2 Y0 F10", "G3 X4 Y2 J2"]);
    let emitted = feeds(&mut interp);
    let n = emitted.len();
    // the entry move is tangent-line construction, not a perpendicular,
    // so a small corner arc precedes the main compensated arc
    let Call::ArcFeed { end1, end2, center1, center2, rotation, .. } = emitted[n - 2].clone()
    else {
        panic!("expected the corner arc, got {:?}", emitted[n - 2]);
    };
    assert_close(end1, 2.0);
    assert_close(end2, RADIUS);
    assert_close(center1, 2.0);
    assert_close(center2, 0.0);
    assert_eq!(rotation, -1);
    // the main arc runs inside the programmed one, radius less by the
    // tool radius
    let Call::ArcFeed { end1, end2, center1, center2, rotation, .. } = emitted[n - 1].clone()
    else {
        panic!("expected the main arc, got {:?}", emitted[n - 1]);
    };
    assert_close(end1, 4.0 - RADIUS);
    assert_close(end2, 2.0);
    assert_close(center1, 2.0);
    assert_close(center2, 2.0);
    assert_eq!(rotation, 1);
    // the emitted end point is one tool radius from the programmed one
    let current = interp.setup().current;
    assert_close((current.x - 4.0).hypot(current.y - 2.0), RADIUS);
}

#[test]
fn arc_smaller_than_the_tool_is_rejected() {
    let mut interp = interp();
    run(&mut interp, &["G41 D1", "G1 X2 Y0 F10"]);
    assert_eq!(
        run_err(&mut interp, "G3 X2.2 Y0.2 R0.2"),
        Error::ToolRadiusNotLessThanArcRadiusWithComp
    );
}

#[test]
fn negative_diameter_flips_the_side() {
    let mut interp = interp();
    run(&mut interp, &["G41 D3", "G1 X5 Y0 F10"]);
    let emitted = feeds(&mut interp);
    let Call::StraightFeed(end) = emitted[0].clone() else {
        panic!("expected a straight feed, got {:?}", emitted[0]);
    };
    // tool 3 has diameter -0.5: left becomes right, radius positive
    assert_close((end.x - 5.0).hypot(end.y), RADIUS);
    assert!(end.y < 0.0);
}

#[test]
fn comp_without_d_uses_the_spindle_tool() {
    let mut interp = interp();
    run(&mut interp, &["T1", "M6", "G42", "G1 X5 Y0 F10"]);
    assert_eq!(interp.setup().comp.radius, RADIUS);
    assert_eq!(interp.setup().comp.tool_index, 1);
}

#[test]
fn comp_state_machine_restrictions() {
    let mut interp = interp();
    run(&mut interp, &["G41 D1"]);
    assert_eq!(run_err(&mut interp, "G42 D1"), Error::CannotTurnCutterRadiusCompOnWhenOn);
    assert_eq!(run_err(&mut interp, "G18"), Error::CannotUseXzPlaneWithCutterRadiusComp);
    assert_eq!(run_err(&mut interp, "G19"), Error::CannotUseYzPlaneWithCutterRadiusComp);
    assert_eq!(run_err(&mut interp, "G21"), Error::CannotChangeUnitsWithCutterRadiusComp);
    assert_eq!(run_err(&mut interp, "G92 X0"), Error::CannotChangeAxisOffsetsWithCutterRadiusComp);
    assert_eq!(run_err(&mut interp, "G28 X0"), Error::CannotUseG28OrG30WithCutterRadiusComp);
    assert_eq!(run_err(&mut interp, "G53 G1 X1 F10"), Error::CannotUseG53WithCutterRadiusComp);
    assert_eq!(run_err(&mut interp, "G38.2 X1"), Error::CannotProbeWithCutterRadiusCompOn);

    // comp can only start in the XY plane
    run(&mut interp, &["G40", "G18"]);
    assert_eq!(
        run_err(&mut interp, "G41 D1"),
        Error::CannotTurnCutterRadiusCompOnOutOfXyPlane
    );
}

#[test]
fn comp_off_returns_to_plain_moves() {
    let mut interp = interp();
    run(&mut interp, &["G41 D1", "G1 X2 Y0 F10", "G40", "G1 X3 Y0"]);
    let emitted = feeds(&mut interp);
    assert_eq!(
        emitted.last(),
        Some(&Call::StraightFeed(Position::new(3.0, 0.0, 0.0, 0.0, 0.0, 0.0)))
    );
    assert_eq!(interp.setup().comp.side, None);
    assert_eq!(interp.setup().comp.program, None);
}

#[test]
fn no_xy_motion_under_comp_moves_other_axes_only() {
    let mut interp = interp();
    run(&mut interp, &["G41 D1", "G1 X2 Y0 F10"]);
    let before = interp.setup().current;
    run(&mut interp, &["G1 Z-1"]);
    let emitted = feeds(&mut interp);
    let Call::StraightFeed(end) = emitted.last().unwrap().clone() else {
        panic!("expected a straight feed");
    };
    assert_close(end.x, before.x);
    assert_close(end.y, before.y);
    assert_close(end.z, -1.0);
}
