// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Canned cycle expansion: repeat handling, sticky cycle words, retract
//! modes, per-plane axis roles, and the cycle preconditions.

use ngci::canon::{Call, Recorder};
use ngci::error::Error;
use ngci::interp::Interpreter;
use ngci::types::{MotionCtrl, Position, Units};

fn interp() -> Interpreter<Recorder> {
    let mut recorder = Recorder::new();
    recorder.units = Units::Inches;
    recorder.feed_rate = 10.0;
    recorder.tool_max = 68;
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

fn motions(interp: &mut Interpreter<Recorder>) -> Vec<Call> {
    interp
        .canon_mut()
        .take_calls()
        .into_iter()
        .filter(|call| !matches!(call, Call::Comment(_)))
        .collect()
}

fn traverse(x: f64, y: f64, z: f64) -> Call {
    Call::StraightTraverse(Position::new(x, y, z, 0.0, 0.0, 0.0))
}

fn feed(x: f64, y: f64, z: f64) -> Call {
    Call::StraightFeed(Position::new(x, y, z, 0.0, 0.0, 0.0))
}

#[test]
fn absolute_drill_cycle() {
    let mut interp = interp();
    run(&mut interp, &["G81 X1 Y2 R0.1 Z-0.5"]);
    assert_eq!(
        motions(&mut interp),
        vec![
            // the cycle body runs in exact path mode
            traverse(0.0, 0.0, 0.1),
            Call::SetMotionControlMode(MotionCtrl::ExactPath),
            traverse(1.0, 2.0, 0.1),
            feed(1.0, 2.0, -0.5),
            traverse(1.0, 2.0, 0.1),
            Call::SetMotionControlMode(MotionCtrl::Continuous),
        ]
    );
    let current = interp.setup().current;
    assert_eq!((current.x, current.y, current.z), (1.0, 2.0, 0.1));
}

#[test]
fn incremental_drill_cycle_compounds_positions() {
    let mut interp = interp();
    run(&mut interp, &["G91", "G81 R0.1 Z-0.5 X1 Y2 L3"]);
    // r becomes 0.1 above the starting level and the bottom is 0.5 below
    // r; x/y increments compound each repeat
    let emitted = motions(&mut interp);
    assert_eq!(
        emitted,
        vec![
            traverse(0.0, 0.0, 0.1),
            Call::SetMotionControlMode(MotionCtrl::ExactPath),
            traverse(1.0, 2.0, 0.1),
            feed(1.0, 2.0, -0.4),
            traverse(1.0, 2.0, 0.1),
            traverse(2.0, 4.0, 0.1),
            feed(2.0, 4.0, -0.4),
            traverse(2.0, 4.0, 0.1),
            traverse(3.0, 6.0, 0.1),
            feed(3.0, 6.0, -0.4),
            traverse(3.0, 6.0, 0.1),
            Call::SetMotionControlMode(MotionCtrl::Continuous),
        ]
    );
    let current = interp.setup().current;
    assert_eq!((current.x, current.y, current.z), (3.0, 6.0, 0.1));
}

#[test]
fn retract_mode_selects_the_clearance_level() {
    let mut interp = interp();
    // start high so the R plane is below the old level
    run(&mut interp, &["G0 Z2", "G99 G81 X0 Y0 R0.5 Z-0.5"]);
    let emitted = motions(&mut interp);
    assert_eq!(
        emitted,
        vec![
            traverse(0.0, 0.0, 2.0),
            Call::SetMotionControlMode(MotionCtrl::ExactPath),
            traverse(0.0, 0.0, 2.0),
            traverse(0.0, 0.0, 0.5),
            feed(0.0, 0.0, -0.5),
            traverse(0.0, 0.0, 0.5),
            Call::SetMotionControlMode(MotionCtrl::Continuous),
        ]
    );

    let mut interp = self::interp();
    run(&mut interp, &["G0 Z2", "G98 G81 X0 Y0 R0.5 Z-0.5"]);
    let emitted = motions(&mut interp);
    // with G98 the retract returns to the old level
    assert_eq!(emitted[4], feed(0.0, 0.0, -0.5));
    assert_eq!(emitted[5], traverse(0.0, 0.0, 2.0));
}

#[test]
fn cycle_words_are_sticky() {
    let mut interp = interp();
    run(&mut interp, &["G81 X1 Y1 R0.2 Z-0.3"]);
    interp.canon_mut().take_calls();
    // the next block inherits R and Z from the previous cycle
    run(&mut interp, &["X2"]);
    let emitted = motions(&mut interp);
    assert!(emitted.contains(&feed(2.0, 1.0, -0.3)));
}

#[test]
fn dwell_cycles_require_p_once() {
    let mut interp = interp();
    assert_eq!(
        run_err(&mut interp, "G82 X0 Y0 R0.1 Z-0.2"),
        Error::DwellTimePWordMissingWithG82
    );
    run(&mut interp, &["G82 X0 Y0 R0.1 Z-0.2 P0.25"]);
    interp.canon_mut().take_calls();
    run(&mut interp, &["X1"]);
    let emitted = motions(&mut interp);
    assert!(emitted.contains(&Call::Dwell(0.25)));
}

#[test]
fn peck_drill_pecks() {
    let mut interp = interp();
    run(&mut interp, &["G83 X0 Y0 R0.2 Z-0.5 Q0.2"]);
    let emitted = motions(&mut interp);
    let feeds: Vec<&Call> = emitted
        .iter()
        .filter(|call| matches!(call, Call::StraightFeed(_)))
        .collect();
    // pecks at 0.0, -0.2, -0.4, then the final feed to the bottom
    assert_eq!(feeds.len(), 4);
    assert_eq!(*feeds[0], feed(0.0, 0.0, 0.2 - 0.2));
    assert_eq!(*feeds[3], feed(0.0, 0.0, -0.5));
    // each peck rapids out to the clearance and back down near the
    // last depth
    assert!(emitted.contains(&traverse(0.0, 0.0, 0.0 + 0.01)));
    // Q is sticky: the same cycle right after inherits it, but a fresh
    // machine has nothing to inherit
    run(&mut interp, &["G83 X1 Y0 R0.2 Z-0.5"]);
    assert_eq!(
        run_err(&mut self::interp(), "G83 X1 Y0 R0.2 Z-0.5"),
        Error::QWordMissingWithG83
    );
}

#[test]
fn tap_cycle_reverses_the_spindle() {
    let mut interp = interp();
    assert_eq!(
        run_err(&mut interp, "G84 X0 Y0 R0.2 Z-0.2"),
        Error::SpindleNotTurningClockwiseInG84
    );
    run(&mut interp, &["M3 S600", "G84 X0 Y0 R0.2 Z-0.2"]);
    let emitted = motions(&mut interp);
    let wanted = [
        Call::StartSpeedFeedSynch,
        feed(0.0, 0.0, -0.2),
        Call::StopSpindleTurning,
        Call::StartSpindleCounterclockwise,
        feed(0.0, 0.0, 0.2),
        Call::StopSpeedFeedSynch,
        Call::StopSpindleTurning,
        Call::StartSpindleClockwise,
    ];
    let start = emitted
        .iter()
        .position(|call| *call == Call::StartSpeedFeedSynch)
        .unwrap();
    assert_eq!(&emitted[start..start + wanted.len()], &wanted);
}

#[test]
fn bore_cycles() {
    let mut interp = interp();
    // G85 feeds out instead of rapiding
    run(&mut interp, &["G85 X0 Y0 R0.2 Z-0.2"]);
    let emitted = motions(&mut interp);
    assert!(emitted.contains(&feed(0.0, 0.0, -0.2)));
    assert!(emitted.contains(&feed(0.0, 0.0, 0.2)));

    // G86 stops the spindle at the bottom and restarts it after
    assert_eq!(
        run_err(&mut interp, "G86 X1 Y0 R0.2 Z-0.2 P0.1"),
        Error::SpindleNotTurningInG86
    );
    run(&mut interp, &["M4 S300"]);
    interp.canon_mut().take_calls();
    run(&mut interp, &["G86 X1 Y0 R0.2 Z-0.2 P0.1"]);
    let emitted = motions(&mut interp);
    assert!(emitted.contains(&Call::Dwell(0.1)));
    assert!(emitted.contains(&Call::StopSpindleTurning));
    assert!(emitted.contains(&Call::StartSpindleCounterclockwise));

    // G88 leaves the retract to the operator
    run(&mut interp, &["G88 X2 Y0 R0.2 Z-0.2 P0.1"]);
    let emitted = motions(&mut interp);
    assert!(emitted.contains(&Call::ProgramStop));
}

#[test]
fn back_bore_orients_and_cuts_upward() {
    let mut interp = interp();
    run(&mut interp, &["M3 S600"]);
    interp.canon_mut().take_calls();
    assert_eq!(
        run_err(&mut interp, "G87 X1 Y1 R0.5 Z-0.5 K-0.1"),
        Error::IWordMissingWithG87
    );
    run(&mut interp, &["G87 X1 Y1 I0.2 J0.1 K-0.1 R0.5 Z-0.5"]);
    let emitted = motions(&mut interp);
    // enters at the offset position, cuts from the bottom up to K
    assert!(emitted.contains(&traverse(1.2, 1.1, -0.5)));
    assert!(emitted.contains(&feed(1.0, 1.0, -0.1)));
    assert!(emitted.iter().any(|call| matches!(call, Call::OrientSpindle(..))));
}

#[test]
fn cycle_preconditions() {
    let mut interp = interp();
    assert_eq!(
        run_err(&mut interp, "G81 X1 Y1 Z-1"),
        Error::RClearancePlaneUnspecifiedInCycle
    );
    assert_eq!(
        run_err(&mut interp, "G81 X1 Y1 R0.5"),
        Error::ZValueUnspecifiedInXyPlaneCannedCycle
    );
    assert_eq!(
        run_err(&mut interp, "G81 X1 Y1 R0.5 Z-0.5 L0"),
        Error::CannotDoZeroRepeatsOfCycle
    );
    assert_eq!(
        run_err(&mut interp, "G81 X0 Y0 R-1 Z0"),
        Error::RLessThanZInCycleInXyPlane
    );
    assert_eq!(
        run_err(&mut interp, "G81 X0 Y0 A1 R0.1 Z-0.2"),
        Error::CannotPutAnAInCannedCycle
    );
}

#[test]
fn cycle_in_the_yz_plane_permutes_axes() {
    let mut interp = interp();
    run(&mut interp, &["G19", "G81 Y1 Z2 R0.5 X-0.2"]);
    let emitted = motions(&mut interp);
    assert_eq!(
        emitted,
        vec![
            Call::SelectPlane(ngci::types::Plane::Yz),
            // the third axis is X: raise to the R plane first
            traverse(0.5, 0.0, 0.0),
            Call::SetMotionControlMode(MotionCtrl::ExactPath),
            traverse(0.5, 1.0, 2.0),
            feed(-0.2, 1.0, 2.0),
            traverse(0.5, 1.0, 2.0),
            Call::SetMotionControlMode(MotionCtrl::Continuous),
        ]
    );
    let current = interp.setup().current;
    assert_eq!((current.x, current.y, current.z), (0.5, 1.0, 2.0));
}
