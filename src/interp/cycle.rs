// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Canned cycles G81..G89.
//!
//! One driver handles all three planes; `aa` and `bb` are the in-plane
//! axes and `cc` the axis normal to the plane (Z for XY, X for YZ, Y for
//! XZ).  Each repeat traverses in the plane, drops to the R plane, runs the
//! cycle body, and retracts to the clearance level given by the retract
//! mode.  In incremental mode the in-plane words compound per repeat and
//! R and the bottom are relative to the starting level.  Word values a
//! repeated cycle leaves out are inherited from the previous cycle block.
//!
//! The cycle body runs in exact-path mode; the previous motion control
//! mode is restored afterwards.

use crate::block::{Block, CannedCycle, Motion};
use crate::canon::Canon;
use crate::error::{Error, Result};
use crate::types::{Direction, DistanceMode, MotionCtrl, Plane, RetractMode, SpeedFeedMode, Units};

use super::Interpreter;

/// How far above the hole bottom a peck-drill rapid returns to, in inches.
const PECK_RAPID_DELTA: f64 = 0.010;

impl<C: Canon> Interpreter<C> {
    pub(super) fn convert_cycle(&mut self, cycle: CannedCycle, block: &Block) -> Result<()> {
        let motion = Motion::Cycle(cycle);
        let r_word = match block.r {
            Some(r) => r,
            None if self.setup.motion_mode == motion => self.setup.cycle.r,
            None => return Err(Error::RClearancePlaneUnspecifiedInCycle),
        };
        let repeats = match block.l {
            Some(0) => return Err(Error::CannotDoZeroRepeatsOfCycle),
            Some(l) => l,
            None => 1,
        };

        self.convert_cycle_in_plane(self.setup.plane, cycle, block, r_word, repeats)?;

        self.setup.cycle.l = repeats;
        self.setup.cycle.r = r_word;
        self.setup.motion_mode = motion;
        Ok(())
    }

    fn convert_cycle_in_plane(&mut self, plane: Plane, cycle: CannedCycle, block: &Block,
                              r_word: f64, repeats: i32) -> Result<()> {
        let repeating = self.setup.motion_mode == Motion::Cycle(cycle);

        // word roles per plane: (aa, bb, cc)
        let (aa_word, bb_word, cc_word) = match plane {
            Plane::Xy => (block.x, block.y, block.z),
            Plane::Yz => (block.y, block.z, block.x),
            Plane::Xz => (block.z, block.x, block.y),
        };
        if !repeating && cc_word.is_none() {
            return Err(match plane {
                Plane::Xy => Error::ZValueUnspecifiedInXyPlaneCannedCycle,
                Plane::Yz => Error::XValueUnspecifiedInYzPlaneCannedCycle,
                Plane::Xz => Error::YValueUnspecifiedInXzPlaneCannedCycle,
            });
        }
        let cc_word = cc_word.unwrap_or(self.setup.cycle.cc);

        let current = self.setup.current;
        let (aa_current, bb_current, mut old_cc) = match plane {
            Plane::Xy => (current.x, current.y, current.z),
            Plane::Yz => (current.y, current.z, current.x),
            Plane::Xz => (current.z, current.x, current.y),
        };

        let (mut aa, mut bb, aa_increment, bb_increment, r, cc);
        match self.setup.distance_mode {
            DistanceMode::Absolute => {
                aa_increment = 0.0;
                bb_increment = 0.0;
                r = r_word;
                cc = cc_word;
                aa = aa_word.unwrap_or(aa_current);
                bb = bb_word.unwrap_or(bb_current);
            }
            DistanceMode::Incremental => {
                aa_increment = aa_word.unwrap_or(0.0);
                bb_increment = bb_word.unwrap_or(0.0);
                r = r_word + old_cc;
                cc = r + cc_word;
                aa = aa_current;
                bb = bb_current;
            }
        }
        if r < cc {
            return Err(match plane {
                Plane::Xy => Error::RLessThanZInCycleInXyPlane,
                Plane::Yz => Error::RLessThanXInCycleInYzPlane,
                Plane::Xz => Error::RLessThanYInCycleInXzPlane,
            });
        }
        if old_cc < r {
            self.cycle_traverse(plane, aa_current, bb_current, r);
            old_cc = r;
        }
        let clear_cc = if self.setup.retract_mode == RetractMode::RPlane { r } else { old_cc };

        let save_mode = self.canon.motion_control_mode();
        if save_mode != MotionCtrl::ExactPath {
            self.canon.set_motion_control_mode(MotionCtrl::ExactPath);
        }

        macro_rules! repeat {
            ($body:expr) => {
                for _ in 0..repeats {
                    aa += aa_increment;
                    bb += bb_increment;
                    self.cycle_traverse(plane, aa, bb, old_cc);
                    if old_cc != r {
                        self.cycle_traverse(plane, aa, bb, r);
                    }
                    #[allow(clippy::redundant_closure_call)]
                    ($body)(&mut *self, aa, bb)?;
                    old_cc = clear_cc;
                }
            };
        }

        match cycle {
            CannedCycle::Drill => {
                repeat!(|me: &mut Self, aa, bb| -> Result<()> {
                    me.cycle_g81(plane, aa, bb, clear_cc, cc);
                    Ok(())
                });
            }
            CannedCycle::DrillDwell => {
                let dwell = self.sticky_dwell(block, cycle, repeating)?;
                repeat!(|me: &mut Self, aa, bb| -> Result<()> {
                    me.cycle_g82(plane, aa, bb, clear_cc, cc, dwell);
                    Ok(())
                });
                self.setup.cycle.p = dwell;
            }
            CannedCycle::PeckDrill => {
                if !repeating && block.q.is_none() {
                    return Err(Error::QWordMissingWithG83);
                }
                let delta = block.q.unwrap_or(self.setup.cycle.q);
                repeat!(|me: &mut Self, aa, bb| -> Result<()> {
                    me.cycle_g83(plane, aa, bb, r, clear_cc, cc, delta);
                    Ok(())
                });
                self.setup.cycle.q = delta;
            }
            CannedCycle::Tap => {
                repeat!(|me: &mut Self, aa, bb| -> Result<()> {
                    me.cycle_g84(plane, aa, bb, clear_cc, cc)
                });
            }
            CannedCycle::Bore => {
                repeat!(|me: &mut Self, aa, bb| -> Result<()> {
                    me.cycle_g85(plane, aa, bb, clear_cc, cc);
                    Ok(())
                });
            }
            CannedCycle::BoreStopRapid => {
                let dwell = self.sticky_dwell(block, cycle, repeating)?;
                repeat!(|me: &mut Self, aa, bb| -> Result<()> {
                    me.cycle_g86(plane, aa, bb, clear_cc, cc, dwell)
                });
                self.setup.cycle.p = dwell;
            }
            CannedCycle::BackBore => {
                if !repeating {
                    if block.i.is_none() {
                        return Err(Error::IWordMissingWithG87);
                    }
                    if block.j.is_none() {
                        return Err(Error::JWordMissingWithG87);
                    }
                    if block.k.is_none() {
                        return Err(Error::KWordMissingWithG87);
                    }
                }
                let i = block.i.unwrap_or(self.setup.cycle.i);
                let j = block.j.unwrap_or(self.setup.cycle.j);
                let k = block.k.unwrap_or(self.setup.cycle.k);
                self.setup.cycle.i = i;
                self.setup.cycle.j = j;
                self.setup.cycle.k = k;
                // in-plane offsets and the middle (top of back bore) level
                // per plane; the middle is an increment from the bottom in
                // incremental mode
                let (off_aa, off_bb, mut middle) = match plane {
                    Plane::Xy => (i, j, k),
                    Plane::Yz => (j, k, i),
                    Plane::Xz => (k, i, j),
                };
                if self.setup.distance_mode == DistanceMode::Incremental {
                    middle += cc;
                }
                repeat!(|me: &mut Self, aa: f64, bb: f64| -> Result<()> {
                    me.cycle_g87(plane, aa, aa + off_aa, bb, bb + off_bb, r, clear_cc,
                                 middle, cc)
                });
            }
            CannedCycle::BoreManual => {
                let dwell = self.sticky_dwell(block, cycle, repeating)?;
                repeat!(|me: &mut Self, aa, bb| -> Result<()> {
                    me.cycle_g88(plane, aa, bb, cc, dwell)
                });
                self.setup.cycle.p = dwell;
            }
            CannedCycle::BoreDwellFeed => {
                let dwell = self.sticky_dwell(block, cycle, repeating)?;
                repeat!(|me: &mut Self, aa, bb| -> Result<()> {
                    me.cycle_g89(plane, aa, bb, clear_cc, cc, dwell);
                    Ok(())
                });
                self.setup.cycle.p = dwell;
            }
        }

        match plane {
            Plane::Xy => {
                self.setup.current.x = aa;
                self.setup.current.y = bb;
                self.setup.current.z = clear_cc;
            }
            Plane::Yz => {
                self.setup.current.y = aa;
                self.setup.current.z = bb;
                self.setup.current.x = clear_cc;
            }
            Plane::Xz => {
                self.setup.current.z = aa;
                self.setup.current.x = bb;
                self.setup.current.y = clear_cc;
            }
        }
        self.setup.cycle.cc = cc_word;

        if save_mode != MotionCtrl::ExactPath {
            self.canon.set_motion_control_mode(save_mode);
        }
        Ok(())
    }

    fn sticky_dwell(&self, block: &Block, cycle: CannedCycle, repeating: bool) -> Result<f64> {
        if !repeating && block.p.is_none() {
            return Err(match cycle {
                CannedCycle::DrillDwell => Error::DwellTimePWordMissingWithG82,
                CannedCycle::BoreStopRapid => Error::DwellTimePWordMissingWithG86,
                CannedCycle::BoreManual => Error::DwellTimePWordMissingWithG88,
                _ => Error::DwellTimePWordMissingWithG89,
            });
        }
        Ok(block.p.unwrap_or(self.setup.cycle.p))
    }

    /// A straight feed in plane coordinates; no rotary axis motion.
    fn cycle_feed(&mut self, plane: Plane, end1: f64, end2: f64, end3: f64) {
        let cur = self.setup.current;
        match plane {
            Plane::Xy => self.canon.straight_feed(end1, end2, end3, cur.a, cur.b, cur.c),
            Plane::Yz => self.canon.straight_feed(end3, end1, end2, cur.a, cur.b, cur.c),
            Plane::Xz => self.canon.straight_feed(end2, end3, end1, cur.a, cur.b, cur.c),
        }
    }

    /// A straight traverse in plane coordinates; no rotary axis motion.
    fn cycle_traverse(&mut self, plane: Plane, end1: f64, end2: f64, end3: f64) {
        let cur = self.setup.current;
        match plane {
            Plane::Xy => self.canon.straight_traverse(end1, end2, end3, cur.a, cur.b, cur.c),
            Plane::Yz => self.canon.straight_traverse(end3, end1, end2, cur.a, cur.b, cur.c),
            Plane::Xz => self.canon.straight_traverse(end2, end3, end1, cur.a, cur.b, cur.c),
        }
    }

    /// Drill: feed to the bottom, rapid out.
    fn cycle_g81(&mut self, plane: Plane, aa: f64, bb: f64, clear_cc: f64, bottom_cc: f64) {
        self.cycle_feed(plane, aa, bb, bottom_cc);
        self.cycle_traverse(plane, aa, bb, clear_cc);
    }

    /// Drill with dwell at the bottom.
    fn cycle_g82(&mut self, plane: Plane, aa: f64, bb: f64, clear_cc: f64, bottom_cc: f64,
                 dwell: f64) {
        self.cycle_feed(plane, aa, bb, bottom_cc);
        self.canon.dwell(dwell);
        self.cycle_traverse(plane, aa, bb, clear_cc);
    }

    /// Peck drill: feed down by `delta` at a time, rapid out and back in
    /// to clear chips, until the bottom is reached.
    #[allow(clippy::too_many_arguments)]
    fn cycle_g83(&mut self, plane: Plane, aa: f64, bb: f64, r: f64, clear_cc: f64,
                 bottom_cc: f64, delta: f64) {
        let rapid_delta = if self.setup.length_units == Units::Mm {
            PECK_RAPID_DELTA * 25.4
        } else {
            PECK_RAPID_DELTA
        };
        let mut depth = r - delta;
        while depth > bottom_cc {
            self.cycle_feed(plane, aa, bb, depth);
            self.cycle_traverse(plane, aa, bb, clear_cc);
            self.cycle_traverse(plane, aa, bb, depth + rapid_delta);
            depth -= delta;
        }
        self.cycle_feed(plane, aa, bb, bottom_cc);
        self.cycle_traverse(plane, aa, bb, clear_cc);
    }

    /// Right-hand tap: synchronized feed down, spindle reversal, feed out.
    fn cycle_g84(&mut self, plane: Plane, aa: f64, bb: f64, clear_cc: f64,
                 bottom_cc: f64) -> Result<()> {
        if self.setup.spindle_turning != Direction::Clockwise {
            return Err(Error::SpindleNotTurningClockwiseInG84);
        }
        self.canon.start_speed_feed_synch();
        self.cycle_feed(plane, aa, bb, bottom_cc);
        self.canon.stop_spindle_turning();
        self.canon.start_spindle_counterclockwise();
        self.cycle_feed(plane, aa, bb, clear_cc);
        if self.setup.speed_feed_mode != SpeedFeedMode::Synched {
            self.canon.stop_speed_feed_synch();
        }
        self.canon.stop_spindle_turning();
        self.canon.start_spindle_clockwise();
        Ok(())
    }

    /// Bore: feed to the bottom, feed back out.
    fn cycle_g85(&mut self, plane: Plane, aa: f64, bb: f64, clear_cc: f64, bottom_cc: f64) {
        self.cycle_feed(plane, aa, bb, bottom_cc);
        self.cycle_feed(plane, aa, bb, clear_cc);
    }

    /// Bore: dwell, stop the spindle, rapid out, restart the spindle.
    #[allow(clippy::too_many_arguments)]
    fn cycle_g86(&mut self, plane: Plane, aa: f64, bb: f64, clear_cc: f64, bottom_cc: f64,
                 dwell: f64) -> Result<()> {
        let direction = self.setup.spindle_turning;
        if direction == Direction::Stopped {
            return Err(Error::SpindleNotTurningInG86);
        }
        self.cycle_feed(plane, aa, bb, bottom_cc);
        self.canon.dwell(dwell);
        self.canon.stop_spindle_turning();
        self.cycle_traverse(plane, aa, bb, clear_cc);
        self.restart_spindle(direction);
        Ok(())
    }

    /// Back bore: slip the stopped, oriented tool through the hole at the
    /// offset position, move over, spin, cut upward to the middle level,
    /// and come back out the same way.
    #[allow(clippy::too_many_arguments)]
    fn cycle_g87(&mut self, plane: Plane, aa: f64, offset_aa: f64, bb: f64, offset_bb: f64,
                 r: f64, clear_cc: f64, middle_cc: f64, bottom_cc: f64) -> Result<()> {
        let direction = self.setup.spindle_turning;
        if direction == Direction::Stopped {
            return Err(Error::SpindleNotTurningInG87);
        }
        self.cycle_traverse(plane, offset_aa, offset_bb, r);
        self.canon.stop_spindle_turning();
        self.canon.orient_spindle(0.0, direction);
        self.cycle_traverse(plane, offset_aa, offset_bb, bottom_cc);
        self.cycle_traverse(plane, aa, bb, bottom_cc);
        self.restart_spindle(direction);
        self.cycle_feed(plane, aa, bb, middle_cc);
        self.cycle_feed(plane, aa, bb, bottom_cc);
        self.canon.stop_spindle_turning();
        self.canon.orient_spindle(0.0, direction);
        self.cycle_traverse(plane, offset_aa, offset_bb, bottom_cc);
        self.cycle_traverse(plane, offset_aa, offset_bb, clear_cc);
        self.cycle_traverse(plane, aa, bb, clear_cc);
        self.restart_spindle(direction);
        Ok(())
    }

    /// Bore: dwell, stop the spindle, stop the program so the operator can
    /// retract by hand, restart the spindle.
    fn cycle_g88(&mut self, plane: Plane, aa: f64, bb: f64, bottom_cc: f64,
                 dwell: f64) -> Result<()> {
        let direction = self.setup.spindle_turning;
        if direction == Direction::Stopped {
            return Err(Error::SpindleNotTurningInG88);
        }
        self.cycle_feed(plane, aa, bb, bottom_cc);
        self.canon.dwell(dwell);
        self.canon.stop_spindle_turning();
        self.canon.program_stop(); // operator retracts the spindle here
        self.restart_spindle(direction);
        Ok(())
    }

    /// Bore: dwell at the bottom, feed back out.
    fn cycle_g89(&mut self, plane: Plane, aa: f64, bb: f64, clear_cc: f64, bottom_cc: f64,
                 dwell: f64) {
        self.cycle_feed(plane, aa, bb, bottom_cc);
        self.canon.dwell(dwell);
        self.cycle_feed(plane, aa, bb, clear_cc);
    }

    fn restart_spindle(&mut self, direction: Direction) {
        if direction == Direction::Clockwise {
            self.canon.start_spindle_clockwise();
        } else {
            self.canon.start_spindle_counterclockwise();
        }
    }
}
