// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Motion conversion: straight traverses and feeds, arcs, probing, and the
//! cutter-radius-compensated variants of each.
//!
//! Compensated moves come in two flavors.  The *entry* move (`comp1`) runs
//! right after compensation turns on, when no programmed point is
//! remembered yet: the tool is steered to a point tangent to the programmed
//! path.  *Continuing* moves (`comp2`) know the previous programmed point,
//! detect the corner between the old and new direction, and insert an extra
//! arc of one tool radius around convex corners; concave corners would
//! gouge and are rejected.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::block::{Block, MiscMode, Motion};
use crate::canon::Canon;
use crate::error::{Error, Result};
use crate::types::{FeedMode, Plane, Position, Side, Units, TOLERANCE_CONCAVE_CORNER};

use super::arc::{arc_data_comp_ijk, arc_data_comp_r, arc_data_ijk, arc_data_r, find_arc_length};
use super::Interpreter;

impl<C: Canon> Interpreter<C> {
    pub(super) fn convert_motion(&mut self, motion: Motion, block: &Block) -> Result<()> {
        match motion {
            Motion::Rapid | Motion::Linear => self.convert_straight(motion, block),
            Motion::ArcCw => self.convert_arc(true, block),
            Motion::ArcCcw => self.convert_arc(false, block),
            Motion::Probe => self.convert_probe(block),
            Motion::CancelCycle => {
                self.canon.comment("interpreter: motion mode set to none");
                self.setup.motion_mode = Motion::CancelCycle;
                Ok(())
            }
            Motion::Cycle(cycle) => self.convert_cycle(cycle, block),
        }
    }

    /// G0 or G1, with or without compensation.
    pub(super) fn convert_straight(&mut self, motion: Motion, block: &Block) -> Result<()> {
        if motion == Motion::Linear {
            match self.setup.feed_mode {
                FeedMode::UnitsPerMinute if self.setup.feed_rate == 0.0 => {
                    return Err(Error::CannotDoG1WithZeroFeedRate);
                }
                FeedMode::InverseTime if block.f.is_none() => {
                    return Err(Error::FWordMissingWithInverseTimeG1Move);
                }
                _ => (),
            }
        }
        self.setup.motion_mode = motion;
        if block.g.misc == Some(MiscMode::MachineCoords) {
            self.canon.comment("interpreter: offsets temporarily suspended");
        }
        let end = self.setup.find_ends(block);

        if self.setup.comp.side.is_some() && self.setup.comp.radius > 0.0 {
            if block.g.misc == Some(MiscMode::MachineCoords) {
                return Err(Error::CannotUseG53WithCutterRadiusComp);
            }
            if self.setup.comp.program.is_none() {
                self.convert_straight_comp1(motion, block, end)?;
            } else {
                self.convert_straight_comp2(motion, block, end)?;
            }
        } else if motion == Motion::Rapid {
            self.canon.straight_traverse(end.x, end.y, end.z, end.a, end.b, end.c);
            self.setup.current.x = end.x;
            self.setup.current.y = end.y;
        } else {
            if self.setup.feed_mode == FeedMode::InverseTime {
                self.inverse_time_rate_straight(end, block.f.unwrap_or(0.0));
            }
            self.canon.straight_feed(end.x, end.y, end.z, end.a, end.b, end.c);
            self.setup.current.x = end.x;
            self.setup.current.y = end.y;
        }
        self.setup.current.z = end.z;
        self.setup.current.a = end.a;
        self.setup.current.b = end.b;
        self.setup.current.c = end.c;
        Ok(())
    }

    /// First compensated move: go to the point where the tool circle is
    /// tangent to the line through the programmed end point.
    fn convert_straight_comp1(&mut self, motion: Motion, block: &Block,
                              end: Position) -> Result<()> {
        let side = self.setup.comp.side.expect("compensation on");
        let radius = self.setup.comp.radius; // will always be positive
        let (px, py) = (end.x, end.y);
        let cx = self.setup.current.x;
        let cy = self.setup.current.y;
        let distance = (px - cx).hypot(py - cy);
        if distance <= radius {
            return Err(Error::CutterGougingWithCutterRadiusComp);
        }

        let theta = (radius / distance).acos();
        let alpha = match side {
            Side::Left => (cy - py).atan2(cx - px) - theta,
            Side::Right => (cy - py).atan2(cx - px) + theta,
        };
        // tangent point of the tool circle on the programmed line
        let end_x = px + radius * alpha.cos();
        let end_y = py + radius * alpha.sin();

        if motion == Motion::Rapid {
            self.canon.straight_traverse(end_x, end_y, end.z, end.a, end.b, end.c);
        } else {
            if self.setup.feed_mode == FeedMode::InverseTime {
                let adjusted = Position { x: end_x, y: end_y, ..end };
                self.inverse_time_rate_straight(adjusted, block.f.unwrap_or(0.0));
            }
            self.canon.straight_feed(end_x, end_y, end.z, end.a, end.b, end.c);
        }
        self.setup.current.x = end_x;
        self.setup.current.y = end_y;
        self.setup.comp.program = Some((px, py));
        Ok(())
    }

    /// Continuing compensated move.  The direction of the previous motion
    /// is the perpendicular from the last programmed point to the current
    /// tool position; a convex corner between it and the new direction gets
    /// an extra arc, a concave one is an error.
    fn convert_straight_comp2(&mut self, motion: Motion, block: &Block,
                              end: Position) -> Result<()> {
        let small = TOLERANCE_CONCAVE_CORNER;
        let side = self.setup.comp.side.expect("compensation on");
        let radius = self.setup.comp.radius;
        let (px, py) = (end.x, end.y);
        let (start_x, start_y) = self.setup.comp.program.expect("programmed point known");

        let (end_x, end_y);
        if px == start_x && py == start_y {
            // no XY motion; move the other axes only
            end_x = self.setup.current.x;
            end_y = self.setup.current.y;
            if motion == Motion::Rapid {
                self.canon.straight_traverse(end_x, end_y, end.z, end.a, end.b, end.c);
            } else {
                if self.setup.feed_mode == FeedMode::InverseTime {
                    let adjusted = Position { x: end_x, y: end_y, ..end };
                    self.inverse_time_rate_straight(adjusted, block.f.unwrap_or(0.0));
                }
                self.canon.straight_feed(end_x, end_y, end.z, end.a, end.b, end.c);
            }
        } else {
            let mut theta = (self.setup.current.y - start_y)
                .atan2(self.setup.current.x - start_x);
            let mut alpha = (py - start_y).atan2(px - start_x);
            let (beta, gamma) = match side {
                Side::Left => {
                    if theta < alpha {
                        theta += TAU;
                    }
                    (theta - alpha - FRAC_PI_2, FRAC_PI_2)
                }
                Side::Right => {
                    if alpha < theta {
                        alpha += TAU;
                    }
                    (alpha - theta - FRAC_PI_2, -FRAC_PI_2)
                }
            };
            end_x = px + radius * (alpha + gamma).cos();
            end_y = py + radius * (alpha + gamma).sin();
            let mid_x = start_x + radius * (alpha + gamma).cos();
            let mid_y = start_y + radius * (alpha + gamma).sin();

            if beta < -small || beta > PI + small {
                return Err(Error::ConcaveCornerWithCutterRadiusComp);
            }
            if motion == Motion::Rapid {
                self.canon.straight_traverse(end_x, end_y, end.z, end.a, end.b, end.c);
            } else if beta > small {
                // convex corner; arc around it first
                let turn = if side == Side::Left { -1 } else { 1 };
                if self.setup.feed_mode == FeedMode::InverseTime {
                    let adjusted = Position { x: end_x, y: end_y, ..end };
                    self.inverse_time_rate_as(start_x, start_y, turn, mid_x, mid_y,
                                              adjusted, block.f.unwrap_or(0.0));
                }
                self.canon.arc_feed(mid_x, mid_y, start_x, start_y, turn,
                                    self.setup.current.z, end.a, end.b, end.c);
                self.canon.straight_feed(end_x, end_y, end.z, end.a, end.b, end.c);
            } else {
                if self.setup.feed_mode == FeedMode::InverseTime {
                    let adjusted = Position { x: end_x, y: end_y, ..end };
                    self.inverse_time_rate_straight(adjusted, block.f.unwrap_or(0.0));
                }
                self.canon.straight_feed(end_x, end_y, end.z, end.a, end.b, end.c);
            }
        }

        self.setup.current.x = end_x;
        self.setup.current.y = end_y;
        self.setup.comp.program = Some((px, py));
        Ok(())
    }

    /// G2/G3 in any plane; in the XY plane with compensation, via the
    /// entry or continuing variant.
    pub(super) fn convert_arc(&mut self, clockwise: bool, block: &Block) -> Result<()> {
        let ijk_flag = block.i.is_some() || block.j.is_some() || block.k.is_some();
        let first = self.setup.comp.program.is_none();

        if block.r.is_none() && !ijk_flag {
            return Err(Error::RIJKWordsAllMissingForArc);
        }
        if block.r.is_some() && ijk_flag {
            return Err(Error::MixedRadiusIjkFormatForArc);
        }
        match self.setup.feed_mode {
            FeedMode::UnitsPerMinute if self.setup.feed_rate == 0.0 => {
                return Err(Error::CannotMakeArcWithZeroFeedRate);
            }
            FeedMode::InverseTime if block.f.is_none() => {
                return Err(Error::FWordMissingWithInverseTimeArcMove);
            }
            _ => (),
        }
        // offsets normal to the plane are illegal; in-plane offsets left
        // out default to zero
        let (mut offset1, mut offset2) = (0.0, 0.0);
        if ijk_flag {
            match self.setup.plane {
                Plane::Xy => {
                    if block.k.is_some() {
                        return Err(Error::KWordGivenForArcInXyPlane);
                    }
                    offset1 = block.i.unwrap_or(0.0);
                    offset2 = block.j.unwrap_or(0.0);
                }
                Plane::Yz => {
                    if block.i.is_some() {
                        return Err(Error::IWordGivenForArcInYzPlane);
                    }
                    offset1 = block.j.unwrap_or(0.0);
                    offset2 = block.k.unwrap_or(0.0);
                }
                Plane::Xz => {
                    if block.j.is_some() {
                        return Err(Error::JWordGivenForArcInXzPlane);
                    }
                    offset1 = block.k.unwrap_or(0.0);
                    offset2 = block.i.unwrap_or(0.0);
                }
            }
        }
        match self.setup.plane {
            Plane::Xy => {
                if block.x.is_none() && block.y.is_none() {
                    return Err(Error::XAndYWordsMissingForArcInXyPlane);
                }
            }
            Plane::Yz => {
                if block.y.is_none() && block.z.is_none() {
                    return Err(Error::YAndZWordsMissingForArcInYzPlane);
                }
            }
            Plane::Xz => {
                if block.x.is_none() && block.z.is_none() {
                    return Err(Error::XAndZWordsMissingForArcInXzPlane);
                }
            }
        }

        let end = self.setup.find_ends(block);
        self.setup.motion_mode = if clockwise { Motion::ArcCw } else { Motion::ArcCcw };

        let current = self.setup.current;
        match self.setup.plane {
            Plane::Xy => {
                if self.setup.comp.side.is_none() || self.setup.comp.radius == 0.0 {
                    self.arc_in_plane(
                        clockwise, block,
                        (current.x, current.y, current.z),
                        (end.x, end.y, end.z),
                        (end.a, end.b, end.c),
                        (offset1, offset2),
                    )?;
                } else if first {
                    self.convert_arc_comp1(clockwise, block, (offset1, offset2), end)?;
                    return Ok(());
                } else {
                    self.convert_arc_comp2(clockwise, block, (offset1, offset2), end)?;
                    return Ok(());
                }
            }
            Plane::Xz => {
                self.arc_in_plane(
                    clockwise, block,
                    (current.z, current.x, current.y),
                    (end.z, end.x, end.y),
                    (end.a, end.b, end.c),
                    (offset1, offset2),
                )?;
            }
            Plane::Yz => {
                self.arc_in_plane(
                    clockwise, block,
                    (current.y, current.z, current.x),
                    (end.y, end.z, end.x),
                    (end.a, end.b, end.c),
                    (offset1, offset2),
                )?;
            }
        }
        self.setup.current = end;
        Ok(())
    }

    /// Emit one uncompensated arc in plane coordinates (coordinate 3 is
    /// the axis of the helix).
    fn arc_in_plane(&mut self, clockwise: bool, block: &Block,
                    current: (f64, f64, f64), end: (f64, f64, f64),
                    rotary: (f64, f64, f64), offsets: (f64, f64)) -> Result<()> {
        let (center1, center2, turn) = if let Some(radius) = block.r {
            arc_data_r(clockwise, current.0, current.1, end.0, end.1, radius)?
        } else {
            arc_data_ijk(clockwise, current.0, current.1, end.0, end.1,
                         offsets.0, offsets.1, self.setup.tolerance())?
        };
        if self.setup.feed_mode == FeedMode::InverseTime {
            self.inverse_time_rate_arc(current, (center1, center2), turn,
                                       end, block.f.unwrap_or(0.0));
        }
        self.canon.arc_feed(end.0, end.1, center1, center2, turn, end.2,
                            rotary.0, rotary.1, rotary.2);
        Ok(())
    }

    /// First compensated arc: derived from a second arc through the
    /// programmed end point, tangent to the tool circle at the current
    /// point; the tool stays tangent to it throughout.
    fn convert_arc_comp1(&mut self, clockwise: bool, block: &Block,
                         offsets: (f64, f64), end: Position) -> Result<()> {
        let side = self.setup.comp.side.expect("compensation on");
        let tool_radius = self.setup.comp.radius; // always positive
        let current = self.setup.current;

        if (end.x - current.x).hypot(end.y - current.y) <= tool_radius {
            return Err(Error::CutterGougingWithCutterRadiusComp);
        }

        let (center_x, center_y, turn) = if let Some(radius) = block.r {
            arc_data_comp_r(clockwise, side, tool_radius, current.x, current.y,
                            end.x, end.y, radius)?
        } else {
            arc_data_comp_ijk(clockwise, side, tool_radius, current.x, current.y,
                              end.x, end.y, offsets.0, offsets.1,
                              self.setup.tolerance())?
        };
        let inside = (side == Side::Left) != clockwise;
        let gamma = if inside {
            (center_y - end.y).atan2(center_x - end.x)
        } else {
            (end.y - center_y).atan2(end.x - center_x)
        };

        self.setup.comp.program = Some((end.x, end.y));
        let end_x = end.x + tool_radius * gamma.cos();
        let end_y = end.y + tool_radius * gamma.sin();

        if self.setup.feed_mode == FeedMode::InverseTime {
            self.inverse_time_rate_arc((current.x, current.y, current.z),
                                       (center_x, center_y), turn,
                                       (end_x, end_y, end.z), block.f.unwrap_or(0.0));
        }
        self.canon.arc_feed(end_x, end_y, center_x, center_y, turn, end.z,
                            end.a, end.b, end.c);
        self.setup.current = Position { x: end_x, y: end_y, ..end };
        Ok(())
    }

    /// Continuing compensated arc.  A convex corner between the previous
    /// direction and the arc's entry tangent gets an extra arc of one tool
    /// radius centered on the last programmed point; rotary motion all goes
    /// on the main arc.
    fn convert_arc_comp2(&mut self, clockwise: bool, block: &Block,
                         offsets: (f64, f64), end: Position) -> Result<()> {
        let small = TOLERANCE_CONCAVE_CORNER;
        let side = self.setup.comp.side.expect("compensation on");
        let tool_radius = self.setup.comp.radius;
        let (start_x, start_y) = self.setup.comp.program.expect("programmed point known");
        let current = self.setup.current;

        let (center_x, center_y, turn) = if let Some(radius) = block.r {
            arc_data_r(clockwise, start_x, start_y, end.x, end.y, radius)?
        } else {
            arc_data_ijk(clockwise, start_x, start_y, end.x, end.y,
                         offsets.0, offsets.1, self.setup.tolerance())?
        };

        let arc_radius = (center_x - end.x).hypot(center_y - end.y);
        let mut theta = (current.y - start_y).atan2(current.x - start_x);
        theta = match side {
            Side::Left => theta - FRAC_PI_2,
            Side::Right => theta + FRAC_PI_2,
        };
        let mut delta = (center_y - start_y).atan2(center_x - start_x);
        let alpha = if clockwise { delta + FRAC_PI_2 } else { delta - FRAC_PI_2 };
        let mut beta = match side {
            Side::Left => theta - alpha,
            Side::Right => alpha - theta,
        };
        beta = if beta > 1.5 * PI {
            beta - TAU
        } else if beta < -FRAC_PI_2 {
            beta + TAU
        } else {
            beta
        };

        let inside = (side == Side::Left) != clockwise;
        let gamma = if inside {
            if arc_radius <= tool_radius {
                return Err(Error::ToolRadiusNotLessThanArcRadiusWithComp);
            }
            (center_y - end.y).atan2(center_x - end.x)
        } else {
            delta += PI;
            (end.y - center_y).atan2(end.x - center_x)
        };

        self.setup.comp.program = Some((end.x, end.y));
        let end_x = end.x + tool_radius * gamma.cos();
        let end_y = end.y + tool_radius * gamma.sin();

        if beta < -small || beta > PI + small {
            return Err(Error::ConcaveCornerWithCutterRadiusComp);
        }
        if beta > small {
            // convex corner, two arcs needed
            let mid_x = start_x + tool_radius * delta.cos();
            let mid_y = start_y + tool_radius * delta.sin();
            let turn1 = if side == Side::Left { -1 } else { 1 };
            if self.setup.feed_mode == FeedMode::InverseTime {
                self.inverse_time_rate_arc2((start_x, start_y), turn1, (mid_x, mid_y),
                                            (center_x, center_y), turn,
                                            (end_x, end_y, end.z), block.f.unwrap_or(0.0));
            }
            self.canon.arc_feed(mid_x, mid_y, start_x, start_y, turn1,
                                current.z, end.a, end.b, end.c);
            self.canon.arc_feed(end_x, end_y, center_x, center_y, turn, end.z,
                                end.a, end.b, end.c);
        } else {
            if self.setup.feed_mode == FeedMode::InverseTime {
                self.inverse_time_rate_arc((current.x, current.y, current.z),
                                           (center_x, center_y), turn,
                                           (end_x, end_y, end.z), block.f.unwrap_or(0.0));
            }
            self.canon.arc_feed(end_x, end_y, center_x, center_y, turn, end.z,
                                end.a, end.b, end.c);
        }
        self.setup.current = Position { x: end_x, y: end_y, ..end };
        Ok(())
    }

    /// G38.2.  After the probe trips, the machine position is unknown; the
    /// next `read` resynchronizes from the backend.
    pub(super) fn convert_probe(&mut self, block: &Block) -> Result<()> {
        if block.x.is_none() && block.y.is_none() && block.z.is_none() {
            return Err(Error::XYAndZWordsAllMissingWithG382);
        }
        if self.setup.feed_mode == FeedMode::InverseTime {
            return Err(Error::CannotProbeInInverseTimeFeedMode);
        }
        if self.setup.comp.side.is_some() {
            return Err(Error::CannotProbeWithCutterRadiusCompOn);
        }
        if self.setup.feed_rate == 0.0 {
            return Err(Error::CannotProbeWithZeroFeedRate);
        }
        let end = self.setup.find_ends(block);
        let current = self.setup.current;
        if end.a != current.a || end.b != current.b || end.c != current.c {
            return Err(Error::CannotMoveRotaryAxesDuringProbing);
        }
        let distance = ((current.x - end.x).powi(2) + (current.y - end.y).powi(2)
            + (current.z - end.z).powi(2)).sqrt();
        let minimum = if self.setup.length_units == Units::Mm { 0.254 } else { 0.01 };
        if distance < minimum {
            return Err(Error::StartPointTooCloseToProbePoint);
        }
        self.canon.turn_probe_on();
        self.canon.straight_probe(end.x, end.y, end.z, end.a, end.b, end.c);
        self.canon.turn_probe_off();
        self.setup.motion_mode = Motion::Probe;
        self.setup.probe_flag = true;
        Ok(())
    }

    /// In inverse-time mode the F word is the reciprocal of the block time
    /// in minutes; the commanded rate is path length times F, floored at
    /// 0.1 so the rate never reaches zero.
    pub(super) fn inverse_time_rate_straight(&mut self, end: Position, f_word: f64) {
        let length = self.setup.current.length_to(&end);
        let rate = (length * f_word).max(0.1);
        self.canon.set_feed_rate(rate);
        self.setup.feed_rate = rate;
    }

    fn inverse_time_rate_arc(&mut self, start: (f64, f64, f64), center: (f64, f64),
                             turn: i32, end: (f64, f64, f64), f_word: f64) {
        let length = find_arc_length(start.0, start.1, start.2, center.0, center.1,
                                     turn, end.0, end.1, end.2);
        let rate = (length * f_word).max(0.1);
        self.canon.set_feed_rate(rate);
        self.setup.feed_rate = rate;
    }

    /// Extra corner arc plus main arc.
    #[allow(clippy::too_many_arguments)]
    fn inverse_time_rate_arc2(&mut self, start: (f64, f64), turn1: i32, mid: (f64, f64),
                              center: (f64, f64), turn2: i32, end: (f64, f64, f64),
                              f_word: f64) {
        let current = self.setup.current;
        let length = find_arc_length(current.x, current.y, current.z, start.0, start.1,
                                     turn1, mid.0, mid.1, current.z)
            + find_arc_length(mid.0, mid.1, current.z, center.0, center.1,
                              turn2, end.0, end.1, end.2);
        let rate = (length * f_word).max(0.1);
        self.canon.set_feed_rate(rate);
        self.setup.feed_rate = rate;
    }

    /// Extra corner arc plus straight line.
    #[allow(clippy::too_many_arguments)]
    fn inverse_time_rate_as(&mut self, start_x: f64, start_y: f64, turn: i32,
                            mid_x: f64, mid_y: f64, end: Position, f_word: f64) {
        let current = self.setup.current;
        let mid = Position { x: mid_x, y: mid_y, z: current.z, ..end };
        let length = find_arc_length(current.x, current.y, current.z, start_x, start_y,
                                     turn, mid_x, mid_y, current.z)
            + mid.length_to(&end);
        let rate = (length * f_word).max(0.1);
        self.canon.set_feed_rate(rate);
        self.setup.feed_rate = rate;
    }
}
