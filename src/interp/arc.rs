// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Arc geometry: resolving the center point and turn direction from the
//! ijk or radius forms, with and without cutter radius compensation, plus
//! path-length helpers for inverse-time feed.
//!
//! All resolvers work in the active plane; "x" and "y" mean first and
//! second plane coordinate throughout.  `turn` counts full or partial
//! circles counterclockwise: +1 for CCW, -1 for CW.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::{Error, Result};
use crate::types::{Side, TINY};

/// Center and turn for an uncompensated arc in ijk format.  The center is
/// the current point plus the offsets; start and end radius must agree
/// within `tolerance`.
pub fn arc_data_ijk(clockwise: bool, current_x: f64, current_y: f64, end_x: f64, end_y: f64,
                    i_number: f64, j_number: f64, tolerance: f64) -> Result<(f64, f64, i32)> {
    let center_x = current_x + i_number;
    let center_y = current_y + j_number;
    let radius = (center_x - current_x).hypot(center_y - current_y);
    let radius2 = (center_x - end_x).hypot(center_y - end_y);
    if radius == 0.0 || radius2 == 0.0 {
        return Err(Error::ZeroRadiusArc);
    }
    if (radius - radius2).abs() > tolerance {
        return Err(Error::RadiusToEndOfArcDiffersFromRadiusToStart);
    }
    Ok((center_x, center_y, if clockwise { -1 } else { 1 }))
}

/// Center and turn for an uncompensated arc in radius format.  A negative
/// radius selects the arc larger than a semicircle.
pub fn arc_data_r(clockwise: bool, current_x: f64, current_y: f64, end_x: f64, end_y: f64,
                  radius: f64) -> Result<(f64, f64, i32)> {
    if end_x == current_x && end_y == current_y {
        return Err(Error::CurrentPointSameAsEndPointOfArc);
    }
    let abs_radius = radius.abs();
    let mid_x = (end_x + current_x) / 2.0;
    let mid_y = (end_y + current_y) / 2.0;
    let mut half_length = (mid_x - end_x).hypot(mid_y - end_y);

    if half_length / abs_radius > 1.0 + TINY {
        return Err(Error::ArcRadiusTooSmallToReachEndPoint);
    }
    if half_length / abs_radius > 1.0 - TINY {
        half_length = abs_radius; // allow a small error for semicircle
    }
    let theta = if (clockwise && radius > 0.0) || (!clockwise && radius < 0.0) {
        (end_y - current_y).atan2(end_x - current_x) - FRAC_PI_2
    } else {
        (end_y - current_y).atan2(end_x - current_x) + FRAC_PI_2
    };
    let turn2 = (half_length / abs_radius).asin();
    let offset = abs_radius * turn2.cos();
    let center_x = mid_x + offset * theta.cos();
    let center_y = mid_y + offset * theta.sin();
    Ok((center_x, center_y, if clockwise { -1 } else { 1 }))
}

/// Center and turn for a compensated arc in ijk format in the XY plane.
/// The end point must lie one tool radius from the arc.
#[allow(clippy::too_many_arguments)]
pub fn arc_data_comp_ijk(clockwise: bool, side: Side, tool_radius: f64,
                         current_x: f64, current_y: f64, end_x: f64, end_y: f64,
                         i_number: f64, j_number: f64, tolerance: f64)
                         -> Result<(f64, f64, i32)> {
    let center_x = current_x + i_number;
    let center_y = current_y + j_number;
    let arc_radius = i_number.hypot(j_number);
    let mut radius2 = (center_x - end_x).hypot(center_y - end_y);
    radius2 = if (side == Side::Left) != clockwise {
        // tool on the inside of the arc
        radius2 - tool_radius
    } else {
        radius2 + tool_radius
    };
    // this catches an arc too small for the tool, too
    if (arc_radius - radius2).abs() > tolerance {
        return Err(Error::RadiusToEndOfArcDiffersFromRadiusToStart);
    }
    Ok((center_x, center_y, if clockwise { -1 } else { 1 }))
}

/// Center and turn for a compensated arc in radius format in the XY plane.
///
/// The generated arc is concentric with a second arc that passes through
/// the programmed end point and is tangent to the tool circle at the
/// current point.  Construction: drop a perpendicular from the center to
/// the line L between current and end point; the two distance equations
/// give the foot of the perpendicular, then the center.
#[allow(clippy::too_many_arguments)]
pub fn arc_data_comp_r(clockwise: bool, side: Side, tool_radius: f64,
                       current_x: f64, current_y: f64, end_x: f64, end_y: f64,
                       big_radius: f64) -> Result<(f64, f64, i32)> {
    let abs_radius = big_radius.abs();
    let inside = (side == Side::Left) != clockwise;
    if abs_radius <= tool_radius && inside {
        return Err(Error::ToolRadiusNotLessThanArcRadiusWithComp);
    }

    let distance = (end_x - current_x).hypot(end_y - current_y);
    let alpha = (end_y - current_y).atan2(end_x - current_x);
    let theta = if (!clockwise && big_radius > 0.0) || (clockwise && big_radius < 0.0) {
        alpha + FRAC_PI_2
    } else {
        alpha - FRAC_PI_2
    };
    let radius2 = if inside { abs_radius - tool_radius } else { abs_radius + tool_radius };
    if distance > radius2 + abs_radius {
        return Err(Error::RadiusTooSmallToReachEndPoint);
    }

    let mid_length = (radius2 * radius2 + distance * distance - abs_radius * abs_radius)
        / (2.0 * distance);
    let mid_x = current_x + mid_length * alpha.cos();
    let mid_y = current_y + mid_length * alpha.sin();

    // an imaginary perpendicular length means the offset is unreachable
    if radius2 * radius2 <= mid_length * mid_length {
        return Err(Error::RadiusTooSmallToReachEndPoint);
    }
    let offset = (radius2 * radius2 - mid_length * mid_length).sqrt();
    let center_x = mid_x + offset * theta.cos();
    let center_y = mid_y + offset * theta.sin();
    Ok((center_x, center_y, if clockwise { -1 } else { 1 }))
}

/// Signed CCW sweep in radians between the two radii of a circle,
/// accounting for full extra turns.  Zero `turn` gives zero sweep.
pub fn find_turn(x1: f64, y1: f64, center_x: f64, center_y: f64, turn: i32,
                 x2: f64, y2: f64) -> f64 {
    if turn == 0 {
        return 0.0;
    }
    let mut alpha = (y1 - center_y).atan2(x1 - center_x);
    let mut beta = (y2 - center_y).atan2(x2 - center_x);
    if turn > 0 {
        if beta <= alpha {
            beta += TAU;
        }
        (beta - alpha) + (turn - 1) as f64 * TAU
    } else {
        if alpha <= beta {
            alpha += TAU;
        }
        (beta - alpha) + (turn + 1) as f64 * TAU
    }
}

/// Path length of a circular or helical arc whose axis is parallel to the
/// third coordinate.  For a helix, the unwrapped hypotenuse.
#[allow(clippy::too_many_arguments)]
pub fn find_arc_length(x1: f64, y1: f64, z1: f64, center_x: f64, center_y: f64,
                       turn: i32, x2: f64, y2: f64, z2: f64) -> f64 {
    let radius = (center_x - x1).hypot(center_y - y1);
    let theta = find_turn(x1, y1, center_x, center_y, turn, x2, y2);
    if z2 == z1 {
        radius * theta.abs()
    } else {
        (radius * theta).hypot(z2 - z1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ijk_quarter_circle() {
        // CW quarter turn from (1,0) to (0,1) around the origin
        let (cx, cy, turn) = arc_data_ijk(true, 1.0, 0.0, 0.0, 1.0, -1.0, 0.0, 0.0002).unwrap();
        assert!((cx, cy) == (0.0, 0.0));
        assert_eq!(turn, -1);
    }

    #[test]
    fn ijk_rejects_radius_mismatch() {
        assert_eq!(
            arc_data_ijk(false, 0.0, 0.0, 5.0, 5.0, 1.0, 0.0, 0.0002),
            Err(Error::RadiusToEndOfArcDiffersFromRadiusToStart)
        );
        assert_eq!(
            arc_data_ijk(false, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0002),
            Err(Error::ZeroRadiusArc)
        );
    }

    #[test]
    fn r_form_semicircle() {
        let (cx, cy, turn) = arc_data_r(false, 0.0, 0.0, 2.0, 0.0, 1.0).unwrap();
        assert!((cx - 1.0).abs() < 1e-9 && cy.abs() < 1e-9);
        assert_eq!(turn, 1);
    }

    #[test]
    fn r_form_major_minor() {
        // positive radius picks the minor arc: center above the chord for CCW
        let (_, cy_minor, _) = arc_data_r(false, 0.0, 0.0, 1.0, 0.0, 1.0).unwrap();
        // negative radius picks the major arc: center below the chord
        let (_, cy_major, _) = arc_data_r(false, 0.0, 0.0, 1.0, 0.0, -1.0).unwrap();
        assert!(cy_minor > 0.0 && cy_major < 0.0);
    }

    #[test]
    fn r_form_failures() {
        assert_eq!(
            arc_data_r(true, 1.0, 1.0, 1.0, 1.0, 2.0),
            Err(Error::CurrentPointSameAsEndPointOfArc)
        );
        assert_eq!(
            arc_data_r(true, 0.0, 0.0, 10.0, 0.0, 1.0),
            Err(Error::ArcRadiusTooSmallToReachEndPoint)
        );
    }

    #[test]
    fn turn_and_length() {
        // full quarter circle, radius 2
        let sweep = find_turn(2.0, 0.0, 0.0, 0.0, 1, 0.0, 2.0);
        assert!((sweep - FRAC_PI_2).abs() < 1e-12);
        let length = find_arc_length(2.0, 0.0, 0.0, 0.0, 0.0, 1, 0.0, 2.0, 0.0);
        assert!((length - 2.0 * FRAC_PI_2).abs() < 1e-12);
        // helix: the length picks up the Z leg
        let helical = find_arc_length(2.0, 0.0, 0.0, 0.0, 0.0, 1, 0.0, 2.0, 3.0);
        assert!((helical - (2.0 * FRAC_PI_2).hypot(3.0)).abs() < 1e-12);
        // two full CW turns
        let sweep = find_turn(1.0, 0.0, 0.0, 0.0, -2, 1.0, 0.0);
        assert!((sweep + 2.0 * TAU).abs() < 1e-9);
    }
}
