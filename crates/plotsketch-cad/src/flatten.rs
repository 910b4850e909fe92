//! Curve flattening.
//!
//! Importing a DXF reduces every curved entity to a polyline in
//! drawing units. Arcs use a fixed segment count so a plotted arc
//! always looks the same regardless of size; ellipses go through
//! lyon's arc-to-bezier machinery and its flattening iterator;
//! splines are evaluated with de Boor's algorithm and subdivided
//! adaptively against the chord tolerance.

use lyon::geom::Arc;
use lyon::math::{point, vector, Angle};
use lyon::path::iterator::PathIterator;
use lyon::path::{Event, Path};
use plotsketch_core::Point;

use crate::dxf_file::{DxfArc, DxfEllipse, DxfSpline};
use crate::error::{CadError, Result};

/// Maximum chord deviation for ellipse and spline flattening, in
/// drawing units (millimeters).
pub const DEFAULT_CHORD_TOLERANCE_MM: f64 = 0.5;

/// Fixed segment count for circular arcs.
pub const ARC_SEGMENTS: usize = 20;

/// Recursion limit for adaptive spline subdivision.
const MAX_SUBDIVISION_DEPTH: usize = 16;

/// Flatten a circular arc into `ARC_SEGMENTS + 1` points.
///
/// DXF arcs run counter-clockwise from `start_angle` to `end_angle`
/// in degrees; an end angle below the start angle wraps through 360.
pub fn flatten_arc(arc: &DxfArc) -> Result<Vec<Point>> {
    if !(arc.radius.is_finite() && arc.radius > 0.0) {
        return Err(CadError::flattening(
            "ARC",
            format!("invalid radius {}", arc.radius),
        ));
    }
    if !(arc.start_angle.is_finite() && arc.end_angle.is_finite()) {
        return Err(CadError::flattening("ARC", "non-finite angle"));
    }

    let start = arc.start_angle.to_radians();
    let mut end = arc.end_angle.to_radians();
    if end < start {
        end += std::f64::consts::TAU;
    }

    let points = (0..=ARC_SEGMENTS)
        .map(|i| {
            let t = start + (end - start) * (i as f64) / (ARC_SEGMENTS as f64);
            Point::new(
                arc.center.x + arc.radius * t.cos(),
                arc.center.y + arc.radius * t.sin(),
            )
        })
        .collect();
    Ok(points)
}

/// Flatten an elliptical arc to the given chord tolerance.
pub fn flatten_ellipse(ellipse: &DxfEllipse, tolerance_mm: f64) -> Result<Vec<Point>> {
    let (mx, my) = ellipse.major_axis;
    let major_len = mx.hypot(my);
    if !(major_len.is_finite() && major_len > 0.0) {
        return Err(CadError::flattening("ELLIPSE", "degenerate major axis"));
    }
    if !(ellipse.ratio.is_finite() && ellipse.ratio > 0.0) {
        return Err(CadError::flattening(
            "ELLIPSE",
            format!("invalid axis ratio {}", ellipse.ratio),
        ));
    }

    let mut sweep = ellipse.end_param - ellipse.start_param;
    if sweep <= 0.0 {
        sweep += std::f64::consts::TAU;
    }

    let arc = Arc {
        center: point(ellipse.center.x as f32, ellipse.center.y as f32),
        radii: vector(major_len as f32, (major_len * ellipse.ratio) as f32),
        x_rotation: Angle::radians(my.atan2(mx) as f32),
        start_angle: Angle::radians(ellipse.start_param as f32),
        sweep_angle: Angle::radians(sweep as f32),
    };

    let mut builder = Path::builder();
    builder.begin(arc.from());
    arc.for_each_cubic_bezier(&mut |bezier| {
        builder.cubic_bezier_to(bezier.ctrl1, bezier.ctrl2, bezier.to);
    });
    builder.end(false);
    let path = builder.build();

    let mut points = Vec::new();
    for event in path.iter().flattened(tolerance_mm as f32) {
        match event {
            Event::Begin { at } => points.push(Point::new(at.x as f64, at.y as f64)),
            Event::Line { to, .. } => points.push(Point::new(to.x as f64, to.y as f64)),
            _ => {}
        }
    }
    if points.len() < 2 {
        return Err(CadError::flattening(
            "ELLIPSE",
            "flattening produced fewer than two points",
        ));
    }
    Ok(points)
}

/// Flatten a B-spline to the given chord tolerance.
///
/// The spline is treated as clamped with a uniform interior knot
/// vector, which matches what the exporting tools in this toolchain
/// produce. The curve is evaluated with de Boor's algorithm and each
/// parameter interval is bisected until the midpoint sits within the
/// tolerance of its chord.
pub fn flatten_spline(spline: &DxfSpline, tolerance_mm: f64) -> Result<Vec<Point>> {
    let n = spline.control_points.len();
    if n < 2 {
        return Err(CadError::flattening(
            "SPLINE",
            format!("{} control points, need at least 2", n),
        ));
    }
    if spline
        .control_points
        .iter()
        .any(|p| !(p.x.is_finite() && p.y.is_finite()))
    {
        return Err(CadError::flattening("SPLINE", "non-finite control point"));
    }

    let degree = spline.degree.max(1).min(n - 1);
    let knots = clamped_knots(n, degree);
    let eval = |t: f64| de_boor(&spline.control_points, &knots, degree, t);

    let first = eval(0.0);
    let last = eval(1.0);
    let mut points = vec![first];
    subdivide(&eval, 0.0, 1.0, first, last, tolerance_mm, 0, &mut points);
    Ok(points)
}

/// Clamped knot vector with uniform interior knots over [0, 1].
fn clamped_knots(control_count: usize, degree: usize) -> Vec<f64> {
    let interior = control_count - degree - 1;
    let mut knots = Vec::with_capacity(control_count + degree + 1);
    knots.extend(std::iter::repeat(0.0).take(degree + 1));
    for i in 1..=interior {
        knots.push(i as f64 / (interior + 1) as f64);
    }
    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    knots
}

/// Evaluate the spline at parameter `t` with de Boor's algorithm.
fn de_boor(control: &[Point], knots: &[f64], degree: usize, t: f64) -> Point {
    // Knot span index; the end of the domain belongs to the last span.
    let max_span = control.len() - 1;
    let mut span = degree;
    while span < max_span && t >= knots[span + 1] {
        span += 1;
    }

    let mut d: Vec<Point> = control[span - degree..=span].to_vec();
    for r in 1..=degree {
        for j in (r..=degree).rev() {
            let i = j + span - degree;
            let denom = knots[i + degree - r + 1] - knots[i];
            let alpha = if denom.abs() < f64::EPSILON {
                0.0
            } else {
                (t - knots[i]) / denom
            };
            d[j] = Point::new(
                (1.0 - alpha) * d[j - 1].x + alpha * d[j].x,
                (1.0 - alpha) * d[j - 1].y + alpha * d[j].y,
            );
        }
    }
    d[degree]
}

/// Bisect [t0, t1] until the curve stays within `tolerance` of the
/// chord, pushing interval end points in parameter order.
///
/// Deviation is sampled at the one-third and two-thirds parameters.
/// The interval midpoint alone is not enough: on a point-symmetric
/// curve (an S-bend around the chord center) the midpoint sits
/// exactly on the chord even when the curve swings far away from it.
#[allow(clippy::too_many_arguments)]
fn subdivide<F: Fn(f64) -> Point>(
    eval: &F,
    t0: f64,
    t1: f64,
    p0: Point,
    p1: Point,
    tolerance: f64,
    depth: usize,
    out: &mut Vec<Point>,
) {
    let third = (t1 - t0) / 3.0;
    let flat_enough = chord_deviation(p0, p1, eval(t0 + third)) <= tolerance
        && chord_deviation(p0, p1, eval(t1 - third)) <= tolerance;
    if depth >= MAX_SUBDIVISION_DEPTH || flat_enough {
        out.push(p1);
    } else {
        let tm = (t0 + t1) / 2.0;
        let pm = eval(tm);
        subdivide(eval, t0, tm, p0, pm, tolerance, depth + 1, out);
        subdivide(eval, tm, t1, pm, p1, tolerance, depth + 1, out);
    }
}

/// Distance from `p` to the chord between `a` and `b`.
fn chord_deviation(a: Point, b: Point, p: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < f64::EPSILON {
        return p.distance_to(&a);
    }
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
}
