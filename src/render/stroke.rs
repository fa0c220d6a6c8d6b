//! Splitting strokes into styled segments
//!
//! A pen restyles every `segment_length` points. Each new segment repeats the
//! previous segment's last point so the polylines join without gaps.

use glam::{DVec2, dvec2};

use crate::pen::{Pen, PenStyle, SegmentStyle};
use crate::scene::Line;

/// A run of points drawn with one style, in device units.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub style: SegmentStyle,
    pub points: Vec<DVec2>,
}

/// Split `line` into segments styled by `pen`.
///
/// Yields `ceil(points / segment_length)` segments; every segment after the
/// first starts with the last point of the one before.
pub fn segments(line: &Line, pen: &Pen) -> Vec<Segment> {
    let k = pen.segment_length().max(1);
    let mut out: Vec<Segment> = Vec::with_capacity(line.points.len().div_ceil(k));
    let mut last_width = 0.0;

    for (i, point) in line.points.iter().enumerate() {
        if i % k == 0 {
            let style = pen.segment_style(point, last_width);
            let mut points = Vec::with_capacity(k + 1);
            if let Some(join) = out.last().and_then(|s| s.points.last()) {
                points.push(*join);
            }
            out.push(Segment { style, points });
        }
        if let Some(current) = out.last_mut() {
            current.points.push(dvec2(point.x, point.y));
            last_width = current.style.width;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Point;

    fn pencil_line(n: usize) -> Line {
        // pencil restyles every 2 points
        Line::new(
            1,
            0,
            2.0,
            (0..n).map(|i| Point::at(i as f64, 2.0 * i as f64)).collect(),
        )
    }

    #[test]
    fn six_points_two_per_segment() {
        let line = pencil_line(6);
        let pen = Pen::create(line.tool, line.color, line.thickness_scale).unwrap();
        let segs = segments(&line, &pen);
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].points, vec![dvec2(0.0, 0.0), dvec2(1.0, 2.0)]);
        assert_eq!(segs[1].points[0], dvec2(1.0, 2.0));
        assert_eq!(segs[2].points[0], dvec2(3.0, 6.0));
        assert_eq!(segs[2].points.len(), 3);
    }

    #[test]
    fn segment_count_is_ceil() {
        for n in 0..12 {
            let line = pencil_line(n);
            let pen = Pen::create(line.tool, line.color, line.thickness_scale).unwrap();
            let segs = segments(&line, &pen);
            assert_eq!(segs.len(), n.div_ceil(2), "{n} points");
            for pair in segs.windows(2) {
                assert_eq!(pair[1].points[0], *pair[0].points.last().unwrap());
            }
        }
    }

    #[test]
    fn unsegmented_pen_draws_one_polyline() {
        let mut line = pencil_line(40);
        line.tool = 4;
        let pen = Pen::create(line.tool, line.color, line.thickness_scale).unwrap();
        let segs = segments(&line, &pen);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].points.len(), 40);
    }

    #[test]
    fn marker_feeds_previous_width_forward() {
        let points = (0..6)
            .map(|i| Point {
                width: 8.0,
                ..Point::at(i as f64, 0.0)
            })
            .collect();
        let line = Line::new(3, 0, 2.0, points);
        let pen = Pen::create(line.tool, line.color, line.thickness_scale).unwrap();
        let segs = segments(&line, &pen);
        assert_eq!(segs.len(), 2);
        let first = 0.9 * 2.0;
        assert!((segs[0].style.width - first).abs() < 1e-12);
        assert!((segs[1].style.width - (0.9 * 2.0 + 0.1 * first)).abs() < 1e-12);
    }
}
