//! Writing contours out as 2D drawings.

use nalgebra::Vector2;
use svg::{
    node::element::{Polygon, Polyline},
    Document,
};

use crate::slicer::Contour;

/// Margin around the drawing, as a fraction of its largest side.
const MARGIN: f64 = 0.05;

/// Draws the contour as seen from the front of its plane. Closed loops become
/// polygons and anything left open becomes a polyline. SVG's y axis points
/// down, so the plane's `v` axis is flipped.
pub fn contour_svg(contour: &Contour, tolerance: f64) -> Document {
    let plane = contour.plane();
    let polylines = contour
        .polylines(tolerance)
        .into_iter()
        .map(|line| {
            line.iter()
                .map(|x| plane.to_plane_coords(x).component_mul(&Vector2::new(1.0, -1.0)))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let (min, max) = polylines.iter().flatten().fold(
        (Vector2::repeat(f64::INFINITY), Vector2::repeat(f64::NEG_INFINITY)),
        |(min, max), x| (min.inf(x), max.sup(x)),
    );

    let mut svg = Document::new();
    if polylines.is_empty() {
        return svg.set("viewBox", (0, 0, 1, 1));
    }

    let size = max - min;
    let margin = size.max() * MARGIN;
    svg = svg
        .set(
            "viewBox",
            (
                min.x - margin,
                min.y - margin,
                size.x + margin * 2.0,
                size.y + margin * 2.0,
            ),
        )
        .set("width", format!("{}mm", size.x + margin * 2.0))
        .set("height", format!("{}mm", size.y + margin * 2.0));

    let stroke = (size.max() / 500.0).max(f64::EPSILON);
    for line in polylines {
        let closed = line.len() > 2 && line.first() == line.last();
        let points = points_attribute(if closed { &line[..line.len() - 1] } else { &line });

        svg = if closed {
            svg.add(
                Polygon::new()
                    .set("points", points)
                    .set("fill", "none")
                    .set("stroke", "black")
                    .set("stroke-width", stroke),
            )
        } else {
            svg.add(
                Polyline::new()
                    .set("points", points)
                    .set("fill", "none")
                    .set("stroke", "red")
                    .set("stroke-width", stroke),
            )
        };
    }

    svg
}

fn points_attribute(points: &[Vector2<f64>]) -> String {
    points
        .iter()
        .map(|x| format!("{},{}", x.x, x.y))
        .collect::<Vec<_>>()
        .join(" ")
}
