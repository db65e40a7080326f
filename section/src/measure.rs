use common::units::Milimeters;
use nalgebra::Vector2;
use tracing::info;

use crate::{
    camera::{Camera, Viewport},
    error::{Result, SectionError},
    Pos,
};

/// Straight line distance between two picked points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub from: Pos,
    pub to: Pos,
    pub distance: f64,
    pub midpoint: Pos,
}

impl Measurement {
    pub fn new(from: Pos, to: Pos) -> Self {
        Self {
            from,
            to,
            distance: (to - from).norm(),
            midpoint: (from + to) / 2.0,
        }
    }

    /// Measures between exactly two points.
    pub fn from_points(points: &[Pos]) -> Result<Self> {
        match points {
            [from, to] => {
                let measurement = Self::new(*from, *to);
                info!("Measured {}", measurement.label());
                Ok(measurement)
            }
            _ => Err(SectionError::PointCount {
                expected: 2,
                found: points.len(),
            }),
        }
    }

    /// Model units are taken to already be millimeters.
    pub fn length(&self) -> Milimeters {
        Milimeters::new(self.distance)
    }

    /// The distance with two decimals and a unit, like `12.35 mm`.
    pub fn label(&self) -> String {
        self.length().to_string()
    }

    /// Where to draw the label, in pixels from the viewport's top left
    /// corner.
    pub fn anchor(&self, camera: &Camera, viewport: &Viewport) -> Vector2<f64> {
        let ndc = camera.project(&self.midpoint);
        viewport.to_pixels(ndc.xy())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn distance_and_label() {
        let measurement =
            Measurement::from_points(&[Pos::new(1.0, 2.0, 3.0), Pos::new(4.0, 6.0, 3.0)]).unwrap();

        assert_eq!(measurement.distance, 5.0);
        assert_eq!(measurement.midpoint, Pos::new(2.5, 4.0, 3.0));
        assert_eq!(measurement.label(), "5.00 mm");

        let measurement = Measurement::new(Pos::zeros(), Pos::new(0.0, 0.0, 12.345_6));
        assert_eq!(measurement.label(), "12.35 mm");
    }

    #[test]
    fn requires_two_points() {
        for points in [vec![], vec![Pos::x()], vec![Pos::x(), Pos::y(), Pos::z()]] {
            let err = Measurement::from_points(&points).unwrap_err();
            assert!(matches!(
                err,
                SectionError::PointCount { expected: 2, found } if found == points.len()
            ));
        }
    }

    #[test]
    fn anchor_at_screen_center() {
        let camera = Camera::perspective(Pos::new(0.0, 0.0, 10.0), Pos::zeros(), 0.8, 2.0);
        let viewport = Viewport::new(800.0, 400.0);

        let measurement = Measurement::new(Pos::new(-1.0, 0.0, 0.0), Pos::new(1.0, 0.0, 0.0));
        let anchor = measurement.anchor(&camera, &viewport);
        assert!((anchor - Vector2::new(400.0, 200.0)).norm() < 1e-9);

        // Above the center on screen means a smaller pixel y
        let raised = Measurement::new(Pos::new(-1.0, 1.0, 0.0), Pos::new(1.0, 1.0, 0.0));
        let anchor = raised.anchor(&camera, &viewport);
        assert!((anchor.x - 400.0).abs() < 1e-9);
        assert!(anchor.y < 200.0);
    }

    fn arb_pos() -> impl Strategy<Value = Pos> {
        (-1e3..1e3, -1e3..1e3, -1e3..1e3).prop_map(|(x, y, z)| Pos::new(x, y, z))
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(a in arb_pos(), b in arb_pos()) {
            let there = Measurement::new(a, b);
            let back = Measurement::new(b, a);
            prop_assert_eq!(there.distance, back.distance);
            prop_assert_eq!(there.label(), back.label());
            prop_assert!(there.distance >= 0.0);
        }
    }
}
