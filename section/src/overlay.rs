//! The drawing side of the viewer.
//!
//! Markers and lines are handed out as opaque handles that must be given back
//! through [`Overlay::dispose_marker`] / [`Overlay::dispose_line`]. Disposal
//! takes the handle by value, so a handle can only ever be disposed once.

use std::collections::HashMap;

use tracing::trace;

use crate::Pos;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Style {
    /// A point picked while defining a cutting plane.
    PlaneMarker,
    MeasureMarker,
    MeasureLine,
    Contour,
}

pub trait Overlay {
    type Marker;
    type Line;

    fn spawn_marker(&mut self, position: Pos, radius: f64, style: Style) -> Self::Marker;
    fn spawn_line(&mut self, points: &[Pos], style: Style) -> Self::Line;

    fn dispose_marker(&mut self, marker: Self::Marker);
    fn dispose_line(&mut self, line: Self::Line);
}

/// An overlay that draws nothing and just keeps track of what is alive. Used
/// by the command line front end and anything else without a renderer.
#[derive(Debug, Default)]
pub struct HeadlessOverlay {
    next_id: u64,
    live: HashMap<u64, Drawable>,
    disposed: usize,
}

/// Handle into a [`HeadlessOverlay`]. Not `Clone`, it can't outlive disposal.
#[derive(Debug, PartialEq, Eq)]
pub struct Handle(u64);

#[derive(Clone, Debug, PartialEq)]
pub enum Drawable {
    Marker {
        position: Pos,
        radius: f64,
        style: Style,
    },
    Line {
        points: Vec<Pos>,
        style: Style,
    },
}

impl HeadlessOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> impl Iterator<Item = &Drawable> {
        self.live.values()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of handles given back so far.
    pub fn disposed_count(&self) -> usize {
        self.disposed
    }

    /// Live drawables with the given style.
    pub fn with_style(&self, style: Style) -> impl Iterator<Item = &Drawable> {
        self.live.values().filter(move |x| x.style() == style)
    }

    pub fn get(&self, handle: &Handle) -> Option<&Drawable> {
        self.live.get(&handle.0)
    }

    fn insert(&mut self, drawable: Drawable) -> Handle {
        let id = self.next_id;
        self.next_id += 1;

        trace!("Spawned {:?} #{id}", drawable.style());
        self.live.insert(id, drawable);
        Handle(id)
    }

    fn remove(&mut self, handle: Handle) {
        // Handles can't be cloned or built outside this module, so this
        // always finds something.
        if let Some(drawable) = self.live.remove(&handle.0) {
            trace!("Disposed {:?} #{}", drawable.style(), handle.0);
            self.disposed += 1;
        }
    }
}

impl Overlay for HeadlessOverlay {
    type Marker = Handle;
    type Line = Handle;

    fn spawn_marker(&mut self, position: Pos, radius: f64, style: Style) -> Handle {
        self.insert(Drawable::Marker {
            position,
            radius,
            style,
        })
    }

    fn spawn_line(&mut self, points: &[Pos], style: Style) -> Handle {
        self.insert(Drawable::Line {
            points: points.to_vec(),
            style,
        })
    }

    fn dispose_marker(&mut self, marker: Handle) {
        self.remove(marker);
    }

    fn dispose_line(&mut self, line: Handle) {
        self.remove(line);
    }
}

impl Drawable {
    pub fn style(&self) -> Style {
        match self {
            Drawable::Marker { style, .. } | Drawable::Line { style, .. } => *style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_live_handles() {
        let mut overlay = HeadlessOverlay::new();

        let marker = overlay.spawn_marker(Pos::x(), 0.5, Style::MeasureMarker);
        let line = overlay.spawn_line(&[Pos::zeros(), Pos::x()], Style::MeasureLine);
        assert_ne!(marker, line);
        assert_eq!(overlay.live_count(), 2);
        assert_eq!(overlay.with_style(Style::MeasureLine).count(), 1);
        assert_eq!(
            overlay.get(&marker),
            Some(&Drawable::Marker {
                position: Pos::x(),
                radius: 0.5,
                style: Style::MeasureMarker
            })
        );

        overlay.dispose_marker(marker);
        overlay.dispose_line(line);
        assert_eq!(overlay.live_count(), 0);
        assert_eq!(overlay.disposed_count(), 2);
    }
}
