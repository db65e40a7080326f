//! The interactive state behind one viewer: the cutting plane, both point
//! pickers, the current measurement, and the drawables that show them.

use common::config::{Config, PickingConfig};
use nalgebra::Vector2;
use tracing::{debug, info, warn};

use crate::{
    camera::{Camera, Viewport},
    error::SectionError,
    framing::ViewFramer,
    measure::Measurement,
    mesh_set::MeshSet,
    overlay::{Overlay, Style},
    picker::{CapacityPolicy, Pickable, PointPicker},
    plane::{Axis, Derivation, Plane},
    slicer::{Contour, SliceCache},
    Pos,
};

pub struct Session<O: Overlay> {
    overlay: O,
    picking: PickingConfig,
    join_tolerance: f64,
    framer: ViewFramer,

    plane: Plane,
    cross_section: bool,
    defining_plane: bool,
    plane_picker: PointPicker<O::Marker>,
    contour_lines: Vec<O::Line>,
    cache: SliceCache,

    measuring: bool,
    measure_picker: PointPicker<O::Marker>,
    measurement: Option<Measurement>,
    measure_line: Option<O::Line>,
}

/// What the user should be doing next with the cutting plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneStatus {
    Idle,
    PickFirst,
    PickSecond,
}

#[derive(Debug)]
pub enum ClickOutcome {
    /// No tool wanted the click.
    Ignored,
    /// The click didn't land on any visible mesh.
    Missed,
    PointAdded(Pos),
    PlaneDerived(Plane),
    /// The plane is unchanged and plane definition starts over.
    DerivationFailed(SectionError),
    Measured(Measurement),
}

impl<O: Overlay> Session<O> {
    pub fn new(overlay: O, config: &Config) -> Self {
        let radius = config.picking.marker_radius;
        Self {
            overlay,
            picking: config.picking.clone(),
            join_tolerance: config.contour.join_tolerance,
            framer: ViewFramer::new(config.framing.clone()),

            plane: Plane::default(),
            cross_section: false,
            defining_plane: false,
            plane_picker: PointPicker::new(CapacityPolicy::AutoConsume, Style::PlaneMarker, radius),
            contour_lines: Vec::new(),
            cache: SliceCache::new(),

            measuring: false,
            measure_picker: PointPicker::new(
                CapacityPolicy::ResetOnOverflow,
                Style::MeasureMarker,
                radius,
            ),
            measurement: None,
            measure_line: None,
        }
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    /// Disposes every drawable the session still owns and hands back the
    /// overlay.
    pub fn close(mut self) -> O {
        self.plane_picker.clear_points(&mut self.overlay);
        self.clear_measurement();
        self.clear_contour();
        self.overlay
    }
}

// Cross section
impl<O: Overlay> Session<O> {
    pub fn set_cross_section_enabled(&mut self, enabled: bool) {
        self.cross_section = enabled;
        if !enabled {
            self.plane_picker.clear_points(&mut self.overlay);
            self.defining_plane = false;
            self.clear_contour();
        }
        info!("Cross section {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn cross_section_enabled(&self) -> bool {
        self.cross_section
    }

    /// Starts picking two points to define a new plane. Ignored while the
    /// cross section is disabled.
    pub fn begin_plane_definition(&mut self) -> bool {
        if !self.cross_section {
            debug!("Cross section disabled, not defining a plane");
            return false;
        }

        self.plane_picker.clear_points(&mut self.overlay);
        self.defining_plane = true;
        true
    }

    pub fn cancel_plane_definition(&mut self) {
        self.plane_picker.clear_points(&mut self.overlay);
        self.defining_plane = false;
    }

    pub fn set_axis(&mut self, axis: Axis) {
        self.plane.set_axis(axis);
        self.plane_picker.clear_points(&mut self.overlay);
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.plane.set_offset(offset);
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn status(&self) -> PlaneStatus {
        match (self.defining_plane, self.plane_picker.len()) {
            (false, _) => PlaneStatus::Idle,
            (true, 0) => PlaneStatus::PickFirst,
            (true, _) => PlaneStatus::PickSecond,
        }
    }

    pub fn plane_points(&self) -> Vec<Pos> {
        self.plane_picker.positions()
    }

    /// Re-slices the visible meshes if anything changed and swaps in new
    /// contour lines. Returns true if the contour was rebuilt.
    pub fn refresh_contour(&mut self, meshes: &MeshSet) -> bool {
        if !self.cross_section || !self.cache.refresh(&self.plane, meshes) {
            return false;
        }

        for line in self.contour_lines.drain(..) {
            self.overlay.dispose_line(line);
        }

        for polyline in self.cache.contour().polylines(self.join_tolerance) {
            let line = self.overlay.spawn_line(&polyline, Style::Contour);
            self.contour_lines.push(line);
        }

        true
    }

    /// The last sliced contour, if the cross section is on.
    pub fn contour(&self) -> Option<&Contour> {
        self.cross_section.then(|| self.cache.contour())
    }

    fn clear_contour(&mut self) {
        for line in self.contour_lines.drain(..) {
            self.overlay.dispose_line(line);
        }
        self.cache.invalidate();
    }
}

// Measurement
impl<O: Overlay> Session<O> {
    pub fn set_measurement_enabled(&mut self, enabled: bool) {
        self.measuring = enabled;
        if !enabled {
            self.clear_measurement();
        }
        info!("Measurement {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn measurement_enabled(&self) -> bool {
        self.measuring
    }

    pub fn clear_measurement(&mut self) {
        self.measure_picker.clear_points(&mut self.overlay);
        if let Some(line) = self.measure_line.take() {
            self.overlay.dispose_line(line);
        }
        self.measurement = None;
    }

    pub fn measurement(&self) -> Option<&Measurement> {
        self.measurement.as_ref()
    }

    pub fn measure_points(&self) -> Vec<Pos> {
        self.measure_picker.positions()
    }
}

// Input and framing
impl<O: Overlay> Session<O> {
    /// Routes a click to plane definition if that's in progress, otherwise to
    /// the measurement tool if it's on.
    pub fn handle_click(
        &mut self,
        screen: Vector2<f64>,
        meshes: &MeshSet,
        camera: &Camera,
        viewport: &Viewport,
    ) -> ClickOutcome {
        if !self.defining_plane && !self.measuring {
            return ClickOutcome::Ignored;
        }

        let candidates = meshes.visible().map(|x| x as &dyn Pickable);
        let Some(position) = self.plane_picker.pick(screen, candidates, camera, viewport) else {
            return ClickOutcome::Missed;
        };

        if self.defining_plane {
            self.add_plane_point(position, camera)
        } else {
            self.add_measure_point(position)
        }
    }

    fn add_plane_point(&mut self, position: Pos, camera: &Camera) -> ClickOutcome {
        self.plane_picker.add_point(&mut self.overlay, position);
        let Some(points) = self.plane_picker.consume(&mut self.overlay) else {
            return ClickOutcome::PointAdded(position);
        };

        let derivation = Derivation {
            view_direction: camera.direction(),
            world_up: self.picking.world_up,
            parallel_threshold: self.picking.parallel_threshold,
        };

        match Plane::from_two_points(points[0], points[1], &derivation) {
            Ok(plane) => {
                info!("Plane created from two points: {plane}");
                self.plane = plane;
                self.defining_plane = false;
                ClickOutcome::PlaneDerived(plane)
            }
            Err(err) => {
                warn!("Failed to create plane, pick the points again: {err}");
                ClickOutcome::DerivationFailed(err)
            }
        }
    }

    fn add_measure_point(&mut self, position: Pos) -> ClickOutcome {
        // The picker drops its own markers on overflow, but the line and the
        // measurement belong to us.
        if self.measure_picker.is_full() {
            if let Some(line) = self.measure_line.take() {
                self.overlay.dispose_line(line);
            }
            self.measurement = None;
        }

        self.measure_picker.add_point(&mut self.overlay, position);
        let Ok(measurement) = Measurement::from_points(&self.measure_picker.positions()) else {
            return ClickOutcome::PointAdded(position);
        };

        let line = self
            .overlay
            .spawn_line(&[measurement.from, measurement.to], Style::MeasureLine);
        self.measure_line = Some(line);
        self.measurement = Some(measurement);
        ClickOutcome::Measured(measurement)
    }

    /// Points `camera` straight at the current contour. Does nothing if the
    /// plane moved since the last [`Session::refresh_contour`].
    pub fn frame_contour(&self, camera: &mut Camera) -> bool {
        let contour = self.cache.contour();
        if contour.plane() != &self.plane {
            debug!("Contour is stale, refresh it before framing");
            return false;
        }

        self.cross_section && self.framer.frame_contour(&self.plane, contour.points(), camera)
    }

    pub fn frame_scene(&self, meshes: &MeshSet, camera: &mut Camera) -> bool {
        self.framer.frame_scene(&meshes.bounds(), camera)
    }
}
