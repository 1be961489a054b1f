//! One interactive globe: the object a UI layer owns and forwards input to.
//!
//! The session is single-threaded and frame-driven. Input handlers run to
//! completion between frames; `tick` advances every animation and reports
//! completions through the event bus. Marker loading, the per-coordinate
//! map count and the selection image are the only awaits, and a failure in
//! any of them degrades to fallback content instead of an error.

use catalog::model::LibraryId;
use catalog::source::MapSource;
use foundation::math::{Vec2, Vec3};
use foundation::time::Time;
use runtime::event_bus::{EventBus, Stamped};
use runtime::frame::Frame;
use tracing::{debug, info, warn};

use crate::camera::{Camera, Viewport};
use crate::config::GlobeConfig;
use crate::controller::{ControllerEvent, GlobeController};
use crate::markers::{MarkerImage, MarkerOrigin, MarkerSet};
use crate::orientation::OrientationState;
use crate::picking::{PickHit, Ray, Sphere, pick_markers};
use crate::resources::{ResourceGroup, ResourceId, ResourceKind, ResourceRegistry};
use crate::visibility::is_visible;
use crate::zoom::ZoomController;

#[derive(Debug, Clone, PartialEq)]
pub enum GlobeEvent {
    MarkersLoaded { count: usize, origin: MarkerOrigin },
    MarkerSelected { index: usize },
    SelectionCleared,
    MapCountUpdated { count: usize },
    ImageLoaded { bytes: usize },
    ImageFailed,
    RotationCompleted,
    DecayFinished,
    AutoRotateResumed,
    Disposed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Clicks are ignored while the globe turns toward a selection, or when
    /// the pointer is outside the viewport.
    Ignored,
    Selected(usize),
    Cleared,
    Nothing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub index: usize,
    /// Orientation the globe is turning (or has turned) to.
    pub target: OrientationState,
    pub map_count: Option<usize>,
    texture: Option<ResourceId>,
}

impl Selection {
    pub fn has_image(&self) -> bool {
        self.texture.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    pub index: usize,
    pub label: String,
    pub description: String,
}

pub struct GlobeSession {
    cfg: GlobeConfig,
    frame: Frame,
    viewport: Viewport,
    zoom: ZoomController,
    controller: GlobeController,
    markers: MarkerSet,
    globe: Option<Sphere>,
    resources: ResourceRegistry,
    selection: Option<Selection>,
    events: EventBus<GlobeEvent>,
    disposed: bool,
}

impl GlobeSession {
    pub fn new(cfg: GlobeConfig, viewport: Viewport) -> Self {
        let zoom = ZoomController::new(cfg.zoom.clone());
        let controller = GlobeController::new(
            cfg.drag.clone(),
            cfg.rotation.clone(),
            cfg.auto_rotate.clone(),
        );
        Self {
            cfg,
            frame: Frame::first(),
            viewport,
            zoom,
            controller,
            markers: MarkerSet::empty(),
            globe: None,
            resources: ResourceRegistry::new(),
            selection: None,
            events: EventBus::new(),
            disposed: false,
        }
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.cfg
    }

    pub fn now(&self) -> Time {
        self.frame.end_time()
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.zoom.distance(), self.cfg.fov_y_deg, self.viewport)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn controller(&self) -> &GlobeController {
        &self.controller
    }

    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    pub fn orientation(&self) -> OrientationState {
        self.controller.orientation()
    }

    pub fn set_orientation(&mut self, orientation: OrientationState) {
        self.controller.set_orientation(orientation);
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn drain_events(&mut self) -> Vec<Stamped<GlobeEvent>> {
        self.events.drain()
    }

    /// Build the globe sphere. Until this runs, nothing occludes markers.
    pub fn init_globe(&mut self) {
        if self.disposed || self.globe.is_some() {
            return;
        }
        self.globe = Some(Sphere::new(Vec3::ZERO, self.cfg.radius));
        self.resources
            .create(ResourceKind::Geometry, ResourceGroup::Globe, "globe sphere");
        self.resources
            .create(ResourceKind::Texture, ResourceGroup::Globe, "globe surface");
        self.resources
            .create(ResourceKind::Material, ResourceGroup::Globe, "atmosphere");
        debug!("globe initialized with radius {}", self.cfg.radius);
    }

    /// Fetch the records of `library` and rebuild the marker set.
    ///
    /// A failed fetch, or one without any placed map, installs the built-in
    /// fallback markers.
    pub async fn load_markers(&mut self, source: &dyn MapSource, library: LibraryId) -> MarkerOrigin {
        let set = match source.fetch_records(library).await {
            Ok(records) => MarkerSet::from_records_or_fallback(&records, &self.cfg),
            Err(e) => {
                warn!("failed to fetch map records for library {library}: {e}");
                MarkerSet::fallback(&self.cfg)
            }
        };
        let origin = set.origin();
        self.install_markers(set);
        origin
    }

    /// Replace the marker set, releasing the previous markers' resources.
    pub fn install_markers(&mut self, set: MarkerSet) {
        if self.disposed {
            return;
        }
        self.clear_selection();
        self.resources.release_group(ResourceGroup::Markers);
        for (i, marker) in set.iter().enumerate() {
            let name = format!("marker {i} ({})", marker.label);
            self.resources
                .create(ResourceKind::Geometry, ResourceGroup::Markers, name.clone());
            self.resources
                .create(ResourceKind::Material, ResourceGroup::Markers, name);
        }
        info!("placed {} markers ({:?})", set.len(), set.origin());
        self.events.emit(
            self.frame,
            GlobeEvent::MarkersLoaded {
                count: set.len(),
                origin: set.origin(),
            },
        );
        self.markers = set;
    }

    pub fn marker_world_position(&self, index: usize) -> Option<Vec3> {
        let marker = self.markers.get(index)?;
        Some(self.orientation().to_world(marker.local_position))
    }

    /// Indices of the markers currently visible from the camera.
    pub fn visible_markers(&self) -> Vec<usize> {
        let camera = self.camera();
        let (pos, forward) = (camera.position(), camera.forward());
        (0..self.markers.len())
            .filter(|&i| {
                self.marker_world_position(i)
                    .is_some_and(|world| is_visible(world, pos, forward, self.globe.as_ref()))
            })
            .collect()
    }

    pub fn pointer_down(&mut self, pos_px: Vec2) -> bool {
        if self.disposed || !self.viewport.contains(pos_px) {
            return false;
        }
        self.controller.pointer_down(pos_px, self.now());
        true
    }

    pub fn pointer_move(&mut self, pos_px: Vec2) {
        if self.disposed {
            return;
        }
        self.controller.pointer_move(pos_px, self.now());
    }

    pub fn pointer_up(&mut self) {
        if self.disposed {
            return;
        }
        self.controller.pointer_up(self.now());
    }

    pub fn wheel(&mut self, delta_y: f64) {
        if !self.disposed {
            self.zoom.wheel(delta_y);
        }
    }

    pub fn pinch(&mut self, scale: f64) {
        if !self.disposed {
            self.zoom.pinch(scale);
        }
    }

    pub fn set_distance(&mut self, distance: f64) {
        if !self.disposed {
            self.zoom.set_distance(distance);
        }
    }

    pub fn zoom_in(&mut self) {
        if !self.disposed {
            self.zoom.zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if !self.disposed {
            self.zoom.zoom_out();
        }
    }

    /// Visible marker under the pointer, for the tooltip and cursor.
    pub fn hover(&self, pos_px: Vec2) -> Option<HoverInfo> {
        if self.disposed {
            return None;
        }
        let ray = self.camera().screen_ray(pos_px)?;
        let hit = self.pick_visible(ray)?;
        let marker = self.markers.get(hit.index)?;
        Some(HoverInfo {
            index: hit.index,
            label: marker.label.clone(),
            description: marker.description.clone(),
        })
    }

    pub fn click(&mut self, pos_px: Vec2) -> ClickOutcome {
        if self.disposed || self.controller.is_rotating() {
            return ClickOutcome::Ignored;
        }
        let Some(ray) = self.camera().screen_ray(pos_px) else {
            return ClickOutcome::Ignored;
        };

        if let Some(hit) = self.pick_visible(ray) {
            self.select(hit.index);
            return ClickOutcome::Selected(hit.index);
        }

        if self.selection.is_some() {
            self.clear_selection();
            self.zoom.restore();
            return ClickOutcome::Cleared;
        }
        ClickOutcome::Nothing
    }

    /// Drop the selection and its label without moving the camera.
    pub fn key_escape(&mut self) {
        if !self.disposed {
            self.clear_selection();
        }
    }

    /// Look up how many maps sit at the selected coordinate. A failed lookup
    /// shows zero.
    pub async fn refresh_selection_count(&mut self, source: &dyn MapSource) -> Option<usize> {
        let index = self.selection.as_ref()?.index;
        let coord_id = self.markers.get(index)?.coord_id?;
        let count = match source.coordinate_map_count(coord_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!("failed to count maps at coordinate {coord_id}: {e}");
                0
            }
        };
        let selection = self.selection.as_mut()?;
        selection.map_count = Some(count);
        self.events
            .emit(self.frame, GlobeEvent::MapCountUpdated { count });
        Some(count)
    }

    /// Fetch and bind the selected marker's image. Returns whether a texture
    /// is now bound.
    pub async fn load_selection_image(&mut self, source: &dyn MapSource) -> bool {
        let Some(index) = self.selection.as_ref().map(|s| s.index) else {
            return false;
        };
        let Some(marker) = self.markers.get(index) else {
            return false;
        };
        let label = marker.label.clone();
        let bytes = match marker.image.clone() {
            Some(MarkerImage::Map(map_id)) => match source.map_image(map_id).await {
                Ok(Some(bytes)) => Some(bytes.len()),
                Ok(None) => {
                    warn!("no image for map {map_id}");
                    None
                }
                Err(e) => {
                    warn!("failed to load image for map {map_id}: {e}");
                    None
                }
            },
            Some(MarkerImage::Asset(path)) => {
                debug!("binding bundled image {path}");
                Some(0)
            }
            None => None,
        };

        let Some(selection) = self.selection.as_mut() else {
            return false;
        };
        let Some(bytes) = bytes else {
            self.events.emit(self.frame, GlobeEvent::ImageFailed);
            return false;
        };
        if let Some(old) = selection.texture.take() {
            self.resources.release(old);
        }
        selection.texture = Some(self.resources.create(
            ResourceKind::Texture,
            ResourceGroup::Selection,
            format!("image for {label}"),
        ));
        self.events
            .emit(self.frame, GlobeEvent::ImageLoaded { bytes });
        true
    }

    /// Advance one frame of `dt_s` seconds.
    pub fn tick(&mut self, dt_s: f64) {
        if self.disposed {
            return;
        }
        self.frame = self.frame.advance(dt_s);
        let now = self.frame.end_time();
        for event in self.controller.tick(self.frame.dt_s, now) {
            let event = match event {
                ControllerEvent::RotationCompleted => GlobeEvent::RotationCompleted,
                ControllerEvent::DecayFinished => GlobeEvent::DecayFinished,
                ControllerEvent::AutoRotateResumed => GlobeEvent::AutoRotateResumed,
            };
            self.events.emit(self.frame, event);
        }
        self.zoom.advance(self.frame.dt_s);
    }

    /// Release every resource. The session ignores all input afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.selection = None;
        let released = self.resources.release_all();
        self.markers = MarkerSet::empty();
        self.globe = None;
        self.disposed = true;
        debug!("globe session disposed, released {released} resources");
        self.events.emit(self.frame, GlobeEvent::Disposed);
    }

    fn pick_visible(&self, ray: Ray) -> Option<PickHit> {
        let candidates: Vec<(usize, Sphere)> = self
            .visible_markers()
            .into_iter()
            .filter_map(|i| {
                let world = self.marker_world_position(i)?;
                let marker = self.markers.get(i)?;
                Some((i, marker.pick_sphere(world)))
            })
            .collect();
        pick_markers(ray, candidates)
    }

    fn select(&mut self, index: usize) {
        if self.selection.as_ref().is_some_and(|s| s.index == index) {
            return;
        }
        let Some(local) = self.markers.get(index).map(|m| m.local_position) else {
            return;
        };
        self.drop_selection_texture();
        let now = self.now();
        let target = self.controller.rotate_to_marker(local, now);
        self.controller.hold_auto_rotate();
        self.zoom.focus();
        self.selection = Some(Selection {
            index,
            target,
            map_count: None,
            texture: None,
        });
        self.events
            .emit(self.frame, GlobeEvent::MarkerSelected { index });
    }

    fn clear_selection(&mut self) {
        if self.selection.is_none() {
            return;
        }
        self.drop_selection_texture();
        self.selection = None;
        self.controller.release_hold(self.now());
        self.events.emit(self.frame, GlobeEvent::SelectionCleared);
    }

    fn drop_selection_texture(&mut self) {
        if let Some(texture) = self.selection.as_mut().and_then(|s| s.texture.take()) {
            self.resources.release(texture);
        }
    }
}
