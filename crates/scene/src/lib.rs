pub mod camera;
pub mod config;
pub mod controller;
pub mod markers;
pub mod orientation;
pub mod picking;
pub mod resources;
pub mod session;
pub mod visibility;
pub mod zoom;

pub use camera::{Camera, Viewport};
pub use config::GlobeConfig;
pub use controller::{AutoRotate, ControlState, ControllerEvent, GlobeController};
pub use markers::{Marker, MarkerImage, MarkerOrigin, MarkerSet};
pub use orientation::{OrientationState, rotate_toward};
pub use session::{ClickOutcome, GlobeEvent, GlobeSession, HoverInfo, Selection};
pub use visibility::is_visible;
