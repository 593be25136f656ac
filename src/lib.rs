pub mod config;
pub mod geometry;
pub mod marker;
pub mod placement;

pub use config::{load_config, ConfigError, PlacementConfig};
pub use geometry::{intersection_area, Rect, Viewport};
pub use marker::{Anchor, DefaultMarkerPolicy, MarkerPolicy, MarkerSpec, PlacedMarker};
pub use placement::{CandidateName, FrameInput, PlacementEngine};
