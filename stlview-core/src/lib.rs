/// STLView Core Library - mesh ingestion, orbit camera and frame pipeline
///
/// This library holds everything that does not depend on a windowing system:
/// ASCII STL parsing, the orbit camera, scene compilation and the per-frame
/// transform logic. Hosts supply input events and a `RenderBackend`.

pub mod camera;
pub mod config;
pub mod geometry;
pub mod input;
pub mod lexer;
pub mod render;
pub mod scene;
pub mod stl;
pub mod viewer;

// Re-export commonly used types
pub use camera::{normalize, Axis, DragMode, OrbitCamera, Orientation, ZoomDirection};
pub use config::{CameraConfig, ConfigError, ProjectionConfig, SceneConfig, ViewerConfig};
pub use geometry::{Mesh, Triangle};
pub use input::{Buttons, InputEvent, InputRouter, Response};
pub use render::{modelview, Projection, RenderBackend, Renderer, Viewport};
pub use scene::{palette, Color, CompiledScene, DrawCommand, LineStyle, SceneBuilder, MESH_NORMAL};
pub use stl::{GroupingMode, MeshParser, OpenError, ParseReport, ParseWarning, WarningKind};
pub use viewer::{LoadSummary, Viewer};
