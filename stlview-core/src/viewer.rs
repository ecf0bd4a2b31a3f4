/// Viewer session: owns the camera, the active scene and the redraw flag
use std::path::{Path, PathBuf};

use crate::camera::{DragMode, OrbitCamera};
use crate::config::ViewerConfig;
use crate::geometry::Mesh;
use crate::input::{InputEvent, InputRouter, Response};
use crate::render::{Projection, RenderBackend, Renderer};
use crate::scene::{CompiledScene, SceneBuilder};
use crate::stl::{MeshParser, OpenError, ParseReport};

/// Outcome of a successful open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub path: Option<PathBuf>,
    pub triangles: usize,
    /// Lines or vertices that were skipped
    pub skipped: usize,
}

pub struct Viewer {
    parser: MeshParser,
    builder: SceneBuilder,
    camera: OrbitCamera,
    renderer: Renderer,
    input: InputRouter,
    scene: CompiledScene,
    source: Option<PathBuf>,
    dirty: bool,
}

impl Viewer {
    /// Start with an empty mesh, so the grid and axes show before any open.
    pub fn new(config: &ViewerConfig, width: u32, height: u32) -> Self {
        let builder = SceneBuilder::new(&config.scene);
        Self {
            parser: MeshParser::new(config.grouping),
            scene: builder.build(Mesh::new()),
            builder,
            camera: OrbitCamera::new(&config.camera),
            renderer: Renderer::new(width, height, &config.projection),
            input: InputRouter::new(),
            source: None,
            dirty: true,
        }
    }

    /// Load a mesh file and make it the active scene.
    ///
    /// On failure the current scene and source stay as they were.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadSummary, OpenError> {
        let path = path.as_ref();
        let report = self.parser.load(path).map_err(|err| {
            log::warn!("{}", err);
            err
        })?;

        self.source = Some(path.to_path_buf());
        let summary = self.install(report);
        log::info!(
            "Loaded {} triangles from {}",
            summary.triangles,
            path.display()
        );
        Ok(summary)
    }

    /// Load mesh text already in memory. Clears the reload source.
    pub fn open_str(&mut self, text: &str) -> LoadSummary {
        let report = self.parser.parse_str(text);
        self.source = None;
        self.install(report)
    }

    /// Re-read the current source file, if there is one
    pub fn reload(&mut self) -> Option<Result<LoadSummary, OpenError>> {
        let path = self.source.clone()?;
        Some(self.open(path))
    }

    fn install(&mut self, report: ParseReport) -> LoadSummary {
        let skipped = report.warnings.len();
        let scene = self.builder.build(report.mesh);
        let triangles = scene.triangle_count();

        // Swap in one step; the renderer never sees a half-built scene
        self.scene = scene;
        self.dirty = true;

        LoadSummary {
            path: self.source.clone(),
            triangles,
            skipped,
        }
    }

    /// Route one host event. Returns whether a redraw was requested.
    pub fn handle_event(&mut self, event: InputEvent) -> bool {
        let redraw = match self.input.route(event, &mut self.camera) {
            Response::Ignored => false,
            Response::Redraw => true,
            Response::Resize { width, height } => self.renderer.resize(width, height),
        };
        self.dirty |= redraw;
        redraw
    }

    /// Rotate as if the mouse moved by `(dx, dy)` with `mode`'s button held
    pub fn rotate_by(&mut self, dx: i32, dy: i32, mode: DragMode) -> bool {
        let changed = self.camera.apply_drag(dx, dy, mode);
        self.dirty |= changed;
        changed
    }

    pub fn reset_view(&mut self) -> bool {
        let changed = self.camera.reset();
        self.dirty |= changed;
        changed
    }

    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    /// Force the next frame, e.g. after the host surface was invalidated
    pub fn request_redraw(&mut self) {
        self.dirty = true;
    }

    /// Render one frame and clear the redraw request
    pub fn render<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        self.renderer
            .render_frame(backend, &self.camera, &self.scene);
        self.dirty = false;
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn scene(&self) -> &CompiledScene {
        &self.scene
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn projection(&self) -> &Projection {
        self.renderer.projection()
    }
}
