/// Per-frame transform pipeline and the backend contract
use nalgebra::{Matrix4, Point3, Vector3};

use crate::camera::{Axis, OrbitCamera};
use crate::config::ProjectionConfig;
use crate::scene::{palette, Color, CompiledScene, DrawCommand};

/// Window-space rectangle the projection maps onto. Origin is bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Centered square with side `max(width, height)`.
    ///
    /// The square covers the whole window; on the shorter axis the offset is
    /// negative and the overflow is cropped.
    pub fn centered_square(width: u32, height: u32) -> Self {
        let side = width.max(height);
        Self {
            x: (width as i32 - side as i32) / 2,
            y: (height as i32 - side as i32) / 2,
            width: side,
            height: side,
        }
    }

    /// Map normalized device coordinates to window coordinates
    pub fn ndc_to_window(&self, ndc_x: f32, ndc_y: f32) -> (f32, f32) {
        (
            self.x as f32 + (ndc_x + 1.0) * 0.5 * self.width as f32,
            self.y as f32 + (ndc_y + 1.0) * 0.5 * self.height as f32,
        )
    }
}

/// Viewport plus orthographic projection for the current window size
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub viewport: Viewport,
    pub matrix: Matrix4<f32>,
    /// Window size the projection was computed for
    pub window: (u32, u32),
}

impl Projection {
    pub fn new(width: u32, height: u32, config: &ProjectionConfig) -> Self {
        let e = config.half_extent;
        Self {
            viewport: Viewport::centered_square(width, height),
            // bottom = +e, top = -e: world +Y points down the screen
            matrix: Matrix4::new_orthographic(-e, e, e, -e, config.near, config.far),
            window: (width, height),
        }
    }

    /// Project a point already in eye space to window coordinates and NDC depth
    pub fn project(&self, eye: &Point3<f32>) -> (f32, f32, f32) {
        let ndc = self.matrix.transform_point(eye);
        let (x, y) = self.viewport.ndc_to_window(ndc.x, ndc.y);
        (x, y, ndc.z)
    }
}

/// Anything that can replay draw commands.
///
/// Implementations keep a depth buffer and honor each command's line style,
/// color and flat normal.
pub trait RenderBackend {
    /// Clear color and depth, then apply viewport and projection
    fn begin_frame(&mut self, projection: &Projection, clear: Color);

    fn draw(&mut self, command: &DrawCommand, modelview: &Matrix4<f32>);
}

/// Build the modelview for the current camera state.
///
/// Starts at identity, scales, pushes the scene back by `view_depth`, then
/// rotates about X, Y and Z in that order. Matrices are post-multiplied, so
/// vertices are turned about Z first.
pub fn modelview(camera: &OrbitCamera, view_depth: f32) -> Matrix4<f32> {
    let orientation = camera.orientation();
    let rx = Matrix4::new_rotation(Vector3::x() * orientation.degrees(Axis::X).to_radians());
    let ry = Matrix4::new_rotation(Vector3::y() * orientation.degrees(Axis::Y).to_radians());
    let rz = Matrix4::new_rotation(Vector3::z() * orientation.degrees(Axis::Z).to_radians());

    let mut transform = Matrix4::identity();
    transform *= Matrix4::new_scaling(camera.scale());
    transform *= Matrix4::new_translation(&Vector3::new(0.0, 0.0, -view_depth));
    transform *= rx;
    transform *= ry;
    transform *= rz;
    transform
}

/// Owns the window-to-projection mapping and drives each frame
#[derive(Debug, Clone)]
pub struct Renderer {
    config: ProjectionConfig,
    projection: Projection,
}

impl Renderer {
    pub fn new(width: u32, height: u32, config: &ProjectionConfig) -> Self {
        Self {
            config: config.clone(),
            projection: Projection::new(width, height, config),
        }
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Recompute the projection. Returns `false` if the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.projection.window == (width, height) {
            return false;
        }
        self.projection = Projection::new(width, height, &self.config);
        log::debug!(
            "Resized to {}x{}, viewport {:?}",
            width,
            height,
            self.projection.viewport
        );
        true
    }

    /// Clear, then replay `scene` under the camera's modelview
    pub fn render_frame<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        camera: &OrbitCamera,
        scene: &CompiledScene,
    ) {
        backend.begin_frame(&self.projection, palette::BACKGROUND);

        let modelview = modelview(camera, self.config.view_depth);
        for command in scene.commands() {
            backend.draw(command, &modelview);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::geometry::Mesh;
    use crate::scene::SceneBuilder;

    fn camera(rotation: [i64; 3]) -> OrbitCamera {
        OrbitCamera::new(&CameraConfig {
            initial_rotation: rotation,
            ..CameraConfig::default()
        })
    }

    fn close(a: Point3<f32>, b: Point3<f32>) -> bool {
        (a - b).norm() < 1e-4
    }

    #[derive(Default)]
    struct Recorder {
        frames: usize,
        clear: Option<Color>,
        draws: Vec<(DrawCommand, Matrix4<f32>)>,
    }

    impl RenderBackend for Recorder {
        fn begin_frame(&mut self, _projection: &Projection, clear: Color) {
            self.frames += 1;
            self.clear = Some(clear);
        }

        fn draw(&mut self, command: &DrawCommand, modelview: &Matrix4<f32>) {
            self.draws.push((command.clone(), *modelview));
        }
    }

    #[test]
    fn test_viewport_is_centered_square() {
        let viewport = Viewport::centered_square(800, 600);
        assert_eq!(
            viewport,
            Viewport {
                x: 0,
                y: -100,
                width: 800,
                height: 800
            }
        );
        assert_eq!(Viewport::centered_square(300, 500).x, -100);
    }

    #[test]
    fn test_translation_only_at_rest() {
        let matrix = modelview(&camera([0, 0, 0]), 20.0);
        let moved = matrix.transform_point(&Point3::new(1.0, 2.0, 3.0));
        assert!(close(moved, Point3::new(1.0, 2.0, -17.0)));
    }

    #[test]
    fn test_scale_applies_to_translation() {
        let mut cam = camera([0, 0, 0]);
        cam.apply_zoom(crate::camera::ZoomDirection::Toward);
        let matrix = modelview(&cam, 20.0);
        let moved = matrix.transform_point(&Point3::origin());
        assert!(close(moved, Point3::new(0.0, 0.0, -18.0)));
    }

    #[test]
    fn test_rotation_order_is_x_then_y_then_z() {
        // 90 degrees about X and Y
        let matrix = modelview(&camera([1440, 1440, 0]), 20.0);
        let moved = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(close(moved, Point3::new(0.0, 1.0, -20.0)), "{:?}", moved);
    }

    #[test]
    fn test_z_rotation_applies_first() {
        // 90 degrees about Y and Z
        let matrix = modelview(&camera([0, 1440, 1440]), 0.0);
        let moved = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(close(moved, Point3::new(0.0, 1.0, 0.0)), "{:?}", moved);
    }

    #[test]
    fn test_projection_flips_y() {
        let projection = Projection::new(100, 100, &ProjectionConfig::default());
        let (x, y, _) = projection.project(&Point3::new(50.0, 50.0, 0.0));
        assert!((x - 100.0).abs() < 1e-4);
        assert!(y.abs() < 1e-4);
        let (_, y, _) = projection.project(&Point3::new(0.0, -50.0, 0.0));
        assert!((y - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_projection_depth_range() {
        let projection = Projection::new(10, 10, &ProjectionConfig::default());
        let (_, _, near) = projection.project(&Point3::new(0.0, 0.0, 100.0));
        let (_, _, far) = projection.project(&Point3::new(0.0, 0.0, -500.0));
        assert!((near + 1.0).abs() < 1e-5);
        assert!((far - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_resize_only_when_changed() {
        let mut renderer = Renderer::new(640, 480, &ProjectionConfig::default());
        assert!(!renderer.resize(640, 480));
        assert!(renderer.resize(480, 640));
        assert_eq!(renderer.projection().viewport.y, 0);
        assert_eq!(renderer.projection().viewport.x, -80);
    }

    #[test]
    fn test_frame_replays_scene_in_order() {
        let renderer = Renderer::new(100, 100, &ProjectionConfig::default());
        let scene = SceneBuilder::default().build(Mesh::new());
        let cam = OrbitCamera::default();
        let mut recorder = Recorder::default();

        renderer.render_frame(&mut recorder, &cam, &scene);
        renderer.render_frame(&mut recorder, &cam, &scene);

        assert_eq!(recorder.frames, 2);
        assert_eq!(recorder.clear, Some(palette::BACKGROUND));
        assert_eq!(recorder.draws.len(), 2 * scene.commands().len());
        let expected = modelview(&cam, 20.0);
        for (i, (command, matrix)) in recorder.draws.iter().enumerate() {
            assert_eq!(command, &scene.commands()[i % scene.commands().len()]);
            assert_eq!(*matrix, expected);
        }
    }
}
