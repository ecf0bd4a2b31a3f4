/// Scene compilation: grid, axes and mesh recorded once as draw commands
use std::sync::Arc;

use nalgebra::{Point3, Vector3};

use crate::config::SceneConfig;
use crate::geometry::{Mesh, Triangle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Fixed viewer palette
pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = Color::rgb(0.305, 0.305, 0.5);
    pub const GRID: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const AXIS_X: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const AXIS_Y: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const AXIS_Z: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const MESH: Color = Color::rgb(0.6, 1.0, 0.0);
}

/// Face normal shared by every mesh triangle
pub const MESH_NORMAL: Vector3<f32> = Vector3::new(0.0, 0.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width: f32,
    /// Smoothed, blended lines
    pub antialias: bool,
}

impl LineStyle {
    pub const GRID: LineStyle = LineStyle {
        width: 0.5,
        antialias: true,
    };
    pub const AXIS: LineStyle = LineStyle {
        width: 1.0,
        antialias: false,
    };
}

/// One recorded draw batch
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Lines {
        segments: Vec<[Point3<f32>; 2]>,
        color: Color,
        style: LineStyle,
    },
    /// Flat-shaded triangles: one normal and one color for the whole batch
    Triangles {
        triangles: Vec<Triangle>,
        color: Color,
        normal: Vector3<f32>,
    },
}

/// Immutable, replayable list of draw commands.
///
/// Clones share the same recording.
#[derive(Debug, Clone)]
pub struct CompiledScene {
    commands: Arc<[DrawCommand]>,
    triangle_count: usize,
}

impl CompiledScene {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// True if both handles refer to the same recording
    pub fn same_recording(&self, other: &CompiledScene) -> bool {
        Arc::ptr_eq(&self.commands, &other.commands)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    config: SceneConfig,
}

impl SceneBuilder {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Record grid, axes and mesh, in that order
    pub fn build(&self, mesh: Mesh) -> CompiledScene {
        let mut commands = Vec::with_capacity(5);

        if let Some(grid) = self.grid() {
            commands.push(grid);
        }
        commands.extend(self.axes());

        let triangle_count = mesh.len();
        commands.push(DrawCommand::Triangles {
            triangles: mesh.triangles,
            color: palette::MESH,
            normal: MESH_NORMAL,
        });

        CompiledScene {
            commands: commands.into(),
            triangle_count,
        }
    }

    fn grid(&self) -> Option<DrawCommand> {
        let divisions = self.config.grid_divisions;
        if divisions == 0 {
            return None;
        }

        let half = self.config.grid_half_extent;
        let spacing = 2.0 * half / divisions as f32;
        let mut segments = Vec::with_capacity(2 * (divisions as usize + 1));

        for i in 0..=divisions {
            let z = i as f32 * spacing - half;
            segments.push([Point3::new(-half, 0.0, z), Point3::new(half, 0.0, z)]);
        }
        for i in 0..=divisions {
            let x = i as f32 * spacing - half;
            segments.push([Point3::new(x, 0.0, -half), Point3::new(x, 0.0, half)]);
        }

        Some(DrawCommand::Lines {
            segments,
            color: palette::GRID,
            style: LineStyle::GRID,
        })
    }

    fn axes(&self) -> [DrawCommand; 3] {
        let length = self.config.axis_length;
        let origin = Point3::origin();
        let axis = |end: Point3<f32>, color: Color| DrawCommand::Lines {
            segments: vec![[origin, end]],
            color,
            style: LineStyle::AXIS,
        };

        [
            axis(Point3::new(length, 0.0, 0.0), palette::AXIS_X),
            axis(Point3::new(0.0, length, 0.0), palette::AXIS_Y),
            axis(Point3::new(0.0, 0.0, length), palette::AXIS_Z),
        ]
    }
}
