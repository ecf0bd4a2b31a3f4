/// Software rasterizer drawing into terminal half-block cells
///
/// Each terminal cell holds two vertically stacked pixels: the upper one is
/// printed as the foreground of `▀`, the lower one as its background.
use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3};
use std::io::Write;
use stlview_core::{Color, DrawCommand, LineStyle, Projection, RenderBackend};

const HALF_BLOCK: char = '▀';

/// Coverage used for smoothed lines, blended over what is already drawn
const ANTIALIAS_ALPHA: f32 = 0.5;

/// Renderer writing into an RGB framebuffer with a depth buffer
pub struct TerminalRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    color_buffer: Vec<Color>,
    projection: Option<Projection>,
    cull_back_faces: bool,
}

impl TerminalRenderer {
    /// Create a renderer for a terminal of `columns` x `rows` cells
    pub fn new(columns: usize, rows: usize) -> Self {
        let width = columns;
        let height = rows * 2;
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            color_buffer: vec![Color::rgb(0.0, 0.0, 0.0); size],
            projection: None,
            cull_back_faces: true,
        }
    }

    /// Pixel size of the framebuffer, two pixels per terminal row
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    pub fn set_cull_back_faces(&mut self, cull: bool) {
        self.cull_back_faces = cull;
    }

    pub fn resize(&mut self, columns: usize, rows: usize) {
        *self = Self {
            cull_back_faces: self.cull_back_faces,
            ..Self::new(columns, rows)
        };
    }

    /// Color of the pixel at `(x, y)`, with `y` counted from the top
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.color_buffer[y * self.width + x])
        } else {
            None
        }
    }

    fn project(&self, modelview: &Matrix4<f32>, point: &Point3<f32>) -> Option<(f32, f32, f32)> {
        let projection = self.projection.as_ref()?;
        Some(projection.project(&modelview.transform_point(point)))
    }

    /// Depth-tested write. `(x, y)` are window coordinates with y up.
    fn plot(&mut self, x: f32, y: f32, depth: f32, color: Color, alpha: f32) {
        if !(-1.0..=1.0).contains(&depth) || x < 0.0 || y < 0.0 {
            return;
        }
        let (px, py) = (x as usize, y as usize);
        if px >= self.width || py >= self.height {
            return;
        }

        let idx = (self.height - 1 - py) * self.width + px;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.color_buffer[idx] = blend(self.color_buffer[idx], color, alpha);
        }
    }

    fn draw_lines(
        &mut self,
        segments: &[[Point3<f32>; 2]],
        color: Color,
        style: LineStyle,
        modelview: &Matrix4<f32>,
    ) {
        let alpha = if style.antialias { ANTIALIAS_ALPHA } else { 1.0 };

        for [a, b] in segments {
            let (Some(a), Some(b)) = (self.project(modelview, a), self.project(modelview, b)) else {
                continue;
            };

            let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil().max(1.0);
            // Skip lines too long to be on screen in any useful way
            if steps > 4.0 * (self.width + self.height) as f32 {
                continue;
            }
            let steps = steps as usize;
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                self.plot(
                    a.0 + (b.0 - a.0) * t,
                    a.1 + (b.1 - a.1) * t,
                    a.2 + (b.2 - a.2) * t,
                    color,
                    alpha,
                );
            }
        }
    }

    fn draw_triangle(&mut self, coords: [(f32, f32, f32); 3], color: Color) {
        let [v0, v1, v2] = coords;

        // Counter-clockwise in window space is front facing
        let area = (v1.0 - v0.0) * (v2.1 - v0.1) - (v2.0 - v0.0) * (v1.1 - v0.1);
        if self.cull_back_faces && area <= 0.0 {
            return;
        }

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor().max(0.0) as i64;
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i64).min(self.width as i64 - 1);
        let min_y = v0.1.min(v1.1).min(v2.1).floor().max(0.0) as i64;
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i64).min(self.height as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(px, py, depth, color, 1.0);
                    }
                }
            }
        }
    }

    /// Write the framebuffer to the terminal, one cell row per line
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in 0..self.height / 2 {
            let mut current: Option<(TermColor, TermColor)> = None;
            for x in 0..self.width {
                let top = term_color(self.color_buffer[2 * row * self.width + x]);
                let bottom = term_color(self.color_buffer[(2 * row + 1) * self.width + x]);

                if current != Some((top, bottom)) {
                    writer.queue(SetForegroundColor(top))?;
                    writer.queue(SetBackgroundColor(bottom))?;
                    current = Some((top, bottom));
                }
                writer.queue(Print(HALF_BLOCK))?;
            }
            writer.queue(ResetColor)?;
            if row + 1 < self.height / 2 {
                writer.queue(Print("\r\n"))?;
            }
        }
        Ok(())
    }
}

impl RenderBackend for TerminalRenderer {
    fn begin_frame(&mut self, projection: &Projection, clear: Color) {
        self.depth_buffer.fill(f32::INFINITY);
        self.color_buffer.fill(clear);
        self.projection = Some(projection.clone());
    }

    fn draw(&mut self, command: &DrawCommand, modelview: &Matrix4<f32>) {
        match command {
            DrawCommand::Lines {
                segments,
                color,
                style,
            } => self.draw_lines(segments, *color, *style, modelview),
            // No lighting: the shared normal does not change the flat color
            DrawCommand::Triangles {
                triangles, color, ..
            } => {
                for triangle in triangles {
                    let [a, b, c] = &triangle.points;
                    if let (Some(a), Some(b), Some(c)) = (
                        self.project(modelview, a),
                        self.project(modelview, b),
                        self.project(modelview, c),
                    ) {
                        self.draw_triangle([a, b, c], *color);
                    }
                }
            }
        }
    }
}

fn blend(under: Color, over: Color, alpha: f32) -> Color {
    Color::rgb(
        under.r + (over.r - under.r) * alpha,
        under.g + (over.g - under.g) * alpha,
        under.b + (over.b - under.b) * alpha,
    )
}

fn term_color(color: Color) -> TermColor {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    TermColor::Rgb {
        r: channel(color.r),
        g: channel(color.g),
        b: channel(color.b),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
