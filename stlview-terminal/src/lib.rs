/// Terminal host for the STL viewer
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, stdout, Write};
use std::path::Path;
use std::time::Duration;
use stlview_core::{Axis, ConfigError, InputEvent, OpenError, Viewer, ViewerConfig};

pub mod events;
pub mod renderer;

pub use events::{Action, EventTranslator};
pub use renderer::TerminalRenderer;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// How long to wait for input before checking for a pending redraw
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    viewer: Viewer,
    renderer: TerminalRenderer,
    translator: EventTranslator,
    status: String,
    running: bool,
}

impl TerminalApp {
    pub fn new(config: &ViewerConfig) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        Ok(Self::with_size(config, columns, rows))
    }

    /// Build an app for a terminal of the given size without querying it
    pub fn with_size(config: &ViewerConfig, columns: u16, rows: u16) -> Self {
        let renderer = TerminalRenderer::new(columns as usize, rows as usize);
        let (width, height) = renderer.pixel_size();
        Self {
            viewer: Viewer::new(config, width, height),
            renderer,
            translator: EventTranslator::new(),
            status: "no file loaded".to_string(),
            running: true,
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn renderer(&self) -> &TerminalRenderer {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Open a mesh file. Failures are shown in the status line and returned;
    /// the previous scene stays on screen.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> std::result::Result<(), OpenError> {
        let result = self.viewer.open(path);
        self.report(result)
    }

    fn report(
        &mut self,
        result: std::result::Result<stlview_core::LoadSummary, OpenError>,
    ) -> std::result::Result<(), OpenError> {
        match result {
            Ok(summary) => {
                let name = summary
                    .path
                    .as_deref()
                    .and_then(Path::file_name)
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "<memory>".to_string());
                self.status = if summary.skipped > 0 {
                    format!(
                        "{}: {} triangles, {} skipped",
                        name, summary.triangles, summary.skipped
                    )
                } else {
                    format!("{}: {} triangles", name, summary.triangles)
                };
                Ok(())
            }
            Err(err) => {
                self.status = err.to_string();
                self.viewer.request_redraw();
                Err(err)
            }
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        if let Err(err) = execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        ) {
            restore_terminal();
            return Err(err);
        }

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            if self.viewer.needs_redraw() {
                self.render()?;
            }

            if event::poll(POLL_INTERVAL)? {
                if let Some(action) = self.translator.translate(event::read()?) {
                    self.apply(action);
                }
            }
        }

        Ok(())
    }

    /// Apply one translated action to the viewer
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Input(input) => {
                self.viewer.handle_event(input);
            }
            Action::Rotate { dx, dy, mode } => {
                self.viewer.rotate_by(dx, dy, mode);
            }
            Action::Resize { columns, rows } => {
                self.renderer.resize(columns as usize, rows as usize);
                let (width, height) = self.renderer.pixel_size();
                self.viewer.handle_event(InputEvent::Resize { width, height });
                // The framebuffer was reallocated even if the pixel size matches
                self.viewer.request_redraw();
            }
            Action::ResetView => {
                self.viewer.reset_view();
            }
            Action::Reload => match self.viewer.reload() {
                Some(result) => {
                    if let Err(err) = self.report(result) {
                        log::debug!("Reload failed, previous scene kept: {}", err);
                    }
                    self.viewer.request_redraw();
                }
                None => {
                    self.status = "nothing to reload".to_string();
                    self.viewer.request_redraw();
                }
            },
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.viewer.render(&mut self.renderer);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.present(&mut stdout)?;

        // Draw UI overlay
        let camera = self.viewer.camera();
        let orientation = camera.orientation();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetBackgroundColor(Color::Black),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "STLView | {} | rot {:.1}/{:.1}/{:.1} | scale {:.1} | Drag=Orbit Wheel=Zoom R=Reload 0=Reset Q=Quit",
                self.status,
                orientation.degrees(Axis::X),
                orientation.degrees(Axis::Y),
                orientation.degrees(Axis::Z),
                camera.scale(),
            )),
            terminal::Clear(ClearType::UntilNewLine),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Best-effort undo of a partial setup. The setup error is the one reported.
fn restore_terminal() {
    let _ = execute!(
        stdout(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show
    );
    let _ = terminal::disable_raw_mode();
}

#[cfg(test)]
mod tests {
    use super::*;
    use stlview_core::{Buttons, DragMode};

    fn app() -> TerminalApp {
        TerminalApp::with_size(&ViewerConfig::default(), 40, 20)
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert!(app.is_running());
        app.apply(Action::Quit);
        assert!(!app.is_running());
    }

    #[test]
    fn test_resize_updates_framebuffer_and_projection() {
        let mut app = app();
        app.apply(Action::Resize {
            columns: 60,
            rows: 10,
        });
        assert_eq!(app.renderer().pixel_size(), (60, 20));
        assert_eq!(app.viewer().projection().viewport.width, 60);
        assert!(app.viewer().needs_redraw());
    }

    #[test]
    fn test_drag_rotates_camera() {
        let mut app = app();
        let before = app.viewer().camera().rotation(Axis::Y);
        app.apply(Action::Input(InputEvent::Press {
            x: 0,
            y: 0,
            buttons: Buttons::LEFT,
        }));
        app.apply(Action::Input(InputEvent::Move {
            x: 2,
            y: 0,
            buttons: Buttons::LEFT,
        }));
        assert_eq!(app.viewer().camera().rotation(Axis::Y), before + 16);
    }

    #[test]
    fn test_key_rotation_and_reset() {
        let mut app = app();
        let start = app.viewer().camera().orientation();
        app.apply(Action::Rotate {
            dx: 0,
            dy: 1,
            mode: DragMode::Primary,
        });
        assert_ne!(app.viewer().camera().orientation(), start);
        app.apply(Action::ResetView);
        assert_eq!(app.viewer().camera().orientation(), start);
    }

    #[test]
    fn test_failed_open_is_reported() {
        let mut app = app();
        assert!(app.open("/nonexistent/missing.stl").is_err());
        assert!(app.status().contains("missing.stl"));
        assert_eq!(app.viewer().scene().triangle_count(), 0);
        // Grid and axes are still there to look at
        assert!(app.viewer().scene().commands().len() >= 4);
    }

    #[test]
    fn test_failed_reload_keeps_scene_and_reports() {
        let path = std::env::temp_dir().join(format!("stlview-terminal-{}.stl", std::process::id()));
        std::fs::write(
            &path,
            "vertex 0.0 0.0 0.0\nvertex 1.0 0.0 0.0\nvertex 0.0 1.0 0.0\n",
        )
        .unwrap();

        let mut app = app();
        app.open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        app.apply(Action::Reload);
        assert!(app.status().contains("cannot open"));
        assert_eq!(app.viewer().scene().triangle_count(), 1);
        assert!(app.viewer().needs_redraw());
    }

    #[test]
    fn test_restore_terminal_without_setup() {
        // Must be callable after any partial setup, including none at all
        restore_terminal();
        restore_terminal();
    }

    #[test]
    fn test_reload_without_file() {
        let mut app = app();
        app.apply(Action::Reload);
        assert_eq!(app.status(), "nothing to reload");
    }
}
