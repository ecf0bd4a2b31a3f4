/// Mouse and window events routed into camera and projection changes
use crate::camera::{DragMode, OrbitCamera, ZoomDirection};

/// Mouse buttons held during an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons {
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

impl Buttons {
    pub const NONE: Buttons = Buttons {
        left: false,
        middle: false,
        right: false,
    };
    pub const LEFT: Buttons = Buttons {
        left: true,
        ..Buttons::NONE
    };
    pub const MIDDLE: Buttons = Buttons {
        middle: true,
        ..Buttons::NONE
    };
    pub const RIGHT: Buttons = Buttons {
        right: true,
        ..Buttons::NONE
    };

    /// Left wins over middle; any other combination does not drag
    pub fn drag_mode(&self) -> Option<DragMode> {
        if self.left {
            Some(DragMode::Primary)
        } else if self.middle {
            Some(DragMode::Secondary)
        } else {
            None
        }
    }
}

/// Raw events from the host, in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Press { x: i32, y: i32, buttons: Buttons },
    Move { x: i32, y: i32, buttons: Buttons },
    /// Positive delta scrolls away from the user
    Scroll { delta: f32 },
    Resize { width: u32, height: u32 },
}

/// What the router asks of its owner after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ignored,
    Redraw,
    Resize { width: u32, height: u32 },
}

/// Tracks the last cursor position and turns events into camera updates
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    last: (i32, i32),
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_position(&self) -> (i32, i32) {
        self.last
    }

    pub fn route(&mut self, event: InputEvent, camera: &mut OrbitCamera) -> Response {
        match event {
            InputEvent::Press { x, y, .. } => {
                self.last = (x, y);
                Response::Ignored
            }
            InputEvent::Move { x, y, buttons } => {
                let dx = x.saturating_sub(self.last.0);
                let dy = y.saturating_sub(self.last.1);
                self.last = (x, y);

                match buttons.drag_mode() {
                    Some(mode) if camera.apply_drag(dx, dy, mode) => Response::Redraw,
                    _ => Response::Ignored,
                }
            }
            InputEvent::Scroll { delta } => {
                let direction = if delta > 0.0 {
                    ZoomDirection::Away
                } else {
                    ZoomDirection::Toward
                };
                if camera.apply_zoom(direction) {
                    Response::Redraw
                } else {
                    Response::Ignored
                }
            }
            InputEvent::Resize { width, height } => Response::Resize { width, height },
        }
    }
}
