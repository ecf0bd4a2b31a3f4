/// Translation of crossterm events into viewer actions
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use stlview_core::{Buttons, DragMode, InputEvent};

/// Pixels of simulated mouse motion per rotation key press
pub const KEY_STEP: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Input(InputEvent),
    Rotate { dx: i32, dy: i32, mode: DragMode },
    Resize { columns: u16, rows: u16 },
    ResetView,
    Reload,
    Quit,
}

/// Keeps the set of held mouse buttons, since crossterm only reports the
/// button that changed
#[derive(Debug, Default)]
pub struct EventTranslator {
    held: Buttons,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Mouse(mouse) => self.mouse(mouse),
            Event::Key(key) => key_action(key),
            Event::Resize(columns, rows) => Some(Action::Resize { columns, rows }),
            _ => None,
        }
    }

    fn mouse(&mut self, event: MouseEvent) -> Option<Action> {
        // Two framebuffer pixels per cell row
        let x = i32::from(event.column);
        let y = i32::from(event.row) * 2;

        let input = match event.kind {
            MouseEventKind::Down(button) => {
                set_button(&mut self.held, button, true);
                InputEvent::Press {
                    x,
                    y,
                    buttons: self.held,
                }
            }
            MouseEventKind::Up(button) => {
                set_button(&mut self.held, button, false);
                return None;
            }
            MouseEventKind::Drag(button) => {
                set_button(&mut self.held, button, true);
                InputEvent::Move {
                    x,
                    y,
                    buttons: self.held,
                }
            }
            MouseEventKind::Moved => {
                self.held = Buttons::NONE;
                InputEvent::Move {
                    x,
                    y,
                    buttons: Buttons::NONE,
                }
            }
            MouseEventKind::ScrollUp => InputEvent::Scroll { delta: 1.0 },
            MouseEventKind::ScrollDown => InputEvent::Scroll { delta: -1.0 },
            _ => return None,
        };
        Some(Action::Input(input))
    }
}

fn set_button(buttons: &mut Buttons, button: MouseButton, down: bool) {
    match button {
        MouseButton::Left => buttons.left = down,
        MouseButton::Middle => buttons.middle = down,
        MouseButton::Right => buttons.right = down,
    }
}

fn key_action(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let rotate = |dx, dy, mode| Some(Action::Rotate { dx, dy, mode });
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('r') => Some(Action::Reload),
        KeyCode::Char('0') | KeyCode::Home => Some(Action::ResetView),
        KeyCode::Char('w') | KeyCode::Up => rotate(0, -KEY_STEP, DragMode::Primary),
        KeyCode::Char('s') | KeyCode::Down => rotate(0, KEY_STEP, DragMode::Primary),
        KeyCode::Char('a') | KeyCode::Left => rotate(-KEY_STEP, 0, DragMode::Primary),
        KeyCode::Char('d') | KeyCode::Right => rotate(KEY_STEP, 0, DragMode::Primary),
        KeyCode::Char('z') => rotate(-KEY_STEP, 0, DragMode::Secondary),
        KeyCode::Char('x') => rotate(KEY_STEP, 0, DragMode::Secondary),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            Some(Action::Input(InputEvent::Scroll { delta: 1.0 }))
        }
        KeyCode::Char('-') => Some(Action::Input(InputEvent::Scroll { delta: -1.0 })),
        _ => None,
    }
}
