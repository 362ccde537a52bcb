use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::navigation::NavEvent;

const PAGE: isize = 10;

/// Viewer action bound to a key.
#[derive(Debug)]
pub enum ViewerCommand {
    Nav(NavEvent),
    ZoomIn,
    ZoomOut,
    ToggleGrid,
    ToggleLabels,
    Quit,
}

pub fn command_for_key(key: &KeyEvent) -> Option<ViewerCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(ViewerCommand::Quit);
    }

    let command = match key.code {
        KeyCode::Up | KeyCode::Char('k') => ViewerCommand::Nav(NavEvent::MoveCursor(-1)),
        KeyCode::Down | KeyCode::Char('j') => ViewerCommand::Nav(NavEvent::MoveCursor(1)),
        KeyCode::PageUp => ViewerCommand::Nav(NavEvent::MoveCursor(-PAGE)),
        KeyCode::PageDown => ViewerCommand::Nav(NavEvent::MoveCursor(PAGE)),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => ViewerCommand::Nav(NavEvent::Select),
        KeyCode::Left | KeyCode::Backspace | KeyCode::Esc | KeyCode::Char('h') => {
            ViewerCommand::Nav(NavEvent::Up)
        }
        KeyCode::Home | KeyCode::Char('H') => ViewerCommand::Nav(NavEvent::Home),
        KeyCode::F(5) | KeyCode::Char('r') => ViewerCommand::Nav(NavEvent::Refresh),
        KeyCode::Char('+') | KeyCode::Char('=') => ViewerCommand::ZoomIn,
        KeyCode::Char('-') => ViewerCommand::ZoomOut,
        KeyCode::Char('g') => ViewerCommand::ToggleGrid,
        KeyCode::Char('t') => ViewerCommand::ToggleLabels,
        KeyCode::Char('q') => ViewerCommand::Quit,
        _ => return None,
    };
    Some(command)
}
