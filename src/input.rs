use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Down,
    Up,
    ToggleFull,
    Load,
    Update,
    Export,
    OpenInBrowser,
    CycleDays,
    CycleCategory,
    CycleLimit,
    None,
}

pub fn poll_action() -> anyhow::Result<Action> {
    if !event::poll(Duration::from_millis(50))? {
        return Ok(Action::None);
    }

    match event::read()? {
        Event::Key(key) if key.kind != KeyEventKind::Release => Ok(map_key(key)),
        _ => Ok(Action::None),
    }
}

fn map_key(KeyEvent { code, modifiers, .. }: KeyEvent) -> Action {
    match (code, modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Action::Quit,
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Action::Down,
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Action::Up,
        (KeyCode::Enter, _) => Action::ToggleFull,
        (KeyCode::Char('r'), _) => Action::Load,
        (KeyCode::Char('u'), _) => Action::Update,
        (KeyCode::Char('e'), _) => Action::Export,
        (KeyCode::Char('o'), _) => Action::OpenInBrowser,
        (KeyCode::Char('d'), _) => Action::CycleDays,
        (KeyCode::Char('c'), _) => Action::CycleCategory,
        (KeyCode::Char('l'), _) => Action::CycleLimit,
        _ => Action::None,
    }
}
