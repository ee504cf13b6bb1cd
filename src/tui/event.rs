use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// The keys both pickers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKey {
    Up,
    Down,
    Toggle,
    Confirm,
    Cancel,
    Other,
}

impl PickerKey {
    pub fn from_key(code: KeyCode, modifiers: KeyModifiers) -> Self {
        match (code, modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Self::Cancel,
            (KeyCode::Esc, _) => Self::Cancel,
            (KeyCode::Up | KeyCode::Char('k'), _) => Self::Up,
            (KeyCode::Down | KeyCode::Char('j'), _) => Self::Down,
            (KeyCode::Char(' '), _) => Self::Toggle,
            (KeyCode::Enter, _) => Self::Confirm,
            _ => Self::Other,
        }
    }
}

/// Block until the next key press. Resize and mouse events are skipped; the
/// caller redraws on every iteration anyway.
pub fn next_key() -> anyhow::Result<PickerKey> {
    loop {
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        {
            if kind == KeyEventKind::Press {
                return Ok(PickerKey::from_key(code, modifiers));
            }
        }
    }
}
