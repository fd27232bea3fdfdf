//! Event translation and the main loop.
//!
//! Crossterm key events are translated into the engine's key vocabulary
//! and offered to the grid first. Keys the engine ignores fall through to
//! the app chrome: view switching, row management, budget sync, quit.
//! While an editor is open, ignored character keys feed its buffer.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use metrado_core::{GridKey, KeyInput, KeyOutcome, Modifiers};
use ratatui::prelude::*;
use std::io;

use super::app::App;
use super::ui;

/// Map a crossterm key event onto the grid engine's vocabulary.
/// Returns `None` for keys the engine has no name for (PageUp, F-keys
/// other than F2, ...), which then only reach the chrome.
pub fn translate(key: KeyEvent) -> Option<KeyInput> {
    let mut mods = Modifiers {
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        // Cmd on macOS terminals that report it acts as the chord key.
        ctrl: key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER),
        alt: key.modifiers.contains(KeyModifiers::ALT),
    };
    let grid_key = match key.code {
        KeyCode::Char(c) => GridKey::Char(c),
        KeyCode::Up => GridKey::Up,
        KeyCode::Down => GridKey::Down,
        KeyCode::Left => GridKey::Left,
        KeyCode::Right => GridKey::Right,
        KeyCode::Tab => GridKey::Tab,
        // Crossterm reports Shift+Tab as its own code.
        KeyCode::BackTab => {
            mods.shift = true;
            GridKey::Tab
        }
        KeyCode::Enter => GridKey::Enter,
        KeyCode::Esc => GridKey::Escape,
        KeyCode::F(2) => GridKey::F2,
        KeyCode::Delete => GridKey::Delete,
        KeyCode::Backspace => GridKey::Backspace,
        _ => return None,
    };
    Some(KeyInput {
        key: grid_key,
        mods,
    })
}

/// Feed a key the engine ignored into the open editor's buffer.
fn handle_edit_text(app: &mut App, key: KeyEvent) {
    let Some(editor) = &mut app.ws.editor else {
        return;
    };
    match key.code {
        KeyCode::Char(c)
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
        {
            editor.buffer.push(c);
        }
        KeyCode::Backspace => {
            editor.buffer.pop();
        }
        _ => {}
    }
}

/// Chrome keys, only consulted when the grid engine ignored the event.
/// Returns true when the app should quit.
fn handle_chrome(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') if ctrl => return true,
        // Plain 'q' quits too, when no editable cell swallowed it.
        KeyCode::Char('q') if key.modifiers.is_empty() => return true,
        KeyCode::PageDown => app.vista_siguiente(),
        KeyCode::PageUp => app.vista_anterior(),
        KeyCode::Char('n') if ctrl => app.agregar_fila(),
        KeyCode::Char('d') if ctrl => app.quitar_fila(),
        KeyCode::Char('s') if ctrl => app.sincronizar(),
        KeyCode::Char('t') if ctrl => app.alternar_fuente(),
        _ => {}
    }
    false
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.refresh_dims();
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Only process key press events (Windows reports Press + Release)
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(input) = translate(key) {
                if app.grid.handle_key(&mut app.ws, input) == KeyOutcome::Handled {
                    continue;
                }
            }

            if app.grid.editing().is_some() {
                handle_edit_text(app, key);
            } else if handle_chrome(app, key) {
                return Ok(());
            }
        }
    }
}
