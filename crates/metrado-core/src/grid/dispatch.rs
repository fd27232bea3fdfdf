//! Keyboard dispatch: one flat state machine over the grid container's
//! key events.

use super::state::{CellCoord, Focus, GridHost, GridState};

/// Rendering-agnostic key vocabulary for the grid container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKey {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Tab,
    Enter,
    Escape,
    F2,
    Delete,
    Backspace,
}

/// Modifier state accompanying a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// One key press delivered to the grid container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: GridKey,
    pub mods: Modifiers,
}

impl KeyInput {
    pub fn plain(key: GridKey) -> Self {
        Self {
            key,
            mods: Modifiers::default(),
        }
    }

    pub fn shifted(key: GridKey) -> Self {
        Self {
            key,
            mods: Modifiers {
                shift: true,
                ..Default::default()
            },
        }
    }

    pub fn ctrl(key: GridKey) -> Self {
        Self {
            key,
            mods: Modifiers {
                ctrl: true,
                ..Default::default()
            },
        }
    }
}

/// Whether the engine consumed a key press. `Ignored` keys belong to the
/// host: while editing, everything except Tab/Enter/Escape is the
/// in-place editor's to handle.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

impl<H> GridState<H> {
    /// Translate one key press into selection/editing transitions.
    ///
    /// Undo/redo chords (Ctrl+Z, Ctrl+Y, Ctrl+Shift+Z) run first and
    /// short-circuit everything else. With no selection, all remaining
    /// keys are ignored; a selection left out of bounds by a layout
    /// shrink behaves the same.
    pub fn handle_key(&mut self, host: &mut impl GridHost, input: KeyInput) -> KeyOutcome {
        if input.mods.ctrl {
            if let GridKey::Char(c) = input.key {
                if c.eq_ignore_ascii_case(&'z') {
                    if input.mods.shift {
                        host.redo();
                    } else {
                        host.undo();
                    }
                    return KeyOutcome::Handled;
                }
                if c.eq_ignore_ascii_case(&'y') {
                    host.redo();
                    return KeyOutcome::Handled;
                }
            }
        }

        let Some(cell) = self.selected() else {
            return KeyOutcome::Ignored;
        };
        if !self.in_bounds(cell) {
            return KeyOutcome::Ignored;
        }

        match self.focus() {
            Focus::Editing { cell, .. } => self.key_while_editing(host, cell, input),
            _ => self.key_while_selected(host, cell, input),
        }
    }

    fn key_while_editing(
        &mut self,
        host: &mut impl GridHost,
        cell: CellCoord,
        input: KeyInput,
    ) -> KeyOutcome {
        match input.key {
            GridKey::Tab => {
                // Two-phase: the editor's commit lands before the next
                // cell opens.
                self.commit_editing(host);
                if let Some(next) = self.next_editable(host, cell, input.mods.shift) {
                    self.start_editing(host, next, None);
                }
                KeyOutcome::Handled
            }
            GridKey::Enter => {
                self.commit_editing(host);
                let down = CellCoord::new(cell.row + 1, cell.col);
                if self.in_bounds(down) {
                    self.set_focus(Focus::Selected(down));
                    self.focus_registered(host, down);
                }
                KeyOutcome::Handled
            }
            GridKey::Escape => {
                self.cancel_editing(host);
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn key_while_selected(
        &mut self,
        host: &mut impl GridHost,
        cell: CellCoord,
        input: KeyInput,
    ) -> KeyOutcome {
        match input.key {
            GridKey::Up | GridKey::Down | GridKey::Left | GridKey::Right => {
                if let Some(target) = self.step(cell, input.key) {
                    self.set_focus(Focus::Selected(target));
                    self.focus_registered(host, target);
                }
                KeyOutcome::Handled
            }
            GridKey::Tab => {
                if let Some(next) = self.next_editable(host, cell, input.mods.shift) {
                    self.set_focus(Focus::Selected(next));
                    self.focus_registered(host, next);
                }
                KeyOutcome::Handled
            }
            GridKey::Enter | GridKey::F2 => {
                self.start_editing(host, cell, None);
                KeyOutcome::Handled
            }
            GridKey::Escape => {
                self.set_focus(Focus::Idle);
                KeyOutcome::Handled
            }
            GridKey::Delete | GridKey::Backspace => {
                if host.is_editable(cell) {
                    host.clear_cell(cell);
                }
                KeyOutcome::Handled
            }
            GridKey::Char(c) if !input.mods.ctrl && !input.mods.alt && !c.is_control() => {
                if host.is_editable(cell) {
                    self.start_editing(host, cell, Some(c));
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::Ignored
                }
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// One-cell arrow step; `None` when the destination is out of range
    /// (no wrap).
    fn step(&self, from: CellCoord, key: GridKey) -> Option<CellCoord> {
        let target = match key {
            GridKey::Up => CellCoord::new(from.row.checked_sub(1)?, from.col),
            GridKey::Down => CellCoord::new(from.row + 1, from.col),
            GridKey::Left => CellCoord::new(from.row, from.col.checked_sub(1)?),
            GridKey::Right => CellCoord::new(from.row, from.col + 1),
            _ => return None,
        };
        self.in_bounds(target).then_some(target)
    }

    /// Next editable cell in row-major order, wrapping at row ends and
    /// around the grid. Scans every cell at most once, so the starting
    /// cell is returned only when it is the sole editable cell.
    fn next_editable(
        &self,
        host: &impl GridHost,
        from: CellCoord,
        backward: bool,
    ) -> Option<CellCoord> {
        let total = self.rows() * self.cols();
        if total == 0 {
            return None;
        }
        let mut index = from.row * self.cols() + from.col;
        for _ in 0..total {
            index = if backward {
                (index + total - 1) % total
            } else {
                (index + 1) % total
            };
            let cell = CellCoord::new(index / self.cols(), index % self.cols());
            if host.is_editable(cell) {
                return Some(cell);
            }
        }
        None
    }
}
