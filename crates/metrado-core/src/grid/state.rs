//! Selection/editing state and transitions for one mounted grid.

use std::collections::HashMap;

/// One logical cell position. Zero-based, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Where the cursor is and whether an in-place editor is open.
///
/// `Editing` carries its cell, so an open editor without a selection is
/// unrepresentable; the editing cell is the selected cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Idle,
    Selected(CellCoord),
    Editing {
        cell: CellCoord,
        /// First character typed to enter edit mode, if editing started by
        /// typing. The host seeds its edit buffer with it (replacing the
        /// prior value); cleared on any transition out of this state.
        seed: Option<char>,
    },
}

impl Focus {
    pub fn selected(&self) -> Option<CellCoord> {
        match *self {
            Focus::Idle => None,
            Focus::Selected(cell) => Some(cell),
            Focus::Editing { cell, .. } => Some(cell),
        }
    }

    pub fn editing(&self) -> Option<CellCoord> {
        match *self {
            Focus::Editing { cell, .. } => Some(cell),
            _ => None,
        }
    }
}

/// Host-side effects the engine may trigger.
///
/// `commit_edit` must flush the host editor's buffer through the host's
/// own change handler before returning: the engine may open the next
/// cell's editor immediately afterwards (Tab), and the commit has to land
/// first. The engine itself never reads the edit buffer.
pub trait GridHost {
    /// Whether a cell accepts in-place editing.
    fn is_editable(&self, cell: CellCoord) -> bool;

    /// Open the in-place editor on a cell, optionally seeded with the
    /// typed character instead of the prior value.
    fn begin_edit(&mut self, cell: CellCoord, seed: Option<char>);

    /// Synchronously commit the open editor's buffer.
    fn commit_edit(&mut self, cell: CellCoord);

    /// Discard the open editor's buffer.
    fn cancel_edit(&mut self, cell: CellCoord);

    /// Reset a cell to zero without opening the editor
    /// (Delete/Backspace).
    fn clear_cell(&mut self, cell: CellCoord);

    /// Move host focus to a cell. Only invoked for cells with a
    /// registered handle.
    fn request_focus(&mut self, _cell: CellCoord) {}

    fn undo(&mut self) {}

    fn redo(&mut self) {}
}

/// Per-grid interaction state: dimensions, focus, and the registry of
/// host focus handles.
///
/// `rows`/`cols` are owned by the host layout and may shrink between
/// renders; a selection left out of bounds is tolerated (interactions
/// targeting it no-op) and is never cleared proactively - the host may
/// call [`GridState::deselect`] itself.
#[derive(Debug)]
pub struct GridState<H = ()> {
    rows: usize,
    cols: usize,
    focus: Focus,
    handles: HashMap<CellCoord, H>,
}

impl<H> GridState<H> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            focus: Focus::Idle,
            handles: HashMap::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Update bounds after the host layout changed (row added/removed).
    pub fn set_dimensions(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected(&self) -> Option<CellCoord> {
        self.focus.selected()
    }

    pub fn editing(&self) -> Option<CellCoord> {
        self.focus.editing()
    }

    /// Seed character of the current edit, if editing started by typing.
    pub fn initial_char(&self) -> Option<char> {
        match self.focus {
            Focus::Editing { seed, .. } => seed,
            _ => None,
        }
    }

    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Maintain the focus-handle registry. Called by the render layer on
    /// mount (`Some`) and unmount (`None`) of each cell's visual
    /// representation. Handles are only used to move host focus, never
    /// for commit logic.
    pub fn register_cell(&mut self, cell: CellCoord, handle: Option<H>) {
        match handle {
            Some(h) => {
                self.handles.insert(cell, h);
            }
            None => {
                self.handles.remove(&cell);
            }
        }
    }

    /// Registered focus handle for a cell, if any.
    pub fn handle(&self, cell: CellCoord) -> Option<&H> {
        self.handles.get(&cell)
    }

    /// Select a cell, closing any open editor (committing it, as a focus
    /// change would). Out-of-bounds coordinates are ignored.
    pub fn select_cell(&mut self, host: &mut impl GridHost, cell: CellCoord) {
        if !self.in_bounds(cell) {
            return;
        }
        self.close_editor(host);
        self.focus = Focus::Selected(cell);
        self.focus_registered(host, cell);
    }

    /// Open the editor on a cell. No-op when the cell is out of bounds or
    /// not editable.
    pub fn start_editing(&mut self, host: &mut impl GridHost, cell: CellCoord, seed: Option<char>) {
        if !self.in_bounds(cell) || !host.is_editable(cell) {
            return;
        }
        if self.focus.editing() == Some(cell) {
            return;
        }
        self.close_editor(host);
        if self.focus.selected() != Some(cell) {
            self.focus_registered(host, cell);
        }
        self.focus = Focus::Editing { cell, seed };
        host.begin_edit(cell, seed);
    }

    /// Commit the open editor and fall back to Selected at the same cell.
    pub fn commit_editing(&mut self, host: &mut impl GridHost) {
        if let Focus::Editing { cell, .. } = self.focus {
            host.commit_edit(cell);
            self.focus = Focus::Selected(cell);
        }
    }

    /// Discard the open editor and fall back to Selected at the same
    /// cell.
    pub fn cancel_editing(&mut self, host: &mut impl GridHost) {
        if let Focus::Editing { cell, .. } = self.focus {
            host.cancel_edit(cell);
            self.focus = Focus::Selected(cell);
        }
    }

    /// Drop selection entirely, committing any open editor first.
    pub fn deselect(&mut self, host: &mut impl GridHost) {
        self.close_editor(host);
        self.focus = Focus::Idle;
    }

    fn close_editor(&mut self, host: &mut impl GridHost) {
        if let Focus::Editing { cell, .. } = self.focus {
            host.commit_edit(cell);
            self.focus = Focus::Selected(cell);
        }
    }

    pub(super) fn focus_registered(&self, host: &mut impl GridHost, cell: CellCoord) {
        if self.handles.contains_key(&cell) {
            host.request_focus(cell);
        }
    }

    pub(super) fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }
}
