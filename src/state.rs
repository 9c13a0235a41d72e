use crate::charts::Figure;
use crate::data::ResultsTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// What the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Chart,
    Table,
}

/// A figure that could not be built, with the reason.
#[derive(Debug, Clone)]
pub struct Failure {
    pub what: String,
    pub reason: String,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Figures built at startup.
    pub figures: Vec<Figure>,

    /// Figures that failed to build; the others are still shown.
    pub failures: Vec<Failure>,

    /// Index into `figures` of the figure drawn in the central panel.
    pub selected: Option<usize>,

    /// Results table opened from the File menu.
    pub table: Option<ResultsTable>,

    pub view: View,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(figures: Vec<Figure>, failures: Vec<Failure>) -> Self {
        let selected = if figures.is_empty() { None } else { Some(0) };
        Self {
            figures,
            failures,
            selected,
            table: None,
            view: View::Chart,
            status_message: None,
        }
    }

    pub fn selected_figure(&self) -> Option<&Figure> {
        self.selected.and_then(|i| self.figures.get(i))
    }

    pub fn select(&mut self, index: usize) {
        if index < self.figures.len() {
            self.selected = Some(index);
            self.view = View::Chart;
        }
    }

    /// Show a freshly loaded table in the central panel.
    pub fn set_table(&mut self, table: ResultsTable) {
        self.table = Some(table);
        self.view = View::Table;
        self.status_message = None;
    }
}
