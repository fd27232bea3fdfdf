//! UI rendering

use metrado_core::CellCoord;
use metrado_engine::SectionKey;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use super::app::{App, COL_METRADO, COLS_PRESUPUESTO, Vista};
use super::secciones::columnas_de;

pub(crate) const TAB_BAR_HEIGHT: u16 = 1;
pub(crate) const TABLE_MIN_HEIGHT: u16 = 8;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 2;

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TAB_BAR_HEIGHT),
            Constraint::Min(TABLE_MIN_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = split_main_chunks(f.area());

    draw_tabs(f, app, chunks[0]);
    match app.ws.vista {
        Vista::Seccion(seccion) => draw_seccion(f, app, chunks[1], seccion),
        Vista::Presupuesto => draw_presupuesto(f, app, chunks[1]),
    }
    draw_status(f, app, chunks[2]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for vista in Vista::ALL {
        let style = if vista == app.ws.vista {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", vista.titulo()), style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn estilo_celda(app: &App, cell: CellCoord) -> Style {
    if app.grid.editing() == Some(cell) {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if app.grid.selected() == Some(cell) {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// Text shown in one cell: the open editor's buffer with a cursor
/// marker, or the cell's value.
fn texto_celda(app: &App, cell: CellCoord, valor: String) -> String {
    match &app.ws.editor {
        Some(editor) if editor.cell == cell && app.grid.editing() == Some(cell) => {
            format!("{}│", editor.buffer)
        }
        _ => valor,
    }
}

fn fmt_decimales(app: &App, v: f64) -> String {
    format!("{:.prec$}", v, prec = app.ws.decimales)
}

fn draw_seccion(f: &mut Frame, app: &App, area: Rect, seccion: SectionKey) {
    let columnas = columnas_de(seccion);
    let secciones = app.ws.secciones.present();

    let header = Row::new(
        columnas
            .iter()
            .map(|c| Cell::from(c.titulo).style(Style::default().fg(Color::DarkGray))),
    )
    .height(1);

    let mut rows = Vec::new();
    for row in 0..secciones.filas(seccion) {
        let mut cells = Vec::new();
        for col in 0..columnas.len() {
            let coord = CellCoord::new(row, col);
            let valor = match secciones.texto(seccion, row, col) {
                Some(texto) => texto.to_string(),
                None => secciones
                    .valor(seccion, row, col)
                    .map(|v| fmt_decimales(app, v))
                    .unwrap_or_default(),
            };
            cells.push(Cell::from(texto_celda(app, coord, valor)).style(estilo_celda(app, coord)));
        }
        rows.push(Row::new(cells).height(1));
    }

    let widths: Vec<Constraint> = columnas
        .iter()
        .map(|c| {
            if c.editable {
                Constraint::Length(10)
            } else {
                Constraint::Length(16)
            }
        })
        .collect();

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", Vista::Seccion(seccion).titulo())),
    );
    f.render_widget(table, area);
}

fn draw_presupuesto(f: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.ws.snapshot();
    let presupuesto = app.ws.presupuesto.present();

    let header = Row::new(
        COLS_PRESUPUESTO
            .iter()
            .map(|t| Cell::from(*t).style(Style::default().fg(Color::DarkGray))),
    )
    .height(1);

    let mut rows = Vec::new();
    for (row, partida) in presupuesto.partidas.iter().enumerate() {
        let view = partida.metrado_view(&snapshot);
        let metrado = {
            let coord = CellCoord::new(row, COL_METRADO);
            let mut texto = texto_celda(app, coord, fmt_decimales(app, view.display));
            if view.stale && app.grid.editing() != Some(coord) {
                texto.push_str(" *");
            }
            texto
        };
        let calculo = match &view.live {
            Some(live) => fmt_decimales(app, live.value),
            None => "-".to_string(),
        };

        let textos = [
            partida.descripcion.clone(),
            partida.unidad.clone(),
            metrado,
            calculo,
            fmt_decimales(app, partida.costo_total()),
        ];
        let cells: Vec<Cell> = textos
            .into_iter()
            .enumerate()
            .map(|(col, texto)| {
                let coord = CellCoord::new(row, col);
                let mut style = estilo_celda(app, coord);
                if col == COL_METRADO && view.stale && style == Style::default() {
                    style = Style::default().fg(Color::Yellow);
                }
                Cell::from(texto).style(style)
            })
            .collect();
        rows.push(Row::new(cells).height(1));
    }

    let widths = [
        Constraint::Min(28),
        Constraint::Length(5),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(
                " Presupuesto | Total S/ {} ",
                fmt_decimales(app, presupuesto.costo_total())
            )),
    );
    f.render_widget(table, area);
}

/// Status line: an explicit message wins; otherwise context for the
/// selected budget line (derivation trace, drift, manual nota).
fn linea_estado(app: &App) -> String {
    if !app.ws.status.is_empty() {
        return app.ws.status.clone();
    }
    if app.ws.vista != Vista::Presupuesto {
        return String::new();
    }
    let Some(cell) = app.grid.selected() else {
        return String::new();
    };
    let Some(partida) = app.ws.presupuesto.present().partidas.get(cell.row) else {
        return String::new();
    };
    let view = partida.metrado_view(&app.ws.snapshot());

    let mut partes = Vec::new();
    if let Some(live) = &view.live {
        partes.push(live.detail.clone());
        if view.stale && (live.value - view.display).abs() > app.ws.tolerancia_sync {
            partes.push(format!(
                "desincronizado ({} almacenado), Ctrl+S sincroniza",
                fmt_decimales(app, view.display)
            ));
        }
    }
    if let Some(nota) = &view.nota {
        partes.push(format!("nota: {}", nota));
    }
    partes.join("  |  ")
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let hints = "PgUp/PgDn vista  Ctrl+N fila  Ctrl+D quitar  Ctrl+S sincronizar  \
                 Ctrl+T fuente  Ctrl+Z/Y deshacer  Ctrl+Q salir";
    let lines = vec![
        Line::from(linea_estado(app)),
        Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(Paragraph::new(lines), area);
}
