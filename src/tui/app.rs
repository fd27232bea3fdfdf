//! Application state and logic.
//!
//! [`App`] splits into the interaction cursor ([`GridState`]) and the
//! [`Workspace`] it dispatches against. The workspace owns the two
//! undo-wrapped documents (takeoff tables and budget), the aggregate
//! store, and the in-place edit buffer; it implements [`GridHost`] so the
//! grid engine drives edits through it without ever touching cell data
//! itself.

use metrado_core::{CellCoord, GridHost, GridState, History, Presupuesto};
use metrado_engine::{AggregateStore, SectionKey, SectionSnapshot};
use std::sync::Arc;

use super::secciones::{Secciones, columnas_de};
use crate::config::Config;

/// Which table the grid engine is currently driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vista {
    Seccion(SectionKey),
    Presupuesto,
}

impl Vista {
    pub const ALL: [Vista; 6] = [
        Vista::Seccion(SectionKey::Columnas),
        Vista::Seccion(SectionKey::Vigas),
        Vista::Seccion(SectionKey::Losa),
        Vista::Seccion(SectionKey::Escalera),
        Vista::Seccion(SectionKey::Muros),
        Vista::Presupuesto,
    ];

    pub fn titulo(&self) -> &'static str {
        match self {
            Vista::Seccion(SectionKey::Columnas) => "Columnas",
            Vista::Seccion(SectionKey::Vigas) => "Vigas",
            Vista::Seccion(SectionKey::Losa) => "Losa",
            Vista::Seccion(SectionKey::Escalera) => "Escalera",
            Vista::Seccion(SectionKey::Muros) => "Muros",
            Vista::Presupuesto => "Presupuesto",
        }
    }

    fn siguiente(&self) -> Vista {
        let i = Vista::ALL.iter().position(|v| v == self).unwrap_or(0);
        Vista::ALL[(i + 1) % Vista::ALL.len()]
    }

    fn anterior(&self) -> Vista {
        let i = Vista::ALL.iter().position(|v| v == self).unwrap_or(0);
        Vista::ALL[(i + Vista::ALL.len() - 1) % Vista::ALL.len()]
    }
}

/// Budget table column headers.
pub const COLS_PRESUPUESTO: &[&str] = &["Partida", "Und", "Metrado", "Cálculo", "Costo"];
/// Index of the metrado column, the only editable one in the budget view.
pub const COL_METRADO: usize = 2;

/// Open in-place editor: the cell it belongs to and its text buffer.
#[derive(Debug, Clone)]
pub struct Editor {
    pub cell: CellCoord,
    pub buffer: String,
}

/// Everything the grid engine dispatches against.
pub struct Workspace {
    pub vista: Vista,
    /// Takeoff tables, one undo timeline for all five sections.
    pub secciones: History<Secciones>,
    /// The budget document, its own undo timeline.
    pub presupuesto: History<Presupuesto>,
    pub store: AggregateStore,
    pub editor: Option<Editor>,
    pub status: String,
    pub decimales: usize,
    pub tolerancia_sync: f64,
    pub pisos: Vec<String>,
}

impl Workspace {
    fn seccion_activa(&self) -> Option<SectionKey> {
        match self.vista {
            Vista::Seccion(s) => Some(s),
            Vista::Presupuesto => None,
        }
    }

    /// Recompute and publish one section's aggregate from its current
    /// rows.
    pub fn publicar(&mut self, seccion: SectionKey) {
        let resumen = self.secciones.present().resumen(seccion);
        self.store.publish(resumen);
    }

    /// Publish every section, e.g. after undo/redo replaced the whole
    /// table set.
    pub fn publicar_todo(&mut self) {
        for seccion in SectionKey::ALL {
            self.publicar(seccion);
        }
    }

    pub fn snapshot(&self) -> Arc<SectionSnapshot> {
        self.store.snapshot()
    }

    /// Current value of a cell as editor text.
    fn valor_texto(&self, cell: CellCoord) -> String {
        match self.vista {
            Vista::Seccion(s) => self
                .secciones
                .present()
                .valor(s, cell.row, cell.col)
                .map(fmt_num)
                .unwrap_or_default(),
            Vista::Presupuesto => self
                .presupuesto
                .present()
                .partidas
                .get(cell.row)
                .map(|p| fmt_num(p.area_m2))
                .unwrap_or_default(),
        }
    }

    /// Write a committed numeric value through the undo-wrapped document
    /// that owns it, then republish the affected aggregate.
    fn aplicar_valor(&mut self, cell: CellCoord, valor: f64) {
        match self.vista {
            Vista::Seccion(s) => {
                self.secciones.set_with(|prev| {
                    let mut next = prev.clone();
                    next.set_valor(s, cell.row, cell.col, valor);
                    next
                });
                self.publicar(s);
            }
            Vista::Presupuesto => {
                self.presupuesto.set_with(|prev| {
                    let mut next = prev.clone();
                    if let Some(partida) = next.partidas.get_mut(cell.row) {
                        partida.area_m2 = valor;
                    }
                    next
                });
            }
        }
    }
}

impl GridHost for Workspace {
    fn is_editable(&self, cell: CellCoord) -> bool {
        match self.vista {
            Vista::Seccion(s) => self.secciones.present().editable(s, cell.row, cell.col),
            Vista::Presupuesto => {
                cell.col == COL_METRADO
                    && self
                        .presupuesto
                        .present()
                        .partidas
                        .get(cell.row)
                        .is_some_and(|p| p.metrado_view(&self.snapshot()).editable)
            }
        }
    }

    fn begin_edit(&mut self, cell: CellCoord, seed: Option<char>) {
        let buffer = match seed {
            // Typing replaces the prior value.
            Some(c) => c.to_string(),
            None => self.valor_texto(cell),
        };
        self.editor = Some(Editor { cell, buffer });
        self.status.clear();
    }

    fn commit_edit(&mut self, cell: CellCoord) {
        let Some(editor) = self.editor.take() else {
            return;
        };
        debug_assert_eq!(editor.cell, cell);
        match editor.buffer.trim().parse::<f64>() {
            Ok(valor) => self.aplicar_valor(cell, valor),
            Err(_) => {
                if !editor.buffer.trim().is_empty() {
                    self.status = format!("Valor inválido: {}", editor.buffer);
                }
            }
        }
    }

    fn cancel_edit(&mut self, _cell: CellCoord) {
        self.editor = None;
    }

    fn clear_cell(&mut self, cell: CellCoord) {
        self.aplicar_valor(cell, 0.0);
    }

    fn undo(&mut self) {
        let hubo = match self.vista {
            Vista::Seccion(_) => {
                let hubo = self.secciones.undo();
                if hubo {
                    self.publicar_todo();
                }
                hubo
            }
            Vista::Presupuesto => self.presupuesto.undo(),
        };
        self.status = if hubo {
            String::new()
        } else {
            "Nada que deshacer".to_string()
        };
    }

    fn redo(&mut self) {
        let hubo = match self.vista {
            Vista::Seccion(_) => {
                let hubo = self.secciones.redo();
                if hubo {
                    self.publicar_todo();
                }
                hubo
            }
            Vista::Presupuesto => self.presupuesto.redo(),
        };
        self.status = if hubo {
            String::new()
        } else {
            "Nada que rehacer".to_string()
        };
    }
}

/// Main application: the interaction cursor plus the workspace it drives.
///
/// The two live side by side so the engine can borrow them disjointly:
/// `grid.handle_key(&mut ws, ...)`.
pub struct App {
    pub grid: GridState,
    pub ws: Workspace,
}

impl App {
    pub fn new(config: Config) -> Self {
        let ws = Workspace {
            vista: Vista::Seccion(SectionKey::Columnas),
            secciones: History::new(Secciones::default()),
            presupuesto: History::new(Presupuesto::default()),
            store: AggregateStore::new(),
            editor: None,
            status: String::new(),
            decimales: config.decimales,
            tolerancia_sync: config.tolerancia_sync,
            pisos: config.pisos,
        };
        Self {
            grid: GridState::new(0, 0),
            ws,
        }
    }

    /// A small sample project so the wiring is visible on first run.
    pub fn demo(config: Config) -> Self {
        let mut app = Self::new(config);
        let pisos = app.ws.pisos.clone();

        let mut secciones = Secciones::default();
        for (nombre, n, lado, alto) in [("C-1", 4.0, 0.25, 2.6), ("C-2", 2.0, 0.30, 2.6)] {
            secciones.agregar_fila(SectionKey::Columnas, "");
            let fila = secciones.columnas.last_mut().unwrap();
            fila.descripcion = nombre.to_string();
            fila.n = n;
            fila.lado_a = lado;
            fila.lado_b = lado;
            fila.alto = alto;
        }
        for piso in &pisos {
            secciones.agregar_fila(SectionKey::Vigas, piso);
            let fila = secciones.vigas.last_mut().unwrap();
            fila.descripcion = "VP-101".to_string();
            fila.n = 2.0;
            fila.largo = 5.0;
            fila.ancho = 0.25;
            fila.alto = 0.40;

            secciones.agregar_fila(SectionKey::Losa, piso);
            let fila = secciones.losa.last_mut().unwrap();
            fila.descripcion = "Paño A".to_string();
            fila.largo = 6.0;
            fila.ancho = 5.0;
            fila.espesor = 0.20;

            secciones.agregar_fila(SectionKey::Muros, piso);
            let fila = secciones.muros.last_mut().unwrap();
            fila.descripcion = "Eje A".to_string();
            fila.largo = 8.0;
            fila.alto = 2.5;
            fila.vanos = 2.0;
        }
        if let Some(piso) = pisos.first() {
            secciones.agregar_fila(SectionKey::Escalera, piso);
            let fila = secciones.escalera.last_mut().unwrap();
            fila.descripcion = "Escalera 1".to_string();
            fila.pasos = 16.0;
            fila.ancho = 1.2;
            fila.garganta = 0.15;
        }

        // Hydration: demo data is the baseline, not an undoable edit.
        app.ws.secciones.reset(secciones);
        app.ws.presupuesto.reset(demo_presupuesto(&pisos));
        app.ws.publicar_todo();

        app.set_vista(Vista::Seccion(SectionKey::Columnas));
        app.grid.select_cell(&mut app.ws, CellCoord::new(0, 0));
        app
    }

    pub fn dims(&self) -> (usize, usize) {
        match self.ws.vista {
            Vista::Seccion(s) => (
                self.ws.secciones.present().filas(s),
                columnas_de(s).len(),
            ),
            Vista::Presupuesto => (
                self.ws.presupuesto.present().partidas.len(),
                COLS_PRESUPUESTO.len(),
            ),
        }
    }

    /// Keep the engine's bounds in step with the documents. Called once
    /// per event-loop tick; a selection left stale in between is
    /// tolerated by the engine.
    pub fn refresh_dims(&mut self) {
        let (rows, cols) = self.dims();
        self.grid.set_dimensions(rows, cols);
    }

    pub fn set_vista(&mut self, vista: Vista) {
        self.grid.deselect(&mut self.ws);
        self.ws.vista = vista;
        self.refresh_dims();
        self.grid.select_cell(&mut self.ws, CellCoord::new(0, 0));
    }

    pub fn vista_siguiente(&mut self) {
        self.set_vista(self.ws.vista.siguiente());
    }

    pub fn vista_anterior(&mut self) {
        self.set_vista(self.ws.vista.anterior());
    }

    /// Append a row to the active section, on the selected row's floor.
    pub fn agregar_fila(&mut self) {
        let Some(seccion) = self.ws.seccion_activa() else {
            return;
        };
        let piso = self
            .grid
            .selected()
            .and_then(|c| self.piso_de(seccion, c.row))
            .or_else(|| self.ws.pisos.first().cloned())
            .unwrap_or_default();
        self.ws.secciones.set_with(|prev| {
            let mut next = prev.clone();
            next.agregar_fila(seccion, &piso);
            next
        });
        self.ws.publicar(seccion);
        self.refresh_dims();
        let fila = self.ws.secciones.present().filas(seccion) - 1;
        self.grid.select_cell(&mut self.ws, CellCoord::new(fila, 0));
    }

    /// Remove the selected row of the active section.
    pub fn quitar_fila(&mut self) {
        let Some(seccion) = self.ws.seccion_activa() else {
            return;
        };
        let Some(cell) = self.grid.selected() else {
            return;
        };
        if cell.row >= self.ws.secciones.present().filas(seccion) {
            return;
        }
        self.ws.secciones.set_with(|prev| {
            let mut next = prev.clone();
            next.quitar_fila(seccion, cell.row);
            next
        });
        self.ws.publicar(seccion);
        self.refresh_dims();
    }

    fn piso_de(&self, seccion: SectionKey, row: usize) -> Option<String> {
        let secciones = self.ws.secciones.present();
        match seccion {
            SectionKey::Columnas => None,
            SectionKey::Vigas => secciones.vigas.get(row).map(|f| f.piso.clone()),
            SectionKey::Losa => secciones.losa.get(row).map(|f| f.piso.clone()),
            SectionKey::Escalera => secciones.escalera.get(row).map(|f| f.piso.clone()),
            SectionKey::Muros => secciones.muros.get(row).map(|f| f.piso.clone()),
        }
    }

    pub fn partida_seleccionada(&self) -> Option<&str> {
        if self.ws.vista != Vista::Presupuesto {
            return None;
        }
        let cell = self.grid.selected()?;
        self.ws
            .presupuesto
            .present()
            .partidas
            .get(cell.row)
            .map(|p| p.id.as_str())
    }

    /// Overwrite the selected line's stored metrado with the live value.
    pub fn sincronizar(&mut self) {
        let Some(id) = self.partida_seleccionada().map(str::to_string) else {
            return;
        };
        let snapshot = self.ws.snapshot();
        let mut next = self.ws.presupuesto.present().clone();
        match next.sync_partida(&id, &snapshot) {
            Ok(true) => {
                self.ws.presupuesto.set(next);
                self.ws.status = format!("Metrado de {} sincronizado", id);
            }
            Ok(false) => {
                self.ws.status = "Sin valor calculado o ya sincronizado".to_string();
            }
            Err(e) => {
                self.ws.status = e.to_string();
            }
        }
    }

    /// Flip the selected line between auto and manual sourcing.
    pub fn alternar_fuente(&mut self) {
        let Some(id) = self.partida_seleccionada().map(str::to_string) else {
            return;
        };
        let mut next = self.ws.presupuesto.present().clone();
        match next.toggle_source_partida(&id) {
            Ok(()) => {
                self.ws.presupuesto.set(next);
                self.ws.status.clear();
            }
            Err(e) => {
                self.ws.status = e.to_string();
            }
        }
    }
}

/// Minimal float formatting for the edit buffer: no trailing noise for
/// whole numbers.
pub fn fmt_num(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn demo_presupuesto(pisos: &[String]) -> Presupuesto {
    use metrado_core::{AreaSource, ItemPartida, Partida};

    let item = |descripcion: &str, unidad: &str, factor: Option<f64>, cantidad: f64, precio: f64| {
        ItemPartida {
            descripcion: descripcion.to_string(),
            unidad: unidad.to_string(),
            factor,
            cantidad,
            precio,
        }
    };

    let mut partidas = vec![
        Partida {
            id: "concreto-columnas".to_string(),
            descripcion: "Concreto f'c=210 en columnas".to_string(),
            unidad: "m³".to_string(),
            area_m2: 0.0,
            source: Some(AreaSource::auto()),
            items: vec![
                item("Cemento", "bol", Some(9.73), 0.0, 28.5),
                item("Arena gruesa", "m³", Some(0.54), 0.0, 45.0),
                item("Herramientas", "glb", None, 1.0, 80.0),
            ],
        },
        Partida {
            id: "encofrado-columnas".to_string(),
            descripcion: "Encofrado de columnas".to_string(),
            unidad: "m²".to_string(),
            area_m2: 0.0,
            source: Some(AreaSource::auto()),
            items: vec![item("Madera tornillo", "p2", Some(4.24), 0.0, 6.5)],
        },
        Partida {
            id: "concreto-vigas".to_string(),
            descripcion: "Concreto f'c=210 en vigas".to_string(),
            unidad: "m³".to_string(),
            area_m2: 0.0,
            source: Some(AreaSource::auto()),
            items: vec![item("Cemento", "bol", Some(9.73), 0.0, 28.5)],
        },
        Partida {
            id: "cieloraso".to_string(),
            descripcion: "Tarrajeo de cielorraso".to_string(),
            unidad: "m²".to_string(),
            area_m2: 0.0,
            source: Some(AreaSource::auto()),
            items: vec![item("Mezcla 1:5", "m³", Some(0.02), 0.0, 180.0)],
        },
        Partida {
            id: "muros-total".to_string(),
            descripcion: "Muros de ladrillo KK soga".to_string(),
            unidad: "m²".to_string(),
            area_m2: 0.0,
            source: Some(AreaSource::auto()),
            items: vec![
                item("Ladrillo KK", "und", Some(39.0), 0.0, 0.85),
                item("Mortero", "m³", Some(0.0195), 0.0, 210.0),
            ],
        },
        Partida {
            id: "pintura-interior".to_string(),
            descripcion: "Pintura látex interior".to_string(),
            unidad: "m²".to_string(),
            area_m2: 120.0,
            source: Some(AreaSource::manual()),
            items: vec![item("Pintura látex", "gal", Some(0.05), 6.0, 35.0)],
        },
    ];

    if let Some(piso) = pisos.last() {
        partidas.push(Partida {
            id: format!("tarrajeo-vigas-{}", piso),
            descripcion: format!("Tarrajeo de vigas {}", piso),
            unidad: "m²".to_string(),
            area_m2: 12.0,
            source: Some(AreaSource::hybrid("ajustado en obra")),
            items: vec![item("Mezcla 1:5", "m³", Some(0.025), 0.3, 180.0)],
        });
    }

    Presupuesto::new(partidas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrado_core::{GridKey, KeyInput, KeyOutcome};

    fn app() -> App {
        App::demo(Config::default())
    }

    fn press(app: &mut App, input: KeyInput) -> KeyOutcome {
        app.refresh_dims();
        app.grid.handle_key(&mut app.ws, input)
    }

    #[test]
    fn test_demo_publishes_all_sections() {
        let app = app();
        let snapshot = app.ws.snapshot();
        assert!(snapshot.columnas.is_some());
        assert!(snapshot.vigas.is_some());
        assert!(snapshot.losa.is_some());
        assert!(snapshot.escalera.is_some());
        assert!(snapshot.muros.is_some());
    }

    #[test]
    fn test_typed_edit_commits_through_history_and_republishes() {
        let mut app = app();
        app.set_vista(Vista::Seccion(SectionKey::Columnas));
        app.grid.select_cell(&mut app.ws, CellCoord::new(0, 1));

        let antes = app.ws.snapshot();
        assert_eq!(press(&mut app, KeyInput::plain(GridKey::Char('8'))), KeyOutcome::Handled);
        assert_eq!(app.ws.editor.as_ref().unwrap().buffer, "8");
        let _ = press(&mut app, KeyInput::plain(GridKey::Enter));

        assert_eq!(
            app.ws.secciones.present().valor(SectionKey::Columnas, 0, 1),
            Some(8.0)
        );
        assert!(app.ws.secciones.can_undo());
        // The aggregate was republished as a fresh snapshot.
        let despues = app.ws.snapshot();
        assert!(!Arc::ptr_eq(&antes, &despues));

        app.ws.undo();
        assert_eq!(
            app.ws.secciones.present().valor(SectionKey::Columnas, 0, 1),
            Some(4.0)
        );
    }

    #[test]
    fn test_escape_discards_edit() {
        let mut app = app();
        app.grid.select_cell(&mut app.ws, CellCoord::new(0, 1));
        let _ = press(&mut app, KeyInput::plain(GridKey::Char('9')));
        let _ = press(&mut app, KeyInput::plain(GridKey::Escape));

        assert!(app.ws.editor.is_none());
        assert!(!app.ws.secciones.can_undo());
        assert_eq!(
            app.ws.secciones.present().valor(SectionKey::Columnas, 0, 1),
            Some(4.0)
        );
    }

    #[test]
    fn test_invalid_buffer_does_not_become_undo_step() {
        let mut app = app();
        app.grid.select_cell(&mut app.ws, CellCoord::new(0, 1));
        app.grid.start_editing(&mut app.ws, CellCoord::new(0, 1), Some('x'));
        let _ = press(&mut app, KeyInput::plain(GridKey::Enter));

        assert!(!app.ws.secciones.can_undo());
        assert!(app.ws.status.contains("inválido"));
    }

    #[test]
    fn test_metrado_editable_follows_source() {
        let mut app = app();
        app.set_vista(Vista::Presupuesto);
        let doc = app.ws.presupuesto.present().clone();

        let manual = doc.partidas.iter().position(|p| p.id == "pintura-interior").unwrap();
        let auto = doc.partidas.iter().position(|p| p.id == "concreto-vigas").unwrap();

        assert!(app.ws.is_editable(CellCoord::new(manual, COL_METRADO)));
        assert!(!app.ws.is_editable(CellCoord::new(auto, COL_METRADO)));
        // Other budget columns never edit in place.
        assert!(!app.ws.is_editable(CellCoord::new(manual, 0)));
    }

    #[test]
    fn test_sincronizar_updates_selected_partida() {
        let mut app = app();
        app.set_vista(Vista::Presupuesto);
        let fila = app
            .ws
            .presupuesto
            .present()
            .partidas
            .iter()
            .position(|p| p.id == "concreto-vigas")
            .unwrap();
        app.grid.select_cell(&mut app.ws, CellCoord::new(fila, 0));

        app.sincronizar();

        let partida = app.ws.presupuesto.present().partida("concreto-vigas").unwrap();
        let live = metrado_engine::resolve("concreto-vigas", &app.ws.snapshot()).unwrap();
        assert!((partida.area_m2 - (live.value * 100.0).round() / 100.0).abs() < 1e-9);
        // Factor items followed the new metrado.
        assert!((partida.items[0].cantidad - 9.73 * partida.area_m2).abs() < 1e-9);
        assert!(app.ws.presupuesto.can_undo());
    }

    #[test]
    fn test_alternar_fuente_preserves_metrado() {
        let mut app = app();
        app.set_vista(Vista::Presupuesto);
        let fila = app
            .ws
            .presupuesto
            .present()
            .partidas
            .iter()
            .position(|p| p.id == "pintura-interior")
            .unwrap();
        app.grid.select_cell(&mut app.ws, CellCoord::new(fila, 0));

        app.alternar_fuente();
        let partida = app.ws.presupuesto.present().partida("pintura-interior").unwrap();
        assert_eq!(
            partida.source.as_ref().unwrap().kind,
            metrado_core::AreaSourceKind::Auto
        );
        assert_eq!(partida.area_m2, 120.0);
    }

    #[test]
    fn test_agregar_y_quitar_fila_resizes_grid() {
        let mut app = app();
        app.set_vista(Vista::Seccion(SectionKey::Escalera));
        let filas = app.ws.secciones.present().filas(SectionKey::Escalera);

        app.agregar_fila();
        assert_eq!(
            app.ws.secciones.present().filas(SectionKey::Escalera),
            filas + 1
        );
        // The new row is selected.
        assert_eq!(app.grid.selected(), Some(CellCoord::new(filas, 0)));

        app.quitar_fila();
        assert_eq!(app.ws.secciones.present().filas(SectionKey::Escalera), filas);
    }

    #[test]
    fn test_undo_chord_republishes_sections() {
        let mut app = app();
        app.set_vista(Vista::Seccion(SectionKey::Muros));
        app.grid.select_cell(&mut app.ws, CellCoord::new(0, 2));
        let _ = press(&mut app, KeyInput::plain(GridKey::Char('9')));
        let _ = press(&mut app, KeyInput::plain(GridKey::Enter));

        let editado = app.ws.snapshot().muros.clone();
        let _ = press(&mut app, KeyInput::ctrl(GridKey::Char('z')));
        let restaurado = app.ws.snapshot().muros.clone();
        assert_ne!(editado, restaurado);
    }

    #[test]
    fn test_vista_cycle_wraps() {
        let mut app = app();
        for _ in 0..Vista::ALL.len() {
            app.vista_siguiente();
        }
        assert_eq!(app.ws.vista, Vista::Seccion(SectionKey::Columnas));
        app.vista_anterior();
        assert_eq!(app.ws.vista, Vista::Presupuesto);
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(4.0), "4");
        assert_eq!(fmt_num(0.25), "0.25");
        assert_eq!(fmt_num(6.5), "6.5");
    }
}
