//! Budget lines and their metrado source reconciliation.

use metrado_engine::formula::{self, FormulaResult};
use metrado_engine::SectionSnapshot;
use serde::{Deserialize, Serialize};

/// Live and stored metrado are considered in sync within this margin.
pub const DRIFT_TOLERANCE: f64 = 0.01;

/// How a line's metrado is sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaSourceKind {
    /// Derived from the formula registry; synced on request.
    Auto,
    /// Entered by hand; formula resolution never touches it.
    Manual,
    /// Manual override shown alongside the live reference value.
    Hybrid,
}

/// Metrado source descriptor for one budget line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSource {
    pub kind: AreaSourceKind,
    pub nota: Option<String>,
}

impl AreaSource {
    pub fn auto() -> Self {
        Self {
            kind: AreaSourceKind::Auto,
            nota: None,
        }
    }

    pub fn manual() -> Self {
        Self {
            kind: AreaSourceKind::Manual,
            nota: None,
        }
    }

    pub fn hybrid(nota: impl Into<String>) -> Self {
        Self {
            kind: AreaSourceKind::Hybrid,
            nota: Some(nota.into()),
        }
    }
}

/// One resource row under a budget line.
///
/// Items with a `factor` are defined as `cantidad = factor × metrado` and
/// are recomputed when the line's metrado is synced; items without one
/// hold a hand-entered quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPartida {
    pub descripcion: String,
    pub unidad: String,
    pub factor: Option<f64>,
    pub cantidad: f64,
    pub precio: f64,
}

impl ItemPartida {
    pub fn costo(&self) -> f64 {
        self.cantidad * self.precio
    }
}

/// One budget line. The `id` doubles as its formula id in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partida {
    pub id: String,
    pub descripcion: String,
    pub unidad: String,
    /// Stored metrado (m² or m³ depending on `unidad`).
    pub area_m2: f64,
    pub source: Option<AreaSource>,
    pub items: Vec<ItemPartida>,
}

/// Read model for rendering a line's metrado cell.
#[derive(Debug, Clone, PartialEq)]
pub struct MetradoView {
    /// The value shown: always the stored one.
    pub display: f64,
    /// Live formula result, when one resolves. Not consulted for manual
    /// lines.
    pub live: Option<FormulaResult>,
    /// True when the live value drifted from the stored one beyond
    /// [`DRIFT_TOLERANCE`]; the UI offers a one-click sync.
    pub stale: bool,
    /// Whether the metrado cell accepts direct edits.
    pub editable: bool,
    pub nota: Option<String>,
}

impl Partida {
    fn kind(&self) -> AreaSourceKind {
        // A line that never got a source descriptor behaves as auto.
        self.source
            .as_ref()
            .map_or(AreaSourceKind::Auto, |s| s.kind)
    }

    fn nota(&self) -> Option<String> {
        self.source.as_ref().and_then(|s| s.nota.clone())
    }

    /// Compute the reconciliation read model against a snapshot.
    pub fn metrado_view(&self, snapshot: &SectionSnapshot) -> MetradoView {
        match self.kind() {
            AreaSourceKind::Manual => MetradoView {
                display: self.area_m2,
                live: None,
                stale: false,
                editable: true,
                nota: self.nota(),
            },
            kind => {
                let live = formula::resolve(&self.id, snapshot);
                let stale = live
                    .as_ref()
                    .is_some_and(|l| (l.value - self.area_m2).abs() > DRIFT_TOLERANCE);
                MetradoView {
                    display: self.area_m2,
                    live,
                    stale,
                    editable: kind == AreaSourceKind::Hybrid,
                    nota: self.nota(),
                }
            }
        }
    }

    /// Overwrite the stored metrado with the live formula value, rounded
    /// to 2 decimals, and recompute every factor-defined item quantity.
    ///
    /// This is an explicit user action, so it applies to manual lines
    /// too. Returns false when no live value resolves or nothing changed.
    pub fn sync(&mut self, snapshot: &SectionSnapshot) -> bool {
        let Some(live) = formula::resolve(&self.id, snapshot) else {
            return false;
        };
        let nuevo = round2(live.value);
        if (nuevo - self.area_m2).abs() < f64::EPSILON {
            return false;
        }
        self.area_m2 = nuevo;
        for item in &mut self.items {
            if let Some(factor) = item.factor {
                item.cantidad = factor * nuevo;
            }
        }
        true
    }

    /// Flip between auto and manual sourcing, keeping the stored metrado.
    /// A line with no source yet gains a manual source with value 0.
    pub fn toggle_source(&mut self) {
        match &mut self.source {
            None => {
                self.source = Some(AreaSource::manual());
                self.area_m2 = 0.0;
            }
            Some(source) => {
                source.kind = match source.kind {
                    AreaSourceKind::Manual => AreaSourceKind::Auto,
                    AreaSourceKind::Auto | AreaSourceKind::Hybrid => AreaSourceKind::Manual,
                };
            }
        }
    }

    pub fn costo_total(&self) -> f64 {
        self.items.iter().map(ItemPartida::costo).sum()
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrado_engine::{VigasPiso, VigasResumen};
    use std::collections::BTreeMap;

    fn partida_vigas(area: f64, source: Option<AreaSource>) -> Partida {
        Partida {
            id: "concreto-vigas".to_string(),
            descripcion: "Concreto f'c=210 en vigas".to_string(),
            unidad: "m³".to_string(),
            area_m2: area,
            source,
            items: vec![
                ItemPartida {
                    descripcion: "Cemento".to_string(),
                    unidad: "bol".to_string(),
                    factor: Some(9.73),
                    cantidad: 97.3,
                    precio: 28.5,
                },
                ItemPartida {
                    descripcion: "Herramientas".to_string(),
                    unidad: "glb".to_string(),
                    factor: None,
                    cantidad: 1.0,
                    precio: 150.0,
                },
            ],
        }
    }

    fn snapshot_con_vigas(vol_total: f64) -> SectionSnapshot {
        SectionSnapshot {
            vigas: Some(VigasResumen {
                vol_total,
                enc_total: 0.0,
                por_piso: BTreeMap::<String, VigasPiso>::new(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_sync_cascades_into_factor_items() {
        let mut partida = partida_vigas(10.0, Some(AreaSource::auto()));
        let snapshot = snapshot_con_vigas(12.0);

        assert!(partida.sync(&snapshot));
        assert_eq!(partida.area_m2, 12.0);
        assert_eq!(partida.items[0].cantidad, 9.73 * 12.0);
        // Items without a factor keep their hand-entered quantity.
        assert_eq!(partida.items[1].cantidad, 1.0);
    }

    #[test]
    fn test_sync_rounds_to_two_decimals() {
        let mut partida = partida_vigas(0.0, Some(AreaSource::auto()));
        let snapshot = snapshot_con_vigas(7.128_4);

        assert!(partida.sync(&snapshot));
        assert_eq!(partida.area_m2, 7.13);
    }

    #[test]
    fn test_sync_without_live_value_is_noop() {
        let mut partida = partida_vigas(10.0, Some(AreaSource::auto()));
        let empty = SectionSnapshot::default();

        assert!(!partida.sync(&empty));
        assert_eq!(partida.area_m2, 10.0);
        assert_eq!(partida.items[0].cantidad, 97.3);
    }

    #[test]
    fn test_manual_view_skips_formula() {
        let partida = partida_vigas(10.0, Some(AreaSource::manual()));
        let snapshot = snapshot_con_vigas(12.0);

        let view = partida.metrado_view(&snapshot);
        assert_eq!(view.display, 10.0);
        assert!(view.live.is_none());
        assert!(!view.stale);
        assert!(view.editable);
    }

    #[test]
    fn test_auto_view_flags_drift() {
        let partida = partida_vigas(10.0, Some(AreaSource::auto()));

        let view = partida.metrado_view(&snapshot_con_vigas(12.0));
        assert_eq!(view.display, 10.0);
        assert_eq!(view.live.as_ref().unwrap().value, 12.0);
        assert!(view.stale);
        assert!(!view.editable);

        // Within tolerance is not stale.
        let view = partida.metrado_view(&snapshot_con_vigas(10.01));
        assert!(!view.stale);
    }

    #[test]
    fn test_auto_view_without_data_has_no_live_value() {
        let partida = partida_vigas(10.0, Some(AreaSource::auto()));
        let view = partida.metrado_view(&SectionSnapshot::default());
        assert!(view.live.is_none());
        assert!(!view.stale);
    }

    #[test]
    fn test_hybrid_view_keeps_nota_and_live() {
        let partida = partida_vigas(10.0, Some(AreaSource::hybrid("ajustado en obra")));
        let view = partida.metrado_view(&snapshot_con_vigas(12.0));
        assert_eq!(view.nota.as_deref(), Some("ajustado en obra"));
        assert!(view.live.is_some());
        assert!(view.stale);
        assert!(view.editable);
    }

    #[test]
    fn test_toggle_preserves_area() {
        let mut partida = partida_vigas(10.0, Some(AreaSource::auto()));
        partida.toggle_source();
        assert_eq!(partida.source.as_ref().unwrap().kind, AreaSourceKind::Manual);
        assert_eq!(partida.area_m2, 10.0);

        partida.toggle_source();
        assert_eq!(partida.source.as_ref().unwrap().kind, AreaSourceKind::Auto);
        assert_eq!(partida.area_m2, 10.0);
    }

    #[test]
    fn test_toggle_without_source_creates_manual_zero() {
        let mut partida = partida_vigas(10.0, None);
        partida.toggle_source();
        assert_eq!(partida.source.as_ref().unwrap().kind, AreaSourceKind::Manual);
        assert_eq!(partida.area_m2, 0.0);
    }

    #[test]
    fn test_hybrid_toggles_to_manual() {
        let mut partida = partida_vigas(10.0, Some(AreaSource::hybrid("nota")));
        partida.toggle_source();
        assert_eq!(partida.source.as_ref().unwrap().kind, AreaSourceKind::Manual);
    }

    #[test]
    fn test_costo_total() {
        let partida = partida_vigas(10.0, None);
        let esperado = 97.3 * 28.5 + 150.0;
        assert!((partida.costo_total() - esperado).abs() < 1e-9);
    }
}
