//! Aggregate totals published by each takeoff section.
//!
//! Each section (columnas, vigas, losa, escalera, muros) computes its own
//! totals locally and publishes one of these records wholesale. A snapshot
//! holds one optional slot per section; a slot stays `None` until the
//! section has published at least once, which is distinct from a section
//! that published zeros.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies one of the five takeoff sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKey {
    Columnas,
    Vigas,
    Losa,
    Escalera,
    Muros,
}

impl SectionKey {
    pub const ALL: [SectionKey; 5] = [
        SectionKey::Columnas,
        SectionKey::Vigas,
        SectionKey::Losa,
        SectionKey::Escalera,
        SectionKey::Muros,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Columnas => "columnas",
            SectionKey::Vigas => "vigas",
            SectionKey::Losa => "losa",
            SectionKey::Escalera => "escalera",
            SectionKey::Muros => "muros",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals for the columns section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnasResumen {
    /// Concrete volume (m³).
    pub vol_total: f64,
    /// Formwork area (m²).
    pub enc_total: f64,
}

/// Per-floor beam totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VigasPiso {
    /// Concrete volume (m³).
    pub vol_total: f64,
    /// Exposed-perimeter (formwork) area (m²).
    pub enc_total: f64,
}

/// Totals for the beams section, with an optional per-floor breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VigasResumen {
    pub vol_total: f64,
    pub enc_total: f64,
    pub por_piso: BTreeMap<String, VigasPiso>,
}

/// Per-floor slab totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LosaPiso {
    /// Slab area (m²), also the ceiling-plaster area of the floor below.
    pub area: f64,
    /// Concrete volume (m³).
    pub vol: f64,
}

/// Totals for the slab section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LosaResumen {
    pub area_total: f64,
    pub vol_total: f64,
    pub por_piso: BTreeMap<String, LosaPiso>,
}

/// Per-floor stair totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EscaleraPiso {
    pub vol: f64,
    pub enc: f64,
}

/// Totals for the stairs section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EscaleraResumen {
    pub vol_total: f64,
    pub enc_total: f64,
    pub por_piso: BTreeMap<String, EscaleraPiso>,
}

/// Per-floor masonry totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MurosPiso {
    /// Wall area before subtracting openings (m²).
    pub area_bruta: f64,
    /// New wall area, openings subtracted (m²).
    pub area_nueva: f64,
    /// Bricks (units).
    pub lad: f64,
    /// Mortar volume (m³).
    pub mort: f64,
    /// Cement (bags).
    pub cem: f64,
    /// Sand (m³).
    pub arena: f64,
}

/// Totals for the walls section, keyed by floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MurosResumen {
    pub por_piso: BTreeMap<String, MurosPiso>,
}

impl MurosResumen {
    /// New wall area summed over every floor (m²).
    pub fn area_nueva_total(&self) -> f64 {
        self.por_piso.values().map(|p| p.area_nueva).sum()
    }
}

/// A published aggregate, tagged by the section it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SectionAggregate {
    Columnas(ColumnasResumen),
    Vigas(VigasResumen),
    Losa(LosaResumen),
    Escalera(EscaleraResumen),
    Muros(MurosResumen),
}

impl SectionAggregate {
    pub fn key(&self) -> SectionKey {
        match self {
            SectionAggregate::Columnas(_) => SectionKey::Columnas,
            SectionAggregate::Vigas(_) => SectionKey::Vigas,
            SectionAggregate::Losa(_) => SectionKey::Losa,
            SectionAggregate::Escalera(_) => SectionKey::Escalera,
            SectionAggregate::Muros(_) => SectionKey::Muros,
        }
    }
}

/// One slot per section. `None` means "not yet published".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionSnapshot {
    pub columnas: Option<ColumnasResumen>,
    pub vigas: Option<VigasResumen>,
    pub losa: Option<LosaResumen>,
    pub escalera: Option<EscaleraResumen>,
    pub muros: Option<MurosResumen>,
}

impl SectionSnapshot {
    /// True when no section has published yet.
    pub fn is_empty(&self) -> bool {
        self.columnas.is_none()
            && self.vigas.is_none()
            && self.losa.is_none()
            && self.escalera.is_none()
            && self.muros.is_none()
    }

    pub(crate) fn set(&mut self, aggregate: SectionAggregate) {
        match aggregate {
            SectionAggregate::Columnas(r) => self.columnas = Some(r),
            SectionAggregate::Vigas(r) => self.vigas = Some(r),
            SectionAggregate::Losa(r) => self.losa = Some(r),
            SectionAggregate::Escalera(r) => self.escalera = Some(r),
            SectionAggregate::Muros(r) => self.muros = Some(r),
        }
    }

    pub(crate) fn clear(&mut self, section: SectionKey) {
        match section {
            SectionKey::Columnas => self.columnas = None,
            SectionKey::Vigas => self.vigas = None,
            SectionKey::Losa => self.losa = None,
            SectionKey::Escalera => self.escalera = None,
            SectionKey::Muros => self.muros = None,
        }
    }
}
