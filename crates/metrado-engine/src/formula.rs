//! Formula resolution over the aggregate snapshot.
//!
//! A closed registry of named metrado formulas, not a formula language.
//! Static ids match exactly; per-floor ids have the shape
//! `<prefix>-<piso>`, where the floor key may itself contain hyphens
//! (`cieloraso-4to-piso`), so the prefix table is the authoritative split
//! point. Unknown ids and ids whose section or floor has not published
//! resolve to `None` - callers must be able to tell "unknown" apart from a
//! computed zero.

use crate::aggregates::SectionSnapshot;

/// A resolved metrado value plus its human-readable derivation trace.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaResult {
    /// Non-negative physical quantity in base units (m² or m³).
    pub value: f64,
    /// Derivation trace for display, never machine-parsed.
    pub detail: String,
}

impl FormulaResult {
    fn new(value: f64, detail: String) -> Self {
        Self {
            value: value.max(0.0),
            detail,
        }
    }
}

type StaticResolver = fn(&SectionSnapshot) -> Option<FormulaResult>;
type PisoResolver = fn(&SectionSnapshot, &str) -> Option<FormulaResult>;

/// Exact-match formula ids. Checked before the per-floor prefixes.
const ESTATICAS: &[(&str, StaticResolver)] = &[
    ("concreto-columnas", concreto_columnas),
    ("encofrado-columnas", encofrado_columnas),
    ("concreto-vigas", concreto_vigas),
    ("encofrado-vigas", encofrado_vigas),
    ("concreto-losa", concreto_losa),
    ("cieloraso", cieloraso),
    ("concreto-escalera", concreto_escalera),
    ("encofrado-escalera", encofrado_escalera),
    ("muros-total", muros_total),
];

/// Per-floor prefixes, in match order. Keep longer prefixes ahead of any
/// prefix they start with so the split point stays unambiguous.
const POR_PISO: &[(&str, PisoResolver)] = &[
    ("tarrajeo-vigas", tarrajeo_vigas_piso),
    ("ladrillo-muros", ladrillo_muros_piso),
    ("mortero-muros", mortero_muros_piso),
    ("cieloraso", cieloraso_piso),
    ("vigas", vigas_piso),
    ("muros", muros_piso),
];

/// Resolve a formula id against a snapshot.
pub fn resolve(id: &str, snapshot: &SectionSnapshot) -> Option<FormulaResult> {
    if let Some((_, resolver)) = ESTATICAS.iter().find(|(key, _)| *key == id) {
        return resolver(snapshot);
    }
    for (prefix, resolver) in POR_PISO {
        if let Some(piso) = id
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('-'))
        {
            if !piso.is_empty() {
                return resolver(snapshot, piso);
            }
        }
    }
    None
}

/// Exact-match ids known to the registry.
pub fn static_ids() -> impl Iterator<Item = &'static str> {
    ESTATICAS.iter().map(|(key, _)| *key)
}

/// Per-floor prefixes known to the registry.
pub fn piso_prefixes() -> impl Iterator<Item = &'static str> {
    POR_PISO.iter().map(|(prefix, _)| *prefix)
}

fn concreto_columnas(s: &SectionSnapshot) -> Option<FormulaResult> {
    let c = s.columnas.as_ref()?;
    Some(FormulaResult::new(
        c.vol_total,
        format!("columnas: vol. {:.2} m³", c.vol_total),
    ))
}

fn encofrado_columnas(s: &SectionSnapshot) -> Option<FormulaResult> {
    let c = s.columnas.as_ref()?;
    Some(FormulaResult::new(
        c.enc_total,
        format!("columnas: enc. {:.2} m²", c.enc_total),
    ))
}

fn concreto_vigas(s: &SectionSnapshot) -> Option<FormulaResult> {
    let v = s.vigas.as_ref()?;
    Some(FormulaResult::new(
        v.vol_total,
        format!("vigas: vol. {:.2} m³", v.vol_total),
    ))
}

fn encofrado_vigas(s: &SectionSnapshot) -> Option<FormulaResult> {
    let v = s.vigas.as_ref()?;
    Some(FormulaResult::new(
        v.enc_total,
        format!("vigas: enc. {:.2} m²", v.enc_total),
    ))
}

fn concreto_losa(s: &SectionSnapshot) -> Option<FormulaResult> {
    let l = s.losa.as_ref()?;
    Some(FormulaResult::new(
        l.vol_total,
        format!("losa: vol. {:.2} m³", l.vol_total),
    ))
}

fn cieloraso(s: &SectionSnapshot) -> Option<FormulaResult> {
    let l = s.losa.as_ref()?;
    Some(FormulaResult::new(
        l.area_total,
        format!("losa: área {:.2} m²", l.area_total),
    ))
}

fn concreto_escalera(s: &SectionSnapshot) -> Option<FormulaResult> {
    let e = s.escalera.as_ref()?;
    Some(FormulaResult::new(
        e.vol_total,
        format!("escalera: vol. {:.2} m³", e.vol_total),
    ))
}

fn encofrado_escalera(s: &SectionSnapshot) -> Option<FormulaResult> {
    let e = s.escalera.as_ref()?;
    Some(FormulaResult::new(
        e.enc_total,
        format!("escalera: enc. {:.2} m²", e.enc_total),
    ))
}

fn muros_total(s: &SectionSnapshot) -> Option<FormulaResult> {
    let m = s.muros.as_ref()?;
    let area = m.area_nueva_total();
    Some(FormulaResult::new(
        area,
        format!("muros ({} pisos): área nueva {:.2} m²", m.por_piso.len(), area),
    ))
}

fn vigas_piso(s: &SectionSnapshot, piso: &str) -> Option<FormulaResult> {
    let v = s.vigas.as_ref()?.por_piso.get(piso)?;
    Some(FormulaResult::new(
        v.vol_total,
        format!("vigas {piso}: vol. {:.2} m³", v.vol_total),
    ))
}

fn tarrajeo_vigas_piso(s: &SectionSnapshot, piso: &str) -> Option<FormulaResult> {
    let v = s.vigas.as_ref()?.por_piso.get(piso)?;
    Some(FormulaResult::new(
        v.enc_total,
        format!("vigas {piso}: enc. {:.2} m²", v.enc_total),
    ))
}

fn cieloraso_piso(s: &SectionSnapshot, piso: &str) -> Option<FormulaResult> {
    let l = s.losa.as_ref()?.por_piso.get(piso)?;
    Some(FormulaResult::new(
        l.area,
        format!("losa {piso}: área {:.2} m²", l.area),
    ))
}

fn muros_piso(s: &SectionSnapshot, piso: &str) -> Option<FormulaResult> {
    let m = s.muros.as_ref()?.por_piso.get(piso)?;
    Some(FormulaResult::new(
        m.area_nueva,
        format!("muros {piso}: área nueva {:.2} m²", m.area_nueva),
    ))
}

fn ladrillo_muros_piso(s: &SectionSnapshot, piso: &str) -> Option<FormulaResult> {
    let m = s.muros.as_ref()?.por_piso.get(piso)?;
    Some(FormulaResult::new(
        m.lad,
        format!("muros {piso}: {:.0} ladrillos", m.lad),
    ))
}

fn mortero_muros_piso(s: &SectionSnapshot, piso: &str) -> Option<FormulaResult> {
    let m = s.muros.as_ref()?.por_piso.get(piso)?;
    Some(FormulaResult::new(
        m.mort,
        format!("muros {piso}: mortero {:.2} m³", m.mort),
    ))
}
