//! Section tables: per-element takeoff rows and the aggregates they
//! publish.
//!
//! Each table computes its own totals locally; the app republishes the
//! section's aggregate after every committed edit.

use metrado_engine::{
    ColumnasResumen, EscaleraResumen, LosaResumen, MurosPiso, MurosResumen, SectionAggregate,
    SectionKey, VigasResumen,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnaFila {
    pub descripcion: String,
    pub n: f64,
    pub lado_a: f64,
    pub lado_b: f64,
    pub alto: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VigaFila {
    pub piso: String,
    pub descripcion: String,
    pub n: f64,
    pub largo: f64,
    pub ancho: f64,
    pub alto: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LosaFila {
    pub piso: String,
    pub descripcion: String,
    pub largo: f64,
    pub ancho: f64,
    pub espesor: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EscaleraFila {
    pub piso: String,
    pub descripcion: String,
    pub pasos: f64,
    pub ancho: f64,
    pub garganta: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MuroFila {
    pub piso: String,
    pub descripcion: String,
    pub largo: f64,
    pub alto: f64,
    /// Openings area subtracted from the gross wall (m²).
    pub vanos: f64,
}

/// One column of a section table.
#[derive(Debug, Clone, Copy)]
pub struct Columna {
    pub titulo: &'static str,
    pub editable: bool,
}

const fn texto(titulo: &'static str) -> Columna {
    Columna {
        titulo,
        editable: false,
    }
}

const fn numero(titulo: &'static str) -> Columna {
    Columna {
        titulo,
        editable: true,
    }
}

const COLS_COLUMNAS: &[Columna] = &[
    texto("Descripción"),
    numero("N"),
    numero("Lado A"),
    numero("Lado B"),
    numero("Alto"),
];

const COLS_VIGAS: &[Columna] = &[
    texto("Piso"),
    texto("Descripción"),
    numero("N"),
    numero("Largo"),
    numero("Ancho"),
    numero("Alto"),
];

const COLS_LOSA: &[Columna] = &[
    texto("Piso"),
    texto("Descripción"),
    numero("Largo"),
    numero("Ancho"),
    numero("Espesor"),
];

const COLS_ESCALERA: &[Columna] = &[
    texto("Piso"),
    texto("Descripción"),
    numero("Pasos"),
    numero("Ancho"),
    numero("Garganta"),
];

const COLS_MUROS: &[Columna] = &[
    texto("Piso"),
    texto("Descripción"),
    numero("Largo"),
    numero("Alto"),
    numero("Vanos"),
];

/// Column layout for a section's table.
pub fn columnas_de(seccion: SectionKey) -> &'static [Columna] {
    match seccion {
        SectionKey::Columnas => COLS_COLUMNAS,
        SectionKey::Vigas => COLS_VIGAS,
        SectionKey::Losa => COLS_LOSA,
        SectionKey::Escalera => COLS_ESCALERA,
        SectionKey::Muros => COLS_MUROS,
    }
}

/// Bricks per m² of wall and mortar volume per m², standard soga bond.
const LAD_POR_M2: f64 = 39.0;
const MORT_POR_M2: f64 = 0.0195;
/// Cement bags and sand volume per m³ of mortar.
const CEM_POR_M3: f64 = 8.4;
const ARENA_POR_M3: f64 = 1.05;

/// All five takeoff tables. Wrapped in a `History` by the app so section
/// edits undo independently from budget edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Secciones {
    pub columnas: Vec<ColumnaFila>,
    pub vigas: Vec<VigaFila>,
    pub losa: Vec<LosaFila>,
    pub escalera: Vec<EscaleraFila>,
    pub muros: Vec<MuroFila>,
}

impl Secciones {
    pub fn filas(&self, seccion: SectionKey) -> usize {
        match seccion {
            SectionKey::Columnas => self.columnas.len(),
            SectionKey::Vigas => self.vigas.len(),
            SectionKey::Losa => self.losa.len(),
            SectionKey::Escalera => self.escalera.len(),
            SectionKey::Muros => self.muros.len(),
        }
    }

    pub fn editable(&self, seccion: SectionKey, row: usize, col: usize) -> bool {
        let columnas = columnas_de(seccion);
        row < self.filas(seccion) && col < columnas.len() && columnas[col].editable
    }

    /// Text of a read-only column, if `(row, col)` is one.
    pub fn texto(&self, seccion: SectionKey, row: usize, col: usize) -> Option<&str> {
        match seccion {
            SectionKey::Columnas => {
                let fila = self.columnas.get(row)?;
                (col == 0).then_some(fila.descripcion.as_str())
            }
            SectionKey::Vigas => {
                let fila = self.vigas.get(row)?;
                match col {
                    0 => Some(fila.piso.as_str()),
                    1 => Some(fila.descripcion.as_str()),
                    _ => None,
                }
            }
            SectionKey::Losa => {
                let fila = self.losa.get(row)?;
                match col {
                    0 => Some(fila.piso.as_str()),
                    1 => Some(fila.descripcion.as_str()),
                    _ => None,
                }
            }
            SectionKey::Escalera => {
                let fila = self.escalera.get(row)?;
                match col {
                    0 => Some(fila.piso.as_str()),
                    1 => Some(fila.descripcion.as_str()),
                    _ => None,
                }
            }
            SectionKey::Muros => {
                let fila = self.muros.get(row)?;
                match col {
                    0 => Some(fila.piso.as_str()),
                    1 => Some(fila.descripcion.as_str()),
                    _ => None,
                }
            }
        }
    }

    /// Numeric value of an editable column, if `(row, col)` is one.
    pub fn valor(&self, seccion: SectionKey, row: usize, col: usize) -> Option<f64> {
        match seccion {
            SectionKey::Columnas => {
                let fila = self.columnas.get(row)?;
                match col {
                    1 => Some(fila.n),
                    2 => Some(fila.lado_a),
                    3 => Some(fila.lado_b),
                    4 => Some(fila.alto),
                    _ => None,
                }
            }
            SectionKey::Vigas => {
                let fila = self.vigas.get(row)?;
                match col {
                    2 => Some(fila.n),
                    3 => Some(fila.largo),
                    4 => Some(fila.ancho),
                    5 => Some(fila.alto),
                    _ => None,
                }
            }
            SectionKey::Losa => {
                let fila = self.losa.get(row)?;
                match col {
                    2 => Some(fila.largo),
                    3 => Some(fila.ancho),
                    4 => Some(fila.espesor),
                    _ => None,
                }
            }
            SectionKey::Escalera => {
                let fila = self.escalera.get(row)?;
                match col {
                    2 => Some(fila.pasos),
                    3 => Some(fila.ancho),
                    4 => Some(fila.garganta),
                    _ => None,
                }
            }
            SectionKey::Muros => {
                let fila = self.muros.get(row)?;
                match col {
                    2 => Some(fila.largo),
                    3 => Some(fila.alto),
                    4 => Some(fila.vanos),
                    _ => None,
                }
            }
        }
    }

    /// Write an editable cell. Returns false when `(row, col)` is not
    /// editable.
    pub fn set_valor(&mut self, seccion: SectionKey, row: usize, col: usize, valor: f64) -> bool {
        match seccion {
            SectionKey::Columnas => {
                let Some(fila) = self.columnas.get_mut(row) else {
                    return false;
                };
                match col {
                    1 => fila.n = valor,
                    2 => fila.lado_a = valor,
                    3 => fila.lado_b = valor,
                    4 => fila.alto = valor,
                    _ => return false,
                }
            }
            SectionKey::Vigas => {
                let Some(fila) = self.vigas.get_mut(row) else {
                    return false;
                };
                match col {
                    2 => fila.n = valor,
                    3 => fila.largo = valor,
                    4 => fila.ancho = valor,
                    5 => fila.alto = valor,
                    _ => return false,
                }
            }
            SectionKey::Losa => {
                let Some(fila) = self.losa.get_mut(row) else {
                    return false;
                };
                match col {
                    2 => fila.largo = valor,
                    3 => fila.ancho = valor,
                    4 => fila.espesor = valor,
                    _ => return false,
                }
            }
            SectionKey::Escalera => {
                let Some(fila) = self.escalera.get_mut(row) else {
                    return false;
                };
                match col {
                    2 => fila.pasos = valor,
                    3 => fila.ancho = valor,
                    4 => fila.garganta = valor,
                    _ => return false,
                }
            }
            SectionKey::Muros => {
                let Some(fila) = self.muros.get_mut(row) else {
                    return false;
                };
                match col {
                    2 => fila.largo = valor,
                    3 => fila.alto = valor,
                    4 => fila.vanos = valor,
                    _ => return false,
                }
            }
        }
        true
    }

    /// Append an empty row on the given floor.
    pub fn agregar_fila(&mut self, seccion: SectionKey, piso: &str) {
        let piso = piso.to_string();
        let descripcion = String::new();
        match seccion {
            SectionKey::Columnas => self.columnas.push(ColumnaFila {
                descripcion,
                n: 1.0,
                lado_a: 0.0,
                lado_b: 0.0,
                alto: 0.0,
            }),
            SectionKey::Vigas => self.vigas.push(VigaFila {
                piso,
                descripcion,
                n: 1.0,
                largo: 0.0,
                ancho: 0.0,
                alto: 0.0,
            }),
            SectionKey::Losa => self.losa.push(LosaFila {
                piso,
                descripcion,
                largo: 0.0,
                ancho: 0.0,
                espesor: 0.0,
            }),
            SectionKey::Escalera => self.escalera.push(EscaleraFila {
                piso,
                descripcion,
                pasos: 0.0,
                ancho: 0.0,
                garganta: 0.0,
            }),
            SectionKey::Muros => self.muros.push(MuroFila {
                piso,
                descripcion,
                largo: 0.0,
                alto: 0.0,
                vanos: 0.0,
            }),
        }
    }

    /// Remove a row. Out-of-range rows are ignored.
    pub fn quitar_fila(&mut self, seccion: SectionKey, row: usize) {
        if row >= self.filas(seccion) {
            return;
        }
        match seccion {
            SectionKey::Columnas => {
                self.columnas.remove(row);
            }
            SectionKey::Vigas => {
                self.vigas.remove(row);
            }
            SectionKey::Losa => {
                self.losa.remove(row);
            }
            SectionKey::Escalera => {
                self.escalera.remove(row);
            }
            SectionKey::Muros => {
                self.muros.remove(row);
            }
        }
    }

    /// Compute a section's aggregate from its current rows.
    pub fn resumen(&self, seccion: SectionKey) -> SectionAggregate {
        match seccion {
            SectionKey::Columnas => SectionAggregate::Columnas(self.resumen_columnas()),
            SectionKey::Vigas => SectionAggregate::Vigas(self.resumen_vigas()),
            SectionKey::Losa => SectionAggregate::Losa(self.resumen_losa()),
            SectionKey::Escalera => SectionAggregate::Escalera(self.resumen_escalera()),
            SectionKey::Muros => SectionAggregate::Muros(self.resumen_muros()),
        }
    }

    fn resumen_columnas(&self) -> ColumnasResumen {
        let mut resumen = ColumnasResumen::default();
        for fila in &self.columnas {
            resumen.vol_total += fila.n * fila.lado_a * fila.lado_b * fila.alto;
            resumen.enc_total += fila.n * 2.0 * (fila.lado_a + fila.lado_b) * fila.alto;
        }
        resumen
    }

    fn resumen_vigas(&self) -> VigasResumen {
        let mut resumen = VigasResumen::default();
        for fila in &self.vigas {
            let vol = fila.n * fila.largo * fila.ancho * fila.alto;
            // Bottom plus both sides: the slab covers the top.
            let enc = fila.n * fila.largo * (fila.ancho + 2.0 * fila.alto);
            resumen.vol_total += vol;
            resumen.enc_total += enc;
            let piso = resumen.por_piso.entry(fila.piso.clone()).or_default();
            piso.vol_total += vol;
            piso.enc_total += enc;
        }
        resumen
    }

    fn resumen_losa(&self) -> LosaResumen {
        let mut resumen = LosaResumen::default();
        for fila in &self.losa {
            let area = fila.largo * fila.ancho;
            let vol = area * fila.espesor;
            resumen.area_total += area;
            resumen.vol_total += vol;
            let piso = resumen.por_piso.entry(fila.piso.clone()).or_default();
            piso.area += area;
            piso.vol += vol;
        }
        resumen
    }

    fn resumen_escalera(&self) -> EscaleraResumen {
        let mut resumen = EscaleraResumen::default();
        for fila in &self.escalera {
            let vol = fila.pasos * fila.ancho * fila.garganta;
            let enc = fila.pasos * fila.ancho;
            resumen.vol_total += vol;
            resumen.enc_total += enc;
            let piso = resumen.por_piso.entry(fila.piso.clone()).or_default();
            piso.vol += vol;
            piso.enc += enc;
        }
        resumen
    }

    fn resumen_muros(&self) -> MurosResumen {
        let mut resumen = MurosResumen::default();
        for fila in &self.muros {
            let area_bruta = fila.largo * fila.alto;
            let area_nueva = (area_bruta - fila.vanos).max(0.0);
            let mort = area_nueva * MORT_POR_M2;
            let piso = resumen
                .por_piso
                .entry(fila.piso.clone())
                .or_insert_with(MurosPiso::default);
            piso.area_bruta += area_bruta;
            piso.area_nueva += area_nueva;
            piso.lad += area_nueva * LAD_POR_M2;
            piso.mort += mort;
            piso.cem += mort * CEM_POR_M3;
            piso.arena += mort * ARENA_POR_M3;
        }
        resumen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secciones_demo() -> Secciones {
        let mut secciones = Secciones::default();
        secciones.vigas.push(VigaFila {
            piso: "azotea".to_string(),
            descripcion: "VP-101".to_string(),
            n: 2.0,
            largo: 5.0,
            ancho: 0.25,
            alto: 0.4,
        });
        secciones.muros.push(MuroFila {
            piso: "1er-piso".to_string(),
            descripcion: "Eje A".to_string(),
            largo: 8.0,
            alto: 2.5,
            vanos: 2.0,
        });
        secciones
    }

    #[test]
    fn test_resumen_vigas_por_piso() {
        let secciones = secciones_demo();
        let SectionAggregate::Vigas(resumen) = secciones.resumen(SectionKey::Vigas) else {
            panic!("expected vigas aggregate");
        };
        assert!((resumen.vol_total - 2.0 * 5.0 * 0.25 * 0.4).abs() < 1e-9);
        let azotea = resumen.por_piso.get("azotea").unwrap();
        assert_eq!(azotea.vol_total, resumen.vol_total);
    }

    #[test]
    fn test_resumen_muros_subtracts_openings() {
        let secciones = secciones_demo();
        let SectionAggregate::Muros(resumen) = secciones.resumen(SectionKey::Muros) else {
            panic!("expected muros aggregate");
        };
        let piso = resumen.por_piso.get("1er-piso").unwrap();
        assert!((piso.area_bruta - 20.0).abs() < 1e-9);
        assert!((piso.area_nueva - 18.0).abs() < 1e-9);
        assert!((piso.lad - 18.0 * LAD_POR_M2).abs() < 1e-9);
    }

    #[test]
    fn test_editable_follows_column_layout() {
        let secciones = secciones_demo();
        assert!(!secciones.editable(SectionKey::Vigas, 0, 0));
        assert!(!secciones.editable(SectionKey::Vigas, 0, 1));
        assert!(secciones.editable(SectionKey::Vigas, 0, 3));
        // Out of range is never editable.
        assert!(!secciones.editable(SectionKey::Vigas, 5, 3));
    }

    #[test]
    fn test_set_valor_roundtrip() {
        let mut secciones = secciones_demo();
        assert!(secciones.set_valor(SectionKey::Vigas, 0, 3, 6.5));
        assert_eq!(secciones.valor(SectionKey::Vigas, 0, 3), Some(6.5));
        assert!(!secciones.set_valor(SectionKey::Vigas, 0, 0, 1.0));
    }

    #[test]
    fn test_agregar_y_quitar_fila() {
        let mut secciones = secciones_demo();
        secciones.agregar_fila(SectionKey::Losa, "2do-piso");
        assert_eq!(secciones.filas(SectionKey::Losa), 1);
        secciones.quitar_fila(SectionKey::Losa, 0);
        assert_eq!(secciones.filas(SectionKey::Losa), 0);
        // Removing an out-of-range row is ignored.
        secciones.quitar_fila(SectionKey::Losa, 3);
    }
}
