//! Integration tests for the publish -> resolve -> reconcile -> sync
//! flow between the aggregate store and the budget document.

use metrado_core::{AreaSource, AreaSourceKind, History, ItemPartida, Partida, Presupuesto};
use metrado_engine::{
    AggregateStore, SectionAggregate, SectionKey, VigasPiso, VigasResumen, resolve,
};
use std::collections::BTreeMap;
use std::sync::Arc;

fn vigas_con_azotea() -> VigasResumen {
    let mut por_piso = BTreeMap::new();
    por_piso.insert(
        "azotea".to_string(),
        VigasPiso {
            vol_total: 4.5,
            enc_total: 20.0,
        },
    );
    VigasResumen {
        vol_total: 10.0,
        enc_total: 50.0,
        por_piso,
    }
}

#[test]
fn test_escenario_vigas_por_piso() {
    let mut store = AggregateStore::new();
    store.publish(SectionAggregate::Vigas(vigas_con_azotea()));
    let snapshot = store.snapshot();

    assert_eq!(resolve("vigas-azotea", &snapshot).unwrap().value, 4.5);
    assert_eq!(resolve("vigas-3er-piso", &snapshot), None);
}

#[test]
fn test_seccion_ausente_no_es_cero() {
    let store = AggregateStore::new();
    let snapshot = store.snapshot();
    // Budget lines referencing stairs before the section ever mounted
    // must see "no value", never a zero or a panic.
    assert_eq!(resolve("concreto-escalera", &snapshot), None);
    assert_eq!(resolve("encofrado-escalera", &snapshot), None);
}

#[test]
fn test_publicacion_notifica_antes_de_retornar() {
    let visto: Arc<std::sync::Mutex<Vec<Option<f64>>>> =
        Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&visto);

    let mut store = AggregateStore::new();
    store.subscribe(move |snapshot| {
        sink.lock()
            .unwrap()
            .push(snapshot.vigas.as_ref().map(|v| v.vol_total));
    });

    store.publish(SectionAggregate::Vigas(vigas_con_azotea()));
    assert_eq!(*visto.lock().unwrap(), vec![Some(10.0)]);
}

fn partida_auto() -> Partida {
    Partida {
        id: "concreto-vigas".to_string(),
        descripcion: "Concreto f'c=210 en vigas".to_string(),
        unidad: "m³".to_string(),
        area_m2: 10.0,
        source: Some(AreaSource::auto()),
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

#[test]
fn test_reconciliacion_y_sincronizacion_en_cascada() {
    let mut store = AggregateStore::new();
    let mut vigas = vigas_con_azotea();
    vigas.vol_total = 12.0;
    store.publish(SectionAggregate::Vigas(vigas));
    let snapshot = store.snapshot();

    let mut partida = partida_auto();
    let view = partida.metrado_view(&snapshot);
    assert_eq!(view.display, 10.0);
    assert_eq!(view.live.as_ref().unwrap().value, 12.0);
    assert!(view.stale);
    // Auto lines are not directly editable; sync is the only path.
    assert!(!view.editable);

    assert!(partida.sync(&snapshot));
    assert_eq!(partida.area_m2, 12.0);
    assert_eq!(partida.items[0].cantidad, 9.73 * 12.0);
    assert_eq!(partida.items[1].cantidad, 1.0);

    // In sync now: no drift flagged.
    let view = partida.metrado_view(&store.snapshot());
    assert!(!view.stale);
}

#[test]
fn test_linea_manual_nunca_se_actualiza_sola() {
    let mut store = AggregateStore::new();
    store.publish(SectionAggregate::Vigas(vigas_con_azotea()));
    let snapshot = store.snapshot();

    let mut partida = partida_auto();
    partida.area_m2 = 7.0;
    partida.source = Some(AreaSource::manual());

    // Display follows the stored value and ignores the formula entirely.
    let view = partida.metrado_view(&snapshot);
    assert_eq!(view.display, 7.0);
    assert!(view.live.is_none());
    assert!(!view.stale);
    assert!(view.editable);

    // The explicit sync action is still allowed to overwrite it.
    assert!(partida.sync(&snapshot));
    assert_eq!(partida.area_m2, 10.0);
}

#[test]
fn test_sincronizacion_como_paso_de_deshacer() {
    let mut store = AggregateStore::new();
    let mut vigas = vigas_con_azotea();
    vigas.vol_total = 12.0;
    store.publish(SectionAggregate::Vigas(vigas));
    let snapshot = store.snapshot();

    let mut historia = History::new(Presupuesto::new(vec![partida_auto()]));

    // The app records a sync as one undo step on the budget timeline.
    let mut siguiente = historia.present().clone();
    assert!(siguiente
        .sync_partida("concreto-vigas", &snapshot)
        .unwrap());
    historia.set(siguiente);
    assert_eq!(
        historia.present().partida("concreto-vigas").unwrap().area_m2,
        12.0
    );

    historia.undo();
    assert_eq!(
        historia.present().partida("concreto-vigas").unwrap().area_m2,
        10.0
    );
    assert_eq!(
        historia.present().partida("concreto-vigas").unwrap().items[0].cantidad,
        97.3
    );
}

#[test]
fn test_alternar_fuente_conserva_metrado() {
    let mut partida = partida_auto();
    partida.toggle_source();
    assert_eq!(partida.source.as_ref().unwrap().kind, AreaSourceKind::Manual);
    assert_eq!(partida.area_m2, 10.0);

    partida.toggle_source();
    assert_eq!(partida.source.as_ref().unwrap().kind, AreaSourceKind::Auto);
    assert_eq!(partida.area_m2, 10.0);
}

#[test]
fn test_republicacion_reemplaza_por_completo() {
    let mut store = AggregateStore::new();
    store.publish(SectionAggregate::Vigas(vigas_con_azotea()));
    store.publish(SectionAggregate::Vigas(VigasResumen {
        vol_total: 3.0,
        ..Default::default()
    }));

    let snapshot = store.snapshot();
    // The old per-floor breakdown is gone with the replaced slot.
    assert_eq!(resolve("vigas-azotea", &snapshot), None);
    assert_eq!(resolve("concreto-vigas", &snapshot).unwrap().value, 3.0);

    // Retract brings the slot back to "never published".
    store.retract(SectionKey::Vigas);
    assert_eq!(resolve("concreto-vigas", &store.snapshot()), None);
}
