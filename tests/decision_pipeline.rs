mod common;

use air_quality::{
    Error,
    analysis::{analyze_room, equipment_efficiency},
    decision::{Action, ActionKind, Decision, execute_decision, make_decision},
    model::{EquipmentStatus, EquipmentType, ParameterKind, ParameterStatus},
    state::{current_state, sensor_coverage},
    thresholds::Thresholds,
};

use common::{MemoryStore, at};

#[tokio::test]
async fn cold_room_turns_on_its_heater() {
    let store = MemoryStore::default();
    let room = store.add_room("Office 101");
    let sensor = store.add_sensor(room, ParameterKind::Temperature, "wall");
    store.add_reading(sensor, 15.0, at(9, 0));
    let heater = store.add_equipment(
        room,
        EquipmentType::Heating,
        "Radiator 1",
        EquipmentStatus::Off,
        true,
    );

    let decision = make_decision(&store, &Thresholds::default(), room)
        .await
        .unwrap();

    assert_eq!(decision.overall_status, ParameterStatus::CriticalLow);
    assert_eq!(decision.actions.len(), 1);
    let action = &decision.actions[0];
    assert_eq!(action.equipment_id, heater);
    assert_eq!(action.equipment_name, "Radiator 1");
    assert_eq!(action.action, ActionKind::TurnOn);
    assert!(action.reason.contains("15"), "reason: {}", action.reason);

    let executed = execute_decision(&store, &decision).await;
    assert_eq!(executed.len(), 1);
    assert!(executed[0].success);
    assert_eq!(executed[0].status, Some(EquipmentStatus::On));
    assert_eq!(store.status_of(heater), EquipmentStatus::On);
}

#[tokio::test]
async fn manual_equipment_is_left_alone() {
    let store = MemoryStore::default();
    let room = store.add_room("Server room");
    let temperature = store.add_sensor(room, ParameterKind::Temperature, "rack");
    let co2 = store.add_sensor(room, ParameterKind::Co2, "ceiling");
    store.add_reading(temperature, 31.0, at(10, 0));
    store.add_reading(co2, 1800.0, at(10, 0));
    store.add_equipment(
        room,
        EquipmentType::AirConditioner,
        "AC 2",
        EquipmentStatus::Off,
        false,
    );
    store.add_equipment(
        room,
        EquipmentType::Ventilation,
        "Fan 3",
        EquipmentStatus::Off,
        false,
    );

    let decision = make_decision(&store, &Thresholds::default(), room)
        .await
        .unwrap();

    assert_eq!(decision.overall_status, ParameterStatus::CriticalHigh);
    assert!(decision.actions.is_empty());
}

#[tokio::test]
async fn failed_update_does_not_stop_the_rest() {
    let store = MemoryStore::default();
    let room = store.add_room("Conference hall");
    let sensor = store.add_sensor(room, ParameterKind::Temperature, "stage");
    store.add_reading(sensor, 16.5, at(8, 0));
    let broken = store.add_equipment(
        room,
        EquipmentType::Heating,
        "Radiator A",
        EquipmentStatus::Off,
        true,
    );
    let working = store.add_equipment(
        room,
        EquipmentType::Heating,
        "Radiator B",
        EquipmentStatus::Off,
        true,
    );
    let removed = store.add_equipment(
        room,
        EquipmentType::Heating,
        "Radiator C",
        EquipmentStatus::Off,
        true,
    );
    store.fail_updates_of(broken);

    let decision = make_decision(&store, &Thresholds::default(), room)
        .await
        .unwrap();
    assert_eq!(decision.actions.len(), 3);
    store.remove_equipment(removed);

    let executed = execute_decision(&store, &decision).await;

    assert_eq!(executed.len(), 3);
    assert!(!executed[0].success);
    assert!(executed[0].error.as_deref().unwrap().contains("connection reset"));
    assert!(executed[1].success);
    assert!(!executed[2].success);
    assert_eq!(
        executed[2].error.as_deref(),
        Some(format!("equipment not found: {removed}").as_str())
    );
    assert_eq!(store.status_of(broken), EquipmentStatus::Off);
    assert_eq!(store.status_of(working), EquipmentStatus::On);
}

#[tokio::test]
async fn conflicting_actions_apply_in_order() {
    let store = MemoryStore::default();
    let room = store.add_room("Lab");
    let unit = store.add_equipment(
        room,
        EquipmentType::Heating,
        "Heater",
        EquipmentStatus::Off,
        true,
    );
    let action = |kind| Action {
        equipment_id: unit,
        equipment_name: "Heater".to_string(),
        action: kind,
        reason: "test".to_string(),
    };
    let decision = Decision {
        room_id: room,
        overall_status: ParameterStatus::Low,
        actions: vec![action(ActionKind::TurnOn), action(ActionKind::TurnOff)],
        recommendations: Vec::new(),
    };

    let executed = execute_decision(&store, &decision).await;

    assert!(executed.iter().all(|e| e.success));
    assert_eq!(store.status_of(unit), EquipmentStatus::Off);
}

#[tokio::test]
async fn latest_reading_wins_across_sensors() {
    let store = MemoryStore::default();
    let room = store.add_room("Open space");
    let north = store.add_sensor(room, ParameterKind::Humidity, "north");
    let south = store.add_sensor(room, ParameterKind::Humidity, "south");
    store.add_reading(north, 55.0, at(9, 0));
    store.add_reading(south, 28.0, at(9, 30));
    store.add_reading(north, 50.0, at(9, 15));

    let state = current_state(&store, room).await.unwrap();
    let humidity = state.get(ParameterKind::Humidity).unwrap();
    assert_eq!(humidity.value, 28.0);
    assert_eq!(humidity.location.as_deref(), Some("south"));

    let analysis = analyze_room(&store, &Thresholds::default(), room)
        .await
        .unwrap();
    assert_eq!(
        analysis.status(ParameterKind::Humidity),
        ParameterStatus::CriticalLow
    );
    assert_eq!(
        analysis.status(ParameterKind::Temperature),
        ParameterStatus::NoData
    );
    assert_eq!(analysis.overall_status, ParameterStatus::CriticalLow);
}

#[tokio::test]
async fn readings_from_other_rooms_are_ignored() {
    let store = MemoryStore::default();
    let room = store.add_room("Kitchen");
    let other = store.add_room("Basement");
    let sensor = store.add_sensor(other, ParameterKind::Co2, "floor");
    store.add_reading(sensor, 2500.0, at(12, 0));

    let analysis = analyze_room(&store, &Thresholds::default(), room)
        .await
        .unwrap();

    assert_eq!(analysis.overall_status, ParameterStatus::Optimal);
    assert_eq!(analysis.status(ParameterKind::Co2), ParameterStatus::NoData);
    assert_eq!(analysis.issues.len(), 4);
}

#[tokio::test]
async fn unknown_room_is_not_found() {
    let store = MemoryStore::default();

    let err = make_decision(&store, &Thresholds::default(), 42)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::RoomNotFound(42))
    ));
}

#[tokio::test]
async fn coverage_lists_missing_sensor_types() {
    let store = MemoryStore::default();
    let room = store.add_room("Office 102");
    store.add_sensor(room, ParameterKind::Temperature, "desk");
    store.add_sensor(room, ParameterKind::Co2, "desk");

    let coverage = sensor_coverage(&store, room).await.unwrap();

    assert!(!coverage.is_valid);
    assert_eq!(
        coverage.missing_sensors,
        vec![ParameterKind::Humidity, ParameterKind::Dust]
    );
}

#[tokio::test]
async fn efficiency_follows_current_conditions() {
    let store = MemoryStore::default();
    let room = store.add_room("Office 103");
    let dust = store.add_sensor(room, ParameterKind::Dust, "shelf");
    store.add_reading(dust, 0.2, at(11, 0));
    store.add_equipment(
        room,
        EquipmentType::Ventilation,
        "Fan 1",
        EquipmentStatus::Off,
        false,
    );
    store.add_equipment(
        room,
        EquipmentType::Heating,
        "Radiator 1",
        EquipmentStatus::On,
        true,
    );

    let efficiency = equipment_efficiency(&store, &Thresholds::default(), room)
        .await
        .unwrap();

    assert_eq!(efficiency.total_equipment, 2);
    assert_eq!(efficiency.active_equipment, 1);
    assert_eq!(
        efficiency.recommendations,
        vec!["Turning on Fan 1 is recommended"]
    );
}
