use super::*;
use yare::parameterized;

#[parameterized(
    feeding_first = { OperationKind::Feeding, 1 },
    cleaning_second = { OperationKind::Cleaning, 2 },
    maintenance_last = { OperationKind::Maintenance, 3 },
)]
fn priority_mapping_is_fixed(kind: OperationKind, priority: u8) {
    assert_eq!(kind.priority(), priority);
}

#[test]
fn kinds_order_feeding_before_cleaning_before_maintenance() {
    assert!(OperationKind::Feeding.priority() < OperationKind::Cleaning.priority());
    assert!(OperationKind::Cleaning.priority() < OperationKind::Maintenance.priority());
}

#[test]
fn kind_serializes_as_snake_case() {
    let json = serde_json::to_string(&OperationKind::Cleaning).unwrap();
    assert_eq!(json, "\"cleaning\"");
}

#[test]
fn trigger_reason_round_trips_through_serde() {
    let json = serde_json::to_string(&TriggerReason::DoubleTimeout).unwrap();
    let back: TriggerReason = serde_json::from_str(&json).unwrap();
    assert_eq!(back, TriggerReason::DoubleTimeout);
}

#[test]
fn display_matches_as_str() {
    assert_eq!(OperationKind::Feeding.to_string(), "feeding");
    assert_eq!(TriggerReason::InventoryFull.to_string(), "inventory_full");
}
