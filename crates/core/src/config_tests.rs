use super::*;

#[test]
fn number_slot_rejects_below_min() {
    let slot = ConfigSlot::new(
        "concurrency",
        "Concurrency",
        ConfigKind::Number { min: Some(1), max: Some(20) },
        ConfigScalar::Num(1),
    );
    assert_eq!(
        slot.set_value(ConfigScalar::Num(0)),
        Err(ConfigValidationError::TooSmall {
            title: "Concurrency".into(),
            min: 1
        })
    );
    assert_eq!(slot.value(), ConfigScalar::Num(1));
}

#[test]
fn number_slot_rejects_above_max() {
    let slot = ConfigSlot::new(
        "concurrency",
        "Concurrency",
        ConfigKind::Number { min: None, max: Some(20) },
        ConfigScalar::Num(1),
    );
    assert!(slot.set_value(ConfigScalar::Num(21)).is_err());
}

#[test]
fn number_slot_accepts_in_range_value() {
    let slot = ConfigSlot::new(
        "concurrency",
        "Concurrency",
        ConfigKind::Number { min: Some(1), max: Some(20) },
        ConfigScalar::Num(1),
    );
    assert!(slot.set_value(ConfigScalar::Num(10)).is_ok());
    assert_eq!(slot.value(), ConfigScalar::Num(10));
}

#[test]
fn string_slot_enforces_regex() {
    let slot = ConfigSlot::new(
        "downloader",
        "Downloader",
        ConfigKind::String {
            regex: Some("^[-_a-zA-Z0-9]{3,30}$".into()),
        },
        ConfigScalar::Str(String::new()),
    );
    assert!(slot.set_value(ConfigScalar::Str("my-warrior".into())).is_ok());
    assert!(slot.set_value(ConfigScalar::Str("!!".into())).is_err());
}

#[test]
fn string_slot_without_regex_accepts_anything() {
    let slot = ConfigSlot::new(
        "note",
        "Note",
        ConfigKind::String { regex: None },
        ConfigScalar::Str(String::new()),
    );
    assert!(slot.set_value(ConfigScalar::Str("anything goes".into())).is_ok());
}
