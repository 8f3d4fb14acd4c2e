use super::*;
use serde_json::json;

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: Color = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Color::rgb(255, 0, 0));

    let c: Color = serde_json::from_value(json!("#0000FF80")).unwrap();
    assert_eq!(c, Color::rgba(0, 0, 255, 128));

    assert!(serde_json::from_value::<Color>(json!("#12345")).is_err());
    assert!(serde_json::from_value::<Color>(json!("#gg0000")).is_err());
}

#[test]
fn parses_rgba_object_and_array() {
    let c: Color = serde_json::from_value(json!({"r": 10, "g": 20, "b": 30})).unwrap();
    assert_eq!(c, Color::rgb(10, 20, 30));

    let c: Color = serde_json::from_value(json!([10, 20, 30, 40])).unwrap();
    assert_eq!(c, Color::rgba(10, 20, 30, 40));

    assert!(serde_json::from_value::<Color>(json!([1, 2])).is_err());
}

#[test]
fn offset_saturates_and_keeps_alpha() {
    let c = Color::rgba(250, 5, 128, 77).offset(10);
    assert_eq!(c, Color::rgba(255, 15, 138, 77));
    let c = Color::rgb(3, 200, 9).offset(-5);
    assert_eq!(c, Color::rgb(0, 195, 4));
}

#[test]
fn premul_of_opaque_is_identity() {
    assert_eq!(Color::rgb(1, 2, 3).to_premul(), [1, 2, 3, 255]);
    assert_eq!(Color::TRANSPARENT.to_premul(), [0, 0, 0, 0]);
}

#[test]
fn luma_orders_black_below_white() {
    assert_eq!(Color::BLACK.luma(), 0);
    assert_eq!(Color::WHITE.luma(), 255);
    assert!(Color::rgb(0, 255, 0).luma() > Color::rgb(0, 0, 255).luma());
}
