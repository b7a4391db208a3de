use super::*;
use serde_json::json;

fn sample_payload() -> Value {
    json!({
        "message-id": "1",
        "status": "ok",
        "name": "overlay",
        "position": {"x": 100.0, "y": 50.0, "alignment": 5},
        "rotation": 12.5,
        "scale": {"x": 1.0, "y": 1.5},
        "crop": {"top": 0, "left": 2, "right": -3, "bottom": 10},
        "visible": true,
        "locked": false,
        "bounds": {"type": "OBS_BOUNDS_NONE", "alignment": 0, "x": 0.0, "y": 0.0},
        "sourceWidth": 1920.0,
        "sourceHeight": 1080.0,
        "width": 1920.0,
        "height": 1620.0
    })
}

#[test]
fn test_decode_full_payload() {
    let props = SceneItemProperties::decode(sample_payload()).unwrap();

    assert_eq!(props.name, "overlay");
    assert_eq!(props.position.x, 100.0);
    assert_eq!(props.position.alignment, 5);
    assert_eq!(props.rotation, 12.5);
    assert_eq!(props.scale.y, 1.5);
    assert_eq!(props.crop.right, -3);
    assert!(props.visible);
    assert!(!props.locked);
    assert_eq!(props.bounds.kind, BoundsKind::None);
    assert_eq!(props.source_width, 1920.0);
    assert_eq!(props.source_height, 1080.0);
    assert_eq!(props.width, 1920.0);
    assert_eq!(props.height, 1620.0);
}

#[test]
fn test_decode_missing_field() {
    let mut payload = sample_payload();
    payload.as_object_mut().unwrap().remove("rotation");

    let result = SceneItemProperties::decode(payload);
    assert!(result.is_err());
}

#[test]
fn test_decode_wrong_shape() {
    let mut payload = sample_payload();
    payload["crop"] = json!("not an object");

    let result = SceneItemProperties::decode(payload);
    assert!(result.is_err());
}

#[test]
fn test_decode_unknown_bounds_kind() {
    let mut payload = sample_payload();
    payload["bounds"]["type"] = json!("OBS_BOUNDS_SOMETHING_NEW");

    let result = SceneItemProperties::decode(payload);
    assert!(result.is_err());
}

#[test]
fn test_bounds_kind_wire_names() {
    let kind: BoundsKind = serde_json::from_value(json!("OBS_BOUNDS_SCALE_INNER")).unwrap();
    assert_eq!(kind, BoundsKind::ScaleInner);

    let encoded = serde_json::to_value(BoundsKind::MaxOnly).unwrap();
    assert_eq!(encoded, json!("OBS_BOUNDS_MAX_ONLY"));
}

#[test]
fn test_clamp_rotation_passthrough() {
    assert_eq!(clamp_rotation(0.0), 0.0);
    assert_eq!(clamp_rotation(180.0), 180.0);
    assert_eq!(clamp_rotation(359.0), 359.0);
}

#[test]
fn test_clamp_rotation_overflow() {
    assert_eq!(clamp_rotation(360.0), 0.0);
    // Single-step wrap: anything past the bound collapses to it
    assert_eq!(clamp_rotation(400.0), 0.0);
}

#[test]
fn test_clamp_rotation_underflow() {
    assert_eq!(clamp_rotation(-1.0), 359.0);
    assert_eq!(clamp_rotation(-40.0), 359.0);
}

#[test]
fn test_update_serializes_only_set_fields() {
    let update = SceneItemUpdate {
        rotation: Some(90.0),
        visible: Some(false),
        ..Default::default()
    };

    let value = serde_json::to_value(&update).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object["rotation"], json!(90.0));
    assert_eq!(object["visible"], json!(false));
}

#[test]
fn test_empty_update_serializes_to_empty_object() {
    let value = serde_json::to_value(SceneItemUpdate::default()).unwrap();
    assert_eq!(value, json!({}));
}

#[test]
fn test_normalized_clamps_rotation_only() {
    let update = SceneItemUpdate {
        rotation: Some(360.0),
        visible: Some(true),
        ..Default::default()
    }
    .normalized();

    assert_eq!(update.rotation, Some(0.0));
    assert_eq!(update.visible, Some(true));

    // No rotation set: nothing to normalize
    let update = SceneItemUpdate {
        locked: Some(true),
        ..Default::default()
    }
    .normalized();
    assert_eq!(update.rotation, None);
    assert_eq!(update.locked, Some(true));
}
