use deployments_core::model::image::MAX_FIELD_CHARS;
use deployments_core::{ImageValidationError, SoftwareImage, SoftwareImageConstructor};

#[test]
fn new_generates_id_and_leaves_modified_unset() {
    let image = SoftwareImage::new(SoftwareImageConstructor::new("app-1.0", "raspberrypi3"));

    let id = image.id().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
    assert_eq!(image.name(), "app-1.0");
    assert_eq!(image.model(), "raspberrypi3");
    assert!(image.modified().is_none());
    image.validate().unwrap();
}

#[test]
fn without_id_is_valid_until_insert_assigns_one() {
    let image = SoftwareImage::without_id(SoftwareImageConstructor::new("app-1.0", "bbb"));
    assert!(image.id().is_none());
    image.validate().unwrap();
}

#[test]
fn validate_rejects_blank_natural_key() {
    let blank_name = SoftwareImage::new(SoftwareImageConstructor::new("  ", "bbb"));
    assert_eq!(
        blank_name.validate().unwrap_err(),
        ImageValidationError::BlankField("name")
    );

    let blank_model = SoftwareImage::new(SoftwareImageConstructor::new("app-1.0", ""));
    assert_eq!(
        blank_model.validate().unwrap_err(),
        ImageValidationError::BlankField("model")
    );
}

#[test]
fn validate_rejects_blank_optional_fields_and_ids() {
    let mut constructor = SoftwareImageConstructor::new("app-1.0", "bbb");
    constructor.checksum = Some(" ".to_string());
    let image = SoftwareImage::new(constructor);
    assert_eq!(
        image.validate().unwrap_err(),
        ImageValidationError::BlankField("checksum")
    );

    let image = SoftwareImage::with_id("", SoftwareImageConstructor::new("app-1.0", "bbb"));
    assert_eq!(image.validate().unwrap_err(), ImageValidationError::BlankId);
}

#[test]
fn validate_rejects_oversized_fields() {
    let mut constructor = SoftwareImageConstructor::new("app-1.0", "bbb");
    constructor.description = Some("d".repeat(MAX_FIELD_CHARS + 1));
    let err = SoftwareImage::new(constructor).validate().unwrap_err();
    assert_eq!(
        err,
        ImageValidationError::FieldTooLong {
            field: "description",
            max: MAX_FIELD_CHARS,
        }
    );

    let at_limit = SoftwareImageConstructor::new("n".repeat(MAX_FIELD_CHARS), "bbb");
    SoftwareImage::new(at_limit).validate().unwrap();
}

#[test]
fn serialization_uses_storage_field_names() {
    let mut constructor = SoftwareImageConstructor::new("app-1.0", "bbb");
    constructor.description = Some("nightly".to_string());
    let image = SoftwareImage::with_id("image-1", constructor);

    let json = serde_json::to_value(&image).unwrap();
    assert_eq!(json["_id"], "image-1");
    assert_eq!(json["softwareimageconstructor"]["name"], "app-1.0");
    assert_eq!(json["softwareimageconstructor"]["model"], "bbb");
    assert_eq!(json["softwareimageconstructor"]["description"], "nightly");
    assert!(json["softwareimageconstructor"].get("checksum").is_none());
    assert!(json.get("modified").is_none());

    let decoded: SoftwareImage = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, image);
}
