use super::*;

#[test]
fn new_applies_defaults() {
    let p = GenerateParams::new(4, 2, 512).unwrap();
    assert_eq!(p.total_count, 4);
    assert_eq!(p.batch_size, 2);
    assert_eq!(p.image_size, 512);
    assert_eq!(p.seed, None);
    assert_eq!(p.max_attempts_per_slot, DEFAULT_MAX_ATTEMPTS_PER_SLOT);
    assert_eq!(p.item_name_prefix, "NFT");
    assert!(!p.write_metadata);
    assert_eq!(p.resize_filter, ResizeFilter::Triangle);
}

#[test]
fn zero_values_are_rejected() {
    assert!(GenerateParams::new(0, 1, 1).unwrap_err().is_validation());
    assert!(GenerateParams::new(1, 0, 1).unwrap_err().is_validation());
    assert!(GenerateParams::new(1, 1, 0).unwrap_err().is_validation());
    assert!(
        GenerateParams::new(1, 1, MAX_IMAGE_SIZE + 1)
            .unwrap_err()
            .is_validation()
    );
}

#[test]
fn parse_accepts_trimmed_positive_integers() {
    let p = GenerateParams::parse(" 10 ", "5", "256").unwrap();
    assert_eq!((p.total_count, p.batch_size, p.image_size), (10, 5, 256));
}

#[test]
fn parse_rejects_missing_and_non_numeric_fields() {
    let err = GenerateParams::parse("", "5", "256").unwrap_err();
    assert!(err.to_string().contains("total count is required"));

    let err = GenerateParams::parse("10", "five", "256").unwrap_err();
    assert!(err.to_string().contains("batch size must be a positive integer"));

    let err = GenerateParams::parse("10", "5", "-3").unwrap_err();
    assert!(err.is_validation());

    let err = GenerateParams::parse("10", "5", "0").unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn with_seed_sets_seed() {
    let p = GenerateParams::new(1, 1, 1).unwrap().with_seed(42);
    assert_eq!(p.seed, Some(42));
}

#[test]
fn resize_filter_from_str() {
    assert_eq!("nearest".parse::<ResizeFilter>().unwrap(), ResizeFilter::Nearest);
    assert_eq!("Bilinear".parse::<ResizeFilter>().unwrap(), ResizeFilter::Triangle);
    assert_eq!(
        "catmull-rom".parse::<ResizeFilter>().unwrap(),
        ResizeFilter::CatmullRom
    );
    assert_eq!("lanczos3".parse::<ResizeFilter>().unwrap(), ResizeFilter::Lanczos3);
    assert!("box".parse::<ResizeFilter>().is_err());
}

#[test]
fn config_from_json_and_into_params() {
    let json = r#"{
        "total_count": 12,
        "batch_size": 4,
        "image_size": 64,
        "seed": 7,
        "resize_filter": "nearest",
        "write_metadata": true
    }"#;
    let cfg = GenerateConfig::from_reader(json.as_bytes()).unwrap();
    let p = cfg.into_params().unwrap();
    assert_eq!((p.total_count, p.batch_size, p.image_size), (12, 4, 64));
    assert_eq!(p.seed, Some(7));
    assert_eq!(p.resize_filter, ResizeFilter::Nearest);
    assert!(p.write_metadata);
    assert_eq!(p.item_name_prefix, DEFAULT_ITEM_NAME_PREFIX);
}

#[test]
fn config_rejects_unknown_fields() {
    let json = r#"{ "total_count": 1, "colour": "red" }"#;
    let err = GenerateConfig::from_reader(json.as_bytes()).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn config_missing_core_field_is_validation_error() {
    let cfg = GenerateConfig {
        total_count: Some(3),
        batch_size: Some(1),
        ..GenerateConfig::default()
    };
    let err = cfg.into_params().unwrap_err();
    assert!(err.to_string().contains("image size is required"));
}

#[test]
fn merge_prefers_overrides() {
    let file = GenerateConfig {
        total_count: Some(10),
        batch_size: Some(2),
        image_size: Some(128),
        seed: Some(1),
        ..GenerateConfig::default()
    };
    let flags = GenerateConfig {
        total_count: Some(20),
        seed: None,
        ..GenerateConfig::default()
    };
    let merged = file.merge(flags);
    assert_eq!(merged.total_count, Some(20));
    assert_eq!(merged.batch_size, Some(2));
    assert_eq!(merged.image_size, Some(128));
    assert_eq!(merged.seed, Some(1));
}

#[test]
fn from_path_reports_missing_file() {
    let err = GenerateConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("open generation config"));
}
