use super::*;

#[test]
fn empty_document_is_the_default_config() {
    let cfg = HazeConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, HazeConfig::default());
    assert_eq!(cfg.cache_capacity, 10);
    assert_eq!(cfg.progressive_step_height, Dp(64.0));
}

#[test]
fn partial_document_overrides_fields() {
    let cfg = HazeConfig::from_json_str(
        r#"{ "cache_capacity": 3, "surface_pool": { "max_surfaces": 2, "max_pool_pixels": 1024 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.cache_capacity, 3);
    assert_eq!(cfg.surface_pool.max_surfaces, 2);
    assert_eq!(cfg.default_noise_factor, 0.15);
}

#[test]
fn out_of_range_values_are_config_errors() {
    for bad in [
        r#"{ "cache_capacity": 0 }"#,
        r#"{ "default_tint_alpha": 1.5 }"#,
        r#"{ "auto_input_scale": 0.0 }"#,
        r#"{ "progressive_step_height": -1.0 }"#,
    ] {
        assert!(
            matches!(HazeConfig::from_json_str(bad), Err(HazeError::Config(_))),
            "{bad}"
        );
    }
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(
        HazeConfig::from_json_str("{ nope"),
        Err(HazeError::Serde(_))
    ));
}

#[test]
fn missing_file_is_reported() {
    let err = HazeConfig::from_path("/definitely/not/here/haze.json").unwrap_err();
    assert!(err.to_string().contains("haze.json"));
}
