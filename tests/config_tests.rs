//! Integration tests for configuration loading, layering and validation.

use product_runtime::config::{
    generate_full_example_config, load_config_file, AppConfig, ConfigPreset, OutputFormat,
    Validatable,
};
use product_runtime::delta::{ComputationMethod, DeltaComputationOptions};
use tempfile::TempDir;

#[test]
fn test_file_config_drives_loader_and_options() {
    let tmp = TempDir::new().expect("temp dir");
    let path = tmp.path().join(".product-runtime.yaml");
    std::fs::write(
        &path,
        r"
toc:
  extension_tags: [Formula]
  packaging_version: 4.0.0
delta:
  default_method: by-position
  association_methods:
    entries: by-object
  ignored_properties:
    - ProductComponent.resource
",
    )
    .expect("write config");

    let config = load_config_file(&path).expect("config parses");
    assert!(config.is_valid());

    let toc = config
        .toc_loader()
        .load_str(
            r#"<ProductDataToc productDataVersion="${packaging.version}">
  <Formula id="f" qualifiedName="formulas.F" implementationType="Formula"/>
</ProductDataToc>"#,
        )
        .expect("extension tag registered");
    assert_eq!(toc.product_data_version(), "4.0.0");

    let options = config.delta_options();
    assert_eq!(options.method("entries"), ComputationMethod::ByObject);
    assert_eq!(options.method("generations"), ComputationMethod::ByPosition);
    assert!(options.ignore("ProductComponent", "resource"));
}

#[test]
fn test_cli_overrides_win_over_file() {
    let tmp = TempDir::new().expect("temp dir");
    let path = tmp.path().join("config.yaml");
    std::fs::write(&path, "output:\n  format: json\nbehavior:\n  quiet: true\n").expect("write config");

    let overrides = AppConfig::builder()
        .fail_on_change(true)
        .ignore_property("TestCase.resource")
        .build();
    let (config, loaded_from) = AppConfig::from_file_with_overrides(Some(&path), &overrides);

    assert_eq!(loaded_from.as_deref(), Some(path.as_path()));
    assert_eq!(config.output.format, OutputFormat::Json);
    assert!(config.behavior.quiet);
    assert!(config.behavior.fail_on_change);
    assert_eq!(config.delta.ignored_properties, ["TestCase.resource"]);
}

#[test]
fn test_preset_layering() {
    let mut config = AppConfig::default();
    config.merge(&AppConfig::from_preset(ConfigPreset::Positional));
    config.merge(&AppConfig::builder().output_format(OutputFormat::Json).build());

    assert_eq!(config.delta.default_method, ComputationMethod::ByPosition);
    assert_eq!(config.output.format, OutputFormat::Json);
}

#[test]
fn test_invalid_config_reports_every_field() {
    let config = AppConfig::builder()
        .extension_tag("TestCase")
        .ignore_property("resource")
        .fallback_version_prefix("")
        .build();
    let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
    assert_eq!(
        fields,
        [
            "toc.extension_tags[0]",
            "toc.fallback_version_prefix",
            "delta.ignored_properties[0]"
        ]
    );
}

#[test]
fn test_full_example_is_the_default() {
    let parsed: AppConfig = serde_yaml::from_str(&generate_full_example_config()).expect("example parses");
    assert_eq!(parsed, AppConfig::default());
}
