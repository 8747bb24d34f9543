//! Config file values flowing into a running normalizer.

use std::fs;

use tempfile::tempdir;
use timex_config::{ENV_TIMEOUT_MS, TimexConfig, apply_env_overrides};
use timex_core::{FailurePolicy, Normalizer, OutputFormat};

#[test]
fn file_settings_configure_normalizer() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[normalizer]\noutput_format = \"structured\"\nfailure_policy = \"lenient\"\n",
    )
    .unwrap();

    let settings = TimexConfig::load_from(&path).unwrap().normalizer_config();
    let normalizer = Normalizer::builder().config(settings).build().unwrap();

    assert_eq!(normalizer.output_format(), OutputFormat::Structured);
    assert_eq!(normalizer.failure_policy(), FailurePolicy::Lenient);
    assert_eq!(normalizer.normalize_on("5 o'clock", 2024, 1, 1).unwrap(), "");
}

#[test]
fn env_override_beats_file_and_explicit_setter_beats_both() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "[normalizer]\ntimeout_ms = 5000\n").unwrap();

    let file = TimexConfig::load_from(&path).unwrap().normalizer_config();
    let settings = apply_env_overrides(file, |var| {
        (var == ENV_TIMEOUT_MS).then(|| "750".to_string())
    })
    .unwrap();
    assert_eq!(settings.timeout.as_millis(), 750);

    let normalizer = Normalizer::builder()
        .config(settings)
        .timeout_ms(250)
        .build()
        .unwrap();
    assert_eq!(normalizer.timeout_ms(), 250);
}
