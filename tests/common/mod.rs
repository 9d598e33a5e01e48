use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Configuration that routes every command to the in-memory fake provider
#[allow(dead_code)]
pub const FAKE_CONFIG: &str = r#"
provider:
  type: fake
ui:
  locale: en
  default_mode: solver
"#;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
