//! Tests for loading storage configuration and building backends.

use biob_storage::{BinaryObjectMetadata, StorageConfig, StorageErrorKind, payload_from_bytes};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

/// Environment variables are process-global; every test that loads
/// configuration holds this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sets environment variables for its lifetime and removes them on drop.
struct EnvOverride {
    keys: Vec<&'static str>,
}

impl EnvOverride {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for (key, value) in vars {
            // Safe under ENV_LOCK: no other test thread touches the environment.
            unsafe {
                std::env::set_var(key, value);
            }
        }
        Self {
            keys: vars.iter().map(|(key, _)| *key).collect(),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        for key in &self.keys {
            unsafe {
                std::env::remove_var(key);
            }
        }
    }
}

#[tokio::test]
async fn test_from_file_builds_filesystem_backend() {
    let temp_dir = TempDir::new().unwrap();
    let base_path = temp_dir.path().join("objects");
    let config_path = temp_dir.path().join("biob.toml");
    std::fs::write(
        &config_path,
        format!(
            "backend = \"file_system\"\nbase_path = {:?}\n",
            base_path.display().to_string()
        ),
    )
    .unwrap();

    let config = {
        let _guard = env_lock();
        StorageConfig::from_file(&config_path).unwrap()
    };
    assert_eq!(
        config,
        StorageConfig::FileSystem {
            base_path: base_path.clone()
        }
    );

    let storage = config.build().unwrap();
    storage
        .store(
            "images/1",
            &BinaryObjectMetadata::new(3, "test.jpg", "image/jpg"),
            payload_from_bytes(vec![1u8, 2, 3]),
        )
        .await
        .unwrap();

    assert!(base_path.join("images/1").exists());
}

#[tokio::test]
async fn test_memory_backend_from_default() {
    let storage = StorageConfig::default().build().unwrap();
    assert!(!storage.has_binary_object("images/1").await.unwrap());
}

#[test]
fn test_missing_file_is_config_error() {
    let _guard = env_lock();
    let err = StorageConfig::from_file(PathBuf::from("/nonexistent/biob.toml")).unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::InvalidConfig(_)));
}

#[test]
fn test_missing_base_path_is_config_error() {
    let _guard = env_lock();
    let err = StorageConfig::from_toml_str("backend = \"file_system\"").unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::InvalidConfig(_)));
}

#[test]
fn test_environment_overrides_file_values() {
    let temp_dir = TempDir::new().unwrap();
    let file_base = temp_dir.path().join("from_file");
    let env_base = temp_dir.path().join("from_env");
    let config_path = temp_dir.path().join("biob.toml");
    std::fs::write(
        &config_path,
        format!(
            "backend = \"file_system\"\nbase_path = {:?}\n",
            file_base.display().to_string()
        ),
    )
    .unwrap();

    let _guard = env_lock();
    let env_base_str = env_base.display().to_string();
    let _env = EnvOverride::set(&[("BIOB_BASE_PATH", env_base_str.as_str())]);

    let config = StorageConfig::from_file(&config_path).unwrap();
    assert_eq!(config, StorageConfig::FileSystem { base_path: env_base });
}

#[test]
fn test_environment_selects_backend() {
    let temp_dir = TempDir::new().unwrap();
    let env_base = temp_dir.path().join("objects");

    let _guard = env_lock();
    let env_base_str = env_base.display().to_string();
    let _env = EnvOverride::set(&[
        ("BIOB_BACKEND", "file_system"),
        ("BIOB_BASE_PATH", env_base_str.as_str()),
    ]);

    let config = StorageConfig::from_toml_str("backend = \"memory\"").unwrap();
    assert_eq!(config, StorageConfig::FileSystem { base_path: env_base });
}
