use std::ffi::OsString;

use addx_config::{
    discover_config_path, load_for_project, with_config_env_lock, AddxConfig, ConfigError,
    ADDX_CONFIG_ENV_VAR,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &std::path::Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_addx_toml_in_project_root() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(ADDX_CONFIG_ENV_VAR);

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("addx.toml");
        std::fs::write(&config_path, "[registration]\nlifetimes = [\"Scoped\"]\n").unwrap();

        let discovered = discover_config_path(dir.path()).expect("addx.toml should be found");
        assert_eq!(discovered, config_path.canonicalize().unwrap());

        let (config, path) = load_for_project(dir.path()).unwrap();
        assert_eq!(path, Some(discovered));
        assert_eq!(config.registration.lifetimes, vec!["Scoped"]);
    });
}

#[test]
fn dot_addx_toml_is_a_fallback() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(ADDX_CONFIG_ENV_VAR);

        let dir = tempdir().unwrap();
        let hidden = dir.path().join(".addx.toml");
        std::fs::write(&hidden, "").unwrap();
        assert_eq!(
            discover_config_path(dir.path()),
            Some(hidden.canonicalize().unwrap())
        );

        let visible = dir.path().join("addx.toml");
        std::fs::write(&visible, "").unwrap();
        assert_eq!(
            discover_config_path(dir.path()),
            Some(visible.canonicalize().unwrap())
        );
    });
}

#[test]
fn env_var_overrides_discovery() {
    with_config_env_lock(|| {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("addx.toml"), "").unwrap();
        let custom = dir.path().join("custom.toml");
        std::fs::write(&custom, "[logging]\njson = true\n").unwrap();

        let _env = EnvVarGuard::set(ADDX_CONFIG_ENV_VAR, std::path::Path::new("custom.toml"));
        let (config, path) = load_for_project(dir.path()).unwrap();
        assert_eq!(path, Some(custom.canonicalize().unwrap()));
        assert!(config.logging.json);
    });
}

#[test]
fn missing_config_yields_defaults() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(ADDX_CONFIG_ENV_VAR);

        let dir = tempdir().unwrap();
        let (config, path) = load_for_project(dir.path()).unwrap();
        assert_eq!(path, None);
        assert_eq!(config, AddxConfig::default());
    });
}

#[test]
fn unreadable_config_reports_the_path() {
    let dir = tempdir().unwrap();
    let err = AddxConfig::load_from_path(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("nope.toml"), "{err}");
}
