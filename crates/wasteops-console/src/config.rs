use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use wasteops_core::{seed, DisplayMode, Registry};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogTarget {
    Sink,
    Stdout,
    File(PathBuf),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub seed_path: Option<PathBuf>,
    pub mode: DisplayMode,
    pub mouse: bool,
    pub log_target: LogTarget,
}

/// Command-line overrides; each one wins over its environment variable.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub seed: Option<PathBuf>,
    pub mode: Option<String>,
    pub no_mouse: bool,
}

pub fn load_config(overrides: &Overrides) -> Result<Config> {
    resolve_config(overrides, |key| std::env::var(key).ok())
}

fn resolve_config(overrides: &Overrides, env: impl Fn(&str) -> Option<String>) -> Result<Config> {
    Ok(Config {
        seed_path: resolve_seed_path(overrides, &env),
        mode: resolve_mode(overrides, &env)?,
        mouse: resolve_mouse(overrides, &env),
        log_target: resolve_log_target(&env),
    })
}

pub fn parse_bool_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn resolve_seed_path(overrides: &Overrides, env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    overrides.seed.clone().or_else(|| {
        env("WASTEOPS_SEED_PATH")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
}

fn resolve_mode(overrides: &Overrides, env: &impl Fn(&str) -> Option<String>) -> Result<DisplayMode> {
    if let Some(value) = overrides.mode.as_deref() {
        return DisplayMode::parse(value)
            .ok_or_else(|| anyhow!("unknown --mode '{value}' (expected live or prediction)"));
    }
    match env("WASTEOPS_VIEW_MODE") {
        Some(value) if !value.trim().is_empty() => DisplayMode::parse(&value).ok_or_else(|| {
            anyhow!("unknown WASTEOPS_VIEW_MODE '{value}' (expected live or prediction)")
        }),
        _ => Ok(DisplayMode::default()),
    }
}

fn resolve_mouse(overrides: &Overrides, env: &impl Fn(&str) -> Option<String>) -> bool {
    if overrides.no_mouse {
        return false;
    }
    env("WASTEOPS_MOUSE")
        .and_then(|value| parse_bool_flag(&value))
        .unwrap_or(true)
}

fn resolve_log_target(env: &impl Fn(&str) -> Option<String>) -> LogTarget {
    let stdout_enabled = env("WASTEOPS_LOG_STDOUT")
        .and_then(|value| parse_bool_flag(&value))
        .unwrap_or(false);
    if stdout_enabled {
        return LogTarget::Stdout;
    }
    match env("WASTEOPS_LOG_FILE") {
        Some(path) if !path.trim().is_empty() => LogTarget::File(PathBuf::from(path.trim())),
        _ => LogTarget::Sink,
    }
}

pub fn init_logging(target: &LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match target {
        LogTarget::Stdout => {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        LogTarget::Sink => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
    Ok(())
}

pub fn load_registry(config: &Config) -> Result<Registry> {
    match &config.seed_path {
        Some(path) => seed::load(path)
            .with_context(|| format!("failed to load seed from {}", path.display())),
        None => seed::builtin().context("embedded seed is invalid"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn parse_bool_flag_accepts_common_values() {
        assert_eq!(parse_bool_flag("1"), Some(true));
        assert_eq!(parse_bool_flag(" YES "), Some(true));
        assert_eq!(parse_bool_flag("off"), Some(false));
        assert_eq!(parse_bool_flag("sometimes"), None);
    }

    #[test]
    fn defaults_without_flags_or_env() {
        let config = resolve_config(&Overrides::default(), env_of(&[])).expect("config");
        assert_eq!(config.seed_path, None);
        assert_eq!(config.mode, DisplayMode::Live);
        assert!(config.mouse);
        assert_eq!(config.log_target, LogTarget::Sink);
    }

    #[test]
    fn env_values_are_used_when_flags_absent() {
        let env = env_of(&[
            ("WASTEOPS_SEED_PATH", "/tmp/seed.json"),
            ("WASTEOPS_VIEW_MODE", "prediction"),
            ("WASTEOPS_MOUSE", "0"),
            ("WASTEOPS_LOG_FILE", "/tmp/wasteops.log"),
        ]);
        let config = resolve_config(&Overrides::default(), env).expect("config");
        assert_eq!(config.seed_path, Some(PathBuf::from("/tmp/seed.json")));
        assert_eq!(config.mode, DisplayMode::Prediction);
        assert!(!config.mouse);
        assert_eq!(
            config.log_target,
            LogTarget::File(PathBuf::from("/tmp/wasteops.log"))
        );
    }

    #[test]
    fn flags_win_over_env() {
        let env = env_of(&[
            ("WASTEOPS_SEED_PATH", "/tmp/env.json"),
            ("WASTEOPS_VIEW_MODE", "prediction"),
            ("WASTEOPS_LOG_STDOUT", "true"),
            ("WASTEOPS_LOG_FILE", "/tmp/ignored.log"),
        ]);
        let overrides = Overrides {
            seed: Some(PathBuf::from("/tmp/flag.json")),
            mode: Some("live".to_string()),
            no_mouse: true,
        };
        let config = resolve_config(&overrides, env).expect("config");
        assert_eq!(config.seed_path, Some(PathBuf::from("/tmp/flag.json")));
        assert_eq!(config.mode, DisplayMode::Live);
        assert!(!config.mouse);
        assert_eq!(config.log_target, LogTarget::Stdout);
    }

    #[test]
    fn rejects_unknown_mode() {
        let overrides = Overrides {
            mode: Some("heatmap".to_string()),
            ..Overrides::default()
        };
        assert!(resolve_config(&overrides, env_of(&[])).is_err());
        let env = env_of(&[("WASTEOPS_VIEW_MODE", "heatmap")]);
        assert!(resolve_config(&Overrides::default(), env).is_err());
    }

    #[test]
    fn builtin_registry_when_no_seed_path() {
        let config = resolve_config(&Overrides::default(), env_of(&[])).expect("config");
        let registry = load_registry(&config).expect("registry");
        assert_eq!(registry.issues().len(), 13);
    }
}
