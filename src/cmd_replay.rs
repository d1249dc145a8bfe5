//! `webtrail replay`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use webtrail_cdp::{BrowserManager, BrowserManagerConfig};
use webtrail_config::Config;
use webtrail_protocols::{BrowserDriver, Variables, Workflow};
use webtrail_replay::render::render_text;
use webtrail_replay::{ReplayController, ReplayOptions};

use crate::cli::ReplayArgs;

/// Variables from a TOML or JSON file. Non-string scalars are stringified.
pub(crate) fn load_vars_file(path: &Path) -> anyhow::Result<Variables> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let mut vars = Variables::new();
    if is_json {
        let value: serde_json::Value = serde_json::from_str(&content)?;
        let Some(map) = value.as_object() else {
            bail!("{} must contain a JSON object", path.display());
        };
        for (key, value) in map {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    bail!("variable '{}' must be a scalar", key)
                }
                other => other.to_string(),
            };
            vars.insert(key.clone(), text);
        }
    } else {
        let table: toml::Table = toml::from_str(&content)?;
        for (key, value) in table {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Table(_) | toml::Value::Array(_) => {
                    bail!("variable '{}' must be a scalar", key)
                }
                other => other.to_string(),
            };
            vars.insert(key, text);
        }
    }
    Ok(vars)
}

/// File vars first, then `--var` overrides.
fn collect_vars(args: &ReplayArgs) -> anyhow::Result<Variables> {
    let mut vars = match &args.vars_file {
        Some(path) => load_vars_file(path)?,
        None => Variables::new(),
    };
    vars.extend(args.vars.iter().cloned());
    Ok(vars)
}

fn apply_overrides(config: &mut Config, args: &ReplayArgs) {
    let replay = &mut config.replay;
    if let Some(n) = args.max_retries {
        replay.max_retries = n;
    }
    if let Some(ms) = args.retry_delay_ms {
        replay.retry_delay_ms = ms;
    }
    replay.stop_on_error |= args.stop_on_error;
    replay.debug |= args.debug;
    if let Some(dir) = &args.debug_dir {
        replay.debug_dir = dir.clone();
    }
}

fn default_report_path(workflow: &Path) -> PathBuf {
    let stem = workflow
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workflow".to_string());
    workflow.with_file_name(format!("{}.report.json", stem))
}

pub(crate) async fn run_replay(mut config: Config, args: ReplayArgs) -> anyhow::Result<ExitCode> {
    apply_overrides(&mut config, &args);
    let content = std::fs::read_to_string(&args.workflow)
        .with_context(|| format!("reading {}", args.workflow.display()))?;
    let workflow = Workflow::from_json(&content)
        .with_context(|| format!("parsing {}", args.workflow.display()))?;
    let vars = collect_vars(&args)?;

    let manager = BrowserManager::new(BrowserManagerConfig::from(&config.browser));
    let driver: Arc<dyn BrowserDriver> = Arc::new(manager.open_driver().await?);
    let controller = ReplayController::new(driver, ReplayOptions::from(&config));

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current action");
            on_signal.cancel();
        }
    });

    let report = controller.execute_with_cancel(&workflow, &vars, cancel).await;
    watcher.abort();

    println!("{}", render_text(&report, &workflow.name));
    let report_path = args
        .report
        .clone()
        .unwrap_or_else(|| default_report_path(&args.workflow));
    std::fs::write(&report_path, report.to_json()?)
        .with_context(|| format!("writing {}", report_path.display()))?;
    info!("Report written to {}", report_path.display());
    let _ = manager.close().await;

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_toml_vars() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vars.toml");
        std::fs::write(&path, "username = \"ada\"\nretries = 3\n").unwrap();

        let vars = load_vars_file(&path).unwrap();
        assert_eq!(vars["username"], "ada");
        assert_eq!(vars["retries"], "3");
    }

    #[test]
    fn test_load_json_vars_rejects_nested() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vars.json");
        std::fs::write(&path, r#"{"password": "x", "flag": true}"#).unwrap();
        let vars = load_vars_file(&path).unwrap();
        assert_eq!(vars["flag"], "true");

        std::fs::write(&path, r#"{"nested": {"a": 1}}"#).unwrap();
        assert!(load_vars_file(&path).is_err());
    }

    #[test]
    fn test_default_report_path() {
        assert_eq!(
            default_report_path(Path::new("flows/login.json")),
            PathBuf::from("flows/login.report.json")
        );
    }
}
