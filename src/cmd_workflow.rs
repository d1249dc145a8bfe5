//! `webtrail inspect` and `webtrail config`.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use webtrail_config::{Config, ConfigLoader, ConfigValidator};
use webtrail_protocols::Workflow;

pub(crate) fn inspect(path: &Path) -> anyhow::Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let workflow = Workflow::from_json(&content)?;

    println!("{} ({})", workflow.name, workflow.id);
    println!("platform: {}  type: {}", workflow.platform, workflow.workflow_type);
    for (index, action) in workflow.actions.iter().enumerate() {
        let target = action
            .backup_selector
            .as_deref()
            .map(|s| format!(" [{}]", s))
            .unwrap_or_default();
        let flag = if action.is_executable() { "" } else { "  (not executable)" };
        println!(
            "  {:>3}  {:<9} {:<14} {}{}{}",
            index,
            action.action_type.as_str(),
            action.resolution_mode.as_str(),
            action.name,
            target,
            flag
        );
    }

    let required = workflow.required_variables();
    if required.is_empty() {
        println!("No template variables");
    } else {
        println!("Required variables: {}", required.join(", "));
    }
    Ok(())
}

pub(crate) fn show_config(config: &Config, validate: bool) -> anyhow::Result<ExitCode> {
    println!("{}", ConfigLoader::to_toml(config)?);
    if !validate {
        return Ok(ExitCode::SUCCESS);
    }

    let result = ConfigValidator::validate(config)?;
    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }
    if result.is_valid() {
        println!("Configuration is valid");
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
