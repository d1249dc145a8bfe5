//! Sequential workflow execution with per-action retry.

mod perform;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use webtrail_config::{Config, RelaxationConfig};
use webtrail_protocols::{
    Action, ActionArtifacts, ActionResult, BrowserDriver, ErrorKind, ErrorRecord, ExecutionReport,
    ResolutionMethod, Variables, Workflow,
};

use crate::artifacts::ArtifactStore;
use crate::error::ReplayError;
use crate::relaxation::RelaxationPolicy;
use crate::render::{render_html, render_text};
use crate::resolution::{ResolutionEngine, SearchCriteria};
use crate::template::{apply_variables, missing_variables};

/// Replay behaviour.
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Retries after the first attempt; an action runs at most `max_retries + 1` times.
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub stop_on_error: bool,
    pub debug: bool,
    pub debug_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    /// Overall budget for the run, checked between actions.
    pub timeout: Option<Duration>,
    pub relaxation: RelaxationConfig,
    pub stability_idle: Duration,
    pub stability_timeout: Duration,
}

impl From<&Config> for ReplayOptions {
    fn from(config: &Config) -> Self {
        let replay = &config.replay;
        Self {
            max_retries: replay.max_retries,
            retry_delay: replay.retry_delay(),
            stop_on_error: replay.stop_on_error,
            debug: replay.debug,
            debug_dir: replay.debug_dir.clone(),
            artifacts_dir: replay.artifacts_dir.clone(),
            timeout: replay.timeout(),
            relaxation: config.relaxation.clone(),
            stability_idle: config.recorder.stability_idle(),
            stability_timeout: config.recorder.stability_timeout(),
        }
    }
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Everything one run needs, threaded through the per-action helpers.
struct RunContext<'a> {
    workflow: &'a Workflow,
    vars: &'a Variables,
    token: &'a CancellationToken,
    evidence: ArtifactStore,
    debug: Option<ArtifactStore>,
}

/// Drives a workflow against one browser page.
///
/// Actions run strictly in order. A failed action is retried with relaxed
/// resolution thresholds; once its retries are spent it is recorded with
/// evidence and the run continues unless `stop_on_error` is set. A run always
/// ends with an [`ExecutionReport`], including when cancelled.
pub struct ReplayController {
    driver: Arc<dyn BrowserDriver>,
    engine: ResolutionEngine,
    policy: RelaxationPolicy,
    options: ReplayOptions,
}

impl ReplayController {
    pub fn new(driver: Arc<dyn BrowserDriver>, options: ReplayOptions) -> Self {
        Self {
            driver,
            engine: ResolutionEngine::new(),
            policy: RelaxationPolicy::new(&options.relaxation),
            options,
        }
    }

    pub fn options(&self) -> &ReplayOptions {
        &self.options
    }

    pub async fn execute(&self, workflow: &Workflow, vars: &Variables) -> ExecutionReport {
        self.execute_with_cancel(workflow, vars, CancellationToken::new())
            .await
    }

    /// Like [`execute`](Self::execute), stopping at the next action boundary
    /// once `cancel` fires. The action in flight is allowed to finish.
    pub async fn execute_with_cancel(
        &self,
        workflow: &Workflow,
        vars: &Variables,
        cancel: CancellationToken,
    ) -> ExecutionReport {
        let start_time = Utc::now();
        info!(
            "Replaying workflow '{}' ({}, {} actions)",
            workflow.name,
            workflow.id,
            workflow.len()
        );

        let token = cancel.child_token();
        let ctx = RunContext {
            workflow,
            vars,
            token: &token,
            evidence: ArtifactStore::new(self.options.artifacts_dir.join(&workflow.id)),
            debug: self
                .options
                .debug
                .then(|| ArtifactStore::new(self.options.debug_dir.join(&workflow.id))),
        };

        let missing = missing_variables(workflow, vars);
        if !missing.is_empty() {
            let message = format!("missing template variables: {}", missing.join(", "));
            error!("Cannot replay '{}': {}", workflow.name, message);
            let record = ErrorRecord::new(ErrorKind::ConfigurationError, message);
            return self
                .finish(&ctx, start_time, Vec::new(), vec![record], false)
                .await;
        }

        let timer = self.options.timeout.map(|limit| {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                token.cancel();
            })
        });

        let mut results = Vec::with_capacity(workflow.len());
        let mut errors = Vec::new();
        let mut cancelled = false;
        for (index, action) in workflow.actions.iter().enumerate() {
            if token.is_cancelled() {
                cancelled = true;
                let reason = if cancel.is_cancelled() { "cancelled" } else { "timed out" };
                warn!(
                    "Replay of '{}' {} before action {} of {}",
                    workflow.name,
                    reason,
                    index,
                    workflow.len()
                );
                break;
            }

            let (result, failure) = self.run_action(&ctx, index, action).await;
            let failed = !result.success;
            results.push(result);
            errors.extend(failure);
            if failed && self.options.stop_on_error {
                warn!("Stopping '{}' after failed action {}", workflow.name, index);
                break;
            }
        }
        if let Some(timer) = timer {
            timer.abort();
        }

        self.finish(&ctx, start_time, results, errors, cancelled).await
    }

    async fn run_action(
        &self,
        ctx: &RunContext<'_>,
        index: usize,
        action: &Action,
    ) -> (ActionResult, Option<ErrorRecord>) {
        let started = Instant::now();
        let mut artifacts = ActionArtifacts::default();
        let mut attempt: u32 = 0;

        let outcome = match apply_variables(action, ctx.vars) {
            Err(e) => Err(ReplayError::Configuration(e.to_string())),
            Ok(resolved) => {
                if let Some(store) = &ctx.debug {
                    artifacts.before = self.capture(store, &format!("{:03}-before.png", index)).await;
                }
                loop {
                    let thresholds = self.policy.at(attempt);
                    debug!(
                        "Action {} '{}' attempt {} (tolerance {:.1}%, min confidence {:.2})",
                        index,
                        action.name,
                        attempt + 1,
                        thresholds.tolerance,
                        thresholds.min_confidence
                    );
                    match self.perform(index, &resolved, thresholds, ctx.debug.as_ref()).await {
                        Ok(done) => break Ok(done),
                        Err(e) if e.is_retryable() && attempt < self.options.max_retries => {
                            debug!("Action {} attempt {} failed: {}", index, attempt + 1, e);
                            let interrupted = tokio::select! {
                                _ = ctx.token.cancelled() => true,
                                _ = tokio::time::sleep(self.options.retry_delay) => false,
                            };
                            if interrupted {
                                break Err(e);
                            }
                            attempt += 1;
                        }
                        Err(e) => break Err(e),
                    }
                }
            }
        };

        if let Some(store) = &ctx.debug {
            artifacts.after = self.capture(store, &format!("{:03}-after.png", index)).await;
        }
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(done) => {
                artifacts.highlight = done.highlight;
                info!(
                    "Action {} '{}' done via {} ({:.2}, {} retries, {} ms)",
                    index, action.name, done.method, done.confidence, attempt, duration_ms
                );
                let result = ActionResult {
                    index,
                    name: action.name.clone(),
                    action_type: action.action_type,
                    success: true,
                    method: done.method,
                    confidence: done.confidence,
                    retries: attempt,
                    duration_ms,
                    error: None,
                    artifacts: (!artifacts.is_empty()).then_some(artifacts),
                };
                (result, None)
            }
            Err(e) => {
                let record = self.record_failure(ctx, index, action, &e, attempt + 1).await;
                let result = ActionResult {
                    index,
                    name: action.name.clone(),
                    action_type: action.action_type,
                    success: false,
                    method: ResolutionMethod::None,
                    confidence: 0.0,
                    retries: attempt,
                    duration_ms,
                    error: Some(e.to_string()),
                    artifacts: (!artifacts.is_empty()).then_some(artifacts),
                };
                (result, Some(record))
            }
        }
    }

    /// Evidence for a failed action: screenshot, current URL and the search
    /// criteria of the last attempt.
    async fn record_failure(
        &self,
        ctx: &RunContext<'_>,
        index: usize,
        action: &Action,
        err: &ReplayError,
        attempts: u32,
    ) -> ErrorRecord {
        let url = self.driver.current_url().await.ok();
        let screenshot = self
            .capture(&ctx.evidence, &format!("action-{:03}-failure.png", index))
            .await;
        let criteria = err.criteria().map(SearchCriteria::to_json);

        warn!(
            action = index,
            url = url.as_deref().unwrap_or("unknown"),
            attempts,
            screenshot = ?screenshot,
            criteria = %criteria.as_ref().map(|c| c.to_string()).unwrap_or_default(),
            "Action '{}' failed: {}",
            action.name,
            err
        );

        let mut record = ErrorRecord::new(err.kind(), err.to_string()).for_action(index, &action.name);
        record.url = url;
        record.screenshot = screenshot;
        record.criteria = criteria;
        record.attempt = attempts;
        record
    }

    /// Viewport screenshot into `store`. Failures only cost the artifact.
    async fn capture(&self, store: &ArtifactStore, name: &str) -> Option<PathBuf> {
        let png = match self.driver.screenshot(None).await {
            Ok(png) => png,
            Err(e) => {
                debug!("Screenshot {} skipped: {}", name, e);
                return None;
            }
        };
        match store.write(name, &png).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to write {}: {}", name, e);
                None
            }
        }
    }

    async fn finish(
        &self,
        ctx: &RunContext<'_>,
        start_time: DateTime<Utc>,
        results: Vec<ActionResult>,
        errors: Vec<ErrorRecord>,
        cancelled: bool,
    ) -> ExecutionReport {
        let workflow = ctx.workflow;
        let report = ExecutionReport::from_results(
            workflow.id.clone(),
            start_time,
            Utc::now(),
            results,
            errors,
            cancelled,
        );
        let stats = &report.overall_stats;
        info!(
            "Workflow '{}' finished: {}/{} succeeded ({:.1}%), {} errors{}",
            workflow.name,
            stats.successful,
            stats.total,
            stats.success_rate,
            report.errors.len(),
            if cancelled { ", cancelled" } else { "" }
        );

        if let Some(store) = &ctx.debug {
            self.write_reports(store, workflow, &report).await;
        }
        report
    }

    async fn write_reports(&self, store: &ArtifactStore, workflow: &Workflow, report: &ExecutionReport) {
        let json = match report.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize report: {}", e);
                return;
            }
        };
        let files = [
            ("report.json", json),
            ("report.txt", render_text(report, &workflow.name)),
            ("report.html", render_html(report, &workflow.name)),
        ];
        for (name, body) in files {
            if let Err(e) = store.write(name, body.as_bytes()).await {
                warn!("Failed to write {}: {}", name, e);
            }
        }
        info!("Debug report written to {}", store.root().display());
    }
}
