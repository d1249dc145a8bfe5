//! Raw event stream to normalized Action list.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};
use webtrail_config::CompilerConfig;
use webtrail_protocols::{Action, ActionType, ResolutionMode, VisualDescriptor};

use crate::event::{RawEvent, RawEventKind};

const MAX_NAME_LABEL: usize = 40;

/// Compiles captured events into replayable actions.
///
/// - consecutive typing on the same target collapses into one action holding the latest value
/// - a randomized wait goes between events closer together than `wait_gap_ms`
/// - click/type/upload events without a valid descriptor keep only their selector,
///   or are dropped when they have none
#[derive(Debug, Clone)]
pub struct ActionCompiler {
    wait_gap: i64,
    wait_range: (u64, u64),
    default_mode: ResolutionMode,
}

impl ActionCompiler {
    pub fn new(config: &CompilerConfig) -> Self {
        let default_mode = config.default_resolution_mode.parse().unwrap_or_else(|e| {
            warn!("{}, using selectorFirst", e);
            ResolutionMode::SelectorFirst
        });
        let (min, max) = (config.wait_min_ms, config.wait_max_ms);
        Self {
            wait_gap: config.wait_gap_ms as i64,
            wait_range: (min.min(max), min.max(max)),
            default_mode,
        }
    }

    pub fn compile(&self, events: &[RawEvent]) -> Vec<Action> {
        self.compile_with_rng(events, &mut rand::thread_rng())
    }

    pub fn compile_with_rng<R: Rng + ?Sized>(&self, events: &[RawEvent], rng: &mut R) -> Vec<Action> {
        let merged = merge_typing(events);
        let mut actions: Vec<Action> = Vec::with_capacity(merged.len() * 2);
        let mut last_ts: Option<i64> = None;

        for (event, ended_at) in merged {
            let Some(action) = self.to_action(&event) else {
                continue;
            };
            let just_waited = actions
                .last()
                .is_some_and(|a| a.action_type == ActionType::Wait);
            if let Some(prev) = last_ts {
                if event.timestamp - prev < self.wait_gap && !just_waited {
                    let ms = rng.gen_range(self.wait_range.0..=self.wait_range.1);
                    actions.push(Action::wait(Duration::from_millis(ms)));
                }
            }
            last_ts = Some(ended_at);
            actions.push(action);
        }

        debug!("Compiled {} raw events into {} actions", events.len(), actions.len());
        actions
    }

    fn to_action(&self, event: &RawEvent) -> Option<Action> {
        match event.kind {
            RawEventKind::Navigate => {
                let url = event.value.as_deref().filter(|u| !u.is_empty())?;
                Some(Action::navigate(url))
            }
            RawEventKind::Scroll => {
                let params = event.params.as_ref()?;
                Some(Action::scroll(params["x"].as_f64()?, params["y"].as_f64()?))
            }
            RawEventKind::Click | RawEventKind::Type | RawEventKind::Upload => self.to_targeted(event),
        }
    }

    fn to_targeted(&self, event: &RawEvent) -> Option<Action> {
        let visual = event.visual.clone().filter(VisualDescriptor::validate);
        let selector = event.selector.clone().filter(|s| !s.is_empty());
        let mode = match (&visual, &selector) {
            (Some(_), _) => self.default_mode,
            (None, Some(_)) => ResolutionMode::SelectorFirst,
            (None, None) => {
                debug!("Dropping {:?} at {} with no usable target", event.kind, event.timestamp);
                return None;
            }
        };
        let label = target_label(visual.as_ref());

        let action = match event.kind {
            RawEventKind::Click => Action::click(format!("Click {}", label), visual, selector),
            RawEventKind::Type => {
                let value = match event.sensitive {
                    Some(field) => field.placeholder(),
                    None => event.value.clone().unwrap_or_default(),
                };
                Action::type_text(format!("Type into {}", label), visual, selector, value)
            }
            _ => {
                let files = event
                    .params
                    .as_ref()
                    .and_then(|p| p["files"].as_array())
                    .map(|files| {
                        files
                            .iter()
                            .filter_map(|f| f.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                Action::upload(format!("Upload to {}", label), visual, selector, files)
            }
        };
        Some(action.with_resolution_mode(mode))
    }
}

/// Collapse runs of typing on the same target, keeping the first descriptor and the last value.
///
/// Each merged event is paired with the timestamp of the last raw event it absorbed.
fn merge_typing(events: &[RawEvent]) -> Vec<(RawEvent, i64)> {
    let mut out: Vec<(RawEvent, i64)> = Vec::with_capacity(events.len());
    for event in events {
        if let Some((prev, ended_at)) = out.last_mut() {
            if prev.kind == RawEventKind::Type
                && event.kind == RawEventKind::Type
                && prev.target_key().is_some()
                && prev.target_key() == event.target_key()
            {
                prev.value = event.value.clone();
                prev.sensitive = prev.sensitive.or(event.sensitive);
                *ended_at = event.timestamp;
                continue;
            }
        }
        out.push((event.clone(), event.timestamp));
    }
    out
}

fn target_label(visual: Option<&VisualDescriptor>) -> String {
    let Some(visual) = visual else {
        return "element".to_string();
    };
    let text = [Some(visual.text.as_str()), visual.placeholder.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty());
    match text {
        Some(text) => format!("\"{}\"", text.chars().take(MAX_NAME_LABEL).collect::<String>()),
        None => visual.tag.clone().unwrap_or_else(|| "element".to_string()),
    }
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
