//! Rule evaluation with cooldown suppression.
//!
//! # Evaluation (per rule, per pass)
//! ```text
//! fired < cooldown ago?  → skip: no fire, no resolve
//! condition() == true    → read current_value(), new active instance,
//!                          append to history, remember fire time
//! condition() == false   → resolve the active instance, if any
//! Err or panic           → log, count as failed, continue with next rule
//! ```
//!
//! # Design Decisions
//! - Cooldown suppresses re-evaluation, not just re-firing: an alert stays
//!   active for up to one cooldown after its condition clears
//! - Rule functions run without the state lock held
//! - History is a bounded ring buffer, not an audit log

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tokio::sync::broadcast;

use crate::alerts::rule::AlertRule;
use crate::alerts::types::{AlertError, AlertEvent, AlertInstance, EvaluationSummary};
use crate::metrics::MetricsStore;
use crate::time::now_millis;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct AlertState {
    last_fired: HashMap<String, u64>,
    active: HashMap<String, AlertInstance>,
    history: VecDeque<AlertInstance>,
}

enum Outcome {
    Fired,
    Resolved,
    Unchanged,
    CoolingDown,
    Failed,
}

/// Evaluates registered rules against a shared metrics store.
pub struct AlertEngine {
    metrics: Arc<MetricsStore>,
    rules: RwLock<Vec<Arc<AlertRule>>>,
    state: Mutex<AlertState>,
    history_capacity: usize,
    /// Serializes evaluation passes.
    pass: Mutex<()>,
    events: broadcast::Sender<AlertEvent>,
}

impl AlertEngine {
    pub fn new(metrics: Arc<MetricsStore>, history_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            metrics,
            rules: RwLock::new(Vec::new()),
            state: Mutex::new(AlertState::default()),
            history_capacity: history_capacity.max(1),
            pass: Mutex::new(()),
            events,
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsStore> {
        &self.metrics
    }

    fn state(&self) -> MutexGuard<'_, AlertState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a rule, replacing any rule with the same name.
    pub fn register_rule(&self, rule: AlertRule) {
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(rule = %rule.name, severity = ?rule.severity, "Alert rule registered");
        match rules.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => *existing = Arc::new(rule),
            None => rules.push(Arc::new(rule)),
        }
    }

    /// Remove a rule along with its active alert and cooldown state.
    pub fn unregister_rule(&self, name: &str) -> bool {
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        let before = rules.len();
        rules.retain(|r| r.name != name);
        let removed = rules.len() != before;
        drop(rules);

        if removed {
            let mut state = self.state();
            state.active.remove(name);
            state.last_fired.remove(name);
        }
        removed
    }

    fn is_registered(&self, name: &str) -> bool {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|r| r.name == name)
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    /// Subscribe to fire/resolve transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.events.subscribe()
    }

    /// Run one evaluation pass against the wall clock.
    pub fn evaluate(&self) -> EvaluationSummary {
        self.evaluate_at(now_millis())
    }

    /// Run one evaluation pass at `now` (epoch milliseconds).
    pub fn evaluate_at(&self, now: u64) -> EvaluationSummary {
        let _pass = self.pass.lock().unwrap_or_else(PoisonError::into_inner);
        let rules: Vec<Arc<AlertRule>> = self
            .rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut summary = EvaluationSummary::default();
        for rule in &rules {
            let bucket = match self.evaluate_rule(rule, now) {
                Outcome::Fired => &mut summary.fired,
                Outcome::Resolved => &mut summary.resolved,
                Outcome::CoolingDown => &mut summary.cooling_down,
                Outcome::Failed => &mut summary.failed,
                Outcome::Unchanged => continue,
            };
            bucket.push(rule.name.clone());
        }
        summary
    }

    fn evaluate_rule(&self, rule: &AlertRule, now: u64) -> Outcome {
        if let Some(&last) = self.state().last_fired.get(&rule.name) {
            if now.saturating_sub(last) < rule.cooldown_ms() {
                return Outcome::CoolingDown;
            }
        }

        let violated = match guarded(|| rule.condition(&self.metrics)) {
            Ok(violated) => violated,
            Err(e) => {
                tracing::error!(rule = %rule.name, error = %e, "Alert condition failed");
                return Outcome::Failed;
            }
        };

        if !violated {
            return self.resolve(rule, now);
        }

        match guarded(|| rule.current_value(&self.metrics)) {
            Ok(value) => self.fire(rule, value, now),
            Err(e) => {
                tracing::error!(rule = %rule.name, error = %e, "Alert value read failed");
                Outcome::Failed
            }
        }
    }

    fn fire(&self, rule: &AlertRule, value: f64, now: u64) -> Outcome {
        let instance = AlertInstance {
            rule_name: rule.name.clone(),
            severity: rule.severity,
            message: rule.message.clone(),
            value,
            threshold: rule.threshold,
            timestamp: now,
            resolved: false,
            resolved_at: None,
        };

        {
            let mut state = self.state();
            // Checked under the state lock: unregister_rule clears state after
            // dropping the rule, so either it sees this alert or we see its removal.
            if !self.is_registered(&rule.name) {
                tracing::debug!(rule = %rule.name, "Rule unregistered during evaluation, not firing");
                return Outcome::Unchanged;
            }
            state.active.insert(rule.name.clone(), instance.clone());
            if state.history.len() >= self.history_capacity {
                state.history.pop_front();
            }
            state.history.push_back(instance.clone());
            state.last_fired.insert(rule.name.clone(), now);
        }

        tracing::warn!(
            rule = %rule.name,
            severity = ?rule.severity,
            value,
            threshold = rule.threshold,
            "Alert fired: {}",
            rule.message
        );
        let _ = self.events.send(AlertEvent::Fired(instance));
        Outcome::Fired
    }

    fn resolve(&self, rule: &AlertRule, now: u64) -> Outcome {
        let resolved = {
            let mut state = self.state();
            let Some(mut instance) = state.active.remove(&rule.name) else {
                return Outcome::Unchanged;
            };
            instance.resolved = true;
            instance.resolved_at = Some(now);

            if let Some(entry) = state
                .history
                .iter_mut()
                .rev()
                .find(|h| h.rule_name == instance.rule_name && h.timestamp == instance.timestamp)
            {
                entry.resolved = true;
                entry.resolved_at = Some(now);
            }
            instance
        };

        tracing::info!(rule = %rule.name, "Alert resolved");
        let _ = self.events.send(AlertEvent::Resolved(resolved));
        Outcome::Resolved
    }

    /// Currently active alerts, oldest first.
    pub fn active_alerts(&self) -> Vec<AlertInstance> {
        let mut active: Vec<AlertInstance> = self.state().active.values().cloned().collect();
        active.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.rule_name.cmp(&b.rule_name))
        });
        active
    }

    /// Active alert for one rule.
    pub fn active_alert(&self, rule_name: &str) -> Option<AlertInstance> {
        self.state().active.get(rule_name).cloned()
    }

    /// Recent alert instances, oldest first.
    pub fn alert_history(&self) -> Vec<AlertInstance> {
        self.state().history.iter().cloned().collect()
    }
}

/// Run a rule function, turning a panic into an error.
fn guarded<T>(f: impl FnOnce() -> Result<T, AlertError>) -> Result<T, AlertError> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(AlertError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
