//! Channel/event binding registry.
//!
//! Maps a channel name to the callbacks bound on it, keyed by event
//! name. Dispatch invokes exactly the callbacks whose channel AND event
//! both match — events on other channels or under other names never
//! reach a callback.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

/// Callback invoked with the published payload, as-is.
pub type EventCallback = Arc<dyn Fn(serde_json::Value) + Send + Sync>;

struct Binding {
    id: Uuid,
    event: String,
    callback: EventCallback,
}

/// Lock-guarded registry of channel bindings.
#[derive(Default)]
pub struct BindingRegistry {
    inner: RwLock<HashMap<String, Vec<Binding>>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a callback to `event` on `channel`.
    ///
    /// Returns the binding id and whether this is the first binding on
    /// the channel (meaning a subscribe frame should be sent).
    pub fn bind(&self, channel: &str, event: &str, callback: EventCallback) -> (Uuid, bool) {
        let id = Uuid::new_v4();
        let mut inner = self.inner.write().unwrap();
        let bindings = inner.entry(channel.to_string()).or_default();
        let first_on_channel = bindings.is_empty();
        bindings.push(Binding {
            id,
            event: event.to_string(),
            callback,
        });
        (id, first_on_channel)
    }

    /// Remove one binding by id.
    ///
    /// Returns `true` when the channel has no bindings left (meaning an
    /// unsubscribe frame should be sent).
    pub fn unbind(&self, channel: &str, id: Uuid) -> bool {
        let mut inner = self.inner.write().unwrap();
        let Some(bindings) = inner.get_mut(channel) else {
            return false;
        };
        bindings.retain(|b| b.id != id);
        if bindings.is_empty() {
            inner.remove(channel);
            true
        } else {
            false
        }
    }

    /// Invoke every callback bound to exactly this channel and event.
    ///
    /// Returns the number of callbacks invoked. Callbacks run on the
    /// caller's task; the payload is cloned per callback and passed
    /// through untouched.
    pub fn dispatch(&self, channel: &str, event: &str, payload: &serde_json::Value) -> usize {
        // Clone the matching callbacks out so user code runs without
        // holding the registry lock.
        let matching: Vec<EventCallback> = {
            let inner = self.inner.read().unwrap();
            inner
                .get(channel)
                .map(|bindings| {
                    bindings
                        .iter()
                        .filter(|b| b.event == event)
                        .map(|b| Arc::clone(&b.callback))
                        .collect()
                })
                .unwrap_or_default()
        };

        for callback in &matching {
            callback(payload.clone());
        }
        matching.len()
    }

    /// Names of all channels with at least one binding, for
    /// resubscription after a reconnect.
    pub fn channels(&self) -> Vec<String> {
        self.inner.read().unwrap().keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter_callback(counter: Arc<AtomicUsize>) -> EventCallback {
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn dispatch_invokes_exact_channel_and_event_match() {
        let registry = BindingRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        registry.bind("job-42", "result", counter_callback(Arc::clone(&hits)));

        let invoked = registry.dispatch("job-42", "result", &serde_json::json!({}));
        assert_eq!(invoked, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_ignores_other_channels() {
        let registry = BindingRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        registry.bind("job-42", "result", counter_callback(Arc::clone(&hits)));

        assert_eq!(registry.dispatch("job-43", "result", &serde_json::json!({})), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dispatch_ignores_other_event_names() {
        let registry = BindingRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        registry.bind("job-42", "result", counter_callback(Arc::clone(&hits)));

        assert_eq!(registry.dispatch("job-42", "progress", &serde_json::json!({})), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dispatch_passes_payload_through_untouched() {
        let registry = BindingRegistry::new();
        let seen: Arc<std::sync::Mutex<Option<serde_json::Value>>> =
            Arc::new(std::sync::Mutex::new(None));
        let seen_clone = Arc::clone(&seen);
        registry.bind(
            "job-1",
            "result",
            Arc::new(move |payload| {
                *seen_clone.lock().unwrap() = Some(payload);
            }),
        );

        let payload = serde_json::json!({"images": ["a.avif"], "nested": {"k": 1}});
        registry.dispatch("job-1", "result", &payload);
        assert_eq!(seen.lock().unwrap().clone(), Some(payload));
    }

    #[test]
    fn first_binding_flag_tracks_channel_novelty() {
        let registry = BindingRegistry::new();
        let (_, first) = registry.bind("job-1", "result", Arc::new(|_| {}));
        assert!(first);
        let (_, first) = registry.bind("job-1", "progress", Arc::new(|_| {}));
        assert!(!first);
        let (_, first) = registry.bind("job-2", "result", Arc::new(|_| {}));
        assert!(first);
    }

    #[test]
    fn unbind_removes_only_the_given_binding() {
        let registry = BindingRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let (id, _) = registry.bind("job-1", "result", Arc::new(|_| {}));
        registry.bind("job-1", "result", counter_callback(Arc::clone(&hits)));

        let empty = registry.unbind("job-1", id);
        assert!(!empty);
        assert_eq!(registry.dispatch("job-1", "result", &serde_json::json!({})), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unbind_reports_empty_channel() {
        let registry = BindingRegistry::new();
        let (id, _) = registry.bind("job-1", "result", Arc::new(|_| {}));
        assert!(registry.unbind("job-1", id));
        assert!(registry.is_empty());
    }

    #[test]
    fn unbind_unknown_channel_is_a_no_op() {
        let registry = BindingRegistry::new();
        assert!(!registry.unbind("job-404", Uuid::new_v4()));
    }

    #[test]
    fn channels_lists_bound_channels() {
        let registry = BindingRegistry::new();
        registry.bind("job-1", "result", Arc::new(|_| {}));
        registry.bind("job-2", "result", Arc::new(|_| {}));
        let mut channels = registry.channels();
        channels.sort();
        assert_eq!(channels, vec!["job-1", "job-2"]);
    }
}
