//! Extension points
//!
//! Listeners are registered explicitly against an [`EventKind`] and receive
//! the event payload together with a mutable [`EventResult`] they can add
//! responses to. Dispatch runs listeners in registration order and stops
//! early once a listener calls [`EventResult::stop`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::limits::LimitSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    BeforeEditUser,
    AfterEditUser,
    BeforeEditDomain,
    AfterEditDomain,
    GetJsTranslations,
}

/// Event payload, read-only for listeners
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PanelEvent {
    BeforeEditUser { user_id: i64, limits: LimitSet },
    AfterEditUser { user_id: i64, limits: LimitSet },
    BeforeEditDomain { domain_id: i64, domain_name: String },
    AfterEditDomain { domain_id: i64, domain_name: String },
    GetJsTranslations,
}

impl PanelEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PanelEvent::BeforeEditUser { .. } => EventKind::BeforeEditUser,
            PanelEvent::AfterEditUser { .. } => EventKind::AfterEditUser,
            PanelEvent::BeforeEditDomain { .. } => EventKind::BeforeEditDomain,
            PanelEvent::AfterEditDomain { .. } => EventKind::AfterEditDomain,
            PanelEvent::GetJsTranslations => EventKind::GetJsTranslations,
        }
    }
}

/// JS translation namespaces: namespace -> key -> string
pub type JsTranslations = BTreeMap<String, Map<String, Value>>;

/// What listeners produced for one dispatch
#[derive(Debug, Default)]
pub struct EventResult {
    responses: Vec<Value>,
    translations: JsTranslations,
    stopped: bool,
}

impl EventResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the translation table before dispatching `GetJsTranslations`
    pub fn with_translations(translations: JsTranslations) -> Self {
        Self {
            translations,
            ..Self::default()
        }
    }

    pub fn push_response(&mut self, response: impl Into<Value>) {
        self.responses.push(response.into());
    }

    /// Skip the remaining listeners
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn first(&self) -> Option<&Value> {
        self.responses.first()
    }

    pub fn last(&self) -> Option<&Value> {
        self.responses.last()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.responses.contains(value)
    }

    pub fn responses(&self) -> &[Value] {
        &self.responses
    }

    pub fn translations_mut(&mut self) -> &mut JsTranslations {
        &mut self.translations
    }

    pub fn into_translations(self) -> JsTranslations {
        self.translations
    }
}

pub type Listener = Box<dyn Fn(&PanelEvent, &mut EventResult) + Send + Sync>;

/// Listener registry, built once at startup and shared read-only
#[derive(Default)]
pub struct EventManager {
    listeners: HashMap<EventKind, Vec<Listener>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen<F>(&mut self, kind: EventKind, listener: F)
    where
        F: Fn(&PanelEvent, &mut EventResult) + Send + Sync + 'static,
    {
        self.listeners.entry(kind).or_default().push(Box::new(listener));
    }

    pub fn has_listeners(&self, kind: EventKind) -> bool {
        self.listeners.get(&kind).is_some_and(|l| !l.is_empty())
    }

    pub fn dispatch(&self, event: &PanelEvent) -> EventResult {
        self.dispatch_with(event, EventResult::new())
    }

    /// Dispatch with a pre-filled result
    pub fn dispatch_with(&self, event: &PanelEvent, mut result: EventResult) -> EventResult {
        let kind = event.kind();
        let Some(listeners) = self.listeners.get(&kind) else {
            return result;
        };

        debug!(?kind, count = listeners.len(), "Dispatching event");
        for listener in listeners {
            listener(event, &mut result);
            if result.is_stopped() {
                debug!(?kind, "Event propagation stopped");
                break;
            }
        }
        result
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&EventKind, usize> =
            self.listeners.iter().map(|(k, v)| (k, v.len())).collect();
        f.debug_struct("EventManager").field("listeners", &counts).finish()
    }
}
