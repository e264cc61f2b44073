//! Event dispatch: resolve an incoming event to a handler, replay its
//! ancestors when the handler was registered by another handler, and ship
//! back only the code the target emitted.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult, ProtocolError};
use crate::registry::{CallbackId, ParentChainEntry};

/// Id as sent by the browser: a number, or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(CallbackId),
    Text(String),
    /// Negative, fractional or non-scalar ids. Accepted on the wire so the
    /// request still gets an `{error}` answer; they match nothing.
    Other(Value),
}

impl WireId {
    /// `None` when the id isn't a non-negative integer; such an id matches
    /// no handler.
    pub fn callback_id(&self) -> Option<CallbackId> {
        match self {
            WireId::Number(id) => Some(*id),
            WireId::Text(text) => text.trim().parse().ok(),
            WireId::Other(_) => None,
        }
    }
}

impl From<CallbackId> for WireId {
    fn from(id: CallbackId) -> Self {
        WireId::Number(id)
    }
}

/// Instance ids follow the same lenient rules as callback ids. One that
/// doesn't parse addresses no instance.
fn lenient_instance<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<WireId>::deserialize(deserializer)?.and_then(|id| id.callback_id()))
}

/// Event descriptor POSTed by a trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    #[serde(default, deserialize_with = "lenient_instance")]
    pub instance: Option<u64>,
    #[serde(default)]
    pub id: Option<WireId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<WireId>>,
    /// Ancestor data keyed by the ancestor's id in decimal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents_data: Option<HashMap<String, Value>>,
}

impl EventRequest {
    pub fn new(instance: u64, id: CallbackId) -> Self {
        Self {
            instance: Some(instance),
            id: Some(WireId::Number(id)),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Append an ancestor to the replay chain.
    pub fn with_parent(mut self, id: CallbackId, data: Value) -> Self {
        self.parents
            .get_or_insert_with(Vec::new)
            .push(WireId::Number(id));
        self.parents_data
            .get_or_insert_with(HashMap::new)
            .insert(id.to_string(), data);
        self
    }

    /// The submitted replay chain, oldest ancestor first. An ancestor id
    /// that isn't a valid callback id can never be replayed.
    pub fn parent_chain(&self) -> Result<Vec<ParentChainEntry>, ProtocolError> {
        self.parents
            .iter()
            .flatten()
            .map(|wire| {
                let id = wire
                    .callback_id()
                    .ok_or(ProtocolError::ChildNotRegistered)?;
                let data = self
                    .parents_data
                    .as_ref()
                    .and_then(|d| d.get(&id.to_string()))
                    .cloned()
                    .unwrap_or_else(empty_object);
                Ok(ParentChainEntry::new(id, data))
            })
            .collect()
    }
}

/// `{code}` on success, `{error}` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventResponse {
    Code(String),
    Error(String),
}

impl EventResponse {
    pub fn code(&self) -> Option<&str> {
        match self {
            EventResponse::Code(code) => Some(code),
            EventResponse::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            EventResponse::Code(_) => None,
            EventResponse::Error(message) => Some(message),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl Engine {
    /// Handle `request` if it addresses this instance.
    pub fn listen(&mut self, request: &EventRequest) -> Option<EngineResult<EventResponse>> {
        if request.instance != Some(self.instance_id()) {
            return None;
        }
        Some(self.dispatch(request))
    }

    /// Resolve and run the target handler. Protocol, encoding and handler
    /// errors become `{error}` responses; configuration errors are returned.
    pub fn dispatch(&mut self, request: &EventRequest) -> EngineResult<EventResponse> {
        match self.resolve_and_invoke(request) {
            Ok(code) => Ok(EventResponse::Code(code)),
            Err(EngineError::Protocol(e)) => {
                debug!(instance = self.instance_id(), error = %e, "Event not dispatched");
                Ok(EventResponse::Error(e.to_string()))
            }
            Err(e) if e.is_fatal() => {
                error!(instance = self.instance_id(), error = %e, "Defining script misconfigured");
                Err(e)
            }
            Err(e) => {
                warn!(instance = self.instance_id(), error = %e, "Handler failed");
                Ok(EventResponse::Error(e.to_string()))
            }
        }
    }

    fn resolve_and_invoke(&mut self, request: &EventRequest) -> EngineResult<String> {
        let wire_id = request.id.as_ref().ok_or(ProtocolError::NoCallbackId)?;
        let target = wire_id.callback_id();
        let data = request.data.clone().unwrap_or_else(empty_object);

        if let Some(id) = target {
            if let Some(handler) = self.registry().resolve(id) {
                debug!(instance = self.instance_id(), callback_id = id, "Direct invoke");
                let mut scope = self.buffer_scope();
                scope.enter(ParentChainEntry::new(id, data.clone()));
                handler(&mut *scope, &data)?;
                return Ok(scope.render());
            }
        }

        let chain = request.parent_chain()?;
        if chain.is_empty() {
            return Err(ProtocolError::NotRegistered.into());
        }

        debug!(
            instance = self.instance_id(),
            callback_id = ?target,
            parents = ?chain.iter().map(|p| p.callback_id).collect::<Vec<_>>(),
            "Replaying ancestors"
        );

        let mut scope = self.buffer_scope();
        for entry in chain {
            let handler = scope
                .registry()
                .resolve(entry.callback_id)
                .ok_or(ProtocolError::ChildNotRegistered)?;
            let parent_data = entry.data.clone();
            scope.enter(entry);
            handler(&mut *scope, &parent_data)?;
        }

        // The browser already ran the ancestors' code.
        scope.clear();

        let (id, handler) = target
            .and_then(|id| scope.registry().resolve(id).map(|h| (id, h)))
            .ok_or(ProtocolError::ChildNotRegistered)?;
        scope.enter(ParentChainEntry::new(id, data.clone()));
        handler(&mut *scope, &data)?;
        Ok(scope.render())
    }
}
