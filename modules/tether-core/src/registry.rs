//! Callback registry: sequential ids to handlers, rebuilt on every request.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::EngineResult;

pub type CallbackId = u64;

/// Server-side callback. Receives the engine (to emit code or register
/// nested handlers) and the event data submitted by the browser.
pub type Handler = Arc<dyn Fn(&mut Engine, &serde_json::Value) -> EngineResult<()> + Send + Sync>;

/// One ancestor in a replay chain: which handler ran, and with what data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentChainEntry {
    pub callback_id: CallbackId,
    pub data: serde_json::Value,
}

impl ParentChainEntry {
    pub fn new(callback_id: CallbackId, data: serde_json::Value) -> Self {
        Self { callback_id, data }
    }
}

struct Registered {
    handler: Handler,
    chain: Vec<ParentChainEntry>,
}

pub struct CallbackRegistry {
    next_id: CallbackId,
    handlers: BTreeMap<CallbackId, Registered>,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            handlers: BTreeMap::new(),
        }
    }

    /// Store `handler` under the next id. `chain` is the list of handlers
    /// that were executing at registration time, oldest first.
    pub fn register(&mut self, handler: Handler, chain: Vec<ParentChainEntry>) -> CallbackId {
        let id = self.next_id;
        self.next_id += 1;
        self.handlers.insert(id, Registered { handler, chain });
        id
    }

    pub fn resolve(&self, id: CallbackId) -> Option<Handler> {
        self.handlers.get(&id).map(|r| Arc::clone(&r.handler))
    }

    /// Handlers that were executing when `id` was registered. Empty for
    /// top-level handlers. Kept for inspection only: the chain submitted with
    /// an event is built by the browser and never read back from here.
    pub fn chain_of(&self, id: CallbackId) -> Option<&[ParentChainEntry]> {
        self.handlers.get(&id).map(|r| r.chain.as_slice())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered ids in assignment order.
    pub fn ids(&self) -> impl Iterator<Item = CallbackId> + '_ {
        self.handlers.keys().copied()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("next_id", &self.next_id)
            .field("ids", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
