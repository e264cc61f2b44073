//! The engine instance: owns the registry, the buffer stack and the id
//! counters for one independently addressable widget.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::buffer::{ChainId, CodeBufferStack};
use crate::config::EngineConfig;
use crate::dom::{InstanceStorage, JQuery, WebStorage, Window};
use crate::encode::encode_selector;
use crate::error::EngineResult;
use crate::registry::{CallbackId, CallbackRegistry, Handler, ParentChainEntry};
use crate::trigger::{EventData, Trigger};

/// Placeholder replaced by the generated callback function in
/// [`Engine::add_event_callback`] templates.
pub const CALLBACK_PLACEHOLDER: &str = "{callback}";

/// A selected element: its generated variable and the chain its calls
/// merge into.
#[derive(Debug, Clone)]
pub(crate) struct ElementRef {
    pub var: String,
    pub chain: ChainId,
}

pub struct Engine {
    instance_id: u64,
    config: EngineConfig,
    registry: CallbackRegistry,
    buffers: CodeBufferStack,
    next_element_id: u64,
    elements: HashMap<String, ElementRef>,
    executing: Vec<ParentChainEntry>,
    storage_initialized: bool,
}

impl Engine {
    pub fn new(instance_id: u64, config: EngineConfig) -> Self {
        Self {
            instance_id,
            config,
            registry: CallbackRegistry::new(),
            buffers: CodeBufferStack::new(),
            next_element_id: 1,
            elements: HashMap::new(),
            executing: Vec::new(),
            storage_initialized: false,
        }
    }

    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    pub fn buffers(&self) -> &CodeBufferStack {
        &self.buffers
    }

    /// True while a handler is running.
    pub fn is_buffering(&self) -> bool {
        self.buffers.is_buffering()
    }

    /// Handlers currently executing, outermost first.
    pub fn executing(&self) -> &[ParentChainEntry] {
        &self.executing
    }

    /// Name of the per-instance storage array.
    pub fn storage_name(&self) -> String {
        format!("{}{}", self.config.storage_prefix, self.instance_id)
    }

    // --- Code emission ---

    /// Add hand written JavaScript.
    pub fn add_code(&mut self, code: impl AsRef<str>) -> &mut Self {
        self.buffers.emit(code.as_ref(), None);
        self
    }

    /// Add JavaScript merged into the statement keyed by `chain`.
    pub fn add_chained_code(&mut self, code: impl AsRef<str>, chain: &ChainId) -> &mut Self {
        self.buffers.emit(code.as_ref(), Some(chain));
        self
    }

    pub fn chained_code(&self, chain: &ChainId) -> &str {
        self.buffers.get_chained(chain)
    }

    // --- Registration ---

    /// Register a handler without emitting a trigger for it.
    pub fn register<F>(&mut self, handler: F) -> CallbackId
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        self.register_handler(Arc::new(handler))
    }

    pub fn register_handler(&mut self, handler: Handler) -> CallbackId {
        let chain = if self.is_buffering() {
            self.executing.clone()
        } else {
            Vec::new()
        };
        let parents = chain.len();
        let id = self.registry.register(handler, chain);
        debug!(instance = self.instance_id, callback_id = id, parents, "Registered handler");
        id
    }

    fn trigger<'a>(
        &self,
        id: CallbackId,
        data: &'a str,
        element: Option<&'a str>,
        post_location: &'a str,
    ) -> Trigger<'a> {
        Trigger {
            instance: self.instance_id,
            id,
            data,
            element,
            nested: self.is_buffering(),
            post_location,
            debug: self.config.debug,
        }
    }

    /// Register `handler` and emit a trigger that fires it right away.
    pub fn add_event<F>(&mut self, handler: F, data: impl Into<EventData>) -> EngineResult<CallbackId>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        let data = data.into().to_js()?;
        let id = self.register(handler);
        let post_location = self.config.post_location();
        let code = self.trigger(id, &data, None, &post_location).immediate();
        self.add_code(code);
        Ok(id)
    }

    /// Register `handler` and emit `template` with [`CALLBACK_PLACEHOLDER`]
    /// replaced by a function that fires it, e.g. `ele1.hide('slow', {callback});`.
    pub fn add_event_callback<F>(
        &mut self,
        template: &str,
        handler: F,
        data: impl Into<EventData>,
    ) -> EngineResult<CallbackId>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        let data = data.into().to_js()?;
        let id = self.register(handler);
        let post_location = self.config.post_location();
        let function = self.trigger(id, &data, None, &post_location).callback_function();
        self.add_code(template.replace(CALLBACK_PLACEHOLDER, &function));
        Ok(id)
    }

    /// Register `handler` for DOM events of `event_type` on the element
    /// stored in `var`. With `chain`, the binding is merged into that
    /// chained statement instead of emitted on its own.
    pub fn add_element_event<F>(
        &mut self,
        var: &str,
        event_type: &str,
        handler: F,
        data: impl Into<EventData>,
        chain: Option<&ChainId>,
    ) -> EngineResult<CallbackId>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        let data = data.into().to_js()?;
        let id = self.register(handler);
        let post_location = self.config.post_location();
        let binding = self
            .trigger(id, &data, Some(var), &post_location)
            .element_handler(event_type);

        match chain {
            Some(chain) if !self.chained_code(chain).is_empty() => {
                self.add_chained_code(binding, chain);
            }
            Some(chain) => {
                self.add_chained_code(format!("{var}{binding}"), chain);
            }
            None => {
                self.add_code(format!("{var}{binding}"));
            }
        }
        Ok(id)
    }

    // --- DOM access ---

    /// jQuery wrapper for `selector`. Selecting the same selector again
    /// reuses the generated variable. `js:` selectors are expressions
    /// (`js:window`); inside a handler `js:this` is the element that fired
    /// the event.
    pub fn jq(&mut self, selector: &str) -> JQuery<'_> {
        let element = self.element(selector);
        JQuery::bind(self, element.var, element.chain)
    }

    pub(crate) fn element(&mut self, selector: &str) -> ElementRef {
        let mut key = selector.to_string();
        let mut target = encode_selector(selector);

        if selector == "js:this" && self.is_buffering() {
            key.push_str(&self.next_element_id.to_string());
            target = "owner".to_string();
        }

        if let Some(existing) = self.elements.get(&key) {
            return existing.clone();
        }

        let var = format!("ele{}", self.next_element_id);
        self.next_element_id += 1;
        self.add_code(format!("var {var} = jq({target});"));

        let element = ElementRef {
            var,
            chain: ChainId::new(),
        };
        self.elements.insert(key, element.clone());
        element
    }

    pub fn window(&mut self) -> Window<'_> {
        Window::new(self, "window")
    }

    pub fn local_storage(&mut self) -> WebStorage<'_> {
        WebStorage::new(self, "localStorage")
    }

    pub fn session_storage(&mut self) -> WebStorage<'_> {
        WebStorage::new(self, "sessionStorage")
    }

    /// The per-instance array used to keep timers and window handles
    /// reachable from later events.
    pub fn storage(&mut self) -> InstanceStorage<'_> {
        InstanceStorage::new(self)
    }

    // --- Buffering ---

    /// Start a new output level. The level (and any handler frames pushed
    /// through the scope) is discarded when the scope is dropped.
    pub fn buffer_scope(&mut self) -> BufferScope<'_> {
        self.buffers.push();
        let frames = self.executing.len();
        BufferScope { engine: self, frames }
    }

    // --- Output ---

    /// Code of the active level wrapped for evaluation. The first top-level
    /// render also initializes the storage array.
    pub fn plain_code(&mut self) -> String {
        if self.is_buffering() {
            return self.buffers.render();
        }

        if self.storage_initialized {
            self.buffers.render()
        } else {
            self.storage_initialized = true;
            let init = format!("{} = [];", self.storage_name());
            self.buffers.render_with_preamble(Some(&init))
        }
    }

    /// Top-level code as a `<script>` block that runs on document ready.
    pub fn execute_code(&mut self) -> String {
        format!(
            "<script>\njQuery(document).ready(function(){{\n{}}});\n</script>\n",
            self.plain_code()
        )
    }
}

/// An active output level. Dereferences to the engine; dropping it pops
/// the level and forgets handler frames entered through it.
pub struct BufferScope<'e> {
    engine: &'e mut Engine,
    frames: usize,
}

impl BufferScope<'_> {
    /// Discard everything emitted into this level so far.
    pub fn clear(&mut self) {
        self.engine.buffers.clear();
    }

    /// Record that the handler `entry` is running. Handlers registered from
    /// here on carry it in their replay chain.
    pub(crate) fn enter(&mut self, entry: ParentChainEntry) {
        self.engine.executing.push(entry);
    }

    pub fn render(&self) -> String {
        self.engine.buffers.render()
    }
}

impl Deref for BufferScope<'_> {
    type Target = Engine;

    fn deref(&self) -> &Engine {
        self.engine
    }
}

impl DerefMut for BufferScope<'_> {
    fn deref_mut(&mut self) -> &mut Engine {
        self.engine
    }
}

impl Drop for BufferScope<'_> {
    fn drop(&mut self) {
        self.engine.executing.truncate(self.frames);
        self.engine.buffers.pop();
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("instance_id", &self.instance_id)
            .field("registry", &self.registry)
            .field("depth", &self.buffers.depth())
            .field("executing", &self.executing)
            .finish()
    }
}
