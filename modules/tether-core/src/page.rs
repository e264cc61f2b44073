//! One execution of a defining script: the engines it mounts and the
//! counter that numbers them.

use tracing::debug;

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::protocol::{EventRequest, EventResponse};

/// Hands out instance ids. Every render pass owns a fresh counter, so
/// re-running the same script yields the same ids.
#[derive(Debug)]
pub struct InstanceCounter {
    next: u64,
}

impl Default for InstanceCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// A defining script. Must register the same handlers in the same order on
/// every run for replay to find them.
pub trait Script: Send + Sync {
    fn run(&self, page: &mut Page) -> EngineResult<()>;
}

impl<F> Script for F
where
    F: Fn(&mut Page) -> EngineResult<()> + Send + Sync,
{
    fn run(&self, page: &mut Page) -> EngineResult<()> {
        self(page)
    }
}

#[derive(Debug, Default)]
pub struct Page {
    counter: InstanceCounter,
    defaults: EngineConfig,
    engines: Vec<Engine>,
}

impl Page {
    /// Engines mounted without an explicit config use `defaults`.
    pub fn new(defaults: EngineConfig) -> Self {
        Self {
            counter: InstanceCounter::new(),
            defaults,
            engines: Vec::new(),
        }
    }

    /// Run `script` against a fresh page.
    pub fn build(script: &dyn Script, defaults: EngineConfig) -> EngineResult<Self> {
        let mut page = Self::new(defaults);
        script.run(&mut page)?;
        debug!(engines = page.engines.len(), "Defining script executed");
        Ok(page)
    }

    /// Create an engine with the next instance id and let `define` populate
    /// it. Returns the instance id.
    pub fn mount<F>(&mut self, define: F) -> EngineResult<u64>
    where
        F: FnOnce(&mut Engine) -> EngineResult<()>,
    {
        let config = self.defaults.clone();
        self.mount_with(config, define)
    }

    pub fn mount_with<F>(&mut self, config: EngineConfig, define: F) -> EngineResult<u64>
    where
        F: FnOnce(&mut Engine) -> EngineResult<()>,
    {
        let mut engine = Engine::new(self.counter.next_id(), config);
        define(&mut engine)?;
        let id = engine.instance_id();
        self.engines.push(engine);
        Ok(id)
    }

    pub fn engines(&self) -> &[Engine] {
        &self.engines
    }

    pub fn engine_mut(&mut self, instance_id: u64) -> Option<&mut Engine> {
        self.engines
            .iter_mut()
            .find(|e| e.instance_id() == instance_id)
    }

    /// Route `request` to the engine it addresses. `None` if no engine on
    /// this page has that instance id.
    pub fn listen(&mut self, request: &EventRequest) -> Option<EngineResult<EventResponse>> {
        self.engines.iter_mut().find_map(|engine| engine.listen(request))
    }

    /// `<script>` blocks for every mounted engine, in mount order.
    pub fn scripts(&mut self) -> String {
        self.engines.iter_mut().map(Engine::execute_code).collect()
    }
}
