use serde_json::Value;

use crate::buffer::ChainId;
use crate::encode::encode;
use crate::engine::Engine;
use crate::error::{ConfigurationError, EngineResult};

/// Most positional arguments accepted by [`DomProxy::call`].
pub const MAX_CALL_ARGS: usize = 5;

/// Emits calls and property assignments on one JavaScript receiver.
pub struct DomProxy<'e> {
    engine: &'e mut Engine,
    name: String,
    chain: Option<ChainId>,
}

impl<'e> DomProxy<'e> {
    pub fn new(engine: &'e mut Engine, name: impl Into<String>) -> Self {
        Self {
            engine,
            name: name.into(),
            chain: None,
        }
    }

    /// A proxy whose calls merge into the statement keyed by `chain`.
    pub fn chained(engine: &'e mut Engine, name: impl Into<String>, chain: ChainId) -> Self {
        Self {
            engine,
            name: name.into(),
            chain: Some(chain),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chain(&self) -> Option<&ChainId> {
        self.chain.as_ref()
    }

    pub fn engine(&mut self) -> &mut Engine {
        self.engine
    }

    pub fn into_engine(self) -> &'e mut Engine {
        self.engine
    }

    /// Switch between one statement per call and a single fluent statement.
    pub fn toggle_chainable(&mut self) -> &mut Self {
        self.chain = match self.chain {
            Some(_) => None,
            None => Some(ChainId::new()),
        };
        self
    }

    /// `receiver.method(args...)` for any method. Up to [`MAX_CALL_ARGS`]
    /// arguments.
    pub fn call(&mut self, method: &str, args: &[Value]) -> EngineResult<&mut Self> {
        if args.len() > MAX_CALL_ARGS {
            return Err(ConfigurationError::TooManyArguments {
                method: method.to_string(),
                count: args.len(),
            }
            .into());
        }
        self.call_method(method, args)
    }

    pub(crate) fn call_method(&mut self, method: &str, args: &[Value]) -> EngineResult<&mut Self> {
        self.require_name()?;

        let args = args.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
        self.emit_call(&format!("{method}({})", args.join(", ")));
        Ok(self)
    }

    /// `receiver.name=value;`. Never chained.
    pub fn set_property(&mut self, name: &str, value: &Value) -> EngineResult<&mut Self> {
        self.require_name()?;

        let value = encode(value)?;
        let statement = format!("{}.{name}={value};", self.name);
        self.engine.add_code(statement);
        Ok(self)
    }

    /// Emit `receiver.<call>;`, continuing the chain when one is active.
    pub(crate) fn emit_call(&mut self, call: &str) {
        match &self.chain {
            Some(chain) if !self.engine.chained_code(chain).is_empty() => {
                self.engine.add_chained_code(format!(".{call};"), chain);
            }
            Some(chain) => {
                self.engine
                    .add_chained_code(format!("{}.{call};", self.name), chain);
            }
            None => {
                self.engine.add_code(format!("{}.{call};", self.name));
            }
        }
    }

    fn require_name(&self) -> Result<(), ConfigurationError> {
        if self.name.is_empty() {
            Err(ConfigurationError::MissingName)
        } else {
            Ok(())
        }
    }
}
