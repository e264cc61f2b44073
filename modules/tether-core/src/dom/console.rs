use serde_json::Value;

use crate::encode::{is_raw, raw};
use crate::engine::Engine;
use crate::error::EngineResult;

use super::DomProxy;

/// The browser console.
pub struct Console<'e> {
    proxy: DomProxy<'e>,
}

/// Strings name JavaScript objects here, not text.
fn as_object_expr(value: Value) -> Value {
    match value {
        Value::String(s) if !is_raw(&s) => Value::String(raw(s)),
        other => other,
    }
}

impl<'e> Console<'e> {
    pub(crate) fn new(engine: &'e mut Engine) -> Self {
        Self {
            proxy: DomProxy::new(engine, "console"),
        }
    }

    proxy_methods! {
        error => "error"(message: &str);
        info => "info"(message: &str);
        log => "log"(message: &str);
        warn => "warn"(message: &str);
        clear => "clear"();
        group_end => "groupEnd"();
    }

    optional_arg_methods! {
        count => "count";
        group => "group";
        group_collapsed => "groupCollapsed";
        time => "time";
        time_end => "timeEnd";
        trace => "trace";
    }

    /// Log `message` if `element` is falsy in the browser. A string element
    /// is a JavaScript expression.
    pub fn assert(mut self, element: Value, message: Option<&str>) -> EngineResult<Self> {
        let element = as_object_expr(element);
        match message {
            Some(message) if !message.is_empty() => self
                .proxy
                .call_method("assert", &[element, Value::from(message)])?,
            _ => self.proxy.call_method("assert", &[element])?,
        };
        Ok(self)
    }

    /// Tabular output. A string element is a JavaScript expression.
    pub fn table(mut self, element: Value, columns: &[&str]) -> EngineResult<Self> {
        let element = as_object_expr(element);
        if columns.is_empty() {
            self.proxy.call_method("table", &[element])?;
        } else {
            self.proxy
                .call_method("table", &[element, Value::from(columns.to_vec())])?;
        }
        Ok(self)
    }
}
