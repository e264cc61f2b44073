use serde_json::Value;

use crate::encode::raw;
use crate::engine::Engine;
use crate::error::EngineResult;

use super::DomProxy;

/// `fn_name => "property";` setters.
macro_rules! property_setters {
    ($( $fn_name:ident => $property:literal; )*) => {
        $(
            pub fn $fn_name(mut self, value: &str) -> EngineResult<Self> {
                self.proxy.set_property($property, &Value::from(value))?;
                Ok(self)
            }
        )*
    };
}

/// `window.location`.
pub struct Location<'e> {
    proxy: DomProxy<'e>,
}

impl<'e> Location<'e> {
    pub(crate) fn new(engine: &'e mut Engine) -> Self {
        Self {
            proxy: DomProxy::new(engine, "location"),
        }
    }

    proxy_methods! {
        /// Load a new document.
        assign => "assign"(url: &str);
        /// Load a new document without a history entry.
        replace => "replace"(url: &str);
    }

    /// Reload the page, bypassing the cache when `force_get` is set.
    pub fn reload(mut self, force_get: bool) -> EngineResult<Self> {
        let flag = raw(if force_get { "true" } else { "false" });
        self.proxy.call_method("reload", &[Value::String(flag)])?;
        Ok(self)
    }

    property_setters! {
        hash => "hash";
        host => "host";
        hostname => "hostname";
        href => "href";
        pathname => "pathname";
        port => "port";
        protocol => "protocol";
        search => "search";
    }
}
