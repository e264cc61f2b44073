use crate::engine::Engine;

use super::DomProxy;

/// `localStorage` or `sessionStorage`.
pub struct WebStorage<'e> {
    proxy: DomProxy<'e>,
}

impl<'e> WebStorage<'e> {
    pub(crate) fn new(engine: &'e mut Engine, name: &str) -> Self {
        Self {
            proxy: DomProxy::new(engine, name),
        }
    }

    proxy_methods! {
        set_item => "setItem"(name: &str, value: &str);
        remove_item => "removeItem"(name: &str);
        /// Remove every item.
        clear => "clear"();
    }
}

/// The per-instance array (`Tether<id>`) that keeps values such as timers
/// and window handles reachable from later, independent events.
pub struct InstanceStorage<'e> {
    engine: &'e mut Engine,
    name: String,
}

impl<'e> InstanceStorage<'e> {
    pub(crate) fn new(engine: &'e mut Engine) -> Self {
        let name = engine.storage_name();
        Self { engine, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store the JavaScript variable `var` under its own name.
    pub fn insert_var(self, var: &str) -> Self {
        let statement = format!("{}['{var}'] = {var};", self.name);
        self.engine.add_code(statement);
        self
    }

    pub fn remove_var(self, var: &str) -> Self {
        let statement = format!("delete {}['{var}'];", self.name);
        self.engine.add_code(statement);
        self
    }

    /// Expression reading a stored variable, e.g. `Tether1['myInterval']`.
    pub fn var_ref(&self, var: &str) -> String {
        format!("{}['{var}']", self.name)
    }

    /// Drop every stored variable.
    pub fn clear(self) -> Self {
        let statement = format!("{} = [];", self.name);
        self.engine.add_code(statement);
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::engine::Engine;

    #[test]
    fn web_storage_calls() {
        let mut engine = Engine::new(1, EngineConfig::default());
        engine.local_storage().set_item("k", "v").unwrap().remove_item("k").unwrap();
        engine.session_storage().clear().unwrap();
        assert_eq!(
            engine.buffers().active().statements(),
            [
                "localStorage.setItem('k', 'v');",
                "localStorage.removeItem('k');",
                "sessionStorage.clear();"
            ]
        );
    }

    #[test]
    fn instance_storage_uses_prefix_and_instance() {
        let mut engine = Engine::new(
            4,
            EngineConfig::default().with_storage_prefix("Widget"),
        );
        let reference = engine.storage().insert_var("timer").var_ref("timer");
        engine.storage().remove_var("timer").clear();

        assert_eq!(reference, "Widget4['timer']");
        assert_eq!(
            engine.buffers().active().statements(),
            [
                "Widget4['timer'] = timer;",
                "delete Widget4['timer'];",
                "Widget4 = [];"
            ]
        );
    }
}
