use serde_json::Value;

use crate::encode::encode_str;
use crate::engine::{Engine, CALLBACK_PLACEHOLDER};
use crate::error::EngineResult;
use crate::trigger::EventData;

use super::{unique_name, Console, DomProxy, InstanceStorage, Location};

/// `window`, or a handle returned by [`Window::open`].
pub struct Window<'e> {
    proxy: DomProxy<'e>,
}

impl<'e> Window<'e> {
    pub(crate) fn new(engine: &'e mut Engine, name: &str) -> Self {
        Self {
            proxy: DomProxy::new(engine, name),
        }
    }

    pub fn name(&self) -> &str {
        self.proxy.name()
    }

    pub fn console(self) -> Console<'e> {
        Console::new(self.proxy.into_engine())
    }

    pub fn location(self) -> Location<'e> {
        Location::new(self.proxy.into_engine())
    }

    pub fn call(mut self, method: &str, args: &[Value]) -> EngineResult<Self> {
        self.proxy.call(method, args)?;
        Ok(self)
    }

    proxy_methods! {
        alert => "alert"(message: &str);
        close => "close"();
        print => "print"();
        blur => "blur"();
        focus => "focus"();
        resize_to => "resizeTo"(width: i64, height: i64);
        move_to => "moveTo"(x: i64, y: i64);
    }

    /// Ask the user to confirm; `handler` receives `{"confirm": bool}`.
    pub fn confirm<F>(mut self, message: &str, handler: F) -> EngineResult<Self>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        let message = encode_str(message);
        let engine = self.proxy.engine();
        engine.add_code(format!("var output = confirm({message});"));
        engine.add_event(handler, r#"{"confirm": output}"#)?;
        Ok(self)
    }

    /// Ask the user for input; `handler` receives `{"input": text}`.
    pub fn prompt<F>(mut self, message: &str, default_value: &str, handler: F) -> EngineResult<Self>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        let message = encode_str(message);
        let default_value = encode_str(default_value);
        let engine = self.proxy.engine();
        engine.add_code(format!("var input = prompt({message}, {default_value});"));
        engine.add_event(handler, r#"{"input": input}"#)?;
        Ok(self)
    }

    /// Open a new browser window. The handle is kept in instance storage
    /// under `var` (or a generated name) and returned as its own proxy.
    pub fn open(
        self,
        url: &str,
        target: Option<&str>,
        var: Option<&str>,
    ) -> EngineResult<Window<'e>> {
        let url = encode_str(url);
        let target = encode_str(target.unwrap_or("_blank"));
        let var = var
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| unique_name("win"));

        let statement = format!("{var}={}.open({url}, {target});", self.proxy.name());
        let engine = self.proxy.into_engine();
        engine.add_code(statement);
        InstanceStorage::new(engine).insert_var(&var);

        Ok(Window::new(engine, &var))
    }

    /// Run `handler` once after `milliseconds`. Its data carries the timer
    /// name under `timeout` so the handler can cancel it.
    pub fn set_timeout<F>(
        self,
        handler: F,
        milliseconds: u64,
        var: Option<&str>,
        data: impl Into<EventData>,
    ) -> EngineResult<Self>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        self.schedule("setTimeout", "timeout", handler, milliseconds, var, data.into())
    }

    /// Run `handler` every `milliseconds`. Its data carries the timer name
    /// under `interval`.
    pub fn set_interval<F>(
        self,
        handler: F,
        milliseconds: u64,
        var: Option<&str>,
        data: impl Into<EventData>,
    ) -> EngineResult<Self>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        self.schedule("setInterval", "interval", handler, milliseconds, var, data.into())
    }

    fn schedule<F>(
        mut self,
        method: &str,
        kind: &str,
        handler: F,
        milliseconds: u64,
        var: Option<&str>,
        data: EventData,
    ) -> EngineResult<Self>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        let var = var
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| unique_name(kind));
        let data = data.with_entry(kind, &var)?;

        let template = format!(
            "var {var} = {}.{method}({CALLBACK_PLACEHOLDER}, {milliseconds});",
            self.proxy.name()
        );
        let engine = self.proxy.engine();
        engine.add_event_callback(&template, handler, data)?;
        InstanceStorage::new(engine).insert_var(&var);
        Ok(self)
    }

    pub fn clear_timeout(self, var: &str) -> Self {
        self.unschedule("clearTimeout", var)
    }

    pub fn clear_interval(self, var: &str) -> Self {
        self.unschedule("clearInterval", var)
    }

    fn unschedule(mut self, function: &str, var: &str) -> Self {
        let engine = self.proxy.engine();
        let reference = InstanceStorage::new(engine).var_ref(var);
        engine.add_code(format!("{function}({reference});"));
        InstanceStorage::new(engine).remove_var(var);
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::engine::Engine;
    use crate::protocol::EventRequest;
    use serde_json::json;

    fn statements(engine: &Engine) -> Vec<String> {
        engine.buffers().active().statements().to_vec()
    }

    #[test]
    fn alert_and_sizing() {
        let mut engine = Engine::new(1, EngineConfig::default());
        engine
            .window()
            .alert("It's done")
            .unwrap()
            .resize_to(800, 600)
            .unwrap();
        assert_eq!(
            statements(&engine),
            ["window.alert('It\\'s done');", "window.resizeTo(800, 600);"]
        );
    }

    #[test]
    fn blur_and_focus_call_their_own_methods() {
        let mut engine = Engine::new(1, EngineConfig::default());
        engine.window().blur().unwrap().focus().unwrap();
        assert_eq!(statements(&engine), ["window.blur();", "window.focus();"]);
    }

    #[test]
    fn confirm_fires_event_with_answer() {
        let mut engine = Engine::new(1, EngineConfig::default());
        engine.window().confirm("Sure?", |_, _| Ok(())).unwrap();

        let statements = statements(&engine);
        assert_eq!(statements[0], "var output = confirm('Sure?');");
        assert!(statements[1].contains(r#"var parent_data={"confirm": output};"#));
        assert_eq!(engine.registry().len(), 1);
    }

    #[test]
    fn open_stores_handle_and_returns_its_proxy() {
        let mut engine = Engine::new(1, EngineConfig::default());
        let name = engine
            .window()
            .open("https://example.com", None, Some("popup"))
            .unwrap()
            .close()
            .unwrap()
            .name()
            .to_string();

        assert_eq!(name, "popup");
        assert_eq!(
            statements(&engine),
            [
                "popup=window.open('https://example.com', '_blank');",
                "Tether1['popup'] = popup;",
                "popup.close();"
            ]
        );
    }

    #[test]
    fn generated_names_are_prefixed() {
        let mut engine = Engine::new(1, EngineConfig::default());
        let name = engine
            .window()
            .open("/x", Some("_self"), None)
            .unwrap()
            .name()
            .to_string();
        assert!(name.starts_with("win"));
        assert_eq!(name.len(), "win".len() + 13);
    }

    #[test]
    fn set_interval_passes_its_name_to_the_handler() {
        let mut engine = Engine::new(1, EngineConfig::default());
        engine
            .window()
            .set_interval(|_, _| Ok(()), 1000, Some("ticker"), "{}")
            .unwrap();

        let statements = statements(&engine);
        assert!(statements[0].starts_with("var ticker = window.setInterval(function(event){"));
        assert!(statements[0].contains("var parent_data={interval: 'ticker'};"));
        assert!(statements[0].ends_with("}, 1000);"));
        assert_eq!(statements[1], "Tether1['ticker'] = ticker;");
    }

    #[test]
    fn clear_timeout_reads_from_storage() {
        let mut engine = Engine::new(1, EngineConfig::default());
        engine.window().clear_timeout("t1");
        assert_eq!(
            statements(&engine),
            ["clearTimeout(Tether1['t1']);", "delete Tether1['t1'];"]
        );
    }

    #[test]
    fn timer_handler_can_cancel_itself() {
        let mut engine = Engine::new(1, EngineConfig::default());
        engine
            .window()
            .set_timeout(
                |engine, data| {
                    let name = data["timeout"].as_str().unwrap_or_default().to_string();
                    engine.window().clear_timeout(&name);
                    Ok(())
                },
                50,
                Some("once"),
                "{}",
            )
            .unwrap();

        let response = engine
            .dispatch(&EventRequest::new(1, 1).with_data(json!({"timeout": "once"})))
            .unwrap();
        let code = response.code().unwrap();
        assert!(code.contains("clearTimeout(Tether1['once']);"));
        assert!(code.contains("delete Tether1['once'];"));
    }
}
