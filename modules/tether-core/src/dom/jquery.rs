use serde_json::Value;

use crate::buffer::ChainId;
use crate::encode::{encode, encode_str, is_raw, raw};
use crate::engine::{Engine, CALLBACK_PLACEHOLDER};
use crate::error::EngineResult;
use crate::trigger::EventData;

use super::DomProxy;

/// Event binding shortcuts: `fn_name => "event";`
macro_rules! event_methods {
    ($( $(#[$meta:meta])* $fn_name:ident => $event:literal; )*) => {
        $(
            $(#[$meta])*
            pub fn $fn_name<F>(self, handler: F, data: impl Into<EventData>) -> EngineResult<Self>
            where
                F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
            {
                self.on($event, handler, data)
            }
        )*
    };
}

/// Effects taking a speed and an optional completion handler:
/// `fn_name, fn_name_then => "effect";`
macro_rules! effect_methods {
    ($( $(#[$meta:meta])* $fn_name:ident, $then_name:ident => $effect:literal; )*) => {
        $(
            $(#[$meta])*
            pub fn $fn_name(self, speed: &str) -> EngineResult<Self> {
                self.run_effect($effect, speed)
            }

            /// Same, calling `handler` back when the effect completes.
            pub fn $then_name<F>(
                self,
                speed: &str,
                handler: F,
                data: impl Into<EventData>,
            ) -> EngineResult<Self>
            where
                F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
            {
                self.run_effect_then($effect, speed, &[], handler, data)
            }
        )*
    };
}

/// A selected element set. Calls on it merge into one fluent statement.
pub struct JQuery<'e> {
    proxy: DomProxy<'e>,
}

fn speed_or_default(speed: &str) -> &str {
    if speed.is_empty() {
        "fast"
    } else {
        speed
    }
}

impl<'e> JQuery<'e> {
    pub(crate) fn bind(engine: &'e mut Engine, var: String, chain: ChainId) -> Self {
        Self {
            proxy: DomProxy::chained(engine, var, chain),
        }
    }

    /// Variable holding the element in the generated code.
    pub fn var(&self) -> &str {
        self.proxy.name()
    }

    pub fn engine(&mut self) -> &mut Engine {
        self.proxy.engine()
    }

    /// Any jQuery method not covered by a typed helper.
    pub fn call(mut self, method: &str, args: &[Value]) -> EngineResult<Self> {
        self.proxy.call(method, args)?;
        Ok(self)
    }

    pub fn set_property(mut self, name: &str, value: &Value) -> EngineResult<Self> {
        self.proxy.set_property(name, value)?;
        Ok(self)
    }

    // --- DOM ---

    proxy_methods! {
        /// Remove an attribute.
        remove_attr => "removeAttr"(name: &str);
        /// Set DOM properties, e.g. `{"tagName": "div"}`.
        prop => "prop"(properties: Value);
        remove_prop => "removeProp"(name: &str);
        html => "html"(html: &str);
        text => "text"(text: &str);
        val => "val"(value: &str);
        append => "append"(content: &str);
        prepend => "prepend"(content: &str);
        after => "after"(content: &str);
        before => "before"(content: &str);
        /// Remove the child elements.
        empty => "empty"();
        find => "find"(selector: &str);
        add_class => "addClass"(class: &str);
        remove_class => "removeClass"(class: &str);
        toggle_class => "toggleClass"(class: &str);
        /// Style properties, e.g. `{"border": "solid 1px #000"}`.
        css => "css"(properties: Value);
        /// Coordinates such as `{"top": 100, "left": 20}`.
        offset => "offset"(coordinates: Value);
        scroll_top => "scrollTop"(value: &str);
        scroll_left => "scrollLeft"(value: &str);
        stop => "stop"();
    }

    optional_arg_methods! {
        /// Remove the elements, or the matching children.
        remove => "remove";
        parent => "parent";
        children => "children";
        next => "next";
        prev => "prev";
        /// Finish running animations, optionally of a named queue.
        finish => "finish";
    }

    /// Get (no value) or set an attribute.
    pub fn attr(mut self, name: &str, value: Option<&str>) -> EngineResult<Self> {
        match value {
            Some(value) if !value.is_empty() => {
                self.proxy
                    .call_method("attr", &[Value::from(name), Value::from(value)])?
            }
            _ => self.proxy.call_method("attr", &[Value::from(name)])?,
        };
        Ok(self)
    }

    // --- Events ---

    /// Call `handler` on the server whenever `event` fires on the element.
    /// `data` is evaluated in the browser when the event fires, e.g.
    /// `"{width: $(window).width()}"`.
    pub fn on<F>(mut self, event: &str, handler: F, data: impl Into<EventData>) -> EngineResult<Self>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        let var = self.proxy.name().to_string();
        let chain = self.proxy.chain().cloned();
        self.proxy
            .engine()
            .add_element_event(&var, event, handler, data, chain.as_ref())?;
        Ok(self)
    }

    /// Fire `event` on the element. A string parameter is an object
    /// expression, anything else is sent as JSON.
    pub fn trigger(mut self, event: &str, param: Option<Value>) -> EngineResult<Self> {
        match param {
            Some(Value::String(expr)) if !expr.is_empty() => {
                let expr = if is_raw(&expr) { expr } else { raw(expr) };
                self.proxy
                    .call_method("trigger", &[Value::from(event), Value::String(expr)])?
            }
            Some(Value::String(_)) | None => {
                self.proxy.call_method("trigger", &[Value::from(event)])?
            }
            Some(other) => self.proxy.call_method("trigger", &[Value::from(event), other])?,
        };
        Ok(self)
    }

    event_methods! {
        click => "click";
        dblclick => "dblclick";
        mouseenter => "mouseenter";
        mouseleave => "mouseleave";
        keypress => "keypress";
        keydown => "keydown";
        keyup => "keyup";
        submit => "submit";
        change => "change";
        select => "select";
        focus => "focus";
        blur => "blur";
        focusin => "focusin";
        focusout => "focusout";
        load => "load";
        /// Fires once the DOM is fully loaded.
        ready => "ready";
        resize => "resize";
        scroll => "scroll";
        unload => "unload";
    }

    // --- Effects ---

    effect_methods! {
        hide, hide_then => "hide";
        show, show_then => "show";
        toggle, toggle_then => "toggle";
        fade_in, fade_in_then => "fadeIn";
        fade_out, fade_out_then => "fadeOut";
        fade_toggle, fade_toggle_then => "fadeToggle";
        slide_down, slide_down_then => "slideDown";
        slide_up, slide_up_then => "slideUp";
        slide_toggle, slide_toggle_then => "slideToggle";
    }

    /// Fade to the given opacity.
    pub fn fade_to(mut self, speed: &str, to: f64) -> EngineResult<Self> {
        self.proxy.call_method(
            "fadeTo",
            &[Value::from(speed_or_default(speed)), Value::from(to)],
        )?;
        Ok(self)
    }

    pub fn fade_to_then<F>(
        self,
        speed: &str,
        to: f64,
        handler: F,
        data: impl Into<EventData>,
    ) -> EngineResult<Self>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        let to = encode(&Value::from(to))?;
        self.run_effect_then("fadeTo", speed, &[to], handler, data)
    }

    /// Animate towards a set of CSS properties.
    pub fn animate(mut self, css: Value, speed: &str) -> EngineResult<Self> {
        self.proxy
            .call_method("animate", &[css, Value::from(speed_or_default(speed))])?;
        Ok(self)
    }

    pub fn animate_then<F>(
        mut self,
        css: Value,
        speed: &str,
        handler: F,
        data: impl Into<EventData>,
    ) -> EngineResult<Self>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        let css = encode(&css)?;
        let speed = encode_str(speed_or_default(speed));
        let template = format!(
            "{}.animate({css}, {speed}, {CALLBACK_PLACEHOLDER});",
            self.proxy.name()
        );
        self.proxy
            .engine()
            .add_event_callback(&template, handler, data)?;
        Ok(self)
    }

    fn run_effect(mut self, effect: &str, speed: &str) -> EngineResult<Self> {
        self.proxy
            .call_method(effect, &[Value::from(speed_or_default(speed))])?;
        Ok(self)
    }

    /// `var.effect(speed, extra..., {callback});` as its own statement.
    fn run_effect_then<F>(
        mut self,
        effect: &str,
        speed: &str,
        extra: &[String],
        handler: F,
        data: impl Into<EventData>,
    ) -> EngineResult<Self>
    where
        F: Fn(&mut Engine, &Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        let mut args = vec![encode_str(speed_or_default(speed))];
        args.extend(extra.iter().cloned());
        args.push(CALLBACK_PLACEHOLDER.to_string());

        let template = format!("{}.{effect}({});", self.proxy.name(), args.join(", "));
        self.proxy
            .engine()
            .add_event_callback(&template, handler, data)?;
        Ok(self)
    }
}
