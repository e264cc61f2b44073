//! The defining script served by this binary. Rebuilt for every request.

use chrono::Utc;
use serde_json::{json, Value};
use tether_core::{Engine, EngineResult, Page};

pub fn run(page: &mut Page) -> EngineResult<()> {
    page.mount(message_widget)?;
    page.mount(greeting_widget)?;
    Ok(())
}

// --- #message ---

fn message_widget(engine: &mut Engine) -> EngineResult<()> {
    engine
        .jq("#message")
        .html("Hello World!")?
        .click(on_message_click, "{width: $(window).width()}")?;

    engine
        .jq("#message")
        .css(json!({"border": "solid 1px #000", "cursor": "pointer"}))?;

    engine.jq("js:window").resize(
        |engine, data| {
            engine.window().console().log(&data["width"].to_string())?;
            Ok(())
        },
        "{width: $(window).width()}",
    )?;
    Ok(())
}

fn on_message_click(engine: &mut Engine, data: &Value) -> EngineResult<()> {
    let system = format!(
        "{} {} at {}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    engine
        .jq("#message")
        .html(&system)?
        .css(json!({"position": "relative"}))?
        .animate(json!({"top": "+=20px"}), "")?;

    if data["width"].as_f64().unwrap_or_default() > 500.0 {
        engine.jq("#message").toggle_then(
            "slow",
            on_message_toggled,
            "{visible: $('#message').is(':visible')}",
        )?;
    }
    Ok(())
}

fn on_message_toggled(engine: &mut Engine, data: &Value) -> EngineResult<()> {
    if data["visible"] == Value::Bool(false) {
        engine.jq("#message").toggle_then(
            "slow",
            |engine, _| {
                engine.jq("#message").html("keep it open!")?;
                Ok(())
            },
            "{status: 'test'}",
        )?;
    } else {
        engine.jq("#message").html(":)")?;
    }
    Ok(())
}

// --- #greet ---

fn greeting_widget(engine: &mut Engine) -> EngineResult<()> {
    engine.jq("#greet").click(
        |engine, _| {
            engine.window().prompt("Your name?", "", |engine, data| {
                let name = data["input"].as_str().unwrap_or_default().trim();
                if name.is_empty() {
                    engine.jq("#greeting").text("")?;
                } else {
                    engine.jq("#greeting").text(&format!("Hello, {name}!"))?;
                }
                Ok(())
            })?;
            Ok(())
        },
        "{}",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::{EngineConfig, EventRequest};

    fn page() -> Page {
        Page::build(&run, EngineConfig::default()).unwrap()
    }

    fn code(request: EventRequest) -> String {
        let response = page().listen(&request).unwrap().unwrap();
        response.code().unwrap_or_else(|| panic!("{response:?}")).to_string()
    }

    #[test]
    fn mounts_two_instances() {
        let mut page = page();
        let html = page.scripts();
        assert!(html.contains("Tether1 = [];"));
        assert!(html.contains("Tether2 = [];"));
        assert!(html.contains("ele1.html('Hello World!').on('click',"));
        // Later calls on the same element extend its statement.
        assert!(html.contains(r##"}).css({"border":"solid 1px #000","cursor":"pointer"});"##));
    }

    #[test]
    fn narrow_window_skips_toggle() {
        let narrow = code(EventRequest::new(1, 1).with_data(json!({"width": 320})));
        assert!(narrow.contains(".animate({\"top\":\"+=20px\"}, 'fast');"));
        assert!(!narrow.contains("toggle"));

        let wide = code(EventRequest::new(1, 1).with_data(json!({"width": 1280})));
        assert!(wide.contains(".toggle('slow', function(event){"));
    }

    #[test]
    fn hidden_message_reopens_with_nested_handler() {
        let hidden = code(
            EventRequest::new(1, 3)
                .with_parent(1, json!({"width": 1280}))
                .with_data(json!({"visible": false})),
        );
        assert!(hidden.contains(".toggle('slow', function(event){"));
        assert!(hidden.contains("parent_data={status: 'test'};"));

        let reopened = code(
            EventRequest::new(1, 4)
                .with_parent(1, json!({"width": 1280}))
                .with_parent(3, json!({"visible": false}))
                .with_data(json!({"status": "test"})),
        );
        assert!(reopened.contains(".html('keep it open!');"));
    }

    #[test]
    fn resize_logs_width() {
        let logged = code(EventRequest::new(1, 2).with_data(json!({"width": 1024})));
        assert!(logged.contains("console.log(1024);"));
    }

    #[test]
    fn greeting_uses_prompt_answer() {
        let prompt = code(EventRequest::new(2, 1));
        assert!(prompt.contains("var input = prompt('Your name?', '');"));

        let greeted = code(
            EventRequest::new(2, 2)
                .with_parent(1, json!({}))
                .with_data(json!({"input": "Ada"})),
        );
        assert!(greeted.contains(".text('Hello, Ada!');"));
    }
}
