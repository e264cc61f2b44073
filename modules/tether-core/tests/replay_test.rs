//! End-to-end dispatch through a rebuilt page: direct invokes, ancestor
//! replay, error payloads and routing between instances.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tether_core::{
    ConfigurationError, Engine, EngineConfig, EngineError, EngineResult, EventRequest,
    EventResponse, Page, ParentChainEntry, WireId,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Log = Arc<Mutex<Vec<(&'static str, Value)>>>;

fn record(log: &Log, label: &'static str, data: &Value) {
    log.lock().unwrap().push((label, data.clone()));
}

fn dispatch(page: &mut Page, request: &EventRequest) -> EventResponse {
    page.listen(request)
        .expect("request should address a mounted instance")
        .expect("dispatch should not fail fatally")
}

/// `#message` click (id 1) toggles the element and registers the toggle
/// completion (id 2) from inside the handler.
fn toggle_page() -> Page {
    let mut page = Page::new(EngineConfig::default());
    page.mount(|engine| {
        engine.jq("#message").html("Hello")?.click(
            |engine, _| {
                engine.jq("js:this").toggle_then(
                    "slow",
                    |engine, data| {
                        let text = if data["visible"] == json!(false) { "closed" } else { "open" };
                        engine.jq("#status").text(text)?;
                        Ok(())
                    },
                    "{visible: $('#message').is(':visible')}",
                )?;
                Ok(())
            },
            "{width: $(window).width()}",
        )?;
        Ok(())
    })
    .unwrap();
    page
}

/// A (top level) registers B, B registers C. Every invocation is logged.
fn nested_page(log: &Log) -> Page {
    let mut page = Page::new(EngineConfig::default());
    let log = log.clone();
    page.mount(move |engine| {
        let log_a = log.clone();
        engine.add_event(
            move |engine, data| {
                record(&log_a, "A", data);
                let log_b = log_a.clone();
                engine.add_event(
                    move |engine, data| {
                        record(&log_b, "B", data);
                        let log_c = log_b.clone();
                        engine.add_event(
                            move |_, data| {
                                record(&log_c, "C", data);
                                Ok(())
                            },
                            "{}",
                        )?;
                        Ok(())
                    },
                    "{}",
                )?;
                Ok(())
            },
            "{}",
        )?;
        Ok(())
    })
    .unwrap();
    page
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn first_render_binds_the_click_trigger() {
    let mut page = toggle_page();
    let html = page.scripts();

    assert!(html.contains("Tether1 = [];"));
    assert!(html.contains("var ele1 = jq('#message');"));
    assert!(html.contains("ele1.html('Hello').on('click', function(event){"));
    assert!(html.contains("var parent_id=1;"));
    assert!(html.contains("var parent_data={width: $(window).width()};"));
    assert_eq!(page.engines()[0].registry().len(), 1);
}

#[test]
fn direct_invoke_emits_nested_trigger_with_chain() {
    let mut page = toggle_page();
    let response = dispatch(
        &mut page,
        &EventRequest::new(1, 1).with_data(json!({"width": 1024})),
    );

    let code = response.code().unwrap();
    assert!(code.starts_with("(function(jq) {\n"));
    assert!(code.contains("var ele2 = jq(owner);"));
    assert!(code.contains("ele2.toggle('slow', function(event){"));
    assert!(code.contains("parents.push(parent_id);"));
    assert!(code.contains("parent_id=2;"));
    assert!(code.contains("parents: parents, parents_data: parents_data, "));
    assert!(!code.contains("Tether1 = [];"));

    let engine = page.engine_mut(1).unwrap();
    assert_eq!(
        engine.registry().chain_of(2).unwrap(),
        &[ParentChainEntry::new(1, json!({"width": 1024}))]
    );
}

#[test]
fn replayed_request_returns_only_the_target_code() {
    let mut page = toggle_page();
    let request = EventRequest::new(1, 2)
        .with_data(json!({"visible": false}))
        .with_parent(1, json!({"width": 1024}));

    let code = dispatch(&mut page, &request).code().unwrap().to_string();

    assert_eq!(
        code,
        "(function(jq) {\n  var ele3 = jq('#status');\n  ele3.text('closed');\n})(jQuery);\n"
    );
}

#[test]
fn request_from_the_wire_round_trips() {
    let mut page = toggle_page();
    let request: EventRequest = serde_json::from_value(json!({
        "instance": 1,
        "id": "2",
        "parents": [1],
        "parents_data": {"1": {"width": 640}},
        "data": {"visible": true}
    }))
    .unwrap();

    let response = dispatch(&mut page, &request);
    assert!(response.code().unwrap().contains("text('open');"));
    assert_eq!(request.id, Some(WireId::Text("2".into())));
}

// ---------------------------------------------------------------------------
// Replay order
// ---------------------------------------------------------------------------

#[test]
fn ancestors_replay_in_order_with_their_own_payloads() {
    let log: Log = Arc::default();
    let mut page = nested_page(&log);

    let request = EventRequest::new(1, 3)
        .with_parent(1, json!({"step": "a"}))
        .with_parent(2, json!({"step": "b"}))
        .with_data(json!({"step": "c"}));
    let response = dispatch(&mut page, &request);

    assert!(response.code().is_some());
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            ("A", json!({"step": "a"})),
            ("B", json!({"step": "b"})),
            ("C", json!({"step": "c"})),
        ]
    );

    let engine = page.engine_mut(1).unwrap();
    assert_eq!(
        engine.registry().chain_of(3).unwrap(),
        &[
            ParentChainEntry::new(1, json!({"step": "a"})),
            ParentChainEntry::new(2, json!({"step": "b"})),
        ]
    );
    assert!(!engine.is_buffering());
    assert!(engine.executing().is_empty());
}

#[test]
fn replayed_ancestor_output_is_discarded() {
    let log: Log = Arc::default();
    let mut page = nested_page(&log);

    let request = EventRequest::new(1, 3)
        .with_parent(1, json!({}))
        .with_parent(2, json!({}));
    let code = dispatch(&mut page, &request).code().unwrap().to_string();

    // C emits nothing, so neither A's nor B's triggers may leak through.
    assert_eq!(code, "(function(jq) {\n  \n})(jQuery);\n");
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn rebuilt_pages_render_identically() {
    let mut first = toggle_page();
    let mut second = toggle_page();
    assert_eq!(first.scripts(), second.scripts());
}

#[test]
fn handler_ids_are_sequential_per_engine() {
    let mut page = Page::default();
    page.mount(|engine| {
        assert_eq!(engine.register(|_, _| Ok(())), 1);
        assert_eq!(engine.add_event(|_, _| Ok(()), "{}")?, 2);
        assert_eq!(engine.jq("#a").click(|_, _| Ok(()), "{}")?.var(), "ele1");
        assert_eq!(engine.registry().ids().collect::<Vec<_>>(), vec![1, 2, 3]);
        Ok(())
    })
    .unwrap();
    page.mount(|engine| {
        assert_eq!(engine.register(|_, _| Ok(())), 1);
        Ok(())
    })
    .unwrap();
}

#[test]
fn nondeterministic_script_never_panics() {
    let builds = Arc::new(AtomicUsize::new(0));
    let script = {
        let builds = builds.clone();
        move |page: &mut Page| -> EngineResult<()> {
            let run = builds.fetch_add(1, Ordering::SeqCst);
            page.mount(|engine| {
                // Registers one handler fewer on every other run.
                if run % 2 == 0 {
                    engine.add_event(
                        |engine, _| {
                            engine.add_code("first();");
                            Ok(())
                        },
                        "{}",
                    )?;
                }
                engine.add_event(
                    |engine, _| {
                        engine.add_event(
                            |engine, _| {
                                engine.add_code("nested();");
                                Ok(())
                            },
                            "{}",
                        )?;
                        Ok(())
                    },
                    "{}",
                )?;
                Ok(())
            })?;
            Ok(())
        }
    };

    let requests = [
        EventRequest::new(1, 2),
        EventRequest::new(1, 3).with_parent(2, json!({})),
        EventRequest::new(1, 1),
        EventRequest::new(1, 2).with_parent(1, json!({})),
    ];

    for request in requests.iter().cycle().take(8) {
        let mut page = Page::build(&script, EngineConfig::default()).unwrap();
        match dispatch(&mut page, request) {
            EventResponse::Code(code) => assert!(code.starts_with("(function(jq) {")),
            EventResponse::Error(message) => assert!(!message.is_empty()),
        }
    }
    assert_eq!(builds.load(Ordering::SeqCst), 8);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn protocol_errors_carry_wire_messages() {
    let mut page = toggle_page();

    let no_id = EventRequest {
        instance: Some(1),
        ..Default::default()
    };
    assert_eq!(dispatch(&mut page, &no_id).error(), Some("No callback id given."));

    assert_eq!(
        dispatch(&mut page, &EventRequest::new(1, 2)).error(),
        Some("No id registered.")
    );

    assert_eq!(
        dispatch(&mut page, &EventRequest::new(1, 2).with_parent(9, json!({}))).error(),
        Some("No child id registered.")
    );

    assert_eq!(
        dispatch(&mut page, &EventRequest::new(1, 7).with_parent(1, json!({}))).error(),
        Some("No child id registered.")
    );
}

#[test]
fn error_response_serializes_for_the_browser() {
    let mut page = toggle_page();
    let response = dispatch(&mut page, &EventRequest::new(1, 42));
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"error": "No id registered."})
    );
}

#[test]
fn handler_errors_are_recovered() {
    let mut page = Page::default();
    page.mount(|engine| {
        engine.add_event(|_, _| Err(anyhow::anyhow!("lookup failed").into()), "{}")?;
        engine.add_event(
            |engine, _| {
                engine.jq("#flag").call("prop", &[json!("checked"), json!(true)])?;
                Ok(())
            },
            "{}",
        )?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        dispatch(&mut page, &EventRequest::new(1, 1)).error(),
        Some("lookup failed")
    );
    assert_eq!(
        dispatch(&mut page, &EventRequest::new(1, 2)).error(),
        Some("could not convert boolean parameter")
    );
}

#[test]
fn configuration_errors_are_fatal() {
    let mut page = Page::default();
    page.mount(|engine| {
        engine.add_event(
            |engine, _| {
                let args = vec![json!(1); 6];
                engine.window().call("scrollTo", &args)?;
                Ok(())
            },
            "{}",
        )?;
        Ok(())
    })
    .unwrap();

    let result = page.listen(&EventRequest::new(1, 1)).unwrap();
    match result {
        Err(EngineError::Configuration(ConfigurationError::TooManyArguments { method, count })) => {
            assert_eq!(method, "scrollTo");
            assert_eq!(count, 6);
        }
        other => panic!("expected a configuration error, got {other:?}"),
    }
    assert!(!page.engine_mut(1).unwrap().is_buffering());
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[test]
fn requests_route_to_their_instance() {
    fn widget(label: &'static str) -> impl FnOnce(&mut Engine) -> EngineResult<()> {
        move |engine: &mut Engine| {
            engine.add_event(
                move |engine, _| {
                    engine.add_code(format!("say('{label}');"));
                    Ok(())
                },
                "{}",
            )?;
            Ok(())
        }
    }

    let mut page = Page::default();
    page.mount(widget("first")).unwrap();
    page.mount(widget("second")).unwrap();

    let second = dispatch(&mut page, &EventRequest::new(2, 1));
    assert!(second.code().unwrap().contains("say('second');"));
    assert!(!second.code().unwrap().contains("say('first');"));

    assert!(page.listen(&EventRequest::new(3, 1)).is_none());
}
