mod common;

use accessify_core::error_handling::{ErrorHandler, ErrorHandlerConfig, ErrorKind};
use accessify_core::events::{listener, EventBus, EventEmitter, Listener};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::{Arc, Weak};

fn wired_bus() -> (Arc<EventBus>, Arc<ErrorHandler>) {
    let bus = Arc::new(EventBus::new());
    let emitter: Weak<dyn EventEmitter> = Arc::downgrade(&bus) as Weak<dyn EventEmitter>;
    let handler = Arc::new(ErrorHandler::with_emitter(
        ErrorHandlerConfig::default(),
        emitter,
    ));
    bus.attach_error_handler(Arc::clone(&handler));
    (bus, handler)
}

#[test]
fn test_failing_listener_does_not_block_siblings() {
    let (bus, handler) = wired_bus();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let first = calls.clone();
    bus.on(
        "contrastChanged",
        listener(move |_| {
            first.lock().push("first");
            anyhow::bail!("stylesheet missing")
        }),
    );
    let second = calls.clone();
    bus.on(
        "contrastChanged",
        listener(move |_| {
            second.lock().push("second");
            Ok(())
        }),
    );

    bus.emit("contrastChanged", &json!("high"));

    assert_eq!(*calls.lock(), vec!["first", "second"]);
    let errors = handler.get_errors_by_kind(ErrorKind::Runtime);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].context, "EventBus.emit(contrastChanged)");
    assert_eq!(errors[0].message, "stylesheet missing");
}

#[test]
fn test_listener_failure_is_reemitted_as_error_event() {
    let (bus, _handler) = wired_bus();
    let errors = common::record_events(&bus, &["error"]);

    bus.on("themeChanged", listener(|_| anyhow::bail!("no dark palette")));
    bus.emit("themeChanged", &json!("dark"));

    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].1["kind"], "runtime");
    assert_eq!(errors[0].1["message"], "no dark palette");
}

#[test]
fn test_failing_error_listener_does_not_recurse() {
    let (bus, handler) = wired_bus();
    bus.on("error", listener(|_| anyhow::bail!("reporter offline")));
    bus.on("announce", listener(|_| anyhow::bail!("live region missing")));

    bus.emit("announce", &Value::Null);

    // Only the original failure is recorded; the error listener's own failure is logged.
    assert_eq!(handler.error_count(), 1);
}

#[test]
fn test_panicking_listener_is_isolated() {
    let (bus, handler) = wired_bus();
    let reached = Arc::new(Mutex::new(false));
    let flag = reached.clone();

    bus.on("focus", listener(|_| panic!("focus ring exploded")));
    bus.on(
        "focus",
        listener(move |_| {
            *flag.lock() = true;
            Ok(())
        }),
    );

    bus.emit("focus", &Value::Null);

    assert!(*reached.lock());
    assert!(handler.get_errors()[0].message.contains("focus ring exploded"));
}

#[test]
fn test_off_removes_only_the_given_callback() {
    let bus = EventBus::new();
    let hits = Arc::new(Mutex::new(0));
    let counter = hits.clone();
    let keep: Listener = listener(move |_| {
        *counter.lock() += 1;
        Ok(())
    });
    let drop_me: Listener = listener(|_| anyhow::bail!("should have been removed"));

    bus.on("tick", keep.clone()).on("tick", drop_me.clone());
    bus.off("tick", &drop_me);
    bus.emit("tick", &Value::Null);

    assert_eq!(*hits.lock(), 1);
    assert_eq!(bus.listener_count("tick"), 1);

    bus.off("tick", &keep);
    assert!(!bus.has_listeners("tick"));
    assert!(bus.event_names().is_empty());

    // Unknown event and unknown callback are silent no-ops.
    bus.off("never", &keep);
}

#[test]
fn test_once_delivers_exactly_once_under_reentrancy() {
    let bus = Arc::new(EventBus::new());
    let deliveries = Arc::new(Mutex::new(0));

    let counter = deliveries.clone();
    let weak = Arc::downgrade(&bus);
    bus.once(
        "ready",
        listener(move |_| {
            *counter.lock() += 1;
            if let Some(bus) = weak.upgrade() {
                bus.emit("ready", &Value::Null);
            }
            Ok(())
        }),
    );

    bus.emit("ready", &Value::Null);
    bus.emit("ready", &Value::Null);

    assert_eq!(*deliveries.lock(), 1);
    assert!(!bus.has_listeners("ready"));
}

#[test]
fn test_remove_all_listeners() {
    let bus = EventBus::new();
    bus.on("a", listener(|_| Ok(())))
        .on("a", listener(|_| Ok(())))
        .on("b", listener(|_| Ok(())));

    bus.remove_all_listeners(Some("a"));
    assert_eq!(bus.event_names(), vec!["b".to_string()]);

    bus.remove_all_listeners(None);
    assert!(bus.event_names().is_empty());
}

#[test]
fn test_emit_without_listeners_is_noop() {
    let bus = EventBus::new();
    bus.emit("nobody", &json!({ "listening": false }));
    assert_eq!(bus.listener_count("nobody"), 0);
}
