//! End-to-end trace scenarios (v0.1)
//!
//! Drives full captures through the recorder and renderer and checks the
//! structural properties: balanced Call/Return bracketing, indent
//! alignment, scope filtering, and snapshot hygiene.

use serde_json::{json, Value};
use tracetree::{
    BindingValue, Capture, EventRecord, ExecutionObserver, FrameView, Recorder, Renderer,
    ScopeFilter, SourceLocation, TraceError, TraceLog,
};

fn plain() {
    colored::control::set_override(false);
}

fn record(capture_json: &str, token: &str) -> TraceLog {
    let capture: Capture = capture_json.parse().expect("capture should parse");
    let mut recorder = Recorder::new(ScopeFilter::new(token));
    capture.drive(&mut recorder);
    recorder.log()
}

fn render_lines(log: &TraceLog) -> Vec<String> {
    let mut renderer = Renderer::new();
    log.events()
        .iter()
        .map(|event| renderer.render_event(event).expect("render should succeed"))
        .collect()
}

// ============================================================================
// Scenario: single top-level call
// ============================================================================

const SINGLE_CALL: &str = r#"[
    {"type": "call", "file": "hdbg/demo.py", "line": 1, "scope": "f"},
    {"type": "line", "file": "hdbg/demo.py", "line": 2, "scope": "f",
     "bindings": []},
    {"type": "return", "file": "hdbg/demo.py", "line": 2, "scope": "f", "value": 1}
]"#;

#[test]
fn single_call_records_call_line_return() {
    let log = record(SINGLE_CALL, "hdbg");
    let events = log.events();

    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[0],
        EventRecord::Call { scope, bindings, .. } if scope == "f" && bindings.is_empty()
    ));
    assert!(matches!(
        &events[1],
        EventRecord::Line { scope, .. } if scope == "f"
    ));
    assert!(matches!(
        &events[2],
        EventRecord::Return { scope, return_value, .. }
            if scope == "f" && return_value == &Some(json!(1))
    ));
}

#[test]
fn single_call_renders_at_aligned_indents() {
    plain();
    let log = record(SINGLE_CALL, "hdbg");
    let lines = render_lines(&log);

    // Call and Return align at indent 0; the line between sits at 2.
    assert_eq!(lines[0], "   1 CALL: f()");
    assert!(lines[1].starts_with("   2   LINE:"));
    assert_eq!(lines[2], "   2 RET : f (1)");
}

// ============================================================================
// Scenario: nested calls f -> g
// ============================================================================

const NESTED_CALLS: &str = r#"[
    {"type": "call", "file": "hdbg/demo.py", "line": 1, "scope": "f"},
    {"type": "call", "file": "hdbg/demo.py", "line": 5, "scope": "g"},
    {"type": "return", "file": "hdbg/demo.py", "line": 6, "scope": "g", "value": 2},
    {"type": "return", "file": "hdbg/demo.py", "line": 3, "scope": "f", "value": 2}
]"#;

#[test]
fn nested_calls_nest_one_level_per_call() {
    plain();
    let log = record(NESTED_CALLS, "hdbg");
    let lines = render_lines(&log);

    assert_eq!(lines[0], "   1 CALL: f()");
    assert_eq!(lines[1], "   5   CALL: g()");
    assert_eq!(lines[2], "   6   RET : g (2)");
    assert_eq!(lines[3], "   3 RET : f (2)");
}

#[test]
fn nested_calls_satisfy_the_balance_invariant() {
    let log = record(NESTED_CALLS, "hdbg");
    let stats = log.verify_balanced().unwrap();
    assert_eq!(stats.calls, stats.returns);
    assert_eq!(stats.max_depth, 2);

    // Prefix property: never more returns than calls at any point.
    let mut open = 0i64;
    for event in log.events() {
        if event.is_call() {
            open += 1;
        }
        if event.is_return() {
            open -= 1;
        }
        assert!(open >= 0);
    }
}

// ============================================================================
// Scenario: comprehension scope
// ============================================================================

const COMPREHENSION: &str = r#"[
    {"type": "call", "file": "hdbg/demo.py", "line": 4, "scope": "<listcomp>",
     "bindings": [{"name": ".0", "kind": "iter", "items": [0, 1, 2]}]},
    {"type": "return", "file": "hdbg/demo.py", "line": 4, "scope": "<listcomp>",
     "value": [0, 1, 2]}
]"#;

#[test]
fn comprehension_entry_snapshots_the_materialized_source() {
    let log = record(COMPREHENSION, "hdbg");
    match &log.events()[0] {
        EventRecord::Call { scope, bindings, .. } => {
            assert_eq!(scope, "<listcomp>");
            assert_eq!(bindings, &vec![(".0".to_string(), json!([0, 1, 2]))]);
        }
        other => panic!("expected Call, got {other:?}"),
    }
}

#[test]
fn comprehension_renders_sentinel_argument() {
    plain();
    let log = record(COMPREHENSION, "hdbg");
    let lines = render_lines(&log);
    assert_eq!(lines[0], "   4 CALL: <listcomp>(.0=[0,1,2])");
    assert_eq!(lines[1], "   4 RET : <listcomp> ([0,1,2])");
}

// ============================================================================
// Filtering and snapshot hygiene
// ============================================================================

#[test]
fn rejected_locations_never_reach_the_log() {
    let mixed = r#"[
        {"type": "call", "file": "hdbg/demo.py", "line": 1, "scope": "f"},
        {"type": "call", "file": "/usr/lib/functools.py", "line": 40, "scope": "wraps"},
        {"type": "return", "file": "/usr/lib/functools.py", "line": 41, "scope": "wraps"},
        {"type": "return", "file": "hdbg/demo.py", "line": 2, "scope": "f", "value": null}
    ]"#;
    let log = record(mixed, "hdbg");

    assert_eq!(log.len(), 2);
    let filter = ScopeFilter::new("hdbg");
    for event in log.events() {
        assert!(filter.accepts(&event.location().file));
    }
}

#[test]
fn reserved_and_callable_bindings_are_never_recorded() {
    let noisy = r#"[
        {"type": "line", "file": "hdbg/demo.py", "line": 2, "scope": "f",
         "bindings": [{"name": "x", "kind": "data", "value": 1},
                      {"name": "_internal", "kind": "data", "value": 2},
                      {"name": "helper", "kind": "callable", "display": "helper"}]}
    ]"#;
    let log = record(noisy, "hdbg");

    match &log.events()[0] {
        EventRecord::Line { bindings, .. } => {
            assert_eq!(bindings, &vec![("x".to_string(), json!(1))]);
        }
        other => panic!("expected Line, got {other:?}"),
    }
}

#[test]
fn recorded_events_survive_later_frame_mutation() {
    // A frame whose storage keeps changing after events fire, like a
    // real execution context.
    struct LiveFrame {
        x: Value,
    }
    impl FrameView for LiveFrame {
        fn location(&self) -> SourceLocation {
            SourceLocation::new("hdbg/demo.py", 2)
        }
        fn scope_name(&self) -> Option<String> {
            Some("f".into())
        }
        fn bindings(&self) -> Vec<(String, BindingValue)> {
            vec![("x".into(), BindingValue::Data(self.x.clone()))]
        }
        fn materialize_iter(&mut self, _name: &str) -> Option<Vec<Value>> {
            None
        }
    }

    let mut recorder = Recorder::new(ScopeFilter::new("hdbg"));
    let mut frame = LiveFrame { x: json!(1) };
    recorder.on_line(&frame);

    frame.x = json!("mutated");

    match &recorder.log().events()[0] {
        EventRecord::Line { bindings, .. } => {
            assert_eq!(bindings, &vec![("x".to_string(), json!(1))]);
        }
        other => panic!("expected Line, got {other:?}"),
    }
}

// ============================================================================
// Rendering modes and failure paths
// ============================================================================

#[test]
fn streaming_render_matches_buffered_render() {
    plain();
    let capture: Capture = NESTED_CALLS.parse().unwrap();

    // Buffered: record everything, then render.
    let mut recorder = Recorder::new(ScopeFilter::new("hdbg"));
    capture.drive(&mut recorder);
    let buffered = render_lines(&recorder.log());

    // Streaming: render each event as soon as it lands in the log.
    let mut recorder = Recorder::new(ScopeFilter::new("hdbg"));
    let log = recorder.log();
    let mut renderer = Renderer::new();
    let mut streamed = Vec::new();
    let mut cursor = 0;
    for event in capture.events() {
        Capture::fire(event, &mut recorder);
        while let Some(record) = log.get(cursor) {
            streamed.push(renderer.render_event(&record).unwrap());
            cursor += 1;
        }
    }

    assert_eq!(streamed, buffered);
}

#[test]
fn orphan_return_fails_both_check_and_render() {
    plain();
    let broken = r#"[
        {"type": "return", "file": "hdbg/demo.py", "line": 9, "scope": "f", "value": 1}
    ]"#;
    let log = record(broken, "hdbg");

    assert!(matches!(
        log.verify_balanced(),
        Err(TraceError::OrphanReturn { index: 0, .. })
    ));

    let mut renderer = Renderer::new();
    assert!(matches!(
        renderer.render_event(&log.events()[0]),
        Err(TraceError::IndentUnderflow { index: 0, .. })
    ));
}
