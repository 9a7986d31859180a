//! End-to-end scenarios driving a runtime over an in-memory document

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glide_core::testing::{MarkerOp, MockDocument, RecordingScroller};
use glide_core::ScrollBehavior;
use glide_motion::glide_animation::ScrollTransform;
use glide_motion::{
    Direction, FillAnchor, MotionRuntime, Navigation, ScrollProgress, ScrollRange,
    SectionDescriptor,
};

const VIEWPORT: f32 = 800.0;

fn page() -> Rc<MockDocument> {
    let doc = Rc::new(MockDocument::new(VIEWPORT, 4000.0));
    doc.insert_section("hero", 0.0, 800.0);
    doc.insert_section("services", 800.0, 1200.0);
    doc.insert_section("contact", 2000.0, 1000.0);
    doc.set_heading("services", "services-title");
    doc
}

fn sections() -> Vec<SectionDescriptor> {
    vec![
        SectionDescriptor::new("hero", "Home"),
        SectionDescriptor::new("services", "Services"),
        SectionDescriptor::new("contact", "Contact"),
    ]
}

/// Scroll to `y` and deliver one frame at `now_ms`
fn scroll(doc: &MockDocument, runtime: &MotionRuntime, y: f32, now_ms: f64) {
    doc.set_scroll_y(y);
    runtime.on_scroll_event();
    runtime.on_frame(now_ms);
}

// ============================================================================
// Directional fill
// ============================================================================

#[test]
fn test_fill_scenario_ends_below_peak() {
    let doc = page();
    doc.insert_section("bar", 600.0, 200.0);
    let runtime = MotionRuntime::new(doc.clone());
    let fill = runtime.directional_fill("bar");

    let mut peak = 0.0_f32;
    let mut progress_at_250 = 0.0_f32;
    for (i, y) in [0.0, 100.0, 250.0, 250.0, 100.0, 0.0].into_iter().enumerate() {
        scroll(&doc, &runtime, y, i as f64 * 100.0);
        let p = fill.progress();
        peak = peak.max(p);
        if y == 250.0 {
            progress_at_250 = p;
        }
    }

    assert!((progress_at_250 - 250.0 / 600.0).abs() < 1e-5);
    assert!((peak - progress_at_250).abs() < 1e-6);
    assert!(fill.progress() <= peak);
    assert_eq!(fill.progress(), 0.0);

    let out = fill.current();
    assert_eq!(out.direction, Direction::Up);
    assert_eq!(out.anchor, FillAnchor::Right);
}

#[test]
fn test_fill_monotonic_down_and_up() {
    let doc = page();
    doc.insert_section("bar", 1200.0, 300.0);
    let runtime = MotionRuntime::new(doc.clone());
    let fill = runtime.directional_fill("bar");

    let mut last = fill.progress();
    let mut t = 0.0;
    for y in (0..=30).map(|i| i as f32 * 50.0) {
        t += 16.0;
        scroll(&doc, &runtime, y, t);
        assert!(fill.progress() >= last);
        last = fill.progress();
    }
    assert_eq!(last, 1.0);

    for y in (0..30).rev().map(|i| i as f32 * 50.0) {
        t += 16.0;
        scroll(&doc, &runtime, y, t);
        assert!(fill.progress() <= last);
        last = fill.progress();
    }
    assert_eq!(last, 0.0);
}

#[test]
fn test_fill_mounted_late_keeps_direction() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let fill = runtime.directional_fill("bar");

    // Reader scrolls down before the element exists
    for (i, y) in [200.0, 600.0, 1000.0].into_iter().enumerate() {
        scroll(&doc, &runtime, y, (i + 1) as f64 * 16.0);
    }
    assert_eq!(fill.progress(), 0.0);

    // It mounts just below, then the reader scrolls back up into it
    doc.insert_section("bar", 1000.0, 200.0);
    scroll(&doc, &runtime, 900.0, 64.0);

    let out = fill.current();
    assert_eq!(out.progress, 0.0);
    assert_eq!(out.direction, Direction::Up);
    assert_eq!(out.anchor, FillAnchor::Right);
}

// ============================================================================
// Sections
// ============================================================================

#[test]
fn test_section_tracker_scenario() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let tracker = runtime.section_tracker(sections());

    assert_eq!(tracker.current_id().as_deref(), Some("hero"));
    assert!(!tracker.nav_visible());

    scroll(&doc, &runtime, 650.0, 16.0);
    assert_eq!(tracker.current_id().as_deref(), Some("services"));
    assert_eq!(tracker.current_section().map(|s| s.label.as_str()), Some("Services"));
    assert!(tracker.nav_visible());

    scroll(&doc, &runtime, 1850.0, 32.0);
    assert_eq!(tracker.current_id().as_deref(), Some("contact"));
}

#[test]
fn test_nav_gate_is_strict() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let tracker = runtime.section_tracker(sections());

    scroll(&doc, &runtime, 200.0, 16.0);
    assert!(!tracker.nav_visible());
    scroll(&doc, &runtime, 201.0, 32.0);
    assert!(tracker.nav_visible());
}

#[test]
fn test_tracker_publishes_only_changes() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let tracker = runtime.section_tracker(sections());

    let changes = Rc::new(RefCell::new(Vec::new()));
    let c = changes.clone();
    let _sub = tracker.subscribe(move |s| c.borrow_mut().push(s.current_id.clone()));

    scroll(&doc, &runtime, 100.0, 16.0);
    scroll(&doc, &runtime, 150.0, 32.0);
    scroll(&doc, &runtime, 700.0, 48.0);

    // 100 -> 150 changes nothing; nav turns on only after 200
    assert_eq!(*changes.borrow(), vec![Some("services".to_string())]);
}

#[test]
fn test_notifier_never_repeats_and_cools_down() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let notifier = runtime.section_notifier(sections());

    let shown = Rc::new(RefCell::new(Vec::new()));
    let s = shown.clone();
    let _sub = notifier.subscribe(move |state| {
        if let Some(label) = &state.visible_label {
            if s.borrow().last() != Some(label) {
                s.borrow_mut().push(label.clone());
            }
        }
    });

    // Midpoint 360 is already past hero's 0..=250 window
    scroll(&doc, &runtime, 0.0, 16.0);
    assert_eq!(notifier.visible_label(), None);

    // 500 + 360 = 860, inside services' 800..=1050
    scroll(&doc, &runtime, 500.0, 100.0);
    assert_eq!(notifier.visible_label().as_deref(), Some("Services"));
    assert!(notifier.cooldown_active());

    // Hidden after 1400ms, cooldown still on
    runtime.advance_to(1500.0);
    assert_eq!(notifier.visible_label(), None);
    assert!(notifier.cooldown_active());

    // Cooldown released at 2100; same section is not announced again
    runtime.advance_to(2100.0);
    assert!(!notifier.cooldown_active());
    scroll(&doc, &runtime, 550.0, 2200.0);
    assert_eq!(notifier.visible_label(), None);

    // 1700 + 360 = 2060, inside contact
    scroll(&doc, &runtime, 1700.0, 2300.0);
    assert_eq!(notifier.visible_label().as_deref(), Some("Contact"));

    assert_eq!(*shown.borrow(), vec!["Services", "Contact"]);
}

#[test]
fn test_notifier_blocked_during_cooldown() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let notifier = runtime.section_notifier(sections());

    scroll(&doc, &runtime, 500.0, 16.0);
    assert_eq!(notifier.current().last_shown_id.as_deref(), Some("services"));

    // Contact's window is crossed while cooling down
    scroll(&doc, &runtime, 1700.0, 500.0);
    assert_eq!(notifier.current().last_shown_id.as_deref(), Some("services"));
}

#[test]
fn test_dropped_notifier_cancels_timers() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let notifier = runtime.section_notifier(sections());

    scroll(&doc, &runtime, 500.0, 16.0);
    assert!(notifier.has_pending_timers());
    assert_eq!(runtime.scheduler().pending_count(), 2);

    drop(notifier);
    assert_eq!(runtime.scheduler().pending_count(), 0);
    assert!(!doc.is_listening());
}

// ============================================================================
// Reveal
// ============================================================================

#[test]
fn test_reveal_fires_once() {
    let doc = page();
    doc.insert_section("card", 1000.0, 400.0);
    let runtime = MotionRuntime::new(doc.clone());
    let reveal = runtime.reveal("card");

    let fired = Rc::new(Cell::new(0));
    let f = fired.clone();
    let _sub = reveal.subscribe(move |_| f.set(f.get() + 1));

    assert!(!reveal.is_revealed());
    assert!(reveal.is_observing());

    // Viewport bottom (minus 50) at 1000: nothing visible yet
    scroll(&doc, &runtime, 250.0, 16.0);
    assert!(!reveal.is_revealed());

    // Bottom edge at 1310: 310/400 visible
    scroll(&doc, &runtime, 560.0, 32.0);
    assert!(reveal.is_revealed());
    assert!(!reveal.is_observing());

    // Leave and come back
    scroll(&doc, &runtime, 0.0, 48.0);
    scroll(&doc, &runtime, 700.0, 64.0);
    assert!(reveal.is_revealed());
    assert_eq!(fired.get(), 1);
    assert_eq!(runtime.signal().subscriber_count(), 0);
}

#[test]
fn test_reveal_in_view_on_observe() {
    let doc = page();
    doc.insert_section("intro", 100.0, 300.0);
    let runtime = MotionRuntime::new(doc.clone());
    let reveal = runtime.reveal("intro");

    assert!(reveal.is_revealed());
    assert!(!reveal.is_observing());
    assert!(!doc.is_listening());
}

#[test]
fn test_reveal_waits_for_missing_element() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let reveal = runtime.reveal("late");

    scroll(&doc, &runtime, 100.0, 16.0);
    assert!(!reveal.is_revealed());

    doc.insert_section("late", 300.0, 200.0);
    scroll(&doc, &runtime, 120.0, 32.0);
    assert!(reveal.is_revealed());
}

// ============================================================================
// Velocity
// ============================================================================

#[test]
fn test_estimator_settles_after_idle_window() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let velocity = runtime.velocity();

    let mut t = 0.0;
    for i in 1..=10 {
        t += 16.0;
        scroll(&doc, &runtime, i as f32 * 40.0, t);
    }
    let moving = velocity.current();
    assert!(moving.is_active);
    assert!(moving.pressure > 0.5);
    assert_eq!(moving.direction, Direction::Down);
    assert!(velocity.is_settling());

    // Just before the idle deadline
    runtime.advance_to(t + 149.0);
    assert!(velocity.is_active());

    runtime.advance_to(t + 150.0);
    let settled = velocity.current();
    assert!(!settled.is_active);
    assert_eq!(settled.pressure, 0.0);
    assert_eq!(settled.direction, Direction::Idle);
}

/// Deliver frames every 16ms up to `until_ms`, but only when the runtime
/// asked for one since the last delivery. Returns the final time.
fn pump_requested_frames(
    doc: &MockDocument,
    runtime: &MotionRuntime,
    from_ms: f64,
    until_ms: f64,
) -> f64 {
    let mut delivered = doc.frame_requests();
    let mut t = from_ms;
    while t < until_ms {
        t += 16.0;
        if doc.frame_requests() > delivered {
            delivered = doc.frame_requests();
            runtime.on_frame(t);
        }
    }
    t
}

#[test]
fn test_estimator_settles_on_requested_frames_only() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let velocity = runtime.velocity();

    let mut t = 0.0;
    for i in 1..=5 {
        t += 16.0;
        scroll(&doc, &runtime, i as f32 * 160.0, t);
    }
    assert_eq!(velocity.pressure(), 1.0);

    // No more scroll events; the host only answers frame requests
    let t = pump_requested_frames(&doc, &runtime, t, t + 400.0);
    let settled = velocity.current();
    assert!(!settled.is_active);
    assert_eq!(settled.pressure, 0.0);
    assert_eq!(runtime.scheduler().pending_count(), 0);

    // Nothing pending, so the host goes quiet
    let requests = doc.frame_requests();
    pump_requested_frames(&doc, &runtime, t, t + 200.0);
    assert_eq!(doc.frame_requests(), requests);
}

#[test]
fn test_delayed_navigation_and_pulse_on_requested_frames_only() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let nav = runtime.anchor_navigator();

    assert_eq!(nav.navigate("services", Some(300.0)), Navigation::Scheduled);
    pump_requested_frames(&doc, &runtime, 0.0, 1500.0);

    assert_eq!(doc.scrolls().len(), 1);
    assert!(!doc.has_marker("services-title", "reveal-pulse"));
    assert_eq!(runtime.next_deadline(), None);
}

#[test]
fn test_estimator_reports_upward_motion() {
    let doc = page();
    doc.set_scroll_y(1000.0);
    let runtime = MotionRuntime::new(doc.clone());
    let velocity = runtime.velocity();

    scroll(&doc, &runtime, 900.0, 16.0);
    assert_eq!(velocity.direction(), Direction::Up);
    assert!(velocity.pressure() > 0.0);
}

// ============================================================================
// Signal
// ============================================================================

#[test]
fn test_many_events_one_frame() {
    let doc = page();
    doc.insert_section("bar", 900.0, 200.0);
    let runtime = MotionRuntime::new(doc.clone());
    let tracker = runtime.section_tracker(sections());
    let fill = runtime.directional_fill("bar");

    let reads = doc.layout_reads();
    for y in [10.0, 50.0, 120.0, 400.0, 650.0] {
        doc.set_scroll_y(y);
        runtime.on_scroll_event();
    }
    assert_eq!(doc.frame_requests(), 1);
    assert!(runtime.on_frame(16.0));

    // One read shared by every component
    assert_eq!(doc.layout_reads() - reads, 1);
    assert_eq!(tracker.current_id().as_deref(), Some("services"));
    assert!(fill.progress() > 0.0);
}

#[test]
fn test_listener_released_with_last_component() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    assert!(!doc.is_listening());

    let tracker = runtime.section_tracker(sections());
    let velocity = runtime.velocity();
    assert!(doc.is_listening());

    drop(tracker);
    assert!(doc.is_listening());
    drop(velocity);
    assert!(!doc.is_listening());
    assert_eq!(doc.listener_toggles(), 2);
}

// ============================================================================
// Scroll-linked transforms
// ============================================================================

#[test]
fn test_scroll_linked_hero_fade() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());

    let transform = ScrollTransform::builder()
        .number("opacity", [0.0, 0.5], [1.0, 0.0])
        .number("blur", [0.0, 1.0], [0.0, 8.0])
        .composite("filter", ["blur"], |v| format!("blur({:.0}px)", v[0]))
        .build()
        .expect("valid transform");

    let hero = ScrollProgress::element("hero").with_range(ScrollRange::exiting());
    let linked = runtime.scroll_linked(hero, transform);

    assert_eq!(linked.progress(), 0.0);
    assert_eq!(linked.number("opacity"), Some(1.0));

    scroll(&doc, &runtime, 400.0, 16.0);
    assert!((linked.progress() - 0.5).abs() < 1e-6);
    assert_eq!(linked.number("opacity"), Some(0.0));
    assert_eq!(linked.text("filter").as_deref(), Some("blur(4px)"));

    // Past the hero: progress keeps going, outputs stay clamped
    scroll(&doc, &runtime, 1600.0, 32.0);
    assert!(linked.progress() > 1.0);
    assert_eq!(linked.number("blur"), Some(8.0));
}

#[test]
fn test_document_progress_source() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let transform = ScrollTransform::builder()
        .number("width", [0.0, 1.0], [0.0, 100.0])
        .build()
        .expect("valid transform");
    let linked = runtime.scroll_linked(ScrollProgress::document(), transform);

    scroll(&doc, &runtime, 1600.0, 16.0);
    assert!((linked.progress() - 0.5).abs() < 1e-6);
    assert!((linked.number("width").unwrap_or_default() - 50.0).abs() < 1e-4);
}

// ============================================================================
// Anchor navigation
// ============================================================================

#[test]
fn test_anchor_unknown_id_is_noop() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let nav = runtime.anchor_navigator();

    assert_eq!(nav.navigate("pricing", None), Navigation::Missing);
    assert!(doc.scrolls().is_empty());
    assert!(doc.marker_log().is_empty());
}

#[test]
fn test_anchor_native_scroll_and_pulse() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let nav = runtime.anchor_navigator();

    assert_eq!(nav.navigate("services", None), Navigation::Scrolled);
    assert_eq!(doc.scrolls(), vec![(780.0, ScrollBehavior::Smooth)]);

    assert_eq!(
        doc.marker_log(),
        vec![
            MarkerOp::Remove("services-title".into(), "reveal-pulse".into()),
            MarkerOp::Reflow("services-title".into()),
            MarkerOp::Add("services-title".into(), "reveal-pulse".into()),
        ]
    );
    assert!(doc.has_marker("services-title", "reveal-pulse"));

    runtime.advance_to(699.0);
    assert!(doc.has_marker("services-title", "reveal-pulse"));
    runtime.advance_to(700.0);
    assert!(!doc.has_marker("services-title", "reveal-pulse"));
}

#[test]
fn test_anchor_repulse_extends_marker() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let nav = runtime.anchor_navigator();

    nav.navigate("services", None);
    runtime.advance_to(500.0);
    nav.navigate("services", None);

    // The first removal (due at 700) was cancelled
    runtime.advance_to(1000.0);
    assert!(doc.has_marker("services-title", "reveal-pulse"));
    runtime.advance_to(1200.0);
    assert!(!doc.has_marker("services-title", "reveal-pulse"));
}

#[test]
fn test_anchor_delay_replaced_by_newer_request() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let nav = runtime.anchor_navigator();

    assert_eq!(nav.navigate("services", Some(300.0)), Navigation::Scheduled);
    runtime.advance_to(100.0);
    assert_eq!(nav.navigate("contact", Some(300.0)), Navigation::Scheduled);

    runtime.advance_to(350.0);
    assert!(doc.scrolls().is_empty());
    assert!(nav.has_pending());

    runtime.advance_to(400.0);
    assert_eq!(doc.scrolls(), vec![(1980.0, ScrollBehavior::Smooth)]);
    assert!(!nav.has_pending());
}

#[test]
fn test_anchor_uses_engine_when_installed() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let engine = Rc::new(RecordingScroller::new());
    let nav = runtime.anchor_navigator_with(engine.clone());

    nav.navigate("contact", None);
    assert!(doc.scrolls().is_empty());

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "contact");
    assert_eq!(calls[0].1.offset, -20.0);
    assert_eq!(calls[0].1.duration_ms, Some(1200.0));
}

#[test]
fn test_dropping_navigator_cleans_up() {
    let doc = page();
    let runtime = MotionRuntime::new(doc.clone());
    let nav = runtime.anchor_navigator();

    nav.navigate("services", None);
    nav.navigate("contact", Some(500.0));
    assert_eq!(runtime.scheduler().pending_count(), 2);

    drop(nav);
    assert_eq!(runtime.scheduler().pending_count(), 0);
    assert!(!doc.has_marker("services-title", "reveal-pulse"));

    runtime.advance_to(2000.0);
    assert_eq!(doc.scrolls().len(), 1);
}
