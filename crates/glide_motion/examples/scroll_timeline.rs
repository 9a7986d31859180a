//! Scroll Timeline Demo
//!
//! Drives a simulated landing page through a scripted scroll: down through
//! every section, a click on the "Contact" nav link, then back to the top.
//! Each frame prints the state a renderer would draw.
//!
//! Run with: cargo run -p glide_motion --example scroll_timeline
//! More detail: RUST_LOG=glide_motion=debug cargo run -p glide_motion --example scroll_timeline

use std::rc::Rc;

use anyhow::Result;
use glide_core::testing::MockDocument;
use glide_core::Color;
use glide_motion::glide_animation::ScrollTransform;
use glide_motion::{
    MotionConfig, MotionRuntime, NotifierConfig, ScrollProgress, ScrollRange, SectionDescriptor,
};
use tracing_subscriber::EnvFilter;

const FRAME_MS: f64 = 16.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let doc = Rc::new(MockDocument::new(800.0, 4200.0));
    doc.insert_section("hero", 0.0, 900.0);
    doc.insert_section("services", 900.0, 1300.0);
    doc.insert_section("work", 2200.0, 1000.0);
    doc.insert_section("contact", 3200.0, 1000.0);
    doc.insert_section("services-bar", 1300.0, 120.0);
    doc.insert_section("work-card", 2500.0, 400.0);
    doc.set_heading("contact", "contact-title");

    let config = MotionConfig::default()
        .with_notifier(NotifierConfig::default().with_timing(1000.0, 1500.0));
    let runtime = MotionRuntime::with_config(doc.clone(), config)?;

    let sections = vec![
        SectionDescriptor::new("hero", "Home"),
        SectionDescriptor::new("services", "Services"),
        SectionDescriptor::new("work", "Work"),
        SectionDescriptor::new("contact", "Contact"),
    ];

    let hero = ScrollTransform::builder()
        .number("opacity", [0.0, 0.6], [1.0, 0.0])
        .number("y", [0.0, 1.0], [0.0, -120.0])
        .number("blur", [0.0, 1.0], [0.0, 6.0])
        .number("brightness", [0.0, 1.0], [1.0, 0.7])
        .color(
            "tint",
            [0.0, 1.0],
            [Color::from_hex(0x1E293B), Color::from_hex(0x0F172A)],
        )
        .composite("filter", ["blur", "brightness"], |v| {
            format!("blur({:.1}px) brightness({:.2})", v[0], v[1])
        })
        .build()?;

    let tracker = runtime.section_tracker(sections.clone());
    let notifier = runtime.section_notifier(sections);
    let velocity = runtime.velocity();
    let fill = runtime.directional_fill("services-bar");
    let reveal = runtime.reveal("work-card");
    let hero = runtime.scroll_linked(
        ScrollProgress::element("hero").with_range(ScrollRange::exiting()),
        hero,
    );
    let nav = runtime.anchor_navigator();

    let _reveal_log = reveal.subscribe(|_| tracing::info!("work card revealed"));
    let _label_log = notifier.subscribe(|state| {
        if let Some(label) = &state.visible_label {
            tracing::info!("section label: {}", label);
        }
    });

    let mut now = 0.0;
    let frame = |y: f32, now: &mut f64| {
        *now += FRAME_MS;
        doc.set_scroll_y(y);
        runtime.on_scroll_event();
        runtime.on_frame(*now);

        let motion = velocity.current();
        let section = tracker.current();
        let bar = fill.current();
        tracing::info!(
            "t={:>6.0}ms y={:>6.0} section={:<10} nav={:<5} pressure={:.2} {:?} fill={:.2} ({:?}) hero.opacity={:.2} hero.filter={}",
            *now,
            y,
            section.current_id.as_deref().unwrap_or("-"),
            section.nav_visible,
            motion.pressure,
            motion.direction,
            bar.progress,
            bar.anchor,
            hero.number("opacity").unwrap_or_default(),
            hero.text("filter").unwrap_or_default(),
        );
    };

    // Scroll down in uneven steps
    let mut y = 0.0;
    while y < 2600.0 {
        y += if y < 1200.0 { 60.0 } else { 120.0 };
        frame(y, &mut now);
    }

    // Let things settle, then jump to the contact section
    now += 400.0;
    runtime.advance_to(now);
    tracing::info!("idle: active={} pressure={:.2}", velocity.is_active(), velocity.pressure());

    nav.navigate("contact", Some(250.0));
    now += 300.0;
    runtime.advance_to(now);
    if let Some((target, _)) = doc.scrolls().last() {
        tracing::info!("navigated to contact, scroll target {:.0}", target);
        y = *target;
        frame(y, &mut now);
    }

    // And back up
    while y > 0.0 {
        y = (y - 150.0).max(0.0);
        frame(y, &mut now);
    }

    now += 1000.0;
    runtime.advance_to(now);
    tracing::info!(
        "done after {} frames ({} raw events), {} timers pending",
        runtime.signal().frame_count(),
        runtime.signal().raw_event_count(),
        runtime.scheduler().pending_count()
    );

    Ok(())
}
