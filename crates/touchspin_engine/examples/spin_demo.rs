//! Spin Demo
//!
//! Drives a headless spinner on the real-time background scheduler:
//! - Builds an engine over an in-memory number input
//! - Holds the up button until the maximum stops the session
//! - Spins back down and releases halfway
//!
//! Run with: RUST_LOG=debug cargo run -p touchspin_engine --example spin_demo

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use touchspin_engine::prelude::*;
use touchspin_engine::Result;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut scheduler = BackgroundScheduler::new();
    scheduler.start_background();

    let input = MemoryInput::number().with_value("95").shared();
    let engine = SpinEngine::builder(input.clone())
        .settings(
            PartialSettings::new()
                .max(120.0)
                .step_interval_delay(200)
                .step_interval(50)
                .boost_at(5)
                .postfix(" kg"),
        )
        .scheduler(Arc::new(scheduler))
        .build()?;

    engine.on_any(|data| {
        tracing::info!(event = %data.event, value = ?data.value, "event");
    });

    // Hold until the session ends at the maximum
    engine.press(Direction::Up);
    while engine.spin_state().is_spinning() {
        thread::sleep(Duration::from_millis(20));
    }
    tracing::info!(text = %input.value(), "reached the top");

    // Spin down for a while, then let go
    engine.press(Direction::Down);
    thread::sleep(Duration::from_millis(600));
    engine.release();
    tracing::info!(text = %input.value(), "released");

    engine.destroy();
    Ok(())
}
