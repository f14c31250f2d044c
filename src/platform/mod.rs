//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Process-wide init (logger, panic hook)
//! - Host element lookup, canvas surface and input listeners (web)
//! - Frame scheduling, smooth scroll and element motion (web)

use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_arch = "wasm32")]
pub mod web;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Install logging and the panic hook. Only the first call does anything;
/// it returns `true`, later calls return `false`.
pub fn init() -> bool {
    if INITIALIZED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return false;
    }
    install_backends();
    log::info!("Shape field platform initialized");
    true
}

#[cfg(target_arch = "wasm32")]
fn install_backends() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already set: {}", e).into());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn install_backends() {
    // Tests and embedders may have installed their own logger already
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();
}
