//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `simpletodo_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Why: keep a tiny CLI probe to validate core crate wiring independently
    // from any host app runtime setup.
    println!("simpletodo_core ping={}", simpletodo_core::ping());
    println!("simpletodo_core version={}", simpletodo_core::core_version());
}
