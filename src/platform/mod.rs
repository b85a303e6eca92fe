//! Browser platform layer
//!
//! Canvas drawing, input listeners, the animation frame loop and the
//! device motion feed. Only built for wasm32; native builds drive the
//! engines headless.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
#[cfg(target_arch = "wasm32")]
pub mod web;
