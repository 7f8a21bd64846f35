//! WebAssembly bindings for reward Merkle proofs.
//!
//! This crate provides JavaScript-accessible APIs for:
//! - Hashing reward records into leaf digests
//! - Verifying proof bundles against a published root
//! - Committing a day's rewards and issuing proofs by (miner, date)

use wasm_bindgen::prelude::*;

pub mod batch;
pub mod state;
pub mod verify;

// Re-export main types for JS access
pub use batch::RewardBatch;

/// Initialize the WASM module with better panic messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Log to the browser console.
#[wasm_bindgen]
pub fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}
