#[cfg(target_arch = "wasm32")]
pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    //
    // For more details see
    // https://github.com/rustwasm/console_error_panic_hook#readme
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Seed for the shuffle RNG when running in the browser.
#[cfg(target_arch = "wasm32")]
pub(crate) fn browser_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}
