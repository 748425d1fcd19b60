use leptos::logging::log;
use std::panic;

/// Adds a hint to panics caused by callbacks that outlive their component,
/// most often a change feed event arriving after the user left the page.
pub fn set_custom_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        original_hook(panic_info);

        let message = if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else {
            "Unknown panic".to_string()
        };

        if message.contains("OwnerDisposed") {
            log!("[PANIC] A reactive owner was used after its component unmounted.");
            log!("[PANIC] Check change feed listeners and pending fetches for missing cleanup.");
        }
    }));
}

pub fn init() {
    console_error_panic_hook::set_once();
    set_custom_panic_hook();
    log!("[PANIC_HOOK] Panic hook installed");
}
