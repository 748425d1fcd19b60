use leptos::logging::log;
use leptos::{try_with_owner, Owner};

/// Wraps a callback that fires outside the reactive tree (an `EventSource`
/// listener, a timer) so it runs under the owner that was current when it
/// was created. Events arriving after that owner is disposed are dropped.
pub fn bind_to_owner<T, F>(log_context: &'static str, f: F) -> impl Fn(T) + 'static
where
    T: 'static,
    F: Fn(T) + 'static,
{
    let owner = Owner::current();
    move |value: T| match owner {
        Some(owner) => {
            if try_with_owner(owner, || f(value)).is_err() {
                log!("[OWNER] Owner disposed, dropping callback: {}", log_context);
            }
        }
        None => {
            log!("[OWNER] No Leptos owner in context: {}", log_context);
            f(value);
        }
    }
}
