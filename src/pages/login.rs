use leptos::logging::warn;
use leptos::*;
use leptos_router::use_navigate;

use crate::client;
use crate::errors::{RATE_LIMITED, VALIDATION_FAILED};
use crate::models::LoginRequest;
use crate::rate_limit::{RateLimit, RateLimiter};
use crate::security::sanitize_email;

#[component]
pub fn LoginPage() -> impl IntoView {
    let limiter = store_value(RateLimiter::new(RateLimit::LOGIN_ATTEMPTS));
    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);
    let (busy, set_busy) = create_signal(false);
    let navigate = use_navigate();

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let address = sanitize_email(&email.get_untracked());
        if address.is_empty() || password.with_untracked(String::is_empty) {
            set_error.set(Some(VALIDATION_FAILED.to_string()));
            return;
        }
        if !limiter.with_value(|l| l.check(&address)) {
            warn!("[SECURITY] Login attempts exceeded for {}", address);
            set_error.set(Some(RATE_LIMITED.to_string()));
            return;
        }

        let request = LoginRequest { email: address, password: password.get_untracked() };
        let navigate = navigate.clone();
        set_busy.set(true);
        spawn_local(async move {
            let result = client::login(&request).await;
            set_busy.set(false);
            match result {
                Ok(()) => navigate("/", Default::default()),
                Err(e) => set_error.set(Some(e.user_message())),
            }
        });
    };

    view! {
        <section class="login-page">
            <form class="card" on:submit=submit>
                <h1>{ "Sign in" }</h1>
                <label>
                    { "Email" }
                    <input type="email" autocomplete="email" prop:value=email on:input=move |ev| email.set(event_target_value(&ev)) />
                </label>
                <label>
                    { "Password" }
                    <input type="password" autocomplete="current-password" prop:value=password on:input=move |ev| password.set(event_target_value(&ev)) />
                </label>
                {move || error.get().map(|e| view! { <p class="error">{e}</p> })}
                <button type="submit" class="button" disabled=busy>
                    {move || if busy.get() { "Signing in..." } else { "Sign in" }}
                </button>
            </form>
        </section>
    }
}
