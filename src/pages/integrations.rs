use leptos::logging::{error, log};
use leptos::*;

use crate::client;
use crate::components::layout::Loading;
use crate::hooks::use_change_version;
use crate::models::{IntegrationCredentials, IntegrationSummary, Platform};

/// The one setting each platform needs before it can be synced.
pub fn credential_field(platform: Platform) -> (&'static str, &'static str) {
    match platform {
        Platform::Google => ("place_id", "Google Place ID"),
        Platform::Booking => ("property_id", "Booking.com hotel page id"),
        Platform::Airbnb => ("property_id", "Airbnb listing id"),
        Platform::Tripadvisor => ("location_id", "Tripadvisor location id"),
    }
}

#[component]
fn IntegrationCard(
    platform: Platform,
    #[prop(into)] summary: Signal<Option<IntegrationSummary>>,
) -> impl IntoView {
    let (key, label) = credential_field(platform);
    let value = create_rw_signal(String::new());
    let (message, set_message) = create_signal(None::<Result<String, String>>);

    let save = move |active: Option<bool>| {
        let mut credentials = IntegrationCredentials::new();
        let entered = value.get_untracked();
        if !entered.trim().is_empty() {
            credentials.insert(key.to_string(), entered);
        }
        spawn_local(async move {
            match client::save_integration(platform, &credentials, active).await {
                Ok(_) => {
                    log!("[API] Saved {} integration", platform);
                    value.set(String::new());
                    set_message.set(Some(Ok("Saved.".to_string())));
                }
                Err(e) => {
                    error!("[API] Saving {} integration failed: {}", platform, e);
                    set_message.set(Some(Err(e.user_message())));
                }
            }
        });
    };

    let connected = move || summary.with(|s| s.as_ref().is_some_and(|s| s.is_active));
    let last_sync = move || {
        summary.with(|s| {
            s.as_ref()
                .and_then(|s| s.last_sync)
                .map(|t| format!("Last sync: {}", t.format("%Y-%m-%d %H:%M")))
                .unwrap_or_else(|| "Never synced".to_string())
        })
    };

    view! {
        <div class="integration-card">
            <h3>{platform.label()}</h3>
            <p class="status" class:connected=connected>
                {move || if connected() { "Connected" } else { "Not connected" }}
            </p>
            <p class="muted">{last_sync}</p>
            <label>
                {label}
                <input type="text" prop:value=value on:input=move |ev| value.set(event_target_value(&ev)) />
            </label>
            <div class="actions">
                <button class="button" on:click=move |_| save(None)>{ "Save" }</button>
                <Show when=move || summary.with(Option::is_some)>
                    <button class="button secondary" on:click=move |_| save(Some(!connected()))>
                        {move || if connected() { "Disable" } else { "Enable" }}
                    </button>
                </Show>
            </div>
            {move || message.get().map(|m| match m {
                Ok(msg) => view! { <p class="success">{msg}</p> },
                Err(msg) => view! { <p class="error">{msg}</p> },
            })}
        </div>
    }
}

#[component]
fn GoogleImport() -> impl IntoView {
    let api_key = create_rw_signal(String::new());
    let place_id = create_rw_signal(String::new());
    let (busy, set_busy) = create_signal(false);
    let (message, set_message) = create_signal(None::<Result<String, String>>);

    let import = move |_| {
        let (key, place) = (api_key.get_untracked(), place_id.get_untracked());
        set_busy.set(true);
        spawn_local(async move {
            let result = client::import_google_reviews(&key, &place).await;
            set_busy.set(false);
            match result {
                Ok(r) => set_message.set(Some(Ok(format!("Imported {} reviews from Google.", r.count)))),
                Err(e) => set_message.set(Some(Err(e.user_message()))),
            }
        });
    };

    view! {
        <div class="google-import">
            <h3>{ "Import Google reviews" }</h3>
            <label>
                { "Places API key (optional when configured on the server)" }
                <input type="password" prop:value=api_key on:input=move |ev| api_key.set(event_target_value(&ev)) />
            </label>
            <label>
                { "Place ID" }
                <input type="text" prop:value=place_id on:input=move |ev| place_id.set(event_target_value(&ev)) />
            </label>
            <button class="button" disabled=busy on:click=import>
                {move || if busy.get() { "Importing..." } else { "Import" }}
            </button>
            {move || message.get().map(|m| match m {
                Ok(msg) => view! { <p class="success">{msg}</p> },
                Err(msg) => view! { <p class="error">{msg}</p> },
            })}
        </div>
    }
}

#[component]
pub fn IntegrationsPage() -> impl IntoView {
    let version = use_change_version();
    let integrations = create_local_resource(
        move || version.get(),
        |_| async move { client::list_integrations().await.map_err(|e| e.user_message()) },
    );
    let (syncing, set_syncing) = create_signal(false);
    let (sync_message, set_sync_message) = create_signal(None::<String>);

    let run_sync = move |_| {
        set_syncing.set(true);
        spawn_local(async move {
            let result = client::trigger_sync().await;
            set_syncing.set(false);
            set_sync_message.set(Some(match result {
                Ok(r) => r.message.unwrap_or_else(|| "Sync finished.".to_string()),
                Err(e) => e.user_message(),
            }));
        });
    };

    view! {
        <section class="integrations-page">
            <div class="page-header">
                <h1>{ "Integrations" }</h1>
                <button class="button" disabled=syncing on:click=run_sync>
                    {move || if syncing.get() { "Syncing..." } else { "Sync now" }}
                </button>
            </div>
            {move || sync_message.get().map(|m| view! { <p class="muted">{m}</p> })}

            <Transition fallback=|| view! { <Loading message="Loading integrations..."/> }>
                {move || integrations.get().map(|result| match result {
                    Err(e) => view! { <p class="error">{e}</p> }.into_view(),
                    Ok(list) => Platform::ALL
                        .iter()
                        .map(|platform| {
                            let platform = *platform;
                            let summary = list.iter().find(|s| s.platform == platform).cloned();
                            view! { <IntegrationCard platform=platform summary=Signal::derive(move || summary.clone()) /> }
                        })
                        .collect_view(),
                })}
            </Transition>

            <GoogleImport />
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scraped_platforms_share_property_id() {
        assert_eq!(credential_field(Platform::Booking).0, "property_id");
        assert_eq!(credential_field(Platform::Airbnb).0, "property_id");
        assert_eq!(credential_field(Platform::Google).0, "place_id");
    }
}
