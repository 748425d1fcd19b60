use leptos::logging::{error, warn};
use leptos::*;

use crate::client::{self, ApiResult};
use crate::components::layout::Loading;
use crate::models::{SessionUrl, SubscriptionStatus, FREE_REVIEW_LIMIT};

fn plan_description(status: &SubscriptionStatus) -> String {
    if !status.subscribed {
        return format!("Free plan, up to {} reviews.", FREE_REVIEW_LIMIT);
    }
    let tier = status.subscription_tier.as_deref().unwrap_or("Premium");
    match status.subscription_end {
        Some(end) => format!("{} plan, renews {}.", tier, end.format("%B %-d, %Y")),
        None => format!("{} plan.", tier),
    }
}

async fn redirect_to(session: ApiResult<SessionUrl>) -> Result<(), String> {
    let session = session.map_err(|e| e.user_message())?;
    window()
        .location()
        .set_href(&session.url)
        .map_err(|e| format!("Could not open {}: {:?}", session.url, e))
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let session = create_local_resource(|| (), |_| async move { client::fetch_session().await.ok() });
    let status = create_local_resource(|| (), |_| async move {
        match client::refresh_subscription().await {
            Ok(status) => Ok(status),
            Err(e) => {
                warn!("[API] Could not refresh subscription, showing stored plan: {}", e);
                client::subscription_status().await.map_err(|e| e.user_message())
            }
        }
    });
    let (message, set_message) = create_signal(None::<Result<String, String>>);

    let report = move |result: Result<String, String>| {
        if let Err(e) = &result {
            error!("[API] Settings action failed: {}", e);
        }
        set_message.set(Some(result));
    };

    let upgrade = move |_| {
        spawn_local(async move {
            if let Err(e) = redirect_to(client::checkout_session().await).await {
                report(Err(e));
            }
        })
    };
    let manage = move |_| {
        spawn_local(async move {
            if let Err(e) = redirect_to(client::portal_session().await).await {
                report(Err(e));
            }
        })
    };
    let backup = move |_| {
        spawn_local(async move {
            report(
                client::request_backup()
                    .await
                    .map(|b| format!("Backup {} created.", b.backup_id))
                    .map_err(|e| e.user_message()),
            );
        })
    };
    let seed = move |_| {
        spawn_local(async move {
            report(
                client::seed_sample_reviews()
                    .await
                    .map(|r| format!("Added {} sample reviews.", r.inserted))
                    .map_err(|e| e.user_message()),
            );
        })
    };

    view! {
        <section class="settings-page">
            <h1>{ "Settings" }</h1>

            <div class="card">
                <h3>{ "Account" }</h3>
                <Suspense fallback=|| ()>
                    {move || session.get().flatten().map(|s| view! { <p>{format!("Signed in as {}", s.user_id)}</p> })}
                </Suspense>
            </div>

            <div class="card">
                <h3>{ "Subscription" }</h3>
                <Suspense fallback=|| view! { <Loading message="Loading subscription..."/> }>
                    {move || status.get().map(|result| match result {
                        Ok(s) => {
                            let subscribed = s.subscribed;
                            view! {
                                <p>{plan_description(&s)}</p>
                                {if subscribed {
                                    view! { <button class="button" on:click=manage>{ "Manage Subscription" }</button> }
                                } else {
                                    view! { <button class="button" on:click=upgrade>{ "Upgrade" }</button> }
                                }}
                            }
                            .into_view()
                        }
                        Err(e) => view! { <p class="error">{e}</p> }.into_view(),
                    })}
                </Suspense>
            </div>

            <div class="card">
                <h3>{ "Data" }</h3>
                <button class="button secondary" on:click=backup>{ "Create Backup" }</button>
                <button class="button secondary" on:click=seed>{ "Add Sample Reviews" }</button>
            </div>

            {move || message.get().map(|m| match m {
                Ok(msg) => view! { <p class="success">{msg}</p> },
                Err(msg) => view! { <p class="error">{msg}</p> },
            })}
        </section>
    }
}
