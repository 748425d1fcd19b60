use leptos::*;

use crate::client;
use crate::components::layout::{EmptyState, Loading};
use crate::hooks::use_change_version;
use crate::models::{Platform, PricingEntry};

fn display_price(entry: &PricingEntry) -> String {
    match entry.price {
        Some(price) => format!("{} {:.2}", entry.currency, price),
        None => "n/a".to_string(),
    }
}

#[component]
pub fn PricingPage() -> impl IntoView {
    let version = use_change_version();
    let (platform, set_platform) = create_signal(None::<Platform>);

    let entries = create_local_resource(
        move || (version.get(), platform.get()),
        |(_, platform)| async move { client::list_pricing(platform).await.map_err(|e| e.user_message()) },
    );
    let latest = create_local_resource(
        move || version.get(),
        |_| async move { client::latest_pricing().await.unwrap_or_default() },
    );
    let analytics = create_local_resource(
        move || version.get(),
        |_| async move { client::pricing_analytics().await.ok() },
    );

    view! {
        <section class="pricing-page">
            <h1>{ "Pricing" }</h1>

            <div class="stats">
                <Transition fallback=|| ()>
                    {move || latest.get().map(|latest| {
                        latest
                            .into_values()
                            .map(|entry| view! {
                                <div class="stat-card">
                                    <p class="stat-label">{entry.platform.label()}</p>
                                    <p class="stat-value">{display_price(&entry)}</p>
                                    <p class="muted">{entry.date.to_string()}</p>
                                </div>
                            })
                            .collect_view()
                    })}
                    {move || analytics.get().flatten().map(|a| view! {
                        <div class="stat-card">
                            <p class="stat-label">{ "Average" }</p>
                            <p class="stat-value">{format!("{:.2}", a.average_price)}</p>
                        </div>
                    })}
                </Transition>
            </div>

            <label>
                { "Platform" }
                <select on:change=move |ev| set_platform.set(event_target_value(&ev).parse().ok())>
                    <option value="all">{ "All platforms" }</option>
                    {Platform::ALL
                        .iter()
                        .map(|p| view! { <option value=p.as_str()>{p.label()}</option> })
                        .collect_view()}
                </select>
            </label>

            <Transition fallback=|| view! { <Loading message="Loading prices..."/> }>
                {move || entries.get().map(|result| match result {
                    Ok(list) if list.is_empty() => view! {
                        <EmptyState
                            title="No pricing data yet."
                            description="Prices appear after the daily sync runs for a connected platform."
                        />
                    }.into_view(),
                    Ok(list) => view! {
                        <table class="pricing-table">
                            <thead>
                                <tr>
                                    <th>{ "Date" }</th>
                                    <th>{ "Platform" }</th>
                                    <th>{ "Property" }</th>
                                    <th>{ "Price" }</th>
                                </tr>
                            </thead>
                            <tbody>
                                {list
                                    .into_iter()
                                    .map(|e| {
                                        let price = display_price(&e);
                                        view! {
                                            <tr>
                                                <td>{e.date.to_string()}</td>
                                                <td>{e.platform.label()}</td>
                                                <td>{e.property_id}</td>
                                                <td>{price}</td>
                                            </tr>
                                        }
                                    })
                                    .collect_view()}
                            </tbody>
                        </table>
                    }.into_view(),
                    Err(e) => view! { <p class="error">{e}</p> }.into_view(),
                })}
            </Transition>
        </section>
    }
}
