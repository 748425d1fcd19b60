use leptos::*;
use leptos_router::A;

use crate::analytics::ReviewAnalytics;
use crate::client;
use crate::components::layout::Loading;
use crate::components::platform_ratings::PlatformRatings;
use crate::components::review_card::stars;
use crate::hooks::use_change_version;

#[component]
fn StatCard(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="stat-card">
            <p class="stat-label">{label}</p>
            <p class="stat-value">{value}</p>
        </div>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let version = use_change_version();
    let analytics = create_local_resource(
        move || version.get(),
        |_| async move { client::fetch_analytics().await.map_err(|e| e.user_message()) },
    );
    let ratings = create_local_resource(
        move || version.get(),
        |_| async move { client::fetch_platform_ratings().await.unwrap_or_default() },
    );
    let ratings = Signal::derive(move || ratings.get().unwrap_or_default());

    let render = |a: ReviewAnalytics| {
        view! {
            <div class="stats">
                <StatCard label="Total reviews" value=a.total_reviews.to_string() />
                <StatCard label="Average rating" value=format!("{:.1}", a.average_rating) />
                <StatCard label="Pending replies" value=a.pending_replies.to_string() />
            </div>
            <div class="distribution">
                <h3>{ "Reviews by platform" }</h3>
                <ul>
                    {a.platform_distribution
                        .iter()
                        .map(|(platform, count)| view! { <li>{format!("{}: {}", platform.label(), count)}</li> })
                        .collect_view()}
                </ul>
            </div>
            <div class="recent">
                <h3>{ "Recent reviews" }</h3>
                <ul>
                    {a.recent_reviews
                        .into_iter()
                        .map(|r| view! {
                            <li>
                                <span class="stars">{stars(r.rating)}</span>
                                <span>{format!(" {} on {}", r.guest_name, r.platform.label())}</span>
                                <A href=format!("/reply/{}", r.id)>{if r.replied { "View" } else { "Reply" }}</A>
                            </li>
                        })
                        .collect_view()}
                </ul>
            </div>
        }
    };

    view! {
        <section class="dashboard">
            <h1>{ "Dashboard" }</h1>
            <Transition fallback=|| view! { <Loading message="Loading dashboard..."/> }>
                {move || analytics.get().map(|result| match result {
                    Ok(a) => render(a).into_view(),
                    Err(e) => view! { <p class="error">{e}</p> }.into_view(),
                })}
            </Transition>
            <PlatformRatings ratings=ratings />
        </section>
    }
}
