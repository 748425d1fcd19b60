use leptos::*;

use crate::analytics::ReviewAnalytics;
use crate::client;
use crate::components::layout::Loading;
use crate::components::platform_ratings::PlatformRatings;
use crate::hooks::{use_reviews, ReviewsStore};

/// Count of reviews per star value, highest first.
fn rating_histogram(store: ReviewsStore) -> Vec<(u8, usize)> {
    store.reviews.with(|reviews| {
        (1..=5u8)
            .rev()
            .map(|stars| (stars, reviews.iter().filter(|r| r.rating == stars).count()))
            .collect()
    })
}

#[component]
pub fn AnalyticsPage() -> impl IntoView {
    let store = use_reviews();
    let summary = Signal::derive(move || {
        store.reviews.with(|reviews| crate::analytics::review_analytics(reviews))
    });
    let ratings = Signal::derive(move || {
        store.reviews.with(|reviews| crate::analytics::platform_ratings(reviews))
    });
    let pricing = create_local_resource(|| (), |_| async move { client::pricing_analytics().await.ok() });

    let response_rate = move || {
        let ReviewAnalytics { total_reviews, pending_replies, .. } = summary.get();
        if total_reviews == 0 {
            0.0
        } else {
            (total_reviews - pending_replies) as f64 / total_reviews as f64 * 100.0
        }
    };

    view! {
        <section class="analytics-page">
            <h1>{ "Analytics" }</h1>
            <Show
                when=move || !store.loading.get() || store.reviews.with(|r| !r.is_empty())
                fallback=|| view! { <Loading message="Loading analytics..."/> }
            >
                <div class="stats">
                    <div class="stat-card">
                        <p class="stat-label">{ "Average rating" }</p>
                        <p class="stat-value">{move || format!("{:.1}", summary.get().average_rating)}</p>
                    </div>
                    <div class="stat-card">
                        <p class="stat-label">{ "Response rate" }</p>
                        <p class="stat-value">{move || format!("{:.0}%", response_rate())}</p>
                    </div>
                    <div class="stat-card">
                        <p class="stat-label">{ "Total reviews" }</p>
                        <p class="stat-value">{move || summary.get().total_reviews}</p>
                    </div>
                </div>
                <div class="histogram">
                    <h3>{ "Rating distribution" }</h3>
                    <ul>
                        {move || rating_histogram(store)
                            .into_iter()
                            .map(|(stars, count)| view! { <li>{format!("{} stars: {}", stars, count)}</li> })
                            .collect_view()}
                    </ul>
                </div>
                <PlatformRatings ratings=ratings />
            </Show>
            <div class="pricing-summary">
                <h3>{ "Pricing" }</h3>
                <Suspense fallback=|| ()>
                    {move || pricing.get().flatten().map(|p| view! {
                        <p>{format!("Average nightly price: €{:.2} across {} entries", p.average_price, p.total_entries)}</p>
                    })}
                </Suspense>
            </div>
        </section>
    }
}
