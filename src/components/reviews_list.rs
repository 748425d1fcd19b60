/// Filtered reviews with the "Showing X of Y" summary and an empty state
/// that distinguishes "nothing yet" from "nothing matches".
use leptos::*;

use crate::components::layout::EmptyState;
use crate::components::review_card::ReviewCard;
use crate::filters::{pending_count, ReviewFilter};
use crate::models::Review;

#[component]
pub fn ReviewsList(
    #[prop(into)] reviews: Signal<Vec<Review>>,
    filter: RwSignal<ReviewFilter>,
    #[prop(into)] on_delete: Callback<String>,
) -> impl IntoView {
    let visible = create_memo(move |_| {
        let current = filter.get();
        reviews.with(|all| current.apply_owned(all))
    });
    let pending = move || reviews.with(|all| pending_count(all));

    view! {
        <div class="reviews-list">
            <div class="summary">
                <p>
                    {move || format!("Showing {} of {} reviews", visible.with(Vec::len), reviews.with(Vec::len))}
                </p>
                <Show when=move || { pending() > 0 }>
                    <span class="badge warning">{move || format!("{} pending replies", pending())}</span>
                </Show>
            </div>

            <Show
                when=move || visible.with(|v| !v.is_empty())
                fallback=move || {
                    if filter.with(ReviewFilter::is_active) {
                        view! {
                            <EmptyState title="No reviews match your current filters.">
                                <button class="button secondary" on:click=move |_| filter.update(ReviewFilter::clear)>
                                    { "Clear Filters" }
                                </button>
                            </EmptyState>
                        }
                        .into_view()
                    } else {
                        view! {
                            <EmptyState
                                title="No reviews yet."
                                description="Your reviews will appear here once you receive them."
                            />
                        }
                        .into_view()
                    }
                }
            >
                <For
                    each=move || visible.get()
                    key=|review| (review.id.clone(), review.updated_at)
                    children=move |review| view! { <ReviewCard review=review on_delete=on_delete/> }
                />
            </Show>
        </div>
    }
}
