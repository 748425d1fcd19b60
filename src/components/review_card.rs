/// One review with its stars, platform, reply status and actions.
use leptos::*;
use leptos_router::A;

use crate::models::Review;

pub fn stars(rating: u8) -> String {
    (1..=5).map(|i| if i <= rating { '★' } else { '☆' }).collect()
}

#[component]
pub fn ReviewCard(review: Review, #[prop(into)] on_delete: Callback<String>) -> impl IntoView {
    let id = review.id.clone();
    let reply_href = format!("/reply/{}", review.id);
    let status = if review.replied { "Replied" } else { "Needs Reply" };
    let action = if review.replied { "Edit Reply" } else { "Reply" };
    let date = review.date.format("%B %-d, %Y").to_string();

    view! {
        <article class="review-card" class:pending=!review.replied>
            <header>
                <span class=format!("platform platform-{}", review.platform)>{review.platform.label()}</span>
                <span class="stars" title=format!("{} of 5", review.rating)>{stars(review.rating)}</span>
                <span class="guest">{review.guest_name.clone()}</span>
                <time>{date}</time>
            </header>
            <p class="review-text">{review.review_text.clone()}</p>
            {review.reply_text.clone().filter(|_| review.replied).map(|reply| view! {
                <div class="reply">
                    <p class="reply-label">{ "Your Reply:" }</p>
                    <p>{reply}</p>
                </div>
            })}
            <footer>
                <span class="status">{status}</span>
                <A href=reply_href class="button">{action}</A>
                <button class="button secondary" on:click=move |_| on_delete.call(id.clone())>
                    { "Delete" }
                </button>
            </footer>
        </article>
    }
}
