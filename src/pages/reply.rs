use leptos::*;
use leptos_router::*;

use crate::client;
use crate::components::layout::{EmptyState, Loading};
use crate::components::reply_editor::ReplyEditor;
use crate::components::review_card::stars;
use crate::models::Review;
use crate::security::validate_reply_text;

#[component]
fn ReplyForm(review: Review) -> impl IntoView {
    let text = create_rw_signal(review.reply_text.clone().unwrap_or_default());
    let (sending, set_sending) = create_signal(false);
    let (status, set_status) = create_signal(None::<Result<&'static str, String>>);
    let id = review.id.clone();
    let navigate = use_navigate();

    let on_send = Callback::new(move |draft: String| {
        let reply = match validate_reply_text(&draft).into_result() {
            Ok(reply) => reply,
            Err(message) => {
                set_status.set(Some(Err(message.to_string())));
                return;
            }
        };
        let id = id.clone();
        let navigate = navigate.clone();
        set_sending.set(true);
        spawn_local(async move {
            let result = client::reply_to_review(&id, &reply).await;
            set_sending.set(false);
            match result {
                Ok(_) => {
                    set_status.set(Some(Ok("Reply sent successfully!")));
                    navigate("/reviews", Default::default());
                }
                Err(e) => set_status.set(Some(Err(e.user_message()))),
            }
        });
    });

    view! {
        <div class="review-detail">
            <p>
                <span class="stars">{stars(review.rating)}</span>
                {format!(" {} on {} ({})", review.guest_name, review.platform.label(), review.date)}
            </p>
            <blockquote>{review.review_text.clone()}</blockquote>
        </div>
        <ReplyEditor rating=review.rating text=text on_send=on_send sending=sending />
        {move || status.get().map(|s| match s {
            Ok(msg) => view! { <p class="success">{msg}</p> },
            Err(msg) => view! { <p class="error">{msg}</p> },
        })}
    }
}

#[component]
pub fn ReplyPage() -> impl IntoView {
    let params = use_params_map();
    let review_id = move || params.with(|p| p.get("review_id").cloned().unwrap_or_default());
    let review = create_local_resource(review_id, |id| async move {
        client::get_review(&id).await.map_err(|e| e.user_message())
    });

    view! {
        <section class="reply-page">
            <A href="/reviews">{ "← Back to reviews" }</A>
            <h1>{ "Reply to Review" }</h1>
            <Suspense fallback=|| view! { <Loading message="Loading review..."/> }>
                {move || review.get().map(|result| match result {
                    Ok(review) => view! { <ReplyForm review=review /> }.into_view(),
                    Err(e) => view! { <EmptyState title="Review not found" description=e /> }.into_view(),
                })}
            </Suspense>
        </section>
    }
}
