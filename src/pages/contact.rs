use leptos::*;

use crate::client;
use crate::components::feedback_form::FeedbackForm;
use crate::components::review_card::stars;

#[component]
pub fn ContactPage() -> impl IntoView {
    let (sent, set_sent) = create_signal(0u32);
    let history = create_local_resource(
        move || sent.get(),
        |_| async move { client::list_feedback().await.unwrap_or_default() },
    );

    view! {
        <section class="contact-page">
            <h1>{ "Contact & Feedback" }</h1>
            <p>{ "Tell us how ReviewDesk works for you. Every message is read by the team." }</p>
            <FeedbackForm on_sent=move |_| set_sent.update(|n| *n += 1) />

            <h3>{ "Your previous feedback" }</h3>
            <Transition fallback=|| ()>
                <ul class="feedback-history">
                    {move || history.get().unwrap_or_default()
                        .into_iter()
                        .map(|f| view! {
                            <li>
                                <span class="stars">{stars(f.rating)}</span>
                                <span class="muted">{f.created_at.format(" %Y-%m-%d ").to_string()}</span>
                                {f.comment.map(|c| view! { <p>{c}</p> })}
                            </li>
                        })
                        .collect_view()}
                </ul>
            </Transition>
        </section>
    }
}
