use leptos::*;

use crate::replies::{remaining_chars, suggested_replies};
use crate::security::REPLY_MAX_LENGTH;

/// Textarea with suggested replies for the rating and a live character count.
#[component]
pub fn ReplyEditor(
    rating: u8,
    text: RwSignal<String>,
    #[prop(into)] on_send: Callback<String>,
    #[prop(into)] sending: Signal<bool>,
) -> impl IntoView {
    let remaining = move || text.with(|t| remaining_chars(t));
    let too_long = move || remaining() < 0;

    view! {
        <div class="reply-editor">
            <div class="suggestions">
                <p>{ "Suggested replies" }</p>
                {suggested_replies(rating)
                    .iter()
                    .map(|suggestion| {
                        let suggestion = *suggestion;
                        view! {
                            <button type="button" class="suggestion" on:click=move |_| text.set(suggestion.to_string())>
                                {suggestion}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
            <textarea
                rows="6"
                maxlength=REPLY_MAX_LENGTH.to_string()
                placeholder="Write your reply..."
                prop:value=move || text.get()
                on:input=move |ev| text.set(event_target_value(&ev))
            />
            <p class="char-count" class:over=too_long>
                {move || format!("{} characters remaining", remaining())}
            </p>
            <button
                class="button"
                disabled=move || sending.get() || too_long() || text.with(|t| t.trim().is_empty())
                on:click=move |_| on_send.call(text.get_untracked())
            >
                {move || if sending.get() { "Sending..." } else { "Send Reply" }}
            </button>
        </div>
    }
}
