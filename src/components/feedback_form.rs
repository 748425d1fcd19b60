use leptos::logging::error;
use leptos::*;

use crate::client;
use crate::models::NewFeedback;
use crate::security::contains_suspicious_pattern;

/// Star `n` of the picker is lit when the chosen rating reaches it.
pub fn star_filled(rating: u8, n: u8) -> bool {
    rating >= n
}

/// One to five star rating of the product with an optional comment.
#[component]
pub fn FeedbackForm(#[prop(optional, into)] on_sent: Option<Callback<()>>) -> impl IntoView {
    let (rating, set_rating) = create_signal(0u8);
    let (comment, set_comment) = create_signal(String::new());
    let (status, set_status) = create_signal(None::<Result<&'static str, String>>);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let rating = rating.get_untracked();
        if rating == 0 {
            set_status.set(Some(Err("Please choose a rating.".to_string())));
            return;
        }
        let text = comment.get_untracked();
        if contains_suspicious_pattern(&text) {
            set_status.set(Some(Err("Invalid content detected".to_string())));
            return;
        }
        let feedback = NewFeedback {
            rating,
            comment: Some(text).filter(|c| !c.trim().is_empty()),
        };
        spawn_local(async move {
            match client::submit_feedback(&feedback).await {
                Ok(_) => {
                    set_rating.set(0);
                    set_comment.set(String::new());
                    set_status.set(Some(Ok("Thank you for your feedback!")));
                    if let Some(cb) = on_sent {
                        cb.call(());
                    }
                }
                Err(e) => {
                    error!("[API] Feedback submit failed: {}", e);
                    set_status.set(Some(Err(e.user_message())));
                }
            }
        });
    };

    view! {
        <form class="feedback-form" on:submit=submit>
            <div class="star-picker">
                {(1..=5u8)
                    .map(|n| view! {
                        <button
                            type="button"
                            class="star"
                            class:active=move || star_filled(rating.get(), n)
                            on:click=move |_| set_rating.set(n)
                        >
                            { "★" }
                        </button>
                    })
                    .collect_view()}
            </div>
            <textarea
                rows="4"
                placeholder="Tell us what you think (optional)"
                prop:value=comment
                on:input=move |ev| set_comment.set(event_target_value(&ev))
            />
            {move || status.get().map(|s| match s {
                Ok(msg) => view! { <p class="success">{msg}</p> },
                Err(msg) => view! { <p class="error">{msg}</p> },
            })}
            <button type="submit" class="button">{ "Send Feedback" }</button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_light_up_to_the_chosen_rating() {
        let lit: Vec<bool> = (1..=5).map(|n| star_filled(3, n)).collect();
        assert_eq!(lit, vec![true, true, true, false, false]);
        assert!((1..=5).all(|n| !star_filled(0, n)));
    }
}
