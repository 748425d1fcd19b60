use chrono::{NaiveDate, Utc};
use leptos::logging::warn;
use leptos::*;

use crate::errors::RATE_LIMITED;
use crate::hooks::ReviewsStore;
use crate::models::{NewReview, Platform};
use crate::rate_limit::{RateLimit, RateLimiter};
use crate::security::{validate_guest_name, validate_review_text};

const FORM_ID: &str = "review-form";

/// Checks a manual entry the way the form shows it: first failing field wins.
pub fn build_review(
    platform: Platform,
    guest_name: &str,
    rating: u8,
    review_text: &str,
    date: NaiveDate,
) -> Result<NewReview, &'static str> {
    let guest_name = validate_guest_name(guest_name).into_result()?;
    let review_text = validate_review_text(review_text).into_result()?;
    if !(1..=5).contains(&rating) {
        return Err("Rating must be between 1 and 5");
    }
    Ok(NewReview { platform, guest_name, rating, review_text, date })
}

#[component]
pub fn ReviewForm(store: ReviewsStore, #[prop(optional, into)] on_saved: Option<Callback<()>>) -> impl IntoView {
    let limiter = store_value(RateLimiter::new(RateLimit::FORM_SUBMISSIONS));

    let (platform, set_platform) = create_signal(Platform::Google);
    let (guest_name, set_guest_name) = create_signal(String::new());
    let (rating, set_rating) = create_signal(5u8);
    let (review_text, set_review_text) = create_signal(String::new());
    let (date, set_date) = create_signal(Utc::now().date_naive());
    let (error, set_error) = create_signal(None::<String>);
    let (saving, set_saving) = create_signal(false);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if !limiter.with_value(|l| l.check(FORM_ID)) {
            warn!("[SECURITY] Review form throttled");
            set_error.set(Some(RATE_LIMITED.to_string()));
            return;
        }
        let review = match build_review(
            platform.get_untracked(),
            &guest_name.get_untracked(),
            rating.get_untracked(),
            &review_text.get_untracked(),
            date.get_untracked(),
        ) {
            Ok(review) => review,
            Err(message) => {
                set_error.set(Some(message.to_string()));
                return;
            }
        };

        set_error.set(None);
        set_saving.set(true);
        spawn_local(async move {
            match store.create(review).await {
                Ok(_) => {
                    set_guest_name.set(String::new());
                    set_review_text.set(String::new());
                    set_rating.set(5);
                    if let Some(cb) = on_saved {
                        cb.call(());
                    }
                }
                Err(message) => set_error.set(Some(message)),
            }
            set_saving.set(false);
        });
    };

    view! {
        <form class="review-form" on:submit=submit>
            <h3>{ "Add Review" }</h3>
            <label>
                { "Platform" }
                <select on:change=move |ev| {
                    if let Ok(p) = event_target_value(&ev).parse() {
                        set_platform.set(p);
                    }
                }>
                    {Platform::ALL
                        .iter()
                        .map(|p| {
                            let p = *p;
                            view! { <option value=p.as_str() selected=move || platform.get() == p>{p.label()}</option> }
                        })
                        .collect_view()}
                </select>
            </label>
            <label>
                { "Guest name" }
                <input
                    type="text"
                    prop:value=guest_name
                    on:input=move |ev| set_guest_name.set(event_target_value(&ev))
                />
            </label>
            <label>
                { "Rating" }
                <select on:change=move |ev| set_rating.set(event_target_value(&ev).parse().unwrap_or(5))>
                    {(1..=5u8)
                        .rev()
                        .map(|r| view! { <option value=r.to_string() selected=move || rating.get() == r>{format!("{} stars", r)}</option> })
                        .collect_view()}
                </select>
            </label>
            <label>
                { "Date" }
                <input
                    type="date"
                    prop:value=move || date.get().to_string()
                    on:change=move |ev| {
                        if let Ok(d) = event_target_value(&ev).parse() {
                            set_date.set(d);
                        }
                    }
                />
            </label>
            <label>
                { "Review" }
                <textarea
                    rows="4"
                    prop:value=review_text
                    on:input=move |ev| set_review_text.set(event_target_value(&ev))
                />
            </label>
            {move || error.get().map(|e| view! { <p class="error">{e}</p> })}
            <button type="submit" class="button" disabled=saving>
                {move || if saving.get() { "Saving..." } else { "Add Review" }}
            </button>
        </form>
    }
}
