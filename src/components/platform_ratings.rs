use leptos::*;

use crate::analytics::PlatformRating;

/// Average rating bar per platform, widest bar at 5 stars.
#[component]
pub fn PlatformRatings(#[prop(into)] ratings: Signal<Vec<PlatformRating>>) -> impl IntoView {
    view! {
        <div class="platform-ratings">
            <h3>{ "Ratings by platform" }</h3>
            <Show
                when=move || ratings.with(|r| !r.is_empty())
                fallback=|| view! { <p class="muted">{ "No ratings yet." }</p> }
            >
                <ul>
                    <For
                        each=move || ratings.get()
                        key=|r| r.platform
                        children=|r| {
                            let width = format!("width: {:.0}%", r.average / 5.0 * 100.0);
                            view! {
                                <li>
                                    <span class="label">{r.platform.label()}</span>
                                    <span class="bar"><span class="fill" style=width></span></span>
                                    <span class="value">{format!("{:.1} ({} reviews)", r.average, r.count)}</span>
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
        </div>
    }
}
