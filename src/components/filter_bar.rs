/// Search box plus platform and rating selects. Edits the shared filter in
/// place; the list re-filters on every change.
use leptos::*;

use crate::filters::{PlatformFilter, RatingBand, ReviewFilter};
use crate::models::Platform;

const RATING_BANDS: [RatingBand; 4] = [
    RatingBand::All,
    RatingBand::High,
    RatingBand::Medium,
    RatingBand::Low,
];

#[component]
pub fn FilterBar(filter: RwSignal<ReviewFilter>) -> impl IntoView {
    let platform_options = std::iter::once(("all", "All platforms"))
        .chain(Platform::ALL.iter().map(|p| (p.as_str(), p.label())))
        .map(|(value, label)| {
            view! {
                <option
                    value=value
                    selected=move || filter.with(|f| f.platform.as_value() == value)
                >
                    {label}
                </option>
            }
        })
        .collect_view();

    let rating_options = RATING_BANDS
        .iter()
        .map(|band| {
            let band = *band;
            view! {
                <option value=band.as_value() selected=move || filter.with(|f| f.rating == band)>
                    {band.label()}
                </option>
            }
        })
        .collect_view();

    view! {
        <div class="filter-bar">
            <input
                type="search"
                placeholder="Search reviews..."
                prop:value=move || filter.with(|f| f.search.clone())
                on:input=move |ev| filter.update(|f| f.search = event_target_value(&ev))
            />
            <select on:change=move |ev| {
                let platform = event_target_value(&ev).parse().unwrap_or(PlatformFilter::All);
                filter.update(|f| f.platform = platform);
            }>
                {platform_options}
            </select>
            <select on:change=move |ev| {
                let rating = event_target_value(&ev).parse().unwrap_or(RatingBand::All);
                filter.update(|f| f.rating = rating);
            }>
                {rating_options}
            </select>

            <div class="active-filters">
                {move || {
                    let current = filter.get();
                    let mut chips = Vec::new();
                    if let PlatformFilter::Only(p) = current.platform {
                        chips.push(view! {
                            <button class="chip" on:click=move |_| filter.update(|f| f.platform = PlatformFilter::All)>
                                {format!("Platform: {} ×", p.label())}
                            </button>
                        });
                    }
                    if current.rating != RatingBand::All {
                        chips.push(view! {
                            <button class="chip" on:click=move |_| filter.update(|f| f.rating = RatingBand::All)>
                                {format!("Rating: {} ×", current.rating.label())}
                            </button>
                        });
                    }
                    if !current.search.is_empty() {
                        chips.push(view! {
                            <button class="chip" on:click=move |_| filter.update(|f| f.search.clear())>
                                {format!("Search: \"{}\" ×", current.search)}
                            </button>
                        });
                    }
                    chips
                }}
            </div>
        </div>
    }
}
