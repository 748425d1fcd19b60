use leptos::*;

use crate::components::csv_upload::CsvUpload;
use crate::components::filter_bar::FilterBar;
use crate::components::layout::Loading;
use crate::components::review_form::ReviewForm;
use crate::components::reviews_list::ReviewsList;
use crate::filters::ReviewFilter;
use crate::hooks::use_reviews;

#[component]
pub fn ReviewsPage() -> impl IntoView {
    let store = use_reviews();
    let filter = create_rw_signal(ReviewFilter::default());
    let (show_form, set_show_form) = create_signal(false);
    let (show_import, set_show_import) = create_signal(false);

    let on_delete = Callback::new(move |id: String| {
        spawn_local(async move {
            if let Err(message) = store.delete(id).await {
                store.error.set(Some(message));
            }
        });
    });

    view! {
        <section class="reviews-page">
            <div class="page-header">
                <h1>{ "Reviews" }</h1>
                <div class="actions">
                    <button class="button" on:click=move |_| set_show_form.update(|v| *v = !*v)>
                        { "Add Review" }
                    </button>
                    <button class="button secondary" on:click=move |_| set_show_import.update(|v| *v = !*v)>
                        { "Import CSV" }
                    </button>
                </div>
            </div>

            <Show when=move || show_form.get()>
                <ReviewForm store=store on_saved=move |_| set_show_form.set(false) />
            </Show>
            <Show when=move || show_import.get()>
                <CsvUpload on_imported=move |_| store.refetch() />
            </Show>

            <FilterBar filter=filter />
            {move || store.error.get().map(|e| view! { <p class="error">{e}</p> })}
            <Show
                when=move || !(store.loading.get() && store.reviews.with(Vec::is_empty))
                fallback=|| view! { <Loading message="Loading reviews..."/> }
            >
                <ReviewsList reviews=store.reviews filter=filter on_delete=on_delete />
            </Show>
        </section>
    }
}
