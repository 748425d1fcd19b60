//! Upload of a platform review export. The file is read in the browser and
//! posted as text together with the column mapping.
use leptos::logging::{error, log};
use leptos::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};

use crate::client;
use crate::csv_import::{FieldMapping, ImportSummary};
use crate::models::Platform;
use crate::security::MAX_UPLOAD_BYTES;

async fn read_file(file: File) -> Result<String, String> {
    let text = JsFuture::from(file.text())
        .await
        .map_err(|e| format!("Could not read file: {:?}", e))?;
    text.as_string().ok_or_else(|| "File is not text".to_string())
}

#[component]
fn MappingInput(label: &'static str, value: RwSignal<String>) -> impl IntoView {
    view! {
        <label>
            {label}
            <input type="text" prop:value=value on:input=move |ev| value.set(event_target_value(&ev)) />
        </label>
    }
}

#[component]
pub fn CsvUpload(#[prop(optional, into)] on_imported: Option<Callback<ImportSummary>>) -> impl IntoView {
    let defaults = FieldMapping::default();
    let guest_name = create_rw_signal(defaults.guest_name);
    let date = create_rw_signal(defaults.date);
    let rating = create_rw_signal(defaults.rating);
    let review_text = create_rw_signal(defaults.review_text);

    let (platform, set_platform) = create_signal(Platform::Booking);
    let (file, set_file) = create_signal(None::<File>);
    let (busy, set_busy) = create_signal(false);
    let (status, set_status) = create_signal(None::<Result<String, String>>);

    let on_file = move |ev: ev::Event| {
        let selected = event_target::<HtmlInputElement>(&ev)
            .files()
            .and_then(|files| files.get(0));
        set_file.set(selected);
        set_status.set(None);
    };

    let upload = move |_| {
        let Some(selected) = file.get_untracked() else {
            set_status.set(Some(Err("Choose a CSV file first.".to_string())));
            return;
        };
        if selected.size() > MAX_UPLOAD_BYTES as f64 {
            set_status.set(Some(Err("File is larger than 5 MB.".to_string())));
            return;
        }
        let mapping = FieldMapping {
            guest_name: guest_name.get_untracked(),
            date: date.get_untracked(),
            rating: rating.get_untracked(),
            review_text: review_text.get_untracked(),
        };
        let platform = platform.get_untracked();

        set_busy.set(true);
        spawn_local(async move {
            let result = match read_file(selected).await {
                Ok(csv) => client::import_csv(platform, &mapping, csv)
                    .await
                    .map_err(|e| e.user_message()),
                Err(e) => Err(e),
            };
            match result {
                Ok(summary) => {
                    log!("[REVIEWS] CSV import: {:?}", summary);
                    set_status.set(Some(Ok(format!(
                        "Imported {} reviews ({} skipped, {} failed).",
                        summary.imported, summary.skipped, summary.failed
                    ))));
                    if let Some(cb) = on_imported {
                        cb.call(summary);
                    }
                }
                Err(e) => {
                    error!("[REVIEWS] CSV import failed: {}", e);
                    set_status.set(Some(Err(e)));
                }
            }
            set_busy.set(false);
        });
    };

    view! {
        <div class="csv-upload">
            <h3>{ "Import from CSV" }</h3>
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
            <input type="file" accept=".csv,text/csv" on:change=on_file />
            <fieldset class="mapping">
                <legend>{ "Column mapping" }</legend>
                <MappingInput label="Guest name column" value=guest_name />
                <MappingInput label="Date column" value=date />
                <MappingInput label="Rating column" value=rating />
                <MappingInput label="Review text column" value=review_text />
            </fieldset>
            {move || status.get().map(|s| match s {
                Ok(msg) => view! { <p class="success">{msg}</p> },
                Err(msg) => view! { <p class="error">{msg}</p> },
            })}
            <button class="button" disabled=busy on:click=upload>
                {move || if busy.get() { "Importing..." } else { "Import" }}
            </button>
        </div>
    }
}
