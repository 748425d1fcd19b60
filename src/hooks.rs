//! Reactive state shared by the pages. Data lives in signals, is loaded from
//! the API, and is reloaded in full whenever the change feed reports anything
//! for the current user.
use futures::StreamExt;
use gloo_net::eventsource::futures::EventSource;
use leptos::logging::{error, log};
use leptos::*;

use crate::client::{self, CHANGES_URL};
use crate::models::{NewReview, Review};
use crate::utils::leptos_owner::bind_to_owner;

/// Counter bumped on every change feed event. Resources keyed on it reload
/// themselves.
pub fn use_change_version() -> ReadSignal<u32> {
    let (version, set_version) = create_signal(0u32);

    // Effects only run in the browser, so no feed is opened during SSR.
    create_effect(move |_| {
        let mut source = match EventSource::new(CHANGES_URL) {
            Ok(source) => source,
            Err(e) => {
                error!("[REALTIME] Could not open change feed: {:?}", e);
                return;
            }
        };
        let mut changes = match source.subscribe("change") {
            Ok(stream) => stream,
            Err(e) => {
                error!("[REALTIME] Could not subscribe to change events: {:?}", e);
                return;
            }
        };

        let bump = bind_to_owner("change feed", move |_: ()| set_version.update(|v| *v += 1));
        spawn_local(async move {
            while let Some(event) = changes.next().await {
                match event {
                    Ok(_) => bump(()),
                    Err(e) => {
                        log!("[REALTIME] Change feed interrupted: {:?}", e);
                        break;
                    }
                }
            }
        });

        on_cleanup(move || source.close());
    });

    version
}

/// Reviews of the current user with optimistic mutations. Every mutation
/// patches the local list first, then reloads from the server.
#[derive(Clone, Copy)]
pub struct ReviewsStore {
    pub reviews: RwSignal<Vec<Review>>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
}

impl ReviewsStore {
    pub fn refetch(self) {
        spawn_local(async move {
            self.loading.set(true);
            match client::list_reviews().await {
                Ok(reviews) => {
                    self.reviews.set(reviews);
                    self.error.set(None);
                }
                Err(e) => {
                    error!("[REVIEWS] Fetch failed: {}", e);
                    self.error.set(Some(e.user_message()));
                }
            }
            self.loading.set(false);
        });
    }

    pub async fn create(self, review: NewReview) -> Result<Review, String> {
        let result = client::create_review(&review).await;
        match &result {
            Ok(created) => self.reviews.update(|list| list.insert(0, created.clone())),
            Err(e) => error!("[REVIEWS] Create failed: {}", e),
        }
        self.refetch();
        result.map_err(|e| e.user_message())
    }

    pub async fn reply(self, id: String, reply_text: String) -> Result<Review, String> {
        self.reviews.update(|list| {
            if let Some(review) = list.iter_mut().find(|r| r.id == id) {
                *review = review.clone().with_reply(&reply_text);
            }
        });
        let result = client::reply_to_review(&id, &reply_text).await;
        if let Err(e) = &result {
            error!("[REVIEWS] Reply to {} failed: {}", id, e);
        }
        self.refetch();
        result.map_err(|e| e.user_message())
    }

    pub async fn delete(self, id: String) -> Result<(), String> {
        self.reviews.update(|list| list.retain(|r| r.id != id));
        let result = client::delete_review(&id).await;
        if let Err(e) = &result {
            error!("[REVIEWS] Delete of {} failed: {}", id, e);
        }
        self.refetch();
        result.map_err(|e| e.user_message())
    }

    pub fn find(self, id: &str) -> Option<Review> {
        self.reviews.with(|list| list.iter().find(|r| r.id == id).cloned())
    }
}

pub fn use_reviews() -> ReviewsStore {
    let store = ReviewsStore {
        reviews: create_rw_signal(Vec::new()),
        loading: create_rw_signal(true),
        error: create_rw_signal(None),
    };
    let version = use_change_version();

    create_effect(move |_| {
        let _ = version.get();
        store.refetch();
    });

    store
}
