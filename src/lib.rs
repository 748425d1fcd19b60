pub mod analytics;
pub mod app;
pub mod client;
pub mod components;
pub mod csv_import;
pub mod errors;
pub mod filters;
pub mod hooks;
pub mod models;
pub mod pages;
pub mod rate_limit;
pub mod replies;
pub mod security;
pub mod utils;

#[cfg(feature = "ssr")]
pub mod api;
#[cfg(feature = "ssr")]
pub mod backup;
#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod db;
#[cfg(feature = "ssr")]
pub mod realtime;
#[cfg(feature = "ssr")]
pub mod services;
#[cfg(feature = "ssr")]
pub mod state;
#[cfg(feature = "ssr")]
pub mod sync;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    utils::panic_hook::init();
    leptos::mount_to_body(App);
}
