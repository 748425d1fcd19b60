#[cfg(feature = "ssr")]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    use actix_files::Files;
    use actix_web::*;
    use leptos::logging::{error, log};
    use leptos::*;
    use leptos_actix::{generate_route_list, LeptosRoutes};
    use reviewdesk::api;
    use reviewdesk::app::*;
    use reviewdesk::config::Config;
    use reviewdesk::state::AppState;
    use std::time::Duration;

    let config = Config::load();

    // Initialize the database and services
    let state = AppState::new(config.clone()).await.map_err(|e| {
        error!("[DB] Could not open {}: {}", config.database_path, e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;
    log!("[DB] Schema ready at {}", config.database_path);

    // Daily scrape-and-sync, off unless configured
    if config.daily_sync_enabled {
        let state = state.clone();
        let period = Duration::from_secs(config.daily_sync_interval_hours.max(1) * 3600);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; wait a full period instead.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = state.sync.run().await {
                    error!("[SYNC] Scheduled run failed: {}", e);
                }
                let now_ms = chrono::Utc::now().timestamp_millis();
                state.form_limiter.prune_at(now_ms);
                state.api_limiter.prune_at(now_ms);
            }
        });
        log!("[SYNC] Scheduled every {} hours", config.daily_sync_interval_hours);
    }

    // Load configuration
    let conf = get_configuration(None).await.map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let addr = conf.leptos_options.site_addr;

    // Generate the list of routes in your Leptos App
    let routes = generate_route_list(App);
    log!("listening on http://{}", &addr);

    let state = web::Data::from(state);

    HttpServer::new(move || {
        let leptos_options = &conf.leptos_options;
        let site_root = &leptos_options.site_root;

        App::new()
            .app_data(state.clone())
            .wrap(api::security_headers())
            // API routes go before the Leptos catch-all
            .configure(api::configure)
            // Serve JS/WASM/CSS from `pkg`
            .service(Files::new("/pkg", format!("{site_root}/pkg")))
            // Serve other assets from the `assets` directory
            .service(Files::new("/assets", site_root))
            .service(favicon)
            .leptos_routes(leptos_options.to_owned(), routes.to_owned(), App)
            .app_data(web::Data::new(leptos_options.to_owned()))
    })
    .bind(&addr)?
    .run()
    .await
}

#[cfg(feature = "ssr")]
#[actix_web::get("favicon.ico")]
async fn favicon(
    leptos_options: actix_web::web::Data<leptos::LeptosOptions>,
) -> actix_web::Result<actix_files::NamedFile> {
    let leptos_options = leptos_options.into_inner();
    let site_root = &leptos_options.site_root;
    Ok(actix_files::NamedFile::open(format!(
        "{site_root}/favicon.ico"
    ))?)
}

#[cfg(not(any(feature = "ssr", feature = "csr")))]
pub fn main() {
    // no client-side main function
    // see lib.rs for hydration function instead
}

#[cfg(all(not(feature = "ssr"), feature = "csr"))]
pub fn main() {
    // a client-side main function is required for using `trunk serve`
    // to run: `trunk serve --open --features csr`
    use reviewdesk::app::*;

    reviewdesk::utils::panic_hook::init();
    leptos::mount_to_body(App);
}
