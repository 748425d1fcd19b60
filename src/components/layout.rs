/// Page chrome: navigation bar on top, routed page below.
use leptos::*;
use leptos_router::*;

const NAV_LINKS: [(&str, &str); 8] = [
    ("/", "Dashboard"),
    ("/reviews", "Reviews"),
    ("/analytics", "Analytics"),
    ("/pricing", "Pricing"),
    ("/integrations", "Integrations"),
    ("/settings", "Settings"),
    ("/contact", "Contact"),
    ("/login", "Sign in"),
];

#[component]
pub fn Layout(children: Children) -> impl IntoView {
    view! {
        <div class="layout">
            <nav class="navbar">
                <span class="brand">{ "ReviewDesk" }</span>
                <ul>
                    {NAV_LINKS
                        .iter()
                        .map(|(href, label)| view! { <li><A href=*href exact=true>{ *label }</A></li> })
                        .collect_view()}
                </ul>
            </nav>
            <main class="content">{children()}</main>
        </div>
    }
}

/// Shown while a page is waiting for its first response.
#[component]
pub fn Loading(#[prop(into)] message: String) -> impl IntoView {
    view! { <div class="loading">{message}</div> }
}

/// Centered message with an optional action below it.
#[component]
pub fn EmptyState(
    #[prop(into)] title: String,
    #[prop(optional, into)] description: Option<String>,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    view! {
        <div class="empty-state">
            <h3>{title}</h3>
            {description.map(|d| view! { <p>{d}</p> })}
            {children.map(|c| c())}
        </div>
    }
}
