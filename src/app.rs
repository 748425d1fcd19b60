/// Root component: router, page chrome and one route per dashboard page.
use leptos::*;
use leptos_meta::*;
use leptos_router::*;

use crate::components::layout::{EmptyState, Layout};
use crate::pages::analytics::AnalyticsPage;
use crate::pages::contact::ContactPage;
use crate::pages::dashboard::DashboardPage;
use crate::pages::integrations::IntegrationsPage;
use crate::pages::login::LoginPage;
use crate::pages::pricing::PricingPage;
use crate::pages::reply::ReplyPage;
use crate::pages::reviews::ReviewsPage;
use crate::pages::settings::SettingsPage;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/reviewdesk.css"/>
        <Title text="ReviewDesk"/>
        <Meta name="description" content="Guest reviews from every platform in one place."/>
        <Router>
            <Layout>
                <Routes>
                    <Route path="/" view=DashboardPage/>
                    <Route path="/login" view=LoginPage/>
                    <Route path="/reviews" view=ReviewsPage/>
                    <Route path="/reply/:review_id" view=ReplyPage/>
                    <Route path="/analytics" view=AnalyticsPage/>
                    <Route path="/integrations" view=IntegrationsPage/>
                    <Route path="/pricing" view=PricingPage/>
                    <Route path="/settings" view=SettingsPage/>
                    <Route path="/contact" view=ContactPage/>
                    <Route path="/*any" view=NotFound/>
                </Routes>
            </Layout>
        </Router>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <EmptyState title="Page not found" description="The page you are looking for does not exist.">
            <A href="/">{ "Back to dashboard" }</A>
        </EmptyState>
    }
}
