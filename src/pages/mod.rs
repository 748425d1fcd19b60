pub mod analytics;
pub mod contact;
pub mod dashboard;
pub mod integrations;
pub mod login;
pub mod pricing;
pub mod reply;
pub mod reviews;
pub mod settings;
