pub mod csv_upload;
pub mod feedback_form;
pub mod filter_bar;
pub mod layout;
pub mod platform_ratings;
pub mod reply_editor;
pub mod review_card;
pub mod review_form;
pub mod reviews_list;
