use crate::filters::RatingBand;
use crate::security::REPLY_MAX_LENGTH;

const WONDERFUL: &str = "Thank you so much for your wonderful review! We're delighted you enjoyed your stay and look forward to welcoming you back.";
const APPRECIATE: &str = "We appreciate your feedback and are glad you had a positive experience. Thank you for choosing to stay with us!";
const SORRY: &str = "Thank you for taking the time to leave this review. We're sorry to hear about the issues you experienced and will address them immediately.";
const THRILLED: &str = "We're thrilled to hear you had such a great experience! Your feedback means the world to us.";

/// Canned replies offered in the reply editor for a review with this rating.
pub fn suggested_replies(rating: u8) -> &'static [&'static str] {
    if RatingBand::High.matches(rating) {
        &[WONDERFUL, THRILLED, APPRECIATE]
    } else if RatingBand::Medium.matches(rating) {
        &[APPRECIATE, SORRY]
    } else {
        &[SORRY]
    }
}

/// Characters still available, for the counter under the editor.
pub fn remaining_chars(text: &str) -> i64 {
    REPLY_MAX_LENGTH as i64 - text.chars().count() as i64
}
