//! Search / platform / rating filtering for the reviews list. Recomputed on
//! every keystroke over whatever is currently loaded.
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{Platform, Review};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(Platform),
}

impl PlatformFilter {
    pub fn matches(&self, review: &Review) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Only(p) => review.platform == *p,
        }
    }

    pub fn as_value(&self) -> &'static str {
        match self {
            PlatformFilter::All => "all",
            PlatformFilter::Only(p) => p.as_str(),
        }
    }
}

impl FromStr for PlatformFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(PlatformFilter::All);
        }
        s.parse::<Platform>().map(PlatformFilter::Only).map_err(|_| ())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RatingBand {
    #[default]
    All,
    /// 4 and 5 stars
    High,
    /// exactly 3 stars
    Medium,
    /// 1 and 2 stars
    Low,
}

impl RatingBand {
    pub fn matches(&self, rating: u8) -> bool {
        match self {
            RatingBand::All => true,
            RatingBand::High => rating >= 4,
            RatingBand::Medium => rating == 3,
            RatingBand::Low => rating <= 2,
        }
    }

    pub fn as_value(&self) -> &'static str {
        match self {
            RatingBand::All => "all",
            RatingBand::High => "high",
            RatingBand::Medium => "medium",
            RatingBand::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingBand::All => "All ratings",
            RatingBand::High => "4-5 Stars",
            RatingBand::Medium => "3 Stars",
            RatingBand::Low => "1-2 Stars",
        }
    }
}

impl FromStr for RatingBand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(RatingBand::All),
            "high" => Ok(RatingBand::High),
            "medium" => Ok(RatingBand::Medium),
            "low" => Ok(RatingBand::Low),
            _ => Err(()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewFilter {
    pub search: String,
    pub platform: PlatformFilter,
    pub rating: RatingBand,
}

impl ReviewFilter {
    pub fn matches_search(&self, review: &Review) -> bool {
        let term = self.search.to_lowercase();
        review.review_text.to_lowercase().contains(&term)
            || review.guest_name.to_lowercase().contains(&term)
    }

    pub fn matches(&self, review: &Review) -> bool {
        self.matches_search(review)
            && self.platform.matches(review)
            && self.rating.matches(review.rating)
    }

    pub fn apply<'a>(&self, reviews: &'a [Review]) -> Vec<&'a Review> {
        reviews.iter().filter(|r| self.matches(r)).collect()
    }

    pub fn apply_owned(&self, reviews: &[Review]) -> Vec<Review> {
        reviews.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
            || self.platform != PlatformFilter::All
            || self.rating != RatingBand::All
    }

    pub fn clear(&mut self) {
        *self = ReviewFilter::default();
    }
}

pub fn pending_count(reviews: &[Review]) -> usize {
    reviews.iter().filter(|r| !r.replied).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn review(platform: Platform, guest: &str, rating: u8, text: &str) -> Review {
        Review {
            id: format!("{guest}-{rating}"),
            user_id: "owner".into(),
            platform,
            guest_name: guest.into(),
            rating,
            review_text: text.into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            reply_text: None,
            replied: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample() -> Vec<Review> {
        vec![
            review(Platform::Booking, "Maria", 5, "Spotless room and friendly staff"),
            review(Platform::Airbnb, "John", 3, "Okay stay, noisy street"),
            review(Platform::Google, "Ana", 2, "Room was not clean"),
            review(Platform::Booking, "Nikos", 1, "Terrible check-in"),
            review(Platform::Tripadvisor, "Eva", 4, "Great breakfast"),
        ]
    }

    #[test]
    fn search_matches_text_or_guest_case_insensitively() {
        let reviews = sample();
        let filter = ReviewFilter { search: "ROOM".into(), ..Default::default() };
        let hits: Vec<_> = filter.apply(&reviews).iter().map(|r| r.guest_name.as_str()).collect();
        assert_eq!(hits, vec!["Maria", "Ana"]);

        let by_guest = ReviewFilter { search: "nik".into(), ..Default::default() };
        assert_eq!(by_guest.apply(&reviews).len(), 1);
    }

    #[test]
    fn rating_bands_partition_ratings() {
        for rating in 1..=5u8 {
            let bands = [RatingBand::High, RatingBand::Medium, RatingBand::Low]
                .iter()
                .filter(|b| b.matches(rating))
                .count();
            assert_eq!(bands, 1, "rating {rating} must fall in exactly one band");
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let reviews = sample();
        let filter = ReviewFilter {
            search: "r".into(),
            platform: PlatformFilter::Only(Platform::Booking),
            rating: RatingBand::All,
        };
        let once = filter.apply_owned(&reviews);
        let twice = filter.apply_owned(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn individual_filters_commute() {
        let reviews = sample();
        let search = ReviewFilter { search: "r".into(), ..Default::default() };
        let platform = ReviewFilter {
            platform: PlatformFilter::Only(Platform::Booking),
            ..Default::default()
        };
        let rating = ReviewFilter { rating: RatingBand::Low, ..Default::default() };

        let a = rating.apply_owned(&platform.apply_owned(&search.apply_owned(&reviews)));
        let b = search.apply_owned(&rating.apply_owned(&platform.apply_owned(&reviews)));
        let combined = ReviewFilter {
            search: "r".into(),
            platform: PlatformFilter::Only(Platform::Booking),
            rating: RatingBand::Low,
        }
        .apply_owned(&reviews);

        assert_eq!(a, b);
        assert_eq!(a, combined);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn active_and_clear() {
        let mut filter = ReviewFilter { rating: RatingBand::High, ..Default::default() };
        assert!(filter.is_active());
        filter.clear();
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&sample()).len(), 5);
    }

    #[test]
    fn parses_select_values() {
        assert_eq!("all".parse::<PlatformFilter>(), Ok(PlatformFilter::All));
        assert_eq!(
            "airbnb".parse::<PlatformFilter>(),
            Ok(PlatformFilter::Only(Platform::Airbnb))
        );
        assert_eq!("medium".parse::<RatingBand>(), Ok(RatingBand::Medium));
        assert_eq!(pending_count(&sample()), 5);
    }
}
