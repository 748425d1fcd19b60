//! Parsing of review exports uploaded as CSV. The header row names the
//! columns; a [`FieldMapping`] says which column feeds which review field so
//! exports from different platforms can be imported without editing them.
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{NewReview, Platform};
use crate::security::MAX_UPLOAD_BYTES;

pub const ANONYMOUS_GUEST: &str = "Anonymous";
const DEFAULT_RATING: u8 = 5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FieldMapping {
    pub guest_name: String,
    pub date: String,
    pub rating: String,
    pub review_text: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            guest_name: "guest_name".into(),
            date: "date".into(),
            rating: "rating".into(),
            review_text: "review_text".into(),
        }
    }
}

impl FieldMapping {
    fn normalized(&self) -> [String; 4] {
        [
            &self.guest_name,
            &self.date,
            &self.rating,
            &self.review_text,
        ]
        .map(|h| h.trim().to_lowercase())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ParsedCsv {
    pub reviews: Vec<NewReview>,
    pub skipped: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Splits one line on commas outside double quotes; `""` inside quotes is a literal quote.
pub fn parse_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

fn parse_rating(raw: &str) -> u8 {
    let digits: String = raw.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => DEFAULT_RATING,
        Ok(n) => n.clamp(1, 5) as u8,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Utc::now().date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

pub fn parse_reviews_csv(
    text: &str,
    platform: Platform,
    mapping: &FieldMapping,
) -> Result<ParsedCsv, AppError> {
    if text.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation("CSV file exceeds 5 MB".into()));
    }

    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header_line = lines
        .next()
        .ok_or_else(|| AppError::Validation("CSV file is empty".into()))?;
    let headers: Vec<String> = parse_csv_row(header_line)
        .into_iter()
        .map(|h| h.to_lowercase())
        .collect();

    let wanted = mapping.normalized();
    let missing: Vec<&str> = wanted
        .iter()
        .filter(|w| !headers.contains(w))
        .map(|w| w.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }

    let column = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
    let [guest_col, date_col, rating_col, text_col] = wanted.map(|w| column(&w));

    let mut parsed = ParsedCsv::default();
    for line in lines {
        let values = parse_csv_row(line);
        if values.len() != headers.len() {
            parsed.skipped += 1;
            continue;
        }

        let Some(date) = parse_date(&values[date_col]) else {
            parsed.skipped += 1;
            continue;
        };

        let guest_name = match values[guest_col].as_str() {
            "" => ANONYMOUS_GUEST.to_string(),
            name => name.to_string(),
        };

        parsed.reviews.push(NewReview {
            platform,
            guest_name,
            rating: parse_rating(&values[rating_col]),
            review_text: values[text_col].clone(),
            date,
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_keep_commas_and_quotes() {
        let row = parse_csv_row(r#"Maria, "Great, really ""great"" stay",5"#);
        assert_eq!(row, vec!["Maria", r#"Great, really "great" stay"#, "5"]);
    }

    #[test]
    fn imports_rows_with_defaults_and_skips_malformed() {
        let csv = "Guest_Name,Date,Rating,Review_Text\r\n\
                   Maria,2024-05-01,4,Lovely view\r\n\
                   ,2024-05-02,abc,\r\n\
                   broken,row\r\n\
                   John,not-a-date,3,Fine\r\n\
                   Eva,02/05/2024,9,Superb\r\n";
        let parsed = parse_reviews_csv(csv, Platform::Booking, &FieldMapping::default()).unwrap();

        assert_eq!(parsed.reviews.len(), 3);
        assert_eq!(parsed.skipped, 2);
        assert_eq!(parsed.reviews[0].rating, 4);
        assert_eq!(parsed.reviews[1].guest_name, ANONYMOUS_GUEST);
        assert_eq!(parsed.reviews[1].rating, 5);
        assert_eq!(parsed.reviews[2].rating, 5);
        assert_eq!(
            parsed.reviews[2].date,
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
        );
        assert!(parsed.reviews.iter().all(|r| r.platform == Platform::Booking));
    }

    #[test]
    fn custom_mapping_reads_renamed_columns() {
        let csv = "reviewer,stayed_on,score,comments\nAna,2024-01-10,2,Cold room\n";
        let mapping = FieldMapping {
            guest_name: "Reviewer".into(),
            date: "stayed_on".into(),
            rating: "score".into(),
            review_text: "comments".into(),
        };
        let parsed = parse_reviews_csv(csv, Platform::Airbnb, &mapping).unwrap();
        assert_eq!(parsed.reviews[0].guest_name, "Ana");
        assert_eq!(parsed.reviews[0].review_text, "Cold room");
    }

    #[test]
    fn missing_columns_are_named() {
        let err = parse_reviews_csv("guest_name,date\nA,2024-01-01\n", Platform::Google, &FieldMapping::default())
            .unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Missing required columns: rating, review_text"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(parse_reviews_csv("\n\n", Platform::Google, &FieldMapping::default()).is_err());
    }
}
