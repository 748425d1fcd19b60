use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// External review source a review or price entry is attributed to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Google,
    Booking,
    Airbnb,
    Tripadvisor,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Google,
        Platform::Booking,
        Platform::Airbnb,
        Platform::Tripadvisor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Google => "google",
            Platform::Booking => "booking",
            Platform::Airbnb => "airbnb",
            Platform::Tripadvisor => "tripadvisor",
        }
    }

    /// Human readable name shown in the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Google => "Google Reviews",
            Platform::Booking => "Booking.com",
            Platform::Airbnb => "Airbnb",
            Platform::Tripadvisor => "TripAdvisor",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown platform: {}", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Platform::Google),
            "booking" | "booking.com" => Ok(Platform::Booking),
            "airbnb" => Ok(Platform::Airbnb),
            "tripadvisor" => Ok(Platform::Tripadvisor),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Booking.com".parse::<Platform>(), Ok(Platform::Booking));
        assert_eq!(" GOOGLE ".parse::<Platform>(), Ok(Platform::Google));
        assert!("expedia".parse::<Platform>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Platform::Tripadvisor).unwrap();
        assert_eq!(json, "\"tripadvisor\"");
    }
}
