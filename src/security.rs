//! Input sanitising and validation applied to everything a user types, plus
//! the reversible credential obfuscation used before integration settings
//! are stored. The obfuscation is XOR + base64 and protects nothing; it only
//! keeps credentials from being readable at a glance in a table dump.
use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use std::sync::LazyLock;

pub const MAX_TEXT_LENGTH: usize = 1000;
pub const GUEST_NAME_MIN_LENGTH: usize = 2;
pub const GUEST_NAME_MAX_LENGTH: usize = 100;
pub const REVIEW_TEXT_MIN_LENGTH: usize = 10;
pub const REVIEW_TEXT_MAX_LENGTH: usize = 2000;
pub const REPLY_MAX_LENGTH: usize = 1000;
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const OBFUSCATION_KEY: u8 = 42;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static GUEST_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z\s\-']+$").unwrap());
static SUSPICIOUS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)<script",
        r"(?i)javascript:",
        r"(?i)vbscript:",
        r"(?i)onload=",
        r"(?i)onerror=",
        r"(?i)onclick=",
        r"(?i)onmouseover=",
        r"(?i)eval\(",
        r"(?i)expression\(",
        r"(?i)document\.cookie",
        r"(?i)document\.write",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Headers attached to every response the server produces.
pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("X-XSS-Protection", "1; mode=block"),
    ("Referrer-Policy", "strict-origin-when-cross-origin"),
    ("Permissions-Policy", "camera=(), microphone=(), geolocation=(), payment=()"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub sanitized: String,
    pub error: Option<&'static str>,
}

impl Validated {
    fn ok(sanitized: String) -> Self {
        Self { sanitized, error: None }
    }

    fn fail(sanitized: String, error: &'static str) -> Self {
        Self { sanitized, error: Some(error) }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<String, &'static str> {
        match self.error {
            None => Ok(self.sanitized),
            Some(e) => Err(e),
        }
    }
}

/// Strips markup and characters that could break out of an attribute.
pub fn sanitize_text(input: &str) -> String {
    let without_tags = HTML_TAG.replace_all(input, "");
    let cleaned: String = without_tags
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '\'' | '"' | '&'))
        .collect();
    cleaned.trim().chars().take(MAX_TEXT_LENGTH).collect()
}

/// Returns the normalised address, or an empty string when it does not look like one.
pub fn sanitize_email(email: &str) -> String {
    let cleaned = email.trim().to_lowercase();
    if EMAIL.is_match(&cleaned) {
        cleaned
    } else {
        String::new()
    }
}

pub fn contains_suspicious_pattern(text: &str) -> bool {
    SUSPICIOUS.iter().any(|p| p.is_match(text))
}

pub fn validate_review_text(text: &str) -> Validated {
    if text.trim().is_empty() {
        return Validated::fail(String::new(), "Review text is required");
    }

    let sanitized = sanitize_text(text);
    let len = sanitized.chars().count();

    if len < REVIEW_TEXT_MIN_LENGTH {
        return Validated::fail(sanitized, "Review text must be at least 10 characters");
    }
    if len > REVIEW_TEXT_MAX_LENGTH {
        return Validated::fail(sanitized, "Review text must be less than 2000 characters");
    }
    if contains_suspicious_pattern(text) {
        return Validated::fail(sanitized, "Invalid content detected");
    }

    Validated::ok(sanitized)
}

pub fn validate_guest_name(name: &str) -> Validated {
    if name.trim().is_empty() {
        return Validated::fail(String::new(), "Guest name is required");
    }

    let sanitized = sanitize_text(name);
    let len = sanitized.chars().count();

    if len < GUEST_NAME_MIN_LENGTH {
        return Validated::fail(sanitized, "Guest name must be at least 2 characters");
    }
    if len > GUEST_NAME_MAX_LENGTH {
        return Validated::fail(sanitized, "Guest name must be less than 100 characters");
    }
    if !GUEST_NAME.is_match(&sanitized) {
        return Validated::fail(sanitized, "Guest name contains invalid characters");
    }

    Validated::ok(sanitized)
}

pub fn validate_reply_text(text: &str) -> Validated {
    let sanitized = sanitize_text(text);
    if sanitized.is_empty() {
        return Validated::fail(sanitized, "Reply text is required");
    }
    if contains_suspicious_pattern(text) {
        return Validated::fail(sanitized, "Invalid content detected");
    }
    Validated::ok(sanitized)
}

pub fn obfuscate(data: &str) -> String {
    let bytes: Vec<u8> = data.bytes().map(|b| b ^ OBFUSCATION_KEY).collect();
    STANDARD.encode(bytes)
}

pub fn deobfuscate(encoded: &str) -> Result<String, &'static str> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| "Failed to decrypt data")?;
    let plain: Vec<u8> = bytes.into_iter().map(|b| b ^ OBFUSCATION_KEY).collect();
    String::from_utf8(plain).map_err(|_| "Failed to decrypt data")
}
