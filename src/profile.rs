use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const PROFILE_URL_BASE: &str = "https://www.instagram.com";

static PROFILE_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"instagram\.com/([A-Za-z0-9._]+)").expect("valid profile url regex"));
static HANDLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._]+$").expect("valid handle regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please enter an Instagram profile link or handle")]
    Empty,
    #[error("could not find a profile handle in {0:?}")]
    Malformed(String),
}

/// A caller-supplied profile link or handle together with the subject it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileReference {
    raw: String,
    subject: String,
}

impl ProfileReference {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ValidationError::Empty);
        }

        let subject = match PROFILE_URL_REGEX.captures(raw) {
            Some(caps) => caps[1].to_string(),
            None => raw
                .strip_prefix('@')
                .unwrap_or(raw)
                .split(['/', '?'])
                .next()
                .unwrap_or_default()
                .trim()
                .to_string(),
        };

        if !HANDLE_REGEX.is_match(&subject) {
            return Err(ValidationError::Malformed(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            subject,
        })
    }

    /// The reference as the caller typed it, trimmed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Canonical profile link for the subject, as the analysis service expects it.
    pub fn profile_url(&self) -> String {
        format!("{PROFILE_URL_BASE}/{}/", self.subject)
    }
}
