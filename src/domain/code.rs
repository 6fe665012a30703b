use std::{fmt, num::NonZeroU32, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::domain::catalog::mac_name_for;

/// The fixed first segment of every GSA code.
pub const PREFIX: &str = "GSA";

/// The highest count a code can carry while keeping its three-digit shape.
pub const MAX_COUNT: u32 = 999;

/// Returned by [`describe_code`] for input that cannot be decomposed.
pub const INVALID_DESCRIPTION: &str = "Invalid GSA Code";

// `[0-9]` rather than `\d`: the regex crate's `\d` also matches non-ASCII digits.
static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^GSA-[A-Z]{2,4}-[0-9]{2}-[0-9]{3}$").expect("code pattern is valid")
});

/// A structured asset identifier.
///
/// Format:
/// `{PREFIX}-{MAC}-{CLASS}-{COUNT}`, where:
/// - `PREFIX` is the literal `GSA`
/// - `MAC` is the 2-4 letter code of the owning ministry, agency or commission
/// - `CLASS` is the 2-digit class code within the asset's category
/// - `COUNT` is the sequence number of the asset within its (MAC, class)
///   group, zero-padded to 3 digits
///
/// Example: `GSA-MOH-02-001`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GsaCode {
    prefix: String,
    mac_code: String,
    class_code: String,
    count: u32,
}

impl GsaCode {
    /// Creates a code from its parts without validation.
    #[must_use]
    pub fn new(
        prefix: impl Into<String>,
        mac_code: impl Into<String>,
        class_code: impl Into<String>,
        count: u32,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            mac_code: mac_code.into(),
            class_code: class_code.into(),
            count,
        }
    }

    /// Best-effort decomposition of a dash-delimited code.
    ///
    /// Succeeds whenever the input splits into exactly four segments; the
    /// segment contents are not checked. A count segment without a leading
    /// number parses as `0`, so `GSA-MOH-02-abc` decomposes with count `0`.
    ///
    /// Use [`validate_code`] (or [`FromStr`]) for an authoritative
    /// well-formedness check.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        let mut parts = code.split('-');
        let (Some(prefix), Some(mac_code), Some(class_code), Some(count), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return None;
        };

        Some(Self::new(prefix, mac_code, class_code, leading_integer(count)))
    }

    /// Returns the prefix segment.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the MAC segment.
    #[must_use]
    pub fn mac_code(&self) -> &str {
        &self.mac_code
    }

    /// Returns the class segment.
    #[must_use]
    pub fn class_code(&self) -> &str {
        &self.class_code
    }

    /// Returns the sequence count.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }
}

/// Reads the unsigned integer at the start of a segment.
///
/// Leading whitespace and a single `+` are skipped and trailing garbage is
/// ignored. A segment without digits, or one that overflows, reads as `0`.
fn leading_integer(segment: &str) -> u32 {
    let trimmed = segment.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().unwrap_or(0)
}

impl fmt::Display for GsaCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{:03}",
            self.prefix, self.mac_code, self.class_code, self.count
        )
    }
}

/// Formats the parts of a code into its canonical string form.
///
/// The count is zero-padded to three digits. Counts above [`MAX_COUNT`] are
/// written in full and the result no longer passes [`validate_code`]; a
/// (MAC, class) group can hold at most 999 coded assets.
#[must_use]
pub fn build_code(prefix: &str, mac_code: &str, class_code: &str, count: u32) -> String {
    format!("{prefix}-{mac_code}-{class_code}-{count:03}")
}

/// Returns `true` if the string has the exact shape of a GSA code:
/// `GSA-` then 2-4 uppercase letters, 2 digits and 3 digits, dash-separated.
#[must_use]
pub fn validate_code(code: &str) -> bool {
    CODE_PATTERN.is_match(code)
}

/// Describes a code in words, e.g. `Ministry of Health - Asset #1 in class 02`.
///
/// Unknown MAC codes are shown as-is. Input that does not decompose into four
/// segments yields [`INVALID_DESCRIPTION`].
#[must_use]
pub fn describe_code(code: &str) -> String {
    let Some(parsed) = GsaCode::parse(code) else {
        return INVALID_DESCRIPTION.to_string();
    };

    let mac_name = mac_name_for(parsed.mac_code()).unwrap_or(parsed.mac_code());
    format!(
        "{mac_name} - Asset #{} in class {}",
        parsed.count(),
        parsed.class_code()
    )
}

/// Errors that can occur during strict code parsing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The string does not have the shape `GSA-XXX-00-000`.
    #[error("Invalid GSA code format: {0}")]
    Syntax(String),
}

impl FromStr for GsaCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !validate_code(s) {
            return Err(Error::Syntax(s.to_string()));
        }
        Self::parse(s).ok_or_else(|| Error::Syntax(s.to_string()))
    }
}

impl TryFrom<&str> for GsaCode {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

/// An operator-supplied sequence count, used when importing legacy records
/// whose numbers are already fixed on paper.
///
/// Always within `1..=999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ManualCount(NonZeroU32);

impl ManualCount {
    /// Creates a manual count.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCountError` if the count is zero or above
    /// [`MAX_COUNT`].
    pub fn new(count: u32) -> Result<Self, InvalidCountError> {
        NonZeroU32::new(count)
            .filter(|count| count.get() <= MAX_COUNT)
            .map(Self)
            .ok_or(InvalidCountError(count))
    }

    /// Returns the count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl FromStr for ManualCount {
    type Err = InvalidCountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.trim().parse::<u32>().map_err(|_| InvalidCountError(0))?;
        Self::new(count)
    }
}

/// Error returned when a manual count is outside `1..=999`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid manual count {0}: must be between 1 and 999")]
pub struct InvalidCountError(u32);
