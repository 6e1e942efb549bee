//! Input sanitization and form validation.
//!
//! Pure helpers shared by the API handlers and domain services. Field rules
//! are evaluated in a fixed priority order and short-circuit at the first
//! failure; whole-form validation always evaluates every field so all
//! errors surface at once.

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^[A-Za-z0-9_]{3,20}$")
}

fn loose_phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^[\d\s\-+()]{10,}$")
}

/// Trims, strips literal backslash escapes, and HTML-escapes the input so it
/// is safe to embed directly in HTML.
///
/// Escaping is NOT idempotent: applying `sanitize` to already-escaped text
/// double-encodes it (`"&lt;b&gt;"` becomes `"&amp;lt;b&amp;gt;"`). Callers
/// must sanitize exactly once, at the trust boundary.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let stripped = strip_slashes(input.trim());
    html_escape::encode_safe(&stripped).to_string()
}

/// Removes backslash escapes: `\'` becomes `'`, `\\` becomes `\`.
fn strip_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Strict phone check: exactly 10 digits after stripping spaces and dashes.
/// International prefixes and parentheses are rejected.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    let cleaned: String = phone.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    cleaned.len() == 10 && cleaned.chars().all(|c| c.is_ascii_digit())
}

/// Loose phone check used by form field rules: at least 10 characters of
/// digits, spaces, dashes, plus signs, or parentheses.
#[must_use]
pub fn is_loose_phone(phone: &str) -> bool {
    loose_phone_regex().is_match(phone)
}

/// Reduces a phone number to its digits.
#[must_use]
pub fn clean_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

#[must_use]
pub fn is_valid_username(username: &str) -> bool {
    username_regex().is_match(username)
}

/// Strict password policy: at least 8 characters with lowercase, uppercase,
/// and a digit. This is the acceptance check; [`password_strength`] is the
/// advisory scorer and is intentionally independent.
#[must_use]
pub fn is_valid_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLevel {
    None,
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub level: StrengthLevel,
}

/// Scores a password 0-6: one point each for length >= 8, length >= 12,
/// lowercase, uppercase, digit, and any other symbol. Score <= 2 is weak,
/// <= 4 medium, otherwise strong.
#[must_use]
pub fn password_strength(password: &str) -> PasswordStrength {
    if password.is_empty() {
        return PasswordStrength {
            score: 0,
            level: StrengthLevel::None,
        };
    }

    let mut score = 0u8;

    if password.len() >= 8 {
        score += 1;
    }
    if password.len() >= 12 {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 1;
    }

    let level = match score {
        0..=2 => StrengthLevel::Weak,
        3..=4 => StrengthLevel::Medium,
        _ => StrengthLevel::Strong,
    };

    PasswordStrength { score, level }
}

/// Validation rules attached to a form field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldRules {
    pub required: bool,
    pub email: bool,
    pub username: bool,
    pub password: bool,
    pub phone: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Name of another field this field's value must match.
    pub matches: Option<String>,
}

/// Outcome of validating a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    pub is_valid: bool,
    pub message: String,
}

impl FieldReport {
    fn pass() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

/// Evaluates rules for one field value in priority order, stopping at the
/// first failure: required, email, username, password, phone, min length,
/// max length, matches. `other` carries the value of the field named by
/// `rules.matches`, when present.
#[must_use]
pub fn validate_field(value: &str, rules: &FieldRules, other: Option<&str>) -> FieldReport {
    let value = value.trim();

    if rules.required && value.is_empty() {
        return FieldReport::fail("This field is required");
    }

    if rules.email && !value.is_empty() && !is_valid_email(value) {
        return FieldReport::fail("Please enter a valid email address");
    }

    if rules.username && !value.is_empty() && !is_valid_username(value) {
        return FieldReport::fail("Username must be 3-20 alphanumeric characters or underscores");
    }

    if rules.password && !value.is_empty() && !is_valid_password(value) {
        return FieldReport::fail(
            "Password must be at least 8 characters with uppercase, lowercase, and number",
        );
    }

    if rules.phone && !value.is_empty() && !is_loose_phone(value) {
        return FieldReport::fail("Please enter a valid phone number");
    }

    if let Some(min) = rules.min_length
        && value.len() < min
    {
        return FieldReport::fail(format!("Must be at least {min} characters"));
    }

    if let Some(max) = rules.max_length
        && value.len() > max
    {
        return FieldReport::fail(format!("Must not exceed {max} characters"));
    }

    if rules.matches.is_some()
        && let Some(other_value) = other
        && value != other_value
    {
        return FieldReport::fail("Fields do not match");
    }

    FieldReport::pass()
}

/// A named field with its submitted value and rules.
#[derive(Debug, Clone, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub rules: FieldRules,
}

/// Per-field reports for a whole form, in submission order.
#[derive(Debug, Clone, Serialize)]
pub struct FormReport {
    pub is_valid: bool,
    pub fields: Vec<(String, FieldReport)>,
}

/// Validates every field, never stopping at the first invalid one, so the
/// caller can surface all errors at once.
#[must_use]
pub fn validate_form(fields: &[FormField]) -> FormReport {
    let mut reports = Vec::with_capacity(fields.len());
    let mut is_valid = true;

    for field in fields {
        let other = field.rules.matches.as_ref().and_then(|target| {
            fields
                .iter()
                .find(|f| f.name == *target)
                .map(|f| f.value.as_str())
        });

        let report = validate_field(&field.value, &field.rules, other);
        if !report.is_valid {
            is_valid = false;
        }
        reports.push((field.name.clone(), report));
    }

    FormReport {
        is_valid,
        fields: reports,
    }
}

/// Rejects event time ranges where the end does not come after the start.
pub fn validate_event_times(start: NaiveTime, end: NaiveTime) -> Result<(), String> {
    if end <= start {
        return Err("End time must be after start time".to_string());
    }
    Ok(())
}

/// Rejects event dates before `today`.
pub fn validate_event_date(date: NaiveDate, today: NaiveDate) -> Result<(), String> {
    if date < today {
        return Err("Event date cannot be in the past".to_string());
    }
    Ok(())
}

/// Formats a date for display, e.g. "January 5, 2026".
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Formats a time for display, e.g. "9:05 AM".
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_escapes_html() {
        assert_eq!(sanitize("<b>"), "&lt;b&gt;");
        assert_eq!(sanitize("  hello  "), "hello");
        assert_eq!(sanitize(r"it\'s"), "it&#x27;s");
    }

    #[test]
    fn test_sanitize_is_not_idempotent() {
        // Escaping twice double-encodes; callers sanitize exactly once.
        let once = sanitize("<b>");
        assert_eq!(once, "&lt;b&gt;");
        assert_eq!(sanitize(&once), "&amp;lt;b&amp;gt;");
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("j.doe+tag@mail.example.org"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("876-555-1234"));
        assert!(is_valid_phone("876 555 1234"));
        assert!(is_valid_phone("8765551234"));
        assert!(!is_valid_phone("87655512345"));
        assert!(!is_valid_phone("876555123"));
        assert!(!is_valid_phone("+18765551234"));
        assert!(!is_valid_phone("(876)5551234"));
    }

    #[test]
    fn test_loose_phone() {
        assert!(is_loose_phone("(876) 555-1234"));
        assert!(is_loose_phone("+1 876 555 1234"));
        assert!(!is_loose_phone("555-1234"));
        assert!(!is_loose_phone("876x555x1234"));
    }

    #[test]
    fn test_clean_phone() {
        assert_eq!(clean_phone("(876) 555-1234"), "8765551234");
        assert_eq!(clean_phone("abc"), "");
    }

    #[test]
    fn test_username_validation() {
        assert!(is_valid_username("jane_doe"));
        assert!(is_valid_username("abc"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("a".repeat(21).as_str()));
        assert!(!is_valid_username("jane doe"));
    }

    #[test]
    fn test_password_policy() {
        assert!(!is_valid_password("abc12345"));
        assert!(is_valid_password("Abc12345"));
        assert!(!is_valid_password("Abc1234"));
        assert!(!is_valid_password("ABC12345"));
        assert!(!is_valid_password("Abcdefgh"));
    }

    #[test]
    fn test_password_strength_buckets() {
        assert_eq!(password_strength("").level, StrengthLevel::None);
        assert_eq!(password_strength("abc").level, StrengthLevel::Weak);
        assert_eq!(password_strength("abc").score, 1);
        assert_eq!(password_strength("Abc12345").level, StrengthLevel::Medium);
        assert_eq!(password_strength("Abc12345").score, 4);
        assert_eq!(
            password_strength("Abcdef123456!").level,
            StrengthLevel::Strong
        );
        assert_eq!(password_strength("Abcdef123456!").score, 6);
    }

    #[test]
    fn test_validate_field_priority_order() {
        // Required wins over any format rule.
        let rules = FieldRules {
            required: true,
            email: true,
            ..Default::default()
        };
        let report = validate_field("", &rules, None);
        assert_eq!(report.message, "This field is required");

        // Format rules are skipped for optional empty fields.
        let rules = FieldRules {
            email: true,
            ..Default::default()
        };
        assert!(validate_field("", &rules, None).is_valid);

        // Email failure reported before min_length.
        let rules = FieldRules {
            email: true,
            min_length: Some(50),
            ..Default::default()
        };
        let report = validate_field("bad", &rules, None);
        assert_eq!(report.message, "Please enter a valid email address");
    }

    #[test]
    fn test_validate_field_length_and_match() {
        let rules = FieldRules {
            min_length: Some(5),
            ..Default::default()
        };
        assert_eq!(
            validate_field("abc", &rules, None).message,
            "Must be at least 5 characters"
        );

        let rules = FieldRules {
            max_length: Some(3),
            ..Default::default()
        };
        assert_eq!(
            validate_field("abcd", &rules, None).message,
            "Must not exceed 3 characters"
        );

        let rules = FieldRules {
            matches: Some("password".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate_field("a", &rules, Some("b")).message,
            "Fields do not match"
        );
        assert!(validate_field("a", &rules, Some("a")).is_valid);
    }

    #[test]
    fn test_validate_form_reports_every_failure() {
        let fields = vec![
            FormField {
                name: "email".to_string(),
                value: "bad".to_string(),
                rules: FieldRules {
                    required: true,
                    email: true,
                    ..Default::default()
                },
            },
            FormField {
                name: "username".to_string(),
                value: "x".to_string(),
                rules: FieldRules {
                    required: true,
                    username: true,
                    ..Default::default()
                },
            },
            FormField {
                name: "phone".to_string(),
                value: "876 555 1234".to_string(),
                rules: FieldRules {
                    phone: true,
                    ..Default::default()
                },
            },
        ];

        let report = validate_form(&fields);
        assert!(!report.is_valid);
        assert_eq!(report.fields.len(), 3);
        assert!(!report.fields[0].1.is_valid);
        assert!(!report.fields[1].1.is_valid);
        assert!(report.fields[2].1.is_valid);
    }

    #[test]
    fn test_validate_form_matches_other_field() {
        let fields = vec![
            FormField {
                name: "password".to_string(),
                value: "Abc12345".to_string(),
                rules: FieldRules {
                    required: true,
                    password: true,
                    ..Default::default()
                },
            },
            FormField {
                name: "confirm_password".to_string(),
                value: "Abc12346".to_string(),
                rules: FieldRules {
                    required: true,
                    matches: Some("password".to_string()),
                    ..Default::default()
                },
            },
        ];

        let report = validate_form(&fields);
        assert!(!report.is_valid);
        assert_eq!(report.fields[1].1.message, "Fields do not match");
    }

    #[test]
    fn test_event_time_ordering() {
        let start = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(
            validate_event_times(start, end).unwrap_err(),
            "End time must be after start time"
        );
        assert!(validate_event_times(end, start).is_ok());
        assert!(validate_event_times(start, start).is_err());
    }

    #[test]
    fn test_event_date_not_past() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(
            validate_event_date(yesterday, today).unwrap_err(),
            "Event date cannot be in the past"
        );
        assert!(validate_event_date(today, today).is_ok());
    }

    #[test]
    fn test_date_formatting() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(format_date(date), "January 5, 2026");

        let time = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(format_time(time), "9:05 AM");
    }
}
