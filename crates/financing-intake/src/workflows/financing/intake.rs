use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use super::decision::OFFER_SALARY_MULTIPLE;
use super::domain::{
    ApplicationField, ApplicationFields, ApplicationRequest, EmailAddress, EmploymentSector,
    MobileNumber, NationalId,
};

pub const MIN_AGE: u64 = 18;
pub const MAX_AGE: u64 = 65;
pub const MIN_REQUESTED_AMOUNT: u64 = 2_000;
pub const MAX_REQUESTED_AMOUNT: u64 = 1_500_000;
/// Largest salary whose offer still fits in a `u64`.
pub const MAX_SALARY: u64 = u64::MAX / OFFER_SALARY_MULTIPLE;

const SAUDI_COUNTRY_CODE: &str = "966";

/// User-correctable intake failures. Carries enough detail to re-render the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<ApplicationField>),
    #[error("{field} {constraint}")]
    InvalidFormat {
        field: ApplicationField,
        constraint: FormatConstraint,
    },
    #[error("{field} must be between {min} and {max} (found {found})")]
    OutOfRange {
        field: ApplicationField,
        min: u64,
        max: u64,
        found: u64,
    },
}

impl ValidationError {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "missing_fields",
            Self::InvalidFormat { .. } => "invalid_format",
            Self::OutOfRange { .. } => "out_of_range",
        }
    }

    /// The offending field for single-field failures.
    pub fn field(&self) -> Option<ApplicationField> {
        match self {
            Self::MissingFields(_) => None,
            Self::InvalidFormat { field, .. } | Self::OutOfRange { field, .. } => Some(*field),
        }
    }

    pub fn missing_fields(&self) -> &[ApplicationField] {
        match self {
            Self::MissingFields(fields) => fields,
            _ => &[],
        }
    }
}

fn join_fields(fields: &[ApplicationField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Shape constraints checked after presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatConstraint {
    TenDigits,
    SaudiMobile,
    EmailAddress,
    WholeNumber,
    NonNegative,
    KnownSector,
}

impl fmt::Display for FormatConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::TenDigits => "must be exactly 10 digits",
            Self::SaudiMobile => "must be a Saudi mobile number (+966 5XX XXX XXX)",
            Self::EmailAddress => "must be a valid email address",
            Self::WholeNumber => "must be a whole number",
            Self::NonNegative => "must not be negative",
            Self::KnownSector => "must be one of Private, Government, Semi-government",
        };
        f.write_str(message)
    }
}

/// Validate raw fields, stamping the request with the current time.
pub fn validate(fields: &ApplicationFields) -> Result<ApplicationRequest, ValidationError> {
    validate_at(fields, Utc::now())
}

/// Validate raw fields into an immutable request. All fields pass or nothing is accepted.
pub fn validate_at(
    fields: &ApplicationFields,
    received_at: DateTime<Utc>,
) -> Result<ApplicationRequest, ValidationError> {
    let missing: Vec<ApplicationField> = ApplicationField::ordered()
        .into_iter()
        .filter(|field| fields.value(*field).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let full_name = required(fields, ApplicationField::FullName)?.to_string();

    let national_id = required(fields, ApplicationField::NationalId)?;
    if national_id.len() != 10 || !national_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(
            ApplicationField::NationalId,
            FormatConstraint::TenDigits,
        ));
    }
    let national_id = NationalId::new_unchecked(national_id.to_string());

    let mobile = normalize_mobile(required(fields, ApplicationField::Mobile)?)
        .ok_or_else(|| invalid(ApplicationField::Mobile, FormatConstraint::SaudiMobile))?;

    let email = required(fields, ApplicationField::Email)?;
    if !email_pattern().is_match(email) {
        return Err(invalid(
            ApplicationField::Email,
            FormatConstraint::EmailAddress,
        ));
    }
    let email = EmailAddress::new_unchecked(email.to_string());

    let age = parse_whole(fields, ApplicationField::Age)?;
    check_range(ApplicationField::Age, age, MIN_AGE, MAX_AGE)?;

    let employment_sector =
        EmploymentSector::from_label(required(fields, ApplicationField::EmploymentSector)?)
            .ok_or_else(|| {
                invalid(
                    ApplicationField::EmploymentSector,
                    FormatConstraint::KnownSector,
                )
            })?;

    let salary = parse_whole(fields, ApplicationField::Salary)?;
    check_range(ApplicationField::Salary, salary, 0, MAX_SALARY)?;

    let requested_amount = parse_whole(fields, ApplicationField::RequestedAmount)?;
    check_range(
        ApplicationField::RequestedAmount,
        requested_amount,
        MIN_REQUESTED_AMOUNT,
        MAX_REQUESTED_AMOUNT,
    )?;

    Ok(ApplicationRequest::new(
        full_name,
        national_id,
        MobileNumber::new_unchecked(mobile),
        email,
        age as u8,
        employment_sector,
        salary,
        requested_amount,
        received_at,
    ))
}

/// Reduce a Saudi mobile number to `+966` followed by nine digits starting with `5`.
///
/// Accepts `05XXXXXXXX` and `5XXXXXXXX`, alone or behind a `966`, `+966` or
/// `00966` prefix, ignoring spaces, dashes, dots and parentheses.
pub fn normalize_mobile(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')'))
        .collect();

    let national = if let Some(rest) = compact.strip_prefix('+') {
        rest.strip_prefix(SAUDI_COUNTRY_CODE)?
    } else if let Some(rest) = compact.strip_prefix("00") {
        rest.strip_prefix(SAUDI_COUNTRY_CODE)?
    } else {
        match compact.strip_prefix(SAUDI_COUNTRY_CODE) {
            Some(rest) if subscriber_digits(rest).is_some() => rest,
            _ => compact.as_str(),
        }
    };

    subscriber_digits(national).map(|local| format!("+{SAUDI_COUNTRY_CODE}{local}"))
}

/// Nine digits starting with `5`, after dropping an optional trunk `0`.
fn subscriber_digits(national: &str) -> Option<&str> {
    let local = national.strip_prefix('0').unwrap_or(national);
    (local.len() == 9 && local.starts_with('5') && local.bytes().all(|b| b.is_ascii_digit()))
        .then_some(local)
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

fn required(fields: &ApplicationFields, field: ApplicationField) -> Result<&str, ValidationError> {
    fields
        .value(field)
        .ok_or_else(|| ValidationError::MissingFields(vec![field]))
}

fn parse_whole(
    fields: &ApplicationFields,
    field: ApplicationField,
) -> Result<u64, ValidationError> {
    let raw = required(fields, field)?;
    let digits: String = raw.chars().filter(|c| *c != ',').collect();

    if let Some(magnitude) = digits.strip_prefix('-') {
        if !magnitude.is_empty() && magnitude.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(field, FormatConstraint::NonNegative));
        }
        return Err(invalid(field, FormatConstraint::WholeNumber));
    }

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(field, FormatConstraint::WholeNumber));
    }

    // A digit run past u64 is clamped so the range check reports it.
    Ok(digits.parse::<u64>().unwrap_or(u64::MAX))
}

fn check_range(
    field: ApplicationField,
    value: u64,
    min: u64,
    max: u64,
) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            found: value,
        })
    }
}

fn invalid(field: ApplicationField, constraint: FormatConstraint) -> ValidationError {
    ValidationError::InvalidFormat { field, constraint }
}
