use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for decided applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// The eight applicant fields collected by the intake form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationField {
    FullName,
    NationalId,
    Mobile,
    Email,
    Age,
    EmploymentSector,
    Salary,
    RequestedAmount,
}

impl ApplicationField {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::FullName,
            Self::NationalId,
            Self::Mobile,
            Self::Email,
            Self::Age,
            Self::EmploymentSector,
            Self::Salary,
            Self::RequestedAmount,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::NationalId => "national_id",
            Self::Mobile => "mobile",
            Self::Email => "email",
            Self::Age => "age",
            Self::EmploymentSector => "employment_sector",
            Self::Salary => "salary",
            Self::RequestedAmount => "requested_amount",
        }
    }
}

impl fmt::Display for ApplicationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw collaborator input. Numeric fields may arrive as JSON strings or numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFields {
    #[serde(default, deserialize_with = "string_or_number")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub national_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mobile: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub employment_sector: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub requested_amount: Option<String>,
}

impl ApplicationFields {
    /// Trimmed value for a field, `None` when absent or blank.
    pub fn value(&self, field: ApplicationField) -> Option<&str> {
        let raw = match field {
            ApplicationField::FullName => &self.full_name,
            ApplicationField::NationalId => &self.national_id,
            ApplicationField::Mobile => &self.mobile,
            ApplicationField::Email => &self.email,
            ApplicationField::Age => &self.age,
            ApplicationField::EmploymentSector => &self.employment_sector,
            ApplicationField::Salary => &self.salary,
            ApplicationField::RequestedAmount => &self.requested_amount,
        };

        raw.as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawValue {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
    }

    let raw = Option::<RawValue>::deserialize(deserializer)?;
    Ok(raw.map(|value| match value {
        RawValue::Text(text) => text,
        RawValue::Signed(number) => number.to_string(),
        RawValue::Unsigned(number) => number.to_string(),
        RawValue::Float(number) => number.to_string(),
    }))
}

/// Sector the applicant is employed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentSector {
    Private,
    Government,
    SemiGovernment,
}

impl EmploymentSector {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Government => "Government",
            Self::SemiGovernment => "Semi-government",
        }
    }

    /// Accepts the English labels in any case and separator style, plus the Arabic form labels.
    pub fn from_label(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        match trimmed {
            "قطاع خاص" => return Some(Self::Private),
            "حكومي" => return Some(Self::Government),
            "شبه حكومي" => return Some(Self::SemiGovernment),
            _ => {}
        }

        let key: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "private" | "privatesector" => Some(Self::Private),
            "government" => Some(Self::Government),
            "semigovernment" => Some(Self::SemiGovernment),
            _ => None,
        }
    }
}

/// Ten-digit Saudi national or iqama identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NationalId(String);

impl NationalId {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Only the last four digits survive, e.g. `******7890`.
    pub fn masked(&self) -> String {
        let visible = self.0.len().saturating_sub(4);
        format!("{}{}", "*".repeat(visible), &self.0[visible..])
    }
}

/// Saudi mobile number normalized to `+9665XXXXXXXX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MobileNumber(String);

impl MobileNumber {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated financing application. Only intake can construct one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationRequest {
    full_name: String,
    national_id: NationalId,
    mobile: MobileNumber,
    email: EmailAddress,
    age: u8,
    employment_sector: EmploymentSector,
    salary: u64,
    requested_amount: u64,
    received_at: DateTime<Utc>,
}

impl ApplicationRequest {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        full_name: String,
        national_id: NationalId,
        mobile: MobileNumber,
        email: EmailAddress,
        age: u8,
        employment_sector: EmploymentSector,
        salary: u64,
        requested_amount: u64,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            full_name,
            national_id,
            mobile,
            email,
            age,
            employment_sector,
            salary,
            requested_amount,
            received_at,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn national_id(&self) -> &NationalId {
        &self.national_id
    }

    pub fn mobile(&self) -> &MobileNumber {
        &self.mobile
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn employment_sector(&self) -> EmploymentSector {
        self.employment_sector
    }

    pub fn salary(&self) -> u64 {
        self.salary
    }

    pub fn requested_amount(&self) -> u64 {
        self.requested_amount
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn summary(&self) -> ApplicantSummary {
        ApplicantSummary {
            full_name: self.full_name.clone(),
            national_id: self.national_id.masked(),
            mobile: self.mobile.as_str().to_string(),
            email: self.email.as_str().to_string(),
            age: self.age,
            employment_sector: self.employment_sector.label(),
            salary: self.salary,
            requested_amount: self.requested_amount,
        }
    }
}

/// Sanitized applicant view for responses; the national id is masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantSummary {
    pub full_name: String,
    pub national_id: String,
    pub mobile: String,
    pub email: String,
    pub age: u8,
    pub employment_sector: &'static str,
    pub salary: u64,
    pub requested_amount: u64,
}

/// Automated decision for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionOutcome {
    /// No further review required; an offer is generated.
    Pass,
    /// Routed to manual fraud review; no offer at this stage.
    Refer,
}

impl DecisionOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Refer => "REFER",
        }
    }

    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which path produced the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionBasis {
    ParityRule,
    Model {
        model: String,
        threshold: f64,
        /// What the parity rule would have decided; diagnostic only.
        parity_hint: DecisionOutcome,
    },
}

impl DecisionBasis {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ParityRule => "parity_rule",
            Self::Model { .. } => "model",
        }
    }
}

/// Derived once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub outcome: DecisionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    pub basis: DecisionBasis,
}

/// What the service hands back to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionReceipt {
    pub application_id: ApplicationId,
    pub applicant: ApplicantSummary,
    pub decision: DecisionRecord,
}
