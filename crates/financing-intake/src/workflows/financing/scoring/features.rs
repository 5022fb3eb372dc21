use super::super::domain::ApplicationRequest;
use super::schema::{FeatureRow, FeatureValue};

pub const PRODUCT_TYPE: &str = "Personal Loan";

/// Every column the request can supply. The schema decides which ones the model sees.
pub fn feature_row(request: &ApplicationRequest) -> FeatureRow {
    let received = request.received_at().naive_utc();
    let mut row = FeatureRow::new();

    row.insert(
        "ApplicationID",
        FeatureValue::Categorical(format!("APP-{}", received.format("%Y%m%d%H%M%S"))),
    );
    row.insert(
        "Names ClientName",
        FeatureValue::Categorical(request.full_name().to_string()),
    );
    row.insert(
        "Phone Number",
        FeatureValue::Categorical(request.mobile().as_str().to_string()),
    );
    row.insert(
        "Email",
        FeatureValue::Categorical(request.email().as_str().to_string()),
    );
    row.insert(
        "Total Amounts",
        FeatureValue::Numeric(request.requested_amount() as f64),
    );
    row.insert(
        "Product Type",
        FeatureValue::Categorical(PRODUCT_TYPE.to_string()),
    );
    row.insert("Incident Start Date", FeatureValue::Timestamp(received));
    row.insert("Complaint Date", FeatureValue::Timestamp(received));
    row.insert("Age", FeatureValue::Numeric(f64::from(request.age())));
    row.insert(
        "Employment Sector",
        FeatureValue::Categorical(request.employment_sector().label().to_string()),
    );
    row.insert(
        "Monthly Salary",
        FeatureValue::Numeric(request.salary() as f64),
    );

    row
}
