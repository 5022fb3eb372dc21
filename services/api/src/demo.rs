use crate::infra::decision_service;
use clap::Args;
use financing_intake::config::AppConfig;
use financing_intake::error::AppError;
use financing_intake::telemetry;
use financing_intake::workflows::financing::{
    ApplicationFields, ApplicationSession, DecisionBasis, DecisionReceipt, DecisionRecord,
    FinancingDecisionService, ScoringMode,
};

#[derive(Args, Debug)]
pub(crate) struct DecideArgs {
    /// Applicant full name
    #[arg(long)]
    pub(crate) full_name: String,
    /// 10-digit national id
    #[arg(long)]
    pub(crate) national_id: String,
    /// Saudi mobile number, e.g. 05XXXXXXXX or +9665XXXXXXXX
    #[arg(long)]
    pub(crate) mobile: String,
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) age: String,
    /// Private, Government or Semi-government
    #[arg(long, default_value = "Private")]
    pub(crate) employment_sector: String,
    /// Monthly salary as a whole number
    #[arg(long)]
    pub(crate) salary: String,
    #[arg(long)]
    pub(crate) requested_amount: String,
    /// Print the decision receipt as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl DecideArgs {
    fn fields(&self) -> ApplicationFields {
        ApplicationFields {
            full_name: Some(self.full_name.clone()),
            national_id: Some(self.national_id.clone()),
            mobile: Some(self.mobile.clone()),
            email: Some(self.email.clone()),
            age: Some(self.age.clone()),
            employment_sector: Some(self.employment_sector.clone()),
            salary: Some(self.salary.clone()),
            requested_amount: Some(self.requested_amount.clone()),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Monthly salary for each sample applicant (repeatable)
    #[arg(long = "salary", default_values_t = [15_000u64, 15_001])]
    pub(crate) salaries: Vec<u64>,
}

pub(crate) fn run_decide(args: DecideArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;
    let service = decision_service(&config.scoring);

    let receipt = service.submit(&args.fields())?;

    if args.json {
        match serde_json::to_string_pretty(&receipt) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Decision receipt unavailable: {err}"),
        }
    } else {
        render_scoring_mode(&service);
        render_receipt(&receipt);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;
    let service = decision_service(&config.scoring);

    println!("Financing intake demo (sensitive fields redacted)");
    render_scoring_mode(&service);

    let mut session = ApplicationSession::new();
    for salary in args.salaries {
        println!("\nApplicant with monthly salary {salary}");
        println!("  Stage: {}", session.stage());

        let request = match service.preview(&demo_fields(salary)) {
            Ok(request) => request,
            Err(err) => {
                println!("  Submission rejected: {err}");
                continue;
            }
        };
        session.begin_verification(request)?;
        println!("  Stage: {}", session.stage());

        let decision = match session.request() {
            Some(request) => service.decide(request),
            None => continue,
        };
        render_decision(&decision);
        session.record_decision(decision)?;
        println!("  Stage: {}", session.stage());

        session.finalize()?;
        println!("  Stage: {}", session.stage());
        session.close()?;
        println!("  Stage: {}", session.stage());

        session.restart();
        println!("  Restarted; stage: {}", session.stage());
    }

    Ok(())
}

fn demo_fields(salary: u64) -> ApplicationFields {
    ApplicationFields {
        full_name: Some("Mohammed Ahmed Al-Omari".to_string()),
        national_id: Some("1023456789".to_string()),
        mobile: Some("0512345678".to_string()),
        email: Some("m.alomari@example.com".to_string()),
        age: Some("34".to_string()),
        employment_sector: Some("Government".to_string()),
        salary: Some(salary.to_string()),
        requested_amount: Some("50000".to_string()),
    }
}

fn render_scoring_mode(service: &FinancingDecisionService) {
    let status = service.scoring_status();
    match (status.mode, status.model) {
        (ScoringMode::Model, Some(model)) => println!(
            "Scoring: classifier '{model}' (refer above {:.2})",
            status.threshold
        ),
        _ => println!("Scoring: salary parity rule"),
    }
}

fn render_receipt(receipt: &DecisionReceipt) {
    let applicant = &receipt.applicant;
    println!("Application {}", receipt.application_id.0);
    println!(
        "  Applicant: {} | national id {} | {} | age {}",
        applicant.full_name, applicant.national_id, applicant.employment_sector, applicant.age
    );
    println!(
        "  Salary {} | requested {}",
        applicant.salary, applicant.requested_amount
    );
    render_decision(&receipt.decision);
}

fn render_decision(decision: &DecisionRecord) {
    println!("  Decision: {}", decision.outcome);
    match decision.offer_amount {
        Some(offer) => println!("  Offer amount: {offer}"),
        None => println!("  Referred for manual review; no offer generated"),
    }
    match &decision.basis {
        DecisionBasis::ParityRule => println!("  Basis: salary parity rule"),
        DecisionBasis::Model {
            model,
            threshold,
            parity_hint,
        } => println!(
            "  Basis: classifier '{model}' (risk {:.3}, threshold {threshold:.2}, \
             parity rule says {parity_hint})",
            decision.risk_score.unwrap_or_default()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use financing_intake::workflows::financing::{
        DecisionConfig, DecisionEngine, DecisionOutcome, SessionStage,
    };

    #[test]
    fn demo_applicants_are_valid() {
        let service = FinancingDecisionService::new(DecisionEngine::new(DecisionConfig::default()));

        for (salary, outcome) in [
            (15_000, DecisionOutcome::Pass),
            (15_001, DecisionOutcome::Refer),
        ] {
            let request = service
                .preview(&demo_fields(salary))
                .expect("demo applicant validates");
            let mut session = ApplicationSession::new();
            session.begin_verification(request).expect("verify");
            let decision = service.decide(session.request().expect("request held"));
            session.record_decision(decision).expect("decide");
            assert_eq!(session.stage(), SessionStage::Decided(outcome));
        }
    }

    #[test]
    fn decide_args_map_onto_form_fields() {
        let args = DecideArgs {
            full_name: "Sara Al-Qahtani".to_string(),
            national_id: "2098765432".to_string(),
            mobile: "0551234567".to_string(),
            email: "sara@example.sa".to_string(),
            age: "41".to_string(),
            employment_sector: "Semi-government".to_string(),
            salary: "22000".to_string(),
            requested_amount: "120000".to_string(),
            json: false,
        };

        let fields = args.fields();
        assert_eq!(fields.salary.as_deref(), Some("22000"));
        assert_eq!(fields.employment_sector.as_deref(), Some("Semi-government"));
    }
}
