//! Static sample records served when a live read cannot be satisfied.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::entities::{onboarding_record, proposal, OnboardingRole, ProposalStatus};

// Stable id so clients can recognise sample data.
pub const MOCK_RECORD_ID: Uuid = Uuid::nil();

fn sample_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0)
        .single()
        .unwrap_or_default()
}

pub fn onboarding(role: OnboardingRole, user_id: &str) -> onboarding_record::Model {
    let profile = match role {
        OnboardingRole::Student => json!({
            "fullName": "Sample Student",
            "email": "student@example.com",
            "educationLevel": "undergraduate",
            "fieldOfStudy": "Computer Science",
            "institution": "Example University",
            "careerGoals": ["Software Engineer", "Data Scientist"],
            "skills": ["JavaScript", "Python", "SQL"]
        }),
        OnboardingRole::Investor => json!({
            "fullName": "Sample Investor",
            "email": "investor@example.com",
            "organization": "Example Ventures",
            "investmentFocus": ["EdTech", "Skills Training"],
            "ticketSize": 5000
        }),
    };

    onboarding_record::Model {
        id: MOCK_RECORD_ID,
        user_id: user_id.to_string(),
        role,
        profile,
        additional_data: json!({}),
        created_at: sample_timestamp(),
    }
}

pub fn proposal() -> proposal::Model {
    proposal::Model {
        id: MOCK_RECORD_ID,
        user_id: None,
        personal_info: json!({
            "firstName": "Sample",
            "lastName": "Applicant",
            "email": "applicant@example.com"
        }),
        funding_goal: json!({
            "amount": 10000,
            "currency": "USD",
            "purpose": "Tuition for a one-year data science programme",
            "timeline": "12 months"
        }),
        financial_info: Some(json!({ "annualIncome": 0, "familyIncome": 24000 })),
        essays: None,
        documents: None,
        status: ProposalStatus::Submitted,
        created_at: sample_timestamp(),
        updated_at: sample_timestamp(),
    }
}
