//! Declarative document shapes for every persisted entity.
//!
//! Two layers guard a write: handlers first check that a fixed, ordered list
//! of required fields is present (`first_missing`), then the persistence layer
//! validates the whole document against its JSON schema (`validate`), which
//! reports every violation with its field path.

use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::error::{AppError, FieldViolation};

pub const PROPOSAL_REQUIRED: &[&str] = &[
    "personalInfo",
    "fundingGoal",
    "personalInfo.firstName",
    "personalInfo.lastName",
    "personalInfo.email",
    "fundingGoal.amount",
    "fundingGoal.purpose",
];

pub const STUDENT_REQUIRED: &[&str] = &[
    "userId",
    "profile",
    "profile.fullName",
    "profile.email",
    "profile.educationLevel",
];

pub const INVESTOR_REQUIRED: &[&str] = &[
    "userId",
    "profile",
    "profile.fullName",
    "profile.email",
    "profile.organization",
];

pub const CONNECTION_REQUIRED: &[&str] = &["proposalId", "blockchainProposalId"];

pub const TRANSACTION_REQUIRED: &[&str] = &["txHash", "from", "amount"];

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const ADDRESS_PATTERN: &str = "^0x[0-9a-fA-F]{40}$";
const TX_HASH_PATTERN: &str = "^0x[0-9a-fA-F]{64}$";

pub static PROPOSAL: Lazy<Validator> = Lazy::new(|| {
    compile(json!({
        "type": "object",
        "required": ["personalInfo", "fundingGoal"],
        "properties": {
            "userId": { "type": ["string", "null"], "minLength": 1 },
            "personalInfo": {
                "type": "object",
                "required": ["firstName", "lastName", "email"],
                "properties": {
                    "firstName": { "type": "string", "minLength": 1, "maxLength": 100 },
                    "lastName": { "type": "string", "minLength": 1, "maxLength": 100 },
                    "email": { "type": "string", "pattern": EMAIL_PATTERN },
                    "phone": { "type": "string", "maxLength": 32 },
                    "dateOfBirth": { "type": "string" },
                    "address": { "type": ["object", "string"] }
                }
            },
            "fundingGoal": {
                "type": "object",
                "required": ["amount", "purpose"],
                "properties": {
                    "amount": { "type": "number", "exclusiveMinimum": 0 },
                    "currency": { "type": "string", "enum": ["USD", "ETH", "INR", "EUR"] },
                    "purpose": { "type": "string", "minLength": 1, "maxLength": 2000 },
                    "timeline": { "type": "string" }
                }
            },
            "financialInfo": {
                "type": ["object", "null"],
                "properties": {
                    "annualIncome": { "type": "number", "minimum": 0 },
                    "familyIncome": { "type": "number", "minimum": 0 },
                    "existingLoans": { "type": "number", "minimum": 0 }
                }
            },
            "essays": { "type": ["object", "null"] },
            "documents": {
                "type": ["array", "null"],
                "items": {
                    "type": "object",
                    "required": ["name", "url"],
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "url": { "type": "string", "minLength": 1 }
                    }
                }
            }
        }
    }))
});

pub static STUDENT_ONBOARDING: Lazy<Validator> = Lazy::new(|| {
    compile(onboarding_schema(json!({
        "type": "object",
        "required": ["fullName", "email", "educationLevel"],
        "properties": {
            "fullName": { "type": "string", "minLength": 1 },
            "email": { "type": "string", "pattern": EMAIL_PATTERN },
            "educationLevel": {
                "type": "string",
                "enum": ["high_school", "undergraduate", "graduate", "postgraduate", "other"]
            },
            "fieldOfStudy": { "type": "string" },
            "institution": { "type": "string" },
            "careerGoals": { "type": "array", "items": { "type": "string" } },
            "skills": { "type": "array", "items": { "type": "string" } }
        }
    })))
});

pub static INVESTOR_ONBOARDING: Lazy<Validator> = Lazy::new(|| {
    compile(onboarding_schema(json!({
        "type": "object",
        "required": ["fullName", "email", "organization"],
        "properties": {
            "fullName": { "type": "string", "minLength": 1 },
            "email": { "type": "string", "pattern": EMAIL_PATTERN },
            "organization": { "type": "string", "minLength": 1 },
            "investmentFocus": { "type": "array", "items": { "type": "string" } },
            "ticketSize": { "type": "number", "minimum": 0 },
            "walletAddress": { "type": "string", "pattern": ADDRESS_PATTERN }
        }
    })))
});

pub static CONNECTION: Lazy<Validator> = Lazy::new(|| {
    compile(json!({
        "type": "object",
        "required": ["proposalId", "blockchainProposalId"],
        "properties": {
            "proposalId": { "type": "string", "minLength": 1 },
            "blockchainProposalId": { "type": ["string", "integer"], "minLength": 1, "minimum": 0 },
            "contractAddress": { "type": ["string", "null"], "pattern": ADDRESS_PATTERN }
        }
    }))
});

pub static TRANSACTION: Lazy<Validator> = Lazy::new(|| {
    compile(json!({
        "type": "object",
        "required": ["txHash", "from", "amount"],
        "properties": {
            "txHash": { "type": "string", "pattern": TX_HASH_PATTERN },
            "from": { "type": "string", "pattern": ADDRESS_PATTERN },
            "amount": { "type": "number", "exclusiveMinimum": 0 }
        }
    }))
});

fn onboarding_schema(profile: Value) -> Value {
    json!({
        "type": "object",
        "required": ["userId", "profile"],
        "properties": {
            "userId": { "type": "string", "minLength": 1 },
            "profile": profile,
            "additionalData": { "type": ["object", "null"] }
        }
    })
}

fn compile(schema: Value) -> Validator {
    jsonschema::validator_for(&schema).expect("built-in document schema must compile")
}

/// Returns the first entry of `required` that is absent, null or an empty string.
pub fn first_missing<'a>(document: &Value, required: &[&'a str]) -> Option<&'a str> {
    required
        .iter()
        .copied()
        .find(|path| !is_present(lookup(document, path)))
}

/// Fails with `MissingField` naming the first absent requirement.
pub fn require_fields(document: &Value, required: &[&str]) -> Result<(), AppError> {
    match first_missing(document, required) {
        Some(field) => Err(AppError::MissingField(field.to_string())),
        None => Ok(()),
    }
}

fn lookup<'v>(document: &'v Value, dotted: &str) -> Option<&'v Value> {
    dotted
        .split('.')
        .try_fold(document, |node, key| node.get(key))
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Collects every violation of `schema` in `document`.
pub fn violations(schema: &Validator, document: &Value) -> Vec<FieldViolation> {
    schema
        .iter_errors(document)
        .map(|err| {
            let mut field = pointer_to_dotted(&err.instance_path.to_string());
            if let ValidationErrorKind::Required { property } = &err.kind {
                let property = property.as_str().map(str::to_string).unwrap_or_else(|| property.to_string());
                field = if field.is_empty() {
                    property
                } else {
                    format!("{}.{}", field, property)
                };
            }
            FieldViolation {
                field,
                message: err.to_string(),
            }
        })
        .collect()
}

/// Fails with `SchemaValidation` listing every violation, if any.
pub fn validate(schema: &Validator, document: &Value) -> Result<(), AppError> {
    let found = violations(schema, document);
    if found.is_empty() {
        Ok(())
    } else {
        Err(AppError::SchemaValidation(found))
    }
}

fn pointer_to_dotted(pointer: &str) -> String {
    pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_proposal() -> Value {
        json!({
            "personalInfo": { "firstName": "Asha", "lastName": "Rao", "email": "asha@example.com" },
            "fundingGoal": { "amount": 12000, "currency": "USD", "purpose": "MSc tuition" }
        })
    }

    #[test]
    fn first_missing_reports_in_declared_order() {
        let mut doc = complete_proposal();
        doc["personalInfo"]["email"] = Value::Null;
        doc["fundingGoal"]
            .as_object_mut()
            .unwrap()
            .remove("purpose");

        assert_eq!(first_missing(&doc, PROPOSAL_REQUIRED), Some("personalInfo.email"));
    }

    #[test]
    fn missing_parent_is_reported_before_children() {
        let doc = json!({ "fundingGoal": { "amount": 1, "purpose": "books" } });
        assert_eq!(first_missing(&doc, PROPOSAL_REQUIRED), Some("personalInfo"));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let mut doc = complete_proposal();
        doc["personalInfo"]["lastName"] = json!("   ");
        assert_eq!(first_missing(&doc, PROPOSAL_REQUIRED), Some("personalInfo.lastName"));
    }

    #[test]
    fn complete_proposal_passes_both_layers() {
        let doc = complete_proposal();
        assert!(require_fields(&doc, PROPOSAL_REQUIRED).is_ok());
        assert!(validate(&PROPOSAL, &doc).is_ok());
    }

    #[test]
    fn schema_violations_carry_field_paths() {
        let mut doc = complete_proposal();
        doc["fundingGoal"]["amount"] = json!(-5);
        doc["personalInfo"]["email"] = json!("not-an-email");

        let found = violations(&PROPOSAL, &doc);
        let fields: Vec<&str> = found.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"fundingGoal.amount"));
        assert!(fields.contains(&"personalInfo.email"));
    }

    #[test]
    fn required_violation_names_the_property() {
        let doc = json!({ "userId": "user_1", "profile": { "fullName": "Kim", "email": "kim@example.com" } });
        let found = violations(&STUDENT_ONBOARDING, &doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field, "profile.educationLevel");
    }

    #[test]
    fn transaction_schema_checks_hash_and_sender_format() {
        let doc = json!({ "txHash": "0x1234", "from": "0xabc", "amount": 0.5 });
        let found = violations(&TRANSACTION, &doc);
        let mut fields: Vec<&str> = found.iter().map(|v| v.field.as_str()).collect();
        fields.sort_unstable();
        assert_eq!(fields, vec!["from", "txHash"]);
    }
}
