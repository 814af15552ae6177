//! Persistence operations over the entity tables.
//!
//! Every write takes the raw JSON document, validates it against the entity's
//! schema and only then maps it onto an `ActiveModel`.

use chrono::Utc;
use sea_orm::prelude::*;
use sea_orm::{ActiveModelTrait, DatabaseConnection, QueryOrder, Set, SqlErr};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::entities::{
    blockchain_connection, blockchain_transaction, marketplace_item, onboarding_record, proposal,
    BlockchainConnection, BlockchainTransaction, MarketplaceItem, OnboardingRecord, OnboardingRole,
    Proposal, ProposalStatus,
};
use crate::error::AppError;
use crate::schemas;

/// Funding proposal as submitted by a student.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSubmission {
    pub user_id: Option<String>,
    /// firstName, lastName, email, optional phone / dateOfBirth / address
    #[schema(value_type = Object)]
    pub personal_info: Value,
    /// amount (> 0), purpose, optional currency / timeline
    #[schema(value_type = Object)]
    pub funding_goal: Value,
    #[schema(value_type = Option<Object>)]
    pub financial_info: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub essays: Option<Value>,
    /// List of `{name, url}`
    #[schema(value_type = Option<Vec<Object>>)]
    pub documents: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSubmission {
    pub user_id: String,
    /// Role specific profile form
    #[schema(value_type = Object)]
    pub profile: Value,
    #[schema(value_type = Option<Object>)]
    pub additional_data: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub proposal_id: String,
    /// Ledger proposal id, string or non-negative integer
    #[schema(value_type = String)]
    pub blockchain_proposal_id: Value,
    pub contract_address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// 0x-prefixed 32 byte hash
    pub tx_hash: String,
    /// 0x-prefixed sender address
    pub from: String,
    /// Amount in ETH
    pub amount: f64,
}

/// A ledger link together with its transactions in append order.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    #[serde(flatten)]
    pub connection: blockchain_connection::Model,
    pub transactions: Vec<blockchain_transaction::Model>,
}

fn decode<T: for<'de> Deserialize<'de>>(document: Value) -> Result<T, AppError> {
    serde_json::from_value(document).map_err(|e| AppError::InvalidRequest(e.to_string()))
}

// --- proposals ---

pub async fn insert_proposal(conn: &DatabaseConnection, document: Value) -> Result<proposal::Model, AppError> {
    schemas::validate(&schemas::PROPOSAL, &document)?;
    let submission: ProposalSubmission = decode(document)?;

    let now = Utc::now();
    let record = proposal::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(submission.user_id),
        personal_info: Set(submission.personal_info),
        funding_goal: Set(submission.funding_goal),
        financial_info: Set(submission.financial_info),
        essays: Set(submission.essays),
        documents: Set(submission.documents),
        status: Set(ProposalStatus::Submitted),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let stored = record.insert(conn).await?;
    tracing::info!(proposal_id = %stored.id, "Stored proposal");
    Ok(stored)
}

pub async fn find_proposal(conn: &DatabaseConnection, id: Uuid) -> Result<Option<proposal::Model>, AppError> {
    Ok(Proposal::find_by_id(id).one(conn).await?)
}

// --- onboarding ---

fn onboarding_schema(role: OnboardingRole) -> &'static jsonschema::Validator {
    match role {
        OnboardingRole::Student => &*schemas::STUDENT_ONBOARDING,
        OnboardingRole::Investor => &*schemas::INVESTOR_ONBOARDING,
    }
}

/// Stores the one onboarding record a user may have per role.
pub async fn insert_onboarding(
    conn: &DatabaseConnection,
    role: OnboardingRole,
    document: Value,
) -> Result<onboarding_record::Model, AppError> {
    schemas::validate(onboarding_schema(role), &document)?;
    let submission: OnboardingSubmission = decode(document)?;

    if let Some(existing) = find_onboarding(conn, role, &submission.user_id).await? {
        return Err(already_onboarded(existing)?);
    }

    let record = onboarding_record::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(submission.user_id.clone()),
        role: Set(role),
        profile: Set(submission.profile),
        additional_data: Set(submission.additional_data.unwrap_or_else(|| Value::Object(Default::default()))),
        created_at: Set(Utc::now()),
    };

    match record.insert(conn).await {
        Ok(stored) => {
            tracing::info!(user_id = %stored.user_id, role = %role, "Stored onboarding record");
            Ok(stored)
        }
        // A concurrent submission for the same user and role got there first
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            match find_onboarding(conn, role, &submission.user_id).await? {
                Some(existing) => Err(already_onboarded(existing)?),
                None => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

fn already_onboarded(existing: onboarding_record::Model) -> Result<AppError, AppError> {
    Ok(AppError::Conflict {
        message: format!(
            "{} onboarding already completed for user {}",
            existing.role, existing.user_id
        ),
        existing: serde_json::to_value(existing)?,
    })
}

pub async fn find_onboarding(
    conn: &DatabaseConnection,
    role: OnboardingRole,
    user_id: &str,
) -> Result<Option<onboarding_record::Model>, AppError> {
    Ok(OnboardingRecord::find()
        .filter(onboarding_record::Column::UserId.eq(user_id))
        .filter(onboarding_record::Column::Role.eq(role))
        .order_by_asc(onboarding_record::Column::CreatedAt)
        .one(conn)
        .await?)
}

// --- marketplace ---

pub async fn list_marketplace(conn: &DatabaseConnection) -> Result<Vec<marketplace_item::Model>, AppError> {
    Ok(MarketplaceItem::find()
        .order_by_asc(marketplace_item::Column::Id)
        .all(conn)
        .await?)
}

pub async fn find_marketplace_item(
    conn: &DatabaseConnection,
    id: i32,
) -> Result<Option<marketplace_item::Model>, AppError> {
    Ok(MarketplaceItem::find_by_id(id).one(conn).await?)
}

/// Inserts catalog entries; returns how many rows were written.
pub async fn insert_catalog(
    conn: &DatabaseConnection,
    entries: Vec<marketplace_item::CatalogEntry>,
) -> Result<usize, AppError> {
    let now = Utc::now();
    let mut inserted = 0;
    for entry in entries {
        let item = marketplace_item::ActiveModel {
            title: Set(entry.title),
            provider: Set(entry.provider),
            price: Set(entry.price),
            rating: Set(entry.rating),
            skills: Set(serde_json::to_value(entry.skills)?),
            category: Set(entry.category),
            description: Set(entry.description),
            url: Set(entry.url),
            created_at: Set(now),
            ..Default::default()
        };
        item.insert(conn).await?;
        inserted += 1;
    }
    Ok(inserted)
}

// --- blockchain linkage ---

/// Links a proposal to its ledger id. A proposal can be linked only once;
/// a second attempt fails with `Conflict` carrying the original link.
pub async fn create_connection(conn: &DatabaseConnection, document: Value) -> Result<ConnectionView, AppError> {
    schemas::validate(&schemas::CONNECTION, &document)?;
    let request: ConnectionRequest = decode(document)?;

    if let Some(existing) = find_connection(conn, &request.proposal_id).await? {
        return Err(already_linked(existing)?);
    }

    let blockchain_proposal_id = ledger_id(request.blockchain_proposal_id)?;

    let link = blockchain_connection::ActiveModel {
        proposal_id: Set(request.proposal_id.clone()),
        blockchain_proposal_id: Set(blockchain_proposal_id),
        contract_address: Set(request.contract_address),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match link.insert(conn).await {
        Ok(connection) => {
            tracing::info!(proposal_id = %connection.proposal_id, "Linked proposal to ledger");
            Ok(ConnectionView {
                connection,
                transactions: Vec::new(),
            })
        }
        // Lost a race with a concurrent link for the same proposal
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            match find_connection(conn, &request.proposal_id).await? {
                Some(existing) => Err(already_linked(existing)?),
                None => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Ledger ids are stored as strings; integral numbers such as `7` and `7.0`
/// both become `"7"`.
fn ledger_id(value: Value) -> Result<String, AppError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => {
            if let Some(id) = n.as_u64() {
                return Ok(id.to_string());
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok((f as u64).to_string()),
                _ => Err(AppError::InvalidRequest(format!(
                    "blockchainProposalId must be a non-negative integer, got {}",
                    n
                ))),
            }
        }
        other => Err(AppError::InvalidRequest(format!(
            "blockchainProposalId must be a string or integer, got {}",
            other
        ))),
    }
}

fn already_linked(existing: ConnectionView) -> Result<AppError, AppError> {
    Ok(AppError::Conflict {
        message: format!(
            "proposal {} is already linked to ledger proposal {}",
            existing.connection.proposal_id, existing.connection.blockchain_proposal_id
        ),
        existing: serde_json::to_value(existing)?,
    })
}

pub async fn find_connection(conn: &DatabaseConnection, proposal_id: &str) -> Result<Option<ConnectionView>, AppError> {
    let Some(connection) = BlockchainConnection::find()
        .filter(blockchain_connection::Column::ProposalId.eq(proposal_id))
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let transactions = connection
        .find_related(BlockchainTransaction)
        .order_by_asc(blockchain_transaction::Column::Id)
        .all(conn)
        .await?;

    Ok(Some(ConnectionView {
        connection,
        transactions,
    }))
}

/// Appends a transaction to an existing link and returns the updated view.
pub async fn append_transaction(
    conn: &DatabaseConnection,
    proposal_id: &str,
    document: Value,
) -> Result<ConnectionView, AppError> {
    schemas::validate(&schemas::TRANSACTION, &document)?;
    let request: TransactionRequest = decode(document)?;

    let connection = BlockchainConnection::find()
        .filter(blockchain_connection::Column::ProposalId.eq(proposal_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("blockchain connection for proposal {}", proposal_id)))?;

    let entry = blockchain_transaction::ActiveModel {
        connection_id: Set(connection.id),
        tx_hash: Set(request.tx_hash),
        sender: Set(request.from),
        amount: Set(request.amount),
        recorded_at: Set(Utc::now()),
        ..Default::default()
    };
    let stored = entry.insert(conn).await?;
    tracing::info!(proposal_id, tx_hash = %stored.tx_hash, amount = stored.amount, "Recorded donation");

    find_connection(conn, proposal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("blockchain connection for proposal {}", proposal_id)))
}
