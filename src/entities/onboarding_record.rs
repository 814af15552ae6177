use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Deserialize, Serialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum OnboardingRole {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "investor")]
    Investor,
}

impl OnboardingRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingRole::Student => "student",
            OnboardingRole::Investor => "investor",
        }
    }
}

impl fmt::Display for OnboardingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OnboardingRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(OnboardingRole::Student),
            "investor" => Ok(OnboardingRole::Investor),
            other => Err(format!("unknown onboarding role '{}'", other)),
        }
    }
}

/// Profile captured once during signup, keyed by the identity provider's user id.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize, ToSchema)]
#[sea_orm(table_name = "onboarding_records")]
#[serde(rename_all = "camelCase")]
#[schema(as = OnboardingRecord)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub user_id: String,
    pub role: OnboardingRole,
    #[schema(value_type = Object)]
    pub profile: Json,
    // Whatever else the form sent
    #[schema(value_type = Object)]
    pub additional_data: Json,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
