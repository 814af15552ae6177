use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use utoipa::ToSchema;

/// Append-only donation record. Rows are never updated or removed; `id` gives append order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize, ToSchema)]
#[sea_orm(table_name = "blockchain_transactions")]
#[serde(rename_all = "camelCase")]
#[schema(as = BlockchainTransaction)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub connection_id: i32,
    pub tx_hash: String,
    pub sender: String,
    pub amount: f64, // ETH
    pub recorded_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::blockchain_connection::Entity",
        from = "Column::ConnectionId",
        to = "super::blockchain_connection::Column::Id"
    )]
    Connection,
}

impl Related<super::blockchain_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Connection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
