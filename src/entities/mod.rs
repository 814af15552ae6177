pub mod blockchain_connection;
pub mod blockchain_transaction;
pub mod marketplace_item;
pub mod onboarding_record;
pub mod proposal;

pub use blockchain_connection::Entity as BlockchainConnection;
pub use blockchain_transaction::Entity as BlockchainTransaction;
pub use marketplace_item::Entity as MarketplaceItem;
pub use onboarding_record::Entity as OnboardingRecord;
pub use onboarding_record::OnboardingRole;
pub use proposal::Entity as Proposal;
pub use proposal::ProposalStatus;
