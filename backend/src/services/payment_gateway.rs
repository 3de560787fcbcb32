//! # Payment Gateway
//!
//! Taking the money is not this service's job. A recorded donation is
//! a pledge; the [`PaymentGateway`] decides what the donor must do next.
//!
//! The built-in [`OfflineGateway`] charges nothing:
//!
//! | Method | Instructions |
//! |--------|--------------|
//! | card | `deferred`: an external card processor completes the charge |
//! | bank | `bankTransfer`: active bank accounts + reference |
//! | crypto | `crypto`: active wallets + reference |
//!
//! A real processor plugs in by implementing the trait and handing it to
//! [`DonationService::new`](super::DonationService::new).

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::payment_details::PaymentDetailsService;
use super::payment_directory::{BankAccount, CryptoWallet};
use super::ServiceError;
use crate::db::{DocumentStore, DonationRecord, PaymentMethod};

/// What the donor has to do to complete a pledged donation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PaymentInstructions {
    /// Completed by an external processor.
    #[serde(rename_all = "camelCase")]
    Deferred { reference: String, message: String },

    #[serde(rename_all = "camelCase")]
    BankTransfer {
        reference: String,
        accounts: Vec<BankAccount>,
    },

    #[serde(rename_all = "camelCase")]
    Crypto {
        reference: String,
        wallets: Vec<CryptoWallet>,
    },
}

impl PaymentInstructions {
    pub fn reference(&self) -> &str {
        match self {
            PaymentInstructions::Deferred { reference, .. }
            | PaymentInstructions::BankTransfer { reference, .. }
            | PaymentInstructions::Crypto { reference, .. } => reference,
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn instructions(&self, donation: &DonationRecord) -> Result<PaymentInstructions, ServiceError>;
}

/// Reference donors quote with their transfer, e.g. `DON-3F2A9C1B`.
pub fn payment_reference(donation: &DonationRecord) -> String {
    let simple = donation.id.simple().to_string();
    format!("DON-{}", simple[..8].to_ascii_uppercase())
}

/// Gateway that records pledges without charging anything.
#[derive(Clone)]
pub struct OfflineGateway {
    accounts: PaymentDetailsService,
}

impl OfflineGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            accounts: PaymentDetailsService::new(store),
        }
    }
}

#[async_trait]
impl PaymentGateway for OfflineGateway {
    async fn instructions(&self, donation: &DonationRecord) -> Result<PaymentInstructions, ServiceError> {
        let reference = payment_reference(donation);
        debug!("Payment instructions for {} via {}", reference, donation.payment_method);

        Ok(match donation.payment_method {
            PaymentMethod::Card => PaymentInstructions::Deferred {
                reference,
                message: "Your card details will be processed by our payment provider.".to_string(),
            },
            PaymentMethod::Bank => PaymentInstructions::BankTransfer {
                reference,
                accounts: self.accounts.directory().await?.bank_accounts,
            },
            PaymentMethod::Crypto => PaymentInstructions::Crypto {
                reference,
                wallets: self.accounts.directory().await?.crypto_wallets,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::utils::Money;
    use chrono::Utc;
    use uuid::Uuid;

    fn donation(method: PaymentMethod) -> DonationRecord {
        DonationRecord {
            id: Uuid::parse_str("3f2a9c1b-0000-4000-8000-000000000000").unwrap(),
            project_id: None,
            name: "Jane".to_string(),
            email: "jane@example.org".to_string(),
            phone: String::new(),
            amount: Money::from_units(50),
            payment_method: method,
            message: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_offline_gateway_branches() {
        let gateway = OfflineGateway::new(Arc::new(MemoryStore::new()));

        let card = gateway.instructions(&donation(PaymentMethod::Card)).await.unwrap();
        assert!(matches!(card, PaymentInstructions::Deferred { .. }));
        assert_eq!(card.reference(), "DON-3F2A9C1B");

        match gateway.instructions(&donation(PaymentMethod::Bank)).await.unwrap() {
            PaymentInstructions::BankTransfer { accounts, .. } => assert_eq!(accounts.len(), 2),
            other => panic!("unexpected instructions: {:?}", other),
        }

        match gateway.instructions(&donation(PaymentMethod::Crypto)).await.unwrap() {
            PaymentInstructions::Crypto { wallets, .. } => assert_eq!(wallets.len(), 4),
            other => panic!("unexpected instructions: {:?}", other),
        }
    }

    #[test]
    fn test_instructions_wire_format() {
        let value = serde_json::to_value(PaymentInstructions::Deferred {
            reference: "DON-1".to_string(),
            message: "later".to_string(),
        })
        .unwrap();
        assert_eq!(value["kind"], "deferred");
        assert_eq!(value["reference"], "DON-1");
    }
}
