//! Management of stored receiving accounts (`payment_details`).

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::payment_directory::PaymentDirectory;
use super::{optional_text, required_text, ServiceError};
use crate::db::{DocumentStore, PaymentDetailsFilter, PaymentDetailsRecord, PaymentKind};
use crate::models::{PaymentDetailsPayload, PaymentDetailsQuery};

/// Build a record from a payload, checking the fields its kind needs.
///
/// Bank accounts need an account number or an IBAN; crypto entries need
/// a wallet address.
fn build_record(
    id: Uuid,
    payload: PaymentDetailsPayload,
    created_at: chrono::DateTime<Utc>,
) -> Result<PaymentDetailsRecord, ServiceError> {
    let kind = required_text(payload.kind, "Type")?
        .parse::<PaymentKind>()
        .map_err(ServiceError::Validation)?;

    let record = PaymentDetailsRecord {
        id,
        kind,
        currency: optional_text(payload.currency).to_ascii_lowercase(),
        account_name: optional_text(payload.account_name),
        account_number: optional_text(payload.account_number),
        routing_number: optional_text(payload.routing_number),
        bank_name: optional_text(payload.bank_name),
        swift: optional_text(payload.swift),
        iban: optional_text(payload.iban),
        wallet_address: optional_text(payload.wallet_address),
        network: optional_text(payload.network),
        is_active: payload.is_active.unwrap_or(true),
        created_at,
        updated_at: Utc::now(),
    };

    match record.kind {
        PaymentKind::Bank if record.account_number.is_empty() && record.iban.is_empty() => Err(
            ServiceError::validation("Bank details need an account number or IBAN"),
        ),
        PaymentKind::Crypto if record.wallet_address.is_empty() => {
            Err(ServiceError::validation("Wallet address is required"))
        }
        _ => Ok(record),
    }
}

#[derive(Clone)]
pub struct PaymentDetailsService {
    store: Arc<dyn DocumentStore>,
}

impl PaymentDetailsService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, query: &PaymentDetailsQuery) -> Result<Vec<PaymentDetailsRecord>, ServiceError> {
        let kind = query
            .kind
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(str::parse::<PaymentKind>)
            .transpose()
            .map_err(ServiceError::Validation)?;

        let filter = PaymentDetailsFilter {
            kind,
            active_only: query.active,
        };
        Ok(self.store.list_payment_details(&filter).await?)
    }

    pub async fn create(&self, payload: PaymentDetailsPayload) -> Result<PaymentDetailsRecord, ServiceError> {
        let record = build_record(Uuid::new_v4(), payload, Utc::now())?;
        self.store.insert_payment_details(&record).await?;
        info!("🏦 Payment details created: {} ({})", record.id, record.kind.as_str());
        Ok(record)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: PaymentDetailsPayload,
    ) -> Result<PaymentDetailsRecord, ServiceError> {
        let existing = self
            .store
            .get_payment_details(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Payment details", id))?;

        let record = build_record(id, payload, existing.created_at)?;
        if !self.store.update_payment_details(&record).await? {
            return Err(ServiceError::not_found("Payment details", id));
        }
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_payment_details(id).await? {
            return Err(ServiceError::not_found("Payment details", id));
        }
        info!("Payment details deleted: {}", id);
        Ok(())
    }

    /// Accounts shown in the donation flow's bank and crypto views.
    pub async fn directory(&self) -> Result<PaymentDirectory, ServiceError> {
        let records = self
            .store
            .list_payment_details(&PaymentDetailsFilter {
                kind: None,
                active_only: true,
            })
            .await?;
        Ok(PaymentDirectory::from_records(&records))
    }
}
