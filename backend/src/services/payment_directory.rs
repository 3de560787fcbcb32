//! Receiving accounts shown to donors who pay by bank transfer or crypto.
//!
//! Built from active `payment_details` records. When the store has no
//! record of a kind, the foundation's built-in accounts are used so the
//! bank and crypto views are never empty.

use serde::{Deserialize, Serialize};

use crate::db::{PaymentDetailsRecord, PaymentKind};

/// A bank account donors can transfer to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    /// `usd`, `eur`, ...
    pub currency: String,
    pub account_name: String,
    pub account_number: String,
    /// Empty for accounts without one (e.g. EUR).
    pub routing_number: String,
    pub bank_name: String,
    pub swift: String,
    pub iban: String,
}

/// A wallet donors can send crypto to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CryptoWallet {
    /// `bitcoin`, `ethereum`, `usdt`, `usdc`, ...
    pub currency: String,
    /// `BTC`, `ETH`, `ERC20`, ...
    pub network: String,
    pub address: String,
}

impl CryptoWallet {
    /// Label used by the copy button, e.g. "Bitcoin address", "USDT address".
    pub fn label(&self) -> String {
        let name = match self.currency.as_str() {
            "bitcoin" => "Bitcoin".to_string(),
            "ethereum" => "Ethereum".to_string(),
            other => other.to_ascii_uppercase(),
        };
        format!("{} address", name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDirectory {
    pub bank_accounts: Vec<BankAccount>,
    pub crypto_wallets: Vec<CryptoWallet>,
}

impl PaymentDirectory {
    /// The foundation's default receiving accounts.
    pub fn builtin() -> Self {
        let evm_wallet = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb5";
        Self {
            bank_accounts: vec![
                BankAccount {
                    currency: "usd".to_string(),
                    account_name: "HopeForUA Foundation".to_string(),
                    account_number: "1234567890".to_string(),
                    routing_number: "987654321".to_string(),
                    bank_name: "International Trust Bank".to_string(),
                    swift: "ITBANKUS33".to_string(),
                    iban: "US33ITBK0000123456789012".to_string(),
                },
                BankAccount {
                    currency: "eur".to_string(),
                    account_name: "HopeForUA Foundation".to_string(),
                    account_number: "EU9876543210".to_string(),
                    routing_number: String::new(),
                    bank_name: "European Union Bank".to_string(),
                    swift: "EUBANKDE33".to_string(),
                    iban: "DE89370400440532013000".to_string(),
                },
            ],
            crypto_wallets: vec![
                CryptoWallet {
                    currency: "bitcoin".to_string(),
                    network: "BTC".to_string(),
                    address: "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh".to_string(),
                },
                CryptoWallet {
                    currency: "ethereum".to_string(),
                    network: "ETH".to_string(),
                    address: evm_wallet.to_string(),
                },
                CryptoWallet {
                    currency: "usdt".to_string(),
                    network: "ERC20".to_string(),
                    address: evm_wallet.to_string(),
                },
                CryptoWallet {
                    currency: "usdc".to_string(),
                    network: "ERC20".to_string(),
                    address: evm_wallet.to_string(),
                },
            ],
        }
    }

    /// Build from stored records, ignoring inactive ones. Kinds with no
    /// active record fall back to [`PaymentDirectory::builtin`].
    pub fn from_records(records: &[PaymentDetailsRecord]) -> Self {
        let active = || records.iter().filter(|r| r.is_active);

        let mut bank_accounts: Vec<BankAccount> = active()
            .filter(|r| r.kind == PaymentKind::Bank)
            .map(|r| BankAccount {
                currency: r.currency.clone(),
                account_name: r.account_name.clone(),
                account_number: r.account_number.clone(),
                routing_number: r.routing_number.clone(),
                bank_name: r.bank_name.clone(),
                swift: r.swift.clone(),
                iban: r.iban.clone(),
            })
            .collect();

        let mut crypto_wallets: Vec<CryptoWallet> = active()
            .filter(|r| r.kind == PaymentKind::Crypto)
            .map(|r| CryptoWallet {
                currency: r.currency.clone(),
                network: r.network.clone(),
                address: r.wallet_address.clone(),
            })
            .collect();

        if bank_accounts.is_empty() || crypto_wallets.is_empty() {
            let builtin = Self::builtin();
            if bank_accounts.is_empty() {
                bank_accounts = builtin.bank_accounts;
            }
            if crypto_wallets.is_empty() {
                crypto_wallets = builtin.crypto_wallets;
            }
        }

        Self {
            bank_accounts,
            crypto_wallets,
        }
    }
}
