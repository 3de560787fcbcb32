//! # Donation Flow
//!
//! State of the public donate page.
//!
//! ```text
//!            select_project / choose_general_fund
//!  Catalog ────────────────────────────────────────► Form
//!     ▲                                               │
//!     └──────────────── back_to_catalog ──────────────┤
//!                                                     │ submit
//!                                                     ▼
//!                                                 Submitted
//! ```
//!
//! `/donate?project=<id>` opens straight into the form when the id is in
//! the catalog.

use actix_web::web;
use serde::Deserialize;
use tracing::{debug, info};

use super::catalog::Catalog;
use super::FlowError;
use crate::client::DonationApi;
use crate::db::{PaymentMethod, ProjectRecord};
use crate::models::{DonationReceipt, DonationRequest};
use crate::services::{BankAccount, CryptoWallet, PaymentDirectory};
use crate::utils::Money;

/// Amount buttons, in dollars.
pub const PRESET_AMOUNTS: [i64; 6] = [25, 50, 100, 250, 500, 1000];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Catalog,
    Form,
    Submitted,
}

/// The amount picker. A preset and a custom amount never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AmountChoice {
    #[default]
    None,
    Preset(i64),
    /// Text as typed.
    Custom(String),
}

/// Payment sub-view under the method buttons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaymentView<'a> {
    Hidden,
    CardForm,
    BankAccounts(&'a [BankAccount]),
    CryptoWallets(&'a [CryptoWallet]),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct DonateQuery {
    project: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DonationFlow {
    catalog: Catalog,
    directory: PaymentDirectory,
    stage: Stage,
    selected: Option<ProjectRecord>,
    amount: AmountChoice,
    payment_method: Option<PaymentMethod>,
    donor: DonorDetails,
    receipt: Option<DonationReceipt>,
}

impl DonationFlow {
    pub fn new(catalog: Catalog, directory: PaymentDirectory) -> Self {
        Self {
            catalog,
            directory,
            stage: Stage::Catalog,
            selected: None,
            amount: AmountChoice::None,
            payment_method: None,
            donor: DonorDetails::default(),
            receipt: None,
        }
    }

    /// Start from a page query string such as `project=<id>`.
    ///
    /// A known id preselects the project and opens the form; anything
    /// else leaves the flow on the catalog.
    pub fn from_query(catalog: Catalog, directory: PaymentDirectory, query: &str) -> Self {
        let mut flow = Self::new(catalog, directory);
        let project = web::Query::<DonateQuery>::from_query(query.trim_start_matches('?'))
            .ok()
            .and_then(|q| q.into_inner().project);

        if let Some(raw) = project {
            match flow.select_project(&raw) {
                Ok(()) => debug!("Preselected project {} from query", raw),
                Err(e) => debug!("Ignoring project in query: {}", e),
            }
        }
        flow
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selected_project(&self) -> Option<&ProjectRecord> {
        self.selected.as_ref()
    }

    pub fn receipt(&self) -> Option<&DonationReceipt> {
        self.receipt.as_ref()
    }

    pub fn donor(&self) -> &DonorDetails {
        &self.donor
    }

    pub fn donor_mut(&mut self) -> &mut DonorDetails {
        &mut self.donor
    }

    pub fn select_project(&mut self, raw_id: &str) -> Result<(), FlowError> {
        let project = self
            .catalog
            .find(raw_id)
            .cloned()
            .ok_or_else(|| FlowError::UnknownProject(raw_id.to_string()))?;
        self.selected = Some(project);
        self.stage = Stage::Form;
        Ok(())
    }

    pub fn choose_general_fund(&mut self) {
        self.selected = None;
        self.stage = Stage::Form;
    }

    /// Back to the project list; the selection is cleared.
    pub fn back_to_catalog(&mut self) {
        self.selected = None;
        self.stage = Stage::Catalog;
    }

    pub fn choose_preset(&mut self, dollars: i64) -> Result<(), FlowError> {
        if !PRESET_AMOUNTS.contains(&dollars) {
            return Err(FlowError::Invalid(format!("${} is not a preset amount", dollars)));
        }
        self.amount = AmountChoice::Preset(dollars);
        Ok(())
    }

    pub fn set_custom_amount(&mut self, text: impl Into<String>) {
        self.amount = AmountChoice::Custom(text.into());
    }

    pub fn amount_choice(&self) -> &AmountChoice {
        &self.amount
    }

    /// The chosen amount, if it is a positive number.
    pub fn amount(&self) -> Option<Money> {
        let amount = match &self.amount {
            AmountChoice::None => return None,
            AmountChoice::Preset(dollars) => Money::from_units(*dollars),
            AmountChoice::Custom(text) => Money::parse(text).ok()?,
        };
        amount.is_positive().then_some(amount)
    }

    pub fn choose_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = Some(method);
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn payment_view(&self) -> PaymentView<'_> {
        match self.payment_method {
            None => PaymentView::Hidden,
            Some(PaymentMethod::Card) => PaymentView::CardForm,
            Some(PaymentMethod::Bank) => PaymentView::BankAccounts(&self.directory.bank_accounts),
            Some(PaymentMethod::Crypto) => PaymentView::CryptoWallets(&self.directory.crypto_wallets),
        }
    }

    /// Whether the submit button is enabled.
    pub fn can_submit(&self) -> bool {
        self.stage == Stage::Form && self.amount().is_some() && self.payment_method.is_some()
    }

    pub fn submit_label(&self) -> &'static str {
        match self.payment_method {
            Some(PaymentMethod::Card) => "Complete Donation",
            _ => "Confirm Donation Details",
        }
    }

    pub fn heading(&self) -> String {
        match &self.selected {
            Some(project) => format!("Support: {}", project.title),
            None => "Make a Donation".to_string(),
        }
    }

    /// The request the form would send.
    pub fn build_request(&self) -> Result<DonationRequest, FlowError> {
        if self.stage != Stage::Form {
            return Err(FlowError::WrongState("the donation form is not open"));
        }
        let payment_method = self.payment_method.ok_or(FlowError::MissingPaymentMethod)?;
        let amount = self.amount().ok_or(FlowError::MissingAmount)?;
        if self.donor.name.trim().is_empty() {
            return Err(FlowError::Invalid("Full name is required".to_string()));
        }
        if !self.donor.email.contains('@') {
            return Err(FlowError::Invalid("A valid email address is required".to_string()));
        }

        let optional = |s: &str| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        Ok(DonationRequest {
            project_id: Some(
                self.selected
                    .as_ref()
                    .map(|p| p.id.to_string())
                    .unwrap_or_else(|| "general".to_string()),
            ),
            name: Some(self.donor.name.trim().to_string()),
            email: Some(self.donor.email.trim().to_string()),
            phone: optional(&self.donor.phone),
            amount: Some(amount),
            payment_method: Some(payment_method.as_str().to_string()),
            message: optional(&self.donor.message),
        })
    }

    /// Send the donation and move to `Submitted`.
    pub async fn submit<C: DonationApi + ?Sized>(&mut self, client: &C) -> Result<&DonationReceipt, FlowError> {
        let request = self.build_request()?;
        let receipt = client.create_donation(request).await?;
        info!(
            "Donation submitted: {} ({})",
            receipt.donation.id,
            receipt.instructions.reference()
        );
        self.stage = Stage::Submitted;
        Ok(self.receipt.insert(receipt))
    }

    /// Clear everything for another donation.
    pub fn start_over(&mut self) {
        self.stage = Stage::Catalog;
        self.selected = None;
        self.amount = AmountChoice::None;
        self.payment_method = None;
        self.donor = DonorDetails::default();
        self.receipt = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::client::LocalClient;
    use crate::config::AppConfig;
    use crate::db::{DocumentStore, MemoryStore};
    use crate::services::PaymentInstructions;
    use crate::AppState;

    const WATER: &str = "00000000-0000-0000-0000-000000000006";

    fn flow() -> DonationFlow {
        DonationFlow::new(Catalog::builtin(), PaymentDirectory::builtin())
    }

    #[test]
    fn test_query_preselects_known_project() {
        let flow = DonationFlow::from_query(
            Catalog::builtin(),
            PaymentDirectory::builtin(),
            &format!("?project={}", WATER),
        );
        assert_eq!(flow.stage(), Stage::Form);
        assert_eq!(flow.heading(), "Support: Clean Water Access Program");

        let unknown = DonationFlow::from_query(
            Catalog::builtin(),
            PaymentDirectory::builtin(),
            "project=42",
        );
        assert_eq!(unknown.stage(), Stage::Catalog);
        assert!(unknown.selected_project().is_none());
    }

    #[test]
    fn test_back_to_catalog_clears_selection() {
        let mut flow = flow();
        flow.select_project(WATER).unwrap();
        flow.back_to_catalog();
        assert_eq!(flow.stage(), Stage::Catalog);
        assert!(flow.selected_project().is_none());

        flow.choose_general_fund();
        assert_eq!(flow.heading(), "Make a Donation");
    }

    #[test]
    fn test_preset_and_custom_are_exclusive() {
        let mut flow = flow();
        flow.choose_preset(250).unwrap();
        assert_eq!(flow.amount(), Some(Money::from_units(250)));

        flow.set_custom_amount("75.50");
        assert_eq!(flow.amount_choice(), &AmountChoice::Custom("75.50".into()));
        assert_eq!(flow.amount(), Some(Money::from_cents(7_550)));

        flow.choose_preset(25).unwrap();
        assert_eq!(flow.amount_choice(), &AmountChoice::Preset(25));
        assert!(flow.choose_preset(30).is_err());
    }

    #[test]
    fn test_submit_enabled_needs_amount_and_method() {
        let mut flow = flow();
        flow.choose_general_fund();
        assert!(!flow.can_submit());

        flow.set_custom_amount("0");
        flow.choose_payment_method(PaymentMethod::Bank);
        assert!(!flow.can_submit());

        flow.set_custom_amount("abc");
        assert!(!flow.can_submit());

        flow.choose_preset(50).unwrap();
        assert!(flow.can_submit());
        assert_eq!(flow.submit_label(), "Confirm Donation Details");

        flow.choose_payment_method(PaymentMethod::Card);
        assert_eq!(flow.submit_label(), "Complete Donation");
    }

    #[test]
    fn test_payment_views_are_exclusive() {
        let mut flow = flow();
        assert_eq!(flow.payment_view(), PaymentView::Hidden);

        flow.choose_payment_method(PaymentMethod::Crypto);
        match flow.payment_view() {
            PaymentView::CryptoWallets(wallets) => assert_eq!(wallets.len(), 4),
            other => panic!("unexpected view: {:?}", other),
        }

        flow.choose_payment_method(PaymentMethod::Bank);
        assert!(matches!(flow.payment_view(), PaymentView::BankAccounts(_)));
    }

    #[test]
    fn test_build_request_requires_donor() {
        let mut flow = flow();
        flow.choose_general_fund();
        flow.choose_preset(100).unwrap();
        assert!(matches!(flow.build_request(), Err(FlowError::MissingPaymentMethod)));

        flow.choose_payment_method(PaymentMethod::Card);
        assert!(matches!(flow.build_request(), Err(FlowError::Invalid(_))));

        flow.donor_mut().name = "Jane Doe".into();
        flow.donor_mut().email = "jane@example.org".into();
        let request = flow.build_request().unwrap();
        assert_eq!(request.project_id.as_deref(), Some("general"));
        assert_eq!(request.payment_method.as_deref(), Some("card"));
        assert_eq!(request.phone, None);
    }

    #[tokio::test]
    async fn test_submit_records_donation() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let state = Arc::new(AppState::new(store.clone(), AppConfig::in_memory(dir.path())));
        state.seed_catalog().await.unwrap();
        let client = LocalClient::new(state);

        let mut flow = DonationFlow::from_query(Catalog::builtin(), PaymentDirectory::builtin(), &format!("project={}", WATER));
        flow.choose_preset(1000).unwrap();
        flow.choose_payment_method(PaymentMethod::Bank);
        flow.donor_mut().name = "Jane Doe".into();
        flow.donor_mut().email = "jane@example.org".into();

        let receipt = flow.submit(&client).await.unwrap();
        assert!(matches!(receipt.instructions, PaymentInstructions::BankTransfer { .. }));
        assert_eq!(flow.stage(), Stage::Submitted);

        let water = store.get_project(uuid::Uuid::parse_str(WATER).unwrap()).await.unwrap().unwrap();
        assert_eq!(water.current_amount, Money::from_units(424_000));

        flow.start_over();
        assert_eq!(flow.stage(), Stage::Catalog);
        assert!(flow.receipt().is_none());
    }

    #[tokio::test]
    async fn test_launch_catalog_donations_work_on_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::db::open_store(&crate::config::StoreBackend::Memory).await.unwrap();
        let state = Arc::new(AppState::new(store, AppConfig::in_memory(dir.path())));
        assert_eq!(state.seed_catalog().await.unwrap(), 6);
        assert_eq!(state.seed_catalog().await.unwrap(), 0);
        let client = LocalClient::new(state);

        let live = Catalog::load(&client).await.unwrap();
        assert_eq!(live.projects().len(), 6);
        assert!(live.find(WATER).is_some());

        for catalog in [Catalog::builtin(), live] {
            let mut flow = DonationFlow::from_query(catalog, PaymentDirectory::builtin(), &format!("project={}", WATER));
            flow.choose_preset(25).unwrap();
            flow.choose_payment_method(PaymentMethod::Card);
            flow.donor_mut().name = "Jane Doe".into();
            flow.donor_mut().email = "jane@example.org".into();
            flow.submit(&client).await.unwrap();
        }
    }
}
