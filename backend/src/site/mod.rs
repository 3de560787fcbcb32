//! # Public Site Logic
//!
//! Front-end state for the public pages, free of any rendering:
//!
//! | Module | Page element |
//! |--------|--------------|
//! | `catalog` | project cards on the donate page |
//! | `donation_flow` | catalog → form → submitted |
//! | `counter` | "TOTAL COLLECTED" banner |

pub mod catalog;
pub mod counter;
pub mod donation_flow;

use thiserror::Error;

use crate::client::ClientError;

pub use catalog::{Catalog, ProjectCard};
pub use counter::LiveCounter;
pub use donation_flow::{AmountChoice, DonationFlow, PaymentView, Stage};

/// Errors raised by the client-side state machines.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Unknown project: {0}")]
    UnknownProject(String),

    /// The operation is not available in the current view.
    #[error("Not available here: {0}")]
    WrongState(&'static str),

    #[error("{0}")]
    Invalid(String),

    #[error("Please select a payment method")]
    MissingPaymentMethod,

    #[error("Please choose an amount")]
    MissingAmount,

    #[error("Deletion needs confirmation")]
    ConfirmationRequired,

    #[error(transparent)]
    Client(#[from] ClientError),
}
