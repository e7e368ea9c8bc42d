//! Order pipeline error types.

use thiserror::Error;

use fogon_core::{AdditionId, EmailError, MoneyError, OrderNumberError, PhoneError, ProductId};

use crate::db::{BusinessConfigError, RepositoryError};

/// Broad class of a [`ServiceError`], used for HTTP mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, rejected before any storage access.
    Validation,
    /// Input is well-formed but violates a business rule.
    BusinessRule,
    /// Caller does not own the resource.
    Forbidden,
    /// Referenced entity does not exist.
    NotFound,
    /// Retries on a uniqueness conflict were exhausted.
    Contention,
    /// Storage failure; nothing was committed.
    Persistence,
}

/// Errors from the order pipeline services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Phone number is malformed.
    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] PhoneError),

    /// Email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A required field is missing or a value is out of range.
    #[error("{0}")]
    Validation(String),

    /// Quantity or amount out of range.
    #[error("invalid amount: {0}")]
    Amount(#[from] MoneyError),

    /// Delivery order without a usable address.
    #[error("delivery orders require a delivery address")]
    MissingDeliveryAddress,

    /// A requested product or addition is unknown, inactive or unavailable.
    #[error("some items are no longer available")]
    CatalogUnavailable {
        products: Vec<ProductId>,
        additions: Vec<AdditionId>,
    },

    /// The resource belongs to another customer.
    #[error("forbidden")]
    Forbidden,

    /// The entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Gave up after repeated uniqueness conflicts.
    #[error("too much contention on {0}, try again")]
    Contention(&'static str),

    /// Order numbering failed.
    #[error("order number error: {0}")]
    OrderNumber(#[from] OrderNumberError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Business configuration could not be read.
    #[error("business config error: {0}")]
    BusinessConfig(#[from] BusinessConfigError),
}

impl ServiceError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPhone(_)
            | Self::InvalidEmail(_)
            | Self::Validation(_)
            | Self::Amount(MoneyError::NonPositiveQuantity(_) | MoneyError::QuantityTooLarge(_)) => {
                ErrorKind::Validation
            }
            // Totals are summed after the catalog read, so an overflow is not a
            // pre-storage input check.
            Self::Amount(MoneyError::Overflow)
            | Self::MissingDeliveryAddress
            | Self::CatalogUnavailable { .. } => ErrorKind::BusinessRule,
            Self::Forbidden => ErrorKind::Forbidden,
            Self::NotFound(_) | Self::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            Self::Contention(_) => ErrorKind::Contention,
            Self::OrderNumber(_) | Self::Repository(_) | Self::BusinessConfig(_) => {
                ErrorKind::Persistence
            }
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
