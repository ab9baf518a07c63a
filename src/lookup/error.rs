use crate::framework::StoreError;
use crate::model::OrderUid;
use std::time::Duration;

/// Errors returned by [`OrderLookup`](crate::lookup::OrderLookup).
///
/// Not-found and unavailable are kept apart so callers can answer "no such order" and
/// "try again later" differently.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("Order not found: {0}")]
    NotFound(OrderUid),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("Store did not answer within {0:?}")]
    StoreTimeout(Duration),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }

    /// True for store failures and store timeouts alike.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            LookupError::StoreUnavailable(_) | LookupError::StoreTimeout(_)
        )
    }
}
