//! Error taxonomy for remote synchronization.
//!
//! Variants are distinguished for user-facing messaging only. Recovery is
//! always the same: revert the optimistic mutation and notify.

use thiserror::Error;

use tidepool_core::CollectionKind;

use crate::api::ApiError;

/// A failed remote operation, tagged with the collection it targeted.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fetching the authoritative collection failed.
    #[error("failed to fetch {0}")]
    Fetch(CollectionKind, #[source] ApiError),

    /// Adding a single item failed.
    #[error("failed to add to {0}")]
    Add(CollectionKind, #[source] ApiError),

    /// Updating a cart line quantity failed.
    #[error("failed to update quantity in {0}")]
    UpdateQuantity(CollectionKind, #[source] ApiError),

    /// Removing one or more items failed.
    #[error("failed to remove from {0}")]
    Remove(CollectionKind, #[source] ApiError),

    /// The login-merge bulk push failed.
    #[error("failed to push local {0} items")]
    Bulk(CollectionKind, #[source] ApiError),

    /// Clearing the whole collection failed.
    #[error("failed to clear {0}")]
    Clear(CollectionKind, #[source] ApiError),
}

impl SyncError {
    /// The collection this failure belongs to.
    #[must_use]
    pub const fn collection(&self) -> CollectionKind {
        match self {
            Self::Fetch(kind, _)
            | Self::Add(kind, _)
            | Self::UpdateQuantity(kind, _)
            | Self::Remove(kind, _)
            | Self::Bulk(kind, _)
            | Self::Clear(kind, _) => *kind,
        }
    }

    /// Short user-facing message naming the operation plus a recovery hint.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch(kind, _) => format!("Couldn't load your {kind}. Please try again."),
            Self::Add(kind, _) => format!("Couldn't add that to your {kind}. Please try again."),
            Self::UpdateQuantity(_, _) => {
                "Couldn't update the quantity. Please try again.".to_owned()
            }
            Self::Remove(kind, _) => {
                format!("Couldn't remove that from your {kind}. Please try again.")
            }
            Self::Bulk(kind, _) => format!("Some {kind} items couldn't be synced to your account."),
            Self::Clear(kind, _) => format!("Couldn't clear your {kind}. Please try again."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected() -> ApiError {
        ApiError::Rejected("nope".to_owned())
    }

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::Fetch(CollectionKind::Cart, rejected());
        assert_eq!(err.to_string(), "failed to fetch cart");

        let err = SyncError::Bulk(CollectionKind::Wishlist, rejected());
        assert_eq!(err.to_string(), "failed to push local wishlist items");
    }

    #[test]
    fn test_collection_tag() {
        let err = SyncError::Clear(CollectionKind::Wishlist, rejected());
        assert_eq!(err.collection(), CollectionKind::Wishlist);
    }

    #[test]
    fn test_user_message_names_operation() {
        let err = SyncError::Add(CollectionKind::Cart, rejected());
        assert_eq!(
            err.user_message(),
            "Couldn't add that to your cart. Please try again."
        );
    }
}
