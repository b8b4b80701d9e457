//! Commerce store actions.

use crate::state::{Cart, Wishlist};
use booklane_gateway::ProductId;

/// All possible inputs to the commerce reducer.
///
/// The `Set*` variants carry authoritative server payloads and replace a
/// collection wholesale (reconciliation and rollback both use them); the
/// `Patch*` variants express the optimistic local prediction of a remote
/// mutation's effect.
#[derive(Debug, Clone, PartialEq)]
pub enum CommerceAction {
    /// Replace the cart with an authoritative copy.
    SetCart(Cart),

    /// Replace the wishlist with an authoritative copy.
    SetWishlist(Wishlist),

    /// Apply a quantity delta to one cart line.
    PatchCartLine {
        /// Product whose line is patched
        product_id: ProductId,
        /// Signed quantity change; a line driven to zero is removed
        delta: i64,
        /// Price used if the patch creates the line - the client's best
        /// guess from its product snapshot, replaced on reconciliation
        unit_price: u64,
    },

    /// Set presence of one wishlist entry.
    PatchWishlist {
        /// Product whose entry is patched
        product_id: ProductId,
        /// Desired presence
        present: bool,
    },
}
