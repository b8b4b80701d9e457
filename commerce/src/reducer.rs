//! The commerce reducer.

use crate::actions::CommerceAction;
use crate::state::CommerceState;
use booklane_core::reducer::Reducer;

/// Pure state-transition logic for cart and wishlist.
///
/// Deterministic and total: every action applies entirely or not at all,
/// so readers never observe a half-applied mutation. Replacing a
/// collection with a server payload also marks it hydrated, which is what
/// makes lazy loading converge.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommerceReducer;

impl Reducer for CommerceReducer {
    type State = CommerceState;
    type Action = CommerceAction;

    fn reduce(&self, state: &mut CommerceState, action: CommerceAction) {
        match action {
            CommerceAction::SetCart(cart) => {
                state.cart = cart;
                state.cart_loaded = true;
            },
            CommerceAction::SetWishlist(wishlist) => {
                state.wishlist = wishlist;
                state.wishlist_loaded = true;
            },
            CommerceAction::PatchCartLine {
                product_id,
                delta,
                unit_price,
            } => {
                state.cart.apply_delta(&product_id, delta, unit_price);
            },
            CommerceAction::PatchWishlist {
                product_id,
                present,
            } => {
                state.wishlist.set_present(&product_id, present);
            },
        }
    }
}
