//! Cart Models

use jiff::Timestamp;
use nexus::carts::CartTotals;
use rustc_hash::FxHashMap;

use crate::domain::{
    accounts::records::UserUuid,
    carts::records::{CartItemRecord, CartRecord, CartUuid},
    catalog::records::BusinessUuid,
};

/// Cart Model
#[derive(Debug, Clone)]
pub struct Cart {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,

    /// Lines in the order they were first added.
    pub items: Vec<CartItemRecord>,

    pub totals: CartTotals,

    /// One entry per business represented, in first-seen order.
    pub businesses: Vec<CartBusinessGroup>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Lines of a cart that belong to one business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartBusinessGroup {
    pub business_uuid: BusinessUuid,
    pub business_name: String,

    /// Number of lines, not units.
    pub item_count: usize,
}

impl Cart {
    /// Builds the read model from a cart row and its lines.
    pub(crate) fn assemble(cart: CartRecord, items: Vec<CartItemRecord>) -> Self {
        let totals =
            CartTotals::from_lines(items.iter().map(|item| (item.quantity, item.unit_price)));

        let mut businesses: Vec<CartBusinessGroup> = Vec::new();
        let mut positions: FxHashMap<BusinessUuid, usize> = FxHashMap::default();

        for item in &items {
            if let Some(group) = positions
                .get(&item.business_uuid)
                .and_then(|&position| businesses.get_mut(position))
            {
                group.item_count += 1;
                continue;
            }

            positions.insert(item.business_uuid, businesses.len());
            businesses.push(CartBusinessGroup {
                business_uuid: item.business_uuid,
                business_name: item.business_name.clone(),
                item_count: 1,
            });
        }

        Self {
            uuid: cart.uuid,
            user_uuid: cart.user_uuid,
            items,
            totals,
            businesses,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines belonging to `business`.
    pub fn items_for(&self, business: BusinessUuid) -> impl Iterator<Item = &CartItemRecord> {
        self.items
            .iter()
            .filter(move |item| item.business_uuid == business)
    }
}
