//! Rules deciding whether a shop slot can be bulk bought.

use crate::models::{ItemEntry, ShopContainer, SHOP_CONTAINER_SIZE, TITLE_SLOT};

/// Color prefix shop titles carry.
pub const SHOP_TITLE_COLOR: &str = "§a";
/// Suffix every shop title ends with.
pub const SHOP_TITLE_SUFFIX: &str = " Shop";
/// Marker text on the description line of an item that is for sale.
pub const PRICE_MARKER: &str = "§6Price:";

/// Whether a styled title names a shop (e.g. `§aScroll Shop`).
pub fn is_shop_title(title: &str) -> bool {
    title.starts_with(SHOP_TITLE_COLOR) && title.ends_with(SHOP_TITLE_SUFFIX)
}

/// Whether any description line contains the price marker.
pub fn has_price_marker<S: AsRef<str>>(lore: &[S]) -> bool {
    lore.iter().any(|line| line.as_ref().contains(PRICE_MARKER))
}

/// Whether `item` in `container` qualifies for bulk purchase.
///
/// Evaluated on every request; nothing about it is cached.
pub fn is_bulk_buyable(container: &ShopContainer, item: &ItemEntry) -> bool {
    container
        .title_item()
        .is_some_and(|title| is_shop_title(&title.name))
        && has_price_marker(&item.lore)
}

/// Whether a slot update announces a freshly opened shop.
///
/// Slot updates keep arriving while a shop is open, so only the title slot of a
/// full-size container with a shop title counts.
pub fn is_shop_opening(slot: usize, container: &ShopContainer) -> bool {
    slot == TITLE_SLOT
        && container.size() == SHOP_CONTAINER_SIZE
        && container
            .title_item()
            .is_some_and(|title| is_shop_title(&title.name))
}
