//! Tooltip price preview for bulk purchases.

use tracing::warn;

use crate::{
    afford::can_afford,
    error::BulkBuyError,
    price::{PriceLine, BULK_BUY_ACTIVE_COLOR},
};

/// Replace the first price line of `lore` with the price of `multiplier` units,
/// marking it unaffordable when `balance` does not cover it.
///
/// There is no reliable way to tell which line is the real price line (other
/// tooltip features may add lines), so the first match wins and later matches
/// are left untouched.
pub fn try_rewrite_prices(
    lore: &[String],
    multiplier: u32,
    balance: u64,
) -> Result<Vec<String>, BulkBuyError> {
    let (index, parsed) = lore
        .iter()
        .enumerate()
        .find_map(|(index, line)| PriceLine::parse(line).map(|parsed| (index, parsed)))
        .ok_or_else(|| BulkBuyError::PriceNotFound {
            item: lore.first().cloned().unwrap_or_default(),
        })?;

    let total = parsed.price.saturating_mul(u64::from(multiplier));
    let mut rewritten = lore.to_vec();
    rewritten[index] = parsed.render(&lore[index], total, can_afford(balance, total));
    Ok(rewritten)
}

/// [`try_rewrite_prices`], returning the description unchanged (with a warning)
/// when it has no price line.
pub fn rewrite_prices(lore: &[String], multiplier: u32, balance: u64) -> Vec<String> {
    match try_rewrite_prices(lore, multiplier, balance) {
        Ok(rewritten) => rewritten,
        Err(err) => {
            warn!("Tooltip {err}");
            lore.to_vec()
        }
    }
}

/// Hint lines appended under bulk-buyable items.
pub fn bulk_buy_hints(batch_size: u32) -> Vec<String> {
    vec![
        String::new(),
        format!("{BULK_BUY_ACTIVE_COLOR}Shift-click to bulk buy {batch_size}"),
        format!("{BULK_BUY_ACTIVE_COLOR}Hold Shift to preview the price of {batch_size}"),
    ]
}
