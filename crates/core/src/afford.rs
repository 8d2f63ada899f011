//! Affordability checks shared by the purchase loop and the tooltip preview.

use crate::error::BulkBuyError;

/// Whether `balance` covers `price`.
pub fn can_afford(balance: u64, price: u64) -> bool {
    balance >= price
}

/// Like [`can_afford`] for a price that may be unknown. An unknown price never
/// reads as affordable.
pub fn can_afford_known(balance: u64, price: Option<u64>) -> bool {
    price.is_some_and(|price| can_afford(balance, price))
}

/// Turn a failed check into [`BulkBuyError::InsufficientFunds`].
pub fn ensure_affordable(balance: u64, price: Option<u64>) -> Result<(), BulkBuyError> {
    if can_afford_known(balance, price) {
        Ok(())
    } else {
        Err(BulkBuyError::InsufficientFunds {
            balance,
            price: price.unwrap_or(u64::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_must_cover_price() {
        assert!(can_afford(100, 100));
        assert!(can_afford(101, 100));
        assert!(!can_afford(50, 100));
        assert!(can_afford(0, 0));
    }

    #[test]
    fn unknown_price_is_never_affordable() {
        assert!(!can_afford_known(u64::MAX, None));
        assert!(can_afford_known(10, Some(10)));
        assert_eq!(
            ensure_affordable(50, Some(100)),
            Err(BulkBuyError::InsufficientFunds {
                balance: 50,
                price: 100
            })
        );
        assert!(ensure_affordable(5, None).is_err());
    }
}
