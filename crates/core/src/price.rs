//! Price extraction and rewriting for shop description lines.
//!
//! Shop items carry their cost on a single styled line such as
//! `§6 - §a✔ §f32§7²`: a gold dash, a green check (or red cross when the player
//! cannot afford it), the amount in white and a grey unit suffix. The template is
//! matched exactly; anything else reads as "no price" so a format change upstream
//! fails closed instead of producing garbage numbers.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::BulkBuyError;

/// Color code applied to rewritten (bulk) prices.
pub const BULK_BUY_ACTIVE_COLOR: &str = "§a";

const AFFORDABLE_GLYPH: &str = "a✔";
const UNAFFORDABLE_GLYPH: &str = "c✖";

static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"§6 - §(?P<glyph>c✖|a✔) §f(?P<color>§[0-9a-fk-or])?(?P<price>\d+)§7²")
        .expect("invalid price regex")
});

/// Price found on one line, with the byte ranges needed to rewrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLine {
    /// Parsed amount.
    pub price: u64,
    /// Whether the line currently shows the affordable glyph.
    pub affordable: bool,
    glyph: Range<usize>,
    amount: Range<usize>,
}

impl PriceLine {
    /// Match `line` against the price template.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = PRICE_RE.captures(line)?;
        Self::from_captures(&caps)
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let glyph = caps.name("glyph")?;
        let price = caps.name("price")?;
        // An existing color code in front of the amount is replaced together with it.
        let amount_start = caps.name("color").map_or(price.start(), |color| color.start());
        Some(Self {
            price: price.as_str().parse().ok()?,
            affordable: glyph.as_str() == AFFORDABLE_GLYPH,
            glyph: glyph.range(),
            amount: amount_start..price.end(),
        })
    }

    /// Render `line` with the amount replaced by `new_price` in the active color,
    /// and the glyph switched to the red cross when `affordable` is false.
    pub fn render(&self, line: &str, new_price: u64, affordable: bool) -> String {
        let glyph = if affordable {
            &line[self.glyph.clone()]
        } else {
            UNAFFORDABLE_GLYPH
        };

        let mut rewritten = String::with_capacity(line.len() + 8);
        rewritten.push_str(&line[..self.glyph.start]);
        rewritten.push_str(glyph);
        rewritten.push_str(&line[self.glyph.end..self.amount.start]);
        rewritten.push_str(BULK_BUY_ACTIVE_COLOR);
        rewritten.push_str(&new_price.to_string());
        rewritten.push_str(&line[self.amount.end..]);
        rewritten
    }
}

/// Parse the unit price from a single description line.
pub fn extract_price(line: &str) -> Option<u64> {
    PriceLine::parse(line).map(|parsed| parsed.price)
}

/// Find the item price in a full description.
///
/// Lines are scanned bottom-up since prices sit at the end of shop tooltips, so a
/// later line wins over an earlier duplicate.
pub fn find_item_price<S: AsRef<str>>(lore: &[S]) -> Result<u64, BulkBuyError> {
    lore.iter()
        .rev()
        .find_map(|line| extract_price(line.as_ref()))
        .ok_or_else(|| BulkBuyError::PriceNotFound {
            item: lore
                .first()
                .map(|line| line.as_ref().to_string())
                .unwrap_or_default(),
        })
}

/// Rewrite a price line with `new_price`; `None` if the line is not a price line.
pub fn rewrite_line(line: &str, new_price: u64, affordable: bool) -> Option<String> {
    PriceLine::parse(line).map(|parsed| parsed.render(line, new_price, affordable))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "§6 - §a✔ §f32§7²";

    #[test]
    fn extracts_price_from_template() {
        assert_eq!(extract_price(LINE), Some(32));
        assert_eq!(extract_price("§6 - §c✖ §f1500§7²"), Some(1500));
        assert_eq!(extract_price("  §6 - §a✔ §f7§7² (each)"), Some(7));
    }

    #[test]
    fn rejects_lines_outside_template() {
        assert_eq!(extract_price("§6Price:"), None);
        assert_eq!(extract_price("§6 - §a✔ §f§7²"), None);
        assert_eq!(extract_price("- ✔ 32²"), None);
        assert_eq!(extract_price("§6 - §e✔ §f32§7²"), None);
        assert_eq!(extract_price("§6 - §a✔ §f99999999999999999999999§7²"), None);
    }

    #[test]
    fn backward_scan_prefers_later_lines() {
        let lore = vec![
            "§fRecall Scroll".to_string(),
            "§6 - §a✔ §f10§7²".to_string(),
            "§7Teleports you home".to_string(),
            "§6Price:".to_string(),
            "§6 - §a✔ §f25§7²".to_string(),
        ];
        assert_eq!(find_item_price(&lore), Ok(25));
    }

    #[test]
    fn missing_price_names_the_item() {
        let lore = ["§fRecall Scroll", "§7No cost listed"];
        assert_eq!(
            find_item_price(&lore),
            Err(BulkBuyError::PriceNotFound {
                item: "§fRecall Scroll".to_string()
            })
        );
        let empty: [&str; 0] = [];
        assert!(find_item_price(&empty).is_err());
    }

    #[test]
    fn rewrite_keeps_surrounding_text() {
        let rewritten = rewrite_line(LINE, 128, true).expect("price line");
        assert_eq!(rewritten, "§6 - §a✔ §f§a128§7²");

        let rewritten = rewrite_line("> §6 - §a✔ §f32§7² <", 64, true).expect("price line");
        assert_eq!(rewritten, "> §6 - §a✔ §f§a64§7² <");
    }

    #[test]
    fn rewrite_swaps_glyph_when_unaffordable() {
        let rewritten = rewrite_line(LINE, 128, false).expect("price line");
        assert_eq!(rewritten, "§6 - §c✖ §f§a128§7²");
        assert_eq!(rewrite_line("§7lore", 1, true), None);
    }

    #[test]
    fn rewritten_line_parses_back() {
        for price in [0, 1, 32, 4096, u64::from(u32::MAX)] {
            let rewritten = rewrite_line(LINE, price, true).expect("price line");
            assert_eq!(extract_price(&rewritten), Some(price));
            let twice = rewrite_line(&rewritten, price + 1, true).expect("price line");
            assert_eq!(extract_price(&twice), Some(price + 1));
            assert!(!twice.contains("§a§a"));
        }
    }
}
