//! Item and container data handed to the core by the client layer.

use serde::{Deserialize, Serialize};

/// Slot that carries the shop's title item.
pub const TITLE_SLOT: usize = 4;

/// Number of slots a shop container declares (a double chest).
pub const SHOP_CONTAINER_SIZE: usize = 54;

/// An item as the shop presents it: a styled display name plus its description lines.
///
/// Styled text keeps the `§`-prefixed formatting codes verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    /// Styled display name (e.g. `§aScroll Shop`).
    pub name: String,
    /// Styled description lines, top to bottom.
    #[serde(default)]
    pub lore: Vec<String>,
}

impl ItemEntry {
    /// Build an entry from a name and description lines.
    pub fn new(name: impl Into<String>, lore: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lore,
        }
    }

    /// Display name with formatting codes removed.
    pub fn plain_name(&self) -> String {
        strip_formatting(&self.name)
    }
}

/// An open container as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopContainer {
    /// Server-assigned container id used to address clicks.
    pub id: i32,
    /// Slot contents in index order.
    pub slots: Vec<Option<ItemEntry>>,
}

impl ShopContainer {
    /// Build a container from its id and slot contents.
    pub fn new(id: i32, slots: Vec<Option<ItemEntry>>) -> Self {
        Self { id, slots }
    }

    /// Declared slot count.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Item in `slot`, if the slot exists and is occupied.
    pub fn item(&self, slot: usize) -> Option<&ItemEntry> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Item in the title slot.
    pub fn title_item(&self) -> Option<&ItemEntry> {
        self.item(TITLE_SLOT)
    }
}

/// How a slot was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickKind {
    /// Plain left click.
    Left,
    /// Plain right click; shops treat it as "buy one".
    Right,
    /// Shift-click.
    QuickMove,
}

/// Remove `§x` formatting codes from styled text.
pub fn strip_formatting(styled: &str) -> String {
    let mut plain = String::with_capacity(styled.len());
    let mut chars = styled.chars();
    while let Some(ch) = chars.next() {
        if ch == '§' {
            chars.next();
            continue;
        }
        plain.push(ch);
    }
    plain
}
