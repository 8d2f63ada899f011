//! In-memory shop standing in for the game server.

use std::{
    collections::{BTreeMap, VecDeque},
    fs,
    path::Path,
    sync::Arc,
};

use anyhow::{anyhow, bail, Context, Result};
use bulkbuy_core::{
    models::{SHOP_CONTAINER_SIZE, TITLE_SLOT},
    BalanceSource, ClickKind, ItemEntry, Notifier, PurchaseRequest, PurchaseSink, ShopContainer,
};
use chrono::{DateTime, Local};
use serde::Deserialize;
use tracing::{debug, info};

/// First slot used for wares (second row of the chest).
const FIRST_WARE_SLOT: usize = 9;
const MAX_LOG_ENTRIES: usize = 64;

/// Shop contents loaded from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalogue {
    pub title: String,
    pub balance: u64,
    pub wares: Vec<Ware>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ware {
    pub name: String,
    #[serde(default)]
    pub description: Vec<String>,
    pub price: u64,
}

impl Default for Catalogue {
    fn default() -> Self {
        let ware = |name: &str, description: &[&str], price: u64| Ware {
            name: name.to_string(),
            description: description.iter().map(|line| line.to_string()).collect(),
            price,
        };
        Self {
            title: "§aScroll Shop".to_string(),
            balance: 4_096,
            wares: vec![
                ware("§fRecall Scroll", &["§7Teleports you to the nearest town."], 32),
                ware("§bSpeed Scroll", &["§7+20% walk speed for 3 minutes."], 96),
                ware("§dDungeon Scroll", &["§7Returns you to the dungeon entrance."], 250),
                ware("§6Fortune Scroll", &["§7+10% loot bonus for 5 minutes."], 1_200),
            ],
        }
    }
}

impl Catalogue {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalogue {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse catalogue {}", path.display()))
    }
}

/// The player's side of the shop: wallet, bag and the open container.
pub struct ShopWorld {
    catalogue: Catalogue,
    balance: u64,
    bag: BTreeMap<String, u32>,
    container: Option<Arc<ShopContainer>>,
    next_container_id: i32,
}

impl ShopWorld {
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            balance: catalogue.balance,
            catalogue,
            bag: BTreeMap::new(),
            container: None,
            next_container_id: 1,
        }
    }

    pub fn container(&self) -> Option<&Arc<ShopContainer>> {
        self.container.as_ref()
    }

    pub fn bag(&self) -> &BTreeMap<String, u32> {
        &self.bag
    }

    pub fn ware_slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.catalogue.wares.len()).map(|index| FIRST_WARE_SLOT + index)
    }

    /// Open a fresh container; the server assigns a new id every time.
    pub fn open(&mut self) -> Arc<ShopContainer> {
        let id = self.next_container_id;
        self.next_container_id += 1;
        let container = Arc::new(self.build_container(id));
        info!(container_id = id, "Shop opened");
        self.container = Some(Arc::clone(&container));
        container
    }

    pub fn close(&mut self) {
        if let Some(container) = self.container.take() {
            info!(container_id = container.id, "Shop closed");
        }
    }

    /// Server-side handling of a purchase click.
    pub fn process_click(&mut self, click: &PendingClick) -> Result<String> {
        let container = self
            .container
            .as_ref()
            .filter(|container| container.id == click.container_id)
            .ok_or_else(|| anyhow!("container {} is not open", click.container_id))?;
        if click.click != ClickKind::Right {
            bail!("unsupported click {:?}", click.click);
        }
        let ware = click
            .slot
            .checked_sub(FIRST_WARE_SLOT)
            .and_then(|index| self.catalogue.wares.get(index))
            .filter(|_| container.item(click.slot).is_some())
            .ok_or_else(|| anyhow!("nothing for sale in slot {}", click.slot))?;
        if ware.price > self.balance {
            bail!("not enough money for {}", ware.name);
        }

        self.balance -= ware.price;
        *self.bag.entry(ware.name.clone()).or_default() += 1;
        debug!(slot = click.slot, price = ware.price, balance = self.balance, "Purchase settled");
        let message = format!("Bought {} for {}²", ware.name, ware.price);
        self.refresh_container();
        Ok(message)
    }

    /// Resend the open container's contents so price glyphs match the wallet.
    /// The container keeps its id, as a server slot update would.
    fn refresh_container(&mut self) {
        if let Some(id) = self.container.as_ref().map(|container| container.id) {
            self.container = Some(Arc::new(self.build_container(id)));
        }
    }

    fn build_container(&self, id: i32) -> ShopContainer {
        let mut slots = vec![None; SHOP_CONTAINER_SIZE];
        slots[TITLE_SLOT] = Some(ItemEntry::new(self.catalogue.title.clone(), Vec::new()));
        for (slot, ware) in self.ware_slots().zip(&self.catalogue.wares) {
            if slot < SHOP_CONTAINER_SIZE {
                slots[slot] = Some(self.ware_entry(ware));
            }
        }
        ShopContainer::new(id, slots)
    }

    fn ware_entry(&self, ware: &Ware) -> ItemEntry {
        let glyph = if self.balance >= ware.price { "a✔" } else { "c✖" };
        let mut lore = vec![ware.name.clone()];
        lore.extend(ware.description.iter().cloned());
        lore.push(String::new());
        lore.push("§6Price:".to_string());
        lore.push(format!("§6 - §{glyph} §f{}§7²", ware.price));
        ItemEntry::new(ware.name.clone(), lore)
    }
}

impl BalanceSource for ShopWorld {
    fn balance(&self) -> u64 {
        self.balance
    }
}

/// A click waiting to reach the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClick {
    pub slot: usize,
    pub container_id: i32,
    pub click: ClickKind,
}

/// Queue of clicks sent by the client this frame.
#[derive(Debug, Default)]
pub struct Outbox {
    clicks: Vec<PendingClick>,
}

impl Outbox {
    pub fn push(&mut self, click: PendingClick) {
        self.clicks.push(click);
    }

    pub fn drain(&mut self) -> Vec<PendingClick> {
        std::mem::take(&mut self.clicks)
    }
}

impl PurchaseSink for Outbox {
    fn purchase(&mut self, request: PurchaseRequest<'_>) {
        self.push(PendingClick {
            slot: request.slot,
            container_id: request.container_id,
            click: request.click,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

/// Chat-style message log shown to the player.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: VecDeque<LogEntry>,
}

impl MessageLog {
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into());
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    fn push(&mut self, level: LogLevel, message: String) {
        if self.entries.len() == MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            at: Local::now(),
            level,
            message,
        });
    }
}

impl Notifier for MessageLog {
    fn notify_error(&mut self, message: &str) {
        self.error(message);
    }
}
