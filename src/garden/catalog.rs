//! Static catalogs for upgrades, decorations and themes.
//!
//! Catalog entries are immutable configuration. The store holds a shared
//! [`Catalog`] and only ever looks entries up by id.

use serde::{Deserialize, Serialize};

/// What an upgrade improves once bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    /// Adds to harvest produced every second.
    Auto,
    /// Adds to harvest granted per tap.
    Tap,
}

/// How many times an upgrade may be bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseLimit {
    Repeatable,
    Once,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: u64,
    pub kind: UpgradeKind,
    pub increment: u64,
    pub limit: PurchaseLimit,
}

impl UpgradeDef {
    fn new(
        id: &str,
        name: &str,
        description: &str,
        cost: u64,
        kind: UpgradeKind,
        increment: u64,
        limit: PurchaseLimit,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            cost,
            kind,
            increment,
            limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationDef {
    pub id: String,
    pub glyph: String,
    pub name: String,
    pub cost: u64,
}

impl DecorationDef {
    pub fn new(id: &str, glyph: &str, name: &str, cost: u64) -> Self {
        Self {
            id: id.to_string(),
            glyph: glyph.to_string(),
            name: name.to_string(),
            cost,
        }
    }
}

/// Motion style a theme applies to the floating lettuce display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionStyle {
    Float,
    Bounce,
    Spin,
    Pulse,
    Sway,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDef {
    pub id: String,
    pub name: String,
    pub cost: u64,
    pub starter: bool,
    pub preview: Vec<String>,
    pub motion: MotionStyle,
}

impl ThemeDef {
    fn new(id: &str, name: &str, cost: u64, starter: bool, preview: &[&str], motion: MotionStyle) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            cost,
            starter,
            preview: preview.iter().map(|g| g.to_string()).collect(),
            motion,
        }
    }
}

/// Every purchasable thing in the game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub upgrades: Vec<UpgradeDef>,
    pub decorations: Vec<DecorationDef>,
    pub themes: Vec<ThemeDef>,
}

impl Catalog {
    /// The built-in tables shipped with the game.
    pub fn standard() -> Self {
        Self {
            upgrades: standard_upgrades(),
            decorations: standard_decorations(),
            themes: standard_themes(),
        }
    }

    /// Swap the decoration table, e.g. for one generated from emoji data.
    pub fn with_decorations(mut self, decorations: Vec<DecorationDef>) -> Self {
        self.decorations = decorations;
        self
    }

    pub fn upgrade(&self, id: &str) -> Option<&UpgradeDef> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn decoration(&self, id: &str) -> Option<&DecorationDef> {
        self.decorations.iter().find(|d| d.id == id)
    }

    pub fn theme(&self, id: &str) -> Option<&ThemeDef> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn starter_themes(&self) -> impl Iterator<Item = &ThemeDef> {
        self.themes.iter().filter(|t| t.starter)
    }
}

fn standard_upgrades() -> Vec<UpgradeDef> {
    use PurchaseLimit::*;
    use UpgradeKind::*;
    vec![
        UpgradeDef::new("watering_can", "Watering Can", "A little water goes a long way", 15, Auto, 1, Repeatable),
        UpgradeDef::new("garden_gnome", "Garden Gnome", "Tends the rows while you sleep", 100, Auto, 5, Repeatable),
        UpgradeDef::new("sprinkler", "Sprinkler", "Keeps every leaf damp", 500, Auto, 20, Repeatable),
        UpgradeDef::new("greenhouse", "Greenhouse", "Lettuce all year round", 2_000, Auto, 80, Repeatable),
        UpgradeDef::new("hydroponics", "Hydroponics Rig", "Soil is optional now", 10_000, Auto, 400, Repeatable),
        UpgradeDef::new("green_thumb", "Green Thumb", "Every tap picks a bit more", 50, Tap, 1, Repeatable),
        UpgradeDef::new("gloves", "Gardening Gloves", "Grip the crisp leaves firmly", 250, Tap, 5, Repeatable),
        UpgradeDef::new("golden_trowel", "Golden Trowel", "Shiny and absurdly effective", 1_500, Tap, 25, Repeatable),
        UpgradeDef::new("compost_heap", "Compost Heap", "One heap feeds the whole garden", 750, Auto, 50, Once),
        UpgradeDef::new("scarecrow", "Scarecrow", "Scares off the leaf thieves for good", 3_000, Tap, 100, Once),
    ]
}

fn standard_decorations() -> Vec<DecorationDef> {
    vec![
        DecorationDef::new("sunflower", "🌻", "Sunflower", 10),
        DecorationDef::new("tulip", "🌷", "Tulip", 10),
        DecorationDef::new("mushroom", "🍄", "Mushroom", 15),
        DecorationDef::new("snail", "🐌", "Snail", 20),
        DecorationDef::new("bee", "🐝", "Bee", 25),
        DecorationDef::new("ladybug", "🐞", "Ladybug", 25),
        DecorationDef::new("butterfly", "🦋", "Butterfly", 40),
        DecorationDef::new("rock", "🪨", "Rock", 5),
        DecorationDef::new("carrot", "🥕", "Carrot", 30),
        DecorationDef::new("rabbit", "🐇", "Rabbit", 75),
        DecorationDef::new("fountain", "⛲", "Fountain", 250),
        DecorationDef::new("house", "🏡", "Cottage", 500),
    ]
}

fn standard_themes() -> Vec<ThemeDef> {
    use MotionStyle::*;
    vec![
        ThemeDef::new("classic", "Classic Patch", 0, true, &["🥬", "🌱"], Float),
        ThemeDef::new("spring", "Spring Bloom", 0, false, &["🌸", "🌼", "🥬"], Sway),
        ThemeDef::new("bouncy", "Bouncy Beds", 200, false, &["🥬", "🐸"], Bounce),
        ThemeDef::new("cyclone", "Salad Spinner", 1_000, false, &["🥗", "🌀"], Spin),
        ThemeDef::new("heartbeat", "Heirloom Pulse", 5_000, false, &["💚", "🥬", "💚"], Pulse),
    ]
}
