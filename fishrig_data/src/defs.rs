use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable name used to refer to rewards and modifiers in queue files.
pub type Name = String;

/// Complete set of reward and modifier definitions the engine validates against.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogDef {
    #[serde(default)]
    pub rewards: Vec<RewardDef>,
    #[serde(default)]
    pub modifiers: Vec<ModifierDef>,
}

/// One legal reward a queue line may name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardDef {
    pub name: Name,
    pub template: ItemTemplate,
    /// `None` forbids a damage field; `Some` makes it mandatory within the range.
    #[serde(default)]
    pub damage: Option<AttributeRange>,
    #[serde(default)]
    pub modifiers: ModifierPolicy,
    /// Per-reward overrides of a modifier's level bounds.
    #[serde(default)]
    pub level_bounds: BTreeMap<Name, LevelBounds>,
    /// Free text shown next to the reward in a freshly scaffolded queue file.
    #[serde(default)]
    pub note: Option<String>,
}

/// Inclusive numeric range for a reward's damage attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRange {
    pub min: i64,
    pub max: i64,
}

impl AttributeRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Whether a reward must or must not carry an `enchant:` block.
///
/// There is deliberately no "optional" variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierPolicy {
    #[default]
    Forbidden,
    Mandatory,
}

/// Inclusive level range for a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBounds {
    pub min: u32,
    pub max: u32,
}

impl LevelBounds {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Broad item kinds used to decide which modifiers can apply to a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Fish,
    Boots,
    FishingRod,
    Bow,
    EnchantedBook,
    Misc,
}

/// Base item a reward is cloned from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplate {
    /// Registry id of the item, e.g. `minecraft:fish`.
    pub item: String,
    pub category: ItemCategory,
    #[serde(default)]
    pub variant: u16,
    #[serde(default = "default_count")]
    pub count: u8,
    #[serde(default)]
    pub potion: Option<String>,
}

fn default_count() -> u8 {
    1
}

impl ItemTemplate {
    pub fn new(item: &str, category: ItemCategory) -> Self {
        Self {
            item: item.to_string(),
            category,
            variant: 0,
            count: 1,
            potion: None,
        }
    }

    pub fn with_variant(mut self, variant: u16) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_count(mut self, count: u8) -> Self {
        self.count = count;
        self
    }

    pub fn with_potion(mut self, potion: &str) -> Self {
        self.potion = Some(potion.to_string());
        self
    }

    /// Clone this template into a concrete reward, applying damage and enchantments.
    pub fn instantiate(&self, damage: Option<i64>, enchantments: Option<&BTreeMap<Name, u32>>) -> Reward {
        Reward {
            item: self.item.clone(),
            variant: self.variant,
            count: self.count,
            damage,
            enchantments: enchantments.cloned().unwrap_or_default(),
            potion: self.potion.clone(),
            display_name: None,
        }
    }
}

/// A concrete reward handed back to the caller of a dequeue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub item: String,
    pub variant: u16,
    pub count: u8,
    #[serde(default)]
    pub damage: Option<i64>,
    #[serde(default)]
    pub enchantments: BTreeMap<Name, u32>,
    #[serde(default)]
    pub potion: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Display name given to the barrier handed out when no reward could be produced.
pub const BARRIER_NAME: &str = "Something went wrong in FishRigging. Check your file";

impl Reward {
    /// The placeholder reward signalling that the queue file needs attention.
    pub fn barrier() -> Self {
        Self {
            display_name: Some(BARRIER_NAME.to_string()),
            ..ItemTemplate::new("minecraft:barrier", ItemCategory::Misc).instantiate(None, None)
        }
    }

    pub fn is_barrier(&self) -> bool {
        self.item == "minecraft:barrier" && self.display_name.as_deref() == Some(BARRIER_NAME)
    }
}

/// A named, leveled enhancement that can be attached to a reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierDef {
    pub name: Name,
    #[serde(default = "default_min_level")]
    pub min_level: u32,
    pub max_level: u32,
    /// Item categories this modifier can be applied to. Enchanted books accept everything.
    #[serde(default)]
    pub applies_to: Vec<ItemCategory>,
    /// Modifiers that cannot share a reward with this one. Checked in both directions.
    #[serde(default)]
    pub incompatible_with: Vec<Name>,
}

fn default_min_level() -> u32 {
    1
}

impl ModifierDef {
    pub fn new(name: &str, max_level: u32, applies_to: &[ItemCategory]) -> Self {
        Self {
            name: name.to_string(),
            min_level: 1,
            max_level,
            applies_to: applies_to.to_vec(),
            incompatible_with: Vec::new(),
        }
    }

    pub fn excluding(mut self, others: &[&str]) -> Self {
        self.incompatible_with = others.iter().map(ToString::to_string).collect();
        self
    }

    pub fn level_bounds(&self) -> LevelBounds {
        LevelBounds::new(self.min_level, self.max_level)
    }
}
