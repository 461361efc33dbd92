//! Built-in reward catalog and modifier table.
//!
//! Mirrors the vanilla fishing loot table: fish, junk, and treasure, plus the
//! enchantments that can appear on treasure items.

use crate::defs::{AttributeRange, CatalogDef, ItemCategory, ItemTemplate, ModifierDef, ModifierPolicy, RewardDef};
use std::collections::BTreeMap;

use crate::defs::ItemCategory::{Boots, Bow, FishingRod};

const BREAKABLE: &[ItemCategory] = &[Boots, FishingRod, Bow];
const PROTECTIONS: &[&str] = &[
    "protection",
    "fire_protection",
    "blast_protection",
    "projectile_protection",
];
const DAMAGE_KINDS: &[&str] = &["sharpness", "smite", "bane_of_arthropods"];

/// The catalog shipped with the engine, used when no catalog file is configured.
pub fn builtin_catalog() -> CatalogDef {
    CatalogDef {
        rewards: builtin_rewards(),
        modifiers: builtin_modifiers(),
    }
}

fn plain(name: &str, template: ItemTemplate) -> RewardDef {
    RewardDef {
        name: name.to_string(),
        template,
        damage: None,
        modifiers: ModifierPolicy::Forbidden,
        level_bounds: BTreeMap::new(),
        note: None,
    }
}

fn damaged(name: &str, template: ItemTemplate, max: i64, modifiers: ModifierPolicy, note: &str) -> RewardDef {
    RewardDef {
        damage: Some(AttributeRange::new(0, max)),
        modifiers,
        note: Some(note.to_string()),
        ..plain(name, template)
    }
}

/// Rewards in scaffold order.
pub fn builtin_rewards() -> Vec<RewardDef> {
    let fish = |variant| ItemTemplate::new("minecraft:fish", ItemCategory::Fish).with_variant(variant);
    let misc = |item: &str| ItemTemplate::new(item, ItemCategory::Misc);

    vec![
        plain("cod", fish(0)),
        plain("salmon", fish(1)),
        plain("clownfish", fish(2)),
        plain("pufferfish", fish(3)),
        damaged(
            "leather_boots",
            ItemTemplate::new("minecraft:leather_boots", Boots),
            58,
            ModifierPolicy::Forbidden,
            "Possible damage: 0-58, This item can't be enchanted, Example: leather_boots;damage:0",
        ),
        plain("water_potion", misc("minecraft:potion").with_potion("minecraft:water")),
        damaged(
            "fishing_rod_junk",
            ItemTemplate::new("minecraft:fishing_rod", FishingRod),
            57,
            ModifierPolicy::Forbidden,
            "Possible damage: 0-57, This item can't be enchanted, Example: fishing_rod_junk;damage:0",
        ),
        plain("ink_sac", misc("minecraft:dye").with_count(10)),
        plain("tripwire_hook", misc("minecraft:tripwire_hook")),
        plain("rotten_flesh", misc("minecraft:rotten_flesh")),
        plain("waterlily", misc("minecraft:waterlily")),
        plain("name_tag", misc("minecraft:name_tag")),
        plain("saddle", misc("minecraft:saddle")),
        damaged(
            "bow",
            ItemTemplate::new("minecraft:bow", Bow),
            96,
            ModifierPolicy::Mandatory,
            "Possible damage: 0-96, This item has to be enchanted, Example: bow;damage:0;enchant:infinity[1],unbreaking[3]",
        ),
        damaged(
            "fishing_rod_treasure",
            ItemTemplate::new("minecraft:fishing_rod", FishingRod),
            57,
            ModifierPolicy::Mandatory,
            "Possible damage: 0-57, This item has to be enchanted, Example: fishing_rod_treasure;damage:0;enchant:lure[1],unbreaking[3]",
        ),
        RewardDef {
            modifiers: ModifierPolicy::Mandatory,
            note: Some("This item has to be enchanted, Example: book;enchant:frost_walker[1]".to_string()),
            ..plain(
                "book",
                ItemTemplate::new("minecraft:enchanted_book", ItemCategory::EnchantedBook),
            )
        },
    ]
}

/// Vanilla enchantments with their level caps, targets, and exclusivity groups.
pub fn builtin_modifiers() -> Vec<ModifierDef> {
    let exclusive = |group: &[&str], me: &str| -> Vec<&'static str> {
        PROTECTIONS
            .iter()
            .chain(DAMAGE_KINDS)
            .copied()
            .filter(|other| group.contains(other) && *other != me)
            .collect()
    };

    let mut modifiers = Vec::new();
    for name in PROTECTIONS {
        modifiers.push(ModifierDef::new(name, 4, &[Boots]).excluding(&exclusive(PROTECTIONS, name)));
    }
    for name in DAMAGE_KINDS {
        modifiers.push(ModifierDef::new(name, 5, &[]).excluding(&exclusive(DAMAGE_KINDS, name)));
    }

    modifiers.extend([
        ModifierDef::new("feather_falling", 4, &[Boots]),
        ModifierDef::new("respiration", 3, &[]),
        ModifierDef::new("aqua_affinity", 1, &[]),
        ModifierDef::new("thorns", 3, &[Boots]),
        ModifierDef::new("depth_strider", 3, &[Boots]).excluding(&["frost_walker"]),
        ModifierDef::new("frost_walker", 2, &[Boots]).excluding(&["depth_strider"]),
        ModifierDef::new("binding_curse", 1, &[Boots]),
        ModifierDef::new("knockback", 2, &[]),
        ModifierDef::new("fire_aspect", 2, &[]),
        ModifierDef::new("looting", 3, &[]),
        ModifierDef::new("sweeping", 3, &[]),
        ModifierDef::new("efficiency", 5, &[]),
        ModifierDef::new("silk_touch", 1, &[]).excluding(&["fortune"]),
        ModifierDef::new("fortune", 3, &[]).excluding(&["silk_touch"]),
        ModifierDef::new("unbreaking", 3, BREAKABLE),
        ModifierDef::new("power", 5, &[Bow]),
        ModifierDef::new("punch", 2, &[Bow]),
        ModifierDef::new("flame", 1, &[Bow]),
        ModifierDef::new("infinity", 1, &[Bow]).excluding(&["mending"]),
        ModifierDef::new("luck_of_the_sea", 3, &[FishingRod]),
        ModifierDef::new("lure", 3, &[FishingRod]),
        ModifierDef::new("mending", 1, BREAKABLE).excluding(&["infinity"]),
        ModifierDef::new("vanishing_curse", 1, BREAKABLE),
    ]);
    modifiers
}
