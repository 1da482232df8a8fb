//! Static goods catalog for the barter market.
//!
//! The catalog is a process-wide read-only table: goods never change at
//! runtime, so generation attempts can share it freely.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scarcity tier of a tradeable good. Tiers are totally ordered and drive
/// exchange rates: trading up-tier costs more of the cheaper good.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Common,
    Uncommon,
    Rare,
}

impl Tier {
    /// Numeric rank used for exchange-rate gaps.
    #[must_use]
    pub const fn rank(self) -> i8 {
        match self {
            Self::Common => 0,
            Self::Uncommon => 1,
            Self::Rare => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tradeable good in the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Good {
    pub id: &'static str,
    pub name: &'static str,
    pub tier: Tier,
}

/// Market flavor attached to a generated puzzle for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketFlavor {
    pub name: &'static str,
    pub emoji: &'static str,
}

pub static GOODS: [Good; 18] = [
    Good { id: "shells", name: "Cowrie Shells", tier: Tier::Common },
    Good { id: "salt", name: "Sea Salt", tier: Tier::Common },
    Good { id: "grain", name: "Barley Grain", tier: Tier::Common },
    Good { id: "fish", name: "Dried Fish", tier: Tier::Common },
    Good { id: "rope", name: "Hemp Rope", tier: Tier::Common },
    Good { id: "clay", name: "Clay Pots", tier: Tier::Common },
    Good { id: "firewood", name: "Firewood", tier: Tier::Common },
    Good { id: "cloth", name: "Woven Cloth", tier: Tier::Uncommon },
    Good { id: "copper", name: "Copper Ingots", tier: Tier::Uncommon },
    Good { id: "tea", name: "Mountain Tea", tier: Tier::Uncommon },
    Good { id: "honey", name: "Wild Honey", tier: Tier::Uncommon },
    Good { id: "indigo", name: "Indigo Dye", tier: Tier::Uncommon },
    Good { id: "lamp_oil", name: "Lamp Oil", tier: Tier::Uncommon },
    Good { id: "silk", name: "Bolt of Silk", tier: Tier::Rare },
    Good { id: "saffron", name: "Saffron Threads", tier: Tier::Rare },
    Good { id: "amber", name: "Baltic Amber", tier: Tier::Rare },
    Good { id: "pearls", name: "River Pearls", tier: Tier::Rare },
    Good { id: "jade", name: "Carved Jade", tier: Tier::Rare },
];

pub const MARKET_FLAVORS: [MarketFlavor; 8] = [
    MarketFlavor { name: "Harbor Bazaar", emoji: "\u{2693}" },
    MarketFlavor { name: "Caravan Rest", emoji: "\u{1f42a}" },
    MarketFlavor { name: "Night Market", emoji: "\u{1f3ee}" },
    MarketFlavor { name: "River Exchange", emoji: "\u{1f6f6}" },
    MarketFlavor { name: "Hilltop Fair", emoji: "\u{26f0}\u{fe0f}" },
    MarketFlavor { name: "Spice Quarter", emoji: "\u{1f336}\u{fe0f}" },
    MarketFlavor { name: "Old Port Souk", emoji: "\u{1f9ff}" },
    MarketFlavor { name: "Crossroads Fair", emoji: "\u{1f3aa}" },
];

/// Look up a catalog good by id.
#[must_use]
pub fn good_by_id(id: &str) -> Option<&'static Good> {
    GOODS.iter().find(|good| good.id == id)
}

/// Position of a good in the canonical catalog order.
#[must_use]
pub fn catalog_index(id: &str) -> Option<usize> {
    GOODS.iter().position(|good| good.id == id)
}

/// All goods of one tier, in catalog order.
pub fn goods_with_tier(tier: Tier) -> impl Iterator<Item = &'static Good> {
    GOODS.iter().filter(move |good| good.tier == tier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<&str> = GOODS.iter().map(|good| good.id).collect();
        assert_eq!(ids.len(), GOODS.len());
    }

    #[test]
    fn every_tier_is_represented() {
        assert!(goods_with_tier(Tier::Common).count() >= 3);
        assert!(goods_with_tier(Tier::Uncommon).count() >= 3);
        assert!(goods_with_tier(Tier::Rare).count() >= 3);
    }

    #[test]
    fn tiers_order_by_scarcity() {
        assert!(Tier::Common < Tier::Uncommon);
        assert!(Tier::Uncommon < Tier::Rare);
        assert_eq!(Tier::Rare.rank() - Tier::Common.rank(), 2);
    }

    #[test]
    fn lookup_by_id() {
        let good = good_by_id("saffron").unwrap();
        assert_eq!(good.tier, Tier::Rare);
        assert!(good_by_id("obsidian").is_none());
        assert_eq!(catalog_index("shells"), Some(0));
    }
}
