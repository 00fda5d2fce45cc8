use serde::{Deserialize, Serialize};

/// Closed set of placeable things. The serde names are the keys used in the
/// map and sprite files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ItemKind {
    PlayerStart,
    Bush,
    Stone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ItemDefinition {
    pub(crate) name: &'static str,
    pub(crate) color: [u8; 3],
    pub(crate) walkable: bool,
    pub(crate) unique: bool,
}

const PLAYER_START: ItemDefinition = ItemDefinition {
    name: "Player Start",
    color: [255, 0, 0],
    walkable: true,
    unique: true,
};

const BUSH: ItemDefinition = ItemDefinition {
    name: "Bush",
    color: [34, 139, 34],
    walkable: true,
    unique: false,
};

const STONE: ItemDefinition = ItemDefinition {
    name: "Stone",
    color: [128, 128, 128],
    walkable: false,
    unique: false,
};

impl ItemKind {
    /// Item panel order.
    pub(crate) const ALL: [ItemKind; 3] = [ItemKind::PlayerStart, ItemKind::Bush, ItemKind::Stone];

    pub(crate) const fn definition(self) -> &'static ItemDefinition {
        match self {
            ItemKind::PlayerStart => &PLAYER_START,
            ItemKind::Bush => &BUSH,
            ItemKind::Stone => &STONE,
        }
    }

    pub(crate) const fn as_key(self) -> &'static str {
        match self {
            ItemKind::PlayerStart => "player_start",
            ItemKind::Bush => "bush",
            ItemKind::Stone => "stone",
        }
    }

    pub(crate) fn from_key(key: &str) -> Option<ItemKind> {
        ItemKind::ALL.into_iter().find(|kind| kind.as_key() == key)
    }
}

pub(crate) fn definition_of(kind: ItemKind) -> &'static ItemDefinition {
    kind.definition()
}
