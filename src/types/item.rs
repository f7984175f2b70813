//! Item types tracked in survivor inventories.
//!
//! The set of item types is closed. Each type has a stable one-byte wire code
//! used by the fixed-size records in [`crate::types::InventoryEntry`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

// ============================================================================
// ItemType enum
// ============================================================================

/// A tradeable resource.
///
/// Represented as u8 for SSZ compatibility:
/// - Water = 0
/// - Food = 1
/// - Medication = 2
/// - Ammunition = 3
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Water,
    Food,
    Medication,
    Ammunition,
}

impl ItemType {
    /// Every item type, in wire-code order.
    pub const ALL: [ItemType; 4] = [
        ItemType::Water,
        ItemType::Food,
        ItemType::Medication,
        ItemType::Ammunition,
    ];

    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            ItemType::Water => 0,
            ItemType::Food => 1,
            ItemType::Medication => 2,
            ItemType::Ammunition => 3,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ItemType::Water),
            1 => Some(ItemType::Food),
            2 => Some(ItemType::Medication),
            3 => Some(ItemType::Ammunition),
            _ => None,
        }
    }

    /// Lowercase English name.
    pub fn name(self) -> &'static str {
        match self {
            ItemType::Water => "water",
            ItemType::Food => "food",
            ItemType::Medication => "medication",
            ItemType::Ammunition => "ammunition",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ItemType {
    type Err = RegistryError;

    /// Case-insensitive. Accepts the English names and the Portuguese labels
    /// (`agua`, `comida`, `medicamento`, `remedio`, `municao`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "water" | "agua" => Ok(ItemType::Water),
            "food" | "comida" => Ok(ItemType::Food),
            "medication" | "medicamento" | "remedio" => Ok(ItemType::Medication),
            "ammunition" | "municao" => Ok(ItemType::Ammunition),
            other => Err(RegistryError::validation(
                "item_type",
                format!("unknown item type `{other}`"),
            )),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes() {
        for item in ItemType::ALL {
            assert_eq!(ItemType::from_u8(item.to_u8()), Some(item));
        }
        assert_eq!(ItemType::from_u8(4), None);
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("Water".parse::<ItemType>().unwrap(), ItemType::Water);
        assert_eq!("agua".parse::<ItemType>().unwrap(), ItemType::Water);
        assert_eq!(" COMIDA ".parse::<ItemType>().unwrap(), ItemType::Food);
        assert_eq!("remedio".parse::<ItemType>().unwrap(), ItemType::Medication);
        assert_eq!("municao".parse::<ItemType>().unwrap(), ItemType::Ammunition);
    }

    #[test]
    fn test_parse_unknown_is_validation_error() {
        let err = "fuel".parse::<ItemType>().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn test_ordering_follows_wire_code() {
        let mut items = vec![ItemType::Ammunition, ItemType::Water, ItemType::Medication];
        items.sort();
        assert_eq!(items, vec![ItemType::Water, ItemType::Medication, ItemType::Ammunition]);
    }
}
