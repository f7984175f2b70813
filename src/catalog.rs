//! Item point values.
//!
//! The catalog is a process-wide constant table. Points decide whether a trade
//! is fair and how much value is lost to infection.
//!
//! | Item        | Points |
//! |-------------|--------|
//! | Water       | 4      |
//! | Food        | 3      |
//! | Medication  | 2      |
//! | Ammunition  | 1      |

use crate::error::RegistryError;
use crate::types::ItemType;

/// Point values indexed by [`ItemType::to_u8`].
const POINTS: [u64; 4] = [4, 3, 2, 1];

/// Read-only item pricing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemCatalog;

impl ItemCatalog {
    /// Point value of a single unit.
    #[inline]
    pub const fn point_value(item: ItemType) -> u64 {
        POINTS[item as usize]
    }

    /// Total points for a list of (item, quantity) lines.
    ///
    /// # Errors
    ///
    /// `Validation` if the total overflows `u64`.
    pub fn total_points<'a, I>(lines: I) -> Result<u64, RegistryError>
    where
        I: IntoIterator<Item = &'a (ItemType, u32)>,
    {
        lines.into_iter().try_fold(0u64, |acc, &(item, qty)| {
            Self::point_value(item)
                .checked_mul(u64::from(qty))
                .and_then(|points| acc.checked_add(points))
                .ok_or_else(|| RegistryError::validation("quantity", "point total overflows"))
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
