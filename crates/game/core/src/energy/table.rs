//! Speed to energy conversion.
//!
//! Speed is stored as a raw table index in `0..=199` where `110` is normal
//! speed (+0). Each tick an entity receives `energy_for_speed(speed)` energy
//! before time dilation. The table is monotonically non-decreasing, starts at
//! a floor of 1 so even the slowest entity makes progress, and flattens out
//! towards a ceiling of 49 so very high speeds yield diminishing returns.

/// Signed-speed value clamped onto the energy table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Speed(pub i32);

impl Speed {
    /// Lowest table index.
    pub const MIN: Self = Self(0);

    /// Highest table index.
    pub const MAX: Self = Self(ENERGY_TABLE_LEN as i32 - 1);

    /// Normal speed (+0).
    pub const NORMAL: Self = Self(110);

    /// Builds a speed from a signed bonus relative to normal (`+10` is "fast +10").
    pub const fn from_bonus(bonus: i32) -> Self {
        Self(Self::NORMAL.0.saturating_add(bonus))
    }

    /// Signed bonus relative to normal speed.
    pub const fn bonus(self) -> i32 {
        self.0 - Self::NORMAL.0
    }

    /// Table index after clamping to the valid domain.
    pub const fn table_index(self) -> usize {
        if self.0 < Self::MIN.0 {
            Self::MIN.0 as usize
        } else if self.0 > Self::MAX.0 {
            Self::MAX.0 as usize
        } else {
            self.0 as usize
        }
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::NORMAL
    }
}

const ENERGY_TABLE_LEN: usize = 200;

/// Energy granted per tick, indexed by speed.
#[rustfmt::skip]
const ENERGY_TABLE: [u8; ENERGY_TABLE_LEN] = [
    /* Slow */     1,  1,  1,  1,  1,  1,  1,  1,  1,  1,
    /* Slow */     1,  1,  1,  1,  1,  1,  1,  1,  1,  1,
    /* Slow */     1,  1,  1,  1,  1,  1,  1,  1,  1,  1,
    /* Slow */     1,  1,  1,  1,  1,  1,  1,  1,  1,  1,
    /* Slow */     1,  1,  1,  1,  1,  1,  1,  1,  1,  1,
    /* Slow */     1,  1,  1,  1,  1,  1,  1,  1,  1,  1,
    /* S-50 */     1,  1,  1,  1,  1,  1,  1,  1,  1,  1,
    /* S-40 */     2,  2,  2,  2,  2,  2,  2,  2,  2,  2,
    /* S-30 */     2,  2,  2,  2,  2,  2,  2,  3,  3,  3,
    /* S-20 */     3,  3,  3,  3,  3,  4,  4,  4,  4,  4,
    /* S-10 */     5,  5,  5,  5,  6,  6,  7,  7,  8,  9,
    /* Norm */    10, 11, 12, 13, 14, 15, 16, 17, 18, 19,
    /* F+10 */    20, 21, 22, 23, 24, 25, 26, 27, 28, 29,
    /* F+20 */    30, 31, 32, 33, 34, 35, 36, 36, 37, 37,
    /* F+30 */    38, 38, 39, 39, 40, 40, 40, 41, 41, 41,
    /* F+40 */    42, 42, 42, 43, 43, 43, 44, 44, 44, 44,
    /* F+50 */    45, 45, 45, 45, 45, 46, 46, 46, 46, 46,
    /* F+60 */    47, 47, 47, 47, 47, 48, 48, 48, 48, 48,
    /* F+70 */    49, 49, 49, 49, 49, 49, 49, 49, 49, 49,
    /* Fast */    49, 49, 49, 49, 49, 49, 49, 49, 49, 49,
];

/// Largest raw energy any speed can produce in a single tick.
pub const MAX_TABLE_ENERGY: u32 = ENERGY_TABLE[ENERGY_TABLE_LEN - 1] as u32;

/// Raw per-tick energy for a speed, before time dilation.
///
/// Total over all `i32`: values outside the table clamp to the nearest bound.
#[inline]
pub const fn energy_for_speed(speed: Speed) -> u32 {
    ENERGY_TABLE[speed.table_index()] as u32
}
