//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.

/// Account ID - positive, unique within a ledger.
///
/// # Constraints:
/// - **Immutable**: Once a ledger is built, the account set never changes
/// - **Non-zero**: `0` is rejected at setup
/// - **Ordered**: Lock acquisition order is ascending account ID
pub type AccountId = u32;

/// Signed fixed-precision amount in whole currency units.
///
/// Signed so that a bypassed insufficient-funds guard shows up as a
/// negative balance in the integrity audit instead of wrapping.
pub type Amount = i64;

/// Slot index of an account inside a ledger (position in ID order).
pub type Slot = usize;
