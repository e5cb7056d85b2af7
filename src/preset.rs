//! Preset initial balances
//!
//! Each preset varies the number of accounts (and so the contention per
//! account) while keeping the total at [`PRESET_TOTAL`].

use crate::core_types::Amount;
use crate::error::ConfigError;

/// Every preset sums to this value.
pub const PRESET_TOTAL: Amount = 100_000;

/// Account counts with a preset.
pub const SUPPORTED_ACCOUNT_COUNTS: [usize; 4] = [3, 10, 20, 60];

const BALANCES_3: [Amount; 3] = [40000, 30000, 30000];

const BALANCES_10: [Amount; 10] = [
    10000, 8000, 12000, 9000, 15000, 7000, 13000, 6000, 11000, 9000,
];

const BALANCES_20: [Amount; 20] = [
    5000, 1000, 4000, 6000, 5000, 4000, 6000, 4000, 5000, 2000, //
    4000, 9000, 5000, 4000, 5000, 5000, 4000, 6000, 7000, 9000,
];

const BALANCES_60: [Amount; 60] = [
    5700, 2000, 1500, 1200, 1800, 2200, 1700, 1000, //
    1500, 1200, 1800, 2200, 1700, 1000, 1500, 1200, //
    1800, 2200, 1700, 1000, 1500, 1200, 1800, 2200, //
    1700, 1000, 1500, 1200, 1800, 2200, 1700, 1000, //
    1500, 1200, 1800, 2200, 1700, 1000, 2500, 1200, //
    1800, 2200, 1700, 1000, 1500, 1200, 1800, 2200, //
    1700, 1000, 1500, 1200, 1800, 2200, 1700, 1000, //
    1500, 1200, 1800, 2200,
];

/// Initial balances for `num_accounts`, in account-ID order (ID = index + 1).
///
/// # Errors
/// `ConfigError::UnsupportedPreset` for any count outside
/// [`SUPPORTED_ACCOUNT_COUNTS`].
pub fn initial_balances(num_accounts: usize) -> Result<&'static [Amount], ConfigError> {
    match num_accounts {
        3 => Ok(&BALANCES_3),
        10 => Ok(&BALANCES_10),
        20 => Ok(&BALANCES_20),
        60 => Ok(&BALANCES_60),
        other => Err(ConfigError::UnsupportedPreset(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_sums_to_total() {
        for n in SUPPORTED_ACCOUNT_COUNTS {
            let balances = initial_balances(n).unwrap();
            assert_eq!(balances.len(), n);
            assert_eq!(
                balances.iter().sum::<Amount>(),
                PRESET_TOTAL,
                "preset {} must sum to {}",
                n,
                PRESET_TOTAL
            );
        }
    }

    #[test]
    fn test_presets_are_positive() {
        for n in SUPPORTED_ACCOUNT_COUNTS {
            assert!(initial_balances(n).unwrap().iter().all(|&b| b > 0));
        }
    }

    #[test]
    fn test_unsupported_counts() {
        for n in [0, 1, 2, 4, 5, 11, 59, 61, 1000] {
            assert!(matches!(
                initial_balances(n),
                Err(ConfigError::UnsupportedPreset(m)) if m == n
            ));
        }
    }
}
