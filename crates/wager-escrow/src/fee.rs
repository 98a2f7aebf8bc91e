//! Pot and fee arithmetic. Integer only; intermediates in `u128` so
//! `pot × bps` cannot overflow for any `u64` pot.

use wager_types::constants::{BPS_DENOMINATOR, STAKES_PER_GAME};
use wager_types::{Result, WagerError};

/// How a decisive pot is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PotSplit {
    /// To the winner: `pot - fee`.
    pub payout: u64,
    /// To the treasury: `floor(pot × bps / 10_000)`.
    pub fee: u64,
}

/// Full pot for a per-player stake, or `InvalidWager` if it overflows.
pub fn pot_for(wager: u64) -> Result<u64> {
    wager
        .checked_mul(STAKES_PER_GAME)
        .ok_or_else(|| WagerError::InvalidWager {
            reason: format!("pot for stake {wager} overflows u64"),
        })
}

/// Split `pot` into winner payout and platform fee.
pub fn split_pot(pot: u64, fee_bps: u16) -> Result<PotSplit> {
    if u64::from(fee_bps) > BPS_DENOMINATOR {
        return Err(WagerError::InvalidFeeBps(fee_bps));
    }
    let fee = u128::from(pot) * u128::from(fee_bps) / u128::from(BPS_DENOMINATOR);
    let fee = u64::try_from(fee).map_err(|_| WagerError::Internal("fee exceeds pot".into()))?;
    let payout = pot
        .checked_sub(fee)
        .ok_or_else(|| WagerError::Internal("fee exceeds pot".into()))?;
    Ok(PotSplit { payout, fee })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn default_fee_on_two_million_pot() {
        let split = split_pot(2_000_000, 250).unwrap();
        assert_eq!(split.fee, 50_000);
        assert_eq!(split.payout, 1_950_000);
    }

    #[test]
    fn fee_rounds_down() {
        // 999 * 250 / 10_000 = 24.975
        let split = split_pot(999, 250).unwrap();
        assert_eq!(split.fee, 24);
        assert_eq!(split.payout, 975);
    }

    #[test]
    fn zero_and_full_fee() {
        assert_eq!(split_pot(1_000, 0).unwrap(), PotSplit { payout: 1_000, fee: 0 });
        assert_eq!(split_pot(1_000, 10_000).unwrap(), PotSplit { payout: 0, fee: 1_000 });
    }

    #[test]
    fn fee_above_denominator_rejected() {
        assert!(matches!(
            split_pot(1_000, 10_001).unwrap_err(),
            WagerError::InvalidFeeBps(10_001)
        ));
    }

    #[test]
    fn max_pot_does_not_overflow() {
        let split = split_pot(u64::MAX, 10_000).unwrap();
        assert_eq!(split.fee, u64::MAX);
        assert_eq!(split.payout, 0);
        let split = split_pot(u64::MAX, 9_999).unwrap();
        assert_eq!(split.fee + split.payout, u64::MAX);
    }

    #[test]
    fn pot_overflow_rejected() {
        assert_eq!(pot_for(7).unwrap(), 14);
        assert!(matches!(
            pot_for(u64::MAX / 2 + 1).unwrap_err(),
            WagerError::InvalidWager { .. }
        ));
    }

    #[test]
    fn fee_plus_payout_equals_pot() {
        let mut rng = StdRng::seed_from_u64(0xFEE);
        for _ in 0..10_000 {
            let bps: u16 = rng.gen_range(0..=10_000);
            let pot: u64 = if rng.gen_bool(0.5) {
                rng.gen_range(0..=1_000_000)
            } else {
                rng.gen_range(u64::MAX / 4..=u64::MAX)
            };
            let split = split_pot(pot, bps).unwrap();
            assert_eq!(split.fee + split.payout, pot, "pot={pot} bps={bps}");
            let exact = u128::from(pot) * u128::from(bps);
            assert!(u128::from(split.fee) * 10_000 <= exact);
            assert!(exact < (u128::from(split.fee) + 1) * 10_000);
        }
    }
}
