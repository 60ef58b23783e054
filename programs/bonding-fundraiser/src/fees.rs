use anchor_lang::prelude::*;

use crate::config::FundraiserConfig;
use crate::constants::FEE_BASIS;
use crate::errors::FundraiserError;

/// How a single gross payment is divided.
///
/// The four parts always sum to the gross payment; every floor lands in
/// `net_contribution`, the only term that moves the curve.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeSplit {
    pub protocol_fee: u64,
    pub upfront_net: u64,
    pub escrow_amount: u64,
    pub net_contribution: u64,
}

impl FeeSplit {
    pub fn total(&self) -> u128 {
        self.protocol_fee as u128
            + self.upfront_net as u128
            + self.escrow_amount as u128
            + self.net_contribution as u128
    }
}

fn fraction_of(amount: u64, fraction: u64) -> Result<u64> {
    let value = (amount as u128)
        .checked_mul(fraction as u128)
        .ok_or(FundraiserError::MathOverflow)?
        / FEE_BASIS as u128;
    u64::try_from(value).map_err(|_| error!(FundraiserError::MathOverflow))
}

pub fn split_payment(gross_payment: u64, config: &FundraiserConfig) -> Result<FeeSplit> {
    let protocol_fee = fraction_of(gross_payment, config.protocol_fee)?;
    let upfront_net = fraction_of(gross_payment, config.upfront_rake)?
        .checked_sub(protocol_fee)
        .ok_or(FundraiserError::MathOverflow)?;
    let escrow_amount = fraction_of(gross_payment, config.escrow_rake)?;

    let net_contribution = gross_payment
        .checked_sub(protocol_fee)
        .and_then(|v| v.checked_sub(upfront_net))
        .and_then(|v| v.checked_sub(escrow_amount))
        .ok_or(FundraiserError::MathOverflow)?;

    Ok(FeeSplit {
        protocol_fee,
        upfront_net,
        escrow_amount,
        net_contribution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;
    use proptest::prelude::*;

    #[test]
    fn test_split_sample_payment() {
        let config = sample_config();
        let split = split_payment(200_000_000_000, &config).unwrap();

        assert_eq!(split.protocol_fee, 2_000_000_000);
        assert_eq!(split.upfront_net, 64_666_666_000);
        assert_eq!(split.escrow_amount, 0);
        assert_eq!(split.net_contribution, 133_333_334_000);
    }

    #[test]
    fn test_rounding_goes_to_net_contribution() {
        let mut config = sample_config();
        config.escrow_rake = 10_000_001;

        // 7 * 0.33333333 floors to 2, 7 * 0.10000001 floors to 0.
        let split = split_payment(7, &config).unwrap();
        assert_eq!(split.protocol_fee, 0);
        assert_eq!(split.upfront_net, 2);
        assert_eq!(split.escrow_amount, 0);
        assert_eq!(split.net_contribution, 5);
    }

    #[test]
    fn test_zero_rake_keeps_everything() {
        let mut config = sample_config();
        config.upfront_rake = 0;
        config.protocol_fee = 0;

        let split = split_payment(123_456_789, &config).unwrap();
        assert_eq!(split.net_contribution, 123_456_789);
    }

    proptest! {
        #[test]
        fn split_always_sums_to_gross(
            gross in 1u64..u64::MAX / 2,
            upfront in 0u64..50_000_000,
            escrow in 0u64..49_999_999,
            protocol_share in 0u64..=100,
        ) {
            let mut config = sample_config();
            config.upfront_rake = upfront;
            config.escrow_rake = escrow;
            config.protocol_fee = upfront * protocol_share / 100;

            let split = split_payment(gross, &config).unwrap();
            prop_assert_eq!(split.total(), gross as u128);
        }
    }
}
