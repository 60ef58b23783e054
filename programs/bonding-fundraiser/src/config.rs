use anchor_lang::prelude::*;

use crate::constants::FEE_BASIS;
use crate::curve::CurveParams;
use crate::errors::FundraiserError;

/// Immutable sale parameters, supplied once at `initialize`.
///
/// Prices use `PRICE_SCALE`, fee fractions use `FEE_BASIS`. The sale and
/// payment mints are taken from the instruction accounts, not from here.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct FundraiserConfig {
    pub start_price: u64,
    pub end_price: u64,
    /// Net contribution (post-fee, payment units) that completes the sale.
    pub target_liquidity: u64,
    /// Smallest accepted gross payment.
    pub min_purchase: u64,
    /// Paid out at purchase time, protocol fee included.
    pub upfront_rake: u64,
    /// Held until deployment.
    pub escrow_rake: u64,
    /// Carved out of `upfront_rake` for the protocol treasury.
    pub protocol_fee: u64,
    pub beneficiary: Pubkey,
    pub protocol_treasury: Pubkey,
    /// Receives the liquidity credential. A burn address is fine.
    pub lp_destination: Pubkey,
    pub amm_program: Pubkey,
}

impl FundraiserConfig {
    pub fn validate(&self) -> Result<()> {
        require!(self.start_price > 0, FundraiserError::ZeroPrice);
        require!(
            self.end_price > self.start_price,
            FundraiserError::InvalidPriceRange
        );
        require!(self.target_liquidity > 0, FundraiserError::ZeroTarget);
        require!(self.min_purchase > 0, FundraiserError::ZeroMinimum);

        require!(
            self.protocol_fee <= self.upfront_rake,
            FundraiserError::InvalidFees
        );
        let rake = self
            .upfront_rake
            .checked_add(self.escrow_rake)
            .ok_or(FundraiserError::InvalidFees)?;
        require!(rake < FEE_BASIS, FundraiserError::InvalidFees);

        for key in [
            &self.beneficiary,
            &self.protocol_treasury,
            &self.lp_destination,
            &self.amm_program,
        ] {
            require!(*key != Pubkey::default(), FundraiserError::ZeroAddress);
        }

        // Rejects parameter sets whose prorated supply floors to zero.
        CurveParams::new(
            self.start_price,
            self.end_price,
            self.target_liquidity,
            self.net_fraction(),
        )?;

        Ok(())
    }

    /// Share of every payment that counts toward the target.
    pub fn net_fraction(&self) -> u64 {
        FEE_BASIS
            .saturating_sub(self.upfront_rake)
            .saturating_sub(self.escrow_rake)
    }
}
