//! Linear bonding curve, priced over cumulative gross-equivalent inflow.
//!
//! The price rises linearly in tokens sold, from `start_price` at zero to
//! `end_price` once the prorated sale supply `N` is gone. Cash spent to reach
//! `t` tokens is the area under that line:
//!
//! ```text
//! x = p0·t + (slope/2)·t²,   slope = (p1 - p0) / N
//! ```
//!
//! and the token count for a position `x` is the positive root. With prices
//! scaled by `S` and the slope cleared out of every denominator:
//!
//! ```text
//! t(x) = (isqrt(N²·P0² + 2·D·S·N·x) - N·P0) / D,   D = P1 - P0
//! ```
//!
//! Products are exact in 256 bits. The square root floors, as does every
//! division, so each `t(x)` is at most one unit below the real root and a
//! purchase (difference of two roots) is off by at most one unit either way.

use anchor_lang::prelude::*;

use crate::config::FundraiserConfig;
use crate::constants::{FEE_BASIS, PRICE_SCALE};
use crate::errors::FundraiserError;

// Kept apart from the Anchor prelude: the macro expects std's two-argument
// `Result`.
mod wide {
    use uint::construct_uint;

    construct_uint! {
        pub struct U256(4);
    }
}

pub use wide::U256;

fn narrow_u64(value: U256) -> Result<u64> {
    require!(value <= U256::from(u64::MAX), FundraiserError::MathOverflow);
    Ok(value.low_u64())
}

fn mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b)
        .ok_or_else(|| error!(FundraiserError::MathOverflow))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveParams {
    start_price: u64,
    end_price: u64,
    net_fraction: u64,
    /// Gross inflow (`target · B / NF`) that lands exactly on the target.
    gross_at_target: u128,
    /// `N`: tokens the curve sells between the start and end price.
    sale_supply: u64,
}

impl CurveParams {
    pub fn new(
        start_price: u64,
        end_price: u64,
        target_liquidity: u64,
        net_fraction: u64,
    ) -> Result<Self> {
        require!(start_price > 0, FundraiserError::ZeroPrice);
        require!(end_price >= start_price, FundraiserError::InvalidPriceRange);
        require!(net_fraction > 0, FundraiserError::InvalidFees);

        let gross_at_target = (target_liquidity as u128)
            .checked_mul(FEE_BASIS as u128)
            .ok_or(FundraiserError::MathOverflow)?
            / net_fraction as u128;

        // N = X_T / avg_price = 2·X_T·S / (P0 + P1)
        let numerator = mul(
            mul(U256::from(gross_at_target), U256::from(2u8))?,
            U256::from(PRICE_SCALE),
        )?;
        let price_sum = start_price as u128 + end_price as u128;
        let sale_supply = narrow_u64(numerator / U256::from(price_sum))?;
        require!(sale_supply > 0, FundraiserError::EmptySaleSupply);

        Ok(Self {
            start_price,
            end_price,
            net_fraction,
            gross_at_target,
            sale_supply,
        })
    }

    pub fn from_config(config: &FundraiserConfig) -> Result<Self> {
        Self::new(
            config.start_price,
            config.end_price,
            config.target_liquidity,
            config.net_fraction(),
        )
    }

    pub fn start_price(&self) -> u64 {
        self.start_price
    }

    pub fn end_price(&self) -> u64 {
        self.end_price
    }

    pub fn gross_at_target(&self) -> u128 {
        self.gross_at_target
    }

    /// Prorated sale supply `N`.
    pub fn sale_supply(&self) -> u64 {
        self.sale_supply
    }

    /// Gross-equivalent position for a net contribution total.
    pub fn position(&self, total_contributions: u64) -> Result<u128> {
        Ok((total_contributions as u128)
            .checked_mul(FEE_BASIS as u128)
            .ok_or(FundraiserError::MathOverflow)?
            / self.net_fraction as u128)
    }

    /// Cumulative tokens sold once `x` gross-equivalent units have come in.
    pub fn tokens_at(&self, x: u128) -> Result<u64> {
        let p0 = U256::from(self.start_price);
        let scale = U256::from(PRICE_SCALE);
        let x = U256::from(x);

        let delta = self.end_price - self.start_price;
        if delta == 0 {
            return narrow_u64(mul(x, scale)? / p0);
        }

        let n = U256::from(self.sale_supply);
        let d = U256::from(delta);
        let n_p0 = mul(n, p0)?;
        let discriminant = mul(n_p0, n_p0)?
            .checked_add(mul(mul(mul(mul(d, scale)?, n)?, x)?, U256::from(2u8))?)
            .ok_or(FundraiserError::MathOverflow)?;

        let root = discriminant.integer_sqrt();
        // root >= N·P0 because the discriminant is at least (N·P0)².
        narrow_u64((root - n_p0) / d)
    }

    /// Tokens bought by `net_contribution` when `total_contributions` is
    /// already in. Both ends come from the net counter so a refund walks
    /// the curve back to exactly where it was.
    pub fn tokens_for(&self, total_contributions: u64, net_contribution: u64) -> Result<u64> {
        let after = total_contributions
            .checked_add(net_contribution)
            .ok_or(FundraiserError::MathOverflow)?;
        let before = self.tokens_at(self.position(total_contributions)?)?;
        let after = self.tokens_at(self.position(after)?)?;
        Ok(after.saturating_sub(before))
    }

    /// Marginal price once `total_contributions` is in.
    pub fn price_at(&self, total_contributions: u64) -> Result<u64> {
        let sold = self.tokens_at(self.position(total_contributions)?)?;
        let delta = (self.end_price - self.start_price) as u128;
        let rise = delta
            .checked_mul(sold as u128)
            .ok_or(FundraiserError::MathOverflow)?
            / self.sale_supply as u128;
        u64::try_from(self.start_price as u128 + rise)
            .map_err(|_| error!(FundraiserError::MathOverflow))
    }

    /// Sale tokens matching `payment` at the end price.
    pub fn tokens_at_end_price(&self, payment: u64) -> Result<u64> {
        let tokens = (payment as u128)
            .checked_mul(PRICE_SCALE as u128)
            .ok_or(FundraiserError::MathOverflow)?
            / self.end_price as u128;
        u64::try_from(tokens).map_err(|_| error!(FundraiserError::MathOverflow))
    }
}
