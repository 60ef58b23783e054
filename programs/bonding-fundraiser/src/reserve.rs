use anchor_lang::prelude::*;

use crate::constants::RESERVE_ROUNDING_BUFFER;
use crate::curve::CurveParams;
use crate::errors::FundraiserError;
use crate::fees::FeeSplit;
use crate::state::{Fundraiser, Order};

/// Aggregates derived from the order set, updated on every buy and refund.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReserveCounters {
    /// Σ net_contribution over non-refunded orders. Positions the curve.
    pub total_active_contributions: u64,
    /// Σ gross_payment over every order ever placed.
    pub total_gross_payments: u64,
    /// Σ token_amount over non-refunded orders.
    pub total_tokens_allocated: u64,
    /// Escrow held for non-refunded orders, until deployment.
    pub escrow_accumulated: u64,
}

impl ReserveCounters {
    pub const SIZE: usize = 4 * 8;

    /// Counters after crediting a purchase; `self` is untouched.
    pub fn credited(&self, gross_payment: u64, split: &FeeSplit, token_amount: u64) -> Result<Self> {
        Ok(Self {
            total_active_contributions: self
                .total_active_contributions
                .checked_add(split.net_contribution)
                .ok_or(FundraiserError::MathOverflow)?,
            total_gross_payments: self
                .total_gross_payments
                .checked_add(gross_payment)
                .ok_or(FundraiserError::MathOverflow)?,
            total_tokens_allocated: self
                .total_tokens_allocated
                .checked_add(token_amount)
                .ok_or(FundraiserError::MathOverflow)?,
            escrow_accumulated: self
                .escrow_accumulated
                .checked_add(split.escrow_amount)
                .ok_or(FundraiserError::MathOverflow)?,
        })
    }

    /// Counters after withdrawing a refunded order. Gross payments are
    /// historical and stay.
    pub fn debited(&self, order: &Order) -> Result<Self> {
        Ok(Self {
            total_active_contributions: self
                .total_active_contributions
                .checked_sub(order.net_contribution)
                .ok_or(FundraiserError::MathOverflow)?,
            total_gross_payments: self.total_gross_payments,
            total_tokens_allocated: self
                .total_tokens_allocated
                .checked_sub(order.token_amount)
                .ok_or(FundraiserError::MathOverflow)?,
            escrow_accumulated: self
                .escrow_accumulated
                .checked_sub(order.escrow_amount)
                .ok_or(FundraiserError::MathOverflow)?,
        })
    }
}

/// Sale tokens the LP leg needs at the target: `target / end_price`.
pub fn liquidity_tokens(curve: &CurveParams, target_liquidity: u64) -> Result<u64> {
    curve.tokens_at_end_price(target_liquidity)
}

/// Sale-token balance the vault must hold before deployment:
/// LP leg + prorated sale supply + one unit of rounding slack.
pub fn required_sale_token_reserve(curve: &CurveParams, target_liquidity: u64) -> Result<u64> {
    liquidity_tokens(curve, target_liquidity)?
        .checked_add(curve.sale_supply())
        .and_then(|v| v.checked_add(RESERVE_ROUNDING_BUFFER))
        .ok_or_else(|| error!(FundraiserError::MathOverflow))
}

impl Fundraiser {
    pub fn required_reserve(&self) -> Result<u64> {
        required_sale_token_reserve(&self.curve()?, self.config.target_liquidity)
    }

    pub fn has_sufficient_reserve(&self, sale_vault_balance: u64) -> Result<bool> {
        Ok(sale_vault_balance >= self.required_reserve()?)
    }

    /// Net contribution still accepted before the target is hit.
    pub fn remaining_capacity(&self) -> u64 {
        self.config
            .target_liquidity
            .saturating_sub(self.reserves.total_active_contributions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;

    #[test]
    fn test_required_reserve_for_sample() {
        let curve = CurveParams::from_config(&sample_config()).unwrap();
        let config = sample_config();

        // 1,333,333.33 / 0.03 = 44,444,444.33 tokens for the pool.
        assert_eq!(liquidity_tokens(&curve, config.target_liquidity).unwrap(), 44_444_444_333_333);
        assert_eq!(
            required_sale_token_reserve(&curve, config.target_liquidity).unwrap(),
            44_444_444_333_333 + 99_999_999_250_000 + 1
        );
    }

    #[test]
    fn test_credit_then_debit_restores_counters() {
        let start = ReserveCounters {
            total_active_contributions: 10,
            total_gross_payments: 20,
            total_tokens_allocated: 30,
            escrow_accumulated: 4,
        };
        let split = FeeSplit {
            protocol_fee: 1,
            upfront_net: 2,
            escrow_amount: 3,
            net_contribution: 94,
        };
        let credited = start.credited(100, &split, 500).unwrap();
        assert_eq!(credited.total_active_contributions, 104);
        assert_eq!(credited.total_gross_payments, 120);
        assert_eq!(credited.total_tokens_allocated, 530);
        assert_eq!(credited.escrow_accumulated, 7);

        let order = Order {
            fundraiser: Pubkey::default(),
            order_index: 0,
            gross_payment: 100,
            net_contribution: 94,
            escrow_amount: 3,
            token_amount: 500,
            bonus_amount: 0,
            purchaser: Pubkey::default(),
            recipient: Pubkey::default(),
            status: Default::default(),
            created_at: 0,
            bump: 0,
        };
        let debited = credited.debited(&order).unwrap();
        assert_eq!(debited.total_active_contributions, 10);
        assert_eq!(debited.total_tokens_allocated, 30);
        assert_eq!(debited.escrow_accumulated, 4);
        // Historical.
        assert_eq!(debited.total_gross_payments, 120);
    }

    #[test]
    fn test_debit_underflow_is_an_error() {
        let order = Order {
            fundraiser: Pubkey::default(),
            order_index: 0,
            gross_payment: 1,
            net_contribution: 1,
            escrow_amount: 0,
            token_amount: 1,
            bonus_amount: 0,
            purchaser: Pubkey::default(),
            recipient: Pubkey::default(),
            status: Default::default(),
            created_at: 0,
            bump: 0,
        };
        crate::errors::assert_error(
            ReserveCounters::default().debited(&order),
            FundraiserError::MathOverflow,
        );
    }
}
