//! Order lifecycle: `Open → Refunded | Redeemed`.
//!
//! Each transition checks every guard before touching state, so a rejected
//! call leaves the fundraiser, the order and the recipient ledger exactly as
//! they were. Token movements are the caller's job, after the transition
//! has been committed.

use anchor_lang::prelude::*;

use crate::deployment::{redemption_breakdown, RedemptionBreakdown};
use crate::errors::FundraiserError;
use crate::events::{
    EventLog, LedgerEvent, PaymentReceived, PurchaseCompleted, RedemptionCompleted,
    RefundCompleted,
};
use crate::fees::{split_payment, FeeSplit};
use crate::state::{Fundraiser, Order, OrderStatus, RecipientLedger};

/// A purchase request as it reaches the ledger.
#[derive(Clone, Copy, Debug)]
pub struct Purchase {
    pub fundraiser: Pubkey,
    pub purchaser: Pubkey,
    pub recipient: Pubkey,
    pub gross_payment: u64,
    pub now: i64,
}

/// What a gross payment would buy right now.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    pub split: FeeSplit,
    pub token_amount: u64,
    pub price_after: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub order_index: u64,
    pub split: FeeSplit,
    pub token_amount: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefundReceipt {
    pub order_index: u64,
    /// Paid back to the purchaser: net contribution plus escrow share.
    pub amount: u64,
}

/// Prices `gross_payment` against the current curve position without
/// committing anything.
pub fn quote(fundraiser: &Fundraiser, gross_payment: u64) -> Result<Quote> {
    require!(!fundraiser.is_deployed, FundraiserError::SaleCompleted);
    require!(
        gross_payment >= fundraiser.config.min_purchase,
        FundraiserError::BelowMinimum
    );

    let split = split_payment(gross_payment, &fundraiser.config)?;
    let active = fundraiser.reserves.total_active_contributions;
    let active_after = active
        .checked_add(split.net_contribution)
        .ok_or(FundraiserError::MathOverflow)?;
    require!(
        active_after <= fundraiser.config.target_liquidity,
        FundraiserError::ExceedsTarget
    );

    let curve = fundraiser.curve()?;
    let token_amount = curve.tokens_for(active, split.net_contribution)?;
    require!(token_amount > 0, FundraiserError::ZeroTokenAmount);

    Ok(Quote {
        split,
        token_amount,
        price_after: curve.price_at(active_after)?,
    })
}

pub fn buy(
    fundraiser: &mut Fundraiser,
    order: &mut Order,
    recipient_ledger: &mut RecipientLedger,
    purchase: &Purchase,
) -> Result<(PurchaseReceipt, EventLog)> {
    require!(
        purchase.recipient != Pubkey::default(),
        FundraiserError::ZeroAddress
    );
    let quote = quote(fundraiser, purchase.gross_payment)?;
    let reserves = fundraiser
        .reserves
        .credited(purchase.gross_payment, &quote.split, quote.token_amount)?;

    let fresh_ledger = recipient_ledger.recipient == Pubkey::default();
    require!(
        fresh_ledger || recipient_ledger.recipient == purchase.recipient,
        FundraiserError::InvalidTokenAccount
    );
    require!(recipient_ledger.has_capacity(), FundraiserError::TooManyOrders);
    let allocation = recipient_ledger
        .allocation
        .checked_add(quote.token_amount)
        .ok_or(FundraiserError::MathOverflow)?;
    let order_index = fundraiser.order_counter;
    let next_counter = order_index
        .checked_add(1)
        .ok_or(FundraiserError::MathOverflow)?;

    // ── Commit ──────────────────────────────────────────────────────────
    fundraiser.reserves = reserves;
    fundraiser.order_counter = next_counter;

    order.fundraiser = purchase.fundraiser;
    order.order_index = order_index;
    order.gross_payment = purchase.gross_payment;
    order.net_contribution = quote.split.net_contribution;
    order.escrow_amount = quote.split.escrow_amount;
    order.token_amount = quote.token_amount;
    order.bonus_amount = 0;
    order.purchaser = purchase.purchaser;
    order.recipient = purchase.recipient;
    order.status = OrderStatus::Open;
    order.created_at = purchase.now;

    if fresh_ledger {
        recipient_ledger.fundraiser = purchase.fundraiser;
        recipient_ledger.recipient = purchase.recipient;
    }
    recipient_ledger.allocation = allocation;
    recipient_ledger.order_indices.push(order_index);

    msg!(
        "FUNDRAISER: Order {} bought {} tokens for {} (net {}, active {})",
        order_index,
        quote.token_amount,
        purchase.gross_payment,
        quote.split.net_contribution,
        reserves.total_active_contributions
    );

    let mut log = EventLog::new();
    log.push(LedgerEvent::PaymentReceived(PaymentReceived {
        fundraiser: purchase.fundraiser,
        order_index,
        gross_payment: purchase.gross_payment,
        protocol_fee: quote.split.protocol_fee,
        upfront_net: quote.split.upfront_net,
        escrow_amount: quote.split.escrow_amount,
        net_contribution: quote.split.net_contribution,
        total_gross_payments: reserves.total_gross_payments,
        escrow_accumulated: reserves.escrow_accumulated,
    }));
    log.push(LedgerEvent::PurchaseCompleted(PurchaseCompleted {
        fundraiser: purchase.fundraiser,
        order_index,
        purchaser: purchase.purchaser,
        recipient: purchase.recipient,
        gross_payment: purchase.gross_payment,
        net_contribution: quote.split.net_contribution,
        token_amount: quote.token_amount,
        total_active_contributions: reserves.total_active_contributions,
        total_tokens_allocated: reserves.total_tokens_allocated,
        price_after: quote.price_after,
    }));

    Ok((
        PurchaseReceipt {
            order_index,
            split: quote.split,
            token_amount: quote.token_amount,
        },
        log,
    ))
}

pub fn refund(
    fundraiser: &mut Fundraiser,
    order: &mut Order,
    recipient_ledger: &mut RecipientLedger,
    caller: &Pubkey,
) -> Result<(RefundReceipt, EventLog)> {
    // The recipient holds the allocation but only the payer gets the money back.
    require_keys_eq!(*caller, order.purchaser, FundraiserError::NotPurchaser);
    require!(!fundraiser.is_deployed, FundraiserError::SaleCompleted);
    match order.status {
        OrderStatus::Open => {}
        OrderStatus::Refunded => return err!(FundraiserError::AlreadyRefunded),
        OrderStatus::Redeemed => return err!(FundraiserError::AlreadyRedeemed),
    }
    require_keys_eq!(
        recipient_ledger.recipient,
        order.recipient,
        FundraiserError::InvalidTokenAccount
    );

    let reserves = fundraiser.reserves.debited(order)?;
    let allocation = recipient_ledger
        .allocation
        .checked_sub(order.token_amount)
        .ok_or(FundraiserError::MathOverflow)?;
    let amount = order
        .net_contribution
        .checked_add(order.escrow_amount)
        .ok_or(FundraiserError::MathOverflow)?;

    // ── Commit ──────────────────────────────────────────────────────────
    fundraiser.reserves = reserves;
    recipient_ledger.allocation = allocation;
    order.status = OrderStatus::Refunded;

    msg!(
        "FUNDRAISER: Order {} refunded {} to {} (active {})",
        order.order_index,
        amount,
        order.purchaser,
        reserves.total_active_contributions
    );

    let mut log = EventLog::new();
    log.push(LedgerEvent::RefundCompleted(RefundCompleted {
        fundraiser: order.fundraiser,
        order_index: order.order_index,
        purchaser: order.purchaser,
        amount_returned: amount,
        net_contribution: order.net_contribution,
        escrow_returned: order.escrow_amount,
        token_amount: order.token_amount,
        total_active_contributions: reserves.total_active_contributions,
        total_tokens_allocated: reserves.total_tokens_allocated,
    }));

    Ok((
        RefundReceipt {
            order_index: order.order_index,
            amount,
        },
        log,
    ))
}

pub fn redeem(
    fundraiser: &mut Fundraiser,
    order: &mut Order,
) -> Result<(RedemptionBreakdown, EventLog)> {
    require!(fundraiser.is_deployed, FundraiserError::NotDeployed);
    require!(fundraiser.is_redeemable(), FundraiserError::TargetNotReached);
    match order.status {
        OrderStatus::Open => {}
        OrderStatus::Refunded => return err!(FundraiserError::AlreadyRefunded),
        OrderStatus::Redeemed => return err!(FundraiserError::AlreadyRedeemed),
    }

    let breakdown = redemption_breakdown(fundraiser, order)?;
    let bonus_distributed = fundraiser
        .bonus_distributed
        .checked_add(breakdown.bonus)
        .ok_or(FundraiserError::MathOverflow)?;
    let tokens_redeemed = fundraiser
        .tokens_redeemed
        .checked_add(breakdown.total)
        .ok_or(FundraiserError::MathOverflow)?;

    // ── Commit ──────────────────────────────────────────────────────────
    fundraiser.bonus_distributed = bonus_distributed;
    fundraiser.tokens_redeemed = tokens_redeemed;
    order.bonus_amount = breakdown.bonus;
    order.status = OrderStatus::Redeemed;

    msg!(
        "FUNDRAISER: Order {} redeemed {} + {} bonus tokens to {}",
        order.order_index,
        breakdown.original,
        breakdown.bonus,
        order.recipient
    );

    let mut log = EventLog::new();
    log.push(LedgerEvent::RedemptionCompleted(RedemptionCompleted {
        fundraiser: order.fundraiser,
        order_index: order.order_index,
        recipient: order.recipient,
        original_tokens: breakdown.original,
        bonus_tokens: breakdown.bonus,
        total_tokens: breakdown.total,
        effective_price: breakdown.effective_price,
        bonus_distributed,
    }));

    Ok((breakdown, log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;
    use crate::errors::assert_error;
    use crate::test_utils::Sale;

    const GROSS: u64 = 200_000_000_000;

    #[test]
    fn test_buy_records_order_and_counters() {
        let mut sale = Sale::new(sample_config());
        let buyer = Pubkey::new_unique();
        let index = sale.buy(buyer, buyer, GROSS).unwrap();

        let order = &sale.orders[index as usize];
        assert_eq!(order.order_index, 0);
        assert_eq!(order.gross_payment, GROSS);
        assert_eq!(order.net_contribution, 133_333_334_000);
        assert_eq!(order.status, OrderStatus::Open);
        assert!(order.token_amount > 0);

        let reserves = sale.fundraiser.reserves;
        assert_eq!(reserves.total_active_contributions, 133_333_334_000);
        assert_eq!(reserves.total_gross_payments, GROSS);
        assert_eq!(reserves.total_tokens_allocated, order.token_amount);
        assert_eq!(sale.fundraiser.order_counter, 1);
        assert_eq!(sale.allocation_of(&buyer), order.token_amount);
        sale.assert_invariants();
    }

    #[test]
    fn test_buy_emits_payment_then_purchase() {
        let mut sale = Sale::new(sample_config());
        let buyer = Pubkey::new_unique();
        sale.buy(buyer, buyer, GROSS).unwrap();

        let events = sale.log.events();
        assert_eq!(events.len(), 2);
        match (&events[0], &events[1]) {
            (LedgerEvent::PaymentReceived(paid), LedgerEvent::PurchaseCompleted(bought)) => {
                assert_eq!(paid.protocol_fee, 2_000_000_000);
                assert_eq!(paid.upfront_net, 64_666_666_000);
                assert_eq!(bought.total_active_contributions, 133_333_334_000);
                assert!(bought.price_after > sale.fundraiser.config.start_price);
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[test]
    fn test_buy_on_behalf_of_recipient() {
        let mut sale = Sale::new(sample_config());
        let payer = Pubkey::new_unique();
        let friend = Pubkey::new_unique();
        let index = sale.buy(payer, friend, GROSS).unwrap();

        assert_eq!(sale.allocation_of(&payer), 0);
        assert_eq!(
            sale.allocation_of(&friend),
            sale.orders[index as usize].token_amount
        );
        assert_eq!(sale.ledgers[&friend].order_indices, vec![index]);
    }

    #[test]
    fn test_buy_below_minimum_rejected() {
        let mut sale = Sale::new(sample_config());
        let buyer = Pubkey::new_unique();
        let before = sale.fundraiser.clone();
        assert_error(sale.buy(buyer, buyer, 999_999), FundraiserError::BelowMinimum);
        assert_eq!(sale.fundraiser, before);
        assert!(sale.orders.is_empty());
    }

    #[test]
    fn test_buy_to_default_recipient_rejected() {
        let mut sale = Sale::new(sample_config());
        assert_error(
            sale.buy(Pubkey::new_unique(), Pubkey::default(), GROSS),
            FundraiserError::ZeroAddress,
        );
    }

    #[test]
    fn test_target_gate_accepts_exact_fill_then_rejects() {
        let mut config = sample_config();
        config.upfront_rake = 0;
        config.protocol_fee = 0;
        config.target_liquidity = 1_000_000_000;
        let mut sale = Sale::new(config);
        let buyer = Pubkey::new_unique();

        sale.buy(buyer, buyer, 600_000_000).unwrap();
        let before = sale.fundraiser.clone();
        assert_error(
            sale.buy(buyer, buyer, 400_000_001),
            FundraiserError::ExceedsTarget,
        );
        assert_eq!(sale.fundraiser, before);

        sale.buy(buyer, buyer, 400_000_000).unwrap();
        assert!(sale.fundraiser.target_reached());
        assert_error(
            sale.buy(buyer, buyer, 1_000_000),
            FundraiserError::ExceedsTarget,
        );
        sale.assert_invariants();
    }

    #[test]
    fn test_refund_returns_net_plus_escrow() {
        let mut config = sample_config();
        config.escrow_rake = 5_000_000;
        let mut sale = Sale::new(config);
        let buyer = Pubkey::new_unique();
        sale.credit(&buyer, GROSS);

        let index = sale.buy(buyer, buyer, GROSS).unwrap();
        let order = sale.orders[index as usize].clone();
        assert_eq!(order.escrow_amount, 10_000_000_000);
        let after_buy = sale.balance_of(&buyer);

        sale.refund(buyer, index).unwrap();
        assert_eq!(
            sale.balance_of(&buyer) - after_buy,
            order.net_contribution + order.escrow_amount
        );
        assert_eq!(sale.fundraiser.reserves.total_active_contributions, 0);
        assert_eq!(sale.fundraiser.reserves.escrow_accumulated, 0);
        assert_eq!(sale.fundraiser.reserves.total_gross_payments, GROSS);
        assert_eq!(sale.allocation_of(&buyer), 0);
        assert!(sale.orders[index as usize].is_refunded());
        sale.assert_invariants();
    }

    #[test]
    fn test_recipient_cannot_refund() {
        let mut sale = Sale::new(sample_config());
        let payer = Pubkey::new_unique();
        let friend = Pubkey::new_unique();
        let index = sale.buy(payer, friend, GROSS).unwrap();

        assert_error(sale.refund(friend, index), FundraiserError::NotPurchaser);
        assert_eq!(sale.orders[index as usize].status, OrderStatus::Open);
    }

    #[test]
    fn test_second_refund_fails() {
        let mut sale = Sale::new(sample_config());
        let buyer = Pubkey::new_unique();
        let index = sale.buy(buyer, buyer, GROSS).unwrap();

        sale.refund(buyer, index).unwrap();
        assert_error(sale.refund(buyer, index), FundraiserError::AlreadyRefunded);
        sale.assert_invariants();
    }

    #[test]
    fn test_refund_moves_curve_back() {
        let mut sale = Sale::new(sample_config());
        let first = Pubkey::new_unique();
        let second = Pubkey::new_unique();

        let a = sale.buy(first, first, GROSS).unwrap();
        let first_tokens = sale.orders[a as usize].token_amount;
        sale.refund(first, a).unwrap();

        let b = sale.buy(second, second, GROSS).unwrap();
        assert_eq!(sale.orders[b as usize].token_amount, first_tokens);
    }

    #[test]
    fn test_redeem_before_deploy_rejected() {
        let mut sale = Sale::new(sample_config());
        let buyer = Pubkey::new_unique();
        let index = sale.buy(buyer, buyer, GROSS).unwrap();
        assert_error(sale.redeem(index), FundraiserError::NotDeployed);
    }

    #[test]
    fn test_quote_matches_buy() {
        let mut sale = Sale::new(sample_config());
        let buyer = Pubkey::new_unique();
        sale.buy(buyer, buyer, GROSS).unwrap();

        let quoted = quote(&sale.fundraiser, GROSS).unwrap();
        let index = sale.buy(buyer, buyer, GROSS).unwrap();
        assert_eq!(quoted.token_amount, sale.orders[index as usize].token_amount);
        assert_eq!(
            quoted.price_after,
            sale.fundraiser
                .curve()
                .unwrap()
                .price_at(sale.fundraiser.reserves.total_active_contributions)
                .unwrap()
        );
    }

    #[test]
    fn test_recipient_order_list_is_capped() {
        let mut sale = Sale::new(sample_config());
        let buyer = Pubkey::new_unique();
        for _ in 0..crate::constants::MAX_ORDERS_PER_RECIPIENT {
            sale.buy(buyer, buyer, 1_000_000).unwrap();
        }
        assert_error(
            sale.buy(buyer, buyer, 1_000_000),
            FundraiserError::TooManyOrders,
        );
    }
}
