//! One-way transition from sale to liquidity.
//!
//! The normal path runs once the target is reached and is open to anyone.
//! The premature path lets the founder close an under-subscribed sale; the
//! sale tokens reserved for buyers who never came are then shared pro rata
//! across every order that was not refunded, as a bonus paid on redemption.
//!
//! Deployment is split into a plan (all guards, no writes), a commit (ledger
//! writes) and the liquidity record (after the AMM returns its credential),
//! so the handler can commit state before any token leaves the vaults.

use anchor_lang::prelude::*;

use crate::constants::PRICE_SCALE;
use crate::errors::FundraiserError;
use crate::events::{DeployedToLiquidity, EscrowReleased, EventLog, LedgerEvent};
use crate::state::{Fundraiser, Order, OrderStatus};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployPath {
    /// Target reached.
    Normal,
    /// Target not reached; unsold supply becomes redemption bonus.
    Premature,
}

/// Who may trigger which deployment path.
pub trait DeployPolicy {
    fn authorize(&self, fundraiser: &Fundraiser, caller: &Pubkey, path: DeployPath) -> Result<()>;
}

/// Anyone may complete a funded sale; only the founder may cut one short.
pub struct FounderGatedEarlyDeploy;

impl DeployPolicy for FounderGatedEarlyDeploy {
    fn authorize(&self, fundraiser: &Fundraiser, caller: &Pubkey, path: DeployPath) -> Result<()> {
        match path {
            DeployPath::Normal => Ok(()),
            DeployPath::Premature => {
                require_keys_eq!(
                    *caller,
                    fundraiser.founder,
                    FundraiserError::UnauthorizedFounder
                );
                Ok(())
            }
        }
    }
}

/// Vault balances read right before deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VaultBalances {
    pub sale_tokens: u64,
    pub payment_tokens: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeploymentPlan {
    pub path: DeployPath,
    pub escrow_release: u64,
    pub payment_liquidity: u64,
    pub sale_liquidity: u64,
    pub orphaned_supply: u64,
    pub allocation_at_deploy: u64,
}

/// Per-order audit breakdown of a redemption.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedemptionBreakdown {
    pub original: u64,
    pub bonus: u64,
    pub total: u64,
    /// gross_payment / total (PRICE_SCALE).
    pub effective_price: u64,
}

/// Checks every deployment guard and sizes the liquidity legs.
///
/// Asking for the premature path once the target is already reached is
/// treated as the normal path.
pub fn plan_deployment(
    fundraiser: &Fundraiser,
    caller: &Pubkey,
    requested: DeployPath,
    policy: &impl DeployPolicy,
    balances: VaultBalances,
) -> Result<DeploymentPlan> {
    require!(!fundraiser.is_deployed, FundraiserError::AlreadyDeployed);

    let path = if fundraiser.target_reached() {
        DeployPath::Normal
    } else {
        require!(
            requested == DeployPath::Premature,
            FundraiserError::TargetNotReached
        );
        DeployPath::Premature
    };
    policy.authorize(fundraiser, caller, path)?;

    let reserves = fundraiser.reserves;
    require!(
        reserves.total_active_contributions > 0,
        FundraiserError::NothingToDeploy
    );
    require!(
        fundraiser.has_sufficient_reserve(balances.sale_tokens)?,
        FundraiserError::InsufficientReserve
    );

    // Both legs come from the ledger. Tokens sent straight to a vault are
    // left where they are.
    let escrow_release = reserves.escrow_accumulated;
    let payment_liquidity = reserves.total_active_contributions;
    let held = payment_liquidity
        .checked_add(escrow_release)
        .ok_or(FundraiserError::MathOverflow)?;
    require!(
        balances.payment_tokens >= held,
        FundraiserError::InvalidVault
    );

    // The pool opens at the curve's end price.
    let sale_liquidity = fundraiser.curve()?.tokens_at_end_price(payment_liquidity)?;
    let committed = sale_liquidity
        .checked_add(reserves.total_tokens_allocated)
        .ok_or(FundraiserError::MathOverflow)?;
    require!(
        committed <= balances.sale_tokens,
        FundraiserError::InsufficientReserve
    );
    let orphaned_supply = balances.sale_tokens - committed;

    Ok(DeploymentPlan {
        path,
        escrow_release,
        payment_liquidity,
        sale_liquidity,
        orphaned_supply,
        allocation_at_deploy: reserves.total_tokens_allocated,
    })
}

/// Marks the fundraiser deployed. Irreversible.
pub fn commit_deployment(
    fundraiser: &mut Fundraiser,
    fundraiser_key: Pubkey,
    plan: &DeploymentPlan,
    now: i64,
) -> EventLog {
    fundraiser.is_deployed = true;
    fundraiser.deployed_early = plan.path == DeployPath::Premature;
    fundraiser.deployed_at = now;
    fundraiser.escrow_released = plan.escrow_release;
    fundraiser.reserves.escrow_accumulated = 0;
    fundraiser.liquidity_payment_seeded = plan.payment_liquidity;
    fundraiser.liquidity_tokens_seeded = plan.sale_liquidity;
    fundraiser.orphaned_supply = plan.orphaned_supply;
    fundraiser.allocation_at_deploy = plan.allocation_at_deploy;

    msg!(
        "FUNDRAISER: Deployed ({:?}). Escrow {}, pool {} / {}, orphaned {}",
        plan.path,
        plan.escrow_release,
        plan.payment_liquidity,
        plan.sale_liquidity,
        plan.orphaned_supply
    );

    let mut log = EventLog::new();
    log.push(LedgerEvent::EscrowReleased(EscrowReleased {
        fundraiser: fundraiser_key,
        beneficiary: fundraiser.config.beneficiary,
        amount: plan.escrow_release,
    }));
    log
}

/// Records the credential the AMM minted for the seeded liquidity.
pub fn record_liquidity(
    fundraiser: &mut Fundraiser,
    fundraiser_key: Pubkey,
    liquidity_credential: u64,
) -> EventLog {
    fundraiser.liquidity_credential = liquidity_credential;

    msg!(
        "FUNDRAISER: {} liquidity credential sent to {}",
        liquidity_credential,
        fundraiser.config.lp_destination
    );

    let mut log = EventLog::new();
    log.push(LedgerEvent::DeployedToLiquidity(DeployedToLiquidity {
        fundraiser: fundraiser_key,
        payment_liquidity: fundraiser.liquidity_payment_seeded,
        sale_liquidity: fundraiser.liquidity_tokens_seeded,
        liquidity_credential,
        lp_destination: fundraiser.config.lp_destination,
        orphaned_supply: fundraiser.orphaned_supply,
        total_active_contributions: fundraiser.reserves.total_active_contributions,
        total_tokens_allocated: fundraiser.reserves.total_tokens_allocated,
        premature: fundraiser.deployed_early,
    }));
    log
}

/// Original entitlement plus this order's share of the orphaned supply.
///
/// `bonus = orphaned · token_amount / allocation_at_deploy`, floored and
/// clamped to what is still undistributed, so the running total can never
/// pass `orphaned_supply`. Floor dust stays in the vault.
pub fn redemption_breakdown(fundraiser: &Fundraiser, order: &Order) -> Result<RedemptionBreakdown> {
    let bonus = if fundraiser.allocation_at_deploy == 0 {
        0
    } else {
        let share = (fundraiser.orphaned_supply as u128)
            .checked_mul(order.token_amount as u128)
            .ok_or(FundraiserError::MathOverflow)?
            / fundraiser.allocation_at_deploy as u128;
        let remaining = fundraiser
            .orphaned_supply
            .saturating_sub(fundraiser.bonus_distributed);
        u64::try_from(share)
            .map_err(|_| error!(FundraiserError::MathOverflow))?
            .min(remaining)
    };

    let total = order
        .token_amount
        .checked_add(bonus)
        .ok_or(FundraiserError::MathOverflow)?;

    Ok(RedemptionBreakdown {
        original: order.token_amount,
        bonus,
        total,
        effective_price: effective_price(order.gross_payment, total)?,
    })
}

fn effective_price(gross_payment: u64, total: u64) -> Result<u64> {
    if total == 0 {
        return Ok(0);
    }
    u64::try_from(
        (gross_payment as u128)
            .checked_mul(PRICE_SCALE as u128)
            .ok_or(FundraiserError::MathOverflow)?
            / total as u128,
    )
    .map_err(|_| error!(FundraiserError::MathOverflow))
}

/// What `redeem` pays (or paid) for `order`, without moving anything.
pub fn preview_redemption(fundraiser: &Fundraiser, order: &Order) -> Result<RedemptionBreakdown> {
    match order.status {
        OrderStatus::Refunded => err!(FundraiserError::AlreadyRefunded),
        OrderStatus::Open => redemption_breakdown(fundraiser, order),
        OrderStatus::Redeemed => {
            // Already settled: report the bonus actually paid.
            let mut settled = redemption_breakdown(fundraiser, order)?;
            settled.bonus = order.bonus_amount;
            settled.total = order
                .token_amount
                .checked_add(order.bonus_amount)
                .ok_or(FundraiserError::MathOverflow)?;
            settled.effective_price = effective_price(order.gross_payment, settled.total)?;
            Ok(settled)
        }
    }
}
