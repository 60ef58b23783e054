use anchor_lang::prelude::*;

use crate::config::FundraiserConfig;
use crate::constants::{FUNDRAISER_SEED, MAX_ORDERS_PER_RECIPIENT};
use crate::curve::CurveParams;
use crate::errors::FundraiserError;
use crate::reserve::ReserveCounters;

// ─────────────────────────────────────────────────────────────────────────────
// Fundraiser — one per sale
// ─────────────────────────────────────────────────────────────────────────────
// PDA seeds: [b"fundraiser", sale_mint.key().as_ref(), founder.key().as_ref()]

#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct Fundraiser {
    /// The wallet that created this sale. Only it may deploy early.
    pub founder: Pubkey,

    /// Token being sold.
    pub sale_mint: Pubkey,

    /// Token buyers pay with.
    pub payment_mint: Pubkey,

    /// Immutable sale parameters.
    pub config: FundraiserConfig,

    /// Sequence number handed to the next order.
    pub order_counter: u64,

    /// Aggregate counters kept in step with the orders.
    pub reserves: ReserveCounters,

    /// Terminal flag, set once by deployment.
    pub is_deployed: bool,

    /// Deployment happened before the target was reached.
    pub deployed_early: bool,

    /// Unix timestamp of deployment (0 until then).
    pub deployed_at: i64,

    /// Escrow paid to the beneficiary at deployment.
    pub escrow_released: u64,

    /// Payment tokens and sale tokens handed to the AMM.
    pub liquidity_payment_seeded: u64,
    pub liquidity_tokens_seeded: u64,

    /// Liquidity credential amount returned by the AMM.
    pub liquidity_credential: u64,

    /// Unsold sale tokens shared among unredeemed orders.
    pub orphaned_supply: u64,

    /// Allocation total the orphaned supply is prorated against.
    pub allocation_at_deploy: u64,

    /// Bonus tokens paid out so far (never above `orphaned_supply`).
    pub bonus_distributed: u64,

    /// Base plus bonus tokens paid out so far.
    pub tokens_redeemed: u64,

    /// Set for the duration of a mutating instruction.
    pub reentrancy_lock: bool,

    pub bump: u8,
    pub sale_vault_bump: u8,
    pub payment_vault_bump: u8,

    /// Reserved space for future upgrades.
    pub _reserved: [u8; 64],
}

impl Fundraiser {
    pub const MAX_SIZE: usize = 8  // discriminator
        + 32  // founder
        + 32  // sale_mint
        + 32  // payment_mint
        + (7 * 8 + 4 * 32)  // config
        + 8   // order_counter
        + ReserveCounters::SIZE
        + 1   // is_deployed
        + 1   // deployed_early
        + 8   // deployed_at
        + 8   // escrow_released
        + 8   // liquidity_payment_seeded
        + 8   // liquidity_tokens_seeded
        + 8   // liquidity_credential
        + 8   // orphaned_supply
        + 8   // allocation_at_deploy
        + 8   // bonus_distributed
        + 8   // tokens_redeemed
        + 1   // reentrancy_lock
        + 1   // bump
        + 1   // sale_vault_bump
        + 1   // payment_vault_bump
        + 64; // _reserved

    pub fn new(
        founder: Pubkey,
        sale_mint: Pubkey,
        payment_mint: Pubkey,
        config: FundraiserConfig,
    ) -> Result<Self> {
        config.validate()?;
        require!(sale_mint != payment_mint, FundraiserError::InvalidMint);

        Ok(Self {
            founder,
            sale_mint,
            payment_mint,
            config,
            order_counter: 0,
            reserves: ReserveCounters::default(),
            is_deployed: false,
            deployed_early: false,
            deployed_at: 0,
            escrow_released: 0,
            liquidity_payment_seeded: 0,
            liquidity_tokens_seeded: 0,
            liquidity_credential: 0,
            orphaned_supply: 0,
            allocation_at_deploy: 0,
            bonus_distributed: 0,
            tokens_redeemed: 0,
            reentrancy_lock: false,
            bump: 0,
            sale_vault_bump: 0,
            payment_vault_bump: 0,
            _reserved: [0u8; 64],
        })
    }

    pub fn curve(&self) -> Result<CurveParams> {
        CurveParams::from_config(&self.config)
    }

    pub fn target_reached(&self) -> bool {
        self.reserves.total_active_contributions >= self.config.target_liquidity
    }

    /// Marginal price at the current curve position (PRICE_SCALE).
    pub fn current_price(&self) -> Result<u64> {
        self.curve()?
            .price_at(self.reserves.total_active_contributions)
    }

    pub fn status(&self) -> Result<SaleStatus> {
        Ok(SaleStatus {
            is_deployed: self.is_deployed,
            deployed_early: self.deployed_early,
            target_reached: self.target_reached(),
            order_counter: self.order_counter,
            total_active_contributions: self.reserves.total_active_contributions,
            total_gross_payments: self.reserves.total_gross_payments,
            total_tokens_allocated: self.reserves.total_tokens_allocated,
            escrow_accumulated: self.reserves.escrow_accumulated,
            remaining_capacity: self.remaining_capacity(),
            current_price: self.current_price()?,
            orphaned_supply: self.orphaned_supply,
            bonus_distributed: self.bonus_distributed,
        })
    }

    /// Redemption opens once deployed, normally or early.
    pub fn is_redeemable(&self) -> bool {
        self.is_deployed && (self.target_reached() || self.deployed_early)
    }

    /// Checked-and-set at the start of every mutating instruction.
    pub fn lock(&mut self) -> Result<()> {
        require!(!self.reentrancy_lock, FundraiserError::Reentrancy);
        self.reentrancy_lock = true;
        Ok(())
    }

    pub fn unlock(&mut self) {
        self.reentrancy_lock = false;
    }

    pub fn signer_seeds(&self) -> [&[u8]; 4] {
        [
            FUNDRAISER_SEED,
            self.sale_mint.as_ref(),
            self.founder.as_ref(),
            std::slice::from_ref(&self.bump),
        ]
    }
}

/// Snapshot returned by the `sale_status` view.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaleStatus {
    pub is_deployed: bool,
    pub deployed_early: bool,
    pub target_reached: bool,
    pub order_counter: u64,
    pub total_active_contributions: u64,
    pub total_gross_payments: u64,
    pub total_tokens_allocated: u64,
    pub escrow_accumulated: u64,
    pub remaining_capacity: u64,
    pub current_price: u64,
    pub orphaned_supply: u64,
    pub bonus_distributed: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Order — one per purchase
// ─────────────────────────────────────────────────────────────────────────────
// PDA seeds: [b"order", fundraiser.key().as_ref(), &order_index.to_le_bytes()]

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum OrderStatus {
    /// Purchased; may still be refunded (before deployment) or redeemed (after).
    #[default]
    Open,
    /// Payment returned to the purchaser. Terminal.
    Refunded,
    /// Tokens paid to the recipient. Terminal.
    Redeemed,
}

#[account]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Order {
    /// The fundraiser this order belongs to.
    pub fundraiser: Pubkey,

    /// Sequence number assigned at purchase.
    pub order_index: u64,

    /// Everything the purchaser paid, fees included.
    pub gross_payment: u64,

    /// Post-fee amount credited toward the target.
    pub net_contribution: u64,

    /// Fee share held in escrow for this order. Returned on refund.
    pub escrow_amount: u64,

    /// Sale tokens owed, frozen at purchase.
    pub token_amount: u64,

    /// Orphaned-supply share paid at redemption (0 until then).
    pub bonus_amount: u64,

    /// Wallet that paid. Only it may refund.
    pub purchaser: Pubkey,

    /// Wallet that receives the tokens.
    pub recipient: Pubkey,

    pub status: OrderStatus,

    /// Unix timestamp of the purchase.
    pub created_at: i64,

    pub bump: u8,
}

impl Order {
    pub const MAX_SIZE: usize = 8  // discriminator
        + 32  // fundraiser
        + 8   // order_index
        + 8   // gross_payment
        + 8   // net_contribution
        + 8   // escrow_amount
        + 8   // token_amount
        + 8   // bonus_amount
        + 32  // purchaser
        + 32  // recipient
        + 1   // status (enum)
        + 8   // created_at
        + 1;  // bump

    pub fn is_refunded(&self) -> bool {
        self.status == OrderStatus::Refunded
    }

    pub fn is_redeemed(&self) -> bool {
        self.status == OrderStatus::Redeemed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RecipientLedger — per-recipient allocation and order list
// ─────────────────────────────────────────────────────────────────────────────
// PDA seeds: [b"recipient", fundraiser.key().as_ref(), recipient.key().as_ref()]

#[account]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RecipientLedger {
    pub fundraiser: Pubkey,

    pub recipient: Pubkey,

    /// Sum of `token_amount` over this recipient's non-refunded orders.
    pub allocation: u64,

    /// Indices of every order bought for this recipient, refunded or not.
    pub order_indices: Vec<u64>,

    pub bump: u8,
}

impl RecipientLedger {
    pub const MAX_SIZE: usize = 8  // discriminator
        + 32  // fundraiser
        + 32  // recipient
        + 8   // allocation
        + 4 + (8 * MAX_ORDERS_PER_RECIPIENT)  // Vec<u64>
        + 1;  // bump

    pub fn has_capacity(&self) -> bool {
        self.order_indices.len() < MAX_ORDERS_PER_RECIPIENT
    }
}
