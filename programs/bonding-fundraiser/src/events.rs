use anchor_lang::prelude::*;

/// Emitted after an order is recorded.
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseCompleted {
    pub fundraiser: Pubkey,
    pub order_index: u64,
    pub purchaser: Pubkey,
    pub recipient: Pubkey,
    pub gross_payment: u64,
    pub net_contribution: u64,
    pub token_amount: u64,
    /// Counters after the purchase.
    pub total_active_contributions: u64,
    pub total_tokens_allocated: u64,
    /// Marginal price after the purchase (PRICE_SCALE).
    pub price_after: u64,
}

/// Emitted alongside every purchase with the fee breakdown.
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceived {
    pub fundraiser: Pubkey,
    pub order_index: u64,
    pub gross_payment: u64,
    pub protocol_fee: u64,
    pub upfront_net: u64,
    pub escrow_amount: u64,
    pub net_contribution: u64,
    pub total_gross_payments: u64,
    pub escrow_accumulated: u64,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundCompleted {
    pub fundraiser: Pubkey,
    pub order_index: u64,
    pub purchaser: Pubkey,
    /// net_contribution + escrow_returned.
    pub amount_returned: u64,
    pub net_contribution: u64,
    pub escrow_returned: u64,
    pub token_amount: u64,
    pub total_active_contributions: u64,
    pub total_tokens_allocated: u64,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionCompleted {
    pub fundraiser: Pubkey,
    pub order_index: u64,
    pub recipient: Pubkey,
    pub original_tokens: u64,
    pub bonus_tokens: u64,
    pub total_tokens: u64,
    /// gross_payment / total_tokens (PRICE_SCALE).
    pub effective_price: u64,
    pub bonus_distributed: u64,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowReleased {
    pub fundraiser: Pubkey,
    pub beneficiary: Pubkey,
    pub amount: u64,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedToLiquidity {
    pub fundraiser: Pubkey,
    pub payment_liquidity: u64,
    pub sale_liquidity: u64,
    pub liquidity_credential: u64,
    pub lp_destination: Pubkey,
    pub orphaned_supply: u64,
    pub total_active_contributions: u64,
    pub total_tokens_allocated: u64,
    pub premature: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    PurchaseCompleted(PurchaseCompleted),
    PaymentReceived(PaymentReceived),
    RefundCompleted(RefundCompleted),
    RedemptionCompleted(RedemptionCompleted),
    EscrowReleased(EscrowReleased),
    DeployedToLiquidity(DeployedToLiquidity),
}

/// Notifications produced by one instruction, in the order they happened.
/// Handlers emit them once the instruction's transfers have gone through.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn append(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn emit_all(self) {
        for event in self.events {
            match event {
                LedgerEvent::PurchaseCompleted(e) => {
                    emit!(e);
                }
                LedgerEvent::PaymentReceived(e) => {
                    emit!(e);
                }
                LedgerEvent::RefundCompleted(e) => {
                    emit!(e);
                }
                LedgerEvent::RedemptionCompleted(e) => {
                    emit!(e);
                }
                LedgerEvent::EscrowReleased(e) => {
                    emit!(e);
                }
                LedgerEvent::DeployedToLiquidity(e) => {
                    emit!(e);
                }
            }
        }
    }
}
