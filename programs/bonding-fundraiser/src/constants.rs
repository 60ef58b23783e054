/// Fixed-point basis for every fee fraction (parts per 100,000,000).
pub const FEE_BASIS: u64 = 100_000_000;

/// Prices are payment base units per sale-token base unit, scaled by this.
/// e.g. 10_000_000_000 = 0.01 payment units per sale unit.
pub const PRICE_SCALE: u64 = 1_000_000_000_000;

/// Extra sale-token unit held back when sizing the reserve, absorbs
/// the floor on the liquidity and supply terms.
pub const RESERVE_ROUNDING_BUFFER: u64 = 1;

/// Fixed-size order-index list per recipient.
pub const MAX_ORDERS_PER_RECIPIENT: usize = 32;

// ─────────────────────────────────────────────────────────────────────────────
// PDA seeds
// ─────────────────────────────────────────────────────────────────────────────

pub const FUNDRAISER_SEED: &[u8] = b"fundraiser";
pub const SALE_VAULT_SEED: &[u8] = b"sale_vault";
pub const PAYMENT_VAULT_SEED: &[u8] = b"payment_vault";
pub const ORDER_SEED: &[u8] = b"order";
pub const RECIPIENT_SEED: &[u8] = b"recipient";
