use anchor_lang::prelude::*;

#[error_code]
pub enum FundraiserError {
    // ── Validation ──────────────────────────────────────────────────────
    #[msg("Purchase is below the minimum amount")]
    BelowMinimum,
    #[msg("Exceeds target")]
    ExceedsTarget,
    #[msg("Price must be greater than zero")]
    ZeroPrice,
    #[msg("End price must be above start price")]
    InvalidPriceRange,
    #[msg("Target liquidity must be greater than zero")]
    ZeroTarget,
    #[msg("Minimum purchase must be greater than zero")]
    ZeroMinimum,
    #[msg("Fee fractions are out of range")]
    InvalidFees,
    #[msg("Address must not be the default key")]
    ZeroAddress,
    #[msg("Curve parameters give an empty sale supply")]
    EmptySaleSupply,
    #[msg("Amount must be greater than zero")]
    ZeroAmount,
    #[msg("Purchase would allocate zero tokens")]
    ZeroTokenAmount,

    // ── State guards ────────────────────────────────────────────────────
    #[msg("Target not reached yet")]
    TargetNotReached,
    #[msg("Not yet deployed")]
    NotDeployed,
    #[msg("Sale completed")]
    SaleCompleted,
    #[msg("Already redeemed")]
    AlreadyRedeemed,
    #[msg("Already refunded")]
    AlreadyRefunded,
    #[msg("Already deployed")]
    AlreadyDeployed,
    #[msg("Nothing has been contributed yet")]
    NothingToDeploy,
    #[msg("Recipient order list is full")]
    TooManyOrders,
    #[msg("Reentrant call rejected")]
    Reentrancy,

    // ── Authorization ───────────────────────────────────────────────────
    #[msg("Not the purchaser")]
    NotPurchaser,
    #[msg("Only the founder can call this")]
    UnauthorizedFounder,

    // ── Resource ────────────────────────────────────────────────────────
    #[msg("Insufficient sale token reserve")]
    InsufficientReserve,

    // ── Accounts / collaborators ────────────────────────────────────────
    #[msg("Invalid mint for this fundraiser")]
    InvalidMint,
    #[msg("Token account does not belong to the expected owner")]
    InvalidTokenAccount,
    #[msg("Vault balance does not cover what the ledger holds")]
    InvalidVault,
    #[msg("AMM program does not match the configured one")]
    InvalidAmmProgram,
    #[msg("AMM did not return a liquidity amount")]
    AmmReturnDataMissing,
    #[msg("Order does not belong to this fundraiser")]
    OrderMismatch,
    #[msg("Arithmetic overflow")]
    MathOverflow,
}

#[cfg(test)]
pub(crate) fn assert_error<T: std::fmt::Debug>(result: Result<T>, expected: FundraiserError) {
    let err = result.expect_err("expected the call to fail");
    assert_eq!(
        ProgramError::from(err),
        ProgramError::from(Error::from(expected)),
    );
}
