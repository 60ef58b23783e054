use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, TokenAccount, TokenInterface, TransferChecked};

pub mod amm;
pub mod config;
pub mod constants;
pub mod curve;
pub mod deployment;
pub mod errors;
pub mod events;
pub mod fees;
pub mod ledger;
pub mod reserve;
pub mod state;

#[cfg(test)]
mod test_utils;

use config::FundraiserConfig;
use constants::*;
use deployment::{DeployPath, FounderGatedEarlyDeploy, RedemptionBreakdown, VaultBalances};
use errors::FundraiserError;
use ledger::{Purchase, Quote};
use state::*;

declare_id!("g3pL1dN13vH4aV6wQ1DNFXVr5e54YWZD6JHKYJkod8i");

#[program]
pub mod bonding_fundraiser {
    use super::*;

    // ═════════════════════════════════════════════════════════════════════
    // 1. INITIALIZE
    // ═════════════════════════════════════════════════════════════════════
    /// Founder opens a sale of `sale_mint` priced in `payment_mint`.
    ///
    /// Creates the fundraiser PDA and both vaults. The sale vault still has
    /// to be filled with `fund_reserve` before the sale can be deployed.
    pub fn initialize(ctx: Context<Initialize>, config: FundraiserConfig) -> Result<()> {
        let mut fundraiser = Fundraiser::new(
            ctx.accounts.founder.key(),
            ctx.accounts.sale_mint.key(),
            ctx.accounts.payment_mint.key(),
            config,
        )?;
        fundraiser.bump = ctx.bumps.fundraiser;
        fundraiser.sale_vault_bump = ctx.bumps.sale_vault;
        fundraiser.payment_vault_bump = ctx.bumps.payment_vault;

        let curve = fundraiser.curve()?;
        let required = fundraiser.required_reserve()?;
        ctx.accounts.fundraiser.set_inner(fundraiser);

        msg!(
            "FUNDRAISER: Sale opened. Supply {} over {} -> {}, reserve needed {}",
            curve.sale_supply(),
            curve.start_price(),
            curve.end_price(),
            required
        );

        Ok(())
    }

    // ═════════════════════════════════════════════════════════════════════
    // 2. FUND RESERVE
    // ═════════════════════════════════════════════════════════════════════
    /// Moves sale tokens into the sale vault. Anyone may top it up.
    pub fn fund_reserve(ctx: Context<FundReserve>, amount: u64) -> Result<()> {
        require!(amount > 0, FundraiserError::ZeroAmount);
        require!(
            !ctx.accounts.fundraiser.is_deployed,
            FundraiserError::SaleCompleted
        );

        transfer_from_owner(
            &ctx.accounts.token_program,
            &ctx.accounts.funder_token_account,
            &ctx.accounts.sale_mint,
            &ctx.accounts.sale_vault,
            ctx.accounts.funder.to_account_info(),
            amount,
        )?;

        ctx.accounts.sale_vault.reload()?;
        msg!(
            "FUNDRAISER: Reserve funded with {} (vault {}, needed {})",
            amount,
            ctx.accounts.sale_vault.amount,
            ctx.accounts.fundraiser.required_reserve()?
        );

        Ok(())
    }

    // ═════════════════════════════════════════════════════════════════════
    // 3. BUY
    // ═════════════════════════════════════════════════════════════════════
    /// Pays `gross_payment` and books the tokens it buys for `recipient`.
    ///
    /// The order is committed first; the fee legs and the vault deposit
    /// follow in one pass.
    pub fn buy(mut ctx: Context<Buy>, gross_payment: u64, recipient: Pubkey) -> Result<()> {
        let fundraiser_key = ctx.accounts.fundraiser.key();
        let now = Clock::get()?.unix_timestamp;
        let accounts = &mut ctx.accounts;

        // ── Commit ──────────────────────────────────────────────────────
        accounts.fundraiser.lock()?;
        let purchase = Purchase {
            fundraiser: fundraiser_key,
            purchaser: accounts.purchaser.key(),
            recipient,
            gross_payment,
            now,
        };
        let (receipt, log) = ledger::buy(
            &mut accounts.fundraiser,
            &mut accounts.order,
            &mut accounts.recipient_ledger,
            &purchase,
        )?;
        accounts.order.bump = ctx.bumps.order;
        accounts.recipient_ledger.bump = ctx.bumps.recipient_ledger;
        accounts.fundraiser.exit(&crate::ID)?;

        // ── Payout ──────────────────────────────────────────────────────
        let payer = accounts.purchaser.to_account_info();
        transfer_from_owner(
            &accounts.token_program,
            &accounts.purchaser_token_account,
            &accounts.payment_mint,
            &accounts.treasury_token_account,
            payer.clone(),
            receipt.split.protocol_fee,
        )?;
        transfer_from_owner(
            &accounts.token_program,
            &accounts.purchaser_token_account,
            &accounts.payment_mint,
            &accounts.beneficiary_token_account,
            payer.clone(),
            receipt.split.upfront_net,
        )?;
        let deposit = receipt
            .split
            .net_contribution
            .checked_add(receipt.split.escrow_amount)
            .ok_or(FundraiserError::MathOverflow)?;
        transfer_from_owner(
            &accounts.token_program,
            &accounts.purchaser_token_account,
            &accounts.payment_mint,
            &accounts.payment_vault,
            payer,
            deposit,
        )?;

        accounts.fundraiser.unlock();
        log.emit_all();

        Ok(())
    }

    // ═════════════════════════════════════════════════════════════════════
    // 4. REFUND
    // ═════════════════════════════════════════════════════════════════════
    /// Purchaser takes back net contribution and escrow share before
    /// deployment. Upfront fees are not returned.
    pub fn refund(mut ctx: Context<Refund>) -> Result<()> {
        let accounts = &mut ctx.accounts;

        accounts.fundraiser.lock()?;
        let caller = accounts.purchaser.key();
        let (receipt, log) = ledger::refund(
            &mut accounts.fundraiser,
            &mut accounts.order,
            &mut accounts.recipient_ledger,
            &caller,
        )?;
        accounts.fundraiser.exit(&crate::ID)?;

        let fundraiser = &accounts.fundraiser;
        transfer_from_vault(
            &accounts.token_program,
            &accounts.payment_vault,
            &accounts.payment_mint,
            &accounts.purchaser_token_account,
            fundraiser.to_account_info(),
            &fundraiser.signer_seeds(),
            receipt.amount,
        )?;

        accounts.fundraiser.unlock();
        log.emit_all();

        Ok(())
    }

    // ═════════════════════════════════════════════════════════════════════
    // 5. REDEEM
    // ═════════════════════════════════════════════════════════════════════
    /// Pays an order's tokens plus its orphaned-supply bonus to the
    /// recipient. Anyone may crank it.
    pub fn redeem(mut ctx: Context<Redeem>) -> Result<()> {
        let accounts = &mut ctx.accounts;

        accounts.fundraiser.lock()?;
        let (breakdown, log) = ledger::redeem(&mut accounts.fundraiser, &mut accounts.order)?;
        accounts.fundraiser.exit(&crate::ID)?;

        let fundraiser = &accounts.fundraiser;
        transfer_from_vault(
            &accounts.token_program,
            &accounts.sale_vault,
            &accounts.sale_mint,
            &accounts.recipient_token_account,
            fundraiser.to_account_info(),
            &fundraiser.signer_seeds(),
            breakdown.total,
        )?;

        accounts.fundraiser.unlock();
        log.emit_all();

        Ok(())
    }

    // ═════════════════════════════════════════════════════════════════════
    // 6. DEPLOY
    // ═════════════════════════════════════════════════════════════════════
    /// Completes a sale that reached its target. Permissionless.
    ///
    /// Pool-specific accounts for the AMM go in `remaining_accounts`.
    pub fn deploy<'info>(ctx: Context<'_, '_, '_, 'info, Deploy<'info>>) -> Result<()> {
        run_deployment(ctx, DeployPath::Normal)
    }

    // ═════════════════════════════════════════════════════════════════════
    // 7. DEPLOY EARLY
    // ═════════════════════════════════════════════════════════════════════
    /// Founder closes an under-subscribed sale. Unsold supply is shared
    /// among the remaining orders on redemption.
    pub fn deploy_early<'info>(ctx: Context<'_, '_, '_, 'info, Deploy<'info>>) -> Result<()> {
        run_deployment(ctx, DeployPath::Premature)
    }

    // ═════════════════════════════════════════════════════════════════════
    // 8. VIEWS
    // ═════════════════════════════════════════════════════════════════════

    pub fn current_price(ctx: Context<ViewFundraiser>) -> Result<u64> {
        ctx.accounts.fundraiser.current_price()
    }

    pub fn minimum_purchase(ctx: Context<ViewFundraiser>) -> Result<u64> {
        Ok(ctx.accounts.fundraiser.config.min_purchase)
    }

    pub fn required_reserve(ctx: Context<ViewFundraiser>) -> Result<u64> {
        ctx.accounts.fundraiser.required_reserve()
    }

    pub fn escrowed_amount(ctx: Context<ViewFundraiser>) -> Result<u64> {
        Ok(ctx.accounts.fundraiser.reserves.escrow_accumulated)
    }

    pub fn sale_status(ctx: Context<ViewFundraiser>) -> Result<SaleStatus> {
        ctx.accounts.fundraiser.status()
    }

    /// Fee split and token amount `gross_payment` would get right now.
    pub fn quote_buy(ctx: Context<ViewFundraiser>, gross_payment: u64) -> Result<Quote> {
        ledger::quote(&ctx.accounts.fundraiser, gross_payment)
    }

    /// Zero for a recipient that never received an order.
    pub fn allocation_of(ctx: Context<ViewRecipient>, _recipient: Pubkey) -> Result<u64> {
        Ok(load_recipient_ledger(&ctx.accounts.recipient_ledger)?.allocation)
    }

    pub fn order_indices_of(ctx: Context<ViewRecipient>, _recipient: Pubkey) -> Result<Vec<u64>> {
        Ok(load_recipient_ledger(&ctx.accounts.recipient_ledger)?.order_indices)
    }

    pub fn redemption_preview(ctx: Context<ViewOrder>) -> Result<RedemptionBreakdown> {
        deployment::preview_redemption(&ctx.accounts.fundraiser, &ctx.accounts.order)
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═════════════════════════════════════════════════════════════════════════════

fn run_deployment<'info>(
    ctx: Context<'_, '_, '_, 'info, Deploy<'info>>,
    requested: DeployPath,
) -> Result<()> {
    let fundraiser_key = ctx.accounts.fundraiser.key();
    let now = Clock::get()?.unix_timestamp;
    let accounts = ctx.accounts;

    // ── Plan + commit ───────────────────────────────────────────────────
    accounts.fundraiser.lock()?;
    let balances = VaultBalances {
        sale_tokens: accounts.sale_vault.amount,
        payment_tokens: accounts.payment_vault.amount,
    };
    let plan = deployment::plan_deployment(
        &accounts.fundraiser,
        &accounts.caller.key(),
        requested,
        &FounderGatedEarlyDeploy,
        balances,
    )?;
    let mut log =
        deployment::commit_deployment(&mut accounts.fundraiser, fundraiser_key, &plan, now);
    accounts.fundraiser.exit(&crate::ID)?;

    // ── Escrow → beneficiary ────────────────────────────────────────────
    let fundraiser = &accounts.fundraiser;
    let seeds = fundraiser.signer_seeds();
    let authority = fundraiser.to_account_info();
    transfer_from_vault(
        &accounts.token_program,
        &accounts.payment_vault,
        &accounts.payment_mint,
        &accounts.beneficiary_token_account,
        authority.clone(),
        &seeds,
        plan.escrow_release,
    )?;

    // ── Seed the pool ───────────────────────────────────────────────────
    let payer = accounts.caller.to_account_info();
    let payment_mint = accounts.payment_mint.to_account_info();
    let sale_mint = accounts.sale_mint.to_account_info();
    let payment_vault = accounts.payment_vault.to_account_info();
    let sale_vault = accounts.sale_vault.to_account_info();
    let recipient = accounts.lp_destination.to_account_info();
    let token_program = accounts.token_program.to_account_info();
    let amm_program = accounts.amm_program.to_account_info();
    let amm_accounts = amm::AmmAccounts {
        amm_program: &amm_program,
        payer: &payer,
        authority: &authority,
        token_a_mint: &payment_mint,
        token_b_mint: &sale_mint,
        source_a: &payment_vault,
        source_b: &sale_vault,
        recipient: &recipient,
        token_program: &token_program,
        pool_accounts: ctx.remaining_accounts,
    };
    amm::create_pair(&amm_accounts, &seeds)?;
    let credential = amm::add_liquidity(
        &amm_accounts,
        amm::LiquidityLegs {
            amount_a: plan.payment_liquidity,
            amount_b: plan.sale_liquidity,
        },
        &seeds,
    )?;

    // ── Record + release ────────────────────────────────────────────────
    log.append(deployment::record_liquidity(
        &mut accounts.fundraiser,
        fundraiser_key,
        credential,
    ));
    accounts.fundraiser.unlock();
    log.emit_all();

    Ok(())
}

/// Transfer signed by the account owner (purchaser or funder).
fn transfer_from_owner<'info>(
    token_program: &Interface<'info, TokenInterface>,
    from: &InterfaceAccount<'info, TokenAccount>,
    mint: &InterfaceAccount<'info, Mint>,
    to: &InterfaceAccount<'info, TokenAccount>,
    authority: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token_interface::transfer_checked(
        CpiContext::new(
            token_program.to_account_info(),
            TransferChecked {
                from: from.to_account_info(),
                mint: mint.to_account_info(),
                to: to.to_account_info(),
                authority,
            },
        ),
        amount,
        mint.decimals,
    )
}

/// Transfer out of a vault, signed by the fundraiser PDA.
fn transfer_from_vault<'info>(
    token_program: &Interface<'info, TokenInterface>,
    vault: &InterfaceAccount<'info, TokenAccount>,
    mint: &InterfaceAccount<'info, Mint>,
    to: &InterfaceAccount<'info, TokenAccount>,
    authority: AccountInfo<'info>,
    signer_seeds: &[&[u8]],
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token_interface::transfer_checked(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            TransferChecked {
                from: vault.to_account_info(),
                mint: mint.to_account_info(),
                to: to.to_account_info(),
                authority,
            },
            &[signer_seeds],
        ),
        amount,
        mint.decimals,
    )
}

/// Missing ledger accounts read as an empty ledger.
fn load_recipient_ledger(info: &UncheckedAccount) -> Result<RecipientLedger> {
    if info.owner != &crate::ID || info.data_is_empty() {
        return Ok(RecipientLedger::default());
    }
    let data = info.try_borrow_data()?;
    RecipientLedger::try_deserialize(&mut &data[..])
}

// ═════════════════════════════════════════════════════════════════════════════
// ACCOUNT CONTEXTS
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Sale founder, pays for the accounts. Only it may deploy early.
    #[account(mut)]
    pub founder: Signer<'info>,

    #[account(mint::token_program = token_program)]
    pub sale_mint: InterfaceAccount<'info, Mint>,

    #[account(mint::token_program = token_program)]
    pub payment_mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = founder,
        space = Fundraiser::MAX_SIZE,
        seeds = [FUNDRAISER_SEED, sale_mint.key().as_ref(), founder.key().as_ref()],
        bump,
    )]
    pub fundraiser: Account<'info, Fundraiser>,

    /// Sale tokens: reserve, pool leg and redemptions.
    #[account(
        init,
        payer = founder,
        seeds = [SALE_VAULT_SEED, fundraiser.key().as_ref()],
        bump,
        token::mint = sale_mint,
        token::authority = fundraiser,
        token::token_program = token_program,
    )]
    pub sale_vault: InterfaceAccount<'info, TokenAccount>,

    /// Payment tokens: active contributions plus escrow.
    #[account(
        init,
        payer = founder,
        seeds = [PAYMENT_VAULT_SEED, fundraiser.key().as_ref()],
        bump,
        token::mint = payment_mint,
        token::authority = fundraiser,
        token::token_program = token_program,
    )]
    pub payment_vault: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct FundReserve<'info> {
    pub funder: Signer<'info>,

    #[account(
        seeds = [FUNDRAISER_SEED, fundraiser.sale_mint.as_ref(), fundraiser.founder.as_ref()],
        bump = fundraiser.bump,
    )]
    pub fundraiser: Account<'info, Fundraiser>,

    #[account(address = fundraiser.sale_mint @ FundraiserError::InvalidMint)]
    pub sale_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        token::mint = sale_mint,
        constraint = funder_token_account.owner == funder.key() @ FundraiserError::InvalidTokenAccount,
    )]
    pub funder_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [SALE_VAULT_SEED, fundraiser.key().as_ref()],
        bump = fundraiser.sale_vault_bump,
    )]
    pub sale_vault: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

#[derive(Accounts)]
#[instruction(gross_payment: u64, recipient: Pubkey)]
pub struct Buy<'info> {
    /// Pays, and is the only one who can refund.
    #[account(mut)]
    pub purchaser: Signer<'info>,

    #[account(
        mut,
        seeds = [FUNDRAISER_SEED, fundraiser.sale_mint.as_ref(), fundraiser.founder.as_ref()],
        bump = fundraiser.bump,
    )]
    pub fundraiser: Account<'info, Fundraiser>,

    #[account(
        init,
        payer = purchaser,
        space = Order::MAX_SIZE,
        seeds = [ORDER_SEED, fundraiser.key().as_ref(), &fundraiser.order_counter.to_le_bytes()],
        bump,
    )]
    pub order: Account<'info, Order>,

    /// Created on the recipient's first order.
    #[account(
        init_if_needed,
        payer = purchaser,
        space = RecipientLedger::MAX_SIZE,
        seeds = [RECIPIENT_SEED, fundraiser.key().as_ref(), recipient.as_ref()],
        bump,
    )]
    pub recipient_ledger: Account<'info, RecipientLedger>,

    #[account(address = fundraiser.payment_mint @ FundraiserError::InvalidMint)]
    pub payment_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        token::mint = payment_mint,
        constraint = purchaser_token_account.owner == purchaser.key() @ FundraiserError::InvalidTokenAccount,
    )]
    pub purchaser_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [PAYMENT_VAULT_SEED, fundraiser.key().as_ref()],
        bump = fundraiser.payment_vault_bump,
    )]
    pub payment_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        token::mint = payment_mint,
        constraint = beneficiary_token_account.owner == fundraiser.config.beneficiary @ FundraiserError::InvalidTokenAccount,
    )]
    pub beneficiary_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        token::mint = payment_mint,
        constraint = treasury_token_account.owner == fundraiser.config.protocol_treasury @ FundraiserError::InvalidTokenAccount,
    )]
    pub treasury_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Refund<'info> {
    pub purchaser: Signer<'info>,

    #[account(
        mut,
        seeds = [FUNDRAISER_SEED, fundraiser.sale_mint.as_ref(), fundraiser.founder.as_ref()],
        bump = fundraiser.bump,
    )]
    pub fundraiser: Account<'info, Fundraiser>,

    #[account(
        mut,
        seeds = [ORDER_SEED, fundraiser.key().as_ref(), &order.order_index.to_le_bytes()],
        bump = order.bump,
        constraint = order.fundraiser == fundraiser.key() @ FundraiserError::OrderMismatch,
    )]
    pub order: Account<'info, Order>,

    #[account(
        mut,
        seeds = [RECIPIENT_SEED, fundraiser.key().as_ref(), order.recipient.as_ref()],
        bump = recipient_ledger.bump,
    )]
    pub recipient_ledger: Account<'info, RecipientLedger>,

    #[account(address = fundraiser.payment_mint @ FundraiserError::InvalidMint)]
    pub payment_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        token::mint = payment_mint,
        constraint = purchaser_token_account.owner == purchaser.key() @ FundraiserError::InvalidTokenAccount,
    )]
    pub purchaser_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [PAYMENT_VAULT_SEED, fundraiser.key().as_ref()],
        bump = fundraiser.payment_vault_bump,
    )]
    pub payment_vault: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

#[derive(Accounts)]
pub struct Redeem<'info> {
    #[account(
        mut,
        seeds = [FUNDRAISER_SEED, fundraiser.sale_mint.as_ref(), fundraiser.founder.as_ref()],
        bump = fundraiser.bump,
    )]
    pub fundraiser: Account<'info, Fundraiser>,

    #[account(
        mut,
        seeds = [ORDER_SEED, fundraiser.key().as_ref(), &order.order_index.to_le_bytes()],
        bump = order.bump,
        constraint = order.fundraiser == fundraiser.key() @ FundraiserError::OrderMismatch,
    )]
    pub order: Account<'info, Order>,

    #[account(address = fundraiser.sale_mint @ FundraiserError::InvalidMint)]
    pub sale_mint: InterfaceAccount<'info, Mint>,

    /// Always the order's recipient, whoever cranks.
    #[account(
        mut,
        token::mint = sale_mint,
        constraint = recipient_token_account.owner == order.recipient @ FundraiserError::InvalidTokenAccount,
    )]
    pub recipient_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [SALE_VAULT_SEED, fundraiser.key().as_ref()],
        bump = fundraiser.sale_vault_bump,
    )]
    pub sale_vault: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

#[derive(Accounts)]
pub struct Deploy<'info> {
    /// Pays for pool creation. Must be the founder on the early path.
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [FUNDRAISER_SEED, fundraiser.sale_mint.as_ref(), fundraiser.founder.as_ref()],
        bump = fundraiser.bump,
    )]
    pub fundraiser: Account<'info, Fundraiser>,

    #[account(address = fundraiser.sale_mint @ FundraiserError::InvalidMint)]
    pub sale_mint: InterfaceAccount<'info, Mint>,

    #[account(address = fundraiser.payment_mint @ FundraiserError::InvalidMint)]
    pub payment_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        seeds = [SALE_VAULT_SEED, fundraiser.key().as_ref()],
        bump = fundraiser.sale_vault_bump,
    )]
    pub sale_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [PAYMENT_VAULT_SEED, fundraiser.key().as_ref()],
        bump = fundraiser.payment_vault_bump,
    )]
    pub payment_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        token::mint = payment_mint,
        constraint = beneficiary_token_account.owner == fundraiser.config.beneficiary @ FundraiserError::InvalidTokenAccount,
    )]
    pub beneficiary_token_account: InterfaceAccount<'info, TokenAccount>,

    /// Receives the liquidity credential.
    /// CHECK: pinned to the configured address; the AMM validates its layout.
    #[account(mut, address = fundraiser.config.lp_destination @ FundraiserError::InvalidTokenAccount)]
    pub lp_destination: UncheckedAccount<'info>,

    /// CHECK: pinned to the configured AMM program.
    #[account(executable, address = fundraiser.config.amm_program @ FundraiserError::InvalidAmmProgram)]
    pub amm_program: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ViewFundraiser<'info> {
    #[account(
        seeds = [FUNDRAISER_SEED, fundraiser.sale_mint.as_ref(), fundraiser.founder.as_ref()],
        bump = fundraiser.bump,
    )]
    pub fundraiser: Account<'info, Fundraiser>,
}

#[derive(Accounts)]
#[instruction(recipient: Pubkey)]
pub struct ViewRecipient<'info> {
    #[account(
        seeds = [FUNDRAISER_SEED, fundraiser.sale_mint.as_ref(), fundraiser.founder.as_ref()],
        bump = fundraiser.bump,
    )]
    pub fundraiser: Account<'info, Fundraiser>,

    /// CHECK: address derived from the seeds; may not exist yet.
    #[account(
        seeds = [RECIPIENT_SEED, fundraiser.key().as_ref(), recipient.as_ref()],
        bump,
    )]
    pub recipient_ledger: UncheckedAccount<'info>,
}

#[derive(Accounts)]
pub struct ViewOrder<'info> {
    #[account(
        seeds = [FUNDRAISER_SEED, fundraiser.sale_mint.as_ref(), fundraiser.founder.as_ref()],
        bump = fundraiser.bump,
    )]
    pub fundraiser: Account<'info, Fundraiser>,

    #[account(
        seeds = [ORDER_SEED, fundraiser.key().as_ref(), &order.order_index.to_le_bytes()],
        bump = order.bump,
        constraint = order.fundraiser == fundraiser.key() @ FundraiserError::OrderMismatch,
    )]
    pub order: Account<'info, Order>,
}
