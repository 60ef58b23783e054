use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hash;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::{get_return_data, invoke_signed};

use crate::errors::FundraiserError;

// ─────────────────────────────────────────────────────────────────────────────
// AMM collaborator — raw CPI
// ─────────────────────────────────────────────────────────────────────────────
//
// The pool program is picked per sale (`config.amm_program`), so there is no
// crate to link against. Both instructions use Anchor's wire format: an
// 8-byte `sha256("global:<name>")` prefix followed by borsh arguments.
//
// create_pair(token_a, token_b)
//   0. payer            (signer, writable)
//   1. authority        (signer)            fundraiser PDA
//   2. token_a mint
//   3. token_b mint
//   4.. pool accounts   (as supplied)
//
// add_liquidity(token_a, token_b, amount_a, amount_b, recipient) -> u64
//   0. authority        (signer)            fundraiser PDA
//   1. source_a         (writable)          payment vault
//   2. source_b         (writable)          sale vault
//   3. token_a mint
//   4. token_b mint
//   5. recipient        (writable)          lp_destination
//   6. token program
//   7.. pool accounts   (as supplied)
//
// The AMM must tolerate a pair that already exists and answer
// add_liquidity with the credential amount as little-endian u64 return data.

pub const CREATE_PAIR: &str = "create_pair";
pub const ADD_LIQUIDITY: &str = "add_liquidity";

pub fn sighash(name: &str) -> [u8; 8] {
    let preimage = format!("global:{}", name);
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..8]);
    out
}

/// Payment token is always `token_a`, sale token `token_b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairKeys {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiquidityLegs {
    pub amount_a: u64,
    pub amount_b: u64,
}

fn pass_through(accounts: &[AccountInfo]) -> Vec<AccountMeta> {
    accounts
        .iter()
        .map(|info| AccountMeta {
            pubkey: *info.key,
            is_signer: info.is_signer,
            is_writable: info.is_writable,
        })
        .collect()
}

pub fn create_pair_ix(
    amm_program: Pubkey,
    payer: Pubkey,
    authority: Pubkey,
    pair: PairKeys,
    pool_accounts: &[AccountInfo],
) -> Instruction {
    let mut data = Vec::with_capacity(8 + 64);
    data.extend_from_slice(&sighash(CREATE_PAIR));
    data.extend_from_slice(pair.token_a.as_ref());
    data.extend_from_slice(pair.token_b.as_ref());

    let mut accounts = vec![
        AccountMeta::new(payer, true),
        AccountMeta::new_readonly(authority, true),
        AccountMeta::new_readonly(pair.token_a, false),
        AccountMeta::new_readonly(pair.token_b, false),
    ];
    accounts.extend(pass_through(pool_accounts));

    Instruction {
        program_id: amm_program,
        accounts,
        data,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn add_liquidity_ix(
    amm_program: Pubkey,
    authority: Pubkey,
    source_a: Pubkey,
    source_b: Pubkey,
    pair: PairKeys,
    legs: LiquidityLegs,
    recipient: Pubkey,
    token_program: Pubkey,
    pool_accounts: &[AccountInfo],
) -> Instruction {
    let mut data = Vec::with_capacity(8 + 32 * 3 + 16);
    data.extend_from_slice(&sighash(ADD_LIQUIDITY));
    data.extend_from_slice(pair.token_a.as_ref());
    data.extend_from_slice(pair.token_b.as_ref());
    data.extend_from_slice(&legs.amount_a.to_le_bytes());
    data.extend_from_slice(&legs.amount_b.to_le_bytes());
    data.extend_from_slice(recipient.as_ref());

    let mut accounts = vec![
        AccountMeta::new_readonly(authority, true),
        AccountMeta::new(source_a, false),
        AccountMeta::new(source_b, false),
        AccountMeta::new_readonly(pair.token_a, false),
        AccountMeta::new_readonly(pair.token_b, false),
        AccountMeta::new(recipient, false),
        AccountMeta::new_readonly(token_program, false),
    ];
    accounts.extend(pass_through(pool_accounts));

    Instruction {
        program_id: amm_program,
        accounts,
        data,
    }
}

/// Account infos for both AMM calls, borrowed from the deploy context.
pub struct AmmAccounts<'a, 'info> {
    pub amm_program: &'a AccountInfo<'info>,
    pub payer: &'a AccountInfo<'info>,
    pub authority: &'a AccountInfo<'info>,
    pub token_a_mint: &'a AccountInfo<'info>,
    pub token_b_mint: &'a AccountInfo<'info>,
    pub source_a: &'a AccountInfo<'info>,
    pub source_b: &'a AccountInfo<'info>,
    pub recipient: &'a AccountInfo<'info>,
    pub token_program: &'a AccountInfo<'info>,
    pub pool_accounts: &'a [AccountInfo<'info>],
}

impl<'a, 'info> AmmAccounts<'a, 'info> {
    fn pair(&self) -> PairKeys {
        PairKeys {
            token_a: *self.token_a_mint.key,
            token_b: *self.token_b_mint.key,
        }
    }

    fn infos(&self, head: &[&AccountInfo<'info>]) -> Vec<AccountInfo<'info>> {
        head.iter()
            .map(|info| (*info).clone())
            .chain(self.pool_accounts.iter().cloned())
            .chain(std::iter::once(self.amm_program.clone()))
            .collect()
    }
}

pub fn create_pair(accounts: &AmmAccounts, signer_seeds: &[&[u8]]) -> Result<()> {
    let ix = create_pair_ix(
        *accounts.amm_program.key,
        *accounts.payer.key,
        *accounts.authority.key,
        accounts.pair(),
        accounts.pool_accounts,
    );
    let infos = accounts.infos(&[
        accounts.payer,
        accounts.authority,
        accounts.token_a_mint,
        accounts.token_b_mint,
    ]);
    invoke_signed(&ix, &infos, &[signer_seeds])?;
    Ok(())
}

/// Seeds the pool and returns the credential amount the AMM reports.
pub fn add_liquidity(
    accounts: &AmmAccounts,
    legs: LiquidityLegs,
    signer_seeds: &[&[u8]],
) -> Result<u64> {
    let ix = add_liquidity_ix(
        *accounts.amm_program.key,
        *accounts.authority.key,
        *accounts.source_a.key,
        *accounts.source_b.key,
        accounts.pair(),
        legs,
        *accounts.recipient.key,
        *accounts.token_program.key,
        accounts.pool_accounts,
    );
    let infos = accounts.infos(&[
        accounts.authority,
        accounts.source_a,
        accounts.source_b,
        accounts.token_a_mint,
        accounts.token_b_mint,
        accounts.recipient,
        accounts.token_program,
    ]);
    invoke_signed(&ix, &infos, &[signer_seeds])?;

    decode_credential(accounts.amm_program.key, get_return_data())
}

/// Return data must come from the AMM itself and carry at least a u64.
pub fn decode_credential(
    amm_program: &Pubkey,
    return_data: Option<(Pubkey, Vec<u8>)>,
) -> Result<u64> {
    let (program_id, data) = return_data.ok_or(FundraiserError::AmmReturnDataMissing)?;
    require_keys_eq!(
        program_id,
        *amm_program,
        FundraiserError::AmmReturnDataMissing
    );
    let bytes: [u8; 8] = data
        .get(..8)
        .and_then(|b| b.try_into().ok())
        .ok_or(FundraiserError::AmmReturnDataMissing)?;
    Ok(u64::from_le_bytes(bytes))
}
