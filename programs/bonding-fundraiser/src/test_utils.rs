//! In-memory stand-in for the accounts and token movements an instruction
//! would perform, so ledger transitions can be driven end to end.
//!
//! Every call mirrors its handler: guards and state writes go through the
//! real transition, then tokens move between plain balances. A failed call
//! leaves nothing behind, as a failed transaction would.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::config::FundraiserConfig;
use crate::curve::U256;
use crate::deployment::{
    commit_deployment, plan_deployment, record_liquidity, DeployPath, FounderGatedEarlyDeploy,
    VaultBalances,
};
use crate::events::EventLog;
use crate::ledger::{self, Purchase};
use crate::state::{Fundraiser, Order, RecipientLedger};

pub struct Sale {
    pub key: Pubkey,
    pub fundraiser: Fundraiser,
    pub orders: Vec<Order>,
    pub ledgers: BTreeMap<Pubkey, RecipientLedger>,
    /// Payment-token wallets.
    pub wallets: BTreeMap<Pubkey, u64>,
    /// Sale-token wallets.
    pub sale_wallets: BTreeMap<Pubkey, u64>,
    pub payment_vault: u64,
    pub sale_vault: u64,
    pub pool_payment: u64,
    pub pool_sale: u64,
    pub log: EventLog,
    pub now: i64,
}

impl Sale {
    pub fn new(config: FundraiserConfig) -> Self {
        let fundraiser = Fundraiser::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            config,
        )
        .unwrap();
        Self {
            key: Pubkey::new_unique(),
            fundraiser,
            orders: Vec::new(),
            ledgers: BTreeMap::new(),
            wallets: BTreeMap::new(),
            sale_wallets: BTreeMap::new(),
            payment_vault: 0,
            sale_vault: 0,
            pool_payment: 0,
            pool_sale: 0,
            log: EventLog::new(),
            now: 1_700_000_000,
        }
    }

    pub fn credit(&mut self, owner: &Pubkey, amount: u64) {
        *self.wallets.entry(*owner).or_default() += amount;
    }

    fn debit(&mut self, owner: &Pubkey, amount: u64) {
        let balance = self.wallets.entry(*owner).or_default();
        assert!(*balance >= amount, "wallet {} overdrawn", owner);
        *balance -= amount;
    }

    pub fn balance_of(&self, owner: &Pubkey) -> u64 {
        self.wallets.get(owner).copied().unwrap_or(0)
    }

    pub fn sale_balance_of(&self, owner: &Pubkey) -> u64 {
        self.sale_wallets.get(owner).copied().unwrap_or(0)
    }

    pub fn allocation_of(&self, recipient: &Pubkey) -> u64 {
        self.ledgers.get(recipient).map(|l| l.allocation).unwrap_or(0)
    }

    pub fn fund_reserve(&mut self, amount: u64) {
        self.sale_vault += amount;
    }

    /// Wallets are topped up on demand so callers only pick the amount.
    pub fn buy(&mut self, purchaser: Pubkey, recipient: Pubkey, gross_payment: u64) -> Result<u64> {
        let mut order = Order::default();
        let mut recipient_ledger = self.ledgers.get(&recipient).cloned().unwrap_or_default();
        let purchase = Purchase {
            fundraiser: self.key,
            purchaser,
            recipient,
            gross_payment,
            now: self.now,
        };

        self.fundraiser.lock()?;
        let result = ledger::buy(&mut self.fundraiser, &mut order, &mut recipient_ledger, &purchase);
        self.fundraiser.unlock();
        let (receipt, log) = result?;

        if self.balance_of(&purchaser) < gross_payment {
            let short = gross_payment - self.balance_of(&purchaser);
            self.credit(&purchaser, short);
        }
        self.debit(&purchaser, gross_payment);
        let treasury = self.fundraiser.config.protocol_treasury;
        let beneficiary = self.fundraiser.config.beneficiary;
        self.credit(&treasury, receipt.split.protocol_fee);
        self.credit(&beneficiary, receipt.split.upfront_net);
        self.payment_vault += receipt.split.escrow_amount + receipt.split.net_contribution;

        self.orders.push(order);
        self.ledgers.insert(recipient, recipient_ledger);
        self.log.append(log);
        Ok(receipt.order_index)
    }

    pub fn refund(&mut self, caller: Pubkey, order_index: u64) -> Result<()> {
        let mut order = self.orders[order_index as usize].clone();
        let mut recipient_ledger = self.ledgers[&order.recipient].clone();

        self.fundraiser.lock()?;
        let result = ledger::refund(&mut self.fundraiser, &mut order, &mut recipient_ledger, &caller);
        self.fundraiser.unlock();
        let (receipt, log) = result?;

        self.payment_vault -= receipt.amount;
        self.credit(&order.purchaser, receipt.amount);

        self.ledgers.insert(order.recipient, recipient_ledger);
        self.orders[order_index as usize] = order;
        self.log.append(log);
        Ok(())
    }

    pub fn redeem(&mut self, order_index: u64) -> Result<()> {
        let mut order = self.orders[order_index as usize].clone();

        self.fundraiser.lock()?;
        let result = ledger::redeem(&mut self.fundraiser, &mut order);
        self.fundraiser.unlock();
        let (breakdown, log) = result?;

        self.sale_vault -= breakdown.total;
        *self.sale_wallets.entry(order.recipient).or_default() += breakdown.total;

        self.orders[order_index as usize] = order;
        self.log.append(log);
        Ok(())
    }

    pub fn deploy(&mut self, caller: Pubkey, path: DeployPath) -> Result<()> {
        let balances = VaultBalances {
            sale_tokens: self.sale_vault,
            payment_tokens: self.payment_vault,
        };

        self.fundraiser.lock()?;
        let plan = match plan_deployment(
            &self.fundraiser,
            &caller,
            path,
            &FounderGatedEarlyDeploy,
            balances,
        ) {
            Ok(plan) => plan,
            Err(err) => {
                self.fundraiser.unlock();
                return Err(err);
            }
        };
        let mut log = commit_deployment(&mut self.fundraiser, self.key, &plan, self.now);

        let beneficiary = self.fundraiser.config.beneficiary;
        self.payment_vault -= plan.escrow_release;
        self.credit(&beneficiary, plan.escrow_release);

        self.payment_vault -= plan.payment_liquidity;
        self.sale_vault -= plan.sale_liquidity;
        self.pool_payment += plan.payment_liquidity;
        self.pool_sale += plan.sale_liquidity;
        let credential = (U256::from(plan.payment_liquidity) * U256::from(plan.sale_liquidity))
            .integer_sqrt()
            .low_u64();

        log.append(record_liquidity(&mut self.fundraiser, self.key, credential));
        self.fundraiser.unlock();
        self.log.append(log);
        Ok(())
    }

    /// Checks the ledger-wide invariants against the individual orders.
    pub fn assert_invariants(&self) {
        let active: Vec<&Order> = self.orders.iter().filter(|o| !o.is_refunded()).collect();
        let reserves = self.fundraiser.reserves;

        for order in &self.orders {
            assert!(!(order.is_refunded() && order.is_redeemed()));
        }
        assert_eq!(
            reserves.total_active_contributions,
            active.iter().map(|o| o.net_contribution).sum::<u64>()
        );
        assert_eq!(
            reserves.total_tokens_allocated,
            active.iter().map(|o| o.token_amount).sum::<u64>()
        );
        assert_eq!(
            reserves.total_gross_payments,
            self.orders.iter().map(|o| o.gross_payment).sum::<u64>()
        );
        for (recipient, ledger) in &self.ledgers {
            let expected: u64 = active
                .iter()
                .filter(|o| o.recipient == *recipient)
                .map(|o| o.token_amount)
                .sum();
            assert_eq!(ledger.allocation, expected);
        }

        if self.fundraiser.is_deployed {
            assert_eq!(reserves.escrow_accumulated, 0);
            assert!(self.fundraiser.bonus_distributed <= self.fundraiser.orphaned_supply);
        } else {
            assert_eq!(
                reserves.escrow_accumulated,
                active.iter().map(|o| o.escrow_amount).sum::<u64>()
            );
            assert_eq!(
                self.payment_vault,
                reserves.total_active_contributions + reserves.escrow_accumulated
            );
        }
        assert!(!self.fundraiser.reentrancy_lock);
    }
}
