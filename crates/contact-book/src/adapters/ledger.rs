//! # Sandbox Ledger
//!
//! In-memory host ledger: balances, an append-only transaction log and
//! atomic settlement. Plays the role a local sandbox blockchain plays in
//! contract tests.
//!
//! Senders are treasuries unless their account was opened with
//! [`InMemoryLedger::fund`]: a treasury can attach any value, even after it
//! has received transfers. Opened accounts and contracts pay from their
//! balance.

use crate::domain::entities::{FeeSchedule, InboundMessage, OutgoingMessage};
use crate::domain::value_objects::{Address, Body, Coins};
use crate::errors::LedgerError;
use crate::ports::outbound::LedgerHost;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

// =============================================================================
// TRANSACTION LOG
// =============================================================================

/// One entry of the ledger's transaction log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Sender.
    pub from: Address,
    /// Recipient.
    pub to: Address,
    /// Value moved (zero for bounced messages).
    pub value: Coins,
    /// Payload.
    pub body: Body,
    /// False for bounced messages.
    pub success: bool,
    /// Why the message bounced.
    pub exit_reason: Option<String>,
}

/// Match criteria for [`InMemoryLedger::has_transaction`]. Unset fields
/// match anything.
#[derive(Clone, Debug, Default)]
pub struct TxFilter {
    /// Sender.
    pub from: Option<Address>,
    /// Recipient.
    pub to: Option<Address>,
    /// Exact value.
    pub value: Option<Coins>,
    /// Exact body.
    pub body: Option<Body>,
    /// Outcome.
    pub success: Option<bool>,
}

impl TxFilter {
    /// A filter matching every record.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Require the sender.
    #[must_use]
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Require the recipient.
    #[must_use]
    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    /// Require the value.
    #[must_use]
    pub fn value(mut self, value: Coins) -> Self {
        self.value = Some(value);
        self
    }

    /// Require the body.
    #[must_use]
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Require the outcome.
    #[must_use]
    pub fn success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    /// True if `record` satisfies every set field.
    #[must_use]
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.from.map_or(true, |a| a == record.from)
            && self.to.map_or(true, |a| a == record.to)
            && self.value.map_or(true, |v| v == record.value)
            && self.body.as_ref().map_or(true, |b| *b == record.body)
            && self.success.map_or(true, |s| s == record.success)
    }
}

// =============================================================================
// LEDGER
// =============================================================================

#[derive(Debug, Default)]
struct LedgerInner {
    balances: HashMap<Address, Coins>,
    /// Accounts opened via `fund`; everyone else sends as a treasury.
    opened: HashSet<Address>,
    log: Vec<TransactionRecord>,
    frozen: HashSet<Address>,
}

/// In-memory ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: Mutex<LedgerInner>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the balance of `account` and open it, so that its outgoing
    /// value is checked against that balance from now on.
    pub fn fund(&self, account: Address, amount: Coins) {
        let mut inner = self.inner.lock();
        inner.balances.insert(account, amount);
        inner.opened.insert(account);
    }

    /// True if `account` was opened with [`InMemoryLedger::fund`].
    #[must_use]
    pub fn is_opened(&self, account: &Address) -> bool {
        self.inner.lock().opened.contains(account)
    }

    /// Balance of `account`. Unknown accounts hold zero.
    #[must_use]
    pub fn balance_of(&self, account: &Address) -> Coins {
        self.inner
            .lock()
            .balances
            .get(account)
            .copied()
            .unwrap_or(Coins::ZERO)
    }

    /// Reject every settlement involving `account` as the contract.
    pub fn freeze(&self, account: Address) {
        self.inner.lock().frozen.insert(account);
    }

    /// Lift a freeze.
    pub fn unfreeze(&self, account: &Address) {
        self.inner.lock().frozen.remove(account);
    }

    /// Snapshot of the transaction log.
    #[must_use]
    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.inner.lock().log.clone()
    }

    /// Log entries addressed to `to`.
    #[must_use]
    pub fn transactions_to(&self, to: &Address) -> Vec<TransactionRecord> {
        self.inner
            .lock()
            .log
            .iter()
            .filter(|r| r.to == *to)
            .cloned()
            .collect()
    }

    /// Drop every log entry. Balances are kept.
    pub fn clear_log(&self) {
        self.inner.lock().log.clear();
    }

    /// True if some log entry matches `filter`.
    #[must_use]
    pub fn has_transaction(&self, filter: &TxFilter) -> bool {
        self.inner.lock().log.iter().any(|r| filter.matches(r))
    }

    /// Number of log entries matching `filter`.
    #[must_use]
    pub fn count_transactions(&self, filter: &TxFilter) -> usize {
        self.inner
            .lock()
            .log
            .iter()
            .filter(|r| filter.matches(r))
            .count()
    }
}

fn debit(
    balances: &mut HashMap<Address, Coins>,
    account: Address,
    amount: Coins,
) -> Result<(), LedgerError> {
    let balance = balances.entry(account).or_insert(Coins::ZERO);
    *balance = balance
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientFunds {
            account,
            required: amount,
            available: *balance,
        })?;
    Ok(())
}

fn credit(
    balances: &mut HashMap<Address, Coins>,
    account: Address,
    amount: Coins,
) -> Result<(), LedgerError> {
    let balance = balances.entry(account).or_insert(Coins::ZERO);
    *balance = balance
        .checked_add(amount)
        .ok_or(LedgerError::Overflow(account))?;
    Ok(())
}

#[async_trait]
impl LedgerHost for InMemoryLedger {
    async fn balance(&self, account: Address) -> Result<Coins, LedgerError> {
        Ok(self.balance_of(&account))
    }

    async fn settle(
        &self,
        contract: Address,
        inbound: &InboundMessage,
        outgoing: &[OutgoingMessage],
        fees: &FeeSchedule,
    ) -> Result<Coins, LedgerError> {
        let mut inner = self.inner.lock();
        if inner.frozen.contains(&contract) {
            return Err(LedgerError::Frozen(contract));
        }

        let fee_total = fees
            .for_messages(outgoing.len())
            .ok_or(LedgerError::Overflow(contract))?;

        // Work on a copy so a failure part-way leaves balances untouched.
        let mut balances = inner.balances.clone();
        if inner.opened.contains(&inbound.sender) {
            debit(&mut balances, inbound.sender, inbound.value)?;
        }
        credit(&mut balances, contract, inbound.value)?;

        let mut required = fee_total;
        for message in outgoing {
            required = required
                .checked_add(message.value)
                .ok_or(LedgerError::Overflow(contract))?;
        }
        let available = balances.get(&contract).copied().unwrap_or(Coins::ZERO);
        if required > available {
            return Err(LedgerError::InsufficientFunds {
                account: contract,
                required,
                available,
            });
        }
        debit(&mut balances, contract, required)?;
        for message in outgoing {
            credit(&mut balances, message.to, message.value)?;
        }

        inner.balances = balances;
        inner.log.push(TransactionRecord {
            from: inbound.sender,
            to: contract,
            value: inbound.value,
            body: inbound.body.clone(),
            success: true,
            exit_reason: None,
        });
        inner
            .log
            .extend(outgoing.iter().map(|message| TransactionRecord {
                from: contract,
                to: message.to,
                value: message.value,
                body: message.body.clone(),
                success: true,
                exit_reason: None,
            }));

        debug!(
            contract = %contract,
            messages = outgoing.len(),
            fees = %fee_total,
            "Settled transition"
        );
        Ok(fee_total)
    }

    async fn bounce(
        &self,
        contract: Address,
        inbound: &InboundMessage,
        reason: &str,
    ) -> Result<(), LedgerError> {
        self.inner.lock().log.push(TransactionRecord {
            from: inbound.sender,
            to: contract,
            value: Coins::ZERO,
            body: inbound.body.clone(),
            success: false,
            exit_reason: Some(reason.to_string()),
        });
        debug!(contract = %contract, sender = %inbound.sender, reason, "Bounced message");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
