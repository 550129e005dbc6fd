//! Append-only ledger façade — owns the double-entry invariant boundary.
//!
//! Every recorded [`Transaction`] must balance: the sum of debit values
//! equals the sum of credit values across its entries, and no leg or entry
//! value may be negative.  Validation happens **before** anything is staged,
//! so a rejected transaction leaves the store untouched.
//!
//! Balances are derived, never stored:
//! - [`Ledger::get_balance`] aggregates the entries of one leaf account,
//!   signed by the account's nature (credit-nature: credits − debits;
//!   debit-nature: debits − credits).
//! - [`Ledger::get_account_balance`] aggregates owner-facing legs:
//!   Σ `to` legs − Σ `from` legs for the `(owner, wallet_type)` pair.
//!
//! An unbalanced transaction reaching this boundary indicates a bug in the
//! caller, never a user mistake; it is logged at error severity before the
//! rejection is returned.

use adx_money::Ust;
use adx_schemas::{AccountNature, LedgerEntry, Transaction, TransactionLeg, WalletType};
use adx_store::{MemoryStore, StoreSession};

use chrono::Utc;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Invariant violations the ledger can surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Σ debit ≠ Σ credit across the transaction's entries.
    UnbalancedLedger { debits: Ust, credits: Ust },
    /// A leg or entry carried a negative value.
    NegativeValue,
    /// A transaction must credit at least one recipient leg.
    NoRecipients,
    /// Balance query against an account code that does not exist.
    UnknownAccount { code: String },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnbalancedLedger { debits, credits } => write!(
                f,
                "ledger invariant: debits ({debits}) != credits ({credits})"
            ),
            Self::NegativeValue => write!(f, "ledger invariant: values must be >= 0"),
            Self::NoRecipients => write!(f, "transaction must have at least one 'to' leg"),
            Self::UnknownAccount { code } => write!(f, "unknown account code '{code}'"),
        }
    }
}

impl std::error::Error for LedgerError {}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Ledger operations over the store.
#[derive(Debug, Clone)]
pub struct Ledger {
    store: MemoryStore,
}

impl Ledger {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    // -----------------------------------------------------------------------
    // Write surface
    // -----------------------------------------------------------------------

    /// Validate and stage one transaction inside an existing session.
    ///
    /// The transaction id and timestamp are assigned here; the record is
    /// immutable once the session commits.
    ///
    /// # Errors
    /// [`LedgerError`] when any invariant fails.  Nothing is staged on error.
    pub fn record_transaction_in(
        session: &mut StoreSession<'_>,
        from: Option<TransactionLeg>,
        to: Vec<TransactionLeg>,
        entries: Vec<LedgerEntry>,
    ) -> Result<Transaction, LedgerError> {
        Self::validate(from.as_ref(), &to, &entries)?;
        let tx = Transaction {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            from,
            to,
            entries,
        };
        session.append_transaction(tx.clone());
        Ok(tx)
    }

    /// Record one transaction in its own atomic store transaction.
    pub fn record_transaction(
        &self,
        from: Option<TransactionLeg>,
        to: Vec<TransactionLeg>,
        entries: Vec<LedgerEntry>,
    ) -> Result<Transaction, LedgerError> {
        self.store
            .with_transaction(|session| Self::record_transaction_in(session, from, to, entries))
    }

    fn validate(
        from: Option<&TransactionLeg>,
        to: &[TransactionLeg],
        entries: &[LedgerEntry],
    ) -> Result<(), LedgerError> {
        if to.is_empty() {
            return Err(LedgerError::NoRecipients);
        }
        let leg_values = from.iter().map(|l| l.value).chain(to.iter().map(|l| l.value));
        for value in leg_values {
            if value.is_negative() {
                return Err(LedgerError::NegativeValue);
            }
        }

        let mut debits: i128 = 0;
        let mut credits: i128 = 0;
        for entry in entries {
            if entry.debit.value.is_negative() || entry.credit.value.is_negative() {
                return Err(LedgerError::NegativeValue);
            }
            debits += entry.debit.value.micros() as i128;
            credits += entry.credit.value.micros() as i128;
        }
        if debits != credits {
            let debits = Ust::from_micros(debits.clamp(i64::MIN as i128, i64::MAX as i128) as i64);
            let credits =
                Ust::from_micros(credits.clamp(i64::MIN as i128, i64::MAX as i128) as i64);
            // Never user-triggerable; a caller constructed a bad transaction.
            tracing::error!(%debits, %credits, "unbalanced ledger transaction rejected");
            return Err(LedgerError::UnbalancedLedger { debits, credits });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    /// Balance of one leaf account code, signed by its nature.
    /// Does **not** recurse into children.
    ///
    /// # Errors
    /// [`LedgerError::UnknownAccount`] when the code does not exist.
    pub fn get_balance(&self, code: &str) -> Result<Ust, LedgerError> {
        self.store.with_read(|view| {
            let account = view.account(code).ok_or_else(|| LedgerError::UnknownAccount {
                code: code.to_string(),
            })?;
            Ok(entry_balance(view.transactions(), code, account.nature))
        })
    }

    /// Session-scoped balance of one leaf account: sees the session's own
    /// staged transactions (read-your-writes).
    pub fn balance_in(session: &StoreSession<'_>, code: &str) -> Result<Ust, LedgerError> {
        let account = session
            .account(code)
            .ok_or_else(|| LedgerError::UnknownAccount {
                code: code.to_string(),
            })?;
        let nature = account.nature;
        Ok(entry_balance(session.transactions(), code, nature))
    }

    /// Explicit rollup: balance of `code` plus all descendant accounts.
    pub fn subtree_balance(&self, code: &str) -> Result<Ust, LedgerError> {
        self.store.with_read(|view| {
            if view.account(code).is_none() {
                return Err(LedgerError::UnknownAccount {
                    code: code.to_string(),
                });
            }
            let mut total: i128 = 0;
            let mut stack = vec![code.to_string()];
            while let Some(next) = stack.pop() {
                if let Some(account) = view.account(&next) {
                    total +=
                        entry_balance(view.transactions(), &next, account.nature).micros() as i128;
                    stack.extend(account.child_codes.iter().cloned());
                }
            }
            Ok(Ust::from_micros(
                total.clamp(i64::MIN as i128, i64::MAX as i128) as i64,
            ))
        })
    }

    /// Signed owner/wallet balance: Σ `to` legs − Σ `from` legs.
    /// Unknown owners simply have a zero balance.
    pub fn get_account_balance(&self, owner: Uuid, wallet_type: WalletType) -> Ust {
        self.store
            .with_read(|view| leg_balance(view.transactions(), owner, wallet_type))
    }

    /// Session-scoped owner/wallet balance (read-your-writes).
    pub fn account_balance_in(
        session: &StoreSession<'_>,
        owner: Uuid,
        wallet_type: WalletType,
    ) -> Ust {
        leg_balance(session.transactions(), owner, wallet_type)
    }
}

// ---------------------------------------------------------------------------
// Aggregation helpers (pure)
// ---------------------------------------------------------------------------

fn entry_balance(transactions: &[Transaction], code: &str, nature: AccountNature) -> Ust {
    let mut debits: i128 = 0;
    let mut credits: i128 = 0;
    for tx in transactions {
        for entry in &tx.entries {
            if entry.debit.account_code == code {
                debits += entry.debit.value.micros() as i128;
            }
            if entry.credit.account_code == code {
                credits += entry.credit.value.micros() as i128;
            }
        }
    }
    let signed = match nature {
        AccountNature::Debit => debits - credits,
        AccountNature::Credit => credits - debits,
    };
    Ust::from_micros(signed.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}

fn leg_balance(transactions: &[Transaction], owner: Uuid, wallet_type: WalletType) -> Ust {
    let mut total: i128 = 0;
    for tx in transactions {
        for leg in &tx.to {
            if leg.owner == owner && leg.wallet_type == wallet_type {
                total += leg.value.micros() as i128;
            }
        }
        if let Some(leg) = &tx.from {
            if leg.owner == owner && leg.wallet_type == wallet_type {
                total -= leg.value.micros() as i128;
            }
        }
    }
    Ust::from_micros(total.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
