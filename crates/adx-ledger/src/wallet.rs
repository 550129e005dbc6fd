//! Wallet service — a thin projection over the ledger.
//!
//! Answers "balance of owner X in wallet-type Y" and exposes `transfer` as a
//! ledger-backed operation.  No state of its own: every query aggregates the
//! transaction log, every transfer is one balanced transaction.

use adx_money::Ust;
use adx_schemas::{EntryLine, LedgerEntry, Transaction, TransactionLeg, WalletType};
use adx_store::MemoryStore;

use uuid::Uuid;

use crate::ledger::{Ledger, LedgerError};

/// Owner/wallet balance queries and transfers.
#[derive(Debug, Clone)]
pub struct WalletService {
    ledger: Ledger,
}

impl WalletService {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            ledger: Ledger::new(store),
        }
    }

    /// Balance of `(owner, wallet_type)`: Σ `to` legs − Σ `from` legs.
    pub fn balance(&self, owner: Uuid, wallet_type: WalletType) -> Ust {
        self.ledger.get_account_balance(owner, wallet_type)
    }

    /// Move `value` from one owner wallet to another as a single balanced
    /// transaction.  `debit_code`/`credit_code` name the chart accounts the
    /// double-entry pair is recorded against.
    pub fn transfer(
        &self,
        from: (Uuid, WalletType),
        to: (Uuid, WalletType),
        value: Ust,
        debit_code: &str,
        credit_code: &str,
    ) -> Result<Transaction, LedgerError> {
        self.ledger.record_transaction(
            Some(TransactionLeg::new(from.0, from.1, value)),
            vec![TransactionLeg::new(to.0, to.1, value)],
            vec![LedgerEntry {
                debit: EntryLine::new(debit_code, value),
                credit: EntryLine::new(credit_code, value),
            }],
        )
    }
}
