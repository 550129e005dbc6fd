//! Chart of accounts — the account tree.
//!
//! Accounts are identified by a unique hierarchical code (e.g.
//! `SOCIAL_REWARD.PERSONAL`).  The tree is acyclic by construction: a parent
//! must already exist when a child is created, so no cycle can ever be
//! formed.  A leaf account's balance is the sum of its own ledger entries; a
//! parent's balance is never implicitly aggregated — callers ask for an
//! explicit subtree rollup when they want one (see
//! [`Ledger::subtree_balance`](crate::Ledger::subtree_balance)).

use adx_schemas::{Account, AccountNature};
use adx_store::{MemoryStore, StoreSession};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Invariant violations when shaping the account tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// An account with this code already exists.
    DuplicateAccountCode { code: String },
    /// `parent_code` was supplied but no such account exists.
    UnknownParent { parent_code: String },
}

impl std::fmt::Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateAccountCode { code } => {
                write!(f, "account code '{code}' already exists")
            }
            Self::UnknownParent { parent_code } => {
                write!(f, "parent account '{parent_code}' does not exist")
            }
        }
    }
}

impl std::error::Error for ChartError {}

// ---------------------------------------------------------------------------
// ChartOfAccounts
// ---------------------------------------------------------------------------

/// Account-tree operations over the store.
#[derive(Debug, Clone)]
pub struct ChartOfAccounts {
    store: MemoryStore,
}

impl ChartOfAccounts {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// Create an account inside an existing store session.
    ///
    /// # Errors
    /// - [`ChartError::DuplicateAccountCode`] when `code` is taken.
    /// - [`ChartError::UnknownParent`] when `parent_code` is given but absent.
    pub fn create_account_in(
        session: &mut StoreSession<'_>,
        code: impl Into<String>,
        name: impl Into<String>,
        nature: AccountNature,
        parent_code: Option<&str>,
    ) -> Result<Account, ChartError> {
        let code = code.into();
        if session.account(&code).is_some() {
            return Err(ChartError::DuplicateAccountCode { code });
        }

        if let Some(parent_code) = parent_code {
            let mut parent = session
                .account(parent_code)
                .cloned()
                .ok_or_else(|| ChartError::UnknownParent {
                    parent_code: parent_code.to_string(),
                })?;
            parent.child_codes.push(code.clone());
            session.put_account(parent);
        }

        let account = Account {
            code,
            name: name.into(),
            nature,
            parent_code: parent_code.map(str::to_string),
            child_codes: Vec::new(),
        };
        session.put_account(account.clone());
        Ok(account)
    }

    /// Create an account in its own store transaction.
    pub fn create_account(
        &self,
        code: impl Into<String>,
        name: impl Into<String>,
        nature: AccountNature,
        parent_code: Option<&str>,
    ) -> Result<Account, ChartError> {
        let code = code.into();
        let name = name.into();
        self.store.with_transaction(|session| {
            Self::create_account_in(session, code, name, nature, parent_code)
        })
    }

    /// Fetch one account.
    pub fn account(&self, code: &str) -> Option<Account> {
        self.store.get_account(code)
    }

    /// Codes of the full subtree rooted at `code` (the root included),
    /// depth-first in creation order.  Empty when `code` is unknown.
    pub fn subtree_codes(&self, code: &str) -> Vec<String> {
        self.store.with_read(|view| {
            let mut out = Vec::new();
            let mut stack = vec![code.to_string()];
            while let Some(next) = stack.pop() {
                if let Some(account) = view.account(&next) {
                    out.push(account.code.clone());
                    for child in account.child_codes.iter().rev() {
                        stack.push(child.clone());
                    }
                }
            }
            out
        })
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
