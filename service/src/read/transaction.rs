//! [`Transaction`] read model definition.
//!
//! [`Transaction`]: crate::domain::Transaction

pub mod statement {
    //! Wallet statement definitions.
    //!
    //! A statement is a page of a [`Worker`]'s ledger, newest entries first.
    //!
    //! [`Worker`]: crate::domain::Worker

    use common::define_pagination;

    #[cfg(doc)]
    use crate::domain::Worker;
    use crate::domain::{transaction, worker, Transaction};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = Transaction;

    /// Cursor pointing to a specific [`Transaction`] in a statement.
    pub type Cursor = transaction::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// [`Worker`] whose ledger is read.
        pub worker_id: worker::Id,

        /// Lower bound on the posting time, if any.
        pub since: Option<transaction::CreationDateTime>,
    }
}
