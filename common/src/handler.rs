//! [`Handler`] abstraction.

use std::future::Future;

/// Unit of execution taking `Args` and producing a result.
///
/// Commands, queries and database operations all funnel through this single
/// trait, so a [`Handler`] may be composed of other [`Handler`]s.
pub trait Handler<Args = ()> {
    /// Type of the value produced by a successful execution.
    type Ok;

    /// Type of the error produced by a failed execution.
    type Err;

    /// Executes this [`Handler`] with the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
