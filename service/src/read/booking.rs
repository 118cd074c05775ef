//! [`Booking`] read model definition.
//!
//! [`Booking`]: crate::domain::Booking

pub mod list {
    //! [`Booking`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::booking;
    #[cfg(doc)]
    use crate::domain::Booking;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = booking::Id;

    /// Cursor pointing to a specific [`Booking`] in a list.
    pub type Cursor = booking::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`booking::Status`] to filter by.
        pub status: Option<booking::Status>,

        /// [`booking::ClientName`] (or its part) to fuzzy search for.
        pub client_name: Option<booking::ClientName>,
    }

    /// Total count of [`Booking`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
