//! Client-side room logic: card grouping, locks, selection and the session
//! state machine. Keep this crate free of IO; the socket lives behind
//! [`Transport`].

pub mod actions;
pub mod cards;
pub mod error;
pub mod grouping;
pub mod hints;
pub mod locks;
pub mod protocol;
pub mod selection;
pub mod session;
pub mod snapshot;

pub use actions::*;
pub use cards::*;
pub use error::*;
pub use grouping::*;
pub use hints::*;
pub use locks::*;
pub use protocol::*;
pub use selection::*;
pub use session::*;
pub use snapshot::*;
