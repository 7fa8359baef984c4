pub mod accounts;
pub mod session;

pub use accounts::{AccountService, NewAccount};
pub use session::{LoginIdentifier, LoginOutcome, SessionError, SessionService};
