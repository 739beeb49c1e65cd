//! Session command and query handlers.

mod cancel_session;
mod create_session;
mod delete_session;
mod enroll;
mod get_session;
mod list_sessions;
mod list_upcoming;
mod update_session;
mod versioned_write;
mod withdraw;

pub use cancel_session::{CancelSessionCommand, CancelSessionHandler};
pub use create_session::{CreateSessionCommand, CreateSessionHandler};
pub use delete_session::{DeleteSessionCommand, DeleteSessionHandler};
pub use enroll::{EnrollCommand, EnrollHandler};
pub use get_session::{GetSessionHandler, GetSessionQuery};
pub use list_sessions::{ListSessionsHandler, ListSessionsQuery};
pub use list_upcoming::{ListUpcomingSessionsHandler, ListUpcomingSessionsQuery};
pub use update_session::{UpdateSessionCommand, UpdateSessionHandler};
pub use withdraw::{WithdrawCommand, WithdrawHandler, WithdrawResult};
