//! Typed per-user session state carried between requests.
//!
//! Form pages remember where the user came from so a successful write can
//! send them back there. "Save and continue" flows suppress that bookmark for
//! exactly one form render so the original entry point survives repeated
//! submissions.

mod session_model;

pub use session_model::{Bookmark, FlashLevel, FlashMessage, OldInput, SessionContext};
