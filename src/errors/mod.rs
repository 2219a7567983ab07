pub mod form_error;
pub mod session_error;
pub mod transport_error;

pub use form_error::{FormError, FormResult};
pub use session_error::{SessionError, SessionResult};
pub use transport_error::{TransportError, TransportResult};
