pub mod config;
pub mod errors;
pub mod form;
pub mod session;
pub mod signaling;
pub mod transport;

// Re-export commonly used items for convenience
pub use config::ClientConfig;
pub use errors::{
    FormError, FormResult, SessionError, SessionResult, TransportError, TransportResult,
};
pub use form::{Field, FieldSpec, FieldType, Form, FormBuilder};
pub use session::{SessionHandle, SessionState, Veform};
pub use signaling::FieldAnswer;
pub use transport::Platform;
