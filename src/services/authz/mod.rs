pub mod authorizer;
pub mod credentials;
pub mod types;

pub use authorizer::{Authorizer, SuccessContext};
pub use credentials::{AcceptedCredentials, ValidationMode};
pub use types::{Decision, RequestEnvelope};
