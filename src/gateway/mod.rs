pub mod backend;
pub mod errors;
pub mod remote;

pub use backend::Gateway;
pub use errors::GatewayError;
pub use remote::GatewayRemote;
