pub mod attrs;
pub mod constants;
pub mod error;
pub mod header;
pub mod packet;
pub mod util;

pub use error::{AddressFamilyError, DecodeError, Error, TransportError};
pub use header::Header;
pub use packet::{build_success_response, SuccessResponse};
