pub mod error;
pub mod mock;
pub mod multicall;
pub mod request;
pub mod traits;

pub use error::*;
pub use mock::*;
pub use multicall::*;
pub use request::*;
pub use traits::*;
