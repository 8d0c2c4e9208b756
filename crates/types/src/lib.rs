pub mod action;
pub mod batch;
pub mod call;
pub mod policy;
pub mod primitives;
pub mod route;
pub mod session;
pub mod signing;
pub mod verification;

pub use action::*;
pub use batch::*;
pub use call::*;
pub use policy::*;
pub use primitives::*;
pub use route::*;
pub use session::*;
pub use signing::*;
pub use verification::*;
