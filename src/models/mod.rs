pub mod fund;
pub mod quote;
pub mod valuation;
pub mod response;

pub use fund::*;
pub use quote::*;
pub use valuation::*;
pub use response::*;
