pub mod payment;
pub mod quote;
pub mod response;
pub mod video;

pub use payment::*;
pub use quote::*;
pub use response::*;
pub use video::*;
