pub mod common;
pub mod copy;
pub mod creator;
pub mod filter;
pub mod form;
pub mod tag;
pub mod view;
pub mod work;

pub use common::*;
pub use copy::*;
pub use creator::*;
pub use filter::*;
pub use form::*;
pub use tag::*;
pub use view::*;
pub use work::*;
