mod access;
mod common;
mod enriched;
mod favorite;
mod product;
mod purchase;
mod report;
mod session;
mod user;

pub use access::*;
pub use common::*;
pub use enriched::*;
pub use favorite::*;
pub use product::*;
pub use purchase::*;
pub use report::*;
pub use session::*;
pub use user::*;
