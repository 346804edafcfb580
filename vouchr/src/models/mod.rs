mod capture;
mod voucher;

pub use capture::*;
pub use voucher::*;
