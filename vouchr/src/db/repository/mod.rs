mod vouchers;

pub use vouchers::VoucherRepository;
