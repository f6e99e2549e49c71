pub mod health;
pub mod invoices;
pub mod pages;

pub use health::*;
pub use invoices::*;
pub use pages::*;
