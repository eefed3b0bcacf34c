mod interrupt;
mod product;

pub use interrupt::Interrupt;
pub use product::{Outcome, Product};
