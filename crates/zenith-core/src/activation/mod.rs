mod lockout;
mod resolver;

pub use lockout::LockoutController;
pub use resolver::{resolve, ActivationResult, QUICK_LOCKOUT_TITLE};
