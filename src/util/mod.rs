pub mod figment;
pub mod retry;
mod sensitive;

pub use self::retry::Retry;
pub use self::sensitive::Sensitive;
