mod error;
pub use error::ExecError;

mod catch;
pub use catch::{try_catch, try_catch_with};

mod delay;
pub use delay::{delay, delay_with};

pub mod limit;
pub use limit::{limit, limit_settled};

mod retry;
pub use retry::retry;

mod timeout;
pub use timeout::timeout;

pub mod prelude {
    pub use crate::error::ExecError;
    pub use crate::{delay, delay_with, limit, limit_settled, retry, timeout, try_catch, try_catch_with};
}
