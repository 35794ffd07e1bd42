//! Task wrappers and helpers that compose with every `lanes` runner.

mod retry;
pub use retry::{Retry, retry};

mod timed;
pub use timed::Timed;

mod util;
pub use util::{sleep, sleep_ms};

pub mod prelude {
    pub use crate::{Retry, Timed, retry, sleep, sleep_ms};
    pub use lanes_model::RetryPolicy;
}
