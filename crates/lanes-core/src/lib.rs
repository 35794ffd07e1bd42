mod cursor;
pub use cursor::Cursor;

mod error;
pub use error::{JoinAllError, RunError};

pub mod runner;
pub use runner::{Runner, run_all, run_bounded, run_bounded_until, run_sequential};

mod subscribe;
pub use subscribe::Subscribe;

pub use tokio_util::sync::CancellationToken;

pub mod prelude {
    pub use crate::error::{JoinAllError, RunError};
    pub use crate::runner::{Runner, run_all, run_bounded, run_bounded_until, run_sequential};
    pub use lanes_model::{RunnerConfig, Settled, Task, TaskFn, TaskRef};
}
