mod driver;
pub mod loop_control;
mod scheduler;
mod shutdown;

pub use driver::Runtime;
pub use loop_control::TickDecision;
pub use scheduler::{Scheduler, SchedulerStatus};
pub use shutdown::ShutdownGuard;
