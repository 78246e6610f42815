pub mod error;
pub use error::{CoreError, LaunchFailure, PoolError, Rejected};

pub mod pool;
pub use pool::{PendingTaskPool, TaskProviderPool};

pub mod submit;
pub use submit::Submitter;

pub mod dispatch;
pub use dispatch::{DispatchQueue, DispatchReceiver, Dispatcher, DriverCommand, dispatch_channel};

pub mod driver;
pub use driver::{DriverError, DriverEvent, DriverStatus, LoopbackDriver, SchedulerDriver};

pub mod state;
pub use state::{StatusBook, StatusView};

pub mod supervisor;
pub use supervisor::{
    DriverSupervisor, ErrorReporter, ErrorSupervisor, Failure, ShutdownReport, error_channel,
};

mod bridge;
pub use bridge::BridgeApi;
