mod ids;
pub use ids::{NodeId, ProviderId, TaskId};

mod task_env;
pub use task_env::TaskEnv;

mod resources;
pub use resources::Resources;

mod task;
pub use task::{Task, TaskSpec};

mod provider;
pub use provider::TaskProvider;

mod offer;
pub use offer::{LaunchBatch, ResourceUnit};

mod task_status;
pub use task_status::TaskStatus;

mod task_record;
pub use task_record::TaskRecord;

mod framework;
pub use framework::{FRAMEWORK_NAME, FrameworkInfo};

/// Free-form labels attached to a task.
pub type Labels = std::collections::BTreeMap<String, String>;
