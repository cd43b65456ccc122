pub mod plugin;
pub mod task;
pub mod trigger;

pub use plugin::{Plugin, PluginAuthType};
pub use task::{extract_task_id, TaskData, TaskState, TaskStatus};
pub use trigger::{Collection, MemberLink, TriggerRequest, Triggers, KNOWN_TRIGGER_PROPERTIES};
