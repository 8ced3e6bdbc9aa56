pub mod columns;
pub mod config;
pub mod context;
pub mod executor;
pub mod filters;
pub mod grid;
pub mod messages;
pub mod palette;
pub mod process;
pub mod reader;
pub mod reporting;
pub mod runner;
pub mod status;
mod telemetry;
pub mod workspace;

pub use config::Config;
pub use context::{ContextSink, MemoryContext};
pub use executor::{Executor, Flag, GcPreserveFlag};
pub use grid::ComparisonGrid;
pub use messages::{HostChannel, OutboundMessage};
pub use palette::{ColorAssignment, DisplayColor};
pub use process::ToolError;
pub use runner::{ActiveInvocation, Runner, RunnerError, RunnerEvent};
pub use status::collect_colored_status;
