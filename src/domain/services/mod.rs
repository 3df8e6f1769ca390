pub mod commands;
pub mod placeholders;
pub mod response_writer;
pub mod runner;
pub mod variables;

pub use commands::CommandService;
pub use commands::CommandSet;
pub use runner::CommandRunner;
pub use runner::RunReport;
pub use runner::RunnerSettings;
