pub mod exec;
pub mod info;
pub mod processes;

pub use exec::ProcExecTool;
pub use info::{SysInfoTool, SystemSummary};
pub use processes::ProcListTool;
