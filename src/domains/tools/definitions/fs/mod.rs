pub mod copy;
pub mod delete;
pub mod list_dir;
pub mod move_path;
pub mod read_file;
pub mod search;
pub mod stat;
pub mod write_file;

pub use copy::FsCopyTool;
pub use delete::FsDeleteTool;
pub use list_dir::FsListDirTool;
pub use move_path::FsMoveTool;
pub use read_file::FsReadFileTool;
pub use search::FsSearchTool;
pub use stat::{FileStat, FsStatTool};
pub use write_file::FsWriteFileTool;
