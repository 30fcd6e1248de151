//! Tool definitions module.
//!
//! Every tool lives in its own file and exposes a `definition` registration
//! function. [`CATALOG`] lists them all; the server bootstraps its registry
//! from it at startup.

pub mod archive;
pub mod common;
pub mod db;
pub mod fs;
pub mod net;
pub mod system;
pub mod text;
pub mod watch;

pub use archive::{ZipCreateTool, ZipExtractTool, ZipListTool};
pub use db::{StoreDeleteTool, StoreGetTool, StoreListTool, StorePutTool, SqliteQueryTool};
pub use fs::{
    FsCopyTool, FsDeleteTool, FsListDirTool, FsMoveTool, FsReadFileTool, FsSearchTool,
    FsStatTool, FsWriteFileTool,
};
pub use net::{DnsLookupTool, HttpFetchTool, NetPortCheckTool, WebScrapeTool};
pub use system::{ProcExecTool, ProcListTool, SysInfoTool};
pub use text::{TextGrepTool, TextReplaceTool, TextStatsTool};
pub use watch::{WatchEventsTool, WatchListTool, WatchStartTool, WatchStopTool};

use super::registry::Registration;

/// Every built-in tool, in registration order.
pub const CATALOG: &[Registration] = &[
    // Filesystem
    FsReadFileTool::definition,
    FsWriteFileTool::definition,
    FsListDirTool::definition,
    FsDeleteTool::definition,
    FsMoveTool::definition,
    FsCopyTool::definition,
    FsStatTool::definition,
    FsSearchTool::definition,
    // Text
    TextGrepTool::definition,
    TextReplaceTool::definition,
    TextStatsTool::definition,
    // Archive
    ZipCreateTool::definition,
    ZipExtractTool::definition,
    ZipListTool::definition,
    // Process / system
    ProcExecTool::definition,
    ProcListTool::definition,
    SysInfoTool::definition,
    // Database
    SqliteQueryTool::definition,
    StorePutTool::definition,
    StoreGetTool::definition,
    StoreListTool::definition,
    StoreDeleteTool::definition,
    // Network
    HttpFetchTool::definition,
    WebScrapeTool::definition,
    NetPortCheckTool::definition,
    DnsLookupTool::definition,
    // Watchers
    WatchStartTool::definition,
    WatchStopTool::definition,
    WatchEventsTool::definition,
    WatchListTool::definition,
];
