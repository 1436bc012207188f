//! 仿真驱动错误

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmuError {
    #[error("failed to spawn `{cmd}`: {source}")]
    Io {
        cmd: String,
        #[source]
        source: io::Error,
    },
    #[error("command failed: `{cmd}` ({status})\n{output}")]
    Command {
        cmd: String,
        status: String,
        output: String,
    },
    #[error("emulated network is not running")]
    NotStarted,
}
