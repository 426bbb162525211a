//! Error type shared by every stage of the demo.

use std::path::PathBuf;

use crate::abs::ShaderStage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    #[error("object file, line {line}: {message}")]
    Obj { line: usize, message: String },

    #[error("object file contains no triangles")]
    NoTriangles,

    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program failed to link:\n{0}")]
    ProgramLink(String),

    #[error("OpenGL: {0}")]
    Gl(String),

    #[error("platform: {0}")]
    Platform(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("logger already initialized")]
    Logging(#[from] log::SetLoggerError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn obj(line: usize, message: impl Into<String>) -> Self {
        Error::Obj {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
