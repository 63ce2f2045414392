//! 核心层：错误类型与启动构建

pub mod builder;
pub mod error;

pub use builder::{create_tutor, TutorBuilder};
pub use error::{SessionError, StartupError};
