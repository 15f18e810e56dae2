//! 错误类型定义

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("顶点不存在: {0}")]
    VertexNotFound(String),

    #[error("边不存在: {0}")]
    EdgeNotFound(String),

    #[error("解析错误: {0}")]
    ParseError(String),

    /// 模式配置错误（例如量词下界大于上界），在搜索开始前报告
    #[error("配置错误: {0}")]
    ConfigurationError(String),

    /// 语义错误（未定义的标签、属性或变量），在搜索开始前报告
    #[error("语义错误: {0}")]
    SemanticError(String),

    #[error("导入错误: {0}")]
    ImportError(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
