use engine::EngineError;
use sea_orm::DbErr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error(transparent)]
    Usage(#[from] clap::Error),
}
