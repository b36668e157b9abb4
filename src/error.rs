use crate::config::ConfigError;
use crate::render::RenderError;
use crate::station_tree::TreeError;
use crate::transport::error::TransportError;

#[derive(thiserror::Error, Debug)]
pub enum BoardError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Station tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<BoardError> for std::io::Error {
    fn from(e: BoardError) -> std::io::Error {
        match e {
            BoardError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::Other, other),
        }
    }
}

pub type BoardResult<T> = Result<T, BoardError>;
