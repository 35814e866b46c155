use thiserror::Error;

/// Everything that can abort a render invocation. Geometry-level problems
/// (degenerate or behind-camera triangles) are not errors, they are skipped
/// and counted by the pass instead.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse obj data: {0}")]
    Obj(#[from] obj::ObjError),

    #[error("failed to encode output image: {0}")]
    Image(#[from] image::ImageError),

    #[error("preview window failed: {0}")]
    Preview(String),

    #[error("unknown shader \"{0}\", expected \"phong\" or \"flat\"")]
    UnknownShader(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
