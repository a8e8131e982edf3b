pub type FigResult<T> = Result<T, FigError>;

#[derive(thiserror::Error, Debug)]
pub enum FigError {
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("unsupported node '{id}': kind '{kind}'")]
    UnsupportedNode { id: String, kind: String },

    #[error("text measurement error: {0}")]
    Measure(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FigError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedTree(msg.into())
    }

    pub fn unsupported(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnsupportedNode {
            id: id.into(),
            kind: kind.into(),
        }
    }

    pub fn measure(msg: impl Into<String>) -> Self {
        Self::Measure(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for FigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
