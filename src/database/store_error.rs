#[derive(Debug)]
pub enum StoreError {
    Sql(sqlx::Error),
    Http(reqwest::Error),
    /// The store answered with something that is not the JSON it should have sent.
    Decode(rocket::serde::json::serde_json::Error),
    /// The store answered, but refused the request.
    Rejected { status: u16, message: String },
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sql(error) => Some(error),
            Self::Http(error) => Some(error),
            Self::Decode(error) => Some(error),
            Self::Rejected { .. } => None,
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sql(error) => write!(f, "{}", error),
            Self::Http(error) => write!(f, "{}", error),
            Self::Decode(error) => write!(f, "unreadable response from score store: {}", error),
            Self::Rejected { status, message } => {
                write!(f, "{} (status {})", message, status)
            }
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        Self::Sql(error)
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error)
    }
}

impl From<rocket::serde::json::serde_json::Error> for StoreError {
    fn from(error: rocket::serde::json::serde_json::Error) -> Self {
        Self::Decode(error)
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
