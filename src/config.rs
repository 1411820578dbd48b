use std::path::PathBuf;

pub const STORE_URL_VAR: &str = "SUPABASE_URL";
pub const STORE_KEY_VAR: &str = "SUPABASE_KEY";
pub const SCORES_TABLE_VAR: &str = "SCORES_TABLE";
pub const INDEX_TEMPLATE_VAR: &str = "INDEX_TEMPLATE";

pub const DEFAULT_SCORES_TABLE: &str = "amen_mh_score";

/// Process settings, read once at launch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub store_url: Option<String>,
    pub store_key: Option<String>,
    pub scores_table: Option<String>,
    pub index_template: Option<PathBuf>,
}

/// Everything needed to open a connection to the score store.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreSettings {
    pub url: String,
    pub key: Option<String>,
    pub table: String,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing { variables: Vec<&'static str> },
    InvalidTable { table: String },
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { variables } => write!(
                f,
                "missing store configuration: {} not set",
                variables.join(", ")
            ),
            Self::InvalidTable { table } => {
                write!(f, "invalid scores table name: {:?}", table)
            }
        }
    }
}

impl Config {
    /// Loads `.env` (if any) and reads the settings from the environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| dotenv::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Empty values are treated the same as unset ones
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            store_url: read(STORE_URL_VAR),
            store_key: read(STORE_KEY_VAR),
            scores_table: read(SCORES_TABLE_VAR),
            index_template: read(INDEX_TEMPLATE_VAR).map(PathBuf::from),
        }
    }

    /// Validates the store settings.
    /// The access key is only required when the store is reached over http(s).
    pub fn store_settings(&self) -> Result<StoreSettings, ConfigError> {
        let mut missing = Vec::new();
        match &self.store_url {
            None => {
                missing.push(STORE_URL_VAR);
                if self.store_key.is_none() {
                    missing.push(STORE_KEY_VAR);
                }
            }
            Some(url) if is_http_url(url) && self.store_key.is_none() => {
                missing.push(STORE_KEY_VAR)
            }
            Some(_) => (),
        }
        if !missing.is_empty() {
            return Err(ConfigError::Missing { variables: missing });
        }

        let table = self
            .scores_table
            .clone()
            .unwrap_or_else(|| DEFAULT_SCORES_TABLE.to_owned());
        if !is_valid_table_name(&table) {
            return Err(ConfigError::InvalidTable { table });
        }

        Ok(StoreSettings {
            url: self.store_url.clone().unwrap_or_default(),
            key: self.store_key.clone(),
            table,
        })
    }
}

pub fn is_http_url(url: &str) -> bool {
    let url = url.to_ascii_lowercase();
    url.starts_with("http://") || url.starts_with("https://")
}

fn is_valid_table_name(table: &str) -> bool {
    let mut chars = table.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
