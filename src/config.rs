// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::errors::{LedgerError, LedgerResult};
use crate::models::{Book, builtin_books};
use crate::store::{CsvStore, SheetsStore, SqliteStore, TableStore};
use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "MONEYSHEET_CONFIG";
pub const PIN_ENV: &str = "MONEYSHEET_PIN";
const DEFAULT_TOKEN_ENV: &str = "MONEYSHEET_SHEETS_TOKEN";

fn default_demo_identity() -> String {
    "other".into()
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    Sqlite {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Csv {
        dir: PathBuf,
    },
    Sheets {
        spreadsheet_id: String,
        #[serde(default = "default_token_env")]
        token_env: String,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sqlite { path: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Digits required for writes. Overridden by `MONEYSHEET_PIN`.
    #[serde(default)]
    pub pin: Option<String>,
    /// User name that receives the anonymized demo view.
    #[serde(default = "default_demo_identity")]
    pub demo_identity: String,
    #[serde(default)]
    pub store: StoreConfig,
    /// Replaces the built-in books when present.
    #[serde(default)]
    pub books: Option<Vec<Book>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pin: None,
            demo_identity: default_demo_identity(),
            store: StoreConfig::default(),
            books: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(p));
    }
    let proj = db::project_dirs()?;
    Ok(proj.config_dir().join("settings.json"))
}

impl Settings {
    /// Reads settings from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        let mut settings = Self::from_path(&config_path()?)?;
        if let Ok(pin) = std::env::var(PIN_ENV) {
            settings.pin = Some(pin);
        }
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("Read settings {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&data)
            .with_context(|| format!("Parse settings {}", path.display()))?;
        settings.registry()?;
        Ok(settings)
    }

    pub fn registry(&self) -> Result<BookRegistry> {
        match &self.books {
            Some(books) => BookRegistry::new(books.clone()),
            None => BookRegistry::new(builtin_books()),
        }
    }

    pub fn open_store(&self) -> Result<Box<dyn TableStore>> {
        match &self.store {
            StoreConfig::Sqlite { path } => {
                let path = match path {
                    Some(p) => p.clone(),
                    None => db::db_path()?,
                };
                let conn = db::open_or_init(&path)?;
                Ok(Box::new(SqliteStore::new(conn)))
            }
            StoreConfig::Csv { dir } => Ok(Box::new(CsvStore::new(dir.clone()))),
            StoreConfig::Sheets {
                spreadsheet_id,
                token_env,
            } => {
                let token = std::env::var(token_env)
                    .with_context(|| format!("Environment variable {} not set", token_env))?;
                Ok(Box::new(SheetsStore::new(spreadsheet_id, &token)?))
            }
        }
    }
}

/// The fixed set of books a session can select from.
#[derive(Debug, Clone)]
pub struct BookRegistry {
    books: Vec<Book>,
}

impl BookRegistry {
    pub fn new(books: Vec<Book>) -> Result<Self> {
        if books.is_empty() {
            bail!("At least one book must be configured");
        }
        let mut ids = HashSet::new();
        let mut sheets = HashSet::new();
        for b in &books {
            if !ids.insert(b.id.as_str()) {
                bail!("Duplicate book id '{}'", b.id);
            }
            if !sheets.insert(b.sheet.as_str()) {
                bail!("Sheet '{}' is used by more than one book", b.sheet);
            }
            if b.categories.is_empty() {
                return Err(anyhow!("Book '{}' has an empty category vocabulary", b.id));
            }
        }
        Ok(Self { books })
    }

    pub fn builtin() -> Self {
        Self {
            books: builtin_books(),
        }
    }

    pub fn get(&self, id: &str) -> LedgerResult<&Book> {
        self.books
            .iter()
            .find(|b| b.id.eq_ignore_ascii_case(id.trim()))
            .ok_or_else(|| LedgerError::UnknownBook(id.to_string()))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.books.iter().map(|b| b.id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }
}
