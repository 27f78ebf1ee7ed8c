//! CSV persistence for the user and repository tables.
//!
//! Files always start with a header row, even when the table is empty, so
//! downstream readers can rely on the column names.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::record::{
    REPOSITORY_COLUMNS, RepositoryRecord, RepositoryTable, USER_COLUMNS, UserRecord, UserTable,
};

/// File name of the user table inside the output directory.
pub const USERS_FILE: &str = "users.csv";

/// File name of the repository table inside the output directory.
pub const REPOSITORIES_FILE: &str = "repositories.csv";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl TableError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Write the user table to `path`, creating parent directories as needed.
pub fn write_users(path: &Path, users: &[UserRecord]) -> Result<(), TableError> {
    write_table(path, &USER_COLUMNS, users)
}

/// Write the repository table to `path`, creating parent directories as needed.
pub fn write_repositories(path: &Path, repos: &[RepositoryRecord]) -> Result<(), TableError> {
    write_table(path, &REPOSITORY_COLUMNS, repos)
}

pub fn read_users(path: &Path) -> Result<UserTable, TableError> {
    read_table(path)
}

pub fn read_repositories(path: &Path) -> Result<RepositoryTable, TableError> {
    read_table(path)
}

fn write_table<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<(), TableError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TableError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| TableError::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer
        .write_record(columns)
        .map_err(|e| TableError::csv(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| TableError::csv(path, e))?;
    }
    writer.flush().map_err(|e| TableError::io(path, e))?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "Table written");
    Ok(())
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, TableError> {
    let file = File::open(path).map_err(|e| TableError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| TableError::csv(path, e))
}
