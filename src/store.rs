//! Persisted identity storage.
//!
//! The authenticated identity is kept in a small local store under a fixed
//! key so a restarted client can skip re-authentication. The store is a
//! single JSON file named after the key, in a configurable state
//! directory.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use serde_json::{from_reader, to_writer_pretty};

use crate::error::{Error, Result};
use crate::types::Identity;

/// Fixed key the identity is stored under.
const IDENTITY_KEY: &str = "user";

/// File-backed store for the persisted [`Identity`].
#[derive(Debug, Clone)]
pub struct IdentityStore {
    state_dir: PathBuf,
}

impl IdentityStore {
    /// Creates a store rooted at the given state directory.
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    /// Creates a store at the default location, `$HOME/.docqa`.
    pub fn default_location() -> Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| Error::validation("HOME environment variable not set", None))?;
        Ok(Self::new(Path::new(&home).join(".docqa")))
    }

    fn identity_path(&self) -> PathBuf {
        self.state_dir.join(format!("{IDENTITY_KEY}.json"))
    }

    /// Reads the persisted identity, if one exists.
    pub fn load(&self) -> Result<Option<Identity>> {
        let file = match File::open(self.identity_path()) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::io("failed to open identity file", err)),
        };
        let reader = BufReader::new(file);
        let identity: Identity = from_reader(reader).map_err(|err| {
            Error::serialization("failed to parse identity file", Some(Box::new(err)))
        })?;
        Ok(Some(identity))
    }

    /// Persists the identity, replacing any previous one.
    pub fn save(&self, identity: &Identity) -> Result<()> {
        fs::create_dir_all(&self.state_dir)
            .map_err(|err| Error::io("failed to create state directory", err))?;
        let file = File::create(self.identity_path())
            .map_err(|err| Error::io("failed to create identity file", err))?;
        let writer = BufWriter::new(file);
        to_writer_pretty(writer, identity).map_err(|err| {
            Error::serialization("failed to serialize identity", Some(Box::new(err)))
        })
    }

    /// Removes the persisted identity. Missing files are not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(self.identity_path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::io("failed to remove identity file", err)),
        }
    }
}
