//! Record sources

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::domain::RawNodeRecord;
use crate::infrastructure::traits::RecordSource;
use crate::infrastructure::{InfraError, InfraResult};

/// Path that selects stdin instead of a file.
pub const STDIN_PATH: &str = "-";

/// Reads a JSON array of node records from a file, or from stdin for `-`.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == STDIN_PATH
    }

    fn read(&self) -> std::io::Result<String> {
        if self.is_stdin() {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        } else {
            std::fs::read_to_string(&self.path)
        }
    }
}

/// Parse a JSON array of node records.
pub fn parse_records(content: &str, source_name: &str) -> InfraResult<Vec<RawNodeRecord>> {
    serde_json::from_str(content).map_err(|e| InfraError::Parse {
        source_name: source_name.to_string(),
        source: e,
    })
}

impl RecordSource for JsonFileSource {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> InfraResult<Vec<RawNodeRecord>> {
        let content = self.read().map_err(|e| InfraError::DataLoad {
            source_name: self.describe(),
            source: e,
        })?;
        debug!(bytes = content.len(), "read node data");
        let records = parse_records(&content, &self.describe())?;
        info!(records = records.len(), "loaded node records");
        Ok(records)
    }

    fn describe(&self) -> String {
        if self.is_stdin() {
            "<stdin>".to_string()
        } else {
            self.path.display().to_string()
        }
    }
}

/// Records already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<RawNodeRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<RawNodeRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for StaticSource {
    fn load(&self) -> InfraResult<Vec<RawNodeRecord>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
