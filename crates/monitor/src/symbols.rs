use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymbolListError {
    #[error("Failed to read symbol list {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One ticker per line; blank lines and `#` comments are ignored and repeats
/// keep their first position.
pub fn parse_symbols(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|symbol| seen.insert(symbol.to_string()))
        .map(str::to_string)
        .collect()
}

pub async fn load_symbols(path: &Path) -> Result<Vec<String>, SymbolListError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SymbolListError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parse_symbols(&text))
}
