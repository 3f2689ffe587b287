//! External repository lists.
//!
//! The seed file is a JSON array of objects carrying a `base_url`, e.g.
//! `[{"base_url": "https://dl.fedoraproject.org/pub/epel/9/Everything/x86_64/"}]`.

use crate::ConfigResult;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalRepository {
    pub base_url: String,
}

pub fn parse_external_repos(json: &str) -> ConfigResult<Vec<String>> {
    let repos: Vec<ExternalRepository> = serde_json::from_str(json)?;
    Ok(repos
        .into_iter()
        .map(|r| r.base_url)
        .filter(|url| !url.is_empty())
        .collect())
}

pub fn load_external_repos(path: &Path) -> ConfigResult<Vec<String>> {
    parse_external_repos(&std::fs::read_to_string(path)?)
}
