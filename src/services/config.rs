use crate::domain::errors::MushError;
use crate::domain::models::{HostConfig, HostFile, ProjectFile};
use std::path::Path;

pub fn load_host_config(path: &Path) -> anyhow::Result<HostConfig> {
    let invalid = |reason: String| MushError::HostConfigInvalid {
        path: path.to_path_buf(),
        reason,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let file: HostFile = toml::from_str(&raw).map_err(|e| invalid(e.message().to_string()))?;
    if file.host.address.trim().is_empty() {
        return Err(invalid("[host] address= must not be empty".to_string()).into());
    }
    Ok(file.host)
}

pub fn load_project(path: &Path) -> anyhow::Result<ProjectFile> {
    if !path.exists() {
        return Err(MushError::ProjectNotFound(path.to_path_buf()).into());
    }
    let raw = std::fs::read_to_string(path)?;
    let mut project: ProjectFile = toml::from_str(&raw)?;
    if project.root.is_relative() {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        project.root = dir.join(&project.root);
    }
    Ok(project)
}
