//! Persistence of announced identity keys.
//!
//! The store is a pretty-printed JSON array of strings. A missing or broken
//! file loads as an empty set; keys are written sorted so commits diff cleanly.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{info, warn};
use thiserror::Error;

use crate::config::GitConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait SeenStore {
    /// Previously announced keys; empty when nothing usable is stored.
    fn load(&self) -> HashSet<String>;
    /// Replaces the stored set with `seen`.
    fn save(&self, seen: &HashSet<String>) -> Result<(), StoreError>;
}

pub struct JsonSeenStore {
    path: PathBuf,
}

impl JsonSeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SeenStore for JsonSeenStore {
    fn load(&self) -> HashSet<String> {
        if !self.path.exists() {
            return HashSet::new();
        }
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("cannot read seen store {:?}: {err}", self.path);
                return HashSet::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&contents) {
            Ok(keys) => keys.into_iter().collect(),
            Err(err) => {
                warn!("seen store {:?} is not a JSON string array: {err}", self.path);
                HashSet::new()
            }
        }
    }

    fn save(&self, seen: &HashSet<String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
            }
        }

        let mut keys: Vec<&String> = seen.iter().collect();
        keys.sort();
        let contents = serde_json::to_string_pretty(&keys)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(|err| self.io_error(err))?;
        fs::rename(&tmp, &self.path).map_err(|err| self.io_error(err))?;
        Ok(())
    }
}

/// Commits (and optionally pushes) the seen file after every save that changed it.
pub struct GitCommitStore {
    inner: JsonSeenStore,
    git: GitConfig,
}

impl GitCommitStore {
    pub fn new(inner: JsonSeenStore, git: GitConfig) -> Self {
        Self { inner, git }
    }

    fn publish(&self) -> Result<(), String> {
        let path = self.inner.path();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| format!("seen store path {path:?} has no file name"))?;

        let status = git(dir, &["status", "--porcelain", "--", &file])?;
        if status.trim().is_empty() {
            info!("seen store unchanged, nothing to commit");
            return Ok(());
        }

        git(dir, &["add", "--", &file])?;
        let mut commit = self.identity_args();
        commit.extend(
            ["commit", "-m", self.git.message.as_str(), "--", file.as_str()].map(str::to_string),
        );
        let commit: Vec<&str> = commit.iter().map(String::as_str).collect();
        git(dir, &commit)?;
        if self.git.push {
            git(dir, &["push"])?;
        }
        info!("seen store committed{}", if self.git.push { " and pushed" } else { "" });
        Ok(())
    }

    /// `-c user.*` overrides for the configured committer, if any.
    fn identity_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(name) = &self.git.user_name {
            args.extend(["-c".to_string(), format!("user.name={name}")]);
        }
        if let Some(email) = &self.git.user_email {
            args.extend(["-c".to_string(), format!("user.email={email}")]);
        }
        args
    }
}

impl SeenStore for GitCommitStore {
    fn load(&self) -> HashSet<String> {
        self.inner.load()
    }

    fn save(&self, seen: &HashSet<String>) -> Result<(), StoreError> {
        self.inner.save(seen)?;
        if let Err(err) = self.publish() {
            warn!("git publish failed: {err}");
        }
        Ok(())
    }
}

fn git(dir: &Path, args: &[&str]) -> Result<String, String> {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .map_err(|err| format!("git {}: {err}", args.join(" ")))?;
    if !output.status.success() {
        return Err(format!(
            "git {} exited with {}: {}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
