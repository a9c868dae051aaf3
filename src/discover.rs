use anyhow::{Context, Result};
use glob::Pattern;
use std::path::Path;

/// A repository included in this run. `rel` is empty for the root.
#[derive(Debug, Clone)]
pub struct Repo {
    pub name: String,
    pub dir: String,
    pub rel: String,
}

impl Repo {
    /// Path prefix applied when rewriting this repo's diff headers.
    pub fn prefix(&self) -> String {
        if self.rel.is_empty() {
            String::new()
        } else {
            format!("{}/", self.rel)
        }
    }

    /// Directory shown in section headers and prompts.
    pub fn display_dir(&self) -> String {
        if self.rel.is_empty() {
            "./".to_string()
        } else {
            format!("{}/", self.rel)
        }
    }
}

/// Directory names never scanned for a repository marker, even if one is
/// present inside: dependency caches, build output, editor settings.
const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    "coverage",
    "vendor",
    "__pycache__",
    ".idea",
    ".vscode",
    ".next",
];

fn is_repo(path: &Path) -> bool {
    // The `.git` marker may be a directory or a file (worktrees, submodules).
    path.join(".git").exists()
}

/// Scan `root` and its immediate child directories for repositories.
/// Returns the root first (if it is a repo), then child repos sorted by
/// directory name, so two runs over an unchanged tree agree. The caller
/// treats an empty result as fatal.
pub fn discover(root: &Path, exclude: Option<&str>) -> Result<Vec<Repo>> {
    let exclude = match exclude {
        Some(expr) => Some(Pattern::new(expr).context("invalid --exclude pattern")?),
        None => None,
    };
    let excluded = |name: &str| exclude.as_ref().is_some_and(|p| p.matches(name));

    let mut repos = Vec::new();

    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "root".to_string());
    if is_repo(root) && !excluded(&root_name) {
        repos.push(Repo {
            name: root_name,
            dir: root.to_string_lossy().to_string(),
            rel: String::new(),
        });
    }

    let mut children: Vec<String> = Vec::new();
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("failed to read directory {}", root.display()))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if SKIP_DIRS.contains(&name.as_str()) || excluded(&name) {
            continue;
        }
        if is_repo(&path) {
            children.push(name);
        }
    }
    children.sort();

    for name in children {
        let path = root.join(&name);
        repos.push(Repo {
            name: name.clone(),
            dir: path.to_string_lossy().to_string(),
            rel: name,
        });
    }

    Ok(repos)
}
