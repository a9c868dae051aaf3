use super::run::{run_git, RunOutput};
use crate::discover::Repo;
use std::thread;

/// A local branch with its upstream decoration.
#[derive(Debug, Clone)]
pub struct Branch {
    pub name: String,
    pub is_head: bool,
    pub upstream: Option<String>,
    pub ahead: u32,
    pub behind: u32,
}

/// One commit as listed for selection, newest first.
#[derive(Debug, Clone)]
pub struct Commit {
    pub hash: String,
    pub date: String,
    pub author: String,
    pub subject: String,
}

// ── Pending changes ──

/// Raw unstaged diff. Empty when there is nothing to show or git could not run.
pub fn diff_unstaged(repo: &Repo) -> String {
    run_git(&repo.dir, &["diff", "--unified=3", "--no-color", "--no-ext-diff"]).text()
}

/// Raw staged diff.
pub fn diff_staged(repo: &Repo) -> String {
    run_git(
        &repo.dir,
        &["diff", "--staged", "--unified=3", "--no-color", "--no-ext-diff"],
    )
    .text()
}

/// Diff of commits ahead of the upstream (merge-base to HEAD).
pub fn diff_ahead(repo: &Repo, upstream: &str) -> String {
    let range = format!("{upstream}...HEAD");
    run_git(
        &repo.dir,
        &["diff", &range, "--unified=3", "--no-color", "--no-ext-diff"],
    )
    .text()
}

/// Paths of untracked, non-ignored files.
pub fn untracked_files(repo: &Repo) -> Vec<String> {
    run_git(&repo.dir, &["ls-files", "--others", "--exclude-standard"])
        .text()
        .lines()
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Synthetic diff-against-empty for one untracked file, so new files appear
/// with full content. `--no-index` exits 1 when the file has content, so the
/// output is read leniently.
pub fn diff_untracked_file(repo: &Repo, path: &str) -> String {
    run_git(
        &repo.dir,
        &[
            "diff",
            "--unified=3",
            "--no-color",
            "--no-ext-diff",
            "--no-index",
            "--",
            "/dev/null",
            path,
        ],
    )
    .text_lenient()
}

// ── Upstream ──

/// Resolve the upstream to diff against: the tracked upstream of HEAD, else
/// the remote's symbolic default branch, else none (the ahead diff is
/// skipped for this repository).
pub fn resolve_upstream(repo: &Repo) -> Option<String> {
    let tracked = run_git(&repo.dir, &["rev-parse", "--abbrev-ref", "@{upstream}"]).text();
    let tracked = tracked.trim();
    if !tracked.is_empty() {
        return Some(tracked.to_string());
    }

    let default = run_git(
        &repo.dir,
        &["symbolic-ref", "--short", "refs/remotes/origin/HEAD"],
    )
    .text();
    let default = default.trim();
    if !default.is_empty() {
        return Some(default.to_string());
    }

    None
}

// ── History ──

/// Local branches with HEAD and upstream decorations plus ahead/behind
/// counts against their upstream.
pub fn list_branches(repo: &Repo) -> Vec<Branch> {
    let raw = run_git(
        &repo.dir,
        &[
            "for-each-ref",
            "refs/heads",
            "--format=%(HEAD)|%(refname:short)|%(upstream:short)",
        ],
    )
    .text();

    parse_branches(&raw)
        .into_iter()
        .map(|mut branch| {
            if let Some(upstream) = branch.upstream.clone() {
                let (ahead, behind) = ahead_behind(repo, &branch.name, &upstream);
                branch.ahead = ahead;
                branch.behind = behind;
            }
            branch
        })
        .collect()
}

/// Commits reachable only from each side of `branch...upstream`.
fn ahead_behind(repo: &Repo, branch: &str, upstream: &str) -> (u32, u32) {
    let range = format!("{branch}...{upstream}");
    let raw = run_git(
        &repo.dir,
        &["rev-list", "--left-right", "--count", &range],
    )
    .text();
    parse_ahead_behind(&raw)
}

/// Newest-first commits on `branch`, at most `limit`.
pub fn log_commits(repo: &Repo, branch: &str, limit: usize) -> Vec<Commit> {
    let count = limit.to_string();
    let raw = run_git(
        &repo.dir,
        &[
            "log",
            branch,
            "-n",
            &count,
            "--format=%h|%ad|%an|%s",
            "--date=short",
        ],
    )
    .text();
    parse_commits(&raw)
}

/// Diff introduced by one commit, without the log message.
pub fn show_commit(repo: &Repo, hash: &str) -> String {
    run_git(
        &repo.dir,
        &[
            "show",
            hash,
            "--format=",
            "--unified=3",
            "--no-color",
            "--no-ext-diff",
        ],
    )
    .text()
}

// ── Remote sync ──

/// Best-effort `git fetch` fan-out across the selected repositories, issued
/// from parallel threads and joined as a group. Failures are swallowed; the
/// feature is an optimization, not a requirement.
pub fn sync_remotes(repos: &[&Repo]) {
    let handles: Vec<_> = repos
        .iter()
        .map(|repo| {
            let dir = repo.dir.clone();
            let name = repo.name.clone();
            thread::spawn(move || match run_git(&dir, &["fetch", "--quiet"]) {
                RunOutput::Completed { ok: true, .. } => {}
                _ => log::debug!("fetch failed for {name}; continuing without remote sync"),
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }
}

// ── Porcelain parsers ──

fn parse_branches(raw: &str) -> Vec<Branch> {
    raw.lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '|');
            let head = parts.next()?;
            let name = parts.next()?;
            let upstream = parts.next().unwrap_or("");
            if name.is_empty() {
                return None;
            }
            Some(Branch {
                name: name.to_string(),
                is_head: head == "*",
                upstream: if upstream.is_empty() {
                    None
                } else {
                    Some(upstream.to_string())
                },
                ahead: 0,
                behind: 0,
            })
        })
        .collect()
}

fn parse_ahead_behind(raw: &str) -> (u32, u32) {
    let mut parts = raw.split_whitespace();
    let ahead = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
    let behind = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
    (ahead, behind)
}

fn parse_commits(raw: &str) -> Vec<Commit> {
    raw.lines()
        .filter_map(|line| {
            let mut parts = line.splitn(4, '|');
            Some(Commit {
                hash: parts.next()?.to_string(),
                date: parts.next()?.to_string(),
                author: parts.next()?.to_string(),
                subject: parts.next().unwrap_or("").to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_branches ──

    #[test]
    fn parse_branches_head_and_upstream() {
        let raw = "*|main|origin/main\n |feature/x|\n";
        let branches = parse_branches(raw);
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].name, "main");
        assert!(branches[0].is_head);
        assert_eq!(branches[0].upstream.as_deref(), Some("origin/main"));
        assert_eq!(branches[1].name, "feature/x");
        assert!(!branches[1].is_head);
        assert!(branches[1].upstream.is_none());
    }

    #[test]
    fn parse_branches_empty_input() {
        assert!(parse_branches("").is_empty());
    }

    // ── parse_ahead_behind ──

    #[test]
    fn parse_ahead_behind_counts() {
        assert_eq!(parse_ahead_behind("2\t1\n"), (2, 1));
    }

    #[test]
    fn parse_ahead_behind_garbage_defaults_to_zero() {
        assert_eq!(parse_ahead_behind(""), (0, 0));
        assert_eq!(parse_ahead_behind("nope"), (0, 0));
    }

    // ── parse_commits ──

    #[test]
    fn parse_commits_fields() {
        let raw = "a1b2c3d|2026-08-01|Jane Doe|Fix the thing\n\
                   e4f5a6b|2026-07-30|Sam Roe|Subject with | pipes\n";
        let commits = parse_commits(raw);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, "a1b2c3d");
        assert_eq!(commits[0].date, "2026-08-01");
        assert_eq!(commits[0].author, "Jane Doe");
        assert_eq!(commits[0].subject, "Fix the thing");
        // The subject is the final field: embedded pipes survive.
        assert_eq!(commits[1].subject, "Subject with | pipes");
    }

    #[test]
    fn parse_commits_skips_malformed_lines() {
        let commits = parse_commits("onlyhash\n");
        assert!(commits.is_empty());
    }

    // ── retrieval absorbs failure ──

    #[test]
    fn retrieval_on_non_repo_dir_is_empty_not_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let repo = Repo {
            name: "empty".to_string(),
            dir: tmp.path().to_string_lossy().to_string(),
            rel: String::new(),
        };
        assert_eq!(diff_unstaged(&repo), "");
        assert_eq!(diff_staged(&repo), "");
        assert!(untracked_files(&repo).is_empty());
        assert!(list_branches(&repo).is_empty());
        assert!(log_commits(&repo, "main", 6).is_empty());
        assert!(resolve_upstream(&repo).is_none());
    }
}
