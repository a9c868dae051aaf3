use crate::discover::Repo;
use crate::git::Commit;

/// Marker line for a repository with nothing to report after filtering.
pub const CLEAN_MARKER: &str = "(clean tree)";

/// Marker line for a history section whose every commit was dropped.
pub const NO_COMMITS_MARKER: &str = "(no commits selected)";

/// Root banner. The report carries no timestamps so identical inputs yield
/// identical output.
pub fn banner(repo_count: usize) -> String {
    let noun = if repo_count == 1 { "repository" } else { "repositories" };
    format!("================ diff report: {repo_count} {noun} ================\n")
}

fn section_header(repo: &Repo) -> String {
    format!("\n## {} ({})\n", repo.name, repo.display_dir())
}

fn push_labeled(out: &mut String, label: &str, text: &str) {
    out.push_str(&format!("\n--- {label} ---\n"));
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
}

/// Append one repository's live-mode section. `categories` are
/// (label, filtered and rewritten diff text) pairs already in priority
/// order; empty categories are elided, and a repository with nothing left
/// gets a single clean-tree marker.
pub fn push_live_section(out: &mut String, repo: &Repo, categories: &[(String, String)]) {
    out.push_str(&section_header(repo));

    let populated: Vec<&(String, String)> = categories
        .iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .collect();

    if populated.is_empty() {
        out.push_str(CLEAN_MARKER);
        out.push('\n');
        return;
    }

    for (label, text) in populated {
        push_labeled(out, label, text);
    }
}

/// Append one repository's history section: one labeled subsection per
/// selected commit, in selection order. The caller has already dropped
/// commits whose entire diff was filtered away.
pub fn push_history_section(out: &mut String, repo: &Repo, commits: &[(Commit, String)]) {
    out.push_str(&section_header(repo));

    if commits.is_empty() {
        out.push_str(NO_COMMITS_MARKER);
        out.push('\n');
        return;
    }

    for (commit, text) in commits {
        let label = format!(
            "commit {} {} {}: {}",
            commit.hash, commit.date, commit.author, commit.subject
        );
        push_labeled(out, &label, text);
    }
}
