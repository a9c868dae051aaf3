use crate::git::{Branch, Commit};
use anyhow::{bail, Result};
use dialoguer::{Confirm, MultiSelect};
use std::collections::HashSet;
use std::io::IsTerminal;

/// Whether this run may suspend on prompts. Probed once at startup and
/// passed by parameter; no component reads ambient state.
#[derive(Debug, Clone, Copy)]
pub struct Interactivity {
    pub interactive: bool,
}

impl Interactivity {
    /// Interactive iff both stdin and stderr are live terminals (prompts
    /// render on stderr, answers come from stdin).
    pub fn detect() -> Self {
        Self {
            interactive: std::io::stdin().is_terminal() && std::io::stderr().is_terminal(),
        }
    }

    #[cfg(test)]
    fn headless() -> Self {
        Self { interactive: false }
    }
}

/// Split a comma list into trimmed, non-empty identifiers.
pub fn parse_id_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Headless selection: keep the candidates whose identifier appears in the
/// comma list, preserving candidate order. An identifier with no match
/// selects nothing; that is not an error.
pub fn pick_headless<T>(
    candidates: Vec<T>,
    list: &str,
    matches: impl Fn(&T, &str) -> bool,
) -> Vec<T> {
    let wanted = parse_id_list(list);
    candidates
        .into_iter()
        .filter(|candidate| wanted.iter().any(|id| matches(candidate, id)))
        .collect()
}

/// Interactive multi-select over the candidates. Cancelling (Esc) yields an
/// empty selection for this stage without unwinding prior stages.
fn pick_interactive<T>(
    candidates: Vec<T>,
    prompt: &str,
    label: impl Fn(&T) -> String,
) -> Result<Vec<T>> {
    if candidates.is_empty() {
        return Ok(candidates);
    }
    let items: Vec<String> = candidates.iter().map(&label).collect();
    let picked = MultiSelect::new()
        .with_prompt(prompt)
        .items(&items)
        .interact_opt()?;
    let Some(indices) = picked else {
        return Ok(Vec::new());
    };
    let chosen: HashSet<usize> = indices.into_iter().collect();
    Ok(candidates
        .into_iter()
        .enumerate()
        .filter(|(i, _)| chosen.contains(i))
        .map(|(_, candidate)| candidate)
        .collect())
}

/// Resolve one selection stage. An explicit comma list always wins; without
/// one, an interactive terminal prompts, and a non-interactive run is a
/// fatal precondition failure (ambiguous intent).
pub fn pick<T>(
    ctx: Interactivity,
    candidates: Vec<T>,
    explicit: Option<&str>,
    prompt: &str,
    flag: &str,
    label: impl Fn(&T) -> String,
    matches: impl Fn(&T, &str) -> bool,
) -> Result<Vec<T>> {
    if let Some(list) = explicit {
        return Ok(pick_headless(candidates, list, matches));
    }
    if ctx.interactive {
        return pick_interactive(candidates, prompt, label);
    }
    bail!("non-interactive run: {flag} is required")
}

/// Ask before delivery. Headless runs never prompt; `--yes` skips the
/// prompt in interactive runs. False only when the user declined.
pub fn confirm_delivery(ctx: Interactivity, yes: bool) -> Result<bool> {
    if yes || !ctx.interactive {
        return Ok(true);
    }
    let answer = Confirm::new()
        .with_prompt("Copy report to clipboard?")
        .default(true)
        .interact_opt()?;
    Ok(answer.unwrap_or(false))
}

// ── Choice labels ──

/// Branch choice line, decorated (display only) with HEAD and upstream
/// ahead/behind counts.
pub fn branch_label(branch: &Branch) -> String {
    let mut label = branch.name.clone();
    if branch.is_head {
        label.push_str(" [HEAD]");
    }
    match &branch.upstream {
        Some(upstream) => {
            label.push_str(&format!(" ({upstream} ↑{} ↓{})", branch.ahead, branch.behind));
        }
        None => label.push_str(" (no upstream)"),
    }
    label
}

/// Commit choice line: short hash, date, subject.
pub fn commit_label(commit: &Commit) -> String {
    format!("{} {} {}", commit.hash, commit.date, commit.subject)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(picked: Vec<&str>) -> Vec<String> {
        picked.into_iter().map(str::to_string).collect()
    }

    // ── parse_id_list ──

    #[test]
    fn id_list_trims_and_drops_empties() {
        assert_eq!(parse_id_list(" a, b ,,c "), ["a", "b", "c"]);
    }

    #[test]
    fn id_list_empty_string() {
        assert!(parse_id_list("").is_empty());
        assert!(parse_id_list(" , ").is_empty());
    }

    // ── pick_headless ──

    #[test]
    fn headless_preserves_candidate_order() {
        let candidates = vec!["zeta", "alpha", "mid"];
        let picked = pick_headless(candidates, "mid,zeta", |c, id| *c == id);
        assert_eq!(names(picked), ["zeta", "mid"]);
    }

    #[test]
    fn headless_zero_valid_ids_yields_empty_selection() {
        let candidates = vec!["main", "dev"];
        let picked = pick_headless(candidates, "nope,missing", |c, id| *c == id);
        assert!(picked.is_empty());
    }

    #[test]
    fn headless_partial_match() {
        let candidates = vec!["main", "dev", "feature"];
        let picked = pick_headless(candidates, "dev,ghost", |c, id| *c == id);
        assert_eq!(names(picked), ["dev"]);
    }

    // ── pick ──

    #[test]
    fn explicit_list_wins_even_headless() {
        let picked = pick(
            Interactivity::headless(),
            vec!["main", "dev"],
            Some("dev"),
            "Branches",
            "--branches",
            |c| c.to_string(),
            |c, id| *c == id,
        )
        .unwrap();
        assert_eq!(names(picked), ["dev"]);
    }

    #[test]
    fn headless_without_override_is_fatal() {
        let result = pick(
            Interactivity::headless(),
            vec!["main"],
            None,
            "Branches",
            "--branches",
            |c| c.to_string(),
            |c, id| *c == id,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("--branches"));
    }

    #[test]
    fn headless_confirmation_never_prompts() {
        assert!(confirm_delivery(Interactivity::headless(), false).unwrap());
        assert!(confirm_delivery(Interactivity::headless(), true).unwrap());
    }

    // ── labels ──

    #[test]
    fn branch_label_with_upstream() {
        let branch = Branch {
            name: "main".into(),
            is_head: true,
            upstream: Some("origin/main".into()),
            ahead: 2,
            behind: 1,
        };
        assert_eq!(branch_label(&branch), "main [HEAD] (origin/main ↑2 ↓1)");
    }

    #[test]
    fn branch_label_without_upstream() {
        let branch = Branch {
            name: "feature/x".into(),
            is_head: false,
            upstream: None,
            ahead: 0,
            behind: 0,
        };
        assert_eq!(branch_label(&branch), "feature/x (no upstream)");
    }

    #[test]
    fn commit_label_format() {
        let commit = Commit {
            hash: "a1b2c3d".into(),
            date: "2026-08-01".into(),
            author: "Jane Doe".into(),
            subject: "Fix the thing".into(),
        };
        assert_eq!(commit_label(&commit), "a1b2c3d 2026-08-01 Fix the thing");
    }
}
