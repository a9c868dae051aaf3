mod clipboard;
mod diff;
mod discover;
mod git;
mod report;
mod select;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use discover::Repo;
use std::process::ExitCode;

/// Aggregate filtered git diffs across a repo and its sub-repos into one
/// clipboard-ready report
#[derive(Parser)]
#[command(name = "cpd", version, about)]
struct Cli {
    /// Skip the delivery confirmation prompt
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    /// Comma list of repository names or directories to include
    #[arg(long, global = true)]
    repos: Option<String>,

    /// Glob pattern of candidate repository directories to drop
    #[arg(long, global = true)]
    exclude: Option<String>,

    /// Also print the report to stdout after delivery
    #[arg(long, global = true)]
    stdout: bool,

    /// Suppress status messages
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Pick branches and commits from history instead of pending changes
    History {
        /// Comma list of branch names to include
        #[arg(long)]
        branches: Option<String>,

        /// Comma list of commit short hashes to include
        #[arg(long)]
        commits: Option<String>,

        /// Max commits listed per branch
        #[arg(long, default_value_t = 6)]
        limit: usize,
    },
}

// 0 = delivered or explicitly printed; 1 = declined or fell back to print;
// 2 = fatal precondition failure.
const EXIT_DEGRADED: u8 = 1;
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let ctx = select::Interactivity::detect();
    let root = std::env::current_dir().context("cannot determine working directory")?;

    let repos = discover::discover(&root, cli.exclude.as_deref())?;
    if repos.is_empty() {
        bail!("no repositories found under {}", root.display());
    }

    let report = match &cli.command {
        None => build_live_report(cli, &repos),
        Some(Command::History { branches, commits, limit }) => build_history_report(
            cli,
            ctx,
            &repos,
            branches.as_deref(),
            commits.as_deref(),
            *limit,
        )?,
    };

    deliver(cli, ctx, &report)
}

fn repo_matches(repo: &Repo, id: &str) -> bool {
    repo.name == id || repo.rel == id || (repo.rel.is_empty() && id == ".")
}

fn repo_label(repo: &Repo) -> String {
    format!("{} ({})", repo.name, repo.display_dir())
}

/// Filter first, then namespace the surviving headers under the repo prefix.
fn pipeline(raw: &str, prefix: &str) -> String {
    diff::rewrite_paths(&diff::filter_diff(raw), prefix)
}

/// Live-diff mode: no selection flow; every category for every discovered
/// repository is retrieved unconditionally (headless `--repos` still
/// narrows the set).
fn build_live_report(cli: &Cli, repos: &[Repo]) -> String {
    let selected: Vec<&Repo> = match cli.repos.as_deref() {
        Some(list) => {
            select::pick_headless(repos.iter().collect(), list, |r, id| repo_matches(r, id))
        }
        None => repos.iter().collect(),
    };

    git::sync_remotes(&selected);

    let mut out = report::banner(selected.len());
    for repo in &selected {
        let prefix = repo.prefix();
        let mut categories: Vec<(String, String)> = Vec::new();

        // Fixed priority order: remote-vs-head, staged, unstaged, untracked.
        if let Some(upstream) = git::resolve_upstream(repo) {
            let text = pipeline(&git::diff_ahead(repo, &upstream), &prefix);
            categories.push((format!("ahead of {upstream}"), text));
        }
        categories.push(("staged".to_string(), pipeline(&git::diff_staged(repo), &prefix)));
        categories.push(("unstaged".to_string(), pipeline(&git::diff_unstaged(repo), &prefix)));

        let untracked: String = git::untracked_files(repo)
            .iter()
            .map(|path| git::diff_untracked_file(repo, path))
            .collect();
        categories.push(("untracked".to_string(), pipeline(&untracked, &prefix)));

        report::push_live_section(&mut out, repo, &categories);
    }
    out
}

/// History mode: Discovery → Selection → Aggregation. Selection suspends
/// strictly sequentially (repository → branch → commit); cancelling one
/// stage removes only that unit.
fn build_history_report(
    cli: &Cli,
    ctx: select::Interactivity,
    repos: &[Repo],
    branches_arg: Option<&str>,
    commits_arg: Option<&str>,
    limit: usize,
) -> Result<String> {
    let selected = select::pick(
        ctx,
        repos.iter().collect::<Vec<&Repo>>(),
        cli.repos.as_deref(),
        "Repositories to include",
        "--repos",
        |r| repo_label(r),
        |r, id| repo_matches(r, id),
    )?;

    git::sync_remotes(&selected);

    let mut out = report::banner(selected.len());
    for repo in &selected {
        let prefix = repo.prefix();

        let branches = select::pick(
            ctx,
            git::list_branches(repo),
            branches_arg,
            &format!("Branches in {}", repo.name),
            "--branches",
            select::branch_label,
            |b, id| b.name == id,
        )?;

        let mut subsections: Vec<(git::Commit, String)> = Vec::new();
        for branch in &branches {
            let commits = select::pick(
                ctx,
                git::log_commits(repo, &branch.name, limit),
                commits_arg,
                &format!("Commits on {} ({})", branch.name, repo.name),
                "--commits",
                select::commit_label,
                |c, id| c.hash == id,
            )?;

            for commit in commits {
                let text = pipeline(&git::show_commit(repo, &commit.hash), &prefix);
                if text.trim().is_empty() {
                    // The whole diff was noise; drop the commit from the report.
                    log::debug!("commit {} filtered out entirely", commit.hash);
                    continue;
                }
                subsections.push((commit, text));
            }
        }

        report::push_history_section(&mut out, repo, &subsections);
    }
    Ok(out)
}

/// Try the clipboard fallback chain, else print. Exit status tells calling
/// scripts whether delivery succeeded.
fn deliver(cli: &Cli, ctx: select::Interactivity, report: &str) -> Result<ExitCode> {
    if !select::confirm_delivery(ctx, cli.yes)? {
        if !cli.quiet {
            eprintln!("{}", "aborted".yellow());
        }
        return Ok(ExitCode::from(EXIT_DEGRADED));
    }

    if clipboard::deliver(report) {
        if cli.stdout {
            print!("{report}");
        }
        if !cli.quiet {
            let lines = report.lines().count();
            eprintln!("{}", format!("report copied to clipboard ({lines} lines)").dimmed());
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Every strategy failed; stdout is the delivery of last resort.
    print!("{report}");
    eprintln!(
        "{}",
        "warning: clipboard unavailable, report printed to stdout".yellow()
    );
    if cli.stdout {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_DEGRADED))
    }
}
