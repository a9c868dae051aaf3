mod retrieve;
mod run;

pub use retrieve::{
    diff_ahead, diff_staged, diff_unstaged, diff_untracked_file, list_branches, log_commits,
    resolve_upstream, show_commit, sync_remotes, untracked_files, Branch, Commit,
};
#[allow(unused_imports)]
pub use run::{run_git, RunOutput};
