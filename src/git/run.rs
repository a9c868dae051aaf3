use std::process::Command;

/// Outcome of one git invocation. `Failed` means the process could not be
/// executed at all; a completed call with empty stdout is the common
/// "nothing to report" case. The two collapse to the same empty text at the
/// retrieval layer but stay distinguishable here.
#[derive(Debug)]
pub enum RunOutput {
    Completed { ok: bool, stdout: String },
    Failed,
}

impl RunOutput {
    /// Stdout when the command ran and exited zero, else empty.
    pub fn text(self) -> String {
        match self {
            RunOutput::Completed { ok: true, stdout } => stdout,
            _ => String::new(),
        }
    }

    /// Stdout regardless of exit status. `git diff --no-index` exits 1
    /// whenever the files differ, so its output is read leniently.
    pub fn text_lenient(self) -> String {
        match self {
            RunOutput::Completed { stdout, .. } => stdout,
            RunOutput::Failed => String::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, RunOutput::Completed { ok: true, .. })
    }
}

/// Run git in `dir`. Never errors: retrieval treats every underlying
/// failure as "no output".
pub fn run_git(dir: &str, args: &[&str]) -> RunOutput {
    run_program("git", dir, args)
}

fn run_program(program: &str, dir: &str, args: &[&str]) -> RunOutput {
    log::debug!("{} -C {} {}", program, dir, args.join(" "));
    match Command::new(program).args(args).current_dir(dir).output() {
        Ok(output) => {
            let ok = output.status.success();
            if !ok {
                let stderr = String::from_utf8_lossy(&output.stderr);
                log::debug!("{} exited {:?}: {}", program, output.status.code(), stderr.trim());
            }
            RunOutput::Completed {
                ok,
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            }
        }
        Err(err) => {
            log::debug!("{} failed to execute in {}: {}", program, dir, err);
            RunOutput::Failed
        }
    }
}
