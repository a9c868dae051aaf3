use std::io::Write;
use std::process::{Command, Stdio};

/// One way to get text onto the clipboard. Strategies are tried in order
/// until one reports success.
enum Strategy {
    CrossPlatform,
    Pipe {
        program: &'static str,
        args: &'static [&'static str],
    },
}

fn strategies() -> Vec<Strategy> {
    let mut list = vec![Strategy::CrossPlatform];
    if cfg!(target_os = "macos") {
        list.push(Strategy::Pipe { program: "pbcopy", args: &[] });
    } else if cfg!(target_os = "windows") {
        list.push(Strategy::Pipe { program: "clip", args: &[] });
    } else {
        list.push(Strategy::Pipe {
            program: "xclip",
            args: &["-selection", "clipboard"],
        });
        list.push(Strategy::Pipe {
            program: "xsel",
            args: &["--clipboard", "--input"],
        });
    }
    list
}

/// Attempt clipboard delivery through the fallback chain. False when every
/// strategy failed; the caller then prints the report instead.
pub fn deliver(text: &str) -> bool {
    for strategy in strategies() {
        let ok = match strategy {
            Strategy::CrossPlatform => copy_cross_platform(text),
            Strategy::Pipe { program, args } => pipe_to(program, args, text),
        };
        if ok {
            return true;
        }
    }
    false
}

fn copy_cross_platform(text: &str) -> bool {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
        Ok(()) => true,
        Err(err) => {
            log::debug!("cross-platform clipboard write failed: {err}");
            false
        }
    }
}

/// Write the text to a platform clipboard utility via its stdin.
fn pipe_to(program: &str, args: &[&str], text: &str) -> bool {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(err) => {
            log::debug!("{program} unavailable: {err}");
            return false;
        }
    };

    if let Some(ref mut stdin) = child.stdin {
        if stdin.write_all(text.as_bytes()).is_err() {
            let _ = child.wait();
            return false;
        }
    }

    // wait() closes the child's stdin before waiting.
    matches!(child.wait(), Ok(status) if status.success())
}
