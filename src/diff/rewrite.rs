/// Prepend a repository prefix to the paths in the three diff header kinds
/// (`diff --git a/<p> b/<p>`, `--- a/<p>`, `+++ b/<p>`) so a sub-repository's
/// diff reads as a subtree of one combined patch. Every other line, including
/// `/dev/null` sides, is byte-identical in the output. An empty prefix is the
/// identity function.
pub fn rewrite_paths(diff: &str, prefix: &str) -> String {
    if prefix.is_empty() || diff.is_empty() {
        return diff.to_string();
    }

    let mut out = String::with_capacity(diff.len() + 256);
    for line in diff.split_inclusive('\n') {
        let (content, ending) = match line.strip_suffix('\n') {
            Some(c) => (c, "\n"),
            None => (line, ""),
        };
        match rewrite_header(content, prefix) {
            Some(rewritten) => {
                out.push_str(&rewritten);
                out.push_str(ending);
            }
            None => out.push_str(line),
        }
    }
    out
}

fn rewrite_header(line: &str, prefix: &str) -> Option<String> {
    if let Some(rest) = line.strip_prefix("diff --git a/") {
        let (a, b) = rest.rsplit_once(" b/")?;
        return Some(format!("diff --git a/{prefix}{a} b/{prefix}{b}"));
    }
    if let Some(path) = line.strip_prefix("--- a/") {
        return Some(format!("--- a/{prefix}{path}"));
    }
    if let Some(path) = line.strip_prefix("+++ b/") {
        return Some(format!("+++ b/{prefix}{path}"));
    }
    None
}
