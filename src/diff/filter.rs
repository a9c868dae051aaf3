use glob::{MatchOptions, Pattern};

/// The text for one file's change within a larger diff, delimited by its
/// `diff --git` header line. The atomic unit of filtering: a block is kept
/// or dropped whole.
#[derive(Debug, Clone)]
pub struct DiffBlock {
    pub path_a: String,
    pub path_b: String,
    pub body: String,
}

impl DiffBlock {
    /// A block whose header could not be parsed. Kept conservatively.
    pub fn has_header(&self) -> bool {
        !self.path_a.is_empty() || !self.path_b.is_empty()
    }
}

/// One noise rule: a glob matched against both header paths of a block.
pub struct IgnoreRule {
    pub pattern: &'static str,
    pub description: &'static str,
}

/// Fixed noise table. Ordered; extending it never touches control flow.
pub const IGNORE_RULES: &[IgnoreRule] = &[
    // Dependency directories
    IgnoreRule { pattern: "*node_modules/*", description: "npm dependencies" },
    // Lockfiles
    IgnoreRule { pattern: "*package-lock.json", description: "npm lockfile" },
    IgnoreRule { pattern: "*yarn.lock", description: "yarn lockfile" },
    IgnoreRule { pattern: "*pnpm-lock.yaml", description: "pnpm lockfile" },
    IgnoreRule { pattern: "*Cargo.lock", description: "cargo lockfile" },
    IgnoreRule { pattern: "*composer.lock", description: "composer lockfile" },
    IgnoreRule { pattern: "*Gemfile.lock", description: "bundler lockfile" },
    IgnoreRule { pattern: "*poetry.lock", description: "poetry lockfile" },
    // Compiled / binary artifacts
    IgnoreRule { pattern: "*.exe", description: "binary" },
    IgnoreRule { pattern: "*.dll", description: "binary" },
    IgnoreRule { pattern: "*.so", description: "binary" },
    IgnoreRule { pattern: "*.dylib", description: "binary" },
    IgnoreRule { pattern: "*.o", description: "object file" },
    IgnoreRule { pattern: "*.a", description: "static library" },
    IgnoreRule { pattern: "*.class", description: "java bytecode" },
    IgnoreRule { pattern: "*.pyc", description: "python bytecode" },
    // OS metadata
    IgnoreRule { pattern: "*.DS_Store", description: "macOS metadata" },
    IgnoreRule { pattern: "*Thumbs.db", description: "Windows metadata" },
    // Logs and env files
    IgnoreRule { pattern: "*.log", description: "log file" },
    IgnoreRule { pattern: "*.env", description: "env file" },
    IgnoreRule { pattern: "*.env.*", description: "env file" },
    // Editor settings
    IgnoreRule { pattern: "*.idea/*", description: "editor settings" },
    IgnoreRule { pattern: "*.vscode/*", description: "editor settings" },
    // Build output
    IgnoreRule { pattern: "*dist/*", description: "build output" },
    IgnoreRule { pattern: "*build/*", description: "build output" },
    IgnoreRule { pattern: "*target/*", description: "build output" },
    IgnoreRule { pattern: "*.next/*", description: "build output" },
    IgnoreRule { pattern: "*coverage/*", description: "coverage output" },
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Split raw diff text into per-file blocks on `diff --git` header lines.
/// Text before the first header becomes a headerless block. Byte-exact:
/// concatenating the bodies reproduces the input.
pub fn split_blocks(raw: &str) -> Vec<DiffBlock> {
    let mut blocks = Vec::new();
    let mut block_start = 0usize;
    let mut paths = (String::new(), String::new());
    let mut pos = 0usize;

    for line in raw.split_inclusive('\n') {
        if line.starts_with("diff --git ") {
            if pos > block_start {
                blocks.push(DiffBlock {
                    path_a: paths.0,
                    path_b: paths.1,
                    body: raw[block_start..pos].to_string(),
                });
            }
            block_start = pos;
            paths = parse_header_paths(line.trim_end_matches(['\n', '\r']))
                .unwrap_or((String::new(), String::new()));
        }
        pos += line.len();
    }

    if pos > block_start {
        blocks.push(DiffBlock {
            path_a: paths.0,
            path_b: paths.1,
            body: raw[block_start..pos].to_string(),
        });
    }

    blocks
}

/// Extract the two paths from `diff --git a/<pa> b/<pb>`.
/// Splits on the last ` b/` so paths containing spaces survive.
fn parse_header_paths(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("diff --git a/")?;
    let (a, b) = rest.rsplit_once(" b/")?;
    Some((a.to_string(), b.to_string()))
}

/// Drop every block whose header paths hit the noise table; keep the rest
/// byte-exact and in order. Idempotent: filtering a filtered diff is a no-op.
pub fn filter_diff(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let rules: Vec<(Pattern, &str)> = IGNORE_RULES
        .iter()
        .filter_map(|r| Pattern::new(r.pattern).ok().map(|p| (p, r.description)))
        .collect();

    let mut out = String::with_capacity(raw.len());
    for block in split_blocks(raw) {
        if keep_block(&block, &rules) {
            out.push_str(&block.body);
        }
    }
    out
}

fn keep_block(block: &DiffBlock, rules: &[(Pattern, &str)]) -> bool {
    if !block.has_header() {
        return true;
    }
    let hit = |path: &str| {
        rules.iter().find(|(pattern, _)| pattern.matches_with(path, MATCH_OPTIONS))
    };
    if let Some((_, description)) = hit(&block.path_a).or_else(|| hit(&block.path_b)) {
        log::debug!("dropping {} ({})", block.path_b, description);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FILE_DIFF: &str = "diff --git a/src/x.ts b/src/x.ts\n\
index abc123..def456 100644\n\
--- a/src/x.ts\n\
+++ b/src/x.ts\n\
@@ -1,2 +1,3 @@\n\
 const x = 1;\n\
+const y = 2;\n\
diff --git a/package-lock.json b/package-lock.json\n\
index 111111..222222 100644\n\
--- a/package-lock.json\n\
+++ b/package-lock.json\n\
@@ -1,1 +1,1 @@\n\
-\"version\": \"1.0.0\"\n\
+\"version\": \"1.0.1\"\n";

    // ── split_blocks ──

    #[test]
    fn split_empty_input_yields_no_blocks() {
        assert!(split_blocks("").is_empty());
    }

    #[test]
    fn split_two_blocks_with_paths() {
        let blocks = split_blocks(TWO_FILE_DIFF);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].path_a, "src/x.ts");
        assert_eq!(blocks[0].path_b, "src/x.ts");
        assert_eq!(blocks[1].path_b, "package-lock.json");
    }

    #[test]
    fn split_is_byte_exact() {
        let rejoined: String = split_blocks(TWO_FILE_DIFF)
            .into_iter()
            .map(|b| b.body)
            .collect();
        assert_eq!(rejoined, TWO_FILE_DIFF);
    }

    #[test]
    fn split_preamble_becomes_headerless_block() {
        let raw = "some stray preamble\ndiff --git a/a.rs b/a.rs\n--- a/a.rs\n+++ b/a.rs\n";
        let blocks = split_blocks(raw);
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[0].has_header());
        assert_eq!(blocks[0].body, "some stray preamble\n");
    }

    #[test]
    fn split_header_with_spaces_in_path() {
        let raw = "diff --git a/my file.txt b/my file.txt\n--- a/my file.txt\n+++ b/my file.txt\n";
        let blocks = split_blocks(raw);
        assert_eq!(blocks[0].path_a, "my file.txt");
        assert_eq!(blocks[0].path_b, "my file.txt");
    }

    // ── filter_diff ──

    #[test]
    fn filter_drops_lockfile_keeps_source() {
        let filtered = filter_diff(TWO_FILE_DIFF);
        assert!(filtered.contains("diff --git a/src/x.ts b/src/x.ts"));
        assert!(!filtered.contains("package-lock.json"));
    }

    #[test]
    fn filter_preserves_kept_block_bytes() {
        let filtered = filter_diff(TWO_FILE_DIFF);
        let blocks = split_blocks(TWO_FILE_DIFF);
        assert_eq!(filtered, blocks[0].body);
    }

    #[test]
    fn filter_is_idempotent() {
        let once = filter_diff(TWO_FILE_DIFF);
        let twice = filter_diff(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn filter_empty_input() {
        assert_eq!(filter_diff(""), "");
    }

    #[test]
    fn filter_keeps_headerless_block() {
        let raw = "not a diff header\njust text\n";
        assert_eq!(filter_diff(raw), raw);
    }

    #[test]
    fn filter_matches_either_path() {
        // Rename where only the old side is noise: still dropped.
        let raw = "diff --git a/yarn.lock b/deps.txt\n--- a/yarn.lock\n+++ b/deps.txt\n@@ -1 +1 @@\n-x\n+y\n";
        assert_eq!(filter_diff(raw), "");
    }

    #[test]
    fn filter_drops_nested_dependency_dir() {
        let raw = "diff --git a/web/node_modules/pkg/index.js b/web/node_modules/pkg/index.js\n@@ -1 +1 @@\n-a\n+b\n";
        assert_eq!(filter_diff(raw), "");
    }

    #[test]
    fn filter_drops_env_and_log_files() {
        for path in [".env", ".env.local", "server.log"] {
            let raw = format!("diff --git a/{path} b/{path}\n@@ -1 +1 @@\n-a\n+b\n");
            assert_eq!(filter_diff(&raw), "", "expected {path} to be dropped");
        }
    }

    #[test]
    fn filter_keeps_ordinary_source_paths() {
        for path in ["src/main.rs", "lib/env_reader.ts", "docs/buildings.md"] {
            let raw = format!("diff --git a/{path} b/{path}\n@@ -1 +1 @@\n-a\n+b\n");
            assert_eq!(filter_diff(&raw), raw, "expected {path} to survive");
        }
    }

    #[test]
    fn filter_drops_build_output_dirs() {
        for path in ["dist/app.js", "api/build/out.js", "target/debug/foo", ".next/cache/x"] {
            let raw = format!("diff --git a/{path} b/{path}\n@@ -1 +1 @@\n-a\n+b\n");
            assert_eq!(filter_diff(&raw), "", "expected {path} to be dropped");
        }
    }
}
