mod filter;
mod rewrite;

#[allow(unused_imports)]
pub use filter::{filter_diff, split_blocks, DiffBlock, IgnoreRule, IGNORE_RULES};
pub use rewrite::rewrite_paths;
