//! File classification
//!
//! An ordered table of (predicate, category) rules evaluated top to bottom.
//! Test rules come first because test files usually carry source extensions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::extension_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Test,
    Doc,
    Config,
    Asset,
    Script,
    Source,
    Other,
}

impl FileCategory {
    pub const ALL: [FileCategory; 7] = [
        FileCategory::Test,
        FileCategory::Doc,
        FileCategory::Config,
        FileCategory::Asset,
        FileCategory::Script,
        FileCategory::Source,
        FileCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Test => "test",
            FileCategory::Doc => "doc",
            FileCategory::Config => "config",
            FileCategory::Asset => "asset",
            FileCategory::Script => "script",
            FileCategory::Source => "source",
            FileCategory::Other => "other",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased pieces of a path that the rules look at
struct PathFacts<'a> {
    segments: Vec<&'a str>,
    file_name: &'a str,
    stem: &'a str,
    ext: &'a str,
}

impl<'a> PathFacts<'a> {
    fn new(lower: &'a str, ext: &'a str) -> Self {
        let segments: Vec<&str> = lower.split('/').filter(|s| !s.is_empty()).collect();
        let file_name = segments.last().copied().unwrap_or("");
        let stem = match file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => file_name,
        };
        Self {
            segments,
            file_name,
            stem,
            ext,
        }
    }

    fn directories(&self) -> &[&'a str] {
        &self.segments[..self.segments.len().saturating_sub(1)]
    }
}

type Rule = (fn(&PathFacts) -> bool, FileCategory);

const TEST_DIRS: &[&str] = &["test", "tests", "__tests__", "spec", "specs", "testdata", "e2e"];
const DOC_NAMES: &[&str] = &[
    "license",
    "licence",
    "readme",
    "changelog",
    "authors",
    "contributing",
    "notice",
];
const DOC_EXTS: &[&str] = &[".md", ".txt", ".rst", ".adoc", ".org"];
const CONFIG_NAMES: &[&str] = &[
    ".gitignore",
    ".gitattributes",
    ".keep",
    ".editorconfig",
    "makefile",
    "dockerfile",
];
const CONFIG_EXTS: &[&str] = &[".json", ".yaml", ".yml", ".toml", ".lock", ".cfg", ".ini", ".xml"];
const ASSET_EXTS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".svg", ".ico", ".gif", ".webp", ".bmp", ".ttf", ".woff",
];
const SCRIPT_EXTS: &[&str] = &[".sh", ".bash", ".zsh", ".ps1", ".bat"];
const SOURCE_EXTS: &[&str] = &[
    ".rs", ".c", ".h", ".cc", ".cpp", ".hpp", ".go", ".py", ".js", ".jsx", ".ts", ".tsx", ".java",
    ".kt", ".rb", ".zig", ".swift", ".cs", ".s", ".asm",
];

fn is_test(p: &PathFacts) -> bool {
    p.directories().iter().any(|d| TEST_DIRS.contains(d))
        || p.stem.starts_with("test_")
        || p.stem.ends_with("_test")
        || p.stem.ends_with("_tests")
        || p.stem.ends_with("_spec")
        || p.stem.ends_with(".test")
        || p.stem.ends_with(".spec")
}

fn is_doc(p: &PathFacts) -> bool {
    DOC_NAMES.contains(&p.stem) || DOC_NAMES.contains(&p.file_name) || DOC_EXTS.contains(&p.ext)
}

fn is_config(p: &PathFacts) -> bool {
    CONFIG_NAMES.contains(&p.file_name) || CONFIG_EXTS.contains(&p.ext)
}

fn is_asset(p: &PathFacts) -> bool {
    ASSET_EXTS.contains(&p.ext)
}

fn is_script(p: &PathFacts) -> bool {
    SCRIPT_EXTS.contains(&p.ext)
}

fn is_source(p: &PathFacts) -> bool {
    SOURCE_EXTS.contains(&p.ext)
}

const RULES: &[Rule] = &[
    (is_test, FileCategory::Test),
    (is_doc, FileCategory::Doc),
    (is_config, FileCategory::Config),
    (is_asset, FileCategory::Asset),
    (is_script, FileCategory::Script),
    (is_source, FileCategory::Source),
];

/// Classify a repository-relative path. Total: unmatched paths are `Other`.
pub fn classify(path: &str) -> FileCategory {
    let lower = path.to_ascii_lowercase();
    let ext = extension_label(&lower);
    let facts = PathFacts::new(&lower, &ext);
    RULES
        .iter()
        .find(|(matches, _)| matches(&facts))
        .map_or(FileCategory::Other, |&(_, category)| category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tests_win_over_source() {
        assert_eq!(classify("tests/parser.rs"), FileCategory::Test);
        assert_eq!(classify("src/lexer_test.go"), FileCategory::Test);
        assert_eq!(classify("web/app.spec.ts"), FileCategory::Test);
        assert_eq!(classify("py/test_utils.py"), FileCategory::Test);
    }

    #[test]
    fn test_spec_substring_is_not_a_test() {
        assert_eq!(classify("src/inspect.rs"), FileCategory::Source);
        assert_eq!(classify("src/contest.c"), FileCategory::Source);
    }

    #[test]
    fn test_docs() {
        assert_eq!(classify("README.md"), FileCategory::Doc);
        assert_eq!(classify("LICENSE"), FileCategory::Doc);
        assert_eq!(classify("docs/notes.txt"), FileCategory::Doc);
    }

    #[test]
    fn test_config_and_assets() {
        assert_eq!(classify("Cargo.toml"), FileCategory::Config);
        assert_eq!(classify(".gitignore"), FileCategory::Config);
        assert_eq!(classify("deploy/config.yaml"), FileCategory::Config);
        assert_eq!(classify("img/logo.PNG"), FileCategory::Asset);
    }

    #[test]
    fn test_scripts_and_sources() {
        assert_eq!(classify("ci/run.sh"), FileCategory::Script);
        assert_eq!(classify("src/ir/lower.rs"), FileCategory::Source);
        assert_eq!(classify("include/ast.h"), FileCategory::Source);
    }

    #[test]
    fn test_unmatched_is_other() {
        assert_eq!(classify("data/blob.bin"), FileCategory::Other);
        assert_eq!(classify("NOEXT"), FileCategory::Other);
        assert_eq!(classify(""), FileCategory::Other);
    }
}
