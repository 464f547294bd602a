// Shared benchmark helpers
// Functions here are used across different benchmark files
#![allow(dead_code)]

use linefate::repository::{Change, MemorySource};

/// `count` lines of pseudo source text
pub fn generate_lines(count: usize, seed: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("    let v{} = compute({}, {});", i, (i * 31 + seed) % 97, seed))
        .collect()
}

/// Same lines with every `stride`-th one rewritten
pub fn perturb(lines: &[String], stride: usize, seed: usize) -> Vec<String> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i % stride == 0 {
                format!("    // revised {} {}", seed, i)
            } else {
                line.clone()
            }
        })
        .collect()
}

/// A history of `commits` commits spread over `files` paths, each commit
/// rewriting a slice of one file
pub fn generate_history(commits: usize, files: usize, lines_per_file: usize) -> MemorySource {
    let dirs = ["src", "tests", "docs", "config"];
    let exts = ["rs", "rs", "md", "toml"];
    let paths: Vec<String> = (0..files)
        .map(|i| format!("{}/file_{}.{}", dirs[i % 4], i, exts[i % 4]))
        .collect();
    let mut contents: Vec<Vec<String>> = (0..files)
        .map(|i| generate_lines(lines_per_file, i))
        .collect();

    let mut source = MemorySource::new();
    let mut timestamp = 1_700_000_000;
    for c in 0..commits {
        timestamp += 300 + (c as i64 * 7919) % 5400;
        let slot = (c * 7) % files;
        contents[slot] = perturb(&contents[slot], 3 + c % 5, c);
        source.commit(timestamp, vec![Change::write(&paths[slot], contents[slot].clone())]);
    }
    source
}
