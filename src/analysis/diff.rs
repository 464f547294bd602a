//! Line-level LCS diff
//!
//! Two entry points: [`lcs_len`] for the trajectory distance, which only
//! needs the length and runs in linear memory, and [`diff_lines`] for the
//! in-memory history source, which needs the edit script. Once the full
//! table would exceed [`TABLE_CELL_LIMIT`] cells, `diff_lines` switches to
//! Hirschberg's split, which keeps memory linear at twice the compares.

/// Edit operation produced by LCS backtracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Equal(usize, usize), // old_idx, new_idx
    Insert(usize),       // new_idx
    Delete(usize),       // old_idx
}

/// Largest `(m + 1) * (n + 1)` table `diff_lines` will allocate
pub const TABLE_CELL_LIMIT: usize = 1 << 22;

/// Lengths of the shared prefix and suffix, non-overlapping
fn common_ends<T: PartialEq>(old: &[T], new: &[T]) -> (usize, usize) {
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    (prefix, suffix)
}

/// Length of the longest common subsequence of two line sequences
pub fn lcs_len<T: PartialEq>(old: &[T], new: &[T]) -> usize {
    let (prefix, suffix) = common_ends(old, new);
    let old = &old[prefix..old.len() - suffix];
    let new = &new[prefix..new.len() - suffix];
    if old.is_empty() || new.is_empty() {
        return prefix + suffix;
    }

    // Two rows over the shorter side
    let (outer, inner) = if old.len() >= new.len() { (old, new) } else { (new, old) };
    let mut prev = vec![0usize; inner.len() + 1];
    let mut curr = vec![0usize; inner.len() + 1];
    for a in outer {
        for (j, b) in inner.iter().enumerate() {
            curr[j + 1] = if a == b {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prefix + suffix + prev[inner.len()]
}

/// `1 - lcs / max(len)`; two empty sequences are identical
pub fn distance<T: PartialEq>(version: &[T], target: &[T]) -> f64 {
    let longest = version.len().max(target.len());
    if longest == 0 {
        return 0.0;
    }
    let common = lcs_len(version, target);
    (1.0 - common as f64 / longest as f64).clamp(0.0, 1.0)
}

fn lcs_table<T: PartialEq>(old: &[T], new: &[T]) -> Vec<Vec<usize>> {
    let m = old.len();
    let n = new.len();
    let mut table = vec![vec![0usize; n + 1]; m + 1];

    for i in 1..=m {
        for j in 1..=n {
            if old[i - 1] == new[j - 1] {
                table[i][j] = table[i - 1][j - 1] + 1;
            } else {
                table[i][j] = table[i - 1][j].max(table[i][j - 1]);
            }
        }
    }

    table
}

/// Edit script turning `old` into `new`. Both `old_idx` and `new_idx`
/// increase along the returned sequence.
pub fn diff_lines<T: PartialEq>(old: &[T], new: &[T]) -> Vec<EditOp> {
    let (prefix, suffix) = common_ends(old, new);
    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let cells = (old_mid.len() + 1).saturating_mul(new_mid.len() + 1);
    let middle = if cells <= TABLE_CELL_LIMIT {
        backtrack(old_mid, new_mid, prefix)
    } else {
        let mut ops = Vec::with_capacity(old_mid.len() + new_mid.len());
        hirschberg(old_mid, new_mid, prefix, prefix, &mut ops);
        ops
    };

    let mut ops = Vec::with_capacity(prefix + middle.len() + suffix);
    ops.extend((0..prefix).map(|k| EditOp::Equal(k, k)));
    ops.extend(middle);
    let old_tail = old.len() - suffix;
    let new_tail = new.len() - suffix;
    ops.extend((0..suffix).map(|k| EditOp::Equal(old_tail + k, new_tail + k)));
    ops
}

/// Full-table backtrack; `prefix` is added to both sides' indices
fn backtrack<T: PartialEq>(old_mid: &[T], new_mid: &[T], prefix: usize) -> Vec<EditOp> {
    let table = lcs_table(old_mid, new_mid);
    let mut middle = Vec::with_capacity(old_mid.len() + new_mid.len());
    let mut i = old_mid.len();
    let mut j = new_mid.len();
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old_mid[i - 1] == new_mid[j - 1] {
            middle.push(EditOp::Equal(prefix + i - 1, prefix + j - 1));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i][j - 1] >= table[i - 1][j]) {
            middle.push(EditOp::Insert(prefix + j - 1));
            j -= 1;
        } else {
            middle.push(EditOp::Delete(prefix + i - 1));
            i -= 1;
        }
    }
    middle.reverse();
    middle
}

/// Last DP row of `lcs(a, b[..j])` for every `j`, or of `lcs(a, b[n - j..])`
/// when `from_end` is set
fn lcs_row<T: PartialEq>(a: &[T], b: &[T], from_end: bool) -> Vec<usize> {
    let n = b.len();
    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];
    for i in 0..a.len() {
        let x = if from_end { &a[a.len() - 1 - i] } else { &a[i] };
        for j in 0..n {
            let y = if from_end { &b[n - 1 - j] } else { &b[j] };
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev
}

fn hirschberg<T: PartialEq>(
    old: &[T],
    new: &[T],
    old_off: usize,
    new_off: usize,
    out: &mut Vec<EditOp>,
) {
    if old.is_empty() {
        out.extend((0..new.len()).map(|j| EditOp::Insert(new_off + j)));
        return;
    }
    if new.is_empty() {
        out.extend((0..old.len()).map(|i| EditOp::Delete(old_off + i)));
        return;
    }
    if old.len() == 1 {
        match new.iter().position(|y| *y == old[0]) {
            Some(p) => {
                out.extend((0..p).map(|j| EditOp::Insert(new_off + j)));
                out.push(EditOp::Equal(old_off, new_off + p));
                out.extend((p + 1..new.len()).map(|j| EditOp::Insert(new_off + j)));
            }
            None => {
                out.push(EditOp::Delete(old_off));
                out.extend((0..new.len()).map(|j| EditOp::Insert(new_off + j)));
            }
        }
        return;
    }

    let mid = old.len() / 2;
    let head = lcs_row(&old[..mid], new, false);
    let tail = lcs_row(&old[mid..], new, true);
    let n = new.len();
    let mut split = 0;
    let mut best = 0;
    for k in 0..=n {
        let total = head[k] + tail[n - k];
        if total > best {
            best = total;
            split = k;
        }
    }
    hirschberg(&old[..mid], &new[..split], old_off, new_off, out);
    hirschberg(&old[mid..], &new[split..], old_off + mid, new_off + split, out);
}
