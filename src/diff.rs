//! Character-level diff between last known remote content and local content
//!
//! Phrase content is short UI copy, so the diff works on Unicode scalar
//! values rather than words or lines. It only drives display and the
//! "needs push" decision, never merging.

use serde::{Deserialize, Serialize};

/// One run of characters in a diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub added: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,
}

impl Change {
    fn new(op: Op, value: String) -> Self {
        Self {
            value,
            added: op == Op::Insert,
            removed: op == Op::Delete,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDiff {
    pub changes: Vec<Change>,
}

impl TextDiff {
    pub fn has_diff(&self) -> bool {
        self.changes.iter().any(|c| c.added || c.removed)
    }

    /// Inline preview: `[-removed-]` and `{+added+}` around changed runs
    pub fn render(&self) -> String {
        let mut out = String::new();
        for change in &self.changes {
            if change.removed {
                out.push_str("[-");
                out.push_str(&change.value);
                out.push_str("-]");
            } else if change.added {
                out.push_str("{+");
                out.push_str(&change.value);
                out.push_str("+}");
            } else {
                out.push_str(&change.value);
            }
        }
        out
    }

    /// Reassemble the remote side (everything but additions)
    pub fn remote_text(&self) -> String {
        self.changes
            .iter()
            .filter(|c| !c.added)
            .map(|c| c.value.as_str())
            .collect()
    }

    /// Reassemble the local side (everything but removals)
    pub fn local_text(&self) -> String {
        self.changes
            .iter()
            .filter(|c| !c.removed)
            .map(|c| c.value.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Insert,
    Delete,
}

/// Diff `remote` (last known remote content) against `local`
pub fn diff(remote: &str, local: &str) -> TextDiff {
    if remote == local {
        return TextDiff::default();
    }

    let a: Vec<char> = remote.chars().collect();
    let b: Vec<char> = local.chars().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mut ops: Vec<(Op, char)> = Vec::with_capacity(a.len() + b.len());
    ops.extend(a[..prefix].iter().map(|&c| (Op::Equal, c)));
    ops.extend(myers(&a[prefix..a.len() - suffix], &b[prefix..b.len() - suffix]));
    ops.extend(a[a.len() - suffix..].iter().map(|&c| (Op::Equal, c)));

    TextDiff {
        changes: coalesce(ops),
    }
}

/// Convenience for callers that only need the boolean
pub fn has_diff(remote: &str, local: &str) -> bool {
    diff(remote, local).has_diff()
}

fn coalesce(ops: Vec<(Op, char)>) -> Vec<Change> {
    let mut changes: Vec<Change> = Vec::new();
    let mut current: Option<(Op, String)> = None;

    for (op, ch) in ops {
        match &mut current {
            Some((run_op, run)) if *run_op == op => run.push(ch),
            _ => {
                if let Some((run_op, run)) = current.take() {
                    changes.push(Change::new(run_op, run));
                }
                current = Some((op, ch.to_string()));
            }
        }
    }
    if let Some((run_op, run)) = current {
        changes.push(Change::new(run_op, run));
    }

    changes
}

/// Myers shortest edit script between `a` and `b`
fn myers(a: &[char], b: &[char]) -> Vec<(Op, char)> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max = n + m;
    if max == 0 {
        return Vec::new();
    }

    let offset = max;
    let mut v = vec![0isize; (2 * max + 2) as usize];
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'search: for d in 0..=max {
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let idx = (k + offset) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                break 'search;
            }
            k += 2;
        }
    }

    // Walk the trace backwards to recover the edit path
    let mut ops = Vec::with_capacity((n + m) as usize);
    let (mut x, mut y) = (n, m);
    for (d, v) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let k = x - y;
        let idx = (k + offset) as usize;
        let prev_k = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = v[(prev_k + offset) as usize];
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            ops.push((Op::Equal, a[(x - 1) as usize]));
            x -= 1;
            y -= 1;
        }
        if d > 0 {
            if x == prev_x {
                ops.push((Op::Insert, b[(y - 1) as usize]));
            } else {
                ops.push((Op::Delete, a[(x - 1) as usize]));
            }
        }
        x = prev_x;
        y = prev_y;
    }

    ops.reverse();
    ops
}
