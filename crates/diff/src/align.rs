//! Sequence alignment
//!
//! A Needleman-Wunsch-style alignment over string sequences with `+1` for a
//! match and `0` for mismatches and gaps, which makes the score table an LCS
//! table. The alignment is reconstructed by walking the table from the far
//! corner: diagonal on equality, otherwise a gap in the second sequence when
//! `dp[i][j-1] >= dp[i-1][j]`, else a gap in the first. Tables are flat,
//! indexed `i * (n + 1) + j`.

/// Align two sequences; each pair holds the matched indices, with `None`
/// marking a gap on that side
pub fn align_sequences<S: AsRef<str>>(
    a: &[S],
    b: &[S],
) -> Vec<(Option<usize>, Option<usize>)> {
    let m = a.len();
    let n = b.len();

    let mut dp = vec![0u32; (m + 1) * (n + 1)];
    let idx = |i: usize, j: usize| i * (n + 1) + j;

    for i in 1..=m {
        for j in 1..=n {
            dp[idx(i, j)] = if a[i - 1].as_ref() == b[j - 1].as_ref() {
                dp[idx(i - 1, j - 1)] + 1
            } else {
                dp[idx(i - 1, j)].max(dp[idx(i, j - 1)])
            };
        }
    }

    let mut alignment = Vec::with_capacity(m.max(n));
    let mut i = m;
    let mut j = n;
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1].as_ref() == b[j - 1].as_ref() {
            alignment.push((Some(i - 1), Some(j - 1)));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[idx(i, j - 1)] >= dp[idx(i - 1, j)]) {
            alignment.push((None, Some(j - 1)));
            j -= 1;
        } else {
            alignment.push((Some(i - 1), None));
            i -= 1;
        }
    }

    alignment.reverse();
    alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identical_sequences_align_pairwise() {
        let a = strs(&["x", "y", "z"]);
        let alignment = align_sequences(&a, &a);
        assert_eq!(
            alignment,
            [
                (Some(0), Some(0)),
                (Some(1), Some(1)),
                (Some(2), Some(2)),
            ]
        );
    }

    #[test]
    fn both_empty_yields_empty_alignment() {
        let empty: Vec<String> = Vec::new();
        assert!(align_sequences(&empty, &empty).is_empty());
    }

    #[test]
    fn one_sided_sequences_become_gaps() {
        let a = strs(&["x", "y"]);
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            align_sequences(&a, &empty),
            [(Some(0), None), (Some(1), None)]
        );
        assert_eq!(
            align_sequences(&empty, &a),
            [(None, Some(0)), (None, Some(1))]
        );
    }

    #[test]
    fn substitution_decomposes_into_removal_then_addition() {
        let a = strs(&["keep", "old", "tail"]);
        let b = strs(&["keep", "new", "tail"]);
        assert_eq!(
            align_sequences(&a, &b),
            [
                (Some(0), Some(0)),
                (Some(1), None),
                (None, Some(1)),
                (Some(2), Some(2)),
            ]
        );
    }

    #[test]
    fn insertion_in_the_middle_is_a_single_gap() {
        let a = strs(&["x", "z"]);
        let b = strs(&["x", "y", "z"]);
        assert_eq!(
            align_sequences(&a, &b),
            [(Some(0), Some(0)), (None, Some(1)), (Some(1), Some(2))]
        );
    }

    #[test]
    fn alignment_preserves_the_longest_common_subsequence() {
        let a = strs(&["a", "b", "c", "d", "e"]);
        let b = strs(&["b", "d", "e", "f"]);
        let alignment = align_sequences(&a, &b);
        let matched = alignment
            .iter()
            .filter(|(x, y)| x.is_some() && y.is_some())
            .count();
        assert_eq!(matched, 3); // b, d, e
    }
}
