use std::collections::HashMap;

/// Similarity of two strings in `0.0..=1.0`, computed as `2·M / T` where `T`
/// is the combined length in characters and `M` the number of characters in
/// matching blocks.
///
/// Matching blocks come from gestalt pattern matching: take the longest
/// common block (earliest in `a`, then earliest in `b`, on ties), then recurse
/// into the pieces left and right of it. For `b` of 200+ characters, any
/// character making up more than 1% of `b` is not used to seed a block.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched: usize = Matcher::new(&a, &b)
        .matching_blocks()
        .iter()
        .map(|m| m.size)
        .sum();
    2.0 * matched as f64 / total as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a: usize,
    b: usize,
    size: usize,
}

struct Matcher<'s> {
    a: &'s [char],
    b: &'s [char],
    /// Positions of each non-popular character of `b`, ascending.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'s> Matcher<'s> {
    fn new(a: &'s [char], b: &'s [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        if b.len() >= 200 {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b2j }
    }

    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i - 1], b[j].
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next;
        }

        // Popular characters never seed a block but may still extend one.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        Block {
            a: best_i,
            b: best_j,
            size: best_size,
        }
    }

    fn matching_blocks(&self) -> Vec<Block> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
            blocks.push(m);
        }

        blocks.sort_by_key(|m| (m.a, m.b));
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-12
    }

    #[test]
    fn identical_and_empty() {
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("abc", "abc"), 1.0);
        assert_eq!(ratio("abc", ""), 0.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn rotated_string() {
        // "bcd" is the only block: 2 * 3 / 8
        assert!(close(ratio("abcd", "bcda"), 0.75));
    }

    #[test]
    fn single_digit_edit() {
        let r = ratio(
            "Requires prior authorization if quantity > 30",
            "Requires prior authorization if quantity > 60",
        );
        assert!(close(r, 88.0 / 90.0), "{r}");
    }

    #[test]
    fn reworded_rule() {
        let r = ratio(
            "Step therapy required if generic available",
            "No step therapy requirement",
        );
        // blocks: "tep therapy require" (19) + "en" (2)
        assert!(close(r, 2.0 * 21.0 / 69.0), "{r}");
    }

    #[test]
    fn window_edit() {
        let r = ratio("Max allowed 90 units per 90 days", "Max allowed 90 units per 30 days");
        assert!(close(r, 0.96875), "{r}");
    }

    #[test]
    fn blocks_do_not_overlap() {
        let a: Vec<char> = "the cat sat on the mat".chars().collect();
        let b: Vec<char> = "a cat sat on a mat".chars().collect();
        let blocks = Matcher::new(&a, &b).matching_blocks();
        for pair in blocks.windows(2) {
            assert!(pair[0].a + pair[0].size <= pair[1].a);
            assert!(pair[0].b + pair[0].size <= pair[1].b);
        }
    }

    #[test]
    fn popular_characters_extend_but_do_not_seed() {
        let a = "a".repeat(250);
        let b = format!("{}b", "a".repeat(250));
        // 'a' is popular in b: no seed is found, and the empty block at the
        // origin is then grown across the run of 'a's.
        assert!(close(ratio(&a, &b), 500.0 / 501.0));
    }

    #[test]
    fn symmetric_on_simple_inputs() {
        assert!(close(ratio("kitten", "sitting"), ratio("sitting", "kitten")));
    }
}
