/// Build every ordered two-word combination of a phrase.
///
/// For words `w0 .. wN` this yields `"wi wj"` for all `i < j`, in the same
/// order the words appear, i.e. `N * (N - 1) / 2` entries. Empty and
/// single-word phrases produce nothing.
///
/// The same function indexes documents at write time and expands queries at
/// read time: a document is reachable from a phrase exactly when their
/// combination sets intersect.
pub fn make_combinations(phrase: &str) -> Vec<String> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() < 2 {
        return Vec::new();
    }

    let mut combinations = Vec::with_capacity(words.len() * (words.len() - 1) / 2);
    for (i, first) in words.iter().enumerate() {
        for second in &words[i + 1..] {
            combinations.push(format!("{} {}", first, second));
        }
    }
    combinations
}
