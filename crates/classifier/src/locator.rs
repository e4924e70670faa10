/// Every occurrence of `phrase` as a contiguous run of `words`.
///
/// Each occurrence is reported as the word positions it covers.
pub fn locate(words: &[String], phrase: &str) -> Vec<Vec<usize>> {
    let tokens: Vec<&str> = phrase.split_whitespace().collect();
    let Some((first, rest)) = tokens.split_first() else {
        return Vec::new();
    };

    words
        .iter()
        .enumerate()
        .filter(|(_, word)| word.as_str() == *first)
        .filter(|&(start, _)| {
            rest.iter()
                .enumerate()
                .all(|(offset, token)| words.get(start + 1 + offset).map(String::as_str) == Some(*token))
        })
        .map(|(start, _)| (start..start + tokens.len()).collect())
        .collect()
}
