//! Lightweight text heuristics for predicate search terms.
//!
//! Nothing here needs a trained model: descriptions are tokenized, stop
//! words dropped and the remaining words (and adjacent pairs) weighted by
//! position. Parameter names are split on `snake_case` and `camelCase`
//! boundaries.

/// Most frequent English function words plus API filler vocabulary.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "being", "between", "both", "but", "by", "can", "could", "default",
    "defaults", "did", "do", "does", "each", "either", "else", "for", "from", "get", "gets",
    "given", "has", "have", "how", "if", "in", "into", "is", "it", "its", "may", "more", "most",
    "must", "no", "not", "of", "on", "one", "only", "optional", "or", "other", "over", "parameter",
    "per", "required", "return", "returned", "returns", "same", "should", "so", "some", "specified",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "this", "those",
    "to", "under", "up", "use", "used", "value", "values", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "will", "with", "would", "you", "your",
];

/// Description candidates tried per parameter.
const MAX_CANDIDATES: usize = 10;

pub fn is_stopword(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    STOPWORDS.contains(&lower.as_str())
}

/// Splits text into alphanumeric words, preserving case.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_content_word(word: &str) -> bool {
    word.chars().count() >= 3 && !is_stopword(word) && !word.chars().all(|c| c.is_ascii_digit())
}

/// A weighted search phrase extracted from a description.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub phrase: String,
    pub weight: f64,
}

/// Extracts search phrases from `description`, heaviest first.
///
/// Content words weigh `1 / (1 + rank)` where rank counts content words
/// before them; a pair of adjacent content words, joined into one token,
/// weighs one more than its first word. Ties keep text order.
pub fn description_candidates(description: &str) -> Vec<Candidate> {
    let tokens = tokenize(description);
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut push = |phrase: String, weight: f64| {
        match candidates.iter_mut().find(|c| c.phrase == phrase) {
            Some(existing) => existing.weight = existing.weight.max(weight),
            None => candidates.push(Candidate { phrase, weight }),
        }
    };

    let mut rank = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if !is_content_word(token) {
            continue;
        }
        let weight = 1.0 / (1.0 + rank as f64);
        let word = token.to_lowercase();
        if let Some(next) = tokens.get(i + 1).filter(|t| is_content_word(t)) {
            push(format!("{}{}", word, next.to_lowercase()), 1.0 + weight);
        }
        push(word, weight);
        rank += 1;
    }

    candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// Words of `description` that could be what a one-letter parameter name
/// abbreviates: content words starting with `letter`, in text order.
pub fn abbreviation_candidates(letter: char, description: &str) -> Vec<String> {
    let letter = letter.to_ascii_lowercase();
    let mut found: Vec<String> = Vec::new();
    for token in tokenize(description) {
        let lower = token.to_lowercase();
        if lower.starts_with(letter) && is_content_word(&lower) && !found.contains(&lower) {
            found.push(lower);
        }
    }
    found
}

/// Non-empty `snake_case` segments.
pub fn split_snake(name: &str) -> Vec<String> {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits on `camelCase` boundaries.
///
/// A boundary sits before an uppercase letter that follows a non-uppercase
/// character, and before an uppercase letter followed by a lowercase one,
/// so `XMLHttpRequest` splits into `XML`, `Http`, `Request`.
pub fn split_camel(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        let boundary = i > 0
            && c.is_uppercase()
            && (!chars[i - 1].is_uppercase()
                || chars.get(i + 1).is_some_and(|n| n.is_lowercase()));
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn description_words_are_weighted_by_position() {
        let candidates = description_candidates("Status of the pet");
        let phrases: Vec<&str> = candidates.iter().map(|c| c.phrase.as_str()).collect();
        assert_eq!(phrases, vec!["status", "pet"]);
        assert!(candidates[0].weight > candidates[1].weight);
    }

    #[test]
    fn adjacent_content_words_form_joined_phrase() {
        let candidates = description_candidates("ISO country code of the address");
        assert_eq!(candidates[0].phrase, "isocountry");
        assert!(candidates.iter().any(|c| c.phrase == "countrycode"));
        assert!(candidates.iter().any(|c| c.phrase == "address"));
        assert!(!candidates.iter().any(|c| c.phrase == "the"));
    }

    #[test]
    fn abbreviations_match_first_letter() {
        assert_eq!(
            abbreviation_candidates('q', "The query string used to search quotes"),
            vec!["query", "quotes"]
        );
        assert!(abbreviation_candidates('z', "Status of the pet").is_empty());
    }

    #[test]
    fn snake_and_camel_splitting() {
        assert_eq!(split_snake("country_code"), vec!["country", "code"]);
        assert_eq!(split_snake("_id_"), vec!["id"]);
        assert_eq!(split_camel("countryCode"), vec!["country", "Code"]);
        assert_eq!(split_camel("XMLHttpRequest"), vec!["XML", "Http", "Request"]);
        assert_eq!(split_camel("userID"), vec!["user", "ID"]);
        assert_eq!(split_camel("city"), vec!["city"]);
    }

    proptest! {
        #[test]
        fn camel_split_reassembles(name in "[a-zA-Z][a-zA-Z0-9]{0,20}") {
            prop_assert_eq!(split_camel(&name).concat(), name);
        }
    }
}
