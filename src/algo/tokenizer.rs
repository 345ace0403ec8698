use unicode_segmentation::UnicodeSegmentation;

/// Tokenize feedback into lowercase word tokens.
///
/// Stopwords, single characters and purely numeric tokens are dropped; they
/// carry no signal for keyword extraction and only inflate document vectors.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(|w| w.to_lowercase().replace('\u{2019}', "'"))
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !is_stopword(w))
        .collect()
}

fn is_stopword(word: &str) -> bool {
    matches!(
        word,
        "an" | "the" | "is" | "it" | "of" | "to" | "in" | "for" | "on" | "with"
        | "at" | "by" | "from" | "as" | "or" | "and" | "but" | "not" | "be" | "are"
        | "was" | "were" | "been" | "being" | "have" | "has" | "had" | "do" | "does"
        | "did" | "will" | "would" | "could" | "should" | "may" | "might" | "shall"
        | "can" | "this" | "that" | "these" | "those" | "there" | "here" | "where"
        | "when" | "what" | "which" | "who" | "whom" | "how" | "all" | "each" | "every"
        | "both" | "few" | "more" | "most" | "other" | "some" | "such" | "no" | "nor"
        | "only" | "own" | "same" | "so" | "than" | "too" | "very" | "just" | "because"
        | "about" | "into" | "through" | "during" | "before" | "after" | "above" | "below"
        | "between" | "under" | "again" | "further" | "then" | "once" | "any" | "its"
        | "your" | "our" | "their" | "his" | "her" | "my" | "if" | "up" | "out" | "also"
        | "me" | "we" | "us" | "you" | "he" | "she" | "they" | "them" | "him" | "am"
        | "i'm" | "i've" | "i'd" | "it's" | "don't" | "doesn't" | "didn't" | "isn't"
        | "wasn't" | "can't" | "won't" | "im" | "ive" | "dont" | "really" | "get" | "got"
        | "one" | "even" | "much" | "still" | "well" | "like"
    )
}
