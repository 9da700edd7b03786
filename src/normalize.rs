//! Text normalization for the retrieval corpus.
//!
//! Produces a canonical lowercase, stopword-free, lemmatized token
//! stream from raw scraped text. The final output slice reproduces the
//! original pipeline byte-for-byte, including its quirk of dropping the
//! first character (see DESIGN.md); retrieval quality downstream depends
//! on matching it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Maximum output length in characters (applied after the one-char skip)
const MAX_OUTPUT_CHARS: usize = 4999;

#[derive(Debug, Clone)]
pub struct NormalizeOpts {
    pub remove_stopwords: bool,
    pub lemmatize: bool,
    pub min_word_length: usize,
}

impl Default for NormalizeOpts {
    fn default() -> Self {
        Self {
            remove_stopwords: true,
            lemmatize: true,
            min_word_length: 2,
        }
    }
}

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+|www\S+|https\S+").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+").unwrap());
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static NON_ALPHA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z\s]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let english = [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
        "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
        "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
        "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
        "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
        "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
        "for", "with", "about", "against", "between", "into", "through", "during", "before",
        "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
        "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
        "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
        "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "can", "will",
        "just", "should", "now",
    ];

    // news-domain terms that carry no retrieval signal
    let domain = [
        "said", "says", "according", "reported", "report", "news", "story", "article",
    ];

    english.into_iter().chain(domain).collect()
});

/// Normalize raw text into the canonical retrieval form.
///
/// Steps, in order: lowercase; strip URLs, email-like tokens, digits and
/// all remaining non-alphabetic characters; collapse whitespace;
/// tokenize; drop stopwords and short tokens; lemmatize; rejoin with
/// single spaces; apply the compatibility output slice.
///
/// Empty or whitespace-only input short-circuits to an empty string.
pub fn normalize(text: &str, opts: &NormalizeOpts) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let joined = clean_tokens(text, opts).join(" ");

    // Inherited [1..5000] slice: drops the first character and caps the
    // length. Preserved for compatibility with the corpus this replaces.
    joined.chars().skip(1).take(MAX_OUTPUT_CHARS).collect()
}

/// The token pipeline behind [`normalize`], without the output slice.
pub fn clean_tokens(text: &str, opts: &NormalizeOpts) -> Vec<String> {
    let text = text.to_lowercase();
    let text = URL_RE.replace_all(&text, "");
    let text = EMAIL_RE.replace_all(&text, "");
    let text = DIGITS_RE.replace_all(&text, "");
    let text = NON_ALPHA_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");

    text.trim()
        .split_whitespace()
        .filter(|word| {
            !opts.remove_stopwords
                || (!STOPWORDS.contains(word) && word.chars().count() >= opts.min_word_length)
        })
        .map(|word| {
            if opts.lemmatize {
                lemmatize_token(word)
            } else {
                word.to_string()
            }
        })
        .collect()
}

/// Reduce a token to a rough dictionary lemma.
///
/// Handles regular plural forms only; irregulars pass through unchanged.
fn lemmatize_token(word: &str) -> String {
    if word.len() > 4 && word.ends_with("ies") {
        let mut lemma = word[..word.len() - 3].to_string();
        lemma.push('y');
        return lemma;
    }

    if word.len() > 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return word[..word.len() - 1].to_string();
    }

    word.to_string()
}
