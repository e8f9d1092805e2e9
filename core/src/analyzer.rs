use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Words start and end with a letter or digit; inner punctuation is kept so
    // that numbers like 1,000 or 12/05/2020 reach the per-word rules intact.
    static ref WORD: Regex = Regex::new(r"(?u)[\p{L}\p{N}](?:[\p{L}\p{N}_'.,/\-]*[\p{L}\p{N}])?").expect("valid regex");
    static ref SEPARATORS: Regex = Regex::new(r"[/_\-]").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Turns one line of raw text into normalized tokens.
///
/// An empty string in the output marks a discarded slot: the indexer skips it
/// and does not give it a position.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, line: &str) -> Vec<String>;
}

/// Which analyzer an index was built with. Stored in the index so queries are
/// analyzed the same way as documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalyzerKind {
    #[default]
    English,
    EnglishStopwords,
    Whitespace,
}

impl AnalyzerKind {
    pub fn analyzer(self) -> Box<dyn Analyzer> {
        match self {
            AnalyzerKind::English => Box::new(EnglishAnalyzer { mark_stopwords: false }),
            AnalyzerKind::EnglishStopwords => Box::new(EnglishAnalyzer { mark_stopwords: true }),
            AnalyzerKind::Whitespace => Box::new(WhitespaceAnalyzer),
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalyzerKind::English => "english",
            AnalyzerKind::EnglishStopwords => "english-stopwords",
            AnalyzerKind::Whitespace => "whitespace",
        };
        f.write_str(name)
    }
}

impl FromStr for AnalyzerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "english" => Ok(AnalyzerKind::English),
            "english-stopwords" => Ok(AnalyzerKind::EnglishStopwords),
            "whitespace" => Ok(AnalyzerKind::Whitespace),
            other => Err(format!("unknown analyzer '{other}' (expected english, english-stopwords or whitespace)")),
        }
    }
}

/// Lowercases and splits on whitespace. Nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceAnalyzer;

impl Analyzer for WhitespaceAnalyzer {
    fn analyze(&self, line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_lowercase).collect()
    }
}

/// NFKC normalization, number handling, lowercasing and Snowball stemming.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishAnalyzer {
    /// Emit `""` for stopwords so they are discarded.
    pub mark_stopwords: bool,
}

impl Analyzer for EnglishAnalyzer {
    fn analyze(&self, line: &str) -> Vec<String> {
        let normalized = line.nfkc().collect::<String>();
        let mut tokens = Vec::new();
        for mat in WORD.find_iter(&normalized) {
            self.analyze_word(mat.as_str(), &mut tokens);
        }
        tokens
    }
}

impl EnglishAnalyzer {
    fn analyze_word(&self, word: &str, out: &mut Vec<String>) {
        if word.chars().any(|c| c.is_numeric()) {
            let word = word.to_lowercase();
            if word.contains('.') {
                // decimals are not indexed
                out.push(String::new());
            } else if word.contains(',') {
                out.push(word.replace(',', ""));
            } else if word.contains('/') || word.contains('-') {
                out.extend(SEPARATORS.split(&word).filter(|p| !p.is_empty()).map(str::to_string));
            } else {
                out.push(word);
            }
        } else if word.chars().any(|c| c.is_alphabetic()) && word.chars().count() > 1 {
            let lower = word.to_lowercase();
            if self.mark_stopwords && is_stopword(&lower) {
                out.push(String::new());
                return;
            }
            let cleaned = lower.replace(&['.', '\''][..], "");
            for part in SEPARATORS.split(&cleaned).filter(|p| !p.is_empty()) {
                out.push(STEMMER.stem(part).to_string());
            }
        }
    }
}
