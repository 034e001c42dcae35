// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Candidate keys and n-gram generation.
//!
//! A [`Phrase`] is an ordered token sequence plus its canonical key: the trimmed non-blank
//! tokens joined by a single space. Blank tokens are tolerated in the input. Leading blanks
//! are dropped when a phrase is built; interior blanks are kept in the token sequence but
//! never show up in the key.

use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

/// Separator placed between tokens in a canonical key.
pub const KEY_SEPARATOR: &str = " ";

/// Which contiguous pieces of a line become candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NgramMode {
    /// Every proper prefix `tokens[..i]` for `i` in `1..n`.
    Prefix,
    /// Every proper suffix `tokens[i..]` for `i` in `1..n`.
    #[default]
    Suffix,
}

impl NgramMode {
    /// Returns the lowercase name of the mode.
    pub const fn name(self) -> &'static str {
        match self {
            NgramMode::Prefix => "prefix",
            NgramMode::Suffix => "suffix",
        }
    }
}

impl fmt::Display for NgramMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A candidate key: the original token sequence and its canonical joined form.
///
/// Equality and hashing use the key only. Cloning is cheap.
#[derive(Clone)]
pub struct Phrase {
    key: Arc<str>,
    tokens: Arc<[String]>,
    len: usize,
}

impl Phrase {
    /// Builds a phrase from a token sequence.
    ///
    /// A token with interior whitespace is split into one token per word, so the key,
    /// [`Phrase::len`], [`Phrase::head`] and [`Phrase::tail`] always agree.
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut kept: Vec<String> = Vec::with_capacity(tokens.len());
        let mut len = 0;
        for token in tokens {
            let token = token.as_ref();
            if is_blank(token) {
                if !kept.is_empty() {
                    kept.push(token.to_string());
                }
                continue;
            }
            for word in token.split_whitespace() {
                kept.push(word.to_string());
                len += 1;
            }
        }
        let key = kept
            .iter()
            .filter(|token| !is_blank(token))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR);
        Self {
            key: Arc::from(key),
            tokens: Arc::from(kept),
            len,
        }
    }

    /// Returns the canonical key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the token sequence without leading blank tokens, split into words.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Returns the number of non-blank tokens.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the phrase has no non-blank tokens.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the leading token.
    pub fn head(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Returns the phrase without its leading token and any blank tokens right after it.
    ///
    /// Returns `None` for phrases with fewer than two non-blank tokens.
    pub fn tail(&self) -> Option<Phrase> {
        if self.len < 2 {
            return None;
        }
        Some(Phrase::new(&self.tokens[1..]))
    }
}

impl PartialEq for Phrase {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Phrase {}

impl Hash for Phrase {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Phrase").field(&self.key()).finish()
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Expands one line's tokens into candidate phrases.
///
/// For every split index `i` in `1..tokens.len()` yields `tokens[i..]` in suffix mode or
/// `tokens[..i]` in prefix mode. Lines with fewer than two tokens yield nothing.
///
/// A split next to a blank token would repeat the key of a neighboring split, so suffixes
/// starting with a blank token and prefixes ending with one are skipped. Every distinct
/// n-gram of a line is therefore counted once.
pub fn ngrams<S: AsRef<str>>(
    tokens: &[S],
    mode: NgramMode,
) -> impl Iterator<Item = Phrase> + '_ {
    (1..tokens.len())
        .filter(move |&i| match mode {
            NgramMode::Prefix => !is_blank(tokens[i - 1].as_ref()),
            NgramMode::Suffix => !is_blank(tokens[i].as_ref()),
        })
        .map(move |i| match mode {
            NgramMode::Prefix => Phrase::new(&tokens[..i]),
            NgramMode::Suffix => Phrase::new(&tokens[i..]),
        })
}

fn is_blank(token: &str) -> bool {
    token.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(tokens: &[&str], mode: NgramMode) -> Vec<String> {
        ngrams(tokens, mode).map(|p| p.key().to_string()).collect()
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(
            keys(&["a", "b", "c", "d"], NgramMode::Suffix),
            vec!["b c d", "c d", "d"]
        );
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(
            keys(&["a", "b", "c", "d"], NgramMode::Prefix),
            vec!["a", "a b", "a b c"]
        );
    }

    #[test]
    fn test_short_lines_emit_nothing() {
        assert!(keys(&[], NgramMode::Suffix).is_empty());
        assert!(keys(&["a"], NgramMode::Prefix).is_empty());
    }

    #[test]
    fn test_blank_tokens_never_reach_keys() {
        let phrase = Phrase::new(&["", " ", "new", "", "york", " city "]);
        assert_eq!(phrase.key(), "new york city");
        assert_eq!(phrase.len(), 3);
        assert_eq!(phrase.head(), Some("new"));
        assert_eq!(phrase.tokens().len(), 4);

        let tail = phrase.tail().unwrap();
        assert_eq!(tail.key(), "york city");
        assert_eq!(tail.head(), Some("york"));
        assert_eq!(tail.tail().unwrap().key(), "city");
        assert!(tail.tail().unwrap().tail().is_none());
    }

    #[test]
    fn test_blank_only_pieces_are_skipped() {
        assert_eq!(keys(&["a", "", " "], NgramMode::Suffix), Vec::<String>::new());
        assert_eq!(keys(&["", "a", "b"], NgramMode::Prefix), vec!["a"]);
    }

    #[test]
    fn test_blank_splits_do_not_repeat_keys() {
        assert_eq!(
            keys(&["x", "new", "", "york"], NgramMode::Suffix),
            vec!["new york", "york"]
        );
        assert_eq!(
            keys(&["new", "", "york", "x"], NgramMode::Prefix),
            vec!["new", "new york"]
        );
    }

    #[test]
    fn test_tokens_with_inner_whitespace_are_split() {
        let joined = Phrase::new(&["new york", "city"]);
        let split = Phrase::new(&["new", "york", "city"]);
        assert_eq!(joined, split);
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.tokens(), split.tokens());
        assert_eq!(joined.head(), Some("new"));
        assert_eq!(joined.tail().unwrap().key(), "york city");

        let single = Phrase::new(&[" new\tyork "]);
        assert_eq!(single.key(), "new york");
        assert_eq!(single.len(), 2);
        assert_eq!(single.tail().unwrap().key(), "york");
    }

    #[test]
    fn test_equality_uses_key() {
        assert_eq!(Phrase::new(&["a", "", "b"]), Phrase::new(&["a", "b"]));
        assert_ne!(Phrase::new(&["a", "b"]), Phrase::new(&["ab"]));
    }
}
