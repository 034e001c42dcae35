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

//! Normalizing tokenizer for corpus text.
//!
//! Text is NFKC-normalized and lowercased, so full-width and half-width forms and
//! compatibility ligatures tokenize like their plain counterparts. Words are found at
//! Unicode word boundaries. Every CJK ideograph, kana or hangul syllable is a token of its
//! own; punctuation comes out as single-character tokens.

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    let mut tokens = Vec::new();
    for segment in normalized.split_word_bounds() {
        if segment.trim().is_empty() {
            continue;
        }
        if segment.chars().any(is_cjk) {
            tokens.extend(
                segment
                    .graphemes(true)
                    .filter(|g| !g.trim().is_empty())
                    .map(str::to_string),
            );
        } else {
            tokens.push(segment.to_string());
        }
    }
    tokens
}

// Scripts written without spaces between words.
fn is_cjk(ch: char) -> bool {
    matches!(ch as u32,
        0x3040..=0x30FF     // hiragana, katakana
        | 0x3400..=0x4DBF   // extension A
        | 0x4E00..=0x9FFF   // unified ideographs
        | 0xAC00..=0xD7AF   // hangul syllables
        | 0xF900..=0xFAFF   // compatibility ideographs
        | 0x20000..=0x2FA1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_and_digits() {
        assert_eq!(tokenize("Hello  World 42"), vec!["hello", "world", "42"]);
    }

    #[test]
    fn test_cjk_characters_split() {
        assert_eq!(tokenize("北京大学"), vec!["北", "京", "大", "学"]);
        assert_eq!(tokenize("iPhone手机"), vec!["iphone", "手", "机"]);
    }

    #[test]
    fn test_punctuation_and_full_width() {
        assert_eq!(tokenize("c++"), vec!["c", "+", "+"]);
        assert_eq!(tokenize("ＡＢＣ１２３"), vec!["abc123"]);
        assert_eq!(tokenize("a\u{3000}b"), vec!["a", "b"]);
    }

    #[test]
    fn test_compatibility_forms_fold() {
        assert_eq!(tokenize("ｶﾀｶﾅ"), tokenize("カタカナ"));
        assert_eq!(tokenize("カタカナ"), vec!["カ", "タ", "カ", "ナ"]);
        assert_eq!(tokenize("ﬁle"), vec!["file"]);
        assert_eq!(tokenize("한국"), vec!["한", "국"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(tokenize("   ").is_empty());
    }
}
