//! Vocabulary words and the builtin word lists
//!
//! A word is an ordered list of glyphs. Completion treats those glyphs as a
//! multiset: order is irrelevant, duplicates count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, RunnerResult};

/// Vocabulary language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Mandarin,
    Korean,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::Mandarin => "Mandarin",
            Language::Korean => "Korean",
        }
    }

    /// BCP 47 tag for speech synthesis
    pub fn speech_tag(&self) -> &'static str {
        match self {
            Language::Mandarin => "zh-CN",
            Language::Korean => "ko-KR",
        }
    }
}

/// A vocabulary word and the glyphs that spell it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    #[serde(alias = "word")]
    pub text: String,
    pub parts: Vec<String>,
    pub meaning: String,
}

impl Word {
    pub fn new(text: &str, parts: &[&str], meaning: &str) -> Self {
        Self {
            text: text.to_string(),
            parts: parts.iter().map(|p| p.to_string()).collect(),
            meaning: meaning.to_string(),
        }
    }

    /// Required count per glyph
    pub fn required_counts(&self) -> BTreeMap<&str, usize> {
        count_glyphs(self.parts.iter().map(String::as_str))
    }

    pub fn contains(&self, glyph: &str) -> bool {
        self.parts.iter().any(|p| p == glyph)
    }

    /// True while `glyph` has been collected fewer times than the word uses it
    pub fn still_needs(&self, glyph: &str, collected: &[String]) -> bool {
        let required = self.parts.iter().filter(|p| *p == glyph).count();
        let have = collected.iter().filter(|p| *p == glyph).count();
        have < required
    }

    /// Glyphs not yet collected, in word order, one entry per missing copy
    pub fn missing_parts(&self, collected: &[String]) -> Vec<&str> {
        let mut have = count_glyphs(collected.iter().map(String::as_str));
        let mut missing = Vec::new();
        for part in &self.parts {
            match have.get_mut(part.as_str()) {
                Some(n) if *n > 0 => *n -= 1,
                _ => missing.push(part.as_str()),
            }
        }
        missing
    }

    /// Collected glyphs cover every part of the word, duplicates included
    pub fn is_complete(&self, collected: &[String]) -> bool {
        let have = count_glyphs(collected.iter().map(String::as_str));
        self.required_counts()
            .iter()
            .all(|(glyph, need)| have.get(glyph).copied().unwrap_or(0) >= *need)
    }
}

fn count_glyphs<'a>(glyphs: impl Iterator<Item = &'a str>) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for glyph in glyphs {
        *counts.entry(glyph).or_insert(0) += 1;
    }
    counts
}

/// The active word list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub language: Language,
    pub words: Vec<Word>,
}

impl Vocabulary {
    /// Builtin list for a language
    pub fn builtin(language: Language) -> Self {
        let table: &[(&str, &[&str], &str)] = match language {
            Language::Mandarin => MANDARIN_WORDS,
            Language::Korean => KOREAN_WORDS,
        };
        Self {
            language,
            words: table
                .iter()
                .map(|(text, parts, meaning)| Word::new(text, parts, meaning))
                .collect(),
        }
    }

    /// Load a custom word list (a JSON array of words)
    pub fn from_json(language: Language, json: &str) -> RunnerResult<Self> {
        let words: Vec<Word> = serde_json::from_str(json)?;
        let vocab = Self { language, words };
        vocab.validate()?;
        Ok(vocab)
    }

    pub fn validate(&self) -> RunnerResult<()> {
        if self.words.is_empty() {
            return Err(RunnerError::EmptyVocabulary {
                name: self.language.label().to_string(),
            });
        }
        if let Some(word) = self.words.iter().find(|w| w.parts.is_empty()) {
            return Err(RunnerError::EmptyWord {
                word: word.text.clone(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word at `index`, wrapping past the end of the list
    pub fn word(&self, index: usize) -> &Word {
        &self.words[index % self.words.len()]
    }

    /// Index after `index`, wrapping to 0 after the last word
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.words.len()
    }

    /// Distinct glyphs from other words that the word at `index` does not use
    pub fn distractor_pool(&self, index: usize) -> Vec<&str> {
        let current = self.word(index);
        let mut pool: Vec<&str> = Vec::new();
        for (i, word) in self.words.iter().enumerate() {
            if i == index % self.words.len() {
                continue;
            }
            for part in &word.parts {
                if !current.contains(part) && !pool.contains(&part.as_str()) {
                    pool.push(part.as_str());
                }
            }
        }
        pool
    }
}

const MANDARIN_WORDS: &[(&str, &[&str], &str)] = &[
    ("你好", &["你", "好"], "Hello"),
    ("谢谢", &["谢", "谢"], "Thank you"),
    ("再见", &["再", "见"], "Goodbye"),
    ("朋友", &["朋", "友"], "Friend"),
    ("学习", &["学", "习"], "Study"),
    ("学校", &["学", "校"], "School"),
    ("老师", &["老", "师"], "Teacher"),
    ("学生", &["学", "生"], "Student"),
    ("家庭", &["家", "庭"], "Family"),
    ("中国", &["中", "国"], "China"),
    ("北京", &["北", "京"], "Beijing"),
    ("上海", &["上", "海"], "Shanghai"),
];

const KOREAN_WORDS: &[(&str, &[&str], &str)] = &[
    ("안녕", &["안", "녕"], "Hello"),
    ("감사", &["감", "사"], "Thank you"),
    ("안녕히", &["안", "녕", "히"], "Goodbye"),
    ("친구", &["친", "구"], "Friend"),
    ("공부", &["공", "부"], "Study"),
    ("학교", &["학", "교"], "School"),
    ("선생님", &["선", "생", "님"], "Teacher"),
    ("학생", &["학", "생"], "Student"),
    ("가족", &["가", "족"], "Family"),
    ("한국", &["한", "국"], "Korea"),
    ("서울", &["서", "울"], "Seoul"),
    ("부산", &["부", "산"], "Busan"),
];
