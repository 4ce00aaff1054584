//! Name ordering for Japanese worker and company names
//!
//! Names compare in three levels, the way a Japanese dictionary orders them:
//! 1. primary: base kana with voicing marks removed, small kana enlarged,
//!    katakana folded onto hiragana and ー read as the preceding vowel
//! 2. secondary: plain < dakuten < handakuten
//! 3. tertiary: hiragana before katakana, small before large
//!
//! Kanji carry no reading here and order by code point after all kana.

use std::cmp::Ordering;

const VOICED: &str = "がぎぐげござじずぜぞだぢづでどばびぶべぼゔ";
const VOICED_BASE: &str = "かきくけこさしすせそたちつてとはひふへほう";
const SEMI_VOICED: &str = "ぱぴぷぺぽ";
const SEMI_VOICED_BASE: &str = "はひふへほ";
const SMALL: &str = "ぁぃぅぇぉっゃゅょゎゕゖ";
const SMALL_BASE: &str = "あいうえおつやゆよわかけ";

const VOWELS: [(char, &str); 5] = [
    ('あ', "あかさたなはまやらわ"),
    ('い', "いきしちにひみりゐ"),
    ('う', "うくすつぬふむゆる"),
    ('え', "えけせてねへめれゑ"),
    ('お', "おこそとのほもよろを"),
];

const LONG_VOWEL_MARK: char = 'ー';

/// Comparison weights of one character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Weight {
    primary: char,
    secondary: u8,
    tertiary: u8,
}

/// Position of `c` in `table`, counted in chars
fn index_in(table: &str, c: char) -> Option<usize> {
    table.chars().position(|t| t == c)
}

fn nth(table: &str, i: usize) -> Option<char> {
    table.chars().nth(i)
}

fn fold_width(c: char) -> char {
    match c {
        // Full-width ！..～ -> ASCII
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        '\u{3000}' => ' ',
        _ => c,
    }
}

fn is_katakana(c: char) -> bool {
    matches!(c, '\u{30A1}'..='\u{30F6}')
}

/// Katakana ァ..ヶ -> hiragana ぁ..ゖ
fn to_hiragana(c: char) -> char {
    if is_katakana(c) {
        char::from_u32(c as u32 - 0x60).unwrap_or(c)
    } else {
        c
    }
}

fn vowel_of(c: char) -> Option<char> {
    VOWELS
        .iter()
        .find(|(_, row)| row.contains(c))
        .map(|(vowel, _)| *vowel)
}

fn weigh(name: &str) -> Vec<Weight> {
    let mut weights: Vec<Weight> = Vec::new();
    for raw in name.trim().chars() {
        let folded = fold_width(raw);
        let script = if is_katakana(folded) || folded == LONG_VOWEL_MARK { 1 } else { 0 };
        let c = to_hiragana(folded);

        let (base, secondary) = if let Some(i) = index_in(VOICED, c) {
            (nth(VOICED_BASE, i).unwrap_or(c), 1)
        } else if let Some(i) = index_in(SEMI_VOICED, c) {
            (nth(SEMI_VOICED_BASE, i).unwrap_or(c), 2)
        } else {
            (c, 0)
        };
        let (primary, small) = match index_in(SMALL, base) {
            Some(i) => (nth(SMALL_BASE, i).unwrap_or(base), 0),
            None => (base, 1),
        };

        let primary = if primary == LONG_VOWEL_MARK {
            weights
                .last()
                .and_then(|prev| vowel_of(prev.primary))
                .unwrap_or(LONG_VOWEL_MARK)
        } else {
            primary
        };

        weights.push(Weight {
            primary,
            secondary,
            tertiary: script * 2 + small,
        });
    }
    weights
}

/// Primary collation key: the reading with voicing, size and script differences removed
pub fn collation_key(name: &str) -> String {
    weigh(name).into_iter().map(|w| w.primary).collect()
}

/// Compare two names level by level, falling back to the raw text
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let wa = weigh(a);
    let wb = weigh(b);

    let primary = |w: &[Weight]| w.iter().map(|x| x.primary).collect::<Vec<_>>();
    let secondary = |w: &[Weight]| w.iter().map(|x| x.secondary).collect::<Vec<_>>();
    let tertiary = |w: &[Weight]| w.iter().map(|x| x.tertiary).collect::<Vec<_>>();

    primary(&wa)
        .cmp(&primary(&wb))
        .then_with(|| secondary(&wa).cmp(&secondary(&wb)))
        .then_with(|| tertiary(&wa).cmp(&tertiary(&wb)))
        .then_with(|| a.cmp(b))
}
