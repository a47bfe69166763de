//! Helvetica width table and greedy word wrap for the PDF encoder.
//!
//! Widths are in em units (Adobe core-font AFM values / 1000) for ASCII 0x20..=0x7E.
//! Index = (char as usize) - 32. Anything outside that range falls back to
//! `AVERAGE_CHAR_WIDTH`; bold text is approximated by a fixed widening factor.

use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

#[rustfmt::skip]
static HELVETICA_WIDTHS: [f32; 95] = [
    // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
    0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
    // 0      1      2      3      4      5      6      7      8      9
    0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
    // :      ;      <      =      >      ?      @
    0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
    // A      B      C      D      E      F      G      H      I      J      K      L      M
    0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
    // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
    0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
    // [      \      ]      ^      _      `
    0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
    // a      b      c      d      e      f      g      h      i      j      k      l      m
    0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
    // n      o      p      q      r      s      t      u      v      w      x      y      z
    0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
    // {      |      }      ~
    0.334, 0.260, 0.334, 0.584,
];

const AVERAGE_CHAR_WIDTH: f32 = 0.556;
const SPACE_WIDTH: f32 = 0.278;
const BOLD_FACTOR: f32 = 1.06;

/// Width of `s` in em units.
pub fn measure_str(s: &str, bold: bool) -> f32 {
    let width: f32 = s
        .chars()
        .map(|c| {
            let code = c as usize;
            if (32..=126).contains(&code) {
                HELVETICA_WIDTHS[code - 32]
            } else {
                AVERAGE_CHAR_WIDTH
            }
        })
        .sum();
    if bold {
        width * BOLD_FACTOR
    } else {
        width
    }
}

/// Greedy word wrap at `max_width_em`.
///
/// A single word wider than the line is kept whole on its own line.
pub fn wrap_text(text: &str, max_width_em: f32, bold: bool) -> Vec<String> {
    let space_w = if bold {
        SPACE_WIDTH * BOLD_FACTOR
    } else {
        SPACE_WIDTH
    };
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        let word_w = measure_str(word, bold);
        if !current.is_empty() && current_width + space_w + word_w > max_width_em {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += space_w;
        }
        current.push_str(word);
        current_width += word_w;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Maps text to WinAnsiEncoding bytes for the standard Type1 fonts.
///
/// Latin-1 code points map to themselves; the typographic characters WinAnsi places in
/// 0x80..=0x9F are remapped. Other letters are folded to their unaccented base
/// (`ũ` to `u`) when one exists; anything left becomes `?` and is logged.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    let mut folded = 0usize;
    let mut replaced = 0usize;
    let bytes: Vec<u8> = text
        .nfc()
        .map(|c| match win_ansi_byte(c) {
            Some(b) => b,
            None => match base_letter(c) {
                Some(b) => {
                    folded += 1;
                    b
                }
                None => {
                    replaced += 1;
                    b'?'
                }
            },
        })
        .collect();
    if replaced > 0 {
        warn!(replaced, folded, "text has characters outside WinAnsi; replaced with '?'");
    } else if folded > 0 {
        debug!(folded, "accented characters outside WinAnsi folded to base letters");
    }
    bytes
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        '€' => 0x80,
        '‚' => 0x82,
        '…' => 0x85,
        'Œ' => 0x8C,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        'œ' => 0x9C,
        '\u{202F}' | '\u{2009}' | '\t' => b' ',
        c if (c as u32) < 0x20 => b' ',
        c if (0x80..0xA0).contains(&(c as u32)) => return None,
        c if (c as u32) <= 0xFF => c as u8,
        _ => return None,
    };
    Some(byte)
}

/// First character of the canonical decomposition, if WinAnsi can show it.
fn base_letter(c: char) -> Option<u8> {
    let base = std::iter::once(c).nfd().next()?;
    if base == c || !base.is_alphanumeric() {
        return None;
    }
    win_ansi_byte(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_uses_table() {
        assert!((measure_str("i", false) - 0.222).abs() < 1e-6);
        assert!((measure_str("MM", false) - 1.666).abs() < 1e-4);
        assert!(measure_str("MM", true) > measure_str("MM", false));
    }

    #[test]
    fn test_wrap_text_breaks_on_width() {
        // "aaaa" = 4 * 0.556 = 2.224em; two words plus a space exceed 4em
        let lines = wrap_text("aaaa bbbb cccc", 4.0, false);
        assert_eq!(lines, vec!["aaaa", "bbbb", "cccc"]);

        let lines = wrap_text("aaaa bbbb cccc", 100.0, false);
        assert_eq!(lines, vec!["aaaa bbbb cccc"]);
    }

    #[test]
    fn test_wrap_text_keeps_long_word_whole() {
        let lines = wrap_text("x supercalifragilistic y", 2.0, false);
        assert_eq!(lines, vec!["x", "supercalifragilistic", "y"]);
    }

    #[test]
    fn test_wrap_text_empty() {
        assert!(wrap_text("   ", 10.0, false).is_empty());
    }

    #[test]
    fn test_to_win_ansi() {
        assert_eq!(to_win_ansi("Acme"), b"Acme".to_vec());
        assert_eq!(to_win_ansi("é"), vec![0xE9]);
        assert_eq!(to_win_ansi("l’été"), vec![b'l', 0x92, 0xE9, b't', 0xE9]);
        assert_eq!(to_win_ansi("• €"), vec![0x95, b' ', 0x80]);
        assert_eq!(to_win_ansi("日"), vec![b'?']);
    }

    #[test]
    fn test_to_win_ansi_folds_accents_outside_latin1() {
        assert_eq!(to_win_ansi("Ngũgĩ"), b"Ngugi".to_vec());
        assert_eq!(to_win_ansi("Łódź"), vec![b'?', 0xF3, b'd', b'z']);
        // decomposed input is composed first
        assert_eq!(to_win_ansi("e\u{301}te\u{301}"), vec![0xE9, b't', 0xE9]);
        assert_eq!(to_win_ansi("Ngu\u{303}gi\u{303}"), b"Ngugi".to_vec());
    }
}
