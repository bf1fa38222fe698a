//! Code-boundary scanning for line-oriented text.
//!
//! Tracks fenced code blocks across lines and blanks out inline code spans
//! within a line. The extraction engine runs [`ProseLines`] over each body and
//! drops any reassembled line this scanner places inside a fence.

use std::iter::Enumerate;
use std::str::Lines;

/// Fence state carried across the lines of one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceState {
    pub in_fence: bool,
    pub fence_char: Option<char>,
    pub fence_len: usize,
}

impl FenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next line. Returns `true` if the line opened or closed a fence.
    pub fn update(&mut self, line: &str) -> bool {
        let Some((ch, len)) = parse_fence_marker(normalize_fence_line(line)) else {
            return false;
        };

        if !self.in_fence {
            self.in_fence = true;
            self.fence_char = Some(ch);
            self.fence_len = len;
            return true;
        }

        if self.fence_char == Some(ch) && len >= self.fence_len {
            *self = FenceState::default();
            return true;
        }

        false
    }
}

/// Strip the prefixes a fence may hide behind: indentation, blockquote
/// markers, and list markers followed by whitespace.
pub fn normalize_fence_line(line: &str) -> &str {
    let mut s = line.trim_start();
    loop {
        if let Some(rest) = s.strip_prefix('>') {
            s = rest.trim_start();
            continue;
        }
        if let Some(rest) = strip_list_marker(s) {
            s = rest.trim_start();
            continue;
        }
        return s;
    }
}

/// `- `, `* `, `+ `, `1. ` or `1) ` at the start of `s`.
fn strip_list_marker(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let marker_len = match bytes.first()? {
        b'-' | b'*' | b'+' => 1,
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            match bytes.get(digits) {
                Some(b'.' | b')') => digits + 1,
                _ => return None,
            }
        }
        _ => return None,
    };

    match bytes.get(marker_len) {
        Some(b' ' | b'\t') => Some(&s[marker_len..]),
        _ => None,
    }
}

/// Fence character and run length if `line` (already normalized) starts a fence.
pub fn parse_fence_marker(line: &str) -> Option<(char, usize)> {
    let ch = line.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let len = line.chars().take_while(|&c| c == ch).count();
    (len >= 3).then_some((ch, len))
}

/// Replace inline code spans with spaces, keeping byte offsets intact.
///
/// A run of N backticks is closed by the next run of exactly N backticks;
/// unmatched runs are left as they are.
pub fn remove_inline_code(line: &str) -> String {
    if !line.contains('`') {
        return line.to_string();
    }

    let mut bytes = line.as_bytes().to_vec();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        let open_len = i - start;

        let mut j = i;
        while j < bytes.len() {
            if bytes[j] != b'`' {
                j += 1;
                continue;
            }
            let run_start = j;
            while j < bytes.len() && bytes[j] == b'`' {
                j += 1;
            }
            if j - run_start == open_len {
                bytes[start..j].fill(b' ');
                i = j;
                break;
            }
        }
    }

    // Only whole spans were blanked, so any split character became ASCII spaces.
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Wrap code in the shortest backtick delimiter that does not occur inside it.
pub fn wrap_inline_code(code: &str) -> String {
    if code.is_empty() {
        return "``".to_string();
    }

    let mut longest = 0;
    let mut current = 0;
    for ch in code.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }

    let delim = "`".repeat(longest + 1);
    format!("{delim}{code}{delim}")
}

/// Lines outside fenced code blocks, numbered from a starting line.
///
/// Fence lines themselves are not yielded.
pub struct ProseLines<'a> {
    lines: Enumerate<Lines<'a>>,
    start_line: usize,
    state: FenceState,
}

impl<'a> ProseLines<'a> {
    pub fn new(content: &'a str, start_line: usize) -> Self {
        Self {
            lines: content.lines().enumerate(),
            start_line,
            state: FenceState::new(),
        }
    }
}

impl<'a> Iterator for ProseLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, line) in self.lines.by_ref() {
            if self.state.update(line) || self.state.in_fence {
                continue;
            }
            return Some((self.start_line + idx, line));
        }
        None
    }
}
