//! Shell-Style Glob Matching for `KEYS`
//!
//! Patterns are matched against the whole key, character by character:
//!
//! - `*` matches any run of characters, including none
//! - `?` matches exactly one character
//! - `[abc]` matches one character from the class, `[a-z]` a range,
//!   `[!abc]` any character not in the class
//! - a `]` right after the opening `[` (or `[!`) is part of the class
//! - an unterminated `[` is a literal bracket
//!
//! Every other character, backslash included, matches itself.

/// One element of a class such as `[a-cx]`.
#[derive(Debug, Clone, PartialEq)]
enum ClassItem {
    Single(char),
    Range(char, char),
}

impl ClassItem {
    fn contains(&self, c: char) -> bool {
        match *self {
            ClassItem::Single(s) => s == c,
            ClassItem::Range(lo, hi) => lo <= c && c <= hi,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// `*`
    AnyRun,
    /// `?`
    AnyOne,
    /// `[...]`
    Class { negated: bool, items: Vec<ClassItem> },
    Literal(char),
}

impl Token {
    /// Whether this single-character token accepts `c`.
    fn accepts(&self, c: char) -> bool {
        match self {
            Token::AnyRun => true,
            Token::AnyOne => true,
            Token::Class { negated, items } => items.iter().any(|i| i.contains(c)) != *negated,
            Token::Literal(l) => *l == c,
        }
    }
}

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    tokens: Vec<Token>,
}

impl GlobPattern {
    /// Compiles a pattern. Every string is a valid pattern.
    pub fn new(pattern: &str) -> Self {
        let chars: Vec<char> = pattern.chars().collect();
        let mut tokens = Vec::with_capacity(chars.len());
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '*' => {
                    // Consecutive stars behave like one
                    if tokens.last() != Some(&Token::AnyRun) {
                        tokens.push(Token::AnyRun);
                    }
                    i += 1;
                }
                '?' => {
                    tokens.push(Token::AnyOne);
                    i += 1;
                }
                '[' => match parse_class(&chars, i) {
                    Some((token, next)) => {
                        tokens.push(token);
                        i = next;
                    }
                    None => {
                        tokens.push(Token::Literal('['));
                        i += 1;
                    }
                },
                c => {
                    tokens.push(Token::Literal(c));
                    i += 1;
                }
            }
        }

        Self { tokens }
    }

    /// Returns true if the whole of `text` matches the pattern.
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().collect();
        let tokens = &self.tokens;

        let (mut t, mut p) = (0usize, 0usize);
        // Position of the last `*` seen and the text index it is currently absorbing up to
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            match tokens.get(p) {
                Some(Token::AnyRun) => {
                    backtrack = Some((p, t));
                    p += 1;
                }
                Some(token) if token.accepts(text[t]) => {
                    p += 1;
                    t += 1;
                }
                _ => match backtrack {
                    Some((star, absorbed)) => {
                        // Let the star swallow one more character and retry
                        p = star + 1;
                        t = absorbed + 1;
                        backtrack = Some((star, absorbed + 1));
                    }
                    None => return false,
                },
            }
        }

        tokens[p..].iter().all(|token| *token == Token::AnyRun)
    }
}

/// Parses a class starting at `chars[start] == '['`.
///
/// Returns the token and the index just past the closing `]`, or `None` if
/// the class is never closed.
fn parse_class(chars: &[char], start: usize) -> Option<(Token, usize)> {
    let mut j = start + 1;
    let negated = chars.get(j) == Some(&'!');
    if negated {
        j += 1;
    }

    let body_start = j;
    // A leading `]` is a member, not the terminator
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    if j >= chars.len() {
        return None;
    }

    let body = &chars[body_start..j];
    let mut items = Vec::new();
    let mut k = 0;
    while k < body.len() {
        if k + 2 < body.len() && body[k + 1] == '-' {
            items.push(ClassItem::Range(body[k], body[k + 2]));
            k += 3;
        } else {
            items.push(ClassItem::Single(body[k]));
            k += 1;
        }
    }

    Some((Token::Class { negated, items }, j + 1))
}
