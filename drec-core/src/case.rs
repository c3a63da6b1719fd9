use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// How a field identifier becomes the key used in JSON and in the stores.
///
/// Every rule first splits the identifier into words at `_`, `-`, whitespace
/// and case boundaries (`fooBar`, `HTTPServer`), then joins them again.
#[derive(Clone, Copy, Default)]
pub enum Case {
    /// `FirstName` -> `first_name`
    #[default]
    Snake,
    /// `first_name` -> `firstName`
    Camel,
    /// `first_name` -> `FirstName`
    Pascal,
    /// `FirstName` -> `first-name`
    Kebab,
    /// `FirstName` -> `FIRST_NAME`
    ScreamingSnake,
    /// `FirstName` -> `FIRST-NAME`
    ScreamingKebab,
    /// The identifier is used as-is.
    Verbatim,
    /// A caller-supplied transform.
    Custom(fn(&str) -> String),
}

impl Case {
    /// Apply this rule to an identifier
    pub fn apply(self, ident: &str) -> String {
        match self {
            Case::Snake => join_words(ident, "_", str::to_lowercase),
            Case::Kebab => join_words(ident, "-", str::to_lowercase),
            Case::ScreamingSnake => join_words(ident, "_", str::to_uppercase),
            Case::ScreamingKebab => join_words(ident, "-", str::to_uppercase),
            Case::Pascal => split_into_words(ident).iter().map(|w| capitalize(w)).collect(),
            Case::Camel => split_into_words(ident)
                .iter()
                .enumerate()
                .map(|(i, w)| if i == 0 { w.to_lowercase() } else { capitalize(w) })
                .collect(),
            Case::Verbatim => String::from(ident),
            Case::Custom(f) => f(ident),
        }
    }
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Case::Snake => "snake_case",
            Case::Camel => "camelCase",
            Case::Pascal => "PascalCase",
            Case::Kebab => "kebab-case",
            Case::ScreamingSnake => "SCREAMING_SNAKE_CASE",
            Case::ScreamingKebab => "SCREAMING-KEBAB-CASE",
            Case::Verbatim => "verbatim",
            Case::Custom(_) => "custom",
        };
        f.write_str(name)
    }
}

fn join_words(ident: &str, separator: &str, recase: fn(&str) -> String) -> String {
    split_into_words(ident)
        .iter()
        .map(|w| recase(w))
        .collect::<Vec<_>>()
        .join(separator)
}

/// `hTTP` -> `Http`
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}

/// Splits an identifier into words.
///
/// Separators (`_`, `-`, whitespace) always split and are dropped. An
/// uppercase letter starts a new word after a lowercase letter or digit, and
/// also ends an acronym run when a lowercase letter follows it, so
/// `theHTTPServer` splits as `the`, `HTTP`, `Server`.
fn split_into_words(input: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut prev: Option<char> = None;
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if let Some(start) = word_start.take() {
                words.push(&input[start..i]);
            }
            prev = None;
            continue;
        }

        let next = chars.peek().map(|&(_, n)| n);
        let boundary = c.is_uppercase()
            && prev.is_some_and(|p| {
                p.is_lowercase()
                    || p.is_ascii_digit()
                    || (p.is_uppercase() && next.is_some_and(char::is_lowercase))
            });
        if boundary {
            if let Some(start) = word_start {
                words.push(&input[start..i]);
            }
            word_start = Some(i);
        } else if word_start.is_none() {
            word_start = Some(i);
        }
        prev = Some(c);
    }

    if let Some(start) = word_start {
        words.push(&input[start..]);
    }
    words
}
