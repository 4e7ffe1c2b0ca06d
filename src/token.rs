// =============================================================================
// TOKEN - Scanner interface: token-kind codes and the token stream cursor
// =============================================================================
//
// The scanner is an external collaborator. Its output is a whitespace
// separated word list: a word that parses as an integer is a token-kind
// code (or a numeric payload), any other word is the spelling of the
// identifier token whose code precedes it. The translator drives the
// pairing contextually, one word per `advance`.

/// Longest identifier spelling the scanner contract permits.
pub const MAX_IDENT_LEN: usize = 11;

/// Largest numeric literal (five decimal digits).
pub const MAX_NUMBER: i64 = 99_999;

/// Token-kind codes shared with the scanner. The discriminants are the
/// wire values and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sym {
    Nul = 1,
    Ident = 2,
    Number = 3,
    Plus = 4,
    Minus = 5,
    Times = 6,
    Slash = 7,
    Odd = 8,
    Eql = 9,
    Neq = 10,
    Less = 11,
    Leq = 12,
    Gtr = 13,
    Geq = 14,
    LParen = 15,
    RParen = 16,
    Comma = 17,
    Semicolon = 18,
    Period = 19,
    Becomes = 20,
    Begin = 21,
    End = 22,
    If = 23,
    Then = 24,
    While = 25,
    Do = 26,
    Call = 27,
    Const = 28,
    Var = 29,
    Procedure = 30,
    Write = 31,
    Read = 32,
    Else = 33,
}

impl Sym {
    pub fn from_code(code: i64) -> Option<Sym> {
        Some(match code {
            1 => Sym::Nul,
            2 => Sym::Ident,
            3 => Sym::Number,
            4 => Sym::Plus,
            5 => Sym::Minus,
            6 => Sym::Times,
            7 => Sym::Slash,
            8 => Sym::Odd,
            9 => Sym::Eql,
            10 => Sym::Neq,
            11 => Sym::Less,
            12 => Sym::Leq,
            13 => Sym::Gtr,
            14 => Sym::Geq,
            15 => Sym::LParen,
            16 => Sym::RParen,
            17 => Sym::Comma,
            18 => Sym::Semicolon,
            19 => Sym::Period,
            20 => Sym::Becomes,
            21 => Sym::Begin,
            22 => Sym::End,
            23 => Sym::If,
            24 => Sym::Then,
            25 => Sym::While,
            26 => Sym::Do,
            27 => Sym::Call,
            28 => Sym::Const,
            29 => Sym::Var,
            30 => Sym::Procedure,
            31 => Sym::Write,
            32 => Sym::Read,
            33 => Sym::Else,
            _ => return None,
        })
    }
}

/// One-word-per-step cursor over the scanner's output.
///
/// After `advance`, exactly one of `code` and `text` is set: an integer
/// word becomes the current code, any other word becomes the current
/// spelling. The translator asks for the spelling right after consuming
/// an identifier code, and for the value right after a number code.
pub struct TokenStream {
    words: std::vec::IntoIter<String>,
    code: Option<i64>,
    text: Option<String>,
}

impl TokenStream {
    pub fn new(source: &str) -> TokenStream {
        let mut words: Vec<String> = source.split_whitespace().map(str::to_string).collect();

        // The reference scanner prefixes its output with a header line.
        if words.len() >= 2 && words[0] == "Lexeme" && words[1] == "List:" {
            words.drain(..2);
        }

        TokenStream {
            words: words.into_iter(),
            code: None,
            text: None,
        }
    }

    /// Consumes one word. Returns false at end of stream.
    pub fn advance(&mut self) -> bool {
        match self.words.next() {
            None => {
                self.code = None;
                self.text = None;
                false
            }
            Some(word) => {
                match word.parse::<i64>() {
                    Ok(n) => {
                        self.code = Some(n);
                        self.text = None;
                    }
                    Err(_) => {
                        self.text = Some(word);
                        self.code = None;
                    }
                }
                true
            }
        }
    }

    /// The current token-kind code, if the current word was an integer
    /// that maps to a known kind.
    pub fn sym(&self) -> Option<Sym> {
        self.code.and_then(Sym::from_code)
    }

    /// The current word's integer value, kind code or numeric payload.
    pub fn code(&self) -> Option<i64> {
        self.code
    }

    /// The current word's spelling, when it was not an integer.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn take_text(&mut self) -> Option<String> {
        self.text.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_words_become_codes() {
        let mut ts = TokenStream::new("28 2");
        assert!(ts.advance());
        assert_eq!(ts.sym(), Some(Sym::Const));
        assert!(ts.advance());
        assert_eq!(ts.sym(), Some(Sym::Ident));
        assert!(!ts.advance());
        assert_eq!(ts.sym(), None);
    }

    #[test]
    fn test_non_integer_words_become_spellings() {
        let mut ts = TokenStream::new("2 alpha 18");
        ts.advance();
        assert_eq!(ts.sym(), Some(Sym::Ident));
        ts.advance();
        assert_eq!(ts.sym(), None);
        assert_eq!(ts.text(), Some("alpha"));
        ts.advance();
        assert_eq!(ts.sym(), Some(Sym::Semicolon));
        assert_eq!(ts.text(), None);
    }

    #[test]
    fn test_number_payload_is_a_bare_integer() {
        let mut ts = TokenStream::new("3 42");
        ts.advance();
        assert_eq!(ts.sym(), Some(Sym::Number));
        ts.advance();
        assert_eq!(ts.code(), Some(42));
        assert_eq!(ts.sym(), None); // 42 is not a token-kind code
    }

    #[test]
    fn test_scanner_header_is_skipped() {
        let mut ts = TokenStream::new("Lexeme List:\n29 2 x 18 19");
        ts.advance();
        assert_eq!(ts.sym(), Some(Sym::Var));
    }

    #[test]
    fn test_unknown_code_has_no_sym() {
        let mut ts = TokenStream::new("99");
        ts.advance();
        assert_eq!(ts.sym(), None);
        assert_eq!(ts.code(), Some(99));
    }
}
