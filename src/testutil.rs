// Test-only helper: renders readable source text into the scanner's
// whitespace separated word-stream format. Every token must be
// surrounded by spaces in the input.

use crate::token::Sym;

pub fn lexemes(source: &str) -> String {
    let mut words = Vec::new();
    for word in source.split_whitespace() {
        match symbol(word) {
            Some(sym) => words.push((sym as i64).to_string()),
            None if word.chars().all(|c| c.is_ascii_digit()) => {
                words.push((Sym::Number as i64).to_string());
                words.push(word.to_string());
            }
            None => {
                words.push((Sym::Ident as i64).to_string());
                words.push(word.to_string());
            }
        }
    }
    words.join(" ")
}

fn symbol(word: &str) -> Option<Sym> {
    Some(match word {
        "+" => Sym::Plus,
        "-" => Sym::Minus,
        "*" => Sym::Times,
        "/" => Sym::Slash,
        "odd" => Sym::Odd,
        "=" => Sym::Eql,
        "<>" => Sym::Neq,
        "<" => Sym::Less,
        "<=" => Sym::Leq,
        ">" => Sym::Gtr,
        ">=" => Sym::Geq,
        "(" => Sym::LParen,
        ")" => Sym::RParen,
        "," => Sym::Comma,
        ";" => Sym::Semicolon,
        "." => Sym::Period,
        ":=" => Sym::Becomes,
        "begin" => Sym::Begin,
        "end" => Sym::End,
        "if" => Sym::If,
        "then" => Sym::Then,
        "while" => Sym::While,
        "do" => Sym::Do,
        "call" => Sym::Call,
        "const" => Sym::Const,
        "var" => Sym::Var,
        "procedure" => Sym::Procedure,
        "write" => Sym::Write,
        "read" => Sym::Read,
        "else" => Sym::Else,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexemes_rendering() {
        assert_eq!(lexemes("var x ; x := 42 ."), "29 2 x 18 2 x 20 3 42 19");
    }
}
