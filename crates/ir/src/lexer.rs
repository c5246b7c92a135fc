//! Tokens of the textual IR format

use logos::Logos;

/// One token of IR text
///
/// Keywords must be listed before the identifier fallback so they win the
/// match. Comments run from `;` to end of line.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r";[^\n]*")]
pub enum Token<'a> {
    // Structure keywords
    #[token("fn")]
    Fn,
    #[token("declare")]
    Declare,
    #[token("internal")]
    Internal,
    #[token("label")]
    Label,
    #[token("volatile")]
    Volatile,

    // Opcode keywords
    #[token("add")]
    Add,
    #[token("sub")]
    Sub,
    #[token("mul")]
    Mul,
    #[token("div")]
    Div,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("xor")]
    Xor,
    #[token("shl")]
    Shl,
    #[token("shr")]
    Shr,
    #[token("icmp")]
    Icmp,
    #[token("select")]
    Select,
    #[token("alloca")]
    Alloca,
    #[token("load")]
    Load,
    #[token("store")]
    Store,
    #[token("call")]
    Call,
    #[token("br")]
    Br,
    #[token("jmp")]
    Jmp,
    #[token("ret")]
    Ret,
    #[token("unreachable")]
    Unreachable,

    // Type keywords
    #[token("void")]
    Void,
    #[token("i1")]
    I1,
    #[token("i8")]
    I8,
    #[token("i16")]
    I16,
    #[token("i32")]
    I32,
    #[token("i64")]
    I64,
    #[token("f32")]
    F32,
    #[token("f64")]
    F64,
    #[token("ptr")]
    Ptr,

    // Identifiers and literals
    #[regex(r"%[A-Za-z_.][A-Za-z0-9_.]*|%[0-9]+", |lex| &lex.slice()[1..])]
    Local(&'a str),
    #[regex(r"@[A-Za-z_.][A-Za-z0-9_.]*", |lex| &lex.slice()[1..])]
    Global(&'a str),
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
    #[regex(r#""[^"]*""#, |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    Str(&'a str),
    #[regex(r"[A-Za-z_][A-Za-z0-9_.]*")]
    Ident(&'a str),

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token("=")]
    Assign,
    #[token(":")]
    Colon,
    #[token("!")]
    Bang,
    #[token("->")]
    Arrow,
}

impl Token<'_> {
    /// Short description used in parse error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Local(name) => format!("'%{name}'"),
            Self::Global(name) => format!("'@{name}'"),
            Self::Int(v) => format!("'{v}'"),
            Self::Str(s) => format!("\"{s}\""),
            Self::Ident(name) => format!("'{name}'"),
            other => format!("'{other:?}'").to_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token<'_>> {
        Token::lexer(source).map(|t| t.expect("lex error")).collect()
    }

    #[test]
    fn keywords_win_over_identifiers() {
        assert_eq!(lex("add"), [Token::Add]);
        assert_eq!(lex("adder"), [Token::Ident("adder")]);
    }

    #[test]
    fn sigils_strip_in_token_payloads() {
        assert_eq!(
            lex("%sum @square %aion.bb.0"),
            [
                Token::Local("sum"),
                Token::Global("square"),
                Token::Local("aion.bb.0"),
            ]
        );
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        let tokens = lex("ret void ; trailing comment\njmp");
        assert_eq!(tokens, [Token::Ret, Token::Void, Token::Jmp]);
    }

    #[test]
    fn negative_integers_lex_as_one_token() {
        assert_eq!(lex("-42"), [Token::Int(-42)]);
    }
}
