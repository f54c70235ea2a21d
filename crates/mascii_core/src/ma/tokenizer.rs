//! Command tokenizer.
//!
//! Single pass character state machine over one assembled command.
//!
//! # Rules
//!
//! - `//` or `/*` at the start: the whole comment body is one token
//! - `\x`: `x` is copied literally (the backslash is kept)
//! - `"..."`: one token, quotes included
//! - `{ "a", "b" }`: `{` and `}` are tokens, the strings between are dequoted
//! - `("a" + "b")`: quoted segments concatenated into one quoted token
//! - bare words end at whitespace
//! - an unescaped `;` outside any quoting ends the command

use crate::error::{DecodeError, DecodeResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Normal,
    Quoted,
    Brace,
    BraceQuoted,
    Paren,
    ParenQuoted,
}

impl State {
    fn context(self) -> &'static str {
        match self {
            State::Normal => "command",
            State::Quoted | State::BraceQuoted | State::ParenQuoted => "string literal",
            State::Brace => "brace list",
            State::Paren => "string concatenation",
        }
    }
}

/// Split one command's raw text into tokens.
pub fn tokenize(raw: &str) -> DecodeResult<Vec<String>> {
    let content = raw.trim_start();

    if let Some(body) = content.strip_prefix("//") {
        return Ok(vec![body.trim_end().to_string()]);
    }
    if let Some(body) = content.strip_prefix("/*") {
        let body = body.trim_end();
        return match body.strip_suffix("*/") {
            Some(inner) => Ok(vec![inner.to_string()]),
            None => Err(DecodeError::Lex {
                context: "block comment",
                remaining: body.to_string(),
            }),
        };
    }

    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut state = State::Normal;
    let mut escaped = false;

    for c in content.chars() {
        if escaped {
            buf.push(c);
            escaped = false;
            continue;
        }
        if c == '\\' {
            buf.push(c);
            escaped = true;
            continue;
        }

        match state {
            State::Normal => match c {
                ';' => {
                    flush(&mut buf, &mut tokens);
                    return Ok(tokens);
                }
                '"' => {
                    buf.push(c);
                    state = State::Quoted;
                }
                '{' if buf.is_empty() => {
                    tokens.push("{".to_string());
                    state = State::Brace;
                }
                '(' if buf.is_empty() => state = State::Paren,
                c if c.is_whitespace() => flush(&mut buf, &mut tokens),
                c => buf.push(c),
            },
            State::Quoted => {
                buf.push(c);
                if c == '"' {
                    state = State::Normal;
                }
            }
            State::Brace => match c {
                '"' => {
                    flush(&mut buf, &mut tokens);
                    state = State::BraceQuoted;
                }
                '}' => {
                    flush(&mut buf, &mut tokens);
                    tokens.push("}".to_string());
                    state = State::Normal;
                }
                ',' => flush(&mut buf, &mut tokens),
                c if c.is_whitespace() => flush(&mut buf, &mut tokens),
                c => buf.push(c),
            },
            State::BraceQuoted => {
                if c == '"' {
                    // Empty strings are meaningful inside alias lists
                    tokens.push(std::mem::take(&mut buf));
                    state = State::Brace;
                } else {
                    buf.push(c);
                }
            }
            State::Paren => match c {
                '"' => state = State::ParenQuoted,
                ')' => {
                    tokens.push(format!("\"{}\"", std::mem::take(&mut buf)));
                    state = State::Normal;
                }
                '+' => {}
                c if c.is_whitespace() => {}
                c => buf.push(c),
            },
            State::ParenQuoted => {
                if c == '"' {
                    state = State::Paren;
                } else {
                    buf.push(c);
                }
            }
        }
    }

    if state != State::Normal {
        return Err(DecodeError::Lex {
            context: state.context(),
            remaining: buf,
        });
    }

    flush(&mut buf, &mut tokens);
    Ok(tokens)
}

fn flush(buf: &mut String, tokens: &mut Vec<String>) {
    if !buf.is_empty() {
        tokens.push(std::mem::take(buf));
    }
}

/// Strip surrounding double quotes, if present.
pub fn dequote(token: &str) -> &str {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}

/// Wrap text in double quotes.
pub fn quote(text: &str) -> String {
    format!("\"{}\"", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node_tokens() {
        let tokens = tokenize("createNode transform -s -n \"persp\";").unwrap();
        assert_eq!(tokens, vec!["createNode", "transform", "-s", "-n", "\"persp\""]);
    }

    #[test]
    fn test_escaped_quote() {
        let tokens = tokenize(r#"setAttr ".s" -type "string" "a\"b";"#).unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[4], r#""a\"b""#);
    }

    #[test]
    fn test_escaped_backslash_before_quote() {
        let tokens = tokenize(r#"fileInfo "path" "C:\\";"#).unwrap();
        assert_eq!(tokens, vec!["fileInfo", "\"path\"", r#""C:\\""#]);
    }

    #[test]
    fn test_paren_concatenation() {
        let tokens =
            tokenize("setAttr \".s\" -type \"string\" (\"long text \" + \"long text\");").unwrap();
        assert_eq!(tokens.last().unwrap(), "\"long text long text\"");
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn test_paren_concatenation_across_lines() {
        let raw = "setAttr \".s\" -type \"string\" (\"a;b \"\n\t\t+ \"c\"\n\t\t+ \"d\");";
        let tokens = tokenize(raw).unwrap();
        assert_eq!(tokens.last().unwrap(), "\"a;b cd\"");
    }

    #[test]
    fn test_brace_list() {
        let raw = "setAttr \".aal\" -type \"attributeAlias\" {\"blend\",\"weight[0]\"\n,\"other\",\"weight[1]\"} ;";
        let tokens = tokenize(raw).unwrap();
        assert_eq!(
            &tokens[4..],
            &["{", "blend", "weight[0]", "other", "weight[1]", "}"]
        );
    }

    #[test]
    fn test_semicolon_inside_string() {
        let tokens = tokenize("file -op \"v=0;\" \"a.ma\";").unwrap();
        assert_eq!(tokens, vec!["file", "-op", "\"v=0;\"", "\"a.ma\""]);
    }

    #[test]
    fn test_terminator_stops_tokenizing() {
        let tokens = tokenize("select -ne :time1; trailing").unwrap();
        assert_eq!(tokens, vec!["select", "-ne", ":time1"]);
    }

    #[test]
    fn test_block_comment_single_token() {
        let tokens = tokenize("/* a;\n b; */").unwrap();
        assert_eq!(tokens, vec![" a;\n b; "]);
    }

    #[test]
    fn test_line_comment() {
        let tokens = tokenize("//Last modified: Tue, Jan 01 2019").unwrap();
        assert_eq!(tokens, vec!["Last modified: Tue, Jan 01 2019"]);
    }

    #[test]
    fn test_unterminated_quote() {
        match tokenize("fileInfo \"a\" \"unfinished;") {
            Err(DecodeError::Lex { context, remaining }) => {
                assert_eq!(context, "string literal");
                assert_eq!(remaining, "\"unfinished;");
            }
            other => panic!("Expected Lex error, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_brace_and_paren() {
        assert!(matches!(
            tokenize("setAttr \".aal\" -type \"attributeAlias\" {\"a\";"),
            Err(DecodeError::Lex { context: "brace list", .. })
        ));
        assert!(matches!(
            tokenize("setAttr \".s\" -type \"string\" (\"a\" + \"b\";"),
            Err(DecodeError::Lex { .. })
        ));
    }

    #[test]
    fn test_multiline_whitespace() {
        let tokens = tokenize("setAttr \".t\"\n\t\t1\t2\r\n3;").unwrap();
        assert_eq!(tokens, vec!["setAttr", "\".t\"", "1", "2", "3"]);
    }

    #[test]
    fn test_dequote() {
        assert_eq!(dequote("\"abc\""), "abc");
        assert_eq!(dequote("abc"), "abc");
        assert_eq!(dequote("\""), "\"");
        assert_eq!(quote("x"), "\"x\"");
    }
}
