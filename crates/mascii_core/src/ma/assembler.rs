//! Line assembly: groups raw input lines into command units.
//!
//! A unit normally ends on a line whose last character is `;`. A unit whose
//! first content opens a block comment (`/*`) instead ends on a line whose
//! right-trimmed text ends with `*/`, so semicolons inside the comment do not
//! end it early. A `//` line comment is a unit of its own.

use std::io::{BufRead, Lines};

use crate::error::{ParseError, ParseResult};

/// Raw text of one command unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCommand {
    /// Lines joined with `\n`
    pub text: String,

    /// First line of the unit (1-based)
    pub line: usize,
}

/// Termination rule in effect for the unit being assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Termination {
    Semicolon,
    BlockComment,
    LineComment,
}

impl Termination {
    fn for_first_line(line: &str) -> Self {
        let content = line.trim_start();
        if content.starts_with("/*") {
            Termination::BlockComment
        } else if content.starts_with("//") {
            Termination::LineComment
        } else {
            Termination::Semicolon
        }
    }

    fn terminates(self, last_line: &str) -> bool {
        match self {
            Termination::Semicolon => last_line.ends_with(';'),
            Termination::BlockComment => last_line.trim_end().ends_with("*/"),
            Termination::LineComment => true,
        }
    }
}

/// Streaming line assembler over any buffered reader.
pub struct LineAssembler<R> {
    lines: Lines<R>,
    line_number: usize,
    finished: bool,
}

impl<R: BufRead> LineAssembler<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            finished: false,
        }
    }

    /// Read the next complete unit, or `None` at end of input.
    pub fn next_command(&mut self) -> ParseResult<Option<RawCommand>> {
        if self.finished {
            return Ok(None);
        }

        let mut text = String::new();
        let mut start_line = 0;
        let mut termination = Termination::Semicolon;

        loop {
            let line = match self.lines.next() {
                Some(line) => line?,
                None => {
                    self.finished = true;
                    if text.is_empty() {
                        return Ok(None);
                    }
                    return Err(ParseError::Unterminated { line: start_line });
                }
            };
            self.line_number += 1;

            if text.is_empty() {
                // Blank lines between commands are not part of any unit
                if line.trim().is_empty() {
                    continue;
                }
                start_line = self.line_number;
                termination = Termination::for_first_line(&line);
            } else {
                text.push('\n');
            }
            text.push_str(&line);

            if termination.terminates(&line) {
                return Ok(Some(RawCommand {
                    text,
                    line: start_line,
                }));
            }
        }
    }
}

impl<R: BufRead> Iterator for LineAssembler<R> {
    type Item = ParseResult<RawCommand>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_command().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(content: &str) -> Vec<RawCommand> {
        LineAssembler::new(content.as_bytes())
            .collect::<ParseResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_multi_line_command() {
        let commands = assemble("setAttr \".t\" -type \"double3\"\n\t\t1 2 3;\ncreateNode mesh;\n");
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].text, "setAttr \".t\" -type \"double3\"\n\t\t1 2 3;");
        assert_eq!(commands[0].line, 1);
        assert_eq!(commands[1].line, 3);
    }

    #[test]
    fn test_block_comment_with_semicolon() {
        let commands = assemble("/* first;\n second; */\nselect -ne :time1;\n");
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].text, "/* first;\n second; */");
        assert_eq!(commands[1].text, "select -ne :time1;");
    }

    #[test]
    fn test_line_comment_is_own_unit() {
        let commands = assemble("//Maya ASCII 2018 scene\n//Name: a.ma\nrequires maya \"2018\";\n");
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[2].text, "requires maya \"2018\";");
        assert_eq!(commands[2].line, 3);
    }

    #[test]
    fn test_empty_lines_do_not_terminate() {
        let commands = assemble("setAttr \".a\"\n\n1;\n");
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].text, "setAttr \".a\"\n\n1;");
    }

    #[test]
    fn test_trailing_whitespace_after_semicolon() {
        // Only the untrimmed last character counts
        let commands = assemble("select a; \nselect b;\n");
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].text, "select a; \nselect b;");
    }

    #[test]
    fn test_unterminated_input() {
        let result: ParseResult<Vec<_>> =
            LineAssembler::new("createNode mesh;\nsetAttr \".a\" 1\n".as_bytes()).collect();
        match result {
            Err(ParseError::Unterminated { line }) => assert_eq!(line, 2),
            other => panic!("Expected Unterminated error, got {:?}", other),
        }
    }
}
