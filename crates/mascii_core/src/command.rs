//! Tokenized Maya ASCII commands.
//!
//! A [`Command`] is one terminated unit of input (a `;`-terminated MEL
//! statement or a comment) split into tokens. Tokens carry no category of
//! their own; consumers interpret them by position.

use std::fmt;

use serde::Serialize;

use crate::error::DecodeResult;
use crate::ma::tokenizer::tokenize;

/// Command keyword recognized by the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CommandType {
    /// No tokens at all
    None,
    /// `//` or `/* */` comment
    Comment,
    File,
    FileInfo,
    Workspace,
    Requires,
    CurrentUnit,
    ConnectAttr,
    DisconnectAttr,
    CreateNode,
    Rename,
    SetAttr,
    AddAttr,
    Select,
    /// Any other keyword, retained verbatim
    Unknown,
}

impl CommandType {
    /// Map a leading token to a command type.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "file" => CommandType::File,
            "fileInfo" => CommandType::FileInfo,
            "workspace" => CommandType::Workspace,
            "requires" => CommandType::Requires,
            "currentUnit" => CommandType::CurrentUnit,
            "connectAttr" => CommandType::ConnectAttr,
            "disconnectAttr" => CommandType::DisconnectAttr,
            "createNode" => CommandType::CreateNode,
            "rename" => CommandType::Rename,
            "setAttr" => CommandType::SetAttr,
            "addAttr" => CommandType::AddAttr,
            "select" => CommandType::Select,
            _ => CommandType::Unknown,
        }
    }

    /// The MEL keyword for this command type.
    pub fn keyword(self) -> &'static str {
        match self {
            CommandType::None => "none",
            CommandType::Comment => "comment",
            CommandType::File => "file",
            CommandType::FileInfo => "fileInfo",
            CommandType::Workspace => "workspace",
            CommandType::Requires => "requires",
            CommandType::CurrentUnit => "currentUnit",
            CommandType::ConnectAttr => "connectAttr",
            CommandType::DisconnectAttr => "disconnectAttr",
            CommandType::CreateNode => "createNode",
            CommandType::Rename => "rename",
            CommandType::SetAttr => "setAttr",
            CommandType::AddAttr => "addAttr",
            CommandType::Select => "select",
            CommandType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One terminated unit of input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Command {
    /// Command type (derived from the first token)
    pub kind: CommandType,

    /// Raw text exactly as assembled from the input lines
    pub raw: String,

    /// Ordered tokens; for comments a single token with the comment body
    pub tokens: Vec<String>,

    /// First source line (1-based)
    pub line: usize,
}

impl Command {
    /// Tokenize raw command text.
    pub fn parse(raw: impl Into<String>, line: usize) -> DecodeResult<Self> {
        let raw = raw.into();
        let tokens = tokenize(&raw)?;
        let kind = if is_comment(&raw) {
            CommandType::Comment
        } else {
            match tokens.first() {
                Some(first) => CommandType::from_keyword(first),
                None => CommandType::None,
            }
        };
        Ok(Self {
            kind,
            raw,
            tokens,
            line,
        })
    }

    /// A command whose text could not be tokenized.
    ///
    /// The type is guessed from the first whitespace-separated word so that
    /// errors can still name the command.
    pub fn untokenized(raw: impl Into<String>, line: usize) -> Self {
        let raw = raw.into();
        let kind = if is_comment(&raw) {
            CommandType::Comment
        } else {
            raw.split_whitespace()
                .next()
                .map(CommandType::from_keyword)
                .unwrap_or(CommandType::None)
        };
        Self {
            kind,
            raw,
            tokens: Vec::new(),
            line,
        }
    }

    /// Tokens following the command keyword.
    pub fn args(&self) -> &[String] {
        match self.kind {
            CommandType::Comment | CommandType::None => &[],
            _ => self.tokens.get(1..).unwrap_or(&[]),
        }
    }
}

fn is_comment(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with("/*")
}
