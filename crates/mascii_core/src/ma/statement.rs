//! Typed command layouts.
//!
//! Each recognized command is decoded from its tokens into a struct that
//! mirrors the MEL flags. `setAttr` is special: its values are decoded per
//! attribute type and may be folded into an earlier record by the parse
//! pass (see [`crate::ma::merge`]).

use std::fmt;

use serde::Serialize;

use crate::command::{Command, CommandType};
use crate::error::{DecodeError, DecodeResult};
use crate::ma::decode::decode_values;
use crate::ma::infer::parse_bool;
use crate::ma::tokenizer::dequote;
use crate::ma::types::AttrType;
use crate::ma::value::AttrValue;

/// A `node.attribute` reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Plug {
    pub node: String,
    /// Attribute path, possibly nested (`iog[0].og[1]`)
    pub attr: String,
}

impl Plug {
    /// Split at the first `.`; node names never contain one.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((node, attr)) => Plug {
                node: node.to_string(),
                attr: attr.to_string(),
            },
            None => Plug {
                node: text.to_string(),
                attr: String::new(),
            },
        }
    }
}

impl fmt::Display for Plug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attr.is_empty() {
            write!(f, "{}", self.node)
        } else {
            write!(f, "{}.{}", self.node, self.attr)
        }
    }
}

/// A flag the typed layout does not model, kept for re-encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Flag {
    pub name: String,
    /// Raw argument token (quotes kept)
    pub value: Option<String>,
}

/// `file` command (scene reference or reference load).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FileCommand {
    /// `-r`
    pub reference: bool,
    /// `-rdi`
    pub reference_depth_info: Option<i64>,
    /// `-ns`
    pub namespace: Option<String>,
    /// `-dr`
    pub defer_reference: Option<bool>,
    /// `-rfn`
    pub reference_node: Option<String>,
    /// `-op`
    pub options: Option<String>,
    /// `-typ`
    pub file_type: Option<String>,
    pub extra_flags: Vec<Flag>,
    pub path: String,
}

/// `fileInfo "name" "value"`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub value: String,
}

/// `workspace -fr "rule" "place"`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Workspace {
    pub rule: String,
    pub place: String,
}

/// `requires [-nodeType t]* [-dataType t]* "plugin" "version"`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Requires {
    pub plugin: String,
    pub version: String,
    pub node_types: Vec<String>,
    pub data_types: Vec<String>,
}

/// `currentUnit -l linear -a angle -t time`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CurrentUnit {
    pub linear: Option<String>,
    pub angle: Option<String>,
    pub time: Option<String>,
}

/// `connectAttr [-f] [-l on|off] [-na] [-rd "s"] src dst`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectAttr {
    pub source: Plug,
    pub destination: Plug,
    pub force: bool,
    pub lock: Option<bool>,
    pub next_available: bool,
    pub reference_dest: Option<String>,
}

/// `disconnectAttr [-na] src dst`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisconnectAttr {
    pub source: Plug,
    pub destination: Plug,
    pub next_available: bool,
}

/// `createNode type [-n name] [-p parent] [-s] [-ss]`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CreateNode {
    pub node_type: String,
    pub name: Option<String>,
    pub parent: Option<String>,
    /// `-s`
    pub shared: bool,
    /// `-ss`
    pub skip_select: bool,
}

/// `rename [-uid] [-is] ["from"] "to"`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub uid: bool,
    pub ignore_shape: bool,
    pub from: Option<String>,
    pub to: String,
}

/// `addAttr`, with the commonly used flags pulled out.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AddAttr {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub nice_name: Option<String>,
    pub attribute_type: Option<String>,
    pub data_type: Option<String>,
    pub parent: Option<String>,
    pub default_value: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// Every flag in order, modeled or not
    pub flags: Vec<Flag>,
    /// Target node, when given
    pub node: Option<String>,
}

/// `select [flags] name...`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Select {
    /// `-ne`
    pub no_expand: bool,
    pub flags: Vec<String>,
    pub names: Vec<String>,
}

/// Option flags of a `setAttr`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SetAttrFlags {
    /// `-av`
    pub altered_value: bool,
    /// `-ca on|off`
    pub caching: Option<bool>,
    /// `-ch N`
    pub capacity_hint: Option<u32>,
    /// `-cb on|off`
    pub channel_box: Option<bool>,
    /// `-c`
    pub clamp: bool,
    /// `-k on|off`
    pub keyable: Option<bool>,
    /// `-l on|off`
    pub lock: Option<bool>,
    /// `-s N`
    pub size: Option<usize>,
}

impl SetAttrFlags {
    /// Apply the flags explicitly present on a later command.
    pub fn override_with(&mut self, other: &SetAttrFlags) {
        self.altered_value |= other.altered_value;
        self.clamp |= other.clamp;
        if other.caching.is_some() {
            self.caching = other.caching;
        }
        if other.capacity_hint.is_some() {
            self.capacity_hint = other.capacity_hint;
        }
        if other.channel_box.is_some() {
            self.channel_box = other.channel_box;
        }
        if other.keyable.is_some() {
            self.keyable = other.keyable;
        }
        if other.lock.is_some() {
            self.lock = other.lock;
        }
        if other.size.is_some() {
            self.size = other.size;
        }
    }
}

/// A `setAttr` record: one attribute and all values assigned to it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SetAttr {
    /// Attribute path as written (`.t`, `.uvst[0].uvsp`)
    pub path: String,
    /// Flags of the first command, overridden by each continuation
    pub flags: SetAttrFlags,
    pub attr_type: AttrType,
    pub values: Vec<AttrValue>,
    /// Source commands, in order; empty until a continuation is merged
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<SetAttrSegment>,
}

/// One command folded into a [`SetAttr`] record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SetAttrSegment {
    /// Path as written on this command (`.w[5]`)
    pub path: String,
    /// Flags written on this command only
    pub flags: SetAttrFlags,
    /// Number of entries this command added to `values`
    pub value_count: usize,
}

impl SetAttr {
    /// Build a fresh record from a parsed header and the full argument list.
    ///
    /// Returns the record with any lenient-decoding warnings.
    pub fn decode(header: SetAttrHeader, args: &[String]) -> DecodeResult<(SetAttr, Vec<String>)> {
        let decoded = decode_values(
            header.attr_type.unwrap_or(AttrType::Invalid),
            &args[header.value_start..],
            header.flags.size,
        )?;
        let record = SetAttr {
            path: header.path,
            flags: header.flags,
            attr_type: decoded.attr_type,
            values: decoded.values,
            segments: Vec::new(),
        };
        Ok((record, decoded.warnings))
    }
}

/// Everything in a `setAttr` before its values.
#[derive(Clone, Debug, PartialEq)]
pub struct SetAttrHeader {
    pub path: String,
    pub flags: SetAttrFlags,
    /// Type given with `-type`, if any
    pub attr_type: Option<AttrType>,
    /// Index into the arguments where values start
    pub value_start: usize,
}

impl SetAttrHeader {
    /// Parse flags, path and `-type` from `setAttr` arguments.
    pub fn parse(args: &[String]) -> DecodeResult<Self> {
        let mut reader = ArgReader::new(args, "setAttr");
        let mut path = None;
        let mut flags = SetAttrFlags::default();
        let mut attr_type = None;

        while let Some(token) = reader.peek() {
            match token {
                "-av" | "-alteredValue" => flags.altered_value = true,
                "-ca" | "-caching" => {
                    reader.advance();
                    flags.caching = Some(reader.flag_bool("-ca value")?);
                    continue;
                }
                "-ch" | "-capacityHint" => {
                    reader.advance();
                    flags.capacity_hint = Some(reader.number("-ch value")?);
                    continue;
                }
                "-cb" | "-channelBox" => {
                    reader.advance();
                    flags.channel_box = Some(reader.flag_bool("-cb value")?);
                    continue;
                }
                "-c" | "-clamp" => flags.clamp = true,
                "-k" | "-keyable" => {
                    reader.advance();
                    flags.keyable = Some(reader.flag_bool("-k value")?);
                    continue;
                }
                "-l" | "-lock" => {
                    reader.advance();
                    flags.lock = Some(reader.flag_bool("-l value")?);
                    continue;
                }
                "-s" | "-size" => {
                    reader.advance();
                    flags.size = Some(reader.number("-s value")?);
                    continue;
                }
                "-type" | "-typ" => {
                    reader.advance();
                    let name = reader.raw("-type value")?;
                    let (ty, extra) = AttrType::from_type_name(name, reader.peek())?;
                    for _ in 0..extra {
                        reader.advance();
                    }
                    attr_type = Some(ty);
                    continue;
                }
                _ if path.is_none() => path = Some(dequote(token).to_string()),
                _ => break,
            }
            reader.advance();
        }

        let path = path.ok_or(DecodeError::MissingArgument {
            command: "setAttr",
            what: "attribute path",
        })?;

        Ok(Self {
            path,
            flags,
            attr_type,
            value_start: reader.position(),
        })
    }
}

/// Decoded form of a command.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Statement {
    /// Empty command
    Empty,
    Comment(String),
    File(FileCommand),
    FileInfo(FileInfo),
    Workspace(Workspace),
    Requires(Requires),
    CurrentUnit(CurrentUnit),
    ConnectAttr(ConnectAttr),
    DisconnectAttr(DisconnectAttr),
    CreateNode(CreateNode),
    Rename(Rename),
    SetAttr(SetAttr),
    /// A `setAttr` whose values were folded into the record at this statement index
    SetAttrContinuation { record: usize },
    AddAttr(AddAttr),
    Select(Select),
    /// Unrecognized command, kept verbatim in its [`Command`]
    Unknown,
    /// Command that failed to decode; the error is collected separately
    Failed,
}

impl Statement {
    /// Decode a command on its own.
    ///
    /// `setAttr` is decoded without continuation context: the values are
    /// interpreted with the command's own `-type` (or inferred).
    pub fn decode(command: &Command) -> DecodeResult<Statement> {
        let args = command.args();
        let statement = match command.kind {
            CommandType::None => Statement::Empty,
            CommandType::Comment => {
                Statement::Comment(command.tokens.first().cloned().unwrap_or_default())
            }
            CommandType::File => Statement::File(decode_file(args)?),
            CommandType::FileInfo => {
                let mut reader = ArgReader::new(args, "fileInfo");
                Statement::FileInfo(FileInfo {
                    name: reader.string("name")?,
                    value: reader.string("value")?,
                })
            }
            CommandType::Workspace => Statement::Workspace(decode_workspace(args)?),
            CommandType::Requires => Statement::Requires(decode_requires(args)?),
            CommandType::CurrentUnit => Statement::CurrentUnit(decode_current_unit(args)?),
            CommandType::ConnectAttr => Statement::ConnectAttr(decode_connect_attr(args)?),
            CommandType::DisconnectAttr => {
                Statement::DisconnectAttr(decode_disconnect_attr(args)?)
            }
            CommandType::CreateNode => Statement::CreateNode(decode_create_node(args)?),
            CommandType::Rename => Statement::Rename(decode_rename(args)?),
            CommandType::SetAttr => {
                let header = SetAttrHeader::parse(args)?;
                let (record, _) = SetAttr::decode(header, args)?;
                Statement::SetAttr(record)
            }
            CommandType::AddAttr => Statement::AddAttr(decode_add_attr(args)?),
            CommandType::Select => Statement::Select(decode_select(args)),
            CommandType::Unknown => Statement::Unknown,
        };
        Ok(statement)
    }
}

/// Sequential reader over command arguments.
struct ArgReader<'a> {
    tokens: &'a [String],
    position: usize,
    command: &'static str,
}

impl<'a> ArgReader<'a> {
    fn new(tokens: &'a [String], command: &'static str) -> Self {
        Self {
            tokens,
            position: 0,
            command,
        }
    }

    fn position(&self) -> usize {
        self.position
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.position += 1;
        Some(token)
    }

    fn raw(&mut self, what: &'static str) -> DecodeResult<&'a str> {
        self.next().ok_or(DecodeError::MissingArgument {
            command: self.command,
            what,
        })
    }

    fn string(&mut self, what: &'static str) -> DecodeResult<String> {
        Ok(dequote(self.raw(what)?).to_string())
    }

    fn number<T: std::str::FromStr>(&mut self, what: &'static str) -> DecodeResult<T> {
        let token = self.raw(what)?;
        dequote(token)
            .parse()
            .map_err(|_| DecodeError::InvalidNumber(token.to_string()))
    }

    fn flag_bool(&mut self, what: &'static str) -> DecodeResult<bool> {
        let token = self.raw(what)?;
        parse_flag_bool(dequote(token)).ok_or_else(|| DecodeError::InvalidValue {
            expected: what,
            found: token.to_string(),
        })
    }

    /// An unmodeled flag, taking the next token as its argument unless it is a flag.
    fn extra_flag(&mut self, name: &str, keep_last: usize) -> Flag {
        let value = match self.peek() {
            Some(next)
                if !next.starts_with('-') && self.tokens.len() - self.position > keep_last =>
            {
                self.advance();
                Some(next.to_string())
            }
            _ => None,
        };
        Flag {
            name: name.to_string(),
            value,
        }
    }
}

/// Boolean flag arguments accept `on/off`, `yes/no`, `true/false` and `1/0`.
pub fn parse_flag_bool(token: &str) -> Option<bool> {
    match token {
        "1" => Some(true),
        "0" => Some(false),
        other => parse_bool(other),
    }
}

fn decode_file(args: &[String]) -> DecodeResult<FileCommand> {
    let Some((path, flags)) = args.split_last() else {
        return Err(DecodeError::MissingArgument {
            command: "file",
            what: "path",
        });
    };

    let mut file = FileCommand {
        path: dequote(path).to_string(),
        ..Default::default()
    };
    let mut reader = ArgReader::new(flags, "file");

    while let Some(flag) = reader.next() {
        match flag {
            "-r" | "-reference" => file.reference = true,
            "-rdi" | "-referenceDepthInfo" => {
                file.reference_depth_info = Some(reader.number("-rdi value")?)
            }
            "-ns" | "-namespace" => file.namespace = Some(reader.string("-ns value")?),
            "-dr" | "-deferReference" => {
                file.defer_reference = Some(reader.flag_bool("-dr value")?)
            }
            "-rfn" | "-referenceNode" => file.reference_node = Some(reader.string("-rfn value")?),
            "-op" | "-options" => file.options = Some(reader.string("-op value")?),
            "-typ" | "-type" => file.file_type = Some(reader.string("-typ value")?),
            other => {
                let flag = reader.extra_flag(other, 0);
                file.extra_flags.push(flag);
            }
        }
    }
    Ok(file)
}

fn decode_workspace(args: &[String]) -> DecodeResult<Workspace> {
    let mut reader = ArgReader::new(args, "workspace");
    while let Some(flag) = reader.next() {
        if flag == "-fr" || flag == "-fileRule" {
            return Ok(Workspace {
                rule: reader.string("rule")?,
                place: reader.string("place")?,
            });
        }
    }
    Err(DecodeError::MissingArgument {
        command: "workspace",
        what: "-fr",
    })
}

fn decode_requires(args: &[String]) -> DecodeResult<Requires> {
    let mut reader = ArgReader::new(args, "requires");
    let mut requires = Requires::default();
    let mut positional = Vec::new();

    while let Some(token) = reader.next() {
        match token {
            "-nodeType" | "-nt" => requires.node_types.push(reader.string("-nodeType value")?),
            "-dataType" | "-dt" => requires.data_types.push(reader.string("-dataType value")?),
            other => positional.push(dequote(other).to_string()),
        }
    }

    let mut positional = positional.into_iter();
    requires.plugin = positional.next().ok_or(DecodeError::MissingArgument {
        command: "requires",
        what: "plugin",
    })?;
    requires.version = positional.next().ok_or(DecodeError::MissingArgument {
        command: "requires",
        what: "version",
    })?;
    Ok(requires)
}

fn decode_current_unit(args: &[String]) -> DecodeResult<CurrentUnit> {
    let mut reader = ArgReader::new(args, "currentUnit");
    let mut unit = CurrentUnit::default();
    while let Some(flag) = reader.next() {
        match flag {
            "-l" | "-linear" => unit.linear = Some(reader.string("-l value")?),
            "-a" | "-angle" => unit.angle = Some(reader.string("-a value")?),
            "-t" | "-time" => unit.time = Some(reader.string("-t value")?),
            _ => {}
        }
    }
    Ok(unit)
}

fn two_plugs(plugs: Vec<String>, command: &'static str) -> DecodeResult<(Plug, Plug)> {
    let mut plugs = plugs.into_iter();
    let source = plugs.next().ok_or(DecodeError::MissingArgument {
        command,
        what: "source plug",
    })?;
    let destination = plugs.next().ok_or(DecodeError::MissingArgument {
        command,
        what: "destination plug",
    })?;
    Ok((Plug::parse(&source), Plug::parse(&destination)))
}

fn decode_connect_attr(args: &[String]) -> DecodeResult<ConnectAttr> {
    let mut reader = ArgReader::new(args, "connectAttr");
    let mut force = false;
    let mut lock = None;
    let mut next_available = false;
    let mut reference_dest = None;
    let mut plugs = Vec::new();

    while let Some(token) = reader.next() {
        match token {
            "-f" | "-force" => force = true,
            "-l" | "-lock" => lock = Some(reader.flag_bool("-l value")?),
            "-na" | "-nextAvailable" => next_available = true,
            "-rd" | "-referenceDest" => reference_dest = Some(reader.string("-rd value")?),
            other => plugs.push(dequote(other).to_string()),
        }
    }

    let (source, destination) = two_plugs(plugs, "connectAttr")?;
    Ok(ConnectAttr {
        source,
        destination,
        force,
        lock,
        next_available,
        reference_dest,
    })
}

fn decode_disconnect_attr(args: &[String]) -> DecodeResult<DisconnectAttr> {
    let mut next_available = false;
    let mut plugs = Vec::new();
    for token in args {
        match token.as_str() {
            "-na" | "-nextAvailable" => next_available = true,
            other => plugs.push(dequote(other).to_string()),
        }
    }
    let (source, destination) = two_plugs(plugs, "disconnectAttr")?;
    Ok(DisconnectAttr {
        source,
        destination,
        next_available,
    })
}

fn decode_create_node(args: &[String]) -> DecodeResult<CreateNode> {
    let mut reader = ArgReader::new(args, "createNode");
    let mut node = CreateNode {
        node_type: reader.string("node type")?,
        ..Default::default()
    };
    while let Some(flag) = reader.next() {
        match flag {
            "-n" | "-name" => node.name = Some(reader.string("-n value")?),
            "-p" | "-parent" => node.parent = Some(reader.string("-p value")?),
            "-s" | "-shared" => node.shared = true,
            "-ss" | "-skipSelect" => node.skip_select = true,
            _ => {}
        }
    }
    Ok(node)
}

fn decode_rename(args: &[String]) -> DecodeResult<Rename> {
    let mut rename = Rename::default();
    let mut names = Vec::new();
    for token in args {
        match token.as_str() {
            "-uid" | "-uuid" => rename.uid = true,
            "-is" | "-ignoreShape" => rename.ignore_shape = true,
            other => names.push(dequote(other).to_string()),
        }
    }
    rename.to = names.pop().ok_or(DecodeError::MissingArgument {
        command: "rename",
        what: "new name",
    })?;
    rename.from = names.pop();
    Ok(rename)
}

fn decode_add_attr(args: &[String]) -> DecodeResult<AddAttr> {
    let mut reader = ArgReader::new(args, "addAttr");
    let mut attr = AddAttr::default();

    while let Some(token) = reader.next() {
        if !token.starts_with('-') {
            attr.node = Some(dequote(token).to_string());
            continue;
        }

        let valued = matches!(
            token,
            "-ci" | "-sn" | "-ln" | "-nn" | "-at" | "-dt" | "-p" | "-min" | "-max" | "-smn"
                | "-smx" | "-dv" | "-nc" | "-en" | "-k" | "-h"
        );
        let flag = if valued {
            Flag {
                name: token.to_string(),
                value: Some(reader.raw(token_name(token))?.to_string()),
            }
        } else {
            reader.extra_flag(token, 0)
        };

        let text = flag.value.as_deref().map(dequote).map(str::to_string);
        match token {
            "-sn" => attr.short_name = text,
            "-ln" => attr.long_name = text,
            "-nn" => attr.nice_name = text,
            "-at" => attr.attribute_type = text,
            "-dt" => attr.data_type = text,
            "-p" => attr.parent = text,
            "-dv" => attr.default_value = parse_number(text.as_deref())?,
            "-min" => attr.min_value = parse_number(text.as_deref())?,
            "-max" => attr.max_value = parse_number(text.as_deref())?,
            _ => {}
        }
        attr.flags.push(flag);
    }
    Ok(attr)
}

fn token_name(flag: &str) -> &'static str {
    match flag {
        "-sn" => "-sn value",
        "-ln" => "-ln value",
        "-at" => "-at value",
        "-dt" => "-dt value",
        _ => "flag value",
    }
}

fn parse_number(text: Option<&str>) -> DecodeResult<Option<f64>> {
    text.map(|t| {
        t.parse::<f64>()
            .map_err(|_| DecodeError::InvalidNumber(t.to_string()))
    })
    .transpose()
}

fn decode_select(args: &[String]) -> Select {
    let mut select = Select::default();
    for token in args {
        if token.starts_with('-') {
            if token == "-ne" || token == "-noExpand" {
                select.no_expand = true;
            }
            select.flags.push(token.clone());
        } else {
            select.names.push(dequote(token).to_string());
        }
    }
    select
}
