//! Maya ASCII parse pass.
//!
//! Drives the line assembler, tokenizer and statement decoders over a whole
//! input in file order, folding `setAttr` continuations into the record they
//! continue. A command that fails to decode is recorded with its line number
//! and the pass moves on, unless [`ParseOptions::strict`] is set.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::Serialize;

use crate::command::{Command, CommandType};
use crate::error::{CommandError, DecodeResult, ParseResult};
use crate::ma::assembler::LineAssembler;
use crate::ma::merge::{continue_set_attr, is_same_attr};
use crate::ma::statement::{
    ConnectAttr, CreateNode, FileCommand, Requires, SetAttr, SetAttrHeader, Statement,
};
use crate::options::ParseOptions;

/// A lenient-decoding warning (e.g. an out-of-range enum code that was
/// replaced by its default).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub line: usize,
    pub message: String,
}

/// Result of a parse pass.
///
/// `commands` and `statements` are parallel: `statements[i]` is the decoded
/// form of `commands[i]`.
#[derive(Debug, Default, Serialize)]
pub struct Document {
    pub commands: Vec<Command>,
    pub statements: Vec<Statement>,
    #[serde(skip)]
    pub errors: Vec<CommandError>,
    pub warnings: Vec<Warning>,
}

impl Document {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands paired with their decoded form.
    pub fn iter(&self) -> impl Iterator<Item = (&Command, &Statement)> {
        self.commands.iter().zip(self.statements.iter())
    }

    /// `setAttr` records with continuations already folded in.
    pub fn set_attrs(&self) -> impl Iterator<Item = &SetAttr> {
        self.statements.iter().filter_map(|s| match s {
            Statement::SetAttr(record) => Some(record),
            _ => None,
        })
    }

    pub fn create_nodes(&self) -> impl Iterator<Item = &CreateNode> {
        self.statements.iter().filter_map(|s| match s {
            Statement::CreateNode(node) => Some(node),
            _ => None,
        })
    }

    pub fn connections(&self) -> impl Iterator<Item = &ConnectAttr> {
        self.statements.iter().filter_map(|s| match s {
            Statement::ConnectAttr(connect) => Some(connect),
            _ => None,
        })
    }

    /// `file` commands (references and their loads).
    pub fn files(&self) -> impl Iterator<Item = &FileCommand> {
        self.statements.iter().filter_map(|s| match s {
            Statement::File(file) => Some(file),
            _ => None,
        })
    }

    pub fn requires(&self) -> impl Iterator<Item = &Requires> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Requires(requires) => Some(requires),
            _ => None,
        })
    }

    /// Each created node with the `setAttr` records that follow it.
    ///
    /// A `select` switches the target to an existing node, so records after
    /// it are not attributed to the last created one.
    pub fn node_attrs(&self) -> Vec<(&CreateNode, Vec<&SetAttr>)> {
        let mut nodes: Vec<(&CreateNode, Vec<&SetAttr>)> = Vec::new();
        let mut selected = false;
        for statement in &self.statements {
            match statement {
                Statement::CreateNode(node) => {
                    nodes.push((node, Vec::new()));
                    selected = false;
                }
                Statement::Select(_) => selected = true,
                Statement::SetAttr(record) if !selected => {
                    if let Some((_, attrs)) = nodes.last_mut() {
                        attrs.push(record);
                    }
                }
                _ => {}
            }
        }
        nodes
    }

    /// Write the commands back exactly as they were read, one unit per line
    /// group.
    pub fn write_mel<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for command in &self.commands {
            writeln!(writer, "{}", command.raw)?;
        }
        Ok(())
    }

    /// Write the decoded statements as MEL.
    ///
    /// A merged record writes one command per source segment in place of
    /// the first; unknown and failed commands are written from their raw
    /// text.
    pub fn write_decoded<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (command, statement) in self.iter() {
            match statement {
                Statement::SetAttrContinuation { .. } => {}
                Statement::Unknown | Statement::Failed => writeln!(writer, "{}", command.raw)?,
                other => {
                    if let Some(text) = other.to_mel() {
                        writeln!(writer, "{}", text)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Streaming Maya ASCII parser.
pub struct MayaAsciiParser<R> {
    assembler: LineAssembler<R>,
    options: ParseOptions,
    document: Document,
    /// Statement index of the record a following `setAttr` may continue
    open_record: Option<usize>,
}

impl<R: BufRead> MayaAsciiParser<R> {
    pub fn new(reader: R, options: ParseOptions) -> Self {
        Self {
            assembler: LineAssembler::new(reader),
            options,
            document: Document::default(),
            open_record: None,
        }
    }

    /// Run the pass to the end of input.
    pub fn parse(mut self) -> ParseResult<Document> {
        while let Some(raw) = self.assembler.next_command()? {
            let (command, result) = match Command::parse(raw.text.as_str(), raw.line) {
                Ok(command) => {
                    let result = self.decode(&command);
                    (command, result)
                }
                Err(err) => (Command::untokenized(raw.text, raw.line), Err(err)),
            };

            if command.kind == CommandType::Comment && !self.options.keep_comments {
                continue;
            }

            let statement = match result {
                Ok(statement) => statement,
                Err(source) => {
                    let error = CommandError {
                        line: command.line,
                        kind: command.kind,
                        source,
                    };
                    if self.options.strict {
                        return Err(error.into());
                    }
                    log::warn!("Skipping command: {}", error);
                    self.document.errors.push(error);
                    Statement::Failed
                }
            };

            self.track_open_record(command.kind, &statement);
            self.document.commands.push(command);
            self.document.statements.push(statement);
        }

        log::info!(
            "Parsed {} commands ({} errors, {} warnings)",
            self.document.len(),
            self.document.errors.len(),
            self.document.warnings.len()
        );
        Ok(self.document)
    }

    fn decode(&mut self, command: &Command) -> DecodeResult<Statement> {
        if command.kind != CommandType::SetAttr {
            return Statement::decode(command);
        }

        let args = command.args();
        let header = SetAttrHeader::parse(args)?;

        if self.options.merge_continuations {
            if let Some(index) = self.open_record {
                if let Some(Statement::SetAttr(record)) = self.document.statements.get_mut(index) {
                    if is_same_attr(&record.path, &header.path) {
                        let warnings = continue_set_attr(record, header, args)?;
                        self.add_warnings(command.line, warnings);
                        return Ok(Statement::SetAttrContinuation { record: index });
                    }
                }
            }
        }

        let (record, warnings) = SetAttr::decode(header, args)?;
        self.add_warnings(command.line, warnings);
        Ok(Statement::SetAttr(record))
    }

    /// A new record opens on every decoded `setAttr`; node-level commands
    /// close it.
    fn track_open_record(&mut self, kind: CommandType, statement: &Statement) {
        match (kind, statement) {
            (_, Statement::SetAttr(_)) => self.open_record = Some(self.document.statements.len()),
            (
                CommandType::SetAttr
                | CommandType::AddAttr
                | CommandType::Rename
                | CommandType::Comment
                | CommandType::None,
                _,
            ) => {}
            _ => self.open_record = None,
        }
    }

    fn add_warnings(&mut self, line: usize, messages: Vec<String>) {
        self.document
            .warnings
            .extend(messages.into_iter().map(|message| Warning { line, message }));
    }
}

/// Parse Maya ASCII from a buffered reader with default options.
pub fn parse_reader<R: BufRead>(reader: R) -> ParseResult<Document> {
    parse_reader_with(reader, ParseOptions::default())
}

pub fn parse_reader_with<R: BufRead>(reader: R, options: ParseOptions) -> ParseResult<Document> {
    MayaAsciiParser::new(reader, options).parse()
}

/// Parse Maya ASCII text with default options.
pub fn parse_str(content: &str) -> ParseResult<Document> {
    parse_str_with(content, ParseOptions::default())
}

pub fn parse_str_with(content: &str, options: ParseOptions) -> ParseResult<Document> {
    parse_reader_with(content.as_bytes(), options)
}

/// Open and parse a `.ma` file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<Document> {
    let path = path.as_ref();
    log::info!("Loading {}", path.display());
    let file = File::open(path)?;
    parse_reader(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, ParseError};
    use crate::ma::types::AttrType;
    use crate::ma::value::AttrValue;
    use mascii_math::DVec3;

    const SCENE: &str = r#"//Maya ASCII 2020 scene
//Name: box.ma
requires maya "2020";
requires -nodeType "bifrostGraphShape" "bifrostGraph" "2.2.0";
currentUnit -l centimeter -a degree -t film;
fileInfo "application" "maya";
file -rdi 1 -ns "char" -rfn "charRN" -op "v=0;" -typ "mayaAscii" "scenes/char.ma";
file -r -ns "char" -dr 1 -rfn "charRN" -op "v=0;" -typ "mayaAscii" "scenes/char.ma";
createNode transform -n "box";
	rename -uid "0D5B1A80-4C2A-11E9-A8F2-0800200C9A66";
	setAttr ".t" -type "double3" 0 1.5 0 ;
createNode mesh -n "boxShape" -p "box";
	setAttr -k off ".v";
	setAttr -s 4 ".uvst[0].uvsp[0:1]" -type "float2" 0 0 1 0;
	setAttr ".uvst[0].uvsp[2:3]" 1 1 0 1;
	setAttr ".cuvs" -type "string" "map1";
/* block comment; with a semicolon
   spanning lines */
createNode lightLinker -s -n "lightLinker1";
	setAttr -s 2 ".lnk";
select -ne :time1;
	setAttr ".o" 1;
connectAttr "boxShape.iog" ":initialShadingGroup.dsm" -na;
lockNode -l 1 ;
// End of box.ma
"#;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_parse_scene() {
        init_logger();
        let doc = parse_str(SCENE).unwrap();

        assert_eq!(doc.len(), 24);
        assert_eq!(doc.commands.len(), doc.statements.len());
        assert!(doc.errors.is_empty(), "{:?}", doc.errors);

        assert_eq!(doc.commands[0].kind, CommandType::Comment);
        assert_eq!(doc.requires().count(), 2);
        assert_eq!(doc.files().count(), 2);
        assert_eq!(doc.create_nodes().count(), 3);
        assert_eq!(doc.connections().count(), 1);

        let lock = &doc.commands[22];
        assert_eq!(lock.kind, CommandType::Unknown);
        assert_eq!(lock.line, 24);
        assert_eq!(doc.statements[22], Statement::Unknown);
    }

    #[test]
    fn test_block_comment_is_one_command() {
        let doc = parse_str(SCENE).unwrap();
        let comment = &doc.commands[16];
        assert_eq!(comment.kind, CommandType::Comment);
        assert_eq!(comment.line, 17);
        assert!(comment.raw.ends_with("spanning lines */"));
        assert_eq!(doc.commands[17].kind, CommandType::CreateNode);
        assert_eq!(doc.commands[17].line, 19);
    }

    #[test]
    fn test_continuation_folded_into_record() {
        let doc = parse_str(SCENE).unwrap();
        assert_eq!(
            doc.statements[14],
            Statement::SetAttrContinuation { record: 13 }
        );

        let record = match &doc.statements[13] {
            Statement::SetAttr(record) => record,
            other => panic!("Expected SetAttr, got {:?}", other),
        };
        assert_eq!(record.attr_type, AttrType::Float2);
        assert_eq!(record.values.len(), 4);
        assert_eq!(record.flags.size, Some(4));
    }

    #[test]
    fn test_node_attrs() {
        let doc = parse_str(SCENE).unwrap();
        let nodes = doc.node_attrs();
        assert_eq!(nodes.len(), 3);

        let (box_node, attrs) = &nodes[0];
        assert_eq!(box_node.name.as_deref(), Some("box"));
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].values, vec![AttrValue::Double3(DVec3::new(0.0, 1.5, 0.0))]);

        let (shape, attrs) = &nodes[1];
        assert_eq!(shape.parent.as_deref(), Some("box"));
        let paths: Vec<&str> = attrs.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec![".v", ".uvst[0].uvsp[0:1]", ".cuvs"]);

        // `.o` follows `select` and belongs to time1
        assert_eq!(nodes[2].1.len(), 1);
    }

    #[test]
    fn test_select_closes_open_record() {
        let doc = parse_str(
            "createNode a -n \"n\";\n\tsetAttr \".w\" 1;\nselect -ne :time1;\n\tsetAttr \".w\" 2;\n",
        )
        .unwrap();
        assert!(matches!(doc.statements[3], Statement::SetAttr(_)));
        assert_eq!(doc.set_attrs().count(), 2);
    }

    #[test]
    fn test_errors_are_collected() {
        init_logger();
        let doc = parse_str(
            "createNode transform -n \"a\";\n\tsetAttr \".t\" -type \"double3\" 1 2;\n\tsetAttr \".r\" -type \"bogus\" 1;\nconnectAttr \"a.t\" \"b.t\";\n",
        )
        .unwrap();

        assert_eq!(doc.len(), 4);
        assert_eq!(doc.errors.len(), 2);
        assert_eq!(doc.errors[0].line, 2);
        assert_eq!(doc.errors[0].kind, CommandType::SetAttr);
        assert!(matches!(
            doc.errors[0].source,
            DecodeError::TruncatedRecord {
                attr_type: AttrType::Double3,
                ..
            }
        ));
        assert_eq!(
            doc.errors[1].source,
            DecodeError::UnknownAttrType("bogus".to_string())
        );
        assert_eq!(doc.statements[1], Statement::Failed);
        assert_eq!(doc.connections().count(), 1);
    }

    #[test]
    fn test_lex_error_keeps_command() {
        let doc = parse_str("setAttr \".s\" -type \"string\" \"open;\nsetAttr \".x\" 1;\n").unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.errors.len(), 1);
        assert_eq!(doc.commands[0].kind, CommandType::SetAttr);
        assert!(matches!(doc.errors[0].source, DecodeError::Lex { .. }));
        assert!(matches!(doc.statements[1], Statement::SetAttr(_)));
    }

    #[test]
    fn test_strict_mode_aborts() {
        let result = parse_str_with(
            "createNode transform;\nsetAttr \".t\" -type \"double3\" 1;\n",
            ParseOptions::strict(),
        );
        match result {
            Err(ParseError::Command { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected command error, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_input() {
        let result = parse_str("createNode transform;\nsetAttr \".t\" 1\n");
        match result {
            Err(ParseError::Unterminated { line }) => assert_eq!(line, 2),
            other => panic!("Expected unterminated error, got {:?}", other),
        }
    }

    #[test]
    fn test_options_disable_merge_and_comments() {
        let options = ParseOptions {
            merge_continuations: false,
            keep_comments: false,
            ..Default::default()
        };
        let doc = parse_str_with(SCENE, options).unwrap();

        assert!(doc.commands.iter().all(|c| c.kind != CommandType::Comment));
        assert!(!doc
            .statements
            .iter()
            .any(|s| matches!(s, Statement::SetAttrContinuation { .. })));

        // Without merging the second half of the uv list is inferred as ints
        let uvs: Vec<&SetAttr> = doc
            .set_attrs()
            .filter(|r| r.path.starts_with(".uvst"))
            .collect();
        assert_eq!(uvs.len(), 2);
        assert_eq!(uvs[1].attr_type, AttrType::Int);
    }

    #[test]
    fn test_warnings_recorded_with_line() {
        let doc = parse_str(
            "createNode nurbsCurve;\n\tsetAttr \".cc\" -type \"nurbsCurve\" 1 1 7 no 3 2 0 1 2 0 0 0 1 0 0;\n",
        )
        .unwrap();
        assert!(doc.errors.is_empty());
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].line, 2);
    }

    #[test]
    fn test_write_mel_reproduces_input() {
        let doc = parse_str(SCENE).unwrap();
        let mut out = Vec::new();
        doc.write_mel(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), SCENE);
    }

    #[test]
    fn test_write_decoded_reparses() {
        let doc = parse_str(SCENE).unwrap();
        let mut out = Vec::new();
        doc.write_decoded(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let again = parse_str(&text).unwrap();
        assert!(again.errors.is_empty(), "{:?}", again.errors);
        assert_eq!(
            again.set_attrs().collect::<Vec<_>>(),
            doc.set_attrs().collect::<Vec<_>>()
        );
        assert_eq!(
            again.create_nodes().collect::<Vec<_>>(),
            doc.create_nodes().collect::<Vec<_>>()
        );
        assert_eq!(again.len(), doc.len());
    }

    #[test]
    fn test_write_decoded_keeps_sparse_continuations() {
        let doc = parse_str("createNode a;\n\tsetAttr \".w[0]\" 1;\n\tsetAttr \".w[5]\" 2;\n").unwrap();
        let mut out = Vec::new();
        doc.write_decoded(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text, "createNode a;\nsetAttr \".w[0]\" 1;\nsetAttr \".w[5]\" 2;\n");
        let again = parse_str(&text).unwrap();
        assert_eq!(
            again.set_attrs().collect::<Vec<_>>(),
            doc.set_attrs().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_write_decoded_keeps_mesh_tokens() {
        let line = "setAttr \".o\" -type \"mesh\" v 3 0 0 0 1 0 0 0 1 0 e 3 0 1 \"hard\";";
        let doc = parse_str(&format!("createNode mesh;\n\t{}\n", line)).unwrap();
        assert!(doc.errors.is_empty(), "{:?}", doc.errors);

        let mut out = Vec::new();
        doc.write_decoded(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("createNode mesh;\n{}\n", line)
        );
    }

    #[test]
    fn test_huge_counts_are_command_errors() {
        init_logger();
        let doc = parse_str(concat!(
            "createNode a;\n",
            "\tsetAttr \".p\" -type \"pointArray\" 4611686018427387904 0;\n",
            "\tsetAttr \".cc\" -type \"nurbsSurface\" 1 1 0 0 yes 0 0 4611686018427387904 0;\n",
            "\tsetAttr \".ed\" -type \"dataReferenceEdits\" \"RN\" \"RN\" 100000000000000000 8 \"|a\" \"tx\";\n",
            "\tsetAttr \".v\" 1;\n",
        ))
        .unwrap();

        assert_eq!(doc.len(), 5);
        assert_eq!(doc.errors.len(), 3);
        for error in &doc.errors {
            assert!(
                matches!(error.source, DecodeError::TruncatedRecord { .. }),
                "{:?}",
                error
            );
        }
        assert!(matches!(doc.statements[4], Statement::SetAttr(_)));
    }

    #[test]
    fn test_parse_reader() {
        let doc = parse_reader(std::io::Cursor::new(SCENE.as_bytes())).unwrap();
        assert_eq!(doc.len(), 24);
    }
}
