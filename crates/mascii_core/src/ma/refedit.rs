//! `dataReferenceEdits` sub-parser.
//!
//! The value is a nested opcode stream rather than MEL:
//!
//! ```text
//! "rootRN"
//! "childRN" <count>
//!     <opcode> <operands...>    (count records)
//! "otherRN" <count>
//!     ...
//! ```
//!
//! | opcode | record |
//! |---|---|
//! | 0 | parent: node, parent, args |
//! | 1 | addAttr: node, long name, short name, args |
//! | 2 | setAttr: node, attr, args |
//! | 3 | disconnectAttr: source plug, destination plug, args |
//! | 4 | deleteAttr: node, attr, args |
//! | 5 | connectAttr: magic, ref node, source, destination, [placeholders if magic == 0], args |
//! | 7 | relationship: type, node, count, commands..., 0 |
//! | 8 | lock: node, attr |
//! | 9 | unlock: node, attr |

use crate::error::{DecodeError, DecodeResult};
use crate::ma::cursor::Cursor;
use crate::ma::tokenizer::dequote;
use crate::ma::types::AttrType;
use crate::ma::value::{EditCommand, ReferenceEdit, ReferenceEdits};

const TYPE: AttrType = AttrType::DataReferenceEdits;

/// Decode a whole reference edit stream, consuming every remaining token.
pub fn decode_reference_edits(cursor: &mut Cursor) -> DecodeResult<ReferenceEdits> {
    let reference_node = cursor.string(TYPE)?;
    let mut edits = Vec::new();

    while !cursor.is_empty() {
        let node = cursor.string(TYPE)?;
        let mut remaining = cursor.count(TYPE)?;
        // Every record takes at least one token
        let mut commands = Vec::with_capacity(remaining.min(cursor.remaining()));

        while remaining > 0 {
            commands.push(decode_edit_command(cursor)?);
            remaining -= 1;
        }

        log::trace!("Reference edits for {}: {} records", node, commands.len());
        edits.push(ReferenceEdit {
            reference_node: node,
            commands,
        });
    }

    Ok(ReferenceEdits {
        reference_node,
        edits,
    })
}

/// Decode one opcode record.
fn decode_edit_command(cursor: &mut Cursor) -> DecodeResult<EditCommand> {
    let position = cursor.position();
    let opcode = cursor.token(TYPE)?;

    let command = match dequote(opcode) {
        "0" => EditCommand::Parent {
            node: cursor.string(TYPE)?,
            parent: cursor.string(TYPE)?,
            args: cursor.string(TYPE)?,
        },
        "1" => EditCommand::AddAttr {
            node: cursor.string(TYPE)?,
            long_attr: cursor.string(TYPE)?,
            short_attr: cursor.string(TYPE)?,
            args: cursor.string(TYPE)?,
        },
        "2" => EditCommand::SetAttr {
            node: cursor.string(TYPE)?,
            attr: cursor.string(TYPE)?,
            args: cursor.string(TYPE)?,
        },
        "3" => EditCommand::DisconnectAttr {
            source_plug: cursor.string(TYPE)?,
            dest_plug: cursor.string(TYPE)?,
            args: cursor.string(TYPE)?,
        },
        "4" => EditCommand::DeleteAttr {
            node: cursor.string(TYPE)?,
            attr: cursor.string(TYPE)?,
            args: cursor.string(TYPE)?,
        },
        "5" => {
            let magic = cursor.int(TYPE)?;
            let reference_node = cursor.string(TYPE)?;
            let source_plug = cursor.string(TYPE)?;
            let dest_plug = cursor.string(TYPE)?;
            let placeholders = if magic == 0 {
                Some((cursor.string(TYPE)?, cursor.string(TYPE)?))
            } else {
                None
            };
            EditCommand::ConnectAttr {
                magic,
                reference_node,
                source_plug,
                dest_plug,
                placeholders,
                args: cursor.string(TYPE)?,
            }
        }
        "7" => {
            let relationship_type = cursor.string(TYPE)?;
            let node = cursor.string(TYPE)?;
            let count = cursor.count(TYPE)?;
            cursor.require(TYPE, count.saturating_add(1))?;
            let commands = (0..count)
                .map(|_| cursor.string(TYPE))
                .collect::<DecodeResult<Vec<_>>>()?;
            let terminator = cursor.token(TYPE)?;
            if terminator != "0" {
                return Err(DecodeError::InvalidValue {
                    expected: "relationship terminator 0",
                    found: terminator.to_string(),
                });
            }
            EditCommand::Relationship {
                relationship_type,
                node,
                commands,
            }
        }
        "8" => EditCommand::Lock {
            node: cursor.string(TYPE)?,
            attr: cursor.string(TYPE)?,
        },
        "9" => EditCommand::Unlock {
            node: cursor.string(TYPE)?,
            attr: cursor.string(TYPE)?,
        },
        _ => {
            return Err(DecodeError::ReferenceEdit {
                opcode: opcode.to_string(),
                position,
            })
        }
    };

    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ma::tokenizer::tokenize;

    fn decode(text: &str) -> DecodeResult<ReferenceEdits> {
        let tokens = tokenize(text).unwrap();
        let mut cursor = Cursor::new(&tokens);
        decode_reference_edits(&mut cursor)
    }

    #[test]
    fn test_header_counts() {
        let edits = decode(
            r#""charRN"
            "charRN" 3
            2 "|char:root" "visibility" " 0"
            0 "|char:grp" "|world" "-s -r "
            5 4 "charRN" "|char:a.tx" "charRN.placeHolderList[1]" ""
            "char:propRN" 1
            8 "|char:prop" "translateX";"#,
        )
        .unwrap();

        assert_eq!(edits.reference_node, "charRN");
        assert_eq!(edits.edits.len(), 2);
        assert_eq!(edits.edits[0].commands.len(), 3);
        assert_eq!(edits.edits[1].reference_node, "char:propRN");
        assert_eq!(edits.edits[1].commands.len(), 1);
        assert_eq!(
            edits.edits[0].commands[0],
            EditCommand::SetAttr {
                node: "|char:root".to_string(),
                attr: "visibility".to_string(),
                args: " 0".to_string(),
            }
        );
        match &edits.edits[0].commands[2] {
            EditCommand::ConnectAttr {
                magic, placeholders, ..
            } => {
                assert_eq!(*magic, 4);
                assert!(placeholders.is_none());
            }
            other => panic!("Expected ConnectAttr, got {:?}", other),
        }
    }

    #[test]
    fn test_connect_with_placeholders() {
        let edits = decode(
            r#""RN" "RN" 1 5 0 "RN" "a.b" "c.d" "RN.placeHolderList[1]" "RN.placeHolderList[2]" "";"#,
        )
        .unwrap();
        match &edits.edits[0].commands[0] {
            EditCommand::ConnectAttr { placeholders, .. } => assert_eq!(
                placeholders.as_ref().unwrap(),
                &(
                    "RN.placeHolderList[1]".to_string(),
                    "RN.placeHolderList[2]".to_string()
                )
            ),
            other => panic!("Expected ConnectAttr, got {:?}", other),
        }
    }

    #[test]
    fn test_relationship() {
        let edits = decode(
            r#""RN" "RN" 2 7 "ignore" ":lightLinker1" 2 "|a.iog" ":set.message" 0 9 "|a" "tx";"#,
        )
        .unwrap();
        let edit = &edits.edits[0];
        assert_eq!(edit.relationships().count(), 1);
        assert_eq!(edit.locks().count(), 1);
        match &edit.commands[0] {
            EditCommand::Relationship { commands, .. } => assert_eq!(commands.len(), 2),
            other => panic!("Expected Relationship, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_count_header() {
        let edits = decode(r#""RN" "RN" 0 "subRN" 1 4 "|n" "extra" "";"#).unwrap();
        assert_eq!(edits.edits.len(), 2);
        assert!(edits.edits[0].commands.is_empty());
        assert_eq!(edits.edits[1].delete_attrs().count(), 1);
    }

    #[test]
    fn test_unknown_opcode_is_structural_error() {
        let result = decode(r#""RN" "RN" 2 8 "|a" "tx" 6 "|a" "ty";"#);
        assert_eq!(
            result,
            Err(DecodeError::ReferenceEdit {
                opcode: "6".to_string(),
                position: 6,
            })
        );
    }

    #[test]
    fn test_declared_count_exceeds_records() {
        let result = decode(r#""RN" "RN" 2 8 "|a" "tx";"#);
        assert!(matches!(
            result,
            Err(DecodeError::TruncatedRecord {
                attr_type: AttrType::DataReferenceEdits,
                ..
            })
        ));
    }

    #[test]
    fn test_huge_counts_are_truncated() {
        for text in [
            r#""RN" "RN" 100000000000000000 8 "|a" "tx";"#,
            r#""RN" "RN" 1 7 "ignore" ":lightLinker1" 18446744073709551615 "|a.iog" 0;"#,
        ] {
            assert!(matches!(
                decode(text),
                Err(DecodeError::TruncatedRecord {
                    attr_type: AttrType::DataReferenceEdits,
                    ..
                })
            ));
        }
    }
}
