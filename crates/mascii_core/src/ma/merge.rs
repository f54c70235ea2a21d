//! `setAttr` continuation merging.
//!
//! Maya splits large attribute assignments over several commands:
//!
//! ```text
//! setAttr -s 4 ".uvst[0].uvsp[0:1]" -type "float2" 0 0 1 0;
//! setAttr ".uvst[0].uvsp[2:3]" 1 1 0 1;
//! ```
//!
//! The second command has no `-type` and relies on the first. A new
//! `setAttr` continues the previous record when it names the same
//! attribute; flags and type are inherited, then overridden by whatever
//! the new command states explicitly.

use crate::error::{DecodeError, DecodeResult};
use crate::ma::decode::decode_values;
use crate::ma::statement::{SetAttr, SetAttrHeader, SetAttrSegment};
use crate::ma::types::AttrType;
use crate::ma::value::AttrValue;

/// Root of the reference placeholder list. Its elements are distinct
/// connections and never fold into each other.
const PLACEHOLDER_ROOT: &str = ".phl";

/// Remove one trailing `[...]` index or range.
///
/// `.a[0].b[0:499]` becomes `.a[0].b`; a path without a trailing bracket is
/// returned unchanged.
pub fn strip_trailing_index(path: &str) -> &str {
    if !path.ends_with(']') {
        return path;
    }
    match path.rfind('[') {
        Some(open) => &path[..open],
        None => path,
    }
}

/// True for `.phl` and its elements (`.phl[3]`).
pub fn is_placeholder_path(path: &str) -> bool {
    match path.strip_prefix(PLACEHOLDER_ROOT) {
        Some(rest) => rest.is_empty() || rest.starts_with('['),
        None => false,
    }
}

/// Whether `incoming` continues the record written to `previous`.
///
/// Paths match when they are equal once a trailing index or range is
/// removed from each: `.a` and `.a[3]`, `.uvsp[0:1]` and `.uvsp[2:3]`.
pub fn is_same_attr(previous: &str, incoming: &str) -> bool {
    if previous == incoming {
        return true;
    }
    if is_placeholder_path(previous) || is_placeholder_path(incoming) {
        return false;
    }
    strip_trailing_index(previous) == strip_trailing_index(incoming)
}

/// Fold a continuation command into `record`.
///
/// The value tokens are decoded with the record's type unless the command
/// gives its own `-type`, and with the size declared by either command.
/// Each merged command is kept as a segment so it can be written back on
/// its own. The record is left untouched when decoding or reconciling fails.
pub fn continue_set_attr(
    record: &mut SetAttr,
    header: SetAttrHeader,
    args: &[String],
) -> DecodeResult<Vec<String>> {
    let mut flags = record.flags.clone();
    flags.override_with(&header.flags);

    let attr_type = header.attr_type.unwrap_or(record.attr_type);
    let decoded = decode_values(attr_type, &args[header.value_start..], flags.size)?;

    let before = record.values.len();
    append_values(record, decoded.attr_type, decoded.values)?;

    if record.segments.is_empty() {
        record.segments.push(SetAttrSegment {
            path: record.path.clone(),
            flags: record.flags.clone(),
            value_count: before,
        });
    }
    record.segments.push(SetAttrSegment {
        path: header.path.clone(),
        flags: header.flags,
        value_count: record.values.len() - before,
    });
    record.flags = flags;

    log::debug!(
        "Merged {} into {} ({} values)",
        header.path,
        record.path,
        record.values.len()
    );
    Ok(decoded.warnings)
}

/// Append decoded values to a record, reconciling the two types.
///
/// - an empty record adopts the incoming type
/// - an empty untyped continuation changes nothing
/// - `Int` records widen to `Double` when doubles arrive, and incoming
///   ints widen when the record already holds doubles
/// - `dataPolyComponent` maps of the same kind are unioned
pub fn append_values(
    record: &mut SetAttr,
    incoming: AttrType,
    values: Vec<AttrValue>,
) -> DecodeResult<()> {
    if incoming == AttrType::Invalid && values.is_empty() {
        return Ok(());
    }

    match (record.attr_type, incoming) {
        (AttrType::Invalid, _) => {
            record.attr_type = incoming;
            record.values.extend(values);
        }
        (AttrType::DataPolyComponent, AttrType::DataPolyComponent) => {
            for value in values {
                union_component(&mut record.values, value);
            }
        }
        (existing, incoming) if existing == incoming => record.values.extend(values),
        (AttrType::Int, AttrType::Double) => {
            for value in record.values.iter_mut() {
                if let AttrValue::Int(v) = *value {
                    *value = AttrValue::Double(v as f64);
                }
            }
            record.attr_type = AttrType::Double;
            record.values.extend(values);
        }
        (AttrType::Double, AttrType::Int) => {
            record
                .values
                .extend(values.into_iter().map(AttrValue::widened));
        }
        (existing, incoming) => {
            return Err(DecodeError::AttrTypeMismatch {
                path: record.path.clone(),
                existing,
                incoming,
            })
        }
    }
    Ok(())
}

/// Union a component map into the last stored map of the same kind, or
/// append it as a new value.
fn union_component(values: &mut Vec<AttrValue>, value: AttrValue) {
    let AttrValue::DataPolyComponent(incoming) = value else {
        values.push(value);
        return;
    };

    let target = values.iter_mut().rev().find_map(|v| match v {
        AttrValue::DataPolyComponent(existing) if existing.kind == incoming.kind => Some(existing),
        _ => None,
    });

    match target {
        Some(existing) => existing.values.extend(incoming.values),
        None => values.push(AttrValue::DataPolyComponent(incoming)),
    }
}
