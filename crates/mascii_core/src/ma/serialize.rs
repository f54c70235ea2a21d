//! MEL text generation.
//!
//! Every decoded value and statement can be written back as MEL that the
//! decoder reads to the same structure. Conventions:
//!
//! - floats use the shortest text that parses back to the same value,
//!   switching to exponent form for very small or very large magnitudes
//! - option flags are written `on`/`off`, boolean values `yes`/`no`
//! - a `file` command longer than [`FILE_LINE_LIMIT`] columns breaks before
//!   its path

use crate::ma::statement::{
    AddAttr, ConnectAttr, CreateNode, CurrentUnit, DisconnectAttr, FileCommand, Rename, Requires,
    Select, SetAttr, SetAttrFlags, Statement,
};
use crate::ma::tokenizer::quote;
use crate::ma::types::AttrType;
use crate::ma::value::*;

/// Column budget of a generated `file` command before its path wraps.
pub const FILE_LINE_LIMIT: usize = 160;

/// Shortest round-trippable decimal text for `v`.
pub fn format_float(v: f64) -> String {
    let magnitude = v.abs();
    if v.is_finite() && magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        format!("{:e}", v)
    } else {
        format!("{}", v)
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn floats(out: &mut Vec<String>, values: &[f64]) {
    out.extend(values.iter().map(|v| format_float(*v)));
}

fn counted_floats(out: &mut Vec<String>, values: &[f64]) {
    out.push(values.len().to_string());
    floats(out, values);
}

fn counted_ints(out: &mut Vec<String>, values: &[i64]) {
    out.push(values.len().to_string());
    out.extend(values.iter().map(i64::to_string));
}

fn counted_strings(out: &mut Vec<String>, values: &[String]) {
    out.push(values.len().to_string());
    out.extend(values.iter().map(|s| quote(s)));
}

fn cv_tokens(out: &mut Vec<String>, cvs: &[CvValue]) {
    out.push(cvs.len().to_string());
    for cv in cvs {
        out.push(format_float(cv.x));
        out.push(format_float(cv.y));
        if let Some(z) = cv.z {
            out.push(format_float(z));
        }
        if let Some(w) = cv.w {
            out.push(format_float(w));
        }
    }
}

impl AttrValue {
    /// Append the value tokens of this value.
    pub fn write_tokens(&self, out: &mut Vec<String>) {
        match self {
            AttrValue::Bool(v) => out.push(yes_no(*v).to_string()),
            AttrValue::Int(v) => out.push(v.to_string()),
            AttrValue::Double(v) | AttrValue::Sphere(v) => out.push(format_float(*v)),
            AttrValue::Short2(v) => out.extend(v.to_array().iter().map(i16::to_string)),
            AttrValue::Short3(v) => out.extend(v.to_array().iter().map(i16::to_string)),
            AttrValue::Long2(v) => out.extend(v.to_array().iter().map(i32::to_string)),
            AttrValue::Long3(v) => out.extend(v.to_array().iter().map(i32::to_string)),
            AttrValue::Int32Array(items) => {
                out.push(items.len().to_string());
                out.extend(items.iter().map(i32::to_string));
            }
            AttrValue::Float2(v) | AttrValue::Double2(v) => floats(out, &v.to_array()),
            AttrValue::Float3(v)
            | AttrValue::Double3(v)
            | AttrValue::ReflectanceRgb(v)
            | AttrValue::SpectrumRgb(v) => floats(out, &v.to_array()),
            AttrValue::DoubleArray(items) => counted_floats(out, items),
            AttrValue::Matrix(m) => floats(out, &m.to_cols_array()),
            AttrValue::MatrixXform(xform) => {
                floats(out, &xform.scale.to_array());
                floats(out, &xform.rotate.to_array());
                out.push(xform.rotate_order.index().to_string());
                floats(out, &xform.translate.to_array());
                floats(out, &xform.shear.to_array());
                floats(out, &xform.scale_pivot.to_array());
                floats(out, &xform.scale_pivot_translate.to_array());
                floats(out, &xform.rotate_pivot.to_array());
                floats(out, &xform.rotate_pivot_translate.to_array());
                floats(out, &xform.rotate_orient.to_array());
                floats(out, &xform.joint_orient.to_array());
                floats(out, &xform.inverse_parent_scale.to_array());
                out.push(yes_no(xform.compensate_parent_scale).to_string());
            }
            AttrValue::PointArray(points) => {
                out.push(points.len().to_string());
                for p in points {
                    floats(out, &p.to_array());
                }
            }
            AttrValue::VectorArray(vectors) => {
                out.push(vectors.len().to_string());
                for v in vectors {
                    floats(out, &v.to_array());
                }
            }
            AttrValue::String(s) => out.push(quote(s)),
            AttrValue::StringArray(items) | AttrValue::ComponentList(items) => {
                counted_strings(out, items)
            }
            AttrValue::Cone(cone) => floats(out, &[cone.angle, cone.cap]),
            AttrValue::AttributeAlias(pairs) => {
                let names: Vec<String> = pairs
                    .iter()
                    .flat_map(|p| [quote(&p.alias), quote(&p.attribute)])
                    .collect();
                out.push(format!("{{{}}}", names.join(", ")));
            }
            AttrValue::NurbsCurve(curve) => {
                out.push(curve.degree.to_string());
                out.push(curve.spans.to_string());
                out.push(curve.form.index().to_string());
                out.push(yes_no(curve.is_rational).to_string());
                out.push(curve.dimension.to_string());
                counted_floats(out, &curve.knots);
                cv_tokens(out, &curve.cvs);
            }
            AttrValue::NurbsSurface(surface) => {
                out.push(surface.u_degree.to_string());
                out.push(surface.v_degree.to_string());
                out.push(surface.u_form.index().to_string());
                out.push(surface.v_form.index().to_string());
                out.push(yes_no(surface.is_rational).to_string());
                counted_floats(out, &surface.u_knots);
                counted_floats(out, &surface.v_knots);
                match surface.trim {
                    Some(true) => out.push(quote("TRIM")),
                    Some(false) => out.push(quote("NOTRIM")),
                    None => {}
                }
                cv_tokens(out, &surface.cvs);
            }
            AttrValue::NurbsTrimface(raw) | AttrValue::Mesh(raw) => {
                out.extend(raw.iter().cloned())
            }
            AttrValue::PolyFaces(face) => {
                out.push("f".to_string());
                counted_ints(out, &face.face_edges);
                for hole in &face.hole_edges {
                    out.push("h".to_string());
                    counted_ints(out, hole);
                }
                for uv in &face.face_uvs {
                    out.push("mu".to_string());
                    out.push(uv.uv_set.to_string());
                    counted_ints(out, &uv.uvs);
                }
                for color in &face.multi_colors {
                    out.push("mc".to_string());
                    out.push(color.color_set.to_string());
                    counted_ints(out, &color.colors);
                }
                if !face.face_colors.is_empty() {
                    out.push("fc".to_string());
                    counted_ints(out, &face.face_colors);
                }
            }
            AttrValue::DataPolyComponent(component) => {
                out.push("Index_Data".to_string());
                out.push(component.kind.name().to_string());
                out.push(component.values.len().to_string());
                for (index, value) in &component.values {
                    out.push(index.to_string());
                    out.push(format_float(*value));
                }
            }
            AttrValue::DataReferenceEdits(edits) => reference_edit_tokens(out, edits),
            AttrValue::Lattice(lattice) => {
                out.push(lattice.s_divisions.to_string());
                out.push(lattice.t_divisions.to_string());
                out.push(lattice.u_divisions.to_string());
                out.push(lattice.points.len().to_string());
                for p in &lattice.points {
                    floats(out, &p.to_array());
                }
            }
        }
    }

    /// Value tokens joined by spaces.
    pub fn to_mel(&self) -> String {
        let mut out = Vec::new();
        self.write_tokens(&mut out);
        out.join(" ")
    }
}

fn reference_edit_tokens(out: &mut Vec<String>, edits: &ReferenceEdits) {
    out.push(quote(&edits.reference_node));
    for edit in &edits.edits {
        out.push(quote(&edit.reference_node));
        out.push(edit.commands.len().to_string());
        for command in &edit.commands {
            out.push(command.opcode().to_string());
            match command {
                EditCommand::Parent { node, parent, args } => {
                    out.extend([quote(node), quote(parent), quote(args)])
                }
                EditCommand::AddAttr {
                    node,
                    long_attr,
                    short_attr,
                    args,
                } => out.extend([quote(node), quote(long_attr), quote(short_attr), quote(args)]),
                EditCommand::SetAttr { node, attr, args }
                | EditCommand::DeleteAttr { node, attr, args } => {
                    out.extend([quote(node), quote(attr), quote(args)])
                }
                EditCommand::DisconnectAttr {
                    source_plug,
                    dest_plug,
                    args,
                } => out.extend([quote(source_plug), quote(dest_plug), quote(args)]),
                EditCommand::ConnectAttr {
                    magic,
                    reference_node,
                    source_plug,
                    dest_plug,
                    placeholders,
                    args,
                } => {
                    out.push(magic.to_string());
                    out.extend([quote(reference_node), quote(source_plug), quote(dest_plug)]);
                    if let Some((source, dest)) = placeholders {
                        out.extend([quote(source), quote(dest)]);
                    }
                    out.push(quote(args));
                }
                EditCommand::Relationship {
                    relationship_type,
                    node,
                    commands,
                } => {
                    out.extend([quote(relationship_type), quote(node)]);
                    counted_strings(out, commands);
                    out.push("0".to_string());
                }
                EditCommand::Lock { node, attr } | EditCommand::Unlock { node, attr } => {
                    out.extend([quote(node), quote(attr)])
                }
            }
        }
    }
}

impl SetAttrFlags {
    fn write_tokens(&self, out: &mut Vec<String>) {
        if self.altered_value {
            out.push("-av".to_string());
        }
        if let Some(v) = self.caching {
            out.extend(["-ca".to_string(), on_off(v).to_string()]);
        }
        if let Some(v) = self.capacity_hint {
            out.extend(["-ch".to_string(), v.to_string()]);
        }
        if let Some(v) = self.channel_box {
            out.extend(["-cb".to_string(), on_off(v).to_string()]);
        }
        if self.clamp {
            out.push("-c".to_string());
        }
        if let Some(v) = self.keyable {
            out.extend(["-k".to_string(), on_off(v).to_string()]);
        }
        if let Some(v) = self.lock {
            out.extend(["-l".to_string(), on_off(v).to_string()]);
        }
        if let Some(v) = self.size {
            out.extend(["-s".to_string(), v.to_string()]);
        }
    }
}

impl SetAttr {
    /// Write the record as MEL.
    ///
    /// A record built from several commands is written back as one command
    /// per source segment, separated by newlines. Otherwise values whose
    /// decoder consumes the rest of the command get one command each.
    pub fn to_mel(&self) -> String {
        let covered: usize = self.segments.iter().map(|s| s.value_count).sum();
        if !self.segments.is_empty() && covered == self.values.len() {
            let mut start = 0;
            return self
                .segments
                .iter()
                .map(|segment| {
                    let values = &self.values[start..start + segment.value_count];
                    start += segment.value_count;
                    self.command_text(&segment.path, &segment.flags, values, !values.is_empty())
                })
                .collect::<Vec<_>>()
                .join("\n");
        }

        let consumes_rest =
            self.attr_type.is_opaque() || self.attr_type == AttrType::DataReferenceEdits;
        if consumes_rest && self.values.len() > 1 {
            return self
                .values
                .iter()
                .map(|value| {
                    self.command_text(&self.path, &self.flags, std::slice::from_ref(value), true)
                })
                .collect::<Vec<_>>()
                .join("\n");
        }
        self.command_text(&self.path, &self.flags, &self.values, true)
    }

    fn command_text(
        &self,
        path: &str,
        flags: &SetAttrFlags,
        values: &[AttrValue],
        with_type: bool,
    ) -> String {
        let mut out = vec!["setAttr".to_string()];
        flags.write_tokens(&mut out);
        out.push(quote(path));

        if let Some(name) = self.attr_type.type_name().filter(|_| with_type) {
            out.extend(["-type".to_string(), quote(name)]);
            if self.attr_type == AttrType::MatrixXform {
                out.push(quote("xform"));
            }
        }

        let value_start = out.len();
        for value in values {
            value.write_tokens(&mut out);
        }

        // All-integral doubles would read back as ints
        if self.attr_type == AttrType::Double {
            let integral = out[value_start..]
                .iter()
                .all(|t| !t.contains(['.', 'e', 'E']) && !t.contains("inf") && !t.contains("NaN"));
            if integral {
                if let Some(first) = out.get_mut(value_start) {
                    first.push_str(".0");
                }
            }
        }

        format!("{};", out.join(" "))
    }
}

impl FileCommand {
    pub fn to_mel(&self) -> String {
        let mut out = vec!["file".to_string()];
        if let Some(depth) = self.reference_depth_info {
            out.extend(["-rdi".to_string(), depth.to_string()]);
        }
        if self.reference {
            out.push("-r".to_string());
        }
        if let Some(ns) = &self.namespace {
            out.extend(["-ns".to_string(), quote(ns)]);
        }
        if let Some(defer) = self.defer_reference {
            out.extend(["-dr".to_string(), u8::from(defer).to_string()]);
        }
        if let Some(node) = &self.reference_node {
            out.extend(["-rfn".to_string(), quote(node)]);
        }
        if let Some(options) = &self.options {
            out.extend(["-op".to_string(), quote(options)]);
        }
        if let Some(file_type) = &self.file_type {
            out.extend(["-typ".to_string(), quote(file_type)]);
        }
        for flag in &self.extra_flags {
            out.push(flag.name.clone());
            if let Some(value) = &flag.value {
                out.push(value.clone());
            }
        }

        let prefix = out.join(" ");
        let path = quote(&self.path);
        let separator = if prefix.len() + 1 + path.len() > FILE_LINE_LIMIT {
            "\n\t\t"
        } else {
            " "
        };
        format!("{}{}{};", prefix, separator, path)
    }
}

impl Requires {
    pub fn to_mel(&self) -> String {
        let mut out = vec!["requires".to_string()];
        for node_type in &self.node_types {
            out.extend(["-nodeType".to_string(), quote(node_type)]);
        }
        for data_type in &self.data_types {
            out.extend(["-dataType".to_string(), quote(data_type)]);
        }
        out.extend([quote(&self.plugin), quote(&self.version)]);
        format!("{};", out.join(" "))
    }
}

impl CurrentUnit {
    pub fn to_mel(&self) -> String {
        let mut out = vec!["currentUnit".to_string()];
        for (flag, value) in [("-l", &self.linear), ("-a", &self.angle), ("-t", &self.time)] {
            if let Some(value) = value {
                out.extend([flag.to_string(), value.clone()]);
            }
        }
        format!("{};", out.join(" "))
    }
}

impl ConnectAttr {
    pub fn to_mel(&self) -> String {
        let mut out = vec!["connectAttr".to_string()];
        if self.force {
            out.push("-f".to_string());
        }
        if let Some(lock) = self.lock {
            out.extend(["-l".to_string(), on_off(lock).to_string()]);
        }
        if let Some(dest) = &self.reference_dest {
            out.extend(["-rd".to_string(), quote(dest)]);
        }
        out.push(quote(&self.source.to_string()));
        out.push(quote(&self.destination.to_string()));
        if self.next_available {
            out.push("-na".to_string());
        }
        format!("{};", out.join(" "))
    }
}

impl DisconnectAttr {
    pub fn to_mel(&self) -> String {
        let mut out = vec!["disconnectAttr".to_string()];
        out.push(quote(&self.source.to_string()));
        out.push(quote(&self.destination.to_string()));
        if self.next_available {
            out.push("-na".to_string());
        }
        format!("{};", out.join(" "))
    }
}

impl CreateNode {
    pub fn to_mel(&self) -> String {
        let mut out = vec!["createNode".to_string(), self.node_type.clone()];
        if self.shared {
            out.push("-s".to_string());
        }
        if let Some(name) = &self.name {
            out.extend(["-n".to_string(), quote(name)]);
        }
        if let Some(parent) = &self.parent {
            out.extend(["-p".to_string(), quote(parent)]);
        }
        if self.skip_select {
            out.push("-ss".to_string());
        }
        format!("{};", out.join(" "))
    }
}

impl Rename {
    pub fn to_mel(&self) -> String {
        let mut out = vec!["rename".to_string()];
        if self.uid {
            out.push("-uid".to_string());
        }
        if self.ignore_shape {
            out.push("-is".to_string());
        }
        if let Some(from) = &self.from {
            out.push(quote(from));
        }
        out.push(quote(&self.to));
        format!("{};", out.join(" "))
    }
}

impl AddAttr {
    /// Flags are written back in their original order with their raw arguments.
    pub fn to_mel(&self) -> String {
        let mut out = vec!["addAttr".to_string()];
        for flag in &self.flags {
            out.push(flag.name.clone());
            if let Some(value) = &flag.value {
                out.push(value.clone());
            }
        }
        if let Some(node) = &self.node {
            out.push(quote(node));
        }
        format!("{};", out.join(" "))
    }
}

impl Select {
    pub fn to_mel(&self) -> String {
        let mut out = vec!["select".to_string()];
        out.extend(self.flags.iter().cloned());
        out.extend(self.names.iter().cloned());
        format!("{};", out.join(" "))
    }
}

impl Statement {
    /// MEL text for statements that carry their own content.
    ///
    /// Returns `None` for continuations (their values live in the record they
    /// continue) and for unknown or failed commands, which only exist as raw
    /// text.
    pub fn to_mel(&self) -> Option<String> {
        let text = match self {
            Statement::Empty => ";".to_string(),
            Statement::Comment(body) if body.contains('\n') => format!("/*{}*/", body),
            Statement::Comment(body) => format!("//{}", body),
            Statement::File(file) => file.to_mel(),
            Statement::FileInfo(info) => {
                format!("fileInfo {} {};", quote(&info.name), quote(&info.value))
            }
            Statement::Workspace(ws) => {
                format!("workspace -fr {} {};", quote(&ws.rule), quote(&ws.place))
            }
            Statement::Requires(requires) => requires.to_mel(),
            Statement::CurrentUnit(unit) => unit.to_mel(),
            Statement::ConnectAttr(connect) => connect.to_mel(),
            Statement::DisconnectAttr(disconnect) => disconnect.to_mel(),
            Statement::CreateNode(node) => node.to_mel(),
            Statement::Rename(rename) => rename.to_mel(),
            Statement::SetAttr(record) => record.to_mel(),
            Statement::AddAttr(attr) => attr.to_mel(),
            Statement::Select(select) => select.to_mel(),
            Statement::SetAttrContinuation { .. } | Statement::Unknown | Statement::Failed => {
                return None
            }
        };
        Some(text)
    }
}
