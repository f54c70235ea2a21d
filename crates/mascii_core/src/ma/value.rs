//! Decoded attribute values.
//!
//! [`AttrValue`] has one payload shape per [`AttrType`]. Records that own
//! variable-length data (curves, surfaces, poly faces, reference edits) have
//! their own structs below.

use std::collections::BTreeMap;

use mascii_math::{DMat4, DVec2, DVec3, DVec4, I16Vec2, I16Vec3, IVec2, IVec3, TransformComponents};
use serde::Serialize;

use crate::ma::types::AttrType;

/// One decoded `setAttr` value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Short2(I16Vec2),
    Short3(I16Vec3),
    Long2(IVec2),
    Long3(IVec3),
    Int32Array(Vec<i32>),
    /// Stored as f64 so the written text survives a round trip
    Float2(DVec2),
    Float3(DVec3),
    Double2(DVec2),
    Double3(DVec3),
    DoubleArray(Vec<f64>),
    Matrix(DMat4),
    MatrixXform(Box<TransformComponents>),
    PointArray(Vec<DVec4>),
    VectorArray(Vec<DVec3>),
    String(String),
    StringArray(Vec<String>),
    Sphere(f64),
    Cone(Cone),
    ReflectanceRgb(DVec3),
    SpectrumRgb(DVec3),
    ComponentList(Vec<String>),
    AttributeAlias(Vec<AliasPair>),
    NurbsCurve(Box<NurbsCurve>),
    NurbsSurface(Box<NurbsSurface>),
    /// Undecoded trim face tokens, kept as written
    NurbsTrimface(Vec<String>),
    PolyFaces(PolyFace),
    DataPolyComponent(PolyComponent),
    DataReferenceEdits(Box<ReferenceEdits>),
    Lattice(Lattice),
    /// Undecoded mesh tokens, kept as written
    Mesh(Vec<String>),
}

impl AttrValue {
    /// The attribute type this payload belongs to.
    pub fn attr_type(&self) -> AttrType {
        match self {
            AttrValue::Bool(_) => AttrType::Bool,
            AttrValue::Int(_) => AttrType::Int,
            AttrValue::Double(_) => AttrType::Double,
            AttrValue::Short2(_) => AttrType::Short2,
            AttrValue::Short3(_) => AttrType::Short3,
            AttrValue::Long2(_) => AttrType::Long2,
            AttrValue::Long3(_) => AttrType::Long3,
            AttrValue::Int32Array(_) => AttrType::Int32Array,
            AttrValue::Float2(_) => AttrType::Float2,
            AttrValue::Float3(_) => AttrType::Float3,
            AttrValue::Double2(_) => AttrType::Double2,
            AttrValue::Double3(_) => AttrType::Double3,
            AttrValue::DoubleArray(_) => AttrType::DoubleArray,
            AttrValue::Matrix(_) => AttrType::Matrix,
            AttrValue::MatrixXform(_) => AttrType::MatrixXform,
            AttrValue::PointArray(_) => AttrType::PointArray,
            AttrValue::VectorArray(_) => AttrType::VectorArray,
            AttrValue::String(_) => AttrType::String,
            AttrValue::StringArray(_) => AttrType::StringArray,
            AttrValue::Sphere(_) => AttrType::Sphere,
            AttrValue::Cone(_) => AttrType::Cone,
            AttrValue::ReflectanceRgb(_) => AttrType::ReflectanceRgb,
            AttrValue::SpectrumRgb(_) => AttrType::SpectrumRgb,
            AttrValue::ComponentList(_) => AttrType::ComponentList,
            AttrValue::AttributeAlias(_) => AttrType::AttributeAlias,
            AttrValue::NurbsCurve(_) => AttrType::NurbsCurve,
            AttrValue::NurbsSurface(_) => AttrType::NurbsSurface,
            AttrValue::NurbsTrimface(_) => AttrType::NurbsTrimface,
            AttrValue::PolyFaces(_) => AttrType::PolyFaces,
            AttrValue::DataPolyComponent(_) => AttrType::DataPolyComponent,
            AttrValue::DataReferenceEdits(_) => AttrType::DataReferenceEdits,
            AttrValue::Lattice(_) => AttrType::Lattice,
            AttrValue::Mesh(_) => AttrType::Mesh,
        }
    }

    /// Widen an `Int` to `Double`; other values are returned unchanged.
    pub fn widened(self) -> AttrValue {
        match self {
            AttrValue::Int(v) => AttrValue::Double(v as f64),
            other => other,
        }
    }
}

/// `cone` value: half angle and cap length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Cone {
    pub angle: f64,
    pub cap: f64,
}

/// One `alias, attribute` pair from an `attributeAlias` list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AliasPair {
    pub alias: String,
    pub attribute: String,
}

/// NURBS curve/surface form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum FormType {
    #[default]
    Open,
    Closed,
    Periodic,
}

impl FormType {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(FormType::Open),
            1 => Some(FormType::Closed),
            2 => Some(FormType::Periodic),
            _ => None,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            FormType::Open => 0,
            FormType::Closed => 1,
            FormType::Periodic => 2,
        }
    }
}

/// A control vertex. `z` is present for 3D curves and all surfaces, `w`
/// for rational geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CvValue {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub w: Option<f64>,
}

/// `nurbsCurve` value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NurbsCurve {
    pub degree: i64,
    pub spans: i64,
    pub form: FormType,
    pub is_rational: bool,
    /// 2 or 3
    pub dimension: i64,
    pub knots: Vec<f64>,
    pub cvs: Vec<CvValue>,
}

impl NurbsCurve {
    /// Number of values written per CV.
    pub fn cv_width(&self) -> usize {
        curve_cv_width(self.dimension, self.is_rational)
    }
}

pub(crate) fn curve_cv_width(dimension: i64, is_rational: bool) -> usize {
    2 + usize::from(dimension == 3) + usize::from(is_rational)
}

/// `nurbsSurface` value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NurbsSurface {
    pub u_degree: i64,
    pub v_degree: i64,
    pub u_form: FormType,
    pub v_form: FormType,
    pub is_rational: bool,
    pub u_knots: Vec<f64>,
    pub v_knots: Vec<f64>,
    /// `Some(true)` for `TRIM`, `Some(false)` for `NOTRIM`, `None` when absent
    pub trim: Option<bool>,
    pub cvs: Vec<CvValue>,
}

impl NurbsSurface {
    pub fn cv_width(&self) -> usize {
        3 + usize::from(self.is_rational)
    }
}

/// UV ids of one face for one UV set (`mu`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FaceUv {
    pub uv_set: i64,
    pub uvs: Vec<i64>,
}

/// Color ids of one face for one color set (`mc`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MultiColor {
    pub color_set: i64,
    pub colors: Vec<i64>,
}

/// One face of a `polyFaces` value.
///
/// Each `f` tag starts a new face; the other tags attach to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PolyFace {
    /// `f`: edge ids of the outer loop
    pub face_edges: Vec<i64>,
    /// `h`: edge ids of each hole
    pub hole_edges: Vec<Vec<i64>>,
    /// `mu`: uv ids per uv set
    pub face_uvs: Vec<FaceUv>,
    /// `mc`: color ids per color set
    pub multi_colors: Vec<MultiColor>,
    /// `fc`: legacy face colors
    pub face_colors: Vec<i64>,
}

/// Component kind of a `dataPolyComponent` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ComponentKind {
    Edge,
    Face,
    Vertex,
    Uv,
}

impl ComponentKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Edge" => Some(ComponentKind::Edge),
            "Face" => Some(ComponentKind::Face),
            "Vertex" => Some(ComponentKind::Vertex),
            "UV" => Some(ComponentKind::Uv),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Edge => "Edge",
            ComponentKind::Face => "Face",
            ComponentKind::Vertex => "Vertex",
            ComponentKind::Uv => "UV",
        }
    }
}

/// `dataPolyComponent` value: a sparse index to value map.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PolyComponent {
    pub kind: ComponentKind,
    pub values: BTreeMap<i64, f64>,
}

/// `lattice` value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Lattice {
    pub s_divisions: i64,
    pub t_divisions: i64,
    pub u_divisions: i64,
    pub points: Vec<DVec3>,
}

/// `dataReferenceEdits` value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReferenceEdits {
    /// Reference node owning the edits
    pub reference_node: String,
    pub edits: Vec<ReferenceEdit>,
}

/// Edits recorded against one (possibly nested) reference node.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReferenceEdit {
    pub reference_node: String,
    /// Edit commands in file order
    pub commands: Vec<EditCommand>,
}

/// One opcode record of a reference edit list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum EditCommand {
    /// 0
    Parent {
        node: String,
        parent: String,
        args: String,
    },
    /// 1
    AddAttr {
        node: String,
        long_attr: String,
        short_attr: String,
        args: String,
    },
    /// 2
    SetAttr {
        node: String,
        attr: String,
        args: String,
    },
    /// 3
    DisconnectAttr {
        source_plug: String,
        dest_plug: String,
        args: String,
    },
    /// 4
    DeleteAttr {
        node: String,
        attr: String,
        args: String,
    },
    /// 5
    ConnectAttr {
        magic: i64,
        reference_node: String,
        source_plug: String,
        dest_plug: String,
        /// Placeholder plugs, present only when `magic == 0`
        placeholders: Option<(String, String)>,
        args: String,
    },
    /// 7
    Relationship {
        relationship_type: String,
        node: String,
        commands: Vec<String>,
    },
    /// 8
    Lock { node: String, attr: String },
    /// 9
    Unlock { node: String, attr: String },
}

impl EditCommand {
    /// Opcode written before the record.
    pub fn opcode(&self) -> u8 {
        match self {
            EditCommand::Parent { .. } => 0,
            EditCommand::AddAttr { .. } => 1,
            EditCommand::SetAttr { .. } => 2,
            EditCommand::DisconnectAttr { .. } => 3,
            EditCommand::DeleteAttr { .. } => 4,
            EditCommand::ConnectAttr { .. } => 5,
            EditCommand::Relationship { .. } => 7,
            EditCommand::Lock { .. } => 8,
            EditCommand::Unlock { .. } => 9,
        }
    }
}

impl ReferenceEdit {
    /// Records with the given opcode, in file order.
    pub fn with_opcode(&self, opcode: u8) -> impl Iterator<Item = &EditCommand> {
        self.commands.iter().filter(move |c| c.opcode() == opcode)
    }

    pub fn parents(&self) -> impl Iterator<Item = &EditCommand> {
        self.with_opcode(0)
    }

    pub fn add_attrs(&self) -> impl Iterator<Item = &EditCommand> {
        self.with_opcode(1)
    }

    pub fn set_attrs(&self) -> impl Iterator<Item = &EditCommand> {
        self.with_opcode(2)
    }

    pub fn disconnect_attrs(&self) -> impl Iterator<Item = &EditCommand> {
        self.with_opcode(3)
    }

    pub fn delete_attrs(&self) -> impl Iterator<Item = &EditCommand> {
        self.with_opcode(4)
    }

    pub fn connect_attrs(&self) -> impl Iterator<Item = &EditCommand> {
        self.with_opcode(5)
    }

    pub fn relationships(&self) -> impl Iterator<Item = &EditCommand> {
        self.with_opcode(7)
    }

    /// Lock and unlock records together.
    pub fn locks(&self) -> impl Iterator<Item = &EditCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c.opcode(), 8 | 9))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cv_width() {
        assert_eq!(curve_cv_width(2, false), 2);
        assert_eq!(curve_cv_width(3, false), 3);
        assert_eq!(curve_cv_width(3, true), 4);
        assert_eq!(curve_cv_width(2, true), 3);
    }

    #[test]
    fn test_widened() {
        assert_eq!(AttrValue::Int(3).widened(), AttrValue::Double(3.0));
        assert_eq!(AttrValue::Bool(true).widened(), AttrValue::Bool(true));
    }

    #[test]
    fn test_edit_sub_lists() {
        let edit = ReferenceEdit {
            reference_node: "charRN".to_string(),
            commands: vec![
                EditCommand::SetAttr {
                    node: "|char:root".to_string(),
                    attr: "visibility".to_string(),
                    args: " 0".to_string(),
                },
                EditCommand::Lock {
                    node: "|char:root".to_string(),
                    attr: "tx".to_string(),
                },
                EditCommand::Unlock {
                    node: "|char:root".to_string(),
                    attr: "ty".to_string(),
                },
            ],
        };
        assert_eq!(edit.set_attrs().count(), 1);
        assert_eq!(edit.locks().count(), 2);
        assert_eq!(edit.parents().count(), 0);
    }
}
