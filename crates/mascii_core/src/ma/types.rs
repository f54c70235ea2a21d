//! Attribute type registry.
//!
//! Maps the literal following `setAttr -type` to a closed [`AttrType`] tag.
//! The only multi-token literal is `"matrix" "xform"`.

use std::fmt;

use serde::Serialize;

use crate::error::{DecodeError, DecodeResult};
use crate::ma::tokenizer::dequote;

/// Shape of a `setAttr` value.
///
/// `Bool`, `Int` and `Double` are never written with `-type`; they come from
/// inferring untyped values. `Invalid` marks a record with no values yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AttrType {
    Invalid,
    Bool,
    Int,
    Double,
    Short2,
    Short3,
    Long2,
    Long3,
    Int32Array,
    Float2,
    Float3,
    Double2,
    Double3,
    DoubleArray,
    Matrix,
    MatrixXform,
    PointArray,
    VectorArray,
    String,
    StringArray,
    Sphere,
    Cone,
    ReflectanceRgb,
    SpectrumRgb,
    ComponentList,
    AttributeAlias,
    NurbsCurve,
    NurbsSurface,
    NurbsTrimface,
    PolyFaces,
    DataPolyComponent,
    DataReferenceEdits,
    Mesh,
    Lattice,
}

impl AttrType {
    /// Resolve a `-type` literal.
    ///
    /// `next` is the token after the literal; for `matrix` followed by
    /// `xform` the returned count of extra consumed tokens is 1.
    pub fn from_type_name(name: &str, next: Option<&str>) -> DecodeResult<(AttrType, usize)> {
        let name = dequote(name);
        let attr_type = match name {
            "short2" => AttrType::Short2,
            "short3" => AttrType::Short3,
            "long2" => AttrType::Long2,
            "long3" => AttrType::Long3,
            "Int32Array" => AttrType::Int32Array,
            "float2" => AttrType::Float2,
            "float3" => AttrType::Float3,
            "double2" => AttrType::Double2,
            "double3" => AttrType::Double3,
            "doubleArray" => AttrType::DoubleArray,
            "matrix" => {
                if next.map(dequote) == Some("xform") {
                    return Ok((AttrType::MatrixXform, 1));
                }
                AttrType::Matrix
            }
            "pointArray" => AttrType::PointArray,
            "vectorArray" => AttrType::VectorArray,
            "string" => AttrType::String,
            "stringArray" => AttrType::StringArray,
            "sphere" => AttrType::Sphere,
            "cone" => AttrType::Cone,
            "reflectanceRGB" => AttrType::ReflectanceRgb,
            "spectrumRGB" => AttrType::SpectrumRgb,
            "componentList" => AttrType::ComponentList,
            "attributeAlias" => AttrType::AttributeAlias,
            "nurbsCurve" => AttrType::NurbsCurve,
            "nurbsSurface" => AttrType::NurbsSurface,
            "nurbsTrimface" => AttrType::NurbsTrimface,
            "polyFaces" => AttrType::PolyFaces,
            "dataPolyComponent" => AttrType::DataPolyComponent,
            "dataReferenceEdits" => AttrType::DataReferenceEdits,
            "mesh" => AttrType::Mesh,
            "lattice" => AttrType::Lattice,
            _ => return Err(DecodeError::UnknownAttrType(name.to_string())),
        };
        Ok((attr_type, 0))
    }

    /// The `-type` literal, or `None` for untyped shapes.
    pub fn type_name(self) -> Option<&'static str> {
        let name = match self {
            AttrType::Invalid | AttrType::Bool | AttrType::Int | AttrType::Double => return None,
            AttrType::Short2 => "short2",
            AttrType::Short3 => "short3",
            AttrType::Long2 => "long2",
            AttrType::Long3 => "long3",
            AttrType::Int32Array => "Int32Array",
            AttrType::Float2 => "float2",
            AttrType::Float3 => "float3",
            AttrType::Double2 => "double2",
            AttrType::Double3 => "double3",
            AttrType::DoubleArray => "doubleArray",
            AttrType::Matrix | AttrType::MatrixXform => "matrix",
            AttrType::PointArray => "pointArray",
            AttrType::VectorArray => "vectorArray",
            AttrType::String => "string",
            AttrType::StringArray => "stringArray",
            AttrType::Sphere => "sphere",
            AttrType::Cone => "cone",
            AttrType::ReflectanceRgb => "reflectanceRGB",
            AttrType::SpectrumRgb => "spectrumRGB",
            AttrType::ComponentList => "componentList",
            AttrType::AttributeAlias => "attributeAlias",
            AttrType::NurbsCurve => "nurbsCurve",
            AttrType::NurbsSurface => "nurbsSurface",
            AttrType::NurbsTrimface => "nurbsTrimface",
            AttrType::PolyFaces => "polyFaces",
            AttrType::DataPolyComponent => "dataPolyComponent",
            AttrType::DataReferenceEdits => "dataReferenceEdits",
            AttrType::Mesh => "mesh",
            AttrType::Lattice => "lattice",
        };
        Some(name)
    }

    /// True for shapes produced by inference rather than `-type`.
    pub fn is_untyped(self) -> bool {
        matches!(
            self,
            AttrType::Invalid | AttrType::Bool | AttrType::Int | AttrType::Double
        )
    }

    /// Layouts kept as raw tokens instead of being decoded.
    pub fn is_opaque(self) -> bool {
        matches!(self, AttrType::Mesh | AttrType::NurbsTrimface)
    }

    /// Element count of fixed tuple shapes.
    pub fn tuple_width(self) -> Option<usize> {
        match self {
            AttrType::Short2 | AttrType::Long2 | AttrType::Float2 | AttrType::Double2 => Some(2),
            AttrType::Short3 | AttrType::Long3 | AttrType::Float3 | AttrType::Double3 => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrType::Invalid => f.write_str("invalid"),
            AttrType::Bool => f.write_str("bool"),
            AttrType::Int => f.write_str("int"),
            AttrType::Double => f.write_str("double"),
            AttrType::MatrixXform => f.write_str("matrix xform"),
            other => f.write_str(other.type_name().unwrap_or("invalid")),
        }
    }
}
