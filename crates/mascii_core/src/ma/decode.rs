//! Typed `setAttr` value decoding.
//!
//! [`decode_value`] decodes one step for a given [`AttrType`] and reports how
//! many tokens it used. [`decode_values`] drives it over a whole value list.
//!
//! # Families
//!
//! - fixed tuples: `short2/3`, `long2/3`, `float2/3`, `double2/3`
//! - counted arrays: `Int32Array`, `doubleArray`, `stringArray`, `componentList`
//! - fixed records: `matrix`, `matrix "xform"`, `cone`, `sphere`, `reflectanceRGB`, `spectrumRGB`
//! - count-prefixed geometry: `pointArray`, `vectorArray`, `nurbsCurve`, `nurbsSurface`, `lattice`
//! - tag loops: `polyFaces`, `dataPolyComponent`
//! - opaque: `nurbsTrimface`, `mesh` (the remainder is kept as raw tokens)
//!
//! # Not Supported
//!
//! - `mesh` vertex/edge/face sections
//! - `nurbsTrimface` region and boundary layout

use std::collections::BTreeMap;

use mascii_math::{
    DMat4, DQuat, DVec2, DVec3, DVec4, I16Vec2, I16Vec3, IVec2, IVec3, RotateOrder,
    TransformComponents,
};

use crate::error::{DecodeError, DecodeResult};
use crate::ma::cursor::Cursor;
use crate::ma::infer::infer_values;
use crate::ma::refedit::decode_reference_edits;
use crate::ma::tokenizer::dequote;
use crate::ma::types::AttrType;
use crate::ma::value::*;

/// How much input a decode step used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consumed {
    /// Exactly this many tokens
    Tokens(usize),
    /// Everything that was left; the layout is not decoded
    Remainder,
}

/// Result of one decode step.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    pub values: Vec<AttrValue>,
    pub consumed: Consumed,
}

/// Values decoded from a whole token list.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedValues {
    /// Type of the values; differs from the requested type only for inferred ones
    pub attr_type: AttrType,
    pub values: Vec<AttrValue>,
    pub warnings: Vec<String>,
}

/// Decode every value token of a `setAttr`.
pub fn decode_values(
    attr_type: AttrType,
    tokens: &[String],
    size_hint: Option<usize>,
) -> DecodeResult<DecodedValues> {
    if attr_type.is_untyped() {
        let (attr_type, values) = infer_values(tokens)?;
        return Ok(DecodedValues {
            attr_type,
            values,
            warnings: Vec::new(),
        });
    }

    let mut cursor = Cursor::new(tokens);

    // Opaque records always produce their placeholder, even with no tokens
    if attr_type.is_opaque() {
        let decoded = decode_value(attr_type, &mut cursor, size_hint)?;
        return Ok(DecodedValues {
            attr_type,
            values: decoded.values,
            warnings: Vec::new(),
        });
    }

    let mut values = Vec::new();
    while !cursor.is_empty() {
        let decoded = decode_value(attr_type, &mut cursor, size_hint)?;
        values.extend(decoded.values);
        match decoded.consumed {
            Consumed::Remainder => {
                log::debug!("{} value left undecoded", attr_type);
                break;
            }
            Consumed::Tokens(0) => {
                return Err(DecodeError::InvalidValue {
                    expected: "value",
                    found: cursor.peek().unwrap_or_default().to_string(),
                })
            }
            Consumed::Tokens(_) => {}
        }
    }

    Ok(DecodedValues {
        attr_type,
        values,
        warnings: cursor.take_warnings(),
    })
}

/// Decode one step of `attr_type` values from the cursor.
pub fn decode_value(
    attr_type: AttrType,
    cursor: &mut Cursor,
    size_hint: Option<usize>,
) -> DecodeResult<Decoded> {
    let start = cursor.position();

    let values = match attr_type {
        AttrType::Invalid | AttrType::Bool | AttrType::Int | AttrType::Double => {
            let (_, values) = infer_values(cursor.rest())?;
            cursor.skip_rest();
            values
        }

        AttrType::Short2
        | AttrType::Short3
        | AttrType::Long2
        | AttrType::Long3
        | AttrType::Float2
        | AttrType::Float3
        | AttrType::Double2
        | AttrType::Double3 => decode_tuples(attr_type, cursor, size_hint)?,

        AttrType::Int32Array => {
            let count = cursor.count(attr_type)?;
            cursor.require(attr_type, count)?;
            let items = (0..count)
                .map(|_| cursor.int_as::<i32>(attr_type))
                .collect::<DecodeResult<Vec<_>>>()?;
            vec![AttrValue::Int32Array(items)]
        }
        AttrType::DoubleArray => vec![AttrValue::DoubleArray(cursor.float_list(attr_type)?)],
        AttrType::StringArray => vec![AttrValue::StringArray(string_list(attr_type, cursor)?)],
        AttrType::ComponentList => {
            vec![AttrValue::ComponentList(string_list(attr_type, cursor)?)]
        }

        AttrType::Matrix => {
            let m = cursor.floats::<16>(attr_type)?;
            vec![AttrValue::Matrix(DMat4::from_cols_array(&m))]
        }
        AttrType::MatrixXform => vec![AttrValue::MatrixXform(Box::new(decode_xform(cursor)?))],
        AttrType::Sphere => vec![AttrValue::Sphere(cursor.float(attr_type)?)],
        AttrType::Cone => {
            let [angle, cap] = cursor.floats::<2>(attr_type)?;
            vec![AttrValue::Cone(Cone { angle, cap })]
        }
        AttrType::ReflectanceRgb => {
            vec![AttrValue::ReflectanceRgb(DVec3::from_array(cursor.floats(attr_type)?))]
        }
        AttrType::SpectrumRgb => {
            vec![AttrValue::SpectrumRgb(DVec3::from_array(cursor.floats(attr_type)?))]
        }
        AttrType::String => vec![AttrValue::String(cursor.string(attr_type)?)],
        AttrType::AttributeAlias => vec![AttrValue::AttributeAlias(decode_alias(cursor)?)],

        AttrType::PointArray => {
            let count = cursor.count(attr_type)?;
            cursor.require_items(attr_type, count, 4)?;
            let points = (0..count)
                .map(|_| cursor.floats::<4>(attr_type).map(DVec4::from_array))
                .collect::<DecodeResult<Vec<_>>>()?;
            vec![AttrValue::PointArray(points)]
        }
        AttrType::VectorArray => {
            let count = cursor.count(attr_type)?;
            cursor.require_items(attr_type, count, 3)?;
            let vectors = (0..count)
                .map(|_| cursor.floats::<3>(attr_type).map(DVec3::from_array))
                .collect::<DecodeResult<Vec<_>>>()?;
            vec![AttrValue::VectorArray(vectors)]
        }
        AttrType::NurbsCurve => vec![AttrValue::NurbsCurve(Box::new(decode_nurbs_curve(cursor)?))],
        AttrType::NurbsSurface => {
            vec![AttrValue::NurbsSurface(Box::new(decode_nurbs_surface(cursor)?))]
        }
        AttrType::Lattice => vec![AttrValue::Lattice(decode_lattice(cursor)?)],

        AttrType::PolyFaces => decode_poly_faces(cursor)?
            .into_iter()
            .map(AttrValue::PolyFaces)
            .collect(),
        AttrType::DataPolyComponent => {
            vec![AttrValue::DataPolyComponent(decode_poly_component(cursor)?)]
        }
        AttrType::DataReferenceEdits => {
            vec![AttrValue::DataReferenceEdits(Box::new(
                decode_reference_edits(cursor)?,
            ))]
        }

        AttrType::NurbsTrimface | AttrType::Mesh => {
            let raw = cursor.rest().to_vec();
            cursor.skip_rest();
            let value = if attr_type == AttrType::Mesh {
                AttrValue::Mesh(raw)
            } else {
                AttrValue::NurbsTrimface(raw)
            };
            return Ok(Decoded {
                values: vec![value],
                consumed: Consumed::Remainder,
            });
        }
    };

    Ok(Decoded {
        values,
        consumed: Consumed::Tokens(cursor.position() - start),
    })
}

/// Fixed tuples: one tuple, or `size` tuples when a size hint is given.
fn decode_tuples(
    attr_type: AttrType,
    cursor: &mut Cursor,
    size_hint: Option<usize>,
) -> DecodeResult<Vec<AttrValue>> {
    let width = attr_type.tuple_width().unwrap_or(1);
    let available = cursor.remaining() / width;
    let count = match size_hint {
        Some(size) if size > 0 => size.min(available).max(1),
        _ => 1,
    };

    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        cursor.require(attr_type, width)?;
        let value = match attr_type {
            AttrType::Short2 => AttrValue::Short2(I16Vec2::new(
                cursor.int_as(attr_type)?,
                cursor.int_as(attr_type)?,
            )),
            AttrType::Short3 => AttrValue::Short3(I16Vec3::new(
                cursor.int_as(attr_type)?,
                cursor.int_as(attr_type)?,
                cursor.int_as(attr_type)?,
            )),
            AttrType::Long2 => AttrValue::Long2(IVec2::new(
                cursor.int_as(attr_type)?,
                cursor.int_as(attr_type)?,
            )),
            AttrType::Long3 => AttrValue::Long3(IVec3::new(
                cursor.int_as(attr_type)?,
                cursor.int_as(attr_type)?,
                cursor.int_as(attr_type)?,
            )),
            AttrType::Float2 => AttrValue::Float2(DVec2::from_array(cursor.floats(attr_type)?)),
            AttrType::Float3 => AttrValue::Float3(DVec3::from_array(cursor.floats(attr_type)?)),
            AttrType::Double2 => AttrValue::Double2(DVec2::from_array(cursor.floats(attr_type)?)),
            AttrType::Double3 => AttrValue::Double3(DVec3::from_array(cursor.floats(attr_type)?)),
            other => {
                return Err(DecodeError::InvalidValue {
                    expected: "tuple type",
                    found: other.to_string(),
                })
            }
        };
        values.push(value);
    }
    Ok(values)
}

fn string_list(attr_type: AttrType, cursor: &mut Cursor) -> DecodeResult<Vec<String>> {
    let count = cursor.count(attr_type)?;
    cursor.require(attr_type, count)?;
    (0..count).map(|_| cursor.string(attr_type)).collect()
}

/// `{ alias, attribute, alias, attribute, ... }`
fn decode_alias(cursor: &mut Cursor) -> DecodeResult<Vec<AliasPair>> {
    const TYPE: AttrType = AttrType::AttributeAlias;

    let open = cursor.token(TYPE)?;
    if open != "{" {
        return Err(DecodeError::InvalidValue {
            expected: "'{'",
            found: open.to_string(),
        });
    }

    let mut names = Vec::new();
    loop {
        let token = cursor.token(TYPE)?;
        if token == "}" {
            break;
        }
        names.push(dequote(token).to_string());
    }

    if names.len() % 2 != 0 {
        return Err(DecodeError::InvalidValue {
            expected: "alias/attribute pairs",
            found: names.join(","),
        });
    }

    Ok(names
        .chunks_exact(2)
        .map(|pair| AliasPair {
            alias: pair[0].clone(),
            attribute: pair[1].clone(),
        })
        .collect())
}

/// The 37 field `matrix "xform"` layout.
fn decode_xform(cursor: &mut Cursor) -> DecodeResult<TransformComponents> {
    const TYPE: AttrType = AttrType::MatrixXform;
    cursor.require(TYPE, 37)?;

    let scale = read_vec3(cursor, TYPE)?;
    let rotate = read_vec3(cursor, TYPE)?;
    let order_index = cursor.int(TYPE)?;
    let rotate_order = RotateOrder::from_index(order_index).unwrap_or_else(|| {
        cursor.warn(format!(
            "Invalid rotate order {} in matrix xform, using xyz",
            order_index
        ));
        RotateOrder::Xyz
    });
    let translate = read_vec3(cursor, TYPE)?;
    let shear = read_vec3(cursor, TYPE)?;
    let scale_pivot = read_vec3(cursor, TYPE)?;
    let scale_pivot_translate = read_vec3(cursor, TYPE)?;
    let rotate_pivot = read_vec3(cursor, TYPE)?;
    let rotate_pivot_translate = read_vec3(cursor, TYPE)?;
    let rotate_orient = DQuat::from_array(cursor.floats::<4>(TYPE)?);
    let joint_orient = DQuat::from_array(cursor.floats::<4>(TYPE)?);
    let inverse_parent_scale = read_vec3(cursor, TYPE)?;
    let compensate_parent_scale = cursor.boolean(TYPE)?;

    Ok(TransformComponents {
        scale,
        rotate,
        rotate_order,
        translate,
        shear,
        scale_pivot,
        scale_pivot_translate,
        rotate_pivot,
        rotate_pivot_translate,
        rotate_orient,
        joint_orient,
        inverse_parent_scale,
        compensate_parent_scale,
    })
}

fn read_vec3(cursor: &mut Cursor, attr_type: AttrType) -> DecodeResult<DVec3> {
    cursor.floats::<3>(attr_type).map(DVec3::from_array)
}

fn form_type(cursor: &mut Cursor, attr_type: AttrType) -> DecodeResult<FormType> {
    let index = cursor.int(attr_type)?;
    Ok(FormType::from_index(index).unwrap_or_else(|| {
        cursor.warn(format!(
            "Invalid form type {} in {}, using open",
            index, attr_type
        ));
        FormType::Open
    }))
}

fn cvs(
    cursor: &mut Cursor,
    attr_type: AttrType,
    has_z: bool,
    has_w: bool,
) -> DecodeResult<Vec<CvValue>> {
    let count = cursor.count(attr_type)?;
    let width = 2 + usize::from(has_z) + usize::from(has_w);
    cursor.require_items(attr_type, count, width)?;

    let mut cvs = Vec::with_capacity(count);
    for _ in 0..count {
        let x = cursor.float(attr_type)?;
        let y = cursor.float(attr_type)?;
        let z = if has_z { Some(cursor.float(attr_type)?) } else { None };
        let w = if has_w { Some(cursor.float(attr_type)?) } else { None };
        cvs.push(CvValue { x, y, z, w });
    }
    Ok(cvs)
}

/// `degree spans form isRational dimension knotCount knots... cvCount cvs...`
fn decode_nurbs_curve(cursor: &mut Cursor) -> DecodeResult<NurbsCurve> {
    const TYPE: AttrType = AttrType::NurbsCurve;

    let degree = cursor.int(TYPE)?;
    let spans = cursor.int(TYPE)?;
    let form = form_type(cursor, TYPE)?;
    let is_rational = cursor.boolean(TYPE)?;
    let dimension = cursor.int(TYPE)?;
    if dimension != 2 && dimension != 3 {
        return Err(DecodeError::InvalidValue {
            expected: "curve dimension 2 or 3",
            found: dimension.to_string(),
        });
    }
    let knots = cursor.float_list(TYPE)?;
    let cvs = cvs(cursor, TYPE, dimension == 3, is_rational)?;

    Ok(NurbsCurve {
        degree,
        spans,
        form,
        is_rational,
        dimension,
        knots,
        cvs,
    })
}

/// `uDegree vDegree uForm vForm isRational uKnots... vKnots... [TRIM|NOTRIM] cvs...`
fn decode_nurbs_surface(cursor: &mut Cursor) -> DecodeResult<NurbsSurface> {
    const TYPE: AttrType = AttrType::NurbsSurface;

    let u_degree = cursor.int(TYPE)?;
    let v_degree = cursor.int(TYPE)?;
    let u_form = form_type(cursor, TYPE)?;
    let v_form = form_type(cursor, TYPE)?;
    let is_rational = cursor.boolean(TYPE)?;
    let u_knots = cursor.float_list(TYPE)?;
    let v_knots = cursor.float_list(TYPE)?;
    let trim = if cursor.accept("TRIM") {
        Some(true)
    } else if cursor.accept("NOTRIM") {
        Some(false)
    } else {
        None
    };
    let cvs = cvs(cursor, TYPE, true, is_rational)?;

    Ok(NurbsSurface {
        u_degree,
        v_degree,
        u_form,
        v_form,
        is_rational,
        u_knots,
        v_knots,
        trim,
        cvs,
    })
}

/// `sDiv tDiv uDiv pointCount x y z ...`
fn decode_lattice(cursor: &mut Cursor) -> DecodeResult<Lattice> {
    const TYPE: AttrType = AttrType::Lattice;

    let s_divisions = cursor.int(TYPE)?;
    let t_divisions = cursor.int(TYPE)?;
    let u_divisions = cursor.int(TYPE)?;
    let count = cursor.count(TYPE)?;
    cursor.require_items(TYPE, count, 3)?;
    let points = (0..count)
        .map(|_| cursor.floats::<3>(TYPE).map(DVec3::from_array))
        .collect::<DecodeResult<Vec<_>>>()?;

    Ok(Lattice {
        s_divisions,
        t_divisions,
        u_divisions,
        points,
    })
}

/// Loop over `f/h/mu/mc/fc` tags until an unrecognized token.
fn decode_poly_faces(cursor: &mut Cursor) -> DecodeResult<Vec<PolyFace>> {
    const TYPE: AttrType = AttrType::PolyFaces;

    let mut faces: Vec<PolyFace> = Vec::new();

    while let Some(tag) = cursor.peek() {
        if !matches!(tag, "f" | "h" | "mu" | "mc" | "fc") {
            break;
        }
        cursor.token(TYPE)?;

        if tag == "f" || faces.is_empty() {
            faces.push(PolyFace::default());
        }
        let Some(face) = faces.last_mut() else {
            break;
        };

        match tag {
            "f" => face.face_edges = cursor.int_list(TYPE)?,
            "h" => face.hole_edges.push(cursor.int_list(TYPE)?),
            "mu" => {
                let uv_set = cursor.int(TYPE)?;
                let uvs = cursor.int_list(TYPE)?;
                face.face_uvs.push(FaceUv { uv_set, uvs });
            }
            "mc" => {
                let color_set = cursor.int(TYPE)?;
                let colors = cursor.int_list(TYPE)?;
                face.multi_colors.push(MultiColor { color_set, colors });
            }
            _ => face.face_colors = cursor.int_list(TYPE)?,
        }
    }

    if faces.is_empty() {
        return Err(DecodeError::InvalidValue {
            expected: "polyFaces tag",
            found: cursor.peek().unwrap_or_default().to_string(),
        });
    }
    Ok(faces)
}

/// `Index_Data <Edge|Face|Vertex|UV> count (index value)...`
fn decode_poly_component(cursor: &mut Cursor) -> DecodeResult<PolyComponent> {
    const TYPE: AttrType = AttrType::DataPolyComponent;

    let header = cursor.token(TYPE)?;
    if dequote(header) != "Index_Data" {
        return Err(DecodeError::InvalidValue {
            expected: "Index_Data",
            found: header.to_string(),
        });
    }
    let kind_name = cursor.token(TYPE)?;
    let kind = ComponentKind::from_name(dequote(kind_name)).ok_or_else(|| {
        DecodeError::InvalidValue {
            expected: "component kind",
            found: kind_name.to_string(),
        }
    })?;

    let count = cursor.count(TYPE)?;
    cursor.require_items(TYPE, count, 2)?;
    let mut values = BTreeMap::new();
    for _ in 0..count {
        let index = cursor.int(TYPE)?;
        let value = cursor.float(TYPE)?;
        values.insert(index, value);
    }

    Ok(PolyComponent { kind, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ma::tokenizer::tokenize;

    fn decode(attr_type: AttrType, text: &str, size: Option<usize>) -> DecodeResult<DecodedValues> {
        let tokens = tokenize(text).unwrap();
        decode_values(attr_type, &tokens, size)
    }

    #[test]
    fn test_tuples_without_size_consume_all() {
        let decoded = decode(AttrType::Float2, "0 0 1 0 0.5 1", None).unwrap();
        assert_eq!(
            decoded.values,
            vec![
                AttrValue::Float2(DVec2::new(0.0, 0.0)),
                AttrValue::Float2(DVec2::new(1.0, 0.0)),
                AttrValue::Float2(DVec2::new(0.5, 1.0)),
            ]
        );
    }

    #[test]
    fn test_tuples_with_size_hint_clipped() {
        let tokens = tokenize("1 2 3 4 5 6").unwrap();
        let mut cursor = Cursor::new(&tokens);
        let decoded = decode_value(AttrType::Short3, &mut cursor, Some(5)).unwrap();
        assert_eq!(decoded.values.len(), 2);
        assert_eq!(decoded.consumed, Consumed::Tokens(6));

        let mut cursor = Cursor::new(&tokens);
        let decoded = decode_value(AttrType::Long2, &mut cursor, None).unwrap();
        assert_eq!(decoded.values, vec![AttrValue::Long2(IVec2::new(1, 2))]);
        assert_eq!(decoded.consumed, Consumed::Tokens(2));
    }

    #[test]
    fn test_truncated_tuple() {
        assert_eq!(
            decode(AttrType::Double3, "1 2 3 4", None),
            Err(DecodeError::TruncatedRecord {
                attr_type: AttrType::Double3,
                expected: 3,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_empty_double_array() {
        let decoded = decode(AttrType::DoubleArray, "0", None).unwrap();
        assert_eq!(decoded.values, vec![AttrValue::DoubleArray(Vec::new())]);
    }

    #[test]
    fn test_counted_arrays() {
        let decoded = decode(AttrType::Int32Array, "3 4 5 6", None).unwrap();
        assert_eq!(decoded.values, vec![AttrValue::Int32Array(vec![4, 5, 6])]);

        let decoded = decode(AttrType::ComponentList, "2 \"vtx[0:3]\" \"f[1]\"", None).unwrap();
        assert_eq!(
            decoded.values,
            vec![AttrValue::ComponentList(vec![
                "vtx[0:3]".to_string(),
                "f[1]".to_string()
            ])]
        );

        assert!(matches!(
            decode(AttrType::StringArray, "3 \"a\" \"b\"", None),
            Err(DecodeError::TruncatedRecord { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_matrix() {
        let decoded = decode(
            AttrType::Matrix,
            "1 0 0 0 0 1 0 0 0 0 1 0 10 20 30 1",
            None,
        )
        .unwrap();
        match &decoded.values[0] {
            AttrValue::Matrix(m) => {
                assert_eq!(m.transform_point3(DVec3::ZERO), DVec3::new(10.0, 20.0, 30.0))
            }
            other => panic!("Expected Matrix, got {:?}", other),
        }
    }

    #[test]
    fn test_matrix_xform_bad_rotate_order_warns() {
        let text = "1 1 1 0 0 0 9 1 2 3 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 1 0 0 0 1 1 1 1 yes";
        let decoded = decode(AttrType::MatrixXform, text, None).unwrap();
        assert_eq!(decoded.warnings.len(), 1);
        match &decoded.values[0] {
            AttrValue::MatrixXform(xform) => {
                assert_eq!(xform.rotate_order, RotateOrder::Xyz);
                assert_eq!(xform.translate, DVec3::new(1.0, 2.0, 3.0));
                assert!(xform.compensate_parent_scale);
            }
            other => panic!("Expected MatrixXform, got {:?}", other),
        }
    }

    #[test]
    fn test_nurbs_curve_3d_non_rational() {
        let text = "3 1 0 no 3 6 0 0 0 1 1 1 4 0 0 0 1 0 0 1 1 0 0 1 0";
        let decoded = decode(AttrType::NurbsCurve, text, None).unwrap();
        match &decoded.values[0] {
            AttrValue::NurbsCurve(curve) => {
                assert_eq!(curve.degree, 3);
                assert_eq!(curve.knots.len(), 6);
                assert_eq!(curve.cvs.len(), 4);
                assert!(curve.cvs.iter().all(|cv| cv.z.is_some() && cv.w.is_none()));
            }
            other => panic!("Expected NurbsCurve, got {:?}", other),
        }
    }

    #[test]
    fn test_nurbs_curve_invalid_form_defaults_open() {
        let text = "1 1 7 yes 2 2 0 1 2 0 0 1 1 1 1";
        let decoded = decode(AttrType::NurbsCurve, text, None).unwrap();
        assert_eq!(decoded.warnings.len(), 1);
        match &decoded.values[0] {
            AttrValue::NurbsCurve(curve) => {
                assert_eq!(curve.form, FormType::Open);
                assert_eq!(curve.cvs[1].w, Some(1.0));
                assert_eq!(curve.cvs[1].z, None);
            }
            other => panic!("Expected NurbsCurve, got {:?}", other),
        }
    }

    #[test]
    fn test_nurbs_surface_with_trim_keyword() {
        let text = "1 1 0 0 no 2 0 1 2 0 1 \"TRIM\" 4 0 0 0 1 0 0 0 1 0 1 1 0";
        let decoded = decode(AttrType::NurbsSurface, text, None).unwrap();
        match &decoded.values[0] {
            AttrValue::NurbsSurface(surface) => {
                assert_eq!(surface.trim, Some(true));
                assert_eq!(surface.cvs.len(), 4);
                assert_eq!(surface.cv_width(), 3);
            }
            other => panic!("Expected NurbsSurface, got {:?}", other),
        }
    }

    #[test]
    fn test_poly_faces() {
        let text = "f 3 0 1 2 mu 0 3 0 1 2 f 4 3 4 5 -1 h 3 6 7 8 mc 0 4 0 1 2 3";
        let tokens = tokenize(text).unwrap();
        let mut cursor = Cursor::new(&tokens);
        let decoded = decode_value(AttrType::PolyFaces, &mut cursor, None).unwrap();
        assert_eq!(decoded.consumed, Consumed::Tokens(tokens.len()));
        assert_eq!(decoded.values.len(), 2);
        match &decoded.values[1] {
            AttrValue::PolyFaces(face) => {
                assert_eq!(face.face_edges, vec![3, 4, 5, -1]);
                assert_eq!(face.hole_edges, vec![vec![6, 7, 8]]);
                assert_eq!(face.multi_colors[0].colors.len(), 4);
            }
            other => panic!("Expected PolyFaces, got {:?}", other),
        }
    }

    #[test]
    fn test_poly_faces_stops_at_unknown_tag() {
        let tokens = tokenize("f 3 0 1 2 zz 1").unwrap();
        let mut cursor = Cursor::new(&tokens);
        let decoded = decode_value(AttrType::PolyFaces, &mut cursor, None).unwrap();
        assert_eq!(decoded.consumed, Consumed::Tokens(5));
        assert_eq!(cursor.peek(), Some("zz"));
    }

    #[test]
    fn test_poly_component() {
        let decoded = decode(
            AttrType::DataPolyComponent,
            "Index_Data Vertex 3 5 0.5 1 0.25 3 1",
            None,
        )
        .unwrap();
        match &decoded.values[0] {
            AttrValue::DataPolyComponent(component) => {
                assert_eq!(component.kind, ComponentKind::Vertex);
                let keys: Vec<_> = component.values.keys().copied().collect();
                assert_eq!(keys, vec![1, 3, 5]);
            }
            other => panic!("Expected DataPolyComponent, got {:?}", other),
        }
    }

    #[test]
    fn test_mesh_and_trimface_consume_remainder() {
        let tokens = tokenize("v 3 0 0 0 1 0 0 0 1 0 e 3 0 1 \"hard\"").unwrap();
        let mut cursor = Cursor::new(&tokens);
        let decoded = decode_value(AttrType::Mesh, &mut cursor, None).unwrap();
        assert_eq!(decoded.consumed, Consumed::Remainder);
        assert_eq!(decoded.values, vec![AttrValue::Mesh(tokens.clone())]);
        assert!(cursor.is_empty());

        let decoded = decode(AttrType::NurbsTrimface, "1 0 2 3", None).unwrap();
        assert_eq!(
            decoded.values,
            vec![AttrValue::NurbsTrimface(vec![
                "1".to_string(),
                "0".to_string(),
                "2".to_string(),
                "3".to_string(),
            ])]
        );
    }

    #[test]
    fn test_opaque_placeholder_without_tokens() {
        let decoded = decode(AttrType::NurbsTrimface, "", None).unwrap();
        assert_eq!(decoded.values, vec![AttrValue::NurbsTrimface(Vec::new())]);
        let decoded = decode(AttrType::Mesh, "", None).unwrap();
        assert_eq!(decoded.values, vec![AttrValue::Mesh(Vec::new())]);
    }

    #[test]
    fn test_huge_counts_are_truncated() {
        let huge = "4611686018427387904";
        for (attr_type, text) in [
            (AttrType::PointArray, format!("{} 0", huge)),
            (AttrType::VectorArray, format!("{} 0", huge)),
            (AttrType::Lattice, format!("2 2 1 {} 0", huge)),
            (AttrType::NurbsCurve, format!("1 1 0 no 3 0 {} 0", huge)),
            (AttrType::NurbsSurface, format!("1 1 0 0 yes 0 0 {} 0", huge)),
            (
                AttrType::DataPolyComponent,
                format!("Index_Data Edge {} 0 0.5", huge),
            ),
        ] {
            match decode(attr_type, &text, None) {
                Err(DecodeError::TruncatedRecord { attr_type: ty, .. }) => {
                    assert_eq!(ty, attr_type)
                }
                other => panic!("Expected TruncatedRecord for {}, got {:?}", attr_type, other),
            }
        }
    }

    #[test]
    fn test_attribute_alias() {
        let decoded = decode(
            AttrType::AttributeAlias,
            "{\"blendA\",\"weight[0]\",\"blendB\",\"weight[1]\"}",
            None,
        )
        .unwrap();
        match &decoded.values[0] {
            AttrValue::AttributeAlias(pairs) => {
                assert_eq!(pairs.len(), 2);
                assert_eq!(pairs[1].alias, "blendB");
                assert_eq!(pairs[1].attribute, "weight[1]");
            }
            other => panic!("Expected AttributeAlias, got {:?}", other),
        }
    }

    #[test]
    fn test_point_and_vector_arrays() {
        let decoded = decode(AttrType::PointArray, "2 0 0 0 1 1 2 3 1", None).unwrap();
        assert_eq!(
            decoded.values,
            vec![AttrValue::PointArray(vec![
                DVec4::new(0.0, 0.0, 0.0, 1.0),
                DVec4::new(1.0, 2.0, 3.0, 1.0)
            ])]
        );
        assert!(matches!(
            decode(AttrType::VectorArray, "2 0 0 0 1 1", None),
            Err(DecodeError::TruncatedRecord { expected: 6, actual: 5, .. })
        ));
    }

    #[test]
    fn test_lattice() {
        let decoded = decode(AttrType::Lattice, "2 2 1 4 0 0 0 1 0 0 0 1 0 1 1 0", None).unwrap();
        match &decoded.values[0] {
            AttrValue::Lattice(lattice) => {
                assert_eq!(lattice.s_divisions, 2);
                assert_eq!(lattice.points.len(), 4);
            }
            other => panic!("Expected Lattice, got {:?}", other),
        }
    }
}
