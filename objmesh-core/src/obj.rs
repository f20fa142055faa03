//! Wavefront OBJ parser.
//!
//! Only three record kinds carry meaning:
//!
//! ```text
//! v  x y z              # position, widens the bounding box
//! vn x y z              # normal
//! f  p[/t][/n] ...      # face, fan-triangulated from its first corner
//! ```
//!
//! Every other record (`vt`, `g`, `o`, `usemtl`, comments, blank lines) is
//! skipped. Indices are 1-based in the text and stored 0-based.

use std::io::BufRead;

use log::debug;
use nalgebra::{Point3, Vector3};
use nom::{
    branch::alt,
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, eof, map_res, opt, peek, verify},
    multi::separated_list1,
    number::complete::float,
    sequence::{preceded, terminated, tuple},
    IResult,
};

use crate::error::{MeshError, MeshResult};
use crate::geometry::BoundingBox;

/// Raw contents of an OBJ source, before triangle assembly.
#[derive(Debug, Clone, Default)]
pub struct ObjData {
    pub positions: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    /// Position index triple per emitted triangle
    pub v_elements: Vec<u32>,
    /// Normal index triple per emitted triangle, or empty
    pub n_elements: Vec<u32>,
    pub bounds: BoundingBox,
}

/// One corner of a face record, indices still 1-based
#[derive(Debug, Clone, Copy, PartialEq)]
struct FaceCorner {
    position: u32,
    normal: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
enum Record {
    Position(Point3<f32>),
    Normal(Vector3<f32>),
    Face(Vec<FaceCorner>),
    Ignored,
}

/// Parse OBJ text held in memory
pub fn parse_obj_str(input: &str) -> MeshResult<ObjData> {
    parse_obj(input.as_bytes(), "<memory>")
}

/// Parse OBJ text from a reader, one line at a time.
///
/// `source_name` labels the source in errors and logs.
pub fn parse_obj<R: BufRead>(reader: R, source_name: &str) -> MeshResult<ObjData> {
    let mut data = ObjData::default();
    // Whether the faces seen so far carry normals; fixed by the first face
    let mut faces_have_normals: Option<bool> = None;
    // Source line of each emitted triangle, for index errors
    let mut triangle_lines = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.map_err(|e| MeshError::unavailable(source_name, e))?;
        let content = line.split_once('#').map_or(line.as_str(), |(before, _)| before);

        match parse_record(content.trim_end(), line_no)? {
            Record::Position(position) => {
                data.bounds.include(&position);
                data.positions.push(position);
            }
            Record::Normal(normal) => data.normals.push(normal),
            Record::Face(corners) => {
                let with_normals = corners[0].normal.is_some();
                match faces_have_normals {
                    None => faces_have_normals = Some(with_normals),
                    Some(expected) if expected != with_normals => {
                        return Err(MeshError::malformed(
                            line_no,
                            "faces with and without normals cannot be mixed",
                        ));
                    }
                    Some(_) => {}
                }
                push_face(&mut data, &corners, line_no)?;
                triangle_lines.resize(data.v_elements.len() / 3, line_no);
            }
            Record::Ignored => {}
        }
    }

    // Faces may reference records further down, so indices are resolved
    // against the final counts
    resolve_indices(&mut data.v_elements, &triangle_lines, data.positions.len(), "vertex")?;
    resolve_indices(&mut data.n_elements, &triangle_lines, data.normals.len(), "normal")?;

    debug!(
        "Parsed {}: {} positions, {} normals, {} triangles",
        source_name,
        data.positions.len(),
        data.normals.len(),
        data.v_elements.len() / 3
    );

    Ok(data)
}

/// Fan-triangulate a face from its first corner, appending 1-based indices
fn push_face(data: &mut ObjData, corners: &[FaceCorner], line_no: usize) -> MeshResult<()> {
    let with_normals = corners[0].normal.is_some();
    let normals = if with_normals {
        corners
            .iter()
            .map(|corner| {
                corner.normal.ok_or_else(|| {
                    MeshError::malformed(line_no, "every corner of this face needs a normal index")
                })
            })
            .collect::<MeshResult<Vec<u32>>>()?
    } else {
        Vec::new()
    };

    for i in 0..corners.len() - 2 {
        data.v_elements.extend_from_slice(&[
            corners[0].position,
            corners[i + 1].position,
            corners[i + 2].position,
        ]);
        if with_normals {
            data.n_elements
                .extend_from_slice(&[normals[0], normals[i + 1], normals[i + 2]]);
        }
    }

    Ok(())
}

/// Convert 1-based indices to 0-based in place, checking each against `count`.
///
/// `triangle_lines[t]` is the source line of the triangle owning
/// `elements[3 * t..3 * t + 3]`.
fn resolve_indices(
    elements: &mut [u32],
    triangle_lines: &[usize],
    count: usize,
    kind: &str,
) -> MeshResult<()> {
    for (i, element) in elements.iter_mut().enumerate() {
        let index = *element;
        match index.checked_sub(1) {
            Some(zero_based) if (zero_based as usize) < count => *element = zero_based,
            _ => {
                return Err(MeshError::malformed(
                    triangle_lines[i / 3],
                    format!("{} index {} out of range (have {})", kind, index, count),
                ))
            }
        }
    }

    Ok(())
}

fn parse_record(line: &str, line_no: usize) -> MeshResult<Record> {
    let (rest, tag) =
        keyword(line).map_err(|_| MeshError::malformed(line_no, "unreadable line"))?;

    let parsed = match tag {
        "v" => all_consuming(parse_vector3)(rest)
            .map(|(_, (x, y, z))| Record::Position(Point3::new(x, y, z))),
        "vn" => all_consuming(parse_vector3)(rest)
            .map(|(_, (x, y, z))| Record::Normal(Vector3::new(x, y, z))),
        "f" => all_consuming(parse_face)(rest).map(|(_, corners)| Record::Face(corners)),
        _ => return Ok(Record::Ignored),
    };

    parsed.map_err(|_| {
        MeshError::malformed(
            line_no,
            format!("invalid '{}' record: {}", tag, line.trim()),
        )
    })
}

/// Leading tag of a line, after optional indentation
fn keyword(input: &str) -> IResult<&str, &str> {
    preceded(
        space0,
        nom::bytes::complete::take_till(|c: char| c.is_ascii_whitespace()),
    )(input)
}

/// Three whitespace-separated floats; trailing fields are ignored
fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, (x, y, z)) = tuple((number, number, number))(input)?;
    let (input, _) = nom::combinator::rest(input)?;
    Ok((input, (x, y, z)))
}

/// A finite float that fills its whole whitespace-delimited token
fn number(input: &str) -> IResult<&str, f32> {
    preceded(
        space1,
        terminated(
            verify(float, |v: &f32| v.is_finite()),
            peek(alt((space1, eof))),
        ),
    )(input)
}

fn parse_face(input: &str) -> IResult<&str, Vec<FaceCorner>> {
    let (input, corners) = preceded(space1, separated_list1(space1, face_corner))(input)?;
    let (input, _) = space0(input)?;

    if corners.len() < 3 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Count,
        )));
    }

    Ok((input, corners))
}

/// `p`, `p/t`, `p//n` or `p/t/n`; the texture index is read and dropped
fn face_corner(input: &str) -> IResult<&str, FaceCorner> {
    let (input, position) = index(input)?;
    let (input, texture) = opt(preceded(char('/'), opt(index)))(input)?;
    let (input, normal) = match texture {
        Some(_) => opt(preceded(char('/'), opt(index)))(input)?,
        None => (input, None),
    };

    Ok((
        input,
        FaceCorner {
            position,
            normal: normal.flatten(),
        },
    ))
}

fn index(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn test_parse_single_triangle() {
        let data = parse_obj_str(TRIANGLE).unwrap();
        assert_eq!(data.positions.len(), 3);
        assert!(data.normals.is_empty());
        assert_eq!(data.v_elements, vec![0, 1, 2]);
        assert!(data.n_elements.is_empty());
        assert_eq!(data.bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(data.bounds.max, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_parse_face_with_normals() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\nf 1//1 2//2 3//3\n";
        let data = parse_obj_str(input).unwrap();
        assert_eq!(data.normals.len(), 3);
        assert_eq!(data.n_elements, vec![0, 1, 2]);
        assert_eq!(data.v_elements, vec![0, 1, 2]);
    }

    #[test]
    fn test_quad_is_fanned_from_first_corner() {
        let input = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let data = parse_obj_str(input).unwrap();
        assert_eq!(data.v_elements, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_pentagon_yields_three_triangles() {
        let input = "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1 4/4/1 5/5/1\n";
        let data = parse_obj_str(input).unwrap();
        assert_eq!(data.v_elements.len(), 9);
        assert_eq!(data.v_elements, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
        assert_eq!(data.n_elements, vec![0; 9]);
    }

    #[test]
    fn test_faces_may_precede_their_vertices() {
        let data = parse_obj_str("f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();
        assert_eq!(data.v_elements, vec![0, 1, 2]);

        let input = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1//1 2//1 3//1 4//1\nvn 0 0 1\n";
        let data = parse_obj_str(input).unwrap();
        assert_eq!(data.v_elements, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(data.n_elements, vec![0; 6]);
    }

    #[test]
    fn test_late_range_error_reports_face_line() {
        let input = "v 0 0 0\nf 1 2 3\nv 1 0 0\nv 0 1 0\nf 1 2 3 4\n";
        match parse_obj_str(input).unwrap_err() {
            MeshError::MalformedGeometry { line, message } => {
                assert_eq!(line, 5);
                assert!(message.contains("vertex index 4"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_non_finite_coordinates() {
        for input in ["v nan 0 0\n", "v inf 0 0\n", "v 0 -infinity 0\n", "vn 0 0 NaN\n"] {
            let err = parse_obj_str(input).unwrap_err();
            assert!(err.is_malformed(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn test_texture_only_corners_have_no_normals() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/1 3/1\n";
        let data = parse_obj_str(input).unwrap();
        assert_eq!(data.v_elements, vec![0, 1, 2]);
        assert!(data.n_elements.is_empty());
    }

    #[test]
    fn test_ignores_other_records() {
        let input = "# comment\nmtllib scene.mtl\no thing\ng group\nusemtl stone\ns off\nvt 0.5 0.5\n\n   \n";
        let data = parse_obj_str(input).unwrap();
        assert!(data.positions.is_empty());
        assert!(data.v_elements.is_empty());
        assert!(data.bounds.is_empty());
    }

    #[test]
    fn test_strips_trailing_comments() {
        let input = "v 0 0 0 # origin\nv 1 0 0\nv 0 1 0\nf 1 2 3 # first face\n";
        let data = parse_obj_str(input).unwrap();
        assert_eq!(data.positions.len(), 3);
        assert_eq!(data.v_elements, vec![0, 1, 2]);
    }

    #[test]
    fn test_tolerates_whitespace_and_crlf() {
        let input = "  v \t 1.5   -2e1\t3 \r\nv 0 0 0 1.0\r\n";
        let data = parse_obj_str(input).unwrap();
        assert_eq!(data.positions[0], Point3::new(1.5, -20.0, 3.0));
        assert_eq!(data.positions[1], Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_rejects_non_numeric_field() {
        let err = parse_obj_str("v 0 0 0\nv 1 zero 0\n").unwrap_err();
        match err {
            MeshError::MalformedGeometry { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse_obj_str("v 1.0abc 0 0\n").unwrap_err().is_malformed());
        assert!(parse_obj_str("vn 1 2\n").unwrap_err().is_malformed());
    }

    #[test]
    fn test_rejects_out_of_range_indices() {
        let err = parse_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 99\n").unwrap_err();
        assert!(err.is_malformed());
        assert!(format!("{err}").contains("99"));

        assert!(parse_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n")
            .unwrap_err()
            .is_malformed());
        assert!(parse_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -1 -2 -3\n")
            .unwrap_err()
            .is_malformed());
        assert!(parse_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//4 2//4 3//4\n")
            .unwrap_err()
            .is_malformed());
    }

    #[test]
    fn test_rejects_short_and_partial_faces() {
        assert!(parse_obj_str("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err().is_malformed());
        assert!(parse_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf\n").unwrap_err().is_malformed());

        let partial = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2 3//1\n";
        assert!(parse_obj_str(partial).unwrap_err().is_malformed());
    }

    #[test]
    fn test_rejects_mixed_normal_presence() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\nf 1 2 3\n";
        let err = parse_obj_str(input).unwrap_err();
        match err {
            MeshError::MalformedGeometry { line, .. } => assert_eq!(line, 6),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_index_invariants() {
        let input = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0.5 2 0\nf 1 2 3\nf 1 3 4 5\nf 2 3 4\n";
        let data = parse_obj_str(input).unwrap();
        assert_eq!(data.v_elements.len() % 3, 0);
        assert_eq!(data.v_elements.len(), 3 * (1 + 2 + 1));
        assert!(data.v_elements.iter().all(|&i| (i as usize) < data.positions.len()));
    }

    #[test]
    fn test_face_corner_forms() {
        let (_, corner) = face_corner("3").unwrap();
        assert_eq!(corner, FaceCorner { position: 3, normal: None });
        let (_, corner) = face_corner("3/7").unwrap();
        assert_eq!(corner, FaceCorner { position: 3, normal: None });
        let (_, corner) = face_corner("3//5").unwrap();
        assert_eq!(corner, FaceCorner { position: 3, normal: Some(5) });
        let (_, corner) = face_corner("3/7/5").unwrap();
        assert_eq!(corner, FaceCorner { position: 3, normal: Some(5) });
    }
}
