//! STL 读取：格式判别、二进制与 ASCII 解码。

use std::io::{self, Cursor};

use byteorder::{LittleEndian, ReadBytesExt};
use cadview_core::geometry::BoundingBox;
use cadview_core::mesh::Model3D;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Diagnostic, DiagnosticKind, Parsed};

const HEADER_LEN: usize = 80;
const COUNT_LEN: usize = 4;
const TRIANGLE_LEN: usize = 50;
const DETECTION_WINDOW: usize = 1024;

/// 三角形数量上限，防止损坏的长度字段触发超大内存分配。
pub const DEFAULT_MAX_TRIANGLES: u32 = 10_000_000;

/// 判别 ASCII/二进制 STL 的策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StlDetection {
    /// 仅比较前 5 个字节是否为 `solid`（忽略大小写）。
    Prefix,
    /// 前缀匹配之外，还要求前 1024 字节中同时出现 `facet` 与 `vertex`。
    /// 可避免把文件头恰好以 `solid` 开头的二进制文件误判为 ASCII。
    #[default]
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Ascii,
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StlOptions {
    pub detection: StlDetection,
    pub max_triangles: u32,
}

impl Default for StlOptions {
    fn default() -> Self {
        Self {
            detection: StlDetection::default(),
            max_triangles: DEFAULT_MAX_TRIANGLES,
        }
    }
}

/// 二进制 STL 的结构性错误，均会终止整次解析。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StlError {
    #[error("STL 数据过短：仅 {len} 字节，至少需要 84 字节")]
    HeaderTooShort { len: usize },
    #[error("无效的三角形数量 {count}（允许范围 1..={max}）")]
    InvalidTriangleCount { count: i32, max: u32 },
    #[error("STL 数据被截断：{triangles} 个三角形需要 {expected} 字节，实际为 {actual} 字节")]
    Truncated {
        triangles: usize,
        expected: usize,
        actual: usize,
    },
}

/// 判别格式。只读取借用的切片，不消费任何输入。
pub fn detect_format(data: &[u8], detection: StlDetection) -> StlFormat {
    let has_prefix = data.len() >= 5 && data[..5].eq_ignore_ascii_case(b"solid");
    if !has_prefix {
        return StlFormat::Binary;
    }

    match detection {
        StlDetection::Prefix => StlFormat::Ascii,
        StlDetection::Strict => {
            let window = &data[..data.len().min(DETECTION_WINDOW)];
            if contains_ignore_case(window, b"facet") && contains_ignore_case(window, b"vertex") {
                StlFormat::Ascii
            } else {
                StlFormat::Binary
            }
        }
    }
}

/// 判别格式后交给对应的解码器。不足 84 字节的输入无论格式均视为无效。
pub fn parse(data: &[u8], options: &StlOptions) -> Result<Parsed<Model3D>, StlError> {
    if data.len() < HEADER_LEN + COUNT_LEN {
        return Err(StlError::HeaderTooShort { len: data.len() });
    }
    match detect_format(data, options.detection) {
        StlFormat::Ascii => Ok(parse_ascii(&String::from_utf8_lossy(data))),
        StlFormat::Binary => parse_binary(data, options.max_triangles),
    }
}

/// 解码小端二进制 STL。
///
/// 布局：80 字节文件头、`i32` 三角形数量，随后每个三角形 50 字节
/// （法线 3×f32、三个顶点各 3×f32、2 字节属性）。属性字段始终跳过。
pub fn parse_binary(data: &[u8], max_triangles: u32) -> Result<Parsed<Model3D>, StlError> {
    if data.len() < HEADER_LEN + COUNT_LEN {
        return Err(StlError::HeaderTooShort { len: data.len() });
    }

    let mut cursor = Cursor::new(data);
    cursor.set_position(HEADER_LEN as u64);
    let declared = cursor
        .read_i32::<LittleEndian>()
        .map_err(|_| StlError::HeaderTooShort { len: data.len() })?;
    if declared <= 0 || (declared as u32) > max_triangles {
        return Err(StlError::InvalidTriangleCount {
            count: declared,
            max: max_triangles,
        });
    }

    let triangles = declared as usize;
    let expected = HEADER_LEN + COUNT_LEN + triangles * TRIANGLE_LEN;
    let truncated = StlError::Truncated {
        triangles,
        expected,
        actual: data.len(),
    };
    if data.len() < expected {
        return Err(truncated);
    }

    let mut vertices = Vec::with_capacity(triangles * 9);
    let mut normals = Vec::with_capacity(triangles * 9);
    let mut bounds = BoundingBox::empty();

    for _ in 0..triangles {
        let normal = read_vec3(&mut cursor).map_err(|_| truncated.clone())?;
        for _ in 0..3 {
            let vertex = read_vec3(&mut cursor).map_err(|_| truncated.clone())?;
            vertices.extend_from_slice(&vertex.to_array());
            normals.extend_from_slice(&normal.to_array());
            bounds.include_point(vertex);
        }
        cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| truncated.clone())?;
    }

    let model = Model3D {
        vertices,
        normals,
        triangle_count: triangles,
        bounds: bounds.or_zero(),
    };
    Ok(Parsed::new(model, Vec::new()))
}

/// 逐行扫描 ASCII STL。
///
/// 只识别 `facet normal`、`vertex` 前缀与 `endfacet` 行（区分大小写），其余行忽略。
/// 未设置法线的顶点不会补齐法线，此时两个缓冲长度不一致并记录诊断。
pub fn parse_ascii(source: &str) -> Parsed<Model3D> {
    let mut diagnostics = Vec::new();
    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut triangle_count = 0;
    let mut bounds = BoundingBox::empty();
    let mut pending_normal: Option<Vec3> = None;

    for (offset, raw) in source.lines().enumerate() {
        let line = offset + 1;
        let trimmed = raw.trim();

        if trimmed.starts_with("facet normal") {
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            if tokens.len() >= 5 {
                pending_normal = Some(read_tokens(&tokens[2..5], line, "normal", &mut diagnostics));
            }
        } else if trimmed.starts_with("vertex") {
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            if tokens.len() >= 4 {
                let vertex = read_tokens(&tokens[1..4], line, "vertex", &mut diagnostics);
                vertices.extend_from_slice(&vertex.to_array());
                if let Some(normal) = pending_normal {
                    normals.extend_from_slice(&normal.to_array());
                }
                bounds.include_point(vertex);
            }
        } else if trimmed == "endfacet" {
            triangle_count += 1;
            pending_normal = None;
        }
    }

    if vertices.len() != normals.len() {
        diagnostics.push(Diagnostic::new(
            0,
            DiagnosticKind::UnpairedNormals {
                vertices: vertices.len() / 3,
                normals: normals.len() / 3,
            },
        ));
    }

    let model = Model3D {
        vertices,
        normals,
        triangle_count,
        bounds: bounds.or_zero(),
    };
    Parsed::new(model, diagnostics)
}

fn read_vec3(cursor: &mut Cursor<&[u8]>) -> io::Result<Vec3> {
    let x = cursor.read_f32::<LittleEndian>()?;
    let y = cursor.read_f32::<LittleEndian>()?;
    let z = cursor.read_f32::<LittleEndian>()?;
    Ok(Vec3::new(x, y, z))
}

fn read_tokens(tokens: &[&str], line: usize, field: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec3 {
    let mut values = [0.0f32; 3];
    for (slot, token) in values.iter_mut().zip(tokens) {
        *slot = token.parse::<f32>().unwrap_or_else(|_| {
            diagnostics.push(Diagnostic::new(
                line,
                DiagnosticKind::NumericDefaulted {
                    field: field.to_string(),
                    value: token.to_string(),
                },
            ));
            0.0
        });
    }
    Vec3::from_array(values)
}

fn contains_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
