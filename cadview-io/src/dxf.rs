//! ASCII DXF 读取：组码扫描与 ENTITIES 段实体解码。

use cadview_core::drawing::{Arc, Circle, DxfEntity, Line, Model2D, Polyline, scan_drawing_bounds};
use cadview_core::geometry::{Bounds2D, Point2};

use crate::{Diagnostic, DiagnosticKind, Parsed};

/// 解析 DXF 文本。数值级问题在字段内吸收并以诊断形式返回，单个实体不会中断整份文件。
pub fn parse(source: &str) -> Parsed<Model2D> {
    let tags = TagScanner::new(source);
    DxfDecoder::new(&tags).decode()
}

/// 一个 (组码, 值) 对。组码保持原始字符串，由解码器决定含义。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    pub index: usize,
    pub code: &'a str,
    pub value: &'a str,
}

impl Tag<'_> {
    /// 组码 0 表示实体、段或子记录的边界。
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.code == "0"
    }

    #[inline]
    pub fn is_marker(&self, name: &str) -> bool {
        self.is_boundary() && self.value == name
    }

    /// 组码所在的源文本行号（从 1 开始）。
    #[inline]
    pub fn line(&self) -> usize {
        self.index * 2 + 1
    }
}

/// 按行切分源文本，以对序号随机访问 (组码, 值)。
///
/// `\r\n`、`\n` 与单独的 `\r` 都视为行结束。行内容在访问时才去除首尾空白；
/// 行数为奇数时最后一行被丢弃。
#[derive(Debug)]
pub struct TagScanner<'a> {
    lines: Vec<&'a str>,
}

impl<'a> TagScanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: split_lines(source),
        }
    }

    #[inline]
    pub fn pair_count(&self) -> usize {
        self.lines.len() / 2
    }

    pub fn pair(&self, index: usize) -> Option<Tag<'a>> {
        let code = self.lines.get(index * 2)?;
        let value = self.lines.get(index * 2 + 1)?;
        Some(Tag {
            index,
            code: code.trim(),
            value: value.trim(),
        })
    }

    /// 返回 `[start, end)` 区间内的标签。
    pub fn range(&self, start: usize, end: usize) -> impl Iterator<Item = Tag<'a>> + '_ {
        (start..end.min(self.pair_count())).filter_map(move |index| self.pair(index))
    }

    /// 从 `start` 开始的全部标签。
    pub fn pairs_from(&self, start: usize) -> impl Iterator<Item = Tag<'a>> + '_ {
        self.range(start, self.pair_count())
    }

    /// 自 `start` 起第一个组码 0 的位置；找不到时返回对总数。
    pub fn next_boundary(&self, start: usize) -> usize {
        self.pairs_from(start)
            .find(|tag| tag.is_boundary())
            .map(|tag| tag.index)
            .unwrap_or_else(|| self.pair_count().max(start))
    }
}

/// 末尾的行结束符不产生额外的空行。
fn split_lines(source: &str) -> Vec<&str> {
    let bytes = source.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\n' => {
                lines.push(&source[start..pos]);
                pos += 1;
                start = pos;
            }
            b'\r' => {
                lines.push(&source[start..pos]);
                pos += if bytes.get(pos + 1) == Some(&b'\n') { 2 } else { 1 };
                start = pos;
            }
            _ => pos += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&source[start..]);
    }
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionState {
    OutsideEntities,
    InsideEntities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Line,
    Arc,
    Circle,
    Polyline,
    LwPolyline,
}

impl EntityKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "LINE" => Some(Self::Line),
            "ARC" => Some(Self::Arc),
            "CIRCLE" => Some(Self::Circle),
            "POLYLINE" => Some(Self::Polyline),
            "LWPOLYLINE" => Some(Self::LwPolyline),
            _ => None,
        }
    }
}

/// 解码出的实体及其后第一个未消费标签的序号。
struct DecodedEntity {
    entity: DxfEntity,
    next: usize,
}

struct DxfDecoder<'s, 'a> {
    tags: &'s TagScanner<'a>,
    diagnostics: Vec<Diagnostic>,
}

impl<'s, 'a> DxfDecoder<'s, 'a> {
    fn new(tags: &'s TagScanner<'a>) -> Self {
        Self {
            tags,
            diagnostics: Vec::new(),
        }
    }

    fn decode(mut self) -> Parsed<Model2D> {
        let tags = self.tags;
        let mut entities = Vec::new();
        let mut state = SectionState::OutsideEntities;
        let mut index = 0;

        while let Some(tag) = tags.pair(index) {
            index += 1;

            if tag.is_marker("SECTION") {
                if let Some(name) = tags.pair(index) {
                    if name.code == "2" && name.value == "ENTITIES" {
                        state = SectionState::InsideEntities;
                        index += 1;
                        continue;
                    }
                }
            }

            if tag.is_marker("ENDSEC") {
                state = SectionState::OutsideEntities;
                continue;
            }

            if state != SectionState::InsideEntities || !tag.is_boundary() {
                continue;
            }

            // 未支持的实体类型直接跳过，其字段会在后续循环中被忽略
            let Some(kind) = EntityKind::from_name(tag.value) else {
                continue;
            };

            let decoded = self.decode_entity(kind, index);
            entities.push(decoded.entity);
            index = decoded.next;
        }

        self.finish(entities)
    }

    fn finish(mut self, entities: Vec<DxfEntity>) -> Parsed<Model2D> {
        if entities.is_empty() {
            self.diagnostics
                .push(Diagnostic::new(0, DiagnosticKind::EmptyDrawing));
            return Parsed::new(Model2D::placeholder(), self.diagnostics);
        }

        let bounds = match scan_drawing_bounds(&entities) {
            Some(bounds) => bounds,
            None => {
                self.diagnostics
                    .push(Diagnostic::new(0, DiagnosticKind::DefaultBounds));
                Bounds2D::default_view()
            }
        };

        Parsed::new(Model2D { entities, bounds }, self.diagnostics)
    }

    fn decode_entity(&mut self, kind: EntityKind, start: usize) -> DecodedEntity {
        match kind {
            EntityKind::Line => self.decode_line(start),
            EntityKind::Arc => self.decode_arc(start),
            EntityKind::Circle => self.decode_circle(start),
            EntityKind::Polyline => self.decode_polyline(start),
            EntityKind::LwPolyline => self.decode_lwpolyline(start),
        }
    }

    fn decode_line(&mut self, start: usize) -> DecodedEntity {
        let tags = self.tags;
        let end = tags.next_boundary(start);
        let (mut x1, mut y1, mut x2, mut y2) = (0.0, 0.0, 0.0, 0.0);
        for tag in tags.range(start, end) {
            match tag.code {
                "10" => x1 = self.number(tag),
                "20" => y1 = self.number(tag),
                "11" => x2 = self.number(tag),
                "21" => y2 = self.number(tag),
                _ => {}
            }
        }

        DecodedEntity {
            entity: DxfEntity::Line(Line {
                start: Point2::new(x1, y1),
                end: Point2::new(x2, y2),
            }),
            next: end,
        }
    }

    fn decode_arc(&mut self, start: usize) -> DecodedEntity {
        let tags = self.tags;
        let end = tags.next_boundary(start);
        let (mut cx, mut cy, mut radius) = (0.0, 0.0, 0.0);
        let (mut start_angle, mut end_angle) = (0.0, 0.0);
        for tag in tags.range(start, end) {
            match tag.code {
                "10" => cx = self.number(tag),
                "20" => cy = self.number(tag),
                "40" => radius = self.number(tag),
                "50" => start_angle = self.number(tag),
                "51" => end_angle = self.number(tag),
                _ => {}
            }
        }

        DecodedEntity {
            entity: DxfEntity::Arc(Arc {
                center: Point2::new(cx, cy),
                radius,
                start_angle,
                end_angle,
            }),
            next: end,
        }
    }

    fn decode_circle(&mut self, start: usize) -> DecodedEntity {
        let tags = self.tags;
        let end = tags.next_boundary(start);
        let (mut cx, mut cy, mut radius) = (0.0, 0.0, 0.0);
        for tag in tags.range(start, end) {
            match tag.code {
                "10" => cx = self.number(tag),
                "20" => cy = self.number(tag),
                "40" => radius = self.number(tag),
                _ => {}
            }
        }

        DecodedEntity {
            entity: DxfEntity::Circle(Circle {
                center: Point2::new(cx, cy),
                radius,
            }),
            next: end,
        }
    }

    /// POLYLINE 头部后跟若干 VERTEX 子记录，以 SEQEND 结束。
    /// 其它组码 0 标记同样视为结束，返回的 `next` 指向该标记本身。
    fn decode_polyline(&mut self, start: usize) -> DecodedEntity {
        let tags = self.tags;
        let mut points = Vec::new();
        let mut is_closed = false;
        let mut index = start;

        while let Some(tag) = tags.pair(index) {
            if tag.is_boundary() {
                if tag.value != "VERTEX" {
                    break;
                }
                let vertex_end = tags.next_boundary(index + 1);
                let (mut x, mut y) = (0.0, 0.0);
                for field in tags.range(index + 1, vertex_end) {
                    match field.code {
                        "10" => x = self.number(field),
                        "20" => y = self.number(field),
                        _ => {}
                    }
                }
                points.push(Point2::new(x, y));
                index = vertex_end;
                continue;
            }

            if tag.code == "70" {
                is_closed = self.integer(tag) & 0x01 != 0;
            }
            index += 1;
        }

        DecodedEntity {
            entity: DxfEntity::Polyline(Polyline { points, is_closed }),
            next: index,
        }
    }

    /// LWPOLYLINE 的 X/Y 分别累积，最终按较短的一侧配对，多余坐标丢弃。
    fn decode_lwpolyline(&mut self, start: usize) -> DecodedEntity {
        let tags = self.tags;
        let end = tags.next_boundary(start);
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let mut is_closed = false;
        for tag in tags.range(start, end) {
            match tag.code {
                "10" => xs.push(self.number(tag)),
                "20" => ys.push(self.number(tag)),
                "70" => is_closed = self.integer(tag) & 0x01 != 0,
                "90" => {
                    // 声明的顶点数只读取，不用于截断
                    self.integer(tag);
                }
                _ => {}
            }
        }

        let points = xs
            .into_iter()
            .zip(ys)
            .map(|(x, y)| Point2::new(x, y))
            .collect();

        DecodedEntity {
            entity: DxfEntity::LwPolyline(Polyline { points, is_closed }),
            next: end,
        }
    }

    /// 读取浮点字段。无法解析或超出 f32 有限范围（`nan`、`inf`、`1e39`）时记为 0。
    fn number(&mut self, tag: Tag<'_>) -> f32 {
        match tag.value.parse::<f32>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                self.record_default(tag);
                0.0
            }
        }
    }

    fn integer(&mut self, tag: Tag<'_>) -> i32 {
        match tag.value.parse::<i32>() {
            Ok(value) => value,
            Err(_) => {
                self.record_default(tag);
                0
            }
        }
    }

    fn record_default(&mut self, tag: Tag<'_>) {
        self.diagnostics.push(Diagnostic::new(
            tag.line(),
            DiagnosticKind::NumericDefaulted {
                field: tag.code.to_string(),
                value: tag.value.to_string(),
            },
        ));
    }
}
