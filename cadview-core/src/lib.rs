pub mod geometry {
    use glam::{Vec2, Vec3};
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::Vec2` 表示，精度与渲染端的 `f32` 缓冲保持一致。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub Vec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f32, y: f32) -> Self {
            Self(Vec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: Vec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f32 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f32 {
            self.0.y
        }

        #[inline]
        pub fn as_vec2(self) -> Vec2 {
            self.0
        }

        #[inline]
        pub fn is_finite(self) -> bool {
            self.0.is_finite()
        }
    }

    impl From<Vec2> for Point2 {
        fn from(value: Vec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 二维轴对齐包围盒。
    ///
    /// `empty()` 返回哨兵状态（min 为 +∞，max 为 -∞），首个点写入后才变为有效区间，
    /// 因此可以用 `is_empty()` 判断扫描过程中是否观察到任何图元。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Vec2,
        max: Vec2,
    }

    impl Bounds2D {
        /// 按 `min_x, max_x, min_y, max_y` 的顺序构造包围盒。
        #[inline]
        pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
            Self {
                min: Vec2::new(min_x, min_y),
                max: Vec2::new(max_x, max_y),
            }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Vec2::splat(f32::INFINITY),
                max: Vec2::splat(f32::NEG_INFINITY),
            }
        }

        /// 全零的退化包围盒，用于空输入。
        #[inline]
        pub fn zero() -> Self {
            Self::new(0.0, 0.0, 0.0, 0.0)
        }

        /// 没有任何可见几何时使用的默认可视区域 `{0, 100, 0, 100}`。
        #[inline]
        pub fn default_view() -> Self {
            Self::new(0.0, 100.0, 0.0, 100.0)
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x > self.max.x || self.min.y > self.max.y
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point.as_vec2();
                self.max = point.as_vec2();
                return;
            }
            self.min = self.min.min(point.as_vec2());
            self.max = self.max.max(point.as_vec2());
        }

        pub fn include_bounds(&mut self, other: &Bounds2D) {
            if other.is_empty() {
                return;
            }
            self.include_point(Point2::from_vec(other.min));
            self.include_point(Point2::from_vec(other.max));
        }

        #[inline]
        pub fn min_x(&self) -> f32 {
            self.min.x
        }

        #[inline]
        pub fn max_x(&self) -> f32 {
            self.max.x
        }

        #[inline]
        pub fn min_y(&self) -> f32 {
            self.min.y
        }

        #[inline]
        pub fn max_y(&self) -> f32 {
            self.max.y
        }

        #[inline]
        pub fn center_x(&self) -> f32 {
            (self.min.x + self.max.x) / 2.0
        }

        #[inline]
        pub fn center_y(&self) -> f32 {
            (self.min.y + self.max.y) / 2.0
        }

        #[inline]
        pub fn width(&self) -> f32 {
            self.max.x - self.min.x
        }

        #[inline]
        pub fn height(&self) -> f32 {
            self.max.y - self.min.y
        }

        #[inline]
        pub fn max_dimension(&self) -> f32 {
            self.width().max(self.height())
        }
    }

    /// 三维轴对齐包围盒，语义与 [`Bounds2D`] 相同。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct BoundingBox {
        min: Vec3,
        max: Vec3,
    }

    impl BoundingBox {
        #[inline]
        pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32, min_z: f32, max_z: f32) -> Self {
            Self {
                min: Vec3::new(min_x, min_y, min_z),
                max: Vec3::new(max_x, max_y, max_z),
            }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Vec3::splat(f32::INFINITY),
                max: Vec3::splat(f32::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn zero() -> Self {
            Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
        }

        pub fn include_point(&mut self, point: Vec3) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            self.min = self.min.min(point);
            self.max = self.max.max(point);
        }

        /// 扫描结束时调用：若从未写入任何顶点则退化为零包围盒。
        #[inline]
        pub fn or_zero(self) -> Self {
            if self.is_empty() { Self::zero() } else { self }
        }

        #[inline]
        pub fn min_x(&self) -> f32 {
            self.min.x
        }

        #[inline]
        pub fn max_x(&self) -> f32 {
            self.max.x
        }

        #[inline]
        pub fn min_y(&self) -> f32 {
            self.min.y
        }

        #[inline]
        pub fn max_y(&self) -> f32 {
            self.max.y
        }

        #[inline]
        pub fn min_z(&self) -> f32 {
            self.min.z
        }

        #[inline]
        pub fn max_z(&self) -> f32 {
            self.max.z
        }

        #[inline]
        pub fn center(&self) -> Vec3 {
            (self.min + self.max) * 0.5
        }

        #[inline]
        pub fn center_x(&self) -> f32 {
            self.center().x
        }

        #[inline]
        pub fn center_y(&self) -> f32 {
            self.center().y
        }

        #[inline]
        pub fn center_z(&self) -> f32 {
            self.center().z
        }

        #[inline]
        pub fn size(&self) -> Vec3 {
            self.max - self.min
        }

        #[inline]
        pub fn size_x(&self) -> f32 {
            self.size().x
        }

        #[inline]
        pub fn size_y(&self) -> f32 {
            self.size().y
        }

        #[inline]
        pub fn size_z(&self) -> f32 {
            self.size().z
        }

        #[inline]
        pub fn max_dimension(&self) -> f32 {
            self.size().max_element()
        }
    }
}

pub mod drawing {
    use serde::{Deserialize, Serialize};

    use crate::geometry::{Bounds2D, Point2};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Line {
        pub start: Point2,
        pub end: Point2,
    }

    /// 圆弧。角度保持 DXF 原始的角度制，不做单位换算。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Arc {
        pub center: Point2,
        pub radius: f32,
        pub start_angle: f32,
        pub end_angle: f32,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Circle {
        pub center: Point2,
        pub radius: f32,
    }

    /// POLYLINE 与 LWPOLYLINE 共用的顶点序列。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Polyline {
        pub points: Vec<Point2>,
        pub is_closed: bool,
    }

    /// 解析器产出的 DXF 图元。半径不做非负校验，下游需容忍零或负半径。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum DxfEntity {
        Line(Line),
        Arc(Arc),
        Circle(Circle),
        Polyline(Polyline),
        LwPolyline(Polyline),
    }

    impl DxfEntity {
        /// 返回 DXF 中对应的实体类型名。
        #[inline]
        pub fn kind(&self) -> &'static str {
            match self {
                DxfEntity::Line(_) => "LINE",
                DxfEntity::Arc(_) => "ARC",
                DxfEntity::Circle(_) => "CIRCLE",
                DxfEntity::Polyline(_) => "POLYLINE",
                DxfEntity::LwPolyline(_) => "LWPOLYLINE",
            }
        }

        /// 将图元范围并入 `bounds`。圆与圆弧按 `圆心 ± 半径` 近似，不计算真实扫角范围。
        pub fn extend_bounds(&self, bounds: &mut Bounds2D) {
            match self {
                DxfEntity::Line(line) => {
                    bounds.include_point(line.start);
                    bounds.include_point(line.end);
                }
                DxfEntity::Arc(Arc { center, radius, .. })
                | DxfEntity::Circle(Circle { center, radius }) => {
                    bounds.include_point(Point2::new(center.x() - radius, center.y() - radius));
                    bounds.include_point(Point2::new(center.x() + radius, center.y() + radius));
                }
                DxfEntity::Polyline(polyline) | DxfEntity::LwPolyline(polyline) => {
                    for point in &polyline.points {
                        bounds.include_point(*point);
                    }
                }
            }
        }
    }

    /// 二维图纸模型。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Model2D {
        pub entities: Vec<DxfEntity>,
        pub bounds: Bounds2D,
    }

    impl Model2D {
        #[inline]
        pub fn entity_count(&self) -> usize {
            self.entities.len()
        }

        /// 没有解析到任何图元时的占位模型：一条 (0,0)→(100,100) 的对角线。
        pub fn placeholder() -> Self {
            let entities = vec![DxfEntity::Line(Line {
                start: Point2::new(0.0, 0.0),
                end: Point2::new(100.0, 100.0),
            })];
            let bounds = compute_drawing_bounds(&entities);
            Self { entities, bounds }
        }
    }

    /// 扫描图元范围；若哨兵值从未被更新（例如全部为无顶点的多段线）则返回 `None`。
    pub fn scan_drawing_bounds(entities: &[DxfEntity]) -> Option<Bounds2D> {
        let mut bounds = Bounds2D::empty();
        for entity in entities {
            entity.extend_bounds(&mut bounds);
        }
        if bounds.is_empty() { None } else { Some(bounds) }
    }

    /// 计算图元集合的包围盒：空集合返回零盒，扫描无结果时回退到默认可视区域。
    pub fn compute_drawing_bounds(entities: &[DxfEntity]) -> Bounds2D {
        if entities.is_empty() {
            return Bounds2D::zero();
        }
        scan_drawing_bounds(entities).unwrap_or_else(Bounds2D::default_view)
    }
}

pub mod mesh {
    use glam::Vec3;
    use serde::{Deserialize, Serialize};

    use crate::geometry::BoundingBox;

    /// 非索引三角形汤：每个三角形 3 个顶点，法线按顶点重复（平面着色）。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Model3D {
        pub vertices: Vec<f32>,
        pub normals: Vec<f32>,
        pub triangle_count: usize,
        pub bounds: BoundingBox,
    }

    impl Model3D {
        #[inline]
        pub fn vertex_count(&self) -> usize {
            self.triangle_count * 3
        }

        /// 顶点与法线缓冲长度均为 `9 × triangle_count` 时返回 true。
        pub fn has_consistent_buffers(&self) -> bool {
            let expected = self.triangle_count * 9;
            self.vertices.len() == expected && self.normals.len() == expected
        }
    }

    /// 由扁平顶点流 `[x, y, z, x, y, z, ...]` 计算包围盒，空输入返回零盒。
    pub fn compute_mesh_bounds(vertices: &[f32]) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for chunk in vertices.chunks_exact(3) {
            bounds.include_point(Vec3::new(chunk[0], chunk[1], chunk[2]));
        }
        bounds.or_zero()
    }
}

pub mod library {
    use std::path::PathBuf;

    use serde::{Deserialize, Serialize};

    /// 支持的模型格式。排序时 STL 在前。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub enum ModelType {
        Stl,
        Dxf,
    }

    impl ModelType {
        #[inline]
        pub fn extension(self) -> &'static str {
            match self {
                ModelType::Stl => ".stl",
                ModelType::Dxf => ".dxf",
            }
        }

        #[inline]
        pub fn display_name(self) -> &'static str {
            match self {
                ModelType::Stl => "STL (3D)",
                ModelType::Dxf => "DXF (2D)",
            }
        }

        /// 按扩展名（忽略大小写）识别格式。
        pub fn from_filename(filename: &str) -> Option<Self> {
            let lower = filename.to_ascii_lowercase();
            [ModelType::Stl, ModelType::Dxf]
                .into_iter()
                .find(|kind| lower.ends_with(kind.extension()))
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ModelInfo {
        pub filename: String,
        pub path: PathBuf,
        pub model_type: ModelType,
        pub file_size_bytes: u64,
    }

    impl ModelInfo {
        #[inline]
        pub fn size_kb(&self) -> f64 {
            self.file_size_bytes as f64 / 1024.0
        }

        #[inline]
        pub fn size_mb(&self) -> f64 {
            self.size_kb() / 1024.0
        }

        pub fn formatted_size(&self) -> String {
            if self.size_mb() >= 1.0 {
                format!("{:.2} MB", self.size_mb())
            } else {
                format!("{:.2} KB", self.size_kb())
            }
        }
    }
}
