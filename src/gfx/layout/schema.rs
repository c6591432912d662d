//! Block schemas and offset computation
//!
//! A [`Schema`] is an ordered list of named fields, each a scalar, vector,
//! matrix, or a nested array-of-struct schema. [`Schema::layout`] resolves
//! the schema against the fixed (alignment, size) table and yields the byte
//! offset of every field plus the padded total size of the block.

use thiserror::Error;

/// Errors raised when a schema is malformed or data does not match it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// An array field appeared before the end of its schema.
    #[error("array field `{0}` must be the final field of its schema")]
    ArrayNotFinal(String),
    /// The packed data has no value for a schema field.
    #[error("field `{0}` is missing from the packed data")]
    MissingField(String),
    /// The packed data holds a value of a different type than the schema
    /// declares for the field.
    #[error("field `{0}` was given a value of the wrong type")]
    TypeMismatch(String),
}

/// GPU-side type of a single schema field.
///
/// Matrices are stored column-major; a `Mat3` occupies three 16-byte
/// columns with the final float of each column unused.
#[derive(Debug, Clone)]
pub enum WgslType {
    Float,
    Int,
    UInt,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
    /// Array of structs described by the nested schema. Only permitted as
    /// the final field of a schema; the element count comes from the data.
    Array(Schema),
}

impl WgslType {
    /// Required byte alignment of this type.
    pub fn alignment(&self) -> u64 {
        match self {
            WgslType::Float | WgslType::Int | WgslType::UInt => 4,
            WgslType::Vec2 => 8,
            WgslType::Vec3 | WgslType::Vec4 | WgslType::Mat3 | WgslType::Mat4 => 16,
            WgslType::Array(schema) => schema.alignment(),
        }
    }

    /// Byte size of this type, excluding trailing padding to the next
    /// field. Arrays are runtime sized and report 0; their extent is
    /// `stride * element_count` at pack time.
    pub fn size(&self) -> u64 {
        match self {
            WgslType::Float | WgslType::Int | WgslType::UInt => 4,
            WgslType::Vec2 => 8,
            WgslType::Vec3 => 12,
            WgslType::Vec4 => 16,
            WgslType::Mat3 => 48,
            WgslType::Mat4 => 64,
            WgslType::Array(_) => 0,
        }
    }
}

/// Ordered field list describing one uniform/storage block.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, WgslType)>,
    min_size: Option<u64>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field (builder pattern). Field order is significant: it
    /// determines the packing order and therefore every offset.
    pub fn field(mut self, name: &str, ty: WgslType) -> Self {
        self.fields.push((name.to_string(), ty));
        self
    }

    /// Raises the padded size of this block to at least `size` bytes. For
    /// an array element schema, the minimum applies per element.
    pub fn with_min_size(mut self, size: u64) -> Self {
        self.min_size = Some(size);
        self
    }

    pub fn fields(&self) -> &[(String, WgslType)] {
        &self.fields
    }

    /// Alignment of the whole block: the maximum field alignment, at
    /// least 4.
    pub fn alignment(&self) -> u64 {
        self.fields
            .iter()
            .map(|(_, ty)| ty.alignment())
            .max()
            .unwrap_or(4)
            .max(4)
    }

    /// Resolves field offsets and the padded block size.
    ///
    /// Maintains a running offset: each field's offset is the running
    /// offset rounded up to the field's alignment, after which the field's
    /// size is added. The block size is the final running offset rounded up
    /// to the maximum alignment seen, then raised to the optional minimum.
    pub fn layout(&self) -> Result<Layout, LayoutError> {
        let mut offset = 0u64;
        let mut max_align = 4u64;
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut array = None;

        for (i, (name, ty)) in self.fields.iter().enumerate() {
            if let WgslType::Array(element_schema) = ty {
                if i + 1 != self.fields.len() {
                    return Err(LayoutError::ArrayNotFinal(name.clone()));
                }
                let element = element_schema.layout()?;
                let align = element.alignment;
                offset = align_up(offset, align);
                max_align = max_align.max(align);
                fields.push(FieldLayout {
                    name: name.clone(),
                    ty: ty.clone(),
                    offset,
                });
                array = Some(ArrayLayout {
                    offset,
                    stride: element.size,
                    element: Box::new(element),
                });
            } else {
                let align = ty.alignment();
                offset = align_up(offset, align);
                max_align = max_align.max(align);
                fields.push(FieldLayout {
                    name: name.clone(),
                    ty: ty.clone(),
                    offset,
                });
                offset += ty.size();
            }
        }

        let mut size = align_up(offset, max_align);
        if let Some(min) = self.min_size {
            size = size.max(min);
        }

        Ok(Layout {
            fields,
            size,
            alignment: max_align,
            array,
        })
    }
}

/// Resolved placement of one field within its block.
#[derive(Debug, Clone)]
pub struct FieldLayout {
    pub name: String,
    pub ty: WgslType,
    pub offset: u64,
}

/// Resolved placement of a trailing array field.
#[derive(Debug, Clone)]
pub struct ArrayLayout {
    /// Byte offset where element 0 begins.
    pub offset: u64,
    /// Per-element stride: the element schema's padded size.
    pub stride: u64,
    pub element: Box<Layout>,
}

/// A resolved schema: per-field offsets plus padded size and alignment.
#[derive(Debug, Clone)]
pub struct Layout {
    pub fields: Vec<FieldLayout>,
    /// Padded size of the fixed part of the block (arrays excluded).
    pub size: u64,
    pub alignment: u64,
    pub array: Option<ArrayLayout>,
}

impl Layout {
    /// Total byte size of a buffer holding this block; `element_count`
    /// sizes the trailing array if the schema has one.
    pub fn total_size(&self, element_count: usize) -> u64 {
        match &self.array {
            Some(array) => (array.offset + array.stride * element_count as u64).max(self.size),
            None => self.size,
        }
    }
}

fn align_up(value: u64, align: u64) -> u64 {
    (value + align - 1) / align * align
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_schema() -> Schema {
        Schema::new()
            .field("a", WgslType::Float)
            .field("b", WgslType::Vec3)
            .field("c", WgslType::Vec2)
            .field("d", WgslType::Mat4)
            .field("e", WgslType::Float)
    }

    #[test]
    fn offsets_respect_alignment() {
        let layout = mixed_schema().layout().unwrap();
        for field in &layout.fields {
            assert_eq!(
                field.offset % field.ty.alignment(),
                0,
                "field `{}` offset {} not aligned to {}",
                field.name,
                field.offset,
                field.ty.alignment()
            );
            assert!(field.offset + field.ty.size() <= layout.size);
        }
    }

    #[test]
    fn mixed_offsets_match_table() {
        let layout = mixed_schema().layout().unwrap();
        let offsets: Vec<u64> = layout.fields.iter().map(|f| f.offset).collect();
        // f32 at 0, vec3 jumps to 16, vec2 packs at 28 -> aligned to 32,
        // mat4 to 48, trailing f32 right after at 112.
        assert_eq!(offsets, vec![0, 16, 32, 48, 112]);
        // 116 rounded up to the max alignment (16).
        assert_eq!(layout.size, 128);
        assert_eq!(layout.alignment, 16);
    }

    #[test]
    fn scalar_only_blocks_stay_tight() {
        let layout = Schema::new()
            .field("x", WgslType::Float)
            .field("y", WgslType::UInt)
            .layout()
            .unwrap();
        assert_eq!(layout.fields[1].offset, 4);
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn min_size_raises_total() {
        let layout = Schema::new()
            .field("x", WgslType::Float)
            .with_min_size(64)
            .layout()
            .unwrap();
        assert_eq!(layout.size, 64);
    }

    #[test]
    fn array_must_be_final() {
        let element = Schema::new().field("p", WgslType::Vec4);
        let err = Schema::new()
            .field("items", WgslType::Array(element))
            .field("count", WgslType::UInt)
            .layout()
            .unwrap_err();
        assert_eq!(err, LayoutError::ArrayNotFinal("items".to_string()));
    }

    #[test]
    fn trailing_array_stride_is_element_padded_size() {
        let element = Schema::new()
            .field("p", WgslType::Vec4)
            .field("i", WgslType::UInt);
        let layout = Schema::new()
            .field("count", WgslType::UInt)
            .field("items", WgslType::Array(element))
            .layout()
            .unwrap();
        let array = layout.array.as_ref().unwrap();
        // vec4 + u32 = 20 bytes, padded to the element alignment of 16.
        assert_eq!(array.stride, 32);
        // Array storage begins at the first 16-byte boundary after `count`.
        assert_eq!(array.offset, 16);
        assert_eq!(layout.total_size(3), 16 + 3 * 32);
    }

    #[test]
    fn element_min_size_applies_per_element() {
        let element = Schema::new().field("p", WgslType::Vec4).with_min_size(64);
        let layout = Schema::new()
            .field("items", WgslType::Array(element))
            .layout()
            .unwrap();
        assert_eq!(layout.array.as_ref().unwrap().stride, 64);
        assert_eq!(layout.total_size(2), 128);
    }
}
