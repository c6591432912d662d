//! Serialization of typed values into packed byte buffers
//!
//! [`pack`] allocates a buffer sized by the resolved [`Layout`] and writes
//! every field at its computed offset; [`pack_into`] writes into a shared
//! backing buffer at a base offset, which is how nested array elements land
//! inside their parent block. All scalars are 32-bit little-endian;
//! matrices are column-major with per-column padding.

use std::collections::HashMap;

use cgmath::{Matrix3, Matrix4};

use super::schema::{Layout, LayoutError, WgslType};

/// A typed field value matching one [`WgslType`].
#[derive(Debug, Clone)]
pub enum Value {
    Float(f32),
    Int(i32),
    UInt(u32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat3(Matrix3<f32>),
    Mat4(Matrix4<f32>),
    /// Elements of a trailing array-of-struct field.
    Structs(Vec<FieldMap>),
}

/// Source data for one block: field name to value.
pub type FieldMap = HashMap<String, Value>;

/// Packs `values` into a freshly allocated buffer shaped by `layout`.
///
/// The trailing array's element count, if the schema has one, is taken from
/// the length of the corresponding [`Value::Structs`] entry.
pub fn pack(layout: &Layout, values: &FieldMap) -> Result<Vec<u8>, LayoutError> {
    let element_count = trailing_element_count(layout, values)?;
    let mut buffer = vec![0u8; layout.total_size(element_count) as usize];
    pack_into(layout, values, &mut buffer, 0)?;
    Ok(buffer)
}

/// Writes `values` into `buffer` starting at `base`, which must leave room
/// for `layout.total_size(..)` bytes.
pub fn pack_into(
    layout: &Layout,
    values: &FieldMap,
    buffer: &mut [u8],
    base: u64,
) -> Result<(), LayoutError> {
    for field in &layout.fields {
        let value = values
            .get(&field.name)
            .ok_or_else(|| LayoutError::MissingField(field.name.clone()))?;
        let offset = base + field.offset;
        match (&field.ty, value) {
            (WgslType::Float, Value::Float(v)) => write_f32s(buffer, offset, &[*v]),
            (WgslType::Int, Value::Int(v)) => write_bytes(buffer, offset, bytemuck::bytes_of(v)),
            (WgslType::UInt, Value::UInt(v)) => write_bytes(buffer, offset, bytemuck::bytes_of(v)),
            (WgslType::Vec2, Value::Vec2(v)) => write_f32s(buffer, offset, v),
            (WgslType::Vec3, Value::Vec3(v)) => write_f32s(buffer, offset, v),
            (WgslType::Vec4, Value::Vec4(v)) => write_f32s(buffer, offset, v),
            (WgslType::Mat3, Value::Mat3(m)) => {
                // Three 16-byte columns; the last float of each stays zero.
                let columns: [[f32; 3]; 3] = (*m).into();
                for (i, column) in columns.iter().enumerate() {
                    write_f32s(buffer, offset + i as u64 * 16, column);
                }
            }
            (WgslType::Mat4, Value::Mat4(m)) => {
                let columns: [[f32; 4]; 4] = (*m).into();
                for (i, column) in columns.iter().enumerate() {
                    write_f32s(buffer, offset + i as u64 * 16, column);
                }
            }
            (WgslType::Array(_), Value::Structs(elements)) => {
                let array = layout
                    .array
                    .as_ref()
                    .ok_or_else(|| LayoutError::TypeMismatch(field.name.clone()))?;
                for (i, element_values) in elements.iter().enumerate() {
                    pack_into(
                        &array.element,
                        element_values,
                        buffer,
                        base + array.offset + i as u64 * array.stride,
                    )?;
                }
            }
            _ => return Err(LayoutError::TypeMismatch(field.name.clone())),
        }
    }
    Ok(())
}

fn trailing_element_count(layout: &Layout, values: &FieldMap) -> Result<usize, LayoutError> {
    let Some(field) = layout.fields.last() else {
        return Ok(0);
    };
    if layout.array.is_none() {
        return Ok(0);
    }
    match values.get(&field.name) {
        Some(Value::Structs(elements)) => Ok(elements.len()),
        Some(_) => Err(LayoutError::TypeMismatch(field.name.clone())),
        None => Err(LayoutError::MissingField(field.name.clone())),
    }
}

fn write_f32s(buffer: &mut [u8], offset: u64, values: &[f32]) {
    write_bytes(buffer, offset, bytemuck::cast_slice(values));
}

fn write_bytes(buffer: &mut [u8], offset: u64, bytes: &[u8]) {
    let start = offset as usize;
    buffer[start..start + bytes.len()].copy_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::layout::Schema;
    use cgmath::SquareMatrix;

    fn read_f32(buffer: &[u8], offset: u64) -> f32 {
        let start = offset as usize;
        f32::from_le_bytes(buffer[start..start + 4].try_into().unwrap())
    }

    fn read_u32(buffer: &[u8], offset: u64) -> u32 {
        let start = offset as usize;
        u32::from_le_bytes(buffer[start..start + 4].try_into().unwrap())
    }

    fn read_i32(buffer: &[u8], offset: u64) -> i32 {
        let start = offset as usize;
        i32::from_le_bytes(buffer[start..start + 4].try_into().unwrap())
    }

    #[test]
    fn round_trips_scalars_and_vectors_bit_exactly() {
        let layout = Schema::new()
            .field("a", WgslType::Float)
            .field("b", WgslType::Vec3)
            .field("c", WgslType::UInt)
            .field("d", WgslType::Int)
            .layout()
            .unwrap();

        let mut values = FieldMap::new();
        values.insert("a".into(), Value::Float(0.1));
        values.insert("b".into(), Value::Vec3([1.5, -2.25, 1.0e-7]));
        values.insert("c".into(), Value::UInt(7));
        values.insert("d".into(), Value::Int(-3));

        let buffer = pack(&layout, &values).unwrap();
        assert_eq!(read_f32(&buffer, 0), 0.1);
        assert_eq!(read_f32(&buffer, 16), 1.5);
        assert_eq!(read_f32(&buffer, 20), -2.25);
        assert_eq!(read_f32(&buffer, 24), 1.0e-7);
        assert_eq!(read_u32(&buffer, 32), 7);
        assert_eq!(read_i32(&buffer, 36), -3);
    }

    #[test]
    fn mat3_columns_carry_row_padding() {
        let layout = Schema::new().field("m", WgslType::Mat3).layout().unwrap();
        let mut values = FieldMap::new();
        let m = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        values.insert("m".into(), Value::Mat3(m));

        let buffer = pack(&layout, &values).unwrap();
        assert_eq!(buffer.len(), 48);
        // Column 0 at 0, column 1 at 16, column 2 at 32; pad floats zero.
        assert_eq!(read_f32(&buffer, 0), 1.0);
        assert_eq!(read_f32(&buffer, 8), 3.0);
        assert_eq!(read_f32(&buffer, 12), 0.0);
        assert_eq!(read_f32(&buffer, 16), 4.0);
        assert_eq!(read_f32(&buffer, 28), 0.0);
        assert_eq!(read_f32(&buffer, 32), 7.0);
        assert_eq!(read_f32(&buffer, 40), 9.0);
    }

    #[test]
    fn mat4_is_column_major() {
        let layout = Schema::new().field("m", WgslType::Mat4).layout().unwrap();
        let mut m = Matrix4::identity();
        m.w.x = 5.0; // translation column
        let mut values = FieldMap::new();
        values.insert("m".into(), Value::Mat4(m));

        let buffer = pack(&layout, &values).unwrap();
        assert_eq!(buffer.len(), 64);
        assert_eq!(read_f32(&buffer, 0), 1.0);
        // Column 3 starts at byte 48.
        assert_eq!(read_f32(&buffer, 48), 5.0);
    }

    #[test]
    fn trailing_array_elements_pack_at_stride() {
        let element = Schema::new()
            .field("p", WgslType::Vec4)
            .field("i", WgslType::UInt);
        let layout = Schema::new()
            .field("count", WgslType::UInt)
            .field("items", WgslType::Array(element))
            .layout()
            .unwrap();

        let make_element = |p: f32, i: u32| {
            let mut map = FieldMap::new();
            map.insert("p".into(), Value::Vec4([p, 0.0, 0.0, 1.0]));
            map.insert("i".into(), Value::UInt(i));
            map
        };
        let mut values = FieldMap::new();
        values.insert("count".into(), Value::UInt(2));
        values.insert(
            "items".into(),
            Value::Structs(vec![make_element(1.0, 10), make_element(2.0, 20)]),
        );

        let buffer = pack(&layout, &values).unwrap();
        assert_eq!(buffer.len(), 16 + 2 * 32);
        assert_eq!(read_u32(&buffer, 0), 2);
        assert_eq!(read_f32(&buffer, 16), 1.0);
        assert_eq!(read_u32(&buffer, 32), 10);
        assert_eq!(read_f32(&buffer, 48), 2.0);
        assert_eq!(read_u32(&buffer, 64), 20);
    }

    #[test]
    fn missing_field_names_the_field() {
        let layout = Schema::new().field("view", WgslType::Mat4).layout().unwrap();
        let err = pack(&layout, &FieldMap::new()).unwrap_err();
        assert_eq!(err, LayoutError::MissingField("view".to_string()));
    }

    #[test]
    fn type_mismatch_names_the_field() {
        let layout = Schema::new().field("x", WgslType::Float).layout().unwrap();
        let mut values = FieldMap::new();
        values.insert("x".into(), Value::UInt(1));
        let err = pack(&layout, &values).unwrap_err();
        assert_eq!(err, LayoutError::TypeMismatch("x".to_string()));
    }
}
