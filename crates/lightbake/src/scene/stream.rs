//! Little endian primitives of the scene stream.

use std::io::Read;

use crate::color::LinearColor;
use crate::error::{ImportError, ImportResult};
use crate::geometry::{Matrix4x4, Plane, Vec2, Vec3, AABB};

use super::Guid;

#[cfg(test)]
use super::testing::SceneWriter;

/// Sequential reader over an exported scene.
pub struct SceneReader<R> {
    inner: R,
}

impl<R: Read> SceneReader<R> {
    pub fn new(inner: R) -> Self {
        SceneReader { inner }
    }

    fn read_array<const N: usize>(&mut self) -> ImportResult<[u8; N]> {
        let mut bytes = [0u8; N];
        self.inner.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> ImportResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> ImportResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> ImportResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> ImportResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> ImportResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_bool(&mut self) -> ImportResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// A non-negative i32 element count.
    pub fn read_count(&mut self, what: &'static str) -> ImportResult<usize> {
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| ImportError::NegativeCount { what, count })
    }

    pub fn read_guid(&mut self) -> ImportResult<Guid> {
        Ok(Guid::new(self.read_u32()?, self.read_u32()?, self.read_u32()?, self.read_u32()?))
    }

    pub fn read_vec2(&mut self) -> ImportResult<Vec2> {
        Ok(Vec2(self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec3(&mut self) -> ImportResult<Vec3> {
        Ok(Vec3(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    pub fn read_box(&mut self) -> ImportResult<AABB> {
        Ok(AABB::new(self.read_vec3()?, self.read_vec3()?))
    }

    pub fn read_matrix(&mut self) -> ImportResult<Matrix4x4> {
        let mut values = [0.0; 16];
        for value in values.iter_mut() {
            *value = self.read_f32()?;
        }
        Ok(Matrix4x4::from(values))
    }

    pub fn read_plane(&mut self) -> ImportResult<Plane> {
        let normal = self.read_vec3()?;
        Ok(Plane::new(normal, self.read_f32()?))
    }

    /// 8 bit sRGB.
    pub fn read_color(&mut self) -> ImportResult<LinearColor> {
        Ok(LinearColor::from_srgb8(self.read_array()?))
    }

    pub fn read_f16_color(&mut self) -> ImportResult<LinearColor> {
        let bits = [self.read_u16()?, self.read_u16()?, self.read_u16()?, self.read_u16()?];
        Ok(LinearColor::from_f16_bits(bits))
    }

    /// i32 length followed by UTF-16 code units.
    pub fn read_string(&mut self) -> ImportResult<String> {
        let length = self.read_count("string length")?;
        let units = (0..length).map(|_| self.read_u16()).collect::<ImportResult<Vec<u16>>>()?;
        String::from_utf16(&units).map_err(|_| ImportError::InvalidString)
    }

    pub fn read_vec<T>(
        &mut self,
        count: usize,
        mut read: impl FnMut(&mut Self) -> ImportResult<T>,
    ) -> ImportResult<Vec<T>> {
        (0..count).map(|_| read(self)).collect()
    }
}

/// A value with a fixed encoding in the stream.
pub(crate) trait StreamValue: Sized {
    fn read<R: Read>(reader: &mut SceneReader<R>) -> ImportResult<Self>;

    #[cfg(test)]
    fn write(&self, writer: &mut SceneWriter);
}

impl StreamValue for bool {
    fn read<R: Read>(reader: &mut SceneReader<R>) -> ImportResult<Self> {
        reader.read_bool()
    }

    #[cfg(test)]
    fn write(&self, writer: &mut SceneWriter) {
        writer.write_bool(*self);
    }
}

impl StreamValue for i32 {
    fn read<R: Read>(reader: &mut SceneReader<R>) -> ImportResult<Self> {
        reader.read_i32()
    }

    #[cfg(test)]
    fn write(&self, writer: &mut SceneWriter) {
        writer.write_i32(*self);
    }
}

impl StreamValue for f32 {
    fn read<R: Read>(reader: &mut SceneReader<R>) -> ImportResult<Self> {
        reader.read_f32()
    }

    #[cfg(test)]
    fn write(&self, writer: &mut SceneWriter) {
        writer.write_f32(*self);
    }
}

impl StreamValue for Vec3 {
    fn read<R: Read>(reader: &mut SceneReader<R>) -> ImportResult<Self> {
        reader.read_vec3()
    }

    #[cfg(test)]
    fn write(&self, writer: &mut SceneWriter) {
        writer.write_vec3(*self);
    }
}

impl StreamValue for Guid {
    fn read<R: Read>(reader: &mut SceneReader<R>) -> ImportResult<Self> {
        reader.read_guid()
    }

    #[cfg(test)]
    fn write(&self, writer: &mut SceneWriter) {
        writer.write_guid(*self);
    }
}
