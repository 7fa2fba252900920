//! Caller-supplied vector types.
//!
//! Decoded documents are generic over the 2-vector and 3-vector types used
//! for positions, normals and texture coordinates. Any type that can be built
//! from and read back as consecutive f32 components works.

use crate::data::OptReader;
use crate::data::parser_utils::{VECTOR2_SIZE, VECTOR3_SIZE};
use crate::error::IResult;

pub trait Vector2: Copy {
    fn from_xy(x: f32, y: f32) -> Self;
    fn x(&self) -> f32;
    fn y(&self) -> f32;

    fn zero() -> Self {
        Self::from_xy(0.0, 0.0)
    }
}

pub trait Vector3: Copy {
    fn from_xyz(x: f32, y: f32, z: f32) -> Self;
    fn x(&self) -> f32;
    fn y(&self) -> f32;
    fn z(&self) -> f32;

    fn zero() -> Self {
        Self::from_xyz(0.0, 0.0, 0.0)
    }
}

impl Vector2 for [f32; 2] {
    fn from_xy(x: f32, y: f32) -> Self {
        [x, y]
    }

    fn x(&self) -> f32 {
        self[0]
    }

    fn y(&self) -> f32 {
        self[1]
    }
}

impl Vector3 for [f32; 3] {
    fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        [x, y, z]
    }

    fn x(&self) -> f32 {
        self[0]
    }

    fn y(&self) -> f32 {
        self[1]
    }

    fn z(&self) -> f32 {
        self[2]
    }
}

#[cfg(feature = "glam")]
impl Vector2 for glam::Vec2 {
    fn from_xy(x: f32, y: f32) -> Self {
        glam::Vec2::new(x, y)
    }

    fn x(&self) -> f32 {
        self.x
    }

    fn y(&self) -> f32 {
        self.y
    }
}

#[cfg(feature = "glam")]
impl Vector3 for glam::Vec3 {
    fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        glam::Vec3::new(x, y, z)
    }

    fn x(&self) -> f32 {
        self.x
    }

    fn y(&self) -> f32 {
        self.y
    }

    fn z(&self) -> f32 {
        self.z
    }
}

/// Re-expresses a 3-vector from the model's native space into the caller's.
pub type CoordinateTransform<V3> = Box<dyn Fn(V3) -> V3>;

/// Reads vectors from an [`OptReader`], applying the caller's coordinate
/// transform to every 3-vector. 2-vectors are never transformed.
pub struct VectorCodec<'t, V3> {
    transform: Option<&'t dyn Fn(V3) -> V3>,
}

impl<'t, V3: Vector3> VectorCodec<'t, V3> {
    pub fn new(transform: Option<&'t dyn Fn(V3) -> V3>) -> Self {
        Self { transform }
    }

    pub fn identity() -> Self {
        Self { transform: None }
    }

    fn apply(&self, v: V3) -> V3 {
        match self.transform {
            Some(transform) => transform(v),
            None => v,
        }
    }

    pub fn read_vector2<V2: Vector2>(&self, reader: &mut OptReader<'_>) -> IResult<V2> {
        reader.read_vector2()
    }

    pub fn read_vector3(&self, reader: &mut OptReader<'_>) -> IResult<V3> {
        let v = reader.read_vector3::<V3>()?;
        Ok(self.apply(v))
    }

    pub fn read_vector2_sequence<V2: Vector2>(
        &self,
        reader: &mut OptReader<'_>,
        count: usize,
    ) -> IResult<Vec<V2>> {
        reader.read_list(count, VECTOR2_SIZE, |r| r.read_vector2())
    }

    pub fn read_vector3_sequence(
        &self,
        reader: &mut OptReader<'_>,
        count: usize,
    ) -> IResult<Vec<V3>> {
        reader.read_list(count, VECTOR3_SIZE, |r| self.read_vector3(r))
    }

    /// Fallback value for data that is missing from a truncated file.
    pub fn zero(&self) -> V3 {
        V3::zero()
    }
}
