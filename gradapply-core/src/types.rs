/// Element types an update can run with.
///
/// The tag is informational: selection of the actual code path is done
/// statically through [`crate::scalar::DeviceScalar`]. Dispatch logs it
/// together with the byte size of the arrays it updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// IEEE 754 binary16 (`half::f16`).
    F16,
    /// 32-bit floating-point type.
    F32,
    /// 64-bit floating-point type.
    F64,
    /// Complex number made of two `f32` parts.
    Complex64,
    /// Complex number made of two `f64` parts.
    Complex128,
}

impl DType {
    /// Size in bytes of one element.
    pub fn size_of(&self) -> usize {
        match self {
            DType::F16 => 2,
            DType::F32 => 4,
            DType::F64 | DType::Complex64 => 8,
            DType::Complex128 => 16,
        }
    }
}
