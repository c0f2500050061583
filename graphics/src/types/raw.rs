//! Raw attribute element types.

use crate::error::VertexArrayError;

/// OpenGL enum values for the supported element types.
pub mod gl {
    /// `GL_UNSIGNED_BYTE`
    pub const UNSIGNED_BYTE: u32 = 0x1401;
    /// `GL_SHORT`
    pub const SHORT: u32 = 0x1402;
    /// `GL_UNSIGNED_SHORT`
    pub const UNSIGNED_SHORT: u32 = 0x1403;
    /// `GL_FLOAT`
    pub const FLOAT: u32 = 0x1406;
}

/// Element type of a vertex attribute as stored in the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawType {
    /// 32-bit float.
    Float32,
    /// 16-bit signed integer.
    Int16,
    /// 16-bit unsigned integer.
    UInt16,
    /// 8-bit unsigned integer.
    UInt8,
}

impl RawType {
    /// Size in bytes of one element.
    pub const fn size(self) -> usize {
        match self {
            Self::Float32 => 4,
            Self::Int16 | Self::UInt16 => 2,
            Self::UInt8 => 1,
        }
    }

    /// The matching OpenGL type enum, for describing attribute pointers.
    pub const fn gl_enum(self) -> u32 {
        match self {
            Self::Float32 => gl::FLOAT,
            Self::Int16 => gl::SHORT,
            Self::UInt16 => gl::UNSIGNED_SHORT,
            Self::UInt8 => gl::UNSIGNED_BYTE,
        }
    }
}

impl TryFrom<u32> for RawType {
    type Error = VertexArrayError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            gl::FLOAT => Ok(Self::Float32),
            gl::SHORT => Ok(Self::Int16),
            gl::UNSIGNED_SHORT => Ok(Self::UInt16),
            gl::UNSIGNED_BYTE => Ok(Self::UInt8),
            other => Err(VertexArrayError::UnsupportedRawType(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_type_size() {
        assert_eq!(RawType::Float32.size(), 4);
        assert_eq!(RawType::Int16.size(), 2);
        assert_eq!(RawType::UInt16.size(), 2);
        assert_eq!(RawType::UInt8.size(), 1);
    }

    #[test]
    fn test_gl_enum_conversion() {
        for raw in [
            RawType::Float32,
            RawType::Int16,
            RawType::UInt16,
            RawType::UInt8,
        ] {
            assert_eq!(RawType::try_from(raw.gl_enum()), Ok(raw));
        }

        // GL_INT is not part of the supported set
        assert_eq!(
            RawType::try_from(0x1404),
            Err(VertexArrayError::UnsupportedRawType(0x1404))
        );
    }
}
