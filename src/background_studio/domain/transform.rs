use crate::domain::color::Color;
use crate::domain::dimension::Dimension;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    RemoveBackground,
    ApplySolidBackground(Color),
    /// Encoded bytes of the replacement background; decoded with the source.
    ApplyImageBackground(Vec<u8>),
    Resize(Dimension, Dimension),
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Transform::RemoveBackground => "remove-background",
            Transform::ApplySolidBackground(_) => "solid-background",
            Transform::ApplyImageBackground(_) => "image-background",
            Transform::Resize(..) => "resize",
        }
    }

    pub fn validate(&self, max_dimension: u32) -> Result<(), DomainError> {
        match self {
            Transform::ApplyImageBackground(background) if background.is_empty() => Err(
                DomainError::MissingParameter("background_image".to_string()),
            ),
            Transform::Resize(width, height) => {
                width.validate("width", max_dimension)?;
                height.validate("height", max_dimension)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// One incoming call: the encoded source image plus what to do with it.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub source: Vec<u8>,
    pub transform: Transform,
}

impl TransformRequest {
    pub fn new(source: Vec<u8>, transform: Transform) -> Self {
        Self { source, transform }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_with_zero_dimensions_is_invalid() {
        let transform = Transform::Resize(Dimension::Pixels(0), Dimension::Pixels(0));
        assert!(matches!(
            transform.validate(10_000),
            Err(DomainError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_resize_above_limit_is_invalid() {
        let transform = Transform::Resize(Dimension::Auto, Dimension::Pixels(20_001));
        assert!(transform.validate(20_000).is_err());
    }

    #[test]
    fn test_empty_background_image_is_missing() {
        let transform = Transform::ApplyImageBackground(Vec::new());
        assert_eq!(
            transform.validate(100),
            Err(DomainError::MissingParameter("background_image".to_string()))
        );
    }

    #[test]
    fn test_other_transforms_are_valid() {
        assert!(Transform::RemoveBackground.validate(1).is_ok());
        assert!(Transform::ApplySolidBackground(Color::new(0, 0, 0)).validate(1).is_ok());
        assert!(Transform::Resize(Dimension::Auto, Dimension::Auto).validate(1).is_ok());
    }
}
