use super::error::DomainError;
use std::fmt;
use std::str::FromStr;

/// Target size along one axis of a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Derive from the source aspect ratio.
    Auto,
    Pixels(u32),
}

impl Dimension {
    pub fn pixels(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::InvalidDimension(
                "dimension must be a positive integer".to_string(),
            ));
        }
        Ok(Dimension::Pixels(value))
    }

    pub fn is_auto(self) -> bool {
        matches!(self, Dimension::Auto)
    }

    /// Rejects zero and anything above `max`.
    pub fn validate(self, axis: &str, max: u32) -> Result<Self, DomainError> {
        match self {
            Dimension::Auto => Ok(self),
            Dimension::Pixels(0) => Err(DomainError::InvalidDimension(format!(
                "{} must be a positive integer or 'auto'",
                axis
            ))),
            Dimension::Pixels(value) if value > max => Err(DomainError::InvalidDimension(format!(
                "{} {} exceeds the maximum of {}",
                axis, value, max
            ))),
            Dimension::Pixels(_) => Ok(self),
        }
    }
}

impl FromStr for Dimension {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("auto") {
            return Ok(Dimension::Auto);
        }
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidDimension(format!(
                "'{}' is neither a positive integer nor 'auto'",
                s
            )));
        }
        let value = token
            .parse::<u32>()
            .map_err(|e| DomainError::InvalidDimension(format!("'{}': {}", s, e)))?;
        Dimension::pixels(value)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Auto => f.write_str("auto"),
            Dimension::Pixels(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auto_is_case_insensitive() {
        assert_eq!("auto".parse::<Dimension>(), Ok(Dimension::Auto));
        assert_eq!("AUTO".parse::<Dimension>(), Ok(Dimension::Auto));
        assert_eq!(" Auto ".parse::<Dimension>(), Ok(Dimension::Auto));
    }

    #[test]
    fn test_parse_positive_integer() {
        assert_eq!("640".parse::<Dimension>(), Ok(Dimension::Pixels(640)));
    }

    #[test]
    fn test_parse_rejects_zero_and_garbage() {
        for input in ["0", "-5", "+5", "12px", "1.5", "", "automatic", "99999999999"] {
            assert!(
                matches!(input.parse::<Dimension>(), Err(DomainError::InvalidDimension(_))),
                "expected InvalidDimension for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_validate_bounds() {
        assert!(Dimension::Pixels(0).validate("width", 100).is_err());
        assert!(Dimension::Pixels(101).validate("width", 100).is_err());
        assert_eq!(Dimension::Pixels(100).validate("width", 100), Ok(Dimension::Pixels(100)));
        assert_eq!(Dimension::Auto.validate("height", 1), Ok(Dimension::Auto));
    }
}
