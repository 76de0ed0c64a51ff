//! Small-angle distance estimate.

use thiserror::Error;

/// Converts an angular size in arcseconds to a distance in Mpc for a galaxy
/// of the assumed typical diameter.
pub const DISTANCE_CONSTANT: f64 = 143_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DomainError {
    #[error("Angular size must be positive and finite, got {0}")]
    InvalidAngularSize(f64),

    #[error("Observed wavelength must be positive and finite, got {0}")]
    InvalidWavelength(f64),

    #[error("Distance must be positive and finite, got {0}")]
    InvalidDistance(f64),

    #[error("Reading must be finite, got {0}")]
    NonFiniteReading(f64),
}

/// `distance = DISTANCE_CONSTANT / theta`.
pub fn distance_from_angular_size(theta: f64) -> Result<f64, DomainError> {
    distance_with_constant(DISTANCE_CONSTANT, theta)
}

/// `distance = constant / theta`, rejecting zero, negative and non-finite angles.
pub fn distance_with_constant(constant: f64, theta: f64) -> Result<f64, DomainError> {
    if !theta.is_finite() || theta <= 0.0 {
        return Err(DomainError::InvalidAngularSize(theta));
    }
    Ok(constant / theta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theta_equal_to_constant_gives_unit_distance() {
        assert_eq!(distance_from_angular_size(DISTANCE_CONSTANT), Ok(1.0));
    }

    #[test]
    fn distance_decreases_with_angle() {
        let near = distance_from_angular_size(10.0).unwrap();
        let far = distance_from_angular_size(100.0).unwrap();
        assert!(near > far);
    }

    #[test]
    fn zero_angle_is_rejected() {
        assert_eq!(
            distance_from_angular_size(0.0),
            Err(DomainError::InvalidAngularSize(0.0))
        );
    }

    #[test]
    fn negative_and_nan_angles_are_rejected() {
        assert!(distance_from_angular_size(-3.0).is_err());
        assert!(distance_from_angular_size(f64::NAN).is_err());
        assert!(distance_from_angular_size(f64::INFINITY).is_err());
    }

    #[test]
    fn custom_constant_is_used() {
        assert_eq!(distance_with_constant(50.0, 5.0), Ok(10.0));
    }
}
