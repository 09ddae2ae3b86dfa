//! Provider seam for the matrix builder.
//!
//! The cost-matrix provider is an external collaborator. Concrete backends
//! (OSRM over HTTP, the offline haversine estimator, test doubles) implement
//! [`CostMatrixProvider`].

use crate::error::ProviderError;

/// Location as (lat, lng) in decimal degrees.
pub type LatLng = (f64, f64);

/// Result of a single origin/destination pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatrixCell {
    Ok { distance_m: f64, duration_s: f64 },
    /// The provider reported no route for this pair.
    Unreachable,
}

/// Provides distances and durations between origins and destinations.
///
/// `table` returns one row per origin and one cell per destination, in the
/// order given. Callers never pass more origins or destinations than
/// [`CostMatrixProvider::max_batch`].
pub trait CostMatrixProvider {
    fn table(
        &self,
        origins: &[LatLng],
        destinations: &[LatLng],
    ) -> Result<Vec<Vec<MatrixCell>>, ProviderError>;

    /// Largest number of origins (or destinations) accepted per call.
    fn max_batch(&self) -> usize {
        10
    }

    /// Backend name for logging.
    fn name(&self) -> &str;
}

impl<P: CostMatrixProvider + ?Sized> CostMatrixProvider for &P {
    fn table(
        &self,
        origins: &[LatLng],
        destinations: &[LatLng],
    ) -> Result<Vec<Vec<MatrixCell>>, ProviderError> {
        (**self).table(origins, destinations)
    }

    fn max_batch(&self) -> usize {
        (**self).max_batch()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
