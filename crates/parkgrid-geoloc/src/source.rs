use std::future::Future;

use parkgrid_core::Coordinate;

use crate::error::LocationError;

/// A source of the device's current position.
///
/// This is the seam between the ranking pipeline and whatever actually
/// resolves a position — the bundled [`crate::IpLocateClient`] in
/// production, scripted fakes in tests. Implementations must return a
/// validated [`Coordinate`] or a categorized [`LocationError`].
pub trait LocationSource {
    /// Resolve the device's current position once.
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}
