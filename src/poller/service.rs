use std::future::Future;

use super::error::PollerError;
use super::types::RequestParameters;
use crate::position::PositionEntry;

/// Remote source of satellite positions.
///
/// One call is one cycle's worth of data: the ordered collection of entries the
/// service returned for the given parameters. A nil collection is reported as empty.
pub trait PositionService: Send + Sync {
    fn get_positions(
        &self,
        params: &RequestParameters,
    ) -> impl Future<Output = Result<Vec<PositionEntry>, PollerError>> + Send;
}
