use crate::engine::dispatch::DeliveryRequest;
use crate::error::FleetError;
use crate::fleet::Fleet;

pub async fn enqueue_request(fleet: &Fleet, request: DeliveryRequest) -> Result<(), FleetError> {
    fleet
        .request_tx
        .send(request)
        .await
        .map_err(|err| FleetError::Internal(format!("request queue send failed: {err}")))?;

    fleet.metrics.requests_in_queue.inc();
    Ok(())
}
