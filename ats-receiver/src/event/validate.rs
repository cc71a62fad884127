//! Decoding and structural validation of status update payloads.
//!
//! Runs only after the signature over the raw bytes has been verified.
//! Transition legality (`previousState` → `state`) belongs to the
//! downstream system and is not checked here.

use thiserror::Error;

use super::types::{StatusUpdateEvent, STATUS_UPDATE_EVENT_TYPE};

/// Reasons a request is rejected as a bad request.
///
/// The display text is returned to the sender in the `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing X-ATS-Event-Id header.")]
    MissingEventIdHeader,

    #[error("X-ATS-Event-Id cannot be empty.")]
    EmptyEventIdHeader,

    #[error("Unable to read request body.")]
    UnreadableBody,

    #[error("Invalid JSON payload.")]
    MalformedPayload,

    #[error("Unsupported eventType.")]
    UnsupportedEventType,

    #[error("Payload data.{0} is required.")]
    MissingField(&'static str),

    #[error("Header event id does not match payload eventId.")]
    EventIdMismatch,
}

/// Decode `body` into a [`StatusUpdateEvent`] and enforce the required shape.
pub fn parse_status_update(body: &[u8]) -> Result<StatusUpdateEvent, ValidationError> {
    let event: StatusUpdateEvent =
        serde_json::from_slice(body).map_err(|_| ValidationError::MalformedPayload)?;

    validate_status_update(&event)?;

    Ok(event)
}

/// Check the event type and the required `data` fields.
pub fn validate_status_update(event: &StatusUpdateEvent) -> Result<(), ValidationError> {
    if event.event_type != STATUS_UPDATE_EVENT_TYPE {
        return Err(ValidationError::UnsupportedEventType);
    }

    if event.data.transfer_id.trim().is_empty() {
        return Err(ValidationError::MissingField("transferId"));
    }

    if event.data.state.trim().is_empty() {
        return Err(ValidationError::MissingField("state"));
    }

    Ok(())
}

/// The payload's own `eventId` must equal the id the envelope was sent under.
pub fn ensure_event_id_matches(
    event: &StatusUpdateEvent,
    header_event_id: &str,
) -> Result<(), ValidationError> {
    if event.event_id != header_event_id {
        return Err(ValidationError::EventIdMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    const MINIMAL: &str = r#"{"eventId":"evt_1","eventType":"transfer.status.updated","occurredAt":"2026-01-01T00:00:00Z","source":"hub","data":{"transferId":"tr_1","state":"PROCESSING"}}"#;

    fn full_payload() -> String {
        serde_json::json!({
            "eventId": "evt_full",
            "eventType": "transfer.status.updated",
            "occurredAt": "2026-02-24T20:09:12Z",
            "source": "centralized-hub",
            "data": {
                "transferId": "tr_abc123",
                "previousState": "VALIDATION",
                "state": "PROCESSING",
                "reasonCodes": ["ALL_REQUIREMENTS_SATISFIED"],
                "npn": "17439285",
                "statusMessage": "All requirements satisfied",
                "effectiveDate": "2026-03-01"
            }
        })
        .to_string()
    }

    #[test]
    fn test_parse_minimal_payload() {
        let event = parse_status_update(MINIMAL.as_bytes()).unwrap();

        assert_eq!(event.event_id, "evt_1");
        assert_eq!(event.source, "hub");
        assert_eq!(
            event.occurred_at,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(event.data.transfer_id, "tr_1");
        assert_eq!(event.data.state, "PROCESSING");
        assert!(event.data.previous_state.is_none());
        assert!(event.data.reason_codes.is_none());
    }

    #[test]
    fn test_parse_full_payload() {
        let event = parse_status_update(full_payload().as_bytes()).unwrap();

        assert_eq!(event.data.previous_state.as_deref(), Some("VALIDATION"));
        assert_eq!(event.data.npn.as_deref(), Some("17439285"));
        assert_eq!(
            event.data.reason_codes,
            Some(vec!["ALL_REQUIREMENTS_SATISFIED".to_string()])
        );
        assert_eq!(
            event.data.effective_date,
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let payload = r#"{"eventId":"evt_1","eventType":"transfer.status.updated","occurredAt":"2026-01-01T00:00:00Z","source":"hub","schemaVersion":2,"data":{"transferId":"tr_1","state":"PROCESSING","carrier":"acme"}}"#;
        assert!(parse_status_update(payload.as_bytes()).is_ok());
    }

    #[test]
    fn test_field_names_are_case_sensitive() {
        let payload = r#"{"EventId":"evt_1","EventType":"transfer.status.updated","OccurredAt":"2026-01-01T00:00:00Z","Source":"hub","Data":{"TransferId":"tr_1","State":"PROCESSING"}}"#;
        assert_eq!(
            parse_status_update(payload.as_bytes()),
            Err(ValidationError::MalformedPayload)
        );
    }

    #[test]
    fn test_malformed_json() {
        assert_eq!(
            parse_status_update(b"{not json"),
            Err(ValidationError::MalformedPayload)
        );
        assert_eq!(parse_status_update(b""), Err(ValidationError::MalformedPayload));
        assert_eq!(
            parse_status_update(b"null"),
            Err(ValidationError::MalformedPayload)
        );
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        let payload = r#"{"eventId":"evt_1","eventType":"transfer.status.updated","occurredAt":"2026-01-01T00:00:00Z","source":"hub","data":{"state":"PROCESSING"}}"#;
        assert_eq!(
            parse_status_update(payload.as_bytes()),
            Err(ValidationError::MalformedPayload)
        );
    }

    #[test]
    fn test_bad_timestamp_is_malformed() {
        let payload = MINIMAL.replace("2026-01-01T00:00:00Z", "yesterday");
        assert_eq!(
            parse_status_update(payload.as_bytes()),
            Err(ValidationError::MalformedPayload)
        );
    }

    #[test]
    fn test_unsupported_event_type() {
        let payload = MINIMAL.replace("transfer.status.updated", "transfer.created");
        assert_eq!(
            parse_status_update(payload.as_bytes()),
            Err(ValidationError::UnsupportedEventType)
        );
    }

    #[test]
    fn test_blank_required_fields() {
        let payload = MINIMAL.replace(r#""transferId":"tr_1""#, r#""transferId":"  ""#);
        assert_eq!(
            parse_status_update(payload.as_bytes()),
            Err(ValidationError::MissingField("transferId"))
        );

        let payload = MINIMAL.replace(r#""state":"PROCESSING""#, r#""state":"""#);
        assert_eq!(
            parse_status_update(payload.as_bytes()),
            Err(ValidationError::MissingField("state"))
        );
    }

    #[test]
    fn test_event_id_cross_check() {
        let event = parse_status_update(MINIMAL.as_bytes()).unwrap();

        assert!(ensure_event_id_matches(&event, "evt_1").is_ok());
        assert_eq!(
            ensure_event_id_matches(&event, "evt_2"),
            Err(ValidationError::EventIdMismatch)
        );
        assert_eq!(
            ensure_event_id_matches(&event, "EVT_1"),
            Err(ValidationError::EventIdMismatch)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::MissingField("transferId").to_string(),
            "Payload data.transferId is required."
        );
        assert_eq!(
            ValidationError::MissingEventIdHeader.to_string(),
            "Missing X-ATS-Event-Id header."
        );
    }
}
