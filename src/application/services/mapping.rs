use crate::application::ports::task_api::{OutgoingRequestRecord, PendingTaskRecord};
use crate::domain::entities::Request;
use crate::domain::value_objects::{RequestId, RequestKind, RequestStatus};
use crate::shared::json::{json_text, json_text_or_empty};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const LOGISTICS_CREATED_EVENT: &str = "LOGISTICS_REQUEST_CREATED";
pub const FUEL_UPDATED_EVENT: &str = "fuel_request_updated";

const LOGISTICS_TITLE: &str = "LOGISTICS REQUEST";

/// A stream message that survived parsing and event-tag filtering. The
/// staff id is still unchecked; the stream client compares it against the
/// resolved identity before anything is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub staff_id: String,
    pub update: StreamUpdate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Created(Request),
    StatusChanged { id: RequestId, status: RequestStatus },
}

/// Location strings arrive as "Pickup -> Delivery" routes; the delivery
/// end is what the driver sees.
pub fn parse_route_location(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains("->") {
        raw.split("->")
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .last()
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string())
    } else {
        raw.to_string()
    }
}

fn location_or_unknown(raw: Option<String>) -> Option<String> {
    let parsed = raw.map(|value| parse_route_location(&value)).unwrap_or_default();
    if parsed.is_empty() {
        Some("Unknown".to_string())
    } else {
        Some(parsed)
    }
}

/// Maps a pending-task record into a request-view entry. Returns `None`
/// for records that do not belong to the request view (non-logistics
/// activities are task-list rows handled elsewhere).
pub fn map_pending_task(record: &PendingTaskRecord) -> Option<Request> {
    let kind = RequestKind::from_activity(record.activity.as_deref())?;

    let plan_id = json_text(record.plan_id.as_ref());
    let date = json_text(record.date.as_ref());
    let farm_id = json_text(record.farm_id.as_ref());
    let id = RequestId::from_plan_id(plan_id.as_deref()).unwrap_or_else(|| {
        RequestId::synthesize(
            &json_text_or_empty(record.vehicle_id.as_ref()),
            date.as_deref().unwrap_or(""),
            farm_id.as_deref().unwrap_or(""),
        )
    });

    let mut request = Request::new(id, kind, LOGISTICS_TITLE);
    request.status = RequestStatus::parse(record.status.as_deref());
    request.request_ref = plan_id;
    request.server_request_id = json_text(record.request_id.as_ref());
    request.activity = record.activity.as_deref().map(|a| a.trim().to_string());
    request.note = farm_id.clone();
    request.location = location_or_unknown(farm_id);
    request.date = date;
    Some(request)
}

/// Maps one entry of the `get_outgoing_requests` object; the object key is
/// the backend's identifier for the submission.
pub fn map_outgoing_record(key: &str, record: &OutgoingRequestRecord) -> Request {
    let mut request = Request::new(RequestId::new(key), RequestKind::Logistics, LOGISTICS_TITLE);
    request.status = RequestStatus::parse(record.status.as_deref());
    request.request_ref = Some(key.trim().to_string());
    request.note = json_text(record.request.as_ref());
    request.location = location_or_unknown(json_text(record.request_location.as_ref()));
    request.date = json_text(record.date.as_ref());
    request
}

#[derive(Debug, Default, Deserialize)]
struct LogisticsEnvelope {
    #[serde(default)]
    event: String,
    #[serde(default)]
    plan_id: Option<Value>,
    #[serde(default)]
    data: LogisticsData,
}

#[derive(Debug, Default, Deserialize)]
struct LogisticsData {
    #[serde(default)]
    staff_id: Option<Value>,
    #[serde(default)]
    plan_id: Option<Value>,
    #[serde(default)]
    date: Option<Value>,
    #[serde(default)]
    vehicle_id: Option<Value>,
    #[serde(default)]
    farm_id: Option<Value>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    plan_entry: PlanEntry,
}

#[derive(Debug, Default, Deserialize)]
struct PlanEntry {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    requested_location: Option<Value>,
    #[serde(default)]
    staff_name: Option<Value>,
    #[serde(default)]
    staff_contact: Option<Value>,
    #[serde(default)]
    request: Option<Value>,
}

fn compose_plan_entry_note(entry: &PlanEntry) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(name) = json_text(entry.staff_name.as_ref()) {
        lines.push(format!("Name: {name}"));
    }
    if let Some(contact) = json_text(entry.staff_contact.as_ref()) {
        lines.push(format!("Contact: {contact}"));
    }
    if let Some(request) = json_text(entry.request.as_ref()) {
        lines.push(format!("Request: {request}"));
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Decodes a `/ws/logistics` frame. Parse failures and foreign event tags
/// yield `None`; neither may disturb the connection.
pub fn decode_logistics_event(text: &str) -> Option<InboundEvent> {
    let envelope: LogisticsEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(err) => {
            debug!("logistics stream: dropping unparseable frame: {err}");
            return None;
        }
    };
    if envelope.event != LOGISTICS_CREATED_EVENT {
        return None;
    }

    let data = &envelope.data;
    let entry = &data.plan_entry;
    let plan_id = json_text(envelope.plan_id.as_ref()).or_else(|| json_text(data.plan_id.as_ref()));
    let date = json_text(data.date.as_ref());
    let requested_location = json_text(entry.requested_location.as_ref());
    let id = RequestId::from_plan_id(plan_id.as_deref()).unwrap_or_else(|| {
        RequestId::synthesize(
            &json_text_or_empty(data.vehicle_id.as_ref()),
            date.as_deref().unwrap_or(""),
            requested_location.as_deref().unwrap_or(""),
        )
    });

    let mut request = Request::new(id, RequestKind::Logistics, LOGISTICS_TITLE);
    request.status =
        RequestStatus::parse(entry.status.as_deref().or(data.status.as_deref()));
    request.request_ref = plan_id;
    request.note = compose_plan_entry_note(entry);
    request.location =
        location_or_unknown(requested_location.or_else(|| json_text(data.farm_id.as_ref())));
    request.date = date;

    Some(InboundEvent {
        staff_id: json_text_or_empty(data.staff_id.as_ref()),
        update: StreamUpdate::Created(request),
    })
}

#[derive(Debug, Default, Deserialize)]
struct FuelEnvelope {
    #[serde(default)]
    event: String,
    #[serde(default)]
    data: FuelData,
}

#[derive(Debug, Default, Deserialize)]
struct FuelData {
    #[serde(default)]
    staff_id: Option<Value>,
    #[serde(default)]
    request_id: Option<Value>,
    #[serde(default)]
    new_status: Option<String>,
}

/// Decodes a `/ws/fuel_requests` frame into a status change.
pub fn decode_fuel_event(text: &str) -> Option<InboundEvent> {
    let envelope: FuelEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(err) => {
            debug!("fuel stream: dropping unparseable frame: {err}");
            return None;
        }
    };
    if envelope.event != FUEL_UPDATED_EVENT {
        return None;
    }

    let request_id = json_text(envelope.data.request_id.as_ref())?;
    Some(InboundEvent {
        staff_id: json_text_or_empty(envelope.data.staff_id.as_ref()),
        update: StreamUpdate::StatusChanged {
            id: RequestId::new(request_id),
            status: RequestStatus::parse(envelope.data.new_status.as_deref()),
        },
    })
}
