mod request_id;
mod request_kind;
mod request_status;
mod staff_id;

pub use request_id::RequestId;
pub use request_kind::RequestKind;
pub use request_status::RequestStatus;
pub use staff_id::StaffId;
