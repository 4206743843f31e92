use serde::{Deserialize, Serialize};

use crate::domain::error::TimestampError;
use crate::util::time::{NormalizeOptions, normalize_to_utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    CheckedIn,
    Cancelled,
    NoShow,
    Completed,
}

/// Body of `POST /api/appointments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: String,
    pub doctor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
    pub date_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Raw values of the new-appointment form, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentForm {
    pub patient_id: String,
    pub doctor_id: String,
    /// `YYYY-MM-DDTHH:mm` from a datetime-local input.
    pub date_time: String,
    pub reason: String,
    pub notes: String,
}

impl AppointmentForm {
    /// Build the request body. Blank optional fields are left for the
    /// scrubber, which removes them before the body is sent.
    pub fn into_request(self, options: NormalizeOptions) -> Result<NewAppointment, TimestampError> {
        let date_time = normalize_to_utc(self.date_time.as_str(), options)?;
        Ok(NewAppointment {
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            facility_id: None,
            date_time,
            status: None,
            reason: Some(self.reason),
            notes: Some(self.notes),
        })
    }
}
