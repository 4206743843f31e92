use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Backend resource collections, each served under `/api/<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Patients,
    Doctors,
    Appointments,
    Consultations,
    Prescriptions,
    Laboratories,
    Pharmacies,
    Payments,
    Notifications,
    HealthAuthorities,
}

/// Mutating operations gated per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Self::Patients,
        Self::Doctors,
        Self::Appointments,
        Self::Consultations,
        Self::Prescriptions,
        Self::Laboratories,
        Self::Pharmacies,
        Self::Payments,
        Self::Notifications,
        Self::HealthAuthorities,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Doctors => "doctors",
            Self::Appointments => "appointments",
            Self::Consultations => "consultations",
            Self::Prescriptions => "prescriptions",
            Self::Laboratories => "laboratories",
            Self::Pharmacies => "pharmacies",
            Self::Payments => "payments",
            Self::Notifications => "notifications",
            Self::HealthAuthorities => "health_authorities",
        }
    }

    /// Collection path, e.g. `/api/appointments`.
    pub fn path(self) -> String {
        format!("/api/{}", self.as_str())
    }

    /// Query keys the backend accepts on `GET <collection>`.
    pub fn list_filters(self) -> &'static [&'static str] {
        match self {
            Self::Patients => &[],
            Self::Doctors => &["specialite", "facility_id"],
            Self::Appointments => &[
                "doctor_id",
                "patient_id",
                "facility_id",
                "status",
                "date_from",
                "date_to",
            ],
            Self::Consultations => &[
                "patient_id",
                "doctor_id",
                "facility_id",
                "date_from",
                "date_to",
            ],
            Self::Prescriptions => &["patient_id", "doctor_id", "consultation_id", "facility_id"],
            Self::Laboratories | Self::Pharmacies => {
                &["patient_id", "doctor_id", "facility_id", "status"]
            }
            Self::Payments => &["patient_id", "facility_id", "status", "currency", "method"],
            Self::Notifications => &[
                "status",
                "channel",
                "ref_type",
                "to_patient_id",
                "to_doctor_id",
            ],
            Self::HealthAuthorities => &["facility_id", "report_type", "status"],
        }
    }

    /// Dotted paths of request-body fields that carry a date/time.
    pub fn date_fields(self) -> &'static [&'static str] {
        match self {
            Self::Patients => &["identite.date_naissance"],
            Self::Appointments | Self::Consultations => &["date_time"],
            Self::Pharmacies => &["dispensed_at"],
            Self::Payments => &["due_date", "paid_at"],
            Self::Notifications => &["send_at", "sent_at", "expires_at"],
            Self::HealthAuthorities => &["period_start", "period_end", "submitted_at"],
            Self::Doctors | Self::Prescriptions | Self::Laboratories => &[],
        }
    }

    pub fn supports(self, operation: Operation) -> bool {
        match operation {
            Operation::Update | Operation::Delete => matches!(
                self,
                Self::Patients
                    | Self::Doctors
                    | Self::Appointments
                    | Self::Prescriptions
                    | Self::Pharmacies
                    | Self::Payments
            ),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource `{name}`")]
pub struct UnknownResource {
    pub name: String,
}

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|resource| resource.as_str() == normalized)
            .ok_or_else(|| UnknownResource {
                name: s.to_string(),
            })
    }
}

/// Ordered `GET` filters; empty values are skipped like unset form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pairs: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.pairs.push((key.into(), value));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// First key that `resource` does not accept, if any.
    pub fn unsupported_key(&self, resource: Resource) -> Option<&str> {
        let accepted = resource.list_filters();
        self.pairs
            .iter()
            .map(|(key, _)| key.as_str())
            .find(|key| !accepted.contains(key))
    }

    /// `?a=b&c=d` in insertion order, or an empty string without filters.
    pub fn to_query_string(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish();
        format!("?{encoded}")
    }
}
