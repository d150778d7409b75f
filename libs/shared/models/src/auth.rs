use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by identity-provider access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: u64,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

impl JwtClaims {
    /// The application role. Providers that reserve the top-level `role`
    /// claim (e.g. `authenticated`) carry ours in `app_metadata.role`.
    pub fn app_role(&self) -> Option<Role> {
        self.role
            .as_deref()
            .and_then(Role::parse)
            .or_else(|| {
                self.app_metadata
                    .as_ref()
                    .and_then(|meta| meta.get("role"))
                    .and_then(|role| role.as_str())
                    .and_then(Role::parse)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "patient" => Some(Self::Patient),
            "doctor" => Some(Self::Doctor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caller whose token has been verified. `email` is already trimmed and
/// lowercased so it compares directly against stored identity keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn is(&self, email: &str) -> bool {
        self.email == email
    }

    /// Caller must be `email` acting as `role`.
    pub fn ensure_owner(&self, email: &str, role: Role) -> Result<(), AppError> {
        if self.role != role {
            return Err(AppError::Forbidden(format!("Only a {} may perform this action", role)));
        }
        if !self.is(email) {
            return Err(AppError::Forbidden("Not authorized to act on this account".to_string()));
        }
        Ok(())
    }

    /// Caller must be one of the two parties of an appointment.
    pub fn ensure_participant(&self, doctor_email: &str, patient_email: &str) -> Result<(), AppError> {
        let allowed = match self.role {
            Role::Doctor => self.is(doctor_email),
            Role::Patient => self.is(patient_email),
        };

        if allowed {
            Ok(())
        } else {
            Err(AppError::Forbidden("Not a participant of this appointment".to_string()))
        }
    }
}
