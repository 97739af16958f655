use serde::{Deserialize, Serialize};

/// Virtual-number order status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Waiting,
    Received,
    Completed,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

/// Presentation and control facts attached to each status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDescriptor {
    pub label: &'static str,
    /// No SMS will arrive after this status; stop polling
    pub terminal: bool,
}

impl OrderStatus {
    pub const fn descriptor(self) -> StatusDescriptor {
        match self {
            Self::Pending => StatusDescriptor {
                label: "Pending",
                terminal: false,
            },
            Self::Waiting => StatusDescriptor {
                label: "Waiting for SMS",
                terminal: false,
            },
            Self::Received => StatusDescriptor {
                label: "SMS received",
                terminal: true,
            },
            Self::Completed => StatusDescriptor {
                label: "Completed",
                terminal: true,
            },
            Self::Cancelled => StatusDescriptor {
                label: "Cancelled",
                terminal: true,
            },
            Self::Expired => StatusDescriptor {
                label: "Expired",
                terminal: true,
            },
            Self::Unknown => StatusDescriptor {
                label: "Unknown",
                terminal: false,
            },
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.descriptor().label)
    }
}

/// Body of the SMS status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "unknown_status")]
    pub status: OrderStatus,
    #[serde(default)]
    pub sms_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn unknown_status() -> OrderStatus {
    OrderStatus::Unknown
}

impl SmsStatus {
    /// The delivered code, if any (blank codes count as not delivered).
    pub fn code(&self) -> Option<&str> {
        self.sms_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
