// Power state shared by hosts and VMs

use serde::{Deserialize, Serialize};

/// Power state; serializes in vSphere camelCase form (e.g. "poweredOn").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerState {
    PoweredOn,
    PoweredOff,
    Suspended,
    StandBy,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PowerState {
    /// Parse from either API flavour: SOAP ("poweredOn") or REST ("POWERED_ON").
    pub fn from_vsphere(s: &str) -> Self {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "poweredon" => PowerState::PoweredOn,
            "poweredoff" => PowerState::PoweredOff,
            "suspended" => PowerState::Suspended,
            "standby" => PowerState::StandBy,
            _ => PowerState::Unknown,
        }
    }
}
