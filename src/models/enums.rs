use serde::{Deserialize, Serialize};

use crate::filter::paths::DbEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "kit_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KitType {
    Other,
    Laptop,
    Desktop,
    Tablet,
    Smartphone,
    Allinone,
    Chromebook,
}

impl Default for KitType {
    fn default() -> Self {
        Self::Other
    }
}

impl DbEnum for KitType {
    const TYPE_NAME: &'static str = "kit_type";

    fn as_db_str(&self) -> &'static str {
        match self {
            Self::Other => "OTHER",
            Self::Laptop => "LAPTOP",
            Self::Desktop => "DESKTOP",
            Self::Tablet => "TABLET",
            Self::Smartphone => "SMARTPHONE",
            Self::Allinone => "ALLINONE",
            Self::Chromebook => "CHROMEBOOK",
        }
    }
}

/// Device lifecycle states. DROPOFF_AGGREED keeps its historical spelling;
/// stored rows depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "kit_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KitStatus {
    New,
    AssessmentNeeded,
    Accepted,
    Declined,
    DropoffAggreed,
    DropoffPending,
    PickupScheduled,
    WithTechie,
    UpdateFailed,
    Ready,
    Allocated,
    DeliveryArranged,
    Delivered,
    Incomplete,
    Recycled,
}

impl Default for KitStatus {
    fn default() -> Self {
        Self::New
    }
}

impl DbEnum for KitStatus {
    const TYPE_NAME: &'static str = "kit_status";

    fn as_db_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::AssessmentNeeded => "ASSESSMENT_NEEDED",
            Self::Accepted => "ACCEPTED",
            Self::Declined => "DECLINED",
            Self::DropoffAggreed => "DROPOFF_AGGREED",
            Self::DropoffPending => "DROPOFF_PENDING",
            Self::PickupScheduled => "PICKUP_SCHEDULED",
            Self::WithTechie => "WITH_TECHIE",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::Ready => "READY",
            Self::Allocated => "ALLOCATED",
            Self::DeliveryArranged => "DELIVERY_ARRANGED",
            Self::Delivered => "DELIVERED",
            Self::Incomplete => "INCOMPLETE",
            Self::Recycled => "RECYCLED",
        }
    }
}

/// Role a volunteer holds on a kit. One slot per role per kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "kit_volunteer_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KitVolunteerRole {
    Organiser,
    Logistics,
    Technician,
}

impl DbEnum for KitVolunteerRole {
    const TYPE_NAME: &'static str = "kit_volunteer_role";

    fn as_db_str(&self) -> &'static str {
        match self {
            Self::Organiser => "ORGANISER",
            Self::Logistics => "LOGISTICS",
            Self::Technician => "TECHNICIAN",
        }
    }
}

impl KitVolunteerRole {
    pub const ALL: [KitVolunteerRole; 3] = [Self::Organiser, Self::Logistics, Self::Technician];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serde_names_match_db_names() {
        for status in [
            KitStatus::New,
            KitStatus::DropoffAggreed,
            KitStatus::WithTechie,
            KitStatus::DeliveryArranged,
        ] {
            assert_eq!(json!(status), json!(status.as_db_str()));
        }
        for t in [KitType::Allinone, KitType::Chromebook] {
            assert_eq!(json!(t), json!(t.as_db_str()));
        }
        for role in KitVolunteerRole::ALL {
            assert_eq!(json!(role), json!(role.as_db_str()));
        }
    }

    #[test]
    fn historical_spelling_is_preserved() {
        assert_eq!(KitStatus::DropoffAggreed.as_db_str(), "DROPOFF_AGGREED");
    }
}
