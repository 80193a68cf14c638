use serde::{Deserialize, Serialize};

use crate::errors::TimeResult;
use crate::slots::{Interval, SlotSearch};
use crate::time;

pub const NO_BUSY_TIMES_MESSAGE: &str = "No busy times provided";
pub const NO_SLOTS_AFTER_NOW_MESSAGE: &str = "No slots available after current time";
pub const NO_SLOTS_MESSAGE: &str = "No slots available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusyTimeRequest {
    pub start: String,
    pub end: String,
}

impl BusyTimeRequest {
    /// Parses both bounds and checks that the range is not empty.
    pub fn to_interval(&self) -> TimeResult<Interval> {
        let start = time::parse_instant(&self.start)?;
        let end = time::parse_instant(&self.end)?;
        Interval::new(start, end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsRequest {
    #[serde(default)]
    pub busy_times: Option<Vec<BusyTimeRequest>>,
    /// Reference instant overriding the server clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AvailableSlotsResponse {
    Slots {
        #[serde(rename = "alternateTimes")]
        alternate_times: Vec<String>,
    },
    Message {
        message: String,
    },
}

impl From<&SlotSearch> for AvailableSlotsResponse {
    fn from(search: &SlotSearch) -> Self {
        match search {
            SlotSearch::Available(slots) => AvailableSlotsResponse::Slots {
                alternate_times: slots.iter().map(time::render).collect(),
            },
            SlotSearch::NoBusyTimes => AvailableSlotsResponse::Message {
                message: NO_BUSY_TIMES_MESSAGE.to_string(),
            },
            SlotSearch::NoSlotsAvailable { anchored: true } => AvailableSlotsResponse::Message {
                message: NO_SLOTS_AFTER_NOW_MESSAGE.to_string(),
            },
            SlotSearch::NoSlotsAvailable { anchored: false } => AvailableSlotsResponse::Message {
                message: NO_SLOTS_MESSAGE.to_string(),
            },
        }
    }
}
