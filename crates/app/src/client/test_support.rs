use jiff::Timestamp;

use crate::{
    domain::jobs::{
        records::{Customer, JobRecord, JobState, JobType, JobUuid},
        tracking::TrackingToken,
    },
    session::DealerUuid,
};

pub(crate) fn job_at(created_at: Timestamp) -> JobRecord {
    JobRecord {
        uuid: JobUuid::new(),
        dealer_uuid: DealerUuid::new(),
        job_type: JobType::Delivery,
        state: JobState::Open,
        pickup_address: "12 Depot Road".to_string(),
        delivery_address: "4 Harbour Lane".to_string(),
        vehicle: None,
        customer: Customer {
            name: "Ada Lovelace".to_string(),
            phone: None,
            email: None,
        },
        tracking_token: TrackingToken::generate(),
        created_at,
        updated_at: created_at,
    }
}
