//! Jobs Data

use jiff::{Timestamp, tz::TimeZone};
use thiserror::Error;

use crate::domain::jobs::records::{Customer, JobType, JobUuid, Vehicle};

const PHONE_MIN_DIGITS: usize = 7;
const PHONE_MAX_DIGITS: usize = 20;
const VIN_LENGTH: usize = 17;
const EARLIEST_VEHICLE_YEAR: i16 = 1900;

/// New Job Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub uuid: JobUuid,
    pub job_type: JobType,
    pub pickup_address: String,
    pub delivery_address: String,
    pub vehicle: Option<Vehicle>,
    pub customer: Customer,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobValidationError {
    #[error("pickup address is required")]
    MissingPickupAddress,

    #[error("delivery address is required")]
    MissingDeliveryAddress,

    #[error("pickup and delivery addresses must differ")]
    SameAddresses,

    #[error("customer name is required")]
    MissingCustomerName,

    #[error("customer phone must contain 7 to 20 digits")]
    InvalidPhone,

    #[error("customer email is malformed")]
    InvalidEmail,

    #[error("vehicle must carry at least one detail")]
    EmptyVehicle,

    #[error("vehicle year {0} is out of range")]
    InvalidVehicleYear(i16),

    #[error("vehicle VIN must be 17 characters without I, O or Q")]
    InvalidVin,
}

impl NewJob {
    /// Check the job can be stored.
    ///
    /// Fields are checked as trimmed text but never rewritten, so the stored job reads
    /// back exactly as supplied. Optional fields that are blank count as absent.
    ///
    /// # Errors
    ///
    /// Returns the first [`JobValidationError`] found.
    pub fn validate(&self) -> Result<(), JobValidationError> {
        let pickup_address =
            present(&self.pickup_address).ok_or(JobValidationError::MissingPickupAddress)?;
        let delivery_address =
            present(&self.delivery_address).ok_or(JobValidationError::MissingDeliveryAddress)?;

        if pickup_address.eq_ignore_ascii_case(delivery_address) {
            return Err(JobValidationError::SameAddresses);
        }

        validate_customer(&self.customer)?;

        if let Some(vehicle) = &self.vehicle {
            validate_vehicle(vehicle)?;
        }

        Ok(())
    }
}

fn present(value: &str) -> Option<&str> {
    let trimmed = value.trim();

    (!trimmed.is_empty()).then_some(trimmed)
}

fn optional(value: Option<&String>) -> Option<&str> {
    value.and_then(|value| present(value))
}

fn validate_customer(customer: &Customer) -> Result<(), JobValidationError> {
    present(&customer.name).ok_or(JobValidationError::MissingCustomerName)?;

    if let Some(phone) = optional(customer.phone.as_ref()) {
        let mut digits = 0;

        for c in phone.chars() {
            match c {
                '0'..='9' => digits += 1,
                '+' | '-' | '(' | ')' | ' ' => {}
                _ => return Err(JobValidationError::InvalidPhone),
            }
        }

        if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
            return Err(JobValidationError::InvalidPhone);
        }
    }

    if let Some(email) = optional(customer.email.as_ref()) {
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
            && !email.contains(char::is_whitespace);

        if !valid {
            return Err(JobValidationError::InvalidEmail);
        }
    }

    Ok(())
}

fn validate_vehicle(vehicle: &Vehicle) -> Result<(), JobValidationError> {
    let vin = optional(vehicle.vin.as_ref());

    if vehicle.year.is_none()
        && optional(vehicle.make.as_ref()).is_none()
        && optional(vehicle.model.as_ref()).is_none()
        && vin.is_none()
    {
        return Err(JobValidationError::EmptyVehicle);
    }

    if let Some(year) = vehicle.year {
        let latest = Timestamp::now().to_zoned(TimeZone::UTC).year() + 1;

        if !(EARLIEST_VEHICLE_YEAR..=latest).contains(&year) {
            return Err(JobValidationError::InvalidVehicleYear(year));
        }
    }

    if let Some(vin) = vin {
        let valid = vin.len() == VIN_LENGTH
            && vin.chars().all(|c| {
                c.is_ascii_digit()
                    || (c.is_ascii_alphabetic() && !matches!(c.to_ascii_uppercase(), 'I' | 'O' | 'Q'))
            });

        if !valid {
            return Err(JobValidationError::InvalidVin);
        }
    }

    Ok(())
}
