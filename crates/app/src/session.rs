//! Explicit caller sessions.
//!
//! Every service operation performed on behalf of a dealer or driver receives a
//! [`Session`] argument instead of reading an ambient identity.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::uuids::TypedUuid;

/// Dealer marker.
#[derive(Debug)]
pub struct Dealer;

/// Driver marker.
#[derive(Debug)]
pub struct Driver;

/// Dealer UUID
pub type DealerUuid = TypedUuid<Dealer>;

/// Driver UUID
pub type DriverUuid = TypedUuid<Driver>;

/// Participant role in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Dealer,
    Driver,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dealer => "dealer",
            Self::Driver => "driver",
        }
    }

    /// The other side of a dealer/driver conversation.
    #[must_use]
    pub const fn counterpart(self) -> Self {
        match self {
            Self::Dealer => Self::Driver,
            Self::Driver => Self::Dealer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "dealer" => Ok(Self::Dealer),
            "driver" => Ok(Self::Driver),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// The authenticated identity behind a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    Dealer(DealerUuid),
    Driver(DriverUuid),
}

impl Actor {
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::Dealer(_) => Role::Dealer,
            Self::Driver(_) => Role::Driver,
        }
    }

    /// Raw identifier of the actor regardless of role.
    #[must_use]
    pub fn uuid(self) -> uuid::Uuid {
        match self {
            Self::Dealer(dealer) => dealer.into_uuid(),
            Self::Driver(driver) => driver.into_uuid(),
        }
    }

    /// Rebuild an actor from its stored role and identifier.
    #[must_use]
    pub fn from_parts(role: Role, uuid: uuid::Uuid) -> Self {
        match role {
            Role::Dealer => Self::Dealer(DealerUuid::from_uuid(uuid)),
            Role::Driver => Self::Driver(DriverUuid::from_uuid(uuid)),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role(), self.uuid())
    }
}

/// Session passed into every dealer/driver operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub actor: Actor,
}

impl Session {
    #[must_use]
    pub const fn dealer(dealer: DealerUuid) -> Self {
        Self {
            actor: Actor::Dealer(dealer),
        }
    }

    #[must_use]
    pub const fn driver(driver: DriverUuid) -> Self {
        Self {
            actor: Actor::Driver(driver),
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.actor.role()
    }

    /// The dealer behind this session, if it is a dealer session.
    #[must_use]
    pub const fn as_dealer(&self) -> Option<DealerUuid> {
        match self.actor {
            Actor::Dealer(dealer) => Some(dealer),
            Actor::Driver(_) => None,
        }
    }

    /// The driver behind this session, if it is a driver session.
    #[must_use]
    pub const fn as_driver(&self) -> Option<DriverUuid> {
        match self.actor {
            Actor::Driver(driver) => Some(driver),
            Actor::Dealer(_) => None,
        }
    }

    #[must_use]
    pub fn is_dealer(&self, dealer: DealerUuid) -> bool {
        self.as_dealer() == Some(dealer)
    }

    #[must_use]
    pub fn is_driver(&self, driver: DriverUuid) -> bool {
        self.as_driver() == Some(driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() -> Result<(), UnknownRole> {
        assert_eq!("dealer".parse::<Role>()?, Role::Dealer);
        assert_eq!("driver".parse::<Role>()?, Role::Driver);
        assert!("admin".parse::<Role>().is_err());

        Ok(())
    }

    #[test]
    fn counterpart_flips_role() {
        assert_eq!(Role::Dealer.counterpart(), Role::Driver);
        assert_eq!(Role::Driver.counterpart(), Role::Dealer);
    }

    #[test]
    fn session_ownership_checks_match_role_and_id() {
        let dealer = DealerUuid::new();
        let driver = DriverUuid::new();

        let session = Session::dealer(dealer);

        assert!(session.is_dealer(dealer));
        assert!(!session.is_dealer(DealerUuid::new()));
        assert!(!session.is_driver(driver));
        assert_eq!(session.role(), Role::Dealer);
    }

    #[test]
    fn actor_from_parts_preserves_identity() {
        let uuid = uuid::Uuid::now_v7();
        let actor = Actor::from_parts(Role::Driver, uuid);

        assert_eq!(actor, Actor::Driver(DriverUuid::from_uuid(uuid)));
        assert_eq!(actor.uuid(), uuid);
    }
}
