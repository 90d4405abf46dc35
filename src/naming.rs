use std::fmt;

use clap::ValueEnum;

/// Path and field naming of one deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Naming {
    /// Path prefix of the registrar role, e.g. `car-dealer`.
    pub role: &'static str,
    /// Path segment of the registered asset, e.g. `car`.
    pub entity: &'static str,
    pub role_title: &'static str,
    pub entity_title: &'static str,
    pub certificates: bool,
}

pub const CAR_DEALER: Naming = Naming {
    role: "car-dealer",
    entity: "car",
    role_title: "Car Dealer",
    entity_title: "Car",
    certificates: true,
};

pub const VEHICLE_AGENCY: Naming = Naming {
    role: "vehicle-agency",
    entity: "vehicle",
    role_title: "Vehicle Agency",
    entity_title: "Vehicle",
    certificates: false,
};

pub const TRADING_PLATFORM: &str = "trading-platform";
pub const BANK: &str = "bank";

/// Deployment selected at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    #[default]
    CarDealer,
    VehicleAgency,
}

impl Variant {
    pub fn naming(&self) -> Naming {
        match self {
            Variant::CarDealer => CAR_DEALER,
            Variant::VehicleAgency => VEHICLE_AGENCY,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.naming().role)
    }
}
