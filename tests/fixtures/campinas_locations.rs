//! Real Campinas (São Paulo state) locations for realistic fixtures.
//!
//! Coordinates taken from OpenStreetMap.

use route_planner::model::Stop;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn to_stop(&self, id: &str) -> Stop {
        Stop::new(id, self.name, self.lat, self.lng).with_address(format!("{}, Campinas - SP", self.name))
    }
}

/// Kitchen the deliveries leave from.
pub const DEPOT: Location = Location::new("Cozinha Central Cambuí", -22.8943, -47.0525);

pub const CUSTOMERS: &[Location] = &[
    Location::new("Largo do Rosário", -22.9064, -47.0616),
    Location::new("Mercado Municipal", -22.9050, -47.0680),
    Location::new("Estação Cultura", -22.9036, -47.0712),
    Location::new("Bosque dos Jequitibás", -22.9108, -47.0507),
    Location::new("Parque Taquaral", -22.8746, -47.0553),
    Location::new("Shopping Iguatemi", -22.8937, -47.0271),
    Location::new("Unicamp Ciclo Básico", -22.8184, -47.0647),
    Location::new("PUC Campinas", -22.8340, -47.0498),
    Location::new("Shopping Dom Pedro", -22.8477, -47.0632),
    Location::new("Castelo Torre", -22.8846, -47.0745),
    Location::new("Hospital Vera Cruz", -22.8947, -47.0589),
    Location::new("Praça Carlos Gomes", -22.9022, -47.0578),
    Location::new("Estádio Brinco de Ouro", -22.9095, -47.0392),
    Location::new("Estádio Moisés Lucarelli", -22.9168, -47.0597),
    Location::new("Barão Geraldo Centro", -22.8222, -47.0822),
    Location::new("Jardim Chapadão", -22.8829, -47.0780),
    Location::new("Taquaral Lagoa Sul", -22.8778, -47.0528),
    Location::new("Vila Industrial", -22.9138, -47.0701),
    Location::new("Ponte Preta", -22.9176, -47.0540),
    Location::new("Nova Campinas", -22.8994, -47.0414),
    Location::new("Guanabara", -22.8912, -47.0690),
    Location::new("Cambuí Centro de Convivência", -22.8966, -47.0514),
    Location::new("Parque Ecológico", -22.8586, -47.0131),
    Location::new("Sousas", -22.8792, -46.9700),
];

/// Depot followed by the first `n` customers as stops.
pub fn depot_and_customers(n: usize) -> Vec<Stop> {
    std::iter::once(DEPOT.to_stop("depot"))
        .chain(
            CUSTOMERS
                .iter()
                .take(n)
                .enumerate()
                .map(|(i, loc)| loc.to_stop(&format!("c{}", i + 1))),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_in_campinas_area() {
        for loc in CUSTOMERS.iter().chain(std::iter::once(&DEPOT)) {
            assert!(loc.lat > -23.0 && loc.lat < -22.7, "{} lat out of range: {}", loc.name, loc.lat);
            assert!(loc.lng > -47.2 && loc.lng < -46.9, "{} lng out of range: {}", loc.name, loc.lng);
        }
    }
}
