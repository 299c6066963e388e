pub mod area;
pub mod coordinates;
pub mod route;
pub mod stop;
pub mod vehicle;

pub use area::Area;
pub use coordinates::Coordinates;
pub use route::{Route, RouteState};
pub use stop::{Demand, Stop, StopState};
pub use vehicle::{Vehicle, VehicleCapacity};
