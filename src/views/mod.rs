pub mod antenna;
pub mod dashboard;
pub mod sky;

pub use antenna::{AntennaReadout, AntennaView};
pub use dashboard::{Dashboard, SelectionController};
pub use sky::{DomePlacement, SkyView};
