pub mod csv_files;
pub mod geonames;
pub mod world_bank;

pub use csv_files::{CsvCatalogSource, CsvEconomySource, CsvMarketSource};
pub use geonames::GeoNamesAdapter;
pub use world_bank::WorldBankAdapter;
