// Shop Price Index access: trait seam plus the HTTP implementation

pub mod fetcher;
pub mod traits;

pub use fetcher::HttpPriceIndex;
pub use traits::PriceIndex;
