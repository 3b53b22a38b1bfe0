pub mod baseline;
pub mod crypto_momentum;
pub mod mean_reversion;

pub use baseline::BaselineStrategy;
pub use crypto_momentum::CryptoMomentumStrategy;
pub use mean_reversion::MeanReversionStrategy;
