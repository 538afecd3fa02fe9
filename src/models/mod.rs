mod currencies;
mod exchange_rates;
mod favorites;

pub use currencies::*;
pub use exchange_rates::*;
pub use favorites::*;
