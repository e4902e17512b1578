pub mod caching;
pub mod coingecko;
pub mod ecb;
pub mod reference;
pub mod util;
pub mod yahoo_finance;

pub use caching::CachingRateProvider;
pub use coingecko::CoinGeckoProvider;
pub use ecb::EcbRateProvider;
pub use reference::ReferenceRateProvider;
pub use yahoo_finance::YahooHistoryProvider;
