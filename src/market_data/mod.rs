pub mod calendar;
pub mod eastmoney;
pub mod provider;

// Re-export the ports and adapters for convenient access (e.g. `use crate::market_data::KlineProvider`).
pub use calendar::CalendarClient;
pub use eastmoney::EastmoneyClient;
pub use provider::{KlineProvider, KlineQuery, TradingCalendar};
