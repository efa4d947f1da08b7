//! 프로바이더별 어댑터 구현.

pub mod alpha_vantage;
pub mod finnhub;
pub mod fmp;
pub mod fred;
pub mod trading_economics;
