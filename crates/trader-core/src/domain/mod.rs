//! 백테스터 도메인 모델.

mod candle;
mod environment;
mod money_management;
mod strategy;
mod trade;

pub use candle::*;
pub use environment::*;
pub use money_management::*;
pub use strategy::*;
pub use trade::*;
