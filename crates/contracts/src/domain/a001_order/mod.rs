pub mod paid_amount;
pub mod update;

pub use paid_amount::PaidAmount;
pub use update::UpdateOrderRequest;
