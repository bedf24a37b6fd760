pub mod channel;
pub mod point;
pub mod tensor;

pub use channel::{StatChannel, TimeSelector};
pub use point::{GamePoint, ObservationId, SeasonTag};
pub use tensor::{ContributionData, ReducedContribution, TimeCellTensor};
