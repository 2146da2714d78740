pub mod incentive;
pub mod reserve;
pub mod user;
pub mod wad_ray;

pub use incentive::{
    IncentiveAprRequest, IncentiveSnapshot, ReserveIncentiveEmission, ReserveIncentivesRequest,
    ReserveIncentivesResponse, RewardApr, UserReward, UserRewardAccrual,
};
pub use reserve::{
    FormatReserveUsdRequest, FormattedReserve, FormattedReserveUsd, ReserveData, ReserveDebt,
};
pub use user::{
    FormatUserSummaryRequest, FormattedUserReserve, FormattedUserSummary, RawUserSummary,
    UserReserveData, UserReservePosition, UserReserveSummary, UserReserveTotals,
};
pub use wad_ray::{Ray, Wad};
