pub mod account_service;
pub mod job_scheduler_service;
pub mod market_service;
