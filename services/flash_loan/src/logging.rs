//! Standardized emoji logging for flash loan modules
//!
//! Keeps emoji usage consistent between the engine, the adapters and the
//! strategies so a loan's lifecycle reads the same in every log.

/// Standard emoji set for flash loan logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅"; // Loan settled
    pub const ERROR: &'static str = "❌"; // Unit of work discarded
    pub const WARNING: &'static str = "⚠️"; // Guard tripped

    // Lifecycle
    pub const LOAN: &'static str = "🏦"; // Loan requested from the pool
    pub const CALLBACK: &'static str = "📞"; // Pool called back
    pub const EXECUTE: &'static str = "⚡"; // Strategy execution
    pub const SWAP: &'static str = "🔄"; // Swap through the venue
    pub const REPAY: &'static str = "💸"; // Repayment authorized
    pub const MONEY: &'static str = "💰"; // Profit
    pub const CHART: &'static str = "📊"; // Quotes and price impact
}

// Convenience macros for standardized logging
#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::warn!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_guard {
    ($($arg:tt)*) => {
        tracing::warn!("{} {}", $crate::logging::LogEmoji::WARNING, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_loan {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::LOAN, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_callback {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::CALLBACK, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_execution {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::EXECUTE, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_swap {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::SWAP, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_repay {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::REPAY, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_profit {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::MONEY, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_metrics {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::CHART, format!($($arg)*))
    };
}
