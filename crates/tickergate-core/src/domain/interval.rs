use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Supported sampling intervals for historical series.
///
/// Each interval carries a fixed upstream query pair: the granularity
/// string and the lookback range. The table is static configuration,
/// not computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl Interval {
    pub const ALL: [Self; 9] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "ONE_MINUTE",
            Self::FiveMinutes => "FIVE_MINUTES",
            Self::FifteenMinutes => "FIFTEEN_MINUTES",
            Self::ThirtyMinutes => "THIRTY_MINUTES",
            Self::OneHour => "ONE_HOUR",
            Self::OneDay => "ONE_DAY",
            Self::OneWeek => "ONE_WEEK",
            Self::OneMonth => "ONE_MONTH",
            Self::ThreeMonths => "THREE_MONTHS",
        }
    }

    /// Upstream chart granularity string.
    pub const fn granularity(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
            Self::OneWeek => "1wk",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
        }
    }

    /// Upstream lookback window paired with the granularity.
    pub const fn range(self) -> &'static str {
        match self {
            Self::OneMinute => "7d",
            Self::FiveMinutes => "30d",
            Self::FifteenMinutes => "30d",
            Self::ThirtyMinutes => "30d",
            Self::OneHour => "60d",
            Self::OneDay => "2y",
            Self::OneWeek => "10y",
            Self::OneMonth => "20y",
            Self::ThreeMonths => "max",
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ONE_MINUTE" => Ok(Self::OneMinute),
            "FIVE_MINUTES" => Ok(Self::FiveMinutes),
            "FIFTEEN_MINUTES" => Ok(Self::FifteenMinutes),
            "THIRTY_MINUTES" => Ok(Self::ThirtyMinutes),
            "ONE_HOUR" => Ok(Self::OneHour),
            "ONE_DAY" => Ok(Self::OneDay),
            "ONE_WEEK" => Ok(Self::OneWeek),
            "ONE_MONTH" => Ok(Self::OneMonth),
            "THREE_MONTHS" => Ok(Self::ThreeMonths),
            other => Err(ValidationError::InvalidInterval {
                value: other.to_owned(),
            }),
        }
    }
}

/// Asset category accepted by the lookup flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    All,
    Equity,
    Index,
    Future,
    MutualFund,
    Etf,
    Currency,
    CryptoCurrency,
}

impl AssetCategory {
    /// Lowercase label used in upstream lookup query parameters.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Equity => "equity",
            Self::Index => "index",
            Self::Future => "future",
            Self::MutualFund => "mutualfund",
            Self::Etf => "etf",
            Self::Currency => "currency",
            Self::CryptoCurrency => "cryptocurrency",
        }
    }
}

impl Display for AssetCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "equity" => Ok(Self::Equity),
            "index" => Ok(Self::Index),
            "future" => Ok(Self::Future),
            "mutualfund" => Ok(Self::MutualFund),
            "etf" => Ok(Self::Etf),
            "currency" => Ok(Self::Currency),
            "cryptocurrency" => Ok(Self::CryptoCurrency),
            other => Err(ValidationError::InvalidAssetCategory {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_interval() {
        let interval = Interval::from_str("one_day").expect("must parse");
        assert_eq!(interval, Interval::OneDay);
    }

    #[test]
    fn rejects_invalid_interval() {
        let err = Interval::from_str("TWO_HOURS").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidInterval { .. }));
    }

    #[test]
    fn every_interval_has_a_lookback_pair() {
        for interval in Interval::ALL {
            assert!(!interval.granularity().is_empty());
            assert!(!interval.range().is_empty());
        }
        assert_eq!(Interval::OneDay.granularity(), "1d");
        assert_eq!(Interval::OneDay.range(), "2y");
        assert_eq!(Interval::ThreeMonths.range(), "max");
    }

    #[test]
    fn parses_asset_category() {
        let category = AssetCategory::from_str("ETF").expect("must parse");
        assert_eq!(category, AssetCategory::Etf);
    }

    #[test]
    fn rejects_unknown_asset_category() {
        let err = AssetCategory::from_str("bond").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidAssetCategory { .. }));
    }
}
