use std::fmt::{Display, Formatter};

use time::Date;

use crate::domain::format_compact_date;
use crate::gateway::QueryParams;

/// Window for the historical prices endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartRange {
    Max,
    FiveYears,
    TwoYears,
    OneYear,
    YearToDate,
    SixMonths,
    ThreeMonths,
    OneMonth,
    /// One month of 30-minute bars.
    OneMonthMinute,
    FiveDays,
    /// Five days of 10-minute bars.
    FiveDaysMinute,
    /// A single day, selected with [`HistoricalParams::exact_date`].
    Date,
    /// One day of minute bars if the market is open, else one month of daily bars.
    /// Responses come wrapped in `{ "range": ..., "data": [...] }`.
    Dynamic,
}

impl ChartRange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::FiveYears => "5y",
            Self::TwoYears => "2y",
            Self::OneYear => "1y",
            Self::YearToDate => "ytd",
            Self::SixMonths => "6m",
            Self::ThreeMonths => "3m",
            Self::OneMonth => "1m",
            Self::OneMonthMinute => "1mm",
            Self::FiveDays => "5d",
            Self::FiveDaysMinute => "5dm",
            Self::Date => "date",
            Self::Dynamic => "dynamic",
        }
    }
}

impl Display for ChartRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Window for the dividends endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DividendRange {
    FiveYears,
    TwoYears,
    OneYear,
    YearToDate,
    SixMonths,
    ThreeMonths,
    OneMonth,
    /// The next announced dividend, if any.
    Next,
}

impl DividendRange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FiveYears => "5y",
            Self::TwoYears => "2y",
            Self::OneYear => "1y",
            Self::YearToDate => "ytd",
            Self::SixMonths => "6m",
            Self::ThreeMonths => "3m",
            Self::OneMonth => "1m",
            Self::Next => "next",
        }
    }
}

impl Display for DividendRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Window for the splits endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitRange {
    FiveYears,
    TwoYears,
    OneYear,
    YearToDate,
    SixMonths,
    ThreeMonths,
    OneMonth,
    Next,
}

impl SplitRange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FiveYears => "5y",
            Self::TwoYears => "2y",
            Self::OneYear => "1y",
            Self::YearToDate => "ytd",
            Self::SixMonths => "6m",
            Self::ThreeMonths => "3m",
            Self::OneMonth => "1m",
            Self::Next => "next",
        }
    }
}

impl Display for SplitRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Query options shared by the historical and intraday price endpoints.
///
/// Unset options are omitted from the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalParams {
    pub exact_date: Option<Date>,
    pub range: Option<ChartRange>,
    pub sort: Option<SortOrder>,
    /// Return every Nth bar.
    pub chart_interval: Option<u32>,
    /// Return only the last N bars.
    pub chart_last: Option<u32>,
    pub chart_close_only: bool,
    pub chart_by_day: bool,
    pub chart_simplify: bool,
    pub change_from_close: bool,
    pub include_today: bool,
}

impl HistoricalParams {
    pub fn range(range: ChartRange) -> Self {
        Self {
            range: Some(range),
            ..Self::default()
        }
    }

    /// Bars for a single trading day.
    pub fn on_date(date: Date) -> Self {
        Self {
            exact_date: Some(date),
            range: Some(ChartRange::Date),
            ..Self::default()
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.range == Some(ChartRange::Dynamic)
    }

    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        let mut flag = |key: &str, enabled: bool| {
            if enabled {
                query.insert(key.to_owned(), String::from("true"));
            }
        };
        flag("chartCloseOnly", self.chart_close_only);
        flag("chartByDay", self.chart_by_day);
        flag("chartSimplify", self.chart_simplify);
        flag("changeFromClose", self.change_from_close);
        flag("includeToday", self.include_today);

        if let Some(interval) = self.chart_interval.filter(|n| *n > 0) {
            query.insert(String::from("chartInterval"), interval.to_string());
        }
        if let Some(last) = self.chart_last.filter(|n| *n > 0) {
            query.insert(String::from("chartLast"), last.to_string());
        }
        if let Some(range) = self.range {
            query.insert(String::from("range"), range.as_str().to_owned());
        }
        if let Some(date) = self.exact_date {
            query.insert(String::from("exactDate"), format_compact_date(date));
        }
        if let Some(sort) = self.sort {
            query.insert(String::from("sort"), sort.as_str().to_owned());
        }
        query
    }
}
