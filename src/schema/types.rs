//! Closed value sets shared by encodings, transforms and resolve maps.

schema_enum! {
    /// Semantic type of an encoded field
    pub enum FieldType: "type" {
        Quantitative => "quantitative",
        Nominal => "nominal",
        Ordinal => "ordinal",
        Temporal => "temporal",
    }
}

impl FieldType {
    /// Single-letter shorthand code (`Q`, `N`, `O`, `T`)
    pub fn code(&self) -> char {
        match self {
            FieldType::Quantitative => 'Q',
            FieldType::Nominal => 'N',
            FieldType::Ordinal => 'O',
            FieldType::Temporal => 'T',
        }
    }

    /// Resolve a shorthand code or full type name
    pub fn from_shorthand(s: &str) -> Option<Self> {
        match s {
            "Q" | "quantitative" => Some(FieldType::Quantitative),
            "N" | "nominal" => Some(FieldType::Nominal),
            "O" | "ordinal" => Some(FieldType::Ordinal),
            "T" | "temporal" => Some(FieldType::Temporal),
            _ => None,
        }
    }
}

schema_enum! {
    /// Aggregation operation
    pub enum Aggregate: "aggregate" {
        Argmax => "argmax",
        Argmin => "argmin",
        Average => "average",
        Count => "count",
        Distinct => "distinct",
        Max => "max",
        Mean => "mean",
        Median => "median",
        Min => "min",
        Missing => "missing",
        Q1 => "q1",
        Q3 => "q3",
        Ci0 => "ci0",
        Ci1 => "ci1",
        Stderr => "stderr",
        Stdev => "stdev",
        Stdevp => "stdevp",
        Sum => "sum",
        Valid => "valid",
        Values => "values",
        Variance => "variance",
        Variancep => "variancep",
    }
}

impl Aggregate {
    /// Operations whose result is a count regardless of the input field
    pub fn is_counting(&self) -> bool {
        matches!(
            self,
            Aggregate::Count | Aggregate::Distinct | Aggregate::Missing | Aggregate::Valid
        )
    }
}

schema_enum! {
    /// Time unit for discretizing temporal fields
    pub enum TimeUnit: "timeUnit" {
        Year => "year",
        Quarter => "quarter",
        Month => "month",
        Day => "day",
        Date => "date",
        Hours => "hours",
        Minutes => "minutes",
        Seconds => "seconds",
        Milliseconds => "milliseconds",
        YearQuarter => "yearquarter",
        YearQuarterMonth => "yearquartermonth",
        YearMonth => "yearmonth",
        YearMonthDate => "yearmonthdate",
        YearMonthDateHours => "yearmonthdatehours",
        YearMonthDateHoursMinutes => "yearmonthdatehoursminutes",
        YearMonthDateHoursMinutesSeconds => "yearmonthdatehoursminutesseconds",
        QuarterMonth => "quartermonth",
        MonthDate => "monthdate",
        HoursMinutes => "hoursminutes",
        HoursMinutesSeconds => "hoursminutesseconds",
        MinutesSeconds => "minutesseconds",
        SecondsMilliseconds => "secondsmilliseconds",
    }
}

schema_enum! {
    /// Visual encoding channel
    pub enum Channel: "encoding channel" {
        X => "x",
        Y => "y",
        X2 => "x2",
        Y2 => "y2",
        Color => "color",
        Fill => "fill",
        Stroke => "stroke",
        Opacity => "opacity",
        Shape => "shape",
        Size => "size",
        Text => "text",
        Tooltip => "tooltip",
        Detail => "detail",
        Order => "order",
        Href => "href",
        Key => "key",
        Row => "row",
        Column => "column",
    }
}

impl Channel {
    /// Position channels cannot carry conditional definitions
    pub fn is_position(&self) -> bool {
        matches!(self, Channel::X | Channel::Y | Channel::X2 | Channel::Y2)
    }

    /// Facet channels are only valid inside a facet mapping
    pub fn is_facet(&self) -> bool {
        matches!(self, Channel::Row | Channel::Column)
    }
}
